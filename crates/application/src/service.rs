use livi_media_domain::{
    BackingLists, DomainError, GeoPoint, ImageKey, ImageLocationIndex, LocalImage, Proximity,
    RemoteImage, ResolvedLocation, SlotContent, LISTING_MINIMUM_IMAGES, MAX_IMAGES,
};
use tracing::info;

use crate::reorder::move_order;
use crate::{
    ApplicationError, BootstrapDraftCommand, CancelDraftCommand, CaptureDevices,
    CaptureIntoSlotCommand, CaptureReport, CaptureSession, DistanceAnnotator, DraftRepository,
    DraftView, LocationLookup, LookupAddressCommand, MoveSlotCommand, RemoveSlotCommand,
    ReorderSlotsCommand, ReverseLookupCommand, SetPropertyLocationCommand, ShowSlotsQuery,
    SlotSource, SlotStore, SlotView, StartDraftCommand, StoredDraft, StoredLocalImage,
    SubmissionOutbox, SubmitDraftCommand, SubmitReport,
};

pub struct ApplicationService {
    drafts: Box<dyn DraftRepository>,
    outbox: Box<dyn SubmissionOutbox>,
    devices: CaptureDevices,
    lookup: LocationLookup,
    annotator: DistanceAnnotator,
    capacity: usize,
}

impl ApplicationService {
    pub fn new(
        drafts: Box<dyn DraftRepository>,
        outbox: Box<dyn SubmissionOutbox>,
        devices: CaptureDevices,
        lookup: LocationLookup,
    ) -> Self {
        Self {
            drafts,
            outbox,
            devices,
            lookup,
            annotator: DistanceAnnotator::default(),
            capacity: MAX_IMAGES,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn bootstrap_draft(&self, _command: BootstrapDraftCommand) -> Result<(), ApplicationError> {
        self.drafts.initialize()
    }

    pub fn start_draft(&self, command: StartDraftCommand) -> Result<DraftView, ApplicationError> {
        let mut existing_remote = Vec::with_capacity(command.existing_remote.len());
        for url in command.existing_remote {
            let url = url.trim();
            if url.is_empty() {
                return Err(ApplicationError::InvalidInput(
                    "remote image url must not be empty".to_string(),
                ));
            }
            existing_remote.push((RemoteImage::new(url), None));
        }

        let draft = StoredDraft {
            property_location: None,
            existing_remote,
            new_images: Vec::new(),
        };
        self.drafts.save_draft(&draft)?;
        info!(remote = draft.existing_remote.len(), "draft started");

        let store = self.open_store(&draft)?;
        Ok(self.view(&draft, &store))
    }

    pub fn set_property_location(
        &self,
        command: SetPropertyLocationCommand,
    ) -> Result<DraftView, ApplicationError> {
        let location = GeoPoint::new(command.location.latitude, command.location.longitude)?;
        let mut draft = self.load_draft()?;
        draft.property_location = Some(location);
        self.drafts.save_draft(&draft)?;

        let store = self.open_store(&draft)?;
        Ok(self.view(&draft, &store))
    }

    pub async fn lookup_address(
        &self,
        command: LookupAddressCommand,
    ) -> Result<Vec<ResolvedLocation>, ApplicationError> {
        let matches: Vec<ResolvedLocation> = self
            .lookup
            .suggest(&command.query)
            .await
            .iter()
            .map(|feature| feature.resolve())
            .collect();

        if command.apply {
            let best = matches.first().ok_or_else(|| {
                ApplicationError::NotFound(format!("no address matches '{}'", command.query))
            })?;
            self.set_property_location(SetPropertyLocationCommand {
                location: best.point,
            })?;
        }
        Ok(matches)
    }

    pub async fn reverse_lookup(
        &self,
        command: ReverseLookupCommand,
    ) -> Result<Option<ResolvedLocation>, ApplicationError> {
        let location = GeoPoint::new(command.location.latitude, command.location.longitude)?;
        Ok(self.lookup.reverse(location).await)
    }

    /// Opens the camera, takes one photo, accepts it and stores it in the
    /// draft.
    pub async fn capture_into_slot(
        &self,
        command: CaptureIntoSlotCommand,
    ) -> Result<CaptureReport, ApplicationError> {
        let draft = self.load_draft()?;
        let mut store = self.open_store(&draft)?;
        let slot = match command.slot {
            Some(slot) if slot >= store.capacity() => {
                return Err(DomainError::SlotOutOfRange {
                    index: slot,
                    capacity: store.capacity(),
                }
                .into())
            }
            Some(slot) => slot,
            None => store
                .next_empty_slot()
                .ok_or(DomainError::CapacityExceeded(store.capacity()))?,
        };

        let mut session = CaptureSession::new(self.devices.clone(), command.facing_mode);
        session.open().await?;
        session.capture().await?;
        let captured = session.accept().await?;

        let preview = self.devices.previews.create(&captured.file.bytes);
        let file_name = captured.file.file_name.clone();
        store.fill_slot(slot, captured.file, preview, captured.location)?;
        self.save_store(draft.property_location, &store)?;

        let landed = store
            .layout()
            .slots()
            .iter()
            .position(|entry| {
                entry
                    .content
                    .as_ref()
                    .is_some_and(|content| content.key() == ImageKey::Preview(preview))
            })
            .unwrap_or(slot);
        let proximity = Proximity::classify(
            draft.property_location,
            captured.location,
            self.annotator.threshold_meters(),
        );
        info!(slot = landed, file = %file_name, "photo stored in draft");

        Ok(CaptureReport {
            slot: landed,
            file_name,
            location: captured.location,
            proximity,
        })
    }

    pub fn remove_slot(&self, command: RemoveSlotCommand) -> Result<DraftView, ApplicationError> {
        self.mutate(|store| store.remove_slot(command.slot).map(|_| ()))
    }

    pub fn reorder_slots(&self, command: ReorderSlotsCommand) -> Result<DraftView, ApplicationError> {
        self.mutate(|store| store.reorder_slots(&command.order))
    }

    pub fn move_slot(&self, command: MoveSlotCommand) -> Result<DraftView, ApplicationError> {
        self.mutate(|store| {
            let capacity = store.capacity();
            for index in [command.from, command.to] {
                if index >= capacity {
                    return Err(DomainError::SlotOutOfRange { index, capacity }.into());
                }
            }
            if store.layout().slots()[command.from].is_empty() {
                return Err(DomainError::EmptySlot(command.from).into());
            }
            store.reorder_slots(&move_order(capacity, command.from, command.to))
        })
    }

    pub fn show_slots(&self, _query: ShowSlotsQuery) -> Result<DraftView, ApplicationError> {
        let draft = self.load_draft()?;
        let store = self.open_store(&draft)?;
        Ok(self.view(&draft, &store))
    }

    /// Hands the draft's images over and forgets the draft. A listing needs
    /// a minimum number of images before it can be submitted.
    pub fn submit_draft(&self, command: SubmitDraftCommand) -> Result<SubmitReport, ApplicationError> {
        if command.outbox_dir.trim().is_empty() {
            return Err(ApplicationError::InvalidInput(
                "outbox directory must not be empty".to_string(),
            ));
        }
        let draft = self.load_draft()?;
        let store = self.open_store(&draft)?;
        if !store.meets_listing_minimum() {
            return Err(ApplicationError::InvalidInput(format!(
                "a listing needs at least {LISTING_MINIMUM_IMAGES} images, found {}",
                store.filled_count()
            )));
        }

        let submission = store.into_submission();
        let files: Vec<StoredLocalImage> = submission
            .new_files
            .into_iter()
            .map(|(file, location)| StoredLocalImage {
                file_name: file.file_name,
                bytes: file.bytes,
                location,
            })
            .collect();
        let written_files =
            self.outbox
                .write_files(&command.outbox_dir, &submission.existing_remote, &files)?;
        self.drafts.clear_draft()?;
        info!(files = written_files.len(), "draft submitted");

        Ok(SubmitReport {
            existing_remote: submission
                .existing_remote
                .into_iter()
                .map(|(image, _)| image)
                .collect(),
            written_files,
        })
    }

    pub fn cancel_draft(&self, _command: CancelDraftCommand) -> Result<(), ApplicationError> {
        self.drafts.clear_draft()?;
        info!("draft discarded");
        Ok(())
    }

    fn load_draft(&self) -> Result<StoredDraft, ApplicationError> {
        Ok(self.drafts.load_draft()?.unwrap_or_default())
    }

    fn mutate<F>(&self, change: F) -> Result<DraftView, ApplicationError>
    where
        F: FnOnce(&mut SlotStore) -> Result<(), ApplicationError>,
    {
        let draft = self.load_draft()?;
        let mut store = self.open_store(&draft)?;
        change(&mut store)?;
        self.save_store(draft.property_location, &store)?;
        Ok(self.view(&draft, &store))
    }

    /// Rebuilds a slot store from a stored draft. Local images get fresh
    /// preview handles owned by the returned store.
    fn open_store(&self, draft: &StoredDraft) -> Result<SlotStore, ApplicationError> {
        let mut locations = ImageLocationIndex::new();
        let mut remote = Vec::with_capacity(draft.existing_remote.len());
        for (image, location) in &draft.existing_remote {
            if let Some(point) = location {
                locations.insert(ImageKey::Remote(image.clone()), *point);
            }
            remote.push(image.clone());
        }

        let mut files = Vec::with_capacity(draft.new_images.len());
        let mut previews = Vec::with_capacity(draft.new_images.len());
        for stored in &draft.new_images {
            let preview = self.devices.previews.create(&stored.bytes);
            if let Some(point) = stored.location {
                locations.insert(ImageKey::Preview(preview), point);
            }
            files.push(LocalImage::jpeg(stored.file_name.clone(), stored.bytes.clone()));
            previews.push(preview);
        }

        let lists = BackingLists::from_parts(remote, files, previews)?;
        Ok(SlotStore::restore(
            lists,
            locations,
            self.capacity,
            self.devices.previews.clone(),
        ))
    }

    fn save_store(
        &self,
        property_location: Option<GeoPoint>,
        store: &SlotStore,
    ) -> Result<(), ApplicationError> {
        let lists = store.backing();
        let locations = store.locations();
        let draft = StoredDraft {
            property_location,
            existing_remote: lists
                .existing_remote()
                .iter()
                .map(|image| {
                    let location = locations.get(&ImageKey::Remote(image.clone()));
                    (image.clone(), location)
                })
                .collect(),
            new_images: lists
                .new_files()
                .iter()
                .zip(lists.new_previews())
                .map(|(file, preview)| StoredLocalImage {
                    file_name: file.file_name.clone(),
                    bytes: file.bytes.clone(),
                    location: locations.get(&ImageKey::Preview(*preview)),
                })
                .collect(),
        };
        self.drafts.save_draft(&draft)
    }

    fn view(&self, draft: &StoredDraft, store: &SlotStore) -> DraftView {
        let layout = store.layout();
        let badges = self.annotator.annotate(layout, draft.property_location);
        let slots = layout
            .slots()
            .iter()
            .enumerate()
            .map(|(index, slot)| SlotView {
                slot: index,
                source: slot.content.as_ref().map(|content| match content {
                    SlotContent::Remote(image) => SlotSource::Remote(image.clone()),
                    SlotContent::Local { file, .. } => SlotSource::Local {
                        file_name: file.file_name.clone(),
                        bytes: file.bytes.len(),
                    },
                }),
                location: slot.location,
                proximity: badges
                    .iter()
                    .find(|badge| badge.slot == index)
                    .map(|badge| badge.proximity),
            })
            .collect();

        DraftView {
            property_location: draft.property_location,
            slots,
            filled: store.filled_count(),
            overflow: layout.overflow(),
            meets_listing_minimum: store.meets_listing_minimum(),
        }
    }
}
