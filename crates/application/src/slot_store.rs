use std::sync::Arc;

use livi_media_domain::{
    reconstruct, reorder_backing, BackingLists, BackingRef, DomainError, GeoPoint, ImageKey,
    ImageLocationIndex, LocalImage, PreviewHandle, RemoteImage, SlotContent, SlotLayout,
    LISTING_MINIMUM_IMAGES, MAX_IMAGES,
};
use tracing::{debug, warn};

use crate::{ApplicationError, PreviewRegistry};

/// Images handed over when a draft is submitted, each with its capture
/// location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    pub existing_remote: Vec<(RemoteImage, Option<GeoPoint>)>,
    pub new_files: Vec<(LocalImage, Option<GeoPoint>)>,
}

/// Owns the backing lists of a listing and the preview handles of its local
/// captures. The slot layout is rebuilt after every mutation.
pub struct SlotStore {
    lists: BackingLists,
    locations: ImageLocationIndex,
    layout: SlotLayout,
    previews: Arc<dyn PreviewRegistry>,
}

impl SlotStore {
    pub fn new(previews: Arc<dyn PreviewRegistry>) -> Self {
        Self::with_capacity(MAX_IMAGES, previews)
    }

    pub fn with_capacity(capacity: usize, previews: Arc<dyn PreviewRegistry>) -> Self {
        Self::restore(
            BackingLists::new(),
            ImageLocationIndex::new(),
            capacity,
            previews,
        )
    }

    /// Edit mode: starts from the images already stored for a listing.
    pub fn with_existing(existing_remote: Vec<RemoteImage>, previews: Arc<dyn PreviewRegistry>) -> Self {
        Self::restore(
            BackingLists::with_existing(existing_remote),
            ImageLocationIndex::new(),
            MAX_IMAGES,
            previews,
        )
    }

    /// Takes ownership of the preview handles already present in `lists`.
    pub fn restore(
        lists: BackingLists,
        locations: ImageLocationIndex,
        capacity: usize,
        previews: Arc<dyn PreviewRegistry>,
    ) -> Self {
        let layout = reconstruct(&lists, &locations, capacity);
        if layout.overflow() > 0 {
            warn!(
                overflow = layout.overflow(),
                capacity, "listing holds more images than there are slots"
            );
        }
        Self {
            lists,
            locations,
            layout,
            previews,
        }
    }

    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    pub fn backing(&self) -> &BackingLists {
        &self.lists
    }

    pub fn locations(&self) -> &ImageLocationIndex {
        &self.locations
    }

    pub fn capacity(&self) -> usize {
        self.layout.capacity()
    }

    pub fn filled_count(&self) -> usize {
        self.layout.filled_count()
    }

    pub fn meets_listing_minimum(&self) -> bool {
        self.filled_count() >= LISTING_MINIMUM_IMAGES
    }

    fn refresh(&mut self) {
        self.layout = reconstruct(&self.lists, &self.locations, self.capacity());
    }

    fn check_index(&self, index: usize) -> Result<(), DomainError> {
        let capacity = self.capacity();
        if index >= capacity {
            return Err(DomainError::SlotOutOfRange { index, capacity });
        }
        Ok(())
    }

    /// Puts a new local capture into slot `index`.
    ///
    /// An empty slot appends to the local lists, a remote image is dropped
    /// from the remote list and the capture appended, and a local capture is
    /// overwritten in place. On error the incoming preview is released.
    pub fn fill_slot(
        &mut self,
        index: usize,
        file: LocalImage,
        preview: PreviewHandle,
        location: Option<GeoPoint>,
    ) -> Result<(), ApplicationError> {
        if let Err(error) = self.check_index(index) {
            self.previews.release(preview);
            return Err(error.into());
        }

        match self.lists.locate(index) {
            None => self.lists.push_local(file, preview),
            Some(BackingRef::Remote(remote_index)) => {
                if let Some(replaced) = self.lists.remove_remote(remote_index) {
                    self.locations.remove(&ImageKey::Remote(replaced));
                }
                self.lists.push_local(file, preview);
            }
            Some(BackingRef::Local(local_index)) => {
                if let Some(replaced) = self.lists.replace_local(local_index, file, preview) {
                    self.locations.remove(&ImageKey::Preview(replaced));
                    self.previews.release(replaced);
                }
            }
        }

        if let Some(point) = location {
            self.locations.insert(ImageKey::Preview(preview), point);
        }
        debug!(slot = index, %preview, geotagged = location.is_some(), "slot filled");
        self.refresh();
        Ok(())
    }

    /// First slot without an image, if the layout has room.
    pub fn next_empty_slot(&self) -> Option<usize> {
        let filled = self.lists.len();
        (filled < self.capacity()).then_some(filled)
    }

    /// Puts a capture into the next empty slot. A full store rejects it and
    /// releases the incoming preview.
    pub fn append(
        &mut self,
        file: LocalImage,
        preview: PreviewHandle,
        location: Option<GeoPoint>,
    ) -> Result<usize, ApplicationError> {
        let Some(index) = self.next_empty_slot() else {
            self.previews.release(preview);
            return Err(DomainError::CapacityExceeded(self.capacity()).into());
        };
        self.fill_slot(index, file, preview, location)?;
        Ok(index)
    }

    /// Clears slot `index`; later slots shift left.
    pub fn remove_slot(&mut self, index: usize) -> Result<SlotContent, ApplicationError> {
        self.check_index(index)?;
        let removed = match self.lists.locate(index) {
            None => return Err(DomainError::EmptySlot(index).into()),
            Some(BackingRef::Remote(remote_index)) => self
                .lists
                .remove_remote(remote_index)
                .map(SlotContent::Remote),
            Some(BackingRef::Local(local_index)) => {
                self.lists
                    .remove_local(local_index)
                    .map(|(file, preview)| {
                        self.previews.release(preview);
                        SlotContent::Local { file, preview }
                    })
            }
        }
        .ok_or(DomainError::EmptySlot(index))?;

        self.locations.remove(&removed.key());
        debug!(slot = index, "slot cleared");
        self.refresh();
        Ok(removed)
    }

    /// Applies a new slot ordering; `order[i]` is the current slot that
    /// moves to position `i`.
    ///
    /// Images that overflow the layout are not part of any slot and are
    /// dropped here.
    pub fn reorder_slots(&mut self, order: &[usize]) -> Result<(), ApplicationError> {
        let reordered = reorder_backing(&self.layout, order)?;
        if self.layout.overflow() > 0 {
            warn!(
                overflow = self.layout.overflow(),
                "dropping images that did not fit into a slot"
            );
            for index in self.capacity()..self.lists.len() {
                if let Some(BackingRef::Local(local_index)) = self.lists.locate(index) {
                    let preview = self.lists.new_previews()[local_index];
                    self.locations.remove(&ImageKey::Preview(preview));
                    self.previews.release(preview);
                }
                if let Some(BackingRef::Remote(remote_index)) = self.lists.locate(index) {
                    let image = self.lists.existing_remote()[remote_index].clone();
                    self.locations.remove(&ImageKey::Remote(image));
                }
            }
        }
        self.lists = reordered;
        self.refresh();
        Ok(())
    }

    /// Releases every local preview and clears the location index, handing
    /// back the backing lists. Their preview handles are no longer live.
    pub fn release_all(&mut self) -> BackingLists {
        let lists = std::mem::take(&mut self.lists);
        for preview in lists.new_previews() {
            self.previews.release(*preview);
        }
        self.locations.clear();
        self.refresh();
        lists
    }

    /// Pairs every image with its location and releases the store.
    pub fn into_submission(mut self) -> Submission {
        let existing_remote = self
            .lists
            .existing_remote()
            .iter()
            .map(|image| {
                let location = self.locations.get(&ImageKey::Remote(image.clone()));
                (image.clone(), location)
            })
            .collect();
        let locations: Vec<Option<GeoPoint>> = self
            .lists
            .new_previews()
            .iter()
            .map(|preview| self.locations.get(&ImageKey::Preview(*preview)))
            .collect();

        let (_, files, _) = self.release_all().into_parts();
        Submission {
            existing_remote,
            new_files: files.into_iter().zip(locations).collect(),
        }
    }
}

impl Drop for SlotStore {
    fn drop(&mut self) {
        for preview in self.lists.new_previews() {
            self.previews.release(*preview);
        }
    }
}
