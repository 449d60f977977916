use std::collections::HashSet;

use crate::{
    BackingLists, DomainError, GeoPoint, ImageKey, ImageLocationIndex, LocalImage,
    PreviewHandle, RemoteImage,
};

/// Number of image slots a listing offers.
pub const MAX_IMAGES: usize = 10;

/// Minimum number of images before a listing can be published.
pub const LISTING_MINIMUM_IMAGES: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum SlotContent {
    Remote(RemoteImage),
    Local {
        file: LocalImage,
        preview: PreviewHandle,
    },
}

impl SlotContent {
    pub fn key(&self) -> ImageKey {
        match self {
            Self::Remote(image) => ImageKey::Remote(image.clone()),
            Self::Local { preview, .. } => ImageKey::Preview(*preview),
        }
    }

    pub fn local_file(&self) -> Option<&LocalImage> {
        match self {
            Self::Remote(_) => None,
            Self::Local { file, .. } => Some(file),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageSlot {
    pub content: Option<SlotContent>,
    pub location: Option<GeoPoint>,
}

impl ImageSlot {
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }
}

/// Fixed-length, gap-free view over the backing lists.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotLayout {
    slots: Vec<ImageSlot>,
    overflow: usize,
}

impl SlotLayout {
    pub fn empty(capacity: usize) -> Self {
        Self {
            slots: vec![ImageSlot::default(); capacity],
            overflow: 0,
        }
    }

    pub fn slots(&self) -> &[ImageSlot] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&ImageSlot> {
        self.slots.get(index)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_empty()).count()
    }

    /// Backing entries that did not fit into the layout.
    pub fn overflow(&self) -> usize {
        self.overflow
    }
}

/// Rebuilds the slot view from the backing lists.
///
/// Remote images fill the first slots, then local captures. Locations are
/// looked up in the side index. Entries past `capacity` are not placed and
/// are counted in [`SlotLayout::overflow`].
pub fn reconstruct(
    lists: &BackingLists,
    locations: &ImageLocationIndex,
    capacity: usize,
) -> SlotLayout {
    let mut layout = SlotLayout::empty(capacity);

    let remote = lists
        .existing_remote()
        .iter()
        .map(|image| SlotContent::Remote(image.clone()));
    let local = lists
        .new_files()
        .iter()
        .zip(lists.new_previews())
        .map(|(file, preview)| SlotContent::Local {
            file: file.clone(),
            preview: *preview,
        });

    for (index, content) in remote.chain(local).enumerate() {
        if index >= capacity {
            layout.overflow += 1;
            continue;
        }
        let location = locations.get(&content.key());
        layout.slots[index] = ImageSlot {
            content: Some(content),
            location,
        };
    }

    layout
}

/// Rebuilds the backing lists from a new ordering of slot positions.
///
/// `order[i]` names the current slot that moves to position `i`. Every
/// filled slot must appear exactly once; empty slots may be included or
/// left out. A slot carrying a local file goes to the local lists, every
/// other filled slot to the remote list.
pub fn reorder_backing(layout: &SlotLayout, order: &[usize]) -> Result<BackingLists, DomainError> {
    let capacity = layout.capacity();
    if order.len() > capacity {
        return Err(DomainError::InvalidOrder(format!(
            "{} positions given for {capacity} slots",
            order.len()
        )));
    }

    let mut seen = HashSet::with_capacity(order.len());
    for &index in order {
        if index >= capacity {
            return Err(DomainError::SlotOutOfRange { index, capacity });
        }
        if !seen.insert(index) {
            return Err(DomainError::InvalidOrder(format!(
                "slot {index} appears more than once"
            )));
        }
    }
    if let Some(missing) = (0..capacity).find(|index| {
        !seen.contains(index) && layout.slots[*index].content.is_some()
    }) {
        return Err(DomainError::InvalidOrder(format!(
            "filled slot {missing} is missing"
        )));
    }

    let mut lists = BackingLists::new();
    for &index in order {
        match &layout.slots[index].content {
            Some(SlotContent::Local { file, preview }) => lists.push_local(file.clone(), *preview),
            Some(SlotContent::Remote(image)) => lists.push_remote(image.clone()),
            None => {}
        }
    }
    Ok(lists)
}

/// Moves the element at `from` to `to`, shifting the elements in between.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() || to >= items.len() || from == to {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}
