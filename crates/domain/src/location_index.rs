use std::collections::BTreeMap;

use crate::{GeoPoint, ImageKey};

/// Capture locations kept outside the slot array so they survive slot
/// reconstruction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageLocationIndex {
    entries: BTreeMap<ImageKey, GeoPoint>,
}

impl ImageLocationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ImageKey, point: GeoPoint) -> Option<GeoPoint> {
        self.entries.insert(key, point)
    }

    pub fn get(&self, key: &ImageKey) -> Option<GeoPoint> {
        self.entries.get(key).copied()
    }

    pub fn remove(&mut self, key: &ImageKey) -> Option<GeoPoint> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ImageKey, &GeoPoint)> {
        self.entries.iter()
    }
}
