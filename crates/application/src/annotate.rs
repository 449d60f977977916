use livi_media_domain::{GeoPoint, Proximity, SlotLayout, PROXIMITY_THRESHOLD_METERS};

/// Proximity badge shown on one filled slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotBadge {
    pub slot: usize,
    pub proximity: Proximity,
}

impl SlotBadge {
    pub fn label(&self) -> String {
        self.proximity.label()
    }

    pub fn is_flagged(&self) -> bool {
        matches!(self.proximity, Proximity::OutOfRange { .. })
    }
}

/// Compares where each photo was taken with the declared property location.
#[derive(Debug, Clone, Copy)]
pub struct DistanceAnnotator {
    threshold_meters: f64,
}

impl Default for DistanceAnnotator {
    fn default() -> Self {
        Self::new(PROXIMITY_THRESHOLD_METERS)
    }
}

impl DistanceAnnotator {
    pub fn new(threshold_meters: f64) -> Self {
        Self { threshold_meters }
    }

    pub fn threshold_meters(&self) -> f64 {
        self.threshold_meters
    }

    /// One badge per filled slot, in slot order. Empty slots get none.
    pub fn annotate(&self, layout: &SlotLayout, property: Option<GeoPoint>) -> Vec<SlotBadge> {
        layout
            .slots()
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.is_empty())
            .map(|(slot, image)| SlotBadge {
                slot,
                proximity: Proximity::classify(property, image.location, self.threshold_meters),
            })
            .collect()
    }
}
