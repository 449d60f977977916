use livi_media_application::{CaptureReport, DraftView, SlotSource, SlotView, SubmitReport};
use livi_media_domain::{GeoPoint, ResolvedLocation, LISTING_MINIMUM_IMAGES};

fn present_point(point: &GeoPoint) -> String {
    format!("{:.6},{:.6}", point.latitude, point.longitude)
}

pub fn present_slot_row(slot: &SlotView) -> String {
    let source = match &slot.source {
        None => return format!("{}\t(empty)", slot.slot),
        Some(SlotSource::Remote(image)) => format!("remote\t{}", image.as_str()),
        Some(SlotSource::Local { file_name, bytes }) => format!("local\t{file_name} ({bytes} bytes)"),
    };
    let location = slot
        .location
        .as_ref()
        .map(present_point)
        .unwrap_or_else(|| "-".to_string());
    let badge = slot
        .proximity
        .map(|proximity| proximity.label())
        .unwrap_or_default();
    format!("{}\t{source}\t{location}\t{badge}", slot.slot)
}

pub fn present_draft(view: &DraftView) -> Vec<String> {
    let mut lines = Vec::with_capacity(view.slots.len() + 2);
    lines.push(format!(
        "property location: {}",
        view.property_location
            .as_ref()
            .map(present_point)
            .unwrap_or_else(|| "not set".to_string())
    ));
    lines.extend(view.slots.iter().map(present_slot_row));
    let mut summary = format!(
        "{} of {} slots filled ({})",
        view.filled,
        view.slots.len(),
        if view.meets_listing_minimum {
            "ready to submit".to_string()
        } else {
            format!("needs at least {LISTING_MINIMUM_IMAGES}")
        }
    );
    if view.overflow > 0 {
        summary.push_str(&format!(", {} images do not fit", view.overflow));
    }
    lines.push(summary);
    lines
}

pub fn present_capture(report: &CaptureReport) -> String {
    let location = report
        .location
        .as_ref()
        .map(present_point)
        .unwrap_or_else(|| "no location".to_string());
    format!(
        "captured {} into slot {} at {location} ({})",
        report.file_name,
        report.slot,
        report.proximity.label()
    )
}

pub fn present_location(location: &ResolvedLocation) -> String {
    format!(
        "{}\t{}\t{}",
        present_point(&location.point),
        location.address,
        location.place_name
    )
}

pub fn present_submit(report: &SubmitReport) -> Vec<String> {
    let mut lines = vec![format!(
        "submitted {} existing and {} new images",
        report.existing_remote.len(),
        report.written_files.len()
    )];
    lines.extend(report.written_files.iter().map(|path| format!("  {path}")));
    lines
}
