use std::io::Cursor;

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use livi_media_application::{ApplicationError, GeotagWriter};
use livi_media_domain::GeoPoint;

const SOI: [u8; 2] = [0xFF, 0xD8];
const APP0: u8 = 0xE0;
const APP1: u8 = 0xE1;
const SOS: u8 = 0xDA;
const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Embeds GPS position tags into a JPEG's Exif segment, replacing any Exif
/// data already present.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifGeotagWriter;

impl GeotagWriter for ExifGeotagWriter {
    fn embed_location(&self, jpeg: &[u8], point: GeoPoint) -> Result<Vec<u8>, ApplicationError> {
        let tiff = gps_tiff(point)?;
        insert_exif_segment(jpeg, &tiff)
    }
}

/// Degrees, minutes and hundredths of seconds, as cameras write them.
fn to_dms(value: f64) -> Vec<Rational> {
    let value = value.abs();
    let degrees = value.floor();
    let minutes = (value - degrees) * 60.0;
    let seconds = (minutes - minutes.floor()) * 60.0;
    vec![
        Rational {
            num: degrees as u32,
            denom: 1,
        },
        Rational {
            num: minutes.floor() as u32,
            denom: 1,
        },
        Rational {
            num: (seconds * 100.0).round() as u32,
            denom: 100,
        },
    ]
}

fn ascii(value: &str) -> Value {
    Value::Ascii(vec![value.as_bytes().to_vec()])
}

fn gps_tiff(point: GeoPoint) -> Result<Vec<u8>, ApplicationError> {
    let latitude_ref = if point.latitude >= 0.0 { "N" } else { "S" };
    let longitude_ref = if point.longitude >= 0.0 { "E" } else { "W" };
    let fields = [
        Field {
            tag: Tag::GPSVersionID,
            ifd_num: In::PRIMARY,
            value: Value::Byte(vec![2, 2, 0, 0]),
        },
        Field {
            tag: Tag::GPSLatitudeRef,
            ifd_num: In::PRIMARY,
            value: ascii(latitude_ref),
        },
        Field {
            tag: Tag::GPSLatitude,
            ifd_num: In::PRIMARY,
            value: Value::Rational(to_dms(point.latitude)),
        },
        Field {
            tag: Tag::GPSLongitudeRef,
            ifd_num: In::PRIMARY,
            value: ascii(longitude_ref),
        },
        Field {
            tag: Tag::GPSLongitude,
            ifd_num: In::PRIMARY,
            value: Value::Rational(to_dms(point.longitude)),
        },
    ];

    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer
        .write(&mut tiff, false)
        .map_err(|error| ApplicationError::Encode(error.to_string()))?;
    Ok(tiff.into_inner())
}

struct Segment {
    marker: u8,
    start: usize,
    end: usize,
}

fn header_segments(jpeg: &[u8]) -> Result<(Vec<Segment>, usize), ApplicationError> {
    let truncated = || ApplicationError::Encode("truncated JPEG header".to_string());
    let mut segments = Vec::new();
    let mut offset = SOI.len();
    loop {
        if offset + 4 > jpeg.len() || jpeg[offset] != 0xFF {
            return Err(truncated());
        }
        let marker = jpeg[offset + 1];
        if marker == SOS {
            return Ok((segments, offset));
        }
        let length = u16::from_be_bytes([jpeg[offset + 2], jpeg[offset + 3]]) as usize;
        let end = offset + 2 + length;
        if length < 2 || end > jpeg.len() {
            return Err(truncated());
        }
        segments.push(Segment {
            marker,
            start: offset,
            end,
        });
        offset = end;
    }
}

/// Writes `tiff` as the APP1 Exif segment, directly after SOI or after a
/// leading JFIF APP0. Existing Exif segments are dropped.
fn insert_exif_segment(jpeg: &[u8], tiff: &[u8]) -> Result<Vec<u8>, ApplicationError> {
    if !jpeg.starts_with(&SOI) {
        return Err(ApplicationError::Encode(
            "data is not a JPEG image".to_string(),
        ));
    }
    let length = u16::try_from(2 + EXIF_HEADER.len() + tiff.len())
        .map_err(|_| ApplicationError::Encode("Exif data does not fit a segment".to_string()))?;

    let (segments, scan_start) = header_segments(jpeg)?;
    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&SOI);

    let write_exif = |out: &mut Vec<u8>| {
        out.extend_from_slice(&[0xFF, APP1]);
        out.extend_from_slice(&length.to_be_bytes());
        out.extend_from_slice(EXIF_HEADER);
        out.extend_from_slice(tiff);
    };
    let after_app0 = segments.first().is_some_and(|first| first.marker == APP0);
    if !after_app0 {
        write_exif(&mut out);
    }
    for (index, segment) in segments.iter().enumerate() {
        let body = &jpeg[segment.start + 4..segment.end];
        if segment.marker == APP1 && body.starts_with(EXIF_HEADER) {
            continue;
        }
        out.extend_from_slice(&jpeg[segment.start..segment.end]);
        if after_app0 && index == 0 {
            write_exif(&mut out);
        }
    }
    out.extend_from_slice(&jpeg[scan_start..]);
    Ok(out)
}

fn coordinate(exif: &exif::Exif, value_tag: Tag, ref_tag: Tag, negative: u8) -> Option<f64> {
    let value = exif.get_field(value_tag, In::PRIMARY)?;
    let reference = exif.get_field(ref_tag, In::PRIMARY)?;
    let rationals = match &value.value {
        Value::Rational(rationals) if rationals.len() >= 3 => rationals,
        _ => return None,
    };
    let magnitude =
        rationals[0].to_f64() + rationals[1].to_f64() / 60.0 + rationals[2].to_f64() / 3600.0;
    let is_negative = match &reference.value {
        Value::Ascii(parts) => parts.first().and_then(|part| part.first()) == Some(&negative),
        _ => false,
    };
    Some(if is_negative { -magnitude } else { magnitude })
}

/// Reads the GPS position back out of a JPEG, if it carries one.
pub fn read_location(jpeg: &[u8]) -> Option<GeoPoint> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(jpeg))
        .ok()?;
    Some(GeoPoint {
        latitude: coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, b'S')?,
        longitude: coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, b'W')?,
    })
}
