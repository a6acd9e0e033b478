/// GPS tag decoding
///
/// Turns the `GPSInfo` group of a metadata dictionary into a signed
/// decimal-degree location. Partial GPS data counts as no GPS data.

use super::metadata::{Metadata, TagValue};

pub const GPS_LATITUDE: &str = "GPSLatitude";
pub const GPS_LATITUDE_REF: &str = "GPSLatitudeRef";
pub const GPS_LONGITUDE: &str = "GPSLongitude";
pub const GPS_LONGITUDE_REF: &str = "GPSLongitudeRef";

/// Reference that keeps a latitude positive
pub const NORTH: &str = "N";
/// Reference that keeps a longitude positive
pub const EAST: &str = "E";

/// A degrees/minutes/seconds triple
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dms {
    pub degrees: f64,
    pub minutes: f64,
    pub seconds: f64,
}

impl Dms {
    pub fn new(degrees: f64, minutes: f64, seconds: f64) -> Self {
        Self { degrees, minutes, seconds }
    }

    /// Build a triple from tag components, exactly three are required
    pub fn from_components(components: &[f64]) -> Option<Self> {
        match components {
            [degrees, minutes, seconds] => Some(Self::new(*degrees, *minutes, *seconds)),
            _ => None,
        }
    }

    /// Unsigned decimal degrees
    ///
    /// No range check: out-of-range or non-finite components (a zero
    /// denominator in the EXIF rational) flow straight through.
    pub fn to_decimal(&self) -> f64 {
        self.degrees + self.minutes / 60.0 + self.seconds / 3600.0
    }
}

/// Negate `value` unless `reference` is exactly `positive`
///
/// Any other value, including malformed ones like "n" or "X", means the
/// southern/western hemisphere.
pub fn apply_reference(value: f64, reference: &str, positive: &str) -> f64 {
    if reference == positive {
        value
    } else {
        -value
    }
}

/// A signed location in decimal degrees (South and West negative)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geolocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Resolve the location of an image from its metadata
///
/// # Returns
/// * `Some` only when `GPSInfo` holds both triples and both reference
///   flags; `None` otherwise
pub fn resolve(metadata: &Metadata) -> Option<Geolocation> {
    let gps = metadata.gps()?;

    let latitude = triple(gps, GPS_LATITUDE)?;
    let latitude_ref = reference(gps, GPS_LATITUDE_REF)?;
    let longitude = triple(gps, GPS_LONGITUDE)?;
    let longitude_ref = reference(gps, GPS_LONGITUDE_REF)?;

    Some(Geolocation {
        latitude: apply_reference(latitude.to_decimal(), latitude_ref, NORTH),
        longitude: apply_reference(longitude.to_decimal(), longitude_ref, EAST),
    })
}

fn triple(gps: &Metadata, name: &str) -> Option<Dms> {
    gps.get(name)
        .and_then(TagValue::as_numbers)
        .and_then(Dms::from_components)
}

/// An empty reference is as good as a missing one
fn reference<'a>(gps: &'a Metadata, name: &str) -> Option<&'a str> {
    gps.get(name)
        .and_then(TagValue::as_text)
        .filter(|text| !text.is_empty())
}
