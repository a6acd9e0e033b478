/// Shared data structures for the output dataset
///
/// These structs represent the data model that flows from the
/// per-image workers to the GeoPackage writer.

use geo_types::{coord, Point, Rect};

/// EPSG code of WGS 84, the CRS of every record
pub const WGS84_SRS_ID: i32 = 4326;

/// One geotagged image
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Location of the image, x = longitude, y = latitude
    pub point: Point<f64>,
    /// Full path to the source JPEG (e.g., "/photos/2023/IMG_0001.jpg")
    pub filename: String,
}

impl Record {
    pub fn new(longitude: f64, latitude: f64, filename: impl Into<String>) -> Self {
        Self {
            point: Point::new(longitude, latitude),
            filename: filename.into(),
        }
    }

    pub fn longitude(&self) -> f64 {
        self.point.x()
    }

    pub fn latitude(&self) -> f64 {
        self.point.y()
    }
}

/// Bounding box of all record points, `None` for an empty slice
pub fn bounds(records: &[Record]) -> Option<Rect<f64>> {
    let first = records.first()?;
    let (mut min_x, mut min_y) = (first.longitude(), first.latitude());
    let (mut max_x, mut max_y) = (min_x, min_y);

    for record in &records[1..] {
        min_x = min_x.min(record.longitude());
        min_y = min_y.min(record.latitude());
        max_x = max_x.max(record.longitude());
        max_y = max_y.max(record.latitude());
    }

    Some(Rect::new(
        coord! { x: min_x, y: min_y },
        coord! { x: max_x, y: max_y },
    ))
}
