/// Per-image unit of work
///
/// File path in, optional record out. Every failure along the way
/// (unreadable file, no EXIF, partial GPS) collapses to `None`.

use super::geolocation;
use super::metadata;
use crate::dataset::data::Record;
use std::path::Path;

/// Process one image into a point record
pub fn process_image(path: &Path) -> Option<Record> {
    let extracted = metadata::extract(path);
    let location = geolocation::resolve(extracted.metadata.as_ref()?)?;

    Some(Record::new(
        location.longitude,
        location.latitude,
        extracted.path.to_string_lossy(),
    ))
}
