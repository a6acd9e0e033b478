/// EXIF metadata extraction
///
/// Reads the tag block embedded in a JPEG and decodes it into a dictionary
/// keyed by human-readable tag names. GPS tags are nested under `GPSInfo`.
/// Unreadable files never fail the caller: they are logged and reported as
/// "no metadata".

use crate::error::{Error, Result};
use exif::{Context, Exif, In, Value};
use image::ImageFormat;
use std::collections::BTreeMap;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Key under which GPS sub-tags are nested
pub const GPS_INFO: &str = "GPSInfo";

/// A decoded tag value
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    /// ASCII strings, multiple components joined with a space
    Text(String),
    /// Any integer, rational or floating point components
    Numbers(Vec<f64>),
    /// Opaque bytes (UNDEFINED fields such as MakerNote)
    Bytes(Vec<u8>),
    /// A nested dictionary (only used for `GPSInfo`)
    Group(Metadata),
}

impl TagValue {
    /// The text of a `Text` value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The components of a `Numbers` value
    pub fn as_numbers(&self) -> Option<&[f64]> {
        match self {
            TagValue::Numbers(numbers) => Some(numbers),
            _ => None,
        }
    }

    /// The dictionary of a `Group` value
    pub fn as_group(&self) -> Option<&Metadata> {
        match self {
            TagValue::Group(group) => Some(group),
            _ => None,
        }
    }

    fn from_exif(value: &Value) -> Option<Self> {
        let decoded = match value {
            Value::Ascii(strings) => TagValue::Text(
                strings
                    .iter()
                    .map(|s| String::from_utf8_lossy(s).into_owned())
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            Value::Byte(v) => TagValue::Numbers(v.iter().map(|&n| f64::from(n)).collect()),
            Value::Short(v) => TagValue::Numbers(v.iter().map(|&n| f64::from(n)).collect()),
            Value::Long(v) => TagValue::Numbers(v.iter().map(|&n| f64::from(n)).collect()),
            Value::SByte(v) => TagValue::Numbers(v.iter().map(|&n| f64::from(n)).collect()),
            Value::SShort(v) => TagValue::Numbers(v.iter().map(|&n| f64::from(n)).collect()),
            Value::SLong(v) => TagValue::Numbers(v.iter().map(|&n| f64::from(n)).collect()),
            Value::Rational(v) => TagValue::Numbers(v.iter().map(|r| r.to_f64()).collect()),
            Value::SRational(v) => TagValue::Numbers(v.iter().map(|r| r.to_f64()).collect()),
            Value::Float(v) => TagValue::Numbers(v.iter().map(|&n| f64::from(n)).collect()),
            Value::Double(v) => TagValue::Numbers(v.clone()),
            Value::Undefined(bytes, _) => TagValue::Bytes(bytes.clone()),
            // Unknown field types carry no decodable payload
            _ => return None,
        };
        Some(decoded)
    }
}

/// Tag dictionary of one image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    tags: BTreeMap<String, TagValue>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: TagValue) {
        self.tags.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&TagValue> {
        self.tags.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// The nested `GPSInfo` dictionary, if the image has one
    pub fn gps(&self) -> Option<&Metadata> {
        self.get(GPS_INFO).and_then(TagValue::as_group)
    }

    /// Decode every primary-image field of a parsed EXIF block
    ///
    /// Thumbnail fields (IFD1) are skipped. Fields from the GPS IFD are
    /// collected into a `GPSInfo` group instead of the top level.
    pub fn from_exif(exif: &Exif) -> Self {
        let mut metadata = Metadata::new();
        let mut gps = Metadata::new();

        for field in exif.fields().filter(|f| f.ifd_num == In::PRIMARY) {
            let Some(value) = TagValue::from_exif(&field.value) else {
                continue;
            };

            // Tag's Display is its EXIF name, e.g. "GPSLatitude"
            let name = field.tag.to_string();
            if field.tag.context() == Context::Gps {
                gps.insert(name, value);
            } else {
                metadata.insert(name, value);
            }
        }

        if !gps.is_empty() {
            metadata.insert(GPS_INFO, TagValue::Group(gps));
        }

        metadata
    }
}

/// Result of reading one image: its path plus whatever metadata was found
#[derive(Debug, Clone)]
pub struct Extracted {
    pub path: PathBuf,
    /// `None` when the file could not be read, is not a JPEG, or has no EXIF
    pub metadata: Option<Metadata>,
}

/// Extract the metadata dictionary of one image
///
/// # Arguments
/// * `path` - Path to the JPEG file
///
/// # Returns
/// * The path and its metadata. Read failures are logged and reported as
///   `metadata: None`; they never abort the caller.
pub fn extract(path: &Path) -> Extracted {
    let metadata = match read_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            log::warn!("Error reading EXIF data from {}: {}", path.display(), e);
            None
        }
    };

    Extracted {
        path: path.to_path_buf(),
        metadata,
    }
}

/// Read and decode the EXIF block of a JPEG
///
/// Returns `Ok(None)` for a valid JPEG that simply carries no EXIF.
fn read_metadata(path: &Path) -> Result<Option<Metadata>> {
    let bytes = fs::read(path)?;

    // Sniff the content, the extension alone proves nothing
    if image::guess_format(&bytes).ok() != Some(ImageFormat::Jpeg) {
        return Err(Error::NotJpeg {
            path: path.to_path_buf(),
        });
    }

    match exif::Reader::new().read_from_container(&mut Cursor::new(&bytes)) {
        Ok(exif) => Ok(Some(Metadata::from_exif(&exif))),
        Err(exif::Error::NotFound(_)) => {
            log::debug!("No EXIF block in {}", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
