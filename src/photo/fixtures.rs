/// In-memory JPEG fixtures for tests
///
/// Builds the smallest file the EXIF reader accepts:
/// SOI, an APP1 "Exif" segment holding a little-endian TIFF structure
/// (IFD0 with a Make tag and an optional GPS IFD), then EOI.

use std::fs;
use std::path::{Path, PathBuf};

pub const CAMERA_MAKE: &str = "TestCam";

const TYPE_ASCII: u16 = 2;
const TYPE_LONG: u16 = 4;
const TYPE_RATIONAL: u16 = 5;

const TAG_MAKE: u16 = 0x010F;
const TAG_GPS_POINTER: u16 = 0x8825;
const TAG_GPS_LATITUDE_REF: u16 = 0x0001;
const TAG_GPS_LATITUDE: u16 = 0x0002;
const TAG_GPS_LONGITUDE_REF: u16 = 0x0003;
const TAG_GPS_LONGITUDE: u16 = 0x0004;

/// TIFF header is 8 bytes, IFD0 follows immediately
const IFD0_OFFSET: u32 = 8;

/// Degrees, minutes, seconds as (numerator, denominator) rationals
pub type RationalDms = [(u32, u32); 3];

/// Which GPS fields to write; `None` leaves the field out
#[derive(Debug, Clone, Default)]
pub struct GpsFixture {
    pub latitude: Option<RationalDms>,
    pub latitude_ref: Option<&'static str>,
    pub longitude: Option<RationalDms>,
    pub longitude_ref: Option<&'static str>,
}

impl GpsFixture {
    /// No GPS IFD at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// 35°39'29.16"N 139°44'43.56"E
    pub fn tokyo() -> Self {
        Self {
            latitude: Some([(35, 1), (39, 1), (2916, 100)]),
            latitude_ref: Some("N"),
            longitude: Some([(139, 1), (44, 1), (4356, 100)]),
            longitude_ref: Some("E"),
        }
    }

    /// 33°52'7.68"S 151°12'33.48"E
    pub fn sydney() -> Self {
        Self {
            latitude: Some([(33, 1), (52, 1), (768, 100)]),
            latitude_ref: Some("S"),
            longitude: Some([(151, 1), (12, 1), (3348, 100)]),
            longitude_ref: Some("E"),
        }
    }

    /// 40°42'46"N 74°0'21.6"W
    pub fn new_york() -> Self {
        Self {
            latitude: Some([(40, 1), (42, 1), (46, 1)]),
            latitude_ref: Some("N"),
            longitude: Some([(74, 1), (0, 1), (216, 10)]),
            longitude_ref: Some("W"),
        }
    }

    fn has_any(&self) -> bool {
        self.latitude.is_some()
            || self.latitude_ref.is_some()
            || self.longitude.is_some()
            || self.longitude_ref.is_some()
    }
}

struct Entry {
    tag: u16,
    typ: u16,
    count: u32,
    data: Vec<u8>,
}

impl Entry {
    fn ascii(tag: u16, text: &str) -> Self {
        let mut data = text.as_bytes().to_vec();
        data.push(0);
        Self { tag, typ: TYPE_ASCII, count: data.len() as u32, data }
    }

    fn long(tag: u16, value: u32) -> Self {
        Self { tag, typ: TYPE_LONG, count: 1, data: value.to_le_bytes().to_vec() }
    }

    fn rationals(tag: u16, values: &RationalDms) -> Self {
        let mut data = Vec::with_capacity(24);
        for (num, denom) in values {
            data.extend_from_slice(&num.to_le_bytes());
            data.extend_from_slice(&denom.to_le_bytes());
        }
        Self { tag, typ: TYPE_RATIONAL, count: 3, data }
    }
}

/// Serialize one IFD located at `offset`, values that don't fit inline
/// are appended right after the IFD
fn ifd_bytes(entries: &[Entry], offset: u32) -> Vec<u8> {
    let table_len = 2 + 12 * entries.len() as u32 + 4;
    let mut table = Vec::new();
    let mut extra = Vec::new();

    table.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for entry in entries {
        table.extend_from_slice(&entry.tag.to_le_bytes());
        table.extend_from_slice(&entry.typ.to_le_bytes());
        table.extend_from_slice(&entry.count.to_le_bytes());
        if entry.data.len() <= 4 {
            let mut inline = entry.data.clone();
            inline.resize(4, 0);
            table.extend_from_slice(&inline);
        } else {
            let value_offset = offset + table_len + extra.len() as u32;
            table.extend_from_slice(&value_offset.to_le_bytes());
            extra.extend_from_slice(&entry.data);
            // Value offsets must stay word aligned
            if extra.len() % 2 == 1 {
                extra.push(0);
            }
        }
    }
    // No next IFD
    table.extend_from_slice(&0u32.to_le_bytes());

    table.extend_from_slice(&extra);
    table
}

/// Build the TIFF structure carried by the APP1 segment
pub fn exif_tiff(gps: &GpsFixture) -> Vec<u8> {
    let mut ifd0 = vec![Entry::ascii(TAG_MAKE, CAMERA_MAKE)];
    let mut gps_entries = Vec::new();

    if gps.has_any() {
        if let Some(reference) = gps.latitude_ref {
            gps_entries.push(Entry::ascii(TAG_GPS_LATITUDE_REF, reference));
        }
        if let Some(latitude) = &gps.latitude {
            gps_entries.push(Entry::rationals(TAG_GPS_LATITUDE, latitude));
        }
        if let Some(reference) = gps.longitude_ref {
            gps_entries.push(Entry::ascii(TAG_GPS_LONGITUDE_REF, reference));
        }
        if let Some(longitude) = &gps.longitude {
            gps_entries.push(Entry::rationals(TAG_GPS_LONGITUDE, longitude));
        }

        // Placeholder pointer first to measure IFD0, then patch it
        ifd0.push(Entry::long(TAG_GPS_POINTER, 0));
        let ifd0_len = ifd_bytes(&ifd0, IFD0_OFFSET).len() as u32;
        let gps_offset = IFD0_OFFSET + ifd0_len;
        ifd0.pop();
        ifd0.push(Entry::long(TAG_GPS_POINTER, gps_offset));
    }

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&IFD0_OFFSET.to_le_bytes());
    tiff.extend_from_slice(&ifd_bytes(&ifd0, IFD0_OFFSET));

    if !gps_entries.is_empty() {
        let gps_offset = tiff.len() as u32;
        tiff.extend_from_slice(&ifd_bytes(&gps_entries, gps_offset));
    }

    tiff
}

/// A JPEG whose EXIF carries the given GPS fields
pub fn jpeg_with_gps(gps: &GpsFixture) -> Vec<u8> {
    let tiff = exif_tiff(gps);
    let segment_len = (2 + 6 + tiff.len()) as u16;

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&segment_len.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

/// A JPEG with a JFIF header and no EXIF segment
pub fn jpeg_without_exif() -> Vec<u8> {
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    jpeg.extend_from_slice(b"JFIF\0");
    jpeg.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

/// A JPEG cut off in the middle of its EXIF segment
pub fn truncated_jpeg() -> Vec<u8> {
    let mut jpeg = jpeg_with_gps(&GpsFixture::tokyo());
    jpeg.truncate(40);
    jpeg
}

/// Write `bytes` to `dir/name`, creating parent directories
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, bytes).unwrap();
    path
}
