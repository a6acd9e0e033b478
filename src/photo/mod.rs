/// Photo scanning module
///
/// This module handles everything that happens per image:
/// - Finding JPEG files under the photo folder (discover.rs)
/// - Reading the embedded EXIF tag dictionary (metadata.rs)
/// - Turning GPS tags into decimal degrees (geolocation.rs)
/// - Composing the above into one unit of work (worker.rs)

pub mod discover;
pub mod metadata;
pub mod geolocation;
pub mod worker;

#[cfg(test)]
pub mod fixtures;
