/// Output dataset module
///
/// This module handles the geospatial output, including:
/// - The point records collected from geotagged images (data.rs)
/// - Serializing them into a GeoPackage file (geopackage.rs)

pub mod data;
pub mod geopackage;
