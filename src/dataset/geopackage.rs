/// GeoPackage writer
///
/// A GeoPackage is a SQLite database with a fixed set of metadata tables.
/// The whole dataset is written in one go at the end of a run: the file is
/// recreated from scratch, never updated in place.

use super::data::{bounds, Record, WGS84_SRS_ID};
use crate::error::Result;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};

/// "GPKG" in ASCII, stored in the SQLite header
const APPLICATION_ID: i32 = 0x4750_4B47;
/// GeoPackage 1.2
const USER_VERSION: i32 = 10200;

/// Name of the geometry column of the point layer
pub const GEOMETRY_COLUMN: &str = "geometry";
/// Name of the source path column of the point layer
pub const FILENAME_COLUMN: &str = "filename";
/// Layer name used when the output path has no usable stem
const DEFAULT_LAYER: &str = "images";

const WGS84_DEFINITION: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AXIS["Latitude",NORTH],AXIS["Longitude",EAST],AUTHORITY["EPSG","4326"]]"#;

/// Write `records` as a point layer to a new GeoPackage at `path`
///
/// # Returns
/// * `Ok(false)` when there is nothing to write; no file is created
/// * `Ok(true)` once the GeoPackage is committed to disk
/// * `Err` if any step fails; no file is left at `path`
pub fn write_geopackage(records: &[Record], path: &Path) -> Result<bool> {
    if records.is_empty() {
        log::info!("No records, skipping {}", path.display());
        return Ok(false);
    }

    let layer = layer_name(path);
    let written = GeoPackage::create(path).and_then(|mut gpkg| gpkg.write(&layer, records));

    if let Err(e) = written {
        // Never leave a half-initialized database behind
        if path.is_file() {
            if let Err(cleanup) = fs::remove_file(path) {
                log::warn!("Could not remove {}: {}", path.display(), cleanup);
            }
        }
        return Err(e);
    }

    Ok(true)
}

/// Layer name for an output path, like a GeoPackage driver picks it:
/// `photos/output.gpkg` → `output`
///
/// Stems that would collide with the GeoPackage or SQLite system tables
/// (`gpkg_*`, `sqlite_*`, in any case) fall back to `images`.
pub fn layer_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty() && !is_reserved_name(stem))
        .unwrap_or_else(|| DEFAULT_LAYER.to_string())
}

/// Table name prefixes owned by GeoPackage and SQLite
const RESERVED_PREFIXES: [&str; 2] = ["gpkg_", "sqlite_"];

fn is_reserved_name(name: &str) -> bool {
    let name = name.to_lowercase();
    RESERVED_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// An open GeoPackage being written
pub struct GeoPackage {
    conn: Connection,
    path: PathBuf,
}

impl GeoPackage {
    /// Open a fresh, empty database, replacing any file already at `path`
    pub fn create(path: &Path) -> Result<Self> {
        if path.exists() {
            fs::remove_file(path)?;
        }

        let conn = Connection::open(path)?;
        Ok(GeoPackage {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Write the GeoPackage tables and a point layer holding every record
    ///
    /// Everything happens in one transaction: on error the database is
    /// left without a single table.
    pub fn write(&mut self, layer: &str, records: &[Record]) -> Result<()> {
        let tx = self.conn.transaction()?;

        init_schema(&tx)?;
        write_layer(&tx, layer, records)?;

        tx.commit()?;
        log::info!(
            "Wrote {} points to layer '{}' in {}",
            records.len(),
            layer,
            self.path.display()
        );

        Ok(())
    }
}

/// Create the mandatory GeoPackage tables and spatial reference systems
fn init_schema(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "application_id", APPLICATION_ID)?;
    conn.pragma_update(None, "user_version", USER_VERSION)?;

    conn.execute(
        "CREATE TABLE gpkg_spatial_ref_sys (
            srs_name                 TEXT NOT NULL,
            srs_id                   INTEGER PRIMARY KEY,
            organization             TEXT NOT NULL,
            organization_coordsys_id INTEGER NOT NULL,
            definition               TEXT NOT NULL,
            description              TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE gpkg_contents (
            table_name  TEXT NOT NULL PRIMARY KEY,
            data_type   TEXT NOT NULL,
            identifier  TEXT UNIQUE,
            description TEXT DEFAULT '',
            last_change DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            min_x       DOUBLE,
            min_y       DOUBLE,
            max_x       DOUBLE,
            max_y       DOUBLE,
            srs_id      INTEGER,
            CONSTRAINT fk_gc_r_srs_id FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE gpkg_geometry_columns (
            table_name         TEXT NOT NULL,
            column_name        TEXT NOT NULL,
            geometry_type_name TEXT NOT NULL,
            srs_id             INTEGER NOT NULL,
            z                  TINYINT NOT NULL,
            m                  TINYINT NOT NULL,
            CONSTRAINT pk_geom_cols PRIMARY KEY (table_name, column_name),
            CONSTRAINT uk_gc_table_name UNIQUE (table_name),
            CONSTRAINT fk_gc_tn FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name),
            CONSTRAINT fk_gc_srs FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
        )",
        [],
    )?;

    // The three systems every GeoPackage must define
    let mut insert_srs = conn.prepare(
        "INSERT INTO gpkg_spatial_ref_sys
            (srs_name, srs_id, organization, organization_coordsys_id, definition, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    insert_srs.execute(params![
        "Undefined cartesian SRS",
        -1,
        "NONE",
        -1,
        "undefined",
        "undefined cartesian coordinate reference system"
    ])?;
    insert_srs.execute(params![
        "Undefined geographic SRS",
        0,
        "NONE",
        0,
        "undefined",
        "undefined geographic coordinate reference system"
    ])?;
    insert_srs.execute(params![
        "WGS 84 geodetic",
        WGS84_SRS_ID,
        "EPSG",
        WGS84_SRS_ID,
        WGS84_DEFINITION,
        "longitude/latitude coordinates in decimal degrees on the WGS 84 spheroid"
    ])?;

    log::debug!("GeoPackage schema initialized");
    Ok(())
}

/// Create the feature table and register it, rows in collection order
fn write_layer(conn: &Connection, layer: &str, records: &[Record]) -> Result<()> {
    let table = quote_identifier(layer);

    conn.execute(
        &format!(
            "CREATE TABLE {table} (
                fid      INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                {GEOMETRY_COLUMN} POINT,
                {FILENAME_COLUMN} TEXT
            )"
        ),
        [],
    )?;

    let (min_x, min_y, max_x, max_y) = match bounds(records) {
        Some(rect) => (
            Some(rect.min().x),
            Some(rect.min().y),
            Some(rect.max().x),
            Some(rect.max().y),
        ),
        None => (None, None, None, None),
    };
    let last_change = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();

    conn.execute(
        "INSERT INTO gpkg_contents
            (table_name, data_type, identifier, description, last_change,
             min_x, min_y, max_x, max_y, srs_id)
         VALUES (?1, 'features', ?1, '', ?2, ?3, ?4, ?5, ?6, ?7)",
        params![layer, last_change, min_x, min_y, max_x, max_y, WGS84_SRS_ID],
    )?;

    conn.execute(
        "INSERT INTO gpkg_geometry_columns
            (table_name, column_name, geometry_type_name, srs_id, z, m)
         VALUES (?1, ?2, 'POINT', ?3, 0, 0)",
        params![layer, GEOMETRY_COLUMN, WGS84_SRS_ID],
    )?;

    let mut insert = conn.prepare(&format!(
        "INSERT INTO {table} ({GEOMETRY_COLUMN}, {FILENAME_COLUMN}) VALUES (?1, ?2)"
    ))?;
    for record in records {
        insert.execute(params![point_blob(record, WGS84_SRS_ID), record.filename])?;
    }

    Ok(())
}

/// Encode a record's point as a GeoPackage geometry blob
///
/// Layout: "GP", version 0, flags 0x01 (little-endian, no envelope,
/// standard binary), srs_id as i32, then a little-endian WKB Point.
pub fn point_blob(record: &Record, srs_id: i32) -> Vec<u8> {
    let mut blob = Vec::with_capacity(8 + 21);
    blob.extend_from_slice(b"GP");
    blob.push(0);
    blob.push(0x01);
    blob.extend_from_slice(&srs_id.to_le_bytes());

    // WKB: byte order, geometry type 1 (Point), x, y
    blob.push(0x01);
    blob.extend_from_slice(&1u32.to_le_bytes());
    blob.extend_from_slice(&record.point.x().to_le_bytes());
    blob.extend_from_slice(&record.point.y().to_le_bytes());
    blob
}

/// Quote a layer name for use as an SQL identifier
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Decode a blob written by `point_blob` into (srs_id, x, y)
#[cfg(test)]
pub fn decode_point_blob(blob: &[u8]) -> (i32, f64, f64) {
    assert_eq!(&blob[0..2], b"GP");
    assert_eq!(blob[2], 0);
    assert_eq!(blob[3], 0x01);
    let srs_id = i32::from_le_bytes(blob[4..8].try_into().unwrap());
    assert_eq!(blob[8], 0x01);
    assert_eq!(u32::from_le_bytes(blob[9..13].try_into().unwrap()), 1);
    let x = f64::from_le_bytes(blob[13..21].try_into().unwrap());
    let y = f64::from_le_bytes(blob[21..29].try_into().unwrap());
    (srs_id, x, y)
}
