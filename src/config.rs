/// Run configuration
///
/// Two values drive a run: the folder to scan and the GeoPackage to write.
/// They are resolved in layers, later layers winning:
/// 1. Built-in defaults
/// 2. A TOML file (`--config <FILE>`, else `exif2gpkg.toml` in the working
///    directory, else `<config dir>/exif2gpkg/config.toml`)
/// 3. Command-line overrides, as flags (`--root-folder`, `--output-file`)
///    or as `key=value` pairs (`root_folder=/photos`)

use crate::error::{Error, Result};
use pico_args::Arguments;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "exif2gpkg";
const LOCAL_CONFIG_FILE: &str = "exif2gpkg.toml";
const USER_CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_ROOT_FOLDER: &str = "path/to/your/images";
pub const DEFAULT_OUTPUT_FILE: &str = "output.gpkg";

pub const USAGE: &str = "\
Map geotagged JPEGs into a GeoPackage point layer

USAGE:
    exif2gpkg [OPTIONS] [key=value ...]

OPTIONS:
    -c, --config <FILE>        Read settings from this TOML file
    -r, --root-folder <DIR>    Folder to scan recursively for JPEGs
    -o, --output-file <FILE>   GeoPackage to write
    -h, --help                 Print this help

OVERRIDES:
    root_folder=<DIR>          Same as --root-folder
    output_file=<FILE>         Same as --output-file
";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Folder scanned recursively for `.jpg` / `.jpeg` files
    pub root_folder: PathBuf,
    /// GeoPackage written at the end of the run
    pub output_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_folder: PathBuf::from(DEFAULT_ROOT_FOLDER),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }
}

/// What the command line asked for
#[derive(Debug)]
pub enum Command {
    /// Print usage and exit
    Help,
    /// Scan and write with this configuration
    Run(Config),
}

impl Config {
    /// Apply a single `key=value` override
    pub fn apply_override(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "root_folder" => self.root_folder = PathBuf::from(value),
            "output_file" => self.output_file = PathBuf::from(value),
            other => return Err(Error::Config(format!("unknown setting '{}'", other))),
        }
        Ok(())
    }
}

/// Resolve the configuration from the process arguments
pub fn from_env() -> Result<Command> {
    from_args(Arguments::from_env())
}

/// Resolve the configuration from already-collected arguments
pub fn from_args(mut args: Arguments) -> Result<Command> {
    if args.contains(["-h", "--help"]) {
        return Ok(Command::Help);
    }

    let config_path: Option<PathBuf> = args.opt_value_from_os_str(["-c", "--config"], parse_path)?;
    let root_folder: Option<PathBuf> = args.opt_value_from_os_str(["-r", "--root-folder"], parse_path)?;
    let output_file: Option<PathBuf> = args.opt_value_from_os_str(["-o", "--output-file"], parse_path)?;

    let mut config = match config_path {
        // An explicit file must exist
        Some(path) => load_from_path(&path)?,
        None => match find_config_file() {
            Some(path) => {
                log::info!("Using configuration file {}", path.display());
                load_from_path(&path)?
            }
            None => Config::default(),
        },
    };

    // Everything left must be a key=value override
    for raw in args.finish() {
        let raw = raw
            .into_string()
            .map_err(|s| Error::Config(format!("argument is not valid UTF-8: {:?}", s)))?;
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| Error::Config(format!("unexpected argument '{}'", raw)))?;
        config.apply_override(key.trim(), value.trim())?;
    }

    // Flags are applied last so they beat positional overrides
    if let Some(root_folder) = root_folder {
        config.root_folder = root_folder;
    }
    if let Some(output_file) = output_file {
        config.output_file = output_file;
    }

    Ok(Command::Run(config))
}

/// Load a configuration file, missing keys keep their defaults
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Look for an implicit configuration file
///
/// The working directory wins over the per-user config directory:
/// - Linux: ~/.config/exif2gpkg/config.toml
/// - macOS: ~/Library/Application Support/exif2gpkg/config.toml
/// - Windows: %APPDATA%\exif2gpkg\config.toml
fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    let mut user = dirs::config_dir()?;
    user.push(APP_NAME);
    user.push(USER_CONFIG_FILE);
    user.is_file().then_some(user)
}

fn parse_path(value: &std::ffi::OsStr) -> std::result::Result<PathBuf, &'static str> {
    if value.is_empty() {
        Err("path must not be empty")
    } else {
        Ok(PathBuf::from(value))
    }
}
