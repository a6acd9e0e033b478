use env_logger::Env;
use std::process::ExitCode;

mod batch;
mod config;
mod dataset;
mod error;
mod photo;

use batch::{BatchRunner, Progress};
use config::{Command, Config};
use error::Result;

/// Scan the photo folder and write the GeoPackage
///
/// Discover → process every image in parallel → write, in that order.
/// Any error here is fatal; per-image problems were already logged and
/// skipped by the workers.
fn run(config: &Config) -> Result<()> {
    println!("🔍 Scanning folder: {}", config.root_folder.display());
    let jpegs = photo::discover::find_jpegs(&config.root_folder)?;
    println!("📷 Found {} JPEG files.", jpegs.len());

    let runner = BatchRunner::new()?;
    log::info!("Processing with {} workers", runner.workers());

    let mut progress = Progress::stderr();
    let records = runner.run(&jpegs, photo::worker::process_image, |done, total| {
        progress.update(done, total)
    })?;
    println!("📍 {} of {} images carry GPS data.", records.len(), jpegs.len());

    if dataset::geopackage::write_geopackage(&records, &config.output_file)? {
        println!("✅ GeoPackage has been created: {}", config.output_file.display());
    } else {
        println!("⚠️  No geotagged images found, no GeoPackage written.");
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config = match config::from_env() {
        Ok(Command::Run(config)) => config,
        Ok(Command::Help) => {
            print!("{}", config::USAGE);
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("❌ {}", err);
            eprint!("{}", config::USAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("❌ {}", err);
            ExitCode::FAILURE
        }
    }
}
