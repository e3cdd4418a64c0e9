//! jpeg-corrupt: batch databending of JPEG files
//!
//! Splits each JPEG at its Start of Scan marker, zeroes random bytes of the
//! compressed scan data, and writes the result next to the inputs while
//! printing the header's metadata tags.

mod batch;
mod cli;
mod codec;
mod console;
mod corrupt;
mod error;
mod formats;
mod metadata;
mod settings;
mod viewer;

use std::io::Write;
use std::process::ExitCode;

use batch::{BatchDriver, BatchOptions};
use clap::Parser;
use cli::Cli;
use error::BatchError;
use metadata::JpegHeaderTags;
use rand::rngs::StdRng;
use rand::SeedableRng;
use settings::CorruptSettings;

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let settings = cli.apply_to(CorruptSettings::load());
    if cli.save_settings {
        settings.save();
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let driver = BatchDriver::new(
        BatchOptions::from(&settings),
        Box::new(JpegHeaderTags),
        settings.output.codec(),
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = driver.run_with(&settings.input_dir, &mut rng, |event| {
        if let Err(e) = console::write_event(&mut out, event) {
            log::warn!("Failed to write to stdout: {}", e);
        }
    });

    let exit = match result {
        Ok(report) => {
            if report.is_empty() {
                let _ = writeln!(out, "{}", console::NO_INPUTS_MESSAGE);
            }
            ExitCode::SUCCESS
        }
        Err(BatchError::DirectoryNotFound(dir)) => {
            log::error!("Input directory {} does not exist", dir.display());
            let _ = writeln!(out, "{}", console::MISSING_DIR_MESSAGE);
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("{}", e);
            let _ = writeln!(out, "{}", e);
            ExitCode::FAILURE
        }
    };
    let _ = out.flush();
    exit
}
