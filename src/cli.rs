//! Command line arguments

use std::path::PathBuf;

use clap::Parser;

use crate::codec::OutputEncoding;
use crate::corrupt::GuardMode;
use crate::settings::CorruptSettings;

#[derive(Parser, Debug)]
#[command(author, version, about = "Corrupt the scan data of every JPEG in a directory", long_about = None)]
pub struct Cli {
    /// Directory containing .jpg/.jpeg files (defaults to the saved setting, then ./Images)
    pub dir: Option<PathBuf>,

    /// Number of random offsets zeroed per file
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Seed for reproducible corruption
    #[arg(long)]
    pub seed: Option<u64>,

    /// Which bytes are spared from corruption
    #[arg(long, value_enum)]
    pub guard: Option<GuardMode>,

    /// How corrupted files are written
    #[arg(long, value_enum)]
    pub output: Option<OutputEncoding>,

    /// Re-encode each input as JPEG before corrupting it
    #[arg(long)]
    pub normalize: bool,

    /// Open each output in the default image viewer
    #[arg(long)]
    pub open: bool,

    /// Store the effective options as the new defaults
    #[arg(long)]
    pub save_settings: bool,
}

impl Cli {
    /// Overlay the flags that were given on top of `settings`
    pub fn apply_to(&self, mut settings: CorruptSettings) -> CorruptSettings {
        if let Some(dir) = &self.dir {
            settings.input_dir = dir.clone();
        }
        if let Some(count) = self.count {
            settings.corruption_count = count;
        }
        if let Some(guard) = self.guard {
            settings.guard = guard;
        }
        if let Some(output) = self.output {
            settings.output = output;
        }
        settings.normalize |= self.normalize;
        settings.open_viewer |= self.open;
        settings
    }
}
