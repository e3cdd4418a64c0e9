//! Batch processing of a directory of JPEG files
//!
//! Every file is processed independently: a failure is recorded in the
//! [`BatchReport`] and the next file is processed. Only a missing input
//! directory (or an output directory that cannot be created) ends the run.
//! Progress is reported per file through [`BatchEvent`]s as the batch runs.

use std::path::{Path, PathBuf};

use rand::Rng;

use crate::codec::{normalize_jpeg, RasterCodec};
use crate::corrupt::{corrupt, CorruptionReport, GuardMode, HeaderBodySplit};
use crate::error::{BatchError, ProcessingError, ViewerError};
use crate::metadata::{ImageDimensions, MetadataSource, MetadataTag};
use crate::settings::CorruptSettings;
use crate::viewer::open_in_viewer;

/// Subdirectory of the input directory that receives outputs
pub const OUTPUT_DIR_NAME: &str = "Corrupted Images";

/// Prefix of every output file name
pub const OUTPUT_PREFIX: &str = "Corrupted_";

/// Extensions accepted as JPEG input, compared case-insensitively
const JPEG_EXTENSIONS: [&str; 2] = ["jpeg", "jpg"];

/// Per-run options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchOptions {
    pub corruption_count: usize,
    pub guard: GuardMode,
    pub normalize: bool,
    pub open_viewer: bool,
}

impl From<&CorruptSettings> for BatchOptions {
    fn from(settings: &CorruptSettings) -> Self {
        Self {
            corruption_count: settings.corruption_count,
            guard: settings.guard,
            normalize: settings.normalize,
            open_viewer: settings.open_viewer,
        }
    }
}

/// Result of one successfully corrupted file
#[derive(Debug)]
pub struct FileReport {
    pub output: PathBuf,
    pub dimensions: ImageDimensions,
    pub header_len: usize,
    pub body_len: usize,
    pub corruption: CorruptionReport,
    /// Set when the output was written but the viewer could not be opened
    pub viewer_error: Option<ViewerError>,
}

/// What happened to one input file
#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    /// Header tags, present once the header was read even if a later step failed
    pub tags: Option<Vec<MetadataTag>>,
    pub result: Result<FileReport, ProcessingError>,
}

impl FileOutcome {
    /// Input file name for display
    pub fn file_name(&self) -> String {
        self.input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input.display().to_string())
    }
}

/// Progress notifications emitted while a batch runs
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// A file went through the pipeline, successfully or not
    Processed(&'a FileOutcome),
    /// The output of a processed file could not be shown
    ViewerFailed {
        input: &'a Path,
        error: &'a ViewerError,
    },
}

/// Outcomes of a batch, in processing order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    /// True when the directory held no JPEG files
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// List the JPEG files directly inside `dir`, sorted by path
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::DirectoryNotFound(dir.to_path_buf()));
    }

    let read_dir_error = |source| BatchError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut inputs = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_error)? {
        let path = entry.map_err(read_dir_error)?.path();
        if path.is_file() && has_jpeg_extension(&path) {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

fn has_jpeg_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| JPEG_EXTENSIONS.iter().any(|j| ext.eq_ignore_ascii_case(j)))
}

/// Output directory for inputs found in `dir`
pub fn output_dir(dir: &Path) -> PathBuf {
    dir.join(OUTPUT_DIR_NAME)
}

/// `Corrupted_<stem>.<extension>` inside `out_dir`
pub fn output_path(out_dir: &Path, input: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    out_dir.join(format!("{}{}.{}", OUTPUT_PREFIX, stem, extension))
}

/// Runs the corruption pipeline over a directory
pub struct BatchDriver {
    options: BatchOptions,
    metadata: Box<dyn MetadataSource>,
    codec: Box<dyn RasterCodec>,
}

impl BatchDriver {
    pub fn new(
        options: BatchOptions,
        metadata: Box<dyn MetadataSource>,
        codec: Box<dyn RasterCodec>,
    ) -> Self {
        Self {
            options,
            metadata,
            codec,
        }
    }

    /// Process every JPEG in `dir`, calling `on_event` as each file finishes.
    ///
    /// A file's `Processed` event is emitted before its viewer is launched.
    pub fn run_with<R, F>(
        &self,
        dir: &Path,
        rng: &mut R,
        mut on_event: F,
    ) -> Result<BatchReport, BatchError>
    where
        R: Rng + ?Sized,
        F: FnMut(BatchEvent<'_>),
    {
        let inputs = discover_inputs(dir)?;
        if inputs.is_empty() {
            log::info!("No JPEG files found in {}", dir.display());
            return Ok(BatchReport::default());
        }

        let out_dir = output_dir(dir);
        std::fs::create_dir_all(&out_dir).map_err(|source| BatchError::CreateOutputDir {
            path: out_dir.clone(),
            source,
        })?;

        let mut report = BatchReport::default();
        for input in inputs {
            let mut outcome = self.process_file(&input, &out_dir, rng);
            if let Err(e) = &outcome.result {
                log::warn!("Skipping {}: {}", input.display(), e);
            }
            on_event(BatchEvent::Processed(&outcome));

            if self.options.open_viewer {
                if let Ok(file) = &mut outcome.result {
                    file.viewer_error = open_in_viewer(&file.output).err();
                    if let Some(error) = &file.viewer_error {
                        log::warn!("{}", error);
                        on_event(BatchEvent::ViewerFailed {
                            input: &outcome.input,
                            error,
                        });
                    }
                }
            }

            report.outcomes.push(outcome);
        }

        log::info!(
            "Batch finished: {} corrupted, {} failed",
            report.succeeded(),
            report.failed()
        );
        Ok(report)
    }

    /// Corrupt a single file and write the result into `out_dir`
    pub fn process_file<R: Rng + ?Sized>(
        &self,
        input: &Path,
        out_dir: &Path,
        rng: &mut R,
    ) -> FileOutcome {
        let mut tags = None;
        let result = self.corrupt_file(input, out_dir, rng, &mut tags);
        FileOutcome {
            input: input.to_path_buf(),
            tags,
            result,
        }
    }

    fn corrupt_file<R: Rng + ?Sized>(
        &self,
        input: &Path,
        out_dir: &Path,
        rng: &mut R,
        tags: &mut Option<Vec<MetadataTag>>,
    ) -> Result<FileReport, ProcessingError> {
        let mut bytes = std::fs::read(input).map_err(ProcessingError::Read)?;
        log::info!("Loaded file: {} ({} bytes)", input.display(), bytes.len());

        if self.options.normalize {
            bytes = normalize_jpeg(&bytes).map_err(ProcessingError::Normalize)?;
        }

        let mut split = HeaderBodySplit::split(bytes).ok_or(ProcessingError::MarkerNotFound)?;
        log::debug!("Split {} bytes at offset {}", split.len(), split.cut());
        let dimensions = ImageDimensions::from_tags(
            tags.insert(self.metadata.read_tags(&split.header)?),
        );

        let corruption = corrupt(
            &mut split.body,
            self.options.corruption_count,
            self.options.guard,
            rng,
        );
        let encoded = self.codec.encode(&split.combine())?;

        let output = output_path(out_dir, input, self.codec.extension());
        std::fs::write(&output, encoded).map_err(|source| ProcessingError::Write {
            path: output.clone(),
            source,
        })?;
        log::info!(
            "Wrote {} ({} bytes changed)",
            output.display(),
            corruption.changed()
        );

        Ok(FileReport {
            output,
            dimensions,
            header_len: split.cut(),
            body_len: split.body.len(),
            corruption,
            viewer_error: None,
        })
    }
}
