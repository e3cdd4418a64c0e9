//! Console report written while a batch runs

use std::io::{self, Write};

use crate::batch::{BatchEvent, FileOutcome};

pub const NO_INPUTS_MESSAGE: &str = "No JPEG files found in the specified path.";
pub const MISSING_DIR_MESSAGE: &str = "The specified directory does not exist.";

/// Tags block followed by the error line, if the file failed
pub fn write_outcome<W: Write>(out: &mut W, outcome: &FileOutcome) -> io::Result<()> {
    let name = outcome.file_name();

    if let Some(tags) = &outcome.tags {
        writeln!(out, "Metadata for {}:", name)?;
        for tag in tags {
            writeln!(out, "{}", tag)?;
        }
        writeln!(out)?;
    }

    match &outcome.result {
        Ok(report) => {
            log::debug!(
                "{} -> {}: header {} bytes, body {} bytes, {} of {} offsets changed a byte ({} protected), dimensions {:?}x{:?}",
                name,
                report.output.display(),
                report.header_len,
                report.body_len,
                report.corruption.changed(),
                report.corruption.planned,
                report.corruption.protected,
                report.dimensions.width,
                report.dimensions.height
            );
        }
        Err(e) => {
            writeln!(out, "Error processing file {}: {}", name, e)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

pub fn write_event<W: Write>(out: &mut W, event: BatchEvent<'_>) -> io::Result<()> {
    match event {
        BatchEvent::Processed(outcome) => write_outcome(out, outcome),
        BatchEvent::ViewerFailed { input, error } => {
            log::debug!("Viewer failed for {}", input.display());
            writeln!(out, "{}", error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::FileReport;
    use crate::corrupt::CorruptionReport;
    use crate::error::{ProcessingError, ViewerError};
    use crate::metadata::{ImageDimensions, MetadataTag};
    use std::path::{Path, PathBuf};

    fn render(outcome: &FileOutcome) -> String {
        let mut out = Vec::new();
        write_outcome(&mut out, outcome).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn tags() -> Option<Vec<MetadataTag>> {
        Some(vec![
            MetadataTag::new("Image Height", "2 pixels"),
            MetadataTag::new("Image Width", "3 pixels"),
        ])
    }

    fn written() -> FileReport {
        FileReport {
            output: PathBuf::from("out/Corrupted_cat.bmp"),
            dimensions: ImageDimensions::default(),
            header_len: 4,
            body_len: 10,
            corruption: CorruptionReport::default(),
            viewer_error: None,
        }
    }

    #[test]
    fn test_success_prints_tags_and_blank_line() {
        let outcome = FileOutcome {
            input: PathBuf::from("in/cat.jpg"),
            tags: tags(),
            result: Ok(written()),
        };

        assert_eq!(
            render(&outcome),
            "Metadata for cat.jpg:\nImage Height: 2 pixels\nImage Width: 3 pixels\n\n"
        );
    }

    #[test]
    fn test_failure_after_header_prints_tags_then_error() {
        let outcome = FileOutcome {
            input: PathBuf::from("in/cat.jpg"),
            tags: tags(),
            result: Err(ProcessingError::Write {
                path: PathBuf::from("out/Corrupted_cat.bmp"),
                source: io::Error::new(io::ErrorKind::Other, "disk full"),
            }),
        };

        assert_eq!(
            render(&outcome),
            "Metadata for cat.jpg:\nImage Height: 2 pixels\nImage Width: 3 pixels\n\n\
             Error processing file cat.jpg: Failed to write out/Corrupted_cat.bmp: disk full\n\n"
        );
    }

    #[test]
    fn test_failure_before_header_prints_error_only() {
        let outcome = FileOutcome {
            input: PathBuf::from("in/dog.jpeg"),
            tags: None,
            result: Err(ProcessingError::MarkerNotFound),
        };

        assert_eq!(
            render(&outcome),
            "Error processing file dog.jpeg: Start of Scan marker (FF DA) not found\n\n"
        );
    }

    #[test]
    fn test_viewer_failure_line() {
        let error = ViewerError::Spawn(io::Error::new(io::ErrorKind::NotFound, "no xdg-open"));
        let mut out = Vec::new();

        write_event(
            &mut out,
            BatchEvent::ViewerFailed {
                input: Path::new("in/cat.jpg"),
                error: &error,
            },
        )
        .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Error opening image: no xdg-open\n");
    }
}
