//! Image format parsing
//!
//! Locates the header/body boundary of a JPEG stream and walks its header
//! segments for metadata extraction.

mod jpeg;

pub use jpeg::{find_scan_start, JpegParser, Segment, EOI, MARKER_PREFIX};
