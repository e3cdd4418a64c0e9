//! JPEG marker scanning
//!
//! JPEG structure:
//! - SOI (Start of Image): FF D8
//! - APP segments: metadata (JFIF, EXIF, etc.)
//! - DQT: Quantization tables
//! - DHT: Huffman tables
//! - SOF: Start of Frame (image dimensions)
//! - SOS (Start of Scan): FF DA, compressed data follows
//! - Entropy-coded data
//! - EOI (End of Image): FF D9
//!
//! Everything up to and including the SOS marker is treated as the header,
//! everything after it as the body.

/// Marker prefix byte
pub const MARKER_PREFIX: u8 = 0xFF;
/// Start of Image
pub const SOI: u8 = 0xD8;
/// End of Image
pub const EOI: u8 = 0xD9;
/// Start of Scan
pub const SOS: u8 = 0xDA;

/// Find the header/body cut point of a JPEG stream.
///
/// Returns the index just past the first `FF DA` pair, or `None` when the
/// buffer holds no such pair.
pub fn find_scan_start(data: &[u8]) -> Option<usize> {
    data.windows(2)
        .position(|w| w[0] == MARKER_PREFIX && w[1] == SOS)
        .map(|pos| pos + 2)
}

/// A marker segment found in a JPEG header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Marker byte (the byte after FF)
    pub marker: u8,
    /// Offset of the FF prefix
    pub start: usize,
    /// End offset in bytes (exclusive)
    pub end: usize,
}

impl Segment {
    /// Segment payload, excluding marker and length field
    pub fn payload<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        let payload_start = (self.start + 4).min(self.end);
        &data[payload_start..self.end]
    }

    /// Human-readable name of the segment's marker
    pub fn name(&self) -> &'static str {
        JpegParser::marker_name(self.marker)
    }
}

/// JPEG header walker
pub struct JpegParser;

impl JpegParser {
    /// Read a big-endian u16 from data (JPEG uses big-endian)
    pub fn read_u16_be(data: &[u8], offset: usize) -> Option<u16> {
        if offset + 2 > data.len() {
            return None;
        }
        Some(u16::from_be_bytes([data[offset], data[offset + 1]]))
    }

    /// Get human-readable name for a marker
    pub fn marker_name(marker: u8) -> &'static str {
        match marker {
            0xD8 => "SOI (Start of Image)",
            0xD9 => "EOI (End of Image)",
            0xE0 => "APP0 (JFIF)",
            0xE1 => "APP1 (EXIF/XMP)",
            0xE2..=0xEF => "APPn (Application Data)",
            0xDB => "DQT (Quantization Table)",
            0xC4 => "DHT (Huffman Table)",
            0xC0 => "SOF0 (Baseline DCT)",
            0xC1 => "SOF1 (Extended Sequential)",
            0xC2 => "SOF2 (Progressive DCT)",
            0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF => "SOFn (Start of Frame)",
            0xDA => "SOS (Start of Scan)",
            0xDD => "DRI (Restart Interval)",
            0xD0..=0xD7 => "RSTn (Restart Marker)",
            0xFE => "COM (Comment)",
            _ => "Unknown Marker",
        }
    }

    /// Whether a marker starts a frame (carries image dimensions)
    pub fn is_sof(marker: u8) -> bool {
        matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF)
    }

    /// Check for the FF D8 FF signature
    pub fn can_parse(data: &[u8]) -> bool {
        data.len() >= 3 && data[0] == MARKER_PREFIX && data[1] == SOI && data[2] == MARKER_PREFIX
    }

    /// Walk the marker segments of a header.
    ///
    /// Stops at SOS, EOI, or the first segment that runs past the buffer;
    /// whatever was read up to that point is returned.
    pub fn segments(data: &[u8]) -> Vec<Segment> {
        let mut segments = Vec::new();
        if !Self::can_parse(data) {
            return segments;
        }

        let mut pos = 2;
        while pos < data.len() {
            if data[pos] != MARKER_PREFIX {
                break;
            }

            // Fill bytes
            while pos < data.len() && data[pos] == MARKER_PREFIX {
                pos += 1;
            }
            if pos >= data.len() {
                break;
            }

            let marker = data[pos];
            pos += 1;
            let start = pos - 2;

            match marker {
                // Standalone markers without a length field
                0x00 | 0x01 | 0xD0..=0xD8 => continue,
                0xD9 => {
                    segments.push(Segment { marker, start, end: pos });
                    break;
                }
                0xDA => {
                    // The header ends right after the SOS marker, so its
                    // length field may not be present.
                    let end = Self::read_u16_be(data, pos)
                        .map(|len| pos + len as usize)
                        .filter(|&end| end <= data.len())
                        .unwrap_or(pos);
                    segments.push(Segment { marker, start, end });
                    break;
                }
                _ => {
                    let Some(segment_len) = Self::read_u16_be(data, pos) else {
                        break;
                    };
                    let end = pos + segment_len as usize;
                    if segment_len < 2 || end > data.len() {
                        break;
                    }
                    segments.push(Segment { marker, start, end });
                    pos = end;
                }
            }
        }

        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_scan_start_scenario() {
        let data = [0x00, 0x01, 0xFF, 0xDA, 0x10, 0x20, 0x30, 0xFF, 0xD9];
        assert_eq!(find_scan_start(&data), Some(4));
    }

    #[test]
    fn test_find_scan_start_first_occurrence_only() {
        let data = [0xFF, 0xDA, 0x00, 0xFF, 0xDA];
        assert_eq!(find_scan_start(&data), Some(2));
    }

    #[test]
    fn test_find_scan_start_marker_at_end() {
        let data = [0x11, 0x22, 0xFF, 0xDA];
        assert_eq!(find_scan_start(&data), Some(4));
    }

    #[test]
    fn test_find_scan_start_not_found() {
        assert_eq!(find_scan_start(&[]), None);
        assert_eq!(find_scan_start(&[0xFF]), None);
        assert_eq!(find_scan_start(&[0xDA, 0xFF]), None);
        // Trailing FF with nothing after it
        assert_eq!(find_scan_start(&[0x00, 0x01, 0xFF]), None);
        assert_eq!(find_scan_start(&[0xFF, 0xD8, 0xFF, 0xD9]), None);
    }

    #[test]
    fn test_can_parse_jpeg() {
        assert!(JpegParser::can_parse(&[0xFF, 0xD8, 0xFF, 0xE0]));

        assert!(!JpegParser::can_parse(&[]));
        assert!(!JpegParser::can_parse(&[0xFF]));
        assert!(!JpegParser::can_parse(&[0xFF, 0xD8]));
        assert!(!JpegParser::can_parse(b"BMP"));
    }

    #[test]
    fn test_segments_minimal_header() {
        let header = vec![
            0xFF, 0xD8, // SOI
            0xFF, 0xE0, 0x00, 0x10, // APP0 marker with length 16
            0x4A, 0x46, 0x49, 0x46, 0x00, // "JFIF\0"
            0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, // JFIF data
            0xFF, 0xDA, // SOS
        ];

        let segments = JpegParser::segments(&header);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].marker, 0xE0);
        assert_eq!(segments[0].start, 2);
        assert_eq!(segments[0].end, 20);
        assert_eq!(&segments[0].payload(&header)[..4], b"JFIF");
        assert_eq!(segments[1].name(), "SOS (Start of Scan)");
        assert_eq!(segments[1].end, 22);
    }

    #[test]
    fn test_segments_stop_on_truncated_segment() {
        let header = vec![
            0xFF, 0xD8, // SOI
            0xFF, 0xFE, 0x00, 0x05, b'h', b'i', b'!', // COM
            0xFF, 0xDB, 0x00, 0x40, 0x00, // DQT claiming 64 bytes
        ];

        let segments = JpegParser::segments(&header);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].payload(&header), b"hi!");
    }

    #[test]
    fn test_segments_not_jpeg() {
        assert!(JpegParser::segments(b"BM\x00\x00").is_empty());
    }
}
