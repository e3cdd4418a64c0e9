//! Metadata tags read from a JPEG header
//!
//! Tags are plain `(name, description)` pairs meant for display. The reader
//! is a trait so the batch driver can run with a stub source in tests.

use crate::error::MetadataError;
use crate::formats::{JpegParser, Segment};

/// A single metadata tag
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataTag {
    pub name: String,
    pub description: String,
}

impl MetadataTag {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl std::fmt::Display for MetadataTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.description)
    }
}

/// Source of metadata tags for a header buffer
pub trait MetadataSource {
    /// Read the tags found in `header`, in file order
    fn read_tags(&self, header: &[u8]) -> Result<Vec<MetadataTag>, MetadataError>;
}

/// Image dimensions taken from the "Image Width"/"Image Height" tags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageDimensions {
    /// Parse the leading integer of the width/height descriptions.
    ///
    /// A missing tag or unparsable description leaves that field unset.
    pub fn from_tags(tags: &[MetadataTag]) -> Self {
        let mut dims = Self::default();
        for tag in tags {
            match tag.name.as_str() {
                "Image Width" => dims.width = leading_integer(&tag.description).or(dims.width),
                "Image Height" => dims.height = leading_integer(&tag.description).or(dims.height),
                _ => {}
            }
        }
        dims
    }
}

fn leading_integer(description: &str) -> Option<u32> {
    description.split(' ').next()?.parse().ok()
}

/// Reads tags straight from the header's marker segments
#[derive(Clone, Copy, Debug, Default)]
pub struct JpegHeaderTags;

impl MetadataSource for JpegHeaderTags {
    fn read_tags(&self, header: &[u8]) -> Result<Vec<MetadataTag>, MetadataError> {
        if !JpegParser::can_parse(header) {
            return Err(MetadataError::NotJpeg);
        }

        let segments = JpegParser::segments(header);
        let mut tags = Vec::new();
        let mut quant_tables = 0;
        let mut huffman_tables = 0;

        for segment in &segments {
            let payload = segment.payload(header);
            match segment.marker {
                0xE0 => jfif_tags(payload, &mut tags),
                0xE1 => app1_tags(payload, &mut tags),
                0xDB => quant_tables += count_tables(payload, dqt_table_len),
                0xC4 => huffman_tables += count_tables(payload, dht_table_len),
                0xDD => {
                    if let Some(interval) = JpegParser::read_u16_be(payload, 0) {
                        tags.push(MetadataTag::new("Restart Interval", interval.to_string()));
                    }
                }
                0xFE => tags.push(MetadataTag::new(
                    "Comment",
                    String::from_utf8_lossy(payload).trim_end_matches('\0'),
                )),
                marker if JpegParser::is_sof(marker) => frame_tags(segment, payload, &mut tags),
                _ => {}
            }
        }

        if quant_tables > 0 {
            tags.push(MetadataTag::new("Quantization Tables", quant_tables.to_string()));
        }
        if huffman_tables > 0 {
            tags.push(MetadataTag::new("Huffman Tables", huffman_tables.to_string()));
        }

        Ok(tags)
    }
}

fn frame_tags(segment: &Segment, payload: &[u8], tags: &mut Vec<MetadataTag>) {
    if payload.len() < 6 {
        return;
    }
    let height = JpegParser::read_u16_be(payload, 1).unwrap_or(0);
    let width = JpegParser::read_u16_be(payload, 3).unwrap_or(0);

    let compression = segment
        .name()
        .split_once('(')
        .map(|(_, rest)| rest.trim_end_matches(')'))
        .unwrap_or("Unknown");

    tags.push(MetadataTag::new("Compression Type", compression));
    tags.push(MetadataTag::new("Data Precision", format!("{} bits", payload[0])));
    tags.push(MetadataTag::new("Image Height", format!("{} pixels", height)));
    tags.push(MetadataTag::new("Image Width", format!("{} pixels", width)));
    tags.push(MetadataTag::new("Number of Components", payload[5].to_string()));
}

fn jfif_tags(payload: &[u8], tags: &mut Vec<MetadataTag>) {
    if payload.len() < 12 || &payload[..5] != b"JFIF\0" {
        return;
    }
    let units = match payload[7] {
        0 => "none",
        1 => "inch",
        2 => "cm",
        _ => "unknown",
    };
    let x_density = JpegParser::read_u16_be(payload, 8).unwrap_or(0);
    let y_density = JpegParser::read_u16_be(payload, 10).unwrap_or(0);

    tags.push(MetadataTag::new("Version", format!("{}.{:02}", payload[5], payload[6])));
    tags.push(MetadataTag::new("Resolution Units", units));
    tags.push(MetadataTag::new("X Resolution", format!("{} dots", x_density)));
    tags.push(MetadataTag::new("Y Resolution", format!("{} dots", y_density)));
}

fn app1_tags(payload: &[u8], tags: &mut Vec<MetadataTag>) {
    const XMP_NAMESPACE: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";

    if payload.starts_with(b"Exif\0\0") {
        tags.push(MetadataTag::new(
            "Exif Data",
            format!("{} bytes", payload.len() - 6),
        ));
    } else if payload.starts_with(XMP_NAMESPACE) {
        tags.push(MetadataTag::new(
            "XMP Data",
            format!("{} bytes", payload.len() - XMP_NAMESPACE.len()),
        ));
    }
}

/// Count the tables packed into one DQT/DHT payload
fn count_tables(payload: &[u8], table_len: fn(&[u8]) -> Option<usize>) -> usize {
    let mut count = 0;
    let mut rest = payload;
    while !rest.is_empty() {
        match table_len(rest) {
            Some(len) if len <= rest.len() => {
                count += 1;
                rest = &rest[len..];
            }
            _ => break,
        }
    }
    count
}

fn dqt_table_len(table: &[u8]) -> Option<usize> {
    let precision = table.first()? >> 4;
    Some(if precision == 0 { 65 } else { 129 })
}

fn dht_table_len(table: &[u8]) -> Option<usize> {
    let counts = table.get(1..17)?;
    Some(17 + counts.iter().map(|&c| c as usize).sum::<usize>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_with_frame(width: u16, height: u16) -> Vec<u8> {
        let mut header = vec![
            0xFF, 0xD8, // SOI
            0xFF, 0xE0, 0x00, 0x10, // APP0
            0x4A, 0x46, 0x49, 0x46, 0x00, // "JFIF\0"
            0x01, 0x02, 0x01, 0x00, 0x48, 0x00, 0x48, 0x00, 0x00,
            0xFF, 0xFE, 0x00, 0x07, b'h', b'e', b'l', b'l', b'o', // COM
            0xFF, 0xC0, 0x00, 0x0B, 0x08, // SOF0, 8-bit
        ];
        header.extend_from_slice(&height.to_be_bytes());
        header.extend_from_slice(&width.to_be_bytes());
        header.extend_from_slice(&[0x01, 0x01, 0x11, 0x00]);
        header.extend_from_slice(&[0xFF, 0xDA]);
        header
    }

    fn find<'a>(tags: &'a [MetadataTag], name: &str) -> Option<&'a str> {
        tags.iter()
            .find(|t| t.name == name)
            .map(|t| t.description.as_str())
    }

    #[test]
    fn test_read_tags_from_header() {
        let tags = JpegHeaderTags.read_tags(&header_with_frame(1920, 1080)).unwrap();

        assert_eq!(find(&tags, "Version"), Some("1.02"));
        assert_eq!(find(&tags, "Resolution Units"), Some("inch"));
        assert_eq!(find(&tags, "X Resolution"), Some("72 dots"));
        assert_eq!(find(&tags, "Comment"), Some("hello"));
        assert_eq!(find(&tags, "Compression Type"), Some("Baseline DCT"));
        assert_eq!(find(&tags, "Data Precision"), Some("8 bits"));
        assert_eq!(find(&tags, "Image Width"), Some("1920 pixels"));
        assert_eq!(find(&tags, "Image Height"), Some("1080 pixels"));
        assert_eq!(find(&tags, "Number of Components"), Some("1"));
    }

    #[test]
    fn test_tags_keep_file_order() {
        let tags = JpegHeaderTags.read_tags(&header_with_frame(4, 4)).unwrap();
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();

        let version = names.iter().position(|&n| n == "Version").unwrap();
        let comment = names.iter().position(|&n| n == "Comment").unwrap();
        let width = names.iter().position(|&n| n == "Image Width").unwrap();
        assert!(version < comment && comment < width);
    }

    #[test]
    fn test_read_tags_rejects_non_jpeg() {
        assert!(matches!(
            JpegHeaderTags.read_tags(&[0x00, 0x01, 0xFF, 0xDA]),
            Err(MetadataError::NotJpeg)
        ));
    }

    #[test]
    fn test_count_tables() {
        let mut dqt = vec![0x00];
        dqt.extend_from_slice(&[1u8; 64]);
        dqt.push(0x01);
        dqt.extend_from_slice(&[1u8; 64]);
        assert_eq!(count_tables(&dqt, dqt_table_len), 2);

        let mut dht = vec![0x00, 0x02];
        dht.extend_from_slice(&[0u8; 15]);
        dht.extend_from_slice(&[0xAA, 0xBB]);
        assert_eq!(count_tables(&dht, dht_table_len), 1);
    }

    #[test]
    fn test_dimensions_from_tags() {
        let tags = vec![
            MetadataTag::new("Image Height", "1080 pixels"),
            MetadataTag::new("Image Width", "1920 pixels"),
        ];
        let dims = ImageDimensions::from_tags(&tags);
        assert_eq!(dims.width, Some(1920));
        assert_eq!(dims.height, Some(1080));
    }

    #[test]
    fn test_dimensions_unparsable_or_missing() {
        let tags = vec![
            MetadataTag::new("Image Width", "wide pixels"),
            MetadataTag::new("Make", "Canon"),
        ];
        let dims = ImageDimensions::from_tags(&tags);
        assert_eq!(dims, ImageDimensions::default());
    }

    #[test]
    fn test_tag_display() {
        let tag = MetadataTag::new("Image Width", "640 pixels");
        assert_eq!(tag.to_string(), "Image Width: 640 pixels");
    }
}
