//! Output encoding of corrupted buffers
//!
//! [`RawCodec`] writes the corrupted JPEG stream untouched. [`BitmapCodec`]
//! decodes it and writes a real BMP, which fails when the corruption left the
//! stream undecodable.

use std::io::Cursor;

use clap::ValueEnum;
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Turns a recombined buffer into the bytes written to disk
pub trait RasterCodec {
    /// File extension of the encoded output, without the dot
    fn extension(&self) -> &'static str;

    /// Encode the corrupted buffer
    fn encode(&self, bytes: &[u8]) -> Result<Vec<u8>, CodecError>;
}

/// Output policy selectable from settings and the command line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputEncoding {
    /// Corrupted JPEG bytes verbatim, saved under a .bmp name
    #[default]
    Raw,
    /// Decode the corrupted stream and save a real bitmap
    Bitmap,
}

impl OutputEncoding {
    pub fn codec(self) -> Box<dyn RasterCodec> {
        match self {
            OutputEncoding::Raw => Box::new(RawCodec),
            OutputEncoding::Bitmap => Box::new(BitmapCodec),
        }
    }
}

/// Passthrough codec
#[derive(Clone, Copy, Debug, Default)]
pub struct RawCodec;

impl RasterCodec for RawCodec {
    fn extension(&self) -> &'static str {
        "bmp"
    }

    fn encode(&self, bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(bytes.to_vec())
    }
}

/// JPEG to BMP transcoder
#[derive(Clone, Copy, Debug, Default)]
pub struct BitmapCodec;

impl RasterCodec for BitmapCodec {
    fn extension(&self) -> &'static str {
        "bmp"
    }

    fn encode(&self, bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?;
        encode_as(&img, ImageFormat::Bmp)
    }
}

/// Decode a JPEG and encode it again with the default encoder settings.
///
/// Gives every input the same encoder-produced layout before it is split.
pub fn normalize_jpeg(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?;
    let img = match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    };
    encode_as(&img, ImageFormat::Jpeg)
}

fn encode_as(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, CodecError> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format)?;
    Ok(out.into_inner())
}
