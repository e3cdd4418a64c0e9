//! Header/body split and recombination

use crate::formats::find_scan_start;

/// A JPEG stream cut in two right after the Start-Of-Scan marker
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderBodySplit {
    /// Bytes up to and including FF DA
    pub header: Vec<u8>,
    /// Compressed scan data and everything after it
    pub body: Vec<u8>,
}

impl HeaderBodySplit {
    /// Split a buffer at its first SOS marker, or return `None` if there is none
    pub fn split(mut bytes: Vec<u8>) -> Option<Self> {
        let cut = find_scan_start(&bytes)?;
        let body = bytes.split_off(cut);
        Some(Self {
            header: bytes,
            body,
        })
    }

    /// Index of the first body byte in the original buffer
    pub fn cut(&self) -> usize {
        self.header.len()
    }

    /// Total length of header and body
    pub fn len(&self) -> usize {
        self.header.len() + self.body.len()
    }

    /// Reassemble header and (possibly mutated) body
    pub fn combine(&self) -> Vec<u8> {
        combine(&self.header, &self.body)
    }
}

/// Concatenate header and body into an exactly sized buffer
pub fn combine(header: &[u8], body: &[u8]) -> Vec<u8> {
    let mut combined = Vec::with_capacity(header.len() + body.len());
    combined.extend_from_slice(header);
    combined.extend_from_slice(body);
    combined
}
