//! Band fingerprints.
//!
//! A band's fingerprint is the concatenation of its values in big-endian
//! byte order, so the same band yields the same bucket key on every host.

use std::fmt;

/// Bucket key for one band of a signature.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BandFingerprint(Box<[u8]>);

impl BandFingerprint {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for BandFingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for BandFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BandFingerprint(")?;
        for byte in self.0.iter() {
            write!(f, "{byte:02x}")?;
        }
        f.write_str(")")
    }
}

/// Encode a contiguous band of signature values.
pub fn band_fingerprint(segment: &[u32]) -> BandFingerprint {
    let mut bytes = Vec::with_capacity(segment.len() * 4);
    for value in segment {
        bytes.extend_from_slice(&value.to_be_bytes());
    }
    BandFingerprint(bytes.into_boxed_slice())
}
