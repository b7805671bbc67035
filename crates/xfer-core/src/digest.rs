//! # Content Digest
//!
//! SHA-256 digests of accepted records. A digest can only be computed from
//! [`CanonicalBytes`], so every digest in the system flows through the
//! same canonicalization.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CanonicalizationError;
use crate::record::CanonicalRecord;

/// A SHA-256 digest of canonical record bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest { bytes }
}

/// Canonicalize an accepted record and digest it.
///
/// # Errors
///
/// Propagates canonicalization failures.
pub fn record_digest(record: &CanonicalRecord) -> Result<ContentDigest, CanonicalizationError> {
    Ok(sha256_digest(&CanonicalBytes::new(record)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CanonicalValue;

    #[test]
    fn empty_record_digest_is_sha256_of_braces() {
        let cb = CanonicalBytes::new(&CanonicalRecord::new("X")).unwrap();
        // sha256("{}")
        assert_eq!(
            sha256_digest(&cb).to_hex(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn display_is_algorithm_prefixed() {
        let cb = CanonicalBytes::new(&CanonicalRecord::new("X")).unwrap();
        let shown = sha256_digest(&cb).to_string();
        assert!(shown.starts_with("sha256:"));
        assert_eq!(shown.len(), "sha256:".len() + 64);
    }

    #[test]
    fn equal_records_share_a_digest() {
        let build = |order: bool| {
            let mut r = CanonicalRecord::new("IsoRequest");
            let a = ("messageType", CanonicalValue::Text("008".into()));
            let b = ("categoryPurpose", CanonicalValue::Text("RFT".into()));
            let (first, second) = if order { (a, b) } else { (b, a) };
            r.insert(first.0, first.1);
            r.insert(second.0, second.1);
            r
        };
        assert_eq!(
            record_digest(&build(true)).unwrap(),
            record_digest(&build(false)).unwrap()
        );
    }
}
