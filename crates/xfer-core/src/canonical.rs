//! # Canonical Bytes — JCS Form of Accepted Records
//!
//! `CanonicalBytes` is the only byte form of a [`CanonicalRecord`] that may
//! be digested. It is produced by rendering the record to JSON (decimals
//! as scale-preserving strings, dates as `YYYY-MM-DD`) and serializing
//! with RFC 8785 (JSON Canonicalization Scheme): sorted keys, compact
//! separators.
//!
//! Two payloads that differ only in key order or unknown fields produce
//! identical canonical bytes. Decimals keep the scale they were written
//! with, so `"10.0"` and `"10.00"` digest differently.

use crate::error::CanonicalizationError;
use crate::record::CanonicalRecord;

/// RFC 8785 bytes of an accepted record.
///
/// The inner buffer is private: the only constructor is
/// [`CanonicalBytes::new()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize an accepted record.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if JSON or JCS
    /// serialization fails.
    pub fn new(record: &CanonicalRecord) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(record)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::record::CanonicalValue;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn fields() -> impl Strategy<Value = Vec<(String, CanonicalValue)>> {
        let value = prop_oneof![
            "[a-zA-Z0-9 ก-ฮ]{0,20}".prop_map(CanonicalValue::Text),
            (any::<i64>(), 0u32..6).prop_map(|(m, s)| CanonicalValue::Decimal(Decimal::new(m, s))),
        ];
        prop::collection::btree_map("[a-z]{1,8}", value, 0..10)
            .prop_map(|m| m.into_iter().collect())
    }

    proptest! {
        /// Field insertion order never affects the canonical bytes.
        #[test]
        fn insertion_order_is_irrelevant(entries in fields()) {
            let mut forward = CanonicalRecord::new("R");
            for (k, v) in entries.iter().cloned() {
                forward.insert(k, v);
            }
            let mut backward = CanonicalRecord::new("R");
            for (k, v) in entries.into_iter().rev() {
                backward.insert(k, v);
            }
            let forward_bytes = CanonicalBytes::new(&forward).unwrap();
            let backward_bytes = CanonicalBytes::new(&backward).unwrap();
            prop_assert_eq!(forward_bytes.as_bytes(), backward_bytes.as_bytes());
        }

        /// Canonical bytes parse back as a JSON object with one key per field.
        #[test]
        fn canonical_bytes_are_json_objects(entries in fields()) {
            let mut record = CanonicalRecord::new("R");
            let n = entries.len();
            for (k, v) in entries {
                record.insert(k, v);
            }
            let cb = CanonicalBytes::new(&record).unwrap();
            let parsed: serde_json::Value = serde_json::from_slice(cb.as_bytes()).unwrap();
            prop_assert_eq!(parsed.as_object().map(|o| o.len()), Some(n));
        }
    }
}
