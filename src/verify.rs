//! Correctness cross-check between alternative strategies.
//!
//! Timing must never hide a wrong answer: strategies measured side by side
//! are fingerprinted and the fingerprints compared.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::Result;

fn hex32(d: [u8; 32]) -> String {
    let mut s = String::with_capacity(64);
    for b in d {
        s.push_str(&format!("{:02x}", b));
    }
    s
}

/// SHA-256 over the bincode encoding of `value`, as lowercase hex.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let bytes = bincode::serialize(value)?;
    Ok(hex32(Sha256::digest(&bytes).into()))
}

/// Outcome of comparing strategy fingerprints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreement {
    /// Strategy whose fingerprint the others are compared against.
    pub reference: String,
    pub fingerprint: String,
    /// Strategies whose result differs from the reference.
    pub mismatches: Vec<String>,
}

impl Agreement {
    /// Compare every `(name, fingerprint)` pair against the first one.
    /// Returns `None` for an empty list.
    pub fn check(results: &[(String, String)]) -> Option<Agreement> {
        let ((reference, expected), rest) = results.split_first()?;
        let mismatches: Vec<String> = rest
            .iter()
            .filter(|(_, fp)| fp != expected)
            .map(|(name, _)| name.clone())
            .collect();

        if !mismatches.is_empty() {
            warn!(%reference, ?mismatches, "strategies disagree on their result");
        }

        Some(Agreement {
            reference: reference.clone(),
            fingerprint: expected.clone(),
            mismatches,
        })
    }

    pub fn ok(&self) -> bool {
        self.mismatches.is_empty()
    }
}
