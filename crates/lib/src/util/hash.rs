//! Content digests for plans and documents.
//!
//! - `ObjectHash`: a 20-character truncated SHA-256 of a JSON-serialized value
//! - `hash_bytes()`: full SHA-256 of arbitrary bytes

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::consts::PLAN_HASH_PREFIX_LEN;

pub type HashError = serde_json::Error;

/// A truncated content digest identifying a serialized value.
///
/// Lowercase hexadecimal, e.g. `"a1b2c3d4e5f6789012ab"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectHash(pub String);

impl std::fmt::Display for ObjectHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

pub trait Hashable: Serialize {
  fn compute_hash(&self) -> Result<ObjectHash, HashError> {
    let serialized = serde_json::to_string(self)?;
    let full = hash_bytes(serialized.as_bytes());
    Ok(ObjectHash(full[..PLAN_HASH_PREFIX_LEN].to_string()))
  }
}

/// Hash arbitrary bytes, returning the full 64-character hex digest.
pub fn hash_bytes(data: &[u8]) -> String {
  let mut hasher = Sha256::new();
  hasher.update(data);
  format!("{:x}", hasher.finalize())
}
