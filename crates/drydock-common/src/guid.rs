//! Blueprint GUID - the `SubtypeId` stored in a blueprint's `Id` element.
//!
//! Blueprints are identified by a GUID-shaped string. Drydock derives it from
//! the blueprint's display name so that re-exporting a blueprint under the same
//! name keeps the same identifier.

use std::fmt;

use md5::{Digest, Md5};

/// A 16-byte blueprint identifier.
///
/// Format: `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`, lowercase hex, bytes in
/// storage order (no mixed-endian groups).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlueprintGuid {
    bytes: [u8; 16],
}

/// Byte offsets of the five hyphen-separated groups.
const GROUPS: [(usize, usize); 5] = [(0, 4), (4, 6), (6, 8), (8, 10), (10, 16)];

impl BlueprintGuid {
    /// Derive the identifier for a blueprint name.
    ///
    /// The MD5 digest of the UTF-8 name is used as-is, so the same name always
    /// yields the same identifier.
    pub fn from_name(name: &str) -> Self {
        let digest = Md5::digest(name.as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest);
        Self { bytes }
    }

    /// Get the raw bytes of the GUID.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.bytes
    }
}

impl fmt::Debug for BlueprintGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlueprintGuid({})", self)
    }
}

impl fmt::Display for BlueprintGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &(start, end)) in GROUPS.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            for byte in &self.bytes[start..end] {
                write!(f, "{:02x}", byte)?;
            }
        }
        Ok(())
    }
}
