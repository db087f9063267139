//! Account and asset identifiers
//!
//! Identifiers are fixed-width byte labels so they can be used as cheap copy
//! keys in the ledger maps. `from_label` pads or truncates a human-readable
//! name; `Display` renders the readable prefix back.

use std::fmt;

/// Identifier of an account on the engine and on external ledgers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(pub [u8; 32]);

/// Identifier of a collateral asset on the engine's allowlist.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub [u8; 16]);

fn label_from_bytes(bytes: &[u8]) -> &str {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    std::str::from_utf8(&bytes[..end]).unwrap_or("<non-utf8>")
}

impl AccountId {
    pub fn from_label(label: &str) -> Self {
        let mut bytes = [0u8; 32];
        let src = label.as_bytes();
        let n = src.len().min(bytes.len());
        bytes[..n].copy_from_slice(&src[..n]);
        Self(bytes)
    }

    pub fn label(&self) -> &str {
        label_from_bytes(&self.0)
    }
}

impl AssetId {
    pub fn from_label(label: &str) -> Self {
        let mut bytes = [0u8; 16];
        let src = label.as_bytes();
        let n = src.len().min(bytes.len());
        bytes[..n].copy_from_slice(&src[..n]);
        Self(bytes)
    }

    pub fn label(&self) -> &str {
        label_from_bytes(&self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.label())
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.label())
    }
}
