//! Resource ceilings applied to every decode.

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, DecodeResult, LimitKind};

/// Ceilings for a single decode call.
///
/// Defaults are sized for session records (a handful of keys, short strings)
/// with generous headroom. All values must be non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeLimits {
    /// Opcodes processed, framing opcodes included (default: 100000)
    #[serde(default = "default_max_opcodes")]
    pub max_opcodes: usize,

    /// Elements in a single list, tuple, set, or entries in a dict (default: 4096)
    #[serde(default = "default_max_collection_len")]
    pub max_collection_len: usize,

    /// Bytes in a single text, byte string, integer body or text line (default: 1MB)
    #[serde(default = "default_max_string_len")]
    pub max_string_len: usize,

    /// Memo slots (default: 10000)
    #[serde(default = "default_max_memo_len")]
    pub max_memo_len: usize,

    /// Values materialized into the result tree, memo back-references
    /// counted once per occurrence (default: 100000)
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    /// Nesting depth of the result tree (default: 64)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Text and byte payload copied into the result tree (default: 4MB)
    #[serde(default = "default_max_total_bytes")]
    pub max_total_bytes: usize,
}

pub fn default_max_opcodes() -> usize {
    100_000
}

pub fn default_max_collection_len() -> usize {
    4096
}

pub fn default_max_string_len() -> usize {
    1024 * 1024
}

pub fn default_max_memo_len() -> usize {
    10_000
}

pub fn default_max_nodes() -> usize {
    100_000
}

pub fn default_max_depth() -> usize {
    64
}

pub fn default_max_total_bytes() -> usize {
    4 * 1024 * 1024
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_opcodes: default_max_opcodes(),
            max_collection_len: default_max_collection_len(),
            max_string_len: default_max_string_len(),
            max_memo_len: default_max_memo_len(),
            max_nodes: default_max_nodes(),
            max_depth: default_max_depth(),
            max_total_bytes: default_max_total_bytes(),
        }
    }
}

impl DecodeLimits {
    /// Name and value of every ceiling, for validation and diagnostics.
    pub fn entries(&self) -> [(LimitKind, usize); 7] {
        [
            (LimitKind::Opcodes, self.max_opcodes),
            (LimitKind::CollectionLen, self.max_collection_len),
            (LimitKind::StringLen, self.max_string_len),
            (LimitKind::MemoLen, self.max_memo_len),
            (LimitKind::Nodes, self.max_nodes),
            (LimitKind::Depth, self.max_depth),
            (LimitKind::TotalBytes, self.max_total_bytes),
        ]
    }

    pub(crate) fn check_string_len(&self, len: u64) -> DecodeResult<usize> {
        match usize::try_from(len) {
            Ok(len) if len <= self.max_string_len => Ok(len),
            _ => Err(DecodeError::limit(LimitKind::StringLen, self.max_string_len)),
        }
    }

    pub(crate) fn check_collection_len(&self, len: usize) -> DecodeResult<()> {
        if len > self.max_collection_len {
            return Err(DecodeError::limit(LimitKind::CollectionLen, self.max_collection_len));
        }
        Ok(())
    }
}
