use std::fmt;
use thiserror::Error;

/// Result alias for decoder operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Resource ceiling that tripped a [`DecodeError::LimitExceeded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitKind {
    Opcodes,
    CollectionLen,
    StringLen,
    MemoLen,
    Nodes,
    Depth,
    TotalBytes,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LimitKind::Opcodes => "max_opcodes",
            LimitKind::CollectionLen => "max_collection_len",
            LimitKind::StringLen => "max_string_len",
            LimitKind::MemoLen => "max_memo_len",
            LimitKind::Nodes => "max_nodes",
            LimitKind::Depth => "max_depth",
            LimitKind::TotalBytes => "max_total_bytes",
        };
        f.write_str(name)
    }
}

/// Errors produced while decoding a pickle stream.
///
/// Every variant aborts the whole decode. Nothing partial is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// An opcode or its operand needs more bytes than remain, or the input
    /// ended before `STOP`.
    #[error("truncated input at offset {offset}: {context}")]
    Truncated { offset: usize, context: &'static str },

    /// The stream is byte-complete but does not describe a consistent value.
    #[error("malformed stream at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: String },

    /// The opcode is outside the data-only subset. Type references,
    /// reductions and object construction always land here.
    #[error("unsupported opcode {opcode:#04x} ({name}) at offset {offset}")]
    UnsupportedOpcode {
        opcode: u8,
        name: &'static str,
        offset: usize,
    },

    /// A configured resource ceiling was exceeded.
    #[error("decode limit {limit} exceeded (max {max})")]
    LimitExceeded { limit: LimitKind, max: usize },
}

impl DecodeError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        DecodeError::Malformed {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn limit(limit: LimitKind, max: usize) -> Self {
        DecodeError::LimitExceeded { limit, max }
    }

    /// Short, stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::Truncated { .. } => "truncated",
            DecodeError::Malformed { .. } => "malformed",
            DecodeError::UnsupportedOpcode { .. } => "unsupported_opcode",
            DecodeError::LimitExceeded { .. } => "limit_exceeded",
        }
    }
}
