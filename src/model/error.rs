use std::fmt::Display;

use crate::error::StdErrorExt;

/// Part of a binary STL stream that was being read when the stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    TriangleCount,
    /// Zero based index of the triangle record.
    Triangle(u32),
}

impl Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Header => write!(f, "header"),
            Section::TriangleCount => write!(f, "triangle count"),
            Section::Triangle(index) => write!(f, "triangle {}", index),
        }
    }
}

/// Condition kind of an [`AnalysisError`], stable across messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedFormat,
    Malformed,
    PrematureEnd,
    InvalidMesh,
    TooLarge,
    Stream,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat => "unsupported_format",
            Self::Malformed => "malformed_input",
            Self::PrematureEnd => "premature_end",
            Self::InvalidMesh => "invalid_mesh",
            Self::TooLarge => "too_large",
            Self::Stream => "stream",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("unsupported model format: {reason}")]
    UnsupportedFormat { reason: String },

    #[error("malformed STL: {message}")]
    Malformed { message: String },

    #[error("model stream ended while reading the {section}: expected {expected} bytes, got {got}")]
    PrematureEnd {
        section: Section,
        expected: usize,
        got: usize,
    },

    #[error("invalid mesh: {reason}")]
    InvalidMesh { reason: String },

    #[error("model exceeds the size limit of {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("error reading model stream")]
    Stream(#[source] anyhow::Error),
}

impl AnalysisError {
    pub fn unsupported_format(reason: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            reason: reason.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub fn invalid_mesh(reason: impl Into<String>) -> Self {
        Self::InvalidMesh {
            reason: reason.into(),
        }
    }

    pub fn stream<E>(err: E) -> Self
    where
        E: StdErrorExt,
    {
        Self::Stream(anyhow::Error::new(err))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::Malformed { .. } => ErrorKind::Malformed,
            Self::PrematureEnd { .. } => ErrorKind::PrematureEnd,
            Self::InvalidMesh { .. } => ErrorKind::InvalidMesh,
            Self::TooLarge { .. } => ErrorKind::TooLarge,
            Self::Stream(_) => ErrorKind::Stream,
        }
    }
}
