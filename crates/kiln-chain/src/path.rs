//! Stable, segmented addresses for chain nodes.

use std::fmt;

use crate::error::{ChainError, Result};

/// A dotted address such as `output.publicPath`.
///
/// Segments are non-empty and may not contain `.`; use
/// [`ChainPath::from_segments`] when a key is computed at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ChainPath {
    segments: Vec<String>,
}

impl ChainPath {
    /// The empty path, addressing the chain root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Ok(Self::root());
        }

        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(ChainError::InvalidPath {
                path: path.to_string(),
                reason: "empty segment".to_string(),
            });
        }

        Ok(Self { segments })
    }

    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        for segment in &segments {
            if segment.is_empty() || segment.contains('.') {
                return Err(ChainError::InvalidPath {
                    path: segments.join("."),
                    reason: format!("segment `{segment}` is empty or contains '.'"),
                });
            }
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn join(&self, other: &ChainPath) -> ChainPath {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        ChainPath { segments }
    }

    /// Split into the parent path and the final key.
    pub fn split_last(&self) -> Option<(&[String], &str)> {
        self.segments
            .split_last()
            .map(|(last, parent)| (parent, last.as_str()))
    }
}

impl fmt::Display for ChainPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Anything that can name a chain node.
pub trait IntoChainPath {
    fn into_chain_path(self) -> Result<ChainPath>;
}

impl IntoChainPath for &str {
    fn into_chain_path(self) -> Result<ChainPath> {
        ChainPath::parse(self)
    }
}

impl IntoChainPath for String {
    fn into_chain_path(self) -> Result<ChainPath> {
        ChainPath::parse(&self)
    }
}

impl IntoChainPath for ChainPath {
    fn into_chain_path(self) -> Result<ChainPath> {
        Ok(self)
    }
}

impl IntoChainPath for &ChainPath {
    fn into_chain_path(self) -> Result<ChainPath> {
        Ok(self.clone())
    }
}
