use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::assets::AssetKind;

/// Failure to load one of the game's required assets.
#[derive(Debug)]
pub enum AssetError {
    Io {
        kind: AssetKind,
        path: PathBuf,
        source: io::Error,
    },
    Corrupt {
        kind: AssetKind,
        path: PathBuf,
        reason: String,
    },
}

impl AssetError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::Corrupt { path, .. } => path.as_path(),
        }
    }
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { kind, path, source } => {
                write!(f, "error loading {kind}: {} - {source}", path.display())
            }
            Self::Corrupt { kind, path, reason } => {
                write!(f, "error loading {kind}: {} - {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Corrupt { .. } => None,
        }
    }
}

/// Failure to build a usable word bank.
#[derive(Debug)]
pub enum WordBankError {
    Io { path: PathBuf, source: io::Error },
    Parse(serde_json::Error),
    EmptyField { index: usize },
    TooFewWords { distinct: usize, needed: usize },
}

impl fmt::Display for WordBankError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read word list {}: {source}", path.display())
            }
            Self::Parse(e) => write!(f, "malformed word list: {e}"),
            Self::EmptyField { index } => write!(f, "word pair {index} has an empty field"),
            Self::TooFewWords { distinct, needed } => write!(
                f,
                "word list has {distinct} distinct English words, need at least {needed}"
            ),
        }
    }
}

impl std::error::Error for WordBankError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for WordBankError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}
