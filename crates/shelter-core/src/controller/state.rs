// ── List controller state machine ──

use std::fmt;

use crate::model::Collection;

/// Lifecycle of one admin list.
///
/// `Idle → Loading → {Ready, LoadError}`,
/// `Ready → Mutating → {Ready, MutationError}`, and back to `Idle` on
/// unmount.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListState {
    #[default]
    Idle,
    Loading,
    Ready,
    /// A load failed. The previous list, if any, is still published.
    LoadError { message: String },
    Mutating { operation: String },
    MutationError {
        operation: String,
        message: String,
        /// Collections whose write failed.
        failed: Vec<Collection>,
        /// Some required writes went through and were not rolled back.
        partial: bool,
    },
}

impl ListState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Whether a user-triggered change may start from here.
    pub(crate) fn accepts_mutation(&self) -> bool {
        matches!(self, Self::Ready | Self::MutationError { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::LoadError { .. } | Self::MutationError { .. })
    }
}

impl fmt::Display for ListState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Loading => f.write_str("loading"),
            Self::Ready => f.write_str("ready"),
            Self::LoadError { message } => write!(f, "load failed: {message}"),
            Self::Mutating { operation } => write!(f, "{operation} in progress"),
            Self::MutationError {
                operation, message, ..
            } => write!(f, "{operation} failed: {message}"),
        }
    }
}
