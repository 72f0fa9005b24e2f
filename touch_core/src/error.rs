//! Errors raised by effect collaborators (audio, renderer).
//!
//! None of these ever stop the frame loop; they are collected per tick and
//! logged.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffectError {
    #[error("audio effect failed: {0}")]
    Audio(String),

    #[error("render effect failed: {0}")]
    Render(String),

    #[error("{what} is not available")]
    Unavailable { what: String },
}
