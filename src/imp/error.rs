// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use std::fmt::Display;

/// Backend failures that prevent an upload from starting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The context could not allocate a texture name.
    CreateTexture(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::CreateTexture(e) => write!(f, "can't create texture: {}", e),
        }
    }
}

/// A `glGetError` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum GlError {
    #[error("GL_INVALID_ENUM")]
    InvalidEnum,
    #[error("GL_INVALID_VALUE")]
    InvalidValue,
    #[error("GL_INVALID_OPERATION")]
    InvalidOperation,
    #[error("GL_OUT_OF_MEMORY")]
    OutOfMemory,
    #[error("GL error 0x{0:04X}")]
    Other(u32),
}

impl GlError {
    pub const INVALID_ENUM: u32 = 0x0500;
    pub const INVALID_VALUE: u32 = 0x0501;
    pub const INVALID_OPERATION: u32 = 0x0502;
    pub const OUT_OF_MEMORY: u32 = 0x0505;

    /// Maps a raw error code; `None` for `GL_NO_ERROR`.
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => None,
            Self::INVALID_ENUM => Some(GlError::InvalidEnum),
            Self::INVALID_VALUE => Some(GlError::InvalidValue),
            Self::INVALID_OPERATION => Some(GlError::InvalidOperation),
            Self::OUT_OF_MEMORY => Some(GlError::OutOfMemory),
            other => Some(GlError::Other(other)),
        }
    }
}
