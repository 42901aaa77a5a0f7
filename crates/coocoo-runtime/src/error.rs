//! Runtime error types.

use coocoo_types::Handle;
use thiserror::Error;

/// Errors raised by the image store, the intrinsics and the host.
///
/// Intrinsic failures never reach the compiled module: the dispatcher turns
/// them into [`Handle::UNSET`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Width or height is zero, negative or above the configured maximum.
    #[error("invalid dimension {width}x{height} (each side must be 1..={max})")]
    InvalidDimension { width: i64, height: i64, max: u32 },

    /// The handle does not name an image in the store.
    #[error("unknown image handle {0}")]
    UnknownHandle(Handle),

    /// `pixels` is not `width * height * 4` bytes long.
    #[error("expected {expected} RGBA bytes, got {actual}")]
    PixelLengthMismatch { expected: usize, actual: usize },

    /// The store already holds its configured maximum of images.
    #[error("image store is full ({max} images)")]
    HandleSpaceExhausted { max: usize },

    /// Storing the image would exceed the store's byte budget.
    #[error("storing {requested} more bytes would exceed the {limit}-byte image budget")]
    ByteLimitExceeded { requested: usize, limit: usize },

    /// No input image is registered under this name.
    #[error("no input image named '{0}'")]
    UnknownInput(String),

    /// An input image with this name already exists.
    #[error("an input image named '{0}' already exists, choose another name")]
    NameTaken(String),

    /// Linking, instantiating or running a compiled module failed.
    #[error("host error: {0}")]
    Host(String),
}

/// Runtime result type alias.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
