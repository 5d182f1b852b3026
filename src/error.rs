//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and display operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors during display operations
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level hardware communication errors
//!
//! Hardware handshake failures (unsupported COG, broken panel, DC/DC
//! failure) are not errors here: they are recorded in the display's
//! [`Status`](crate::Status) and the sequence powers the panel down.
//!
//! ## Example
//!
//! ```
//! use epd_cog::{Builder, BuilderError, PanelSize};
//!
//! // Missing panel size
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingPanel)));
//!
//! // Unknown panel key
//! let result = "3.1".parse::<PanelSize>();
//! assert!(matches!(result, Err(BuilderError::UnsupportedSize)));
//! ```

use crate::interface::CogInterface;
use crate::power::Status;

/// Errors that can occur when driving the display
///
/// Generic over the interface type to preserve the specific error type.
#[derive(Debug)]
pub enum Error<I: CogInterface> {
    /// Interface error (SPI/GPIO)
    ///
    /// Wraps the underlying hardware error from the [`CogInterface`] implementation.
    Interface(I::Error),
    /// Image buffer does not match the panel's frame size
    ImageSize {
        /// Required buffer size in bytes
        required: usize,
        /// Provided buffer size in bytes
        provided: usize,
    },
    /// Operation refused because the panel is not powered up
    ///
    /// Only returned under [`BeginPolicy::FailClosed`](crate::BeginPolicy::FailClosed).
    NotReady {
        /// Status recorded by the last power sequence
        status: Status,
    },
}

impl<I: CogInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(_) => write!(f, "Interface error"),
            Self::ImageSize { required, provided } => {
                write!(
                    f,
                    "Image size mismatch: required {required} bytes, provided {provided}"
                )
            }
            Self::NotReady { status } => write!(f, "Panel not ready: {status}"),
        }
    }
}

impl<I: CogInterface + core::fmt::Debug> core::error::Error for Error<I> {}

/// Errors that can occur when building configuration
#[derive(Debug, PartialEq, Eq)]
pub enum BuilderError {
    /// Panel size was not specified
    ///
    /// [`Builder::panel()`](crate::config::Builder::panel) must be called before building.
    MissingPanel,
    /// Panel selector does not name a supported size
    UnsupportedSize,
    /// The scratch line buffer cannot hold one line of the panel
    LineBufferCapacity {
        /// Bytes one line needs
        required: usize,
        /// Bytes available
        capacity: usize,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingPanel => write!(f, "Panel size must be specified"),
            Self::UnsupportedSize => write!(f, "Unsupported panel size (expected 1.44, 2.0 or 2.7)"),
            Self::LineBufferCapacity { required, capacity } => write!(
                f,
                "Line buffer too small: required {required} bytes, capacity {capacity}"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}
