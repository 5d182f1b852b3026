//! COG E-Paper Display Driver
//!
//! A driver for chip-on-glass (COG) e-paper panels in 1.44", 2.0" and 2.7"
//! sizes, driven line by line with temperature-compensated waveforms.
//!
//! ## Features
//!
//! - `no_std` compatible, no allocation
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Power sequencing with identity, breakage and DC/DC checks
//! - Temperature compensation in three bands
//! - `std::time::Instant` countdown timer (with `std` feature)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use epd_cog::{Builder, CountdownTimer, Display, FrameBuffers, Interface, PanelSize, Status};
//!
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # struct MockTimer;
//! # impl CountdownTimer for MockTimer {
//! #     fn start(&mut self, _duration_ms: u32) {}
//! #     fn remaining_ms(&mut self) -> u32 { 0 }
//! # }
//! # let spi = MockSpi;
//! # let (panel_on, border, discharge, rst, busy) = (MockPin, MockPin, MockPin, MockPin, MockPin);
//! # let timer = MockTimer;
//! # let mut delay = MockDelay;
//! let interface = Interface::new(spi, panel_on, border, discharge, rst, busy);
//! let config = match Builder::new().panel(PanelSize::Epd2_0).temperature(22).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let mut display = match Display::new(interface, timer, config) {
//!     Ok(display) => display,
//!     Err(_) => return,
//! };
//! let mut buffers = FrameBuffers::new(*display.profile());
//!
//! let _ = display.full_clear(&mut buffers, &mut delay);
//! if display.status() != Status::Ok {
//!     // the panel has been powered down; retry or report
//! }
//! ```

#![no_std]

#[cfg(test)]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

/// Current and pending frame images
pub mod buffer;
/// COG command and register definitions
pub mod command;
/// Temperature compensation tables
pub mod compensation;
/// Display configuration types and builder
pub mod config;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// Three-stage frame driver
pub mod frame;
/// Hardware interface abstraction
pub mod interface;
/// Line encoder
pub mod line;
/// Supported panel sizes and their geometry
pub mod panel;
/// Power sequencing
pub mod power;
/// Countdown timer for stage 2 dwell times
pub mod timer;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

#[cfg(test)]
mod mock;

pub use buffer::{FrameBuffers, ImageFormat, MAX_FRAME_SIZE};
pub use compensation::{BlockScan, Compensation, TemperatureBand, Toggle};
pub use config::{BeginPolicy, Builder, Config, DEFAULT_TEMPERATURE};
pub use display::Display;
pub use error::{BuilderError, Error};
pub use frame::ScanLine;
pub use interface::InterfaceError;
pub use interface::{CogInterface, ControlPin, DEFAULT_BUSY_TIMEOUT_MS, Interface};
pub use line::{LINE_BUFFER_CAPACITY, LineBuffer, Polarity};
pub use panel::{PanelProfile, PanelSize};
pub use power::{PowerState, Status};
pub use timer::CountdownTimer;

#[cfg(feature = "std")]
pub use timer::StdTimer;
