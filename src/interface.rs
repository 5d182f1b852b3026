//! Hardware interface abstraction
//!
//! This module provides the [`CogInterface`] trait and the [`Interface`] struct
//! for communicating with the COG over SPI and driving its control lines.
//!
//! ## Hardware Requirements
//!
//! The COG requires:
//! - SPI bus (MOSI + MISO + SCK + CS)
//! - 5 GPIO pins:
//!   - **PANEL_ON**: Panel power (output)
//!   - **BORDER**: Border control (output)
//!   - **DISCHARGE**: Discharge pulse (output)
//!   - **RESET**: Reset (output, active low)
//!   - **BUSY**: Busy status (input, active high)
//!
//! Pin direction is fixed by the pin types: the four control lines must
//! implement [`OutputPin`], the busy line [`InputPin`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin, PinState};
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use epd_cog::{CogInterface, ControlPin, Interface};
//! # use core::convert::Infallible;
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
//! # let mut delay = MockDelay;
//! let mut interface = Interface::new(MockSpi, MockPin, MockPin, MockPin, MockPin, MockPin);
//!
//! // Power the panel and enable the bus
//! let _ = interface.set_pin(ControlPin::PanelOn, PinState::High);
//! let _ = interface.enable();
//!
//! // Select the status register
//! let _ = interface.send(&[0x70, 0x0f]);
//!
//! // Wait for the COG to become ready
//! let _ = interface.busy_wait(&mut delay);
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};
use embedded_hal::spi::SpiDevice;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Busy line polling interval in microseconds
pub const BUSY_POLL_US: u32 = 10;

/// Default timeout for busy-wait in milliseconds (0 = wait forever)
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 0;

/// Output control lines of the COG
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlPin {
    /// Panel power
    PanelOn,
    /// Border
    Border,
    /// Discharge
    Discharge,
    /// Reset (active low)
    Reset,
}

/// Trait for hardware interface to the COG
///
/// This trait abstracts over different hardware implementations,
/// allowing the [`Display`](crate::display::Display) to work with any
/// SPI + GPIO implementation.
///
/// ## Implementing
///
/// For most cases, use the provided [`Interface`] struct. Implement the trait
/// yourself for a bit-banged bus or to record traffic in tests.
pub trait CogInterface {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Enable the SPI bus
    fn enable(&mut self) -> InterfaceResult<(), Self::Error>;

    /// Disable the SPI bus, leaving MOSI and SCK low
    fn disable(&mut self) -> InterfaceResult<(), Self::Error>;

    /// Send bytes as one chip-select framed write
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails.
    fn send(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Send `command` while clocking in `response`
    ///
    /// `response` receives as many bytes as it is long.
    fn read(&mut self, command: &[u8], response: &mut [u8]) -> InterfaceResult<(), Self::Error>;

    /// Drive one of the output control lines
    fn set_pin(&mut self, pin: ControlPin, state: PinState) -> InterfaceResult<(), Self::Error>;

    /// Wait for the busy line to go low
    ///
    /// Polls every [`BUSY_POLL_US`] microseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin cannot be read, or if the implementation
    /// bounds the wait and the line stays busy.
    fn busy_wait<D: DelayNs>(&mut self, delay: &mut D) -> InterfaceResult<(), Self::Error>;
}

/// Errors that can occur at the interface level
///
/// Generic over SPI and GPIO error types.
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
    /// Transfer attempted while the bus is disabled
    BusDisabled,
    /// Timeout waiting for busy pin
    Timeout,
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
            Self::BusDisabled => write!(f, "SPI bus is disabled"),
            Self::Timeout => write!(f, "Timeout waiting for COG"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// Hardware interface implementation for the COG
///
/// Implements [`CogInterface`] for embedded-hal v1.0 SPI and GPIO traits.
///
/// ## Type Parameters
///
/// * `SPI` - SPI device implementing [`SpiDevice`]
/// * `ON` - Panel power pin implementing [`OutputPin`]
/// * `BORDER` - Border pin implementing [`OutputPin`]
/// * `DISCHARGE` - Discharge pin implementing [`OutputPin`]
/// * `RST` - Reset pin implementing [`OutputPin`]
/// * `BUSY` - Busy pin implementing [`InputPin`]
pub struct Interface<SPI, ON, BORDER, DISCHARGE, RST, BUSY> {
    /// SPI device for communication
    spi: SPI,
    /// Panel power pin
    panel_on: ON,
    /// Border pin
    border: BORDER,
    /// Discharge pin
    discharge: DISCHARGE,
    /// Reset pin (active low)
    rst: RST,
    /// Busy pin (active high)
    busy: BUSY,
    /// Whether transfers are currently allowed
    bus_enabled: bool,
    /// Timeout for busy-wait in milliseconds (0 = none)
    busy_timeout_ms: u32,
}

impl<SPI, ON, BORDER, DISCHARGE, RST, BUSY> Interface<SPI, ON, BORDER, DISCHARGE, RST, BUSY>
where
    SPI: SpiDevice,
    ON: OutputPin,
    BORDER: OutputPin,
    DISCHARGE: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
{
    /// Create a new Interface
    ///
    /// The bus starts disabled.
    pub fn new(
        spi: SPI,
        panel_on: ON,
        border: BORDER,
        discharge: DISCHARGE,
        rst: RST,
        busy: BUSY,
    ) -> Self {
        Self {
            spi,
            panel_on,
            border,
            discharge,
            rst,
            busy,
            bus_enabled: false,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    /// Set the busy-wait timeout in milliseconds
    ///
    /// Default is 0, which waits for the COG indefinitely. A non-zero value
    /// makes [`CogInterface::busy_wait`] fail with [`InterfaceError::Timeout`].
    pub fn set_busy_timeout(&mut self, timeout_ms: u32) -> &mut Self {
        self.busy_timeout_ms = timeout_ms;
        self
    }

    /// Get the current busy-wait timeout in milliseconds
    pub fn busy_timeout(&self) -> u32 {
        self.busy_timeout_ms
    }

    /// Whether the bus is enabled
    pub fn is_enabled(&self) -> bool {
        self.bus_enabled
    }

    /// Release the SPI device and pins
    pub fn release(self) -> (SPI, ON, BORDER, DISCHARGE, RST, BUSY) {
        (
            self.spi,
            self.panel_on,
            self.border,
            self.discharge,
            self.rst,
            self.busy,
        )
    }
}

impl<SPI, ON, BORDER, DISCHARGE, RST, BUSY, PinErr> CogInterface
    for Interface<SPI, ON, BORDER, DISCHARGE, RST, BUSY>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    ON: OutputPin<Error = PinErr>,
    BORDER: OutputPin<Error = PinErr>,
    DISCHARGE: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = InterfaceError<SPI::Error, PinErr>;

    fn enable(&mut self) -> InterfaceResult<(), Self::Error> {
        log::trace!("spi bus enabled");
        self.bus_enabled = true;
        Ok(())
    }

    fn disable(&mut self) -> InterfaceResult<(), Self::Error> {
        log::trace!("spi bus disabled");
        self.bus_enabled = false;
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error> {
        if !self.bus_enabled {
            return Err(InterfaceError::BusDisabled);
        }
        self.spi.write(data).map_err(InterfaceError::Spi)
    }

    fn read(&mut self, command: &[u8], response: &mut [u8]) -> InterfaceResult<(), Self::Error> {
        if !self.bus_enabled {
            return Err(InterfaceError::BusDisabled);
        }
        self.spi
            .transfer(response, command)
            .map_err(InterfaceError::Spi)
    }

    fn set_pin(&mut self, pin: ControlPin, state: PinState) -> InterfaceResult<(), Self::Error> {
        let result = match pin {
            ControlPin::PanelOn => self.panel_on.set_state(state),
            ControlPin::Border => self.border.set_state(state),
            ControlPin::Discharge => self.discharge.set_state(state),
            ControlPin::Reset => self.rst.set_state(state),
        };
        result.map_err(InterfaceError::Pin)
    }

    fn busy_wait<D: DelayNs>(&mut self, delay: &mut D) -> InterfaceResult<(), Self::Error> {
        let limit = self.busy_timeout_ms.saturating_mul(1000 / BUSY_POLL_US);
        let mut iterations = 0u32;

        loop {
            if !self.busy.is_high().map_err(InterfaceError::Pin)? {
                return Ok(());
            }

            delay.delay_us(BUSY_POLL_US);
            iterations = iterations.saturating_add(1);
            if limit > 0 && iterations >= limit {
                log::warn!("COG busy for more than {} ms", self.busy_timeout_ms);
                return Err(InterfaceError::Timeout);
            }
        }
    }
}
