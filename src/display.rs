//! Core display operations
//!
//! [`Display`] is the live hardware session: it owns the interface, the
//! countdown timer and the scratch line buffer, and carries the panel
//! profile, the selected temperature compensation and the status of the
//! last power sequence.
//!
//! A refresh is always bracketed by a power sequence:
//!
//! ```rust,no_run
//! # use embedded_hal::delay::DelayNs;
//! # use epd_cog::{CogInterface, CountdownTimer, Display, Error};
//! # fn demo<I: CogInterface, T: CountdownTimer, D: DelayNs>(
//! #     display: &mut Display<I, T>,
//! #     image: &[u8],
//! #     delay: &mut D,
//! # ) -> Result<(), Error<I>> {
//! display.set_temperature(19);
//! display.begin(delay)?;
//! display.paint(image, delay)?;
//! display.end(delay)?;
//! # Ok(())
//! # }
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;

use crate::buffer::FrameBuffers;
use crate::command::{DATA, INDEX, OUTPUT_TO_PANEL, REG_LINE_DATA, REG_OUTPUT_ENABLE};
use crate::compensation::Compensation;
use crate::config::{BeginPolicy, BuilderError, Config};
use crate::error::Error;
use crate::interface::{CogInterface, ControlPin};
use crate::line::{LineBuffer, LineRow, LineSource, Polarity};
use crate::panel::PanelProfile;
use crate::power::{PowerState, Status};
use crate::timer::CountdownTimer;

pub(crate) type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Settle time after selecting the line data register, in microseconds
const LINE_SETTLE_US: u32 = 10;

/// Core display driver for COG panels
pub struct Display<I, T>
where
    I: CogInterface,
    T: CountdownTimer,
{
    /// Hardware interface
    pub(crate) interface: I,
    /// Stage 2 dwell timer
    pub(crate) timer: T,
    /// Display configuration
    pub(crate) config: Config,
    /// Panel geometry
    pub(crate) profile: PanelProfile,
    /// Waveform timing for the current temperature
    pub(crate) compensation: &'static Compensation,
    /// Current ambient temperature in °C
    pub(crate) temperature: i16,
    /// Result of the last power sequence
    pub(crate) status: Status,
    /// Power sequencer state
    pub(crate) power: PowerState,
    /// Scratch buffer for line payloads
    pub(crate) line: LineBuffer,
}

impl<I, T> Display<I, T>
where
    I: CogInterface,
    T: CountdownTimer,
{
    /// Create a new Display instance
    ///
    /// Nothing is sent to the panel until [`Display::begin`].
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::LineBufferCapacity`] if the scratch line
    /// buffer cannot hold a line of the configured panel.
    pub fn new(interface: I, timer: T, config: Config) -> Result<Self, BuilderError> {
        let profile = config.profile();
        let line = LineBuffer::new(&profile)?;
        let temperature = config.temperature;
        log::debug!(
            "{}: line buffer {} bytes, {} °C",
            profile.size,
            line.len(),
            temperature
        );
        Ok(Self {
            interface,
            timer,
            compensation: Compensation::select(config.panel, temperature),
            config,
            profile,
            temperature,
            status: Status::Ok,
            power: PowerState::Off,
            line,
        })
    }

    /// Release the interface and timer
    pub fn release(self) -> (I, T) {
        (self.interface, self.timer)
    }

    /// Set the ambient temperature and select the matching compensation
    pub fn set_temperature(&mut self, celsius: i16) {
        self.temperature = celsius;
        self.compensation = Compensation::select(self.profile.size, celsius);
    }

    /// Current ambient temperature in °C
    pub fn temperature(&self) -> i16 {
        self.temperature
    }

    /// Waveform timing for the current temperature
    pub fn compensation(&self) -> &'static Compensation {
        self.compensation
    }

    /// Status of the last power sequence
    pub fn status(&self) -> Status {
        self.status
    }

    /// Current power sequencer state
    pub fn power_state(&self) -> PowerState {
        self.power
    }

    /// Get the panel geometry
    pub fn profile(&self) -> &PanelProfile {
        &self.profile
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Access the underlying interface
    pub fn interface(&self) -> &I {
        &self.interface
    }

    /// Clear the panel in one power cycle and zero the current image
    ///
    /// Runs `begin`, `clear` and `end`. If the clear fails the panel is
    /// powered down before the error is returned.
    pub fn full_clear<D: DelayNs>(
        &mut self,
        buffers: &mut FrameBuffers,
        delay: &mut D,
    ) -> DisplayResult<I> {
        self.begin(delay)?;
        if let Err(error) = self.clear(delay) {
            return Err(self.abort(error, delay));
        }
        self.end(delay)?;
        buffers.reset_current();
        Ok(())
    }

    /// Paint the pending image in one power cycle and make it current
    ///
    /// Runs `begin`, `paint` and `end`. If the paint fails the panel is
    /// powered down before the error is returned.
    pub fn full_update<D: DelayNs>(
        &mut self,
        buffers: &mut FrameBuffers,
        delay: &mut D,
    ) -> DisplayResult<I> {
        self.begin(delay)?;
        if let Err(error) = self.paint(buffers.pending(), delay) {
            return Err(self.abort(error, delay));
        }
        self.end(delay)?;
        buffers.commit();
        Ok(())
    }

    /// Check the begin policy before driving the panel
    pub(crate) fn ensure_ready(&self) -> DisplayResult<I> {
        if self.power == PowerState::Ready {
            return Ok(());
        }
        match self.config.begin_policy {
            BeginPolicy::FailClosed => Err(Error::NotReady {
                status: self.status,
            }),
            BeginPolicy::FailOpen => {
                log::warn!("panel not ready ({}), continuing", self.status);
                Ok(())
            }
        }
    }

    /// Send one line to the panel
    pub(crate) fn send_line<D: DelayNs>(
        &mut self,
        row: LineRow,
        source: LineSource<'_>,
        polarity: Polarity,
        border: u8,
        delay: &mut D,
    ) -> DisplayResult<I> {
        self.interface.enable().map_err(Error::Interface)?;
        self.send(&[INDEX, REG_LINE_DATA])?;
        delay.delay_us(LINE_SETTLE_US);

        let payload = self
            .line
            .encode(&self.profile, row, source, polarity, border);
        self.interface.send(payload).map_err(Error::Interface)?;

        self.write_register(REG_OUTPUT_ENABLE, OUTPUT_TO_PANEL)?;
        self.interface.disable().map_err(Error::Interface)
    }

    /// Select a register and write one value to it
    pub(crate) fn write_register(&mut self, register: u8, value: u8) -> DisplayResult<I> {
        self.send(&[INDEX, register])?;
        self.send(&[DATA, value])
    }

    /// Send a read header and return the value byte
    pub(crate) fn read_byte(&mut self, header: u8) -> Result<u8, Error<I>> {
        let mut response = [0u8; 2];
        self.interface
            .read(&[header, 0x00], &mut response)
            .map_err(Error::Interface)?;
        Ok(response[1])
    }

    pub(crate) fn send(&mut self, data: &[u8]) -> DisplayResult<I> {
        self.interface.send(data).map_err(Error::Interface)
    }

    pub(crate) fn set_pin(&mut self, pin: ControlPin, state: PinState) -> DisplayResult<I> {
        self.interface.set_pin(pin, state).map_err(Error::Interface)
    }
}
