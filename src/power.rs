//! Power sequencing
//!
//! [`Display::begin`] powers the COG up, checks its identity, the panel and
//! the DC/DC converter, and leaves it ready for a refresh.
//! [`Display::end`] flushes the panel and powers it down again. Any failed
//! check records a [`Status`], powers the panel down and returns normally;
//! the caller decides whether to retry with a fresh `begin`.
//!
//! ```text
//! Off -> PoweringUp -> Verifying -> Ready ---------> PoweringDown -> Off
//!                           \                            ^
//!                            `-> Failed(status) ---------'
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;

use crate::command::*;
use crate::display::{Display, DisplayResult};
use crate::error::Error;
use crate::interface::{CogInterface, ControlPin};
use crate::line::{LineRow, LineSource, Polarity};
use crate::panel::PanelSize;
use crate::timer::CountdownTimer;

/// DC/DC charge pump attempts before giving up
pub const DC_ATTEMPTS: usize = 4;

/// Discharge pin pulses at the end of power off
pub const DISCHARGE_PULSES: usize = 10;

/// Outcome of the last power sequence
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    /// Last sequence completed
    #[default]
    Ok,
    /// COG identity did not match
    UnsupportedCog,
    /// Breakage check failed
    PanelBroken,
    /// DC/DC converter did not come up, or dropped out before power down
    DcFailed,
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::UnsupportedCog => write!(f, "unsupported COG"),
            Self::PanelBroken => write!(f, "panel broken"),
            Self::DcFailed => write!(f, "DC/DC failed"),
        }
    }
}

/// Power sequencer state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PowerState {
    /// Panel unpowered
    #[default]
    Off,
    /// Power and reset lines are being sequenced
    PoweringUp,
    /// Identity, breakage and DC/DC checks in progress
    Verifying,
    /// Charge pumps up, ready for `clear` or `paint`
    Ready,
    /// A check failed; the panel is being powered down
    Failed(Status),
    /// Flush and power down in progress
    PoweringDown,
}

impl<I, T> Display<I, T>
where
    I: CogInterface,
    T: CountdownTimer,
{
    /// Power up the COG and verify it
    ///
    /// Returns the resulting [`Status`]. Anything other than [`Status::Ok`]
    /// means the panel has already been powered down again.
    ///
    /// Blocks until the busy line drops; bound the wait with
    /// [`Interface::set_busy_timeout`](crate::Interface::set_busy_timeout).
    ///
    /// # Errors
    ///
    /// An interface error, including a busy-wait timeout, powers the panel
    /// down before it is returned.
    pub fn begin<D: DelayNs>(&mut self, delay: &mut D) -> Result<Status, Error<I>> {
        self.status = Status::Ok;
        self.power = PowerState::PoweringUp;
        log::debug!("{}: power up", self.profile.size);

        match self.power_up(delay) {
            Ok(status) => Ok(status),
            Err(error) => Err(self.abort(error, delay)),
        }
    }

    fn power_up<D: DelayNs>(&mut self, delay: &mut D) -> Result<Status, Error<I>> {
        self.set_pin(ControlPin::Reset, PinState::Low)?;
        self.set_pin(ControlPin::PanelOn, PinState::Low)?;
        self.set_pin(ControlPin::Discharge, PinState::Low)?;
        self.set_pin(ControlPin::Border, PinState::Low)?;

        self.interface.enable().map_err(Error::Interface)?;

        delay.delay_ms(5);
        self.set_pin(ControlPin::PanelOn, PinState::High)?;
        delay.delay_ms(10);

        self.set_pin(ControlPin::Reset, PinState::High)?;
        self.set_pin(ControlPin::Border, PinState::High)?;
        delay.delay_ms(5);

        self.set_pin(ControlPin::Reset, PinState::Low)?;
        delay.delay_ms(5);

        self.set_pin(ControlPin::Reset, PinState::High)?;
        delay.delay_ms(5);

        self.interface.busy_wait(delay).map_err(Error::Interface)?;

        self.power = PowerState::Verifying;

        // The first read primes the COG's output register
        self.read_byte(READ_ID)?;
        let cog_id = self.read_byte(READ_ID)?;
        log::debug!("COG id {:#04x}", cog_id);
        if cog_id & COG_ID_MASK != COG_ID {
            return self.fail(Status::UnsupportedCog, delay);
        }

        self.write_register(REG_OUTPUT_ENABLE, OUTPUT_DISABLE)?;

        self.send(&[INDEX, REG_STATUS])?;
        if self.read_byte(READ_DATA)? & STATUS_PANEL_OK == 0 {
            return self.fail(Status::PanelBroken, delay);
        }

        self.write_register(REG_POWER_SAVING, POWER_SAVING)?;

        let channel_select = self.profile.channel_select;
        self.send(&[INDEX, REG_CHANNEL_SELECT])?;
        self.send(channel_select)?;

        self.write_register(REG_OSCILLATOR, OSCILLATOR_ON)?;
        self.write_register(REG_POWER_SETTING, POWER_SETTING)?;
        self.write_register(REG_VCOM_LEVEL, VCOM_LEVEL)?;
        self.write_register(REG_POWER, POWER_ON)?;
        self.write_register(REG_LATCH, LATCH_ON)?;
        self.write_register(REG_LATCH, LATCH_OFF)?;

        delay.delay_ms(5);

        let mut dc_ok = false;
        for attempt in 1..=DC_ATTEMPTS {
            self.write_register(REG_CHARGE_PUMP, PUMP_POSITIVE)?;
            delay.delay_ms(240);

            self.write_register(REG_CHARGE_PUMP, PUMP_NEGATIVE)?;
            delay.delay_ms(40);

            self.write_register(REG_CHARGE_PUMP, PUMP_VCOM)?;
            delay.delay_ms(40);

            if self.dc_ok()? {
                log::debug!("DC/DC up after {} attempt(s)", attempt);
                dc_ok = true;
                break;
            }
            log::debug!("DC/DC attempt {} failed", attempt);
        }
        if !dc_ok {
            return self.fail(Status::DcFailed, delay);
        }

        self.write_register(REG_OUTPUT_ENABLE, OUTPUT_DISABLE)?;
        self.interface.disable().map_err(Error::Interface)?;

        self.power = PowerState::Ready;
        Ok(self.status)
    }

    /// Flush the panel and power the COG down
    ///
    /// Returns the resulting [`Status`]; [`Status::DcFailed`] if the DC/DC
    /// converter dropped out during the refresh.
    ///
    /// # Errors
    ///
    /// An interface error powers the panel down before it is returned.
    pub fn end<D: DelayNs>(&mut self, delay: &mut D) -> Result<Status, Error<I>> {
        self.ensure_ready()?;
        self.power = PowerState::PoweringDown;
        log::debug!("{}: power down", self.profile.size);

        match self.power_down(delay) {
            Ok(status) => Ok(status),
            Err(error) => Err(self.abort(error, delay)),
        }
    }

    fn power_down<D: DelayNs>(&mut self, delay: &mut D) -> Result<Status, Error<I>> {
        match self.profile.size {
            PanelSize::Epd2_7 => {
                delay.delay_ms(25);
                self.set_pin(ControlPin::Border, PinState::Low)?;
                delay.delay_ms(250);
                self.set_pin(ControlPin::Border, PinState::High)?;
            }
            PanelSize::Epd1_44 | PanelSize::Epd2_0 => {
                for (border, dwell_ms) in [(0xff, 40), (0xaa, 200), (0x00, 25)] {
                    self.send_line(
                        LineRow::Blank,
                        LineSource::Fixed(0x00),
                        Polarity::Normal,
                        border,
                        delay,
                    )?;
                    delay.delay_ms(dwell_ms);
                }
            }
        }

        self.interface.enable().map_err(Error::Interface)?;

        if !self.dc_ok()? {
            return self.fail(Status::DcFailed, delay);
        }

        self.write_register(REG_LATCH, LATCH_ON)?;
        self.write_register(REG_OUTPUT_ENABLE, OUTPUT_OFF)?;
        self.write_register(REG_CHARGE_PUMP, PUMP_POSITIVE_OFF)?;
        self.write_register(REG_CHARGE_PUMP, PUMP_VCOM_OFF)?;
        self.write_register(REG_CHARGE_PUMP, PUMP_ALL_OFF)?;
        self.write_register(REG_OSCILLATOR, OSCILLATOR_OFF)?;

        self.write_register(REG_POWER, DISCHARGE_ON)?;
        delay.delay_ms(120);
        self.write_register(REG_POWER, DISCHARGE_OFF)?;

        self.power_off(delay)?;
        Ok(self.status)
    }

    /// Record a failed check and power down
    fn fail<D: DelayNs>(&mut self, status: Status, delay: &mut D) -> Result<Status, Error<I>> {
        log::warn!("{}: {}, powering down", self.profile.size, status);
        self.status = status;
        self.power = PowerState::Failed(status);
        self.power_off(delay)?;
        Ok(status)
    }

    /// Check the DC/DC health bit
    fn dc_ok(&mut self) -> Result<bool, Error<I>> {
        self.send(&[INDEX, REG_STATUS])?;
        Ok(self.read_byte(READ_DATA)? & STATUS_DC_OK != 0)
    }

    /// Power the panel down after an operation failed with `error`
    ///
    /// Does nothing if the panel is already off. Returns `error`; a failure
    /// while powering down is only logged.
    pub(crate) fn abort<D: DelayNs>(&mut self, error: Error<I>, delay: &mut D) -> Error<I> {
        if self.power == PowerState::Off {
            return error;
        }
        log::warn!("{}: {}, powering down", self.profile.size, error);
        if let Err(off_error) = self.power_off(delay) {
            log::warn!("{}: power down incomplete: {}", self.profile.size, off_error);
        }
        error
    }

    /// Drop all signals and pulse the discharge line
    ///
    /// Every step is attempted even if an earlier one fails; the first
    /// error is returned. The state is `Off` afterwards either way.
    fn power_off<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        let mut result = self.set_pin(ControlPin::Reset, PinState::Low);
        keep_first(&mut result, self.set_pin(ControlPin::PanelOn, PinState::Low));
        keep_first(&mut result, self.set_pin(ControlPin::Border, PinState::Low));

        keep_first(&mut result, self.interface.disable().map_err(Error::Interface));

        for _ in 0..DISCHARGE_PULSES {
            delay.delay_ms(10);
            keep_first(&mut result, self.set_pin(ControlPin::Discharge, PinState::High));
            delay.delay_ms(10);
            keep_first(&mut result, self.set_pin(ControlPin::Discharge, PinState::Low));
        }

        self.power = PowerState::Off;
        result
    }
}

fn keep_first<E>(result: &mut Result<(), E>, step: Result<(), E>) {
    if result.is_ok() {
        *result = step;
    }
}
