//! Recording test doubles for the COG, the dwell timer and delays

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;

use crate::command::{INDEX, READ_DATA, READ_ID, REG_LINE_DATA, STATUS_DC_OK, STATUS_PANEL_OK};
use crate::interface::{CogInterface, ControlPin};
use crate::timer::CountdownTimer;

/// One call seen by [`MockCog`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Event {
    Enable,
    Disable,
    Send(Vec<u8>),
    Read(Vec<u8>),
    Pin(ControlPin, PinState),
}

/// Failures raised by [`MockCog`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MockError {
    /// Transfer while the bus was disabled
    BusDisabled,
    /// Injected transfer failure
    Spi,
    /// Injected busy-wait failure
    Busy,
}

/// COG double answering identity and status reads
#[derive(Debug)]
pub(crate) struct MockCog {
    pub(crate) events: Vec<Event>,
    pub(crate) enabled: bool,
    pub(crate) busy_waits: usize,
    /// Returned by every identity read
    pub(crate) cog_id: u8,
    /// Returned by status reads, in order, before `default_status`
    pub(crate) status_replies: VecDeque<u8>,
    pub(crate) default_status: u8,
    /// Fail `busy_wait` when set
    pub(crate) busy_fails: bool,
    /// Transfers allowed before every further transfer fails
    pub(crate) transfer_budget: Option<usize>,
}

impl MockCog {
    pub(crate) fn new() -> Self {
        Self {
            events: Vec::new(),
            enabled: false,
            busy_waits: 0,
            cog_id: 0x12,
            status_replies: VecDeque::new(),
            default_status: STATUS_PANEL_OK | STATUS_DC_OK,
            busy_fails: false,
            transfer_budget: None,
        }
    }

    fn transfer(&mut self) -> Result<(), MockError> {
        if !self.enabled {
            return Err(MockError::BusDisabled);
        }
        match &mut self.transfer_budget {
            Some(0) => Err(MockError::Spi),
            Some(left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Number of transfers sent or read
    pub(crate) fn transfer_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Send(_) | Event::Read(_)))
            .count()
    }

    /// Number of line writes sent
    pub(crate) fn line_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Send(data) if data.as_slice() == [INDEX, REG_LINE_DATA]))
            .count()
    }
}

impl CogInterface for MockCog {
    type Error = MockError;

    fn enable(&mut self) -> Result<(), Self::Error> {
        self.enabled = true;
        self.events.push(Event::Enable);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        self.enabled = false;
        self.events.push(Event::Disable);
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.transfer()?;
        self.events.push(Event::Send(data.to_vec()));
        Ok(())
    }

    fn read(&mut self, command: &[u8], response: &mut [u8]) -> Result<(), Self::Error> {
        self.transfer()?;
        self.events.push(Event::Read(command.to_vec()));
        let value = match command.first() {
            Some(&READ_ID) => self.cog_id,
            Some(&READ_DATA) => self
                .status_replies
                .pop_front()
                .unwrap_or(self.default_status),
            _ => 0,
        };
        response.fill(0);
        if let Some(byte) = response.get_mut(1) {
            *byte = value;
        }
        Ok(())
    }

    fn set_pin(&mut self, pin: ControlPin, state: PinState) -> Result<(), Self::Error> {
        self.events.push(Event::Pin(pin, state));
        Ok(())
    }

    fn busy_wait<D: DelayNs>(&mut self, _delay: &mut D) -> Result<(), Self::Error> {
        self.busy_waits += 1;
        if self.busy_fails {
            return Err(MockError::Busy);
        }
        Ok(())
    }
}

/// Timer that expires after a fixed number of polls per start
#[derive(Debug)]
pub(crate) struct MockTimer {
    polls: u32,
    left: u32,
    pub(crate) starts: Vec<u32>,
}

impl MockTimer {
    pub(crate) fn new(polls: u32) -> Self {
        Self {
            polls,
            left: 0,
            starts: Vec::new(),
        }
    }
}

impl CountdownTimer for MockTimer {
    fn start(&mut self, duration_ms: u32) {
        self.starts.push(duration_ms);
        self.left = self.polls;
    }

    fn remaining_ms(&mut self) -> u32 {
        self.left = self.left.saturating_sub(1);
        self.left
    }
}

/// Delay that only adds up the requested time
#[derive(Debug, Default)]
pub(crate) struct MockDelay {
    pub(crate) total_us: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_us += u64::from(ns / 1000);
    }

    fn delay_us(&mut self, us: u32) {
        self.total_us += u64::from(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_us += u64::from(ms) * 1000;
    }
}
