//! COG command and register definitions
//!
//! The COG is driven with two-byte frames on the SPI bus. A register is
//! selected by sending [`INDEX`] followed by the register number, and then
//! written by sending [`DATA`] followed by the value. Reads send a read
//! header ([`READ_ID`] or [`READ_DATA`]) with a dummy byte; the second
//! response byte carries the value.
//!
//! ## Example
//!
//! ```rust,no_run
//! use epd_cog::{command, CogInterface};
//! # fn demo<I: CogInterface>(interface: &mut I) -> Result<(), I::Error> {
//! // Disable output enable
//! interface.send(&[command::INDEX, command::REG_OUTPUT_ENABLE])?;
//! interface.send(&[command::DATA, command::OUTPUT_DISABLE])?;
//!
//! // Read the COG identity
//! let mut response = [0u8; 2];
//! interface.read(&[command::READ_ID, 0x00], &mut response)?;
//! # Ok(())
//! # }
//! ```

// Frame headers

/// Register index header (0x70)
///
/// The next byte on the bus selects the register to access.
pub const INDEX: u8 = 0x70;

/// COG identity read header (0x71)
pub const READ_ID: u8 = 0x71;

/// Register data header (0x72)
///
/// Prefixes register values, the channel select mask and line payloads.
pub const DATA: u8 = 0x72;

/// Register read header (0x73)
pub const READ_DATA: u8 = 0x73;

// Register numbers

/// Channel select register (0x01)
///
/// Written with the panel's 9-byte channel select mask.
pub const REG_CHANNEL_SELECT: u8 = 0x01;

/// Output enable register (0x02)
pub const REG_OUTPUT_ENABLE: u8 = 0x02;

/// Driver latch register (0x03)
pub const REG_LATCH: u8 = 0x03;

/// Power setting / internal discharge register (0x04)
pub const REG_POWER: u8 = 0x04;

/// Charge pump control register (0x05)
pub const REG_CHARGE_PUMP: u8 = 0x05;

/// Oscillator register (0x07)
pub const REG_OSCILLATOR: u8 = 0x07;

/// Power setting register (0x08)
pub const REG_POWER_SETTING: u8 = 0x08;

/// Vcom level register (0x09)
pub const REG_VCOM_LEVEL: u8 = 0x09;

/// Line data register (0x0A)
///
/// Selected before every line payload.
pub const REG_LINE_DATA: u8 = 0x0a;

/// Power saving mode register (0x0B)
pub const REG_POWER_SAVING: u8 = 0x0b;

/// Status register (0x0F)
///
/// Carries the panel breakage bit ([`STATUS_PANEL_OK`]) and the DC/DC
/// health bit ([`STATUS_DC_OK`]).
pub const REG_STATUS: u8 = 0x0f;

// Register values

/// Expected low nibble of the COG identity byte
pub const COG_ID: u8 = 0x02;

/// Mask applied to the identity byte before comparing with [`COG_ID`]
pub const COG_ID_MASK: u8 = 0x0f;

/// Status bit set when the panel is intact
pub const STATUS_PANEL_OK: u8 = 0x80;

/// Status bit set when the DC/DC converter is healthy
pub const STATUS_DC_OK: u8 = 0x40;

/// Output enable: disabled
pub const OUTPUT_DISABLE: u8 = 0x40;

/// Output enable: off during power down
pub const OUTPUT_OFF: u8 = 0x05;

/// Output enable: drive the latched line to the panel
pub const OUTPUT_TO_PANEL: u8 = 0x2f;

/// Power saving mode value
pub const POWER_SAVING: u8 = 0x02;

/// High power oscillator mode
pub const OSCILLATOR_ON: u8 = 0xd1;

/// Oscillator off
pub const OSCILLATOR_OFF: u8 = 0x0d;

/// Power setting value
pub const POWER_SETTING: u8 = 0x02;

/// Vcom level value
pub const VCOM_LEVEL: u8 = 0xc2;

/// Power register value written during power up
pub const POWER_ON: u8 = 0x03;

/// Internal discharge on
pub const DISCHARGE_ON: u8 = 0x83;

/// Internal discharge off
pub const DISCHARGE_OFF: u8 = 0x00;

/// Driver latch on
pub const LATCH_ON: u8 = 0x01;

/// Driver latch off
pub const LATCH_OFF: u8 = 0x00;

/// Charge pump: positive voltage on (VGH/VDH)
pub const PUMP_POSITIVE: u8 = 0x01;

/// Charge pump: negative voltage on (VGL/VDL)
pub const PUMP_NEGATIVE: u8 = 0x03;

/// Charge pump: Vcom driver on
pub const PUMP_VCOM: u8 = 0x0f;

/// Charge pump: positive pump off
pub const PUMP_POSITIVE_OFF: u8 = 0x0e;

/// Charge pump: Vcom pump off
pub const PUMP_VCOM_OFF: u8 = 0x02;

/// Charge pump: all pumps off
pub const PUMP_ALL_OFF: u8 = 0x00;
