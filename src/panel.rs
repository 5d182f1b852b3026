//! Panel geometry and channel select masks
//!
//! Each supported panel size has fixed geometry and a fixed 9-byte channel
//! select mask, written once per power up. [`PanelProfile`] derives the byte
//! counts the line encoder needs from that geometry.
//!
//! ## Example
//!
//! ```
//! use epd_cog::{PanelProfile, PanelSize};
//!
//! let size: PanelSize = match "2.0".parse() {
//!     Ok(size) => size,
//!     Err(_) => return,
//! };
//! let profile = PanelProfile::new(size);
//! assert_eq!(profile.bytes_per_line, 25);
//! assert_eq!(profile.bytes_per_scan, 24);
//! ```

use core::str::FromStr;

use crate::error::BuilderError;

/// Length of a channel select mask, including the leading data header
pub const CHANNEL_SELECT_LEN: usize = 9;

/// Supported panel sizes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PanelSize {
    /// 1.44" panel, 128x96
    Epd1_44,
    /// 2.0" panel, 200x96
    Epd2_0,
    /// 2.7" panel, 264x176
    Epd2_7,
}

impl PanelSize {
    /// All supported sizes, smallest first
    pub const ALL: [Self; 3] = [Self::Epd1_44, Self::Epd2_0, Self::Epd2_7];

    /// Panel selector key, as accepted by [`FromStr`]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Epd1_44 => "1.44",
            Self::Epd2_0 => "2.0",
            Self::Epd2_7 => "2.7",
        }
    }

    /// Width in pixels (dots per line)
    pub const fn width(self) -> u16 {
        match self {
            Self::Epd1_44 => 128,
            Self::Epd2_0 => 200,
            Self::Epd2_7 => 264,
        }
    }

    /// Height in pixels (lines per display)
    pub const fn height(self) -> u16 {
        match self {
            Self::Epd1_44 => 96,
            Self::Epd2_0 => 96,
            Self::Epd2_7 => 176,
        }
    }

    /// Human readable description, e.g. `EPD 2.0 200x96 COG 2`
    pub const fn description(self) -> &'static str {
        match self {
            Self::Epd1_44 => "EPD 1.44 128x96 COG 2",
            Self::Epd2_0 => "EPD 2.0 200x96 COG 2",
            Self::Epd2_7 => "EPD 2.7 264x176 COG 2",
        }
    }

    const fn channel_select(self) -> &'static [u8; CHANNEL_SELECT_LEN] {
        match self {
            Self::Epd1_44 => &[0x72, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0f, 0xff, 0x00],
            Self::Epd2_0 => &[0x72, 0x00, 0x00, 0x00, 0x00, 0x01, 0xff, 0xe0, 0x00],
            Self::Epd2_7 => &[0x72, 0x00, 0x00, 0x00, 0x7f, 0xff, 0xfe, 0x00, 0x00],
        }
    }
}

impl FromStr for PanelSize {
    type Err = BuilderError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.key() == key)
            .ok_or(BuilderError::UnsupportedSize)
    }
}

impl core::fmt::Display for PanelSize {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.description())
    }
}

/// Fixed geometry of one panel
///
/// Built once when the display is created; never recomputed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelProfile {
    /// Panel size this profile describes
    pub size: PanelSize,
    /// Number of physical rows
    pub lines_per_display: u16,
    /// Number of pixels per row
    pub dots_per_line: u16,
    /// Bytes of pixel data per row (`dots_per_line / 8`)
    pub bytes_per_line: usize,
    /// Scan address bytes per line (`lines_per_display / 4`)
    pub bytes_per_scan: usize,
    /// Channel select mask sent verbatim during power up
    pub channel_select: &'static [u8; CHANNEL_SELECT_LEN],
}

impl PanelProfile {
    /// Resolve the profile for a panel size
    pub const fn new(size: PanelSize) -> Self {
        let lines_per_display = size.height();
        let dots_per_line = size.width();
        Self {
            size,
            lines_per_display,
            dots_per_line,
            bytes_per_line: dots_per_line as usize / 8,
            bytes_per_scan: lines_per_display as usize / 4,
            channel_select: size.channel_select(),
        }
    }

    /// Bytes in one full frame image
    pub const fn frame_size(&self) -> usize {
        self.bytes_per_line * self.lines_per_display as usize
    }

    /// Scratch line buffer size: two pixel halves, the scan bytes, then the
    /// command, border and filler bytes
    pub const fn line_buffer_size(&self) -> usize {
        2 * self.bytes_per_line + self.bytes_per_scan + 3
    }

    /// Bytes actually sent for one line (command, border, odd, scan, even)
    pub const fn line_payload_size(&self) -> usize {
        2 + 2 * self.bytes_per_line + self.bytes_per_scan
    }

    /// Byte range of one image row within a frame
    pub fn row_range(&self, row: u16) -> core::ops::Range<usize> {
        let start = row as usize * self.bytes_per_line;
        start..start + self.bytes_per_line
    }
}

impl From<PanelSize> for PanelProfile {
    fn from(size: PanelSize) -> Self {
        Self::new(size)
    }
}
