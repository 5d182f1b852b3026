//! Temperature compensation tables
//!
//! The waveform timing depends on panel size and ambient temperature. Three
//! temperature bands are supported: below 10 °C, 10 to 40 °C inclusive, and
//! above 40 °C.

use crate::panel::PanelSize;

/// Repeat/step/block parameters for the block-scan stages (1 and 3)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockScan {
    /// Number of passes over the panel
    pub repeat: u16,
    /// Rows the window advances per step
    pub step: u16,
    /// Rows in the window
    pub block: u16,
}

/// Timed toggle parameters for stage 2
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Toggle {
    /// Number of black/white toggle pairs
    pub repeat: u16,
    /// Dwell time at `0xff`, in milliseconds
    pub t1_ms: u16,
    /// Dwell time at `0xaa`, in milliseconds
    pub t2_ms: u16,
}

/// Waveform timing for one (panel size, temperature band) pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Compensation {
    /// Stage 1 (transition out)
    pub stage1: BlockScan,
    /// Stage 2 (timed toggle)
    pub stage2: Toggle,
    /// Stage 3 (transition in)
    pub stage3: BlockScan,
}

/// Temperature band used to index the compensation tables
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemperatureBand {
    /// Below 10 °C
    Cold,
    /// 10 °C to 40 °C inclusive
    Normal,
    /// Above 40 °C
    Hot,
}

impl TemperatureBand {
    /// Band for a temperature in °C
    pub const fn from_celsius(celsius: i16) -> Self {
        if celsius < 10 {
            Self::Cold
        } else if celsius > 40 {
            Self::Hot
        } else {
            Self::Normal
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Cold => 0,
            Self::Normal => 1,
            Self::Hot => 2,
        }
    }
}

const fn entry(row: [u16; 9]) -> Compensation {
    Compensation {
        stage1: BlockScan {
            repeat: row[0],
            step: row[1],
            block: row[2],
        },
        stage2: Toggle {
            repeat: row[3],
            t1_ms: row[4],
            t2_ms: row[5],
        },
        stage3: BlockScan {
            repeat: row[6],
            step: row[7],
            block: row[8],
        },
    }
}

// stage1 repeat/step/block, stage2 repeat/t1/t2, stage3 repeat/step/block
static COMPENSATION_1_44: [Compensation; 3] = [
    entry([2, 6, 42, 4, 392, 392, 2, 6, 42]),
    entry([4, 2, 16, 4, 155, 155, 4, 2, 16]),
    entry([4, 2, 16, 4, 155, 155, 4, 2, 16]),
];

static COMPENSATION_2_0: [Compensation; 3] = [
    entry([2, 6, 42, 4, 392, 392, 2, 6, 42]),
    entry([2, 2, 48, 4, 196, 196, 2, 2, 48]),
    entry([4, 2, 48, 4, 196, 196, 4, 2, 48]),
];

static COMPENSATION_2_7: [Compensation; 3] = [
    entry([2, 8, 64, 4, 392, 392, 2, 8, 64]),
    entry([2, 8, 64, 4, 196, 196, 2, 8, 64]),
    entry([4, 8, 64, 4, 196, 196, 4, 8, 64]),
];

impl Compensation {
    /// Select the compensation profile for a panel at a temperature
    pub fn select(size: PanelSize, celsius: i16) -> &'static Self {
        let table = match size {
            PanelSize::Epd1_44 => &COMPENSATION_1_44,
            PanelSize::Epd2_0 => &COMPENSATION_2_0,
            PanelSize::Epd2_7 => &COMPENSATION_2_7,
        };
        &table[TemperatureBand::from_celsius(celsius).index()]
    }
}
