//! Frame driver
//!
//! A full refresh runs three stages:
//!
//! 1. Block scan with inverse polarity, driving the old image out
//! 2. Timed toggle between black (`0xff`) and white (`0xaa`) fills
//! 3. Block scan with normal polarity, driving the new image in
//!
//! The block scan slides a window of `block` rows down the panel `step` rows
//! at a time, so each row is written `block / step` times per pass. The
//! window starts partly above the panel and ends partly below it; rows off
//! the panel are sent as blank lines to keep the cadence.

use embedded_hal::delay::DelayNs;

use crate::compensation::BlockScan;
use crate::display::{Display, DisplayResult};
use crate::error::Error;
use crate::interface::CogInterface;
use crate::line::{LineRow, LineSource, Polarity};
use crate::timer::CountdownTimer;

/// Fill value for a black stage 2 sweep and the clear erase stage
const FILL_BLACK: u8 = 0xff;
/// Fill value for a white stage 2 sweep and the clear write stage
const FILL_WHITE: u8 = 0xaa;
/// Pixel bytes for blank and terminator lines
const FILL_NOTHING: u8 = 0x00;

/// One line emitted by a block scan
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanLine {
    /// Position off the panel; sent with no row addressed
    Blank,
    /// First row of a window on the final pass; sent with no pixel data
    Terminator(u16),
    /// A row to drive with the stage's data
    Row(u16),
}

impl BlockScan {
    /// Lines emitted by this block scan on a panel with `lines_per_display` rows
    ///
    /// Empty when `repeat`, `step` or `block` is zero.
    pub fn lines(&self, lines_per_display: u16) -> BlockScanLines {
        let step = i32::from(self.step);
        let block = i32::from(self.block);
        BlockScanLines {
            lines: i32::from(lines_per_display),
            step,
            block,
            repeat: self.repeat,
            pass: 0,
            line: step - block,
            offset: 0,
        }
    }
}

/// Iterator over the lines of a block scan
#[derive(Clone, Debug)]
pub struct BlockScanLines {
    lines: i32,
    step: i32,
    block: i32,
    repeat: u16,
    pass: u16,
    line: i32,
    offset: i32,
}

impl Iterator for BlockScanLines {
    type Item = ScanLine;

    fn next(&mut self) -> Option<ScanLine> {
        if self.step <= 0 || self.block <= 0 {
            return None;
        }
        loop {
            if self.pass >= self.repeat {
                return None;
            }
            if self.line >= self.lines + self.step {
                self.pass += 1;
                self.line = self.step - self.block;
                self.offset = 0;
                continue;
            }
            if self.offset >= self.block {
                self.offset = 0;
                self.line += self.step;
                continue;
            }

            let position = self.line + self.offset;
            let first = self.offset == 0;
            self.offset += 1;

            if position < 0 || position >= self.lines {
                return Some(ScanLine::Blank);
            }
            let row = position as u16;
            if first && self.pass + 1 == self.repeat {
                return Some(ScanLine::Terminator(row));
            }
            return Some(ScanLine::Row(row));
        }
    }
}

/// Pixel data driven into the panel by a block scan stage
#[derive(Clone, Copy)]
enum StageData<'a> {
    Fixed(u8),
    Image(&'a [u8]),
}

impl<I, T> Display<I, T>
where
    I: CogInterface,
    T: CountdownTimer,
{
    /// Drive the panel to white
    ///
    /// Must be called between [`Display::begin`] and [`Display::end`].
    pub fn clear<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.ensure_ready()?;
        let compensation = self.compensation;
        log::debug!("{}: clear", self.profile.size);

        self.block_scan(
            compensation.stage1,
            StageData::Fixed(FILL_BLACK),
            Polarity::Inverse,
            delay,
        )?;
        self.toggle_stage(delay)?;
        self.block_scan(
            compensation.stage3,
            StageData::Fixed(FILL_WHITE),
            Polarity::Normal,
            delay,
        )
    }

    /// Drive an image onto the panel
    ///
    /// `image` is one bit per pixel, rows top to bottom, `bytes_per_line`
    /// bytes per row, least significant bit leftmost, set bits dark. Must be
    /// called between [`Display::begin`] and [`Display::end`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImageSize`] if `image` is not exactly one frame.
    pub fn paint<D: DelayNs>(&mut self, image: &[u8], delay: &mut D) -> DisplayResult<I> {
        let required = self.profile.frame_size();
        if image.len() != required {
            return Err(Error::ImageSize {
                required,
                provided: image.len(),
            });
        }
        self.ensure_ready()?;
        let compensation = self.compensation;
        log::debug!("{}: paint", self.profile.size);

        self.block_scan(
            compensation.stage1,
            StageData::Image(image),
            Polarity::Inverse,
            delay,
        )?;
        self.toggle_stage(delay)?;
        self.block_scan(
            compensation.stage3,
            StageData::Image(image),
            Polarity::Normal,
            delay,
        )
    }

    fn block_scan<D: DelayNs>(
        &mut self,
        scan: BlockScan,
        data: StageData<'_>,
        polarity: Polarity,
        delay: &mut D,
    ) -> DisplayResult<I> {
        log::trace!(
            "block scan: repeat {} step {} block {}",
            scan.repeat,
            scan.step,
            scan.block
        );
        for line in scan.lines(self.profile.lines_per_display) {
            match line {
                ScanLine::Blank => self.send_line(
                    LineRow::Blank,
                    LineSource::Fixed(FILL_NOTHING),
                    Polarity::Normal,
                    0x00,
                    delay,
                )?,
                ScanLine::Terminator(row) => self.send_line(
                    LineRow::Row(row),
                    LineSource::Fixed(FILL_NOTHING),
                    Polarity::Normal,
                    0x00,
                    delay,
                )?,
                ScanLine::Row(row) => {
                    let source = match data {
                        StageData::Fixed(value) => LineSource::Fixed(value),
                        StageData::Image(image) => {
                            let range = self.profile.row_range(row);
                            LineSource::Image(image.get(range).unwrap_or(&[]))
                        }
                    };
                    self.send_line(LineRow::Row(row), source, polarity, 0x00, delay)?;
                }
            }
        }
        Ok(())
    }

    fn toggle_stage<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        let toggle = self.compensation.stage2;
        log::trace!(
            "toggle: repeat {} t1 {} ms t2 {} ms",
            toggle.repeat,
            toggle.t1_ms,
            toggle.t2_ms
        );
        for _ in 0..toggle.repeat {
            self.timed_fill(FILL_BLACK, toggle.t1_ms, delay)?;
            self.timed_fill(FILL_WHITE, toggle.t2_ms, delay)?;
        }
        Ok(())
    }

    /// Sweep the whole panel with `value` until `duration_ms` has elapsed
    ///
    /// At least one sweep is always sent.
    fn timed_fill<D: DelayNs>(&mut self, value: u8, duration_ms: u16, delay: &mut D) -> DisplayResult<I> {
        self.timer.start(u32::from(duration_ms));
        let mut sweeps = 0u32;
        loop {
            for row in 0..self.profile.lines_per_display {
                self.send_line(
                    LineRow::Row(row),
                    LineSource::Fixed(value),
                    Polarity::Normal,
                    0x00,
                    delay,
                )?;
            }
            sweeps += 1;
            if self.timer.remaining_ms() == 0 {
                break;
            }
        }
        log::trace!("fill {:#04x}: {} sweep(s) in {} ms", value, sweeps, duration_ms);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{DATA, INDEX, REG_LINE_DATA};
    use crate::config::{BeginPolicy, Builder};
    use crate::mock::{Event, MockCog, MockDelay, MockTimer};
    use crate::panel::{PanelProfile, PanelSize};
    use crate::power::Status;
    use alloc::vec::Vec;

    fn ready_display(size: PanelSize, sweeps: u32) -> (Display<MockCog, MockTimer>, MockDelay) {
        let config = Builder::new().panel(size).build().unwrap();
        let mut display = Display::new(MockCog::new(), MockTimer::new(sweeps), config).unwrap();
        let mut delay = MockDelay::default();
        display.begin(&mut delay).unwrap();
        display.interface.events.clear();
        (display, delay)
    }

    fn line_payloads(events: &[Event], payload_size: usize) -> Vec<Vec<u8>> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Send(data) if data.len() == payload_size => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_block_scan_covers_every_row() {
        let scan = BlockScan {
            repeat: 2,
            step: 2,
            block: 48,
        };
        let lines: Vec<ScanLine> = scan.lines(96).collect();
        assert_eq!(lines.len(), 2 * 72 * 48);

        for row in 0..96 {
            let hits = lines
                .iter()
                .filter(|l| matches!(l, ScanLine::Row(r) | ScanLine::Terminator(r) if *r == row))
                .count();
            assert_eq!(hits, 2 * 24, "row {row}");
        }
        assert!(lines.contains(&ScanLine::Blank));
    }

    #[test]
    fn test_terminators_only_on_last_pass() {
        let scan = BlockScan {
            repeat: 3,
            step: 8,
            block: 64,
        };
        let lines: Vec<ScanLine> = scan.lines(176).collect();
        let per_pass = lines.len() / 3;
        assert!(
            lines[..2 * per_pass]
                .iter()
                .all(|l| !matches!(l, ScanLine::Terminator(_)))
        );

        let terminators: Vec<u16> = lines[2 * per_pass..]
            .iter()
            .filter_map(|l| match l {
                ScanLine::Terminator(row) => Some(*row),
                _ => None,
            })
            .collect();
        // window starts at -56 and advances 8 rows, only those on the panel count
        let expected: Vec<u16> = (0..176).step_by(8).collect();
        assert_eq!(terminators, expected);
    }

    #[test]
    fn test_single_pass_window() {
        let scan = BlockScan {
            repeat: 1,
            step: 2,
            block: 2,
        };
        let lines: Vec<ScanLine> = scan.lines(4).collect();
        assert_eq!(
            lines,
            alloc::vec![
                ScanLine::Terminator(0),
                ScanLine::Row(1),
                ScanLine::Terminator(2),
                ScanLine::Row(3),
                ScanLine::Blank,
                ScanLine::Blank,
            ]
        );
    }

    #[test]
    fn test_degenerate_scan_is_empty() {
        for (repeat, step, block) in [(0, 2, 16), (2, 0, 16), (2, 2, 0)] {
            let scan = BlockScan {
                repeat,
                step,
                block,
            };
            assert_eq!(scan.lines(96).count(), 0);
        }
    }

    #[test]
    fn test_clear_line_count_and_dwell() {
        let (mut display, mut delay) = ready_display(PanelSize::Epd2_0, 2);
        display.clear(&mut delay).unwrap();

        let scan_lines = 2 * 72 * 48;
        let toggle_lines = 4 * 2 * 2 * 96;
        assert_eq!(display.interface().line_count(), 2 * scan_lines + toggle_lines);
        assert_eq!(display.timer.starts, alloc::vec![196u32; 8]);
    }

    #[test]
    fn test_toggle_sends_at_least_one_sweep() {
        let (mut display, mut delay) = ready_display(PanelSize::Epd1_44, 0);
        display.toggle_stage(&mut delay).unwrap();
        assert_eq!(display.interface().line_count(), 4 * 2 * 96);
    }

    #[test]
    fn test_clear_stage_fill_values() {
        let (mut display, mut delay) = ready_display(PanelSize::Epd1_44, 1);
        display.clear(&mut delay).unwrap();

        let profile = *display.profile();
        let payloads = line_payloads(&display.interface().events, profile.line_payload_size());
        let odd = |p: &Vec<u8>| p[2];
        let scan = |p: &Vec<u8>| p[2 + profile.bytes_per_line..2 + profile.bytes_per_line + profile.bytes_per_scan].to_vec();

        // first stage 1 line is a blank above the panel
        assert!(scan(&payloads[0]).iter().all(|&b| b == 0));
        assert_eq!(odd(&payloads[0]), FILL_NOTHING);
        // last line of stage 3 is below the panel too
        assert_eq!(odd(payloads.last().unwrap()), FILL_NOTHING);
        assert!(payloads.iter().any(|p| odd(p) == FILL_BLACK));
        assert!(payloads.iter().any(|p| odd(p) == FILL_WHITE));
        assert!(payloads.iter().all(|p| p[0] == DATA && p[1] == 0x00));
    }

    #[test]
    fn test_paint_drives_image_rows() {
        let (mut display, mut delay) = ready_display(PanelSize::Epd1_44, 1);
        let profile = *display.profile();
        let mut image = alloc::vec![0u8; profile.frame_size()];
        image[profile.row_range(5)].fill(0xff);

        display.paint(&image, &mut delay).unwrap();

        let payloads = line_payloads(&display.interface().events, profile.line_payload_size());
        let row5 = crate::line::scan_address(&profile, 5).unwrap();
        let dark_row5 = payloads.iter().any(|p| {
            p[2 + profile.bytes_per_line + row5.0] == row5.1 && p[2] == 0xff
        });
        assert!(dark_row5);
    }

    #[test]
    fn test_paint_rejects_wrong_size() {
        let (mut display, mut delay) = ready_display(PanelSize::Epd2_0, 1);
        let image = alloc::vec![0u8; PanelProfile::new(PanelSize::Epd1_44).frame_size()];
        assert!(matches!(
            display.paint(&image, &mut delay),
            Err(Error::ImageSize {
                required: 2400,
                provided: 1536
            })
        ));
        assert!(display.interface().events.is_empty());
    }

    #[test]
    fn test_clear_refused_before_begin() {
        let config = Builder::new().panel(PanelSize::Epd2_0).build().unwrap();
        let mut display = Display::new(MockCog::new(), MockTimer::new(1), config).unwrap();
        let mut delay = MockDelay::default();
        assert!(matches!(
            display.clear(&mut delay),
            Err(Error::NotReady { status: Status::Ok })
        ));
        assert!(display.interface().events.is_empty());
    }

    #[test]
    fn test_fail_open_clear_without_begin() {
        let config = Builder::new()
            .panel(PanelSize::Epd1_44)
            .begin_policy(BeginPolicy::FailOpen)
            .build()
            .unwrap();
        let mut display = Display::new(MockCog::new(), MockTimer::new(1), config).unwrap();
        let mut delay = MockDelay::default();
        display.clear(&mut delay).unwrap();
        assert!(display.interface().line_count() > 0);
        assert!(
            display
                .interface()
                .events
                .contains(&Event::Send(alloc::vec![INDEX, REG_LINE_DATA]))
        );
    }
}
