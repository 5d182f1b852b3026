//! Current and pending frame images
//!
//! [`FrameBuffers`] holds the image last sent to the panel and the image
//! waiting to be sent. Both are one bit per pixel in the panel's native
//! order: rows top to bottom, least significant bit leftmost, set bits dark.

use crate::panel::{PanelProfile, PanelSize};

/// Frame size of the largest supported panel, in bytes
pub const MAX_FRAME_SIZE: usize = max_frame_size();

const fn max_frame_size() -> usize {
    let mut max = 0;
    let mut i = 0;
    while i < PanelSize::ALL.len() {
        let size = PanelProfile::new(PanelSize::ALL[i]).frame_size();
        if size > max {
            max = size;
        }
        i += 1;
    }
    max
}

/// Layout of image bytes handed to [`FrameBuffers::load_pending`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImageFormat {
    /// Most significant bit is the leftmost pixel
    pub bit_reversed: bool,
    /// Set bits are light
    pub inverted: bool,
}

impl ImageFormat {
    /// Panel-native layout
    pub const NATIVE: Self = Self {
        bit_reversed: false,
        inverted: false,
    };

    /// Convert one byte to the panel's native layout
    pub const fn to_native(self, byte: u8) -> u8 {
        let byte = if self.bit_reversed {
            byte.reverse_bits()
        } else {
            byte
        };
        if self.inverted { !byte } else { byte }
    }
}

/// Current and pending images for one panel
#[derive(Clone, Debug)]
pub struct FrameBuffers {
    profile: PanelProfile,
    current: [u8; MAX_FRAME_SIZE],
    pending: [u8; MAX_FRAME_SIZE],
}

impl FrameBuffers {
    /// Create blank buffers for a panel
    pub fn new(profile: PanelProfile) -> Self {
        Self {
            profile,
            current: [0; MAX_FRAME_SIZE],
            pending: [0; MAX_FRAME_SIZE],
        }
    }

    /// Panel geometry the buffers are sized for
    pub fn profile(&self) -> &PanelProfile {
        &self.profile
    }

    /// Image currently on the panel
    pub fn current(&self) -> &[u8] {
        &self.current[..self.profile.frame_size()]
    }

    /// Image to be sent on the next update
    pub fn pending(&self) -> &[u8] {
        &self.pending[..self.profile.frame_size()]
    }

    /// Mutable access to the pending image
    pub fn pending_mut(&mut self) -> &mut [u8] {
        &mut self.pending[..self.profile.frame_size()]
    }

    /// Copy image bytes into the pending image
    ///
    /// Copies at most one frame and leaves the rest of the pending image
    /// untouched. Returns the number of bytes copied.
    pub fn load_pending(&mut self, data: &[u8], format: ImageFormat) -> usize {
        let pending = self.pending_mut();
        let count = data.len().min(pending.len());
        for (out, &byte) in pending.iter_mut().zip(&data[..count]) {
            *out = format.to_native(byte);
        }
        if data.len() > count {
            log::debug!("image truncated: {} of {} bytes used", count, data.len());
        }
        count
    }

    /// Make the pending image current
    pub fn commit(&mut self) {
        let size = self.profile.frame_size();
        self.current[..size].copy_from_slice(&self.pending[..size]);
    }

    /// Forget the current image, as after a clear
    pub fn reset_current(&mut self) {
        self.current.fill(0);
    }
}
