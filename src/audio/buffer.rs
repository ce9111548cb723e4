//! Boundary adapter between an external audio-buffer handle and the flat
//! sample slice the processor consumes.

/// Borrowed view of a captured audio buffer: per-channel sample slices plus
/// a frame count, the shape capture engines hand out.
///
/// The adapter does shape conversion only. The analyzer reads the first
/// channel, truncated to the frame count; it never retains the borrow past
/// the call.
#[derive(Debug, Clone, Copy)]
pub struct SampleBuffer<'a> {
    channels: &'a [&'a [f32]],
    frame_count: usize,
}

impl<'a> SampleBuffer<'a> {
    pub fn new(channels: &'a [&'a [f32]], frame_count: usize) -> Self {
        Self {
            channels,
            frame_count,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// First channel's samples, truncated to the frame count.
    ///
    /// Returns `None` for degenerate handles: zero frames, no channels, or
    /// an empty channel slice. Those all mean "nothing to analyse".
    pub fn first_channel(&self) -> Option<&'a [f32]> {
        if self.frame_count == 0 {
            return None;
        }

        let channel = self.channels.first()?;
        let frames = self.frame_count.min(channel.len());
        if frames == 0 {
            return None;
        }

        Some(&channel[..frames])
    }
}
