//! Window functions applied before the FFT.
//!
//! Windowing tapers the frame edges to reduce spectral leakage. The default
//! is no window at all: the plain zero-padded transform keeps the output a
//! pure function of the raw samples, which is what a magnitude visualiser
//! usually wants. The tapered options are there for callers who prefer a
//! cleaner-looking spectrum over exact amplitudes.

use apodize::{blackman_iter, hamming_iter, hanning_iter};

/// Window applied to the time-domain frame before the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowType {
    /// No windowing, maximum amplitude fidelity.
    #[default]
    Rectangular,
    /// Good general-purpose balance.
    Hann,
    /// Better sidelobe suppression than Hann.
    Hamming,
    /// Excellent sidelobe suppression, wider main lobe.
    Blackman,
}

impl WindowType {
    /// Generate window coefficients for this window type.
    pub fn generate(self, size: usize) -> Vec<f32> {
        match self {
            Self::Rectangular => vec![1.0; size],
            Self::Hann => hanning_iter(size).map(|w| w as f32).collect(),
            Self::Hamming => hamming_iter(size).map(|w| w as f32).collect(),
            Self::Blackman => blackman_iter(size).map(|w| w as f32).collect(),
        }
    }

    /// Coefficients to multiply into the frame, or `None` when the window
    /// is a no-op and the multiply can be skipped entirely.
    pub(crate) fn precompute(self, size: usize) -> Option<Vec<f32>> {
        match self {
            Self::Rectangular => None,
            _ => Some(self.generate(size)),
        }
    }
}
