use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

use crate::audio::error::SpectrumError;

/// Owns the planned forward real-to-complex FFT for one fixed length.
///
/// Planning is the expensive part of an FFT backend, so it happens exactly
/// once here and the plan is immutable afterwards. The plan lives in an
/// `Arc`, which gives the create-once/release-once lifetime this resource
/// needs: it is dropped together with the owning processor, never earlier
/// and never twice.
pub struct FftContext {
    size: usize,
    fft: Arc<dyn RealToComplex<f32>>,
}

impl FftContext {
    /// Plan a forward transform of exactly `size` samples.
    ///
    /// Power-of-two sizes are fastest but any size >= 2 is accepted.
    /// An unsupported size is a configuration error, not something to
    /// recover from at runtime.
    pub fn new(size: usize) -> Result<Self, SpectrumError> {
        if size < 2 {
            return Err(SpectrumError::UnsupportedTransformSize(size));
        }

        let fft = RealFftPlanner::<f32>::new().plan_fft_forward(size);
        Ok(Self { size, fft })
    }

    /// Wrap an externally supplied transform. Lets tests substitute an
    /// instrumented FFT behind the same trait object the planner returns.
    #[cfg(test)]
    pub(crate) fn with_fft(fft: Arc<dyn RealToComplex<f32>>) -> Self {
        Self {
            size: fft.len(),
            fft,
        }
    }

    /// Number of time-domain samples the transform consumes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of complex frequency bins the transform produces (N/2 + 1).
    pub fn bin_count(&self) -> usize {
        self.fft.complex_len()
    }

    pub(crate) fn fft(&self) -> &dyn RealToComplex<f32> {
        self.fft.as_ref()
    }
}
