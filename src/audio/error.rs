use thiserror::Error;

/// Construction-time configuration failures.
///
/// The processing hot path never returns errors: degenerate input (empty
/// slices, zero-frame buffers) is defined as silence, and mismatched input
/// lengths are truncated or zero-padded. Everything that can actually go
/// wrong goes wrong when the analyzer is built.
#[derive(Debug, Error)]
pub enum SpectrumError {
    /// The FFT backend cannot be planned for this length.
    #[error("transform size {0} is not supported (must be at least 2)")]
    UnsupportedTransformSize(usize),

    /// More magnitude bins were requested than the transform produces.
    /// A real FFT of N samples yields N/2 + 1 complex bins.
    #[error(
        "magnitude count {requested} is outside 1..={available} \
         (bins produced by a {fft_size}-point transform)"
    )]
    InvalidMagnitudeCount {
        requested: usize,
        available: usize,
        fft_size: usize,
    },
}
