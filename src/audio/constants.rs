/// Default number of time-domain samples fed to the forward FFT.
/// 8192 gives ~5.4Hz resolution at 44.1kHz, plenty for a visualiser.
pub const DEFAULT_FFT_SIZE: usize = 8192;

/// Default number of magnitude bins handed to the display layer.
/// Only the lowest bins are kept; 200 of 4097 covers roughly 0-1kHz at
/// 44.1kHz, where most visually interesting energy lives.
pub const DEFAULT_MAGNITUDE_COUNT: usize = 200;

/// Display ceiling for a single magnitude bin. Raw FFT moduli are unbounded
/// (a full-scale sine peaks near N/2), so the published values are clamped
/// to keep the dynamic range the display has to cope with fixed.
pub const MAX_MAGNITUDE: f32 = 100.0;
