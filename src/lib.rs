//! Real-time audio spectrum analysis core.
//!
//! Turns a stream of audio sample buffers into a fixed-length vector of
//! spectral magnitudes suitable for visualisation. The pipeline is a
//! fixed-size forward FFT with reusable scratch buffers, magnitude
//! extraction clamped to a display ceiling, and a lock-free hand-off of the
//! finished vector to a single display-thread reader.
//!
//! Audio capture and rendering are deliberately out of scope: feed buffers
//! in through [`SpectrumAnalyzer::process_buffer`] or
//! [`SpectrumAnalyzer::process_samples`], read the current spectrum back
//! with [`SpectrumAnalyzer::magnitudes`].
//!
//! ```
//! use audio_spectrum::SpectrumAnalyzer;
//!
//! let analyzer = SpectrumAnalyzer::new(1024, 64)?;
//! let magnitudes = analyzer.process_samples(&[0.25; 1024]);
//! assert_eq!(magnitudes.len(), 64);
//! assert!(magnitudes.iter().all(|m| (0.0..=100.0).contains(m)));
//! # Ok::<(), audio_spectrum::SpectrumError>(())
//! ```

mod audio;

pub use audio::buffer::SampleBuffer;
pub use audio::constants::{DEFAULT_FFT_SIZE, DEFAULT_MAGNITUDE_COUNT, MAX_MAGNITUDE};
pub use audio::error::SpectrumError;
pub use audio::fft_engine::FftContext;
pub use audio::processor::SpectrumProcessor;
pub use audio::spectrum::SpectrumOutput;
pub use audio::spectrum_analyzer::SpectrumAnalyzer;
pub use audio::window_functions::WindowType;
