//! Facade tying the processor, the published spectrum, and the capture
//! activity flag together, plus the process-wide shared instance.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use crate::audio::buffer::SampleBuffer;
use crate::audio::constants::{DEFAULT_FFT_SIZE, DEFAULT_MAGNITUDE_COUNT};
use crate::audio::error::SpectrumError;
use crate::audio::processor::SpectrumProcessor;
use crate::audio::spectrum::SpectrumOutput;
use crate::audio::window_functions::WindowType;

static SHARED: OnceLock<SpectrumAnalyzer> = OnceLock::new();

/// Real-time spectrum analyzer.
///
/// Feed capture buffers or raw sample slices in from any thread; read the
/// current clamped magnitude vector back from the display thread. All
/// methods take `&self`, so one instance can sit behind an `Arc` or a
/// `'static` and be shared between the capture and display sides directly.
pub struct SpectrumAnalyzer {
    processor: SpectrumProcessor,
    output: SpectrumOutput,
    /// Whether the external capture session is logically running. Owned by
    /// the capture collaborator; merely surfaced here for the display
    /// layer's convenience.
    active: AtomicBool,
}

impl SpectrumAnalyzer {
    /// Analyzer with an `fft_size`-point transform publishing
    /// `magnitude_count` bins.
    pub fn new(fft_size: usize, magnitude_count: usize) -> Result<Self, SpectrumError> {
        Self::with_window(fft_size, magnitude_count, WindowType::Rectangular)
    }

    /// Like [`SpectrumAnalyzer::new`], with a pre-transform window.
    pub fn with_window(
        fft_size: usize,
        magnitude_count: usize,
        window: WindowType,
    ) -> Result<Self, SpectrumError> {
        let (processor, output) = SpectrumProcessor::with_window(fft_size, magnitude_count, window)?;
        Ok(Self {
            processor,
            output,
            active: AtomicBool::new(false),
        })
    }

    /// Process-wide default instance (8192-point transform, 200 bins).
    ///
    /// Convenience for the common one-microphone case; independently
    /// constructed analyzers remain fully first-class and share nothing
    /// with this one.
    pub fn shared() -> &'static SpectrumAnalyzer {
        SHARED.get_or_init(|| {
            Self::new(DEFAULT_FFT_SIZE, DEFAULT_MAGNITUDE_COUNT)
                .expect("default spectrum geometry is always valid")
        })
    }

    /// Analyse the first channel of a captured audio buffer.
    pub fn process_buffer(&self, buffer: &SampleBuffer<'_>) -> Vec<f32> {
        self.processor.process_buffer(buffer)
    }

    /// Analyse a flat slice of samples.
    pub fn process_samples(&self, samples: &[f32]) -> Vec<f32> {
        self.processor.process(samples)
    }

    /// Latest fully published magnitude vector; length
    /// [`Self::magnitude_count`], every element in `[0, 100]`.
    pub fn magnitudes(&self) -> Vec<f32> {
        self.output.read()
    }

    /// Clone of the reader handle, for handing to the display layer.
    pub fn output(&self) -> SpectrumOutput {
        self.output.clone()
    }

    /// Clear the published spectrum to silence. Transform configuration is
    /// untouched; processing continues normally afterwards.
    pub fn reset(&self) -> Vec<f32> {
        self.processor.reset()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Relaxed);
    }

    pub fn fft_size(&self) -> usize {
        self.processor.fft_size()
    }

    pub fn magnitude_count(&self) -> usize {
        self.processor.magnitude_count()
    }
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_FFT_SIZE, DEFAULT_MAGNITUDE_COUNT)
            .expect("default spectrum geometry is always valid")
    }
}
