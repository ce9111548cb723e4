//! The sample-to-spectrum hot path.
//!
//! One `SpectrumProcessor` owns a planned FFT and a fixed pool of scratch
//! buffers, and turns an arbitrary-length slice of samples into a clamped
//! magnitude vector. The scratch pool is sized once at construction and
//! reused for every call, so steady-state processing does not touch the
//! allocator inside the locked region.

use log::{debug, error, trace};
use realfft::num_complex::Complex32;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::audio::buffer::SampleBuffer;
use crate::audio::constants::MAX_MAGNITUDE;
use crate::audio::error::SpectrumError;
use crate::audio::fft_engine::FftContext;
use crate::audio::spectrum::{SpectrumOutput, SpectrumPublisher};
use crate::audio::window_functions::WindowType;

/// Reusable working state. Everything in here is sized at construction and
/// only ever read/overwritten in place; the surrounding mutex makes the
/// whole read-modify-write sequence atomic with respect to other callers.
struct ScratchBuffers {
    /// Time-domain input frame (length N).
    time_domain: Vec<f32>,
    /// Complex FFT output (length N/2 + 1).
    frequency_domain: Vec<Complex32>,
    /// Backend scratch, sized by the planned transform.
    fft_scratch: Vec<Complex32>,
    /// Clamped magnitudes of the lowest M bins.
    magnitudes: Vec<f32>,
    /// Producer half of the published-spectrum hand-off. Publishing inside
    /// the lock is a memcpy plus pointer swap, so the hold time stays
    /// bounded by transform cost.
    publisher: SpectrumPublisher,
}

/// Converts sample frames into clamped magnitude vectors.
///
/// `process` and `reset` take `&self` and may be called from any thread;
/// an internal mutex serialises access to the scratch pool. One call runs
/// to completion before the next begins - serialisation over buffer
/// duplication keeps the steady state allocation-free.
pub struct SpectrumProcessor {
    context: FftContext,
    magnitude_count: usize,
    /// Precomputed window coefficients; `None` skips the multiply.
    window: Option<Vec<f32>>,
    state: Mutex<ScratchBuffers>,
}

impl SpectrumProcessor {
    /// Build a processor and the reader handle for its published spectra.
    ///
    /// `fft_size` is the transform length N, `magnitude_count` how many of
    /// the lowest frequency bins end up in the output vector
    /// (1..=N/2 + 1).
    pub fn new(
        fft_size: usize,
        magnitude_count: usize,
    ) -> Result<(Self, SpectrumOutput), SpectrumError> {
        Self::with_window(fft_size, magnitude_count, WindowType::Rectangular)
    }

    /// Like [`SpectrumProcessor::new`], with a window applied to each
    /// frame before the transform.
    pub fn with_window(
        fft_size: usize,
        magnitude_count: usize,
        window: WindowType,
    ) -> Result<(Self, SpectrumOutput), SpectrumError> {
        let context = FftContext::new(fft_size)?;
        Self::with_context(context, magnitude_count, window)
    }

    pub(crate) fn with_context(
        context: FftContext,
        magnitude_count: usize,
        window: WindowType,
    ) -> Result<(Self, SpectrumOutput), SpectrumError> {
        let bins = context.bin_count();
        if magnitude_count == 0 || magnitude_count > bins {
            return Err(SpectrumError::InvalidMagnitudeCount {
                requested: magnitude_count,
                available: bins,
                fft_size: context.size(),
            });
        }

        let (publisher, output) = SpectrumPublisher::channel(magnitude_count);

        // The planned transform knows its own buffer geometry.
        let fft = context.fft();
        let state = ScratchBuffers {
            time_domain: fft.make_input_vec(),
            frequency_domain: fft.make_output_vec(),
            fft_scratch: fft.make_scratch_vec(),
            magnitudes: vec![0.0; magnitude_count],
            publisher,
        };

        debug!(
            "spectrum processor ready: fft_size={}, magnitude_count={}, window={:?}",
            context.size(),
            magnitude_count,
            window
        );

        Ok((
            Self {
                window: window.precompute(context.size()),
                context,
                magnitude_count,
                state: Mutex::new(state),
            },
            output,
        ))
    }

    pub fn fft_size(&self) -> usize {
        self.context.size()
    }

    pub fn magnitude_count(&self) -> usize {
        self.magnitude_count
    }

    /// Transform a slice of samples into the clamped magnitude vector,
    /// publish it, and return a snapshot of it.
    ///
    /// Input longer than the transform length is silently truncated; input
    /// shorter is zero-padded. That is policy, not an accident: callers
    /// are expected to match their capture-buffer size to the transform
    /// size, and the ones that cannot still get a well-defined spectrum.
    /// An empty slice skips the transform and yields silence - an all-zero
    /// frame's spectrum would be meaningless noise next to an explicit
    /// zero vector.
    pub fn process(&self, samples: &[f32]) -> Vec<f32> {
        if samples.is_empty() {
            trace!("empty sample slice, publishing silence");
            return self.publish_silence();
        }

        let mut state = self.lock_state();
        let ScratchBuffers {
            time_domain,
            frequency_domain,
            fft_scratch,
            magnitudes,
            publisher,
        } = &mut *state;

        // Zero first so short input stays zero-padded and nothing from the
        // previous call leaks into this frame.
        time_domain.fill(0.0);
        let copied = samples.len().min(time_domain.len());
        time_domain[..copied].copy_from_slice(&samples[..copied]);

        if let Some(window) = &self.window {
            for (sample, coeff) in time_domain.iter_mut().zip(window.iter()) {
                *sample *= coeff;
            }
        }

        frequency_domain.fill(Complex32::new(0.0, 0.0));

        match self
            .context
            .fft()
            .process_with_scratch(time_domain, frequency_domain, fft_scratch)
        {
            Ok(()) => {
                // Modulus of the lowest M bins, clamped to the display
                // ceiling. The modulus is never negative, so the output
                // range is exactly [0, MAX_MAGNITUDE].
                for (magnitude, bin) in magnitudes.iter_mut().zip(frequency_domain.iter()) {
                    *magnitude = bin.norm().min(MAX_MAGNITUDE);
                }
            }
            Err(err) => {
                // Buffer lengths are fixed at construction, so the backend
                // cannot reject them; degrade to silence rather than
                // propagate from the hot path.
                error!("forward FFT failed: {err}");
                magnitudes.fill(0.0);
            }
        }

        publisher.publish_from(magnitudes);
        magnitudes.clone()
    }

    /// Analyse the first channel of a captured buffer.
    ///
    /// A handle with zero frames or no channel data yields silence without
    /// invoking the transform. Otherwise this is identical to feeding the
    /// channel slice through [`SpectrumProcessor::process`].
    pub fn process_buffer(&self, buffer: &SampleBuffer<'_>) -> Vec<f32> {
        match buffer.first_channel() {
            Some(samples) => self.process(samples),
            None => {
                trace!(
                    "degenerate audio buffer (frames={}, channels={}), publishing silence",
                    buffer.frame_count(),
                    buffer.channel_count()
                );
                self.publish_silence()
            }
        }
    }

    /// Clear the published spectrum to silence, bypassing the transform.
    pub fn reset(&self) -> Vec<f32> {
        self.publish_silence()
    }

    fn publish_silence(&self) -> Vec<f32> {
        let mut state = self.lock_state();
        let ScratchBuffers {
            magnitudes,
            publisher,
            ..
        } = &mut *state;

        magnitudes.fill(0.0);
        publisher.publish_from(magnitudes);
        magnitudes.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, ScratchBuffers> {
        // A panicking caller cannot leave the fixed-size buffers in a
        // state the next call would misread, so poisoning is ignored.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realfft::{FftError, RealFftPlanner, RealToComplex};
    use std::f32::consts::TAU;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const FFT_SIZE: usize = 1024;
    const MAGNITUDES: usize = 128;

    fn processor() -> (SpectrumProcessor, SpectrumOutput) {
        SpectrumProcessor::new(FFT_SIZE, MAGNITUDES).unwrap()
    }

    fn sine(frequency_hz: f32, sample_rate: f32, amplitude: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| amplitude * (TAU * frequency_hz * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn rejects_out_of_range_magnitude_counts() {
        assert!(matches!(
            SpectrumProcessor::new(FFT_SIZE, 0),
            Err(SpectrumError::InvalidMagnitudeCount { requested: 0, .. })
        ));
        assert!(matches!(
            SpectrumProcessor::new(FFT_SIZE, FFT_SIZE / 2 + 2),
            Err(SpectrumError::InvalidMagnitudeCount { .. })
        ));
        // The last real-FFT bin is still addressable.
        assert!(SpectrumProcessor::new(FFT_SIZE, FFT_SIZE / 2 + 1).is_ok());
    }

    #[test_log::test]
    fn fresh_processor_is_silent() {
        let (processor, output) = processor();
        assert_eq!(output.read(), vec![0.0; MAGNITUDES]);
        assert_eq!(processor.magnitude_count(), MAGNITUDES);
        assert_eq!(processor.fft_size(), FFT_SIZE);
    }

    #[test_log::test]
    fn empty_input_yields_silence() {
        let (processor, output) = processor();
        assert_eq!(processor.process(&[]), vec![0.0; MAGNITUDES]);
        assert_eq!(output.read(), vec![0.0; MAGNITUDES]);
    }

    #[test]
    fn magnitudes_stay_clamped_for_hot_signals() {
        let (processor, _output) = processor();
        let blast = sine(440.0, 44_100.0, 1.0e6, FFT_SIZE);

        let magnitudes = processor.process(&blast);
        assert_eq!(magnitudes.len(), MAGNITUDES);
        assert!(magnitudes.iter().all(|m| (0.0..=MAX_MAGNITUDE).contains(m)));
        // A signal this hot must actually hit the ceiling somewhere.
        assert!(magnitudes.iter().any(|&m| m == MAX_MAGNITUDE));
    }

    #[test]
    fn repeated_calls_are_deterministic() {
        let (processor, _output) = processor();
        let tone = sine(330.0, 48_000.0, 0.05, FFT_SIZE);
        let other = sine(997.0, 48_000.0, 0.8, FFT_SIZE);

        let first = processor.process(&tone);
        // A different frame in between must not leak into the repeat.
        processor.process(&other);
        let second = processor.process(&tone);

        assert_eq!(first, second);
    }

    #[test]
    fn oversized_input_is_truncated_to_the_transform_length() {
        let (processor, _output) = processor();
        let long = sine(250.0, 44_100.0, 0.3, FFT_SIZE + 777);

        assert_eq!(processor.process(&long), processor.process(&long[..FFT_SIZE]));
    }

    #[test]
    fn undersized_input_matches_explicit_zero_padding() {
        let (processor, _output) = processor();
        let short = sine(250.0, 44_100.0, 0.3, FFT_SIZE - 300);
        let mut padded = short.clone();
        padded.resize(FFT_SIZE, 0.0);

        assert_eq!(processor.process(&short), processor.process(&padded));
    }

    #[test]
    fn sine_peak_lands_in_the_expected_bin() {
        let sample_rate = 44_100.0;
        let (processor, _output) = SpectrumProcessor::new(8192, 200).unwrap();
        // Low amplitude keeps the peak below the clamp ceiling so the
        // maximum is still localised.
        let tone = sine(440.0, sample_rate, 0.01, 8192);

        let magnitudes = processor.process(&tone);
        assert_eq!(magnitudes.len(), 200);
        assert!(magnitudes.iter().all(|&m| m >= 0.0));

        let (peak_bin, &peak_value) = magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();

        // 440Hz at 44.1kHz with an 8192-point transform lands at bin
        // 440 * 8192 / 44100 = 81.7.
        let expected = (440.0 * 8192.0 / sample_rate).round() as usize;
        assert!(
            peak_bin.abs_diff(expected) <= 1,
            "peak at bin {peak_bin}, expected near {expected}"
        );

        let mut rest: Vec<f32> = magnitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != peak_bin)
            .map(|(_, &m)| m)
            .collect();
        rest.sort_by(f32::total_cmp);
        let median = rest[rest.len() / 2];
        assert!(
            peak_value > 10.0 * median.max(1e-3),
            "peak {peak_value} not clearly above median {median}"
        );
    }

    #[test]
    fn reset_is_idempotent() {
        let (processor, output) = processor();
        processor.process(&sine(440.0, 44_100.0, 0.5, FFT_SIZE));

        assert_eq!(processor.reset(), vec![0.0; MAGNITUDES]);
        assert_eq!(processor.reset(), vec![0.0; MAGNITUDES]);
        assert_eq!(output.read(), vec![0.0; MAGNITUDES]);
    }

    #[test]
    fn windowed_processing_stays_in_range() {
        let (processor, _output) =
            SpectrumProcessor::with_window(FFT_SIZE, MAGNITUDES, WindowType::Hann).unwrap();
        let tone = sine(440.0, 44_100.0, 0.5, FFT_SIZE);

        let magnitudes = processor.process(&tone);
        assert!(magnitudes.iter().all(|m| (0.0..=MAX_MAGNITUDE).contains(m)));
        assert_eq!(magnitudes, processor.process(&tone));
    }

    /// Forward-FFT double that counts invocations while delegating to the
    /// real planned transform.
    struct CountingFft {
        inner: Arc<dyn RealToComplex<f32>>,
        calls: Arc<AtomicUsize>,
    }

    impl RealToComplex<f32> for CountingFft {
        fn process(
            &self,
            input: &mut [f32],
            output: &mut [Complex32],
        ) -> Result<(), FftError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.process(input, output)
        }

        fn process_with_scratch(
            &self,
            input: &mut [f32],
            output: &mut [Complex32],
            scratch: &mut [Complex32],
        ) -> Result<(), FftError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.process_with_scratch(input, output, scratch)
        }

        fn get_scratch_len(&self) -> usize {
            self.inner.get_scratch_len()
        }

        fn len(&self) -> usize {
            self.inner.len()
        }

        fn complex_len(&self) -> usize {
            self.inner.complex_len()
        }

        fn make_input_vec(&self) -> Vec<f32> {
            self.inner.make_input_vec()
        }

        fn make_output_vec(&self) -> Vec<Complex32> {
            self.inner.make_output_vec()
        }

        fn make_scratch_vec(&self) -> Vec<Complex32> {
            self.inner.make_scratch_vec()
        }
    }

    fn counting_processor() -> (SpectrumProcessor, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let inner = RealFftPlanner::<f32>::new().plan_fft_forward(256);
        let context = FftContext::with_fft(Arc::new(CountingFft {
            inner,
            calls: Arc::clone(&calls),
        }));
        let (processor, _output) =
            SpectrumProcessor::with_context(context, 32, WindowType::Rectangular).unwrap();
        (processor, calls)
    }

    #[test]
    fn degenerate_input_never_invokes_the_transform() {
        let (processor, calls) = counting_processor();
        let samples = [0.5f32; 256];
        let channels = [&samples[..]];

        assert_eq!(
            processor.process_buffer(&SampleBuffer::new(&channels, 0)),
            vec![0.0; 32]
        );
        assert_eq!(processor.process(&[]), vec![0.0; 32]);
        processor.reset();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // A real frame does reach the transform, exactly once.
        processor.process_buffer(&SampleBuffer::new(&channels, 256));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn buffer_and_slice_ingestion_agree() {
        let (processor, _output) = processor();
        let tone = sine(523.25, 44_100.0, 0.2, FFT_SIZE);
        let channels = [&tone[..]];
        let buffer = SampleBuffer::new(&channels, tone.len());

        assert_eq!(processor.process_buffer(&buffer), processor.process(&tone));
    }
}
