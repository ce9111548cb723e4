//! Published spectrum state: the one magnitude vector the display thread
//! reads, handed over through a lock-free triple buffer.
//!
//! The producer copies a *finished* magnitude vector into the back buffer
//! and publishes it with a pointer swap, so the reader can never observe a
//! half-written spectrum. Updates coalesce: a slow reader just skips
//! straight to the most recent complete result.

use std::sync::{Arc, Mutex};
use triple_buffer::TripleBuffer;

/// Producer half. Owned by the spectrum processor; written from whatever
/// thread drives processing.
pub(crate) struct SpectrumPublisher {
    input: triple_buffer::Input<Vec<f32>>,
}

impl SpectrumPublisher {
    /// Create a publisher/reader pair with all slots pre-filled with
    /// silence of the given length.
    pub(crate) fn channel(magnitude_count: usize) -> (Self, SpectrumOutput) {
        let (input, output) = TripleBuffer::new(&vec![0.0; magnitude_count]).split();
        (
            Self { input },
            SpectrumOutput::new(output, magnitude_count),
        )
    }

    /// Copy a completed magnitude vector into the back buffer and publish.
    /// All slots were allocated at the same fixed length up front, so this
    /// is a memcpy plus an atomic swap - no allocation.
    pub(crate) fn publish_from(&mut self, magnitudes: &[f32]) {
        self.input.input_buffer_mut().copy_from_slice(magnitudes);
        self.input.publish();
    }
}

/// Cloneable reader half for the display thread.
///
/// Wrapped in `Arc<Mutex<_>>` so the handle can be cloned into whatever
/// owns the rendering loop while the underlying triple-buffer output stays
/// single-consumer.
#[derive(Clone)]
pub struct SpectrumOutput {
    output: Arc<Mutex<triple_buffer::Output<Vec<f32>>>>,
    magnitude_count: usize,
}

impl SpectrumOutput {
    fn new(output: triple_buffer::Output<Vec<f32>>, magnitude_count: usize) -> Self {
        Self {
            output: Arc::new(Mutex::new(output)),
            magnitude_count,
        }
    }

    /// Latest fully published magnitude vector.
    ///
    /// Returns silence if another clone of this handle is mid-read; with
    /// the intended single display-thread reader that does not happen.
    pub fn read(&self) -> Vec<f32> {
        if let Ok(mut output) = self.output.try_lock() {
            output.read().clone()
        } else {
            vec![0.0; self.magnitude_count]
        }
    }

    /// Length of every vector this handle returns.
    pub fn magnitude_count(&self) -> usize {
        self.magnitude_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_out_silent() {
        let (_publisher, output) = SpectrumPublisher::channel(8);
        assert_eq!(output.read(), vec![0.0; 8]);
        assert_eq!(output.magnitude_count(), 8);
    }

    #[test]
    fn reader_sees_the_latest_publish() {
        let (mut publisher, output) = SpectrumPublisher::channel(3);

        publisher.publish_from(&[1.0, 2.0, 3.0]);
        publisher.publish_from(&[4.0, 5.0, 6.0]);

        // Intermediate updates coalesce; only the newest survives.
        assert_eq!(output.read(), vec![4.0, 5.0, 6.0]);
        // Reading again without a new publish repeats the same value.
        assert_eq!(output.read(), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn clones_share_the_same_stream() {
        let (mut publisher, output) = SpectrumPublisher::channel(2);
        let clone = output.clone();

        publisher.publish_from(&[7.0, 8.0]);
        assert_eq!(clone.read(), vec![7.0, 8.0]);
    }
}
