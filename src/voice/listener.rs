//! Single-utterance microphone listener
//!
//! Opens the capture stream, samples ambient noise to calibrate the
//! endpointer, then blocks until an utterance boundary. The stream handle
//! lives inside the capture scope, so it is released on every exit path.

use std::time::Duration;

use async_trait::async_trait;

use crate::assistant::UtteranceSource;
use crate::voice::capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
use crate::voice::endpoint::{Endpointer, rms_energy};
use crate::Result;

/// How long ambient noise is sampled before listening
const AMBIENT_CALIBRATION: Duration = Duration::from_secs(5);

/// Polling cadence for the capture buffer (100ms of audio at 16kHz)
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Captures one utterance at a time from the default microphone
pub struct UtteranceListener {
    calibration: Duration,
}

impl UtteranceListener {
    /// Create a listener with the standard calibration window
    #[must_use]
    pub const fn new() -> Self {
        Self {
            calibration: AMBIENT_CALIBRATION,
        }
    }

    /// Capture a single utterance and encode it as WAV bytes
    ///
    /// There is no overall timeout: the listener waits indefinitely for
    /// speech to begin. Once speech starts, the endpointer's cap bounds the
    /// utterance length.
    ///
    /// # Errors
    ///
    /// Returns error if the capture device is unavailable or encoding fails
    pub async fn listen(&self) -> Result<Vec<u8>> {
        // The capture value owns the stream; dropping it on any path below
        // (including `?`) releases the microphone.
        let mut capture = AudioCapture::new()?;
        capture.start()?;

        // Sample the room before listening so the threshold sits above the
        // ambient noise floor.
        tokio::time::sleep(self.calibration).await;
        let ambient = rms_energy(&capture.take_buffer());
        let mut endpointer = Endpointer::calibrated(ambient);

        tracing::debug!(ambient, "listening for utterance");

        loop {
            tokio::time::sleep(POLL_INTERVAL).await;
            let samples = capture.take_buffer();
            if endpointer.feed(&samples) {
                break;
            }
        }

        capture.stop();

        let utterance = endpointer.take_utterance();
        tracing::debug!(samples = utterance.len(), "utterance captured");
        samples_to_wav(&utterance, SAMPLE_RATE)
    }
}

impl Default for UtteranceListener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl UtteranceSource for UtteranceListener {
    async fn capture_utterance(&mut self) -> Result<Vec<u8>> {
        self.listen().await
    }
}
