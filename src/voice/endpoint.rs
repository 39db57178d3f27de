//! Utterance endpointing
//!
//! Segments the capture stream into single utterances: speech begins when
//! energy rises above a threshold calibrated against ambient noise, and the
//! utterance ends after sustained silence. A hard cap bounds how long a
//! single utterance may run so one turn's latency is bounded.

/// Floor for the speech energy threshold, regardless of calibration
const BASE_ENERGY_THRESHOLD: f32 = 0.03;

/// Ambient RMS is scaled by this factor to sit above the noise floor
const AMBIENT_MULTIPLIER: f32 = 2.5;

/// Minimum speech length to count as an utterance (0.3s at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800;

/// Silence run that ends an utterance (0.5s at 16kHz)
const SILENCE_SAMPLES: usize = 8000;

/// Hard cap on a single utterance (20s at 16kHz)
const MAX_UTTERANCE_SAMPLES: usize = 320_000;

/// State of the endpointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointerState {
    /// Waiting for speech to begin
    Idle,
    /// Speech detected, accumulating the utterance
    Capturing,
}

/// Segments audio into utterances by energy and silence
pub struct Endpointer {
    threshold: f32,
    state: EndpointerState,
    utterance: Vec<f32>,
    speech_len: usize,
    silence_run: usize,
}

impl Endpointer {
    /// Create an endpointer with the base threshold (no calibration)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            threshold: BASE_ENERGY_THRESHOLD,
            state: EndpointerState::Idle,
            utterance: Vec::new(),
            speech_len: 0,
            silence_run: 0,
        }
    }

    /// Create an endpointer calibrated against a measured ambient level
    ///
    /// The threshold never drops below the base floor, so a dead-quiet room
    /// does not make the detector hair-triggered.
    #[must_use]
    pub fn calibrated(ambient_rms: f32) -> Self {
        let threshold = (ambient_rms * AMBIENT_MULTIPLIER).max(BASE_ENERGY_THRESHOLD);
        tracing::debug!(ambient_rms, threshold, "endpointer calibrated");

        Self {
            threshold,
            ..Self::new()
        }
    }

    /// Feed captured samples; returns true when a complete utterance is ready
    ///
    /// An utterance completes on sustained silence after enough speech, or
    /// when the hard length cap is hit mid-speech.
    pub fn feed(&mut self, samples: &[f32]) -> bool {
        let is_speech = rms_energy(samples) > self.threshold;

        match self.state {
            EndpointerState::Idle => {
                if is_speech {
                    self.state = EndpointerState::Capturing;
                    self.utterance.clear();
                    self.utterance.extend_from_slice(samples);
                    self.speech_len = samples.len();
                    self.silence_run = 0;
                    tracing::trace!("speech detected, capturing");
                }
                false
            }
            EndpointerState::Capturing => {
                self.utterance.extend_from_slice(samples);

                if is_speech {
                    self.speech_len += samples.len();
                    self.silence_run = 0;
                } else {
                    self.silence_run += samples.len();
                }

                if self.utterance.len() >= MAX_UTTERANCE_SAMPLES {
                    tracing::debug!(samples = self.utterance.len(), "utterance cap reached");
                    return true;
                }

                if self.silence_run > SILENCE_SAMPLES && self.speech_len > MIN_SPEECH_SAMPLES {
                    tracing::debug!(samples = self.utterance.len(), "utterance complete");
                    return true;
                }

                // Long silence without enough speech: a spurious blip
                if self.silence_run > SILENCE_SAMPLES * 2 {
                    tracing::trace!("silence timeout, resetting");
                    self.reset();
                }

                false
            }
        }
    }

    /// Take the accumulated utterance, resetting to idle
    pub fn take_utterance(&mut self) -> Vec<f32> {
        self.state = EndpointerState::Idle;
        self.speech_len = 0;
        self.silence_run = 0;
        std::mem::take(&mut self.utterance)
    }

    /// Reset to idle, discarding any partial utterance
    pub fn reset(&mut self) {
        self.state = EndpointerState::Idle;
        self.utterance.clear();
        self.speech_len = 0;
        self.silence_run = 0;
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> EndpointerState {
        self.state
    }

    /// Get the active speech threshold
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for Endpointer {
    fn default() -> Self {
        Self::new()
    }
}

/// Calculate RMS energy of audio samples
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn rms_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_of_silence_and_tone() {
        let silence = vec![0.0f32; 100];
        assert!(rms_energy(&silence) < 0.001);

        let loud = vec![0.5f32; 100];
        assert!(rms_energy(&loud) > 0.4);
    }

    #[test]
    fn silence_never_starts_an_utterance() {
        let mut ep = Endpointer::new();
        let silence = vec![0.0f32; SILENCE_SAMPLES * 3];
        assert!(!ep.feed(&silence));
        assert_eq!(ep.state(), EndpointerState::Idle);
    }

    #[test]
    fn speech_then_silence_completes() {
        let mut ep = Endpointer::new();

        let speech = vec![0.3f32; MIN_SPEECH_SAMPLES * 2];
        assert!(!ep.feed(&speech));
        assert_eq!(ep.state(), EndpointerState::Capturing);

        let silence = vec![0.0f32; SILENCE_SAMPLES + 1];
        assert!(ep.feed(&silence));

        let utterance = ep.take_utterance();
        assert_eq!(utterance.len(), speech.len() + silence.len());
        assert_eq!(ep.state(), EndpointerState::Idle);
    }

    #[test]
    fn cap_bounds_a_runaway_utterance() {
        let mut ep = Endpointer::new();
        let chunk = vec![0.3f32; 16000];

        let mut completed = false;
        for _ in 0..25 {
            if ep.feed(&chunk) {
                completed = true;
                break;
            }
        }

        assert!(completed, "utterance must complete at the cap");
        assert!(ep.take_utterance().len() >= MAX_UTTERANCE_SAMPLES);
    }

    #[test]
    fn short_blip_resets_without_completing() {
        let mut ep = Endpointer::new();

        // A blip shorter than the minimum speech length
        let blip = vec![0.3f32; 800];
        ep.feed(&blip);
        assert_eq!(ep.state(), EndpointerState::Capturing);

        // Long silence discards it
        let silence = vec![0.0f32; SILENCE_SAMPLES * 2 + 1];
        assert!(!ep.feed(&silence));
        assert_eq!(ep.state(), EndpointerState::Idle);
    }

    #[test]
    fn calibration_raises_threshold_above_noise() {
        let ep = Endpointer::calibrated(0.1);
        assert!(ep.threshold() > 0.2);

        // Quiet rooms keep the base floor
        let quiet = Endpointer::calibrated(0.0001);
        assert!((quiet.threshold() - BASE_ENERGY_THRESHOLD).abs() < f32::EPSILON);
    }

    #[test]
    fn calibrated_endpointer_ignores_noise_below_threshold() {
        let mut ep = Endpointer::calibrated(0.1);
        let noise = vec![0.05f32; 16000];
        assert!(!ep.feed(&noise));
        assert_eq!(ep.state(), EndpointerState::Idle);
    }
}
