//! Voice processing module
//!
//! Audio capture with ambient-noise calibration, utterance endpointing,
//! speech-to-text, text-to-speech and playback. The conversation loop in
//! `assistant` consumes these through its seam traits.

mod capture;
mod endpoint;
mod listener;
mod playback;
mod speaker;
mod stt;
mod tts;

pub use capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
pub use endpoint::{Endpointer, EndpointerState, rms_energy};
pub use listener::UtteranceListener;
pub use playback::AudioPlayback;
pub use speaker::Speaker;
pub use stt::SpeechToText;
pub use tts::TextToSpeech;
