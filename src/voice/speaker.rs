//! Spoken output: synthesis plus blocking playback

use async_trait::async_trait;

use crate::assistant::SpeechOutput;
use crate::config::{ApiKeys, VoiceConfig};
use crate::voice::playback::AudioPlayback;
use crate::voice::tts::TextToSpeech;
use crate::Result;

/// Speaks text through the default output device
pub struct Speaker {
    tts: TextToSpeech,
    playback: AudioPlayback,
}

impl Speaker {
    /// Create a speaker from voice configuration
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing or no output device exists
    pub fn new(voice: &VoiceConfig, api_keys: &ApiKeys) -> Result<Self> {
        let tts = TextToSpeech::new(
            api_keys.openai.clone().unwrap_or_default(),
            voice.tts_voice.clone(),
            voice.tts_speed,
            voice.tts_model.clone(),
        )?;
        let playback = AudioPlayback::new()?;

        Ok(Self { tts, playback })
    }

    /// Synthesize and play text, blocking until playback finishes
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or playback fails
    pub async fn say(&self, text: &str) -> Result<()> {
        tracing::debug!(text, "speaking");
        let audio = self.tts.synthesize(text).await?;
        self.playback.play_mp3(&audio)
    }
}

#[async_trait(?Send)]
impl SpeechOutput for Speaker {
    async fn speak(&mut self, text: &str) -> Result<()> {
        self.say(text).await
    }
}
