//! Voice conversation loop
//!
//! One turn: capture an utterance, transcribe it, build a context-augmented
//! prompt, generate a reply, then show and speak it. The loop runs until the
//! user says a stop phrase; every other failure is reported to the
//! transcript and the loop returns to listening. A single bad turn never
//! takes the process down.

use async_trait::async_trait;

use crate::context::ContextSource;
use crate::display::DisplayHandle;
use crate::Result;

/// Phrases that end the conversation (compared trimmed, case-insensitive)
const STOP_PHRASES: &[&str] = &["stop", "exit"];

/// Source of captured utterances (microphone in production)
///
/// `?Send` futures: the production listener holds the audio stream across
/// await points, and the whole loop is confined to the voice thread anyway.
#[async_trait(?Send)]
pub trait UtteranceSource {
    /// Block until one utterance is captured; returns WAV bytes
    async fn capture_utterance(&mut self) -> Result<Vec<u8>>;
}

/// Speech-to-text seam
#[async_trait(?Send)]
pub trait Transcriber {
    /// Transcribe audio; an empty string means nothing intelligible
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}

/// Reply generation seam
#[async_trait(?Send)]
pub trait ReplyGenerator {
    /// Generate a full reply for the prompt (blocking for the whole
    /// generation; there is no cancellation of an in-flight call)
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait(?Send)]
impl ReplyGenerator for crate::llm::OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(prompt).await
    }
}

/// Spoken output seam
#[async_trait(?Send)]
pub trait SpeechOutput {
    /// Speak text aloud, blocking until playback finishes
    async fn speak(&mut self, text: &str) -> Result<()>;
}

/// How a single turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A reply was produced (TTS may still have failed and been reported)
    Completed,
    /// Nothing intelligible was heard; reported, loop continues
    Unrecognized,
    /// A service call failed; reported, loop continues
    ServiceError,
    /// The user said a stop phrase; the loop terminates
    Stopped,
}

/// The conversation loop over its external seams
pub struct ConversationLoop<S, T, G, V, C> {
    source: S,
    transcriber: T,
    generator: G,
    speech: V,
    context: C,
    display: DisplayHandle,
}

impl<S, T, G, V, C> ConversationLoop<S, T, G, V, C>
where
    S: UtteranceSource,
    T: Transcriber,
    G: ReplyGenerator,
    V: SpeechOutput,
    C: ContextSource,
{
    /// Create a conversation loop
    pub const fn new(
        source: S,
        transcriber: T,
        generator: G,
        speech: V,
        context: C,
        display: DisplayHandle,
    ) -> Self {
        Self {
            source,
            transcriber,
            generator,
            speech,
            context,
            display,
        }
    }

    /// Run turns until the user says a stop phrase
    ///
    /// Errors not handled inside a turn (for example a capture device
    /// failure mid-listen) are reported to the transcript and the loop
    /// resumes listening.
    pub async fn run(&mut self) {
        tracing::info!("conversation loop started");

        loop {
            match self.turn().await {
                Ok(TurnOutcome::Stopped) => break,
                Ok(outcome) => {
                    tracing::debug!(?outcome, "turn finished");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "turn failed, resuming");
                    self.display.transcript(format!("Error: {e}"));
                }
            }
        }

        tracing::info!("conversation loop stopped");
    }

    /// Run a single turn
    ///
    /// # Errors
    ///
    /// Returns error only for failures not covered by the turn's own
    /// reporting (utterance capture); the caller reports and continues
    pub async fn turn(&mut self) -> Result<TurnOutcome> {
        self.display.transcript("Listening for your prompt...");

        let audio = self.source.capture_utterance().await?;

        let text = match self.transcriber.transcribe(&audio).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "speech service failed");
                self.display.transcript(format!("Speech service error: {e}"));
                return Ok(TurnOutcome::ServiceError);
            }
        };

        let prompt_text = text.trim();
        if prompt_text.is_empty() {
            self.display
                .transcript("Could not understand audio. Please try again.");
            return Ok(TurnOutcome::Unrecognized);
        }

        if is_stop_phrase(prompt_text) {
            self.display.transcript("Exiting conversation.");
            return Ok(TurnOutcome::Stopped);
        }

        self.display.transcript(format!("You said: {prompt_text}"));

        // Context is rebuilt from live data on every turn; it degrades
        // internally and never fails.
        let context = self.context.build().await;
        let prompt = context.render_prompt(prompt_text);

        let reply = match self.generator.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "reply generation failed");
                self.display.transcript(format!("Error: {e}"));
                return Ok(TurnOutcome::ServiceError);
            }
        };

        self.display.transcript(format!("Assistant: {reply}"));

        if let Err(e) = self.speech.speak(&reply).await {
            tracing::warn!(error = %e, "speech output failed");
            self.display.transcript(format!("Error: {e}"));
        }

        Ok(TurnOutcome::Completed)
    }
}

/// Whether recognized text is a stop phrase (trimmed, case-insensitive)
#[must_use]
pub fn is_stop_phrase(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    STOP_PHRASES.contains(&normalized.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_phrases_match_trimmed_case_insensitive() {
        assert!(is_stop_phrase("stop"));
        assert!(is_stop_phrase("  Stop  "));
        assert!(is_stop_phrase("EXIT"));
        assert!(is_stop_phrase("Exit\n"));
    }

    #[test]
    fn stop_phrase_requires_exact_match() {
        assert!(!is_stop_phrase("stop the music"));
        assert!(!is_stop_phrase("please exit"));
        assert!(!is_stop_phrase("stopwatch"));
        assert!(!is_stop_phrase(""));
    }
}
