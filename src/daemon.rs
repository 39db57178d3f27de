//! Daemon - the main kiosk service
//!
//! Orchestrates the display surface, the panel refreshers and the voice
//! conversation loop. The display consumer and refreshers share the tokio
//! runtime; the conversation loop runs on one dedicated background thread
//! for the process lifetime and communicates only by posting updates into
//! the display queue.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::assistant::ConversationLoop;
use crate::calendar::{Authenticator, CalendarClient};
use crate::context::ContextBuilder;
use crate::display::{self, DisplayHandle, Screen};
use crate::llm::OllamaClient;
use crate::voice::{Speaker, SpeechToText, UtteranceListener};
use crate::weather::WeatherClient;
use crate::{Config, Result};

/// The Hearth daemon - owns the display and the background voice loop
pub struct Daemon {
    config: Config,
}

impl Daemon {
    /// Create a new daemon instance
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the daemon until interrupted
    ///
    /// # Errors
    ///
    /// Returns error if startup fails; per-panel and per-turn failures are
    /// degraded in place and never stop the daemon
    pub async fn run(self) -> Result<()> {
        tracing::info!(
            address = %self.config.address,
            port = self.config.port,
            "daemon running"
        );

        let (handle, display_rx) = display::channel();

        let weather = WeatherClient::new(self.config.weather.clone(), self.config.units);
        let auth = Arc::new(Authenticator::new(&self.config.calendar));
        let calendar = CalendarClient::new(Arc::clone(&auth));

        // Panel refreshers: independent schedules, each owning its own
        // interval; a failed fetch degrades to placeholder text and the
        // schedule keeps firing.
        let _clock = display::spawn_clock(handle.clone(), self.config.time_format);
        let _weather = display::spawn_weather(handle.clone(), weather.clone(), self.config.units);
        let _calendar = display::spawn_calendar(handle.clone(), calendar.clone());

        // Set up shutdown signal
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = shutdown_tx.send(()).await;
            }
        });

        if self.config.voice.enabled {
            spawn_voice_thread(&self.config, weather, calendar, handle.clone());
        } else {
            tracing::info!("voice disabled - display-only mode");
        }

        // The display consumer is the only mutator of panel state; it runs
        // here on the main task until shutdown.
        let screen = Screen::new();
        tokio::select! {
            () = screen.run(display_rx) => {}
            _ = shutdown_rx.recv() => {
                tracing::info!("shutdown requested");
            }
        }

        tracing::info!("daemon stopped");
        Ok(())
    }
}

/// Start the conversation loop on its dedicated background thread
///
/// The thread is daemon-style: it is never joined and does not block
/// process shutdown. It owns the audio handles (cpal streams are not
/// `Send`) and a current-thread runtime for its HTTP calls; its only link
/// to the rest of the process is the display handle.
fn spawn_voice_thread(
    config: &Config,
    weather: WeatherClient,
    calendar: CalendarClient,
    handle: DisplayHandle,
) {
    let config = config.clone();

    let spawned = std::thread::Builder::new()
        .name("voice".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!(error = %e, "voice runtime failed to start");
                    return;
                }
            };

            runtime.block_on(voice_main(&config, weather, calendar, handle));
        });

    if let Err(e) = spawned {
        tracing::error!(error = %e, "failed to spawn voice thread");
    }
}

/// Build the voice pipeline and run the conversation loop
async fn voice_main(
    config: &Config,
    weather: WeatherClient,
    calendar: CalendarClient,
    handle: DisplayHandle,
) {
    let api_key = config.api_keys.openai.clone().unwrap_or_default();

    let transcriber = match SpeechToText::new(
        api_key,
        config.voice.stt_model.clone(),
        config.language.clone(),
    ) {
        Ok(stt) => stt,
        Err(e) => {
            tracing::error!(error = %e, "voice disabled");
            return;
        }
    };

    let speaker = match Speaker::new(&config.voice, &config.api_keys) {
        Ok(speaker) => speaker,
        Err(e) => {
            tracing::error!(error = %e, "voice disabled");
            return;
        }
    };

    let generator = OllamaClient::new(&config.llm);
    let context = ContextBuilder::new(weather, calendar, config.units, config.time_format);

    tracing::info!(
        model = %config.llm.model,
        stt_model = %config.voice.stt_model,
        "voice pipeline ready - say \"stop\" or \"exit\" to end the conversation"
    );

    let mut conversation = ConversationLoop::new(
        UtteranceListener::new(),
        transcriber,
        generator,
        speaker,
        context,
        handle,
    );

    conversation.run().await;
}
