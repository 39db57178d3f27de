//! Hearth Display - smart display kiosk with a voice-driven assistant
//!
//! This library provides the core functionality for the Hearth kiosk:
//! - Clock, weather and calendar panels refreshed on independent schedules
//! - A voice conversation loop (capture, STT, LLM, TTS)
//! - Context augmentation: every prompt carries live time/weather/calendar
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Display Surface                     │
//! │    Clock  │  Weather  │  Calendar  │  Transcript    │
//! └────────────────────▲────────────────────────────────┘
//!                      │ DisplayUpdate queue
//! ┌────────────────────┴────────────────────────────────┐
//! │                 Hearth Daemon                        │
//! │   Refreshers  │  Conversation Loop (voice thread)   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │            External services                         │
//! │   Weather API │ Calendar API │ STT │ TTS │ LLM      │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod assistant;
pub mod calendar;
pub mod config;
pub mod context;
pub mod daemon;
pub mod display;
pub mod error;
pub mod llm;
pub mod voice;
pub mod weather;

pub use assistant::{ConversationLoop, TurnOutcome};
pub use config::{Config, TimeFormat, Units};
pub use context::{ContextBuilder, SessionContext};
pub use daemon::Daemon;
pub use display::{DisplayHandle, DisplayUpdate};
pub use error::{Error, Result};
