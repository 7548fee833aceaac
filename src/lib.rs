//! SpendCast: a mocked personal-finance chat assistant.
//!
//! Replies are canned. The dispatcher classifies each message by keyword,
//! waits a random delay while showing a composing indicator, then appends a
//! text, video or podcast reply to the conversation log.

pub mod catalog;
pub mod classifier;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod message;
pub mod ui;

pub use catalog::{CatalogProfile, ContentCatalog};
pub use classifier::{ReplyKind, classify};
pub use config::Config;
pub use dispatcher::{DelayWindow, IgnoreReason, ResponseDispatcher, Submission};
pub use error::{Result, SpendcastError};
pub use events::{ContentType, DispatcherEvent, Origin};
pub use message::{ConversationSnapshot, MediaRef, Message};
