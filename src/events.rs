use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events emitted by the dispatcher so observers know when to re-read the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatcherEvent {
    /// A message was appended to the conversation log
    MessageAppended {
        id: Uuid,
        origin: Origin,
        content_type: ContentType,
    },

    /// The composing flag flipped
    ComposingChanged { composing: bool },
}

/// Terminal events (keyboard, paste, resize)
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// Key press event
    Key(crossterm::event::KeyEvent),

    /// Paste event
    Paste(String),

    /// Terminal resize
    Resize(u16, u16),
}

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Assistant,
}

impl Origin {
    pub fn display_name(&self) -> &'static str {
        match self {
            Origin::User => "Du",
            Origin::Assistant => "SpendCast",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Origin::User => "👤",
            Origin::Assistant => "🤖",
        }
    }
}

/// Kind of content carried by a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Plain text body only
    #[default]
    Text,
    /// Text body plus a video card
    Video,
    /// Text body plus a podcast card
    Podcast,
    /// Declared by the content model but never produced: no payload or renderer exists yet
    Comic,
}

impl ContentType {
    pub fn display_name(&self) -> &'static str {
        match self {
            ContentType::Text => "Text",
            ContentType::Video => "Video",
            ContentType::Podcast => "Podcast",
            ContentType::Comic => "Comic",
        }
    }

    /// Whether messages of this type must carry a media reference
    pub fn carries_media(&self) -> bool {
        matches!(self, ContentType::Video | ContentType::Podcast)
    }
}
