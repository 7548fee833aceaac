//! Conversation messages and their media attachments

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::CannedPayload;
use crate::events::{ContentType, Origin};

/// Media attached to a non-text reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaRef {
    Video {
        url: String,
        title: String,
    },
    Podcast {
        url: String,
        title: String,
        duration: String,
    },
}

impl MediaRef {
    pub fn content_type(&self) -> ContentType {
        match self {
            MediaRef::Video { .. } => ContentType::Video,
            MediaRef::Podcast { .. } => ContentType::Podcast,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            MediaRef::Video { title, .. } | MediaRef::Podcast { title, .. } => title,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            MediaRef::Video { url, .. } | MediaRef::Podcast { url, .. } => url,
        }
    }

    /// Running time, only known for podcasts
    pub fn duration(&self) -> Option<&str> {
        match self {
            MediaRef::Video { .. } => None,
            MediaRef::Podcast { duration, .. } => Some(duration),
        }
    }
}

/// A single entry of the conversation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    /// Position in the dispatcher's creation order, strictly increasing
    pub sequence: u64,
    pub text: String,
    pub origin: Origin,
    pub created_at: DateTime<Utc>,
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaRef>,
}

impl Message {
    fn new(sequence: u64, origin: Origin, text: String, media: Option<MediaRef>) -> Self {
        let content_type = media
            .as_ref()
            .map(MediaRef::content_type)
            .unwrap_or_default();

        Self {
            id: Uuid::new_v4(),
            sequence,
            text,
            origin,
            created_at: Utc::now(),
            content_type,
            media,
        }
    }

    /// Plain text written by the user
    pub fn user(sequence: u64, text: impl Into<String>) -> Self {
        Self::new(sequence, Origin::User, text.into(), None)
    }

    /// Plain text reply from the assistant
    pub fn assistant_text(sequence: u64, text: impl Into<String>) -> Self {
        Self::new(sequence, Origin::Assistant, text.into(), None)
    }

    /// Assistant reply built from a canned payload, fields copied verbatim
    pub fn assistant_payload(sequence: u64, payload: &CannedPayload) -> Self {
        Self::new(
            sequence,
            Origin::Assistant,
            payload.text.to_string(),
            Some(payload.media_ref()),
        )
    }

    pub fn is_user(&self) -> bool {
        self.origin == Origin::User
    }

    /// Local wall-clock time as `HH:MM`
    pub fn display_time(&self) -> String {
        self.created_at
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string()
    }
}

/// Read-only view handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationSnapshot {
    pub messages: Vec<Message>,
    pub composing: bool,
}

impl ConversationSnapshot {
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PODCAST_PAYLOAD;

    #[test]
    fn test_user_message_is_text() {
        let message = Message::user(1, "Hallo");
        assert_eq!(message.origin, Origin::User);
        assert_eq!(message.content_type, ContentType::Text);
        assert!(message.media.is_none());
        assert!(message.is_user());
    }

    #[test]
    fn test_payload_message_copies_fields() {
        let message = Message::assistant_payload(2, &PODCAST_PAYLOAD);
        assert_eq!(message.content_type, ContentType::Podcast);

        let media = message.media.expect("podcast replies carry media");
        assert_eq!(media.title(), "Deine Finanzanalyse: Erfolge & Sparpotentiale");
        assert_eq!(media.url(), "https://example.com/podcast.mp3");
        assert_eq!(media.duration(), Some("8:32"));
    }

    #[test]
    fn test_display_time_is_hours_and_minutes() {
        let message = Message::assistant_text(3, "Hi");
        let time = message.display_time();
        assert_eq!(time.len(), 5);
        assert_eq!(&time[2..3], ":");
    }

    #[test]
    fn test_text_message_omits_media_in_json() {
        let message = Message::assistant_text(4, "Hi");
        let json = serde_json::to_value(&message).unwrap();
        assert!(json.get("media").is_none());
        assert_eq!(json["content_type"], "text");
        assert_eq!(json["origin"], "assistant");
    }
}
