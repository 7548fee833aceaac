//! Keyword classification of user requests

use crate::events::ContentType;

/// What kind of reply a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyKind {
    Podcast,
    Video,
    Text,
}

impl ReplyKind {
    pub fn content_type(self) -> ContentType {
        match self {
            ReplyKind::Podcast => ContentType::Podcast,
            ReplyKind::Video => ContentType::Video,
            ReplyKind::Text => ContentType::Text,
        }
    }
}

const PODCAST_KEYWORDS: &[&str] = &["podcast", "audio", "hören"];
const VIDEO_KEYWORDS: &[&str] = &["video", "analyse", "trends"];

/// Ordered rules, first match wins
const RULES: &[(&[&str], ReplyKind)] = &[
    (PODCAST_KEYWORDS, ReplyKind::Podcast),
    (VIDEO_KEYWORDS, ReplyKind::Video),
];

/// Classify a request by case-insensitive substring match.
///
/// Podcast keywords take priority over video keywords; anything else is a
/// plain text request. Never fails.
pub fn classify(text: &str) -> ReplyKind {
    let lowered = text.to_lowercase();

    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|(_, kind)| *kind)
        .unwrap_or(ReplyKind::Text)
}
