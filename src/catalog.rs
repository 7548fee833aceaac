//! Fixed content library the dispatcher picks replies from.
//!
//! Two profiles exist: the content-aware catalog carries a video and a podcast
//! payload next to its canned texts, the text-only catalog carries texts only.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::classifier::ReplyKind;
use crate::message::MediaRef;

/// Which variant of the content library backs the dispatcher
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    Display,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CatalogProfile {
    /// Canned texts plus one video and one podcast payload
    #[default]
    ContentAware,
    /// Canned texts only
    TextOnly,
}

impl CatalogProfile {
    pub fn description(self) -> &'static str {
        match self {
            CatalogProfile::ContentAware => "replies with text, video or podcast depending on the request",
            CatalogProfile::TextOnly => "replies with canned text only",
        }
    }
}

/// Media part of a canned payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CannedMedia {
    Video {
        url: &'static str,
        title: &'static str,
    },
    Podcast {
        url: &'static str,
        title: &'static str,
        duration: &'static str,
    },
}

/// A fixed reply with enriched fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CannedPayload {
    pub text: &'static str,
    pub media: CannedMedia,
}

impl CannedPayload {
    pub fn media_ref(&self) -> MediaRef {
        match self.media {
            CannedMedia::Video { url, title } => MediaRef::Video {
                url: url.to_string(),
                title: title.to_string(),
            },
            CannedMedia::Podcast {
                url,
                title,
                duration,
            } => MediaRef::Podcast {
                url: url.to_string(),
                title: title.to_string(),
                duration: duration.to_string(),
            },
        }
    }
}

pub const GREETING: &str = "Willkommen bei PostFinance. Ich helfe dir deine Finanzen besser zu verstehen. Wenn du willst kann ich dir auch mit einem Podcast, Video, einem Rapsong oder einem Comic antworten.";

pub const VIDEO_PAYLOAD: CannedPayload = CannedPayload {
    text: "Hier ist deine detaillierte Finanzanalyse als Video! Ich zeige dir deine wichtigsten Ausgabentrends der letzten 3 Monate und gebe dir konkrete Spartipps basierend auf deinem Ausgabeverhalten.",
    media: CannedMedia::Video {
        url: "https://sample-videos.com/zip/10/mp4/SampleVideo_1280x720_1mb.mp4",
        title: "Deine persönliche Finanzanalyse - März 2024",
    },
};

pub const PODCAST_PAYLOAD: CannedPayload = CannedPayload {
    text: "Hier ist deine persönliche Finanzanalyse als Podcast! Ich erkläre dir ausführlich deine Ausgabentrends, zeige dir versteckte Sparpotentiale auf und gebe dir praktische Tipps für deinen Alltag.",
    media: CannedMedia::Podcast {
        url: "https://example.com/podcast.mp3",
        title: "Deine Finanzanalyse: Erfolge & Sparpotentiale",
        duration: "8:32",
    },
};

const CONTENT_AWARE_REPLIES: &[&str] = &[
    "Basierend auf deinen Ausgabendaten vom letzten Monat sehe ich tatsächlich eine Verbesserung! Du hast 12% weniger für Restaurants ausgegeben und deine Lebensmittelkosten um 8% reduziert. Soll ich dir eine detaillierte Analyse als Podcast erstellen?",
    "Ja, definitiv! Deine Ausgaben für Transport sind um 15% gesunken. Das entspricht einer Ersparnis von CHF 89. Möchtest du, dass ich dir das als Rapsong zusammenfasse?",
    "Interessante Frage! Lass mich deine Ausgabenmuster analysieren... Ich sehe positive Trends bei deinen Fixkosten. Soll ich dir ein Comic dazu erstellen?",
    "Großartig, dass du deine Finanzen reflektierst! Deine Ausgaben für Online-Shopping sind deutlich gesunken. Welches Format bevorzugst du für die Analyse?",
    "Ich kann eine Verbesserung bei deinen variablen Ausgaben feststellen. 18% weniger Impulskäufe als letzten Monat! Soll ich dir das als Podcast erklären?",
    "Deine Budgetdisziplin zahlt sich aus! Die Ausgaben für Unterhaltung sind im Rahmen geblieben. Möchtest du einen Rapsong über deine Erfolge?",
    "Absolut! Besonders bei den Nebenkategorien sehe ich Verbesserungen. Soll ich dir ein Comic mit deinen Top 3 Sparerfolgen erstellen?",
];

const TEXT_ONLY_REPLIES: &[&str] = &[
    "Basierend auf deinen Ausgabendaten vom letzten Monat sehe ich tatsächlich eine Verbesserung! Du hast 12% weniger für Restaurants ausgegeben und deine Lebensmittelkosten um 8% reduziert. Soll ich dir eine detaillierte Analyse als Podcast erstellen?",
    "Ja, definitiv! Deine Ausgaben für Transport sind um 15% gesunken. Das entspricht einer Ersparnis von CHF 89. Möchtest du, dass ich dir das als Rapsong zusammenfasse?",
    "Interessante Frage! Lass mich deine Ausgabenmuster analysieren... Ich sehe positive Trends bei deinen Fixkosten. Soll ich dir ein Comic dazu erstellen?",
    "Deine Sparrate hat sich um 6% verbessert! Das zeigt, dass du bewusster mit deinem Geld umgehst. Möchtest du ein Video mit Tipps für weitere Verbesserungen?",
    "Großartig, dass du deine Finanzen reflektierst! Deine Ausgaben für Online-Shopping sind deutlich gesunken. Welches Format bevorzugst du für die Analyse?",
    "Ich kann eine Verbesserung bei deinen variablen Ausgaben feststellen. 18% weniger Impulskäufe als letzten Monat! Soll ich dir das als Podcast erklären?",
    "Deine Budgetdisziplin zahlt sich aus! Die Ausgaben für Unterhaltung sind im Rahmen geblieben. Möchtest du einen Rapsong über deine Erfolge?",
    "Absolut! Besonders bei den Nebenkategorien sehe ich Verbesserungen. Soll ich dir ein Comic mit deinen Top 3 Sparerfolgen erstellen?",
];

/// Everything the dispatcher may answer with under one profile
#[derive(Debug, Clone)]
pub struct ContentCatalog {
    pub profile: CatalogProfile,
    pub greeting: &'static str,
    pub text_replies: &'static [&'static str],
    pub video: Option<CannedPayload>,
    pub podcast: Option<CannedPayload>,
}

static CONTENT_AWARE_CATALOG: ContentCatalog = ContentCatalog {
    profile: CatalogProfile::ContentAware,
    greeting: GREETING,
    text_replies: CONTENT_AWARE_REPLIES,
    video: Some(VIDEO_PAYLOAD),
    podcast: Some(PODCAST_PAYLOAD),
};

static TEXT_ONLY_CATALOG: ContentCatalog = ContentCatalog {
    profile: CatalogProfile::TextOnly,
    greeting: GREETING,
    text_replies: TEXT_ONLY_REPLIES,
    video: None,
    podcast: None,
};

impl ContentCatalog {
    /// The static catalog backing `profile`
    pub fn for_profile(profile: CatalogProfile) -> &'static ContentCatalog {
        match profile {
            CatalogProfile::ContentAware => &CONTENT_AWARE_CATALOG,
            CatalogProfile::TextOnly => &TEXT_ONLY_CATALOG,
        }
    }

    /// The payload backing a classified reply kind, if this catalog has one
    pub fn payload_for(&self, kind: ReplyKind) -> Option<&CannedPayload> {
        match kind {
            ReplyKind::Podcast => self.podcast.as_ref(),
            ReplyKind::Video => self.video.as_ref(),
            ReplyKind::Text => None,
        }
    }

    pub fn contains_text_reply(&self, text: &str) -> bool {
        self.text_replies.contains(&text)
    }

    pub fn is_content_aware(&self) -> bool {
        self.video.is_some() || self.podcast.is_some()
    }
}
