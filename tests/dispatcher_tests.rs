//! End-to-end behavior of the response dispatcher
//!
//! Time is paused, so the simulated reply latency is driven explicitly with
//! `tokio::time::advance` and `sleep`.

use spendcast::catalog::{CatalogProfile, ContentCatalog, PODCAST_PAYLOAD, VIDEO_PAYLOAD};
use spendcast::{
    classify, ContentType, DelayWindow, DispatcherEvent, IgnoreReason, MediaRef, Origin,
    ReplyKind, ResponseDispatcher, Submission,
};
use std::time::Duration;

const MAX_DELAY: Duration = Duration::from_millis(3000);

/// Dispatcher plus helpers for driving one conversation
struct Chat {
    dispatcher: ResponseDispatcher,
}

impl Chat {
    fn new(profile: CatalogProfile, seed: u64) -> Self {
        Self {
            dispatcher: ResponseDispatcher::new(profile, DelayWindow::default(), Some(seed)),
        }
    }

    /// Submit and wait past the longest possible delay
    async fn exchange(&mut self, text: &str) -> spendcast::Message {
        assert!(self.dispatcher.submit(text).is_accepted());
        tokio::time::sleep(MAX_DELAY + Duration::from_millis(1)).await;
        let events = self.dispatcher.poll_replies();
        assert!(events
            .iter()
            .any(|event| matches!(event, DispatcherEvent::MessageAppended { origin: Origin::Assistant, .. })));
        self.dispatcher
            .messages()
            .last()
            .cloned()
            .expect("log is never empty")
    }
}

#[tokio::test(start_paused = true)]
async fn each_cycle_grows_the_log_by_two() {
    let mut chat = Chat::new(CatalogProfile::ContentAware, 1);
    let requests = ["Hallo", "Zeig mir ein Video", "Als Podcast bitte", "Danke"];

    for (index, request) in requests.iter().enumerate() {
        let before = chat.dispatcher.len();
        chat.exchange(request).await;
        assert_eq!(chat.dispatcher.len(), before + 2, "cycle {index}");
    }

    assert_eq!(chat.dispatcher.len(), 1 + 2 * requests.len());
}

#[tokio::test(start_paused = true)]
async fn podcast_request_gets_podcast_payload() {
    let mut chat = Chat::new(CatalogProfile::ContentAware, 2);
    let reply = chat.exchange("Kannst du mir das als Podcast erklären?").await;

    assert_eq!(reply.origin, Origin::Assistant);
    assert_eq!(reply.content_type, ContentType::Podcast);
    assert_eq!(reply.text, PODCAST_PAYLOAD.text);
    match reply.media {
        Some(MediaRef::Podcast { title, duration, .. }) => {
            assert_eq!(title, "Deine Finanzanalyse: Erfolge & Sparpotentiale");
            assert_eq!(duration, "8:32");
        }
        other => panic!("expected podcast media, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn video_request_gets_video_payload() {
    let mut chat = Chat::new(CatalogProfile::ContentAware, 3);
    let reply = chat.exchange("Zeig mir meine Trends").await;

    assert_eq!(reply.content_type, ContentType::Video);
    assert_eq!(reply.text, VIDEO_PAYLOAD.text);
    assert_eq!(
        reply.media.as_ref().map(MediaRef::title),
        Some("Deine persönliche Finanzanalyse - März 2024")
    );
}

#[tokio::test(start_paused = true)]
async fn podcast_wins_over_video() {
    let mut chat = Chat::new(CatalogProfile::ContentAware, 4);
    let reply = chat.exchange("Ein Video oder lieber Audio?").await;
    assert_eq!(reply.content_type, ContentType::Podcast);
}

#[tokio::test(start_paused = true)]
async fn plain_request_gets_canned_text() {
    let mut chat = Chat::new(CatalogProfile::ContentAware, 5);
    let reply = chat.exchange("Wie war mein Monat?").await;

    let catalog = ContentCatalog::for_profile(CatalogProfile::ContentAware);
    assert_eq!(reply.content_type, ContentType::Text);
    assert!(reply.media.is_none());
    assert!(catalog.contains_text_reply(&reply.text));
}

#[tokio::test(start_paused = true)]
async fn text_only_profile_never_produces_media() {
    let mut chat = Chat::new(CatalogProfile::TextOnly, 6);
    let catalog = ContentCatalog::for_profile(CatalogProfile::TextOnly);

    for request in ["Podcast bitte", "Video bitte", "Analyse", "Hallo"] {
        let reply = chat.exchange(request).await;
        assert_eq!(reply.content_type, ContentType::Text);
        assert!(reply.media.is_none());
        assert!(catalog.contains_text_reply(&reply.text));
    }
}

#[tokio::test(start_paused = true)]
async fn composing_flag_spans_the_delay() {
    let mut dispatcher = ResponseDispatcher::new(
        CatalogProfile::ContentAware,
        DelayWindow::fixed(Duration::from_millis(1500)),
        Some(7),
    );
    assert!(!dispatcher.is_composing());

    let submission = dispatcher.submit("Hallo");
    assert_eq!(
        submission,
        Submission::Accepted {
            message_id: dispatcher.messages()[1].id,
            delay: Duration::from_millis(1500),
        }
    );
    assert!(dispatcher.is_composing());
    assert!(dispatcher.snapshot().composing);

    tokio::time::advance(Duration::from_millis(1000)).await;
    assert!(dispatcher.poll_replies().is_empty());
    assert!(dispatcher.is_composing());
    assert_eq!(dispatcher.len(), 2);

    tokio::time::sleep(Duration::from_millis(501)).await;
    let events = dispatcher.poll_replies();
    assert_eq!(
        events.last(),
        Some(&DispatcherEvent::ComposingChanged { composing: false })
    );
    assert!(!dispatcher.is_composing());
    assert_eq!(dispatcher.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn submissions_while_composing_are_ignored() {
    let mut chat = Chat::new(CatalogProfile::ContentAware, 8);
    assert!(chat.dispatcher.submit("Erste Frage").is_accepted());
    assert_eq!(
        chat.dispatcher.submit("Zweite Frage"),
        Submission::Ignored(IgnoreReason::Composing)
    );
    assert_eq!(
        chat.dispatcher.submit("   "),
        Submission::Ignored(IgnoreReason::EmptyInput)
    );

    let reply = chat.dispatcher.next_reply().await.expect("reply arrives");
    assert_eq!(reply.origin, Origin::Assistant);
    assert_eq!(chat.dispatcher.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn messages_alternate_after_greeting() {
    let mut chat = Chat::new(CatalogProfile::ContentAware, 9);
    for request in ["Hallo", "Podcast", "Video"] {
        chat.exchange(request).await;
    }

    let origins: Vec<Origin> = chat.dispatcher.messages().iter().map(|m| m.origin).collect();
    assert_eq!(origins[0], Origin::Assistant);
    for pair in origins[1..].chunks(2) {
        assert_eq!(pair, [Origin::User, Origin::Assistant]);
    }

    let sequences: Vec<u64> = chat.dispatcher.messages().iter().map(|m| m.sequence).collect();
    assert!(sequences.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test(start_paused = true)]
async fn shutdown_discards_pending_reply() {
    let mut chat = Chat::new(CatalogProfile::ContentAware, 10);
    assert!(chat.dispatcher.submit("Podcast bitte").is_accepted());
    chat.dispatcher.shutdown();

    tokio::time::sleep(MAX_DELAY * 2).await;
    assert!(chat.dispatcher.poll_replies().is_empty());
    assert_eq!(chat.dispatcher.len(), 2);
    assert!(!chat.dispatcher.is_composing());
    assert_eq!(
        chat.dispatcher.submit("Noch da?"),
        Submission::Ignored(IgnoreReason::ShutDown)
    );
}

#[tokio::test(start_paused = true)]
async fn dropping_aborts_the_pending_reply() {
    let snapshot = {
        let mut dispatcher =
            ResponseDispatcher::new(CatalogProfile::ContentAware, DelayWindow::default(), Some(11));
        assert!(dispatcher.submit("Video").is_accepted());
        assert_eq!(dispatcher.pending_replies(), 1);
        dispatcher.snapshot()
    };

    // Runtime keeps going past the longest delay with nothing left to fire
    tokio::time::sleep(MAX_DELAY * 2).await;
    assert!(snapshot.composing);
    assert_eq!(snapshot.messages.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn same_seed_same_conversation() {
    let mut first = Chat::new(CatalogProfile::TextOnly, 42);
    let mut second = Chat::new(CatalogProfile::TextOnly, 42);

    for request in ["Hallo", "Wie geht's?", "Und jetzt?"] {
        let a = first.exchange(request).await;
        let b = second.exchange(request).await;
        assert_eq!(a.text, b.text);
    }
}

#[test]
fn classification_is_stable() {
    for text in ["Podcast", "VIDEO", "Analyse meiner Ausgaben", "Hallo", ""] {
        assert_eq!(classify(text), classify(text));
    }
    assert_eq!(classify("hören"), ReplyKind::Podcast);
    assert_eq!(classify("Comic bitte"), ReplyKind::Text);
}
