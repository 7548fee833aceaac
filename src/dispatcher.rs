//! The response dispatcher: owns the conversation log and the composing flag,
//! accepts user submissions and appends one canned reply per submission after
//! a randomized delay.
//!
//! All mutation happens through `&mut ResponseDispatcher`. The delay runs as a
//! spawned tokio task that only signals back over a channel; the owner applies
//! due replies with [`ResponseDispatcher::poll_replies`] or
//! [`ResponseDispatcher::next_reply`]. Pending tasks are aborted on
//! [`ResponseDispatcher::shutdown`] and on drop.

use std::collections::HashMap;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{CatalogProfile, ContentCatalog};
use crate::classifier::{classify, ReplyKind};
use crate::config::Config;
use crate::error::{Result, SpendcastError};
use crate::events::DispatcherEvent;
use crate::message::{ConversationSnapshot, Message};

/// Inclusive bounds of the simulated reply latency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayWindow {
    min_ms: u64,
    max_ms: u64,
}

impl DelayWindow {
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Result<Self> {
        if min_ms > max_ms {
            return Err(SpendcastError::InvalidDelayWindow { min_ms, max_ms });
        }
        Ok(Self { min_ms, max_ms })
    }

    /// Always wait exactly `delay`
    pub fn fixed(delay: Duration) -> Self {
        let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        Self { min_ms: ms, max_ms: ms }
    }

    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    pub fn contains(&self, delay: Duration) -> bool {
        delay >= self.min() && delay <= self.max()
    }

    /// Draw a delay uniformly from the window
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(rng.random_range(self.min_ms..=self.max_ms))
    }
}

impl Default for DelayWindow {
    fn default() -> Self {
        Self {
            min_ms: 1000,
            max_ms: 3000,
        }
    }
}

/// Why a submission did not start a new cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Nothing left after trimming
    EmptyInput,
    /// A reply is still pending
    Composing,
    /// The dispatcher was shut down
    ShutDown,
}

/// Outcome of [`ResponseDispatcher::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Accepted { message_id: Uuid, delay: Duration },
    Ignored(IgnoreReason),
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted { .. })
    }
}

/// Signal from a delay task that its reply is due
#[derive(Debug)]
struct ReplyDue {
    cycle: u64,
    request: String,
}

pub struct ResponseDispatcher {
    catalog: &'static ContentCatalog,
    delay: DelayWindow,
    rng: StdRng,
    log: Vec<Message>,
    composing: bool,
    next_sequence: u64,
    pending: HashMap<u64, JoinHandle<()>>,
    due_tx: mpsc::UnboundedSender<ReplyDue>,
    due_rx: mpsc::UnboundedReceiver<ReplyDue>,
    is_shut_down: bool,
}

impl std::fmt::Debug for ResponseDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseDispatcher")
            .field("profile", &self.catalog.profile)
            .field("delay", &self.delay)
            .field("messages", &self.log.len())
            .field("composing", &self.composing)
            .field("pending", &self.pending.len())
            .field("is_shut_down", &self.is_shut_down)
            .finish()
    }
}

impl ResponseDispatcher {
    /// Create a dispatcher whose log starts with the catalog greeting.
    ///
    /// Without a seed the RNG is seeded from the operating system.
    pub fn new(profile: CatalogProfile, delay: DelayWindow, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let (due_tx, due_rx) = mpsc::unbounded_channel();
        let catalog = ContentCatalog::for_profile(profile);

        let mut dispatcher = Self {
            catalog,
            delay,
            rng,
            log: Vec::new(),
            composing: false,
            next_sequence: 0,
            pending: HashMap::new(),
            due_tx,
            due_rx,
            is_shut_down: false,
        };

        let sequence = dispatcher.take_sequence();
        dispatcher
            .log
            .push(Message::assistant_text(sequence, catalog.greeting));

        info!(profile = %profile, min_ms = delay.min_ms, max_ms = delay.max_ms, "dispatcher ready");
        dispatcher
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let delay = config.delay.window()?;
        Ok(Self::new(config.profile, delay, config.seed))
    }

    /// Accept a user message and schedule the reply.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, raw_text: &str) -> Submission {
        if self.is_shut_down {
            debug!("submission ignored, dispatcher shut down");
            return Submission::Ignored(IgnoreReason::ShutDown);
        }

        let text = raw_text.trim();
        if text.is_empty() {
            debug!("submission ignored, empty input");
            return Submission::Ignored(IgnoreReason::EmptyInput);
        }

        if self.composing {
            debug!("submission ignored, reply still pending");
            return Submission::Ignored(IgnoreReason::Composing);
        }

        let cycle = self.take_sequence();
        let message = Message::user(cycle, text);
        let message_id = message.id;
        self.log.push(message);
        self.composing = true;

        let delay = self.delay.sample(&mut self.rng);
        let due_tx = self.due_tx.clone();
        let request = text.to_string();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = due_tx.send(ReplyDue { cycle, request });
        });
        self.pending.insert(cycle, handle);

        info!(
            cycle,
            delay_ms = delay.as_millis() as u64,
            "submission accepted, reply scheduled"
        );

        Submission::Accepted { message_id, delay }
    }

    /// Apply every reply that is already due, without waiting
    pub fn poll_replies(&mut self) -> Vec<DispatcherEvent> {
        let mut events = Vec::new();

        loop {
            match self.due_rx.try_recv() {
                Ok(due) => events.extend(self.apply_due(due)),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => break,
            }
        }

        events
    }

    /// Wait for the pending reply and return it once appended.
    ///
    /// Returns `None` immediately when nothing is pending.
    pub async fn next_reply(&mut self) -> Option<Message> {
        while self.composing && !self.is_shut_down {
            let due = self.due_rx.recv().await?;
            if self.apply_due(due).is_empty() {
                continue;
            }
            return self.log.last().cloned();
        }
        None
    }

    /// Abort pending replies; later submissions are ignored
    pub fn shutdown(&mut self) {
        if self.is_shut_down {
            return;
        }

        let aborted = self.abort_pending();
        self.is_shut_down = true;
        self.composing = false;
        info!(aborted, "dispatcher shut down");
    }

    pub fn messages(&self) -> &[Message] {
        &self.log
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.log.clone(),
            composing: self.composing,
        }
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    pub fn is_shut_down(&self) -> bool {
        self.is_shut_down
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn pending_replies(&self) -> usize {
        self.pending.len()
    }

    pub fn profile(&self) -> CatalogProfile {
        self.catalog.profile
    }

    pub fn catalog(&self) -> &'static ContentCatalog {
        self.catalog
    }

    pub fn delay_window(&self) -> DelayWindow {
        self.delay
    }

    fn take_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    fn apply_due(&mut self, due: ReplyDue) -> Vec<DispatcherEvent> {
        if self.pending.remove(&due.cycle).is_none() || self.is_shut_down {
            warn!(cycle = due.cycle, "discarding reply for a cycle that is no longer pending");
            return Vec::new();
        }

        let reply = self.compose_reply(&due.request);
        let event = DispatcherEvent::MessageAppended {
            id: reply.id,
            origin: reply.origin,
            content_type: reply.content_type,
        };

        info!(
            cycle = due.cycle,
            content_type = reply.content_type.display_name(),
            "reply appended"
        );
        self.log.push(reply);

        let mut events = vec![event];
        if self.pending.is_empty() {
            self.composing = false;
            events.push(DispatcherEvent::ComposingChanged { composing: false });
        }
        events
    }

    fn compose_reply(&mut self, request: &str) -> Message {
        let kind = classify(request);
        let sequence = self.take_sequence();

        if let Some(payload) = self.catalog.payload_for(kind) {
            return Message::assistant_payload(sequence, payload);
        }

        if kind != ReplyKind::Text {
            debug!(?kind, profile = %self.catalog.profile, "no payload in catalog, falling back to text");
        }

        let text = self
            .catalog
            .text_replies
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(self.catalog.greeting);
        Message::assistant_text(sequence, text)
    }

    fn abort_pending(&mut self) -> usize {
        let count = self.pending.len();
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
        count
    }
}

impl Drop for ResponseDispatcher {
    fn drop(&mut self) {
        let aborted = self.abort_pending();
        if aborted > 0 {
            debug!(aborted, "aborted pending replies on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ContentType, Origin};

    fn dispatcher(profile: CatalogProfile) -> ResponseDispatcher {
        ResponseDispatcher::new(profile, DelayWindow::default(), Some(7))
    }

    #[test]
    fn test_delay_window_rejects_inverted_bounds() {
        assert_eq!(
            DelayWindow::from_millis(10, 5),
            Err(SpendcastError::InvalidDelayWindow { min_ms: 10, max_ms: 5 })
        );
        assert!(DelayWindow::from_millis(5, 5).is_ok());
    }

    #[test]
    fn test_delay_samples_stay_in_window() {
        let window = DelayWindow::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            assert!(window.contains(window.sample(&mut rng)));
        }
    }

    #[test]
    fn test_fixed_window() {
        let window = DelayWindow::fixed(Duration::from_millis(250));
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(window.sample(&mut rng), Duration::from_millis(250));
    }

    #[test]
    fn test_new_dispatcher_starts_with_greeting() {
        let dispatcher = dispatcher(CatalogProfile::ContentAware);
        assert_eq!(dispatcher.len(), 1);
        assert!(!dispatcher.is_composing());

        let greeting = &dispatcher.messages()[0];
        assert_eq!(greeting.origin, Origin::Assistant);
        assert_eq!(greeting.text, crate::catalog::GREETING);
        assert_eq!(greeting.sequence, 0);
    }

    #[test]
    fn test_empty_submission_is_ignored() {
        let mut dispatcher = dispatcher(CatalogProfile::ContentAware);
        assert_eq!(
            dispatcher.submit("   \n\t"),
            Submission::Ignored(IgnoreReason::EmptyInput)
        );
        assert_eq!(dispatcher.len(), 1);
        assert!(!dispatcher.is_composing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_appends_trimmed_user_message() {
        let mut dispatcher = dispatcher(CatalogProfile::ContentAware);
        let submission = dispatcher.submit("  Wie war mein Monat?  ");
        assert!(submission.is_accepted());

        let user = dispatcher.messages().last().unwrap();
        assert_eq!(user.origin, Origin::User);
        assert_eq!(user.text, "Wie war mein Monat?");
        assert_eq!(user.content_type, ContentType::Text);
        assert!(dispatcher.is_composing());
        assert_eq!(dispatcher.pending_replies(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_delay_is_within_window() {
        let mut dispatcher = dispatcher(CatalogProfile::ContentAware);
        match dispatcher.submit("Hallo") {
            Submission::Accepted { delay, .. } => {
                assert!(DelayWindow::default().contains(delay));
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_submission_while_composing_is_ignored() {
        let mut dispatcher = dispatcher(CatalogProfile::ContentAware);
        assert!(dispatcher.submit("Erste Frage").is_accepted());
        assert_eq!(
            dispatcher.submit("Zweite Frage"),
            Submission::Ignored(IgnoreReason::Composing)
        );
        assert_eq!(dispatcher.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_before_delay_is_empty() {
        let mut dispatcher = dispatcher(CatalogProfile::ContentAware);
        dispatcher.submit("Hallo");
        assert!(dispatcher.poll_replies().is_empty());
        assert!(dispatcher.is_composing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_after_delay_appends_reply() {
        let mut dispatcher = ResponseDispatcher::new(
            CatalogProfile::ContentAware,
            DelayWindow::fixed(Duration::from_millis(1500)),
            Some(3),
        );
        dispatcher.submit("Zeig mir die Analyse als Video");

        tokio::time::sleep(Duration::from_millis(1499)).await;
        assert!(dispatcher.poll_replies().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        let events = dispatcher.poll_replies();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            DispatcherEvent::MessageAppended {
                origin: Origin::Assistant,
                content_type: ContentType::Video,
                ..
            }
        ));
        assert_eq!(events[1], DispatcherEvent::ComposingChanged { composing: false });
        assert!(!dispatcher.is_composing());
        assert_eq!(dispatcher.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_reply_without_pending_returns_none() {
        let mut dispatcher = dispatcher(CatalogProfile::ContentAware);
        assert!(dispatcher.next_reply().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_only_profile_ignores_payload_keywords() {
        let mut dispatcher = dispatcher(CatalogProfile::TextOnly);
        dispatcher.submit("Bitte als Podcast");
        let reply = dispatcher.next_reply().await.unwrap();
        assert_eq!(reply.content_type, ContentType::Text);
        assert!(reply.media.is_none());
        assert!(dispatcher.catalog().contains_text_reply(&reply.text));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_aborts_pending_reply() {
        let mut dispatcher = dispatcher(CatalogProfile::ContentAware);
        dispatcher.submit("Hallo");
        dispatcher.shutdown();

        assert!(dispatcher.is_shut_down());
        assert!(!dispatcher.is_composing());
        assert_eq!(dispatcher.pending_replies(), 0);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(dispatcher.poll_replies().is_empty());
        assert_eq!(dispatcher.len(), 2);
        assert_eq!(
            dispatcher.submit("Noch da?"),
            Submission::Ignored(IgnoreReason::ShutDown)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_delay_task() {
        let started = tokio::time::Instant::now();
        let mut dispatcher = dispatcher(CatalogProfile::ContentAware);
        assert!(dispatcher.submit("Video").is_accepted());
        let delay_tasks: Vec<_> = dispatcher
            .pending
            .values()
            .map(JoinHandle::abort_handle)
            .collect();
        assert_eq!(delay_tasks.len(), 1);
        assert!(!delay_tasks[0].is_finished());

        drop(dispatcher);
        for _ in 0..10 {
            if delay_tasks[0].is_finished() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(delay_tasks[0].is_finished());
        // finished by the abort, not by the delay elapsing
        assert!(started.elapsed() < DelayWindow::default().min());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequences_increase() {
        let mut dispatcher = dispatcher(CatalogProfile::ContentAware);
        for text in ["eins", "zwei", "drei"] {
            dispatcher.submit(text);
            dispatcher.next_reply().await.unwrap();
        }

        let sequences: Vec<u64> = dispatcher.messages().iter().map(|m| m.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3, 4, 5, 6]);
    }
}
