//! Chat sessions for the travel assistant
//!
//! A session is an append-only transcript. Each user message schedules its
//! own assistant reply after a randomized delay; replies to overlapping
//! messages land independently of each other. Sessions left idle longer than
//! the configured TTL are dropped.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::RngExt;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::ChatConfig;
use crate::models::ChatMessage;
use crate::recommend::{Reply, Responder};
use crate::{Result, WertigoError};

const WELCOME_GREETING: &str = "Hello there! 👋 I'm your WerTigo travel assistant. How can I help you plan your Philippines adventure today?";
const WELCOME_CAPABILITIES: &str = "I can recommend destinations, suggest itineraries, or provide information about specific places. What would you like to know?";

/// Canned prompts offered under the chat input
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Suggestion {
    pub label: &'static str,
    pub prompt: &'static str,
}

pub const SUGGESTIONS: [Suggestion; 3] = [
    Suggestion {
        label: "Best beaches",
        prompt: "What are the best beaches in the Philippines?",
    },
    Suggestion {
        label: "Must-try food",
        prompt: "What Filipino food should I try?",
    },
    Suggestion {
        label: "When to visit",
        prompt: "Best time to visit Philippines?",
    },
];

/// Messages every new transcript starts with
#[must_use]
pub fn welcome_messages() -> Vec<ChatMessage> {
    vec![
        ChatMessage::assistant(WELCOME_GREETING, Vec::new()).with_id("welcome-1"),
        ChatMessage::assistant(WELCOME_CAPABILITIES, Vec::new()).with_id("welcome-2"),
    ]
}

/// Range the simulated reply latency is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyDelay {
    min: Duration,
    max: Duration,
}

impl ReplyDelay {
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Replies are appended without waiting
    #[must_use]
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let min = u64::try_from(self.min.as_millis()).unwrap_or(u64::MAX);
        let max = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

impl Default for ReplyDelay {
    fn default() -> Self {
        Self::from(&ChatConfig::default())
    }
}

impl From<&ChatConfig> for ReplyDelay {
    fn from(config: &ChatConfig) -> Self {
        Self::new(
            Duration::from_millis(config.min_reply_delay_ms),
            Duration::from_millis(config.max_reply_delay_ms),
        )
    }
}

/// One visitor's conversation
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    messages: Vec<ChatMessage>,
    pending_replies: usize,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: welcome_messages(),
            pending_replies: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn pending_replies(&self) -> usize {
        self.pending_replies
    }

    /// Append a visitor message and expect one reply for it.
    ///
    /// Blank input is ignored and yields `None`.
    pub fn push_user(&mut self, text: &str) -> Option<ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }
        let message = ChatMessage::user(text);
        self.messages.push(message.clone());
        self.pending_replies += 1;
        Some(message)
    }

    /// Append the assistant's answer to one earlier visitor message
    pub fn push_reply(&mut self, reply: Reply) -> ChatMessage {
        let message = ChatMessage::assistant(reply.text, reply.recommendations);
        self.messages.push(message.clone());
        self.pending_replies = self.pending_replies.saturating_sub(1);
        message
    }

    #[must_use]
    pub fn transcript(&self) -> Transcript {
        Transcript {
            id: self.id,
            messages: self.messages.clone(),
            typing: self.pending_replies > 0,
            pending_replies: self.pending_replies,
        }
    }
}

/// Serializable view of a session
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub id: Uuid,
    pub messages: Vec<ChatMessage>,
    /// Whether the assistant is still composing a reply
    pub typing: bool,
    pub pending_replies: usize,
}

type SessionHandle = Arc<Mutex<ChatSession>>;

/// Idle time after which a session is discarded
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

struct SessionEntry {
    handle: SessionHandle,
    last_active: Instant,
}

impl SessionEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.last_active) > ttl
    }
}

/// In-memory store of chat sessions sharing one catalog and responder
#[derive(Clone)]
pub struct ChatService {
    catalog: Arc<Catalog>,
    responder: Arc<Responder>,
    delay: ReplyDelay,
    ttl: Duration,
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
}

impl ChatService {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, responder: Arc<Responder>, delay: ReplyDelay) -> Self {
        Self {
            catalog,
            responder,
            delay,
            ttl: DEFAULT_SESSION_TTL,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        self.ttl
    }

    /// Answer an utterance right away, outside any session
    #[must_use]
    pub fn respond(&self, utterance: &str) -> Reply {
        self.responder.respond(&self.catalog, utterance)
    }

    /// Start a session seeded with the welcome messages.
    ///
    /// Expired sessions are swept first.
    pub async fn create_session(&self) -> Transcript {
        let session = ChatSession::new();
        let transcript = session.transcript();

        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        sessions.retain(|_, entry| !entry.is_expired(now, self.ttl));
        sessions.insert(
            session.id(),
            SessionEntry {
                handle: Arc::new(Mutex::new(session)),
                last_active: now,
            },
        );
        drop(sessions);

        info!("Started chat session {}", transcript.id);
        transcript
    }

    /// Look up a live session and mark it active
    async fn session(&self, id: Uuid) -> Result<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();

        let expired = match sessions.get_mut(&id) {
            Some(entry) if !entry.is_expired(now, self.ttl) => {
                entry.last_active = now;
                return Ok(Arc::clone(&entry.handle));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            sessions.remove(&id);
            debug!("Chat session {} expired", id);
        }
        Err(WertigoError::session_not_found(id.to_string()))
    }

    pub async fn transcript(&self, id: Uuid) -> Result<Transcript> {
        let session = self.session(id).await?;
        let session = session.lock().await;
        Ok(session.transcript())
    }

    /// Append a visitor message and schedule the deferred reply.
    ///
    /// Returns the stored visitor message.
    #[instrument(skip(self, text))]
    pub async fn send(&self, id: Uuid, text: &str) -> Result<ChatMessage> {
        let session = self.session(id).await?;
        let message = session
            .lock()
            .await
            .push_user(text)
            .ok_or_else(|| WertigoError::validation("Message cannot be empty"))?;

        let delay = self.delay.sample();
        let catalog = Arc::clone(&self.catalog);
        let responder = Arc::clone(&self.responder);
        let utterance = message.text.clone();
        debug!("Reply scheduled in {}ms", delay.as_millis());

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let reply = responder.respond(&catalog, &utterance);
            let rule = reply.rule;
            let delivered = session.lock().await.push_reply(reply);
            debug!("Delivered reply {} from rule '{}'", delivered.id, rule);
        });

        Ok(message)
    }

    /// Drop every session idle for longer than the TTL; returns how many
    pub async fn sweep_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(now, self.ttl));
        before - sessions.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Background task sweeping expired sessions once per TTL
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let service = self.clone();
        let period = self.ttl.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let removed = service.sweep_expired().await;
                if removed > 0 {
                    debug!(
                        "Dropped {} idle chat sessions, {} remain",
                        removed,
                        service.session_count().await
                    );
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sender;

    fn service(delay: ReplyDelay) -> ChatService {
        ChatService::new(
            Arc::new(Catalog::embedded().unwrap()),
            Arc::new(Responder::default()),
            delay,
        )
    }

    #[test]
    fn test_new_session_has_welcome_messages() {
        let session = ChatSession::new();
        assert_eq!(session.messages().len(), 2);
        assert!(session
            .messages()
            .iter()
            .all(|m| m.sender == Sender::Assistant));
        assert_eq!(session.messages()[0].id, "welcome-1");
        assert_eq!(session.pending_replies(), 0);
    }

    #[test]
    fn test_blank_messages_are_ignored() {
        let mut session = ChatSession::new();
        assert!(session.push_user("   ").is_none());
        assert!(session.push_user("").is_none());
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.pending_replies(), 0);
    }

    #[test]
    fn test_transcript_is_append_only() {
        let mut session = ChatSession::new();
        let first = session.push_user("hello").unwrap();
        assert!(session.transcript().typing);

        let reply = Responder::default().respond(&Catalog::embedded().unwrap(), "hello");
        session.push_reply(reply);

        let transcript = session.transcript();
        assert!(!transcript.typing);
        assert_eq!(transcript.messages.len(), 4);
        assert_eq!(transcript.messages[2], first);
        assert_eq!(transcript.messages[3].sender, Sender::Assistant);
        assert!(!transcript.messages[3].recommendations.is_empty());
    }

    #[test]
    fn test_reply_delay_sampling_stays_in_range() {
        let delay = ReplyDelay::new(Duration::from_millis(1000), Duration::from_millis(2000));
        for _ in 0..100 {
            let sample = delay.sample();
            assert!(sample >= Duration::from_millis(1000));
            assert!(sample <= Duration::from_millis(2000));
        }
        assert_eq!(ReplyDelay::immediate().sample(), Duration::ZERO);
    }

    #[test]
    fn test_reply_delay_orders_bounds() {
        let delay = ReplyDelay::new(Duration::from_millis(50), Duration::from_millis(10));
        let sample = delay.sample();
        assert!(sample >= Duration::from_millis(10) && sample <= Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_arrives_after_delay() {
        let chat = service(ReplyDelay::default());
        let session = chat.create_session().await;

        chat.send(session.id, "best beaches").await.unwrap();

        let pending = chat.transcript(session.id).await.unwrap();
        assert!(pending.typing);
        assert_eq!(pending.messages.len(), 3);

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(chat.transcript(session.id).await.unwrap().messages.len(), 3);

        tokio::time::sleep(Duration::from_millis(1002)).await;
        tokio::task::yield_now().await;

        let done = chat.transcript(session.id).await.unwrap();
        assert!(!done.typing);
        assert_eq!(done.messages.len(), 4);
        let reply = &done.messages[3];
        assert_eq!(reply.sender, Sender::Assistant);
        assert!(reply.text.contains("beaches"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_messages_each_get_a_reply() {
        let chat = service(ReplyDelay::default());
        let session = chat.create_session().await;

        chat.send(session.id, "food").await.unwrap();
        chat.send(session.id, "Tell me about Vigan").await.unwrap();
        assert_eq!(chat.transcript(session.id).await.unwrap().pending_replies, 2);

        tokio::time::sleep(Duration::from_millis(2100)).await;
        tokio::task::yield_now().await;

        let done = chat.transcript(session.id).await.unwrap();
        assert_eq!(done.pending_replies, 0);
        assert_eq!(done.messages.len(), 6);
        let replies = done
            .messages
            .iter()
            .skip(2)
            .filter(|m| m.sender == Sender::Assistant)
            .count();
        assert_eq!(replies, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_expires() {
        let chat = service(ReplyDelay::immediate()).with_session_ttl(Duration::from_secs(60));
        let session = chat.create_session().await;

        tokio::time::sleep(Duration::from_secs(61)).await;

        let err = chat.transcript(session.id).await.unwrap_err();
        assert!(matches!(err, WertigoError::SessionNotFound { .. }));
        assert_eq!(chat.session_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_keeps_session_alive() {
        let chat = service(ReplyDelay::immediate()).with_session_ttl(Duration::from_secs(60));
        let session = chat.create_session().await;

        for _ in 0..3 {
            tokio::time::sleep(Duration::from_secs(40)).await;
            assert!(chat.transcript(session.id).await.is_ok());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_bounds_session_count() {
        let chat = service(ReplyDelay::immediate()).with_session_ttl(Duration::from_secs(60));
        for _ in 0..1000 {
            chat.create_session().await;
        }
        assert_eq!(chat.session_count().await, 1000);

        tokio::time::sleep(Duration::from_secs(61)).await;
        let fresh = chat.create_session().await;
        assert_eq!(chat.session_count().await, 1);
        assert!(chat.transcript(fresh.id).await.is_ok());

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(chat.sweep_expired().await, 1);
        assert_eq!(chat.session_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_drops_idle_sessions() {
        let chat = service(ReplyDelay::immediate()).with_session_ttl(Duration::from_secs(60));
        for _ in 0..3 {
            chat.create_session().await;
        }
        let sweeper = chat.spawn_sweeper();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(chat.session_count().await, 3);

        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(chat.session_count().await, 0);
        sweeper.abort();
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let chat = service(ReplyDelay::immediate());
        let err = chat.send(Uuid::new_v4(), "hi").await.unwrap_err();
        assert!(matches!(err, WertigoError::SessionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let chat = service(ReplyDelay::immediate());
        let session = chat.create_session().await;
        let err = chat.send(session.id, " ").await.unwrap_err();
        assert!(matches!(err, WertigoError::Validation { .. }));
        assert_eq!(chat.session_count().await, 1);
    }
}
