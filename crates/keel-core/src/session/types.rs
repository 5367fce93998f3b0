//! Types for the conversation session cache

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Default number of messages kept per conversation
pub const DEFAULT_MAX_CONTEXT_MESSAGES: usize = 10;
/// Default number of concurrently tracked conversations
pub const DEFAULT_MAX_CONVERSATIONS: usize = 1000;
/// Default idle time after which a conversation expires (30 minutes)
pub const DEFAULT_CONVERSATION_TIMEOUT: Duration = Duration::from_secs(30 * 60);
/// Default sweep period (5 minutes)
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message of a conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Configuration for the session cache
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionCacheConfig {
    /// Maximum messages retained per conversation (system prompt included)
    pub max_context_messages: usize,
    /// Maximum number of conversations held at once
    pub max_conversations: usize,
    /// Idle time after which a conversation expires
    #[serde(with = "humantime_serde")]
    pub conversation_timeout: Duration,
    /// Period of the background sweep
    #[serde(with = "humantime_serde")]
    pub cleanup_interval: Duration,
}

impl Default for SessionCacheConfig {
    fn default() -> Self {
        Self {
            max_context_messages: DEFAULT_MAX_CONTEXT_MESSAGES,
            max_conversations: DEFAULT_MAX_CONVERSATIONS,
            conversation_timeout: DEFAULT_CONVERSATION_TIMEOUT,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl SessionCacheConfig {
    /// Set max context messages
    pub fn with_max_context_messages(mut self, max: usize) -> Self {
        self.max_context_messages = max;
        self
    }

    /// Set max conversations
    pub fn with_max_conversations(mut self, max: usize) -> Self {
        self.max_conversations = max;
        self
    }

    /// Set the idle timeout
    pub fn with_conversation_timeout(mut self, timeout: Duration) -> Self {
        self.conversation_timeout = timeout;
        self
    }
}

/// A single actor's conversation state
#[derive(Debug, Clone)]
pub(crate) struct ConversationEntry {
    pub history: Vec<ChatMessage>,
    pub created_at: Instant,
    pub last_activity: Instant,
    /// Lifetime messages added, independent of trimming
    pub message_count: u64,
    /// Global touch order, breaks ties between equal `last_activity` values
    pub touch_seq: u64,
}

impl ConversationEntry {
    pub fn new(now: Instant, touch_seq: u64) -> Self {
        Self {
            history: Vec::new(),
            created_at: now,
            last_activity: now,
            message_count: 0,
            touch_seq,
        }
    }

    pub fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_activity) >= timeout
    }

    pub fn touch(&mut self, now: Instant, touch_seq: u64) {
        self.last_activity = now;
        self.touch_seq = touch_seq;
    }

    /// Drop the oldest messages until at most `max` remain. A system message
    /// at the front stays pinned there; system messages elsewhere age out
    /// like any other.
    pub fn trim(&mut self, max: usize) {
        if self.history.len() <= max {
            return;
        }

        let pinned = max > 0
            && self
                .history
                .first()
                .is_some_and(|message| message.role == Role::System);
        let start = usize::from(pinned);
        let overflow = self.history.len() - max;
        self.history.drain(start..start + overflow);
    }
}

/// Aggregate view of the cache, used by the health monitor
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionCacheStats {
    pub total_sessions: usize,
    /// Messages currently retained across all histories
    pub total_messages: usize,
    /// Messages ever added to live sessions
    pub lifetime_messages: u64,
    pub average_messages_per_session: f64,
    #[serde(with = "humantime_serde")]
    pub oldest_session_age: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub newest_session_age: Option<Duration>,
}

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired: usize,
    pub evicted: usize,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.expired + self.evicted
    }
}
