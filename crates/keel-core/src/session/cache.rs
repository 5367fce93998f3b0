//! Bounded, TTL-expiring conversation cache

use super::types::{
    ChatMessage, ConversationEntry, Role, SessionCacheConfig, SessionCacheStats, SweepReport,
};
use crate::tasks::Maintenance;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct CacheState {
    conversations: HashMap<String, ConversationEntry>,
    next_seq: u64,
}

impl CacheState {
    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Remove the least recently active conversations until `cap` remain
    fn evict_overflow(&mut self, cap: usize) -> usize {
        let overflow = self.conversations.len().saturating_sub(cap);
        if overflow == 0 {
            return 0;
        }

        let mut by_activity: Vec<(Instant, u64, String)> = self
            .conversations
            .iter()
            .map(|(actor, entry)| (entry.last_activity, entry.touch_seq, actor.clone()))
            .collect();
        by_activity.sort_unstable();

        for (_, _, actor) in by_activity.into_iter().take(overflow) {
            self.conversations.remove(&actor);
        }
        overflow
    }
}

/// Per-actor conversation history with bounded context, idle expiry and a
/// global capacity cap.
///
/// Reading a history counts as activity and extends the session. Use
/// [`session_count`](Self::session_count) or [`stats`](Self::stats) for
/// side-effect-free inspection.
#[derive(Debug)]
pub struct SessionCache {
    config: SessionCacheConfig,
    state: Mutex<CacheState>,
}

impl SessionCache {
    /// Create a new session cache
    pub fn new(config: SessionCacheConfig) -> Self {
        Self {
            config,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn config(&self) -> &SessionCacheConfig {
        &self.config
    }

    /// Append a message to an actor's conversation
    pub fn add_message(&self, actor_id: &str, role: Role, content: impl Into<String>) {
        self.push(actor_id, ChatMessage::new(role, content));
    }

    /// Append a prebuilt message to an actor's conversation
    pub fn push(&self, actor_id: &str, message: ChatMessage) {
        let now = Instant::now();
        let mut state = self.state.lock();
        let seq = state.next_seq();
        let timeout = self.config.conversation_timeout;

        let entry = state
            .conversations
            .entry(actor_id.to_string())
            .and_modify(|entry| {
                if entry.is_expired(now, timeout) {
                    debug!(actor_id, "conversation expired, starting fresh");
                    *entry = ConversationEntry::new(now, seq);
                }
            })
            .or_insert_with(|| ConversationEntry::new(now, seq));

        entry.history.push(message);
        entry.message_count += 1;
        entry.touch(now, seq);
        entry.trim(self.config.max_context_messages);

        let evicted = state.evict_overflow(self.config.max_conversations);
        if evicted > 0 {
            debug!(
                evicted,
                max_conversations = self.config.max_conversations,
                "evicted least recently active conversations"
            );
        }
    }

    /// Copy of an actor's history. Counts as activity.
    pub fn get_history(&self, actor_id: &str) -> Vec<ChatMessage> {
        let now = Instant::now();
        let mut state = self.state.lock();
        let seq = state.next_seq();

        match state.conversations.get_mut(actor_id) {
            None => return Vec::new(),
            Some(entry) if !entry.is_expired(now, self.config.conversation_timeout) => {
                entry.touch(now, seq);
                return entry.history.clone();
            }
            Some(_) => {}
        }

        state.conversations.remove(actor_id);
        debug!(actor_id, "dropped expired conversation on read");
        Vec::new()
    }

    /// Whether the actor has a live conversation. Expired ones are deleted.
    pub fn has_active_session(&self, actor_id: &str) -> bool {
        let now = Instant::now();
        let mut state = self.state.lock();

        let expired = match state.conversations.get(actor_id) {
            None => return false,
            Some(entry) => entry.is_expired(now, self.config.conversation_timeout),
        };

        if expired {
            state.conversations.remove(actor_id);
            debug!(actor_id, "dropped expired conversation");
            return false;
        }
        true
    }

    /// Lifetime message count for an actor's live conversation
    pub fn message_count(&self, actor_id: &str) -> Option<u64> {
        self.state
            .lock()
            .conversations
            .get(actor_id)
            .map(|entry| entry.message_count)
    }

    /// Delete one conversation; returns whether it existed
    pub fn clear(&self, actor_id: &str) -> bool {
        self.state.lock().conversations.remove(actor_id).is_some()
    }

    /// Delete every conversation
    pub fn clear_all(&self) {
        let mut state = self.state.lock();
        let count = state.conversations.len();
        state.conversations.clear();
        info!(count, "cleared all conversations");
    }

    /// Number of tracked conversations, expired or not. Side-effect free.
    pub fn session_count(&self) -> usize {
        self.state.lock().conversations.len()
    }

    /// Aggregate counts. Side-effect free.
    pub fn stats(&self) -> SessionCacheStats {
        let now = Instant::now();
        let state = self.state.lock();
        let total_sessions = state.conversations.len();

        let mut stats = SessionCacheStats {
            total_sessions,
            ..Default::default()
        };
        let mut oldest: Option<Duration> = None;
        let mut newest: Option<Duration> = None;

        for entry in state.conversations.values() {
            stats.total_messages += entry.history.len();
            stats.lifetime_messages += entry.message_count;
            let age = now.saturating_duration_since(entry.created_at);
            oldest = Some(oldest.map_or(age, |current| current.max(age)));
            newest = Some(newest.map_or(age, |current| current.min(age)));
        }

        if total_sessions > 0 {
            stats.average_messages_per_session = stats.total_messages as f64 / total_sessions as f64;
        }
        stats.oldest_session_age = oldest;
        stats.newest_session_age = newest;
        stats
    }

    /// Drop expired conversations, then evict down to capacity
    pub fn cleanup(&self) -> SweepReport {
        let now = Instant::now();
        let timeout = self.config.conversation_timeout;
        let mut state = self.state.lock();

        let before = state.conversations.len();
        state
            .conversations
            .retain(|_, entry| !entry.is_expired(now, timeout));
        let expired = before - state.conversations.len();
        let evicted = state.evict_overflow(self.config.max_conversations);

        let report = SweepReport { expired, evicted };
        if report.total() > 0 {
            info!(
                expired,
                evicted,
                remaining = state.conversations.len(),
                "session cache sweep"
            );
        }
        report
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(SessionCacheConfig::default())
    }
}

#[async_trait]
impl Maintenance for SessionCache {
    fn task_name(&self) -> &'static str {
        "session-cache-sweep"
    }

    fn maintenance_interval(&self) -> Duration {
        self.config.cleanup_interval
    }

    async fn run_maintenance(&self) {
        self.cleanup();
    }
}
