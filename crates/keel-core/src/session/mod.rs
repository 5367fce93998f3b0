//! Conversation session cache
//!
//! Keeps a short, ordered message history per actor for conversational flows.
//!
//! ## Bounds
//!
//! - **Context**: at most `max_context_messages` per actor; the oldest messages
//!   are dropped first, but a system prompt stays pinned at the front
//! - **Idle expiry**: a conversation untouched for `conversation_timeout` is
//!   removed on the next read/check or by the periodic sweep
//! - **Capacity**: beyond `max_conversations` actors, the least recently active
//!   conversations are evicted

mod cache;
mod types;


pub use cache::SessionCache;
pub use types::{
    ChatMessage, DEFAULT_CLEANUP_INTERVAL, DEFAULT_CONVERSATION_TIMEOUT,
    DEFAULT_MAX_CONTEXT_MESSAGES, DEFAULT_MAX_CONVERSATIONS, Role, SessionCacheConfig,
    SessionCacheStats, SweepReport,
};
