use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::types::{ParsedQuery, TravelType};

/// Idle time after which a conversation is discarded
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// How often the background sweep looks for expired conversations
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

const MAX_QUERY_HISTORY: usize = 10;

/// A follow-up containing any of these is treated as refining the
/// previous query rather than starting over
const REFINEMENT_KEYWORDS: &[&str] = &[
    "cheaper",
    "expensive",
    "longer",
    "shorter",
    "under",
    "over",
    "more",
    "less",
    "different",
    "another",
    "alternative",
    "sasta",
    "mahanga",
    "lambi",
    "choti",
    "aur",
];

/// Preferences accumulated across a conversation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preferences {
    /// Last non-zero budget seen
    pub budget: Option<u32>,
    /// Distinct destinations mentioned, in first-mention order
    pub destinations: Vec<String>,
    /// Last travel type seen
    pub travel_type: Option<TravelType>,
}

/// Per-conversation state.
///
/// Held in-process only: a restart clears every conversation. Accepted
/// limitation for this workload.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    pub conversation_id: String,
    /// Raw query history, oldest first, capped at the last 10
    pub queries: Vec<String>,
    pub last_parsed: Option<ParsedQuery>,
    pub preferences: Preferences,
    last_activity: Instant,
}

impl ConversationContext {
    fn new(conversation_id: String, now: Instant) -> Self {
        Self {
            conversation_id,
            queries: Vec::new(),
            last_parsed: None,
            preferences: Preferences::default(),
            last_activity: now,
        }
    }

    fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        now.duration_since(self.last_activity) > timeout
    }
}

/// True when `raw` refines the conversation's previous query.
///
/// Always false for a conversation with no history.
pub fn is_refinement(raw: &str, context: &ConversationContext) -> bool {
    if context.queries.is_empty() {
        return false;
    }

    let lower = raw.to_lowercase();
    REFINEMENT_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Fill fields missing from `parsed` out of the conversation context.
///
/// Fill-only: a field already present in the new parse is never
/// overwritten. Destination and duration come from the previous parse,
/// budget and travel type from the accumulated preferences.
pub fn merge_with_context(context: &ConversationContext, parsed: &ParsedQuery) -> ParsedQuery {
    let Some(last) = &context.last_parsed else {
        return parsed.clone();
    };

    let mut merged = parsed.clone();

    if merged.destination.is_none() {
        merged.destination = last.destination.clone();
    }
    if merged.budget.is_none() {
        merged.budget = context.preferences.budget;
    }
    if merged.duration.is_none() {
        merged.duration = last.duration;
    }
    if merged.travel_type.is_none() {
        merged.travel_type = context.preferences.travel_type;
    }

    merged
}

/// Keyed in-process store for conversation contexts.
///
/// Cheap to clone (shared map underneath); expiry is a hard reset on
/// access plus a periodic background sweep started with
/// [`start_sweep`](SessionStore::start_sweep). Concurrent updates to the
/// same conversation are last-writer-wins, which is fine for chat
/// traffic that is single-user-serial in practice.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, ConversationContext>>>,
    sweep: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the context for a conversation, creating a fresh one when
    /// none exists or the existing one sat idle past the timeout.
    pub fn get_or_create(&self, conversation_id: &str) -> ConversationContext {
        self.get_or_create_at(conversation_id, Instant::now())
    }

    fn get_or_create_at(&self, conversation_id: &str, now: Instant) -> ConversationContext {
        let mut map = self.inner.lock().expect("session map poisoned");

        match map.get(conversation_id) {
            Some(ctx) if !ctx.is_expired(now, SESSION_TIMEOUT) => ctx.clone(),
            Some(_) => {
                info!(target: "raahi::session", conversation_id, "session expired, resetting");
                let fresh = ConversationContext::new(conversation_id.to_string(), now);
                map.insert(conversation_id.to_string(), fresh.clone());
                fresh
            }
            None => {
                debug!(target: "raahi::session", conversation_id, "created new conversation");
                let fresh = ConversationContext::new(conversation_id.to_string(), now);
                map.insert(conversation_id.to_string(), fresh.clone());
                fresh
            }
        }
    }

    /// Record a processed message: append to history (capped), remember
    /// the parse, fold it into the accumulated preferences, and refresh
    /// the activity timestamp. Called on every message, refinement or not.
    pub fn update(&self, conversation_id: &str, raw: &str, parsed: &ParsedQuery) -> ConversationContext {
        self.update_at(conversation_id, raw, parsed, Instant::now())
    }

    fn update_at(
        &self,
        conversation_id: &str,
        raw: &str,
        parsed: &ParsedQuery,
        now: Instant,
    ) -> ConversationContext {
        // Re-resolve under the same expiry rules as a read
        let mut ctx = self.get_or_create_at(conversation_id, now);

        ctx.queries.push(raw.to_string());
        if ctx.queries.len() > MAX_QUERY_HISTORY {
            let excess = ctx.queries.len() - MAX_QUERY_HISTORY;
            ctx.queries.drain(..excess);
        }

        if let Some(budget) = parsed.budget.filter(|b| *b > 0) {
            ctx.preferences.budget = Some(budget);
        }
        if let Some(destination) = &parsed.destination {
            if !ctx.preferences.destinations.contains(destination) {
                ctx.preferences.destinations.push(destination.clone());
            }
        }
        if parsed.travel_type.is_some() {
            ctx.preferences.travel_type = parsed.travel_type;
        }

        ctx.last_parsed = Some(parsed.clone());
        ctx.last_activity = now;

        debug!(
            target: "raahi::session",
            conversation_id,
            history = ctx.queries.len(),
            "context updated"
        );

        let mut map = self.inner.lock().expect("session map poisoned");
        map.insert(conversation_id.to_string(), ctx.clone());
        ctx
    }

    /// Read-only peek; does not reset expiry or refresh activity
    pub fn get(&self, conversation_id: &str) -> Option<ConversationContext> {
        let map = self.inner.lock().expect("session map poisoned");
        map.get(conversation_id).cloned()
    }

    /// Delete every context idle past the timeout, returning how many
    /// were removed
    pub fn sweep_now(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        sweep_map(&self.inner, now)
    }

    /// Start the periodic expiry sweep. Idempotent; the task never
    /// blocks request handling and exits on its own once the store is
    /// gone. Must be called from within a tokio runtime.
    pub fn start_sweep(&self) {
        let mut slot = self.sweep.lock().expect("sweep slot poisoned");
        if slot.is_some() {
            return;
        }

        // The task holds only a weak handle so it cannot keep the map alive
        let inner = Arc::downgrade(&self.inner);
        *slot = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            interval.tick().await; // first tick completes immediately
            loop {
                interval.tick().await;
                let Some(map) = inner.upgrade() else { break };
                sweep_map(&map, Instant::now());
            }
        }));
    }

    /// Stop the periodic sweep if it is running
    pub fn stop_sweep(&self) {
        let mut slot = self.sweep.lock().expect("sweep slot poisoned");
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("session map poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn sweep_map(inner: &Mutex<HashMap<String, ConversationContext>>, now: Instant) -> usize {
    let mut map = inner.lock().expect("session map poisoned");
    let before = map.len();
    map.retain(|_, ctx| !ctx.is_expired(now, SESSION_TIMEOUT));
    let cleaned = before - map.len();

    if cleaned > 0 {
        info!(target: "raahi::session", cleaned, "swept expired sessions");
    }
    cleaned
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        // Only the last clone tears the sweep task down
        if Arc::strong_count(&self.sweep) == 1 {
            self.stop_sweep();
        }
    }
}
