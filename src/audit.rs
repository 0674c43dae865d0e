//! Bounded audit log for authorization decisions.
//!
//! Keeps a fixed-size FIFO window of recent decisions so operators can
//! answer "who was denied what, when" without unbounded memory growth. A
//! hostile client hammering a denied route cannot grow the log - oldest
//! records are evicted first and the eviction count is tracked.
//!
//! # Design Principles
//!
//! - **Bounded memory**: fixed capacity regardless of request volume
//! - **FIFO eviction**: oldest records dropped first, recent ones kept
//! - **Per-field caps**: no single record can dominate the buffer
//! - **RwLock-based**: concurrent readers, exclusive writers
//!
//! Records use `Arc<str>` fields so reading the log clones cheaply
//! (refcount bumps, no heap copies).
//!
//! # Example
//!
//! ```rust
//! use rampart_authz::DecisionLog;
//!
//! let log = DecisionLog::new(1_000);
//! log.record_decision("viewer", "/v1/reports", true);
//! log.record_decision("viewer", "/v1/admin", false);
//!
//! let denied = log.filtered(|r| !r.allowed);
//! assert_eq!(denied.len(), 1);
//! assert_eq!(denied[0].route.as_ref(), "/v1/admin");
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::warn;

use crate::error::{CODE_NA, StructuredError};

/// Maximum bytes kept per recorded field. Roles and routes beyond this are
/// truncated at a character boundary.
const MAX_FIELD_BYTES: usize = 128;

/// A single recorded authorization decision.
#[derive(Clone, Debug)]
pub struct AuditRecord {
    /// Unix timestamp (seconds) of the decision.
    pub timestamp: u64,
    /// Subject role the decision was evaluated for.
    pub subject_role: Arc<str>,
    /// Route or operation the decision covered.
    pub route: Arc<str>,
    /// Whether access was granted.
    pub allowed: bool,
    /// Symbolic status code of the error reported for a denial, or the
    /// `"NA"` sentinel when the decision produced no error value.
    pub status_code: Arc<str>,
}

/// Fixed-size ring of records; no growth after construction.
struct Ring {
    slots: Box<[Option<AuditRecord>]>,
    head: usize,
    tail: usize,
    len: usize,
}

impl Ring {
    fn new(capacity: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None)
                .take(capacity)
                .collect::<Box<[Option<AuditRecord>]>>(),
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    fn push(&mut self, record: AuditRecord) -> Option<AuditRecord> {
        let evicted = self.slots[self.tail].replace(record);
        self.tail = (self.tail + 1) % self.slots.len();

        if self.len < self.slots.len() {
            self.len += 1;
        } else {
            self.head = (self.head + 1) % self.slots.len();
        }

        evicted
    }

    fn iter(&self) -> impl DoubleEndedIterator<Item = &AuditRecord> {
        let head = self.head;
        let len = self.len;
        let cap = self.slots.len();

        (0..len).filter_map(move |i| self.slots[(head + i) % cap].as_ref())
    }

    fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }
}

/// Bounded decision log with FIFO eviction.
///
/// Cloning shares the underlying buffer, so one log can be handed to
/// every request handler.
pub struct DecisionLog {
    ring: Arc<RwLock<Ring>>,
    capacity: usize,
    evictions: Arc<AtomicU64>,
}

impl DecisionLog {
    /// Create a log holding at most `capacity` records (minimum one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: Arc::new(RwLock::new(Ring::new(capacity))),
            capacity,
            evictions: Arc::new(AtomicU64::new(0)),
        }
    }

    #[inline]
    fn read_ring(&self) -> RwLockReadGuard<'_, Ring> {
        match self.ring.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[inline]
    fn write_ring(&self) -> RwLockWriteGuard<'_, Ring> {
        match self.ring.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn push(&self, record: AuditRecord) {
        let mut ring = self.write_ring();
        if ring.push(record).is_some() {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a plain allow/deny decision.
    pub fn record_decision(&self, subject_role: &str, route: &str, allowed: bool) {
        self.push(AuditRecord {
            timestamp: now_unix(),
            subject_role: bounded(subject_role),
            route: bounded(route),
            allowed,
            status_code: Arc::from(CODE_NA),
        });
    }

    /// Record a denial together with the error that reports it.
    ///
    /// This is the composition point of the two halves of this crate: the
    /// hierarchy produced `false`, the caller built a structured error
    /// (usually from the registry), and the audit trail keeps the
    /// decision and its symbolic classification side by side.
    pub fn record_denial(&self, subject_role: &str, route: &str, err: &StructuredError) {
        warn!(
            role = subject_role,
            route,
            status_code = err.status_code(),
            "authorization denied"
        );
        self.push(AuditRecord {
            timestamp: now_unix(),
            subject_role: bounded(subject_role),
            route: bounded(route),
            allowed: false,
            status_code: bounded(err.status_code()),
        });
    }

    /// Get the `count` most recent records, newest first.
    pub fn recent(&self, count: usize) -> Vec<AuditRecord> {
        let ring = self.read_ring();
        ring.iter().rev().take(count).cloned().collect()
    }

    /// Get every retained record, newest first.
    pub fn all(&self) -> Vec<AuditRecord> {
        let ring = self.read_ring();
        ring.iter().rev().cloned().collect()
    }

    /// Get records matching a predicate, oldest first.
    pub fn filtered<F>(&self, predicate: F) -> Vec<AuditRecord>
    where
        F: Fn(&AuditRecord) -> bool,
    {
        let ring = self.read_ring();
        ring.iter().filter(|r| predicate(r)).cloned().collect()
    }

    /// Current number of retained records.
    pub fn len(&self) -> usize {
        self.read_ring().len
    }

    /// Check whether the log holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of retained records.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of records evicted since creation. A high rate indicates
    /// sustained denial volume worth investigating.
    #[inline]
    pub fn eviction_count(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Drop all retained records.
    pub fn clear(&self) {
        self.write_ring().clear();
    }
}

impl Clone for DecisionLog {
    fn clone(&self) -> Self {
        Self {
            ring: Arc::clone(&self.ring),
            capacity: self.capacity,
            evictions: Arc::clone(&self.evictions),
        }
    }
}

#[inline]
fn now_unix() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Cap a field to `MAX_FIELD_BYTES`, truncating at a character boundary.
fn bounded(s: &str) -> Arc<str> {
    if s.len() <= MAX_FIELD_BYTES {
        return Arc::from(s);
    }
    let mut idx = MAX_FIELD_BYTES;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    Arc::from(&s[..idx])
}
