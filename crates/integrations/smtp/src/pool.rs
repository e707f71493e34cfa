//! Bounded pool of SMTP sessions.
//!
//! The pool caps the number of open sessions with a semaphore and keeps idle
//! sessions in a stack for reuse. Every session is one connection, opened
//! lazily by a [`SessionManager`] the first time a permit has no idle session
//! to pair with. A session is rotated out once it has carried `max_messages`
//! messages, a session whose send failed is discarded, and an idle session is
//! checked with the manager before it is handed out again.

use std::future::Future;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::debug;

use crate::error::SmtpError;

/// Opens and health-checks the sessions a [`Pool`] hands out.
pub trait SessionManager: Send + Sync {
    type Session: Send;

    /// Open a new, ready-to-use session.
    fn connect(&self) -> impl Future<Output = Result<Self::Session, SmtpError>> + Send;

    /// Whether an idle session can still carry a message.
    fn is_usable(&self, session: &mut Self::Session) -> impl Future<Output = bool> + Send;
}

/// Pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    /// Maximum sessions open at once.
    pub max_connections: usize,
    /// Messages per session before rotation.
    pub max_messages: u32,
    /// Idle time after which a session is closed instead of reused.
    pub idle_timeout: Duration,
}

/// Point-in-time counters, mostly for tests and debug logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Sessions waiting in the idle stack.
    pub idle: usize,
    /// Sessions opened since the pool was built.
    pub created: u64,
    /// Permits not currently checked out.
    pub available: usize,
}

struct Slot<S> {
    id: u64,
    session: S,
    messages_sent: u32,
    last_used: Instant,
}

/// A bounded pool of sessions opened by `M`.
pub struct Pool<M: SessionManager> {
    manager: M,
    limits: PoolLimits,
    permits: Semaphore,
    idle: Mutex<Vec<Slot<M::Session>>>,
    created: AtomicU64,
}

impl<M: SessionManager> std::fmt::Debug for Pool<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("limits", &self.limits)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl<M: SessionManager> Pool<M> {
    /// Create an empty pool. No session is opened until the first
    /// [`acquire`](Self::acquire).
    pub fn new(limits: PoolLimits, manager: M) -> Self {
        let limits = PoolLimits {
            max_connections: limits.max_connections.max(1),
            max_messages: limits.max_messages.max(1),
            ..limits
        };
        Self {
            manager,
            permits: Semaphore::new(limits.max_connections),
            limits,
            idle: Mutex::new(Vec::new()),
            created: AtomicU64::new(0),
        }
    }

    pub fn limits(&self) -> PoolLimits {
        self.limits
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            idle: lock(&self.idle).len(),
            created: self.created.load(Ordering::Relaxed),
            available: self.permits.available_permits(),
        }
    }

    /// Check out a session, waiting at most `wait` while all of them are in
    /// use.
    ///
    /// Reuses the most recently returned idle session when it is still fresh
    /// and usable, and opens a new one otherwise. If opening fails the permit
    /// is released again.
    pub async fn acquire(&self, wait: Duration) -> Result<Pooled<'_, M>, SmtpError> {
        self.checkout(wait, true).await
    }

    /// Like [`acquire`](Self::acquire) but always opens a new session,
    /// closing an idle one first so the connection cap still holds.
    pub async fn acquire_fresh(&self, wait: Duration) -> Result<Pooled<'_, M>, SmtpError> {
        self.checkout(wait, false).await
    }

    async fn checkout(&self, wait: Duration, reuse: bool) -> Result<Pooled<'_, M>, SmtpError> {
        let permit = match tokio::time::timeout(wait, self.permits.acquire()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(SmtpError::PoolClosed),
            Err(_) => {
                return Err(SmtpError::Timeout {
                    stage: "pool",
                    after: wait,
                });
            }
        };

        let candidate = lock(&self.idle).pop();
        if let Some(mut slot) = candidate {
            let fresh = slot.last_used.elapsed() < self.limits.idle_timeout;
            if reuse && fresh && self.manager.is_usable(&mut slot.session).await {
                return Ok(Pooled::new(self, slot, true, permit));
            }
            debug!(slot = slot.id, "closing idle SMTP session");
        }

        let session = self.manager.connect().await?;
        let id = self.created.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(slot = id, "opened SMTP session");
        let slot = Slot {
            id,
            session,
            messages_sent: 0,
            last_used: Instant::now(),
        };
        Ok(Pooled::new(self, slot, false, permit))
    }

    /// Close the pool. Pending and future [`acquire`](Self::acquire) calls
    /// fail with [`SmtpError::PoolClosed`] and idle sessions are dropped.
    pub fn close(&self) {
        self.permits.close();
        lock(&self.idle).clear();
    }

    fn release(&self, mut slot: Slot<M::Session>) {
        if slot.messages_sent >= self.limits.max_messages {
            debug!(
                slot = slot.id,
                messages = slot.messages_sent,
                "rotating SMTP session"
            );
            return;
        }
        if self.permits.is_closed() {
            return;
        }
        slot.last_used = Instant::now();
        lock(&self.idle).push(slot);
    }
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A checked-out session. Dropping it returns the session to the pool unless
/// it was [discarded](Self::discard) or has reached its message limit.
pub struct Pooled<'a, M: SessionManager> {
    pool: &'a Pool<M>,
    slot: Option<Slot<M::Session>>,
    reused: bool,
    discard: bool,
    _permit: SemaphorePermit<'a>,
}

impl<M: SessionManager> std::fmt::Debug for Pooled<'_, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pooled")
            .field("id", &self.slot.as_ref().map(|s| s.id))
            .field("messages_sent", &self.slot.as_ref().map(|s| s.messages_sent))
            .field("reused", &self.reused)
            .finish_non_exhaustive()
    }
}

impl<'a, M: SessionManager> Pooled<'a, M> {
    fn new(
        pool: &'a Pool<M>,
        slot: Slot<M::Session>,
        reused: bool,
        permit: SemaphorePermit<'a>,
    ) -> Self {
        Self {
            pool,
            slot: Some(slot),
            reused,
            discard: false,
            _permit: permit,
        }
    }

    fn slot(&self) -> &Slot<M::Session> {
        self.slot.as_ref().expect("pooled slot is only taken on drop")
    }

    fn slot_mut(&mut self) -> &mut Slot<M::Session> {
        self.slot.as_mut().expect("pooled slot is only taken on drop")
    }

    /// Pool-unique identifier of the underlying session.
    pub fn id(&self) -> u64 {
        self.slot().id
    }

    /// Messages already sent over this session.
    pub fn messages_sent(&self) -> u32 {
        self.slot().messages_sent
    }

    /// Whether the session came from the idle stack rather than being opened
    /// for this checkout.
    pub fn is_reused(&self) -> bool {
        self.reused
    }

    /// Whether the session has carried its last message.
    pub fn is_exhausted(&self) -> bool {
        self.messages_sent() >= self.pool.limits.max_messages
    }

    /// Record one successfully sent message.
    pub fn mark_sent(&mut self) {
        self.slot_mut().messages_sent += 1;
    }

    /// Drop the session instead of returning it to the pool.
    pub fn discard(mut self) {
        self.discard = true;
    }
}

impl<M: SessionManager> Deref for Pooled<'_, M> {
    type Target = M::Session;

    fn deref(&self) -> &M::Session {
        &self.slot().session
    }
}

impl<M: SessionManager> DerefMut for Pooled<'_, M> {
    fn deref_mut(&mut self) -> &mut M::Session {
        &mut self.slot_mut().session
    }
}

impl<M: SessionManager> Drop for Pooled<'_, M> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            if self.discard {
                debug!(slot = slot.id, "discarding SMTP session");
            } else {
                self.pool.release(slot);
            }
        }
    }
}
