//! Per-category action locks with TTL auto-release

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::core::config::LockConfig;
use crate::core::error::{BattleError, Result};
use crate::lock::clock::{Clock, SystemClock};

/// What kind of UI action a lock serializes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LockCategory {
    AbilitySelection,
    Movement,
    Attack,
    StyleSwitch,
    Global,
}

impl LockCategory {
    pub const ALL: [LockCategory; 5] = [
        LockCategory::AbilitySelection,
        LockCategory::Movement,
        LockCategory::Attack,
        LockCategory::StyleSwitch,
        LockCategory::Global,
    ];
}

/// A held lock
#[derive(Debug, Clone, PartialEq)]
pub struct LockState {
    pub start: Duration,
    pub duration: Duration,
    pub reason: Option<String>,
    token: u64,
}

impl LockState {
    pub fn expires_at(&self) -> Duration {
        self.start + self.duration
    }

    fn expired(&self, now: Duration) -> bool {
        now >= self.expires_at()
    }
}

#[derive(Debug, Default)]
struct Inner {
    held: HashMap<LockCategory, LockState>,
    last_run: HashMap<LockCategory, Duration>,
    next_token: u64,
}

impl Inner {
    /// Drop the lock for `category` if its TTL ran out
    fn expire(&mut self, category: LockCategory, now: Duration) {
        if self
            .held
            .get(&category)
            .is_some_and(|state| state.expired(now))
        {
            self.held.remove(&category);
            tracing::debug!(?category, "lock expired");
        }
    }

    fn is_locked(&mut self, category: LockCategory, now: Duration) -> bool {
        self.expire(category, now);
        self.held.contains_key(&category)
    }

    fn can_perform(&mut self, category: LockCategory, now: Duration) -> bool {
        !self.is_locked(category, now) && !self.is_locked(LockCategory::Global, now)
    }

    fn insert(
        &mut self,
        category: LockCategory,
        now: Duration,
        duration: Duration,
        reason: Option<&str>,
    ) -> u64 {
        let token = self.next_token;
        self.next_token += 1;
        self.held.insert(
            category,
            LockState {
                start: now,
                duration,
                reason: reason.map(str::to_owned),
                token,
            },
        );
        token
    }
}

/// Serializes UI actions per category
///
/// Locks expire lazily: nothing runs in the background, a lock past its TTL is
/// dropped the next time anyone looks at it.
#[derive(Debug)]
pub struct ActionLockGuard {
    clock: Arc<dyn Clock>,
    config: LockConfig,
    inner: Mutex<Inner>,
}

impl ActionLockGuard {
    pub fn new(config: LockConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(config: LockConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            config,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the lock for `category`
    ///
    /// Returns false without touching the existing lock if it is already held.
    pub fn lock(&self, category: LockCategory, duration: Option<Duration>, reason: Option<&str>) -> bool {
        let now = self.clock.now();
        let mut inner = self.inner();
        if inner.is_locked(category, now) {
            tracing::debug!(?category, reason, "lock already held");
            return false;
        }
        let duration = duration.unwrap_or_else(|| self.config.ttl(category));
        inner.insert(category, now, duration, reason);
        true
    }

    pub fn unlock(&self, category: LockCategory) {
        self.inner().held.remove(&category);
    }

    pub fn is_locked(&self, category: LockCategory) -> bool {
        let now = self.clock.now();
        self.inner().is_locked(category, now)
    }

    /// Neither the category nor the global lock is held
    pub fn can_perform_action(&self, category: LockCategory) -> bool {
        let now = self.clock.now();
        self.inner().can_perform(category, now)
    }

    pub fn lock_state(&self, category: LockCategory) -> Option<LockState> {
        let now = self.clock.now();
        let mut inner = self.inner();
        inner.expire(category, now);
        inner.held.get(&category).cloned()
    }

    fn try_acquire(&self, category: LockCategory, duration: Option<Duration>) -> Result<u64> {
        let now = self.clock.now();
        let mut inner = self.inner();
        if !inner.can_perform(category, now) {
            return Err(BattleError::AlreadyLocked(category));
        }
        let duration = duration.unwrap_or_else(|| self.config.ttl(category));
        Ok(inner.insert(category, now, duration, Some("action")))
    }

    /// Hold `category` while `action` runs
    ///
    /// The lock is released when the action finishes, fails, panics or is
    /// dropped mid-flight. A lock that already expired and was re-taken by
    /// someone else is left alone.
    pub async fn lock_for_action<F, Fut, T>(
        &self,
        category: LockCategory,
        duration: Option<Duration>,
        action: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let token = self.try_acquire(category, duration)?;
        let _release = Release {
            guard: self,
            category,
            token,
        };
        action().await
    }

    /// Run `action` unless it already ran for `category` within `window`
    pub fn with_debounce<F, T>(&self, category: LockCategory, action: F, window: Duration) -> Option<T>
    where
        F: FnOnce() -> T,
    {
        let now = self.clock.now();
        {
            let mut inner = self.inner();
            if let Some(last) = inner.last_run.get(&category) {
                if now.saturating_sub(*last) < window {
                    tracing::debug!(?category, "debounced");
                    return None;
                }
            }
            inner.last_run.insert(category, now);
        }
        Some(action())
    }

    fn release(&self, category: LockCategory, token: u64) {
        let mut inner = self.inner();
        if inner
            .held
            .get(&category)
            .is_some_and(|state| state.token == token)
        {
            inner.held.remove(&category);
        }
    }
}

struct Release<'a> {
    guard: &'a ActionLockGuard,
    category: LockCategory,
    token: u64,
}

impl Drop for Release<'_> {
    fn drop(&mut self) {
        self.guard.release(self.category, self.token);
    }
}
