//! Revocation cache
//!
//! A concurrent, TTL-bounded set of revoked [`TokenId`]s. Entries live in a
//! sharded [`DashMap`], so lookups only contend with writes to the same shard
//! and a sweep holds one shard lock at a time.
//!
//! An entry whose expiry is at or before the current time no longer blocks
//! anything. Such entries are removed lazily on lookup, by [`Blocklist::sweep`],
//! or by the background sweeper started with [`Blocklist::spawn_sweeper`].

use crate::error::{Error, Result};
use crate::limits::MAX_LEEWAY_SECONDS;
use crate::time::{system_clock, Clock, SharedClock};
use crate::token::{TokenId, VerifiedToken};
use crate::verifier::Revocation;

use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Default time between background sweeps (60 seconds)
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Default lifetime for revoked tokens without `exp` (24 hours)
const DEFAULT_TTL: Duration = Duration::from_secs(86_400);

/// Configuration for a [`Blocklist`]
#[derive(Clone)]
pub struct BlocklistConfig {
    sweep_interval: Duration,
    default_ttl: Duration,
    retention: Duration,
    clock: SharedClock,
}

impl Default for BlocklistConfig {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            default_ttl: DEFAULT_TTL,
            // A token stays verifiable for up to the maximum leeway past `exp`
            retention: Duration::from_secs(MAX_LEEWAY_SECONDS + 1),
            clock: system_clock(),
        }
    }
}

impl fmt::Debug for BlocklistConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlocklistConfig")
            .field("sweep_interval", &self.sweep_interval)
            .field("default_ttl", &self.default_ttl)
            .field("retention", &self.retention)
            .finish_non_exhaustive()
    }
}

impl BlocklistConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Time between background sweeps
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Lifetime used by [`Blocklist::invalidate_token`] for tokens without `exp`
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Extra time an entry is kept past the token's `exp`
    pub fn retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Read the current time from `clock`
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.sweep_interval.is_zero() {
            return Err(Error::ConfigurationInvalid(
                "blocklist sweep interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

struct Inner {
    entries: DashMap<TokenId, i64>,
    config: BlocklistConfig,
}

/// Concurrent set of revoked tokens
///
/// Clones share the same entries.
///
/// # Example
///
/// ```ignore
/// use jwtseal::*;
///
/// let blocklist = Blocklist::new();
/// let sweeper = blocklist.spawn_sweeper();
///
/// let verifier = Verifier::new(key).blocklist(&blocklist);
/// let token = verifier.verify(&text)?;
///
/// // Log out
/// blocklist.invalidate_token(&token)?;
/// assert!(matches!(verifier.verify(&text), Err(Error::TokenBlocked)));
///
/// sweeper.shutdown().await;
/// ```
#[derive(Clone)]
pub struct Blocklist {
    inner: Arc<Inner>,
}

impl Default for Blocklist {
    fn default() -> Self {
        Self::from_valid_config(BlocklistConfig::default())
    }
}

impl Blocklist {
    /// Empty blocklist with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty blocklist with `config`
    ///
    /// # Errors
    ///
    /// `Error::ConfigurationInvalid` if the sweep interval is zero.
    pub fn with_config(config: BlocklistConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: BlocklistConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: DashMap::new(),
                config,
            }),
        }
    }

    fn now(&self) -> i64 {
        self.inner.config.clock.now()
    }

    /// Revoke `id` until `expiry`, replacing any existing entry
    pub fn invalidate(&self, id: TokenId, expiry: i64) {
        debug!(
            target: "jwtseal.blocklist",
            token_id = %id,
            expiry,
            "Token invalidated"
        );
        self.inner.entries.insert(id, expiry);
    }

    /// Revoke a verified token until its `exp` plus the retention margin
    ///
    /// Tokens without `exp` are kept for the configured default TTL.
    pub fn invalidate_token(&self, token: &VerifiedToken) -> Result<()> {
        let config = &self.inner.config;
        let expiry = match token.claims().expiration {
            Some(exp) => offset(exp, config.retention)?,
            None => offset(self.now(), config.default_ttl)?,
        };
        self.invalidate(token.id().clone(), expiry);
        Ok(())
    }

    /// Whether `id` is revoked right now
    ///
    /// An entry whose expiry has passed is removed and reported as not blocked.
    pub fn is_blocked(&self, id: &TokenId) -> bool {
        let now = self.now();

        let expiry = match self.inner.entries.get(id) {
            Some(entry) => *entry,
            None => return false,
        };

        if expiry > now {
            return true;
        }

        // The entry may have been replaced since the read
        self.inner.entries.remove_if(id, |_, expiry| *expiry <= now);
        false
    }

    /// Whether an entry for `id` is stored, expired or not
    pub fn contains(&self, id: &TokenId) -> bool {
        self.inner.entries.contains_key(id)
    }

    /// Drop the entry for `id`; returns whether one existed
    pub fn remove(&self, id: &TokenId) -> bool {
        self.inner.entries.remove(id).is_some()
    }

    /// Number of stored entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Whether no entries are stored
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Remove every entry whose expiry is at or before now
    ///
    /// Returns the number of removed entries.
    pub fn sweep(&self) -> usize {
        let now = self.now();
        let mut removed = 0;

        self.inner.entries.retain(|_, expiry| {
            let keep = *expiry > now;
            if !keep {
                removed += 1;
            }
            keep
        });

        trace!(
            target: "jwtseal.blocklist",
            removed,
            remaining = self.inner.entries.len(),
            "Blocklist swept"
        );
        removed
    }

    /// Start a background task that sweeps on the configured interval
    ///
    /// Must be called from within a Tokio runtime. The task runs until
    /// [`SweeperHandle::shutdown`] is awaited or the handle is dropped.
    pub fn spawn_sweeper(&self) -> SweeperHandle {
        let cancel = CancellationToken::new();
        let stop = cancel.clone();
        let blocklist = self.clone();
        let period = self.inner.config.sweep_interval;

        debug!(
            target: "jwtseal.blocklist",
            interval_secs = period.as_secs(),
            "Starting blocklist sweeper"
        );

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = interval.tick() => {
                        let removed = blocklist.sweep();
                        if removed > 0 {
                            debug!(
                                target: "jwtseal.blocklist",
                                removed,
                                "Expired revocations removed"
                            );
                        }
                    }
                }
            }

            debug!(target: "jwtseal.blocklist", "Blocklist sweeper stopped");
        });

        SweeperHandle {
            cancel,
            task: Some(task),
        }
    }
}

impl Revocation for Blocklist {
    fn is_blocked(&self, id: &TokenId) -> bool {
        Blocklist::is_blocked(self, id)
    }
}

impl fmt::Debug for Blocklist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blocklist")
            .field("entries", &self.inner.entries.len())
            .field("config", &self.inner.config)
            .finish()
    }
}

fn offset(timestamp: i64, duration: Duration) -> Result<i64> {
    let seconds = i64::try_from(duration.as_secs()).map_err(|_| Error::TimestampOverflow)?;
    timestamp
        .checked_add(seconds)
        .ok_or(Error::TimestampOverflow)
}

/// Lifecycle handle for a background sweeper
///
/// Dropping the handle cancels the task without waiting for it.
#[derive(Debug)]
pub struct SweeperHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Whether the sweeper task is still running
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the sweeper and wait for its task to finish
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(
                    target: "jwtseal.blocklist",
                    error = %e,
                    "Blocklist sweeper ended abnormally"
                );
            }
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
