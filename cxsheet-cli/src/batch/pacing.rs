//! Pacing of remote submissions
//!
//! The fixed policy pauses after every `batch_size` submitted items, which
//! keeps a bulk run under the per-minute write quota of the agent API. The
//! token bucket spreads calls evenly once its burst is spent. Both sleep on
//! `tokio::time`, so tests can run with paused time.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::api::ResourceKind;

const DEFAULT_BATCH_SIZE: usize = 179;
const INTENT_PAUSE_SECS: u64 = 62;
const ENTITY_TYPE_PAUSE_SECS: u64 = 61;

/// How submissions of one resource kind are spaced out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PacingPolicy {
    Disabled,
    Fixed {
        #[serde(default = "default_batch_size")]
        batch_size: usize,
        #[serde(default = "default_pause_secs")]
        pause_secs: u64,
    },
    TokenBucket {
        requests_per_minute: u32,
        #[serde(default = "default_burst_capacity")]
        burst_capacity: u32,
    },
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_pause_secs() -> u64 {
    INTENT_PAUSE_SECS
}

fn default_burst_capacity() -> u32 {
    1
}

impl PacingPolicy {
    /// Legacy intent pacing: 62 s after every 179 submissions
    pub fn intents() -> Self {
        PacingPolicy::Fixed {
            batch_size: DEFAULT_BATCH_SIZE,
            pause_secs: INTENT_PAUSE_SECS,
        }
    }

    /// Legacy entity type pacing: 61 s after every 179 submissions
    pub fn entity_types() -> Self {
        PacingPolicy::Fixed {
            batch_size: DEFAULT_BATCH_SIZE,
            pause_secs: ENTITY_TYPE_PAUSE_SECS,
        }
    }

    pub fn for_kind(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Intent => Self::intents(),
            ResourceKind::EntityType => Self::entity_types(),
        }
    }
}

/// Pacing policies per resource kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub intents: PacingPolicy,
    pub entity_types: PacingPolicy,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            intents: PacingPolicy::intents(),
            entity_types: PacingPolicy::entity_types(),
        }
    }
}

impl PacingConfig {
    /// No pauses at all (dry runs and tests)
    pub fn disabled() -> Self {
        Self {
            intents: PacingPolicy::Disabled,
            entity_types: PacingPolicy::Disabled,
        }
    }

    pub fn policy(&self, kind: ResourceKind) -> &PacingPolicy {
        match kind {
            ResourceKind::Intent => &self.intents,
            ResourceKind::EntityType => &self.entity_types,
        }
    }
}

/// What a pacer did during one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PacingStats {
    pub submitted: u64,
    pub pauses: u64,
    pub total_paused: Duration,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    capacity: f64,
    per_second: f64,
    refilled_at: Instant,
}

impl Bucket {
    fn new(requests_per_minute: u32, burst_capacity: u32) -> Self {
        let capacity = f64::from(burst_capacity.max(1));
        Self {
            tokens: capacity,
            capacity,
            per_second: f64::from(requests_per_minute.max(1)) / 60.0,
            refilled_at: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.refilled_at).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.per_second).min(self.capacity);
        self.refilled_at = now;
    }

    /// Time to wait before a token is available, consuming it when there is none to wait for
    fn take(&mut self) -> Option<Duration> {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            None
        } else {
            Some(Duration::from_secs_f64((1.0 - self.tokens) / self.per_second))
        }
    }
}

/// Applies a [`PacingPolicy`] around each submission
#[derive(Debug)]
pub struct Pacer {
    kind: ResourceKind,
    policy: PacingPolicy,
    bucket: Option<Bucket>,
    stats: PacingStats,
}

impl Pacer {
    pub fn new(kind: ResourceKind, policy: PacingPolicy) -> Self {
        let bucket = match &policy {
            PacingPolicy::TokenBucket {
                requests_per_minute,
                burst_capacity,
            } => Some(Bucket::new(*requests_per_minute, *burst_capacity)),
            _ => None,
        };
        Self {
            kind,
            policy,
            bucket,
            stats: PacingStats::default(),
        }
    }

    /// Wait, if the bucket is empty, before the next call goes out
    pub async fn before_submit(&mut self) {
        let wait = self.bucket.as_mut().and_then(Bucket::take);
        if let Some(wait) = wait {
            log::debug!("Rate limit: waiting {:?} before next {}", wait, self.kind);
            self.pause(wait).await;
            if let Some(bucket) = self.bucket.as_mut() {
                bucket.refill();
                bucket.tokens = (bucket.tokens - 1.0).max(0.0);
            }
        }
    }

    /// Count a finished submission and take the fixed-window pause when due
    pub async fn after_submit(&mut self) {
        self.stats.submitted += 1;

        if let PacingPolicy::Fixed {
            batch_size,
            pause_secs,
        } = self.policy
        {
            if batch_size > 0 && self.stats.submitted % batch_size as u64 == 0 {
                log::info!(
                    "Submitted {} {}(s), pausing {} s",
                    self.stats.submitted,
                    self.kind,
                    pause_secs
                );
                self.pause(Duration::from_secs(pause_secs)).await;
            }
        }
    }

    async fn pause(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
        self.stats.pauses += 1;
        self.stats.total_paused += duration;
    }

    pub fn stats(&self) -> &PacingStats {
        &self.stats
    }

    pub fn into_stats(self) -> PacingStats {
        self.stats
    }
}
