//! Circuit breaker guarding the expensive fog computation.
//!
//! Closed → (N failures within the window) → Open → (cooldown) → HalfOpen,
//! then one trial call decides: success closes the breaker, failure re-opens it.
//! While open, calls fail fast with [`FogError::CircuitOpen`] without running.

use crate::clock::{Clock, SystemClock};
use crate::config::BreakerConfig;
use crate::error::{FogError, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Instant;

/// Breaker state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CircuitState {
    #[default]
    Closed,
    Open,
    HalfOpen,
}

/// A failure-counting circuit breaker.
///
/// Failures are counted in a sliding window; timestamps older than
/// `failure_window` no longer count.
///
/// # Example
///
/// ```
/// use fogmap::breaker::{CircuitBreaker, CircuitState};
/// use fogmap::config::BreakerConfig;
/// use fogmap::error::FogError;
///
/// let mut breaker = CircuitBreaker::new(BreakerConfig {
///     failure_threshold: 1,
///     ..BreakerConfig::default()
/// });
///
/// let failed: Result<(), _> = breaker.execute(|| Err(FogError::Operation("boom".into())));
/// assert!(failed.is_err());
/// assert_eq!(breaker.state(), CircuitState::Open);
///
/// let skipped = breaker.execute(|| Ok(42));
/// assert!(matches!(skipped, Err(FogError::CircuitOpen { .. })));
/// ```
#[derive(Debug)]
pub struct CircuitBreaker<C: Clock = SystemClock> {
    config: BreakerConfig,
    clock: C,
    state: CircuitState,
    failures: VecDeque<Instant>,
    opened_at: Option<Instant>,
    fast_fail_logged: bool,
}

impl CircuitBreaker<SystemClock> {
    pub fn new(config: BreakerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for CircuitBreaker<SystemClock> {
    fn default() -> Self {
        Self::new(BreakerConfig::default())
    }
}

impl<C: Clock> CircuitBreaker<C> {
    pub fn with_clock(config: BreakerConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            state: CircuitState::Closed,
            failures: VecDeque::new(),
            opened_at: None,
            fast_fail_logged: false,
        }
    }

    /// Current state. An open breaker whose cooldown has elapsed reports
    /// HalfOpen: the next call is the trial.
    pub fn state(&self) -> CircuitState {
        match (self.state, self.opened_at) {
            (CircuitState::Open, Some(at)) if self.cooldown_elapsed(at) => CircuitState::HalfOpen,
            (state, _) => state,
        }
    }

    /// Failures currently inside the sliding window.
    pub fn failure_count(&self) -> usize {
        let now = self.clock.now();
        self.failures
            .iter()
            .filter(|&&t| now.saturating_duration_since(t) < self.config.failure_window)
            .count()
    }

    /// Returns to Closed and forgets every failure.
    pub fn reset(&mut self) {
        self.state = CircuitState::Closed;
        self.failures.clear();
        self.opened_at = None;
        self.fast_fail_logged = false;
    }

    /// Runs `operation` unless the breaker is open.
    ///
    /// # Returns
    ///
    /// The operation's result, or [`FogError::CircuitOpen`] with the time
    /// left until the next trial when the call was skipped.
    pub fn execute<T, O>(&mut self, operation: O) -> Result<T>
    where
        O: FnOnce() -> Result<T>,
    {
        self.admit()?;
        match operation() {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(e) => {
                self.record_failure();
                Err(e)
            }
        }
    }

    fn cooldown_elapsed(&self, opened_at: Instant) -> bool {
        self.clock.now().saturating_duration_since(opened_at) >= self.config.cooldown
    }

    fn admit(&mut self) -> Result<()> {
        if self.state != CircuitState::Open {
            return Ok(());
        }

        let opened_at = self.opened_at.unwrap_or_else(|| self.clock.now());
        if self.cooldown_elapsed(opened_at) {
            tracing::debug!("circuit half-open, admitting trial call");
            self.state = CircuitState::HalfOpen;
            return Ok(());
        }

        let retry_in = self
            .config
            .cooldown
            .saturating_sub(self.clock.now().saturating_duration_since(opened_at));
        if !self.fast_fail_logged {
            tracing::info!(?retry_in, "circuit open, skipping fog computation");
            self.fast_fail_logged = true;
        }
        Err(FogError::CircuitOpen { retry_in })
    }

    fn record_success(&mut self) {
        if self.state != CircuitState::Closed {
            tracing::info!("circuit closed after successful trial");
        }
        self.state = CircuitState::Closed;
        self.failures.clear();
        self.opened_at = None;
    }

    fn record_failure(&mut self) {
        let now = self.clock.now();
        while self
            .failures
            .front()
            .is_some_and(|&t| now.saturating_duration_since(t) >= self.config.failure_window)
        {
            self.failures.pop_front();
        }
        self.failures.push_back(now);

        let reopen = self.state == CircuitState::HalfOpen;
        if reopen || self.failures.len() >= self.config.failure_threshold {
            tracing::warn!(
                failures = self.failures.len(),
                cooldown = ?self.config.cooldown,
                "circuit opened"
            );
            self.state = CircuitState::Open;
            self.opened_at = Some(now);
        }
    }
}
