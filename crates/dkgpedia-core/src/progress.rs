//! Analysis progress tracking.
//!
//! The analysis engine reports progress through a status endpoint whose
//! payload shape changes as the run advances. The tracker polls that endpoint
//! on a fixed interval until the payload looks terminal, then returns an
//! explicit [`ProgressOutcome`].

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::DkgResult;

/// Delay between two progress polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(25);

/// Polls before a run is declared stalled (20 minutes at the default interval).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 48;

/// Message reported when the status endpoint itself cannot be reached.
pub const FETCH_FAILURE_MESSAGE: &str = "Failed to fetch progress";

/// Message reported when an error payload carries no message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Analysis failed";

/// Where a running analysis currently is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub step: String,
    pub step_index: Option<u64>,
    pub total_steps: Option<u64>,
    pub percentage: Option<f64>,
}

impl ProgressSnapshot {
    fn from_payload(payload: &Value) -> Self {
        let step = match payload.get("current_step") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "pending".to_string(),
            Some(other) => other.to_string(),
        };
        let step_index = first_u64(payload, &["step_number", "current_step_index", "step_index"]);
        let total_steps = first_u64(payload, &["total_steps"]);
        let percentage = first_f64(payload, &["progress_percentage", "percentage", "progress"])
            .or_else(|| match (step_index, total_steps) {
                (Some(i), Some(t)) if t > 0 => Some(i as f64 / t as f64 * 100.0),
                _ => None,
            });

        Self {
            step,
            step_index,
            total_steps,
            percentage,
        }
    }
}

fn first_u64(payload: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|k| payload.get(*k).and_then(Value::as_u64))
}

fn first_f64(payload: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| payload.get(*k).and_then(Value::as_f64))
}

/// Classification of a single status payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressState {
    InProgress(ProgressSnapshot),
    Success,
    Failed(String),
    /// Shape not recognised; polling continues.
    Unknown,
}

/// Classify a status payload by its shape.
pub fn classify(payload: &Value) -> ProgressState {
    let status = payload.get("status").and_then(Value::as_str);
    let errors = payload
        .get("errors")
        .and_then(Value::as_array)
        .filter(|e| !e.is_empty());

    if status == Some("error") {
        return ProgressState::Failed(failure_message(payload));
    }
    if status == Some("in_progress") || payload.get("current_step").is_some_and(|s| !s.is_null()) {
        return ProgressState::InProgress(ProgressSnapshot::from_payload(payload));
    }
    if status == Some("success") || payload.get("results").is_some_and(|r| !r.is_null()) {
        return ProgressState::Success;
    }
    if errors.is_some() {
        return ProgressState::Failed(failure_message(payload));
    }
    ProgressState::Unknown
}

fn failure_message(payload: &Value) -> String {
    let first_error = payload
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|e| e.first())
        .map(|e| match e {
            Value::String(s) => s.clone(),
            other => other
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
        });

    first_error
        .or_else(|| payload.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
}

/// Terminal result of tracking one analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressOutcome {
    /// Success payload, delivered once.
    Completed(Value),
    Failed(String),
    /// No terminal state after the configured number of polls.
    Stalled { attempts: u32 },
}

/// Source of progress payloads for an analysis id.
#[async_trait]
pub trait ProgressSource: Send + Sync {
    async fn fetch_progress(&self, analysis_id: &str) -> DkgResult<Value>;
}

/// Fixed-interval poller with an attempt ceiling.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    interval: Duration,
    max_attempts: u32,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ProgressTracker {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.poll_interval(), config.max_poll_attempts)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Poll `source` until the analysis reaches a terminal state.
    ///
    /// The first poll is issued immediately. `observer` sees every
    /// in-progress snapshot. The timer lives inside the returned future, so
    /// dropping the future stops polling.
    pub async fn track<S, F>(&self, source: &S, analysis_id: &str, mut observer: F) -> ProgressOutcome
    where
        S: ProgressSource + ?Sized,
        F: FnMut(&ProgressSnapshot),
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempts = 0;

        loop {
            ticker.tick().await;
            attempts += 1;

            let payload = match source.fetch_progress(analysis_id).await {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(analysis_id, error = %e, "Progress poll failed");
                    return ProgressOutcome::Failed(FETCH_FAILURE_MESSAGE.to_string());
                }
            };

            match classify(&payload) {
                ProgressState::InProgress(snapshot) => {
                    debug!(analysis_id, step = %snapshot.step, percentage = ?snapshot.percentage, "Analysis in progress");
                    observer(&snapshot);
                }
                ProgressState::Success => {
                    info!(analysis_id, attempts, "Analysis complete");
                    return ProgressOutcome::Completed(payload);
                }
                ProgressState::Failed(message) => {
                    warn!(analysis_id, %message, "Analysis failed");
                    return ProgressOutcome::Failed(message);
                }
                ProgressState::Unknown => {
                    debug!(analysis_id, "Unrecognised progress payload, still polling");
                }
            }

            if attempts >= self.max_attempts {
                warn!(analysis_id, attempts, "Analysis stalled, giving up");
                return ProgressOutcome::Stalled { attempts };
            }
        }
    }
}
