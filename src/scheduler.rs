//! Daily scheduling and single-flight admission for update runs.
//!
//! The scheduler polls the clock once a minute and fires at most once per
//! day, at the configured target time. Manual triggers share the same
//! [`SingleFlight`] gate as scheduled ones, so two updates can never run
//! against the database at the same time no matter where they came from.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use log::{error, info, warn};
use tokio::time::sleep;

use crate::config::{Config, SCHEDULE_POLL_INTERVAL};
use crate::error_handling::UpdateError;
use crate::run::{run_update, UpdateReport};

/// Admission gate allowing at most one in-flight update at a time.
pub struct SingleFlight {
    busy: AtomicBool,
}

/// Permit for one admitted update; dropping it reopens the gate.
pub struct FlightPermit<'a> {
    flight: &'a SingleFlight,
}

impl SingleFlight {
    /// Creates an open gate.
    pub fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// Claims the gate, or returns `None` if another update holds it.
    pub fn try_acquire(&self) -> Option<FlightPermit<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightPermit { flight: self })
    }

    /// Whether an update currently holds the gate.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Default for SingleFlight {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FlightPermit<'_> {
    fn drop(&mut self) {
        self.flight.busy.store(false, Ordering::Release);
    }
}

/// What came of one trigger.
#[derive(Debug)]
pub enum TriggerOutcome {
    /// Another update was already in flight; this trigger did nothing.
    Skipped,
    /// The update ran to completion.
    Completed(UpdateReport),
    /// The update ran and failed. The schedule keeps going.
    Failed(UpdateError),
}

/// Runs updates on a daily schedule, one at a time.
pub struct UpdateScheduler {
    config: Config,
    flight: SingleFlight,
    last_update: Mutex<Option<DateTime<Utc>>>,
}

impl UpdateScheduler {
    /// Creates a scheduler over the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            flight: SingleFlight::new(),
            last_update: Mutex::new(None),
        }
    }

    /// When the last successful update finished, if any.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        *self
            .last_update
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs one update now, unless one is already in flight.
    pub async fn trigger_update(&self) -> TriggerOutcome {
        let Some(_permit) = self.flight.try_acquire() else {
            warn!("Update already in progress; skipping this trigger");
            return TriggerOutcome::Skipped;
        };

        match run_update(&self.config).await {
            Ok(report) => {
                let finished = Utc::now();
                *self
                    .last_update
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(finished);
                info!("Update completed at {}", finished.to_rfc3339());
                TriggerOutcome::Completed(report)
            }
            Err(err) => {
                error!("Update failed: {}", err);
                TriggerOutcome::Failed(err)
            }
        }
    }

    /// Polls the clock and fires one update per day at `target` (UTC).
    ///
    /// Starting after today's target time counts today as already fired,
    /// so the first run lands tomorrow. Failed runs do not stop the
    /// schedule; the next day's run happens regardless. Never returns.
    pub async fn run_daily(&self, target: NaiveTime) {
        let now = Utc::now();
        let mut last_fired = if now.time() >= target {
            Some(now.date_naive())
        } else {
            None
        };
        info!(
            "Scheduling daily updates at {} UTC, polling every {}s",
            target.format("%H:%M"),
            SCHEDULE_POLL_INTERVAL.as_secs()
        );

        loop {
            let now = Utc::now();
            if due_now(now.time(), now.date_naive(), target, last_fired) {
                last_fired = Some(now.date_naive());
                self.trigger_update().await;
            }
            sleep(SCHEDULE_POLL_INTERVAL).await;
        }
    }
}

fn due_now(
    now_time: NaiveTime,
    today: NaiveDate,
    target: NaiveTime,
    last_fired: Option<NaiveDate>,
) -> bool {
    now_time >= target && last_fired != Some(today)
}

/// Parses an `HH:MM` wall-clock time for the daily schedule.
pub fn parse_target_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| format!("invalid time '{}': expected HH:MM (24-hour)", s))
}
