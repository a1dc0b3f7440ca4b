//! Reconciliation Loop
//!
//! Each tick fetches the output snapshot once, then walks the registry in
//! order. Per mapping: skip while cooling down, skip if the output is absent,
//! skip if the last pushed value already matches, otherwise push and feed
//! the outcome into the state store. A failing device never stops the walk.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, trace, warn};

use super::registry::DeviceMapping;
use super::session::{SessionSlot, SyncSession};
use crate::device::DeviceUpdater;
use crate::source::OutputStateSource;

/// How often a disabled loop rechecks for a new configuration.
pub const DISABLED_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Wall-clock source for tick starts and failure timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Per-tick counters, one bucket per mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub pushed: usize,
    pub failed: usize,
    pub unchanged: usize,
    pub cooling_down: usize,
    pub missing: usize,
}

impl TickReport {
    pub const fn attempted(&self) -> usize {
        self.pushed + self.failed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No mappings configured; nothing was fetched.
    Disabled,
    /// The output source failed; no device was touched.
    Skipped { reason: String },
    Completed(TickReport),
}

enum MappingOutcome {
    Pushed,
    Failed,
    Unchanged,
    CoolingDown,
    Missing,
}

pub struct Reconciler {
    slot: Arc<SessionSlot>,
    source: Arc<dyn OutputStateSource>,
    updater: Arc<dyn DeviceUpdater>,
    clock: Clock,
}

impl Reconciler {
    pub fn new(
        slot: Arc<SessionSlot>,
        source: Arc<dyn OutputStateSource>,
        updater: Arc<dyn DeviceUpdater>,
    ) -> Self {
        Self { slot, source, updater, clock: Arc::new(Utc::now) }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub async fn tick(&self) -> TickOutcome {
        self.tick_at((self.clock)()).await
    }

    /// Run one tick against the current session as of `now`.
    ///
    /// `now` decides which cooldowns are still running. A failure is stamped
    /// with the clock reading taken when it happens, so a cooldown always
    /// lasts `clear_interval` from the failing request.
    pub async fn tick_at(&self, now: DateTime<Utc>) -> TickOutcome {
        let session = self.slot.load();
        self.tick_session(&session, now).await
    }

    async fn tick_session(&self, session: &SyncSession, now: DateTime<Utc>) -> TickOutcome {
        if !session.is_enabled() {
            return TickOutcome::Disabled;
        }

        let snapshot = match self.source.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("[Sync] Skipping tick, could not read output states: {}", e);
                return TickOutcome::Skipped { reason: e.to_string() };
            },
        };

        let mut report = TickReport::default();
        for mapping in session.registry().iter() {
            let desired = snapshot.find(mapping.output_id).map(|o| o.is_on());
            match self.reconcile_mapping(session, mapping, desired, now).await {
                MappingOutcome::Pushed => report.pushed += 1,
                MappingOutcome::Failed => report.failed += 1,
                MappingOutcome::Unchanged => report.unchanged += 1,
                MappingOutcome::CoolingDown => report.cooling_down += 1,
                MappingOutcome::Missing => report.missing += 1,
            }
        }

        TickOutcome::Completed(report)
    }

    async fn reconcile_mapping(
        &self,
        session: &SyncSession,
        mapping: &DeviceMapping,
        desired: Option<bool>,
        now: DateTime<Utc>,
    ) -> MappingOutcome {
        let store = session.store();
        let output_id = mapping.output_id;

        if store.is_cooling_down(output_id, now) {
            trace!(label = %mapping.label, output_id, "[Sync] Device cooling down, skipped");
            return MappingOutcome::CoolingDown;
        }

        let Some(desired) = desired else {
            trace!(label = %mapping.label, output_id, "[Sync] Output not in snapshot");
            return MappingOutcome::Missing;
        };

        if store.get(output_id).is_some_and(|s| s.is_synced(desired)) {
            return MappingOutcome::Unchanged;
        }

        match self.updater.push(mapping, desired).await {
            Ok(reported) => {
                store.on_success(output_id, reported);
                if reported == desired {
                    info!(
                        label = %mapping.label,
                        output_id,
                        "[Sync] Tasmota device {} is {}",
                        mapping.label,
                        on_off(reported)
                    );
                } else {
                    info!(
                        label = %mapping.label,
                        output_id,
                        "[Sync] Tasmota device {} reports {} after {} was requested",
                        mapping.label,
                        on_off(reported),
                        on_off(desired)
                    );
                }
                MappingOutcome::Pushed
            },
            Err(e) => {
                let cooldown = store.on_failure(output_id, session.policy(), (self.clock)());
                let failures = store.get(output_id).map_or(0, |s| s.failure_count());
                warn!(
                    label = %mapping.label,
                    address = %mapping.address,
                    output_id,
                    failures,
                    "[Sync] Error: {}",
                    e
                );
                if let Some(until) = cooldown {
                    warn!(
                        label = %mapping.label,
                        until = %until,
                        "[Sync] {} reached max retries. Going idle for {} minutes.",
                        mapping.label,
                        session.policy().clear_interval.num_minutes()
                    );
                }
                MappingOutcome::Failed
            },
        }
    }

    /// Tick forever.
    ///
    /// Sleeps `refresh_interval` between ticks while enabled and
    /// [`DISABLED_POLL_INTERVAL`] while disabled. A reconfiguration cuts the
    /// current sleep short.
    pub async fn run(&self) {
        info!("[Sync] Reconciliation loop started");
        let mut last_generation = None;

        loop {
            let session = self.slot.load();
            if last_generation != Some(session.generation()) {
                last_generation = Some(session.generation());
                info!(
                    generation = session.generation(),
                    devices = session.registry().len(),
                    "[Sync] Tasmota bridge is {}",
                    if session.is_enabled() { "enabled" } else { "disabled" }
                );
            }

            let delay = if session.is_enabled() {
                match self.tick_session(&session, (self.clock)()).await {
                    TickOutcome::Completed(report) if report.attempted() > 0 => {
                        debug!(
                            pushed = report.pushed,
                            failed = report.failed,
                            cooling_down = report.cooling_down,
                            "[Sync] Tick complete"
                        );
                    },
                    TickOutcome::Completed(_)
                    | TickOutcome::Skipped { .. }
                    | TickOutcome::Disabled => {},
                }
                session.refresh_interval()
            } else {
                DISABLED_POLL_INTERVAL
            };
            drop(session);

            tokio::select! {
                () = tokio::time::sleep(delay) => {},
                () = self.slot.changed() => {
                    debug!("[Sync] Configuration changed, ticking early");
                },
            }
        }
    }
}

const fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}
