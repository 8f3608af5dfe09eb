//! Check/retire loop.
//!
//! The controller is an explicit state machine driven one transition at a
//! time by [`RetirementController::step`]:
//!
//! ```text
//! Idle ──tick──▶ CheckingSpace ──ok──▶ Waiting ──tick──▶ CheckingSpace
//!                  │    ▲
//!             low  │    │ deleted one index
//!                  ▼    │
//!                 Retiring
//!
//! any error ──▶ ErrorBackoff ──cooldown──▶ CheckingSpace
//! ```
//!
//! Suspension happens only while waiting for a tick and during the error
//! cooldown; both observe the [`CancellationToken`]. Time comes from
//! `tokio::time`, so tests run the machine on paused virtual time.

use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use esguard_core::catalog::{IndexCatalog, SkipSet, UndatedPolicy};
use esguard_core::cluster::ClusterApi;
use esguard_core::error::GuardError;
use esguard_core::index_age::index_age;
use esguard_core::space::{format_bytes, ClusterFreeSpace, SpaceMode};

/// Parameters fixed for the lifetime of the controller.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Free space at or below this percentage triggers retirement.
    pub threshold_percent: u64,
    /// Time between scheduled checks.
    pub interval: Duration,
    /// Flat pause after any error.
    pub cooldown: Duration,
    pub skip: SkipSet,
    pub space_mode: SpaceMode,
    pub undated: UndatedPolicy,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            threshold_percent: 15,
            interval: Duration::from_secs(3600),
            cooldown: Duration::from_secs(60),
            skip: SkipSet::default(),
            space_mode: SpaceMode::default(),
            undated: UndatedPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Not started; the first tick fires immediately.
    Idle,
    CheckingSpace,
    /// Space is low: delete exactly one index, then re-check without waiting.
    Retiring,
    /// Space is sufficient: wait for the next tick.
    Waiting,
    /// A step failed: sleep for the cooldown, then re-check.
    ErrorBackoff,
}

pub struct RetirementController<C> {
    api: C,
    settings: ControllerSettings,
}

impl<C: ClusterApi> RetirementController<C> {
    pub fn new(api: C, settings: ControllerSettings) -> Self {
        Self { api, settings }
    }

    /// Build the scheduling interval. Missed ticks are skipped rather than
    /// replayed after a long retirement run.
    pub fn ticker(&self) -> Interval {
        let mut ticker = tokio::time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    }

    /// Run until `cancel` fires. Errors never end the loop.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            threshold_percent = self.settings.threshold_percent,
            interval_secs = self.settings.interval.as_secs(),
            cooldown_secs = self.settings.cooldown.as_secs(),
            space_mode = %self.settings.space_mode,
            skip = ?self.settings.skip.names(),
            "Retirement controller started",
        );

        let mut ticker = self.ticker();
        let mut state = ControllerState::Idle;

        while let Some(next) = self.step(state, &mut ticker, &cancel).await {
            state = next;
        }

        tracing::info!("Retirement controller stopped");
    }

    /// Perform one transition. Returns `None` once `cancel` has fired.
    pub async fn step(
        &self,
        state: ControllerState,
        ticker: &mut Interval,
        cancel: &CancellationToken,
    ) -> Option<ControllerState> {
        if cancel.is_cancelled() {
            return None;
        }

        let next = match state {
            ControllerState::Idle | ControllerState::Waiting => {
                tokio::select! {
                    _ = cancel.cancelled() => return None,
                    _ = ticker.tick() => {
                        tracing::info!("Checking");
                        ControllerState::CheckingSpace
                    }
                }
            }

            ControllerState::CheckingSpace => match self.check_free_space().await {
                Ok(space) if space.is_low(self.settings.threshold_percent) => {
                    tracing::warn!(
                        percent = space.percent,
                        threshold_percent = self.settings.threshold_percent,
                        "Free data space below threshold",
                    );
                    ControllerState::Retiring
                }
                Ok(space) => {
                    tracing::info!(percent = space.percent, "Free data space enough");
                    tracing::info!("Done checking");
                    ControllerState::Waiting
                }
                Err(e) => {
                    self.log_failure("check_free_space", &e);
                    ControllerState::ErrorBackoff
                }
            },

            ControllerState::Retiring => match self.retire_oldest().await {
                Ok(_) => ControllerState::CheckingSpace,
                Err(e) => {
                    self.log_failure("retire_oldest", &e);
                    ControllerState::ErrorBackoff
                }
            },

            ControllerState::ErrorBackoff => {
                tokio::select! {
                    _ = cancel.cancelled() => return None,
                    _ = tokio::time::sleep(self.settings.cooldown) => ControllerState::CheckingSpace,
                }
            }
        };

        tracing::debug!(from = ?state, to = ?next, "Controller transition");
        Some(next)
    }

    /// Fetch node stats and reduce them to the cluster free-space figure.
    pub async fn check_free_space(&self) -> Result<ClusterFreeSpace, GuardError> {
        tracing::info!("Checking data storage free space");

        let nodes = self.api.node_space().await?;

        tracing::info!(nodes = nodes.len(), "Calculating free space for nodes");

        for node in &nodes {
            tracing::info!(node = %node.id, name = %node.name, host = %node.host, "Node");

            for mount in &node.mounts {
                tracing::info!(
                    node = %node.id,
                    path = %mount.path,
                    device = %mount.device,
                    free = %format_bytes(mount.available_bytes),
                    "Data path",
                );
            }

            match node.available_percent() {
                Some(percent) => tracing::info!(
                    node = %node.id,
                    percent,
                    available = %format_bytes(node.usable_available()),
                    "Node free data space",
                ),
                None => tracing::warn!(
                    node = %node.id,
                    "Node reports a zero filesystem total, ignoring",
                ),
            }
        }

        let space = ClusterFreeSpace::reduce(&nodes, self.settings.space_mode)?;

        tracing::info!(
            percent = space.percent,
            mode = %space.mode,
            nodes = space.node_count,
            "Cluster free data space",
        );

        Ok(space)
    }

    /// Delete the oldest eligible index and return its name.
    ///
    /// No delete request is issued when the catalog yields no candidate.
    pub async fn retire_oldest(&self) -> Result<String, GuardError> {
        tracing::info!("Deleting old indices");

        let names = self.api.index_names().await?;
        let catalog = IndexCatalog::from_names(names, &self.settings.skip)?;
        let index = catalog.candidate(self.settings.undated)?.to_string();

        match index_age(&index) {
            Some(age) => tracing::info!(
                index = %index,
                age = %age,
                eligible = catalog.len(),
                "Delete index request",
            ),
            None => tracing::warn!(
                index = %index,
                eligible = catalog.len(),
                "No dated index left, deleting undated index",
            ),
        }

        self.api.delete_index(&index).await?;

        tracing::info!(index = %index, "Index deleted successfully");
        Ok(index)
    }

    fn log_failure(&self, operation: &'static str, error: &GuardError) {
        tracing::error!(
            operation,
            kind = error.kind(),
            error = %error,
            cooldown_secs = self.settings.cooldown.as_secs(),
            "Error checking, retrying after cooldown",
        );
    }
}
