//! Readiness-gated configuration of Kibana's detection engine

use tracing::{debug, info, warn};

use crate::error::{Result, StackError};

use super::dashboard::{Dashboard, ReadinessSignal};
use super::policy::{CancelToken, RetryBudget, Sleeper};

/// Where the step currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    Polling,
    Ready,
    TimedOut,
    EnableRequested,
    Enabled,
    Rejected,
    InstallRequested,
    Done,
}

impl StepPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepPhase::TimedOut | StepPhase::Rejected | StepPhase::Done
        )
    }
}

/// Result of the prepackaged-rule install. Never affects the exit code.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InstallOutcome {
    Installed { status: u16 },
    Failed { reason: String },
}

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ConfigureReport {
    /// Probes issued, including the one that saw Kibana ready
    pub probe_attempts: u32,
    pub install: InstallOutcome,
}

/// Waits for Kibana, enables the detection engine, then installs the
/// prepackaged rules.
pub struct ConfigureStep<D, S> {
    dashboard: D,
    sleeper: S,
    budget: RetryBudget,
    cancel: CancelToken,
    phase: StepPhase,
}

impl<D: Dashboard, S: Sleeper> ConfigureStep<D, S> {
    pub fn new(dashboard: D, sleeper: S, budget: RetryBudget) -> Self {
        Self {
            dashboard,
            sleeper,
            budget,
            cancel: CancelToken::new(),
            phase: StepPhase::Polling,
        }
    }

    /// Stop polling once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    /// Drive the step to a terminal phase
    pub fn run(&mut self) -> Result<ConfigureReport> {
        let probe_attempts = self.wait_until_ready()?;
        self.enable_detection_engine()?;
        let install = self.install_prepackaged_rules();
        self.transition(StepPhase::Done);

        Ok(ConfigureReport {
            probe_attempts,
            install,
        })
    }

    fn transition(&mut self, next: StepPhase) {
        debug!(from = ?self.phase, to = ?next, "configure step transition");
        self.phase = next;
    }

    /// Returns the attempt on which Kibana answered ready
    fn wait_until_ready(&mut self) -> Result<u32> {
        let max_attempts = self.budget.max_attempts;
        let mut remaining = max_attempts;
        let mut attempt = 0;

        while remaining > 0 {
            if self.cancel.is_cancelled() {
                return Err(StackError::Interrupted);
            }

            attempt += 1;
            remaining -= 1;

            match self.dashboard.probe() {
                ReadinessSignal::Ready => {
                    info!(attempt, "Kibana is up, proceeding");
                    self.transition(StepPhase::Ready);
                    return Ok(attempt);
                }
                ReadinessSignal::NotReady(status) => {
                    info!(attempt, remaining, status, "Kibana still loading");
                }
                ReadinessSignal::Unreachable => {
                    info!(attempt, remaining, "Kibana not reachable yet");
                }
            }

            if remaining > 0 {
                debug!(delay_secs = self.budget.delay.as_secs(), "waiting before next probe");
                self.sleeper.sleep(self.budget.delay);
            }
        }

        self.transition(StepPhase::TimedOut);
        Err(StackError::ReadinessTimeout {
            attempts: max_attempts,
        })
    }

    fn enable_detection_engine(&mut self) -> Result<()> {
        self.transition(StepPhase::EnableRequested);
        info!("Enabling the detection engine");

        // A transport failure leaves the phase at EnableRequested; only an
        // answer without the ack marker is a rejection.
        let response = self.dashboard.enable_detection_engine()?;

        if !response.is_acknowledged() {
            self.transition(StepPhase::Rejected);
            return Err(StackError::FeatureEnableRejected(format!(
                "Kibana answered {} without \"acknowledged\": true: {}",
                response.status,
                summarize(&response.body)
            )));
        }

        self.transition(StepPhase::Enabled);
        info!("Detection engine enabled");
        Ok(())
    }

    fn install_prepackaged_rules(&mut self) -> InstallOutcome {
        self.transition(StepPhase::InstallRequested);
        info!("Installing prepackaged rules");

        match self.dashboard.install_prepackaged_rules() {
            Ok(status) if (200..300).contains(&status) => {
                info!(status, "Prepackaged rules installed");
                InstallOutcome::Installed { status }
            }
            Ok(status) => {
                warn!(status, "Prepackaged rule install returned a non-success status");
                InstallOutcome::Failed {
                    reason: format!("HTTP {}", status),
                }
            }
            Err(err) => {
                warn!(error = %err, "Prepackaged rule install failed");
                InstallOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}

const BODY_SUMMARY_LEN: usize = 200;

fn summarize(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "<empty body>".to_string();
    }
    if body.chars().count() <= BODY_SUMMARY_LEN {
        return body.to_string();
    }
    let cut: String = body.chars().take(BODY_SUMMARY_LEN).collect();
    format!("{}...", cut)
}
