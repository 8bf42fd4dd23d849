//! Readiness-gated Kibana configuration
//!
//! Kibana answers `302` on its root once it has booted. Until then the step
//! polls it on a bounded, fixed-delay budget; after that it enables the
//! detection engine and installs the prepackaged rules:
//!
//! ```text
//! Polling -> Ready -> EnableRequested -> Enabled -> InstallRequested -> Done
//!    |                      |
//!    v                      v
//! TimedOut               Rejected
//! ```
//!
//! The install outcome is reported but never fails the step.

pub mod dashboard;
pub mod policy;
pub mod step;

pub use dashboard::{
    Dashboard, DashboardEndpoint, EnableResponse, KibanaClient, ReadinessSignal, SuccessMarker,
    DETECTION_ENGINE_INDEX, PREPACKAGED_RULES, READINESS_PROBE, READY_STATUS,
};
pub use policy::{CancelToken, RetryBudget, Sleeper, ThreadSleeper};
pub use step::{ConfigureReport, ConfigureStep, InstallOutcome, StepPhase};

use tracing::info;

use crate::config::StackConfig;
use crate::error::Result;

/// Run the configuration step against the Kibana named in `config`
pub fn configure_kibana(config: &StackConfig, cancel: CancelToken) -> Result<ConfigureReport> {
    let client = KibanaClient::new(config)?;
    info!(
        url = %client.base_url(),
        max_attempts = config.readiness.max_attempts,
        delay_secs = config.readiness.delay.as_secs(),
        "Waiting for Kibana"
    );

    let sleeper = ThreadSleeper::new(cancel.clone());
    let mut step = ConfigureStep::new(client, sleeper, config.readiness).with_cancellation(cancel);
    step.run()
}
