//! Output formatting

use chrono::{DateTime, Utc};

use crate::docker::ContainerStatus;
use crate::output::human::format_human;
use crate::output::json::format_json;
use crate::readiness::ConfigureReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Snapshot of the stack's containers
#[derive(Debug, Clone, serde::Serialize)]
pub struct StatusReport {
    pub checked_at: DateTime<Utc>,
    pub containers: Vec<ContainerStatus>,
}

impl StatusReport {
    pub fn new(containers: Vec<ContainerStatus>) -> Self {
        Self {
            checked_at: Utc::now(),
            containers,
        }
    }
}

/// Anything a verb prints on stdout
#[derive(Debug, Clone)]
pub enum CommandOutput {
    Status(StatusReport),
    Configured(ConfigureReport),
}

pub fn format_output(output: &CommandOutput, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_human(output),
        OutputFormat::Json => format_json(output),
    }
}
