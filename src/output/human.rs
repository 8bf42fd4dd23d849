//! Human-readable output formatting

use crate::output::formatter::{CommandOutput, StatusReport};
use crate::readiness::{ConfigureReport, InstallOutcome};
use crate::stack::Service;

pub fn format_human(output: &CommandOutput) -> String {
    match output {
        CommandOutput::Status(report) => format_status(report),
        CommandOutput::Configured(report) => format_configured(report),
    }
}

fn format_status(report: &StatusReport) -> String {
    let mut output = format!(
        "Stack Status ({})\n------------\n",
        report.checked_at.with_timezone(&chrono::Local).format("%H:%M:%S")
    );
    output.push_str(&format!(
        "{:<16} {:<10} {:<30} {}\n",
        "NAME", "STATE", "STATUS", "PORTS"
    ));
    output.push_str(&"-".repeat(72));
    output.push('\n');

    for name in Service::names() {
        match report.containers.iter().find(|c| c.name == name) {
            Some(container) => output.push_str(&format!(
                "{:<16} {:<10} {:<30} {}\n",
                container.name,
                if container.state.is_empty() { "-" } else { container.state.as_str() },
                truncate(&container.status, 30),
                container.ports
            )),
            None => output.push_str(&format!("{:<16} {:<10}\n", name, "absent")),
        }
    }

    output
}

fn format_configured(report: &ConfigureReport) -> String {
    let mut output = format!(
        "Detection engine enabled (Kibana ready after {} probe{})\n",
        report.probe_attempts,
        if report.probe_attempts == 1 { "" } else { "s" }
    );
    match &report.install {
        InstallOutcome::Installed { .. } => output.push_str("Prepackaged rules installed!"),
        InstallOutcome::Failed { reason } => output.push_str(&format!(
            "Warning: prepackaged rules may not be installed ({})",
            reason
        )),
    }
    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
