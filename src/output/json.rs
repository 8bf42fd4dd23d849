//! JSON output formatting

use crate::output::formatter::CommandOutput;
use serde_json::{json, Value};

pub fn format_json(output: &CommandOutput) -> String {
    let data: Value = match output {
        CommandOutput::Status(report) => serde_json::to_value(report).unwrap_or(json!(null)),
        CommandOutput::Configured(report) => json!({
            "detection_engine": "enabled",
            "probe_attempts": report.probe_attempts,
            "prepackaged_rules": report.install,
        }),
    };

    serde_json::to_string_pretty(&data).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker::ContainerStatus;
    use crate::output::StatusReport;
    use crate::readiness::{ConfigureReport, InstallOutcome};

    #[test]
    fn test_status_json_shape() {
        let report = StatusReport::new(vec![ContainerStatus {
            name: "elasticsearch".into(),
            image: "docker.elastic.co/elasticsearch/elasticsearch:7.17.9".into(),
            state: "running".into(),
            status: "Up 5 minutes".into(),
            ports: "0.0.0.0:9200->9200/tcp".into(),
        }]);
        let value: Value = serde_json::from_str(&format_json(&CommandOutput::Status(report))).unwrap();

        assert!(value["checked_at"].is_string());
        assert_eq!(value["containers"][0]["name"], "elasticsearch");
        assert_eq!(value["containers"][0]["state"], "running");
    }

    #[test]
    fn test_configured_json_shape() {
        let report = ConfigureReport {
            probe_attempts: 2,
            install: InstallOutcome::Installed { status: 200 },
        };
        let value: Value =
            serde_json::from_str(&format_json(&CommandOutput::Configured(report))).unwrap();

        assert_eq!(value["probe_attempts"], 2);
        assert_eq!(value["prepackaged_rules"]["outcome"], "installed");
        assert_eq!(value["prepackaged_rules"]["status"], 200);
    }
}
