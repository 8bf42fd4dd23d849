//! elastic-container - A local Elastic Stack for detection engineering
//!
//! Runs Elasticsearch, Kibana and Fleet Server as docker containers on a
//! shared network, then waits for Kibana to come up and turns on its
//! detection engine with the prepackaged rule set installed.
//!
//! # Example
//!
//! ```no_run
//! use elastic_container::{configure_kibana, CancelToken, Stack, StackConfig};
//! use elastic_container::docker::DockerCli;
//!
//! let config = StackConfig::default();
//! Stack::new(DockerCli::new(), &config).start().unwrap();
//! let report = configure_kibana(&config, CancelToken::new()).unwrap();
//! println!("ready after {} probes", report.probe_attempts);
//! ```

pub mod cli;
pub mod config;
pub mod docker;
pub mod error;
pub mod output;
pub mod readiness;
pub mod stack;
pub mod telemetry;

pub use config::{Credentials, StackConfig};
pub use error::{Result, StackError};
pub use output::{format_output, CommandOutput, OutputFormat, StatusReport};
pub use readiness::{configure_kibana, CancelToken, ConfigureReport, ConfigureStep, RetryBudget};
pub use stack::{Service, Stack};
