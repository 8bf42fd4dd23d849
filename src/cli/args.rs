//! CLI argument parsing

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "elastic-container")]
#[command(author, version, about = "Stand up a local Elastic stack with detection rules enabled", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubCommand,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (debug logging and echoed docker commands)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub stack: StackArgs,
}

/// Settings shared by every verb. Each one falls back to an environment
/// variable before its default.
#[derive(ClapArgs, Debug, Clone)]
pub struct StackArgs {
    /// Elastic stack version used for every image tag and the kbn-version header
    #[arg(long, env = "STACK_VERSION", default_value = "7.17.9", global = true)]
    pub stack_version: String,

    /// Superuser name for Elasticsearch and Kibana
    #[arg(long, env = "ELASTIC_USERNAME", default_value = "elastic", global = true)]
    pub username: String,

    /// Superuser password for Elasticsearch and Kibana
    #[arg(
        long,
        env = "ELASTIC_PASSWORD",
        default_value = "password",
        hide_env_values = true,
        global = true
    )]
    pub password: String,

    /// Kibana base URL as seen from the host
    #[arg(long, env = "LOCAL_KBN_URL", default_value = "http://localhost:5601", global = true)]
    pub kibana_url: String,

    /// Number of readiness probes before giving up
    #[arg(long, env = "KIBANA_MAX_ATTEMPTS", default_value_t = 15, global = true)]
    pub max_attempts: u32,

    /// Seconds to wait between readiness probes
    #[arg(long, env = "KIBANA_RETRY_DELAY", default_value_t = 40, global = true)]
    pub retry_delay: u64,

    /// Per-request timeout in seconds for Kibana API calls
    #[arg(long, env = "KIBANA_REQUEST_TIMEOUT", default_value_t = 30, global = true)]
    pub request_timeout: u64,

    /// Verify Kibana's TLS certificate (off by default for local stacks)
    #[arg(long, env = "KIBANA_VERIFY_TLS", global = true)]
    pub verify_tls: bool,

    /// Docker network shared by the three containers
    #[arg(long, env = "ELASTIC_NETWORK", default_value = "elastic", global = true)]
    pub network: String,

    /// Kibana saved-objects encryption key (at least 32 characters)
    #[arg(
        long,
        env = "KIBANA_ENCRYPTION_KEY",
        default_value = "elastic-container-local-encryption-key",
        hide_env_values = true,
        global = true
    )]
    pub encryption_key: String,
}

#[derive(Subcommand, Debug)]
pub enum SubCommand {
    /// Pull the Elasticsearch, Kibana and Elastic Agent images
    Stage,

    /// Start the stack, then enable the detection engine and install rules
    Start {
        /// Only start the containers; skip the Kibana configuration step
        #[arg(long)]
        no_configure: bool,
    },

    /// Stop and remove the containers and the network
    Stop,

    /// Restart the three containers
    Restart,

    /// Show the state of the three containers
    Status,

    /// Wait for a running Kibana, then enable the detection engine and install rules
    Configure,
}
