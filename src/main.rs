//! elastic-container CLI - Manage a local Elastic Stack

use clap::Parser;
use tracing::{info, warn};

use elastic_container::cli::{Args, SubCommand};
use elastic_container::docker::DockerCli;
use elastic_container::{
    configure_kibana, format_output, telemetry, CancelToken, CommandOutput, OutputFormat, Stack,
    StackConfig, StatusReport,
};

fn main() {
    let args = Args::parse();
    telemetry::init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(args: Args) -> elastic_container::Result<()> {
    let config = StackConfig::from_args(&args.stack)?;
    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let stack = Stack::new(DockerCli::new(), &config);

    match args.command {
        SubCommand::Stage => stack.stage(),

        SubCommand::Start { no_configure } => {
            stack.start()?;
            if no_configure {
                info!("Skipping Kibana configuration");
                return Ok(());
            }
            configure(&config, &format)
        }

        SubCommand::Stop => stack.stop(),

        SubCommand::Restart => stack.restart(),

        SubCommand::Status => {
            let rows = stack.status()?;
            let report = StatusReport::new(rows);
            println!("{}", format_output(&CommandOutput::Status(report), &format));
            Ok(())
        }

        SubCommand::Configure => configure(&config, &format),
    }
}

fn configure(config: &StackConfig, format: &OutputFormat) -> elastic_container::Result<()> {
    let cancel = CancelToken::new();
    if let Err(e) = cancel.install_ctrlc_handler() {
        warn!(error = %e, "Ctrl+C will not interrupt the wait");
    }

    let report = configure_kibana(config, cancel)?;
    println!("{}", format_output(&CommandOutput::Configured(report), format));
    Ok(())
}
