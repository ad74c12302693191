use perfmap::cli::commands::{handle_analyze, handle_discover, CliArgs, Commands};
use perfmap::config::PerfmapConfig;
use perfmap::util::logging::{self, LoggingConfig};
use perfmap::{NAME, VERSION};

use clap::Parser;
use std::process;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Discover(discover_args) => handle_discover(discover_args, args.quiet).await,
        Commands::Analyze(analyze_args) => handle_analyze(analyze_args, args.quiet).await,
    };

    process::exit(exit_code);
}

/// Command-line flags win over the PERFMAP_* environment.
fn init_logging_from_args(args: &CliArgs) {
    let config = PerfmapConfig::default();
    let mut logging_config = LoggingConfig::from(&config);

    if let Some(level_str) = &args.log_level {
        logging_config.level = logging::parse_level(level_str);
    } else if args.verbose {
        logging_config.level = Level::DEBUG;
    } else if args.quiet {
        logging_config.level = Level::ERROR;
    }

    logging::init_logging(logging_config);
}
