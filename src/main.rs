// Door Access Control - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/door-access-control --credential 74984 --action unlock_shortly --door D3
// ```
//
// Or replay a request file and watch the clock expire the doors:
//
// ```console
// $ ./target/release/door-access-control --requests requests.jsonl --hold-secs 12 --list-doors
// ```

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use door_access_control::control::{
    bootstrap, AccessRequest, AreaRequest, Clock, LoggingConfig, LoggingGuard, RequestLine,
    RequestProcessor,
};
use door_access_control::types::config::CliArgs;
use door_access_control::types::{now, parse_moment, ControlConfig, Moment};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

fn main() {
    let args = CliArgs::parse();

    if args.print_config {
        match ControlConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: CliArgs) -> anyhow::Result<()> {
    let config =
        ControlConfig::from_cli_args(args.clone()).context("failed to load configuration")?;
    let _logging = init_logging(&args, &config)?;

    config.validate().context("configuration validation failed")?;
    info!("Configuration loaded and validated successfully");

    if args.dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - no requests will be processed.");
        print_configuration_summary(&config);
        return Ok(());
    }

    let at = args
        .at
        .as_deref()
        .map(parse_moment)
        .transpose()
        .context("--at must look like \"YYYY-MM-DD HH:MM:SS\"")?;
    let today = at.unwrap_or_else(now).date();

    let clock = Arc::new(Clock::from_config(&config));
    let processor = bootstrap::demo_building_with(today, config.default_door_closed)?
        .into_processor(clock.clone())?;
    let handle = Clock::start(clock, Arc::clone(processor.doors()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(path) = &args.requests {
        process_request_file(&processor, path, at, &mut out)?;
    } else if let Some(credential) = &args.credential {
        let action = args.action.as_deref().ok_or_else(|| anyhow!("--action is required"))?;
        match (&args.door, &args.area) {
            (Some(door), _) => {
                let request = AccessRequest::new(credential.as_str(), action, door.as_str());
                let result = processor.process_at(&request, at.unwrap_or_else(now))?;
                print_json_line(&mut out, &result)?;
            }
            (None, Some(area)) => {
                let request = AreaRequest::new(credential.as_str(), action, area.as_str());
                let result = processor.process_area_at(&request, at.unwrap_or_else(now))?;
                print_json_line(&mut out, &result)?;
            }
            (None, None) => bail!("either --door or --area is required"),
        }
    } else if !args.list_doors {
        bail!("nothing to do: pass --credential with --action, --requests or --list-doors");
    }

    if args.hold_secs > 0 {
        info!(secs = args.hold_secs, "Holding so the clock can expire doors");
        thread::sleep(Duration::from_secs(args.hold_secs));
    }

    if args.list_doors {
        for snapshot in processor.doors().snapshots()? {
            print_json_line(&mut out, &snapshot)?;
        }
    }

    handle.stop()?;
    info!("Door access control finished");
    Ok(())
}

fn init_logging(args: &CliArgs, config: &ControlConfig) -> anyhow::Result<LoggingGuard> {
    let result = if args.debug {
        LoggingConfig::init_debug()
    } else if args.verbose {
        LoggingConfig::init_verbose()
    } else if let Some(dir) = &config.log_directory {
        LoggingConfig::init_prod(dir.as_str())
    } else {
        // Default: minimal logging for normal users
        let mut logging = LoggingConfig::new().with_level(tracing::Level::WARN);
        if config.json_logs {
            logging = logging.with_json_format();
        }
        logging.init()
    };

    result.map_err(|e| anyhow!("failed to initialize logging: {}", e))
}

/// Process one JSON request per line; blank lines are skipped and malformed
/// lines are reported without stopping the run.
fn process_request_file(
    processor: &RequestProcessor,
    path: &str,
    at: Option<Moment>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let file = File::open(path).with_context(|| format!("failed to open request file {}", path))?;

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {}", path))?;
        if line.trim().is_empty() {
            continue;
        }

        let moment = at.unwrap_or_else(now);
        match serde_json::from_str::<RequestLine>(&line) {
            Ok(RequestLine::Door(request)) => {
                print_json_line(&mut *out, &processor.process_at(&request, moment)?)?;
            }
            Ok(RequestLine::Area(request)) => {
                print_json_line(&mut *out, &processor.process_area_at(&request, moment)?)?;
            }
            Err(e) => warn!(line = index + 1, error = %e, "Skipping malformed request"),
        }
    }

    Ok(())
}

fn print_json_line(out: &mut impl Write, value: &impl Serialize) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Print configuration summary
fn print_configuration_summary(config: &ControlConfig) {
    eprintln!("Configuration:");
    eprintln!("  Tick Interval: {} ms", config.tick_interval_ms);
    eprintln!("  Unlock-Shortly Period: {} s", config.unlock_shortly_secs);
    eprintln!("  Doors Start Closed: {}", config.default_door_closed);
    if let Some(dir) = &config.log_directory {
        eprintln!("  Log Directory: {}", dir);
    }
    eprintln!("  JSON Logs: {}", config.json_logs);
    eprintln!();
}
