// # ons - OVH Name Server records manager
//
// This binary is a thin layer over ons-core:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the OVH zone API into the Reconciler
// 4. Printing plans, listings and apply progress
//
// ## Commands
//
// - `ons ls [--json]`: list the live A records, `*` marks declared ones
// - `ons add <subdomain> <ip>`: declare a record, then show the plan
// - `ons rm <subdomain> [ip]`: undeclare a record, then show the plan
// - `ons plan`: show what apply would change
// - `ons apply`: change the DNS zone
//
// ## Example
//
// ```bash
// export ONS_ZONE=example.com
// export ONS_AK=... ONS_AS=... ONS_CK=...
//
// ons add www 1.2.3.4
// ons apply
// ```

mod report;
mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ons_core::Reconciler;
use ons_provider_ovh::OvhZoneApi;
use report::Reporter;
use settings::Settings;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Success
/// - 1: Configuration error
/// - 2: Runtime error (provider, persistence, rejected edit)
#[derive(Debug, Clone, Copy)]
enum OnsExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<OnsExitCode> for ExitCode {
    fn from(code: OnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Declare, plan and apply OVH DNS A records
#[derive(Parser)]
#[command(name = "ons", version, about)]
struct Cli {
    /// DNS zone to manage (overrides ONS_ZONE)
    #[arg(long, global = true)]
    zone: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the A records of the zone
    Ls {
        /// Dump the live records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Declare a record
    Add {
        /// Sub-domain, e.g. `www`
        sub_domain: String,
        /// IPv4 target
        ip: String,
    },

    /// Undeclare all targets of a sub-domain, or only one
    Rm {
        sub_domain: String,
        ip: Option<String>,
    },

    /// Show the execution plan
    Plan,

    /// Change the DNS zone
    Apply,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration from environment
    let settings = match Settings::from_env() {
        Ok(settings) => settings.with_zone(cli.zone.clone()),
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return OnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = settings.validate() {
        eprintln!("Configuration validation error: {}", e);
        return OnsExitCode::ConfigError.into();
    }

    // Initialize tracing on stderr so stdout only carries command output
    let log_level = settings.level().unwrap_or(tracing::Level::WARN);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return OnsExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return OnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(cli.command, settings).await {
            Ok(()) => OnsExitCode::Success,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                exit_code_for(&e)
            }
        }
    })
    .into()
}

/// Configuration problems found only once the library inspects them
fn exit_code_for(err: &anyhow::Error) -> OnsExitCode {
    match err.downcast_ref::<ons_core::Error>() {
        Some(ons_core::Error::Config(_)) => OnsExitCode::ConfigError,
        _ => OnsExitCode::RuntimeError,
    }
}

async fn run(command: Command, settings: Settings) -> Result<()> {
    let config = settings.to_config();
    config.validate()?;

    let api = OvhZoneApi::new(&config.provider)?;
    debug!("Using {:?}", api);

    let (mut reconciler, events) =
        Reconciler::open(Box::new(api), &config.store, config.reconciler).await?;

    let reporter = Reporter::stdout();
    let printer = tokio::spawn(report::print_events(events, reporter));

    let result = execute(&mut reconciler, command, &settings.zone, reporter).await;

    // Closing the event channel lets the printer finish before the summary.
    drop(reconciler);
    if let Err(e) = printer.await {
        error!("Event printer failed: {}", e);
    }

    for line in result? {
        println!("{}", line);
    }
    Ok(())
}

/// Run one command, returning the lines to print once progress is flushed
async fn execute(
    reconciler: &mut Reconciler,
    command: Command,
    zone: &str,
    reporter: Reporter,
) -> Result<Vec<String>> {
    match command {
        Command::Ls { json } => {
            let listed = reconciler.list(zone).await?;
            if json {
                return Ok(vec![serde_json::to_string_pretty(&listed)?]);
            }
            Ok(listed.iter().map(|l| reporter.listed_line(l)).collect())
        }
        Command::Add { sub_domain, ip } => {
            reconciler.add(zone, &sub_domain, &ip).await?;
            show_plan(reconciler, zone, reporter).await
        }
        Command::Rm { sub_domain, ip } => {
            reconciler.remove(zone, &sub_domain, ip.as_deref()).await?;
            show_plan(reconciler, zone, reporter).await
        }
        Command::Plan => show_plan(reconciler, zone, reporter).await,
        Command::Apply => {
            println!("Refreshing DNS zone state prior to apply...\n");
            let outcome = reconciler.apply(zone).await?;

            let mut lines = Vec::new();
            if outcome.edits() + outcome.forgotten > 0 {
                lines.push(String::new());
            }
            lines.push(reporter.apply_summary(&outcome));
            Ok(lines)
        }
    }
}

async fn show_plan(
    reconciler: &mut Reconciler,
    zone: &str,
    reporter: Reporter,
) -> Result<Vec<String>> {
    println!("Refreshing DNS zone state prior to plan...\n");
    let plan = reconciler.plan(zone).await?;

    let mut lines = reporter.plan_lines(&plan);
    if !plan.is_empty() {
        lines.push(String::new());
    }
    lines.push(reporter.plan_summary(&plan));
    Ok(lines)
}
