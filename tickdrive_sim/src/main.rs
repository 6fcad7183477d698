//! tickdrive CLI
//!
//! Run an interactive road simulation demo under keyboard control.

use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tickdrive_core::{KeyboardPoller, SessionSummary};
use tickdrive_sim::{prepare, DemoOptions, ScenarioId, SimError};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Interactive real-time road simulation demos
#[derive(Parser, Debug)]
#[command(name = "tickdrive")]
#[command(about = "Run a road simulation demo under keyboard control", long_about = None)]
struct Args {
    /// Scenario to run (realtime, crash, keyop, scriptlets)
    #[arg(default_value = "crash")]
    scenario: String,
    
    /// Simulation duration in seconds (negative runs until quit)
    #[arg(short, long, default_value = "-1", allow_negative_numbers = true)]
    duration: f64,
    
    /// Ratio of simulated time to wall-clock time (0 = as fast as possible)
    #[arg(short, long, default_value = "1.0", value_parser = parse_rate)]
    realtime_rate: f64,
    
    /// Start the simulation paused
    #[arg(short, long)]
    paused: bool,
    
    /// Run without a visualizer
    #[arg(short, long)]
    bare: bool,
    
    /// Command that starts the visualizer
    #[arg(long)]
    visualizer: Option<String>,
    
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
    
    /// Print the session summary as JSON
    #[arg(long)]
    json: bool,
}

fn parse_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if !rate.is_finite() || rate < 0.0 {
        return Err(format!("Invalid realtime rate {}: must be >= 0", s));
    }
    Ok(rate)
}

fn run(args: &Args) -> Result<SessionSummary, SimError> {
    let scenario: ScenarioId = args
        .scenario
        .parse()
        .map_err(|_| SimError::UnknownScenario(args.scenario.clone()))?;
    
    let options = DemoOptions {
        duration_secs: args.duration,
        realtime_rate: args.realtime_rate,
        paused: args.paused,
        visualizer: if args.bare { None } else { args.visualizer.clone() },
    };
    
    // Raw mode turns Ctrl-C into a key; the handler covers headless runs.
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;
    
    let keyboard = KeyboardPoller::detect()?;
    let mut demo = prepare(scenario, &options, keyboard, interrupted)?;
    
    if let Some(banner) = scenario.banner() {
        println!("{}", banner);
    }
    
    Ok(demo.scheduler.start(demo.mode)?)
}

fn main() {
    let args = Args::parse();
    
    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
    
    let summary = match run(&args) {
        Ok(summary) => summary,
        Err(SimError::UnknownScenario(name)) => {
            eprintln!("Error: Unknown scenario: {}", name);
            let names: Vec<_> = ScenarioId::all().iter().map(|s| s.name()).collect();
            eprintln!("Available scenarios: {}", names.join(", "));
            std::process::exit(1);
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    
    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to encode summary: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        info!(
            "Session ended ({:?}) after {} ticks, {:.2}s simulated, final rate {:.1}",
            summary.end_reason, summary.ticks, summary.simulated_secs, summary.final_rate
        );
    }
}
