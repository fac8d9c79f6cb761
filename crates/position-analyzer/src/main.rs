//! chess-analyzer: one-shot position analysis from the command line
//!
//! Usage:
//!   chess-analyzer                          # prompt, or read stdin
//!   chess-analyzer e4 e5 Nf3                # after a move sequence
//!   chess-analyzer start                    # starting position
//!   chess-analyzer "<FEN>"                  # a specific position
//!   chess-analyzer --samples                # built-in sample positions

use std::io::{self, IsTerminal, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chess_core::position::parse_position;
use position_analyzer::analysis::analyze;
use position_analyzer::config::{AnalyzerConfig, ConfigOverrides};
use position_analyzer::error::AnalyzerError;
use position_analyzer::report::{build_report, render_json, render_text, AnalysisReport, GameStatus};
use position_analyzer::samples::analyze_samples;
use position_analyzer::stockfish::StockfishEngine;

const BANNER_WIDTH: usize = 60;

#[derive(Parser, Debug)]
#[command(
    name = "chess-analyzer",
    version,
    about = "Analyse a chess position with a UCI engine and explain the top moves"
)]
struct Args {
    /// FEN, move list (e4 e5 Nf3) or "start". Read from stdin when omitted
    position: Vec<String>,

    /// Path to the engine binary (overrides STOCKFISH_PATH)
    #[arg(long)]
    engine: Option<String>,

    /// Search depth
    #[arg(short, long)]
    depth: Option<u32>,

    /// Search by move time instead of depth
    #[arg(long, value_name = "MS")]
    movetime: Option<u64>,

    /// Number of candidate moves
    #[arg(short = 'n', long)]
    lines: Option<u32>,

    /// Principal variation plies shown per candidate
    #[arg(long)]
    pv_plies: Option<usize>,

    /// Engine threads
    #[arg(long)]
    threads: Option<u32>,

    /// Engine hash size
    #[arg(long, value_name = "MB")]
    hash: Option<u32>,

    /// Give up on the engine after this long
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Disable ANSI colours
    #[arg(long)]
    no_color: bool,

    /// Analyse the built-in sample positions
    #[arg(long, conflicts_with = "position")]
    samples: bool,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            stockfish_path: self.engine.clone(),
            depth: self.depth,
            movetime_ms: self.movetime,
            multipv: self.lines,
            pv_plies: self.pv_plies,
            threads: self.threads,
            hash_mb: self.hash,
            timeout_secs: self.timeout,
            no_color: self.no_color,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout only carries the report
fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<AnalyzerError>() {
        Some(e) if e.is_input_error() => eprintln!("Error parsing position: {e}"),
        Some(e) => eprintln!("Analysis error: {e}"),
        None => eprintln!("Analysis error: {err:#}"),
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = AnalyzerConfig::load()?;
    config.apply_overrides(args.overrides())?;
    let colored = config.color && io::stdout().is_terminal();

    if args.samples {
        return run_samples(&config, args.json, colored).await;
    }

    let input = if args.position.is_empty() {
        read_input()?
    } else {
        args.position.join(" ")
    };
    let parsed = parse_position(&input).map_err(AnalyzerError::from)?;
    info!(kind = ?parsed.kind, plies = parsed.moves.len(), "Position parsed");

    let report = if GameStatus::of(&parsed.position).is_finished() {
        build_report(&parsed, &[], config.pv_plies)
    } else {
        let mut engine = StockfishEngine::new(&config.stockfish_path, &config.engine).await?;
        let result = analyze(&mut engine, &parsed, &config).await;
        engine.quit().await;
        result?
    };

    print_report(&report, args.json, colored)?;
    Ok(())
}

async fn run_samples(config: &AnalyzerConfig, json: bool, colored: bool) -> anyhow::Result<()> {
    let mut engine = StockfishEngine::new(&config.stockfish_path, &config.engine).await?;
    let outcomes = analyze_samples(&mut engine, config).await;
    engine.quit().await;

    let rule = "=".repeat(BANNER_WIDTH);
    for outcome in outcomes {
        println!("\n{rule}");
        println!("Testing: {}", outcome.description);
        println!("Input: {}", outcome.input);
        println!("{rule}");

        match outcome.result {
            Ok(report) => print_report(&report, json, colored)?,
            Err(e) => println!("Error: {e}"),
        }
    }
    Ok(())
}

/// Prompt on a terminal, otherwise take everything piped in
fn read_input() -> Result<String, AnalyzerError> {
    let stdin = io::stdin();
    let mut input = String::new();

    if stdin.is_terminal() {
        eprint!("Position (FEN, moves, or blank for the starting position): ");
        io::stderr().flush()?;
        stdin.read_line(&mut input)?;
    } else {
        stdin.lock().read_to_string(&mut input)?;
    }

    Ok(input)
}

fn print_report(report: &AnalysisReport, json: bool, colored: bool) -> Result<(), AnalyzerError> {
    let mut stdout = io::stdout().lock();
    if json {
        writeln!(stdout, "{}", render_json(report)?)?;
    } else {
        write!(stdout, "{}", render_text(report, colored))?;
    }
    stdout.flush()?;
    Ok(())
}
