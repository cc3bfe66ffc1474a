//! # jsbridge CLI Entry Point
//!
//! ## Usage
//!
//! ```bash
//! # Evaluate a script file
//! jsbridge run script.js
//!
//! # Evaluate inline source, reporting the outcome as JSON
//! jsbridge --json eval "Promise.resolve(1 + 2)"
//!
//! # Compile once, run many times
//! jsbridge compile script.js -o script.qjsb
//! jsbridge exec script.qjsb
//!
//! # Interactive session with a 16 MiB heap and no network
//! jsbridge --memory-limit 16m --offline repl
//! ```
//!
//! Values are printed to stdout; failures are printed to stderr in the same
//! text the Android bridge returns, and the process exits with status 1.

use anyhow::{Context, Result};
use argh::FromArgs;
use jsbridge_cli::config::resolve_limits;
use jsbridge_cli::http_host::ReqwestHostBridge;
use jsbridge_engine::{EngineSession, ExecutionOutcome, HostBridge};
use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Main CLI structure parsed from command-line arguments.
#[derive(FromArgs)]
/// jsbridge - run JavaScript and QuickJS bytecode the way the Android bridge does
struct Cli {
    /// runtime memory limit in bytes (k/m/g suffix); overrides JSBRIDGE_MEMORY_LIMIT, default 64m
    #[argh(option, long = "memory-limit")]
    memory_limit: Option<String>,

    /// allocated size that triggers garbage collection; overrides JSBRIDGE_GC_THRESHOLD, default 1m
    #[argh(option, long = "gc-threshold")]
    gc_threshold: Option<String>,

    /// disable network access from scripts
    #[argh(switch)]
    offline: bool,

    /// print outcomes as JSON objects
    #[argh(switch)]
    json: bool,

    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Run(RunArgs),
    Eval(EvalArgs),
    Compile(CompileArgs),
    Exec(ExecArgs),
    Repl(ReplArgs),
}

#[derive(FromArgs)]
#[argh(subcommand, name = "run")]
/// evaluate a script file
struct RunArgs {
    /// path to the JavaScript file
    #[argh(positional)]
    script: PathBuf,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "eval")]
/// evaluate inline source text
struct EvalArgs {
    /// javascript source text
    #[argh(positional)]
    source: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "compile")]
/// compile a script file to bytecode without running it
struct CompileArgs {
    /// path to the JavaScript file
    #[argh(positional)]
    script: PathBuf,

    /// output path (defaults to the script path with a .qjsb extension)
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "exec")]
/// run a compiled bytecode file
struct ExecArgs {
    /// path to the bytecode file
    #[argh(positional)]
    bytecode: PathBuf,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "repl")]
/// start an interactive session
struct ReplArgs {}

fn main() -> Result<ExitCode> {
    let cli: Cli = argh::from_env();

    // Logs go to stderr so stdout carries only script results.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let limits = resolve_limits(cli.memory_limit.as_deref(), cli.gc_threshold.as_deref())?;

    let host: Option<Arc<dyn HostBridge>> = if cli.offline {
        None
    } else {
        Some(Arc::new(ReqwestHostBridge::new()?))
    };

    let mut session = EngineSession::new(host);
    session
        .initialize(limits)
        .context("Failed to initialize QuickJS")?;

    let succeeded = match cli.command {
        Commands::Run(args) => {
            let source = std::fs::read_to_string(&args.script)
                .with_context(|| format!("Failed to read {}", args.script.display()))?;
            report(&session.evaluate(&source), cli.json)?
        }
        Commands::Eval(args) => report(&session.evaluate(&args.source), cli.json)?,
        Commands::Compile(args) => run_compile(&session, args, cli.json)?,
        Commands::Exec(args) => {
            let bytes = std::fs::read(&args.bytecode)
                .with_context(|| format!("Failed to read {}", args.bytecode.display()))?;
            report(&session.evaluate_bytecode(&bytes), cli.json)?
        }
        Commands::Repl(_) => run_repl(&mut session, cli.json)?,
    };

    session.teardown();
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Prints an outcome; returns whether it was a success.
fn report(outcome: &ExecutionOutcome, json: bool) -> Result<bool> {
    if json {
        println!("{}", serde_json::to_string(outcome)?);
    } else {
        match outcome {
            ExecutionOutcome::Value { value } => println!("{}", value),
            ExecutionOutcome::Failure(_) => eprintln!("{}", outcome.to_host_string()),
        }
    }

    Ok(outcome.is_success())
}

/// Executes the `compile` subcommand.
///
/// A script that fails to compile is reported like any other failure and
/// nothing is written.
fn run_compile(session: &EngineSession, args: CompileArgs, json: bool) -> Result<bool> {
    let source = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read {}", args.script.display()))?;

    let unit = match session.compile(&source) {
        Ok(unit) => unit,
        Err(failure) => return report(&ExecutionOutcome::from(failure), json),
    };

    let output = args
        .output
        .unwrap_or_else(|| args.script.with_extension("qjsb"));
    std::fs::write(&output, unit.as_bytes())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!("Wrote {} bytes of bytecode to {}", unit.len(), output.display());
    if json {
        println!(
            "{}",
            serde_json::json!({ "output": output.display().to_string(), "bytes": unit.len() })
        );
    }

    Ok(true)
}

/// Executes the `repl` subcommand.
///
/// Each line is evaluated on its own. Dot commands:
/// - `.reset` replaces the context
/// - `.mem` prints the runtime's memory counters
/// - `.exit` ends the session (as does end of input)
///
/// The exit status reflects the last evaluated line.
fn run_repl(session: &mut EngineSession, json: bool) -> Result<bool> {
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();
    let mut succeeded = true;

    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("> ");
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let line = line.trim();

        match line {
            "" => continue,
            ".exit" => break,
            ".reset" => match session.reset() {
                Ok(()) => println!("Context reset"),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    succeeded = false;
                }
            },
            ".mem" => match session.memory_stats() {
                Some(stats) => println!("{}", serde_json::to_string(&stats)?),
                None => eprintln!("Error: QuickJS not initialized"),
            },
            source => succeeded = report(&session.evaluate(source), json)?,
        }
    }

    Ok(succeeded)
}
