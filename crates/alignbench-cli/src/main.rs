//! `alignbench-cli` – bench commissioning shell.
//!
//! This binary is the entry point for a frame-model commissioning session.
//! It:
//!
//! 1. Checks for `~/.alignbench/config.toml`; runs a **First-Run Wizard**
//!    when the file is absent.
//! 2. Builds the frame model from the configured records file, or the
//!    built-in demo bench when none is set.
//! 3. Drops the operator into an **interactive REPL** with slash-commands
//!    (`/frames`, `/tf`, `/sync`, `/move`, `/save`, `/help`).
//! 4. Intercepts **Ctrl-C** to leave the shell cleanly mid-sequence.

mod config;
mod repl;
mod session;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use session::Session;

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // Initialise tracing-subscriber using RUST_LOG (defaults to "info").
    // Set ALIGNBENCH_LOG_FORMAT=json to emit newline-delimited JSON logs
    // for log aggregators. User-facing output still uses println! for UX
    // consistency.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("ALIGNBENCH_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – leaving the shell …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; Ctrl-C will abort hard");
    }

    // ── First-Run Wizard ──────────────────────────────────────────────────
    match config::load() {
        Ok(None) => run_first_run_wizard(),
        Ok(Some(_)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
        }
    }

    let cfg = config::load().ok().flatten().unwrap_or_default();

    // ── Frame model ───────────────────────────────────────────────────────
    let model = if cfg.frames_path.is_empty() {
        println!("  No frames file configured – assembling the {} bench.", "demo".bold());
        session::demo_model()
    } else {
        print!("  Loading frame records from {} … ", cfg.frames_path.dimmed());
        session::load_records(&cfg.frames_path)
            .and_then(|records| {
                println!("{} ({} record(s))", "ok".green(), records.len());
                session::model_from_records(&records)
            })
            .inspect_err(|e| println!("{}: {}", "failed".red(), e))
    };

    let model = match model {
        Ok(model) => model,
        Err(e) => {
            println!("{}: {}", "Could not build the frame model".red(), e);
            std::process::exit(1);
        }
    };
    println!(
        "  Frame model ready: {} frame(s). Type {} for commands.\n",
        model.len().to_string().bold(),
        "/help".bold().cyan()
    );

    // ── Interactive REPL ──────────────────────────────────────────────────
    let mut session = Session::new(cfg, model);
    repl::run(shutdown, &mut session);
}

// ─────────────────────────────────────────────────────────────────────────────
// First-Run Wizard
// ─────────────────────────────────────────────────────────────────────────────

fn run_first_run_wizard() {
    println!();
    println!("{}", "  ╔══════════════════════════════════════╗".bold().cyan());
    println!("{}", "  ║     Alignbench First-Run Wizard      ║".bold().cyan());
    println!("{}", "  ╚══════════════════════════════════════╝".bold().cyan());
    println!();
    println!("  No configuration found.  Let's set up the bench.\n");

    let mut cfg = config::Config::default();

    let frames = prompt_line(
        "  Frame records JSON file (empty = built-in demo bench): ",
        "",
    );
    cfg.frames_path = frames.trim().to_string();

    let atol = prompt_line(&format!("  Sync absolute tolerance [{}]: ", cfg.atol), "");
    if let Ok(v) = atol.trim().parse::<f64>() {
        cfg.atol = v;
    }

    let rtol = prompt_line(&format!("  Sync relative tolerance [{}]: ", cfg.rtol), "");
    if let Ok(v) = rtol.trim().parse::<f64>() {
        cfg.rtol = v;
    }

    match config::save(&cfg) {
        Ok(()) => println!(
            "\n  {} Config saved to {}\n",
            "✓".green().bold(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"    ___    ___                  __                    __  "#.bold().cyan());
    println!("{}", r#"   /   |  / (_)___ _____  _____/ /_  ___  ____  _____/ /_ "#.bold().cyan());
    println!("{}", r#"  / /| | / / / __ `/ __ \/ ___/ __ \/ _ \/ __ \/ ___/ __ \"#.bold().cyan());
    println!("{}", r#" / ___ |/ / / /_/ / / / / /__/ /_/ /  __/ / / / /__/ / / /"#.bold().cyan());
    println!("{}", r#"/_/  |_/_/_/\__, /_/ /_/\___/_.___/\___/_/ /_/\___/_/ /_/ "#.bold().cyan());
    println!("{}", r#"           /____/                                         "#.bold().cyan());
    println!();
    println!("  {} {}",
        "Alignbench".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Reference-frame commissioning shell");
    println!();
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn prompt_line(msg: &str, default: &str) -> String {
    use std::io::{BufRead, Write};
    print!("{}", msg);
    std::io::stdout().flush().ok();
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(_) => {
            let t = line.trim().to_string();
            if t.is_empty() { default.to_string() } else { t }
        }
        Err(_) => default.to_string(),
    }
}
