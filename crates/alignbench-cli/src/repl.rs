//! REPL – interactive shell for bench commissioning.
//!
//! Supported slash-commands:
//!   /help             – show this list
//!   /frames           – print the frame model summary
//!   /tf <a> <b>       – resolved transform a → b as vectors
//!   /link <a> <b>     – register an explicit link
//!   /configure        – push user/object frames to the stage
//!   /sync             – compare stage positions against the model
//!   /move x y z [rx ry rz]  – commanded relative move (stage + model)
//!   /drift x y z [rx ry rz] – uncommanded stage motion (sim only)
//!   /save [path] /load [path] – write / read the setup file
//!   /quit | /exit     – leave the shell

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use alignbench_hal::MotionStage;

use crate::session::Session;

/// Entry point for the interactive REPL.
///
/// `shutdown` is polled each iteration; when set the REPL exits cleanly.
pub fn run(shutdown: Arc<AtomicBool>, session: &mut Session) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "alignbench>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&cmd, args)) = parts.split_first() else {
            continue;
        };

        match cmd {
            "/help" => cmd_help(),
            "/frames" => print!("{}", session.model.summary()),
            "/tf" => cmd_tf(session, args),
            "/link" => cmd_link(session, args),
            "/configure" => cmd_configure(session),
            "/sync" => cmd_sync(session),
            "/move" => cmd_move(session, args, false),
            "/drift" => cmd_move(session, args, true),
            "/save" => cmd_save(session, args),
            "/load" => cmd_load(session, args),
            "/quit" | "/exit" => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            other => {
                println!(
                    "{} '{}'. Type {} for available commands.",
                    "Unknown command:".red(),
                    other.yellow(),
                    "/help".bold()
                );
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "Alignbench Commands".bold().underline());
    println!("  {}              – print the frame model summary", "/frames".bold().cyan());
    println!("  {}          – resolved transform a → b", "/tf <a> <b>".bold().cyan());
    println!("  {}        – register an explicit link", "/link <a> <b>".bold().cyan());
    println!("  {}           – push user/object frames to the stage", "/configure".bold().cyan());
    println!("  {}                – compare stage against model", "/sync".bold().cyan());
    println!("  {}  – commanded relative move", "/move x y z [rx ry rz]".bold().cyan());
    println!("  {} – uncommanded stage drift (sim)", "/drift x y z [rx ry rz]".bold().cyan());
    println!("  {}        – write / read the setup file", "/save  /load".bold().cyan());
    println!("  {}         – leave the shell", "/quit  /exit".bold().cyan());
    println!();
}

fn cmd_tf(session: &Session, args: &[&str]) {
    let [from, to] = args else {
        println!("{}", "Usage: /tf <from> <to>".yellow());
        return;
    };
    match session.model.get_translation_rotation_vectors(from, to) {
        Ok((t, r)) => print_vectors(&session.cfg, from, to, t, r),
        Err(e) => println!("{}: {}", "Error".red(), e),
    }
}

fn cmd_link(session: &mut Session, args: &[&str]) {
    let [a, b] = args else {
        println!("{}", "Usage: /link <a> <b>".yellow());
        return;
    };
    match session.model.add_link(a, b) {
        Ok(()) => println!("{} {} ↔ {}", "✓ linked".green(), a.bold(), b.bold()),
        Err(e) => println!("{}: {}", "Error".red(), e),
    }
}

fn cmd_configure(session: &mut Session) {
    match session.configure_stage() {
        Ok(()) => println!(
            "{} stage '{}' configured: usr={} obj={}",
            "✓".green(),
            session.stage.id().bold(),
            session.cfg.sync_from.bold(),
            session.cfg.sync_to.bold()
        ),
        Err(e) => println!("{}: {}", "Error".red(), e),
    }
}

fn cmd_sync(session: &Session) {
    let report = match session.sync_check() {
        Ok(r) => r,
        Err(e) => {
            println!("{}: {}", "Error".red(), e);
            return;
        }
    };
    let n = session.cfg.rounding;
    println!("  Stage : {}", fmt_vec6(report.measured, n));
    println!("  Model : {}", fmt_vec6(report.computed, n));
    println!("  Diff  : {}", fmt_vec6(report.deltas, n));
    if report.in_sync {
        println!("  {} model and stage agree", "IN SYNC".green().bold());
    } else {
        println!("  {} model and stage disagree", "OUT OF SYNC".red().bold());
    }
}

fn cmd_move(session: &mut Session, args: &[&str], drift: bool) {
    let Some((t, r)) = parse_move_args(args) else {
        println!("{}", "Usage: /move x y z [rx ry rz]  (mm, deg)".yellow());
        return;
    };
    let result = if drift {
        session.drift(t, r)
    } else {
        session.move_relative(t, r)
    };
    match result {
        Ok(()) => {
            let verb = if drift { "drifted" } else { "moved" };
            println!("{} stage {}: t={:?} r={:?}", "✓".green(), verb, t, r);
        }
        Err(e) => println!("{}: {}", "Error".red(), e),
    }
}

fn cmd_save(session: &Session, args: &[&str]) {
    let path = args.first().copied().unwrap_or(&session.cfg.setup_path);
    match session.save_setup(path) {
        Ok(()) => println!("{} setup saved to {}", "✓".green(), path.bold()),
        Err(e) => println!("{}: {}", "Error saving setup".red(), e),
    }
}

fn cmd_load(session: &mut Session, args: &[&str]) {
    let path = args.first().copied().unwrap_or(&session.cfg.setup_path).to_string();
    match session.load_setup(&path) {
        Ok(saved_at) => println!(
            "{} setup from {} (saved {})",
            "✓".green(),
            path.bold(),
            saved_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        Err(e) => println!("{}: {}", "Error loading setup".red(), e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn parse_move_args(args: &[&str]) -> Option<([f64; 3], [f64; 3])> {
    if args.len() != 3 && args.len() != 6 {
        return None;
    }
    let mut values = [0.0; 6];
    for (i, raw) in args.iter().enumerate() {
        values[i] = raw.parse().ok()?;
    }
    Some((
        [values[0], values[1], values[2]],
        [values[3], values[4], values[5]],
    ))
}

fn print_vectors(
    cfg: &crate::config::Config,
    from: &str,
    to: &str,
    t: [f64; 3],
    r: [f64; 3],
) {
    let n = cfg.rounding;
    println!(
        "  {:<10} -> {:<10} Trans [{:.n$}, {:.n$}, {:.n$}]   Rot [{:.n$}, {:.n$}, {:.n$}]",
        from.bold(),
        to.bold(),
        t[0],
        t[1],
        t[2],
        r[0],
        r[1],
        r[2],
    );
}

fn fmt_vec6(v: [f64; 6], rounding: usize) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{:>10.rounding$}", x)).collect();
    format!("[{}]", parts.join(", "))
}
