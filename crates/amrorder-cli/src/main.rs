use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use colored::Colorize;

use amrorder_core::{line, prepass, Config, Mode, WalkStats, Walker};

/// amrorder — AMR word-order canonicalizer
///
/// Prepare, reorder, and prune variable-free AMRs, one per line.
#[derive(Parser)]
#[command(name = "amrorder", version, about, long_about = None)]
struct Cli {
    /// Suppress the summary on stderr
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pre-pass: raw multi-line AMRs to variable-free single lines
    Prepare {
        /// Path to annotated AMR file (blocks separated by blank lines)
        file: PathBuf,
        /// Keep :wiki attributes
        #[arg(long)]
        keep_wiki: bool,
        /// Write harvested sentences to this file
        #[arg(long)]
        sent: Option<PathBuf>,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Reorder siblings toward sentence word order
    Order {
        /// Path to variable-free, aligned, one-AMR-per-line file
        file: PathBuf,
        /// Maximum siblings before bucketing the tail
        #[arg(long, default_value_t = 15)]
        cutoff: usize,
        /// RNG seed for reproducible bucketing
        #[arg(long)]
        seed: Option<u64>,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Machine-readable summary on stdout-adjacent stderr
        #[arg(long)]
        json: bool,
    },

    /// Remove duplicated sibling and global substructure
    Prune {
        /// Path to one-AMR-per-line file
        file: PathBuf,
        /// Maximum siblings before bucketing the tail
        #[arg(long, default_value_t = 15)]
        cutoff: usize,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Machine-readable summary on stderr
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Prepare {
            file,
            keep_wiki,
            sent,
            output,
        } => run_prepare(&file, keep_wiki, sent.as_deref(), output.as_deref(), cli.quiet),
        Commands::Order {
            file,
            cutoff,
            seed,
            output,
            json,
        } => run_walk(
            &file,
            Config {
                mode: Mode::Order,
                cutoff,
                seed,
            },
            output.as_deref(),
            json,
            cli.quiet,
        ),
        Commands::Prune {
            file,
            cutoff,
            output,
            json,
        } => run_walk(
            &file,
            Config {
                mode: Mode::Prune,
                cutoff,
                seed: None,
            },
            output.as_deref(),
            json,
            cli.quiet,
        ),
        Commands::Version => {
            println!(
                "amrorder {} (amrorder-core {})",
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_VERSION")
            );
            0
        }
    };

    process::exit(exit_code);
}

fn run_prepare(
    file: &Path,
    keep_wiki: bool,
    sent: Option<&Path>,
    output: Option<&Path>,
    quiet: bool,
) -> i32 {
    let text = match fs::read_to_string(file) {
        Ok(t) => t,
        Err(e) => return fail(&format!("cannot read {}: {}", file.display(), e)),
    };

    let (amrs, sents) = prepass::var_free_lines(&text, keep_wiki);

    if let Some(sent_path) = sent {
        if sents.len() != amrs.len() {
            return fail(&format!(
                "sentence/AMR count mismatch: {} sentences for {} AMRs",
                sents.len(),
                amrs.len()
            ));
        }
        if let Err(e) = write_lines(sent_path, &sents) {
            return fail(&format!("cannot write {}: {}", sent_path.display(), e));
        }
    }

    if let Err(e) = emit_lines(output, &amrs) {
        return fail(&e);
    }

    if !quiet {
        eprintln!(
            "{} {} AMRs ({} sentences)",
            "prepared".green(),
            amrs.len(),
            sents.len()
        );
    }
    0
}

fn run_walk(file: &Path, config: Config, output: Option<&Path>, json: bool, quiet: bool) -> i32 {
    let text = match fs::read_to_string(file) {
        Ok(t) => t,
        Err(e) => return fail(&format!("cannot read {}: {}", file.display(), e)),
    };

    let mut walker = match Walker::new(&config) {
        Ok(w) => w,
        Err(e) => return fail(&e.to_string()),
    };

    let mut out_lines = Vec::new();
    let mut changed = 0usize;
    let mut total = 0usize;
    for input in text.lines() {
        total += 1;
        let canonical = walker.process(input);
        // A line counts as changed only when its structure moved, not when
        // alignments were merely stripped
        let baseline = match config.mode {
            Mode::Order => line::finalize(input),
            Mode::Prune => {
                line::normalize_whitespace(&prepass::strip_inline_variables(input.trim()))
            }
        };
        if canonical != baseline {
            changed += 1;
        }
        out_lines.push(canonical);
    }

    if let Err(e) = emit_lines(output, &out_lines) {
        return fail(&e);
    }

    report(walker.stats(), changed, total, json, quiet);
    0
}

fn report(stats: WalkStats, changed: usize, total: usize, json: bool, quiet: bool) {
    if quiet {
        return;
    }
    if json {
        let summary = serde_json::json!({
            "lines": total,
            "changed": changed,
            "structural_ambiguity": stats.structural_ambiguity,
            "bucketed": stats.bucketed,
            "dropped_duplicates": stats.dropped_duplicates,
        });
        eprintln!("{}", summary);
    } else {
        eprintln!(
            "{} {} out of {} AMRs",
            "changed".green(),
            changed,
            total
        );
        if stats.structural_ambiguity > 0 {
            eprintln!(
                "{} {} nodes passed through unmodified",
                "ambiguous:".yellow(),
                stats.structural_ambiguity
            );
        }
    }
}

fn emit_lines(output: Option<&Path>, lines: &[String]) -> Result<(), String> {
    match output {
        Some(path) => {
            write_lines(path, lines).map_err(|e| format!("cannot write {}: {}", path.display(), e))
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            for line in lines {
                if writeln!(handle, "{}", line).is_err() {
                    return Err("cannot write to stdout".to_string());
                }
            }
            Ok(())
        }
    }
}

fn write_lines(path: &Path, lines: &[String]) -> std::io::Result<()> {
    let mut body = lines.join("\n");
    body.push('\n');
    fs::write(path, body)
}

fn fail(message: &str) -> i32 {
    eprintln!("{} {}", "error:".red(), message);
    2
}
