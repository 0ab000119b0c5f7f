//! Thin driver for the kbpatch core library.
//!
//! Locates input paths, performs the file I/O the core deliberately leaves
//! out, and writes the augmented collections.  Two subcommands mirror the two
//! batch jobs:
//!
//! - `kbpatch patch <flat.json> <model.json>` — reconcile the two knowledge
//!   bases and write `<stem>.patched.json` siblings.
//! - `kbpatch rank <libs.csv>` — write a `<stem>.ranked.txt` white list of
//!   package identifiers ordered by popularity.
//!
//! On any fatal error no output file is written.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use kbpatch_core::errors::KbResult;
use kbpatch_core::models::{FlatRecord, ModelRecord};
use kbpatch_core::rank::rank_libraries;
use kbpatch_core::reconcile::reconcile;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Patch {
        flat_path: PathBuf,
        model_path: PathBuf,
        flat_out: Option<PathBuf>,
        model_out: Option<PathBuf>,
    },
    Rank {
        csv_path: PathBuf,
        out: Option<PathBuf>,
    },
    Help,
}

fn main() {
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    let exit_code = run(std::env::args_os(), &mut stdout, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run<I, W, E>(args: I, out: &mut W, err: &mut E) -> i32
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let command = match parse_args(args) {
        Ok(command) => command,
        Err(message) => {
            let _ = writeln!(err, "error: {message}");
            let _ = write_usage(err);
            return 2;
        }
    };

    let result = match command {
        Command::Help => {
            return if write_usage(out).is_ok() { 0 } else { 1 };
        }
        Command::Patch {
            flat_path,
            model_path,
            flat_out,
            model_out,
        } => run_patch(&flat_path, &model_path, flat_out, model_out, out),
        Command::Rank { csv_path, out: rank_out } => run_rank(&csv_path, rank_out, out),
    };

    match result {
        Ok(()) => 0,
        Err(error) => {
            let _ = writeln!(err, "error: {error}");
            1
        }
    }
}

fn parse_args<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = OsString>,
{
    let mut iter = args.into_iter();
    let _argv0 = iter.next();

    let subcommand = match iter.next() {
        None => return Err(String::from("missing subcommand")),
        Some(arg) => {
            let arg = arg.to_string_lossy().into_owned();
            if arg == "-h" || arg == "--help" {
                return Ok(Command::Help);
            }
            arg
        }
    };

    match subcommand.as_str() {
        "patch" => parse_patch_args(iter),
        "rank" => parse_rank_args(iter),
        other => Err(format!("unknown subcommand `{other}`")),
    }
}

fn parse_patch_args<I>(mut iter: I) -> Result<Command, String>
where
    I: Iterator<Item = OsString>,
{
    let mut positional: Vec<PathBuf> = Vec::new();
    let mut flat_out: Option<PathBuf> = None;
    let mut model_out: Option<PathBuf> = None;

    while let Some(argument) = iter.next() {
        let arg = argument.to_string_lossy().into_owned();
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--flat-out" => {
                let next = iter
                    .next()
                    .ok_or_else(|| String::from("missing path for `--flat-out`"))?;
                flat_out = Some(PathBuf::from(next));
            }
            "--model-out" => {
                let next = iter
                    .next()
                    .ok_or_else(|| String::from("missing path for `--model-out`"))?;
                model_out = Some(PathBuf::from(next));
            }
            other if other.starts_with('-') => {
                return Err(format!("unknown option `{other}`"));
            }
            _ => positional.push(PathBuf::from(argument)),
        }
    }

    if positional.len() != 2 {
        return Err(format!(
            "`patch` expects exactly two inputs (flat.json model.json), got {}",
            positional.len()
        ));
    }
    let model_path = positional.pop().expect("checked length");
    let flat_path = positional.pop().expect("checked length");
    Ok(Command::Patch {
        flat_path,
        model_path,
        flat_out,
        model_out,
    })
}

fn parse_rank_args<I>(mut iter: I) -> Result<Command, String>
where
    I: Iterator<Item = OsString>,
{
    let mut csv_path: Option<PathBuf> = None;
    let mut out: Option<PathBuf> = None;

    while let Some(argument) = iter.next() {
        let arg = argument.to_string_lossy().into_owned();
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-o" | "--out" => {
                let next = iter
                    .next()
                    .ok_or_else(|| String::from("missing path for `-o/--out`"))?;
                out = Some(PathBuf::from(next));
            }
            other if other.starts_with('-') => {
                return Err(format!("unknown option `{other}`"));
            }
            _ => {
                if csv_path.is_some() {
                    return Err(String::from("`rank` expects exactly one CSV input"));
                }
                csv_path = Some(PathBuf::from(argument));
            }
        }
    }

    let csv_path = csv_path.ok_or_else(|| String::from("`rank` expects a CSV input"))?;
    Ok(Command::Rank { csv_path, out })
}

fn write_usage<W: Write>(w: &mut W) -> io::Result<()> {
    writeln!(w, "Usage:")?;
    writeln!(
        w,
        "  kbpatch patch <flat.json> <model.json> [--flat-out PATH] [--model-out PATH]"
    )?;
    writeln!(w, "  kbpatch rank <libs.csv> [-o PATH]")?;
    writeln!(w)?;
    writeln!(
        w,
        "patch reconciles the two knowledge bases and writes <stem>.patched.json"
    )?;
    writeln!(
        w,
        "siblings; rank writes a <stem>.ranked.txt popularity white list."
    )?;
    Ok(())
}

/// Derive the default sibling output path: `DB.json` → `DB.patched.json`.
fn sibling_path(input: &Path, suffix: &str) -> PathBuf {
    input.with_extension(suffix)
}

fn run_patch<W: Write>(
    flat_path: &Path,
    model_path: &Path,
    flat_out: Option<PathBuf>,
    model_out: Option<PathBuf>,
    out: &mut W,
) -> KbResult<()> {
    let flat: Vec<FlatRecord> = serde_json::from_str(&std::fs::read_to_string(flat_path)?)?;
    let model: Vec<ModelRecord> = serde_json::from_str(&std::fs::read_to_string(model_path)?)?;

    let result = reconcile(flat, model)?;

    // Serialize both collections before writing either, so a serialization
    // failure cannot leave one patched file behind.
    let flat_json = serde_json::to_string_pretty(&result.flat)?;
    let model_json = serde_json::to_string_pretty(&result.model)?;

    let flat_out = flat_out.unwrap_or_else(|| sibling_path(flat_path, "patched.json"));
    let model_out = model_out.unwrap_or_else(|| sibling_path(model_path, "patched.json"));
    std::fs::write(&flat_out, flat_json)?;
    std::fs::write(&model_out, model_json)?;

    let _ = writeln!(
        out,
        "appended {} flat / {} structured records; wrote {} and {}",
        result.stats.flat_appended,
        result.stats.model_appended,
        flat_out.display(),
        model_out.display()
    );
    Ok(())
}

fn run_rank<W: Write>(csv_path: &Path, out_path: Option<PathBuf>, out: &mut W) -> KbResult<()> {
    let csv_text = std::fs::read_to_string(csv_path)?;
    let ranked = rank_libraries(&csv_text)?;

    let out_path = out_path.unwrap_or_else(|| sibling_path(csv_path, "ranked.txt"));
    std::fs::write(&out_path, ranked.join("\n"))?;

    let _ = writeln!(out, "ranked {} libraries; wrote {}", ranked.len(), out_path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
