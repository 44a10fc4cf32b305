// Command-line front end for deltapatch.
//
// Subcommands create and apply xdelta3 patches through the external xdelta3
// program, and read or replace the description stored in a patch.

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::config::{
    DEFAULT_COMPRESSION_LEVEL, PatchConfig, SOURCE_WINDOW_SIZES, SecondaryCompression,
    SourceWindow,
};
use crate::description::{self, Probe};
use crate::engine::{Outcome, Xdelta3Process};
use crate::patch::Patch;

// ---------------------------------------------------------------------------
// Byte size parsing (supports K, M, G suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

fn parse_source_window(s: &str) -> Result<SourceWindow, String> {
    if s.eq_ignore_ascii_case("auto") {
        return Ok(SourceWindow::AUTO);
    }
    let bytes = parse_byte_size(s)?;
    SourceWindow::from_bytes(bytes).map_err(|e| {
        let sizes: Vec<String> = SOURCE_WINDOW_SIZES
            .iter()
            .map(|size| format!("{}M", size >> 20))
            .collect();
        format!("{e}; expected auto or one of {}", sizes.join(", "))
    })
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Create and apply xdelta3 patches with embedded descriptions.
#[derive(Parser, Debug)]
#[command(
    name = "deltapatch",
    version,
    about = "xdelta3 patch creator/applier with patch descriptions",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output results as JSON.
    #[arg(long = "json", global = true)]
    json_output: bool,

    /// xdelta3 executable to run.
    #[arg(long, global = true, value_hint = ValueHint::ExecutablePath, default_value = "xdelta3")]
    xdelta3: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create a patch from an original and a modified file.
    Encode(EncodeArgs),
    /// Apply a patch to an original file.
    Decode(DecodeArgs),
    /// Print the description stored in a patch.
    Describe(DescribeArgs),
    /// Copy a patch, replacing its description.
    Relabel(RelabelArgs),
    /// Print defaults and selectable option tables.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SecondaryArg {
    Lzma,
    Djw,
    Fgk,
    None,
}

impl From<SecondaryArg> for SecondaryCompression {
    fn from(arg: SecondaryArg) -> Self {
        match arg {
            SecondaryArg::Lzma => Self::Lzma,
            SecondaryArg::Djw => Self::Djw,
            SecondaryArg::Fgk => Self::Fgk,
            SecondaryArg::None => Self::None,
        }
    }
}

#[derive(Args, Debug)]
struct DescriptionArgs {
    /// Patch description text.
    #[arg(long, short = 'D', conflicts_with = "description_file")]
    description: Option<String>,

    /// Read the patch description from a file.
    #[arg(long = "description-file", value_hint = ValueHint::FilePath)]
    description_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Original (unmodified) file.
    #[arg(long, short = 's', value_hint = ValueHint::FilePath)]
    source: PathBuf,

    /// Compression level (0-9).
    #[arg(long, short = 'l', value_parser = clap::value_parser!(u8).range(0..=9), default_value_t = DEFAULT_COMPRESSION_LEVEL)]
    level: u8,

    /// Secondary compressor.
    #[arg(long, value_enum, default_value_t = SecondaryArg::None)]
    secondary: SecondaryArg,

    /// Source window size: auto, or 8M through 1024M in powers of two.
    #[arg(long = "source-window", value_parser = parse_source_window, default_value = "auto")]
    source_window: SourceWindow,

    /// Do not write Adler-32 checksums.
    #[arg(long = "no-checksum")]
    no_checksum: bool,

    #[command(flatten)]
    description: DescriptionArgs,

    /// Modified file.
    #[arg(value_hint = ValueHint::FilePath)]
    modified: PathBuf,

    /// Patch file to create.
    #[arg(value_hint = ValueHint::FilePath)]
    patch: PathBuf,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Original (unmodified) file.
    #[arg(long, short = 's', value_hint = ValueHint::FilePath)]
    source: PathBuf,

    /// Do not verify Adler-32 checksums.
    #[arg(long = "no-checksum")]
    no_checksum: bool,

    /// Patch file to apply.
    #[arg(value_hint = ValueHint::FilePath)]
    patch: PathBuf,

    /// Patched output file.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct DescribeArgs {
    /// Patch file.
    #[arg(value_hint = ValueHint::FilePath)]
    patch: PathBuf,
}

#[derive(Args, Debug)]
struct RelabelArgs {
    #[command(flatten)]
    description: DescriptionArgs,

    /// Patch file to read.
    #[arg(value_hint = ValueHint::FilePath)]
    patch: PathBuf,

    /// Patch file to write.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

/// Flags shared by every subcommand.
struct Globals {
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    xdelta3: PathBuf,
}

// ---------------------------------------------------------------------------
// Option mapping
// ---------------------------------------------------------------------------

fn encode_config(args: &EncodeArgs, force: bool) -> PatchConfig {
    let mut config = PatchConfig::default();
    config.checksum = !args.no_checksum;
    config.overwrite = force;
    config.set_compression_level(args.level).ok();
    config.set_secondary(args.secondary.into());
    config.set_source_window(args.source_window);
    config
}

fn decode_config(args: &DecodeArgs, force: bool) -> PatchConfig {
    let mut config = PatchConfig::default();
    config.checksum = !args.no_checksum;
    config.overwrite = force;
    config
}

fn read_description(args: &DescriptionArgs) -> Result<String, String> {
    match (&args.description, &args.description_file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| format!("description file: {}: {e}", path.display())),
        (None, None) => Ok(String::new()),
    }
}

fn exit_status(status: i32) -> i32 {
    if (0..=255).contains(&status) { status } else { 1 }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn print_outcome(command: &str, outcome: &Outcome, globals: &Globals) {
    if globals.json_output {
        let json = serde_json::json!({
            "command": command,
            "status": outcome.status,
            "message": outcome.message,
            "log": outcome.log,
        });
        match serde_json::to_string_pretty(&json) {
            Ok(text) => eprintln!("{text}"),
            Err(e) => eprintln!("deltapatch: json: {e}"),
        }
        return;
    }

    if !outcome.is_success() {
        eprintln!("deltapatch: {command} failed: {}", outcome.message);
    } else if globals.verbose > 0 && !globals.quiet && !outcome.message.is_empty() {
        eprintln!("deltapatch: {}", outcome.message);
    }
}

fn cmd_encode(args: &EncodeArgs, globals: &Globals) -> i32 {
    let description = match read_description(&args.description) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("deltapatch: {e}");
            return 1;
        }
    };

    let mut patch = Patch::open_for_write(&args.patch);
    patch.set_description(description);
    patch.set_config(encode_config(args, globals.force));

    let mut engine = Xdelta3Process::new(&globals.xdelta3);
    let outcome = patch.encode(&mut engine, &args.source, &args.modified);
    print_outcome("encode", &outcome, globals);
    exit_status(outcome.status)
}

fn cmd_decode(args: &DecodeArgs, globals: &Globals) -> i32 {
    let mut patch = Patch::open_for_read(&args.patch);
    patch.set_config(decode_config(args, globals.force));

    if !globals.quiet && !globals.json_output && !patch.description().is_empty() {
        eprintln!("{}", patch.description());
    }

    let mut engine = Xdelta3Process::new(&globals.xdelta3);
    let outcome = patch.decode(&mut engine, &args.source, &args.output);
    print_outcome("decode", &outcome, globals);
    exit_status(outcome.status)
}

fn cmd_describe(path: &Path, globals: &Globals) -> i32 {
    let probe = match description::probe_file(path) {
        Ok(probe) => probe,
        Err(e) => {
            eprintln!("deltapatch: {}: {e}", path.display());
            return 1;
        }
    };

    if globals.json_output {
        let (text, absent) = match &probe {
            Probe::Described(text) => (Some(text.as_str()), None),
            Probe::Absent(reason) => (None, Some(reason.to_string())),
        };
        let json = serde_json::json!({
            "path": path.display().to_string(),
            "description": text,
            "absent": absent,
        });
        match serde_json::to_string_pretty(&json) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("deltapatch: json: {e}");
                return 1;
            }
        }
        return 0;
    }

    match probe {
        Probe::Described(text) => println!("{text}"),
        Probe::Absent(reason) => log::info!("{}: no description: {reason}", path.display()),
    }
    0
}

fn cmd_relabel(args: &RelabelArgs, globals: &Globals) -> i32 {
    let description = match read_description(&args.description) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("deltapatch: {e}");
            return 1;
        }
    };

    let mut patch = Patch::open_for_read(&args.patch);
    patch.set_description(description);
    patch.config_mut().overwrite = globals.force;

    match patch.relabel(&args.output) {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("deltapatch: relabel: {e}");
            1
        }
    }
}

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    let defaults = PatchConfig::default();
    println!("deltapatch version {version}");
    println!("DEFAULT_LEVEL={}", defaults.compression_level());
    println!("DEFAULT_SECONDARY={}", defaults.secondary());
    println!("DEFAULT_SOURCE_WINDOW={}", defaults.source_window());
    println!("CHECKSUM={}", defaults.checksum as u8);
    for (i, secondary) in SecondaryCompression::ALL.iter().enumerate() {
        println!("SECONDARY[{i}]={secondary}");
    }
    for selector in 0..=SOURCE_WINDOW_SIZES.len() {
        if let Ok(window) = SourceWindow::from_selector(selector) {
            println!("SOURCE_WINDOW[{selector}]={window}");
        }
    }
    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let globals = Globals {
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
        xdelta3: cli.xdelta3,
    };

    let exit_code = match &cli.command {
        Cmd::Encode(args) => cmd_encode(args, &globals),
        Cmd::Decode(args) => cmd_decode(args, &globals),
        Cmd::Describe(args) => cmd_describe(&args.patch, &globals),
        Cmd::Relabel(args) => cmd_relabel(args, &globals),
        Cmd::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
