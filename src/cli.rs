//! Command-line driver: parse two registry files, diff them and print the
//! `reg` commands that reconcile them.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, ValueHint};
use tracing_subscriber::EnvFilter;

use crate::command::{generate_commands, ChangesFor, Command, CommandOptions};
use crate::compare::DefaultValueComparator;
use crate::diff::diff_with;
use crate::error::Result;
use crate::registry::{Registry, RegistryRoot};

/// Diff two Wine registry files and print reg commands.
#[derive(Parser, Debug)]
#[command(
    name = "wine-regdiff",
    version,
    about = "Diff two Wine registry files and print reg ADD/DELETE commands",
    arg_required_else_help = true
)]
struct Cli {
    /// First registry file.
    #[arg(value_hint = ValueHint::FilePath)]
    regfile1: PathBuf,

    /// Second registry file.
    #[arg(value_hint = ValueHint::FilePath)]
    regfile2: PathBuf,

    /// Direction of the diff: "1" turns REGFILE1 into REGFILE2, "2" the reverse.
    #[arg(short = 'c', long = "changes-for", default_value = "1")]
    changes_for: ChangesFor,

    /// Registry root key (HKLM, HKCU, HKCR, HKU, HKCC).
    #[arg(short = 'r', long, default_value = "HKLM")]
    root: RegistryRoot,

    /// Add the /f flag to the generated commands.
    #[arg(short = 'f', long)]
    force: bool,

    /// Key to leave out of value comparison (repeatable).
    #[arg(short = 'i', long = "ignore-key", value_name = "KEY")]
    ignore_keys: Vec<String>,

    /// Text printed before each reg command.
    #[arg(long, default_value = "wine")]
    prefix: String,

    /// Print commands as a JSON array of argument arrays.
    #[arg(long, conflicts_with = "dump_diff")]
    json: bool,

    /// Print the registry diff as JSON instead of commands.
    #[arg(long = "dump-diff")]
    dump_diff: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Renders one command as an output line.
fn format_line(prefix: &str, command: &Command) -> String {
    if prefix.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", prefix, command)
    }
}

fn execute(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let reg1 = Registry::open(&cli.regfile1)?;
    let reg2 = Registry::open(&cli.regfile2)?;

    let comparator = DefaultValueComparator::new().ignoring(cli.ignore_keys.iter().map(String::as_str));
    let diff = diff_with(&reg1, &reg2, &comparator)?;

    if cli.dump_diff {
        serde_json::to_writer_pretty(&mut *out, &diff).map_err(io::Error::from)?;
        writeln!(out)?;
        return Ok(());
    }

    let options = CommandOptions {
        root: cli.root,
        changes_for: cli.changes_for,
        force: cli.force,
    };
    let commands = generate_commands(&diff, &options);

    if cli.json {
        let args: Vec<Vec<String>> = commands.iter().map(Command::args).collect();
        serde_json::to_writer_pretty(&mut *out, &args).map_err(io::Error::from)?;
        writeln!(out)?;
    } else {
        for command in &commands {
            writeln!(out, "{}", format_line(&cli.prefix, command))?;
        }
    }
    Ok(())
}

/// Main CLI entry point. Parses arguments via clap, runs the diff and exits.
///
/// Exit status is 0 on success, 1 if a file cannot be read, parsed or
/// compared, and 2 on invalid arguments.
pub fn run() -> ! {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let exit_code = match execute(&cli, &mut out).and_then(|()| Ok(out.flush()?)) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("wine-regdiff: {}", e);
            1
        }
    };

    process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["wine-regdiff", "a.reg", "b.reg"]).unwrap();
        assert_eq!(cli.changes_for, ChangesFor::One);
        assert_eq!(cli.root, RegistryRoot::LocalMachine);
        assert!(!cli.force);
        assert!(cli.ignore_keys.is_empty());
        assert_eq!(cli.prefix, "wine");
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "wine-regdiff",
            "--changes-for",
            "2",
            "--root",
            "HKCU",
            "-f",
            "-i",
            "Software\\Wine\\Volatile",
            "-i",
            "Other",
            "a.reg",
            "b.reg",
        ])
        .unwrap();
        assert_eq!(cli.changes_for, ChangesFor::Two);
        assert_eq!(cli.root, RegistryRoot::CurrentUser);
        assert!(cli.force);
        assert_eq!(cli.ignore_keys, vec!["Software\\Wine\\Volatile", "Other"]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Cli::try_parse_from(["wine-regdiff", "-c", "3", "a.reg", "b.reg"]).is_err());
        assert!(Cli::try_parse_from(["wine-regdiff", "-r", "HKXX", "a.reg", "b.reg"]).is_err());
        assert!(Cli::try_parse_from(["wine-regdiff", "a.reg"]).is_err());
    }
}
