//! Prints the drawing operations that svgops generates for a document.

#![warn(unused)]

use clap::{crate_version, value_parser};
use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use svgops::{CompileOptions, Compiler, Diagnostic, Loader, Op, RecordingEmitter};

#[derive(Debug)]
struct Error(String);

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! error {
    ($($arg:tt)*) => (Error(std::format!($($arg)*)));
}

/// Command-line options for `svgops-dump`.
#[derive(Debug)]
struct Opt {
    /// Input file; `-` means stdin.
    input: PathBuf,

    /// Resolution for physical units.
    dpi: f64,

    /// Whether to keep diagnostics out of stderr.
    quiet: bool,

    /// Whether to log to stderr while loading and compiling.
    log: bool,

    /// Whether to print operation counts instead of the operations.
    stats: bool,
}

fn parse_dpi(v: &str) -> Result<f64, String> {
    match v.parse::<f64>() {
        Ok(dpi) if dpi > 0.0 && dpi.is_finite() => Ok(dpi),
        Ok(_) => Err(String::from("Invalid resolution")),
        Err(e) => Err(format!("{e}")),
    }
}

fn build_cli() -> clap::Command {
    clap::Command::new("svgops-dump")
        .version(concat!("version ", crate_version!()))
        .about("Print the drawing operations for an SVG document")
        .arg(
            clap::Arg::new("dpi")
                .short('d')
                .long("dpi")
                .value_name("float")
                .help("Pixels per inch, for physical units")
                .default_value("96")
                .value_parser(parse_dpi),
        )
        .arg(
            clap::Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Do not print diagnostics")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("log")
                .long("log")
                .help("Log to stderr while processing the document")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("stats")
                .long("stats")
                .help("Print how many times each operation is used")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("FILE")
                .help("The input file, or - for stdin")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
}

fn parse_args() -> Result<Opt, Error> {
    let matches = build_cli().get_matches();

    let input = matches
        .get_one::<PathBuf>("FILE")
        .cloned()
        .ok_or_else(|| error!("No input file"))?;

    Ok(Opt {
        input,
        dpi: matches.get_one::<f64>("dpi").copied().unwrap_or(96.0),
        quiet: matches.get_flag("quiet"),
        log: matches.get_flag("log"),
        stats: matches.get_flag("stats"),
    })
}

fn read_input(opt: &Opt) -> Result<Vec<u8>, Error> {
    if opt.input.as_os_str() == "-" {
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .map_err(|e| error!("Error reading stdin: {}", e))?;
        Ok(bytes)
    } else {
        std::fs::read(&opt.input)
            .map_err(|e| error!("Error reading file \"{}\": {}", opt.input.display(), e))
    }
}

fn print_ops(out: &mut impl Write, ops: &[Op]) -> io::Result<()> {
    for op in ops {
        writeln!(out, "{op}")?;
    }

    Ok(())
}

fn print_stats(out: &mut impl Write, ops: &[Op]) -> io::Result<()> {
    let mut counts = BTreeMap::new();

    for op in ops {
        *counts.entry(op.name()).or_insert(0usize) += 1;
    }

    for (name, count) in counts {
        writeln!(out, "{name}: {count}")?;
    }

    Ok(())
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        eprintln!("warning: {d}");
    }
}

fn run(opt: &Opt) -> Result<(), Error> {
    let bytes = read_input(opt)?;

    let document = Loader::new()
        .with_logging(opt.log)
        .read_bytes(&bytes)
        .map_err(|e| error!("Error loading SVG {}: {}", opt.input.display(), e))?;

    let mut emitter = RecordingEmitter::new();
    let diagnostics = Compiler::new(&document)
        .with_options(CompileOptions::default().with_dpi(opt.dpi))
        .compile(&mut emitter);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if opt.stats {
        print_stats(&mut out, emitter.ops())
    } else {
        print_ops(&mut out, emitter.ops())
    }
    .map_err(|e| error!("Error writing output: {}", e))?;

    if !opt.quiet {
        print_diagnostics(&diagnostics);
    }

    Ok(())
}

fn main() {
    if let Err(e) = parse_args().and_then(|opt| run(&opt)) {
        eprintln!("{e}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        build_cli().debug_assert();
    }

    #[test]
    fn rejects_invalid_dpi() {
        assert!(parse_dpi("0").is_err());
        assert!(parse_dpi("-96").is_err());
        assert!(parse_dpi("foo").is_err());
        assert_eq!(parse_dpi("72"), Ok(72.0));
    }

    #[test]
    fn counts_operations() {
        let ops = vec![Op::PushState, Op::BeginPath, Op::PopState, Op::PushState];
        let mut out = Vec::new();

        print_stats(&mut out, &ops).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "begin_path: 1\npop_state: 1\npush_state: 2\n"
        );
    }
}
