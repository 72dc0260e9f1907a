//! `slatec` -- command-line front end for the Slate-to-XSLT compiler.
//!
//! Markup goes to stdout (or the chosen output file); diagnostics and
//! the optional symbol listing go to stderr, as text or JSON. Exit
//! status: 0 clean, 1 blocking defects (or unresolved references under
//! `--strict-undefined`), 2 unreadable input or bad options.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use slate_core::{compile, Config, FatalError, TargetVersion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "slatec", version, about = "Compile Slate stylesheets to XSLT")]
struct Args {
    /// Input stylesheet
    file: PathBuf,

    /// Write the generated markup here instead of stdout
    #[arg(short = 'o', long)]
    output_file: Option<PathBuf>,

    /// Interleave source-line comments in the generated markup
    #[arg(long)]
    line_comments: bool,

    /// Print the symbol-table listing after compiling
    #[arg(long)]
    symbols: bool,

    /// Suppress undefined-variable and undefined-template advisories
    #[arg(long)]
    no_undefined_warnings: bool,

    /// Treat unresolved references as failures for the exit status
    #[arg(long)]
    strict_undefined: bool,

    /// Target language version
    #[arg(long, default_value = "1.0")]
    target: String,

    /// Namespace prefix used on generated tags
    #[arg(long, default_value = "xsl")]
    prefix: String,

    /// Diagnostics format on stderr
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("slatec: {err}");
            ExitCode::from(2)
        }
    }
}

fn run(args: &Args) -> Result<ExitCode, FatalError> {
    let target: TargetVersion = args.target.parse()?;
    let source = fs::read_to_string(&args.file)?;

    let config = Config {
        line_comments: args.line_comments,
        warn_undefined: !args.no_undefined_warnings,
        show_symbols: args.symbols,
        strict_undefined: args.strict_undefined,
        target,
        prefix: args.prefix.clone(),
    };
    let result = compile(&source, &config);

    match args.output {
        ReportFormat::Text => {
            if !result.errors.is_empty() {
                eprint!("{}", result.errors.listing());
            }
            if !result.symbols.is_empty() {
                eprint!("{}", result.symbols);
            }
        }
        ReportFormat::Json => {
            let report = serde_json::json!({
                "errors": result.errors.to_json_value(),
                "blocking": result.errors.blocking_count(),
                "undefined_seen": result.undefined_seen,
                "aborted": result.aborted,
                "symbols": result.symbols,
            });
            eprintln!("{report}");
        }
    }

    match &args.output_file {
        Some(path) => fs::write(path, &result.markup)?,
        None => print!("{}", result.markup),
    }

    let failed = result.errors.blocking_count() > 0
        || (config.strict_undefined && result.undefined_seen);
    Ok(if failed { ExitCode::from(1) } else { ExitCode::SUCCESS })
}
