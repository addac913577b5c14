// minic: syntax analyzer for a small C-like teaching language

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use minic::emit;
use minic::parser::parse::Parser;

#[derive(ClapParser, Debug)]
#[command(name = "minic")]
#[command(about = "Parse a minic source file and print its tokens or parse tree")]
struct Cli {
    /// Source file, or `-` to read standard input
    input: PathBuf,

    /// What to print
    #[arg(long, value_enum, default_value_t = Emit::Derivation)]
    emit: Emit,

    /// Write the listing here instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Emit {
    /// One `CODE lexeme` line per token
    Tokens,
    /// Post-order terminals and `<Kind>` reductions
    Derivation,
    /// Indented outline with line numbers
    Tree,
    /// The parse tree as JSON
    Json,
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "minic=debug",
        _ => "minic=trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_source(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("failed to read standard input")?;
        return Ok(source);
    }
    fs::read_to_string(input)
        .with_context(|| format!("failed to read '{}'", input.display()))
}

/// Produce the requested listing, or `None` after reporting a source error
fn render(source: &str, emit: Emit) -> Result<Option<String>> {
    let mut parser = match Parser::from_source(source) {
        Ok(parser) => parser,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(None);
        }
    };
    debug!(count = parser.tokens().len(), "tokenized input");

    if emit == Emit::Tokens {
        return Ok(Some(emit::token_listing(parser.tokens())));
    }

    let unit = match parser.parse_comp_unit() {
        Ok(unit) => unit,
        Err(e) => {
            eprintln!("{}", e);
            let deeper = parser.deepest_rejection().filter(|d| **d != e);
            if let Some(deeper) = deeper {
                eprintln!("  furthest failed alternative: {}", deeper);
            }
            return Ok(None);
        }
    };

    let listing = match emit {
        Emit::Tokens | Emit::Derivation => emit::derivation_listing(&unit),
        Emit::Tree => emit::tree_listing(&unit),
        Emit::Json => {
            emit::json(&unit).context("failed to serialize parse tree")?
        }
    };
    Ok(Some(listing))
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let source = read_source(&cli.input)?;
    info!(input = %cli.input.display(), bytes = source.len(), "parsing");

    let Some(listing) = render(&source, cli.emit)? else {
        return Ok(ExitCode::FAILURE);
    };

    match &cli.output {
        Some(path) => fs::write(path, listing)
            .with_context(|| format!("failed to write '{}'", path.display()))?,
        None => print!("{}", listing),
    }

    Ok(ExitCode::SUCCESS)
}
