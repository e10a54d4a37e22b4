use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use watttrace::language::Language;
use watttrace::output::{self, OutputFormat};
use watttrace::pipeline::Estimator;
use watttrace::report::AnalysisResult;

#[derive(Parser)]
#[command(
    name = "watttrace",
    about = "Estimate the carbon footprint of source code via static analysis"
)]
struct Cli {
    /// Source file to analyze. Reads stdin when neither this nor --code is
    /// given.
    path: Option<PathBuf>,

    /// Source code passed inline instead of a file.
    #[arg(long, short = 'c', conflicts_with = "path")]
    code: Option<String>,

    /// Language override: python, java, c, cpp, javascript, or typescript.
    #[arg(long, short = 'l')]
    language: Option<String>,

    /// Output format: pretty, text, or json.
    #[arg(long, default_value = "pretty")]
    format: String,

    /// Skip the syntax-tree walkers and use the line-based fallback.
    #[arg(long)]
    fallback: bool,
}

fn parse_format(s: &str) -> Result<OutputFormat> {
    match s {
        "pretty" => Ok(OutputFormat::Pretty),
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => anyhow::bail!("unknown format: {other} (expected pretty, text, or json)"),
    }
}

fn parse_language(s: &str) -> Result<Language> {
    Language::from_tag(s).ok_or_else(|| {
        anyhow::anyhow!("unknown language: {s} (expected python, java, c, cpp, javascript, or typescript)")
    })
}

fn read_source(cli: &Cli) -> Result<String> {
    if let Some(ref path) = cli.path {
        return std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()));
    }
    if let Some(ref code) = cli.code {
        return Ok(code.clone());
    }
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .context("failed to read stdin")?;
    if source.trim().is_empty() {
        anyhow::bail!("no code provided");
    }
    Ok(source)
}

fn format_result(result: &AnalysisResult, fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => output::format_json(result),
        OutputFormat::Text => output::format_text(result),
        OutputFormat::Pretty => output::format_pretty(result),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let fmt = parse_format(&cli.format)?;
    let language = cli.language.as_deref().map(parse_language).transpose()?;

    let source = read_source(&cli)?;

    let mut estimator = Estimator::new();
    let result = if cli.fallback {
        estimator.estimate_sync(&source, cli.path.as_ref(), language)
    } else {
        estimator.estimate(&source, cli.path.as_ref(), language)
    };

    println!("{}", format_result(&result, fmt));
    Ok(())
}
