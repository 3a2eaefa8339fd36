use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cldrparse::{merge, to_json, to_json_pretty, Value};

#[derive(Debug, Parser)]
#[command(
    name = "cldrparse",
    version,
    about = "Flatten CLDR-style locale XML into ordered JSON maps"
)]
struct Args {
    /// Input files (defaults to stdin)
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,
    /// Merge multiple inputs in order; later files override earlier ones
    #[arg(long)]
    merge: bool,
    /// Resolve a slash-separated path before printing, e.g.
    /// dates/calendars/calendar[@type="gregorian"]
    #[arg(short, long, value_name = "PATH")]
    path: Option<String>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let value = load(&args)?;

    let value = match &args.path {
        Some(path) => match value.find(path) {
            Some(found) => found,
            None => bail!("path not found: {path}"),
        },
        None => &value,
    };

    let mut rendered = match value {
        Value::String(s) if args.path.is_some() => s.clone(),
        _ if args.pretty => to_json_pretty(value),
        _ => to_json(value),
    };
    rendered.push('\n');

    write_output(&args.output, rendered.as_bytes())
}

fn load(args: &Args) -> Result<Value> {
    if args.files.is_empty() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        if buffer.trim().is_empty() {
            bail!("no input provided on stdin");
        }
        return cldrparse::from_str(&buffer).context("failed to parse stdin");
    }

    if args.files.len() > 1 && !args.merge {
        bail!("multiple input files require --merge");
    }

    let mut result: Option<Value> = None;
    for path in &args.files {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display()))?;
        let value = cldrparse::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        result = Some(match result {
            Some(base) => merge(&base, &value),
            None => value,
        });
    }

    // files is non-empty here, so the fold produced a value
    result.context("no input files")
}

fn write_output(path: &Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            Ok(())
        }
    }
}
