use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use nodexml::{Config, Node, Serializer, WriteConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "nodexml",
    version,
    about = "Convert a JSON tree into an XML document"
)]
struct Args {
    /// Input JSON file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Name of the root element
    #[arg(short, long, value_name = "NAME")]
    root: String,
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
    /// Write everything on one line
    #[arg(long)]
    compact: bool,
    /// Spaces per nesting level in pretty output
    #[arg(long, default_value_t = 2)]
    indent: usize,
    /// Version written into the XML declaration
    #[arg(long, value_name = "V", default_value = "1.0")]
    version_decl: String,
    /// Encoding label written into the XML declaration
    #[arg(long, value_name = "E", default_value = "UTF-8")]
    encoding: String,
    /// Maximum nesting depth of the input tree
    #[arg(long, value_name = "N")]
    max_depth: Option<u16>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let args = Args::parse();

    let input_data = read_input(&args.input)?;
    let node: Node = serde_json::from_str(&input_data).context("input is not valid JSON")?;
    debug!(kind = node.kind_name(), "decoded input");

    let mut config = Config::default()
        .with_version(args.version_decl)
        .with_encoding(args.encoding);
    if let Some(max_depth) = args.max_depth {
        config = config.with_max_depth(max_depth);
    }

    let document = Serializer::new(config)
        .serialize(&args.root, &node)
        .with_context(|| format!("failed to convert input into <{}>", args.root))?;

    let write_config = if args.compact {
        WriteConfig::compact()
    } else {
        WriteConfig::new(true, args.indent)
    };
    let output = document.to_xml_string_with(&write_config);

    write_output(&args.output, output.as_bytes())?;
    info!(bytes = output.len(), "wrote document");
    Ok(())
}

fn read_input(path: &Option<PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
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
