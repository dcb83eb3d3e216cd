use anyhow::{Context, Result};
use clap::Parser;
use msgstream::{
    inline_error, render_streams, renderable_tables, RenderLimit, EMPTY_STREAM, FIRST_RENDER_LIMIT,
};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

/// Render a preview of a flow's context and compressed message streams.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[clap(long, default_value_t = Level::INFO)]
    level: Level,

    /// File holding the context stream. Empty stream when omitted.
    #[clap(long)]
    context: Option<PathBuf>,

    /// File holding the compressed stream. Empty stream when omitted.
    #[clap(long)]
    compressed: Option<PathBuf>,

    /// First render budget in bytes.
    #[clap(long, default_value_t = FIRST_RENDER_LIMIT)]
    limit: usize,

    /// Render everything regardless of `--limit`.
    #[clap(long)]
    all: bool,

    /// Print the stacked messages as JSON instead of text.
    #[clap(long)]
    json: bool,
}

fn read_stream(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Ok(text.trim().to_string())
        }
        None => Ok(EMPTY_STREAM.to_string()),
    }
}

fn render_limit(all: bool, limit: usize) -> RenderLimit {
    if all {
        RenderLimit::Unlimited
    } else {
        RenderLimit::Bytes(limit)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(cli.level)
        .with_writer(std::io::stderr);

    if [Level::DEBUG, Level::TRACE].contains(&cli.level) {
        subscriber = subscriber.with_file(true).with_line_number(true);
    }
    tracing::subscriber::set_global_default(subscriber.finish())
        .context("setting default subscriber")?;

    let context = read_stream(cli.context.as_deref())?;
    let compressed = read_stream(cli.compressed.as_deref())?;
    let limit = render_limit(cli.all, cli.limit);
    info!(
        context_len = context.len(),
        compressed_len = compressed.len(),
        ?limit,
        "rendering message streams"
    );

    if !cli.json {
        print!("{}", render_streams(&context, &compressed, limit));
        return Ok(());
    }
    match renderable_tables(&context, &compressed, limit) {
        Ok(renderable) => {
            let out = json!({
                "truncated": renderable.truncated,
                "messages": renderable.messages,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Err(err) => println!("{}", inline_error(&err)),
    }

    Ok(())
}
