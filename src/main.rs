use anyhow::Context;
use std::io::Write as _;
use swatch_stream::display::WindowSurface;
use swatch_stream::pipeline::PipelineConfig;
use swatch_stream::session::{self, Session};
use tracing_subscriber::EnvFilter;

const WINDOW_TITLE: &str = "swatch_stream";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let count = prompt("Type a number of random images I should generate: ")?;
    let height = prompt("Enter height: ")?;
    let width = prompt("Enter width: ")?;
    let params = session::parse_params(&count, &height, &width)?;

    let config = PipelineConfig::new(params.image_count, params.image_height, params.image_width);
    let (window_width, window_height) = (config.image_width, config.image_height);
    let session = Session::new(config)?;
    let commands = session::spawn_stdin_commands();

    session
        .run(commands, move || {
            WindowSurface::new(WINDOW_TITLE, window_width, window_height)
        })
        .await
        .context("pipeline session failed")?;
    Ok(())
}

fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{message}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line)
}
