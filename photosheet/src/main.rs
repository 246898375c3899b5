mod app;
mod canvas;

use anyhow::{bail, Result};
use log::info;
use std::path::PathBuf;

const USAGE: &str = "Usage: photosheet [--config <path>] <image>...

Selects the given image files and reads commands from stdin:
  create-sheet   build a passport photo sheet from the selection
  cancel         close the session";

/// Command line arguments
#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    selection: Vec<PathBuf>,
    help: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => parsed.help = true,
            "-c" | "--config" => match args.next() {
                Some(path) => parsed.config = Some(PathBuf::from(path)),
                None => bail!("{} needs a path", arg),
            },
            _ => parsed.selection.push(PathBuf::from(arg)),
        }
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        println!("{}", USAGE);
        return Ok(());
    }

    info!("Starting Photosheet");

    // Load configuration
    let config = photosheet_core::Config::load(args.config)?;
    info!("Loaded configuration: {:?}", config);

    let app = app::App::with_selection(config, &args.selection);
    app.run().await?;

    Ok(())
}
