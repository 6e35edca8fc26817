// Entrypoint for the CLI application.
// - Loads `.env`, parses arguments and builds the `Config`.
// - Creates the output directory and hands the users file to the runner.
// - Returns `anyhow::Result` so startup failures exit with code 1.

use anyhow::Context;
use clap::Parser;
use discord_avatar_dl::api::DiscordClient;
use discord_avatar_dl::config::{Cli, Config, USAGE};
use discord_avatar_dl::runner::Runner;
use std::fs::{self, File};
use std::io::{BufReader, IsTerminal};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_ansi(std::io::stdout().is_terminal())
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            println!("{USAGE}");
            let _ = e.print();
            std::process::exit(1);
        }
    };

    let config = Config::from_env(&cli)?;

    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let input = File::open(&cli.users_file)
        .with_context(|| format!("Failed to open {}", cli.users_file.display()))?;

    let client = DiscordClient::new(&config)?;
    let summary = Runner::new(client, &config)
        .run(BufReader::new(input))
        .with_context(|| format!("Failed to read {}", cli.users_file.display()))?;

    tracing::info!(
        saved = summary.saved,
        download_failed = summary.download_failed,
        fetch_failed = summary.fetch_failed,
        skipped = summary.skipped,
        "Done"
    );
    Ok(())
}
