use anyhow::{Context, Result};
use bridge::{Bridge, Settings};
use clap::Parser;

mod cli;

use cli::{Cli, Command, ServeArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve(ServeArgs::default()));

    let result = match command {
        Command::Serve(args) => run_serve(args).await,
        Command::Get(args) => run_get(args).await,
        Command::Health(args) => run_health(args).await,
        Command::Version => {
            println!("vk-bridge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    if let Err(err) = &result {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }

    Ok(())
}

fn load_settings(args: &ServeArgs) -> Result<Settings> {
    let mut settings =
        Settings::load(args.config.as_deref()).context("failed to load configuration")?;
    cli::apply_overrides(&mut settings, args);
    Ok(settings)
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let settings = load_settings(&args)?;
    bridge::trace::init(&settings.log_level)?;

    tracing::info!("starting vk-bridge");
    let bridge = Bridge::start(settings)
        .await
        .context("failed to start bridge")?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;

    tracing::info!("received shutdown signal");
    bridge.shutdown().await;
    Ok(())
}

async fn run_get(args: ServeArgs) -> Result<()> {
    let settings = load_settings(&args)?;
    bridge::trace::init(&settings.log_level)?;

    let bridge = Bridge::start(settings)
        .await
        .context("failed to start bridge")?;
    let status = bridge.status();
    println!("{}", serde_json::to_string_pretty(&status)?);
    bridge.shutdown().await;
    Ok(())
}

async fn run_health(args: ServeArgs) -> Result<()> {
    let settings = load_settings(&args)?;
    settings
        .validate()
        .context("configuration is invalid")?;
    println!("ok");
    Ok(())
}
