use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use dashboard_core::{
    Config, Dashboard, OpenWeatherProvider, Phase, config::DEFAULT_BASE_URL, provider_from_config,
};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use tracing::debug;

use crate::render::render_lines;

const DEFAULT_WIDTH: u16 = 72;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `interactive` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key (and optionally a custom API host).
    Configure,

    /// Search one city and print the dashboard.
    Show {
        /// City name, passed to the geocoder as typed.
        city: String,

        /// Print the resulting state as JSON instead of drawing it.
        #[arg(long)]
        json: bool,

        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: u16,
    },

    /// Prompt for cities until Esc is pressed.
    Interactive {
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: u16,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Interactive { width: DEFAULT_WIDTH }) {
            Command::Configure => configure(),
            Command::Show { city, json, width } => show(&city, json, width).await,
            Command::Interactive { width } => interactive(width).await,
        }
    }
}

fn dashboard() -> anyhow::Result<Dashboard<OpenWeatherProvider>> {
    let config = Config::load()?.with_env_overrides();
    let provider = provider_from_config(&config)?;
    debug!(?provider, "provider ready");
    Ok(Dashboard::new(provider))
}

fn print_screen(dashboard: &Dashboard<OpenWeatherProvider>, width: u16) {
    for line in render_lines(dashboard.state(), width) {
        println!("{line}");
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    cfg.set_api_key(api_key);

    let current_base = cfg.base_url().to_string();
    let base_url = Text::new("API base URL:")
        .with_default(&current_base)
        .prompt()
        .context("Failed to read base URL")?;
    cfg.base_url = Some(base_url.trim().to_string())
        .filter(|url| !url.is_empty() && url.trim_end_matches('/') != DEFAULT_BASE_URL);

    let path = cfg.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

async fn show(city: &str, json: bool, width: u16) -> anyhow::Result<()> {
    let mut dashboard = dashboard()?;

    let id = dashboard.begin();
    if !json {
        print_screen(&dashboard, width);
    }
    let result = dashboard.pipeline().search(city).await;
    dashboard.finish(id, result);

    let state = dashboard.state();
    if json {
        println!("{}", serde_json::to_string_pretty(state)?);
    } else if state.phase() == Phase::Success {
        print_screen(&dashboard, width);
    }

    match state.notification() {
        Some(msg) => Err(anyhow!("{msg}")),
        None => Ok(()),
    }
}

async fn interactive(width: u16) -> anyhow::Result<()> {
    let mut dashboard = dashboard()?;
    print_screen(&dashboard, width);

    loop {
        let city = match Text::new("City:").with_placeholder("Enter city").prompt_skippable() {
            Ok(Some(city)) => city,
            Ok(None) | Err(InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read city"),
        };

        let id = dashboard.begin();
        print_screen(&dashboard, width);

        let result = dashboard.pipeline().search(&city).await;
        dashboard.finish(id, result);
        print_screen(&dashboard, width);

        if let Some(msg) = dashboard.state().notification() {
            eprintln!("{msg}");
        }
        dashboard.dismiss();
    }

    Ok(())
}
