//! hypr-bridge CLI
//!
//! Subscribe to Hyprland events and query compositor state from the shell.

mod wallpaper;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hypr_bridge::{CommandClient, Listener};
use miette::IntoDiagnostic;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "hypr-bridge")]
#[command(about = "Event bridge for the Hyprland IPC sockets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print events as they arrive, until Hyprland disconnects
    Listen {
        /// Event names to subscribe to (e.g. workspace, activewindow)
        #[arg(required = true)]
        events: Vec<String>,

        /// Report each event name at most once
        #[arg(long)]
        all_once: bool,
    },

    /// Wait for one occurrence of an event and print its payload
    Wait {
        /// Event name to wait for
        event: String,
    },

    /// Show all monitors as JSON
    Monitors,

    /// Show all workspaces as JSON
    Workspaces,

    /// Show the active workspace as JSON
    ActiveWorkspace,

    /// Give every monitor a random wallpaper through hyprpaper
    Wallpaper {
        /// Wallpaper directory (defaults to $XDG_CONFIG_HOME/wallpapers)
        #[arg(short, long)]
        dir: Option<String>,

        /// Accepted file extensions
        #[arg(
            short,
            long,
            value_delimiter = ',',
            default_values_t = wallpaper::DEFAULT_EXTENSIONS.map(String::from)
        )]
        extensions: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Listen { events, all_once } => cmd_listen(events, all_once).await,
        Commands::Wait { event } => cmd_wait(event).await,
        Commands::Monitors => print_json(&client()?.monitors().await.into_diagnostic()?),
        Commands::Workspaces => print_json(&client()?.workspaces().await.into_diagnostic()?),
        Commands::ActiveWorkspace => {
            print_json(&client()?.active_workspace().await.into_diagnostic()?)
        }
        Commands::Wallpaper { dir, extensions } => cmd_wallpaper(dir, extensions).await,
    }
}

fn client() -> miette::Result<CommandClient> {
    CommandClient::new().into_diagnostic()
}

fn print_json<T: Serialize>(value: &T) -> miette::Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

async fn cmd_listen(events: Vec<String>, all_once: bool) -> miette::Result<()> {
    let listeners: Vec<Listener> = events
        .into_iter()
        .map(|event| {
            let name = event.clone();
            Listener::new(event, move |payload: &str| -> anyhow::Result<()> {
                println!("{name}>>{payload}");
                Ok(())
            })
            .process_all(all_once)
        })
        .collect();

    match hypr_bridge::listen(&listeners).await {
        Ok(never) => match never {},
        Err(e) => Err(e).into_diagnostic(),
    }
}

async fn cmd_wait(event: String) -> miette::Result<()> {
    let listener = Listener::new(event, |payload: &str| -> anyhow::Result<()> {
        println!("{payload}");
        Ok(())
    });

    hypr_bridge::one_shot(&listener).await.into_diagnostic()
}

async fn cmd_wallpaper(dir: Option<String>, extensions: Vec<String>) -> miette::Result<()> {
    let dir: PathBuf = match dir {
        Some(dir) => shellexpand::tilde(&dir).into_owned().into(),
        None => wallpaper::default_dir(),
    };

    let wallpapers = wallpaper::list_wallpapers(&dir, &extensions)
        .map_err(|e| miette::miette!("{:#}", e))?;

    let client = client()?;
    let monitors: Vec<String> = client
        .monitors()
        .await
        .into_diagnostic()?
        .into_iter()
        .map(|m| m.name)
        .collect();

    let listactive = match client.hyprctl("hyprpaper listactive").await.into_diagnostic()? {
        hypr_bridge::Reply::Data(output) => output,
        hypr_bridge::Reply::Ok => String::new(),
    };

    let active = wallpaper::active_wallpapers(&monitors, &listactive);
    let mut rng = rand::rng();

    for (monitor, current) in &active {
        let picked = wallpaper::choose(&wallpapers, current.as_deref(), &mut rng)
            .map_err(|e| miette::miette!("{}", e))?;
        let path = dir.join(picked);

        client
            .hyprctl(&format!("hyprpaper reload {},{}", monitor, path.display()))
            .await
            .into_diagnostic()?;

        println!("Set wallpaper for {} to {}", monitor, path.display());
    }

    Ok(())
}
