use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arucraftr_domain::{LoginResponse, ServerSummary};
use arucraftr_player_app::application::PanelConfig;

use crate::composition::{new_panel_state, PanelState};

const USAGE: &str = "\
usage: arucraftr-panel <command>

commands:
  status                     show the current session
  login <token> [user.json]  install a session from a login response
  logout [--local]           end the session (--local skips the backend)
  get <path>                 GET a panel API path and print the payload
  profiles <summaries.json>  reconcile the profile cache against summaries
  cooldown                   run the verification-code cooldown to zero
  guard <path>               show where the route guard sends <path>";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Status,
    Login { token: String, user_file: Option<String> },
    Logout { notify: bool },
    Get { path: String },
    Profiles { summaries_file: String },
    Cooldown,
    Guard { path: String },
}

fn parse_command(args: &[String]) -> Result<Command> {
    let mut args = args.iter().map(String::as_str);
    let command = match (args.next(), args.next(), args.next()) {
        (None | Some("status"), None, None) => Command::Status,
        (Some("login"), Some(token), user_file) => Command::Login {
            token: token.to_string(),
            user_file: user_file.map(str::to_string),
        },
        (Some("logout"), None, None) => Command::Logout { notify: true },
        (Some("logout"), Some("--local"), None) => Command::Logout { notify: false },
        (Some("get"), Some(path), None) => Command::Get {
            path: path.to_string(),
        },
        (Some("profiles"), Some(file), None) => Command::Profiles {
            summaries_file: file.to_string(),
        },
        (Some("cooldown"), None, None) => Command::Cooldown,
        (Some("guard"), Some(path), None) => Command::Guard {
            path: path.to_string(),
        },
        _ => bail!("{USAGE}"),
    };
    Ok(command)
}

/// Cancels the token on Ctrl+C
fn setup_shutdown_signal(cancel_token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, stopping"),
            Err(e) => tracing::warn!(error = %e, "Failed to listen for Ctrl+C"),
        }
        cancel_token.cancel();
    });
}

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "arucraftr_panel=info,arucraftr_player_app=info,arucraftr_player_adapters=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_command(&args)?;

    let config = PanelConfig::from_env();
    tracing::info!(app = %config.app_name, api_base = %config.api_base, "Starting panel client");

    let state = new_panel_state(config);
    execute(&state, command).await
}

async fn execute(state: &PanelState, command: Command) -> Result<()> {
    match command {
        Command::Status => print_status(state),
        Command::Login { token, user_file } => {
            let user = match user_file {
                Some(file) => Some(read_json(&file)?),
                None => None,
            };
            state
                .auth
                .complete_login(LoginResponse { token, user })
                .context("login rejected")?;
            print_status(state);
        }
        Command::Logout { notify } => {
            let confirmed = state.auth.end_session(notify).await;
            println!(
                "session cleared{}",
                if confirmed { " (confirmed by backend)" } else { "" }
            );
        }
        Command::Get { path } => {
            let envelope = state.gateway.get::<Value>(&path).await?;
            println!("code: {}", envelope.code);
            if !envelope.msg.is_empty() {
                println!("msg:  {}", envelope.msg);
            }
            if let Some(data) = envelope.data {
                println!("{}", serde_json::to_string_pretty(&data)?);
            }
        }
        Command::Profiles { summaries_file } => {
            let summaries: Vec<ServerSummary> = read_json(&summaries_file)?;
            let visible = state.profiles.reconcile(&summaries).await;
            for summary in &visible {
                let name = state
                    .profiles
                    .profile(&summary.id)
                    .map(|p| p.display_name().to_string())
                    .unwrap_or_default();
                println!(
                    "{:<16} {:<13} {:>3}/{:<3} {}",
                    summary.id,
                    summary.status.label(),
                    summary.player_count,
                    summary.max_players,
                    name
                );
            }
            let hidden = state.profiles.hidden();
            if !hidden.is_empty() {
                let ids: Vec<&str> = hidden.iter().map(|id| id.as_str()).collect();
                println!("hidden: {}", ids.join(", "));
            }
        }
        Command::Cooldown => run_cooldown(state).await,
        Command::Guard { path } => match state.session.guard(&path) {
            Some(route) => println!("{path} -> {}", route.path()),
            None => println!("{path} allowed"),
        },
    }
    Ok(())
}

fn print_status(state: &PanelState) {
    match state.session.current_user() {
        Some(user) => println!(
            "logged in as {} (permission {})",
            user.player_id, user.permission_level
        ),
        None if state.session.is_authenticated() => println!("logged in"),
        None => println!("not logged in"),
    }
    println!("route: {}", state.navigator.current().path());
    println!("backend: {}", state.config.api_base);
}

async fn run_cooldown(state: &PanelState) {
    let cancel_token = CancellationToken::new();
    setup_shutdown_signal(cancel_token.clone());

    state.session.start_cooldown();
    let mut poll = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                state.session.cooldown().reset();
                break;
            }
            _ = poll.tick() => {
                let remaining = state.session.cooldown_remaining();
                println!("resend available in {remaining}s");
                if remaining == 0 {
                    break;
                }
            }
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))
}
