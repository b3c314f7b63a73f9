mod adapters;
mod bridge;
mod client;
mod config;
mod error;
mod parse;
mod session;
mod sync;
mod types;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::bridge::{channel, BridgeHandle, Command, Dispatcher, Reply};
use crate::client::ApiClient;
use crate::config::{Config, CHANNEL_CAPACITY};
use crate::error::{AppError, Result};
use crate::sync::{plan_selection, Coordinator, LogNotifier, SkipReason};
use crate::types::Source;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

/// Stand-in for the extension runtime: load a saved sportsbook page, walk it
/// through the messaging contract, and surface the outcome.
///
/// Usage: `locktracker <site-or-hostname> <page.html>`
async fn run(cfg: Config) -> Result<()> {
    let mut args = std::env::args().skip(1);
    let (site_arg, path) = match (args.next(), args.next()) {
        (Some(site), Some(path)) => (site, path),
        _ => {
            return Err(AppError::Config(
                "usage: locktracker <site-or-hostname> <page.html>".to_string(),
            ))
        }
    };
    let source = Source::from_name(&site_arg)
        .or_else(|| Source::from_host(&site_arg))
        .ok_or_else(|| AppError::Config(format!("unsupported site: {site_arg}")))?;
    let html = std::fs::read_to_string(&path)?;

    let client = ApiClient::new(&cfg.app_url)?;
    let coordinator = Coordinator::new(client.clone(), Box::new(LogNotifier));
    let (bridge, rx) = channel(CHANNEL_CAPACITY);
    tokio::spawn(Dispatcher::new(coordinator, rx).run());

    // Adopt the web app's session the way the tracker-site content script
    // does: probe auth status, then store or clear.
    match client.auth_status().await {
        Ok(status) if status.logged_in && status.access_token.is_some() => {
            let user = status
                .user
                .map(|u| u.to_string())
                .unwrap_or_else(|| "{}".to_string());
            bridge
                .send(Command::StoreAuth {
                    access_token: status.access_token.unwrap_or_default(),
                    user,
                })
                .await?;
            info!("Logged in to {}", cfg.app_url);
        }
        Ok(_) => {
            bridge.send(Command::ClearAuth).await?;
            warn!("Not logged in to {} — sync will be skipped", cfg.app_url);
        }
        Err(e) => warn!("Could not check auth status: {e}"),
    }

    let page_key = format!("{source}:{path}");
    let decision = bridge
        .send(Command::PageLoaded {
            site: source,
            page_key: page_key.clone(),
            html,
        })
        .await?;
    let Reply::PageLoaded { auto_sync, reason } = decision else {
        return Err(AppError::Channel("unexpected reply to PageLoaded".to_string()));
    };

    let Reply::Bets(bets) = bridge.send(Command::ScrapeBets).await? else {
        return Err(AppError::Channel("unexpected reply to ScrapeBets".to_string()));
    };
    info!("Scraped {} bets from {path}", bets.len());
    println!("{}", serde_json::to_string_pretty(&bets)?);

    if auto_sync {
        return auto_submit(&bridge, page_key, bets).await;
    }

    match reason {
        Some(SkipReason::FreeTier) => preview_selection(&bridge, &client, &bets).await,
        Some(reason) => {
            info!("Auto-sync skipped: {reason}");
            Ok(())
        }
        None => Ok(()),
    }
}

async fn auto_submit(
    bridge: &BridgeHandle,
    page_key: String,
    bets: Vec<crate::types::Bet>,
) -> Result<()> {
    let Reply::Sync { success, imported, reason, error } = bridge
        .send(Command::AutoSyncBets { page_key, bets })
        .await?
    else {
        return Err(AppError::Channel("unexpected reply to AutoSyncBets".to_string()));
    };
    if success {
        info!("Auto-sync complete: {} imported", imported.unwrap_or(0));
    } else if let Some(reason) = reason {
        info!("Auto-sync skipped: {reason}");
    } else {
        warn!("Auto-sync failed: {}", error.unwrap_or_default());
    }
    Ok(())
}

/// Free tier: no automatic submission. Show what the manual flow would
/// pre-select under the remaining quota.
async fn preview_selection(
    bridge: &BridgeHandle,
    client: &ApiClient,
    bets: &[crate::types::Bet],
) -> Result<()> {
    let Reply::Auth(Some(auth)) = bridge.send(Command::GetAuth).await? else {
        return Ok(());
    };
    let usage = match client.usage(&auth.access_token).await {
        Ok(usage) => usage,
        Err(e) => {
            warn!("Usage check failed: {e}");
            return Ok(());
        }
    };
    let plan = plan_selection(bets, &usage);
    let selected = plan.preselected().len();
    let locked = plan.items.iter().filter(|item| item.locked).count();
    info!(
        "Free tier: {selected} of {} bets pre-selected for manual sync ({locked} over quota)",
        plan.items.len(),
    );
    for item in &plan.items {
        let marker = if item.preselected {
            "[x]"
        } else if item.locked {
            "[/]"
        } else {
            "[ ]"
        };
        println!("{marker} {} | {}", item.bet.matchup, item.bet.bet_description);
    }
    Ok(())
}
