//! Inbox/outbox contract with the host runtime.
//!
//! The host (popup, content scripts) talks to the core through [`Command`]s;
//! one dispatcher task owns the coordinator and the current page context, so
//! all mutable state stays single-threaded. Each command carries a oneshot
//! reply channel.

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::adapters::adapter_for;
use crate::error::{AppError, Result};
use crate::session::AuthSession;
use crate::sync::{Coordinator, SkipReason, SyncOutcome};
use crate::types::{Bet, Source};

#[derive(Debug)]
pub enum Command {
    /// Scrape the registered page and return its records.
    ScrapeBets,
    /// Scrape the registered page and return only the record count.
    GetBetCount,
    /// A sportsbook page finished loading; answers whether auto-sync runs.
    PageLoaded { site: Source, page_key: String, html: String },
    /// Navigation/close: drop the page's guard entry.
    PageClosed { page_key: String },
    StoreAuth { access_token: String, user: String },
    ClearAuth,
    GetAuth,
    AutoSyncBets { page_key: String, bets: Vec<Bet> },
}

#[derive(Debug)]
pub enum Reply {
    Bets(Vec<Bet>),
    Count(usize),
    PageLoaded { auto_sync: bool, reason: Option<SkipReason> },
    Ack,
    Auth(Option<AuthSession>),
    Sync {
        success: bool,
        imported: Option<u32>,
        reason: Option<SkipReason>,
        error: Option<String>,
    },
}

#[derive(Debug)]
pub struct Request {
    command: Command,
    reply: oneshot::Sender<Reply>,
}

/// Cloneable sender half handed to the host runtime.
#[derive(Clone)]
pub struct BridgeHandle {
    tx: mpsc::Sender<Request>,
}

impl BridgeHandle {
    pub async fn send(&self, command: Command) -> Result<Reply> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(Request { command, reply: tx })
            .await
            .map_err(|e| AppError::Channel(e.to_string()))?;
        rx.await
            .map_err(|_| AppError::Channel("dispatcher dropped the reply".to_string()))
    }
}

pub fn channel(capacity: usize) -> (BridgeHandle, mpsc::Receiver<Request>) {
    let (tx, rx) = mpsc::channel(capacity);
    (BridgeHandle { tx }, rx)
}

/// The page a content script is currently resident on.
struct PageContext {
    site: Source,
    page_key: String,
    html: String,
}

pub struct Dispatcher {
    coordinator: Coordinator,
    page: Option<PageContext>,
    rx: mpsc::Receiver<Request>,
}

impl Dispatcher {
    pub fn new(coordinator: Coordinator, rx: mpsc::Receiver<Request>) -> Self {
        Self { coordinator, page: None, rx }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.rx.recv().await {
            let reply = self.handle(request.command).await;
            // A closed reply channel just means the caller gave up waiting.
            let _ = request.reply.send(reply);
        }
        debug!("bridge closed, dispatcher stopping");
    }

    async fn handle(&mut self, command: Command) -> Reply {
        match command {
            Command::ScrapeBets => Reply::Bets(self.scrape()),
            Command::GetBetCount => Reply::Count(self.scrape().len()),
            Command::PageLoaded { site, page_key, html } => {
                let decision = self.coordinator.page_loaded(&page_key).await;
                self.page = Some(PageContext { site, page_key, html });
                Reply::PageLoaded { auto_sync: decision.auto_sync, reason: decision.reason }
            }
            Command::PageClosed { page_key } => {
                self.coordinator.forget_page(&page_key);
                if self.page.as_ref().is_some_and(|p| p.page_key == page_key) {
                    self.page = None;
                }
                Reply::Ack
            }
            Command::StoreAuth { access_token, user } => {
                self.coordinator.store_auth(access_token, user);
                Reply::Ack
            }
            Command::ClearAuth => {
                self.coordinator.clear_auth();
                Reply::Ack
            }
            Command::GetAuth => Reply::Auth(self.coordinator.auth_snapshot()),
            Command::AutoSyncBets { page_key, bets } => {
                match self.coordinator.auto_sync(&page_key, &bets).await {
                    SyncOutcome::Submitted { imported, .. } => Reply::Sync {
                        success: true,
                        imported: Some(imported),
                        reason: None,
                        error: None,
                    },
                    SyncOutcome::Skipped(reason) => Reply::Sync {
                        success: false,
                        imported: None,
                        reason: Some(reason),
                        error: None,
                    },
                    SyncOutcome::Failed { error } => Reply::Sync {
                        success: false,
                        imported: None,
                        reason: None,
                        error: Some(error),
                    },
                }
            }
        }
    }

    /// Pages are scraped on demand; parsing happens entirely within one
    /// dispatcher turn so no document state crosses an await.
    fn scrape(&self) -> Vec<Bet> {
        match &self.page {
            Some(page) => adapter_for(page.site).scrape(&page.html),
            None => Vec::new(),
        }
    }
}
