//! Sync orchestration: scrape → auth check → usage check → selection →
//! submission, with idempotent auto-sync bookkeeping per page identity.
//!
//! Every terminal state is surfaced as a reason string; nothing here is
//! fatal and nothing is retried automatically — the user can always
//! re-trigger a sync.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::client::{ApiClient, Tier, UsageInfo};
use crate::session::{AuthSession, SessionStore};
use crate::types::Bet;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotLoggedIn,
    NetworkError,
    AuthError,
    AlreadySynced,
    NoBets,
    FreeTier,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SkipReason::NotLoggedIn => "not_logged_in",
            SkipReason::NetworkError => "network_error",
            SkipReason::AuthError => "auth_error",
            SkipReason::AlreadySynced => "already_synced",
            SkipReason::NoBets => "no_bets",
            SkipReason::FreeTier => "free_tier",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// The backend accepted the batch. `imported == 0` means every record
    /// was a duplicate; the page still counts as synced.
    Submitted { imported: u32, warning: Option<String> },
    /// Local short-circuit; no request was made.
    Skipped(SkipReason),
    /// The request was made and failed; the page stays eligible for retry.
    Failed { error: String },
}

/// Outcome of the page-loaded handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSyncDecision {
    pub auto_sync: bool,
    pub reason: Option<SkipReason>,
}

impl AutoSyncDecision {
    fn go() -> Self {
        Self { auto_sync: true, reason: None }
    }

    fn skip(reason: SkipReason) -> Self {
        Self { auto_sync: false, reason: Some(reason) }
    }
}

// ---------------------------------------------------------------------------
// Notification side effect
// ---------------------------------------------------------------------------

/// Raised exactly when an automatic submission imports at least one new bet.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) {
        info!(title, "{body}");
    }
}

impl<N: Notifier> Notifier for std::sync::Arc<N> {
    fn notify(&self, title: &str, body: &str) {
        (**self).notify(title, body);
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

pub struct Coordinator {
    client: ApiClient,
    session: SessionStore,
    /// Page-identity keys already auto-synced this session. Pruned on
    /// navigation/close; never persisted.
    synced_pages: HashSet<String>,
    notifier: Box<dyn Notifier>,
}

impl Coordinator {
    pub fn new(client: ApiClient, notifier: Box<dyn Notifier>) -> Self {
        Self {
            client,
            session: SessionStore::new(),
            synced_pages: HashSet::new(),
            notifier,
        }
    }

    pub fn store_auth(&mut self, access_token: String, user: String) {
        self.session.store(access_token, user);
    }

    pub fn clear_auth(&mut self) {
        self.session.clear();
    }

    pub fn auth_snapshot(&self) -> Option<AuthSession> {
        self.session.snapshot()
    }

    pub fn is_synced(&self, page_key: &str) -> bool {
        self.synced_pages.contains(page_key)
    }

    /// Navigation/close invalidates the page's guard entry.
    pub fn forget_page(&mut self, page_key: &str) {
        self.synced_pages.remove(page_key);
    }

    /// Page-detected handshake: decides whether the page qualifies for
    /// automatic extraction + submission. A page already processed this
    /// session short-circuits before any network traffic.
    pub async fn page_loaded(&mut self, page_key: &str) -> AutoSyncDecision {
        if self.is_synced(page_key) {
            return AutoSyncDecision::skip(SkipReason::AlreadySynced);
        }
        let Some(auth) = self.session.snapshot() else {
            return AutoSyncDecision::skip(SkipReason::NotLoggedIn);
        };

        let usage = match self.client.usage(&auth.access_token).await {
            Ok(usage) => usage,
            Err(e) => {
                warn!("usage check failed: {e}");
                return AutoSyncDecision::skip(SkipReason::NetworkError);
            }
        };
        if !usage.success {
            return AutoSyncDecision::skip(SkipReason::AuthError);
        }
        match usage.tier {
            Some(Tier::Paid) => AutoSyncDecision::go(),
            Some(Tier::Free) => AutoSyncDecision::skip(SkipReason::FreeTier),
            None => AutoSyncDecision::skip(SkipReason::AuthError),
        }
    }

    /// Automatic submission of a scraped batch. Marks the guard key only on
    /// backend-confirmed success and notifies only when something new landed.
    pub async fn auto_sync(&mut self, page_key: &str, bets: &[Bet]) -> SyncOutcome {
        self.submit(page_key, bets, true).await
    }

    /// User-driven submission of a selected subset. Same bookkeeping as the
    /// automatic path, without the notification.
    pub async fn manual_sync(&mut self, page_key: &str, bets: &[Bet]) -> SyncOutcome {
        self.submit(page_key, bets, false).await
    }

    async fn submit(&mut self, page_key: &str, bets: &[Bet], notify: bool) -> SyncOutcome {
        if bets.is_empty() {
            return SyncOutcome::Skipped(SkipReason::NoBets);
        }
        if self.is_synced(page_key) {
            return SyncOutcome::Skipped(SkipReason::AlreadySynced);
        }
        let Some(auth) = self.session.snapshot() else {
            return SyncOutcome::Skipped(SkipReason::NotLoggedIn);
        };

        let outcome = match self.client.import(&auth.access_token, bets).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(page_key, "import request failed: {e}");
                return SyncOutcome::Failed { error: e.to_string() };
            }
        };
        if !outcome.success {
            let error = outcome
                .error
                .unwrap_or_else(|| "import rejected by backend".to_string());
            warn!(page_key, "import rejected: {error}");
            return SyncOutcome::Failed { error };
        }

        let imported = outcome.imported.unwrap_or(0);
        self.synced_pages.insert(page_key.to_string());
        info!(page_key, imported, sent = bets.len(), "import accepted");
        if notify && imported > 0 {
            self.notifier.notify(
                "LockTracker",
                &format!("Imported {imported} new bet{}", if imported == 1 { "" } else { "s" }),
            );
        }
        SyncOutcome::Submitted { imported, warning: outcome.warning }
    }
}

// ---------------------------------------------------------------------------
// Manual-flow selection cap
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SelectionItem {
    pub bet: Bet,
    pub preselected: bool,
    /// Beyond the remaining quota; the UI must not allow selecting it.
    pub locked: bool,
}

#[derive(Debug, Clone)]
pub struct SelectionPlan {
    pub items: Vec<SelectionItem>,
}

impl SelectionPlan {
    pub fn preselected(&self) -> Vec<&Bet> {
        self.items
            .iter()
            .filter(|item| item.preselected)
            .map(|item| &item.bet)
            .collect()
    }
}

/// Pre-select bets for the manual flow, in scrape order. Free-tier accounts
/// are capped at the reported remaining quota; everything past the cap is
/// locked. An optimistic UX hint only — the backend stays authoritative.
pub fn plan_selection(bets: &[Bet], usage: &UsageInfo) -> SelectionPlan {
    let cap = match usage.tier {
        Some(Tier::Free) => usage.remaining.unwrap_or(0) as usize,
        _ => bets.len(),
    };
    let items = bets
        .iter()
        .enumerate()
        .map(|(index, bet)| SelectionItem {
            bet: bet.clone(),
            preselected: index < cap,
            locked: index >= cap,
        })
        .collect();
    SelectionPlan { items }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::Utc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::types::{BetResult, BetType, Source, Sport};

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, _title: &str, body: &str) {
            self.messages.lock().unwrap().push(body.to_string());
        }
    }

    fn bet(description: &str) -> Bet {
        Bet {
            source: Source::Draftkings,
            sport: Sport::NBA,
            matchup: "Lakers vs Celtics".to_string(),
            bet_type: BetType::Spread,
            bet_description: description.to_string(),
            odds: -110,
            amount: 10.0,
            result: BetResult::Pending,
            profit: 0.0,
            scraped_at: Utc::now(),
        }
    }

    async fn coordinator(server: &MockServer) -> (Coordinator, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let client = ApiClient::new(&server.uri()).unwrap();
        let mut coordinator = Coordinator::new(client, Box::new(Arc::clone(&notifier)));
        coordinator.store_auth("tok".to_string(), "{}".to_string());
        (coordinator, notifier)
    }

    fn usage_response(tier: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "tier": tier,
        }))
    }

    fn import_response(imported: u32) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "imported": imported,
        }))
    }

    #[tokio::test]
    async fn guard_short_circuits_second_auto_sync() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/usage"))
            .respond_with(usage_response("paid"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/import"))
            .respond_with(import_response(2))
            .expect(1)
            .mount(&server)
            .await;

        let (mut coordinator, notifier) = coordinator(&server).await;
        let bets = vec![bet("Lakers -3.5"), bet("Celtics ML")];

        assert!(coordinator.page_loaded("dk:tab1").await.auto_sync);
        let outcome = coordinator.auto_sync("dk:tab1", &bets).await;
        assert_eq!(outcome, SyncOutcome::Submitted { imported: 2, warning: None });
        assert_eq!(notifier.messages.lock().unwrap().len(), 1);

        // Second trigger on the same page identity: no scrape, no network.
        let decision = coordinator.page_loaded("dk:tab1").await;
        assert_eq!(decision.reason, Some(SkipReason::AlreadySynced));
        let outcome = coordinator.auto_sync("dk:tab1", &bets).await;
        assert_eq!(outcome, SyncOutcome::Skipped(SkipReason::AlreadySynced));
        // The .expect(1) on the import mock verifies no second call happened.
    }

    #[tokio::test]
    async fn failed_import_leaves_page_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/import"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "error": "database unavailable",
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/import"))
            .respond_with(import_response(1))
            .mount(&server)
            .await;

        let (mut coordinator, _) = coordinator(&server).await;
        let bets = vec![bet("Lakers -3.5")];

        let outcome = coordinator.auto_sync("dk:tab1", &bets).await;
        assert_eq!(outcome, SyncOutcome::Failed { error: "database unavailable".to_string() });
        assert!(!coordinator.is_synced("dk:tab1"));

        // Retry goes through and marks the guard.
        let outcome = coordinator.auto_sync("dk:tab1", &bets).await;
        assert_eq!(outcome, SyncOutcome::Submitted { imported: 1, warning: None });
        assert!(coordinator.is_synced("dk:tab1"));
    }

    #[tokio::test]
    async fn duplicate_only_success_marks_guard_without_notification() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/import"))
            .respond_with(import_response(0))
            .mount(&server)
            .await;

        let (mut coordinator, notifier) = coordinator(&server).await;
        let outcome = coordinator.auto_sync("fd:tab2", &[bet("Chiefs ML")]).await;
        assert_eq!(outcome, SyncOutcome::Submitted { imported: 0, warning: None });
        assert!(coordinator.is_synced("fd:tab2"));
        assert!(notifier.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_batch_is_local_no_op() {
        // No mocks mounted: any request would 404 and fail the decode.
        let server = MockServer::start().await;
        let (mut coordinator, _) = coordinator(&server).await;
        let outcome = coordinator.auto_sync("dk:tab1", &[]).await;
        assert_eq!(outcome, SyncOutcome::Skipped(SkipReason::NoBets));
    }

    #[tokio::test]
    async fn page_loaded_requires_auth_then_tier() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/usage"))
            .respond_with(usage_response("free"))
            .mount(&server)
            .await;

        let notifier = Arc::new(RecordingNotifier::default());
        let client = ApiClient::new(&server.uri()).unwrap();
        let mut coordinator = Coordinator::new(client, Box::new(notifier));

        // Not logged in: decided locally.
        let decision = coordinator.page_loaded("dk:tab1").await;
        assert_eq!(decision.reason, Some(SkipReason::NotLoggedIn));

        // Free tier: manual flow only.
        coordinator.store_auth("tok".to_string(), "{}".to_string());
        let decision = coordinator.page_loaded("dk:tab1").await;
        assert!(!decision.auto_sync);
        assert_eq!(decision.reason, Some(SkipReason::FreeTier));
    }

    #[tokio::test]
    async fn malformed_usage_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/usage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
            })))
            .mount(&server)
            .await;

        let (mut coordinator, _) = coordinator(&server).await;
        let decision = coordinator.page_loaded("dk:tab1").await;
        assert_eq!(decision.reason, Some(SkipReason::AuthError));
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let mut coordinator = Coordinator::new(client, Box::new(LogNotifier));
        coordinator.store_auth("tok".to_string(), "{}".to_string());
        let decision = coordinator.page_loaded("dk:tab1").await;
        assert_eq!(decision.reason, Some(SkipReason::NetworkError));
    }

    #[tokio::test]
    async fn forget_page_restores_auto_sync_eligibility() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/import"))
            .respond_with(import_response(1))
            .expect(2)
            .mount(&server)
            .await;

        let (mut coordinator, _) = coordinator(&server).await;
        let bets = vec![bet("Lakers -3.5")];
        coordinator.auto_sync("dk:tab1", &bets).await;
        coordinator.forget_page("dk:tab1");
        let outcome = coordinator.auto_sync("dk:tab1", &bets).await;
        assert!(matches!(outcome, SyncOutcome::Submitted { .. }));
    }

    #[test]
    fn free_tier_selection_cap() {
        let bets: Vec<Bet> = (0..5).map(|i| bet(&format!("pick {i}"))).collect();
        let usage = UsageInfo {
            success: true,
            tier: Some(Tier::Free),
            remaining: Some(3),
            monthly_limit: Some(25),
            at_limit: Some(false),
        };
        let plan = plan_selection(&bets, &usage);
        assert_eq!(plan.items.len(), 5);
        assert!(plan.items[..3].iter().all(|i| i.preselected && !i.locked));
        assert!(plan.items[3..].iter().all(|i| !i.preselected && i.locked));
        let picked = plan.preselected();
        assert_eq!(picked.len(), 3);
        assert_eq!(picked[0].bet_description, "pick 0");
        assert_eq!(picked[2].bet_description, "pick 2");
    }

    #[test]
    fn paid_tier_selection_uncapped() {
        let bets: Vec<Bet> = (0..4).map(|i| bet(&format!("pick {i}"))).collect();
        let usage = UsageInfo {
            success: true,
            tier: Some(Tier::Paid),
            remaining: None,
            monthly_limit: None,
            at_limit: None,
        };
        let plan = plan_selection(&bets, &usage);
        assert!(plan.items.iter().all(|i| i.preselected && !i.locked));
    }
}
