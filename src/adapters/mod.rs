//! Site-specific extraction strategies.
//!
//! Each adapter turns a rendered sportsbook page into canonical [`Bet`]
//! records. Discovery walks an ordered list of container strategies and stops
//! at the first one that yields at least one record; per-field extraction
//! walks an ordered selector list and takes the first non-empty match. A
//! container that defeats extraction is skipped, never fatal.

mod draftkings;
mod fanduel;
mod prizepicks;

pub use draftkings::DraftKingsAdapter;
pub use fanduel::FanDuelAdapter;
pub use prizepicks::PrizePicksAdapter;

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::config::UNKNOWN_MATCHUP;
use crate::parse::{detect_bet_type, detect_sport, parse_amount, parse_odds, parse_result};
use crate::types::{settle_profit, Bet, BetResult, Source};

/// One sportsbook's extraction strategy.
pub trait SiteAdapter: Send + Sync {
    fn source(&self) -> Source;

    /// Scrape every recognizable bet record from a rendered page.
    fn scrape(&self, html: &str) -> Vec<Bet>;
}

pub fn adapter_for(source: Source) -> &'static dyn SiteAdapter {
    match source {
        Source::Draftkings => &DraftKingsAdapter,
        Source::Fanduel => &FanDuelAdapter,
        Source::Prizepicks => &PrizePicksAdapter,
    }
}

// ---------------------------------------------------------------------------
// Selector tables
// ---------------------------------------------------------------------------

/// Ordered list of candidate selectors for one field; first non-empty match
/// wins. Patterns that fail to compile are dropped at table construction.
pub(crate) struct SelectorList(Vec<Selector>);

impl SelectorList {
    pub(crate) fn compile(patterns: &[&str]) -> Self {
        Self(
            patterns
                .iter()
                .filter_map(|p| Selector::parse(p).ok())
                .collect(),
        )
    }

    /// Text of the first descendant matching any candidate, in order.
    fn first_text(&self, scope: ElementRef<'_>) -> Option<String> {
        for selector in &self.0 {
            if let Some(el) = scope.select(selector).next() {
                let text = flat_text(el);
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
        None
    }
}

/// Selector tables for card-style bet history pages. DraftKings and FanDuel
/// share the engine and differ only in these tables. Container queries are
/// single comma-list selectors so each element matches at most once; field
/// queries are ordered candidate lists.
pub(crate) struct CardSelectors {
    pub containers: Selector,
    /// Looser class patterns tried when the primary containers yield nothing.
    pub fallback_containers: Selector,
    pub matchup: SelectorList,
    pub selection: SelectorList,
    pub odds: SelectorList,
    pub stake: SelectorList,
    pub result: SelectorList,
    pub payout: SelectorList,
}

// Generic tags consulted for a description when no selection selector hits.
static GENERIC_TEXT: LazyLock<SelectorList> = LazyLock::new(|| SelectorList::compile(&["p", "span"]));

static TABLE_ROWS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("table tbody tr, [class*=\"history\"] [class*=\"row\"]")
        .expect("static selector")
});

// ---------------------------------------------------------------------------
// Shared card/table engine
// ---------------------------------------------------------------------------

/// Container discovery + extraction for card-style pages. Strategies in
/// order, stopping at the first that produces a record: primary containers,
/// fallback containers, table rows.
pub(crate) fn scrape_cards(source: Source, html: &str, sels: &CardSelectors) -> Vec<Bet> {
    let page = Html::parse_document(html);

    for containers in [&sels.containers, &sels.fallback_containers] {
        let bets = extract_all(source, page.select(containers).collect(), |el| {
            extract_card(source, el, sels)
        });
        if !bets.is_empty() {
            return bets;
        }
    }

    extract_all(source, page.select(&TABLE_ROWS).collect(), |row| {
        extract_row(source, row)
    })
}

fn extract_all<'a, F>(source: Source, containers: Vec<ElementRef<'a>>, extract: F) -> Vec<Bet>
where
    F: Fn(ElementRef<'a>) -> Option<Bet>,
{
    let mut bets = Vec::new();
    for (index, container) in containers.into_iter().enumerate() {
        match extract(container) {
            Some(bet) => bets.push(bet),
            None => debug!(source = %source, index, "container yielded no record, skipping"),
        }
    }
    bets
}

/// Extract one record from a bet card. Every field miss resolves to its
/// documented default; the record is suppressed entirely when nothing
/// identifying was found.
fn extract_card(source: Source, container: ElementRef<'_>, sels: &CardSelectors) -> Option<Bet> {
    let matchup = sels
        .matchup
        .first_text(container)
        .unwrap_or_else(|| UNKNOWN_MATCHUP.to_string());

    let description = sels
        .selection
        .first_text(container)
        .or_else(|| GENERIC_TEXT.first_text(container))
        .unwrap_or_default();

    let odds = parse_odds(&sels.odds.first_text(container).unwrap_or_default());
    let amount = parse_amount(&sels.stake.first_text(container).unwrap_or_default());
    let payout = parse_amount(&sels.payout.first_text(container).unwrap_or_default());

    let result_text = sels.result.first_text(container).unwrap_or_default();
    let result = parse_result(&result_text, class_attr(container));

    let container_text = flat_text(container);
    let sport = detect_sport(&matchup, Some(&container_text));

    let bet = Bet {
        source,
        sport,
        bet_type: detect_bet_type(&description),
        bet_description: description,
        matchup,
        odds,
        amount,
        result,
        profit: settle_profit(result, payout, amount),
        scraped_at: Utc::now(),
    };
    bet.has_identity().then_some(bet)
}

static ROW_MATCHUP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)vs\.?|@|\bat\b").unwrap());
static ROW_ODDS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[+-]\d{3,}").unwrap());
static ROW_CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$[\d,.]+").unwrap());
static ROW_RESULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)won|lost|win|loss|push|pending").unwrap());

static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("static selector"));

/// Tabular fallback: classify each cell by pattern. The first unclassified
/// cell with real content becomes the description.
fn extract_row(source: Source, row: ElementRef<'_>) -> Option<Bet> {
    let cells: Vec<String> = row.select(&CELL).map(flat_text).collect();
    if cells.len() < 3 {
        return None;
    }

    let mut matchup = String::new();
    let mut description = String::new();
    let mut odds = crate::config::DEFAULT_ODDS;
    let mut amount = 0.0;
    let mut result = BetResult::Pending;

    for text in &cells {
        if ROW_MATCHUP_RE.is_match(text) {
            matchup = text.clone();
        } else if ROW_ODDS_RE.is_match(text) {
            odds = parse_odds(text);
        } else if ROW_CURRENCY_RE.is_match(text) {
            amount = parse_amount(text);
        } else if ROW_RESULT_RE.is_match(text) {
            result = parse_result(text, None);
        } else if text.len() > 3 && description.is_empty() {
            description = text.clone();
        }
    }

    if matchup.is_empty() && description.is_empty() {
        return None;
    }

    let bet = Bet {
        source,
        sport: detect_sport(&matchup, None),
        bet_type: detect_bet_type(&description),
        bet_description: if description.is_empty() { matchup.clone() } else { description },
        matchup: if matchup.is_empty() { UNKNOWN_MATCHUP.to_string() } else { matchup },
        odds,
        amount,
        result,
        // Table rows carry no payout column, so only losses settle.
        profit: settle_profit(result, 0.0, amount),
        scraped_at: Utc::now(),
    };
    bet.has_identity().then_some(bet)
}

// ---------------------------------------------------------------------------
// Element helpers
// ---------------------------------------------------------------------------

/// Whitespace-normalized text content of an element subtree.
pub(crate) fn flat_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Subtree text with one line per rendered text node, approximating the
/// page's visible line structure.
pub(crate) fn lined_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn class_attr<'a>(el: ElementRef<'a>) -> Option<&'a str> {
    el.value().attr("class")
}
