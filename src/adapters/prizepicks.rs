//! PrizePicks entry-history adapter.
//!
//! Entry cards carry no discrete odds fields: the primary strategy parses
//! each card's multi-line inner text (`"4-Pick $120.00\n$40.00 Power Play\n
//! players\nWin"`), and a structured-field variant covers markup where the
//! same data sits in discrete elements. Whichever strategy yields a record
//! first wins; odds always come from the static payout tables.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{class_attr, extract_all, flat_text, lined_text, SelectorList, SiteAdapter};
use crate::parse::{detect_prop_sport, multi_leg_odds, parse_result};
use crate::types::{settle_profit, Bet, BetType, PlayType, Source};

static PRIMARY_CARDS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[class*=\"border-soFresh-130\"]").expect("static selector"));

static FALLBACK_CARDS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[class*=\"soFresh\"], [class*=\"lineup\"], [class*=\"entry\"]")
        .expect("static selector")
});

static HEADER_FIELDS: LazyLock<SelectorList> = LazyLock::new(|| {
    SelectorList::compile(&["[class*=\"entry-header\"]", "[class*=\"pick-count\"]", "h3"])
});

static STAKE_FIELDS: LazyLock<SelectorList> = LazyLock::new(|| {
    SelectorList::compile(&["[class*=\"entry-fee\"]", "[class*=\"stake\"]", "[class*=\"wager\"]"])
});

static PLAYER_FIELDS: LazyLock<SelectorList> = LazyLock::new(|| {
    SelectorList::compile(&["[class*=\"players\"]", "[class*=\"projection\"]", "[class*=\"selection\"]"])
});

static RESULT_FIELDS: LazyLock<SelectorList> = LazyLock::new(|| {
    SelectorList::compile(&["[class*=\"status\"]", "[class*=\"result\"]", "[class*=\"badge\"]"])
});

static LEGS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)-Pick").unwrap());
static PAYOUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d+-Pick\s+\$([\d,]+(?:\.\d+)?)").unwrap());
static STAKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\$([\d,]+(?:\.\d+)?)\s*(Power|Flex|Standard)?\s*Play").unwrap());
static PLAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(Power|Flex|Standard)\s*Play").unwrap());

// Line filters for picking the player/selection line out of a blob.
static PRICE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$[\d,.]+").unwrap());
static HEADER_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\d+-Pick").unwrap());
static RESULT_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(Win|Loss|Won|Lost|Pending|Live)$").unwrap());
static PLAY_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Play$").unwrap());

pub struct PrizePicksAdapter;

impl SiteAdapter for PrizePicksAdapter {
    fn source(&self) -> Source {
        Source::Prizepicks
    }

    fn scrape(&self, html: &str) -> Vec<Bet> {
        let page = Html::parse_document(html);

        // Strategy 1: blob parse over primary, then fallback containers.
        for cards in [&*PRIMARY_CARDS, &*FALLBACK_CARDS] {
            let bets = extract_all(self.source(), page.select(cards).collect(), |card| {
                extract_entry(&lined_text(card))
            });
            if !bets.is_empty() {
                return bets;
            }
        }

        // Strategy 2: structured field parse over the same container sets.
        for cards in [&*PRIMARY_CARDS, &*FALLBACK_CARDS] {
            let bets = extract_all(self.source(), page.select(cards).collect(), extract_structured);
            if !bets.is_empty() {
                return bets;
            }
        }

        Vec::new()
    }
}

/// Parse one entry card's inner-text blob.
fn extract_entry(text: &str) -> Option<Bet> {
    if text.trim().is_empty() {
        return None;
    }

    let legs = LEGS_RE
        .captures(text)
        .and_then(|caps| caps[1].parse::<u8>().ok())
        .unwrap_or(1);

    let payout = PAYOUT_RE
        .captures(text)
        .and_then(|caps| caps[1].replace(',', "").parse::<f64>().ok())
        .unwrap_or(0.0);

    let amount = STAKE_RE
        .captures(text)
        .and_then(|caps| caps[1].replace(',', "").parse::<f64>().ok())
        .unwrap_or(0.0);

    let play = play_type(text);
    let result = parse_result(text, None);
    let players = player_line(text);

    build_entry(legs, play, payout, amount, result, players, text)
}

/// Structured-field variant: same record, discrete elements.
fn extract_structured(card: ElementRef<'_>) -> Option<Bet> {
    let header = HEADER_FIELDS.first_text(card)?;
    let legs = LEGS_RE
        .captures(&header)
        .and_then(|caps| caps[1].parse::<u8>().ok())
        .unwrap_or(1);
    let payout = PAYOUT_RE
        .captures(&header)
        .and_then(|caps| caps[1].replace(',', "").parse::<f64>().ok())
        .unwrap_or(0.0);

    let stake_text = STAKE_FIELDS.first_text(card).unwrap_or_default();
    let amount = crate::parse::parse_amount(&stake_text);
    let play = play_type(&stake_text);

    let result_text = RESULT_FIELDS.first_text(card).unwrap_or_default();
    let result = parse_result(&result_text, class_attr(card));

    let players = PLAYER_FIELDS.first_text(card);
    let context = flat_text(card);

    build_entry(legs, play, payout, amount, result, players, &context)
}

fn build_entry(
    legs: u8,
    play: PlayType,
    payout: f64,
    amount: f64,
    result: crate::types::BetResult,
    players: Option<String>,
    sport_text: &str,
) -> Option<Bet> {
    // An entry with no recognizable money on it is decoration, not a record.
    if amount <= 0.0 && payout <= 0.0 {
        return None;
    }

    let bet_type = BetType::Entry { legs, play };
    let bet_description = match &players {
        Some(names) => format!("{names} ({bet_type})"),
        None => bet_type.to_string(),
    };

    Some(Bet {
        source: Source::Prizepicks,
        sport: detect_prop_sport(sport_text),
        matchup: "PrizePicks Entry".to_string(),
        bet_type,
        bet_description,
        odds: multi_leg_odds(legs, play),
        amount,
        result,
        profit: settle_profit(result, payout, amount),
        scraped_at: Utc::now(),
    })
}

fn play_type(text: &str) -> PlayType {
    PLAY_RE
        .captures(text)
        .and_then(|caps| PlayType::from_word(&caps[1]))
        .unwrap_or(PlayType::Standard)
}

/// First line that isn't a leg-count header, a price, a bare result word, or
/// a play-type suffix — i.e. the player/selection names.
fn player_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find(|line| {
            line.len() > 3
                && !HEADER_LINE_RE.is_match(line)
                && !PRICE_LINE_RE.is_match(line)
                && !RESULT_LINE_RE.is_match(line)
                && !PLAY_SUFFIX_RE.is_match(line)
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BetResult, Sport};

    const WINNING_ENTRY: &str =
        "4-Pick $120.00\n\n$40.00 Power Play\n\nLeBron James, Luka Doncic\n\nWin";

    #[test]
    fn entry_blob_end_to_end() {
        let bet = extract_entry(WINNING_ENTRY).expect("entry should parse");
        assert_eq!(bet.source, Source::Prizepicks);
        assert_eq!(bet.bet_type.to_string(), "4-Pick Power Play");
        assert_eq!(bet.amount, 40.0);
        assert_eq!(bet.odds, 900);
        assert_eq!(bet.result, BetResult::Win);
        assert_eq!(bet.profit, 80.0);
        assert_eq!(bet.sport, Sport::NBA);
        assert_eq!(
            bet.bet_description,
            "LeBron James, Luka Doncic (4-Pick Power Play)"
        );
        assert_eq!(bet.matchup, "PrizePicks Entry");
    }

    #[test]
    fn flex_entry_uses_flex_table() {
        let bet = extract_entry("3-Pick $22.50\n$10.00 Flex Play\nMahomes, Allen, Hurts\nLoss")
            .expect("entry should parse");
        assert_eq!(bet.odds, 125);
        assert_eq!(bet.bet_type.to_string(), "3-Pick Flex Play");
        assert_eq!(bet.profit, -10.0);
        assert_eq!(bet.sport, Sport::NFL);
    }

    #[test]
    fn moneyless_entry_is_suppressed() {
        assert!(extract_entry("2-Pick\nSomebody, Someone\nPending").is_none());
        assert!(extract_entry("").is_none());
    }

    #[test]
    fn pending_entry_has_zero_profit() {
        let bet = extract_entry("2-Pick $15.00\n$5.00 Power Play\nOhtani, Judge\nLive")
            .expect("entry should parse");
        assert_eq!(bet.result, BetResult::Pending);
        assert_eq!(bet.profit, 0.0);
        assert_eq!(bet.sport, Sport::MLB);
    }

    #[test]
    fn scrape_primary_cards() {
        let html = format!(
            r#"<div class="card border-soFresh-130">{}</div>"#,
            WINNING_ENTRY.replace("\n\n", "<br><br>")
        );
        let bets = PrizePicksAdapter.scrape(&html);
        assert_eq!(bets.len(), 1);
        assert_eq!(bets[0].odds, 900);
    }

    #[test]
    fn scrape_fallback_cards() {
        let html = r#"
            <div class="lineup-card">
              <p>2-Pick $15.00</p>
              <p>$5.00 Power Play</p>
              <p>McDavid, Ovechkin</p>
              <p>Won</p>
            </div>
        "#;
        let bets = PrizePicksAdapter.scrape(html);
        assert_eq!(bets.len(), 1);
        assert_eq!(bets[0].odds, 300);
        assert_eq!(bets[0].result, BetResult::Win);
        assert_eq!(bets[0].sport, Sport::NHL);
    }

    #[test]
    fn structured_variant_when_blob_gives_nothing() {
        // No dollar sign anywhere in the text, so the blob strategy finds no
        // stake or payout; the structured strategy reads discrete fields.
        let html = r#"
            <div class="entry-card">
              <h3 class="entry-header">4-Pick Entry</h3>
              <span class="entry-fee">40.00 Power Play</span>
              <span class="entry-status">Win</span>
              <span class="entry-players">LeBron James, Luka Doncic</span>
            </div>
        "#;
        let bets = PrizePicksAdapter.scrape(html);
        assert_eq!(bets.len(), 1);
        assert_eq!(bets[0].amount, 40.0);
        assert_eq!(bets[0].odds, 900);
        assert_eq!(bets[0].bet_type.to_string(), "4-Pick Power Play");
        assert_eq!(bets[0].result, BetResult::Win);
    }
}
