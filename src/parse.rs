//! Stateless text→value converters shared by every site adapter.
//!
//! All parsers are total: any input, including empty text, resolves to the
//! documented default instead of an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::DEFAULT_ODDS;
use crate::types::{BetResult, BetType, PlayType, Sport};

static ODDS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[+-]?\d{3,}").unwrap());

static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$?(\d[\d,]*(?:\.\d+)?)").unwrap());

/// Extract American odds: the first signed run of three or more digits.
/// Defaults to -110 when nothing matches or the number is out of range.
pub fn parse_odds(text: &str) -> i32 {
    ODDS_RE
        .find(text)
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .unwrap_or(DEFAULT_ODDS)
}

/// Extract a currency-like numeral (optional `$`, thousands separators,
/// optional decimal part). Defaults to 0 when nothing matches.
pub fn parse_amount(text: &str) -> f64 {
    AMOUNT_RE
        .captures(text)
        .and_then(|caps| caps[1].replace(',', "").parse::<f64>().ok())
        .unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Result vocabulary
// ---------------------------------------------------------------------------

fn result_from_vocab(text: &str) -> Option<BetResult> {
    let lower = text.to_lowercase();
    let any = |words: &[&str]| words.iter().any(|w| lower.contains(w));
    if any(&["won", "win", "hit", "cashed"]) {
        Some(BetResult::Win)
    } else if any(&["lost", "loss", "miss"]) {
        Some(BetResult::Loss)
    } else if any(&["push", "void", "refund"]) {
        Some(BetResult::Push)
    } else if any(&["live", "active", "pending", "in progress"]) {
        Some(BetResult::Pending)
    } else {
        None
    }
}

/// Classify a settlement state from status text, with an optional class-name
/// fallback (card CSS classes often carry won/lost markers). Text always
/// takes priority over the fallback. Defaults to pending.
pub fn parse_result(text: &str, class_hint: Option<&str>) -> BetResult {
    result_from_vocab(text)
        .or_else(|| class_hint.and_then(result_from_vocab))
        .unwrap_or(BetResult::Pending)
}

// ---------------------------------------------------------------------------
// Sport rules — ordered, first match wins
// ---------------------------------------------------------------------------

fn sport_rules(rules: &[(Sport, &str)]) -> Vec<(Sport, Regex)> {
    rules
        .iter()
        .map(|(sport, pattern)| (*sport, Regex::new(&format!("(?i){pattern}")).unwrap()))
        .collect()
}

/// Matchup-oriented rules for event-style sportsbooks (team names first).
static EVENT_SPORT_RULES: LazyLock<Vec<(Sport, Regex)>> = LazyLock::new(|| {
    sport_rules(&[
        (Sport::NBA, r"lakers|celtics|warriors|nba|basketball"),
        (Sport::NFL, r"chiefs|eagles|nfl|football|patriots"),
        (Sport::MLB, r"yankees|dodgers|mlb|baseball"),
        (Sport::NHL, r"rangers|bruins|nhl|hockey"),
        (Sport::NCAAB, r"duke|kentucky|ncaa|college"),
        (Sport::UFC, r"ufc|mma|fight night"),
        (Sport::Soccer, r"premier league|la liga|soccer|fc\b"),
    ])
});

/// Looser rules applied to the broader container text when the matchup alone
/// gives no signal.
static CONTEXT_SPORT_RULES: LazyLock<Vec<(Sport, Regex)>> = LazyLock::new(|| {
    sport_rules(&[
        (Sport::NBA, r"nba|basketball"),
        (Sport::NFL, r"nfl|football"),
        (Sport::MLB, r"mlb|baseball"),
    ])
});

/// Player-oriented rules for pick'em entries. UFC leads because fighter
/// names collide with team keywords less often than the reverse.
static PROP_SPORT_RULES: LazyLock<Vec<(Sport, Regex)>> = LazyLock::new(|| {
    sport_rules(&[
        (
            Sport::UFC,
            r"ufc|mma|fight|knockout|submission|aspinall|volkov|dern|adesanya|pereira|o'malley|chimaev",
        ),
        (
            Sport::NBA,
            r"lebron|curry|durant|giannis|luka|jokic|tatum|points|rebounds|assists|nba|lakers|celtics|warriors",
        ),
        (
            Sport::NFL,
            r"mahomes|allen|hurts|rushing|passing|receiving|touchdowns|nfl|yards|chiefs|eagles",
        ),
        (
            Sport::MLB,
            r"ohtani|judge|soto|strikeouts|hits|home runs|mlb|pitcher|batter|yankees|dodgers",
        ),
        (Sport::NHL, r"mcdavid|ovechkin|goals|saves|nhl|hockey|rangers|bruins"),
        (
            Sport::Soccer,
            r"messi|ronaldo|haaland|mbappe|shots|soccer|premier|goal|manchester|liverpool",
        ),
        (Sport::Esports, r"esports|league of legends|csgo|valorant|kills|gaming"),
    ])
});

fn first_sport_match(rules: &[(Sport, Regex)], text: &str) -> Option<Sport> {
    rules.iter().find(|(_, re)| re.is_match(text)).map(|(sport, _)| *sport)
}

/// Infer the sport from matchup text, consulting the broader container text
/// when the matchup alone has no match. Defaults to Other.
pub fn detect_sport(text: &str, context: Option<&str>) -> Sport {
    first_sport_match(&EVENT_SPORT_RULES, text)
        .or_else(|| context.and_then(|c| first_sport_match(&CONTEXT_SPORT_RULES, c)))
        .unwrap_or(Sport::Other)
}

/// Infer the sport from player/selection text. Defaults to Other.
pub fn detect_prop_sport(text: &str) -> Sport {
    first_sport_match(&PROP_SPORT_RULES, text).unwrap_or(Sport::Other)
}

// ---------------------------------------------------------------------------
// Bet type rules — ordered, first match wins
// ---------------------------------------------------------------------------

static BET_TYPE_RULES: LazyLock<Vec<(BetType, Regex)>> = LazyLock::new(|| {
    let rules: &[(BetType, &str)] = &[
        // Signed-number fallback catches spread lines without the keyword.
        (BetType::Spread, r"spread|[+-]\d+(\.\d+)?"),
        (BetType::Moneyline, r"money\s?line|\bml\b|to win"),
        (BetType::Total, r"\bover\b|\bunder\b|o/u|\btotal\b"),
        (BetType::PlayerProp, r"points|rebounds|assists|yards|touchdowns|strikeouts"),
        (BetType::Parlay, r"parlay"),
        (BetType::Teaser, r"teaser"),
        (BetType::GameProp, r"\bfirst\b|\blast\b|anytime|scorer"),
    ];
    rules
        .iter()
        .map(|(kind, pattern)| (*kind, Regex::new(&format!("(?i){pattern}")).unwrap()))
        .collect()
});

/// Classify a wager kind from its description text. Defaults to Other.
pub fn detect_bet_type(text: &str) -> BetType {
    BET_TYPE_RULES
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(kind, _)| *kind)
        .unwrap_or(BetType::Other)
}

// ---------------------------------------------------------------------------
// Multi-leg payout tables
// ---------------------------------------------------------------------------

/// (legs, American-odds equivalent of the fixed payout multiplier).
const POWER_ODDS: &[(u8, i32)] = &[(2, 300), (3, 500), (4, 900), (5, 1900), (6, 3900)];
const FLEX_ODDS: &[(u8, i32)] = &[(3, 125), (4, 150), (5, 200), (6, 250)];

/// Approximate American odds for a multi-leg entry. Pick'em sites publish a
/// payout multiplier per leg count instead of a price, so odds are derived
/// from these static tables. A leg count outside a table resolves to the
/// nearest defined tier, never an extrapolation.
pub fn multi_leg_odds(legs: u8, play: PlayType) -> i32 {
    let table = match play {
        PlayType::Flex => FLEX_ODDS,
        PlayType::Power | PlayType::Standard => POWER_ODDS,
    };
    table
        .iter()
        .min_by_key(|(tier, _)| (i16::from(*tier) - i16::from(legs)).abs())
        .map(|(_, odds)| *odds)
        .expect("payout tables are non-empty")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odds_default_and_extraction() {
        assert_eq!(parse_odds(""), -110);
        assert_eq!(parse_odds("no numbers here"), -110);
        assert_eq!(parse_odds("Team -120"), -120);
        assert_eq!(parse_odds("+350 to win"), 350);
        // Two-digit runs are not odds.
        assert_eq!(parse_odds("Over 21"), -110);
    }

    #[test]
    fn odds_out_of_range_falls_back() {
        assert_eq!(parse_odds("99999999999999999999"), -110);
    }

    #[test]
    fn amount_parsing() {
        assert_eq!(parse_amount("$1,250.50"), 1250.50);
        assert_eq!(parse_amount("$40.00 Power Play"), 40.0);
        assert_eq!(parse_amount("wagered 25"), 25.0);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("free bet"), 0.0);
    }

    #[test]
    fn result_text_beats_class_hint() {
        assert_eq!(parse_result("Won big!", Some("lost")), BetResult::Win);
        assert_eq!(parse_result("", Some("bet-card settled won")), BetResult::Win);
        assert_eq!(parse_result("Voided", None), BetResult::Push);
        assert_eq!(parse_result("In Progress", Some("won")), BetResult::Pending);
        assert_eq!(parse_result("", None), BetResult::Pending);
    }

    #[test]
    fn result_extended_vocab() {
        assert_eq!(parse_result("Cashed out", None), BetResult::Win);
        assert_eq!(parse_result("3 of 4 miss", None), BetResult::Loss);
        assert_eq!(parse_result("Refund issued", None), BetResult::Push);
        assert_eq!(parse_result("LIVE", None), BetResult::Pending);
    }

    #[test]
    fn sport_from_matchup() {
        assert_eq!(detect_sport("Lakers vs Celtics", None), Sport::NBA);
        assert_eq!(detect_sport("Chiefs @ Patriots", None), Sport::NFL);
        assert_eq!(detect_sport("Duke -4.5", None), Sport::NCAAB);
        assert_eq!(detect_sport("UFC Fight Night", None), Sport::UFC);
        assert_eq!(detect_sport("Arsenal FC to win", None), Sport::Soccer);
        assert_eq!(detect_sport("someone vs someone", None), Sport::Other);
    }

    #[test]
    fn sport_context_fallback() {
        assert_eq!(
            detect_sport("Game 7", Some("NBA Finals watch party")),
            Sport::NBA
        );
        // Context pass only covers the big three.
        assert_eq!(detect_sport("Game 7", Some("NHL playoffs")), Sport::Other);
    }

    #[test]
    fn prop_sport_priority() {
        // "fight" outranks everything in the prop table.
        assert_eq!(detect_prop_sport("Aspinall fight to go the distance"), Sport::UFC);
        assert_eq!(detect_prop_sport("LeBron James, Luka Doncic"), Sport::NBA);
        assert_eq!(detect_prop_sport("Mahomes passing yards"), Sport::NFL);
        assert_eq!(detect_prop_sport("Valorant kills"), Sport::Esports);
        assert_eq!(detect_prop_sport("mystery player"), Sport::Other);
    }

    #[test]
    fn bet_type_rules_in_order() {
        assert_eq!(detect_bet_type("Lakers -3.5"), BetType::Spread);
        assert_eq!(detect_bet_type("Moneyline"), BetType::Moneyline);
        assert_eq!(detect_bet_type("Over 215.5"), BetType::Total);
        // Signed-number fallback wins even without the keyword.
        assert_eq!(detect_bet_type("Warriors +7"), BetType::Spread);
        assert_eq!(detect_bet_type("LeBron 25+ points"), BetType::PlayerProp);
        assert_eq!(detect_bet_type("rebounds and assists"), BetType::PlayerProp);
        assert_eq!(detect_bet_type("3-leg parlay"), BetType::Parlay);
        assert_eq!(detect_bet_type("anytime scorer"), BetType::GameProp);
        assert_eq!(detect_bet_type(""), BetType::Other);
    }

    #[test]
    fn leg_odds_table_bounds() {
        assert_eq!(multi_leg_odds(2, PlayType::Power), 300);
        assert_eq!(multi_leg_odds(6, PlayType::Power), 3900);
        assert_eq!(multi_leg_odds(3, PlayType::Flex), 125);
        // Standard entries pay like Power.
        assert_eq!(multi_leg_odds(4, PlayType::Standard), 900);
    }

    #[test]
    fn leg_odds_clamp_to_nearest_tier() {
        assert_eq!(multi_leg_odds(7, PlayType::Power), 3900);
        assert_eq!(multi_leg_odds(1, PlayType::Power), 300);
        assert_eq!(multi_leg_odds(2, PlayType::Flex), 125);
        assert_eq!(multi_leg_odds(9, PlayType::Flex), 250);
    }
}
