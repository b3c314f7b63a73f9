use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::UNKNOWN_MATCHUP;

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Which site adapter produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Draftkings,
    Fanduel,
    Prizepicks,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Source::Draftkings => "draftkings",
            Source::Fanduel => "fanduel",
            Source::Prizepicks => "prizepicks",
        };
        write!(f, "{s}")
    }
}

impl Source {
    /// Map a sportsbook hostname to its adapter source.
    pub fn from_host(host: &str) -> Option<Self> {
        crate::config::SUPPORTED_HOSTS
            .iter()
            .find(|(h, _)| *h == host)
            .and_then(|(_, name)| Self::from_name(name))
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "draftkings" => Some(Source::Draftkings),
            "fanduel" => Some(Source::Fanduel),
            "prizepicks" => Some(Source::Prizepicks),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Sport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sport {
    NBA,
    NFL,
    MLB,
    NHL,
    NCAAB,
    UFC,
    Soccer,
    Esports,
    Other,
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Sport::NBA => "NBA",
            Sport::NFL => "NFL",
            Sport::MLB => "MLB",
            Sport::NHL => "NHL",
            Sport::NCAAB => "NCAAB",
            Sport::UFC => "UFC",
            Sport::Soccer => "Soccer",
            Sport::Esports => "Esports",
            Sport::Other => "Other",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Bet type
// ---------------------------------------------------------------------------

/// Play variant of a multi-leg entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayType {
    Power,
    Flex,
    Standard,
}

impl std::fmt::Display for PlayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PlayType::Power => "Power",
            PlayType::Flex => "Flex",
            PlayType::Standard => "Standard",
        };
        write!(f, "{s}")
    }
}

impl PlayType {
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "power" => Some(PlayType::Power),
            "flex" => Some(PlayType::Flex),
            "standard" => Some(PlayType::Standard),
            _ => None,
        }
    }
}

/// Classified wager kind. `Entry` is the multi-leg pick'em variant and
/// renders as e.g. `"4-Pick Power Play"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetType {
    Spread,
    Moneyline,
    Total,
    PlayerProp,
    Parlay,
    Teaser,
    GameProp,
    Other,
    Entry { legs: u8, play: PlayType },
}

impl std::fmt::Display for BetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BetType::Spread => write!(f, "Spread"),
            BetType::Moneyline => write!(f, "Moneyline"),
            BetType::Total => write!(f, "Total"),
            BetType::PlayerProp => write!(f, "Player Prop"),
            BetType::Parlay => write!(f, "Parlay"),
            BetType::Teaser => write!(f, "Teaser"),
            BetType::GameProp => write!(f, "Game Prop"),
            BetType::Other => write!(f, "Other"),
            BetType::Entry { legs, play } => write!(f, "{legs}-Pick {play} Play"),
        }
    }
}

impl BetType {
    /// Inverse of `Display`. Unrecognized strings classify as `Other` so the
    /// wire format stays total in both directions.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Spread" => BetType::Spread,
            "Moneyline" => BetType::Moneyline,
            "Total" => BetType::Total,
            "Player Prop" => BetType::PlayerProp,
            "Parlay" => BetType::Parlay,
            "Teaser" => BetType::Teaser,
            "Game Prop" => BetType::GameProp,
            other => Self::parse_entry_label(other).unwrap_or(BetType::Other),
        }
    }

    /// Parse `"{N}-Pick {Power|Flex|Standard} Play"`.
    fn parse_entry_label(label: &str) -> Option<Self> {
        let (count, rest) = label.split_once("-Pick ")?;
        let legs = count.parse::<u8>().ok()?;
        let play = PlayType::from_word(rest.strip_suffix(" Play")?)?;
        Some(BetType::Entry { legs, play })
    }
}

impl Serialize for BetType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for BetType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(BetType::from_label(&label))
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetResult {
    Win,
    Loss,
    Push,
    Pending,
}

impl std::fmt::Display for BetResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BetResult::Win => "win",
            BetResult::Loss => "loss",
            BetResult::Push => "push",
            BetResult::Pending => "pending",
        };
        write!(f, "{s}")
    }
}

/// Signed profit for a settled wager: payout minus stake on a win, the lost
/// stake on a loss, zero for pushes and unsettled entries. A win whose payout
/// could not be read settles to zero rather than a negative number.
pub fn settle_profit(result: BetResult, payout: f64, amount: f64) -> f64 {
    match result {
        BetResult::Win if payout > 0.0 => payout - amount,
        BetResult::Win => 0.0,
        BetResult::Loss => -amount,
        BetResult::Push | BetResult::Pending => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Bet — canonical normalized record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bet {
    pub source: Source,
    pub sport: Sport,
    pub matchup: String,
    pub bet_type: BetType,
    pub bet_description: String,
    /// American odds. For multi-leg entries this is derived from the payout
    /// table, never scraped.
    pub odds: i32,
    /// Stake in dollars; 0 when unparseable.
    pub amount: f64,
    pub result: BetResult,
    pub profit: f64,
    /// Capture time, not bet placement time.
    pub scraped_at: DateTime<Utc>,
}

impl Bet {
    /// A record is worth emitting only if it carries some identifying
    /// content: a real matchup or a non-empty description.
    pub fn has_identity(&self) -> bool {
        (!self.matchup.is_empty() && self.matchup != UNKNOWN_MATCHUP)
            || !self.bet_description.is_empty()
    }
}
