//! DraftKings bet-history adapter: class-hook selectors over the shared
//! card/table engine.

use std::sync::LazyLock;

use scraper::Selector;

use super::{scrape_cards, CardSelectors, SelectorList, SiteAdapter};
use crate::types::{Bet, Source};

static SELECTORS: LazyLock<CardSelectors> = LazyLock::new(|| CardSelectors {
    containers: Selector::parse(
        "[class*=\"bet-card\"], [class*=\"BetCard\"], [class*=\"settled\"], \
         .history-item, .bet-slip-card, [class*=\"wager-item\"], [class*=\"bet-history\"]",
    )
    .expect("static selector"),
    fallback_containers: Selector::parse("[class*=\"bet\"], [class*=\"wager\"]")
        .expect("static selector"),
    matchup: SelectorList::compile(&[
        ".game-name",
        ".EventName",
        "[class*=\"event\"]",
        "[class*=\"matchup\"]",
        "[class*=\"game-name\"]",
        "[class*=\"EventName\"]",
        "h3",
        "h4",
    ]),
    selection: SelectorList::compile(&[
        ".selection",
        ".Selection",
        "[class*=\"selection\"]",
        "[class*=\"outcome\"]",
        "[class*=\"pick\"]",
        "[class*=\"Selection\"]",
    ]),
    odds: SelectorList::compile(&[
        ".price",
        ".american-odds",
        "[class*=\"odds\"]",
        "[class*=\"price\"]",
        "[class*=\"american\"]",
    ]),
    stake: SelectorList::compile(&[
        ".risk",
        ".wager",
        "[class*=\"stake\"]",
        "[class*=\"wager\"]",
        "[class*=\"risk\"]",
    ]),
    result: SelectorList::compile(&[
        ".outcome-status",
        "[class*=\"result\"]",
        "[class*=\"status\"]",
        "[class*=\"outcome-status\"]",
    ]),
    payout: SelectorList::compile(&[
        ".payout",
        ".winnings",
        "[class*=\"return\"]",
        "[class*=\"profit\"]",
        "[class*=\"payout\"]",
        "[class*=\"winnings\"]",
    ]),
});

pub struct DraftKingsAdapter;

impl SiteAdapter for DraftKingsAdapter {
    fn source(&self) -> Source {
        Source::Draftkings
    }

    fn scrape(&self, html: &str) -> Vec<Bet> {
        scrape_cards(self.source(), html, &SELECTORS)
    }
}
