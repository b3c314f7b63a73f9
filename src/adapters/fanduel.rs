//! FanDuel bet-history adapter. FanDuel marks up its cards with
//! data-test-id hooks alongside class hooks, so those lead the tables.

use std::sync::LazyLock;

use scraper::Selector;

use super::{scrape_cards, CardSelectors, SelectorList, SiteAdapter};
use crate::types::{Bet, Source};

static SELECTORS: LazyLock<CardSelectors> = LazyLock::new(|| CardSelectors {
    containers: Selector::parse(
        "[data-test-id=\"bet-card\"], .bet-card, .settled-bet, [class*=\"BetCard\"], \
         [class*=\"bet-item\"], [class*=\"wager-card\"], [class*=\"bet-history-card\"]",
    )
    .expect("static selector"),
    fallback_containers: Selector::parse("[class*=\"bet\"], [class*=\"wager\"]")
        .expect("static selector"),
    matchup: SelectorList::compile(&[
        ".event-name",
        "[class*=\"event-name\"]",
        "[class*=\"matchup\"]",
        "[class*=\"EventName\"]",
        "[data-test-id=\"event-name\"]",
        ".game-name",
        "h3",
        "h4",
    ]),
    selection: SelectorList::compile(&[
        ".selection-name",
        "[class*=\"selection\"]",
        "[class*=\"bet-name\"]",
        "[class*=\"Selection\"]",
        "[data-test-id=\"selection\"]",
        ".pick-name",
    ]),
    odds: SelectorList::compile(&[
        ".odds-value",
        "[class*=\"odds\"]",
        "[class*=\"price\"]",
        "[class*=\"Odds\"]",
        "[data-test-id=\"odds\"]",
    ]),
    stake: SelectorList::compile(&[
        ".stake-value",
        "[class*=\"stake\"]",
        "[class*=\"wager\"]",
        "[class*=\"Stake\"]",
        "[data-test-id=\"stake\"]",
    ]),
    result: SelectorList::compile(&[
        ".result-badge",
        "[class*=\"result\"]",
        "[class*=\"status\"]",
        "[class*=\"Result\"]",
        "[data-test-id=\"result\"]",
    ]),
    payout: SelectorList::compile(&[
        ".return-value",
        "[class*=\"return\"]",
        "[class*=\"profit\"]",
        "[class*=\"payout\"]",
        "[class*=\"Return\"]",
    ]),
});

pub struct FanDuelAdapter;

impl SiteAdapter for FanDuelAdapter {
    fn source(&self) -> Source {
        Source::Fanduel
    }

    fn scrape(&self, html: &str) -> Vec<Bet> {
        scrape_cards(self.source(), html, &SELECTORS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BetResult, BetType, Sport};

    #[test]
    fn data_test_id_hooks_win() {
        let html = r#"
            <div data-test-id="bet-card">
              <span data-test-id="event-name">Chiefs vs Eagles</span>
              <span data-test-id="selection">Chiefs ML</span>
              <span data-test-id="odds">+150</span>
              <span data-test-id="stake">$20</span>
              <span data-test-id="result">Lost</span>
            </div>
        "#;
        let bets = FanDuelAdapter.scrape(html);
        assert_eq!(bets.len(), 1);
        let bet = &bets[0];
        assert_eq!(bet.source, Source::Fanduel);
        assert_eq!(bet.matchup, "Chiefs vs Eagles");
        assert_eq!(bet.bet_type, BetType::Moneyline);
        assert_eq!(bet.sport, Sport::NFL);
        assert_eq!(bet.odds, 150);
        assert_eq!(bet.amount, 20.0);
        assert_eq!(bet.result, BetResult::Loss);
        assert_eq!(bet.profit, -20.0);
    }
}
