//! The price-count heuristic shared by the attribute and raw-text strategies.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use vitrine_core::PriceQuote;

/// Outcome of counting the distinct amounts a heuristic pass found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PriceCount {
    Empty,
    Quote(PriceQuote),
    /// More distinct amounts than the cutoff; the pass defers.
    Ambiguous(usize),
}

/// Interprets the amounts found by one heuristic pass.
///
/// Amounts are deduplicated by value first (`149.9` and `149.90` are the same
/// price). One amount is the selling price; two up to `cutoff` read as a
/// discount display, largest as the list price and smallest as the selling
/// price; anything above `cutoff` is ambiguous.
pub(crate) fn count_prices(amounts: &[Decimal], cutoff: usize) -> PriceCount {
    let distinct: BTreeSet<Decimal> = amounts.iter().copied().collect();
    if distinct.len() > cutoff {
        return PriceCount::Ambiguous(distinct.len());
    }
    match (distinct.first(), distinct.last()) {
        (Some(&lowest), Some(&highest)) if lowest == highest => {
            PriceCount::Quote(PriceQuote::single(lowest))
        }
        (Some(&lowest), Some(&highest)) => {
            PriceCount::Quote(PriceQuote::discounted(highest, lowest))
        }
        _ => PriceCount::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn no_amounts_is_empty() {
        assert_eq!(count_prices(&[], 2), PriceCount::Empty);
    }

    #[test]
    fn one_amount_is_selling_price() {
        assert_eq!(
            count_prices(&[dec("149.90")], 2),
            PriceCount::Quote(PriceQuote::single(dec("149.90")))
        );
    }

    #[test]
    fn two_amounts_are_list_and_selling() {
        let PriceCount::Quote(quote) = count_prices(&[dec("149.90"), dec("199.90")], 2) else {
            panic!("expected a quote");
        };
        assert_eq!(quote.list_price, Some(dec("199.90")));
        assert_eq!(quote.selling_price, Some(dec("149.90")));
    }

    #[test]
    fn duplicates_collapse_before_counting() {
        let amounts = [dec("199.90"), dec("149.9"), dec("149.90"), dec("199.9")];
        let PriceCount::Quote(quote) = count_prices(&amounts, 2) else {
            panic!("expected a quote");
        };
        assert_eq!(quote.list_price, Some(dec("199.90")));
    }

    #[test]
    fn more_than_cutoff_is_ambiguous() {
        let amounts = [dec("10"), dec("20"), dec("30")];
        assert_eq!(count_prices(&amounts, 2), PriceCount::Ambiguous(3));
    }

    #[test]
    fn cutoff_is_tunable() {
        let amounts = [dec("10"), dec("20"), dec("30")];
        let PriceCount::Quote(quote) = count_prices(&amounts, 3) else {
            panic!("expected a quote");
        };
        assert_eq!(quote.list_price, Some(dec("30")));
        assert_eq!(quote.selling_price, Some(dec("10")));
        assert_eq!(
            count_prices(&[dec("10"), dec("20")], 1),
            PriceCount::Ambiguous(2)
        );
    }
}
