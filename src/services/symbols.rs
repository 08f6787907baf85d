//! Known NSE listings used for symbol search.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnownSymbol {
    pub symbol: &'static str,
    pub name: &'static str,
}

const fn known(symbol: &'static str, name: &'static str) -> KnownSymbol {
    KnownSymbol { symbol, name }
}

pub const KNOWN_SYMBOLS: &[KnownSymbol] = &[
    known("RELIANCE.NS", "Reliance Industries"),
    known("TCS.NS", "Tata Consultancy Services"),
    known("HDFCBANK.NS", "HDFC Bank"),
    known("INFY.NS", "Infosys"),
    known("HINDUNILVR.NS", "Hindustan Unilever"),
    known("ITC.NS", "ITC Limited"),
    known("SBIN.NS", "State Bank of India"),
    known("BHARTIARTL.NS", "Bharti Airtel"),
    known("KOTAKBANK.NS", "Kotak Mahindra Bank"),
    known("LT.NS", "Larsen & Toubro"),
    known("ASIANPAINT.NS", "Asian Paints"),
    known("MARUTI.NS", "Maruti Suzuki"),
    known("BAJFINANCE.NS", "Bajaj Finance"),
    known("HCLTECH.NS", "HCL Technologies"),
    known("WIPRO.NS", "Wipro"),
];

/// Known listings whose symbol or name contains `query`, case-insensitively,
/// in list order. A blank query matches nothing.
pub fn search(query: &str) -> impl Iterator<Item = &'static KnownSymbol> {
    let query = query.trim().to_lowercase();
    KNOWN_SYMBOLS.iter().filter(move |known| {
        !query.is_empty()
            && (known.symbol.to_lowercase().contains(&query)
                || known.name.to_lowercase().contains(&query))
    })
}

/// Display name of a known listing.
pub fn name_of(symbol: &str) -> Option<&'static str> {
    KNOWN_SYMBOLS
        .iter()
        .find(|known| known.symbol.eq_ignore_ascii_case(symbol))
        .map(|known| known.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(query: &str) -> Vec<&'static str> {
        search(query).map(|k| k.symbol).collect()
    }

    #[test]
    fn test_search_matches_symbol_and_name() {
        assert_eq!(symbols("tcs"), vec!["TCS.NS"]);
        assert_eq!(symbols("Bank"), vec!["HDFCBANK.NS", "SBIN.NS", "KOTAKBANK.NS"]);
        assert_eq!(symbols("  infosys "), vec!["INFY.NS"]);
    }

    #[test]
    fn test_search_blank_or_unknown() {
        assert!(symbols("").is_empty());
        assert!(symbols("   ").is_empty());
        assert!(symbols("tesla").is_empty());
    }

    #[test]
    fn test_name_of() {
        assert_eq!(name_of("itc.ns"), Some("ITC Limited"));
        assert_eq!(name_of("AAPL"), None);
    }
}
