//! Symbol list parsing for free-text, comma-separated input.

/// Split `raw` on commas, trim each piece, and drop empty pieces.
///
/// Order and duplicates are preserved. Ticker syntax is not validated; an
/// unknown ticker surfaces later as a per-symbol fetch error.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_drops_empty_pieces() {
        assert_eq!(
            parse_symbols(" RELIANCE, TCS ,  , INFY"),
            vec!["RELIANCE", "TCS", "INFY"]
        );
    }

    #[test]
    fn keeps_duplicates_in_order() {
        assert_eq!(parse_symbols("TCS,INFY,TCS"), vec!["TCS", "INFY", "TCS"]);
    }

    #[test]
    fn blank_input_is_empty() {
        assert!(parse_symbols("").is_empty());
        assert!(parse_symbols(" , ,\n,").is_empty());
    }

    #[test]
    fn multiline_input() {
        assert_eq!(parse_symbols("SBIN,\nHDFCBANK,\n"), vec!["SBIN", "HDFCBANK"]);
    }

    #[test]
    fn does_not_validate_ticker_syntax() {
        assert_eq!(parse_symbols("M&M, bad ticker!"), vec!["M&M", "bad ticker!"]);
    }
}
