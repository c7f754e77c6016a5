//! Commodity symbol tables.
//!
//! Both tables are closed and hand-maintained. Nothing here is inferred from
//! the input: a symbol missing from a table is left exactly as written.

/// Legacy commodity names and their canonical V2 symbols.
///
/// V2 symbols are uppercase only. Matching is whole-word and case-sensitive.
pub const RENAMES: &[(&str, &str)] = &[
    ("AirMiles", "AIRMILES"),
    ("Aeroplan", "AEROPLAN"),
    ("VacHrs", "VACHR"),
    ("Hours", "HOURS"),
    ("Points", "POINTS"),
    ("Shares", "SHARES"),
    ("Units", "UNITS"),
    ("Gold", "XAU"),
    ("Silver", "XAG"),
    ("Bitcoin", "BTC"),
];

/// Symbols that V1 files carried in double quotes and V2 writes bare.
pub const QUOTED_SYMBOLS: &[&str] = &[
    "USD", "CAD", "EUR", "GBP", "JPY", "CHF", "AUD", "RBF1005", "RBF1015", "RBF2131", "VBMPX",
    "VIIIX", "HOOL",
];

/// Canonical symbol for a legacy name, if the name is mapped.
pub fn canonical(name: &str) -> Option<&'static str> {
    RENAMES
        .iter()
        .find(|(legacy, _)| *legacy == name)
        .map(|(_, canonical)| *canonical)
}

/// Regex alternation over the given words, longest first so that a word which
/// prefixes another never shadows it.
pub(crate) fn alternation<'a>(words: impl Iterator<Item = &'a str>) -> String {
    let mut words: Vec<&str> = words.collect();
    words.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_lookup() {
        assert_eq!(canonical("VacHrs"), Some("VACHR"));
        assert_eq!(canonical("Gold"), Some("XAU"));
        assert_eq!(canonical("gold"), None);
        assert_eq!(canonical("USD"), None);
    }

    #[test]
    fn test_canonical_symbols_are_uppercase() {
        for (_, symbol) in RENAMES {
            assert!(
                symbol
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
                "{symbol} is not a V2 symbol"
            );
        }
    }

    #[test]
    fn test_legacy_names_are_unique() {
        let mut names: Vec<&str> = RENAMES.iter().map(|(legacy, _)| *legacy).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), RENAMES.len());
    }

    #[test]
    fn test_alternation_longest_first() {
        let alt = alternation(["RBF1", "RBF1005", "USD"].into_iter());
        assert_eq!(alt, "RBF1005|RBF1|USD");
    }
}
