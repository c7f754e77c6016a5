//! Property tests over the standard pipeline.

use ledger_v1tov2::{Pipeline, migrate};
use proptest::prelude::*;

fn rewrite(text: &str) -> String {
    Pipeline::standard().rewrite(1, text).unwrap().text
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn unrecognised_lines_are_untouched(line in "[a-z ]{0,60}") {
        prop_assert_eq!(rewrite(&line), line);
    }

    #[test]
    fn postings_without_known_symbols_are_untouched(
        account in "(Assets|Expenses|Income):[A-Z][a-z]{1,10}",
        amount in "-?[0-9]{1,5}\\.[0-9]{2}",
        currency in "(USD|CAD|EUR)",
    ) {
        let line = format!("  {account}   {amount} {currency}");
        prop_assert_eq!(rewrite(&line), line);
    }

    #[test]
    fn quoted_narration_has_no_inner_double_quotes(
        narration in "[A-Za-z][A-Za-z\"' ]{0,40}",
    ) {
        let out = rewrite(&format!("2013-05-01 * {narration}"));
        let inner = out
            .strip_prefix("2013-05-01 * \"")
            .and_then(|rest| rest.strip_suffix('"'));
        prop_assert!(inner.is_some(), "unexpected shape: {}", out);
        prop_assert!(!inner.unwrap_or_default().contains('"'));
    }

    #[test]
    fn date_pair_keeps_both_dates(
        month in 1u32..=12,
        day in 1u32..=28,
        narration in "[A-Za-z][a-z ]{0,20}",
    ) {
        let first = format!("2013-{month:02}-{day:02}");
        let second = format!("2014-{month:02}-{day:02}");
        let out = rewrite(&format!("{first}={second} * {narration}"));
        prop_assert!(out.starts_with(&first));
        let expected_suffix = format!("{{{second}}}");
        prop_assert!(out.ends_with(&expected_suffix));
    }

    #[test]
    fn output_has_one_line_per_input_line(lines in prop::collection::vec("[a-z@; ]{0,20}", 0..20)) {
        let input: String = lines.iter().map(|l| format!("{l}\n")).collect();
        let output = migrate(&input).unwrap();
        prop_assert_eq!(output.lines().count(), input.lines().count());
    }
}
