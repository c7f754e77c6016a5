//! Whole-file migration driver.
//!
//! Reads the input once, pushes every line through the pipeline in order and
//! only hands back output once every line has converted. A fatal rule error
//! aborts the run with nothing emitted, so a half-converted ledger is never
//! produced.

use crate::error::MigrateError;
use crate::line::split_lines;
use crate::pipeline::Pipeline;
use crate::trace::{LineTrace, RuleHits};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// Converted text, one output line per input line, terminators preserved.
    pub output: String,
    pub hits: RuleHits,
}

/// Convert V1 text with the given pipeline.
pub fn migrate_text(pipeline: &Pipeline, input: &str) -> Result<Migration, MigrateError> {
    let mut output = String::with_capacity(input.len() + input.len() / 8);
    let mut hits = pipeline.new_hits();

    for (index, line) in split_lines(input).into_iter().enumerate() {
        let line_number = index + 1;
        let rewrite = pipeline.rewrite(line_number, line.text())?;
        if rewrite.changed() {
            let rules: Vec<&str> = rewrite
                .fired
                .iter()
                .map(|&i| pipeline.rules()[i].name())
                .collect();
            debug!(line = line_number, ?rules, "rewrote line");
        }
        hits.record(&rewrite.fired);
        output.push_str(&line.with_text(rewrite.text).to_string());
    }

    info!(
        lines_read = hits.lines_read(),
        lines_changed = hits.lines_changed(),
        "migration complete"
    );
    Ok(Migration { output, hits })
}

/// Read a V1 file and convert it.
pub fn migrate_file(pipeline: &Pipeline, path: &Path) -> Result<Migration, MigrateError> {
    let input = read_input(path)?;
    info!(path = %path.display(), bytes = input.len(), "read input");
    migrate_text(pipeline, &input)
}

/// Convert V1 text with the standard pipeline.
pub fn migrate(input: &str) -> Result<String, MigrateError> {
    migrate_text(Pipeline::standard(), input).map(|migration| migration.output)
}

/// Trace a single line of `input` through the pipeline.
///
/// Returns `Ok(None)` when `line_number` (1-based) is past the end of input.
pub fn trace_line(
    pipeline: &Pipeline,
    input: &str,
    line_number: usize,
) -> Result<Option<LineTrace>, MigrateError> {
    let Some(line) = line_number
        .checked_sub(1)
        .and_then(|index| split_lines(input).into_iter().nth(index))
    else {
        return Ok(None);
    };
    pipeline.trace(line_number, line.text()).map(Some)
}

/// Read a whole input file, mapping failure to [`MigrateError::Read`].
pub fn read_input(path: &Path) -> Result<String, MigrateError> {
    fs::read_to_string(path).map_err(|source| MigrateError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn spec_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("specs")
    }

    #[test]
    fn test_sample_file_matches_expected() {
        let dir = spec_dir();
        let expected = fs::read_to_string(dir.join("sample-v2.ledger")).unwrap();
        let migration = migrate_file(Pipeline::standard(), &dir.join("sample-v1.ledger")).unwrap();
        for (n, (got, want)) in migration.output.lines().zip(expected.lines()).enumerate() {
            assert_eq!(got, want, "line {} differs", n + 1);
        }
        assert_eq!(migration.output, expected);
    }

    #[test]
    fn test_line_count_and_order_preserved() {
        let input = "b\n@begintag t\na\n\n@endtag t\n";
        let output = migrate(input).unwrap();
        assert_eq!(output.lines().count(), input.lines().count());
        assert_eq!(
            output,
            "b\npushtag #\"t\"\na\n\npoptag #\"t\"\n"
        );
    }

    #[test]
    fn test_terminators_preserved() {
        let output = migrate("@begintag t\r\n;;;;; Cash\r\n  Assets:Cash 1 USD").unwrap();
        assert_eq!(
            output,
            "pushtag #\"t\"\r\n* Cash\r\n  Assets:Cash 1 USD"
        );
    }

    #[test]
    fn test_empty_input() {
        let migration = migrate_text(Pipeline::standard(), "").unwrap();
        assert_eq!(migration.output, "");
        assert_eq!(migration.hits.lines_read(), 0);
    }

    #[test]
    fn test_bad_date_aborts_whole_run() {
        let input = "@begintag t\n@check 2013-06-31 Assets:Cash 1 USD\n@endtag t\n";
        let err = migrate(input).unwrap_err();
        assert_eq!(err.line_number(), Some(2));
        assert!(err.to_string().contains("2013-06-31"));
    }

    #[test]
    fn test_hits_count_rules() {
        let input = "@check 2013-01-01 A 1 USD\n@check 2013-01-02 A 1 USD\nplain\n";
        let migration = migrate_text(Pipeline::standard(), input).unwrap();
        let hits = &migration.hits;
        assert_eq!(hits.lines_read(), 3);
        assert_eq!(hits.lines_changed(), 2);
        assert_eq!(hits.count("strip_directive_prefix"), 2);
        assert_eq!(hits.count("shift_balance_date"), 2);
        assert_eq!(hits.count("quote_narration"), 0);
    }

    #[test]
    fn test_second_run_diverges() {
        let input = "@check 2013-02-27 Assets:Cash 0 USD\n";
        let once = migrate(input).unwrap();
        let twice = migrate(&once).unwrap();
        assert_eq!(once, "2013-02-28 check Assets:Cash 0 USD\n");
        assert_eq!(twice, "2013-03-01 check Assets:Cash 0 USD\n");
        assert_ne!(once, twice);
    }

    #[test]
    fn test_migrate_file_from_tempfile() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "@location 2010-05-01 Paris").unwrap();
        writeln!(file, "defaccount Dr Assets:Cash").unwrap();
        let migration = migrate_file(Pipeline::standard(), file.path()).unwrap();
        assert_eq!(
            migration.output,
            "2010-05-01 event \"location\" \"Paris\"\n1970-01-01 open Assets:Cash\n"
        );
    }

    #[test]
    fn test_migrate_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.ledger");
        let err = migrate_file(Pipeline::standard(), &path).unwrap_err();
        assert!(matches!(err, MigrateError::Read { .. }));
        assert!(err.to_string().contains("missing.ledger"));
    }

    #[test]
    fn test_trace_line() {
        let input = "first\n@location 2010-05-01 Paris\n";
        let trace = trace_line(Pipeline::standard(), input, 2).unwrap().unwrap();
        assert_eq!(trace.input, "@location 2010-05-01 Paris");
        let changed: Vec<&str> = trace.changed_steps().map(|s| s.rule).collect();
        assert_eq!(changed, vec!["location_to_event"]);
        assert!(trace_line(Pipeline::standard(), input, 0).unwrap().is_none());
        assert!(trace_line(Pipeline::standard(), input, 3).unwrap().is_none());
    }
}
