//! Trace and statistics types for pipeline runs.
//!
//! A [`LineTrace`] captures one line's journey through every rule. A
//! [`RuleHits`] tallies, across a whole file, how many lines each rule changed.

use std::fmt;

/// The text of a line after one rule ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    pub rule: &'static str,
    pub text: String,
}

/// One line's journey through the pipeline.
///
/// `steps[i]` is the text after rule `i`, so `steps.len()` equals the number
/// of rules in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTrace {
    /// 1-based position of the line in its file.
    pub line_number: usize,
    pub input: String,
    pub steps: Vec<TraceStep>,
}

impl LineTrace {
    /// Final text, or the input when the pipeline is empty.
    pub fn output(&self) -> &str {
        self.steps
            .last()
            .map(|step| step.text.as_str())
            .unwrap_or(&self.input)
    }

    /// Steps whose rule changed the text it was given.
    pub fn changed_steps(&self) -> impl Iterator<Item = &TraceStep> {
        let mut previous = self.input.as_str();
        self.steps.iter().filter(move |&step| {
            let changed = step.text != previous;
            previous = step.text.as_str();
            changed
        })
    }
}

impl fmt::Display for LineTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "line {}: {:?}", self.line_number, self.input)?;
        for step in self.changed_steps() {
            writeln!(f, "  {:<24} {:?}", step.rule, step.text)?;
        }
        write!(f, "  => {:?}", self.output())
    }
}

/// Per-rule change counts for a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHits {
    rules: Vec<&'static str>,
    counts: Vec<usize>,
    lines_read: usize,
    lines_changed: usize,
}

impl RuleHits {
    pub fn new(rules: Vec<&'static str>) -> Self {
        let counts = vec![0; rules.len()];
        Self {
            rules,
            counts,
            lines_read: 0,
            lines_changed: 0,
        }
    }

    /// Record one processed line and the indices of the rules that changed it.
    pub fn record(&mut self, fired: &[usize]) {
        self.lines_read += 1;
        if !fired.is_empty() {
            self.lines_changed += 1;
        }
        for &index in fired {
            if let Some(count) = self.counts.get_mut(index) {
                *count += 1;
            }
        }
    }

    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    pub fn lines_changed(&self) -> usize {
        self.lines_changed
    }

    /// Number of lines changed by the named rule.
    pub fn count(&self, rule: &str) -> usize {
        self.rules
            .iter()
            .position(|name| *name == rule)
            .map(|index| self.counts[index])
            .unwrap_or(0)
    }

    /// `(rule, count)` pairs in pipeline order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.rules.iter().copied().zip(self.counts.iter().copied())
    }
}

impl fmt::Display for RuleHits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (rule, count) in self.iter() {
            writeln!(f, "{rule:<24} {count:>8}")?;
        }
        write!(
            f,
            "{} lines read, {} changed",
            self.lines_read, self.lines_changed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(rule: &'static str, text: &str) -> TraceStep {
        TraceStep {
            rule,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_line_trace_output() {
        let trace = LineTrace {
            line_number: 3,
            input: "@begintag x".to_string(),
            steps: vec![
                step("quote_tag", r#"@begintag "x""#),
                step("unindent_comment", r#"@begintag "x""#),
                step("mark_tag", r##"@begintag #"x""##),
            ],
        };
        assert_eq!(trace.output(), r##"@begintag #"x""##);
        let changed: Vec<&str> = trace.changed_steps().map(|s| s.rule).collect();
        assert_eq!(changed, vec!["quote_tag", "mark_tag"]);
    }

    #[test]
    fn test_line_trace_empty_pipeline() {
        let trace = LineTrace {
            line_number: 1,
            input: "unchanged".to_string(),
            steps: vec![],
        };
        assert_eq!(trace.output(), "unchanged");
        assert_eq!(trace.changed_steps().count(), 0);
    }

    #[test]
    fn test_line_trace_display() {
        let trace = LineTrace {
            line_number: 7,
            input: "a".to_string(),
            steps: vec![step("r1", "b"), step("r2", "b")],
        };
        let text = trace.to_string();
        assert!(text.starts_with("line 7: \"a\""));
        assert!(text.contains("r1"));
        assert!(!text.contains("r2"));
        assert!(text.ends_with("=> \"b\""));
    }

    #[test]
    fn test_rule_hits_record() {
        let mut hits = RuleHits::new(vec!["a", "b", "c"]);
        hits.record(&[0, 2]);
        hits.record(&[]);
        hits.record(&[2]);
        assert_eq!(hits.lines_read(), 3);
        assert_eq!(hits.lines_changed(), 2);
        assert_eq!(hits.count("a"), 1);
        assert_eq!(hits.count("b"), 0);
        assert_eq!(hits.count("c"), 2);
        assert_eq!(hits.count("missing"), 0);
    }

    #[test]
    fn test_rule_hits_display() {
        let mut hits = RuleHits::new(vec!["quote_tag"]);
        hits.record(&[0]);
        let text = hits.to_string();
        assert!(text.contains("quote_tag"));
        assert!(text.ends_with("1 lines read, 1 changed"));
    }
}
