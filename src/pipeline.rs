//! Ordered rule pipeline.
//!
//! A `Pipeline` is a fixed, ordered list of [`Rule`]s. Each line flows through
//! every rule in order, and each rule receives the previous rule's output.
//! Rules are line-local, so running all lines through rule 1, then all through
//! rule 2, and so on gives the same result as this line-at-a-time form.

use crate::error::MigrateError;
use crate::rules::{CATALOG, Rule};
use crate::trace::{LineTrace, RuleHits, TraceStep};
use std::sync::LazyLock;

static STANDARD: LazyLock<Pipeline> = LazyLock::new(|| Pipeline::new(CATALOG.to_vec()));

/// A line after it went through the whole pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    /// Indices of the rules that changed the line, in application order.
    pub fired: Vec<usize>,
}

impl Rewrite {
    pub fn changed(&self) -> bool {
        !self.fired.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    rules: Vec<Rule>,
}

impl Pipeline {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The V1 to V2 pipeline in canonical order, built once per process.
    pub fn standard() -> &'static Pipeline {
        &STANDARD
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names in application order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Fresh statistics sized for this pipeline.
    pub fn new_hits(&self) -> RuleHits {
        RuleHits::new(self.rule_names())
    }

    /// Push one line body through every rule.
    ///
    /// `line_number` only labels a failure.
    pub fn rewrite(&self, line_number: usize, text: &str) -> Result<Rewrite, MigrateError> {
        let mut fired = Vec::new();
        let text = self.run(line_number, text, |index, before, after| {
            if before != after {
                fired.push(index);
            }
        })?;
        Ok(Rewrite { text, fired })
    }

    /// Push one line body through every rule, keeping the text after each.
    pub fn trace(&self, line_number: usize, text: &str) -> Result<LineTrace, MigrateError> {
        let mut steps = Vec::with_capacity(self.rules.len());
        self.run(line_number, text, |index, _, after| {
            steps.push(TraceStep {
                rule: self.rules[index].name(),
                text: after.to_string(),
            });
        })?;
        Ok(LineTrace {
            line_number,
            input: text.to_string(),
            steps,
        })
    }

    fn run(
        &self,
        line_number: usize,
        text: &str,
        mut on_step: impl FnMut(usize, &str, &str),
    ) -> Result<String, MigrateError> {
        let mut current = text.to_string();
        for (index, rule) in self.rules.iter().enumerate() {
            let next = rule.apply(&current).map_err(|source| MigrateError::Rule {
                line_number,
                rule: rule.name(),
                line: text.to_string(),
                source,
            })?;
            on_step(index, &current, &next);
            current = next;
        }
        Ok(current)
    }
}
