//! # ledger-v1tov2
//!
//! A one-shot line rewriter from the legacy V1 ledger dialect to V2.
//!
//! The migration works purely on text. There is no parse tree and no
//! accounting validation: every line goes through a fixed, ordered list of
//! pure rewrite rules and comes out as exactly one line.
//!
//! ## Overview
//!
//! - **Lines**: one physical line, terminator kept aside and restored on output
//! - **Rules**: named pure functions; a line a rule does not recognise passes
//!   through unchanged
//! - **Pipeline**: the rules in canonical order; a rule may rely on every rule
//!   before it having already run on the line
//! - **Executor**: all-or-nothing conversion of a whole file
//!
//! The migration is not idempotent. Running it over already converted output
//! shifts balance dates a second time, among other things.
//!
//! ## Example
//!
//! ```
//! use ledger_v1tov2::migrate;
//!
//! let v1 = "@begintag vacation\n@check 2013-02-28 Assets:Cash 10 USD\n";
//! let v2 = migrate(v1).unwrap();
//!
//! assert_eq!(v2, "pushtag #\"vacation\"\n2013-03-01 check Assets:Cash 10 USD\n");
//! ```

pub mod commodity;
pub mod error;
pub mod executor;
pub mod line;
pub mod pipeline;
pub mod rules;
pub mod trace;

pub use error::{MigrateError, RuleError};
pub use executor::{Migration, migrate, migrate_file, migrate_text, read_input, trace_line};
pub use line::{Line, Terminator, split_lines};
pub use pipeline::{Pipeline, Rewrite};
pub use rules::{CATALOG, Rule};
pub use trace::{LineTrace, RuleHits, TraceStep};
