//! Line rewrite rules.
//!
//! Every rule is a pure function from one line body to one line body. A rule
//! that does not recognise its pattern returns the line unchanged. Rules are
//! order-dependent: each one may assume that every rule listed before it in
//! [`CATALOG`] has already run on the same line.

use crate::commodity::{self, QUOTED_SYMBOLS, RENAMES};
use crate::error::RuleError;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

/// Signature shared by every rewrite rule.
pub type RewriteFn = fn(&str) -> Result<String, RuleError>;

/// A named, pure line rewrite.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    name: &'static str,
    summary: &'static str,
    rewrite: RewriteFn,
}

impl Rule {
    pub const fn new(name: &'static str, summary: &'static str, rewrite: RewriteFn) -> Self {
        Self {
            name,
            summary,
            rewrite,
        }
    }

    /// The rule's identifier, used in diagnostics and statistics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// One-line description of what the rule rewrites.
    pub fn summary(&self) -> &'static str {
        self.summary
    }

    /// Rewrite one line body. Non-matching input comes back unchanged.
    pub fn apply(&self, text: &str) -> Result<String, RuleError> {
        (self.rewrite)(text)
    }
}

/// Every rule in canonical application order.
pub const CATALOG: [Rule; 17] = [
    Rule::new(
        "collapse_date_pair",
        "DATE1=DATE2 rest  ->  DATE1 rest {DATE2}",
        collapse_date_pair,
    ),
    Rule::new(
        "quote_narration",
        "DATE FLAG payee | narration  ->  DATE FLAG \"payee\" \"narration\"",
        quote_narration,
    ),
    Rule::new(
        "rename_commodities",
        "legacy commodity names  ->  canonical uppercase symbols",
        rename_commodities,
    ),
    Rule::new(
        "comment_deprecated",
        "@var / @defvar / @defcomm  ->  ; comment",
        comment_deprecated,
    ),
    Rule::new(
        "quote_tag",
        "@begintag X  ->  @begintag \"X\"",
        quote_tag,
    ),
    Rule::new(
        "unindent_comment",
        "indented ; comment  ->  unindented comment",
        unindent_comment,
    ),
    Rule::new(
        "unindent_directive",
        "indented @keyword   arg  ->  @keyword arg",
        unindent_directive,
    ),
    Rule::new(
        "mark_tag",
        "@begintag \"X\"  ->  @begintag #\"X\"",
        mark_tag,
    ),
    Rule::new(
        "unquote_currency",
        "\"USD\"  ->  USD for known symbols",
        unquote_currency,
    ),
    Rule::new(
        "location_to_event",
        "@location DATE text  ->  DATE event \"location\" \"text\"",
        location_to_event,
    ),
    Rule::new(
        "rename_tag_keyword",
        "@begintag / @endtag  ->  @pushtag / @poptag",
        rename_tag_keyword,
    ),
    Rule::new(
        "strip_directive_prefix",
        "@keyword  ->  keyword",
        strip_directive_prefix,
    ),
    Rule::new(
        "reorder_dated_directive",
        "keyword DATE rest  ->  DATE keyword rest",
        reorder_dated_directive,
    ),
    Rule::new(
        "convert_defaccount",
        "defaccount Dr|Cr ACCOUNT rest  ->  1970-01-01 open ACCOUNT rest",
        convert_defaccount,
    ),
    Rule::new(
        "reactivate_commented",
        ";@keyword DATE rest  ->  DATE keyword rest",
        reactivate_commented,
    ),
    Rule::new(
        "promote_heading",
        ";;;;; Title  ->  * Title",
        promote_heading,
    ),
    Rule::new(
        "shift_balance_date",
        "DATE check|balance  ->  DATE+1 check|balance",
        shift_balance_date,
    ),
];

/// Date of the `open` directives generated from `defaccount`.
pub const OPEN_DATE: &str = "1970-01-01";

/// Column width the account name is padded to in generated `open` lines.
pub const OPEN_ACCOUNT_WIDTH: usize = 48;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Last year a four-digit `YYYY-MM-DD` date can name.
const MAX_YEAR: i32 = 9999;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("rule patterns are valid regexes")
}

static DATE_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"^(\d{4}-\d{2}-\d{2})=(\d{4}-\d{2}-\d{2})(.*)$"));

static TXN_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"^(\d{4}-\d{2}-\d{2})\s+([*!])\s+(?:([^|]*?)\s*\|\s*)?(\S.*?)(\s+\{\d{4}-\d{2}-\d{2}\})?\s*$")
});

static TXN_HEADER_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"^\d{4}-\d{2}-\d{2}\s+[*!]\s"));

static COMMODITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    let names = commodity::alternation(RENAMES.iter().map(|(legacy, _)| *legacy));
    re(&format!(r"\b(?:{names})\b"))
});

static DEPRECATED_RE: LazyLock<Regex> = LazyLock::new(|| re(r"^[ \t]*@(?:var|defvar|defcomm)\b"));

static QUOTE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"^(\s*)@(begintag|endtag)(\s+)(\S.*?)\s*$"));

static INDENTED_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| re(r"^[ \t]+(;.*)$"));

static DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"^[ \t]*@([A-Za-z]+)[ \t]+(\S.*)$"));

static MARK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| re(r#"^@(begintag|endtag) "(.*)"$"#));

static QUOTED_SYMBOL_RE: LazyLock<Regex> = LazyLock::new(|| {
    let symbols = commodity::alternation(QUOTED_SYMBOLS.iter().copied());
    re(&format!(r#"([0-9@][ \t]+)"({symbols})""#))
});

static LOCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"^@location\s+(\d{4}-\d{2}-\d{2})\s+(\S.*?)\s*$"));

static TAG_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| re(r"^@(begintag|endtag)\b"));

static PREFIXED_DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"^@(pushtag|poptag|defaccount|check|balance|pad|price|close|include|option)\b")
});

static KEYWORD_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"^(check|balance|pad|price|close)\s+(\d{4}-\d{2}-\d{2})\b(.*)$"));

static DEFACCOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"^defaccount\s+(?:Dr|Cr)\s+(\S+)(.*)$"));

static COMMENTED_DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"^;@(check|balance|pad|price|close)\s+(\d{4}-\d{2}-\d{2})\b(.*)$"));

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| re(r"^;{5}[ \t]+(\S.*?)\s*$"));

static BALANCE_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"^(\d{4}-\d{2}-\d{2})(\s+(?:check|balance)\b.*)$"));

/// Wrap free text in double quotes, turning embedded double quotes into
/// single quotes so the result is a single well-formed string literal.
fn quote(text: &str) -> String {
    format!("\"{}\"", text.trim().replace('"', "'"))
}

/// Apply `f` to the parts of `text` that are outside double-quoted strings.
/// An unterminated quote protects the rest of the line.
fn map_unquoted(text: &str, f: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('"') {
        out.push_str(&f(&rest[..open]));
        let quoted = &rest[open..];
        match quoted[1..].find('"') {
            Some(close) => {
                let end = close + 2;
                out.push_str(&quoted[..end]);
                rest = &quoted[end..];
            }
            None => {
                out.push_str(quoted);
                return out;
            }
        }
    }
    out.push_str(&f(rest));
    out
}

/// `2013-01-01=2013-01-05 * Coffee` becomes `2013-01-01 * Coffee {2013-01-05}`.
pub fn collapse_date_pair(text: &str) -> Result<String, RuleError> {
    let Some(caps) = DATE_PAIR_RE.captures(text) else {
        return Ok(text.to_string());
    };
    Ok(format!(
        "{}{} {{{}}}",
        &caps[1],
        caps[3].trim_end(),
        &caps[2]
    ))
}

/// Quote the payee and narration of a transaction header.
///
/// A trailing `{DATE}` annotation left by [`collapse_date_pair`] stays outside
/// the quotes.
pub fn quote_narration(text: &str) -> Result<String, RuleError> {
    let Some(caps) = TXN_HEADER_RE.captures(text) else {
        return Ok(text.to_string());
    };
    let mut out = format!("{} {}", &caps[1], &caps[2]);
    if let Some(payee) = caps.get(3) {
        out.push(' ');
        out.push_str(&quote(payee.as_str()));
    }
    out.push(' ');
    out.push_str(&quote(&caps[4]));
    if let Some(annotation) = caps.get(5) {
        out.push(' ');
        out.push_str(annotation.as_str().trim());
    }
    Ok(out)
}

/// Whole-word rename of legacy commodity names, leaving quoted strings and
/// account names (`Assets:Gold`, `Assets:My-Gold`) alone. Any whitespace
/// delimited token containing `:` is an account.
pub fn rename_commodities(text: &str) -> Result<String, RuleError> {
    if !COMMODITY_RE.is_match(text) {
        return Ok(text.to_string());
    }
    Ok(map_unquoted(text, |segment| {
        let mut out = String::with_capacity(segment.len());
        let mut last = 0;
        for m in COMMODITY_RE.find_iter(segment) {
            let token_start = segment[..m.start()]
                .rfind(|c: char| c.is_ascii_whitespace())
                .map_or(0, |i| i + 1);
            let token_end = segment[m.end()..]
                .find(|c: char| c.is_ascii_whitespace())
                .map_or(segment.len(), |i| m.end() + i);
            let in_account = segment[token_start..token_end].contains(':');
            out.push_str(&segment[last..m.start()]);
            match commodity::canonical(m.as_str()) {
                Some(symbol) if !in_account => out.push_str(symbol),
                _ => out.push_str(m.as_str()),
            }
            last = m.end();
        }
        out.push_str(&segment[last..]);
        out
    }))
}

/// Deprecated declarations are kept as comments for manual review.
pub fn comment_deprecated(text: &str) -> Result<String, RuleError> {
    if DEPRECATED_RE.is_match(text) {
        Ok(format!("; {}", text.trim_start()))
    } else {
        Ok(text.to_string())
    }
}

/// First tag stage: quote the argument, keeping indentation and spacing.
pub fn quote_tag(text: &str) -> Result<String, RuleError> {
    let Some(caps) = QUOTE_TAG_RE.captures(text) else {
        return Ok(text.to_string());
    };
    Ok(format!(
        "{}@{}{}{}",
        &caps[1],
        &caps[2],
        &caps[3],
        quote(&caps[4])
    ))
}

pub fn unindent_comment(text: &str) -> Result<String, RuleError> {
    match INDENTED_COMMENT_RE.captures(text) {
        Some(caps) => Ok(caps[1].to_string()),
        None => Ok(text.to_string()),
    }
}

/// Legacy `@` directives start at column zero with a single space before
/// their argument.
pub fn unindent_directive(text: &str) -> Result<String, RuleError> {
    match DIRECTIVE_RE.captures(text) {
        Some(caps) => Ok(format!("@{} {}", &caps[1], &caps[2])),
        None => Ok(text.to_string()),
    }
}

/// Second tag stage: prefix the quoted argument with the tag marker.
///
/// Only matches the normalised `@begintag "X"` shape produced by
/// [`quote_tag`] and [`unindent_directive`].
pub fn mark_tag(text: &str) -> Result<String, RuleError> {
    match MARK_TAG_RE.captures(text) {
        Some(caps) => Ok(format!("@{} #\"{}\"", &caps[1], &caps[2])),
        None => Ok(text.to_string()),
    }
}

/// Unquote allow-listed commodity symbols in amount position, that is right
/// after a number, a date or a price `@`. String arguments such as
/// `@option "operating_currency" "USD"` keep their quotes, and transaction
/// headers are skipped entirely.
pub fn unquote_currency(text: &str) -> Result<String, RuleError> {
    if TXN_HEADER_PREFIX_RE.is_match(text) {
        return Ok(text.to_string());
    }
    Ok(QUOTED_SYMBOL_RE.replace_all(text, "${1}${2}").into_owned())
}

pub fn location_to_event(text: &str) -> Result<String, RuleError> {
    let Some(caps) = LOCATION_RE.captures(text) else {
        return Ok(text.to_string());
    };
    Ok(format!(
        "{} event \"location\" {}",
        &caps[1],
        quote(&caps[2])
    ))
}

/// Third tag stage: begin/end become push/pop.
pub fn rename_tag_keyword(text: &str) -> Result<String, RuleError> {
    let Some(caps) = TAG_KEYWORD_RE.captures(text) else {
        return Ok(text.to_string());
    };
    let keyword = if &caps[1] == "begintag" {
        "@pushtag"
    } else {
        "@poptag"
    };
    Ok(format!("{keyword}{}", &text[caps[0].len()..]))
}

pub fn strip_directive_prefix(text: &str) -> Result<String, RuleError> {
    Ok(PREFIXED_DIRECTIVE_RE.replace(text, "${1}").into_owned())
}

/// `check 2013-01-01 Assets:Cash 10 USD` becomes
/// `2013-01-01 check Assets:Cash 10 USD`.
pub fn reorder_dated_directive(text: &str) -> Result<String, RuleError> {
    match KEYWORD_DATE_RE.captures(text) {
        Some(caps) => Ok(format!("{} {}{}", &caps[2], &caps[1], &caps[3])),
        None => Ok(text.to_string()),
    }
}

/// Account declarations become `open` directives at [`OPEN_DATE`], with the
/// account padded to [`OPEN_ACCOUNT_WIDTH`] so trailing currency constraints
/// line up.
pub fn convert_defaccount(text: &str) -> Result<String, RuleError> {
    let Some(caps) = DEFACCOUNT_RE.captures(text) else {
        return Ok(text.to_string());
    };
    let account = &caps[1];
    let rest = caps[2].trim();
    let line = format!("{OPEN_DATE} open {account:<width$} {rest}", width = OPEN_ACCOUNT_WIDTH);
    Ok(line.trim_end().to_string())
}

pub fn reactivate_commented(text: &str) -> Result<String, RuleError> {
    match COMMENTED_DIRECTIVE_RE.captures(text) {
        Some(caps) => Ok(format!("{} {}{}", &caps[2], &caps[1], &caps[3])),
        None => Ok(text.to_string()),
    }
}

/// `;;;;; Title` (exactly five semicolons) becomes the outline header `* Title`.
pub fn promote_heading(text: &str) -> Result<String, RuleError> {
    match HEADING_RE.captures(text) {
        Some(caps) => Ok(format!("* {}", &caps[1])),
        None => Ok(text.to_string()),
    }
}

/// Advance the date of a balance check by one calendar day.
///
/// V1 checks asserted the balance at the end of the day, V2 at the start.
pub fn shift_balance_date(text: &str) -> Result<String, RuleError> {
    let Some(caps) = BALANCE_RE.captures(text) else {
        return Ok(text.to_string());
    };
    let invalid = || RuleError::InvalidDate {
        date: caps[1].to_string(),
    };
    let date = NaiveDate::parse_from_str(&caps[1], DATE_FORMAT).map_err(|_| invalid())?;
    let next = date
        .succ_opt()
        .filter(|next| next.year() <= MAX_YEAR)
        .ok_or_else(invalid)?;
    Ok(format!("{}{}", next.format(DATE_FORMAT), &caps[2]))
}
