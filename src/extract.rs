use crate::datetime::resolve_report_date;
use crate::report::{normalize_summary, ReportEntry, ReportKind};
use chrono::NaiveDate;
use regex::{Captures, Regex};
use tracing::debug;

/// Relayed chat mails repeat a preview of the message before this marker;
/// only the text after its last occurrence is the real message.
const CHAT_MARKER: &str = "Microsoft Teams";

const PLAN_DATED: &str = r"#日報計画\s+(?P<month>[0-9０-９]{1,2})/(?P<day>[0-9０-９]{1,2})\s*(?:要約[:：]\s*)?(?P<summary>.+?)(?:\n|$)";
const RESULT_DATED: &str = r"#日報結果\s+(?P<month>[0-9０-９]{1,2})/(?P<day>[0-9０-９]{1,2})\s*(?:要約[:：]\s*)?(?P<summary>.+?)(?:\n|$)";
const BARE_DATED: &str =
    r"#日報\s+(?P<month>[0-9０-９]{1,2})/(?P<day>[0-9０-９]{1,2})\s+(?P<summary>.+?)(?:\n|$)";
const PLAN_UNDATED: &str = r"#日報計画\s*(?:要約[:：]\s*)?(?P<summary>.+?)(?:\n|$)";
const RESULT_UNDATED: &str = r"#日報結果\s*(?:要約[:：]\s*)?(?P<summary>.+?)(?:\n|$)";
const BARE_UNDATED: &str = r"#日報\s+(?P<summary>.+?)(?:\n|$)";
const DATE_PREFIX: &str = r"^[0-9０-９]{1,2}/[0-9０-９]{1,2}";

/// One way of spelling a report tag.
struct TagRule {
    name: &'static str,
    kind: ReportKind,
    pattern: Regex,
    /// Drop summaries mentioning 計画 or 結果; a bare `#日報` line holding
    /// them was most likely meant as a qualified tag.
    reject_kind_words: bool,
}

impl TagRule {
    fn new(
        name: &'static str,
        kind: ReportKind,
        pattern: &str,
        reject_kind_words: bool,
    ) -> Result<Self, regex::Error> {
        Ok(TagRule {
            name,
            kind,
            pattern: Regex::new(pattern)?,
            reject_kind_words,
        })
    }
}

/// Finds `#日報` report fragments in message text.
pub struct Extractor {
    /// Tags carrying an `M/D` date.
    primary: Vec<TagRule>,
    /// Date-less tags, only consulted when no primary tag matched.
    fallback: Vec<TagRule>,
    date_prefix: Regex,
    summary_max_len: usize,
}

impl Extractor {
    pub fn new(summary_max_len: usize) -> Result<Self, regex::Error> {
        Ok(Extractor {
            primary: vec![
                TagRule::new("plan", ReportKind::Plan, PLAN_DATED, false)?,
                TagRule::new("result", ReportKind::Result, RESULT_DATED, false)?,
                TagRule::new("bare", ReportKind::Result, BARE_DATED, true)?,
            ],
            fallback: vec![
                TagRule::new("plan-undated", ReportKind::Plan, PLAN_UNDATED, false)?,
                TagRule::new("result-undated", ReportKind::Result, RESULT_UNDATED, false)?,
                TagRule::new("bare-undated", ReportKind::Result, BARE_UNDATED, true)?,
            ],
            date_prefix: Regex::new(DATE_PREFIX)?,
            summary_max_len,
        })
    }

    /// Extracts every report entry in `text`.
    ///
    /// `reference` is the date the message was received; it decides the year
    /// of dated tags. Entries come out grouped by rule (plan, result, bare)
    /// and in text order within a rule. Nothing is deduplicated.
    pub fn extract(&self, text: &str, reference: Option<NaiveDate>) -> Vec<ReportEntry> {
        let text = chat_content(text);
        let entries: Vec<_> = self
            .primary
            .iter()
            .flat_map(|rule| self.apply(rule, text, reference))
            .collect();
        if !entries.is_empty() {
            return entries;
        }
        self.fallback
            .iter()
            .flat_map(|rule| self.apply(rule, text, reference))
            .collect()
    }

    fn apply(&self, rule: &TagRule, text: &str, reference: Option<NaiveDate>) -> Vec<ReportEntry> {
        rule.pattern
            .captures_iter(text)
            .filter_map(|caps| self.entry_from(rule, &caps, reference))
            .collect()
    }

    fn entry_from(
        &self,
        rule: &TagRule,
        caps: &Captures,
        reference: Option<NaiveDate>,
    ) -> Option<ReportEntry> {
        let summary = normalize_summary(&caps["summary"], self.summary_max_len);
        if summary.is_empty() {
            return None;
        }
        if rule.reject_kind_words && (summary.contains("計画") || summary.contains("結果")) {
            return None;
        }
        let date = match (caps.name("month"), caps.name("day")) {
            (Some(month), Some(day)) => Some(resolve_report_date(
                parse_number(month.as_str()),
                parse_number(day.as_str()),
                reference,
            )?),
            _ if self.date_prefix.is_match(&summary) => return None,
            _ => None,
        };
        debug!(rule = rule.name, summary = %summary, "matched report tag");
        Some(ReportEntry {
            kind: rule.kind,
            summary,
            date,
        })
    }
}

fn chat_content(text: &str) -> &str {
    match text.rfind(CHAT_MARKER) {
        Some(pos) => &text[pos + CHAT_MARKER.len()..],
        None => text,
    }
}

/// Parses a short run of ASCII or full-width digits.
fn parse_number(s: &str) -> u32 {
    s.chars()
        .filter_map(|c| match c {
            '０'..='９' => Some(c as u32 - '０' as u32),
            _ => c.to_digit(10),
        })
        .fold(0, |n, d| n * 10 + d)
}
