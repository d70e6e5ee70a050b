use crate::report::{ReportEntry, ReportKind};
use chrono::NaiveDate;

/// Entries for one date, in extraction order.
pub type DateGroup = (NaiveDate, Vec<(ReportKind, String)>);

/// Groups entries by date, dates in order of first appearance. Entries
/// without a date go to `default_date`.
pub fn group_by_date(entries: Vec<ReportEntry>, default_date: NaiveDate) -> Vec<DateGroup> {
    let mut groups: Vec<DateGroup> = vec![];
    for entry in entries {
        let date = entry.date.unwrap_or(default_date);
        let item = (entry.kind, entry.summary);
        match groups.iter_mut().find(|(d, _)| *d == date) {
            Some((_, items)) => items.push(item),
            None => groups.push((date, vec![item])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_by_date() {
        let ymd = |m, d| NaiveDate::from_ymd_opt(2026, m, d).unwrap();
        let entry = |kind, summary: &str, date| ReportEntry {
            kind,
            summary: summary.to_string(),
            date,
        };
        let entries = vec![
            entry(ReportKind::Plan, "a", Some(ymd(2, 21))),
            entry(ReportKind::Plan, "b", None),
            entry(ReportKind::Result, "c", Some(ymd(2, 21))),
            entry(ReportKind::Result, "d", Some(ymd(2, 20))),
        ];
        assert_eq!(
            group_by_date(entries, ymd(2, 20)),
            vec![
                (
                    ymd(2, 21),
                    vec![
                        (ReportKind::Plan, "a".to_string()),
                        (ReportKind::Result, "c".to_string())
                    ]
                ),
                (
                    ymd(2, 20),
                    vec![
                        (ReportKind::Plan, "b".to_string()),
                        (ReportKind::Result, "d".to_string())
                    ]
                ),
            ]
        );
        assert_eq!(group_by_date(vec![], ymd(2, 20)), vec![]);
    }
}
