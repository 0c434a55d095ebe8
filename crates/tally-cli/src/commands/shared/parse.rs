use chrono::{DateTime, Utc};
use tally_core::cell::CellValue;
use tally_core::enums::ActivityAction;
use tally_ingest::coerce::to_date;

/// Parse an activity action, accepting hyphenated spellings.
pub fn parse_action(raw: &str) -> anyhow::Result<ActivityAction> {
    ActivityAction::parse(raw).ok_or_else(|| {
        let known = ActivityAction::ALL
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        anyhow::anyhow!("invalid action '{raw}' (expected one of: {known})")
    })
}

/// Parse a timestamp the way sheet date cells are read.
pub fn parse_timestamp(raw: &str, field: &str) -> anyhow::Result<DateTime<Utc>> {
    to_date(Some(&CellValue::text(raw)))
        .ok_or_else(|| anyhow::anyhow!("invalid {field} '{raw}': expected a date or RFC 3339 time"))
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn parses_hyphenated_action() {
        let action = parse_action("photo-added").expect("action should parse");
        assert_eq!(action, ActivityAction::PhotoAdded);
    }

    #[test]
    fn errors_on_invalid_action() {
        let err = parse_action("renamed").expect_err("should fail");
        assert!(err.to_string().contains("invalid action 'renamed'"));
        assert!(err.to_string().contains("item_added"));
    }

    #[test]
    fn parses_plain_dates_and_timestamps() {
        let day = parse_timestamp("2025-11-02", "--at").expect("date should parse");
        assert_eq!((day.year(), day.month(), day.day()), (2025, 11, 2));

        let ts = parse_timestamp("2025-11-02T08:30:00Z", "--at").expect("timestamp should parse");
        assert_eq!(ts.hour(), 8);
    }

    #[test]
    fn errors_on_garbage_dates() {
        let err = parse_timestamp("soon", "--at").expect_err("should fail");
        assert!(err.to_string().contains("invalid --at 'soon'"));
    }
}
