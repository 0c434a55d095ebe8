use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tally_core::entities::LogEntry;
use tally_core::enums::ActivityAction;
use tally_core::store::LogFilter;

use crate::cli::root_commands::LogArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_action;
use crate::context::AppContext;
use crate::output::output;

/// One printed log line. Tables leave the detail out.
#[derive(Debug, Serialize)]
struct LogLine {
    id: i64,
    timestamp: DateTime<Utc>,
    action: ActivityAction,
    item_id: Option<i64>,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    instance_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<Value>,
}

impl LogLine {
    fn new(entry: &LogEntry, with_detail: bool) -> Self {
        Self {
            id: entry.id,
            timestamp: entry.timestamp,
            action: entry.action,
            item_id: entry.item_id,
            summary: entry.summary(),
            instance_id: entry.instance_id,
            detail: with_detail
                .then(|| serde_json::to_value(&entry.detail).ok())
                .flatten(),
        }
    }
}

/// Handle `tally log`.
pub async fn handle(
    args: &LogArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let filter = LogFilter {
        item_id: args.item,
        action: args.action.as_deref().map(parse_action).transpose()?,
        limit: Some(effective_limit(flags.limit, ctx.config.general.default_limit)),
    };
    let entries = ctx.service.query_activity(&filter).await?;

    let with_detail = flags.format != OutputFormat::Table;
    let lines = entries
        .iter()
        .map(|entry| LogLine::new(entry, with_detail))
        .collect::<Vec<_>>();
    output(&lines, flags.format)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;
    use tally_core::changes::{ChangeSet, FieldChange};
    use tally_core::entities::LogDetail;
    use tally_core::enums::Field;

    use super::*;

    fn entry() -> LogEntry {
        let mut changes = ChangeSet::default();
        changes.push(FieldChange::new(Field::IsFlagged, false, true));
        LogEntry {
            v: 2,
            id: 12,
            timestamp: Utc.with_ymd_and_hms(2025, 11, 2, 8, 0, 0).unwrap(),
            action: ActivityAction::Flagged,
            item_id: Some(3),
            instance_id: None,
            detail: LogDetail::Changes(changes),
        }
    }

    #[test]
    fn table_lines_omit_detail() {
        let line = serde_json::to_value(LogLine::new(&entry(), false)).unwrap();
        assert_eq!(line["summary"], json!(entry().summary()));
        assert_eq!(line["action"], "flagged");
        assert!(line.get("detail").is_none());
        assert!(line.get("instance_id").is_none());
    }

    #[test]
    fn json_lines_carry_detail() {
        let line = serde_json::to_value(LogLine::new(&entry(), true)).unwrap();
        assert_eq!(line["detail"]["kind"], "changes");
        assert_eq!(line["detail"]["data"][0]["field"], "is_flagged");
    }
}
