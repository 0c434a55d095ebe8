use tally_core::entities::CanonicalRecord;
use tally_core::updates::{ItemUpdate, ItemUpdateBuilder};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{ItemAddArgs, ItemCommands, ItemUpdateArgs};
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_timestamp;
use crate::context::AppContext;
use crate::output::output;

/// Handle `tally item`.
pub async fn handle(
    action: &ItemCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = &ctx.service;
    match action {
        ItemCommands::List => {
            let limit = effective_limit(flags.limit, ctx.config.general.default_limit);
            output(&service.list_items(Some(limit)).await?, flags.format)
        }
        ItemCommands::Get { id } => output(&service.get_item(*id).await?, flags.format),
        ItemCommands::Add(args) => {
            output(&service.add_item(record_from(args)).await?, flags.format)
        }
        ItemCommands::Update(args) => {
            let update = update_from(args);
            if update.is_empty() {
                anyhow::bail!("nothing to update: pass at least one field flag");
            }
            output(&service.update_item(args.id, &update).await?, flags.format)
        }
        ItemCommands::Delete { id } => output(&service.delete_item(*id).await?, flags.format),
        ItemCommands::Flag { id } => output(&service.flag_item(*id, true).await?, flags.format),
        ItemCommands::Unflag { id } => output(&service.flag_item(*id, false).await?, flags.format),
        ItemCommands::Verify { id, at } => {
            let at = at
                .as_deref()
                .map(|raw| parse_timestamp(raw, "--at"))
                .transpose()?;
            output(&service.verify_item(*id, at).await?, flags.format)
        }
        ItemCommands::PhotoAdd { id, reference } => {
            output(&service.add_photo(*id, reference).await?, flags.format)
        }
        ItemCommands::PhotoRemove { id, reference } => {
            output(&service.remove_photo(*id, reference).await?, flags.format)
        }
        ItemCommands::Notes { id, text } => {
            output(&service.set_notes(*id, text.clone()).await?, flags.format)
        }
    }
}

fn record_from(args: &ItemAddArgs) -> CanonicalRecord {
    CanonicalRecord {
        nomenclature: args.nomenclature.clone(),
        line_item_number: args.lin.clone(),
        stock_number: args.nsn.clone(),
        unit_of_issue: args.ui.clone(),
        quantity_authorized: args.authorized,
        quantity_on_hand: args.on_hand,
        is_flagged: args.flagged,
        notes: args.notes.clone(),
        ..CanonicalRecord::default()
    }
}

fn update_from(args: &ItemUpdateArgs) -> ItemUpdate {
    let mut builder = ItemUpdateBuilder::new();
    if let Some(v) = &args.nomenclature {
        builder = builder.nomenclature(v.as_str());
    }
    if let Some(v) = &args.lin {
        builder = builder.line_item_number(v.as_str());
    }
    if let Some(v) = &args.nsn {
        builder = builder.stock_number(v.as_str());
    }
    if let Some(v) = &args.ui {
        builder = builder.unit_of_issue(v.as_str());
    }
    if let Some(v) = args.authorized {
        builder = builder.quantity_authorized(v);
    }
    if let Some(v) = args.on_hand {
        builder = builder.quantity_on_hand(v);
    }
    if let Some(v) = args.revision {
        builder = builder.expected_revision(v);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn update_args() -> ItemUpdateArgs {
        ItemUpdateArgs {
            id: 1,
            nomenclature: None,
            lin: None,
            nsn: None,
            ui: None,
            authorized: None,
            on_hand: None,
            revision: None,
        }
    }

    #[test]
    fn update_carries_only_given_fields() {
        let args = ItemUpdateArgs {
            on_hand: Some(4.0),
            revision: Some(3),
            ..update_args()
        };
        let update = update_from(&args);
        assert_eq!(
            update,
            ItemUpdateBuilder::new()
                .quantity_on_hand(4.0)
                .expected_revision(3)
                .build()
        );
    }

    #[test]
    fn revision_alone_is_an_empty_update() {
        let args = ItemUpdateArgs {
            revision: Some(3),
            ..update_args()
        };
        assert!(update_from(&args).is_empty());
    }

    #[test]
    fn add_args_fill_a_fresh_record() {
        let args = ItemAddArgs {
            nomenclature: "Radio".to_string(),
            lin: "a1b2c3".to_string(),
            nsn: String::new(),
            ui: "each".to_string(),
            authorized: 10.0,
            on_hand: 7.0,
            notes: None,
            flagged: true,
        };
        let record = record_from(&args);
        assert_eq!(record.id, None);
        assert_eq!(record.unit_of_issue, "each");
        assert!(record.is_flagged);
    }
}
