use tally_core::entities::InstanceFields;
use tally_core::updates::InstanceUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::InstanceCommands;
use crate::commands::shared::parse::parse_timestamp;
use crate::context::AppContext;
use crate::output::output;

/// Handle `tally instance`.
pub async fn handle(
    action: &InstanceCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = &ctx.service;
    match action {
        InstanceCommands::Add {
            item_id,
            serial,
            location,
            condition,
        } => {
            let fields = InstanceFields {
                serial_number: serial.clone(),
                location: location.clone(),
                condition_code: condition.clone(),
                last_verified_at: None,
            };
            output(&service.add_instance(*item_id, fields).await?, flags.format)
        }
        InstanceCommands::Update {
            id,
            serial,
            location,
            condition,
            verified,
        } => {
            let mut builder = InstanceUpdateBuilder::new();
            if let Some(serial) = serial {
                builder = builder.serial_number(serial.as_str());
            }
            if let Some(location) = location {
                builder = builder.location(Some(location.clone()));
            }
            if let Some(condition) = condition {
                builder = builder.condition_code(Some(condition.clone()));
            }
            if let Some(raw) = verified {
                builder = builder.last_verified_at(Some(parse_timestamp(raw, "--verified")?));
            }
            let update = builder.build();
            if update.is_empty() {
                anyhow::bail!("nothing to update: pass at least one field flag");
            }
            output(&service.update_instance(*id, &update).await?, flags.format)
        }
        InstanceCommands::Delete { id } => {
            output(&service.delete_instance(*id).await?, flags.format)
        }
        InstanceCommands::List { item_id } => {
            output(&service.list_instances(*item_id).await?, flags.format)
        }
    }
}
