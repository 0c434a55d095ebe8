use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    tracing::debug!(project_root = %ctx.project_root.display(), ?command, "dispatching");
    match command {
        Commands::Import(args) => commands::import::handle(&args, ctx, flags).await,
        Commands::Export(args) => commands::export::handle(&args, ctx, flags).await,
        Commands::Item { action } => commands::item::handle(&action, ctx, flags).await,
        Commands::Instance { action } => commands::instance::handle(&action, ctx, flags).await,
        Commands::Log(args) => commands::log::handle(&args, ctx, flags).await,
    }
}
