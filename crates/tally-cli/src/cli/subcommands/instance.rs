use clap::Subcommand;

/// Instance commands.
#[derive(Clone, Debug, Subcommand)]
pub enum InstanceCommands {
    /// Add a serialized unit to an item.
    Add {
        item_id: i64,
        #[arg(long)]
        serial: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        condition: Option<String>,
    },
    /// Update an instance.
    Update {
        id: i64,
        #[arg(long)]
        serial: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        condition: Option<String>,
        /// Verification time (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        verified: Option<String>,
    },
    /// Delete an instance.
    Delete { id: i64 },
    /// List the instances of an item.
    List { item_id: i64 },
}
