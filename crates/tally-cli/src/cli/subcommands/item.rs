use clap::{Args, Subcommand};

/// Item commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ItemCommands {
    /// List items.
    List,
    /// Get an item and its instances.
    Get { id: i64 },
    /// Add an item by hand.
    Add(ItemAddArgs),
    /// Update item fields.
    Update(ItemUpdateArgs),
    /// Delete an item and its instances.
    Delete { id: i64 },
    /// Flag an item for attention.
    Flag { id: i64 },
    /// Clear an item's flag.
    Unflag { id: i64 },
    /// Mark an item verified (now, or at --at).
    Verify {
        id: i64,
        /// Verification time (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        at: Option<String>,
    },
    /// Attach a photo reference.
    PhotoAdd { id: i64, reference: String },
    /// Detach a photo reference.
    PhotoRemove { id: i64, reference: String },
    /// Set notes, or clear them when no text is given.
    Notes { id: i64, text: Option<String> },
}

#[derive(Clone, Debug, Args)]
pub struct ItemAddArgs {
    #[arg(long)]
    pub nomenclature: String,
    #[arg(long, default_value = "")]
    pub lin: String,
    #[arg(long, default_value = "")]
    pub nsn: String,
    /// Unit of issue (code or long name)
    #[arg(long, default_value = "")]
    pub ui: String,
    #[arg(long, default_value_t = 0.0)]
    pub authorized: f64,
    #[arg(long, default_value_t = 0.0)]
    pub on_hand: f64,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub flagged: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ItemUpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub nomenclature: Option<String>,
    #[arg(long)]
    pub lin: Option<String>,
    #[arg(long)]
    pub nsn: Option<String>,
    #[arg(long)]
    pub ui: Option<String>,
    #[arg(long)]
    pub authorized: Option<f64>,
    #[arg(long)]
    pub on_hand: Option<f64>,
    /// Reject the update unless the item is still at this revision
    #[arg(long)]
    pub revision: Option<u32>,
}
