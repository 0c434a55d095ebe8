use std::path::PathBuf;

use anyhow::Context;
use tally_config::TallyConfig;
use tally_db::LocalService;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: LocalService,
    pub config: TallyConfig,
    pub project_root: PathBuf,
}

impl AppContext {
    /// Open the configured store and log backend under `project_root`.
    pub async fn init(project_root: PathBuf, config: TallyConfig) -> anyhow::Result<Self> {
        let service = LocalService::open(&config, &project_root)
            .await
            .context("failed to initialize tally-db service")?;

        Ok(Self {
            service,
            config,
            project_root,
        })
    }
}
