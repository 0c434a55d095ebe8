#[path = "import/read.rs"]
mod read;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tally_db::{ImportOptions, ServiceError};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ImportArgs;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

/// Handle `tally import`.
pub async fn handle(
    args: &ImportArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let format = read::detect_format(&args.file, args.input)?;
    let rows = read::read_rows(&args.file, format)?;

    let source = args.source.clone().unwrap_or_else(|| {
        args.file.file_name().map_or_else(
            || args.file.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    });

    let cancel = Arc::new(AtomicBool::new(false));
    let watcher = {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received; stopping import after the current row");
                cancel.store(true, Ordering::Relaxed);
            }
        })
    };

    let options = ImportOptions::default()
        .with_source(source)
        .stop_on_error(args.stop_on_error || ctx.config.import.stop_on_error)
        .with_cancel(cancel);

    let progress = Progress::bar(rows.len() as u64, "importing rows");
    let rows = rows.into_iter().inspect(|_| progress.inc(1));
    let result = match args.legacy_version {
        Some(version) => ctx.service.import_legacy(rows, version, &options).await,
        None => ctx.service.import_rows(rows, &options).await,
    };
    watcher.abort();

    match result {
        Ok(outcome) => {
            progress.finish_clear();
            if outcome.value.aborted {
                tracing::warn!(
                    accepted = outcome.value.accepted,
                    "import stopped before the last row"
                );
            }
            output(&outcome, flags.format)
        }
        Err(ServiceError::PartialImport { summary, source }) => {
            progress.finish_err("import failed");
            output(&summary, flags.format)?;
            Err(anyhow::Error::new(source).context(format!(
                "import aborted after {} records were saved",
                summary.accepted
            )))
        }
        Err(error) => {
            progress.finish_err("import failed");
            Err(error.into())
        }
    }
}
