use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use tally_core::responses::ExportResponse;
use tally_ingest::ExportTable;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{ExportArgs, ExportFormat};
use crate::context::AppContext;
use crate::output::output;

/// Handle `tally export`. With `--out`, the file is written and the result
/// printed; without it, the export itself goes to stdout.
pub async fn handle(
    args: &ExportArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let format = export_format(args.export_format, args.out.as_deref());
    let table = ctx.service.prepare_export().await?;

    match &args.out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_table(&table, format, BufWriter::new(file))
                .with_context(|| format!("failed to write {}", path.display()))?;
            let audit = ctx.service.record_export(table.len(), format.as_str()).await;
            output(
                &ExportResponse {
                    count: table.len(),
                    format: format.as_str().to_string(),
                    path: Some(path.display().to_string()),
                    audit,
                },
                flags.format,
            )
        }
        None => {
            write_table(&table, format, std::io::stdout().lock())?;
            let audit = ctx.service.record_export(table.len(), format.as_str()).await;
            tracing::info!(count = table.len(), ?audit, "exported to stdout");
            Ok(())
        }
    }
}

fn export_format(explicit: Option<ExportFormat>, out: Option<&Path>) -> ExportFormat {
    explicit.unwrap_or_else(|| {
        let is_json = out
            .and_then(|path| path.extension())
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            ExportFormat::Json
        } else {
            ExportFormat::Csv
        }
    })
}

fn write_table<W: Write>(table: &ExportTable, format: ExportFormat, out: W) -> anyhow::Result<()> {
    match format {
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            writer.write_record(&table.headers)?;
            for row in &table.rows {
                writer.write_record(row.iter().map(ToString::to_string))?;
            }
            writer.flush()?;
        }
        ExportFormat::Json => {
            let mut out = out;
            serde_json::to_writer_pretty(&mut out, &table.to_rows())?;
            writeln!(out)?;
            out.flush()?;
        }
    }
    Ok(())
}
