//! The `process` subcommand.

use std::time::Duration;

use clap::Args;
use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};

use crate::{
    cmd::create_writer,
    export::write_exports,
    input::{self, DocumentKind, InputSource},
    ocr::{DEFAULT_MODEL, MistralClient},
    pipeline::{self, PipelineOptions},
    prelude::*,
    throttle::Throttle,
    ui::Ui,
};

/// `process` command line arguments.
#[derive(Debug, Args)]
pub struct ProcessOpts {
    /// What kind of documents to process.
    #[clap(long, value_enum, default_value = "pdf")]
    kind: DocumentKind,

    /// File containing one document URL per line. Use "-" to read from
    /// standard input.
    #[clap(long = "url-list", value_name = "PATH", conflicts_with = "files")]
    url_list: Option<PathBuf>,

    /// Local files to upload instead of URLs.
    #[clap(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Skip blank lines in the URL list instead of submitting them as empty
    /// requests.
    #[clap(long)]
    skip_blanks: bool,

    /// The OCR model to use.
    #[clap(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Minimum number of milliseconds between OCR requests.
    #[clap(long, value_name = "MS", default_value = "1000")]
    min_interval_ms: u64,

    /// Directory for per-document Output_N.{json,txt,md} files.
    #[clap(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Output path for result records, one JSON record per line (default
    /// stdout).
    #[clap(short = 'o', long = "out")]
    pub output_path: Option<PathBuf>,
}

/// The `process` subcommand.
#[instrument(level = "debug", skip_all)]
pub async fn cmd_process(ui: Ui, opts: &ProcessOpts) -> Result<()> {
    // Fail on missing credentials or bad input before any remote call.
    let client = MistralClient::from_env(&opts.model)?;
    let batch = gather_batch(opts).await?;
    info!("processing {} document(s)", batch.len());

    let throttle = Throttle::new(Duration::from_millis(opts.min_interval_ms));
    let pipeline_opts = PipelineOptions::new(opts.kind);

    let pb = ui.new_document_bar(batch.len() as u64);
    let records = pipeline::process_batch(
        &client,
        &throttle,
        &pipeline_opts,
        &batch,
        |done, _total| pb.set_position(done as u64),
    )
    .await;
    pb.finish_with_message("Processing complete");

    for record in &records {
        if let Some(bytes) = &record.preview.image_bytes {
            debug!(
                "kept {} bytes of image preview for {}",
                bytes.len(),
                record.source
            );
        }
    }

    // Write one record per line.
    let mut wtr = create_writer(opts.output_path.as_deref()).await?;
    for (idx, record) in records.iter().enumerate() {
        let line = serde_json::to_string(&record.to_output(idx + 1))
            .context("failed to serialize output record")?;
        wtr.write_all(line.as_bytes())
            .await
            .context("failed to write output record")?;
        wtr.write_all(b"\n")
            .await
            .context("failed to write output record")?;
    }
    wtr.flush().await.context("failed to flush output")?;

    // Write download artifacts, for failed documents too: the artifact then
    // carries the error message, just like the displayed text.
    if let Some(dir) = &opts.export_dir {
        tokio::fs::create_dir_all(dir).await.with_context(|| {
            format!("failed to create export directory {:?}", dir.display())
        })?;
        for (idx, record) in records.iter().enumerate() {
            write_exports(dir, idx + 1, record.outcome.text()).await?;
        }
    }

    let failed = records.iter().filter(|r| !r.outcome.is_success()).count();
    if failed > 0 {
        warn!("{} of {} document(s) failed", failed, records.len());
    }
    Ok(())
}

/// Collect the batch of documents to process.
async fn gather_batch(opts: &ProcessOpts) -> Result<Vec<InputSource>> {
    match &opts.url_list {
        Some(path) if path.as_os_str() == "-" => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("failed to read URLs from stdin")?;
            input::url_batch(&text, opts.skip_blanks)
        }
        Some(path) => {
            let text = tokio::fs::read_to_string(path).await.with_context(|| {
                format!("failed to read URL list {:?}", path.display())
            })?;
            input::url_batch(&text, opts.skip_blanks)
        }
        None => input::upload_batch(opts.kind, &opts.files).await,
    }
}
