//! The `schema` subcommand.

use clap::Args;
use schemars::schema_for;
use tokio::io::AsyncWriteExt as _;

use crate::{cmd::create_writer, pipeline::DocumentOutput, prelude::*};

/// Schema command line arguments.
#[derive(Debug, Args)]
pub struct SchemaOpts {
    /// The output path to write the schema to.
    #[clap(short = 'o', long = "out")]
    pub output_path: Option<PathBuf>,
}

/// The `schema` subcommand. Prints the JSON Schema for the records `process`
/// writes.
#[instrument(level = "debug", skip_all)]
pub async fn cmd_schema(opts: &SchemaOpts) -> Result<()> {
    let schema = schema_for!(DocumentOutput);
    let schema_str =
        serde_json::to_string_pretty(&schema).context("failed to serialize schema")?;

    let mut wtr = create_writer(opts.output_path.as_deref()).await?;
    wtr.write_all(schema_str.as_bytes())
        .await
        .context("failed to write schema")?;
    wtr.write_all(b"\n").await.context("failed to write schema")?;
    wtr.flush().await.context("failed to flush schema")?;
    Ok(())
}
