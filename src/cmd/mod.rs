//! Command-line entry points.

use tokio::{fs::File, io::AsyncWrite};

use crate::prelude::*;

pub mod process;
pub mod schema;

/// Open `path` for writing, or standard output if no path was given.
pub async fn create_writer(
    path: Option<&Path>,
) -> Result<Box<dyn AsyncWrite + Unpin + Send>> {
    match path {
        Some(path) => {
            let file = File::create(path).await.with_context(|| {
                format!("failed to create output file {:?}", path.display())
            })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(tokio::io::stdout())),
    }
}
