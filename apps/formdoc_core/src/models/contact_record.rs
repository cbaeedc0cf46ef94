use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

pub const HEADER: [&str; 4] = ["Full Name", "Email", "Phone", "Additional Info"];

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactRecord {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub additional_info: String,
}

impl ContactRecord {
    /// Header row plus this record, CRLF terminated, quoted only where needed.
    pub fn to_csv(&self) -> Result<Vec<u8>, ContactError> {
        let mut w = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(Vec::new());
        w.write_record(HEADER)?;
        w.write_record([
            &self.full_name,
            &self.email,
            &self.phone,
            &self.additional_info,
        ])?;
        w.into_inner()
            .map_err(|e| ContactError::Csv(csv::Error::from(e.into_error())))
    }
}

/// The single CSV file the contact form overwrites.
///
/// Writes go through one lock so two requests can never leave a mix of both
/// records behind: the last writer wins whole.
#[derive(Debug)]
pub struct ContactSheet {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ContactSheet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&self, record: &ContactRecord) -> Result<(), ContactError> {
        let bytes = record.to_csv()?;

        let _guard = self.lock.lock().await;
        tokio::fs::write(&self.path, &bytes)
            .await
            .map_err(|source| ContactError::Write {
                path: self.path.clone(),
                source,
            })?;
        info!(path = %self.path.display(), bytes = bytes.len(), "contact sheet written");
        Ok(())
    }
}
