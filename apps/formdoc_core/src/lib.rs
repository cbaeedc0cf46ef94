pub mod http;
pub mod models;
pub mod serializers;
pub mod urls;
pub mod views;

use std::path::PathBuf;
use std::sync::Arc;

use crate::models::contact_record::ContactSheet;

#[derive(Clone, Debug)]
pub struct ContactCfg {
    /// Where the contact form is written. Override with CONTACT_CSV_PATH.
    /// Relative paths resolve against the process working directory.
    pub csv_path: PathBuf,
}

impl ContactCfg {
    pub fn from_env() -> Self {
        let csv_path = std::env::var("CONTACT_CSV_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("output.csv"));

        Self { csv_path }
    }
}

#[derive(Clone)]
pub struct CoreState {
    pub contacts: Arc<ContactSheet>,
}

impl CoreState {
    pub fn new(cfg: &ContactCfg) -> Self {
        Self {
            contacts: Arc::new(ContactSheet::new(cfg.csv_path.clone())),
        }
    }
}
