pub mod docx;
pub mod formatter;
pub mod serializers;
pub mod urls;
pub mod views;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::docx::{ReplacePolicy, TemplateFiller};

/// Which part of the responses payload gets flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlattenSource {
    /// Only the `responses` object.
    Responses,
    /// Every top-level key of the body.
    WholePayload,
}

impl FromStr for FlattenSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "responses" => Ok(Self::Responses),
            "payload" | "whole_payload" => Ok(Self::WholePayload),
            other => Err(format!("unknown flatten source: {other}")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DocsCfg {
    /// Template for the itemized order document. Override with DOCX_TEMPLATE,
    /// otherwise resolved under BASE_DIR.
    pub items_template: PathBuf,
    /// ITEMS_DOCX_POLICY (default: all).
    pub items_policy: ReplacePolicy,
    /// RESPONSES_DOCX_TEMPLATE (default: same as the items template).
    pub responses_template: PathBuf,
    /// RESPONSES_DOCX_POLICY (default: first).
    pub responses_policy: ReplacePolicy,
    /// RESPONSES_DOCX_SOURCE (default: responses).
    pub responses_source: FlattenSource,
}

impl DocsCfg {
    pub fn from_env() -> Self {
        let base_dir = std::env::var("BASE_DIR").unwrap_or(".".into());
        let items_template = std::env::var("DOCX_TEMPLATE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_template(Path::new(&base_dir)));
        let responses_template = std::env::var("RESPONSES_DOCX_TEMPLATE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| items_template.clone());

        let items_policy = std::env::var("ITEMS_DOCX_POLICY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(ReplacePolicy::AllMatches);
        let responses_policy = std::env::var("RESPONSES_DOCX_POLICY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(ReplacePolicy::FirstMatch);
        let responses_source = std::env::var("RESPONSES_DOCX_SOURCE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(FlattenSource::Responses);

        Self {
            items_template,
            items_policy,
            responses_template,
            responses_policy,
            responses_source,
        }
    }
}

pub fn default_template(base_dir: &Path) -> PathBuf {
    base_dir
        .join("apps")
        .join("formdoc_docs")
        .join("templates")
        .join("doc_temp.docx")
}

#[derive(Clone, Debug)]
pub struct DocsState {
    pub items: TemplateFiller,
    pub responses: TemplateFiller,
    pub responses_source: FlattenSource,
}

impl DocsState {
    pub fn new(cfg: &DocsCfg) -> Self {
        Self {
            items: TemplateFiller::new(cfg.items_template.clone(), cfg.items_policy),
            responses: TemplateFiller::new(cfg.responses_template.clone(), cfg.responses_policy),
            responses_source: cfg.responses_source,
        }
    }
}
