//! Export filters and the query strings built from them.
//!
//! Both the preview endpoint and the download endpoint take the same filter
//! parameters. Absent filters are left out of the query entirely; the backend
//! treats an empty `date_from=` differently from a missing one.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use url::Url;

use crate::model::CategoryId;

/// File format offered by the `/export/{format}/` views.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Short description shown next to the format choice.
    pub fn blurb(self) -> &'static str {
        match self {
            ExportFormat::Csv => "Spreadsheet",
            ExportFormat::Json => "Data Format",
            ExportFormat::Pdf => "Document",
        }
    }
}

/// Export file name restricted to `[A-Za-z0-9_-]`.
///
/// Every other character is replaced one-for-one with `_` when the value is
/// created, so a `Filename` can never hold anything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Filename(String);

impl Filename {
    pub const DEFAULT: &'static str = "volunteer_opportunities";

    pub fn sanitize(raw: &str) -> Self {
        Self(
            raw.chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                        c
                    } else {
                        '_'
                    }
                })
                .collect(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Filename {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl From<String> for Filename {
    fn from(raw: String) -> Self {
        Self::sanitize(&raw)
    }
}

impl From<Filename> for String {
    fn from(name: Filename) -> Self {
        name.0
    }
}

impl std::fmt::Display for Filename {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Date range and category selection shared by preview and export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFilters {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub categories: BTreeSet<CategoryId>,
}

impl ExportFilters {
    pub fn is_empty(&self) -> bool {
        self.date_from.is_none() && self.date_to.is_none() && self.categories.is_empty()
    }

    /// Query pairs in the order the portal expects them. `categories[]` repeats
    /// once per selected category.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(from) = self.date_from {
            pairs.push(("date_from", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.date_to {
            pairs.push(("date_to", to.format("%Y-%m-%d").to_string()));
        }
        for id in &self.categories {
            pairs.push(("categories[]", id.to_string()));
        }
        pairs
    }
}

/// Everything needed to build the download URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub filters: ExportFilters,
    pub filename: Filename,
}

impl ExportRequest {
    /// The name the export is stored under. An empty filename falls back to
    /// the default so the file never ends up as a bare `.csv`.
    pub fn effective_filename(&self) -> &str {
        if self.filename.is_empty() {
            Filename::DEFAULT
        } else {
            self.filename.as_str()
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.effective_filename(), self.format.extension())
    }

    /// Filter pairs followed by `filename`, which is always sent and always last.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.filters.query_pairs();
        pairs.push(("filename", self.effective_filename().to_string()));
        pairs
    }

    /// `<base>/export/<format>/?<filters>&filename=<name>`
    pub fn url(&self, base: &Url) -> Result<Url, url::ParseError> {
        let mut url = base.join(&format!("export/{}/", self.format))?;
        url.query_pairs_mut()
            .extend_pairs(self.query_pairs().iter().map(|(k, v)| (*k, v.as_str())));
        Ok(url)
    }
}
