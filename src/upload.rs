use std::path::{Path, PathBuf};

use regex::Regex;

use crate::config::ImportConfig;
use crate::error::AppError;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// A file that passed the picker's type and size checks.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub mime_type: &'static str,
    pub size: u64,
}

/// Gatekeeper in front of imports: restricts the file type and size.
#[derive(Debug, Clone)]
pub struct FilePicker {
    accept: Vec<AcceptRule>,
    max_size_mb: u64,
}

#[derive(Debug, Clone)]
enum AcceptRule {
    Any,
    Extension(String),
    Mime(Regex),
}

impl FilePicker {
    /// `accept` is a comma-separated list of `.ext` entries or MIME patterns
    /// such as `application/*`; `*` accepts anything.
    pub fn new(accept: &str, max_size_mb: u64) -> Result<Self, AppError> {
        let mut rules = Vec::new();
        for entry in accept.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let rule = if entry == "*" || entry == "*/*" {
                AcceptRule::Any
            } else if let Some(ext) = entry.strip_prefix('.') {
                AcceptRule::Extension(ext.to_ascii_lowercase())
            } else {
                let pattern = format!("^{}$", regex::escape(entry).replace(r"\*", "[^/]+"));
                let re = Regex::new(&pattern)
                    .map_err(|e| AppError::Config(format!("Invalid accept pattern '{entry}': {e}")))?;
                AcceptRule::Mime(re)
            };
            rules.push(rule);
        }

        if rules.is_empty() {
            rules.push(AcceptRule::Any);
        }

        Ok(FilePicker {
            accept: rules,
            max_size_mb,
        })
    }

    pub fn from_config(config: &ImportConfig) -> Result<Self, AppError> {
        FilePicker::new(&config.accept, config.max_size_mb)
    }

    /// Check the file at `path`. `None` means the selection was cleared.
    pub async fn select(&self, path: Option<&Path>) -> Result<Option<SelectedFile>, AppError> {
        let Some(path) = path else {
            return Ok(None);
        };

        let mime_type = mime_type_for(path);
        if !self.accepts(path, mime_type) {
            return Err(AppError::Validation(format!(
                "{} is not an accepted file type",
                path.display()
            )));
        }

        let size = tokio::fs::metadata(path).await?.len();
        if size > self.max_size_mb * BYTES_PER_MB {
            return Err(AppError::Validation(format!(
                "File size should be less than {}MB",
                self.max_size_mb
            )));
        }

        Ok(Some(SelectedFile {
            path: path.to_path_buf(),
            mime_type,
            size,
        }))
    }

    fn accepts(&self, path: &Path, mime_type: &str) -> bool {
        let ext = extension(path);
        self.accept.iter().any(|rule| match rule {
            AcceptRule::Any => true,
            AcceptRule::Extension(want) => ext.as_deref() == Some(want.as_str()),
            AcceptRule::Mime(re) => re.is_match(mime_type),
        })
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

fn mime_type_for(path: &Path) -> &'static str {
    match extension(path).as_deref() {
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("xls") => "application/vnd.ms-excel",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
