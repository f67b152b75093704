use serde::Deserialize;
use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::services::pci::types::{ColumnSelector, SheetLayout};

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_max_file_size() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

fn default_max_request_size() -> usize {
    // 50 MB, room for a handful of survey workbooks per batch
    50 * 1024 * 1024
}

fn default_export_name() -> String {
    "PCI_Summary".to_string()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub max_file_size: usize,
    pub max_request_size: usize,
    pub layout: SheetLayout,
    pub export_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_file_size: default_max_file_size(),
            max_request_size: default_max_request_size(),
            layout: SheetLayout::default(),
            export_name: default_export_name(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to the
    /// defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let column = match lookup("PCI_COLUMN_HEADER").filter(|h| !h.trim().is_empty()) {
            Some(header) => ColumnSelector::Header(header),
            None => match parse_var::<usize, _>(&lookup, "PCI_COLUMN_INDEX")? {
                Some(idx) => ColumnSelector::Index(idx),
                None => defaults.layout.column,
            },
        };

        let layout = SheetLayout {
            sheet_name: lookup("PCI_SHEET_NAME").unwrap_or(defaults.layout.sheet_name),
            skip_rows: parse_var(&lookup, "PCI_SKIP_ROWS")?.unwrap_or(defaults.layout.skip_rows),
            column,
        };

        Ok(Config {
            bind_addr: parse_var(&lookup, "PCI_BIND_ADDR")?.unwrap_or(defaults.bind_addr),
            max_file_size: parse_var(&lookup, "PCI_MAX_FILE_SIZE")?.unwrap_or(defaults.max_file_size),
            max_request_size: parse_var(&lookup, "PCI_MAX_REQUEST_SIZE")?
                .unwrap_or(defaults.max_request_size),
            layout,
            export_name: lookup("PCI_EXPORT_NAME").unwrap_or(defaults.export_name),
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| raw.trim().parse::<T>().with_context(|| format!("Invalid value for {}: {:?}", key, raw)))
        .transpose()
}

/// Per-request overrides of the configured layout and export name.
#[derive(Debug, Default, Deserialize)]
pub struct BatchParams {
    pub sheet: Option<String>,
    pub skip_rows: Option<usize>,
    pub column_index: Option<usize>,
    pub column_header: Option<String>,
    pub filename: Option<String>,
}

impl BatchParams {
    pub fn layout(&self, base: &SheetLayout) -> SheetLayout {
        let column = match (&self.column_header, self.column_index) {
            (Some(header), _) if !header.trim().is_empty() => ColumnSelector::Header(header.clone()),
            (_, Some(idx)) => ColumnSelector::Index(idx),
            _ => base.column.clone(),
        };
        SheetLayout {
            sheet_name: self.sheet.clone().unwrap_or_else(|| base.sheet_name.clone()),
            skip_rows: self.skip_rows.unwrap_or(base.skip_rows),
            column,
        }
    }
}
