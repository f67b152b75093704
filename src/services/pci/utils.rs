use super::types::UploadedFile;
use crate::error::SheetError;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use url::form_urlencoded;

static XLSX_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.xlsx$").expect("static regex is valid"));

// Path separators, characters Windows rejects, quotes and control codes all
// break either the saved file or the Content-Disposition header.
static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/:*?"<>|\x00-\x1f\x7f]"#).expect("static regex is valid"));

/// Download name for an exported summary, always ending in `.xlsx`.
pub fn export_file_name(requested: Option<&str>, default_name: &str) -> String {
    let base = requested
        .map(clean_base_name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| clean_base_name(default_name));
    let base = if base.is_empty() { "PCI_Summary".to_string() } else { base };
    format!("{}.xlsx", base)
}

fn clean_base_name(name: &str) -> String {
    let trimmed = XLSX_SUFFIX.replace(name.trim(), "");
    UNSAFE_FILENAME_CHARS
        .replace_all(trimmed.trim(), "_")
        .into_owned()
}

/// `Content-Disposition` value for a download. Names outside ASCII get an
/// underscored `filename` fallback plus an RFC 5987 `filename*` parameter.
pub fn content_disposition(file_name: &str) -> String {
    if file_name.is_ascii() {
        return format!("attachment; filename=\"{}\"", file_name);
    }

    let fallback: String = file_name
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    // Form encoding writes spaces as '+'; a literal '+' is already escaped.
    let encoded = form_urlencoded::byte_serialize(file_name.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    format!("attachment; filename=\"{}\"; filename*=UTF-8''{}", fallback, encoded)
}

/// Last path segment of a URL, used to label files fetched without a name.
pub fn file_name_from_url(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .filter(|segment| !segment.contains(':'))
        .unwrap_or(url)
        .to_string()
}

pub async fn load_file_from_url(client: &Client, name: String, url: &str) -> Result<UploadedFile, SheetError> {
    let download_error = |reason: String| SheetError::Download {
        file_name: name.clone(),
        reason,
    };

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| download_error(format!("Failed to fetch file: {}", e)))?;

    if !response.status().is_success() {
        return Err(download_error(format!("Failed to fetch file. Status: {}", response.status())));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| download_error(format!("Failed to read response bytes: {}", e)))?;

    tracing::info!("Downloaded {} ({}KB)", name, bytes.len() / 1024);
    Ok(UploadedFile::new(name, bytes))
}
