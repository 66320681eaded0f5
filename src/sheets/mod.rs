use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::dataset::Dataset;

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_SHEET_NAME: &str = "2025";
pub const DEFAULT_LAST_COLUMN: &str = "R";

/// Where and how to fetch the sheet.
#[derive(Clone, Debug)]
pub struct SheetsConfig {
    pub api_key: Option<String>,
    pub spreadsheet_id: Option<String>,
    pub sheet_name: String,
    pub last_column: String,
    pub api_base: String,
    pub timeout_seconds: u64,
    pub proxy: Option<String>,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            spreadsheet_id: None,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            last_column: DEFAULT_LAST_COLUMN.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_seconds: 30,
            proxy: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("missing API key or spreadsheet ID (set SHEETS_API_KEY and SPREADSHEET_ID, or api_key and spreadsheet_id in the config file)")]
    MissingConfig,

    #[error("invalid sheets URL: {url}")]
    InvalidUrl { url: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to sheets API failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },

    #[error("sheets API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode sheets response: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

fn cell_to_string(cell: &serde_json::Value) -> String {
    match cell {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Collapses whitespace runs (including newlines) and trims; blank headers
/// become `COL_<index>`.
pub fn normalize_headers(raw: &[String]) -> Vec<String> {
    let ws = Regex::new(r"\s+").ok();
    raw.iter()
        .enumerate()
        .map(|(i, h)| {
            let collapsed = match ws.as_ref() {
                Some(re) => re.replace_all(h, " ").into_owned(),
                None => h.clone(),
            };
            let trimmed = collapsed.trim();
            if trimmed.is_empty() {
                format!("COL_{i}")
            } else {
                trimmed.to_string()
            }
        })
        .collect()
}

/// Turns the 2D `values` grid into a dataset: first row is the header.
pub fn dataset_from_values(values: Vec<Vec<serde_json::Value>>) -> Dataset {
    let mut rows = values.into_iter();
    let header_row = match rows.next() {
        Some(r) => r,
        None => return Dataset::default(),
    };
    let raw_headers: Vec<String> = header_row.iter().map(cell_to_string).collect();
    let headers = normalize_headers(&raw_headers);
    let data = rows
        .map(|r| r.iter().map(cell_to_string).collect())
        .collect();
    Dataset::from_rows(headers, data)
}

pub fn parse_values_response(body: &str) -> Result<Dataset, SheetsError> {
    let range: ValueRange =
        serde_json::from_str(body).map_err(|e| SheetsError::Decode { source: e })?;
    Ok(dataset_from_values(range.values))
}

pub fn build_values_url(cfg: &SheetsConfig, api_key: &str, spreadsheet_id: &str) -> Result<reqwest::Url, SheetsError> {
    let base = cfg.api_base.trim_end_matches('/');
    let mut url = reqwest::Url::parse(base).map_err(|_| SheetsError::InvalidUrl {
        url: base.to_string(),
    })?;
    let range = format!("{}!A1:{}", cfg.sheet_name, cfg.last_column);
    url.path_segments_mut()
        .map_err(|_| SheetsError::InvalidUrl {
            url: base.to_string(),
        })?
        .pop_if_empty()
        .extend(["v4", "spreadsheets", spreadsheet_id, "values", range.as_str()]);
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url)
}

fn build_client(cfg: &SheetsConfig) -> Result<reqwest::Client, SheetsError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("reviewsearch/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(cfg.timeout_seconds.max(1)));

    if let Some(proxy) = cfg.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
        let proxy_cfg = reqwest::Proxy::all(proxy).map_err(|e| SheetsError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy_cfg);
    }

    builder
        .build()
        .map_err(|e| SheetsError::HttpClientBuild { source: e })
}

fn upstream_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) if !parsed.error.message.trim().is_empty() => parsed.error.message,
        _ => body.trim().chars().take(300).collect(),
    }
}

/// Fetches the configured sheet range and parses it into a dataset.
///
/// One request, no retry.
pub async fn fetch_dataset(cfg: &SheetsConfig) -> Result<Dataset, SheetsError> {
    let api_key = cfg
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(SheetsError::MissingConfig)?;
    let spreadsheet_id = cfg
        .spreadsheet_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(SheetsError::MissingConfig)?;

    let url = build_values_url(cfg, api_key, spreadsheet_id)?;
    let client = build_client(cfg)?;
    debug!(sheet = %cfg.sheet_name, spreadsheet = %spreadsheet_id, "fetching sheet values");

    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| SheetsError::Request { source: e })?;
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| SheetsError::Request { source: e })?;

    if !status.is_success() {
        return Err(SheetsError::Status {
            status: status.as_u16(),
            message: upstream_message(&body),
        });
    }

    let dataset = parse_values_response(&body)?;
    info!(
        rows = dataset.len(),
        columns = dataset.headers.len(),
        "loaded sheet"
    );
    Ok(dataset)
}
