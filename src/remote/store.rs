use crate::remote::error::RemoteUnavailable;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Extension every station file carries.
pub const STATION_FILE_EXTENSION: &str = ".txt";

/// One file found in the remote folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItem {
    /// Decoded file name, e.g. `cam4_1h.txt`.
    pub name: String,
    /// Reference used to fetch the file (a WebDAV href, still URL-encoded).
    pub href: String,
    /// Content length in bytes, if the server reported one.
    pub size: Option<u64>,
    /// Raw `getlastmodified` value (RFC 2822 date).
    pub last_modified: Option<String>,
    /// Raw `getetag` value, quotes included.
    pub etag: Option<String>,
}

impl RemoteItem {
    /// Everything that changes when the file's content does, as one string.
    pub fn change_indicator(&self) -> String {
        format!(
            "size={};modified={};etag={}",
            self.size.map(|s| s.to_string()).unwrap_or_default(),
            self.last_modified.as_deref().unwrap_or_default(),
            self.etag.as_deref().unwrap_or_default(),
        )
    }

    /// Parsed modification time; `None` when absent or not RFC 2822.
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.last_modified.as_deref()?;
        DateTime::parse_from_rfc2822(raw.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Whether `name` follows the `<siteID>_<resolution>.txt` file convention
/// closely enough to be considered a station file.
pub fn is_station_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.len() > STATION_FILE_EXTENSION.len() && lower.ends_with(STATION_FILE_EXTENSION)
}

/// Read-only access to the folder holding station files.
///
/// [`crate::WebDavClient`] is the production implementation; the registry and
/// series cache only depend on this trait.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Lists the station text files in the configured folder.
    async fn list_remote_txts(&self) -> Result<Vec<RemoteItem>, RemoteUnavailable>;

    /// Fetches the full decoded body of the file at `href`.
    async fn fetch(&self, href: &str) -> Result<String, RemoteUnavailable>;

    /// Fetches roughly the first `max_bytes` of the file at `href`, ending on
    /// a complete line. Stores without partial reads return the whole body.
    async fn fetch_head(&self, href: &str, max_bytes: usize) -> Result<String, RemoteUnavailable> {
        let _ = max_bytes;
        self.fetch(href).await
    }
}
