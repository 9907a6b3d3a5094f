use crate::config::Config;
use crate::remote::error::RemoteUnavailable;
use crate::remote::propfind::{parse_multistatus, PROPFIND_BODY};
use crate::remote::store::{RemoteItem, RemoteStore};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::{CONTENT_TYPE, RANGE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};

/// [`RemoteStore`] backed by a WebDAV share (ownCloud/Nextcloud public links).
///
/// The share token and password are presented as HTTP basic auth. Every
/// request is bounded by the configured timeouts.
pub struct WebDavClient {
    client: Client,
    config: Config,
}

impl WebDavClient {
    pub fn new(config: Config) -> Result<Self, RemoteUnavailable> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(concat!("gnss-water/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RemoteUnavailable::ClientBuild)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, RemoteUnavailable> {
        if !self.config.has_credentials() {
            return Err(RemoteUnavailable::NotConfigured);
        }
        Ok(request.basic_auth(&self.config.webdav_token, Some(&self.config.webdav_pass)))
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> Result<Response, RemoteUnavailable> {
        let response = self
            .authorized(request)?
            .send()
            .await
            .map_err(|e| RemoteUnavailable::from_request(url, e))?;

        match response.error_for_status() {
            Ok(resp) => Ok(resp),
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                Err(match e.status() {
                    Some(status)
                        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
                    {
                        RemoteUnavailable::Unauthorized {
                            url: url.to_string(),
                            status,
                        }
                    }
                    Some(status) if status == StatusCode::NOT_FOUND => {
                        RemoteUnavailable::NotFound(url.to_string())
                    }
                    Some(status) => RemoteUnavailable::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    },
                    None => RemoteUnavailable::NetworkRequest(url.to_string(), e),
                })
            }
        }
    }
}

fn propfind() -> Result<Method, RemoteUnavailable> {
    Method::from_bytes(b"PROPFIND")
        .map_err(|e| RemoteUnavailable::InvalidMethod(e.to_string()))
}

/// Cuts `bytes` back to the last complete line when the read stopped early.
fn complete_lines(mut bytes: Vec<u8>, truncated: bool) -> String {
    if truncated {
        match bytes.iter().rposition(|b| *b == b'\n') {
            Some(pos) => bytes.truncate(pos + 1),
            None => bytes.clear(),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[async_trait]
impl RemoteStore for WebDavClient {
    async fn list_remote_txts(&self) -> Result<Vec<RemoteItem>, RemoteUnavailable> {
        let url = self.config.folder_url();
        info!("Listing station files at {}", url);

        let request = self
            .client
            .request(propfind()?, &url)
            .header("Depth", "1")
            .header(CONTENT_TYPE, "application/xml; charset=utf-8")
            .body(PROPFIND_BODY);
        let body = self
            .send(&url, request)
            .await?
            .text()
            .await
            .map_err(|e| RemoteUnavailable::from_request(&url, e))?;

        let items = parse_multistatus(&body).map_err(|source| RemoteUnavailable::InvalidListing {
            url: url.clone(),
            source,
        })?;
        info!("Found {} station files at {}", items.len(), url);
        Ok(items)
    }

    async fn fetch(&self, href: &str) -> Result<String, RemoteUnavailable> {
        let url = self.config.file_url(href);
        debug!("Downloading {}", url);
        let bytes = self
            .send(&url, self.client.get(&url))
            .await?
            .bytes()
            .await
            .map_err(|e| RemoteUnavailable::from_request(&url, e))?;
        info!("Downloaded {} bytes from {}", bytes.len(), url);
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn fetch_head(&self, href: &str, max_bytes: usize) -> Result<String, RemoteUnavailable> {
        let url = self.config.file_url(href);
        let range = format!("bytes=0-{}", max_bytes.saturating_sub(1));
        let request = self.client.get(&url).header(RANGE, range);

        let mut response = match self.send(&url, request).await {
            Ok(resp) => resp,
            // an empty file cannot satisfy any range
            Err(RemoteUnavailable::HttpStatus { status, .. })
                if status == StatusCode::RANGE_NOT_SATISFIABLE =>
            {
                return Ok(String::new())
            }
            Err(e) => return Err(e),
        };

        // Servers ignoring the range answer 200 with the full body; stop
        // reading once enough bytes have arrived.
        let mut buf = Vec::with_capacity(max_bytes.min(64 * 1024));
        let mut truncated = false;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| RemoteUnavailable::from_request(&url, e))?
        {
            buf.extend_from_slice(&chunk);
            if buf.len() >= max_bytes {
                truncated = true;
                break;
            }
        }
        debug!("Read {} header bytes from {}", buf.len(), url);
        Ok(complete_lines(buf, truncated))
    }
}
