//! Azure Blob Storage document store
//!
//! Lists and downloads blobs of a single container through the Blob service
//! REST API. Requests are authorized either with a shared access signature
//! (SAS) appended to every URL or with a Shared Key `Authorization` header
//! signed by the account key. A container with public read access needs
//! neither.

use crate::shared_key::SharedKeyCredential;
use crate::StoreError;
use chrono::Utc;
use finchat_domain::DocumentStore;
use reqwest::Url;
use tracing::{debug, info};

/// Blob service REST version sent with every request
const API_VERSION: &str = "2021-08-06";

const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// Document store backed by one Azure Blob Storage container
pub struct AzureBlobStore {
    container_url: Url,
    sas_token: Option<String>,
    shared_key: Option<SharedKeyCredential>,
    client: reqwest::Client,
}

impl AzureBlobStore {
    /// Create a store for `{account_url}/{container}`
    ///
    /// `sas_token` may be given with or without its leading `?`.
    pub fn new(
        account_url: &str,
        container: &str,
        sas_token: Option<String>,
    ) -> Result<Self, StoreError> {
        if container.trim().is_empty() {
            return Err(StoreError::Config("container name must be set".to_string()));
        }

        let mut container_url = Url::parse(account_url.trim_end_matches('/'))
            .map_err(|e| StoreError::Config(format!("Invalid account URL '{}': {}", account_url, e)))?;
        container_url
            .path_segments_mut()
            .map_err(|_| StoreError::Config(format!("Account URL cannot be a base: {}", account_url)))?
            .pop_if_empty()
            .push(container);

        let sas_token = sas_token
            .map(|token| token.trim_start_matches('?').to_string())
            .filter(|token| !token.is_empty());

        Ok(Self {
            container_url,
            sas_token,
            shared_key: None,
            client: reqwest::Client::new(),
        })
    }

    /// Create a store whose requests are signed with the account key
    ///
    /// `account_key` is the base64 key from the storage account's access keys.
    pub fn with_account_key(
        account_url: &str,
        container: &str,
        account_name: &str,
        account_key: &str,
    ) -> Result<Self, StoreError> {
        let mut store = Self::new(account_url, container, None)?;
        store.shared_key = Some(SharedKeyCredential::new(account_name, account_key)?);
        Ok(store)
    }

    /// Create a store from an Azure Storage connection string
    ///
    /// Accepts `BlobEndpoint=...` or `AccountName=...;EndpointSuffix=...`
    /// together with `SharedAccessSignature=...` or `AccountKey=...`. When both
    /// are present the SAS is used.
    pub fn from_connection_string(connection_string: &str, container: &str) -> Result<Self, StoreError> {
        let settings = ConnectionSettings::parse(connection_string)?;
        match (settings.sas_token, settings.account_key) {
            (None, Some(key)) => {
                let account = settings.account_name.unwrap_or_default();
                Self::with_account_key(&settings.blob_endpoint, container, &account, &key)
            }
            (sas_token, _) => Self::new(&settings.blob_endpoint, container, sas_token),
        }
    }

    /// URL of the container, without credentials
    pub fn container_url(&self) -> &str {
        self.container_url.as_str()
    }

    /// List every blob name in the container, following continuation markers
    pub async fn list_blobs(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut url = self.container_url.clone();
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("restype", "container");
                query.append_pair("comp", "list");
                if let Some(marker) = &marker {
                    query.append_pair("marker", marker);
                }
            }

            let body = self.get(self.authorize(url)).await?.text().await.map_err(|e| {
                StoreError::Communication(format!("Failed to read listing: {}", e))
            })?;
            let page = parse_blob_list(&body)?;

            debug!("Listed {} blobs", page.names.len());
            names.extend(page.names);

            match page.next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        info!("Container {} holds {} blobs", self.container_url, names.len());
        Ok(names)
    }

    /// Download the full contents of one blob
    pub async fn download_blob(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let mut url = self.container_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Config("Container URL cannot be a base".to_string()))?
            .extend(name.split('/'));

        let response = self.get(self.authorize(url)).await.map_err(|e| match e {
            StoreError::Status { status: 404, .. } => StoreError::NotFound(name.to_string()),
            other => other,
        })?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoreError::Communication(format!("Failed to download {}: {}", name, e)))?;

        info!("Downloaded blob {} ({} bytes)", name, bytes.len());
        Ok(bytes.to_vec())
    }

    fn authorize(&self, mut url: Url) -> Url {
        if let Some(sas) = &self.sas_token {
            let query = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{}&{}", existing, sas),
                _ => sas.clone(),
            };
            url.set_query(Some(&query));
        }
        url
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, StoreError> {
        let mut request = self.client.get(url.clone()).header("x-ms-version", API_VERSION);

        if let Some(credential) = &self.shared_key {
            let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
            let authorization = credential.authorization(
                "GET",
                &url,
                &[("x-ms-date", date.as_str()), ("x-ms-version", API_VERSION)],
            )?;
            request = request
                .header("x-ms-date", date)
                .header("Authorization", authorization);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoreError::Status {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }
        Ok(response)
    }
}

impl DocumentStore for AzureBlobStore {
    type Error = StoreError;

    async fn list_names(&self) -> Result<Vec<String>, Self::Error> {
        self.list_blobs().await
    }

    async fn fetch_bytes(&self, name: &str) -> Result<Vec<u8>, Self::Error> {
        self.download_blob(name).await
    }
}

/// Blob endpoint and credentials pulled out of a connection string
#[derive(Debug, PartialEq, Eq)]
struct ConnectionSettings {
    blob_endpoint: String,
    account_name: Option<String>,
    sas_token: Option<String>,
    account_key: Option<String>,
}

impl ConnectionSettings {
    fn parse(connection_string: &str) -> Result<Self, StoreError> {
        let mut protocol = "https".to_string();
        let mut account_name = None;
        let mut endpoint_suffix = DEFAULT_ENDPOINT_SUFFIX.to_string();
        let mut blob_endpoint = None;
        let mut sas_token = None;
        let mut account_key = None;

        for part in connection_string.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            // AccountKey values end in '=' padding
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| StoreError::Config(format!("Malformed connection string segment: {}", part)))?;
            match key {
                "DefaultEndpointsProtocol" => protocol = value.to_string(),
                "AccountName" => account_name = Some(value.to_string()),
                "EndpointSuffix" => endpoint_suffix = value.to_string(),
                "BlobEndpoint" => blob_endpoint = Some(value.to_string()),
                "SharedAccessSignature" => sas_token = Some(value.to_string()),
                "AccountKey" => account_key = Some(value.to_string()),
                _ => {}
            }
        }

        if sas_token.is_none() && account_key.is_some() && account_name.is_none() {
            return Err(StoreError::Config(
                "connection string with an AccountKey needs an AccountName".to_string(),
            ));
        }

        let blob_endpoint = match (blob_endpoint, &account_name) {
            (Some(endpoint), _) => endpoint,
            (None, Some(account)) => format!("{}://{}.blob.{}", protocol, account, endpoint_suffix),
            (None, None) => {
                return Err(StoreError::Config(
                    "connection string needs BlobEndpoint or AccountName".to_string(),
                ))
            }
        };

        Ok(Self {
            blob_endpoint,
            account_name,
            sas_token,
            account_key,
        })
    }
}

/// One page of a List Blobs response
#[derive(Debug, Default, PartialEq, Eq)]
struct BlobListPage {
    names: Vec<String>,
    next_marker: Option<String>,
}

/// Parse the `EnumerationResults` XML returned by List Blobs
fn parse_blob_list(xml: &str) -> Result<BlobListPage, StoreError> {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut reader = Reader::from_str(xml);
    let mut page = BlobListPage::default();

    let mut in_blob = false;
    let mut in_name = false;
    let mut in_marker = false;
    let mut current = String::new();

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"Blob" => in_blob = true,
                b"Name" if in_blob => {
                    in_name = true;
                    current.clear();
                }
                b"NextMarker" => {
                    in_marker = true;
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if in_name || in_marker {
                    let text = e
                        .unescape()
                        .map_err(|e| StoreError::InvalidListing(e.to_string()))?;
                    current.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"Blob" => in_blob = false,
                b"Name" if in_name => {
                    in_name = false;
                    page.names.push(current.trim().to_string());
                }
                b"NextMarker" => {
                    in_marker = false;
                    let marker = current.trim();
                    if !marker.is_empty() {
                        page.next_marker = Some(marker.to_string());
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(StoreError::InvalidListing(format!(
                    "XML error at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(page)
}
