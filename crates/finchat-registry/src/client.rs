//! Brønnøysund Register Centre REST client

use crate::RegistryError;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Public registry host
pub const DEFAULT_BASE_URL: &str = "https://data.brreg.no";

const ENTITY_MEDIA_TYPE: &str = "application/vnd.brreg.enhetsregisteret.enhet.v2+json";

/// File format of a bulk download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadFormat {
    /// Gzipped JSON
    #[default]
    Json,
    /// Gzipped CSV
    Csv,
    /// Spreadsheet
    Xlsx,
}

impl DownloadFormat {
    fn path_segment(self) -> Option<&'static str> {
        match self {
            DownloadFormat::Json => None,
            DownloadFormat::Csv => Some("csv"),
            DownloadFormat::Xlsx => Some("regneark"),
        }
    }
}

impl FromStr for DownloadFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(DownloadFormat::Json),
            "csv" => Ok(DownloadFormat::Csv),
            "xlsx" | "regneark" => Ok(DownloadFormat::Xlsx),
            other => Err(format!("Unknown download format: {}", other)),
        }
    }
}

impl fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DownloadFormat::Json => "json",
            DownloadFormat::Csv => "csv",
            DownloadFormat::Xlsx => "xlsx",
        };
        f.write_str(name)
    }
}

/// Client for the registry's open data API
///
/// JSON endpoints return the decoded body as-is; bulk downloads return raw
/// bytes. Anything other than `200 OK` is a [`RegistryError::Status`].
#[derive(Debug, Clone)]
pub struct BrregClient {
    base_url: String,
    client: reqwest::Client,
}

impl Default for BrregClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BrregClient {
    /// Client for the public registry
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client for another host serving the same API
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Host this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Root of the entity register API, listing links to the other services
    pub async fn fetch_services(&self) -> Result<Value, RegistryError> {
        self.get_json(&["enhetsregisteret", "api"], &[]).await
    }

    /// Search entities by name
    pub async fn search_entities(&self, name: &str) -> Result<Value, RegistryError> {
        self.get_json(&["enhetsregisteret", "api", "enheter"], &[("navn", name)])
            .await
    }

    /// One entity by organisation number
    pub async fn fetch_entity(&self, orgnr: &str) -> Result<Value, RegistryError> {
        self.get_json(&["enhetsregisteret", "api", "enheter", orgnr], &[])
            .await
    }

    /// Roles of one entity
    pub async fn fetch_roles_for_entity(&self, orgnr: &str) -> Result<Value, RegistryError> {
        self.get_json(&["enhetsregisteret", "api", "enheter", orgnr, "roller"], &[])
            .await
    }

    /// Roles of one entity including personal IDs (authorised API)
    pub async fn fetch_roles_with_personal_id(&self, orgnr: &str) -> Result<Value, RegistryError> {
        self.get_json(
            &["enhetsregisteret", "autorisert-api", "enheter", orgnr, "roller"],
            &[],
        )
        .await
    }

    /// Bulk download of every entity
    pub async fn download_entities(&self, format: DownloadFormat) -> Result<Vec<u8>, RegistryError> {
        self.download_register("enheter", format).await
    }

    /// Search sub-entities by name
    pub async fn search_sub_entities(&self, name: &str) -> Result<Value, RegistryError> {
        self.get_json(&["enhetsregisteret", "api", "underenheter"], &[("navn", name)])
            .await
    }

    /// One sub-entity by organisation number
    pub async fn fetch_sub_entity(&self, orgnr: &str) -> Result<Value, RegistryError> {
        self.get_json(&["enhetsregisteret", "api", "underenheter", orgnr], &[])
            .await
    }

    /// Bulk download of every sub-entity
    pub async fn download_sub_entities(&self, format: DownloadFormat) -> Result<Vec<u8>, RegistryError> {
        self.download_register("underenheter", format).await
    }

    /// Recently updated entities
    pub async fn fetch_entity_updates(&self) -> Result<Value, RegistryError> {
        self.get_json(&["enhetsregisteret", "api", "oppdateringer", "enheter"], &[])
            .await
    }

    /// Recently updated sub-entities
    pub async fn fetch_sub_entity_updates(&self) -> Result<Value, RegistryError> {
        self.get_json(&["enhetsregisteret", "api", "oppdateringer", "underenheter"], &[])
            .await
    }

    /// Recent role updates
    pub async fn fetch_role_updates(&self) -> Result<Value, RegistryError> {
        self.get_json(&["enhetsregisteret", "api", "oppdateringer", "roller"], &[])
            .await
    }

    /// Every form of organisation
    pub async fn fetch_org_forms(&self) -> Result<Value, RegistryError> {
        self.get_json(&["enhetsregisteret", "api", "organisasjonsformer"], &[])
            .await
    }

    /// Forms of organisation used by entities
    pub async fn fetch_org_forms_for_entities(&self) -> Result<Value, RegistryError> {
        self.get_json(&["enhetsregisteret", "api", "organisasjonsformer", "enheter"], &[])
            .await
    }

    /// Forms of organisation used by sub-entities
    pub async fn fetch_org_forms_for_sub_entities(&self) -> Result<Value, RegistryError> {
        self.get_json(
            &["enhetsregisteret", "api", "organisasjonsformer", "underenheter"],
            &[],
        )
        .await
    }

    /// One form of organisation by code, e.g. `AS`
    pub async fn fetch_org_form(&self, code: &str) -> Result<Value, RegistryError> {
        self.get_json(&["enhetsregisteret", "api", "organisasjonsformer", code], &[])
            .await
    }

    /// Total inventory of roles for all entities
    pub async fn download_total_roles(&self) -> Result<Value, RegistryError> {
        self.get_json(&["enhetsregisteret", "api", "roller", "totalbestand"], &[])
            .await
    }

    /// Role types
    pub async fn fetch_role_types(&self) -> Result<Value, RegistryError> {
        self.get_json(&["enhetsregisteret", "api", "roller", "rolletyper"], &[])
            .await
    }

    /// Role group types
    pub async fn fetch_role_group_types(&self) -> Result<Value, RegistryError> {
        self.get_json(&["enhetsregisteret", "api", "roller", "rollegruppetyper"], &[])
            .await
    }

    /// Representatives
    pub async fn fetch_representatives(&self) -> Result<Value, RegistryError> {
        self.get_json(&["enhetsregisteret", "api", "roller", "representanter"], &[])
            .await
    }

    /// One cadastral unit
    pub async fn fetch_cadastral_unit(&self, unit_id: &str) -> Result<Value, RegistryError> {
        self.get_json(&["enhetsregisteret", "api", "matrikkelenhet"], &[("id", unit_id)])
            .await
    }

    /// Every registered political party, as CSV
    pub async fn download_political_parties_csv(&self) -> Result<Vec<u8>, RegistryError> {
        self.get_bytes(&["partiregisteret", "api", "lastned", "csv"]).await
    }

    /// Every registered non-profit organisation, as CSV
    pub async fn download_non_profit_orgs_csv(&self) -> Result<Vec<u8>, RegistryError> {
        self.get_bytes(&["frivillighetsregisteret", "api", "lastned", "csv"])
            .await
    }

    async fn download_register(
        &self,
        register: &str,
        format: DownloadFormat,
    ) -> Result<Vec<u8>, RegistryError> {
        let mut segments = vec!["enhetsregisteret", "api", register, "lastned"];
        segments.extend(format.path_segment());
        self.get_bytes(&segments).await
    }

    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, RegistryError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| RegistryError::Config(format!("Invalid base URL '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| RegistryError::Config(format!("Base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn get(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<reqwest::Response, RegistryError> {
        let url = self.url(segments, query)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, ENTITY_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| RegistryError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Registry answered HTTP {}", status.as_u16());
            return Err(RegistryError::Status {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }
        Ok(response)
    }

    async fn get_json(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Value, RegistryError> {
        self.get(segments, query)
            .await?
            .json()
            .await
            .map_err(|e| RegistryError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    async fn get_bytes(&self, segments: &[&str]) -> Result<Vec<u8>, RegistryError> {
        let bytes = self
            .get(segments, &[])
            .await?
            .bytes()
            .await
            .map_err(|e| RegistryError::Communication(format!("Download failed: {}", e)))?;
        info!("Downloaded {} bytes from /{}", bytes.len(), segments.join("/"));
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url() {
        let client = BrregClient::new();
        let url = client
            .url(&["enhetsregisteret", "api", "enheter"], &[("navn", "Equinor ASA")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://data.brreg.no/enhetsregisteret/api/enheter?navn=Equinor+ASA"
        );
    }

    #[test]
    fn test_path_segments_are_encoded() {
        let client = BrregClient::with_base_url("http://localhost:8080/");
        let url = client
            .url(&["enhetsregisteret", "api", "organisasjonsformer", "A/S"], &[])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/enhetsregisteret/api/organisasjonsformer/A%2FS"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let client = BrregClient::with_base_url("not a url");
        assert!(matches!(client.url(&["x"], &[]), Err(RegistryError::Config(_))));
    }

    #[test]
    fn test_download_format_parsing() {
        assert_eq!("CSV".parse::<DownloadFormat>().unwrap(), DownloadFormat::Csv);
        assert_eq!("regneark".parse::<DownloadFormat>().unwrap(), DownloadFormat::Xlsx);
        assert!("pdf".parse::<DownloadFormat>().is_err());
        assert_eq!(DownloadFormat::default().to_string(), "json");
    }
}
