//! Shared Key authorization for the Blob service
//!
//! Signs each request with HMAC-SHA256 over the canonicalized request, keyed
//! by the storage account key.

use crate::StoreError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::Sha256;
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

/// Account name and decoded account key
#[derive(Clone)]
pub(crate) struct SharedKeyCredential {
    account: String,
    key: Vec<u8>,
}

impl std::fmt::Debug for SharedKeyCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKeyCredential")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl SharedKeyCredential {
    /// `key` is the base64 account key as shown in the portal
    pub(crate) fn new(account: &str, key: &str) -> Result<Self, StoreError> {
        if account.trim().is_empty() {
            return Err(StoreError::Config("account key needs an AccountName".to_string()));
        }
        let key = STANDARD
            .decode(key.trim())
            .map_err(|e| StoreError::Config(format!("AccountKey is not valid base64: {}", e)))?;
        Ok(Self {
            account: account.to_string(),
            key,
        })
    }

    /// Value of the `Authorization` header for a bodiless request
    pub(crate) fn authorization(
        &self,
        method: &str,
        url: &Url,
        ms_headers: &[(&str, &str)],
    ) -> Result<String, StoreError> {
        let string_to_sign = self.string_to_sign(method, url, ms_headers);
        Ok(format!("SharedKey {}:{}", self.account, self.sign(&string_to_sign)?))
    }

    fn sign(&self, string_to_sign: &str) -> Result<String, StoreError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| StoreError::Config(format!("Unusable account key: {}", e)))?;
        mac.update(string_to_sign.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    fn string_to_sign(&self, method: &str, url: &Url, ms_headers: &[(&str, &str)]) -> String {
        // Content-Encoding through Range: all empty for GET
        let mut out = format!("{}\n{}", method, "\n".repeat(11));

        let mut headers: Vec<(String, &str)> = ms_headers
            .iter()
            .map(|(name, value)| (name.to_lowercase(), value.trim()))
            .filter(|(name, _)| name.starts_with("x-ms-"))
            .collect();
        headers.sort();
        for (name, value) in headers {
            out.push_str(&format!("{}:{}\n", name, value));
        }

        out.push_str(&format!("/{}{}", self.account, url.path()));

        let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in url.query_pairs() {
            params.entry(name.to_lowercase()).or_default().push(value.into_owned());
        }
        for (name, mut values) in params {
            values.sort();
            out.push_str(&format!("\n{}:{}", name, values.join(",")));
        }
        out
    }
}
