//! PubChem PUG REST registry implementation
//!
//! Queries `rest/pug/compound/smiles/{smiles}/cids/JSON` and reads the CID
//! list out of the answer. SMILES go into a single path segment, so bond
//! characters like `/` and `#` are percent-encoded rather than interpreted
//! as URL structure.
//!
//! Temporary failures (network, timeout, 429, 5xx) are retried with
//! exponential backoff up to the configured attempt count; a negative
//! answer is returned as `Presence::NotKnown` and never retried.

use super::{Presence, Registry, RegistryConfig};
use crate::error::{self, Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

/// PubChem-backed commercial-compound registry
pub struct PubChemRegistry {
    client: Client,
    config: RegistryConfig,
}

impl PubChemRegistry {
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                error::config_invalid("failed to build HTTP client")
                    .with_operation("registry::new")
                    .set_source(e)
            })?;

        Ok(Self { client, config })
    }

    fn lookup_url(&self, smiles: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url).map_err(|e| {
            error::config_invalid("registry base URL is not a valid URL")
                .with_operation("registry::lookup")
                .set_source(e)
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                error::config_invalid("registry base URL cannot carry path segments")
                    .with_operation("registry::lookup")
            })?
            .pop_if_empty()
            .extend(["rest", "pug", "compound", "smiles", smiles, "cids", "JSON"]);
        Ok(url)
    }

    async fn lookup_once(&self, url: Url) -> Result<Presence> {
        let response = self.client.get(url).send().await.map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;
        decode_response(status, &body)
    }
}

#[async_trait]
impl Registry for PubChemRegistry {
    fn name(&self) -> &str {
        "pubchem"
    }

    async fn lookup(&self, smiles: &str) -> Result<Presence> {
        let url = self.lookup_url(smiles)?;
        let mut attempt = 0u32;

        loop {
            debug!(smiles, attempt, "registry lookup");
            match self.lookup_once(url.clone()).await {
                Ok(presence) => return Ok(presence),
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.backoff_ms << attempt;
                    warn!(smiles, attempt, delay_ms = delay, error = %err, "registry lookup failed, backing off");
                    tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                Err(err) if attempt > 0 => return Err(err.persist()),
                Err(err) => return Err(err),
            }
        }
    }
}

/// Map a transport-level failure into the error taxonomy
fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout("registry")
            .with_operation("registry::lookup")
            .set_source(err)
    } else {
        Error::network_failed(err.to_string())
            .with_operation("registry::lookup")
            .set_source(err)
    }
}

/// Interpret a PUG REST answer.
///
/// 400/404 carry a PUGREST fault for structures the service cannot match;
/// both mean "not catalogued", not "lookup broken".
fn decode_response(status: u16, body: &str) -> Result<Presence> {
    match status {
        200 => {
            let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
                error::lookup_failed("registry returned unparseable JSON")
                    .with_operation("registry::lookup")
                    .set_source(e)
            })?;

            let cids = value
                .get("IdentifierList")
                .and_then(|list| list.get("CID"))
                .and_then(|cid| cid.as_array())
                .ok_or_else(|| {
                    error::lookup_failed("registry answer had no CID list")
                        .with_operation("registry::lookup")
                })?;

            // an unmatched structure comes back as a lone CID 0
            if cids
                .iter()
                .any(|cid| cid.as_i64().map(|n| n > 0).unwrap_or(false))
            {
                Ok(Presence::Known)
            } else {
                Ok(Presence::NotKnown)
            }
        }
        400 | 404 => Ok(Presence::NotKnown),
        429 => Err(Error::rate_limited(None)
            .with_operation("registry::lookup")
            .with_context("status", status.to_string())),
        500..=599 => Err(error::registry_unavailable(format!("registry returned {}", status))
            .with_operation("registry::lookup")
            .with_context("status", status.to_string())),
        other => Err(error::lookup_failed(format!("registry returned {}", other))
            .with_operation("registry::lookup")
            .with_context("status", other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn registry() -> PubChemRegistry {
        PubChemRegistry::new(RegistryConfig::default()).unwrap()
    }

    #[test]
    fn test_lookup_url_encodes_bond_characters() {
        let url = registry().lookup_url("C/C=C/C").unwrap();
        let text = url.as_str();
        assert!(text.contains("C%2FC=C%2FC"), "slash must not split the path: {}", text);
        assert!(text.ends_with("/cids/JSON"));

        let url = registry().lookup_url("N#N").unwrap();
        assert!(url.as_str().contains("N%23N"));
    }

    #[test]
    fn test_decode_known_compound() {
        let body = r#"{"IdentifierList": {"CID": [241]}}"#;
        assert_eq!(decode_response(200, body).unwrap(), Presence::Known);
    }

    #[test]
    fn test_decode_unmatched_structure() {
        // PubChem's "no such compound" answer
        let body = r#"{"IdentifierList": {"CID": [0]}}"#;
        assert_eq!(decode_response(200, body).unwrap(), Presence::NotKnown);
    }

    #[test]
    fn test_decode_not_found_status() {
        let fault = r#"{"Fault": {"Code": "PUGREST.NotFound"}}"#;
        assert_eq!(decode_response(404, fault).unwrap(), Presence::NotKnown);
        assert_eq!(decode_response(400, fault).unwrap(), Presence::NotKnown);
    }

    #[test]
    fn test_decode_server_error_is_not_notknown() {
        let err = decode_response(503, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RegistryUnavailable);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_decode_rate_limit() {
        let err = decode_response(429, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_decode_garbage_body() {
        let err = decode_response(200, "<html>oops</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LookupFailed);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_decode_missing_cid_list() {
        let err = decode_response(200, r#"{"Waiting": {}}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LookupFailed);
    }
}
