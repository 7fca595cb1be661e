//! HTTP record store backed by the control plane API.

use super::{ApiArgs, Collection, RecordStore};
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const HEADER_EMAIL: &str = "X-Account-Email";
const HEADER_ORG: &str = "X-Org-Id";
const HEADER_MASTER_KEY: &str = "X-Master-Key";
const HEADER_API_KEY: &str = "X-Api-Key";

/// Response envelope returned by every read endpoint.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    #[allow(dead_code)]
    json_claz: String,
    #[serde(default)]
    results: Vec<Value>,
}

pub struct HttpRecordStore {
    client: reqwest::Client,
}

impl HttpRecordStore {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(args: &ApiArgs, path: &str) -> Result<String, ApiError> {
        let base = args.url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(ApiError::ConfigError("API url is not set".to_string()));
        }
        Ok(format!("{}/{}", base, path.trim_start_matches('/')))
    }

    fn request(&self, method: Method, args: &ApiArgs, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = Self::endpoint(args, path)?;
        debug!(%method, %url, email = %args.email, "record store request");
        let mut builder = self
            .client
            .request(method, url)
            .header(HEADER_EMAIL, &args.email)
            .header(HEADER_ORG, &args.org_id)
            .header(HEADER_MASTER_KEY, &args.master_key);
        if let Some(api_key) = &args.api_key {
            builder = builder.header(HEADER_API_KEY, api_key);
        }
        Ok(builder)
    }

    async fn send(
        builder: RequestBuilder,
        collection: Collection,
        id: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let response = builder.send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(ApiError::not_found(collection.name(), id)),
            status if !status.is_success() => Err(ApiError::Transport(format!(
                "{} {} returned {}",
                collection.name(),
                id,
                status
            ))),
            _ => Ok(response),
        }
    }

    async fn envelope(response: reqwest::Response, collection: Collection) -> Result<ApiEnvelope, ApiError> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::malformed(format!("{} response", collection.name()), e))
    }
}

impl Default for HttpRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn get(
        &self,
        args: &ApiArgs,
        collection: Collection,
        id: &str,
    ) -> Result<Value, ApiError> {
        let builder = self.request(Method::GET, args, &format!("{}/{}", collection, id))?;
        let response = Self::send(builder, collection, id).await?;
        let envelope = Self::envelope(response, collection).await?;
        envelope
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::EmptyResult(format!("{}/{}", collection, id)))
    }

    async fn list(&self, args: &ApiArgs, collection: Collection) -> Result<Vec<Value>, ApiError> {
        let builder = self.request(Method::GET, args, collection.name())?;
        let response = Self::send(builder, collection, "").await?;
        Ok(Self::envelope(response, collection).await?.results)
    }

    async fn post(
        &self,
        args: &ApiArgs,
        collection: Collection,
        record: &Value,
    ) -> Result<(), ApiError> {
        let path = if collection.is_append_only() {
            format!("{}/content", collection)
        } else {
            format!("{}/update", collection)
        };
        let builder = self.request(Method::POST, args, &path)?.json(record);
        Self::send(builder, collection, &path).await?;
        Ok(())
    }

    async fn delete(
        &self,
        args: &ApiArgs,
        collection: Collection,
        id: &str,
    ) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, args, &format!("{}/{}", collection, id))?;
        Self::send(builder, collection, id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let args = ApiArgs {
            url: "http://localhost:9000/v2/".to_string(),
            ..ApiArgs::default()
        };
        assert_eq!(
            HttpRecordStore::endpoint(&args, "/assembly/ASM1").unwrap(),
            "http://localhost:9000/v2/assembly/ASM1"
        );
    }

    #[test]
    fn test_endpoint_requires_url() {
        let args = ApiArgs::default();
        assert!(matches!(
            HttpRecordStore::endpoint(&args, "assembly"),
            Err(ApiError::ConfigError(_))
        ));
    }

    #[test]
    fn test_envelope_decoding() {
        let body = r#"{"json_claz":"AssemblyCollection","results":[{"id":"ASM1"}]}"#;
        let envelope: ApiEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.results.len(), 1);

        let empty: ApiEnvelope = serde_json::from_str(r#"{"json_claz":"x"}"#).unwrap();
        assert!(empty.results.is_empty());
    }
}
