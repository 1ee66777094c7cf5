//! Hostinger DNS API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, DnsRecord, RecordFilter, RecordSet, ZoneApi};

/// Hostinger API base URL
pub const DEFAULT_API_BASE: &str = "https://developers.hostinger.com";

/// Request timeout applied by the HTTP transport
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the Hostinger API
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Hostinger DNS API client
pub struct HostingerClient {
    client: Client,
    api_token: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ZoneRecordSet {
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    #[serde(default)]
    ttl: u32,
    #[serde(default)]
    records: Vec<ZoneRecordValue>,
}

#[derive(Debug, Deserialize)]
struct ZoneRecordValue {
    content: String,
}

#[derive(Debug, Serialize)]
struct UpdateZoneRequest<'a> {
    overwrite: bool,
    zone: Vec<UpdateRecordSet<'a>>,
}

#[derive(Debug, Serialize)]
struct UpdateRecordSet<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    record_type: &'a str,
    ttl: u32,
    records: Vec<RecordContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RecordContent<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct DeleteZoneRequest {
    filters: Vec<RecordFilter>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

impl HostingerClient {
    pub fn new(api_token: &str, options: &ClientOptions) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| ApiError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_token: api_token.to_string(),
            base_url: options.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn zone_url(&self, zone: &str) -> String {
        format!("{}/api/dns/v1/zones/{}", self.base_url, zone)
    }
}

#[async_trait]
impl ZoneApi for HostingerClient {
    async fn list_records(&self, zone: &str) -> Result<Vec<DnsRecord>, ApiError> {
        tracing::debug!(zone = %zone, "Listing DNS records");

        let response = self
            .client
            .get(self.zone_url(zone))
            .bearer_auth(&self.api_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(request_error)?;

        let sets: Vec<ZoneRecordSet> = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        Ok(flatten(sets))
    }

    async fn update_records(
        &self,
        zone: &str,
        record_set: RecordSet,
        overwrite: bool,
    ) -> Result<(), ApiError> {
        tracing::debug!(
            zone = %zone,
            name = %record_set.name,
            record_type = %record_set.record_type,
            overwrite,
            "Updating DNS records"
        );

        let body = UpdateZoneRequest {
            overwrite,
            zone: vec![UpdateRecordSet {
                name: &record_set.name,
                record_type: &record_set.record_type,
                ttl: record_set.ttl,
                records: record_set
                    .values
                    .iter()
                    .map(|content| RecordContent {
                        content: content.as_str(),
                    })
                    .collect(),
            }],
        };

        let response = self
            .client
            .put(self.zone_url(zone))
            .bearer_auth(&self.api_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        check_status(response).await?;
        Ok(())
    }

    async fn delete_records(
        &self,
        zone: &str,
        filters: Vec<RecordFilter>,
    ) -> Result<(), ApiError> {
        tracing::debug!(zone = %zone, filters = filters.len(), "Deleting DNS records");

        let response = self
            .client
            .delete(self.zone_url(zone))
            .bearer_auth(&self.api_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&DeleteZoneRequest { filters })
            .send()
            .await
            .map_err(request_error)?;

        check_status(response).await?;
        Ok(())
    }
}

fn request_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Request(format!("request timed out: {}", e))
    } else {
        ApiError::Request(e.to_string())
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Unauthorized(message));
    }

    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Prefer the `message` field of a JSON error body, fall back to the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.to_string())
}

/// One `DnsRecord` per value of each record set
fn flatten(sets: Vec<ZoneRecordSet>) -> Vec<DnsRecord> {
    sets.into_iter()
        .flat_map(|set| {
            let ZoneRecordSet {
                name,
                record_type,
                ttl,
                records,
            } = set;
            records.into_iter().map(move |value| DnsRecord {
                name: name.clone(),
                record_type: record_type.clone(),
                content: value.content,
                ttl,
            })
        })
        .collect()
}
