use std::time::Duration;
use async_trait::async_trait;
use reqwest::{ClientBuilder, Response, StatusCode};
use tracing::warn;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::security::bearer_token;
use crate::gateway::assets::{AssetCriteria, AssetRequest, AssetResponse, OwnershipService};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP client of the asset service that keeps track of who owns which book.
///
/// Every call forwards the caller's bearer token in the `Authorization` header.
pub struct RestOwnershipService {
    base_url: String,
    client: reqwest::Client,
}

impl RestOwnershipService {
    pub fn new(base_url: &str) -> Self {
        let client = http_client(reqwest::Client::builder().timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS)));
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn authorization(jwt: &str) -> LibraryResult<String> {
        Ok(format!("Bearer {}", bearer_token(Some(jwt))?))
    }
}

// Falls back to a default client, which has no request timeout.
fn http_client(builder: ClientBuilder) -> reqwest::Client {
    match builder.build() {
        Ok(client) => client,
        Err(err) => {
            warn!("failed to build asset service client, using defaults without timeout: {}", err);
            reqwest::Client::new()
        }
    }
}

#[async_trait]
impl OwnershipService for RestOwnershipService {
    async fn create_ownership_record(&self, jwt: &str, digital_user_id: &str,
                                     req: &AssetRequest) -> LibraryResult<AssetResponse> {
        let url = format!("{}/assets/digitalUsers/{}", self.base_url, digital_user_id);
        let resp = self.client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, Self::authorization(jwt)?)
            .json(req)
            .send()
            .await?;
        let asset = check_status(resp).await?.json::<AssetResponse>().await?;
        Ok(asset)
    }

    async fn list_ownership_records(&self, jwt: &str, digital_user_id: &str,
                                    criteria: &AssetCriteria) -> LibraryResult<Vec<AssetResponse>> {
        // an empty id set cannot be expressed as a query parameter and matches nothing anyway
        if let Some(ids) = &criteria.external_ids {
            if ids.is_empty() {
                return Ok(vec![]);
            }
        }
        let mut params = vec![
            ("digitalUserId", digital_user_id.to_string()),
            ("groupId", criteria.group_id.to_string()),
            ("artifactId", criteria.artifact_id.to_string()),
            ("type", criteria.asset_type.to_string()),
        ];
        if let Some(ids) = &criteria.external_ids {
            params.push(("externalIds", ids.join(",")));
        }
        if let Some(created_at) = criteria.created_at {
            params.push(("createdAt", created_at.to_string()));
        }
        if let Some(from) = criteria.from {
            params.push(("from", from.to_string()));
        }
        if let Some(to) = criteria.to {
            params.push(("to", to.to_string()));
        }
        let resp = self.client
            .get(format!("{}/assets", self.base_url))
            .header(reqwest::header::AUTHORIZATION, Self::authorization(jwt)?)
            .query(&params)
            .send()
            .await?;
        let assets = check_status(resp).await?.json::<Vec<AssetResponse>>().await?;
        Ok(assets)
    }

    async fn delete_ownership_record(&self, jwt: &str, digital_user_id: &str,
                                     external_id: &str) -> LibraryResult<()> {
        let resp = self.client
            .delete(format!("{}/assets", self.base_url))
            .header(reqwest::header::AUTHORIZATION, Self::authorization(jwt)?)
            .query(&[("digitalUserId", digital_user_id), ("externalId", external_id)])
            .send()
            .await?;
        check_status(resp).await.map(|_| ())
    }
}

async fn check_status(resp: Response) -> LibraryResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = format!("asset service returned {} {}", status, body);
    let reason = Some(status.as_u16().to_string());
    Err(match status {
        StatusCode::NOT_FOUND => LibraryError::not_found(message.as_str()),
        StatusCode::UNAUTHORIZED => LibraryError::not_authenticated(message.as_str()),
        StatusCode::FORBIDDEN => LibraryError::access_denied(message.as_str(), reason),
        StatusCode::CONFLICT => LibraryError::duplicate_key(message.as_str()),
        StatusCode::BAD_REQUEST => LibraryError::validation(message.as_str(), reason),
        s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS =>
            LibraryError::unavailable(message.as_str(), reason, true),
        _ => LibraryError::runtime(message.as_str(), reason),
    })
}

impl From<reqwest::Error> for LibraryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LibraryError::serialization(format!("asset service response {}", err).as_str())
        } else if err.is_connect() || err.is_timeout() {
            LibraryError::unavailable(format!("asset service unreachable {}", err).as_str(), None, true)
        } else {
            LibraryError::runtime(format!("asset service call failed {}", err).as_str(), None)
        }
    }
}
