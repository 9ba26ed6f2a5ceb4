//! Record gateway over the backend's REST API.
//!
//! - `GET  {base}/api/users/{user}/{income|expense}/latest`
//! - `PUT  {base}/api/users/{user}/{income|expense}`

use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::{Client, Response, StatusCode, Url};
use shared::{
    BudgetEntity, ErrorResponse, LatestRecordResponse, StoredRecord, UpsertRecordRequest,
    UpsertRecordResponse,
};
use std::marker::PhantomData;

use super::gateway::{GatewayError, RecordGateway};

/// HTTP client for one entity's routes
pub struct HttpGateway<E: BudgetEntity> {
    client: Client,
    base_url: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: BudgetEntity> HttpGateway<E> {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Share one connection pool between gateways
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            _entity: PhantomData,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the entity route for `user_id`; the id is percent-encoded as one path segment
    fn url(&self, user_id: &str, latest: bool) -> Result<Url, GatewayError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| GatewayError::Backend(format!("invalid API base URL {:?}: {}", self.base_url, e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| GatewayError::Backend(format!("API base URL {:?} cannot hold a path", self.base_url)))?;
            segments
                .pop_if_empty()
                .extend(["api", "users", user_id, E::KIND.as_str()]);
            if latest {
                segments.push("latest");
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl<E: BudgetEntity> RecordGateway<E> for HttpGateway<E> {
    async fn fetch_latest(&self, user_id: &str) -> Result<Option<StoredRecord<E>>, GatewayError> {
        let url = self.url(user_id, true)?;
        debug!("[api] GET {}", url);

        let response = self.client.get(url).send().await.map_err(transport_error)?;
        let body: LatestRecordResponse<E> = decode(response).await?;
        Ok(body.record)
    }

    async fn upsert(&self, user_id: &str, record: &E) -> Result<StoredRecord<E>, GatewayError> {
        let url = self.url(user_id, false)?;
        debug!("[api] PUT {} (total {:.2})", url, record.total());

        let request = UpsertRecordRequest { record: record.clone() };
        let response = self
            .client
            .put(url)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;
        let body: UpsertRecordResponse<E> = decode(response).await?;
        Ok(body.record)
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    error!("[api] Request failed: {}", err);
    GatewayError::Backend(format!("request failed: {}", err))
}

/// Map the status to a gateway error, or parse the success body
async fn decode<T>(response: Response) -> Result<T, GatewayError>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Backend(format!("invalid response body: {}", e)));
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };
    warn!("[api] Backend answered {}: {}", status, message);

    Err(match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GatewayError::Unauthorized(message)
        }
        StatusCode::NOT_FOUND => GatewayError::NotFound,
        _ => GatewayError::Backend(message),
    })
}
