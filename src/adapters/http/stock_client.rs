use crate::domain::value_objects::BookId;
use crate::ports::stock_client::{
    CommunicationFailure, ReleaseOutcome, ReserveOutcome, StockClient,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Domain-level classification of a stock mutation response.
enum StockResponse {
    Accepted,
    Rejected,
    NotFound,
}

/// HTTP implementation of StockClient.
///
/// Talks to the remote stock service via `PUT /books/{id}/borrow` and
/// `PUT /books/{id}/return`. Every request carries a fixed timeout;
/// timeouts, connection errors and unexpected statuses are classified as
/// `CommunicationFailure`, distinct from the domain rejections carried by
/// 409/404 responses. No retries happen here; retry policy belongs to
/// callers that know the saga state.
pub struct HttpStockClient {
    client: Client,
    base_url: String,
}

impl HttpStockClient {
    /// Create a client for the stock service at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    async fn put_stock(&self, url: String) -> Result<StockResponse, CommunicationFailure> {
        let response = self
            .client
            .put(&url)
            .send()
            .await
            .map_err(|e| CommunicationFailure::new(format!("PUT {} failed: {}", url, e)))?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(StockResponse::Accepted),
            StatusCode::CONFLICT => Ok(StockResponse::Rejected),
            StatusCode::NOT_FOUND => Ok(StockResponse::NotFound),
            status => Err(CommunicationFailure::new(format!(
                "unexpected status {} from {}",
                status, url
            ))),
        }
    }
}

#[async_trait]
impl StockClient for HttpStockClient {
    async fn try_reserve(&self, book_id: BookId) -> Result<ReserveOutcome, CommunicationFailure> {
        let url = format!("{}/books/{}/borrow", self.base_url, book_id);

        Ok(match self.put_stock(url).await? {
            StockResponse::Accepted => ReserveOutcome::Reserved,
            StockResponse::Rejected => ReserveOutcome::OutOfStock,
            StockResponse::NotFound => ReserveOutcome::NotFound,
        })
    }

    async fn try_release(&self, book_id: BookId) -> Result<ReleaseOutcome, CommunicationFailure> {
        let url = format!("{}/books/{}/return", self.base_url, book_id);

        Ok(match self.put_stock(url).await? {
            StockResponse::Accepted => ReleaseOutcome::Released,
            StockResponse::Rejected => ReleaseOutcome::AtFullQuantity,
            StockResponse::NotFound => ReleaseOutcome::NotFound,
        })
    }
}
