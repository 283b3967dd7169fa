use bitelog_core::error::{Error, Result};
use bitelog_core::models::{MealId, RawMealRecord};
use bitelog_core::store::MealStore;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Config;

/// `MealStore` backed by the meal REST API.
pub struct HttpMealStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMealStore {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "bitelog-cli/{} (meal log)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        }
    }

    fn meals_url(&self) -> String {
        format!("{}/meals", self.base_url)
    }

    fn meal_url(&self, id: &MealId) -> String {
        format!("{}/meals/{id}", self.base_url)
    }
}

fn transport(err: reqwest::Error) -> Error {
    Error::Transport(err.to_string())
}

/// Map non-2xx responses onto the store error taxonomy.
async fn check(resp: Response, subject: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(subject.to_string()));
    }
    let message = resp.text().await.unwrap_or_default();
    Err(Error::Remote {
        status: status.as_u16(),
        message: message.trim().to_string(),
    })
}

/// Decode a successful response. A body that is not the expected JSON is the
/// server's fault, so it surfaces as `Remote` with the status it came with.
async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    let body = resp.bytes().await.map_err(transport)?;
    serde_json::from_slice(&body).map_err(|err| Error::Remote {
        status: status.as_u16(),
        message: format!("unreadable response body: {err}"),
    })
}

impl MealStore for HttpMealStore {
    async fn list_all(&self) -> Result<Vec<RawMealRecord>> {
        let resp = self
            .client
            .get(self.meals_url())
            .send()
            .await
            .map_err(transport)?;
        let items: Vec<serde_json::Value> = read_json(check(resp, "meals").await?).await?;

        let total = items.len();
        let records: Vec<RawMealRecord> = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(index, error = %err, "skipping unreadable meal in listing");
                    None
                }
            })
            .collect();
        debug!(total, readable = records.len(), "listed meals");
        Ok(records)
    }

    async fn get_one(&self, id: &MealId) -> Result<RawMealRecord> {
        let resp = self
            .client
            .get(self.meal_url(id))
            .send()
            .await
            .map_err(transport)?;
        read_json(check(resp, id.as_str()).await?).await
    }

    async fn create(&self, fields: &RawMealRecord) -> Result<RawMealRecord> {
        let resp = self
            .client
            .post(self.meals_url())
            .json(fields)
            .send()
            .await
            .map_err(transport)?;
        read_json(check(resp, "meals").await?).await
    }

    async fn update(&self, id: &MealId, fields: &RawMealRecord) -> Result<RawMealRecord> {
        let resp = self
            .client
            .put(self.meal_url(id))
            .json(fields)
            .send()
            .await
            .map_err(transport)?;
        read_json(check(resp, id.as_str()).await?).await
    }

    async fn delete(&self, id: &MealId) -> Result<()> {
        let resp = self
            .client
            .delete(self.meal_url(id))
            .send()
            .await
            .map_err(transport)?;
        check(resp, id.as_str()).await?;
        Ok(())
    }
}
