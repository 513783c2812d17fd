//! Remote listing provider over HTTP. Speaks the provider's offset-based
//! pagination and envelope format; the rest of the crate only ever sees
//! [`PageRequest`]s and [`RawBoat`]s.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::config::CatalogConfig;
use crate::feed::domain::BoatId;
use crate::feed::source::{
    BoxFuture, CatalogError, CatalogPage, CatalogSource, InterestNotice, NotificationSink,
    NotifyError, PageRequest, RawBoat,
};

/// Every list request orders newest-first unless the caller already passed
/// an ordering filter of its own.
const DEFAULT_ORDERING: (&str, &str) = ("orderByDesc", "true");

pub struct HttpCatalog {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    fallback_contact: Option<String>,
}

impl HttpCatalog {
    /// Builds a catalog client from configuration, or `None` when no base
    /// URL is configured and the caller should run synthetic-only.
    pub fn from_config(config: &CatalogConfig) -> Result<Option<Self>, CatalogError> {
        match config.base_url.as_deref() {
            Some(base_url) => Self::new(base_url, config).map(Some),
            None => Ok(None),
        }
    }

    pub fn new(base_url: &str, config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| CatalogError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            fallback_contact: config.fallback_contact.clone(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_page(&self, request: &PageRequest) -> Result<Vec<RawBoat>, CatalogError> {
        // Provider pagination is offset-based; pages are 1-based here.
        let start = request.page.saturating_sub(1) * request.page_size;
        let mut query: Vec<(String, String)> = vec![
            ("start".to_string(), start.to_string()),
            ("limit".to_string(), request.page_size.to_string()),
        ];
        for (key, value) in request.filters.iter() {
            query.push((key.to_string(), value.to_string()));
        }
        if request.filters.iter().all(|(key, _)| !key.contains("orderBy")) {
            query.push((DEFAULT_ORDERING.0.to_string(), DEFAULT_ORDERING.1.to_string()));
        }

        let url = format!("{}/boats", self.base_url);
        let response = self
            .authorize(self.client.get(&url).query(&query))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| CatalogError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        let page: CatalogPage = response
            .json()
            .await
            .map_err(|err| CatalogError::Decode(err.to_string()))?;
        Ok(page.results)
    }

    async fn get_detail(&self, id: &BoatId) -> Result<Option<RawBoat>, CatalogError> {
        let url = format!("{}/boats/{}", self.base_url, id);
        let response = self
            .authorize(self.client.get(&url))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| CatalogError::Transport(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        // Detail responses come back either bare or wrapped in the list
        // envelope depending on provider version.
        let value: Value = response
            .json()
            .await
            .map_err(|err| CatalogError::Decode(err.to_string()))?;
        let record = match value.get("Results") {
            Some(results) => results.as_array().and_then(|array| array.first()).cloned(),
            None => Some(value),
        };

        match record {
            Some(record) if record.is_object() => serde_json::from_value::<RawBoat>(record)
                .map(Some)
                .map_err(|err| CatalogError::Decode(err.to_string())),
            _ => Ok(None),
        }
    }

    async fn post_interest(&self, notice: &InterestNotice) -> Result<(), NotifyError> {
        let recipient = notice
            .broker_email
            .clone()
            .or_else(|| self.fallback_contact.clone())
            .ok_or_else(|| NotifyError::NoRecipient(notice.boat_id.to_string()))?;

        let payload = ContactPayload::compose(notice, &recipient);
        let url = format!("{}/contact", self.base_url);
        let response = self
            .authorize(self.client.post(&url).json(&payload))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }
}

impl CatalogSource for HttpCatalog {
    fn fetch_page<'a>(
        &'a self,
        request: &'a PageRequest,
    ) -> BoxFuture<'a, Result<Vec<RawBoat>, CatalogError>> {
        Box::pin(self.get_page(request))
    }

    fn fetch_detail<'a>(
        &'a self,
        id: &'a BoatId,
    ) -> BoxFuture<'a, Result<Option<RawBoat>, CatalogError>> {
        Box::pin(self.get_detail(id))
    }
}

impl NotificationSink for HttpCatalog {
    fn notify_interest<'a>(
        &'a self,
        notice: &'a InterestNotice,
    ) -> BoxFuture<'a, Result<(), NotifyError>> {
        Box::pin(self.post_interest(notice))
    }
}

/// Wire shape of the provider's contact endpoint.
#[derive(Debug, Serialize)]
struct ContactPayload {
    name: String,
    surname: String,
    email: String,
    phone: String,
    #[serde(rename = "interestedIn")]
    interested_in: String,
    message: String,
    #[serde(rename = "brokerEmail")]
    broker_email: String,
    to: String,
}

impl ContactPayload {
    fn compose(notice: &InterestNotice, recipient: &str) -> Self {
        let contact = &notice.contact;
        Self {
            name: contact.name.clone(),
            surname: String::new(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            interested_in: format!("MATCH REQUEST: {} {}", notice.builder, notice.model),
            message: format!(
                "Hello,\n\nA member of the match feed just expressed strong interest in this listing.\n\nMEMBER DETAILS:\n- Name: {}\n- Email: {}\n- Phone: {}\n\nLISTING DETAILS:\n- Boat: {} {} ({})\n- Price: {}\n- Listing ID: {}\n\nPlease follow up with the member as soon as possible.\n\nKind regards,\nThe Match Feed Team",
                contact.name,
                contact.email,
                contact.phone,
                notice.builder,
                notice.model,
                notice.year_built,
                notice.price_display,
                notice.boat_id,
            ),
            broker_email: recipient.to_string(),
            to: recipient.to_string(),
        }
    }
}
