//! Eventbrite API client.
//!
//! Low-level HTTP client for Eventbrite's REST search endpoint, mapping
//! its nested `name.text` / `start.utc` payloads into the canonical
//! [`ExternalEvent`] shape.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use eventscope_core::ExternalEvent;

use crate::error::{ProviderError, ProviderResult};

/// Search filters for the event search endpoint.
#[derive(Debug, Clone)]
pub struct EventbriteQuery {
    /// Free-text keywords, typically the customer event's category.
    pub keywords: Option<String>,
    /// Free-text location (city, country).
    pub location: String,
    /// Search radius in kilometers.
    pub radius_km: u32,
    /// Optional Eventbrite category id filter.
    pub category_id: Option<String>,
    /// Optional lower bound for event start, wire-formatted.
    pub start_range_start: Option<String>,
    /// Optional upper bound for event start, wire-formatted.
    pub start_range_end: Option<String>,
}

/// Eventbrite API client bound to one access token.
#[derive(Debug)]
pub struct EventbriteClient {
    http_client: reqwest::Client,
    api_base_url: String,
    access_token: String,
}

impl EventbriteClient {
    /// Creates a client with the given bearer token.
    pub fn new(
        access_token: impl Into<String>,
        api_base_url: impl Into<String>,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_base_url: api_base_url.into(),
            access_token: access_token.into(),
        })
    }

    /// Searches events around a location.
    ///
    /// Upstream failures (non-success status, malformed payload, network
    /// errors) degrade to an empty result set, matching the search
    /// semantics of the other providers.
    pub async fn search(&self, query: &EventbriteQuery) -> ProviderResult<Vec<ExternalEvent>> {
        let url = format!("{}/events/search/", self.api_base_url);

        let mut request = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("location.address", query.location.as_str()),
                ("location.within", &format!("{}km", query.radius_km)),
                ("expand", "venue,category"),
            ]);

        if let Some(ref keywords) = query.keywords {
            request = request.query(&[("q", keywords.as_str())]);
        }
        if let Some(ref category_id) = query.category_id {
            request = request.query(&[("categories", category_id.as_str())]);
        }
        if let Some(ref start) = query.start_range_start {
            request = request.query(&[("start_date.range_start", start.as_str())]);
        }
        if let Some(ref end) = query.start_range_end {
            request = request.query(&[("start_date.range_end", end.as_str())]);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "event search request failed, returning no results");
                return Ok(Vec::new());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body, "event search rejected upstream, returning no results");
            return Ok(Vec::new());
        }

        let payload: SearchResponse = match response.json().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "unparsable event search response, returning no results");
                return Ok(Vec::new());
            }
        };

        let events: Vec<ExternalEvent> = payload
            .events
            .into_iter()
            .map(EventbriteEventRecord::into_external)
            .collect();
        debug!(count = events.len(), location = %query.location, "fetched events");
        Ok(events)
    }

    /// Fetches a single event by id.
    ///
    /// Unlike searches there is no meaningful empty result here, so
    /// upstream failures surface as typed errors.
    pub async fn fetch_event(&self, event_id: &str) -> ProviderResult<ExternalEvent> {
        if event_id.trim().is_empty() {
            return Err(ProviderError::bad_request("event id cannot be empty"));
        }

        let url = format!("{}/events/{event_id}/", self.api_base_url);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("expand", "venue,category")])
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("event fetch request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::not_found(format!(
                "no event with id {event_id}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::upstream_search(format!(
                "event fetch failed ({status}): {body}"
            )));
        }

        let record: EventbriteEventRecord = response.json().await.map_err(|e| {
            ProviderError::invalid_response(format!("invalid event fetch response: {e}"))
        })?;

        Ok(record.into_external())
    }
}

/// Response from the event search endpoint.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    events: Vec<EventbriteEventRecord>,
}

/// One event object as returned by the REST API.
#[derive(Debug, Default, Deserialize)]
struct EventbriteEventRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: Option<EbText>,
    #[serde(default)]
    description: Option<EbText>,
    #[serde(default)]
    start: Option<EbTime>,
    #[serde(default)]
    end: Option<EbTime>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    online_event: bool,
    #[serde(default)]
    capacity: Option<u32>,
    #[serde(default)]
    venue: Option<EbVenue>,
    #[serde(default)]
    category: Option<EbCategory>,
}

#[derive(Debug, Default, Deserialize)]
struct EbText {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct EbTime {
    #[serde(default)]
    utc: String,
}

#[derive(Debug, Default, Deserialize)]
struct EbVenue {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct EbCategory {
    #[serde(default)]
    name: String,
}

impl EbText {
    fn into_text(self) -> String {
        self.text.unwrap_or_default()
    }
}

impl EventbriteEventRecord {
    fn into_external(self) -> ExternalEvent {
        ExternalEvent::new(self.id, self.name.map(EbText::into_text).unwrap_or_default())
            .with_description(self.description.map(EbText::into_text).unwrap_or_default())
            .with_start_time(self.start.map(|t| t.utc).unwrap_or_default())
            .with_end_time(self.end.map(|t| t.utc).unwrap_or_default())
            .with_venue_name(self.venue.map(|v| v.name).unwrap_or_default())
            .with_category(self.category.map(|c| c.name).unwrap_or_default())
            .with_url(self.url)
            .with_online(self.online_event)
            .with_attendance_count(self.capacity.unwrap_or_default())
    }
}
