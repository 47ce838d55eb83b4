//! Meetup API client.
//!
//! Low-level HTTP client for Meetup's REST search and GraphQL fetch
//! endpoints, mapping provider-specific payloads into the canonical
//! [`ExternalEvent`] shape.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use eventscope_core::ExternalEvent;

use crate::error::{ProviderError, ProviderResult};

/// GraphQL query for the by-id event fetch.
const EVENT_QUERY: &str = "\
query($eventId: ID!) {
  event(id: $eventId) {
    id
    title
    description
    dateTime
    eventUrl
    venue { name city address country }
    group { name urlname }
  }
}";

/// Search filters for the upcoming-events endpoint.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Free-text location (city, country).
    pub location: String,
    /// Search radius in kilometers.
    pub radius_km: u32,
    /// Page size.
    pub page_size: u32,
    /// Optional topic category filter.
    pub category: Option<String>,
    /// Optional lower bound for event start, wire-formatted.
    pub start_date_range: Option<String>,
}

/// Meetup API client bound to one access token.
#[derive(Debug)]
pub struct MeetupClient {
    http_client: reqwest::Client,
    api_base_url: String,
    access_token: String,
}

impl MeetupClient {
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

    /// Searches upcoming events around a location.
    ///
    /// Upstream failures (non-success status, malformed payload, network
    /// errors) degrade to an empty result set: a search with no results
    /// is a normal outcome, distinct from auth failures which the caller
    /// raises before ever reaching this point.
    pub async fn search_upcoming(&self, query: &SearchQuery) -> ProviderResult<Vec<ExternalEvent>> {
        let url = format!("{}/find/upcoming_events", self.api_base_url);

        let mut request = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("location", query.location.as_str()),
                ("radius", &format!("{}km", query.radius_km)),
                ("page", &query.page_size.to_string()),
            ]);

        if let Some(ref category) = query.category {
            request = request.query(&[("topic_category", category.as_str())]);
        }
        if let Some(ref start) = query.start_date_range {
            request = request.query(&[("start_date_range", start.as_str())]);
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
            .map(MeetupEventRecord::into_external)
            .collect();
        debug!(count = events.len(), location = %query.location, "fetched upcoming events");
        Ok(events)
    }

    /// Fetches a single event by id via GraphQL.
    ///
    /// Unlike searches there is no meaningful empty result here, so
    /// upstream failures surface as typed errors.
    pub async fn fetch_event(&self, event_id: &str) -> ProviderResult<ExternalEvent> {
        if event_id.trim().is_empty() {
            return Err(ProviderError::bad_request("event id cannot be empty"));
        }

        let url = format!("{}/gql", self.api_base_url);
        let body = serde_json::json!({
            "query": EVENT_QUERY,
            "variables": { "eventId": event_id },
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("event fetch request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::upstream_search(format!(
                "event fetch failed ({status}): {body}"
            )));
        }

        let payload: GraphQlResponse = response.json().await.map_err(|e| {
            ProviderError::invalid_response(format!("invalid event fetch response: {e}"))
        })?;

        if let Some(errors) = payload.errors
            && !errors.is_empty()
        {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(ProviderError::upstream_search(format!(
                "GraphQL error: {}",
                messages.join("; ")
            )));
        }

        let event = payload
            .data
            .and_then(|data| data.event)
            .ok_or_else(|| ProviderError::not_found(format!("no event with id {event_id}")))?;

        Ok(event.into_external())
    }
}

/// Response from the upcoming-events search endpoint.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    events: Vec<MeetupEventRecord>,
}

/// One event object as returned by the REST search.
#[derive(Debug, Default, Deserialize)]
struct MeetupEventRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    local_date: String,
    #[serde(default)]
    local_time: String,
    #[serde(default)]
    venue: Option<MeetupVenue>,
    #[serde(default)]
    group: Option<MeetupGroup>,
    #[serde(default)]
    link: String,
    #[serde(default)]
    yes_rsvp_count: u32,
    #[serde(default)]
    is_online_event: bool,
}

#[derive(Debug, Default, Deserialize)]
struct MeetupVenue {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct MeetupGroup {
    #[serde(default)]
    name: String,
    #[serde(default)]
    category: Option<MeetupCategory>,
}

#[derive(Debug, Default, Deserialize)]
struct MeetupCategory {
    #[serde(default)]
    name: String,
}

impl MeetupEventRecord {
    fn into_external(self) -> ExternalEvent {
        let start_time = format!("{} {}", self.local_date, self.local_time)
            .trim()
            .to_string();
        let (group_name, category) = match self.group {
            Some(group) => (
                group.name,
                group.category.map(|c| c.name).unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        };

        ExternalEvent::new(self.id, self.name)
            .with_description(self.description)
            .with_start_time(start_time)
            .with_venue_name(self.venue.map(|v| v.name).unwrap_or_default())
            .with_group_name(group_name)
            .with_category(category)
            .with_url(self.link)
            .with_online(self.is_online_event)
            .with_attendance_count(self.yes_rsvp_count)
    }
}

/// GraphQL response envelope.
#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<GraphQlData>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlData {
    #[serde(default)]
    event: Option<GraphQlEvent>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

/// One event object as returned by the GraphQL fetch.
#[derive(Debug, Default, Deserialize)]
struct GraphQlEvent {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "dateTime")]
    date_time: String,
    #[serde(default, rename = "eventUrl")]
    event_url: String,
    #[serde(default)]
    venue: Option<GraphQlVenue>,
    #[serde(default)]
    group: Option<GraphQlGroup>,
}

#[derive(Debug, Default, Deserialize)]
struct GraphQlVenue {
    #[serde(default)]
    name: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Default, Deserialize)]
struct GraphQlGroup {
    #[serde(default)]
    name: String,
    #[serde(default)]
    urlname: String,
}

impl GraphQlEvent {
    fn into_external(self) -> ExternalEvent {
        ExternalEvent::new(self.id, self.title)
            .with_description(self.description)
            .with_start_time(self.date_time)
            .with_venue_name(self.venue.map(|v| v.name).unwrap_or_default())
            .with_group_name(self.group.map(|g| g.name).unwrap_or_default())
            .with_url(self.event_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_record_maps_to_external_event() {
        let record: MeetupEventRecord = serde_json::from_value(serde_json::json!({
            "id": "evt-1",
            "name": "Summer Jam",
            "description": "Open-air concert",
            "local_date": "2025-07-01",
            "local_time": "19:00",
            "venue": { "name": "Dolni Vitkovice" },
            "group": { "name": "Ostrava Music", "category": { "name": "music" } },
            "link": "https://www.meetup.com/e/evt-1",
            "yes_rsvp_count": 42,
            "is_online_event": false
        }))
        .unwrap();

        let event = record.into_external();
        assert_eq!(event.id, "evt-1");
        assert_eq!(event.start_time, "2025-07-01 19:00");
        assert_eq!(event.venue_name, "Dolni Vitkovice");
        assert_eq!(event.group_name, "Ostrava Music");
        assert_eq!(event.category, "music");
        assert_eq!(event.attendance_count, 42);
        assert!(!event.is_online);
    }

    #[test]
    fn rest_record_defaults_missing_fields() {
        let record: MeetupEventRecord =
            serde_json::from_value(serde_json::json!({ "id": "evt-1", "name": "Bare" })).unwrap();

        let event = record.into_external();
        assert_eq!(event.description, "");
        assert_eq!(event.start_time, "");
        assert_eq!(event.venue_name, "");
        assert_eq!(event.category, "");
        assert_eq!(event.attendance_count, 0);
    }

    #[test]
    fn graphql_event_maps_to_external_event() {
        let event: GraphQlEvent = serde_json::from_value(serde_json::json!({
            "id": "evt-2",
            "title": "Winter Fest",
            "description": "Indoor festival",
            "dateTime": "2025-12-01T18:00:00Z",
            "eventUrl": "https://www.meetup.com/e/evt-2",
            "venue": { "name": "Gong", "city": "Ostrava", "address": "", "country": "cz" },
            "group": { "name": "Ostrava Music", "urlname": "ostrava-music" }
        }))
        .unwrap();

        let event = event.into_external();
        assert_eq!(event.title, "Winter Fest");
        assert_eq!(event.start_time, "2025-12-01T18:00:00Z");
        assert_eq!(event.venue_name, "Gong");
        assert_eq!(event.url, "https://www.meetup.com/e/evt-2");
    }

    #[test]
    fn graphql_query_shape() {
        assert!(EVENT_QUERY.contains("event(id: $eventId)"));
        assert!(EVENT_QUERY.contains("venue { name city address country }"));
    }
}
