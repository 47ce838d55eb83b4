//! Canonical normalized event record.
//!
//! Every provider (Meetup REST search, Meetup GraphQL fetch, Eventbrite
//! search) maps its own response shape into [`ExternalEvent`] so the rest of
//! the system never sees provider-specific payloads. Optional upstream
//! fields default to empty strings or zero rather than being omitted.

use serde::{Deserialize, Serialize};

/// A normalized externally-listed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalEvent {
    /// Provider-scoped event identifier.
    pub id: String,

    /// Event title.
    pub title: String,

    /// Event description; empty when the provider omits one.
    #[serde(default)]
    pub description: String,

    /// Start as the provider reported it (local or UTC string).
    #[serde(default)]
    pub start_time: String,

    /// End as the provider reported it; empty when unknown.
    #[serde(default)]
    pub end_time: String,

    /// Venue name; empty for online or venue-less events.
    #[serde(default)]
    pub venue_name: String,

    /// Organizing group name; empty when unknown.
    #[serde(default)]
    pub group_name: String,

    /// Provider category name; empty when unknown.
    #[serde(default)]
    pub category: String,

    /// Canonical URL for the event.
    #[serde(default)]
    pub url: String,

    /// Whether the event is held online rather than in person.
    #[serde(default)]
    pub is_online: bool,

    /// Attendance metric (RSVP/going count); zero when unavailable.
    #[serde(default)]
    pub attendance_count: u32,
}

impl ExternalEvent {
    /// Creates a new event with the required fields; everything else
    /// defaults to empty.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            venue_name: String::new(),
            group_name: String::new(),
            category: String::new(),
            url: String::new(),
            is_online: false,
            attendance_count: 0,
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set the start time string.
    pub fn with_start_time(mut self, start_time: impl Into<String>) -> Self {
        self.start_time = start_time.into();
        self
    }

    /// Builder method to set the end time string.
    pub fn with_end_time(mut self, end_time: impl Into<String>) -> Self {
        self.end_time = end_time.into();
        self
    }

    /// Builder method to set the venue name.
    pub fn with_venue_name(mut self, venue_name: impl Into<String>) -> Self {
        self.venue_name = venue_name.into();
        self
    }

    /// Builder method to set the group name.
    pub fn with_group_name(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = group_name.into();
        self
    }

    /// Builder method to set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Builder method to set the canonical URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Builder method to mark the event as online.
    pub fn with_online(mut self, is_online: bool) -> Self {
        self.is_online = is_online;
        self
    }

    /// Builder method to set the attendance count.
    pub fn with_attendance_count(mut self, count: u32) -> Self {
        self.attendance_count = count;
        self
    }
}
