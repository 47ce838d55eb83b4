//! Core types: customer events, normalized external events, time, tracing

pub mod customer_event;
pub mod external_event;
pub mod time;
pub mod tracing;

pub use customer_event::{CustomerEvent, identity_key, normalize_category, normalize_location};
pub use external_event::ExternalEvent;
pub use time::{format_utc, parse_instant};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
