//! ArcGIS Hub client library for Rust.
//!
//! A read-only Rust client for the initiatives and events hosted on an
//! [ArcGIS Hub](https://hub.arcgis.com). The client resolves the hub's
//! enterprise organization id from portal metadata, fetches initiative
//! and event collections through the platform search endpoints, and
//! offers simple in-memory filters over the normalized records.
//!
//! # Quick Start
//!
//! ```no_run
//! use hub_client::{HubClient, InitiativeSearch};
//!
//! let hub = HubClient::new("https://cityx.maps.arcgis.com").unwrap();
//!
//! // List initiative titles
//! for title in hub.initiatives().titles().unwrap() {
//!     println!("{title}");
//! }
//!
//! // Initiatives tagged exactly ["water", "volunteer"]
//! let tagged = hub
//!     .initiatives()
//!     .search(&InitiativeSearch {
//!         tags: Some(vec!["water".into(), "volunteer".into()]),
//!         ..Default::default()
//!     })
//!     .unwrap();
//! println!("{} tagged initiatives", tagged.len());
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod time;

// Re-export the main public types at the crate root for convenience.
pub use client::{EventSearch, EventsClient, HubClient, InitiativeSearch, InitiativesClient};
pub use error::HubError;
pub use models::{Description, Event, EventSummary, Initiative};
