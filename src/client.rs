use once_cell::sync::OnceCell;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{HubError, Result};
use crate::models::*;
use crate::time::age_in_days;

/// Default root for the platform search endpoint.
const DEFAULT_SEARCH_URL: &str = "https://www.arcgis.com";

/// Fixed result cap for search queries.
const SEARCH_PAGE_SIZE: u32 = 100;

// ---------------------------------------------------------------------------
// Internal request plumbing
// ---------------------------------------------------------------------------

/// Shared logic for building a configured [`Client`] and making requests.
struct BaseClient {
    portal_url: String,
    search_url: String,
    http: Client,
}

impl BaseClient {
    fn new(portal_url: &str, search_url: &str) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            portal_url: portal_url.trim_end_matches('/').to_string(),
            search_url: search_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Send a GET request and handle status-code / error-envelope mapping.
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        debug!(url, "Issuing request");
        let resp = self.http.get(url).query(query).send()?;
        self.handle_response(resp)
    }

    fn handle_response(&self, response: Response) -> Result<Value> {
        let status = response.status().as_u16();

        // Try to parse JSON body; fall back to empty object on failure.
        let data: Value = response
            .json()
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        // The platform reports many failures with HTTP 200 and an error
        // envelope in the body.
        if let Some(error) = data.get("error") {
            let code = error
                .get("code")
                .and_then(Value::as_u64)
                .map(|c| c as u16)
                .unwrap_or(status);
            let msg = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            return Err(HubError::Api {
                status: code,
                message: if msg.is_empty() {
                    format!("HTTP {code}")
                } else {
                    msg
                },
            });
        }

        if (200..300).contains(&status) {
            return Ok(data);
        }

        let msg = data
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        Err(HubError::Api {
            status,
            message: if msg.is_empty() {
                format!("HTTP {status}")
            } else {
                msg
            },
        })
    }
}

fn decode<T: DeserializeOwned>(data: Value) -> Result<T> {
    serde_json::from_value(data).map_err(|e| HubError::Api {
        status: 0,
        message: format!("Deserialization error: {e}"),
    })
}

// ---------------------------------------------------------------------------
// Public client
// ---------------------------------------------------------------------------

/// Main entry point for read access to an ArcGIS Hub.
///
/// ```no_run
/// use hub_client::HubClient;
///
/// let hub = HubClient::new("https://cityx.maps.arcgis.com").unwrap();
/// for title in hub.initiatives().titles().unwrap() {
///     println!("{title}");
/// }
/// ```
pub struct HubClient {
    base: BaseClient,
    org_id: OnceCell<String>,
}

impl HubClient {
    /// Create a new client for the hub hosted at `portal_url`.
    ///
    /// * `portal_url` – portal root of the organization, e.g.
    ///   `https://cityx.maps.arcgis.com`
    pub fn new(portal_url: &str) -> Result<Self> {
        Self::with_search_url(portal_url, DEFAULT_SEARCH_URL)
    }

    /// Create a client that targets a non-default search root (enterprise
    /// deployments, test doubles).
    pub fn with_search_url(portal_url: &str, search_url: &str) -> Result<Self> {
        Ok(Self {
            base: BaseClient::new(portal_url, search_url)?,
            org_id: OnceCell::new(),
        })
    }

    /// Enterprise organization id scoping this hub's search queries.
    ///
    /// Resolved from portal metadata on first use and memoized for the
    /// lifetime of the client instance.
    pub fn org_id(&self) -> Result<&str> {
        self.org_id
            .get_or_try_init(|| self.resolve_org_id())
            .map(String::as_str)
    }

    fn resolve_org_id(&self) -> Result<String> {
        let url = format!("{}/sharing/rest/portals/self", self.base.portal_url);
        let data = self.base.get(&url, &[("f", "json".to_string())])?;

        let org_id = data
            .pointer("/portalProperties/hub/settings/enterpriseOrg/orgId")
            .and_then(Value::as_str)
            .ok_or_else(|| HubError::MissingField {
                path: "portalProperties.hub.settings.enterpriseOrg.orgId".into(),
            })?;

        debug!(org_id, "Resolved enterprise organization id");
        Ok(org_id.to_string())
    }

    /// Issue a typekeyword-scoped query against the platform search
    /// endpoint, limited to this hub's organization.
    fn search(&self, typekeywords: &str) -> Result<SearchResponse> {
        let org_id = self.org_id()?;
        let url = format!("{}/sharing/rest/search", self.base.search_url);
        let query = [
            (
                "q",
                format!("typekeywords:{typekeywords} AND orgid:{org_id}"),
            ),
            ("f", "json".to_string()),
            ("num", SEARCH_PAGE_SIZE.to_string()),
        ];
        decode(self.base.get(&url, &query)?)
    }

    // -- sub-client accessors ------------------------------------------------

    pub fn initiatives(&self) -> InitiativesClient<'_> {
        InitiativesClient { hub: self }
    }

    pub fn events(&self) -> EventsClient<'_> {
        EventsClient { hub: self }
    }
}

// ===========================================================================
// Sub-clients
// ===========================================================================

// ---- Initiatives ----------------------------------------------------------

pub struct InitiativesClient<'a> {
    hub: &'a HubClient,
}

/// Parameters for searching fetched initiatives.
///
/// Every supplied predicate must hold for a record to match; leaving all
/// of them unset matches every record.
#[derive(Debug, Clone, Default)]
pub struct InitiativeSearch {
    /// Title substring.
    pub name: Option<String>,
    /// Created at most this many days ago.
    pub created_within_days: Option<i64>,
    /// Modified at most this many days ago.
    pub modified_within_days: Option<i64>,
    /// Exact tag-list equality.
    pub tags: Option<Vec<String>>,
}

impl InitiativesClient<'_> {
    /// Fetch and normalize all initiatives of this hub.
    pub fn fetch(&self) -> Result<Vec<Initiative>> {
        let response = self.hub.search("hubInitiative")?;
        let initiatives = response
            .results
            .into_iter()
            .map(|result| decode::<RawInitiative>(result).map(Initiative::from))
            .collect::<Result<Vec<_>>>()?;

        info!(
            count = initiatives.len(),
            total = response.total,
            "Fetched initiatives"
        );
        Ok(initiatives)
    }

    /// Titles of all initiatives.
    pub fn titles(&self) -> Result<Vec<String>> {
        Ok(self.fetch()?.into_iter().map(|i| i.title).collect())
    }

    /// Ids of all initiatives.
    pub fn ids(&self) -> Result<Vec<String>> {
        Ok(self.fetch()?.into_iter().map(|i| i.id).collect())
    }

    /// `{title, description}` for every initiative whose title contains
    /// `name`, or for all of them when `name` is `None`.
    pub fn describe(&self, name: Option<&str>) -> Result<Vec<Description>> {
        Ok(self
            .fetch()?
            .iter()
            .filter(|i| title_matches(&i.title, name))
            .map(Description::from)
            .collect())
    }

    /// Initiatives matching every supplied predicate.
    pub fn search(&self, params: &InitiativeSearch) -> Result<Vec<Initiative>> {
        Ok(self
            .fetch()?
            .into_iter()
            .filter(|initiative| matches_initiative(initiative, params))
            .collect())
    }
}

// ---- Events ---------------------------------------------------------------

pub struct EventsClient<'a> {
    hub: &'a HubClient,
}

/// Parameters for searching fetched events.
///
/// Every supplied predicate must hold for a record to match.
#[derive(Debug, Clone, Default)]
pub struct EventSearch {
    /// Title substring.
    pub name: Option<String>,
    /// Location substring.
    pub location: Option<String>,
}

impl EventsClient<'_> {
    /// Fetch and normalize all events of this hub.
    ///
    /// Two round-trips: a search for the organization's events layer
    /// service, then a feature query against that service.
    pub fn fetch(&self) -> Result<Vec<Event>> {
        let layer_search = self.hub.search("hubEventsLayer View Service")?;
        let layer_url = layer_search
            .results
            .first()
            .and_then(|result| result.get("url"))
            .and_then(Value::as_str)
            .ok_or_else(|| HubError::MissingField {
                path: "results[0].url (events layer service)".into(),
            })?;

        let query_url = format!("{layer_url}/0/query");
        let query = [
            ("where", "1=1".to_string()),
            ("f", "json".to_string()),
            ("outFields", "*".to_string()),
            ("returnGeometry", "true".to_string()),
        ];
        let feature_set: FeatureSet = decode(self.hub.base.get(&query_url, &query)?)?;

        let events: Vec<Event> = feature_set.features.into_iter().map(Event::from).collect();
        info!(count = events.len(), "Fetched events");
        Ok(events)
    }

    /// Titles of all events.
    pub fn titles(&self) -> Result<Vec<String>> {
        Ok(self.fetch()?.into_iter().map(|e| e.title).collect())
    }

    /// `{title, description}` for every event whose title contains `name`,
    /// or for all of them when `name` is `None`.
    pub fn describe(&self, name: Option<&str>) -> Result<Vec<Description>> {
        Ok(self
            .fetch()?
            .iter()
            .filter(|e| title_matches(&e.title, name))
            .map(Description::from)
            .collect())
    }

    /// Events matching every supplied predicate.
    pub fn search(&self, params: &EventSearch) -> Result<Vec<Event>> {
        Ok(self
            .fetch()?
            .into_iter()
            .filter(|event| matches_event(event, params))
            .collect())
    }

    /// `{title, start date}` of every event linked to the named initiative.
    ///
    /// The initiative is resolved by exact title match; an unknown name is
    /// a [`HubError::NotFound`].
    pub fn for_initiative(&self, name: &str) -> Result<Vec<EventSummary>> {
        let initiatives = self.hub.initiatives().fetch()?;
        let initiative = initiatives
            .iter()
            .find(|initiative| initiative.title == name)
            .ok_or_else(|| HubError::NotFound {
                message: format!("No initiative titled '{name}'"),
            })?;

        Ok(linked_events(&self.fetch()?, &initiative.id))
    }
}

// ---------------------------------------------------------------------------
// In-memory filters
// ---------------------------------------------------------------------------

fn title_matches(title: &str, name: Option<&str>) -> bool {
    name.map_or(true, |n| title.contains(n))
}

fn matches_initiative(initiative: &Initiative, params: &InitiativeSearch) -> bool {
    if let Some(ref name) = params.name {
        if !initiative.title.contains(name.as_str()) {
            return false;
        }
    }
    if let Some(threshold) = params.created_within_days {
        match age_in_days(&initiative.created) {
            Some(age) if age <= threshold => {}
            _ => return false,
        }
    }
    if let Some(threshold) = params.modified_within_days {
        match age_in_days(&initiative.modified) {
            Some(age) if age <= threshold => {}
            _ => return false,
        }
    }
    if let Some(ref tags) = params.tags {
        if initiative.tags != *tags {
            return false;
        }
    }
    true
}

fn matches_event(event: &Event, params: &EventSearch) -> bool {
    if let Some(ref name) = params.name {
        if !event.title.contains(name.as_str()) {
            return false;
        }
    }
    if let Some(ref location) = params.location {
        let hit = event
            .location
            .as_deref()
            .is_some_and(|l| l.contains(location.as_str()));
        if !hit {
            return false;
        }
    }
    true
}

fn linked_events(events: &[Event], initiative_id: &str) -> Vec<EventSummary> {
    events
        .iter()
        .filter(|event| event.initiative_id.as_deref() == Some(initiative_id))
        .map(|event| EventSummary {
            title: event.title.clone(),
            start_date: event.start_date.clone(),
        })
        .collect()
}
