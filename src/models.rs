use serde::Deserialize;

use crate::time::format_timestamp;

// ---------------------------------------------------------------------------
// Search endpoint wire shapes
// ---------------------------------------------------------------------------

/// Response envelope of the platform search endpoint.  `results` items are
/// kept as raw JSON so callers can decode them into the shape the query
/// was scoped to.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub total: u64,
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

/// One raw initiative item as returned by the search endpoint.
///
/// `tags` is the only tolerated-absent collection; a missing required
/// field fails the record instead of being papered over.
#[derive(Debug, Clone, Deserialize)]
pub struct RawInitiative {
    pub id: String,
    pub owner: String,
    pub created: i64,
    pub modified: i64,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// ---------------------------------------------------------------------------
// Feature service wire shapes
// ---------------------------------------------------------------------------

/// Response of a feature-service layer query.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureSet {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// One feature: event attributes plus an optional geometry payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    pub attributes: RawEventAttributes,
    #[serde(default)]
    pub geometry: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEventAttributes {
    pub title: String,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: i64,
    #[serde(rename = "endDate")]
    pub end_date: i64,
    #[serde(rename = "organizerName")]
    pub organizer_name: Option<String>,
    pub capacity: Option<i64>,
    pub attendance: Option<i64>,
    pub status: Option<String>,
    #[serde(rename = "isCancelled", default)]
    pub is_cancelled: bool,
    #[serde(rename = "siteId")]
    pub site_id: Option<String>,
    #[serde(rename = "initiativeId")]
    pub initiative_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Initiatives
// ---------------------------------------------------------------------------

/// A normalized initiative record.  Timestamps carry the
/// `MM-DD-YYYY -- HH:MM:SS` display format.
#[derive(Debug, Clone, PartialEq)]
pub struct Initiative {
    pub id: String,
    pub owner: String,
    pub created: String,
    pub modified: String,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub tags: Vec<String>,
}

impl From<RawInitiative> for Initiative {
    fn from(raw: RawInitiative) -> Self {
        Self {
            id: raw.id,
            owner: raw.owner,
            created: format_timestamp(raw.created),
            modified: format_timestamp(raw.modified),
            title: raw.title,
            description: raw.description,
            url: raw.url,
            tags: raw.tags,
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A normalized event record.  `initiative_id` links the event to its
/// owning initiative by plain value; `geometry` is `None` when the source
/// feature carried no geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub title: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub organizer_name: Option<String>,
    pub capacity: Option<i64>,
    pub attendance: Option<i64>,
    pub status: Option<String>,
    pub is_cancelled: bool,
    pub site_id: Option<String>,
    pub initiative_id: Option<String>,
    pub geometry: Option<serde_json::Value>,
}

impl From<Feature> for Event {
    fn from(feature: Feature) -> Self {
        let attrs = feature.attributes;
        Self {
            title: attrs.title,
            location: attrs.location,
            description: attrs.description,
            start_date: format_timestamp(attrs.start_date),
            end_date: format_timestamp(attrs.end_date),
            organizer_name: attrs.organizer_name,
            capacity: attrs.capacity,
            attendance: attrs.attendance,
            status: attrs.status,
            is_cancelled: attrs.is_cancelled,
            site_id: attrs.site_id,
            initiative_id: attrs.initiative_id,
            geometry: feature.geometry,
        }
    }
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

/// `{title, description}` pair returned by the describe operations.
#[derive(Debug, Clone, PartialEq)]
pub struct Description {
    pub title: String,
    pub description: Option<String>,
}

impl From<&Initiative> for Description {
    fn from(initiative: &Initiative) -> Self {
        Self {
            title: initiative.title.clone(),
            description: initiative.description.clone(),
        }
    }
}

impl From<&Event> for Description {
    fn from(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
        }
    }
}

/// `{title, start date}` pair returned when listing the events of an
/// initiative.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSummary {
    pub title: String,
    pub start_date: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn initiative_without_tags_normalizes_to_empty_list() {
        let raw: RawInitiative = serde_json::from_value(json!({
            "id": "abc",
            "owner": "gis_admin",
            "created": 1_569_333_600_000_i64,
            "modified": 1_569_420_000_000_i64,
            "title": "River Cleanup",
            "description": "Volunteer river cleanup program",
            "url": "https://cityx.maps.arcgis.com/initiatives/river-cleanup"
        }))
        .unwrap();

        let initiative = Initiative::from(raw);
        assert_eq!(initiative.id, "abc");
        assert_eq!(initiative.title, "River Cleanup");
        assert!(initiative.tags.is_empty());
        assert!(initiative.created.contains(" -- "));
    }

    #[test]
    fn initiative_missing_required_field_is_an_error() {
        // No `id`: this is a malformed record, not a tolerated omission.
        let result = serde_json::from_value::<RawInitiative>(json!({
            "owner": "gis_admin",
            "created": 1_569_333_600_000_i64,
            "modified": 1_569_420_000_000_i64,
            "title": "River Cleanup"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn feature_without_geometry_normalizes_to_none() {
        let feature: Feature = serde_json::from_value(json!({
            "attributes": {
                "title": "Shoreline Walk",
                "location": "Pier 3",
                "description": null,
                "startDate": 1_569_333_600_000_i64,
                "endDate": 1_569_340_800_000_i64,
                "organizerName": "Parks Dept",
                "capacity": 50,
                "attendance": 12,
                "status": "public",
                "isCancelled": false,
                "siteId": "site-1",
                "initiativeId": "abc"
            }
        }))
        .unwrap();

        let event = Event::from(feature);
        assert_eq!(event.title, "Shoreline Walk");
        assert_eq!(event.initiative_id.as_deref(), Some("abc"));
        assert!(event.geometry.is_none());
    }

    #[test]
    fn feature_geometry_is_carried_through() {
        let feature: Feature = serde_json::from_value(json!({
            "attributes": {
                "title": "Shoreline Walk",
                "startDate": 1_569_333_600_000_i64,
                "endDate": 1_569_340_800_000_i64
            },
            "geometry": { "x": -93.26, "y": 44.97 }
        }))
        .unwrap();

        let event = Event::from(feature);
        assert_eq!(
            event.geometry,
            Some(json!({ "x": -93.26, "y": 44.97 }))
        );
        assert!(!event.is_cancelled);
        assert_eq!(event.capacity, None);
    }

    #[test]
    fn description_projects_title_and_description() {
        let raw: RawInitiative = serde_json::from_value(json!({
            "id": "abc",
            "owner": "gis_admin",
            "created": 1_569_333_600_000_i64,
            "modified": 1_569_420_000_000_i64,
            "title": "River Cleanup",
            "description": "Volunteer river cleanup program",
            "tags": ["water", "volunteer"]
        }))
        .unwrap();

        let initiative = Initiative::from(raw);
        let description = Description::from(&initiative);
        assert_eq!(description.title, "River Cleanup");
        assert_eq!(
            description.description.as_deref(),
            Some("Volunteer river cleanup program")
        );
    }
}
