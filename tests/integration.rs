//! Integration tests for the ArcGIS Hub Rust client.
//!
//! These exercise a live portal.  Set the environment variable
//! `HUB_PORTAL_URL` to the portal of a hub-enabled organization (e.g.
//! `https://cityx.maps.arcgis.com`) to enable them; without it every test
//! skips silently.
//!
//! Run with:
//!
//! ```bash
//! HUB_PORTAL_URL=https://cityx.maps.arcgis.com cargo test -- --nocapture
//! ```

use hub_client::{EventSearch, HubClient, InitiativeSearch};

fn portal_url() -> Option<String> {
    std::env::var("HUB_PORTAL_URL").ok()
}

fn client() -> Option<HubClient> {
    let url = portal_url()?;
    Some(HubClient::new(&url).unwrap())
}

// ---------------------------------------------------------------------------
// 1. Organization id resolution
// ---------------------------------------------------------------------------

#[test]
fn test_resolve_org_id() {
    let Some(hub) = client() else {
        println!("[1] Skipping (HUB_PORTAL_URL not set)");
        return;
    };
    let org_id = hub.org_id().unwrap();
    assert!(!org_id.is_empty(), "Expected a non-empty org id");
    println!("[1] Resolved org id: {org_id}");

    // Memoized: a second call returns the same value without surprises.
    assert_eq!(hub.org_id().unwrap(), org_id);
}

// ---------------------------------------------------------------------------
// 2. Initiatives: fetch + projections
// ---------------------------------------------------------------------------

#[test]
fn test_fetch_initiatives_and_projections() {
    let Some(hub) = client() else {
        println!("[2] Skipping (HUB_PORTAL_URL not set)");
        return;
    };

    let initiatives = hub.initiatives().fetch().unwrap();
    println!("[2] Found {} initiatives", initiatives.len());
    for initiative in initiatives.iter().take(3) {
        println!("  - {} (owner: {})", initiative.title, initiative.owner);
        assert!(initiative.created.contains(" -- "));
        assert!(initiative.modified.contains(" -- "));
    }

    let titles = hub.initiatives().titles().unwrap();
    let ids = hub.initiatives().ids().unwrap();
    assert_eq!(titles.len(), initiatives.len());
    assert_eq!(ids.len(), initiatives.len());
}

// ---------------------------------------------------------------------------
// 3. Initiatives: describe
// ---------------------------------------------------------------------------

#[test]
fn test_describe_initiatives() {
    let Some(hub) = client() else {
        println!("[3] Skipping (HUB_PORTAL_URL not set)");
        return;
    };

    let all = hub.initiatives().describe(None).unwrap();
    println!("[3] {} initiative descriptions", all.len());

    if let Some(first) = all.first() {
        // A substring of an existing title must select at least that record.
        let needle: String = first.title.chars().take(4).collect();
        let filtered = hub.initiatives().describe(Some(&needle)).unwrap();
        assert!(!filtered.is_empty());
        for description in &filtered {
            assert!(description.title.contains(&needle));
        }
        println!(
            "[3] Describe filtered by '{}': {} results",
            needle,
            filtered.len()
        );
    }
}

// ---------------------------------------------------------------------------
// 4. Initiatives: search
// ---------------------------------------------------------------------------

#[test]
fn test_search_initiatives() {
    let Some(hub) = client() else {
        println!("[4] Skipping (HUB_PORTAL_URL not set)");
        return;
    };

    let all = hub.initiatives().fetch().unwrap();

    // No predicates: everything matches, no duplicates.
    let unfiltered = hub.initiatives().search(&InitiativeSearch::default()).unwrap();
    assert_eq!(unfiltered.len(), all.len());

    if let Some(first) = all.first() {
        let by_name = hub
            .initiatives()
            .search(&InitiativeSearch {
                name: Some(first.title.clone()),
                ..Default::default()
            })
            .unwrap();
        assert!(by_name.iter().any(|i| i.id == first.id));
        println!("[4] Search by title returned {} results", by_name.len());

        let by_tags = hub
            .initiatives()
            .search(&InitiativeSearch {
                tags: Some(first.tags.clone()),
                ..Default::default()
            })
            .unwrap();
        assert!(by_tags.iter().any(|i| i.id == first.id));
        println!("[4] Search by exact tag list returned {} results", by_tags.len());
    }
}

// ---------------------------------------------------------------------------
// 5. Events: fetch + search
// ---------------------------------------------------------------------------

#[test]
fn test_fetch_and_search_events() {
    let Some(hub) = client() else {
        println!("[5] Skipping (HUB_PORTAL_URL not set)");
        return;
    };

    let events = match hub.events().fetch() {
        Ok(events) => events,
        Err(e) => {
            // Not every hub publishes an events layer.
            println!("[5] Skipping events ({e})");
            return;
        }
    };
    println!("[5] Found {} events", events.len());

    let titles = hub.events().titles().unwrap();
    assert_eq!(titles.len(), events.len());

    if let Some(first) = events.first() {
        let by_name = hub
            .events()
            .search(&EventSearch {
                name: Some(first.title.clone()),
                ..Default::default()
            })
            .unwrap();
        assert!(by_name.iter().any(|e| e.title == first.title));
        println!("[5] Search by title returned {} results", by_name.len());
    }
}

// ---------------------------------------------------------------------------
// 6. Events for an initiative
// ---------------------------------------------------------------------------

#[test]
fn test_events_for_initiative() {
    let Some(hub) = client() else {
        println!("[6] Skipping (HUB_PORTAL_URL not set)");
        return;
    };

    let titles = hub.initiatives().titles().unwrap();
    let Some(title) = titles.first() else {
        println!("[6] Skipping (hub has no initiatives)");
        return;
    };

    match hub.events().for_initiative(title) {
        Ok(summaries) => {
            println!("[6] '{}' has {} events", title, summaries.len());
            for summary in summaries.iter().take(3) {
                println!("  - {} ({})", summary.title, summary.start_date);
            }
        }
        Err(e) => println!("[6] Skipping events ({e})"),
    }

    // An unknown title must fail loudly, never return an empty list.
    let missing = hub
        .events()
        .for_initiative("no initiative has ever carried this exact title");
    assert!(missing.is_err());
    println!("[6] Unknown initiative title correctly rejected");
}
