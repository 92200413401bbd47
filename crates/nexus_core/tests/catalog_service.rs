use chrono::NaiveDate;
use nexus_core::model::software::MAX_EXPIRY_DAYS;
use nexus_core::{
    CatalogError, CatalogService, Collection, License, LicenseService, RecordStore, Software,
    SqliteStore, Video,
};

#[test]
fn save_and_list_software_through_service() {
    let store = SqliteStore::open_in_memory().unwrap();
    let catalog = CatalogService::new(&store);

    let tool = Software::new("10", "Latency Probe").licensed(7, 2);
    catalog.save_software(&tool).unwrap();

    assert_eq!(catalog.get_software("10").unwrap(), Some(tool.clone()));
    assert_eq!(catalog.list_software().unwrap(), vec![tool]);
}

#[test]
fn storefront_listing_hides_invisible_entries() {
    let store = SqliteStore::open_in_memory().unwrap();
    let catalog = CatalogService::new(&store);

    catalog.save_software(&Software::new("a", "Visible")).unwrap();
    let mut hidden = Software::new("b", "Hidden");
    hidden.is_visible = false;
    catalog.save_software(&hidden).unwrap();

    let visible: Vec<String> = catalog
        .list_visible_software()
        .unwrap()
        .into_iter()
        .map(|software| software.id)
        .collect();
    assert_eq!(visible, ["a"]);
    assert_eq!(catalog.list_software().unwrap().len(), 2);
}

#[test]
fn visibility_toggle_requires_existing_entry() {
    let store = SqliteStore::open_in_memory().unwrap();
    let catalog = CatalogService::new(&store);
    catalog.save_software(&Software::new("a", "Tool")).unwrap();

    let updated = catalog.set_software_visibility("a", false).unwrap();
    assert!(!updated.is_visible);
    assert!(catalog.list_visible_software().unwrap().is_empty());

    match catalog.set_software_visibility("missing", true).unwrap_err() {
        CatalogError::NotFound { collection, key } => {
            assert_eq!(collection, Collection::Software);
            assert_eq!(key, "missing");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn software_validation_rules() {
    let store = SqliteStore::open_in_memory().unwrap();
    let catalog = CatalogService::new(&store);

    let nameless = Software::new("x", "  ");
    assert!(matches!(
        catalog.save_software(&nameless),
        Err(CatalogError::Validation(_))
    ));

    let licensed_without_cap = Software::new("y", "Tool").licensed(30, 0);
    assert!(matches!(
        catalog.save_software(&licensed_without_cap),
        Err(CatalogError::Validation(_))
    ));

    let mut unlicensed_with_expiry = Software::new("z", "Tool");
    unlicensed_with_expiry.expiry_days = 10;
    assert!(matches!(
        catalog.save_software(&unlicensed_with_expiry),
        Err(CatalogError::Validation(_))
    ));

    let runaway_window = Software::new("w", "Tool").licensed(u32::MAX, 5);
    let err = catalog.save_software(&runaway_window).unwrap_err();
    assert!(err.to_string().contains("expiry_days"));

    assert_eq!(store.count(Collection::Software).unwrap(), 0);
}

#[test]
fn longest_allowed_window_issues_four_digit_year() {
    let store = SqliteStore::open_in_memory().unwrap();
    CatalogService::new(&store)
        .save_software(&Software::new("s", "Tool").licensed(MAX_EXPIRY_DAYS, 1))
        .unwrap();

    let license = LicenseService::new(&store)
        .issue_license("s", NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
        .unwrap();
    assert_eq!(license.expiry_date.len(), "YYYY-MM-DD".len());
    assert!(license.expiry_date.starts_with("21"));
}

#[test]
fn delete_software_is_idempotent_and_keeps_licenses() {
    let store = SqliteStore::open_in_memory().unwrap();
    let catalog = CatalogService::new(&store);
    catalog
        .save_software(&Software::new("1", "Tool").licensed(30, 5))
        .unwrap();
    store
        .put(&License {
            key: "NEX-0000-0000-0000-0001".to_string(),
            software_id: "1".to_string(),
            expiry_date: "2026-12-01".to_string(),
            is_used: false,
            bound_browser_id: String::new(),
            download_count: 0,
            max_downloads: 5,
        })
        .unwrap();

    catalog.delete_software("1").unwrap();
    catalog.delete_software("1").unwrap();

    assert_eq!(catalog.get_software("1").unwrap(), None);
    assert_eq!(store.count(Collection::Licenses).unwrap(), 1);
}

#[test]
fn video_crud_through_service() {
    let store = SqliteStore::open_in_memory().unwrap();
    let catalog = CatalogService::new(&store);

    let video = Video::new("v1", "Setup guide", "https://videos.example.com/setup");
    catalog.save_video(&video).unwrap();
    assert_eq!(catalog.get_video("v1").unwrap(), Some(video.clone()));
    assert_eq!(catalog.list_videos().unwrap(), vec![video]);

    catalog.delete_video("v1").unwrap();
    catalog.delete_video("v1").unwrap();
    assert!(catalog.list_videos().unwrap().is_empty());

    let blank_url = Video::new("v2", "No link", " ");
    let err = catalog.save_video(&blank_url).unwrap_err();
    assert!(err.to_string().contains("url"));
}
