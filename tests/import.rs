mod common;

use common::{setup, set_master, tab, HISTORICAL_HEADER, MASTER, MILESTONES_HEADER, SAINTS_HEADER};
use saint_sync::config::SyncConfig;
use saint_sync::entities::{event, location, milestone, saint, saint_year};
use saint_sync::repositories::{
    EventRepository, LocationRepository, MilestoneRepository, SaintRepository, SaintYearRepository,
};
use saint_sync::sheets::{MemorySheets, StaticSheetsProvider};
use saint_sync::storage::Storage;
use saint_sync::sync::{ConflictResolution, DataType, ImportRequest, SyncService, SyncStage};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};
use std::sync::Arc;

fn request(locations: &[&str], data_types: &[DataType], policy: ConflictResolution) -> ImportRequest {
    ImportRequest {
        spreadsheet_id: MASTER.to_string(),
        selected_locations: locations.iter().map(|id| id.to_string()).collect(),
        selected_data_types: data_types.to_vec(),
        conflict_resolution: policy,
    }
}

#[tokio::test]
async fn test_end_to_end_saint_import() {
    let (sheets, service) = setup().await;
    set_master(&sheets, &[("loc-1", "Austin", "TX", true)]);
    sheets.set_tab(
        "loc-1",
        "Saints Data",
        tab(SAINTS_HEADER, &[&["42", "Jane Doe", "Saint Jane", "4/9/2016", "2016"]]),
    );

    let result = service
        .import(&request(&["loc-1"], &[DataType::Saints], ConflictResolution::Skip), None)
        .await
        .unwrap();

    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.records_processed.saints, 1);
    assert_eq!(result.records_added.saints, 1);
    assert!(result.errors.is_empty());
    assert_eq!(result.progress.stage, SyncStage::Complete);

    let conn = &service.storage().conn;
    let saint = SaintRepository::get_by_number(conn, "42").await.unwrap().unwrap();
    assert_eq!(saint.name, "Jane Doe");
    assert_eq!(saint.saint_date, "April 9");
    assert_eq!(saint.saint_year, 2016);
    assert_eq!(saint.location_id.as_deref(), Some("loc-1"));

    let events = EventRepository::get_for_saint(conn, saint.id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].month, 4);
    assert_eq!(events[0].day, 9);
    assert_eq!(events[0].event_type, "feast");

    let stored = LocationRepository::get_by_id(conn, "loc-1").await.unwrap().unwrap();
    assert_eq!(stored.state, "TX");
    assert_eq!(stored.city, "Austin");
    assert_eq!(stored.display_name, "Austin, TX");
    assert!(stored.is_active);
}

#[tokio::test]
async fn test_failed_location_rolls_back_alone() {
    let (sheets, service) = setup().await;
    set_master(&sheets, &[("loc-a", "Austin", "TX", true), ("loc-b", "Boise", "ID", true)]);
    sheets.set_tab(
        "loc-a",
        "Saints Data",
        tab(SAINTS_HEADER, &[&["1", "A", "Saint A", "1/1/2015", "2015"], &["2", "B", "Saint B", "2/2/2015", "2015"]]),
    );
    sheets.set_tab("loc-b", "Saints Data", tab(SAINTS_HEADER, &[&["3", "C", "Saint C", "3/3/2016", "2016"]]));

    let conn = &service.storage().conn;
    conn.execute_unprepared(
        "CREATE TRIGGER reject_loc_b BEFORE INSERT ON locations WHEN NEW.id = 'loc-b' \
         BEGIN SELECT RAISE(ABORT, 'location rejected'); END",
    )
    .await
    .unwrap();

    let result = service
        .import(
            &request(&["loc-a", "loc-b"], &[DataType::Saints], ConflictResolution::Overwrite),
            None,
        )
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.records_added.saints, 2);
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert!(result.errors[0].starts_with("Boise, ID: import failed and was rolled back"));
    assert_eq!(result.errors[0].matches("location rejected").count(), 1);

    // loc-a committed
    assert!(LocationRepository::get_by_id(conn, "loc-a").await.unwrap().is_some());
    for number in ["1", "2"] {
        let saint = SaintRepository::get_by_number(conn, number).await.unwrap().unwrap();
        assert_eq!(saint.location_id.as_deref(), Some("loc-a"));
        assert_eq!(EventRepository::get_for_saint(conn, saint.id).await.unwrap().len(), 1);
    }

    // loc-b left nothing behind
    assert!(LocationRepository::get_by_id(conn, "loc-b").await.unwrap().is_none());
    assert!(SaintRepository::get_by_number(conn, "3").await.unwrap().is_none());
    assert_eq!(saint::Entity::find().count(conn).await.unwrap(), 2);
    assert_eq!(event::Entity::find().count(conn).await.unwrap(), 2);
}

#[tokio::test]
async fn test_reimport_does_not_duplicate_events() {
    let (sheets, service) = setup().await;
    set_master(&sheets, &[("loc-1", "Austin", "TX", true)]);
    sheets.set_tab(
        "loc-1",
        "Saints Data",
        tab(SAINTS_HEADER, &[&["42", "Jane Doe", "Saint Jane", "April 9", "2016"]]),
    );

    let req = request(&["loc-1"], &[DataType::Saints], ConflictResolution::Overwrite);
    service.import(&req, None).await.unwrap();
    let second = service.import(&req, None).await.unwrap();

    assert_eq!(second.records_updated.saints, 1);
    assert_eq!(second.records_added.saints, 0);
    let conn = &service.storage().conn;
    assert_eq!(saint::Entity::find().count(conn).await.unwrap(), 1);
    assert_eq!(event::Entity::find().count(conn).await.unwrap(), 1);
}

#[tokio::test]
async fn test_skip_policy_conflict_aborts_without_writes() {
    let (sheets, service) = setup().await;
    set_master(&sheets, &[("loc-a", "Austin", "TX", true), ("loc-b", "Boise", "ID", true)]);
    sheets.set_tab("loc-a", "Saints Data", tab(SAINTS_HEADER, &[&["7", "A", "Saint A", "1/1", "2015"]]));
    sheets.set_tab(
        "loc-b",
        "Saints Data",
        tab(SAINTS_HEADER, &[&["8", "B", "Saint B", "2/2", "2016"], &["7", "C", "Saint C", "3/3", "2017"]]),
    );

    let result = service
        .import(
            &request(&["loc-a", "loc-b"], &[DataType::Saints], ConflictResolution::Skip),
            None,
        )
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.conflicts.len(), 1);
    assert!(result.conflicts[0].contains("Austin, TX"));
    assert!(result.conflicts[0].contains("Boise, ID"));
    assert!(result.conflicts[0].find("Austin").unwrap() < result.conflicts[0].find("Boise").unwrap());

    let conn = &service.storage().conn;
    assert_eq!(saint::Entity::find().count(conn).await.unwrap(), 0);
    assert_eq!(location::Entity::find().count(conn).await.unwrap(), 0);
    assert_eq!(event::Entity::find().count(conn).await.unwrap(), 0);
    assert_eq!(sheets.write_count(), 0);
}

#[tokio::test]
async fn test_conflict_attribution_follows_location_order() {
    let (sheets, service) = setup().await;
    // Master order decides ownership, not the order of the selection
    set_master(&sheets, &[("loc-b", "Boise", "ID", true), ("loc-a", "Austin", "TX", true)]);
    sheets.set_tab("loc-a", "Saints Data", tab(SAINTS_HEADER, &[&["7", "A", "Saint A", "1/1", "2015"]]));
    sheets.set_tab("loc-b", "Saints Data", tab(SAINTS_HEADER, &[&["7", "B", "Saint B", "2/2", "2016"]]));

    let result = service
        .import(
            &request(&["loc-a", "loc-b"], &[DataType::Saints], ConflictResolution::Skip),
            None,
        )
        .await
        .unwrap();

    assert_eq!(
        result.conflicts,
        vec!["Saint number 7 already belongs to Boise, ID but also appears in Austin, TX".to_string()]
    );
}

#[tokio::test]
async fn test_overwrite_and_merge_policies() {
    let (sheets, service) = setup().await;
    set_master(&sheets, &[("loc-a", "Austin", "TX", true), ("loc-b", "Boise", "ID", true)]);
    let header = ["Saint Number", "Name", "Saint Name", "Saint Date", "Saint Year", "Total Beers"];
    sheets.set_tab(
        "loc-a",
        "Saints Data",
        tab(&header, &[&["7", "Alice", "Saint Alice", "1/1", "2015", "1500"]]),
    );
    service
        .import(&request(&["loc-a"], &[DataType::Saints], ConflictResolution::Skip), None)
        .await
        .unwrap();

    // Same saint number appears at loc-b without a total
    sheets.set_tab(
        "loc-b",
        "Saints Data",
        tab(&header, &[&["7", "Alice Smith", "Saint Alice", "1/1", "2015", ""]]),
    );
    let conn = &service.storage().conn;

    let skipped = service
        .import(&request(&["loc-b"], &[DataType::Saints], ConflictResolution::Skip), None)
        .await
        .unwrap();
    assert!(skipped.success);
    assert_eq!(skipped.records_updated.saints, 0);
    assert_eq!(SaintRepository::get_by_number(conn, "7").await.unwrap().unwrap().name, "Alice");

    let merged = service
        .import(&request(&["loc-b"], &[DataType::Saints], ConflictResolution::Merge), None)
        .await
        .unwrap();
    assert_eq!(merged.records_updated.saints, 1);
    let saint = SaintRepository::get_by_number(conn, "7").await.unwrap().unwrap();
    assert_eq!(saint.name, "Alice Smith");
    assert_eq!(saint.total_beers, 1500);
    assert_eq!(saint.location_id.as_deref(), Some("loc-a"));

    service
        .import(&request(&["loc-b"], &[DataType::Saints], ConflictResolution::Overwrite), None)
        .await
        .unwrap();
    let saint = SaintRepository::get_by_number(conn, "7").await.unwrap().unwrap();
    assert_eq!(saint.total_beers, 0);
    assert_eq!(saint.location_id.as_deref(), Some("loc-b"));
}

#[tokio::test]
async fn test_historical_and_milestone_import() {
    let (sheets, service) = setup().await;
    set_master(&sheets, &[("loc-1", "Austin", "TX", true)]);
    sheets.set_tab(
        "loc-1",
        "Saints Data",
        tab(SAINTS_HEADER, &[&["42", "Jane Doe", "Saint Jane", "4/9/2016", "2016"]]),
    );
    sheets.set_tab(
        "loc-1",
        "Historical Data",
        tab(
            HISTORICAL_HEADER,
            &[
                &["42", "2019", "Jalapeño", "Stone IPA, Guinness", "Lone Star", "", "s19.png"],
                &["99", "2019", "Classic", "", "", "", ""],
                &["", "2020", "Classic"],
            ],
        ),
    );
    sheets.set_tab(
        "loc-1",
        "K Count",
        tab(MILESTONES_HEADER, &[&["42", "1000", "4/9/2020", "k1000.png"], &["42", "many", "4/9/2021", ""]]),
    );

    let result = service
        .import(&request(&["loc-1"], &DataType::ALL, ConflictResolution::Skip), None)
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.records_processed.historical, 1);
    assert_eq!(result.records_processed.milestones, 1);
    // Unknown saint 99, missing saint number, bad count
    assert_eq!(result.errors.len(), 3, "{:?}", result.errors);
    assert!(result.errors.iter().any(|e| e.contains("Row 3") && e.contains("saint number 99")));
    assert!(result.errors.iter().any(|e| e.contains("Row 4: missing saint number")));
    assert!(result.errors.iter().any(|e| e.contains("K Count: Row 3")));

    let conn = &service.storage().conn;
    let saint = SaintRepository::get_by_number(conn, "42").await.unwrap().unwrap();
    let years = SaintYearRepository::get_for_saints(conn, &[saint.id]).await.unwrap();
    assert_eq!(years.len(), 1);
    assert_eq!(years[0].tap_beer_list(), vec!["Stone IPA", "Guinness"]);
    assert_eq!(years[0].can_bottle_beer_list(), vec!["Lone Star"]);
    assert_eq!(years[0].sticker.as_deref(), Some("s19.png"));

    let milestones = MilestoneRepository::get_for_saints(conn, &[saint.id]).await.unwrap();
    assert_eq!(milestones.len(), 1);
    assert_eq!(milestones[0].count, 1000);
}

#[tokio::test]
async fn test_historical_rows_update_and_merge_beer_lists() {
    let (sheets, service) = setup().await;
    set_master(&sheets, &[("loc-1", "Austin", "TX", true)]);
    sheets.set_tab(
        "loc-1",
        "Saints Data",
        tab(SAINTS_HEADER, &[&["42", "Jane Doe", "Saint Jane", "4/9/2016", "2016"]]),
    );
    sheets.set_tab(
        "loc-1",
        "Historical Data",
        tab(HISTORICAL_HEADER, &[&["42", "2019", "Jalapeño", "Stone IPA", "", "https://fb.me/1", "s.png"]]),
    );
    let req = request(&["loc-1"], &[DataType::Saints, DataType::Historical], ConflictResolution::Merge);
    service.import(&req, None).await.unwrap();

    sheets.set_tab(
        "loc-1",
        "Historical Data",
        tab(HISTORICAL_HEADER, &[&["42", "2019", "", "Guinness, Stone IPA", "", "", ""]]),
    );
    let result = service.import(&req, None).await.unwrap();
    assert_eq!(result.records_updated.historical, 1);

    let conn = &service.storage().conn;
    assert_eq!(saint_year::Entity::find().count(conn).await.unwrap(), 1);
    let year = saint_year::Entity::find().one(conn).await.unwrap().unwrap();
    assert_eq!(year.burger, "Jalapeño");
    assert_eq!(year.tap_beer_list(), vec!["Stone IPA", "Guinness"]);
    assert_eq!(year.facebook_event.as_deref(), Some("https://fb.me/1"));
}

#[tokio::test]
async fn test_repeated_milestones_are_not_duplicated() {
    let (sheets, service) = setup().await;
    set_master(&sheets, &[("loc-1", "Austin", "TX", true)]);
    sheets.set_tab(
        "loc-1",
        "Saints Data",
        tab(SAINTS_HEADER, &[&["42", "Jane Doe", "Saint Jane", "4/9/2016", "2016"]]),
    );
    sheets.set_tab("loc-1", "K Count", tab(MILESTONES_HEADER, &[&["42", "1000", "4/9/2020", ""]]));
    let req = request(&["loc-1"], &[DataType::Saints, DataType::Milestones], ConflictResolution::Overwrite);
    service.import(&req, None).await.unwrap();

    sheets.set_tab("loc-1", "K Count", tab(MILESTONES_HEADER, &[&["42", "1000", "4/9/2020", "k.png"]]));
    let result = service.import(&req, None).await.unwrap();
    assert_eq!(result.records_updated.milestones, 1);

    let conn = &service.storage().conn;
    let all = milestone::Entity::find().all(conn).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].sticker.as_deref(), Some("k.png"));
}

#[tokio::test]
async fn test_legacy_matching_without_business_keys() {
    let sheets = Arc::new(MemorySheets::new());
    let storage = Storage::in_memory().await.unwrap();
    let config = SyncConfig {
        require_business_keys: false,
        ..SyncConfig::without_delays()
    };
    let service = SyncService::new(storage, Arc::new(StaticSheetsProvider::new(sheets.clone())), config);

    set_master(&sheets, &[("loc-1", "Austin", "TX", true)]);
    sheets.set_tab(
        "loc-1",
        "Saints Data",
        tab(
            &["Saint Number", "Name", "Saint Name", "Saint Date", "Saint Year", "Total Beers"],
            &[&["10", "A", "Saint A", "1/1", "2015", "500"], &["11", "B", "Saint B", "2/2", "2016", "2000"]],
        ),
    );
    sheets.set_tab("loc-1", "Historical Data", tab(&["Year", "Burger"], &[&["2016", "Classic"]]));
    sheets.set_tab("loc-1", "K Count", tab(&["Count", "Date"], &[&["1000", "5/5/2020"]]));

    let result = service
        .import(&request(&["loc-1"], &DataType::ALL, ConflictResolution::Skip), None)
        .await
        .unwrap();
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let conn = &service.storage().conn;
    let saint_b = SaintRepository::get_by_number(conn, "11").await.unwrap().unwrap();
    assert_eq!(SaintYearRepository::get_for_saints(conn, &[saint_b.id]).await.unwrap().len(), 1);
    assert_eq!(MilestoneRepository::get_for_saints(conn, &[saint_b.id]).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_inactive_and_unknown_locations_are_reported() {
    let (sheets, service) = setup().await;
    set_master(&sheets, &[("loc-1", "Austin", "TX", true), ("loc-2", "Boise", "ID", false)]);
    sheets.set_tab("loc-1", "Saints Data", tab(SAINTS_HEADER, &[&["1", "A", "Saint A", "1/1", "2015"]]));

    let result = service
        .import(
            &request(&["loc-1", "loc-2", "loc-3"], &[DataType::Saints], ConflictResolution::Skip),
            None,
        )
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.records_processed.saints, 1);
    assert_eq!(result.errors.len(), 2);
}

#[tokio::test]
async fn test_missing_tab_is_a_collected_error() {
    let (sheets, service) = setup().await;
    set_master(&sheets, &[("loc-1", "Austin", "TX", true)]);
    sheets.set_tab("loc-1", "Saints Data", tab(SAINTS_HEADER, &[&["1", "A", "Saint A", "1/1", "2015"]]));

    let result = service
        .import(
            &request(&["loc-1"], &[DataType::Saints, DataType::Milestones], ConflictResolution::Skip),
            None,
        )
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.records_processed.saints, 1);
    assert_eq!(result.errors, vec!["Austin, TX / K Count: tab not found or not accessible".to_string()]);
}

#[tokio::test]
async fn test_progress_events_are_streamed() {
    let (sheets, service) = setup().await;
    set_master(&sheets, &[("loc-1", "Austin", "TX", true)]);
    sheets.set_tab("loc-1", "Saints Data", tab(SAINTS_HEADER, &[&["1", "A", "Saint A", "1/1", "2015"]]));

    let (tx, mut rx) = saint_sync::sync::progress_channel();
    service
        .import(&request(&["loc-1"], &[DataType::Saints], ConflictResolution::Skip), Some(tx))
        .await
        .unwrap();

    let mut stages = Vec::new();
    while let Ok(progress) = rx.try_recv() {
        stages.push(progress.stage);
    }
    assert_eq!(stages.first(), Some(&SyncStage::ReadingMaster));
    assert!(stages.contains(&SyncStage::Importing));
    assert_eq!(stages.last(), Some(&SyncStage::Complete));
}
