//! Listing filters and category lifecycle against a real SQLite schema.

mod common;

use std::collections::BTreeSet;

use common::{at, event_input, Reply, TestApp};
use events_server::db::ListParams;
use events_server::models::{AddressFields, CategoryInput, EventInput};
use events_server::services::EventListing;
use events_server::utils::AppError;

fn params(search: Option<&str>, start: Option<&str>, end: Option<&str>, category: Option<&str>) -> ListParams {
    ListParams {
        search: search.map(str::to_string),
        start_date: start.map(str::to_string),
        end_date: end.map(str::to_string),
        category_id: category.map(str::to_string),
    }
}

fn ids(listing: &EventListing) -> Vec<i64> {
    listing.events.iter().map(|e| e.event.id).collect()
}

fn id_set(listing: &EventListing) -> BTreeSet<i64> {
    ids(listing).into_iter().collect()
}

async fn category(app: &TestApp, name: &str) -> i64 {
    app.state
        .categories
        .create(CategoryInput {
            name: name.to_string(),
            description: None,
        })
        .await
        .unwrap()
        .id
}

async fn create(app: &TestApp, input: EventInput) -> i64 {
    app.state.events.create(input, None).await.unwrap().id
}

#[tokio::test]
async fn test_search_and_category_select_only_matching_category() {
    let app = TestApp::new(Reply::NoMatch).await;
    let conferences = category(&app, "Conference").await;
    let meetups = category(&app, "Meetup").await;

    let mut matching = event_input("Python Conference", at(2024, 6, 10, 9), at(2024, 6, 11, 17));
    matching.category_id = Some(conferences);
    let matching = create(&app, matching).await;

    let mut other = event_input("Conference Afterparty", at(2024, 6, 11, 20), at(2024, 6, 11, 23));
    other.category_id = Some(meetups);
    create(&app, other).await;

    let listing = app
        .state
        .events
        .list(&params(Some("conference"), None, None, Some(&conferences.to_string())))
        .await
        .unwrap();

    assert_eq!(ids(&listing), vec![matching]);
    assert_eq!(
        listing.events[0].event.category_name.as_deref(),
        Some("Conference")
    );
}

#[tokio::test]
async fn test_search_is_case_insensitive_across_text_columns() {
    let app = TestApp::new(Reply::NoMatch).await;

    let by_title = create(&app, event_input("JAZZ night", at(2024, 5, 1, 20), at(2024, 5, 1, 23))).await;

    let mut by_description = event_input("Evening", at(2024, 5, 2, 20), at(2024, 5, 2, 23));
    by_description.description = Some("Live jazz quartet".to_string());
    let by_description = create(&app, by_description).await;

    let mut by_venue = event_input("Session", at(2024, 5, 3, 20), at(2024, 5, 3, 23));
    by_venue.address = AddressFields {
        location_name: Some("Jazzcafé".to_string()),
        ..AddressFields::default()
    };
    let by_venue = create(&app, by_venue).await;

    let mut by_street = event_input("Walk", at(2024, 5, 4, 10), at(2024, 5, 4, 12));
    by_street.address = AddressFields {
        street_name: Some("Jazzstraat".to_string()),
        ..AddressFields::default()
    };
    let by_street = create(&app, by_street).await;

    create(&app, event_input("Rock concert", at(2024, 5, 5, 20), at(2024, 5, 5, 23))).await;

    let listing = app
        .state
        .events
        .list(&params(Some("Jazz"), None, None, None))
        .await
        .unwrap();

    assert_eq!(ids(&listing), vec![by_title, by_description, by_venue, by_street]);
}

#[tokio::test]
async fn test_filter_kinds_intersect() {
    let app = TestApp::new(Reply::NoMatch).await;

    create(&app, event_input("Workshop early", at(2024, 3, 1, 9), at(2024, 3, 1, 12))).await;
    create(&app, event_input("Workshop late", at(2024, 7, 1, 9), at(2024, 7, 1, 12))).await;
    create(&app, event_input("Concert late", at(2024, 7, 2, 20), at(2024, 7, 2, 23))).await;

    let search_only = app
        .state
        .events
        .list(&params(Some("workshop"), None, None, None))
        .await
        .unwrap();
    let date_only = app
        .state
        .events
        .list(&params(None, Some("2024-06-01"), None, None))
        .await
        .unwrap();
    let both = app
        .state
        .events
        .list(&params(Some("workshop"), Some("2024-06-01"), None, None))
        .await
        .unwrap();

    let expected: BTreeSet<i64> = id_set(&search_only)
        .intersection(&id_set(&date_only))
        .copied()
        .collect();
    assert_eq!(id_set(&both), expected);
    assert_eq!(both.events.len(), 1);
    assert_eq!(both.events[0].event.title, "Workshop late");
}

#[tokio::test]
async fn test_date_bounds_are_inclusive() {
    let app = TestApp::new(Reply::NoMatch).await;

    let on_start_day = create(&app, event_input("Starts midnight", at(2024, 6, 1, 0), at(2024, 6, 1, 2))).await;
    create(&app, event_input("Day before", at(2024, 5, 31, 22), at(2024, 6, 1, 1))).await;
    let ends_late = create(&app, event_input("Ends late", at(2024, 6, 3, 18), at(2024, 6, 3, 23))).await;
    create(&app, event_input("Runs over", at(2024, 6, 3, 20), at(2024, 6, 4, 1))).await;

    let listing = app
        .state
        .events
        .list(&params(None, Some("2024-06-01"), Some("2024-06-03"), None))
        .await
        .unwrap();

    assert_eq!(ids(&listing), vec![on_start_day, ends_late]);
    assert!(listing.warnings.is_empty());
}

#[tokio::test]
async fn test_malformed_date_warns_and_other_filters_still_apply() {
    let app = TestApp::new(Reply::NoMatch).await;

    let meetup = create(&app, event_input("Tech Meetup", at(2024, 1, 5, 18), at(2024, 1, 5, 21))).await;
    create(&app, event_input("Marathon", at(2024, 1, 6, 8), at(2024, 1, 6, 16))).await;

    let listing = app
        .state
        .events
        .list(&params(Some("meetup"), Some("next friday"), None, None))
        .await
        .unwrap();

    assert_eq!(ids(&listing), vec![meetup]);
    assert_eq!(listing.warnings.len(), 1);
    assert!(listing.warnings[0].contains("next friday"));
}

#[tokio::test]
async fn test_results_are_ordered_by_start_time() {
    let app = TestApp::new(Reply::NoMatch).await;

    let third = create(&app, event_input("C", at(2024, 9, 3, 9), at(2024, 9, 3, 10))).await;
    let first = create(&app, event_input("A", at(2024, 9, 1, 9), at(2024, 9, 1, 10))).await;
    let second = create(&app, event_input("B", at(2024, 9, 2, 9), at(2024, 9, 2, 10))).await;

    let listing = app.state.events.list(&ListParams::default()).await.unwrap();

    assert_eq!(ids(&listing), vec![first, second, third]);
}

#[tokio::test]
async fn test_wildcards_in_search_match_literally() {
    let app = TestApp::new(Reply::NoMatch).await;

    let sale = create(&app, event_input("50% off market", at(2024, 2, 1, 9), at(2024, 2, 1, 17))).await;
    create(&app, event_input("500 runners", at(2024, 2, 2, 9), at(2024, 2, 2, 17))).await;

    let listing = app
        .state
        .events
        .list(&params(Some("50%"), None, None, None))
        .await
        .unwrap();

    assert_eq!(ids(&listing), vec![sale]);
}

#[tokio::test]
async fn test_deleting_category_keeps_its_events() {
    let app = TestApp::new(Reply::NoMatch).await;
    let sport = category(&app, "Sport").await;

    let mut marathon = event_input("Marathon Rotterdam", at(2024, 4, 14, 8), at(2024, 4, 14, 20));
    marathon.category_id = Some(sport);
    let marathon = create(&app, marathon).await;

    app.state.categories.delete(sport).await.unwrap();

    let event = app.state.events.get(marathon).await.unwrap();
    assert!(event.category_id.is_none());
    assert!(event.category_name.is_none());

    let listing = app
        .state
        .events
        .list(&params(Some("marathon"), None, None, None))
        .await
        .unwrap();
    assert_eq!(ids(&listing), vec![marathon]);

    assert!(matches!(
        app.state.categories.get(sport).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_duplicate_category_name_leaves_first_row_untouched() {
    let app = TestApp::new(Reply::NoMatch).await;

    let first = app
        .state
        .categories
        .create(CategoryInput {
            name: "Workshop".to_string(),
            description: Some("Hands-on learning sessions".to_string()),
        })
        .await
        .unwrap();

    let second = app
        .state
        .categories
        .create(CategoryInput {
            name: "Workshop".to_string(),
            description: Some("Overwritten?".to_string()),
        })
        .await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    let all = app.state.categories.list().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, first.id);
    assert_eq!(all[0].description.as_deref(), Some("Hands-on learning sessions"));
}

#[tokio::test]
async fn test_renaming_category_onto_existing_name_conflicts() {
    let app = TestApp::new(Reply::NoMatch).await;
    category(&app, "Concert").await;
    let exhibition = category(&app, "Exhibition").await;

    let result = app
        .state
        .categories
        .update(
            exhibition,
            CategoryInput {
                name: "Concert".to_string(),
                description: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let unchanged = app.state.categories.get(exhibition).await.unwrap();
    assert_eq!(unchanged.name, "Exhibition");
}

#[tokio::test]
async fn test_search_folds_ascii_letters_only() {
    let app = TestApp::new(Reply::NoMatch).await;

    let cafe = create(&app, event_input("Grand café quiz", at(2024, 8, 1, 20), at(2024, 8, 1, 22))).await;
    create(&app, event_input("ÉTÉ FESTIVAL", at(2024, 8, 2, 12), at(2024, 8, 2, 23))).await;

    let listing = app
        .state
        .events
        .list(&params(Some("CAFé"), None, None, None))
        .await
        .unwrap();
    assert_eq!(ids(&listing), vec![cafe]);

    let listing = app
        .state
        .events
        .list(&params(Some("été"), None, None, None))
        .await
        .unwrap();
    assert!(listing.events.is_empty());
}
