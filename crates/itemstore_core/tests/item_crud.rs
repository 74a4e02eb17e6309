use itemstore_core::db::open_db_in_memory;
use itemstore_core::{
    Item, ItemListQuery, ItemRepository, ItemService, RepoError, SqliteItemRepository,
};
use rusqlite::Connection;
use std::collections::HashSet;

fn widget(id: i64, name: &str, price: f64) -> Item {
    Item::new(id, name, Some("A widget"), price).unwrap()
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    let item = widget(1, "Widget1", 9.99);
    let created = repo.create_item(&item).unwrap();
    assert_eq!(created, item);

    let loaded = repo.get_item(1).unwrap().unwrap();
    assert_eq!(loaded, item);
}

#[test]
fn absent_and_empty_descriptions_stay_distinct() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    repo.create_item(&Item::new(1, "NoDescription", None, 1.0).unwrap())
        .unwrap();
    repo.create_item(&Item::new(2, "EmptyDescription", Some(""), 1.0).unwrap())
        .unwrap();

    assert_eq!(repo.get_item(1).unwrap().unwrap().description, None);
    assert_eq!(
        repo.get_item(2).unwrap().unwrap().description.as_deref(),
        Some("")
    );
}

#[test]
fn create_twice_with_same_id_conflicts_regardless_of_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    repo.create_item(&widget(7, "First", 1.0)).unwrap();
    let err = repo.create_item(&widget(7, "Second", 2.0)).unwrap_err();
    assert!(matches!(err, RepoError::Conflict(7)));

    let stored = repo.get_item(7).unwrap().unwrap();
    assert_eq!(stored.name, "First");
}

#[test]
fn get_missing_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    assert!(repo.get_item(42).unwrap().is_none());
}

#[test]
fn update_replaces_every_field() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    repo.create_item(&widget(1, "Widget1", 9.99)).unwrap();

    let replacement = Item::new(1, "Widget2", None, 19.99).unwrap();
    let updated = repo.update_item(1, &replacement).unwrap();
    assert_eq!(updated, replacement);

    let loaded = repo.get_item(1).unwrap().unwrap();
    assert_eq!(loaded.name, "Widget2");
    assert_eq!(loaded.description, None);
    assert_eq!(loaded.price, 19.99);
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    let err = repo.update_item(3, &widget(3, "Missing", 1.0)).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(3)));
}

#[test]
fn update_with_mismatched_id_is_rejected_and_row_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    let original = widget(1, "Widget1", 9.99);
    repo.create_item(&original).unwrap();

    let err = repo.update_item(1, &widget(2, "Widget2", 5.0)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::IdMismatch {
            path_id: 1,
            body_id: 2
        }
    ));
    assert_eq!(repo.get_item(1).unwrap().unwrap(), original);
    assert!(repo.get_item(2).unwrap().is_none());
}

#[test]
fn update_checks_existence_before_identity() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    let err = repo.update_item(1, &widget(2, "Widget2", 5.0)).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(1)));
}

#[test]
fn delete_removes_row_and_second_delete_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    repo.create_item(&widget(1, "Widget1", 9.99)).unwrap();
    repo.delete_item(1).unwrap();

    assert!(repo.get_item(1).unwrap().is_none());
    let err = repo.delete_item(1).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(1)));
}

#[test]
fn deleted_id_can_be_created_again() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    repo.create_item(&widget(1, "Widget1", 9.99)).unwrap();
    repo.delete_item(1).unwrap();
    repo.create_item(&widget(1, "Reborn", 3.0)).unwrap();

    assert_eq!(repo.get_item(1).unwrap().unwrap().name, "Reborn");
}

#[test]
fn list_without_filter_returns_everything() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    assert!(repo.list_items(&ItemListQuery::default()).unwrap().is_empty());

    for (id, price) in [(1, 5.0), (2, 10.0), (3, 15.0)] {
        repo.create_item(&widget(id, "Widget", price)).unwrap();
    }

    let ids: HashSet<_> = repo
        .list_items(&ItemListQuery::default())
        .unwrap()
        .into_iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(ids, HashSet::from([1, 2, 3]));
}

#[test]
fn list_filter_is_inclusive_upper_bound() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    for (id, price) in [(1, 5.0), (2, 10.0), (3, 15.0)] {
        repo.create_item(&widget(id, "Widget", price)).unwrap();
    }

    let query = ItemListQuery {
        max_price: Some(10.0),
    };
    let ids: HashSet<_> = repo
        .list_items(&query)
        .unwrap()
        .into_iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(ids, HashSet::from([1, 2]));

    let none = ItemListQuery {
        max_price: Some(1.0),
    };
    assert!(repo.list_items(&none).unwrap().is_empty());
}

#[test]
fn invalid_items_never_reach_storage() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    let mut invalid = widget(1, "Widget1", 9.99);
    invalid.price = 0.0;
    let err = repo.create_item(&invalid).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.get_item(1).unwrap().is_none());

    repo.create_item(&widget(1, "Widget1", 9.99)).unwrap();
    invalid.name = "x".to_string();
    invalid.price = 1.0;
    let err = repo.update_item(1, &invalid).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn corrupt_rows_are_reported_instead_of_masked() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO items (id, name, description, price) VALUES (1, 'bad name!', NULL, 1.0);",
        [],
    )
    .unwrap();
    let repo = SqliteItemRepository::new(&conn);

    let err = repo.get_item(1).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn conflicting_writer_inside_open_transaction_surfaces_as_db_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("items.db");
    let location = itemstore_core::DatabaseLocation::File(path.clone());
    let conn = itemstore_core::db::provision_db(&location).unwrap();

    let blocker = Connection::open(&path).unwrap();
    blocker.execute_batch("BEGIN IMMEDIATE;").unwrap();
    conn.busy_timeout(std::time::Duration::from_millis(10))
        .unwrap();

    let repo = SqliteItemRepository::new(&conn);
    let err = repo.create_item(&widget(1, "Widget1", 9.99)).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    blocker.execute_batch("ROLLBACK;").unwrap();
    repo.create_item(&widget(1, "Widget1", 9.99)).unwrap();
}

#[test]
fn concurrent_creates_across_connections_admit_one_writer() {
    let dir = tempfile::tempdir().unwrap();
    let location = itemstore_core::DatabaseLocation::File(dir.path().join("items.db"));
    itemstore_core::db::close_db(itemstore_core::db::provision_db(&location).unwrap()).unwrap();

    let barrier = std::sync::Arc::new(std::sync::Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|n| {
            let location = location.clone();
            let barrier = std::sync::Arc::clone(&barrier);
            std::thread::spawn(move || {
                let conn = itemstore_core::db::open_db(&location).unwrap();
                let repo = SqliteItemRepository::new(&conn);
                barrier.wait();
                repo.create_item(&widget(3, &format!("Racer{n}"), 1.0))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|err| matches!(err, RepoError::Conflict(3))));

    let conn = itemstore_core::db::open_db(&location).unwrap();
    let repo = SqliteItemRepository::new(&conn);
    assert_eq!(repo.list_items(&ItemListQuery::default()).unwrap().len(), 1);
}

#[test]
fn service_wraps_repository_calls() {
    let conn = open_db_in_memory().unwrap();
    let service = ItemService::new(SqliteItemRepository::new(&conn));

    let item = widget(1, "Widget1", 9.99);
    service.create_item(&item).unwrap();
    assert_eq!(service.get_item(1).unwrap(), item);

    assert!(matches!(service.get_item(2), Err(RepoError::NotFound(2))));
    assert_eq!(service.list_items(Some(9.99)).unwrap(), vec![item.clone()]);
    assert!(service.list_items(Some(9.98)).unwrap().is_empty());

    service.delete_item(1).unwrap();
    assert!(matches!(service.get_item(1), Err(RepoError::NotFound(1))));
}
