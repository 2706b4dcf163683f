#![forbid(unsafe_code)]

use std::sync::Arc;

use adminql_core::{DatabaseId, Name, ServerId, TableId};
use adminql_store::{ClusterMetadata, Deletable, MetadataBuilder, MetadataHandle, UniqueMatch};

fn name(s: &str) -> Name { Name::guarantee_valid(s) }

#[test]
fn freeze_indexes_live_names_only() {
    let mut b = MetadataBuilder::new();
    b.upsert_server(ServerId::from_u128(1), name("alpha"));
    b.upsert_server(ServerId::from_u128(2), name("beta"));
    b.upsert_server(ServerId::from_u128(3), name("beta"));
    b.upsert_server(ServerId::from_u128(4), name("gone"));
    assert!(b.delete_server(ServerId::from_u128(4)));
    let snap = b.freeze();

    assert_eq!(snap.epoch(), 1);
    assert_eq!(snap.server_names().lookup(&name("alpha")), UniqueMatch::Found(ServerId::from_u128(1)));
    assert_eq!(snap.server_names().lookup(&name("beta")), UniqueMatch::Ambiguous(2));
    assert_eq!(snap.server_names().lookup(&name("gone")), UniqueMatch::NotFound);
    assert!(snap.server(&ServerId::from_u128(4)).unwrap().is_deleted());
    assert!(snap.server_name(&ServerId::from_u128(4)).is_none());
}

#[test]
fn deleted_ids_are_never_revived() {
    let mut b = MetadataBuilder::new();
    let db = DatabaseId::from_u128(10);
    assert!(b.upsert_database(db, name("test")));
    assert!(b.delete_database(db));
    assert!(!b.delete_database(db));
    assert!(!b.upsert_database(db, name("test")));
    let snap = b.freeze();
    assert_eq!(snap.database(&db), Some(&Deletable::Deleted));
    assert_eq!(snap.find_database(&name("test")), UniqueMatch::NotFound);
}

#[test]
fn database_search_skips_tombstones() {
    let mut b = MetadataBuilder::new();
    b.upsert_database(DatabaseId::from_u128(1), name("shared"));
    b.upsert_database(DatabaseId::from_u128(2), name("shared"));
    let snap = b.freeze();
    assert_eq!(snap.find_database(&name("shared")), UniqueMatch::Ambiguous(2));

    let mut b = MetadataBuilder::from_snapshot(&snap);
    b.delete_database(DatabaseId::from_u128(2));
    let next = b.freeze();
    assert_eq!(next.epoch(), 2);
    assert_eq!(next.find_database(&name("shared")), UniqueMatch::Found(DatabaseId::from_u128(1)));
    // the earlier snapshot is untouched
    assert_eq!(snap.find_database(&name("shared")), UniqueMatch::Ambiguous(2));
}

#[test]
fn tables_may_point_at_missing_databases() {
    let mut b = MetadataBuilder::new();
    assert!(b.upsert_table(TableId::from_u128(1), name("users"), DatabaseId::from_u128(99)));
    let snap = b.freeze();
    let rec = snap.table(&TableId::from_u128(1)).and_then(Deletable::live).unwrap();
    assert_eq!(rec.database, DatabaseId::from_u128(99));
    assert!(snap.database(&DatabaseId::from_u128(99)).is_none());
}

#[test]
fn handle_publishes_newer_snapshots() {
    let handle = MetadataHandle::default();
    let rx = handle.subscribe_epoch();
    assert_eq!(handle.current().epoch(), 0);

    let mut b = MetadataBuilder::new();
    b.upsert_server(ServerId::from_u128(1), name("alpha"));
    let first = b.freeze();
    assert!(handle.publish(Arc::clone(&first)));
    let reader_view = handle.current();

    b.upsert_server(ServerId::from_u128(1), name("renamed"));
    let second = b.freeze();
    assert!(handle.publish(second));
    assert!(!handle.publish(first));

    assert_eq!(*rx.borrow(), 2);
    assert_eq!(handle.current().server_name(&ServerId::from_u128(1)).unwrap(), "renamed");
    // readers holding an older Arc keep a consistent view
    assert_eq!(reader_view.server_name(&ServerId::from_u128(1)).unwrap(), "alpha");
}

#[test]
fn empty_metadata_has_nothing() {
    let snap = ClusterMetadata::default();
    assert!(snap.server_names().is_empty());
    assert_eq!(snap.find_database(&name("any")), UniqueMatch::NotFound);
}
