//! adminql store: read-only cluster metadata snapshots, the builder that
//! produces them, and the handle that publishes them to readers.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Instant;

use adminql_core::{DatabaseId, EntityId, Name, ServerId, TableId};
use arc_swap::ArcSwap;
use metrics::histogram;
use rustc_hash::FxHashMap;
use tokio::sync::watch;
use tracing::{debug, warn};

pub mod index;

pub use index::{NameIndex, UniqueMatch};

/// Collection entry: a live record or a tombstone left behind by a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletable<T> {
    Live(T),
    Deleted,
}

impl<T> Deletable<T> {
    pub fn is_deleted(&self) -> bool { matches!(self, Deletable::Deleted) }

    pub fn live(&self) -> Option<&T> {
        match self { Deletable::Live(v) => Some(v), Deletable::Deleted => None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRecord { pub name: Name }

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseRecord { pub name: Name }

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRecord {
    pub name: Name,
    pub database: DatabaseId,
}

/// Anything with a name that can sit in a collection.
pub trait Named {
    fn name(&self) -> &Name;
}

impl Named for ServerRecord { fn name(&self) -> &Name { &self.name } }
impl Named for DatabaseRecord { fn name(&self) -> &Name { &self.name } }
impl Named for TableRecord { fn name(&self) -> &Name { &self.name } }

pub type Collection<Id, T> = FxHashMap<Id, Deletable<T>>;

/// Live name of `id`, or `None` when absent or tombstoned.
pub fn live_name<'a, Id: EntityId, T: Named>(coll: &'a Collection<Id, T>, id: &Id) -> Option<&'a Name> {
    coll.get(id).and_then(Deletable::live).map(Named::name)
}

fn build_index<Id: EntityId, T: Named>(coll: &Collection<Id, T>) -> NameIndex<Id> {
    let mut idx = NameIndex::default();
    for (id, entry) in coll.iter() {
        if let Deletable::Live(rec) = entry {
            idx.insert(rec.name().clone(), *id);
        }
    }
    idx
}

/// Consistent, immutable view of cluster metadata.
#[derive(Debug, Clone, Default)]
pub struct ClusterMetadata {
    epoch: u64,
    servers: Collection<ServerId, ServerRecord>,
    databases: Collection<DatabaseId, DatabaseRecord>,
    tables: Collection<TableId, TableRecord>,
    server_names: NameIndex<ServerId>,
    database_names: NameIndex<DatabaseId>,
}

impl ClusterMetadata {
    pub fn epoch(&self) -> u64 { self.epoch }

    pub fn servers(&self) -> &Collection<ServerId, ServerRecord> { &self.servers }
    pub fn databases(&self) -> &Collection<DatabaseId, DatabaseRecord> { &self.databases }
    pub fn tables(&self) -> &Collection<TableId, TableRecord> { &self.tables }

    pub fn server(&self, id: &ServerId) -> Option<&Deletable<ServerRecord>> { self.servers.get(id) }
    pub fn database(&self, id: &DatabaseId) -> Option<&Deletable<DatabaseRecord>> { self.databases.get(id) }
    pub fn table(&self, id: &TableId) -> Option<&Deletable<TableRecord>> { self.tables.get(id) }

    pub fn server_name(&self, id: &ServerId) -> Option<&Name> { live_name(&self.servers, id) }
    pub fn database_name(&self, id: &DatabaseId) -> Option<&Name> { live_name(&self.databases, id) }

    /// Index of live server names.
    pub fn server_names(&self) -> &NameIndex<ServerId> { &self.server_names }

    /// Index of live database names.
    pub fn database_names(&self) -> &NameIndex<DatabaseId> { &self.database_names }

    /// Unique database search by name; tombstoned entries count as absent.
    pub fn find_database(&self, name: &Name) -> UniqueMatch<DatabaseId> {
        self.database_names.lookup_filtered(name, |id| {
            self.databases.get(id).map_or(false, |e| !e.is_deleted())
        })
    }
}

/// Accumulates metadata changes and freezes them into snapshots.
#[derive(Debug, Default)]
pub struct MetadataBuilder {
    epoch: u64,
    servers: Collection<ServerId, ServerRecord>,
    databases: Collection<DatabaseId, DatabaseRecord>,
    tables: Collection<TableId, TableRecord>,
}

fn upsert<Id: EntityId, T>(coll: &mut Collection<Id, T>, id: Id, rec: T) -> bool {
    if coll.get(&id).map_or(false, Deletable::is_deleted) {
        warn!(kind = Id::KIND, id = ?id, "refusing to revive a deleted id");
        return false;
    }
    coll.insert(id, Deletable::Live(rec));
    true
}

fn tombstone<Id: EntityId, T>(coll: &mut Collection<Id, T>, id: Id) -> bool {
    match coll.get_mut(&id) {
        Some(entry) if !entry.is_deleted() => { *entry = Deletable::Deleted; true }
        _ => false,
    }
}

impl MetadataBuilder {
    pub fn new() -> Self { Self::default() }

    /// Start from an existing snapshot; the next freeze bumps its epoch.
    pub fn from_snapshot(snap: &ClusterMetadata) -> Self {
        Self {
            epoch: snap.epoch,
            servers: snap.servers.clone(),
            databases: snap.databases.clone(),
            tables: snap.tables.clone(),
        }
    }

    /// Add or rename a server. Returns false if the id was deleted before;
    /// ids are never reused.
    pub fn upsert_server(&mut self, id: ServerId, name: Name) -> bool {
        upsert(&mut self.servers, id, ServerRecord { name })
    }

    pub fn upsert_database(&mut self, id: DatabaseId, name: Name) -> bool {
        upsert(&mut self.databases, id, DatabaseRecord { name })
    }

    /// The owning database is not checked: a table may briefly refer to a
    /// database that is gone or not yet visible.
    pub fn upsert_table(&mut self, id: TableId, name: Name, database: DatabaseId) -> bool {
        upsert(&mut self.tables, id, TableRecord { name, database })
    }

    pub fn delete_server(&mut self, id: ServerId) -> bool { tombstone(&mut self.servers, id) }
    pub fn delete_database(&mut self, id: DatabaseId) -> bool { tombstone(&mut self.databases, id) }
    pub fn delete_table(&mut self, id: TableId) -> bool { tombstone(&mut self.tables, id) }

    /// Freeze the current state into a snapshot with fresh name indexes.
    pub fn freeze(&mut self) -> Arc<ClusterMetadata> {
        let started = Instant::now();
        self.epoch = self.epoch.saturating_add(1);
        let snap = ClusterMetadata {
            epoch: self.epoch,
            server_names: build_index(&self.servers),
            database_names: build_index(&self.databases),
            servers: self.servers.clone(),
            databases: self.databases.clone(),
            tables: self.tables.clone(),
        };
        histogram!("adminql_snapshot_build_ms", started.elapsed().as_secs_f64() * 1000.0);
        Arc::new(snap)
    }
}

/// Publishes snapshots to readers. Each reader call takes one `Arc` and works
/// against it for its whole duration.
#[derive(Clone)]
pub struct MetadataHandle {
    snap: Arc<ArcSwap<ClusterMetadata>>,
    epoch_tx: Arc<watch::Sender<u64>>,
}

impl MetadataHandle {
    pub fn new(initial: Arc<ClusterMetadata>) -> Self {
        let (epoch_tx, _rx) = watch::channel(initial.epoch);
        Self { snap: Arc::new(ArcSwap::new(initial)), epoch_tx: Arc::new(epoch_tx) }
    }

    pub fn current(&self) -> Arc<ClusterMetadata> { self.snap.load_full() }

    /// Swap in `next`; snapshots not newer than the current one are ignored.
    /// Expects a single writer.
    pub fn publish(&self, next: Arc<ClusterMetadata>) -> bool {
        let current = self.snap.load().epoch;
        if next.epoch <= current && current != 0 {
            warn!(current, offered = next.epoch, "ignoring stale metadata snapshot");
            return false;
        }
        let epoch = next.epoch;
        self.snap.store(next);
        self.epoch_tx.send_replace(epoch);
        debug!(epoch, "published metadata snapshot");
        true
    }

    pub fn subscribe_epoch(&self) -> watch::Receiver<u64> { self.epoch_tx.subscribe() }
}

impl Default for MetadataHandle {
    fn default() -> Self { Self::new(Arc::new(ClusterMetadata::default())) }
}
