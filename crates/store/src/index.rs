//! Name → id multi-index.

#![forbid(unsafe_code)]

use adminql_core::{EntityId, Name};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Outcome of looking a name up when exactly one match is wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueMatch<Id> {
    NotFound,
    /// Number of live entries sharing the name (always > 1).
    Ambiguous(usize),
    Found(Id),
}

impl<Id> UniqueMatch<Id> {
    fn classify(ids: &[Id]) -> Self
    where
        Id: Copy,
    {
        match ids {
            [] => UniqueMatch::NotFound,
            [id] => UniqueMatch::Found(*id),
            many => UniqueMatch::Ambiguous(many.len()),
        }
    }
}

/// A name may legitimately map to several ids (two servers started with the
/// same name, a rename racing with a create); the index keeps all of them.
#[derive(Debug, Clone)]
pub struct NameIndex<Id> {
    map: FxHashMap<Name, SmallVec<[Id; 1]>>,
}

impl<Id: EntityId> Default for NameIndex<Id> {
    fn default() -> Self { Self { map: FxHashMap::default() } }
}

impl<Id: EntityId> NameIndex<Id> {
    pub fn insert(&mut self, name: Name, id: Id) {
        let ids = self.map.entry(name).or_default();
        if !ids.contains(&id) {
            ids.push(id);
            ids.sort_unstable();
        }
    }

    /// All ids currently carrying `name`, in id order.
    pub fn get(&self, name: &Name) -> &[Id] {
        self.map.get(name).map(|ids| ids.as_slice()).unwrap_or(&[])
    }

    /// Count and fetch in a single read of the index.
    pub fn lookup(&self, name: &Name) -> UniqueMatch<Id> { UniqueMatch::classify(self.get(name)) }

    /// Like [`lookup`](Self::lookup) but ignoring ids rejected by `live`.
    pub fn lookup_filtered(&self, name: &Name, live: impl Fn(&Id) -> bool) -> UniqueMatch<Id> {
        let ids: SmallVec<[Id; 2]> = self.get(name).iter().copied().filter(|id| live(id)).collect();
        UniqueMatch::classify(&ids)
    }

    pub fn len(&self) -> usize { self.map.len() }

    pub fn is_empty(&self) -> bool { self.map.is_empty() }
}
