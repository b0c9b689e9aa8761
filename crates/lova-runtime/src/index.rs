//! Dense index spaces for raw user and item ids

use lova_core::{InteractionTable, RawId};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

/// Injective mapping from raw id to a dense zero-based index.
///
/// Indices are assigned in first-appearance order. The map never changes
/// once built: ids that were not present at build time stay unmapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMap<K: Hash + Eq = RawId> {
    ids: Vec<K>,
    positions: HashMap<K, usize>,
}

impl<K: Hash + Eq + Clone> IndexMap<K> {
    /// Build from ids in dataset order; repeated ids keep their first index
    pub fn build<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        let mut map = Self {
            ids: Vec::new(),
            positions: HashMap::new(),
        };
        for id in ids {
            if !map.positions.contains_key(id) {
                map.positions.insert(id.clone(), map.ids.len());
                map.ids.push(id.clone());
            }
        }
        map
    }

    /// Index of a raw id, `None` when the id is unmapped
    pub fn get(&self, id: &K) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Raw id at an index
    pub fn id(&self, index: usize) -> Option<&K> {
        self.ids.get(index)
    }

    /// Ids in index order
    pub fn ids(&self) -> &[K] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<K: Hash + Eq + Serialize> Serialize for IndexMap<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.ids.serialize(serializer)
    }
}

impl<'de, K> Deserialize<'de> for IndexMap<K>
where
    K: Hash + Eq + Clone + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let ids = Vec::<K>::deserialize(deserializer)?;
        let map = IndexMap::build(ids.iter());
        if map.len() != ids.len() {
            return Err(D::Error::custom("duplicate id in index map"));
        }
        Ok(map)
    }
}

/// User and item index spaces of one dataset snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMaps {
    pub users: IndexMap,
    pub items: IndexMap,
}

impl IndexMaps {
    /// Map a (user, item) pair; `None` if either side is unmapped
    pub fn lookup(&self, user: &RawId, item: &RawId) -> Option<(usize, usize)> {
        Some((self.users.get(user)?, self.items.get(item)?))
    }
}

/// Builds [`IndexMaps`] from the user and item columns of a table.
pub struct IdIndexer;

impl IdIndexer {
    pub fn index(table: &InteractionTable) -> IndexMaps {
        let users = IndexMap::build(table.users());
        let items = IndexMap::build(table.items());
        debug!(
            "Indexed {} users and {} items from {} interactions",
            users.len(),
            items.len(),
            table.len()
        );
        IndexMaps { users, items }
    }
}
