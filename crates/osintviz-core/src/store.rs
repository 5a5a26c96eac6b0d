use crate::types::SearchRecord;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// In-memory registry of search records keyed by search id.
///
/// Every mutation goes through [`SearchStore::update`], which runs under the
/// entry's shard lock, so readers only ever see whole records.
#[derive(Default)]
pub struct SearchStore {
    records: DashMap<String, SearchRecord>,
}

impl SearchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record whose id is not yet present. On a duplicate id the
    /// record is handed back untouched.
    pub fn insert_new(&self, record: SearchRecord) -> Result<(), SearchRecord> {
        match self.records.entry(record.id.clone()) {
            Entry::Occupied(_) => Err(record),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<SearchRecord> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    /// Applies `f` to the record while holding its lock.
    pub fn update<F, T>(&self, id: &str, f: F) -> Option<T>
    where
        F: FnOnce(&mut SearchRecord) -> T,
    {
        self.records.get_mut(id).map(|mut entry| f(entry.value_mut()))
    }

    pub fn remove(&self, id: &str) -> Option<SearchRecord> {
        self.records.remove(id).map(|(_, record)| record)
    }

    pub fn snapshot(&self) -> Vec<SearchRecord> {
        self.records
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&self) {
        self.records.clear();
    }
}
