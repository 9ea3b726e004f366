// Day partitioning of normalized records
//
// Records are grouped by day key. Groups come out in the order their key was
// first seen, and records keep their relative input order inside a group.

use indexmap::IndexMap;

use crate::types::{DayKey, Record};

/// All records of one calendar day, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTable {
    day_key: DayKey,
    records: Vec<Record>,
}

impl DayTable {
    fn new(day_key: DayKey) -> Self {
        Self {
            day_key,
            records: Vec::new(),
        }
    }

    pub fn day_key(&self) -> &DayKey {
        &self.day_key
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Day tables keyed by day, iterated in first-seen order
#[derive(Debug, Clone, Default)]
pub struct DayTables {
    tables: IndexMap<DayKey, DayTable>,
}

impl DayTables {
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn get(&self, day_key: &DayKey) -> Option<&DayTable> {
        self.tables.get(day_key)
    }

    pub fn day_keys(&self) -> impl Iterator<Item = &DayKey> {
        self.tables.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayTable> {
        self.tables.values()
    }

    /// Number of records across every table
    pub fn total_rows(&self) -> usize {
        self.tables.values().map(DayTable::len).sum()
    }
}

impl IntoIterator for DayTables {
    type Item = DayTable;
    type IntoIter = indexmap::map::IntoValues<DayKey, DayTable>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_values()
    }
}

/// Group records into one table per day.
pub fn partition(records: Vec<Record>) -> DayTables {
    let mut tables: IndexMap<DayKey, DayTable> = IndexMap::new();

    for record in records {
        let day_key = record.day_key.clone();
        tables
            .entry(day_key.clone())
            .or_insert_with(|| DayTable::new(day_key))
            .records
            .push(record);
    }

    tracing::debug!(days = tables.len(), "Partitioned records by day");

    DayTables { tables }
}
