//! Ordered-collection core shared by the gallery, the landing-page
//! slideshow, and selected works: explicit integer ordering, appended items
//! get `max(order) + 1`, and bulk re-stamps assign `index + 1` across the
//! submitted id sequence in one write transaction.

use redb::{ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::db::{Database, DatabaseError};
use super::models::{GalleryItem, LandingSlide, SeriesWork};

pub(crate) type RecordTable = TableDefinition<'static, u64, &'static [u8]>;

/// Records carrying a manually re-stampable sort key.
pub trait Ordered: Serialize + DeserializeOwned {
    fn id(&self) -> u64;
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);
}

impl Ordered for GalleryItem {
    fn id(&self) -> u64 {
        self.id
    }
    fn order(&self) -> u32 {
        self.order
    }
    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

impl Ordered for LandingSlide {
    fn id(&self) -> u64 {
        self.id
    }
    fn order(&self) -> u32 {
        self.order
    }
    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

impl Ordered for SeriesWork {
    fn id(&self) -> u64 {
        self.id
    }
    fn order(&self) -> u32 {
        self.order
    }
    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

impl Database {
    /// All records of a collection, sorted ascending by `(order, id)`.
    /// Duplicate order values are tolerated; the id tie-break keeps the
    /// result stable.
    pub(crate) fn list_ordered<T: Ordered>(
        &self,
        table_def: RecordTable,
    ) -> Result<Vec<T>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(table_def)?;

        let mut records = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let record: T = rmp_serde::from_slice(value.value())?;
            records.push(record);
        }

        records.sort_by_key(|r| (r.order(), r.id()));
        Ok(records)
    }

    /// Get a single record by id.
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table_def: RecordTable,
        id: u64,
    ) -> Result<Option<T>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(table_def)?;

        match table.get(id)? {
            Some(data) => {
                let record: T = rmp_serde::from_slice(data.value())?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Insert a record, issuing its id and (unless the caller supplied one)
    /// the next order value, all in one write transaction.
    pub(crate) fn insert_ordered<T: Ordered>(
        &self,
        table_def: RecordTable,
        counter: &str,
        explicit_order: Option<u32>,
        make: impl FnOnce(u64, u32) -> T,
    ) -> Result<T, DatabaseError> {
        let write_txn = self.begin_write()?;
        let record = {
            let mut table = write_txn.open_table(table_def)?;

            let order = match explicit_order {
                Some(order) => order,
                None => {
                    let mut max_order = 0u32;
                    for result in table.iter()? {
                        let (_, value) = result?;
                        let existing: T = rmp_serde::from_slice(value.value())?;
                        max_order = max_order.max(existing.order());
                    }
                    max_order + 1
                }
            };

            let id = Self::next_id(&write_txn, counter)?;
            let record = make(id, order);
            let data = rmp_serde::to_vec_named(&record)?;
            table.insert(record.id(), data.as_slice())?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    }

    /// Read-modify-write a record in one transaction. Returns the updated
    /// record, or None when the id does not exist.
    pub(crate) fn modify_record<T: Serialize + DeserializeOwned>(
        &self,
        table_def: RecordTable,
        id: u64,
        apply: impl FnOnce(&mut T),
    ) -> Result<Option<T>, DatabaseError> {
        let write_txn = self.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(table_def)?;
            let existing: Option<T> = match table.get(id)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };

            match existing {
                Some(mut record) => {
                    apply(&mut record);
                    let data = rmp_serde::to_vec_named(&record)?;
                    table.insert(id, data.as_slice())?;
                    Some(record)
                }
                None => None,
            }
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Remove a record, returning it so the caller can clean up its blob.
    pub(crate) fn delete_record<T: DeserializeOwned>(
        &self,
        table_def: RecordTable,
        id: u64,
    ) -> Result<Option<T>, DatabaseError> {
        let write_txn = self.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(table_def)?;
            let x = match table.remove(id)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };
            x
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// Re-stamp a collection's order from the submitted id sequence:
    /// `order(ids[i]) = i + 1`. Ids that no longer resolve to a row are
    /// skipped. Applied as one write transaction, so readers never observe a
    /// partially stamped order.
    pub(crate) fn reorder<T: Ordered>(
        &self,
        table_def: RecordTable,
        ids: &[u64],
    ) -> Result<(), DatabaseError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(table_def)?;
            for (index, id) in ids.iter().enumerate() {
                let existing: Option<T> = match table.get(id)? {
                    Some(data) => Some(rmp_serde::from_slice(data.value())?),
                    None => None,
                };

                if let Some(mut record) = existing {
                    record.set_order(index as u32 + 1);
                    let data = rmp_serde::to_vec_named(&record)?;
                    table.insert(*id, data.as_slice())?;
                }
            }
        }
        write_txn.commit()?;
        Ok(())
    }
}
