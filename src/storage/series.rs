use chrono::Utc;
use redb::{ReadableTable, WriteTransaction};

use super::db::{Database, DatabaseError};
use super::models::{Patch, Series, SeriesWork};
use super::tables::{SERIES, SERIES_WORKS, SERIES_WORKS_IDX};

/// Fields of a new selected work. `order` is computed when not supplied.
#[derive(Debug)]
pub struct NewWork {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub order: Option<u32>,
    pub selected_series_id: Option<u64>,
}

/// Fields of a work update; absent fields keep their stored values.
/// `selected_series_id` distinguishes "leave alone" from "detach" from
/// "move to another series".
#[derive(Debug, Default)]
pub struct WorkChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub available: Option<bool>,
    pub selected_series_id: Patch<u64>,
}

impl Database {
    // ========================================================================
    // Series operations
    // ========================================================================

    pub fn insert_series(
        &self,
        name: String,
        image_url: Option<String>,
    ) -> Result<Series, DatabaseError> {
        let now = Utc::now();
        let write_txn = self.begin_write()?;
        let series = {
            let mut table = write_txn.open_table(SERIES)?;
            let id = Self::next_id(&write_txn, "series")?;
            let series = Series {
                id,
                name,
                image_url,
                created_at: now,
                updated_at: now,
            };
            let data = rmp_serde::to_vec_named(&series)?;
            table.insert(id, data.as_slice())?;
            series
        };
        write_txn.commit()?;
        Ok(series)
    }

    /// All series with their works eagerly attached, works ascending by order.
    pub fn list_series_with_works(
        &self,
    ) -> Result<Vec<(Series, Vec<SeriesWork>)>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let series_table = read_txn.open_table(SERIES)?;
        let works_table = read_txn.open_table(SERIES_WORKS)?;
        let idx_table = read_txn.open_table(SERIES_WORKS_IDX)?;

        let mut result = Vec::new();
        for entry in series_table.iter()? {
            let (_, value) = entry?;
            let series: Series = rmp_serde::from_slice(value.value())?;

            let work_ids: Vec<u64> = match idx_table.get(series.id)? {
                Some(data) => rmp_serde::from_slice(data.value())?,
                None => Vec::new(),
            };

            let mut works = Vec::new();
            for work_id in work_ids {
                if let Some(data) = works_table.get(work_id)? {
                    let work: SeriesWork = rmp_serde::from_slice(data.value())?;
                    works.push(work);
                }
            }
            works.sort_by_key(|w| (w.order, w.id));

            result.push((series, works));
        }

        result.sort_by_key(|(s, _)| s.id);
        Ok(result)
    }

    pub fn get_series_with_works(
        &self,
        id: u64,
    ) -> Result<Option<(Series, Vec<SeriesWork>)>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let series_table = read_txn.open_table(SERIES)?;

        let series: Series = match series_table.get(id)? {
            Some(data) => rmp_serde::from_slice(data.value())?,
            None => return Ok(None),
        };

        let idx_table = read_txn.open_table(SERIES_WORKS_IDX)?;
        let work_ids: Vec<u64> = match idx_table.get(id)? {
            Some(data) => rmp_serde::from_slice(data.value())?,
            None => Vec::new(),
        };

        let works_table = read_txn.open_table(SERIES_WORKS)?;
        let mut works = Vec::new();
        for work_id in work_ids {
            if let Some(data) = works_table.get(work_id)? {
                let work: SeriesWork = rmp_serde::from_slice(data.value())?;
                works.push(work);
            }
        }
        works.sort_by_key(|w| (w.order, w.id));

        Ok(Some((series, works)))
    }

    /// Partial series update: only supplied fields are written. A name-only
    /// edit is valid; the image stays untouched.
    pub fn update_series(
        &self,
        id: u64,
        name: Option<String>,
        image_url: Option<String>,
    ) -> Result<Option<Series>, DatabaseError> {
        self.modify_record(SERIES, id, |series: &mut Series| {
            if let Some(name) = name {
                series.name = name;
            }
            if let Some(image_url) = image_url {
                series.image_url = Some(image_url);
            }
            series.updated_at = Utc::now();
        })
    }

    /// Remove a series and cascade to its works and their index entry, all in
    /// one transaction. Returns the removed rows so the caller can clean up
    /// the series blob and every child blob.
    pub fn delete_series(
        &self,
        id: u64,
    ) -> Result<Option<(Series, Vec<SeriesWork>)>, DatabaseError> {
        let write_txn = self.begin_write()?;

        let removed: Option<Series> = {
            let mut series_table = write_txn.open_table(SERIES)?;
            let x = match series_table.remove(id)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };
            x
        };

        let mut removed_works = Vec::new();
        if removed.is_some() {
            let work_ids: Vec<u64> = {
                let mut idx_table = write_txn.open_table(SERIES_WORKS_IDX)?;
                let x = match idx_table.remove(id)? {
                    Some(data) => rmp_serde::from_slice(data.value())?,
                    None => Vec::new(),
                };
                x
            };

            let mut works_table = write_txn.open_table(SERIES_WORKS)?;
            for work_id in work_ids {
                if let Some(data) = works_table.remove(work_id)? {
                    let work: SeriesWork = rmp_serde::from_slice(data.value())?;
                    removed_works.push(work);
                }
            }
            removed_works.sort_by_key(|w| (w.order, w.id));
        }

        write_txn.commit()?;
        Ok(removed.map(|series| (series, removed_works)))
    }

    // ========================================================================
    // Selected-work operations
    // ========================================================================

    /// Insert a work at the end of the (global) work ordering and register it
    /// with its series index.
    pub fn insert_work(&self, new: NewWork) -> Result<SeriesWork, DatabaseError> {
        let now = Utc::now();
        let write_txn = self.begin_write()?;
        let work = {
            let mut works_table = write_txn.open_table(SERIES_WORKS)?;

            let order = match new.order {
                Some(order) => order,
                None => {
                    let mut max_order = 0u32;
                    for result in works_table.iter()? {
                        let (_, value) = result?;
                        let existing: SeriesWork = rmp_serde::from_slice(value.value())?;
                        max_order = max_order.max(existing.order);
                    }
                    max_order + 1
                }
            };

            let id = Self::next_id(&write_txn, "series_works")?;
            let work = SeriesWork {
                id,
                title: new.title,
                description: new.description,
                image_url: new.image_url,
                order,
                available: true,
                selected_series_id: new.selected_series_id,
                created_at: now,
                updated_at: now,
            };
            let data = rmp_serde::to_vec_named(&work)?;
            works_table.insert(id, data.as_slice())?;

            if let Some(series_id) = work.selected_series_id {
                Self::index_add_work(&write_txn, series_id, id)?;
            }
            work
        };
        write_txn.commit()?;
        Ok(work)
    }

    /// All works across every series, ascending by order.
    pub fn list_works(&self) -> Result<Vec<SeriesWork>, DatabaseError> {
        self.list_ordered(SERIES_WORKS)
    }

    /// Works of one series, ascending by order. Unknown series ids yield an
    /// empty list.
    pub fn list_works_by_series(&self, series_id: u64) -> Result<Vec<SeriesWork>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let idx_table = read_txn.open_table(SERIES_WORKS_IDX)?;

        let work_ids: Vec<u64> = match idx_table.get(series_id)? {
            Some(data) => rmp_serde::from_slice(data.value())?,
            None => return Ok(Vec::new()),
        };

        let works_table = read_txn.open_table(SERIES_WORKS)?;
        let mut works = Vec::new();
        for work_id in work_ids {
            if let Some(data) = works_table.get(work_id)? {
                let work: SeriesWork = rmp_serde::from_slice(data.value())?;
                works.push(work);
            }
        }

        works.sort_by_key(|w| (w.order, w.id));
        Ok(works)
    }

    pub fn get_work(&self, id: u64) -> Result<Option<SeriesWork>, DatabaseError> {
        self.get_record(SERIES_WORKS, id)
    }

    /// Update a work, maintaining the series index when it is reparented.
    pub fn update_work(
        &self,
        id: u64,
        changes: WorkChanges,
    ) -> Result<Option<SeriesWork>, DatabaseError> {
        let write_txn = self.begin_write()?;
        let updated = {
            let mut works_table = write_txn.open_table(SERIES_WORKS)?;
            let existing: Option<SeriesWork> = match works_table.get(id)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };

            match existing {
                Some(mut work) => {
                    if let Some(title) = changes.title {
                        work.title = title;
                    }
                    if let Some(description) = changes.description {
                        work.description = description;
                    }
                    if let Some(image_url) = changes.image_url {
                        work.image_url = image_url;
                    }
                    if let Some(available) = changes.available {
                        work.available = available;
                    }

                    let new_series = match changes.selected_series_id {
                        Patch::Absent => None,
                        Patch::Null => Some(None),
                        Patch::Value(series_id) => Some(Some(series_id)),
                    };
                    if let Some(new_series) = new_series {
                        let old_series = work.selected_series_id;
                        if old_series != new_series {
                            if let Some(old_id) = old_series {
                                Self::index_remove_work(&write_txn, old_id, id)?;
                            }
                            if let Some(new_id) = new_series {
                                Self::index_add_work(&write_txn, new_id, id)?;
                            }
                            work.selected_series_id = new_series;
                        }
                    }

                    work.updated_at = Utc::now();
                    let data = rmp_serde::to_vec_named(&work)?;
                    works_table.insert(id, data.as_slice())?;
                    Some(work)
                }
                None => None,
            }
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Remove a work and its index entry, returning it for blob cleanup.
    pub fn delete_work(&self, id: u64) -> Result<Option<SeriesWork>, DatabaseError> {
        let write_txn = self.begin_write()?;
        let removed = {
            let mut works_table = write_txn.open_table(SERIES_WORKS)?;
            let removed: Option<SeriesWork> = match works_table.remove(id)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };
            drop(works_table);

            if let Some(ref work) = removed {
                if let Some(series_id) = work.selected_series_id {
                    Self::index_remove_work(&write_txn, series_id, id)?;
                }
            }
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// Re-stamp the work ordering from the submitted id sequence.
    pub fn reorder_works(&self, ids: &[u64]) -> Result<(), DatabaseError> {
        self.reorder::<SeriesWork>(SERIES_WORKS, ids)
    }

    // ========================================================================
    // Series index maintenance
    // ========================================================================

    fn index_add_work(
        write_txn: &WriteTransaction,
        series_id: u64,
        work_id: u64,
    ) -> Result<(), DatabaseError> {
        let mut idx_table = write_txn.open_table(SERIES_WORKS_IDX)?;
        let mut work_ids: Vec<u64> = idx_table
            .get(series_id)?
            .map(|v| rmp_serde::from_slice(v.value()).unwrap_or_default())
            .unwrap_or_default();

        if !work_ids.contains(&work_id) {
            work_ids.push(work_id);
            let data = rmp_serde::to_vec_named(&work_ids)?;
            idx_table.insert(series_id, data.as_slice())?;
        }
        Ok(())
    }

    fn index_remove_work(
        write_txn: &WriteTransaction,
        series_id: u64,
        work_id: u64,
    ) -> Result<(), DatabaseError> {
        let mut idx_table = write_txn.open_table(SERIES_WORKS_IDX)?;
        let existing: Option<Vec<u64>> = match idx_table.get(series_id)? {
            Some(data) => Some(rmp_serde::from_slice(data.value())?),
            None => None,
        };

        if let Some(mut work_ids) = existing {
            work_ids.retain(|wid| *wid != work_id);
            if work_ids.is_empty() {
                idx_table.remove(series_id)?;
            } else {
                let data = rmp_serde::to_vec_named(&work_ids)?;
                idx_table.insert(series_id, data.as_slice())?;
            }
        }
        Ok(())
    }
}
