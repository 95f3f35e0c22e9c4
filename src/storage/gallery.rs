use chrono::Utc;

use super::db::{Database, DatabaseError};
use super::models::GalleryItem;
use super::tables::GALLERY;

/// Fields of a gallery update; absent fields keep their stored values.
#[derive(Debug, Default)]
pub struct GalleryItemChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub order: Option<u32>,
    pub available: Option<bool>,
}

impl Database {
    // ========================================================================
    // Gallery operations
    // ========================================================================

    /// Insert a gallery image at the end of the collection.
    pub fn insert_gallery_item(
        &self,
        image_url: String,
        title: String,
        description: String,
    ) -> Result<GalleryItem, DatabaseError> {
        let now = Utc::now();
        self.insert_ordered(GALLERY, "gallery", None, |id, order| GalleryItem {
            id,
            image_url,
            title,
            description,
            order,
            available: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// All gallery images, ascending by order.
    pub fn list_gallery(&self) -> Result<Vec<GalleryItem>, DatabaseError> {
        self.list_ordered(GALLERY)
    }

    pub fn get_gallery_item(&self, id: u64) -> Result<Option<GalleryItem>, DatabaseError> {
        self.get_record(GALLERY, id)
    }

    pub fn update_gallery_item(
        &self,
        id: u64,
        changes: GalleryItemChanges,
    ) -> Result<Option<GalleryItem>, DatabaseError> {
        self.modify_record(GALLERY, id, |item: &mut GalleryItem| {
            if let Some(title) = changes.title {
                item.title = title;
            }
            if let Some(description) = changes.description {
                item.description = description;
            }
            if let Some(order) = changes.order {
                item.order = order;
            }
            if let Some(available) = changes.available {
                item.available = available;
            }
            item.updated_at = Utc::now();
        })
    }

    /// Remove a gallery image, returning it for blob cleanup.
    pub fn delete_gallery_item(&self, id: u64) -> Result<Option<GalleryItem>, DatabaseError> {
        self.delete_record(GALLERY, id)
    }

    /// Re-stamp the whole gallery order from the submitted id sequence.
    pub fn reorder_gallery(&self, ids: &[u64]) -> Result<(), DatabaseError> {
        self.reorder::<GalleryItem>(GALLERY, ids)
    }
}
