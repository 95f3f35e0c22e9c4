use chrono::Utc;

use super::db::{Database, DatabaseError};
use super::models::LandingSlide;
use super::tables::LANDING_SLIDES;

impl Database {
    // ========================================================================
    // Landing-page slideshow operations
    // ========================================================================

    pub fn insert_landing_slide(&self, image_url: String) -> Result<LandingSlide, DatabaseError> {
        let now = Utc::now();
        self.insert_ordered(LANDING_SLIDES, "landing_slides", None, |id, order| {
            LandingSlide {
                id,
                image_url,
                order,
                created_at: now,
                updated_at: now,
            }
        })
    }

    pub fn list_landing_slides(&self) -> Result<Vec<LandingSlide>, DatabaseError> {
        self.list_ordered(LANDING_SLIDES)
    }

    pub fn get_landing_slide(&self, id: u64) -> Result<Option<LandingSlide>, DatabaseError> {
        self.get_record(LANDING_SLIDES, id)
    }

    /// The only mutable field of a slide is its position.
    pub fn update_landing_slide_order(
        &self,
        id: u64,
        order: u32,
    ) -> Result<Option<LandingSlide>, DatabaseError> {
        self.modify_record(LANDING_SLIDES, id, |slide: &mut LandingSlide| {
            slide.order = order;
            slide.updated_at = Utc::now();
        })
    }

    pub fn delete_landing_slide(&self, id: u64) -> Result<Option<LandingSlide>, DatabaseError> {
        self.delete_record(LANDING_SLIDES, id)
    }
}
