mod accounts;
mod collections;
pub mod db;
mod gallery;
mod landing;
pub mod models;
mod profile;
mod series;
mod tables;

pub use collections::Ordered;
pub use db::{Database, DatabaseError};
pub use gallery::GalleryItemChanges;
pub use series::{NewWork, WorkChanges};
pub use tables::*;
