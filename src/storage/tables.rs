use redb::TableDefinition;

/// Gallery images: id -> GalleryItem (msgpack)
pub const GALLERY: TableDefinition<u64, &[u8]> = TableDefinition::new("gallery");

/// Landing-page slideshow: id -> LandingSlide (msgpack)
pub const LANDING_SLIDES: TableDefinition<u64, &[u8]> = TableDefinition::new("landing_slides");

/// Selected series: id -> Series (msgpack)
pub const SERIES: TableDefinition<u64, &[u8]> = TableDefinition::new("series");

/// Selected works: id -> SeriesWork (msgpack)
pub const SERIES_WORKS: TableDefinition<u64, &[u8]> = TableDefinition::new("series_works");

/// Series index: series id -> msgpack Vec of work ids
pub const SERIES_WORKS_IDX: TableDefinition<u64, &[u8]> = TableDefinition::new("series_works_idx");

/// Profile pictures: id -> ProfilePicture (msgpack)
pub const PROFILE_PICTURES: TableDefinition<u64, &[u8]> = TableDefinition::new("profile_pictures");

/// CV documents: id -> CvDocument (msgpack)
pub const CV_DOCUMENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("cv_documents");

/// Accounts: id -> User (msgpack)
pub const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

/// Username index: username -> user id (enforces uniqueness)
pub const USERNAMES: TableDefinition<&str, u64> = TableDefinition::new("usernames");

/// Single-row records (bio, settings) under fixed keys
pub const SINGLETONS: TableDefinition<&str, &[u8]> = TableDefinition::new("singletons");

/// Id sequences: collection name -> last issued id
pub const COUNTERS: TableDefinition<&str, u64> = TableDefinition::new("counters");

/// Fixed keys into `SINGLETONS`.
pub const SINGLETON_BIO: &str = "bio";
pub const SINGLETON_SETTINGS: &str = "settings";
