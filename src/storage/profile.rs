use chrono::Utc;
use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::{Bio, CvDocument, ProfilePicture, Settings};
use super::tables::{CV_DOCUMENTS, PROFILE_PICTURES, SINGLETONS, SINGLETON_BIO, SINGLETON_SETTINGS};

impl Database {
    // ========================================================================
    // Bio and settings (fixed-key single rows)
    // ========================================================================

    pub fn get_bio(&self) -> Result<Option<Bio>, DatabaseError> {
        self.get_singleton(SINGLETON_BIO)
    }

    pub fn upsert_bio(
        &self,
        bio_text: String,
        profile_picture_url: Option<String>,
    ) -> Result<Bio, DatabaseError> {
        let bio = Bio {
            bio_text,
            profile_picture_url,
        };
        self.put_singleton(SINGLETON_BIO, &bio)?;
        Ok(bio)
    }

    pub fn get_settings(&self) -> Result<Option<Settings>, DatabaseError> {
        self.get_singleton(SINGLETON_SETTINGS)
    }

    pub fn upsert_settings(
        &self,
        background_image_url: Option<String>,
    ) -> Result<Settings, DatabaseError> {
        let settings = Settings {
            background_image_url,
        };
        self.put_singleton(SINGLETON_SETTINGS, &settings)?;
        Ok(settings)
    }

    fn get_singleton<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SINGLETONS)?;

        match table.get(key)? {
            Some(data) => {
                let record: T = rmp_serde::from_slice(data.value())?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn put_singleton<T: serde::Serialize>(&self, key: &str, record: &T) -> Result<(), DatabaseError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(SINGLETONS)?;
            let data = rmp_serde::to_vec_named(record)?;
            table.insert(key, data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========================================================================
    // Profile pictures
    // ========================================================================

    pub fn insert_profile_picture(
        &self,
        image_url: String,
    ) -> Result<ProfilePicture, DatabaseError> {
        let write_txn = self.begin_write()?;
        let picture = {
            let mut table = write_txn.open_table(PROFILE_PICTURES)?;
            let id = Self::next_id(&write_txn, "profile_pictures")?;
            let picture = ProfilePicture {
                id,
                image_url,
                created_at: Utc::now(),
            };
            let data = rmp_serde::to_vec_named(&picture)?;
            table.insert(id, data.as_slice())?;
            picture
        };
        write_txn.commit()?;
        Ok(picture)
    }

    pub fn list_profile_pictures(&self) -> Result<Vec<ProfilePicture>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(PROFILE_PICTURES)?;

        let mut pictures = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let picture: ProfilePicture = rmp_serde::from_slice(value.value())?;
            pictures.push(picture);
        }

        pictures.sort_by_key(|p| p.id);
        Ok(pictures)
    }

    pub fn get_profile_picture(&self, id: u64) -> Result<Option<ProfilePicture>, DatabaseError> {
        self.get_record(PROFILE_PICTURES, id)
    }

    pub fn delete_profile_picture(&self, id: u64) -> Result<Option<ProfilePicture>, DatabaseError> {
        self.delete_record(PROFILE_PICTURES, id)
    }

    // ========================================================================
    // CV documents
    // ========================================================================

    pub fn insert_cv_document(
        &self,
        title: String,
        description: String,
        pdf_url: String,
    ) -> Result<CvDocument, DatabaseError> {
        let write_txn = self.begin_write()?;
        let document = {
            let mut table = write_txn.open_table(CV_DOCUMENTS)?;
            let id = Self::next_id(&write_txn, "cv_documents")?;
            let document = CvDocument {
                id,
                title,
                description,
                pdf_url,
                created_at: Utc::now(),
            };
            let data = rmp_serde::to_vec_named(&document)?;
            table.insert(id, data.as_slice())?;
            document
        };
        write_txn.commit()?;
        Ok(document)
    }

    /// Newest first.
    pub fn list_cv_documents(&self) -> Result<Vec<CvDocument>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(CV_DOCUMENTS)?;

        let mut documents = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let document: CvDocument = rmp_serde::from_slice(value.value())?;
            documents.push(document);
        }

        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(documents)
    }

    pub fn get_cv_document(&self, id: u64) -> Result<Option<CvDocument>, DatabaseError> {
        self.get_record(CV_DOCUMENTS, id)
    }

    pub fn delete_cv_document(&self, id: u64) -> Result<Option<CvDocument>, DatabaseError> {
        self.delete_record(CV_DOCUMENTS, id)
    }
}
