use chrono::Utc;
use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::User;
use super::tables::{USERNAMES, USERS};

impl Database {
    // ========================================================================
    // Account operations
    // ========================================================================

    /// Create an account. Returns None when the username is already taken;
    /// the uniqueness check and the insert share one write transaction.
    pub fn create_user(
        &self,
        username: String,
        password_hash: String,
        role: String,
    ) -> Result<Option<User>, DatabaseError> {
        let write_txn = self.begin_write()?;
        let user = {
            let mut usernames = write_txn.open_table(USERNAMES)?;
            let taken = usernames.get(username.as_str())?.is_some();
            if taken {
                None
            } else {
                let id = Self::next_id(&write_txn, "users")?;
                usernames.insert(username.as_str(), id)?;

                let mut users = write_txn.open_table(USERS)?;
                let user = User {
                    id,
                    username,
                    password_hash,
                    role,
                    created_at: Utc::now(),
                };
                let data = rmp_serde::to_vec_named(&user)?;
                users.insert(id, data.as_slice())?;
                Some(user)
            }
        };
        write_txn.commit()?;
        Ok(user)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let usernames = read_txn.open_table(USERNAMES)?;

        let id = match usernames.get(username)? {
            Some(data) => data.value(),
            None => return Ok(None),
        };

        let users = read_txn.open_table(USERS)?;
        match users.get(id)? {
            Some(data) => {
                let user: User = rmp_serde::from_slice(data.value())?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Number of accounts; gates open registration to the very first one.
    pub fn user_count(&self) -> Result<u64, DatabaseError> {
        let read_txn = self.begin_read()?;
        let users = read_txn.open_table(USERS)?;

        let mut count = 0;
        for entry in users.iter()? {
            entry?;
            count += 1;
        }
        Ok(count)
    }
}
