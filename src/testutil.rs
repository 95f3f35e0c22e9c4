//! Shared test helpers.

use std::sync::Arc;

use crate::config::{AuthConfig, Config, ServerConfig, StorageConfig};
use crate::object_store::LocalStore;
use crate::storage::Database;
use crate::AppState;

/// Create a test AppState with a temporary database and local object store.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let data_dir = temp_dir.path().join("data");
    let media_dir = temp_dir.path().join("media");
    let public_dir = temp_dir.path().join("public");

    let config = Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            data_dir: data_dir.to_string_lossy().to_string(),
            public_dir: public_dir.to_string_lossy().to_string(),
            public_base_url: "http://localhost:8000".to_string(),
            cors_origins: Vec::new(),
        },
        auth: AuthConfig {
            jwt_secret: "test-secret".to_string(),
        },
        email: None,
        storage: StorageConfig::default(),
        test_mode: true,
        max_upload_size: 10 * 1024 * 1024, // 10MB for tests
    };

    let db = Database::open(&data_dir).expect("Failed to open test database");
    let object_store = LocalStore::new(&media_dir, &config.server.public_base_url)
        .expect("Failed to create test object store");

    Arc::new(AppState {
        config,
        db,
        object_store: Arc::new(object_store),
        http: reqwest::Client::new(),
        mailer: None,
    })
}
