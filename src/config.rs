use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub auth: AuthConfig,
    pub email: Option<EmailConfig>,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Enables dangerous operations like purge. Must never be true in production.
    pub test_mode: bool,
    /// Maximum upload size in bytes
    pub max_upload_size: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub data_dir: String,
    /// Directory holding the compiled front end, served with an index.html fallback.
    pub public_dir: String,
    /// Base URL this service is reachable under; used to build local media URLs.
    pub public_base_url: String,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret for access tokens.
    pub jwt_secret: String,
}

/// Contact-form settings. The whole section is optional; without it the
/// send-email route answers 503.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_username: String,
    pub smtp_password: String,
    /// Where contact-form messages are delivered.
    pub recipient: String,
    /// reCAPTCHA server-side secret.
    pub captcha_secret: String,
}

#[derive(Debug, Clone)]
pub enum StorageBackend {
    Bunny,
    Local,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory for the local storage backend
    pub local_storage_path: String,
    /// Bunny storage zone name (required when backend is bunny)
    pub bunny_storage_zone: Option<String>,
    /// Bunny storage access key (required when backend is bunny)
    pub bunny_access_key: Option<String>,
    /// Bunny storage endpoint host
    pub bunny_endpoint: String,
    /// Pull-zone domain that serves uploaded objects publicly
    pub bunny_cdn_domain: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            local_storage_path: "./media".to_string(),
            bunny_storage_zone: None,
            bunny_access_key: None,
            bunny_endpoint: "la.storage.bunnycdn.com".to_string(),
            bunny_cdn_domain: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let public_dir = std::env::var("PUBLIC_DIR").unwrap_or_else(|_| "./public".to_string());

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .map(|o| {
                o.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_default();

        let test_mode = std::env::var("TEST_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(50 * 1024 * 1024); // 50MB

        let storage_backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "bunny" => StorageBackend::Bunny,
            _ => StorageBackend::Local,
        };

        let local_storage_path =
            std::env::var("LOCAL_STORAGE_PATH").unwrap_or_else(|_| "./media".to_string());

        let bunny_storage_zone = std::env::var("BUNNY_STORAGE_ZONE").ok();
        let bunny_access_key = std::env::var("BUNNY_ACCESS_KEY").ok();
        let bunny_endpoint = std::env::var("BUNNY_STORAGE_ENDPOINT")
            .unwrap_or_else(|_| "la.storage.bunnycdn.com".to_string());
        let bunny_cdn_domain = std::env::var("BUNNY_CDN_DOMAIN").ok();

        let email = match (
            std::env::var("SMTP_HOST").ok(),
            std::env::var("SMTP_USERNAME").ok(),
            std::env::var("SMTP_PASSWORD").ok(),
            std::env::var("CONTACT_EMAIL").ok(),
            std::env::var("CAPTCHA_SECRET_KEY").ok(),
        ) {
            (
                Some(smtp_host),
                Some(smtp_username),
                Some(smtp_password),
                Some(recipient),
                Some(captcha_secret),
            ) => Some(EmailConfig {
                smtp_host,
                smtp_username,
                smtp_password,
                recipient,
                captcha_secret,
            }),
            _ => None,
        };

        let config = Config {
            server: ServerConfig {
                bind_address,
                data_dir,
                public_dir,
                public_base_url,
                cors_origins,
            },
            auth: AuthConfig { jwt_secret },
            email,
            storage: StorageConfig {
                backend: storage_backend,
                local_storage_path,
                bunny_storage_zone,
                bunny_access_key,
                bunny_endpoint,
                bunny_cdn_domain,
            },
            test_mode,
            max_upload_size,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::ValidationError(
                "JWT_SECRET must be set".to_string(),
            ));
        }

        if matches!(self.storage.backend, StorageBackend::Bunny) {
            if self.storage.bunny_storage_zone.is_none() {
                return Err(ConfigError::ValidationError(
                    "BUNNY_STORAGE_ZONE is required when STORAGE_BACKEND=bunny".to_string(),
                ));
            }
            if self.storage.bunny_access_key.is_none() {
                return Err(ConfigError::ValidationError(
                    "BUNNY_ACCESS_KEY is required when STORAGE_BACKEND=bunny".to_string(),
                ));
            }
            if self.storage.bunny_cdn_domain.is_none() {
                return Err(ConfigError::ValidationError(
                    "BUNNY_CDN_DOMAIN is required when STORAGE_BACKEND=bunny".to_string(),
                ));
            }
        }

        Ok(())
    }
}
