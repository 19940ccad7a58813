use std::{env, path::PathBuf};

#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Files are written under `dir` and served by this process at `/media`.
    Local { dir: PathBuf, public_base_url: String },
    /// Hosted bucket reached over HTTP.
    Remote {
        url: String,
        service_key: String,
        bucket: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let jwt_ttl_hours = env::var("JWT_TTL_HOURS")
            .ok()
            .and_then(|h| h.parse::<i64>().ok())
            .unwrap_or(24);

        let storage = match env::var("STORAGE_BACKEND").as_deref() {
            Ok("remote") => StorageConfig::Remote {
                url: env::var("STORAGE_URL")
                    .map_err(|_| anyhow::anyhow!("STORAGE_URL is required for remote storage"))?,
                service_key: env::var("STORAGE_SERVICE_KEY").map_err(|_| {
                    anyhow::anyhow!("STORAGE_SERVICE_KEY is required for remote storage")
                })?,
                bucket: env::var("STORAGE_BUCKET")
                    .unwrap_or_else(|_| "products-bucket".to_string()),
            },
            Ok("local") | Err(_) => StorageConfig::Local {
                dir: env::var("STORAGE_LOCAL_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./media")),
                public_base_url: env::var("PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| format!("http://{host}:{port}")),
            },
            Ok(other) => anyhow::bail!("unknown STORAGE_BACKEND {other:?}"),
        };

        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            jwt_ttl_hours,
            storage,
        })
    }
}
