use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;

// Service configuration sourced from environment variables, with an optional
// YAML override file pointed to by CROPLINK_CONFIG.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageBackend,
    pub mongo: Option<MongoConfig>,
    pub auth: AuthBackend,
    pub firebase_project: Option<String>,
    pub static_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Mongodb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthBackend {
    Firebase,
    Static,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
}

#[derive(Debug, Deserialize)]
struct ServiceConfigOverride {
    bind_addr: Option<String>,
    storage: Option<String>,
    mongodb_url: Option<String>,
    database: Option<String>,
    auth: Option<String>,
    firebase_project: Option<String>,
    static_token: Option<String>,
}

fn parse_storage(value: &str) -> Result<StorageBackend> {
    match value {
        "memory" => Ok(StorageBackend::Memory),
        "mongodb" => Ok(StorageBackend::Mongodb),
        other => bail!("unknown storage backend: {other}"),
    }
}

fn parse_auth(value: &str) -> Result<AuthBackend> {
    match value {
        "firebase" => Ok(AuthBackend::Firebase),
        "static" => Ok(AuthBackend::Static),
        other => bail!("unknown auth backend: {other}"),
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("CROPLINK_BIND")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .with_context(|| "parse CROPLINK_BIND")?;
        let storage = parse_storage(
            &std::env::var("CROPLINK_STORAGE").unwrap_or_else(|_| "mongodb".to_string()),
        )?;
        let mongo = std::env::var("CROPLINK_MONGODB_URL")
            .ok()
            .map(|url| MongoConfig {
                url,
                database: std::env::var("CROPLINK_DB").unwrap_or_else(|_| "crops_db".to_string()),
            });
        let auth = parse_auth(
            &std::env::var("CROPLINK_AUTH").unwrap_or_else(|_| "firebase".to_string()),
        )?;
        let firebase_project = std::env::var("CROPLINK_FIREBASE_PROJECT").ok();
        let static_token = std::env::var("CROPLINK_STATIC_TOKEN").ok();
        Ok(Self {
            bind_addr,
            storage,
            mongo,
            auth,
            firebase_project,
            static_token,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("CROPLINK_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read CROPLINK_CONFIG: {path}"))?;
            let override_cfg: ServiceConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse service config yaml")?;
            if let Some(value) = override_cfg.bind_addr {
                config.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
            }
            if let Some(value) = override_cfg.storage {
                config.storage = parse_storage(&value)?;
            }
            if let Some(url) = override_cfg.mongodb_url {
                let database = override_cfg
                    .database
                    .or_else(|| config.mongo.as_ref().map(|m| m.database.clone()))
                    .unwrap_or_else(|| "crops_db".to_string());
                config.mongo = Some(MongoConfig { url, database });
            } else if let (Some(database), Some(mongo)) =
                (override_cfg.database, config.mongo.as_mut())
            {
                mongo.database = database;
            }
            if let Some(value) = override_cfg.auth {
                config.auth = parse_auth(&value)?;
            }
            if let Some(value) = override_cfg.firebase_project {
                config.firebase_project = Some(value);
            }
            if let Some(value) = override_cfg.static_token {
                config.static_token = Some(value);
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_backend_names() {
        assert_eq!(parse_storage("memory").expect("memory"), StorageBackend::Memory);
        assert_eq!(
            parse_storage("mongodb").expect("mongodb"),
            StorageBackend::Mongodb
        );
        assert!(parse_storage("redis").is_err());
        assert_eq!(parse_auth("static").expect("static"), AuthBackend::Static);
        assert!(parse_auth("oauth").is_err());
    }
}
