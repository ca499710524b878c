//! Runtime Configuration
//!
//! Settings come from command-line flags first, then environment variables
//! (a `.env` file is loaded if present).
//!
//! ## Flags
//! - `--bind <addr:port>`: listen address. Overrides `PORT`.
//! - `--store <memory|mongo>`: storage backend. Defaults to `memory`.
//!
//! ## Environment
//! - `PORT` (default 5000), `LOG_LEVEL` (default `info`)
//! - `MONGODB_URI`, `MONGODB_DATABASE`, `MONGODB_COLLECTION`
//! - `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY`, `CLOUDINARY_API_SECRET`, `CLOUDINARY_FOLDER`

use anyhow::{Result, bail};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATABASE: &str = "finance_tracker";
const DEFAULT_COLLECTION: &str = "users";
const DEFAULT_MEDIA_FOLDER: &str = "finance-tracker";
const DEFAULT_MEDIA_API: &str = "https://api.cloudinary.com/v1_1";

pub const USAGE: &str = "Usage: finance-sync [--bind <addr:port>] [--store <memory|mongo>]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Mongo,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            other => bail!("unknown store backend '{}'", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoSettings {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSettings {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub mongo: Option<MongoSettings>,
    pub media: Option<MediaSettings>,
    pub log_level: tracing::Level,
}

impl Settings {
    /// Reads process arguments and environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_sources(std::env::args().skip(1), |name| std::env::var(name).ok())
    }

    /// Builds settings from explicit sources so tests don't touch the process environment.
    pub fn from_sources<I, E>(args: I, env: E) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let mut bind_addr: Option<SocketAddr> = None;
        let mut store = StoreBackend::Memory;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--bind" => {
                    let Some(value) = args.next() else {
                        bail!("--bind requires a value");
                    };
                    bind_addr = Some(value.parse()?);
                }
                "--store" => {
                    let Some(value) = args.next() else {
                        bail!("--store requires a value");
                    };
                    store = value.parse()?;
                }
                other => {
                    tracing::warn!("Ignoring unknown argument {}", other);
                }
            }
        }

        let bind_addr = match bind_addr {
            Some(addr) => addr,
            None => {
                let port = match non_empty(&env, "PORT") {
                    Some(port) => port.parse()?,
                    None => DEFAULT_PORT,
                };
                SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port)
            }
        };

        let mongo = non_empty(&env, "MONGODB_URI").map(|uri| MongoSettings {
            uri,
            database: non_empty(&env, "MONGODB_DATABASE")
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            collection: non_empty(&env, "MONGODB_COLLECTION")
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
        });
        if store == StoreBackend::Mongo && mongo.is_none() {
            bail!("--store mongo requires MONGODB_URI");
        }

        let media = match (
            non_empty(&env, "CLOUDINARY_CLOUD_NAME"),
            non_empty(&env, "CLOUDINARY_API_KEY"),
            non_empty(&env, "CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(MediaSettings {
                cloud_name,
                api_key,
                api_secret,
                folder: non_empty(&env, "CLOUDINARY_FOLDER")
                    .unwrap_or_else(|| DEFAULT_MEDIA_FOLDER.to_string()),
                api_base: DEFAULT_MEDIA_API.to_string(),
            }),
            _ => None,
        };

        let log_level = match non_empty(&env, "LOG_LEVEL") {
            Some(level) => level.parse()?,
            None => tracing::Level::INFO,
        };

        Ok(Self {
            bind_addr,
            store,
            mongo,
            media,
            log_level,
        })
    }
}

fn non_empty<E: Fn(&str) -> Option<String>>(env: &E, name: &str) -> Option<String> {
    env(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
