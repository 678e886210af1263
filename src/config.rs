use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w300";
pub const DEFAULT_PLACEHOLDER: &str = "https://via.placeholder.com/300x450?text=No+Image";
pub const DEFAULT_LANGUAGE: &str = "pt-BR";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_ADDR: &str = "0.0.0.0:3146";

#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub api_base: String,
    pub image_base: String,
    pub placeholder: String,
    pub language: String,
}

impl TmdbConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            image_base: DEFAULT_IMAGE_BASE.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn poster_url(&self, poster_path: Option<&str>) -> String {
        match poster_path.filter(|p| !p.is_empty()) {
            Some(path) => format!("{}{}", self.image_base, path),
            None => self.placeholder.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub tmdb: TmdbConfig,
    pub data_dir: PathBuf,
    pub addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("TMDB_API_KEY").context("TMDB_API_KEY not set")?;
        let mut tmdb = TmdbConfig::new(api_key);
        if let Some(base) = non_empty_var("TMDB_API_BASE") {
            tmdb.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(base) = non_empty_var("TMDB_IMAGE_BASE") {
            tmdb.image_base = base;
        }
        if let Some(lang) = non_empty_var("TMDB_LANGUAGE") {
            tmdb.language = lang;
        }

        let data_dir = non_empty_var("MOVIEFINDER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let addr = non_empty_var("MOVIEFINDER_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("MOVIEFINDER_ADDR is not a valid socket address")?;

        Ok(Self {
            tmdb,
            data_dir,
            addr,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
