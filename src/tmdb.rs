use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::TmdbConfig;
use crate::models::{MovieDetail, MovieSummary, SearchPage};

#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn search_movies(&self, query: &str, page: u32) -> Result<SearchPage>;
    async fn fetch_details(&self, id: i64) -> Result<MovieDetail>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    config: TmdbConfig,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Result<Self> {
        let user_agent = format!("moviefinder/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &TmdbConfig {
        &self.config
    }

    fn search_url(&self, query: &str, page: u32) -> String {
        format!(
            "{}/search/movie?api_key={}&language={}&query={}&page={page}",
            self.config.api_base,
            self.config.api_key,
            self.config.language,
            urlencoding::encode(query)
        )
    }

    fn details_url(&self, id: i64) -> String {
        format!(
            "{}/movie/{id}?api_key={}&language={}&append_to_response=credits",
            self.config.api_base, self.config.api_key, self.config.language
        )
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .context("request failed")?;
        let status = res.status();
        let text = res.text().await.context("reading body failed")?;
        if !status.is_success() {
            return Err(anyhow!("TMDB returned HTTP {}: {}", status.as_u16(), text));
        }
        let parsed: T = serde_json::from_str(&text).context("JSON parse failed")?;
        Ok(parsed)
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn search_movies(&self, query: &str, page: u32) -> Result<SearchPage> {
        #[derive(Deserialize)]
        struct SearchResponse {
            #[serde(default)]
            results: Option<Vec<MovieSummary>>,
            #[serde(default)]
            total_pages: Option<u32>,
        }

        debug!(query = %query, page, "Searching TMDB");
        let url = self.search_url(query, page);
        let data: SearchResponse = self.get_json(&url).await?;
        Ok(SearchPage {
            results: data.results.unwrap_or_default(),
            total_pages: data.total_pages.filter(|p| *p > 0).unwrap_or(1),
        })
    }

    async fn fetch_details(&self, id: i64) -> Result<MovieDetail> {
        debug!(tmdb_id = id, "Fetching TMDB movie details");
        let url = self.details_url(id);
        self.get_json(&url).await
    }
}
