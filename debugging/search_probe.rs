//! Run one TMDB search (and optionally a details fetch) and print what the
//! app would show.
//! Usage:
//!   cargo run --bin search_probe -- "<title>" [page]
//!   cargo run --bin search_probe -- --details <tmdb_id>
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use dotenvy::dotenv;
use moviefinder::config::Config;
use moviefinder::tmdb::{TmdbApi, TmdbClient};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present for local runs.
    dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = Config::from_env()?;
    let client = TmdbClient::new(config.tmdb)?;

    match args.first().map(String::as_str) {
        Some("--details") => {
            let id: i64 = args
                .get(1)
                .context("missing tmdb id after --details")?
                .parse()
                .context("tmdb id must be a number")?;
            let detail = client.fetch_details(id).await?;
            let movie = &detail.summary;
            println!("{} ({})", movie.title, movie.year());
            println!("poster: {}", client.config().poster_url(movie.poster_path.as_deref()));
            println!(
                "runtime: {}",
                detail
                    .runtime
                    .map(|r| format!("{r} min"))
                    .unwrap_or_else(|| "N/A".to_string())
            );
            match detail.directors() {
                Some(names) => println!("directors: {}", names.join(", ")),
                None => println!("directors: N/A"),
            }
            for member in detail.top_cast(6).unwrap_or_default() {
                println!(
                    "cast: {} as {}",
                    member.name,
                    member.character.as_deref().unwrap_or("")
                );
            }
            println!("rating: {} / 10 ({} votes)", movie.vote_average, movie.vote_count);
        }
        Some(query) => {
            let page: u32 = match args.get(1) {
                Some(p) => p.parse().context("page must be a number")?,
                None => 1,
            };
            let found = client.search_movies(query, page).await?;
            println!("page {} of {}", page, found.total_pages);
            for movie in &found.results {
                println!("{:>8}  {}  {}", movie.id, movie.year(), movie.title);
            }
        }
        None => anyhow::bail!("usage: search_probe <title> [page] | --details <tmdb_id>"),
    }

    Ok(())
}
