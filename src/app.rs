use crate::config::{Config, TmdbConfig};
use crate::controller::{Controller, Event};
use crate::favorites::FavoritesStore;
use crate::storage::FavoritesPersistence;
use crate::tmdb::{TmdbApi, TmdbClient};
use crate::view;
use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const MAX_BODY_BYTES: usize = 16 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub controller: Controller,
    pub favorites: Arc<Mutex<FavoritesStore>>,
    pub tmdb: Arc<TmdbConfig>,
}

impl AppState {
    pub fn new(api: Arc<dyn TmdbApi>, favorites: FavoritesStore, tmdb: TmdbConfig) -> Self {
        Self {
            controller: Controller::new(api),
            favorites: Arc::new(Mutex::new(favorites)),
            tmdb: Arc::new(tmdb),
        }
    }
}

#[derive(Deserialize)]
struct SearchForm {
    #[serde(default)]
    query: String,
}

pub async fn run_server(config: Config) -> Result<()> {
    let api: Arc<dyn TmdbApi> = Arc::new(TmdbClient::new(config.tmdb.clone())?);
    info!("Favorites stored in {}", config.data_dir.display());
    let (favorites, writer) =
        FavoritesStore::hydrate(FavoritesPersistence::file_backed(&config.data_dir));
    let state = AppState::new(api, favorites, config.tmdb);

    let app = build_router(state);

    info!("Listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    writer.finish().await;
    info!("Favorites flushed, bye");
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/query", post(update_query))
        .route("/search", post(search))
        .route("/clear", post(clear))
        .route("/page/next", post(next_page))
        .route("/page/prev", post(prev_page))
        .route("/favorites", post(show_favorites))
        .route("/favorites/:id/toggle", post(toggle_favorite))
        .route("/movies/:id", post(view_details))
        .route("/details/close", post(close_details))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let view_state = state.controller.snapshot().await;
    let favorites = state.favorites.lock().await;
    Html(view::render(&view_state, &favorites, &state.tmdb))
}

async fn search(State(state): State<AppState>, Form(form): Form<SearchForm>) -> Redirect {
    state
        .controller
        .dispatch(Event::SubmitSearch(form.query))
        .await;
    Redirect::to("/")
}

async fn update_query(State(state): State<AppState>, Form(form): Form<SearchForm>) -> Redirect {
    state
        .controller
        .dispatch(Event::QueryChanged(form.query))
        .await;
    Redirect::to("/")
}

async fn clear(State(state): State<AppState>) -> Redirect {
    state.controller.dispatch(Event::Clear).await;
    Redirect::to("/")
}

async fn next_page(State(state): State<AppState>) -> Redirect {
    state.controller.dispatch(Event::NextPage).await;
    Redirect::to("/")
}

async fn prev_page(State(state): State<AppState>) -> Redirect {
    state.controller.dispatch(Event::PrevPage).await;
    Redirect::to("/")
}

async fn show_favorites(State(state): State<AppState>) -> Redirect {
    let records = state.favorites.lock().await.records();
    state
        .controller
        .dispatch(Event::ShowFavorites(records))
        .await;
    Redirect::to("/")
}

async fn toggle_favorite(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let Some(movie) = state.controller.visible_movie(id).await else {
        warn!("Favorite toggle for movie {} that is not on screen", id);
        return StatusCode::NOT_FOUND.into_response();
    };
    state.favorites.lock().await.toggle(&movie);
    Redirect::to("/").into_response()
}

async fn view_details(State(state): State<AppState>, Path(id): Path<i64>) -> Redirect {
    state.controller.dispatch(Event::ViewDetails(id)).await;
    Redirect::to("/")
}

async fn close_details(State(state): State<AppState>) -> Redirect {
    state.controller.dispatch(Event::CloseDetails).await;
    Redirect::to("/")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
