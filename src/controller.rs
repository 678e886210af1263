use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::models::{FavoriteRecord, MovieDetail, MovieSummary, SearchPage};
use crate::tmdb::TmdbApi;

pub const MSG_EMPTY_QUERY: &str = "Type a title to search.";
pub const MSG_NO_RESULTS: &str = "No results found.";
pub const MSG_SEARCH_FAILED: &str = "Search failed. Check your connection and API key.";
pub const MSG_DETAILS_FAILED: &str = "Could not load movie details.";

pub type Token = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Validation,
    Empty,
    Failure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn new(kind: NoticeKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum Event {
    QueryChanged(String),
    SubmitSearch(String),
    NextPage,
    PrevPage,
    Clear,
    ShowFavorites(Vec<FavoriteRecord>),
    ViewDetails(i64),
    CloseDetails,
    SearchFinished {
        token: Token,
        page: u32,
        outcome: Result<SearchPage>,
    },
    DetailsFinished {
        token: Token,
        outcome: Result<MovieDetail>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Search { token: Token, query: String, page: u32 },
    FetchDetails { token: Token, id: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub query: String,
    pub page: u32,
    pub total_pages: u32,
    pub results: Vec<MovieSummary>,
    pub notice: Option<Notice>,
    pub selected: Option<MovieDetail>,
    last_token: Token,
    pending: Option<Token>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 1,
            total_pages: 1,
            results: Vec::new(),
            notice: None,
            selected: None,
            last_token: 0,
            pending: None,
        }
    }
}

impl ViewState {
    pub fn loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn visible_movie(&self, id: i64) -> Option<&MovieSummary> {
        self.selected
            .as_ref()
            .map(|d| &d.summary)
            .filter(|m| m.id == id)
            .or_else(|| self.results.iter().find(|m| m.id == id))
    }

    pub fn apply(&mut self, event: Event) -> Option<Effect> {
        match event {
            Event::QueryChanged(query) => {
                self.query = query;
                self.notice = None;
                None
            }
            Event::SubmitSearch(query) => {
                self.query = query;
                if self.query.trim().is_empty() {
                    self.notice = Some(Notice::new(NoticeKind::Validation, MSG_EMPTY_QUERY));
                    return None;
                }
                self.search(1)
            }
            Event::NextPage => {
                if !self.has_next() {
                    return None;
                }
                self.search(self.page + 1)
            }
            Event::PrevPage => {
                if !self.has_prev() {
                    return None;
                }
                self.search(self.page - 1)
            }
            Event::Clear => {
                self.query.clear();
                self.results.clear();
                self.notice = None;
                self.page = 1;
                self.total_pages = 1;
                self.pending = None;
                None
            }
            Event::ShowFavorites(records) => {
                if records.is_empty() {
                    return None;
                }
                self.results = records.iter().map(MovieSummary::from).collect();
                self.page = 1;
                self.total_pages = 1;
                self.pending = None;
                None
            }
            Event::ViewDetails(id) => {
                let token = self.issue_token();
                self.notice = None;
                self.selected = None;
                Some(Effect::FetchDetails { token, id })
            }
            Event::CloseDetails => {
                self.selected = None;
                None
            }
            Event::SearchFinished {
                token,
                page,
                outcome,
            } => {
                if !self.settle(token) {
                    return None;
                }
                match outcome {
                    Ok(found) => {
                        self.results = found.results;
                        self.total_pages = found.total_pages.max(1);
                        self.page = page;
                        if self.results.is_empty() {
                            self.notice = Some(Notice::new(NoticeKind::Empty, MSG_NO_RESULTS));
                        }
                    }
                    Err(_) => {
                        self.results.clear();
                        self.notice = Some(Notice::new(NoticeKind::Failure, MSG_SEARCH_FAILED));
                    }
                }
                None
            }
            Event::DetailsFinished { token, outcome } => {
                if !self.settle(token) {
                    return None;
                }
                match outcome {
                    Ok(detail) => self.selected = Some(detail),
                    Err(_) => {
                        self.notice = Some(Notice::new(NoticeKind::Failure, MSG_DETAILS_FAILED));
                    }
                }
                None
            }
        }
    }

    fn search(&mut self, page: u32) -> Option<Effect> {
        if self.query.trim().is_empty() {
            return None;
        }
        let token = self.issue_token();
        self.notice = None;
        Some(Effect::Search {
            token,
            query: self.query.clone(),
            page,
        })
    }

    fn issue_token(&mut self) -> Token {
        self.last_token += 1;
        self.pending = Some(self.last_token);
        self.last_token
    }

    // False when the response is stale.
    fn settle(&mut self, token: Token) -> bool {
        if self.pending != Some(token) {
            return false;
        }
        self.pending = None;
        true
    }
}

#[derive(Clone)]
pub struct Controller {
    api: Arc<dyn TmdbApi>,
    state: Arc<Mutex<ViewState>>,
}

impl Controller {
    pub fn new(api: Arc<dyn TmdbApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(ViewState::default())),
        }
    }

    pub async fn snapshot(&self) -> ViewState {
        self.state.lock().await.clone()
    }

    // The effect runs in its own task so the completion lands even if the
    // caller is dropped or the API call panics.
    pub async fn dispatch(&self, event: Event) {
        let Some(effect) = self.state.lock().await.apply(event) else {
            return;
        };
        let controller = self.clone();
        let task = tokio::spawn(async move {
            let runner = controller.clone();
            let attempt = effect.clone();
            let done = match tokio::spawn(async move { runner.run(attempt).await }).await {
                Ok(done) => done,
                Err(e) => {
                    error!("TMDB request task failed: {}", e);
                    aborted(effect)
                }
            };
            controller.state.lock().await.apply(done);
        });
        if let Err(e) = task.await {
            error!("Completion task failed: {}", e);
        }
    }

    pub async fn visible_movie(&self, id: i64) -> Option<MovieSummary> {
        self.state.lock().await.visible_movie(id).cloned()
    }

    async fn run(&self, effect: Effect) -> Event {
        match effect {
            Effect::Search { token, query, page } => {
                info!("Searching: {} (page {})", query, page);
                let outcome = self.api.search_movies(&query, page).await;
                match &outcome {
                    Ok(found) => info!("Search '{}' returned {} results", query, found.results.len()),
                    Err(e) => warn!("Search '{}' failed: {:#}", query, e),
                }
                Event::SearchFinished {
                    token,
                    page,
                    outcome,
                }
            }
            Effect::FetchDetails { token, id } => {
                info!("Loading details for {}", id);
                let outcome = self.api.fetch_details(id).await;
                if let Err(e) = &outcome {
                    warn!("Details for {} failed: {:#}", id, e);
                }
                Event::DetailsFinished { token, outcome }
            }
        }
    }
}

fn aborted(effect: Effect) -> Event {
    match effect {
        Effect::Search { token, page, .. } => Event::SearchFinished {
            token,
            page,
            outcome: Err(anyhow!("search request aborted")),
        },
        Effect::FetchDetails { token, .. } => Event::DetailsFinished {
            token,
            outcome: Err(anyhow!("details request aborted")),
        },
    }
}
