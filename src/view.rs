use std::fmt::Write;

use crate::config::TmdbConfig;
use crate::controller::{NoticeKind, ViewState};
use crate::favorites::FavoritesStore;
use crate::models::{MovieDetail, MovieSummary};

const CAST_LIMIT: usize = 6;

const STYLE: &str = "body{font-family:sans-serif;background:#141414;color:#eee;margin:0 auto;max-width:1100px;padding:16px}\
.searchRow{display:flex;gap:8px}.input{flex:1;padding:8px}.btn,.fav{padding:6px 10px;cursor:pointer}\
.fav.active{background:#e50914;color:#fff}.results{display:grid;grid-template-columns:repeat(auto-fill,minmax(180px,1fr));gap:12px;margin-top:16px}\
.card{background:#222;border-radius:8px;overflow:hidden}.poster{width:100%}.meta{padding:8px}.metaSmall{color:#aaa;font-size:13px}\
.notice{margin-top:10px;color:#ffb4a2}.notice.empty{color:#aaa}.pager{display:flex;gap:12px;justify-content:center;margin-top:16px}\
.detailsOverlay{position:fixed;inset:0;background:rgba(0,0,0,.8);display:flex;align-items:center;justify-content:center}\
.detailsCard{background:#1e1e1e;border-radius:10px;padding:16px;display:grid;grid-template-columns:240px 1fr;gap:16px;max-width:900px}\
.inline{display:inline}";

pub fn render(state: &ViewState, favorites: &FavoritesStore, tmdb: &TmdbConfig) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>MovieFinder</title><style>");
    html.push_str(STYLE);
    html.push_str("</style></head><body>");
    html.push_str("<div class=\"header\"><div class=\"title\">MovieFinder 🎬</div></div>");

    search_form(&mut html, state);
    toolbar(&mut html, favorites);

    if state.loading() {
        html.push_str("<div class=\"loading\">Loading...</div>");
    }
    if let Some(notice) = &state.notice {
        let class = match notice.kind {
            NoticeKind::Empty => "notice empty",
            NoticeKind::Validation | NoticeKind::Failure => "notice",
        };
        let _ = write!(html, "<div class=\"{class}\">{}</div>", escape(&notice.text));
    }

    html.push_str("<div class=\"results\">");
    for movie in &state.results {
        card(&mut html, movie, favorites.is_favorite(movie.id), tmdb);
    }
    html.push_str("</div>");

    if state.total_pages > 1 {
        pager(&mut html, state);
    }
    if let Some(detail) = &state.selected {
        overlay(&mut html, detail, favorites.is_favorite(detail.summary.id), tmdb);
    }

    html.push_str("</body></html>");
    html
}

fn search_form(html: &mut String, state: &ViewState) {
    let _ = write!(
        html,
        "<form class=\"searchRow\" method=\"post\" action=\"/search\">\
         <input class=\"input\" name=\"query\" placeholder=\"Search movies (e.g. The Godfather)\" value=\"{}\">\
         <button class=\"btn\" type=\"submit\">Search</button>\
         <button class=\"btn\" type=\"submit\" formaction=\"/clear\">Clear</button></form>",
        escape(&state.query)
    );
}

fn toolbar(html: &mut String, favorites: &FavoritesStore) {
    let _ = write!(
        html,
        "<div class=\"toolbar\"><span class=\"metaSmall\">Favorites: {}</span> \
         <form class=\"inline\" method=\"post\" action=\"/favorites\">\
         <button class=\"btn\" type=\"submit\">View favorites</button></form></div>",
        favorites.len()
    );
}

fn card(html: &mut String, movie: &MovieSummary, is_favorite: bool, tmdb: &TmdbConfig) {
    let rating = if movie.vote_average > 0.0 {
        format!("{:.1}", movie.vote_average)
    } else {
        "N/A".to_string()
    };
    let _ = write!(
        html,
        "<div class=\"card\"><img class=\"poster\" src=\"{poster}\" alt=\"{title}\">\
         <div class=\"meta\"><div class=\"movieTitle\">{title}</div>\
         <div class=\"metaSmall\">{year} • Rating: {rating}</div><div class=\"actions\">\
         <form class=\"inline\" method=\"post\" action=\"/movies/{id}\">\
         <button class=\"fav\" type=\"submit\">Details</button></form>",
        poster = escape(&tmdb.poster_url(movie.poster_path.as_deref())),
        title = escape(&movie.title),
        year = escape(movie.year()),
        id = movie.id,
    );
    favorite_button(html, movie.id, is_favorite, "Favorite", "Remove");
    html.push_str("</div></div></div>");
}

fn pager(html: &mut String, state: &ViewState) {
    let disabled = |enabled: bool| if enabled { "" } else { " disabled" };
    let _ = write!(
        html,
        "<div class=\"pager\">\
         <form class=\"inline\" method=\"post\" action=\"/page/prev\"><button class=\"fav\" type=\"submit\"{}>Previous</button></form>\
         <span class=\"metaSmall\">Page {} of {}</span>\
         <form class=\"inline\" method=\"post\" action=\"/page/next\"><button class=\"fav\" type=\"submit\"{}>Next</button></form></div>",
        disabled(state.has_prev()),
        state.page,
        state.total_pages,
        disabled(state.has_next()),
    );
}

fn overlay(html: &mut String, detail: &MovieDetail, is_favorite: bool, tmdb: &TmdbConfig) {
    let movie = &detail.summary;
    let runtime = detail
        .runtime
        .filter(|r| *r > 0)
        .map(|r| format!("{r} min"))
        .unwrap_or_else(|| "N/A".to_string());
    let overview = if detail.overview.is_empty() {
        "No synopsis."
    } else {
        detail.overview.as_str()
    };
    let directors = detail
        .directors()
        .map(|names| names.join(", "))
        .unwrap_or_else(|| "N/A".to_string());
    let cast = detail
        .top_cast(CAST_LIMIT)
        .map(|cast| {
            cast.iter()
                .map(|c| format!("{} as {}", c.name, c.character.as_deref().unwrap_or("")))
                .collect::<Vec<_>>()
                .join("; ")
        })
        .unwrap_or_else(|| "N/A".to_string());

    let _ = write!(
        html,
        "<div class=\"detailsOverlay\"><div class=\"detailsCard\"><div>\
         <img class=\"poster\" src=\"{poster}\" alt=\"{title}\">\
         <div class=\"metaSmall\">Released: {released}</div>\
         <div class=\"metaSmall\">Runtime: {runtime}</div></div><div>\
         <h2>{title}</h2>\
         <form class=\"inline\" method=\"post\" action=\"/details/close\"><button class=\"closeBtn\" type=\"submit\">Close</button></form>\
         <p class=\"metaSmall\">{tagline}</p>\
         <h3>Overview</h3><p>{overview}</p>\
         <h3>Directed by</h3><div class=\"metaSmall\">{directors}</div>\
         <h3>Cast</h3><div class=\"metaSmall\">{cast}</div>\
         <h3>Rating</h3><div class=\"metaSmall\">{average} / 10 ({count} votes)</div><div>",
        poster = escape(&tmdb.poster_url(movie.poster_path.as_deref())),
        title = escape(&movie.title),
        released = escape(&movie.release_date),
        tagline = escape(&detail.tagline),
        overview = escape(overview),
        directors = escape(&directors),
        cast = escape(&cast),
        average = movie.vote_average,
        count = movie.vote_count,
    );
    favorite_button(
        html,
        movie.id,
        is_favorite,
        "Add to favorites",
        "Remove from favorites",
    );
    html.push_str("</div></div></div></div>");
}

fn favorite_button(html: &mut String, id: i64, is_favorite: bool, add: &str, remove: &str) {
    let (class, label) = if is_favorite {
        ("fav active", remove)
    } else {
        ("fav", add)
    };
    let _ = write!(
        html,
        "<form class=\"inline\" method=\"post\" action=\"/favorites/{id}/toggle\">\
         <button class=\"{class}\" type=\"submit\">{label}</button></form>"
    );
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Event;
    use crate::models::{CastMember, Credits, CrewMember, SearchPage};
    use crate::storage::{FavoritesPersistence, MemoryStore};
    use std::sync::Arc;

    fn summary(id: i64, title: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: title.to_string(),
            poster_path: None,
            release_date: "2010-07-15".to_string(),
            vote_average: 8.4,
            vote_count: 35000,
        }
    }

    fn searched(results: Vec<MovieSummary>, total_pages: u32) -> ViewState {
        let mut state = ViewState::default();
        state.apply(Event::SubmitSearch("query".to_string()));
        state.apply(Event::SearchFinished {
            token: 1,
            page: 1,
            outcome: Ok(SearchPage {
                results,
                total_pages,
            }),
        });
        state
    }

    fn empty_favorites() -> FavoritesStore {
        FavoritesStore::hydrate(FavoritesPersistence::new(Arc::new(MemoryStore::new()))).0
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<b>\"Tom & Jerry\"</b>"), "&lt;b&gt;&quot;Tom &amp; Jerry&quot;&lt;/b&gt;");
    }

    #[tokio::test]
    async fn renders_cards_with_placeholder_and_escaped_title() {
        let state = searched(vec![summary(1, "<Heat>")], 1);
        let html = render(&state, &empty_favorites(), &TmdbConfig::new("k"));
        assert!(html.contains("&lt;Heat&gt;"));
        assert!(html.contains("via.placeholder.com"));
        assert!(html.contains("2010 • Rating: 8.4"));
        assert!(html.contains("action=\"/favorites/1/toggle\""));
        assert!(!html.contains("class=\"pager\""));
    }

    #[tokio::test]
    async fn pager_disables_previous_on_first_page() {
        let state = searched(vec![summary(1, "Heat")], 3);
        let html = render(&state, &empty_favorites(), &TmdbConfig::new("k"));
        assert!(html.contains("Page 1 of 3"));
        assert!(html.contains("type=\"submit\" disabled>Previous"));
        assert!(html.contains("type=\"submit\">Next"));
    }

    #[tokio::test]
    async fn favorite_button_reflects_store() {
        let movie = summary(27205, "Inception");
        let state = searched(vec![movie.clone()], 1);
        let mut favorites = empty_favorites();
        favorites.toggle(&movie);
        let html = render(&state, &favorites, &TmdbConfig::new("k"));
        assert!(html.contains("Favorites: 1"));
        assert!(html.contains("<button class=\"fav active\" type=\"submit\">Remove</button>"));
    }

    #[tokio::test]
    async fn overlay_lists_directors_and_six_cast_members() {
        let cast = (0..8)
            .map(|i| CastMember {
                name: format!("Actor {i}"),
                character: Some(format!("Role {i}")),
            })
            .collect();
        let detail = MovieDetail {
            summary: summary(27205, "Inception"),
            runtime: Some(148),
            tagline: "Your mind is the scene of the crime.".to_string(),
            overview: String::new(),
            credits: Some(Credits {
                cast,
                crew: vec![
                    CrewMember {
                        name: "Christopher Nolan".to_string(),
                        job: Some("Director".to_string()),
                    },
                    CrewMember {
                        name: "Wally Pfister".to_string(),
                        job: Some("Director of Photography".to_string()),
                    },
                ],
            }),
        };
        let mut state = ViewState::default();
        state.apply(Event::ViewDetails(27205));
        state.apply(Event::DetailsFinished {
            token: 1,
            outcome: Ok(detail),
        });

        let html = render(&state, &empty_favorites(), &TmdbConfig::new("k"));
        assert!(html.contains("Runtime: 148 min"));
        assert!(html.contains("No synopsis."));
        assert!(html.contains("<div class=\"metaSmall\">Christopher Nolan</div>"));
        assert!(html.contains("Actor 5 as Role 5"));
        assert!(!html.contains("Actor 6"));
        assert!(html.contains("Add to favorites"));
    }

    fn opened(detail: MovieDetail) -> ViewState {
        let mut state = ViewState::default();
        state.apply(Event::ViewDetails(detail.summary.id));
        state.apply(Event::DetailsFinished {
            token: 1,
            outcome: Ok(detail),
        });
        state
    }

    #[tokio::test]
    async fn overlay_without_director_renders_empty_line() {
        let detail = MovieDetail {
            summary: summary(11, "Crewed"),
            runtime: None,
            tagline: String::new(),
            overview: "Plot.".to_string(),
            credits: Some(Credits {
                cast: Vec::new(),
                crew: vec![CrewMember {
                    name: "Hans Zimmer".to_string(),
                    job: Some("Original Music Composer".to_string()),
                }],
            }),
        };
        let html = render(&opened(detail), &empty_favorites(), &TmdbConfig::new("k"));
        assert!(html.contains("<h3>Directed by</h3><div class=\"metaSmall\"></div>"));
        assert!(html.contains("<h3>Cast</h3><div class=\"metaSmall\"></div>"));
    }

    #[tokio::test]
    async fn overlay_without_credits_renders_na() {
        let detail = MovieDetail {
            summary: summary(12, "Bare"),
            runtime: None,
            tagline: String::new(),
            overview: "Plot.".to_string(),
            credits: None,
        };
        let html = render(&opened(detail), &empty_favorites(), &TmdbConfig::new("k"));
        assert!(html.contains("<h3>Directed by</h3><div class=\"metaSmall\">N/A</div>"));
        assert!(html.contains("<h3>Cast</h3><div class=\"metaSmall\">N/A</div>"));
        assert!(html.contains("Runtime: N/A"));
    }
}
