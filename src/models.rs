use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub type Favorites = BTreeMap<i64, FavoriteRecord>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub release_date: String,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
}

impl MovieSummary {
    pub fn year(&self) -> &str {
        year_of(&self.release_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub summary: MovieSummary,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tagline: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub overview: String,
    #[serde(default)]
    pub credits: Option<Credits>,
}

impl MovieDetail {
    // None when the response carried no credits at all.
    pub fn directors(&self) -> Option<Vec<&str>> {
        let credits = self.credits.as_ref()?;
        Some(
            credits
                .crew
                .iter()
                .filter(|c| c.job.as_deref() == Some("Director"))
                .map(|c| c.name.as_str())
                .collect(),
        )
    }

    pub fn top_cast(&self, max: usize) -> Option<&[CastMember]> {
        let cast = &self.credits.as_ref()?.cast;
        Some(&cast[..cast.len().min(max)])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub year: String,
}

impl From<&MovieSummary> for FavoriteRecord {
    fn from(movie: &MovieSummary) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            year: movie.year().to_string(),
        }
    }
}

impl From<&FavoriteRecord> for MovieSummary {
    // Rating data is not persisted.
    fn from(record: &FavoriteRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            poster_path: record.poster_path.clone(),
            release_date: record.year.clone(),
            vote_average: 0.0,
            vote_count: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub results: Vec<MovieSummary>,
    pub total_pages: u32,
}

pub fn year_of(date: &str) -> &str {
    match date.char_indices().nth(4) {
        Some((idx, _)) => &date[..idx],
        None => date,
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn year_is_first_four_chars() {
        assert_eq!(year_of("2010-07-15"), "2010");
        assert_eq!(year_of("19"), "19");
        assert_eq!(year_of(""), "");
    }

    #[test]
    fn detail_flattens_summary_and_filters_directors() {
        let value = json!({
            "id": 27205,
            "title": "Inception",
            "poster_path": "/inception.jpg",
            "release_date": "2010-07-15",
            "vote_average": 8.4,
            "vote_count": 35000,
            "runtime": 148,
            "tagline": null,
            "overview": "Dreams.",
            "credits": {
                "cast": [
                    { "name": "Leonardo DiCaprio", "character": "Cobb" },
                    { "name": "Joseph Gordon-Levitt", "character": "Arthur" }
                ],
                "crew": [
                    { "name": "Christopher Nolan", "job": "Director" },
                    { "name": "Hans Zimmer", "job": "Original Music Composer" }
                ]
            }
        });
        let detail: MovieDetail = serde_json::from_value(value).expect("detail deserialize");
        assert_eq!(detail.summary.id, 27205);
        assert_eq!(detail.summary.year(), "2010");
        assert_eq!(detail.tagline, "");
        assert_eq!(detail.directors(), Some(vec!["Christopher Nolan"]));
        assert_eq!(detail.top_cast(6).map(<[_]>::len), Some(2));
        assert_eq!(detail.top_cast(1).unwrap()[0].name, "Leonardo DiCaprio");
    }

    #[test]
    fn missing_credits_differ_from_empty_crew() {
        let bare: MovieDetail =
            serde_json::from_value(json!({ "id": 1, "title": "Bare" })).expect("detail deserialize");
        assert_eq!(bare.directors(), None);
        assert!(bare.top_cast(6).is_none());

        let no_director: MovieDetail = serde_json::from_value(json!({
            "id": 2,
            "title": "Crewed",
            "credits": { "crew": [{ "name": "Hans Zimmer", "job": "Original Music Composer" }] }
        }))
        .expect("detail deserialize");
        assert_eq!(no_director.directors(), Some(vec![]));
        assert_eq!(no_director.top_cast(6).map(<[_]>::len), Some(0));
    }

    #[test]
    fn summary_tolerates_missing_optional_fields() {
        let summary: MovieSummary =
            serde_json::from_value(json!({ "id": 1, "title": "Untitled", "release_date": null }))
                .expect("summary deserialize");
        assert_eq!(summary.release_date, "");
        assert_eq!(summary.poster_path, None);
        assert_eq!(summary.vote_count, 0);
    }

    #[test]
    fn favorite_record_projects_year() {
        let summary = MovieSummary {
            id: 27205,
            title: "Inception".to_string(),
            poster_path: Some("/p.jpg".to_string()),
            release_date: "2010-07-15".to_string(),
            vote_average: 8.4,
            vote_count: 1,
        };
        let record = FavoriteRecord::from(&summary);
        assert_eq!(record.year, "2010");
        assert_eq!(record.poster_path.as_deref(), Some("/p.jpg"));
    }
}
