use jiff::civil::Date;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    entities::{actor, country, genre, language, movie, movie::MovieStatus},
    validation::{Checker, Valid, ValidationError, normalize_country, normalize_list_fields},
};

pub const NAME_MAX_CHARS: usize = 255;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: i32,
    pub code: String,
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub id: i32,
    pub name: String,
}

impl From<country::Model> for Country {
    fn from(m: country::Model) -> Self {
        Self { id: m.id, code: m.code, name: m.name }
    }
}

impl From<genre::Model> for Genre {
    fn from(m: genre::Model) -> Self {
        Self { id: m.id, name: m.name }
    }
}

impl From<actor::Model> for Actor {
    fn from(m: actor::Model) -> Self {
        Self { id: m.id, name: m.name }
    }
}

impl From<language::Model> for Language {
    fn from(m: language::Model) -> Self {
        Self { id: m.id, name: m.name }
    }
}

/// Fields every full movie representation shares.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieBase {
    pub name: String,
    pub date: Date,
    pub score: f64,
    pub overview: String,
    pub status: MovieStatus,
    pub budget: f64,
    pub revenue: f64,
}

impl TryFrom<movie::Model> for MovieBase {
    type Error = jiff::Error;

    fn try_from(m: movie::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            name: m.name,
            date: m.date.parse()?,
            score: m.score,
            overview: m.overview,
            status: m.status,
            budget: m.budget,
            revenue: m.revenue,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: i32,
    #[serde(flatten)]
    pub movie: MovieBase,
    pub country: Country,
    pub genres: Vec<Genre>,
    pub actors: Vec<Actor>,
    pub languages: Vec<Language>,
}

impl MovieDetail {
    pub fn project(
        movie: movie::Model,
        country: country::Model,
        genres: Vec<genre::Model>,
        actors: Vec<actor::Model>,
        languages: Vec<language::Model>,
    ) -> Result<Self, jiff::Error> {
        Ok(Self {
            id: movie.id,
            movie: MovieBase::try_from(movie)?,
            country: country.into(),
            genres: genres.into_iter().map(Genre::from).collect(),
            actors: actors.into_iter().map(Actor::from).collect(),
            languages: languages.into_iter().map(Language::from).collect(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieListItem {
    pub id: i32,
    pub name: String,
    pub date: Date,
    pub score: f64,
    pub overview: String,
}

impl TryFrom<movie::Model> for MovieListItem {
    type Error = jiff::Error;

    fn try_from(m: movie::Model) -> Result<Self, Self::Error> {
        Ok(Self { id: m.id, date: m.date.parse()?, name: m.name, score: m.score, overview: m.overview })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieListResponse {
    pub movies: Vec<MovieListItem>,
    pub prev_page: Option<String>,
    pub next_page: Option<String>,
    pub total_pages: u64,
    pub total_items: u64,
}

/// Create payload as sent. `date` and `status` stay raw so that malformed
/// values are reported alongside every other field error.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MovieCreate {
    pub name: String,
    pub date: String,
    pub score: f64,
    pub overview: String,
    pub status: String,
    pub budget: f64,
    pub revenue: f64,
    pub country: String,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub languages: Vec<String>,
}

/// A create payload after normalization and checks.
#[derive(Clone, Debug, PartialEq)]
pub struct NewMovie {
    pub name: String,
    pub date: Date,
    pub score: f64,
    pub overview: String,
    pub status: MovieStatus,
    pub budget: f64,
    pub revenue: f64,
    pub country: String,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub languages: Vec<String>,
}

fn check_status(checker: &mut Checker, field: &'static str, raw: &str) -> Option<MovieStatus> {
    let status = MovieStatus::parse(raw);
    if status.is_none() {
        checker.push(field, format!("must be one of {}", MovieStatus::labels()));
    }
    status
}

impl MovieCreate {
    /// Checks every constraint against `today` and normalizes relation names.
    pub fn validate(self, today: Date) -> Result<Valid<NewMovie>, ValidationError> {
        let mut checker = Checker::new();
        checker.max_chars("name", &self.name, NAME_MAX_CHARS);
        let date = checker.date("date", &self.date);
        if let Some(date) = date {
            checker.release_year("date", date, today);
        }
        checker.between("score", self.score, 0.0, 100.0);
        let status = check_status(&mut checker, "status", &self.status);
        checker.non_negative("budget", self.budget);
        checker.non_negative("revenue", self.revenue);

        let (Some(date), Some(status)) = (date, status) else {
            return Err(checker.into_error());
        };
        checker.finish(NewMovie {
            name: self.name,
            date,
            score: self.score,
            overview: self.overview,
            status,
            budget: self.budget,
            revenue: self.revenue,
            country: normalize_country(&self.country),
            genres: normalize_list_fields(&self.genres),
            actors: normalize_list_fields(&self.actors),
            languages: normalize_list_fields(&self.languages),
        })
    }
}

/// Partial update payload. The outer `Option` is `None` when the field was
/// absent from the request; `Some(None)` means it was sent as `null`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MovieUpdate {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub score: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub overview: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub budget: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub revenue: Option<Option<f64>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// The fields a validated update will write. `None` leaves the stored value alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovieChanges {
    pub name: Option<String>,
    pub date: Option<Date>,
    pub score: Option<f64>,
    pub overview: Option<String>,
    pub status: Option<MovieStatus>,
    pub budget: Option<f64>,
    pub revenue: Option<f64>,
}

impl MovieChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn not_null<T>(checker: &mut Checker, field: &'static str, value: Option<Option<T>>) -> Option<T> {
    match value {
        Some(None) => {
            checker.push(field, "may not be null");
            None
        },
        Some(Some(v)) => Some(v),
        None => None,
    }
}

impl MovieUpdate {
    pub fn validate(self, today: Date) -> Result<Valid<MovieChanges>, ValidationError> {
        let mut checker = Checker::new();
        let date = not_null(&mut checker, "date", self.date);
        let status = not_null(&mut checker, "status", self.status);
        let changes = MovieChanges {
            name: not_null(&mut checker, "name", self.name),
            date: date.and_then(|raw| checker.date("date", &raw)),
            score: not_null(&mut checker, "score", self.score),
            overview: not_null(&mut checker, "overview", self.overview),
            status: status.and_then(|raw| check_status(&mut checker, "status", &raw)),
            budget: not_null(&mut checker, "budget", self.budget),
            revenue: not_null(&mut checker, "revenue", self.revenue),
        };

        if let Some(name) = &changes.name {
            checker.max_chars("name", name, NAME_MAX_CHARS);
        }
        if let Some(date) = changes.date {
            checker.release_year("date", date, today);
        }
        if let Some(score) = changes.score {
            checker.between("score", score, 0.0, 100.0);
        }
        if let Some(budget) = changes.budget {
            checker.non_negative("budget", budget);
        }
        if let Some(revenue) = changes.revenue {
            checker.non_negative("revenue", revenue);
        }
        checker.finish(changes)
    }
}
