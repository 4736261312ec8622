use serde::{Deserialize, Serialize};

/// Raw `/api/stream` query. Every field is optional at this layer.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamQuery {
    pub tmdb_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub release_year: Option<String>,
    pub season: Option<String>,
    pub episode: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Show,
}

impl MediaKind {
    /// Only the exact string `show` selects a show; anything else, including
    /// a missing type, is a movie.
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("show") => Self::Show,
            _ => Self::Movie,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Show => "show",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumberRef {
    pub number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieMedia {
    pub title: String,
    /// `None` when the input was absent or not an integer; serialized as `null`.
    pub release_year: Option<i32>,
    pub tmdb_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowMedia {
    pub title: String,
    pub release_year: Option<i32>,
    pub tmdb_id: String,
    pub season: NumberRef,
    pub episode: NumberRef,
}

/// The descriptor handed to the resolution engine.
///
/// Movies cannot carry `season`/`episode`: the keys are absent from the
/// serialized form rather than `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScrapeMedia {
    Movie(MovieMedia),
    Show(ShowMedia),
}

impl ScrapeMedia {
    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Movie(_) => MediaKind::Movie,
            Self::Show(_) => MediaKind::Show,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Movie(m) => &m.title,
            Self::Show(s) => &s.title,
        }
    }

    pub fn release_year(&self) -> Option<i32> {
        match self {
            Self::Movie(m) => m.release_year,
            Self::Show(s) => s.release_year,
        }
    }

    pub fn tmdb_id(&self) -> &str {
        match self {
            Self::Movie(m) => &m.tmdb_id,
            Self::Show(s) => &s.tmdb_id,
        }
    }

    /// `(season, episode)` for shows.
    pub fn episode(&self) -> Option<(u32, u32)> {
        match self {
            Self::Movie(_) => None,
            Self::Show(s) => Some((s.season.number, s.episode.number)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    #[error("{field} is required when type is show")]
    Missing { field: &'static str },
    #[error("{field} must be a non-negative integer, got '{value}'")]
    NotANumber { field: &'static str, value: String },
}

impl StreamQuery {
    pub fn into_media(self) -> Result<ScrapeMedia, MediaError> {
        let title = self.title.unwrap_or_default();
        let tmdb_id = self.tmdb_id.unwrap_or_default();
        let release_year = self
            .release_year
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i32>().ok());

        let media = match MediaKind::normalize(self.kind.as_deref()) {
            MediaKind::Movie => ScrapeMedia::Movie(MovieMedia {
                title,
                release_year,
                tmdb_id,
            }),
            MediaKind::Show => ScrapeMedia::Show(ShowMedia {
                title,
                release_year,
                tmdb_id,
                season: NumberRef {
                    number: required_number("season", self.season.as_deref())?,
                },
                episode: NumberRef {
                    number: required_number("episode", self.episode.as_deref())?,
                },
            }),
        };

        Ok(media)
    }
}

fn required_number(field: &'static str, raw: Option<&str>) -> Result<u32, MediaError> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(MediaError::Missing { field })?;

    raw.parse::<u32>().map_err(|_| MediaError::NotANumber {
        field,
        value: raw.to_string(),
    })
}
