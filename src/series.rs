//! Groups posts into series and emits the `series.yaml` and
//! `seriesIndex.yaml` data files. A series is a named, ordered sequence of
//! posts sharing a `seriesId`; within a series each post is linked to its
//! previous and next sibling so the downstream site generator can render
//! prev/next navigation.

use std::{collections::BTreeMap, fmt, io};

use serde::Serialize;
use url::Url;

use crate::post::Post;

/// Represents a series: its title (the raw `seriesId`), the URL of its index
/// page, and its posts in `seriesOrder`.
#[derive(Debug, Serialize, PartialEq)]
pub struct Series {
    /// The series title, i.e. the `seriesId` exactly as written in the
    /// posts' frontmatter.
    pub title: String,

    /// The URL of the series index page, derived from the slugified series
    /// id (`{site_root}/series/{slug}/`).
    pub permalink: Url,

    /// The posts belonging to the series, ordered by `seriesOrder` (ties
    /// broken by date, then slug).
    pub posts: Vec<SeriesPost>,
}

/// A post as it appears inside a [`Series`], carrying its prev/next sibling
/// links.
#[derive(Debug, Serialize, PartialEq)]
pub struct SeriesPost {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub order: i64,
    pub categories: Vec<String>,
    pub permalink: Url,

    /// The permalink of the previous post in the series, absent for the
    /// first post.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<Url>,

    /// The permalink of the next post in the series, absent for the last
    /// post.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Url>,
}

/// A single entry in `seriesIndex.yaml`, summarizing one series for the
/// series index page.
#[derive(Debug, Serialize, PartialEq)]
pub struct SeriesIndexEntry {
    pub title: String,
    pub permalink: Url,
    pub count: usize,
}

/// Groups `posts` by their `seriesId`, keyed by the slugified id so the keys
/// are stable and URL-safe. Posts without a `seriesId` are ignored. The
/// returned map is a [`BTreeMap`] so the emitted YAML is deterministic.
pub fn group_series(posts: &[Post], site_root: &Url) -> Result<BTreeMap<String, Series>> {
    let mut groups: BTreeMap<String, (String, Vec<&Post>)> = BTreeMap::new();
    for post in posts {
        if let Some(series_id) = &post.series_id {
            let key = slug::slugify(series_id);
            groups
                .entry(key)
                .or_insert_with(|| (series_id.clone(), Vec::new()))
                .1
                .push(post);
        }
    }

    let mut series = BTreeMap::new();
    for (key, (title, mut members)) in groups {
        members.sort_by(|a, b| {
            a.series_order
                .cmp(&b.series_order)
                .then_with(|| a.date.cmp(&b.date))
                .then_with(|| a.slug.cmp(&b.slug))
        });

        let permalinks = members
            .iter()
            .map(|p| p.permalink_url(site_root))
            .collect::<std::result::Result<Vec<Url>, url::ParseError>>()?;

        let series_posts = members
            .iter()
            .enumerate()
            .map(|(i, post)| SeriesPost {
                slug: post.slug.clone(),
                title: post.title.clone(),
                date: post.date.format("%Y-%m-%d").to_string(),
                order: post.series_order,
                categories: post.categories.clone(),
                permalink: permalinks[i].clone(),
                prev: match i < 1 {
                    true => None,
                    false => Some(permalinks[i - 1].clone()),
                },
                next: match i >= members.len() - 1 {
                    true => None,
                    false => Some(permalinks[i + 1].clone()),
                },
            })
            .collect();

        series.insert(
            key.clone(),
            Series {
                title,
                permalink: site_root.join(&format!("/series/{}/", key))?,
                posts: series_posts,
            },
        );
    }

    Ok(series)
}

/// Writes the full series map as `series.yaml` to `w`.
pub fn write_series<W: io::Write>(series: &BTreeMap<String, Series>, w: W) -> Result<()> {
    serde_yaml::to_writer(w, series)?;
    Ok(())
}

/// Writes `seriesIndex.yaml`, a flat list of series summaries ordered by
/// title, to `w`.
pub fn write_series_index<W: io::Write>(series: &BTreeMap<String, Series>, w: W) -> Result<()> {
    let mut entries: Vec<SeriesIndexEntry> = series
        .values()
        .map(|s| SeriesIndexEntry {
            title: s.title.clone(),
            permalink: s.permalink.clone(),
            count: s.posts.len(),
        })
        .collect();
    entries.sort_by(|a, b| a.title.cmp(&b.title));
    serde_yaml::to_writer(w, &entries)?;
    Ok(())
}

/// The result of a fallible series operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error grouping or emitting series.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a problem joining permalinks onto the site
    /// root.
    UrlParse(url::ParseError),

    /// Returned when there was an error serializing the output as YAML.
    SerializeYaml(serde_yaml::Error),

    /// Returned for I/O errors writing the output files.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UrlParse(err) => err.fmt(f),
            Error::SerializeYaml(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::UrlParse(err) => Some(err),
            Error::SerializeYaml(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. This allows us to
    /// use the `?` operator for URL joining functions.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator for [`serde_yaml`] serialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::SerializeYaml(err)
    }
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
