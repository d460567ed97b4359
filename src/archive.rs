//! Groups posts by year and month for the archive view and emits the
//! `archives.yaml` data file. Groups are ordered newest-first at every
//! level, matching the order the posts arrive in from
//! [`crate::post::parse_posts`].

use std::{fmt, io};

use serde::Serialize;
use url::Url;

use crate::post::Post;

/// One year of the archive, newest month first.
#[derive(Debug, Serialize, PartialEq)]
pub struct ArchiveYear {
    pub year: i32,
    pub months: Vec<ArchiveMonth>,
}

/// One month of the archive, newest post first.
#[derive(Debug, Serialize, PartialEq)]
pub struct ArchiveMonth {
    pub month: u32,

    /// The month's English name (`January`, ...), for display.
    pub name: String,

    pub posts: Vec<ArchivePost>,
}

/// A post summary as it appears in the archive.
#[derive(Debug, Serialize, PartialEq)]
pub struct ArchivePost {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub permalink: Url,
}

/// Groups `posts` by year, then month. `posts` must already be sorted by
/// date descending (as returned by [`crate::post::parse_posts`]); grouping
/// preserves that order, so years, months, and posts all come out
/// newest-first.
pub fn group_archives(posts: &[Post], site_root: &Url) -> Result<Vec<ArchiveYear>> {
    use chrono::Datelike;

    let mut years: Vec<ArchiveYear> = Vec::new();
    for post in posts {
        let entry = ArchivePost {
            slug: post.slug.clone(),
            title: post.title.clone(),
            date: post.date.format("%Y-%m-%d").to_string(),
            permalink: post.permalink_url(site_root)?,
        };

        let year = post.date.year();
        let month = post.date.month();
        match years.last_mut() {
            Some(y) if y.year == year => match y.months.last_mut() {
                Some(m) if m.month == month => m.posts.push(entry),
                _ => y.months.push(new_month(post, entry)),
            },
            _ => years.push(ArchiveYear {
                year,
                months: vec![new_month(post, entry)],
            }),
        }
    }
    Ok(years)
}

fn new_month(post: &Post, entry: ArchivePost) -> ArchiveMonth {
    use chrono::Datelike;
    ArchiveMonth {
        month: post.date.month(),
        name: post.date.format("%B").to_string(),
        posts: vec![entry],
    }
}

/// Writes the archive groups as `archives.yaml` to `w`.
pub fn write_archives<W: io::Write>(years: &[ArchiveYear], w: W) -> Result<()> {
    serde_yaml::to_writer(w, years)?;
    Ok(())
}

/// The result of a fallible archive operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error grouping or emitting archives.
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
