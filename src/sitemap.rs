//! Emits `sitemap.xml` covering the blog's posts and pages. Post entries
//! carry a `lastmod` taken from the post date; page entries are discovered
//! by walking the pages directory and carry no `lastmod`.

use std::{fmt, io, path::Path};

use chrono::NaiveDate;
use url::Url;

use crate::post::Post;

/// One `<url>` element of the sitemap.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: Url,

    /// The entry's last-modified date, omitted from the XML when `None`.
    pub lastmod: Option<NaiveDate>,
}

/// Builds sitemap entries for `posts`.
pub fn post_entries(posts: &[Post], site_root: &Url) -> Result<Vec<SitemapEntry>> {
    posts
        .iter()
        .map(|post| {
            Ok(SitemapEntry {
                loc: post.permalink_url(site_root)?,
                lastmod: Some(post.date),
            })
        })
        .collect()
}

const PAGE_EXTENSIONS: &[&str] = &[".md", ".html"];

/// Walks `pages_directory` recursively and builds a sitemap entry for each
/// page source file (`.md` or `.html`). A page's URL is its path relative
/// to the pages directory, less the extension, joined onto the site root:
/// `pages/about.md` becomes `{site_root}/about/`. An `index` file maps to
/// its directory's URL (`pages/talks/index.html` becomes
/// `{site_root}/talks/`).
pub fn page_entries(pages_directory: &Path, site_root: &Url) -> Result<Vec<SitemapEntry>> {
    let mut entries = Vec::new();
    for result in walkdir::WalkDir::new(pages_directory) {
        let entry = result?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(pages_directory)
            // walkdir only yields paths under its root
            .unwrap()
            .to_string_lossy()
            .replace('\\', "/");
        let base = match PAGE_EXTENSIONS
            .iter()
            .find(|ext| relative.ends_with(**ext))
        {
            Some(ext) => relative.trim_end_matches(*ext),
            None => continue,
        };
        let path = match base {
            "index" => String::from("/"),
            _ => format!("/{}/", base.trim_end_matches("/index")),
        };
        entries.push(SitemapEntry {
            loc: site_root.join(&path)?,
            lastmod: None,
        });
    }
    Ok(entries)
}

/// Writes `entries` as a sitemap to `w`. Entries are sorted by `loc` first
/// so the output is deterministic regardless of directory iteration order.
pub fn write_sitemap<W: io::Write>(entries: &mut Vec<SitemapEntry>, mut w: W) -> Result<()> {
    entries.sort_by(|a, b| a.loc.cmp(&b.loc));

    writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        w,
        r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#
    )?;
    for entry in entries.iter() {
        writeln!(w, "  <url>")?;
        writeln!(w, "    <loc>{}</loc>", escape(entry.loc.as_str()))?;
        if let Some(lastmod) = entry.lastmod {
            writeln!(w, "    <lastmod>{}</lastmod>", lastmod.format("%Y-%m-%d"))?;
        }
        writeln!(w, "  </url>")?;
    }
    writeln!(w, "</urlset>")?;
    Ok(())
}

/// Escapes the XML special characters in `s`.
fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// The result of a fallible sitemap operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error building or emitting the sitemap.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a problem joining permalinks onto the site
    /// root.
    UrlParse(url::ParseError),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// Returned for I/O errors writing the output file.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UrlParse(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::UrlParse(err) => Some(err),
            Error::WalkDir(err) => Some(err),
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

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator when walking the pages directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
