//! Exports the [`generate`] function which stitches together the high-level
//! steps of producing the data files: scanning the posts directory
//! ([`crate::post`]), grouping posts into series ([`crate::series`]) and
//! archives ([`crate::archive`]), and emitting the sitemap
//! ([`crate::sitemap`]). The outputs land in the configured data directory
//! and are consumed by an external static-site generator.

use std::{fmt, fs::File, path::PathBuf};

use crate::archive::{self, Error as ArchiveError};
use crate::config::Config;
use crate::post::{self, Error as ParseError};
use crate::series::{self, Error as SeriesError};
use crate::sitemap::{self, Error as SitemapError};

/// Names of the files written into the output directory.
pub const SERIES_FILE_NAME: &str = "series.yaml";
pub const SERIES_INDEX_FILE_NAME: &str = "seriesIndex.yaml";
pub const ARCHIVES_FILE_NAME: &str = "archives.yaml";
pub const SITEMAP_FILE_NAME: &str = "sitemap.xml";

/// Generates the data files from a [`Config`] object. This calls into
/// [`post::parse_posts`], [`series::group_series`],
/// [`archive::group_archives`], and the `sitemap` builders which do the
/// heavy-lifting; this function sequences them and owns the output files.
/// All four outputs are written even when the posts directory yields no
/// posts.
pub fn generate(config: &Config) -> Result<()> {
    let posts = post::parse_posts(&config.posts_source_directory)?;
    tracing::info!(
        "parsed {} posts from {}",
        posts.len(),
        config.posts_source_directory.display(),
    );

    std::fs::create_dir_all(&config.output_directory)?;

    let series = series::group_series(&posts, &config.site_root)?;
    series::write_series(&series, create(config, SERIES_FILE_NAME)?)?;
    series::write_series_index(&series, create(config, SERIES_INDEX_FILE_NAME)?)?;
    tracing::info!("wrote {} series", series.len());

    let archives = archive::group_archives(&posts, &config.site_root)?;
    archive::write_archives(&archives, create(config, ARCHIVES_FILE_NAME)?)?;
    tracing::info!("wrote {} archive years", archives.len());

    let mut entries = sitemap::post_entries(&posts, &config.site_root)?;
    if let Some(pages_directory) = &config.pages_source_directory {
        entries.extend(sitemap::page_entries(pages_directory, &config.site_root)?);
    }
    sitemap::write_sitemap(&mut entries, create(config, SITEMAP_FILE_NAME)?)?;
    tracing::info!("wrote sitemap with {} entries", entries.len());

    Ok(())
}

fn create(config: &Config, file_name: &str) -> Result<File> {
    let path = config.output_directory.join(file_name);
    File::create(&path).map_err(|err| Error::CreateOutputFile { path, err })
}

/// The result of a data-file generation run.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for generating the data files. Errors can occur while
/// parsing posts, grouping series or archives, building the sitemap,
/// creating output files, and during other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors scanning and parsing posts.
    Parse(ParseError),

    /// Returned for errors grouping or emitting series.
    Series(SeriesError),

    /// Returned for errors grouping or emitting archives.
    Archive(ArchiveError),

    /// Returned for errors building or emitting the sitemap.
    Sitemap(SitemapError),

    /// Returned for I/O problems creating an output file.
    CreateOutputFile { path: PathBuf, err: std::io::Error },

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Series(err) => err.fmt(f),
            Error::Archive(err) => err.fmt(f),
            Error::Sitemap(err) => err.fmt(f),
            Error::CreateOutputFile { path, err } => {
                write!(f, "Creating output file '{}': {}", path.display(), err)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Series(err) => Some(err),
            Error::Archive(err) => Some(err),
            Error::Sitemap(err) => Some(err),
            Error::CreateOutputFile { path: _, err } => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<SeriesError> for Error {
    /// Converts [`SeriesError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: SeriesError) -> Error {
        Error::Series(err)
    }
}

impl From<ArchiveError> for Error {
    /// Converts [`ArchiveError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: ArchiveError) -> Error {
        Error::Archive(err)
    }
}

impl From<SitemapError> for Error {
    /// Converts [`SitemapError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: SitemapError) -> Error {
        Error::Sitemap(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use std::{fs, io::Write, path::Path};

    use url::Url;

    use super::*;

    fn write_file(path: &Path, contents: &str) {
        fs::File::create(path)
            .unwrap()
            .write_all(contents.as_bytes())
            .unwrap();
    }

    #[test]
    fn test_generate() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let posts = dir.path().join("_posts");
        let pages = dir.path().join("pages");
        let out = dir.path().join("_data");
        fs::create_dir_all(&posts)?;
        fs::create_dir_all(&pages)?;

        write_file(
            &posts.join("2020-01-01-intro.md"),
            concat!(
                "---\n",
                "title: Intro\n",
                "seriesId: Getting started\n",
                "seriesOrder: 1\n",
                "---\n",
                "Hello.\n",
            ),
        );
        write_file(
            &posts.join("2020-02-01-next-steps.md"),
            concat!(
                "---\n",
                "title: Next steps\n",
                "seriesId: Getting started\n",
                "seriesOrder: 2\n",
                "---\n",
                "More.\n",
            ),
        );
        write_file(&posts.join("not-a-post.md"), "---\ntitle: Nope\n---\n");
        write_file(&pages.join("about.md"), "# About\n");

        generate(&Config {
            posts_source_directory: posts,
            pages_source_directory: Some(pages),
            output_directory: out.clone(),
            site_root: Url::parse("https://example.org/").unwrap(),
        })?;

        let series = fs::read_to_string(out.join(SERIES_FILE_NAME))?;
        assert!(series.contains("getting-started"));
        assert!(series.contains("title: Getting started"));
        assert!(series.contains("https://example.org/posts/intro/"));
        // intro links forward to next-steps
        assert!(series.contains("next: \"https://example.org/posts/next-steps/\""));

        let index = fs::read_to_string(out.join(SERIES_INDEX_FILE_NAME))?;
        assert!(index.contains("count: 2"));

        let archives = fs::read_to_string(out.join(ARCHIVES_FILE_NAME))?;
        assert!(archives.contains("year: 2020"));
        assert!(archives.contains("name: February"));

        let sitemap = fs::read_to_string(out.join(SITEMAP_FILE_NAME))?;
        assert!(sitemap.contains("<loc>https://example.org/about/</loc>"));
        assert!(sitemap.contains("<loc>https://example.org/posts/intro/</loc>"));
        assert!(sitemap.contains("<lastmod>2020-01-01</lastmod>"));
        // the undated file was skipped
        assert!(!sitemap.contains("not-a-post"));
        Ok(())
    }

    #[test]
    fn test_generate_empty_posts_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let posts = dir.path().join("_posts");
        let out = dir.path().join("_data");
        fs::create_dir_all(&posts)?;

        generate(&Config {
            posts_source_directory: posts,
            pages_source_directory: None,
            output_directory: out.clone(),
            site_root: Url::parse("https://example.org/").unwrap(),
        })?;

        for name in &[
            SERIES_FILE_NAME,
            SERIES_INDEX_FILE_NAME,
            ARCHIVES_FILE_NAME,
            SITEMAP_FILE_NAME,
        ] {
            assert!(out.join(name).is_file(), "missing output file {}", name);
        }
        Ok(())
    }
}
