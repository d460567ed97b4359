//! Defines the [`Post`] type and the logic for scanning a posts directory
//! into memory. A post source file is named `YYYY-MM-DD-{slug}.md` and begins
//! with a `---`-fenced YAML frontmatter block; files that don't fit the
//! pattern are logged and skipped rather than failing the whole run.

use std::{
    fmt,
    fs::{read_dir, File},
    path::Path,
};

use chrono::NaiveDate;
use serde::Deserialize;
use url::Url;

/// Represents a single blog post parsed from a source file. The `date` and
/// `slug` come from the file name; everything else comes from the
/// frontmatter.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// The post's slug, i.e. the file name less the date prefix and the
    /// `.md` extension.
    pub slug: String,

    /// The date from the file name's `YYYY-MM-DD-` prefix.
    pub date: NaiveDate,

    /// The post's title.
    pub title: String,

    /// The identifier of the series this post belongs to, if any. Posts
    /// sharing a `seriesId` are rendered with prev/next navigation.
    pub series_id: Option<String>,

    /// The post's position within its series. Defaults to 0 when the
    /// frontmatter provides a `seriesId` but no `seriesOrder`.
    pub series_order: i64,

    /// The post's categories.
    pub categories: Vec<String>,

    /// The site-relative permalink, always of the form `/{...}/` (leading
    /// and trailing slash). Defaults to `/posts/{slug}/` unless the
    /// frontmatter overrides it.
    pub permalink: String,
}

impl Post {
    /// Joins the post's site-relative permalink onto the site root,
    /// producing the absolute URL emitted into the data files.
    pub fn permalink_url(&self, site_root: &Url) -> std::result::Result<Url, url::ParseError> {
        site_root.join(&self.permalink)
    }

    /// Parses a single [`Post`] from its file name's date and slug and the
    /// source file contents. The contents must be:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with field `title` and optionally `seriesId`,
    ///    `seriesOrder`, `categories`, and `permalink`
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Post body (ignored by this tool)
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// title: Thinking in types
    /// seriesId: Designing with types
    /// seriesOrder: 2
    /// categories: [types]
    /// ---
    /// Body goes here.
    /// ```
    pub fn from_parts(slug: &str, date: NaiveDate, input: &str) -> Result<Post> {
        let (yaml_start, yaml_stop) = frontmatter_indices(input)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;

        Ok(Post {
            slug: slug.to_owned(),
            date,
            title: frontmatter.title,
            series_order: frontmatter.series_order.unwrap_or(0),
            series_id: frontmatter.series_id,
            categories: frontmatter.categories,
            permalink: match frontmatter.permalink {
                Some(permalink) => normalize_permalink(&permalink),
                None => format!("/posts/{}/", slug),
            },
        })
    }
}

/// Locates the frontmatter block between the two `---` fences, returning the
/// start and end offsets of the YAML text.
fn frontmatter_indices(input: &str) -> Result<(usize, usize)> {
    const FENCE: &str = "---";
    if !input.starts_with(FENCE) {
        return Err(Error::FrontmatterMissingStartFence);
    }
    match input[FENCE.len()..].find(FENCE) {
        None => Err(Error::FrontmatterMissingEndFence),
        Some(offset) => Ok((FENCE.len(), FENCE.len() + offset)),
    }
}

/// Ensures a frontmatter-provided permalink has the `/{...}/` shape that the
/// rest of the pipeline assumes.
fn normalize_permalink(permalink: &str) -> String {
    let mut normalized = String::with_capacity(permalink.len() + 2);
    if !permalink.starts_with('/') {
        normalized.push('/');
    }
    normalized.push_str(permalink);
    if !permalink.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

#[derive(Deserialize)]
struct Frontmatter {
    /// The title of the post.
    pub title: String,

    /// The series identifier, if the post belongs to a series.
    #[serde(default, rename = "seriesId")]
    pub series_id: Option<String>,

    /// The post's position within its series.
    #[serde(default, rename = "seriesOrder")]
    pub series_order: Option<i64>,

    /// The categories associated with the post.
    #[serde(default)]
    pub categories: Vec<String>,

    /// An explicit permalink overriding the `/posts/{slug}/` default.
    #[serde(default)]
    pub permalink: Option<String>,
}

const MARKDOWN_EXTENSION: &str = ".md";

/// Splits a post file's base name (no extension) into its date prefix and
/// slug. Returns `None` when the name doesn't match `YYYY-MM-DD-{slug}`.
fn split_date_prefix(base_name: &str) -> Option<(NaiveDate, &str)> {
    const PREFIX_LEN: usize = "YYYY-MM-DD-".len();
    if base_name.len() <= PREFIX_LEN
        || !base_name.is_char_boundary(PREFIX_LEN - 1)
        || !base_name.is_char_boundary(PREFIX_LEN)
    {
        return None;
    }
    if &base_name[PREFIX_LEN - 1..PREFIX_LEN] != "-" {
        return None;
    }
    let date = NaiveDate::parse_from_str(&base_name[..PREFIX_LEN - 1], "%Y-%m-%d").ok()?;
    Some((date, &base_name[PREFIX_LEN..]))
}

/// Scans `source_directory` for post files (extension = `.md`) and returns
/// the parsed [`Post`]s sorted by date (most recent first; ties broken by
/// slug so output is deterministic). A `.md` file whose name is missing the
/// `YYYY-MM-DD-` prefix, or whose frontmatter doesn't parse, is logged as a
/// warning and skipped.
pub fn parse_posts(source_directory: &Path) -> Result<Vec<Post>> {
    use std::io::Read;

    let mut posts = Vec::new();
    for result in read_dir(source_directory)? {
        let entry = result?;
        let os_file_name = entry.file_name();
        let file_name = os_file_name.to_string_lossy();
        if !file_name.ends_with(MARKDOWN_EXTENSION) {
            continue;
        }

        let base_name = file_name.trim_end_matches(MARKDOWN_EXTENSION);
        let (date, slug) = match split_date_prefix(base_name) {
            Some(parts) => parts,
            None => {
                tracing::warn!(
                    "skipping `{}`: file name is not `YYYY-MM-DD-{{slug}}.md`",
                    file_name,
                );
                continue;
            }
        };

        let mut contents = String::new();
        File::open(entry.path())?.read_to_string(&mut contents)?;
        match Post::from_parts(slug, date, &contents) {
            Ok(post) => posts.push(post),
            Err(e) => {
                tracing::warn!("skipping `{}`: {}", file_name, e);
            }
        }
    }

    posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
    Ok(posts)
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one
    /// was missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Post must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_split_date_prefix() {
        let (date, slug) = split_date_prefix("2013-05-14-thinking-in-types").unwrap();
        assert_eq!(date, NaiveDate::from_ymd(2013, 5, 14));
        assert_eq!(slug, "thinking-in-types");
    }

    #[test]
    fn test_split_date_prefix_rejects_undated() {
        assert!(split_date_prefix("about").is_none());
        assert!(split_date_prefix("2013-05-14").is_none());
        assert!(split_date_prefix("2013-99-99-bad-date").is_none());
    }

    #[test]
    fn test_from_parts() -> Result<()> {
        let post = Post::from_parts(
            "thinking-in-types",
            NaiveDate::from_ymd(2013, 5, 14),
            concat!(
                "---\n",
                "title: Thinking in types\n",
                "seriesId: Designing with types\n",
                "seriesOrder: 2\n",
                "categories: [types, design]\n",
                "---\n",
                "Body.\n",
            ),
        )?;

        assert_eq!(
            post,
            Post {
                slug: String::from("thinking-in-types"),
                date: NaiveDate::from_ymd(2013, 5, 14),
                title: String::from("Thinking in types"),
                series_id: Some(String::from("Designing with types")),
                series_order: 2,
                categories: vec![String::from("types"), String::from("design")],
                permalink: String::from("/posts/thinking-in-types/"),
            }
        );
        Ok(())
    }

    #[test]
    fn test_from_parts_permalink_override() -> Result<()> {
        let post = Post::from_parts(
            "why-use-fsharp",
            NaiveDate::from_ymd(2012, 4, 1),
            "---\ntitle: Why use F#?\npermalink: why-use-fsharp\n---\n",
        )?;
        assert_eq!(post.permalink, "/why-use-fsharp/");
        Ok(())
    }

    #[test]
    fn test_from_parts_missing_fence() {
        match Post::from_parts("x", NaiveDate::from_ymd(2020, 1, 1), "title: X\n") {
            Err(Error::FrontmatterMissingStartFence) => (),
            other => panic!("wanted missing start fence, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_parse_posts_skips_undated() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_file(
            &dir.path().join("2020-01-02-second.md"),
            "---\ntitle: Second\n---\n",
        )?;
        write_file(
            &dir.path().join("2020-01-01-first.md"),
            "---\ntitle: First\n---\n",
        )?;
        write_file(&dir.path().join("draft.md"), "---\ntitle: Draft\n---\n")?;
        write_file(&dir.path().join("notes.txt"), "not a post")?;

        let posts = parse_posts(dir.path())?;
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["second", "first"]);
        Ok(())
    }

    #[test]
    fn test_parse_posts_skips_bad_frontmatter() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_file(
            &dir.path().join("2020-01-01-good.md"),
            "---\ntitle: Good\n---\n",
        )?;
        write_file(&dir.path().join("2020-01-02-bad.md"), "no fence here")?;

        let posts = parse_posts(dir.path())?;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "good");
        Ok(())
    }

    fn write_file(path: &std::path::Path, contents: &str) -> std::io::Result<()> {
        File::create(path)?.write_all(contents.as_bytes())
    }
}
