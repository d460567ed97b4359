//! Loads the project configuration. The project file (`sitedata.yaml`) is
//! discovered by searching the starting directory and its parents, the same
//! way build tools discover their manifests, so the tool can be invoked from
//! anywhere inside a project tree.

use std::{
    fmt,
    fs::File,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use url::Url;

/// The name of the project file searched for in parent directories.
pub const PROJECT_FILE_NAME: &str = "sitedata.yaml";

/// The project file as written by the user. Paths are relative to the
/// project root (the directory containing `sitedata.yaml`).
#[derive(Deserialize)]
struct Project {
    /// The absolute root URL of the published site, e.g.
    /// `https://example.org/`.
    site_root: Url,

    /// The directory holding post source files.
    #[serde(default = "Project::default_posts_directory")]
    posts_directory: PathBuf,

    /// The directory holding page source files, if any.
    #[serde(default)]
    pages_directory: Option<PathBuf>,

    /// The directory the data files are written into.
    #[serde(default = "Project::default_data_directory")]
    data_directory: PathBuf,
}

impl Project {
    fn default_posts_directory() -> PathBuf {
        PathBuf::from("_posts")
    }

    fn default_data_directory() -> PathBuf {
        PathBuf::from("_data")
    }
}

/// The resolved configuration consumed by [`crate::build::generate`]. All
/// paths are absolute (joined onto the project root).
pub struct Config {
    /// The directory scanned for `YYYY-MM-DD-{slug}.md` post files.
    pub posts_source_directory: PathBuf,

    /// The directory walked (recursively) for page files to include in the
    /// sitemap, if the project has one.
    pub pages_source_directory: Option<PathBuf>,

    /// The directory into which `series.yaml`, `seriesIndex.yaml`,
    /// `archives.yaml`, and `sitemap.xml` are written.
    pub output_directory: PathBuf,

    /// The absolute root URL all emitted permalinks are joined onto.
    pub site_root: Url,
}

impl Config {
    /// Searches `dir` and its parent directories for a
    /// [`PROJECT_FILE_NAME`] file and loads it. `output_directory`
    /// overrides the project file's `data_directory` when provided.
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let path = dir.join(PROJECT_FILE_NAME);
        if path.exists() {
            Config::from_project_file(&path, output_directory)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory),
                None => Err(Error::ProjectFileNotFound),
            }
        }
    }

    /// Loads the configuration from an explicit project file path.
    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::OpenProjectFile {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = serde_yaml::from_reader(file)?;
        let project_root = path.parent().ok_or(Error::ProjectFileNotFound)?;
        Ok(Config {
            posts_source_directory: project_root.join(&project.posts_directory),
            pages_source_directory: project
                .pages_directory
                .as_ref()
                .map(|pages| project_root.join(pages)),
            output_directory: match output_directory {
                Some(output) => output.to_owned(),
                None => project_root.join(&project.data_directory),
            },
            site_root: project.site_root,
        })
    }
}

/// The result of loading the configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when no `sitedata.yaml` exists in the starting directory or
    /// any of its parents.
    ProjectFileNotFound,

    /// Returned for I/O problems opening the project file.
    OpenProjectFile { path: PathBuf, err: std::io::Error },

    /// Returned when there was an error parsing the project file as YAML.
    DeserializeYaml(serde_yaml::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ProjectFileNotFound => write!(
                f,
                "Could not find `{}` in any parent directory",
                PROJECT_FILE_NAME,
            ),
            Error::OpenProjectFile { path, err } => {
                write!(f, "Opening project file '{}': {}", path.display(), err)
            }
            Error::DeserializeYaml(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ProjectFileNotFound => None,
            Error::OpenProjectFile { path: _, err } => Some(err),
            Error::DeserializeYaml(err) => Some(err),
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

#[cfg(test)]
mod test {
    use std::{fs, io::Write};

    use super::*;

    #[test]
    fn test_from_directory_finds_parent_project_file() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("_posts/nested")).unwrap();
        fs::File::create(dir.path().join(PROJECT_FILE_NAME))
            .unwrap()
            .write_all(b"site_root: https://example.org/\n")
            .unwrap();

        let config = Config::from_directory(&dir.path().join("_posts/nested"), None)?;
        assert_eq!(
            config.posts_source_directory,
            dir.path().join("_posts"),
        );
        assert_eq!(config.output_directory, dir.path().join("_data"));
        assert_eq!(config.pages_source_directory, None);
        assert_eq!(config.site_root.as_str(), "https://example.org/");
        Ok(())
    }

    #[test]
    fn test_from_project_file_overrides() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_FILE_NAME);
        fs::File::create(&path)
            .unwrap()
            .write_all(
                concat!(
                    "site_root: https://example.org/\n",
                    "posts_directory: content/posts\n",
                    "pages_directory: content/pages\n",
                    "data_directory: generated\n",
                )
                .as_bytes(),
            )
            .unwrap();

        let config = Config::from_project_file(&path, Some(Path::new("/tmp/out")))?;
        assert_eq!(
            config.posts_source_directory,
            dir.path().join("content/posts"),
        );
        assert_eq!(
            config.pages_source_directory,
            Some(dir.path().join("content/pages")),
        );
        assert_eq!(config.output_directory, Path::new("/tmp/out"));
        Ok(())
    }

    #[test]
    fn test_from_directory_not_found() {
        let dir = tempfile::tempdir().unwrap();
        match Config::from_directory(dir.path(), None) {
            Err(Error::ProjectFileNotFound) => (),
            other => panic!("wanted ProjectFileNotFound, got {:?}", other.map(|_| ())),
        }
    }
}
