//! The library code for the `sitedata` data-file generator. The architecture
//! can be generally broken down into two distinct steps:
//!
//! 1. Scanning posts from source files on disk ([`crate::post`])
//! 2. Grouping the posts and emitting derived data files
//!    ([`crate::series`], [`crate::archive`], [`crate::sitemap`])
//!
//! The first step walks a directory of `YYYY-MM-DD-{slug}.md` files and
//! parses each file's `---`-fenced YAML frontmatter into a [`post::Post`]
//! record; malformed files are logged and skipped. The second step groups
//! the posts two ways: into named series (posts sharing a `seriesId`,
//! ordered by `seriesOrder`, each linked to its previous/next sibling) and
//! into year/month archives. The groupings are emitted as `series.yaml`,
//! `seriesIndex.yaml`, and `archives.yaml`, and every post and page
//! contributes a `<url>` entry to `sitemap.xml`. All four outputs are
//! consumed by an external static-site generator.
//!
//! [`build::generate`] stitches the steps together; [`config::Config`]
//! locates the project file and resolves the directories involved.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod archive;
pub mod build;
pub mod config;
pub mod post;
pub mod series;
pub mod sitemap;
