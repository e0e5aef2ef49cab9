use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use stratus_types::{epoch, is_relative_segment, SEPARATOR};
use tracing::warn;
use walkdir::WalkDir;

use crate::config::ListerConfig;
use crate::error::{ListingError, ListingResult};
use crate::paginate::paginate;
use crate::request::{ContainerEntry, ContainerOutcome, ListRequest, ObjectEntry, PageOutcome};
use crate::traits::PageSource;

/// Object store view of a local directory.
///
/// Each sub-directory of the root is a bucket. Files below a bucket are
/// objects keyed by their `/`-separated relative path; directories appear as
/// `<dir>/` marker objects, so empty directories still show up as prefixes.
/// Entries whose names are not valid UTF-8 are skipped.
#[derive(Clone, Debug)]
pub struct LocalDirSource {
    root: PathBuf,
    config: ListerConfig,
}

impl LocalDirSource {
    pub fn new(root: impl Into<PathBuf>, config: ListerConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Collect object entries below `bucket_dir` relevant to `request`,
    /// sorted by key.
    fn collect(&self, bucket_dir: &Path, request: &ListRequest) -> ListingResult<Vec<ObjectEntry>> {
        // Only the directory holding the prefix needs walking.
        let prefix_dir = match request.prefix.rfind(SEPARATOR) {
            Some(idx) => &request.prefix[..idx],
            None => "",
        };
        let walk_root = bucket_dir.join(prefix_dir);
        if !walk_root.is_dir() {
            return Ok(Vec::new());
        }

        let mut walker = WalkDir::new(&walk_root).min_depth(1);
        if !request.delimiter.is_empty() {
            // Deeper entries would only be rolled up into these.
            walker = walker.max_depth(1);
        }

        let mut entries = Vec::new();
        for entry in walker {
            let entry = entry?;
            let Some(mut key) = relative_key(bucket_dir, entry.path()) else {
                warn!(path = %entry.path().display(), "skipping non UTF-8 path");
                continue;
            };
            let metadata = entry.metadata()?;
            let last_modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| epoch());
            let size = if metadata.is_dir() {
                key.push(SEPARATOR);
                0
            } else {
                i64::try_from(metadata.len()).unwrap_or(i64::MAX)
            };
            entries.push(ObjectEntry::new(key, size, last_modified));
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}

/// `/`-joined path of `path` relative to `base`.
fn relative_key(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    let separator = SEPARATOR.to_string();
    Some(parts?.join(separator.as_str()))
}

/// Returns `true` if joining the request's bucket and prefix onto the root
/// could leave it.
fn escapes_root(request: &ListRequest) -> bool {
    let bucket = request.bucket.as_str();
    if bucket.is_empty() || bucket.contains(SEPARATOR) || is_relative_segment(bucket) {
        return true;
    }
    request.prefix.starts_with(SEPARATOR)
        || request.prefix.split(SEPARATOR).any(is_relative_segment)
}

impl PageSource for LocalDirSource {
    fn list_containers(&self) -> ListingResult<ContainerOutcome> {
        let mut containers = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                warn!(path = %entry.path().display(), "skipping non UTF-8 bucket name");
                continue;
            };
            let created = entry
                .metadata()?
                .created()
                .ok()
                .map(DateTime::<Utc>::from);
            containers.push(ContainerEntry { name, created });
        }
        containers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(ContainerOutcome::Containers(containers))
    }

    fn fetch_page(&self, request: &ListRequest) -> ListingResult<PageOutcome> {
        if escapes_root(request) {
            return Err(ListingError::InvalidScope(format!(
                "relative segment in /{}/{}",
                request.bucket, request.prefix
            )));
        }
        let bucket_dir = self.root.join(&request.bucket);
        if !bucket_dir.is_dir() {
            return Err(ListingError::ContainerMissing(request.bucket.clone()));
        }
        let entries = self.collect(&bucket_dir, request)?;
        Ok(PageOutcome::Page(paginate(
            &entries,
            request,
            self.config.effective_page_size(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lister::Lister;
    use stratus_types::{ListingScope, ResourcePath};

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("photos/2024/summer")).unwrap();
        fs::create_dir_all(root.join("photos/empty")).unwrap();
        fs::create_dir_all(root.join("music")).unwrap();
        fs::write(root.join("photos/cover.jpg"), b"0123456789").unwrap();
        fs::write(root.join("photos/2024/a.jpg"), b"a").unwrap();
        fs::write(root.join("photos/2024/summer/b.jpg"), b"bb").unwrap();
        fs::write(root.join("stray.txt"), b"not a bucket").unwrap();
        dir
    }

    fn list(source: &LocalDirSource, path: &str) -> Vec<(String, bool, i64)> {
        let scope = ListingScope::from_path(ResourcePath::parse(path).unwrap());
        Lister::new(source, scope)
            .unwrap()
            .map(|d| {
                let d = d.unwrap();
                (d.path.to_string(), d.is_container, d.size)
            })
            .collect()
    }

    #[test]
    fn buckets_are_directories() {
        let dir = fixture();
        let source = LocalDirSource::new(dir.path(), ListerConfig::default());
        let got: Vec<String> = list(&source, "/").into_iter().map(|(p, _, _)| p).collect();
        assert_eq!(got, vec!["/music/", "/photos/"]);
    }

    #[test]
    fn bucket_top_level() {
        let dir = fixture();
        let source = LocalDirSource::new(dir.path(), ListerConfig::default());
        assert_eq!(
            list(&source, "/photos/"),
            vec![
                ("/photos/cover.jpg".to_string(), false, 10),
                ("/photos/2024/".to_string(), true, 0),
                ("/photos/empty/".to_string(), true, 0),
            ]
        );
    }

    #[test]
    fn nested_prefix() {
        let dir = fixture();
        let source = LocalDirSource::new(dir.path(), ListerConfig::default());
        assert_eq!(
            list(&source, "/photos/2024"),
            vec![
                ("/photos/2024/a.jpg".to_string(), false, 1),
                ("/photos/2024/summer/".to_string(), true, 0),
            ]
        );
    }

    #[test]
    fn paging_over_directory() {
        let dir = fixture();
        let source = LocalDirSource::new(dir.path(), ListerConfig::default().with_page_size(1));
        let scope = ListingScope::Container(ResourcePath::bucket("photos"));
        let mut lister = Lister::new(&source, scope).unwrap();
        let count = lister.by_ref().filter(|d| d.is_ok()).count();
        assert_eq!(count, 3);
        assert_eq!(lister.pages_fetched(), 3);
    }

    #[test]
    fn missing_prefix_is_empty() {
        let dir = fixture();
        let source = LocalDirSource::new(dir.path(), ListerConfig::default());
        assert!(list(&source, "/music/nothing/").is_empty());
    }

    #[test]
    fn relative_segments_stay_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("store");
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(dir.path().join("secret.txt"), b"outside").unwrap();
        let source = LocalDirSource::new(&root, ListerConfig::default());

        for path in [
            ResourcePath::object("b", "../../"),
            ResourcePath::object("b", "x/../../"),
            ResourcePath::object("b", "/tmp/"),
            ResourcePath::bucket(".."),
        ] {
            let scope = ListingScope::Container(path.clone());
            let mut lister = Lister::new(&source, scope).unwrap();
            assert!(
                matches!(lister.next(), Some(Err(ListingError::InvalidScope(_)))),
                "{path} listed outside the root"
            );
            assert!(lister.next().is_none());
        }
    }

    #[test]
    fn missing_bucket_is_an_error() {
        let dir = fixture();
        let source = LocalDirSource::new(dir.path(), ListerConfig::default());
        let scope = ListingScope::Container(ResourcePath::bucket("video"));
        let mut lister = Lister::new(&source, scope).unwrap();
        assert!(matches!(lister.next(), Some(Err(ListingError::ContainerMissing(_)))));
    }
}
