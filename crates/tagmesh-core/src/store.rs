use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, TagMeshError};

/// One stored document: its id (the file name) and raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    pub id: String,
    pub bytes: Vec<u8>,
}

/// Where item documents live. Ids are bare file names.
pub trait ContentStore: Send + Sync + std::fmt::Debug {
    /// Fails with [`TagMeshError::NotFound`] for unknown ids.
    fn fetch_raw(&self, id: &str) -> Result<Vec<u8>>;

    /// Every document, sorted by id.
    fn fetch_all(&self) -> Result<Vec<RawObject>>;

    fn put_raw(&self, id: &str, bytes: &[u8]) -> Result<()>;
}

fn ensure_plain_file_name(id: &str) -> Result<()> {
    let plain = !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\'])
        && Path::new(id)
            .file_name()
            .is_some_and(|name| name == OsStr::new(id));
    if plain {
        Ok(())
    } else {
        Err(TagMeshError::Validation(format!(
            "content id must be a bare file name: {id}"
        )))
    }
}

/// Documents stored as files anywhere under `root` whose file name matches a glob.
#[derive(Debug, Clone)]
pub struct LocalContentStore {
    root: PathBuf,
    matcher: GlobSet,
}

impl LocalContentStore {
    pub fn new(root: impl Into<PathBuf>, pattern: &str) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        builder.add(Glob::new(pattern).map_err(|e| TagMeshError::Validation(e.to_string()))?);
        let matcher = builder
            .build()
            .map_err(|e| TagMeshError::Validation(e.to_string()))?;
        Ok(Self {
            root: root.into(),
            matcher,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn matching_files(&self) -> Result<Vec<(String, PathBuf)>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry.map_err(|e| TagMeshError::Validation(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || !self.matcher.is_match(&name) {
                continue;
            }
            files.push((name, entry.into_path()));
        }
        files.sort();
        Ok(files)
    }

    fn locate(&self, id: &str) -> Result<Option<PathBuf>> {
        let direct = self.root.join(id);
        if direct.is_file() {
            return Ok(Some(direct));
        }
        Ok(self
            .matching_files()?
            .into_iter()
            .find(|(name, _)| name == id)
            .map(|(_, path)| path))
    }
}

impl ContentStore for LocalContentStore {
    fn fetch_raw(&self, id: &str) -> Result<Vec<u8>> {
        ensure_plain_file_name(id)?;
        let Some(path) = self.locate(id)? else {
            return Err(TagMeshError::NotFound(id.to_string()));
        };
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(TagMeshError::NotFound(id.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn fetch_all(&self) -> Result<Vec<RawObject>> {
        let files = self.matching_files()?;
        let mut objects = Vec::with_capacity(files.len());
        for (id, path) in files {
            let bytes = fs::read(&path)?;
            objects.push(RawObject { id, bytes });
        }
        debug!(root = %self.root.display(), documents = objects.len(), "scanned content root");
        Ok(objects)
    }

    fn put_raw(&self, id: &str, bytes: &[u8]) -> Result<()> {
        ensure_plain_file_name(id)?;
        fs::create_dir_all(&self.root)?;
        let target = self.root.join(id);
        let staging = self.root.join(format!(".{id}.tmp"));
        fs::write(&staging, bytes)?;
        if let Err(err) = fs::rename(&staging, &target) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }
        Ok(())
    }
}

/// In-process store, handy for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryContentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objects<I, K, V>(objects: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        Self {
            objects: RwLock::new(
                objects
                    .into_iter()
                    .map(|(id, bytes)| (id.into(), bytes.into()))
                    .collect(),
            ),
        }
    }
}

fn poisoned() -> TagMeshError {
    TagMeshError::Internal("memory content store lock poisoned".to_string())
}

impl ContentStore for MemoryContentStore {
    fn fetch_raw(&self, id: &str) -> Result<Vec<u8>> {
        let objects = self.objects.read().map_err(|_| poisoned())?;
        objects
            .get(id)
            .cloned()
            .ok_or_else(|| TagMeshError::NotFound(id.to_string()))
    }

    fn fetch_all(&self) -> Result<Vec<RawObject>> {
        let objects = self.objects.read().map_err(|_| poisoned())?;
        Ok(objects
            .iter()
            .map(|(id, bytes)| RawObject {
                id: id.clone(),
                bytes: bytes.clone(),
            })
            .collect())
    }

    fn put_raw(&self, id: &str, bytes: &[u8]) -> Result<()> {
        ensure_plain_file_name(id)?;
        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        objects.insert(id.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn local_store_scans_nested_files_matching_the_glob() {
        let temp = tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("2024")).expect("mkdir");
        fs::write(temp.path().join("b.md"), b"b").expect("write");
        fs::write(temp.path().join("2024").join("a.md"), b"a").expect("write");
        fs::write(temp.path().join("notes.txt"), b"skip").expect("write");
        fs::write(temp.path().join(".hidden.md"), b"skip").expect("write");

        let store = LocalContentStore::new(temp.path(), "*.md").expect("store");
        let all = store.fetch_all().expect("fetch all");
        let ids = all.iter().map(|object| object.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a.md", "b.md"]);
        assert_eq!(store.fetch_raw("a.md").expect("nested"), b"a");
    }

    #[test]
    fn local_store_put_then_fetch() {
        let temp = tempdir().expect("tempdir");
        let store = LocalContentStore::new(temp.path().join("content"), "*.md").expect("store");
        assert!(store.fetch_all().expect("empty root").is_empty());

        store.put_raw("new-post.md", b"hello").expect("put");
        assert_eq!(store.fetch_raw("new-post.md").expect("fetch"), b"hello");
        assert!(!temp.path().join("content").join(".new-post.md.tmp").exists());
    }

    #[test]
    fn local_store_rejects_path_ids_and_reports_missing() {
        let temp = tempdir().expect("tempdir");
        let store = LocalContentStore::new(temp.path(), "*.md").expect("store");
        for id in ["../escape.md", "nested/a.md", "..", ""] {
            let err = store.put_raw(id, b"x").expect_err(id);
            assert!(matches!(err, TagMeshError::Validation(_)), "{id}: {err:?}");
        }
        let err = store.fetch_raw("ghost.md").expect_err("missing");
        assert!(matches!(err, TagMeshError::NotFound(_)));
    }

    #[test]
    fn invalid_glob_is_a_validation_error() {
        let err = LocalContentStore::new("/tmp", "[unclosed").expect_err("bad glob");
        assert!(matches!(err, TagMeshError::Validation(_)));
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryContentStore::with_objects([("b.md", "b"), ("a.md", "a")]);
        store.put_raw("c.md", b"c").expect("put");
        let ids = store
            .fetch_all()
            .expect("all")
            .into_iter()
            .map(|object| object.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["a.md", "b.md", "c.md"]);
        assert!(matches!(
            store.fetch_raw("zzz.md"),
            Err(TagMeshError::NotFound(_))
        ));
    }
}
