/*!
 * Knowledge store holding one document per scene.
 *
 * Documents live in a directory as `<scene>.json` files. The loaded set is kept
 * as an immutable snapshot that readers clone cheaply; a reload builds a fresh
 * snapshot and swaps it in, so readers never observe a partially loaded store.
 */

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use super::model::KnowledgeBase;
use crate::errors::KnowledgeError;

/// Loaded documents keyed by scene id
pub type Snapshot = Arc<BTreeMap<String, KnowledgeBase>>;

/// Directory-backed store of scene documents.
#[derive(Debug)]
pub struct KnowledgeStore {
    /// Directory holding the scene documents
    root: PathBuf,

    /// Current snapshot, replaced wholesale on reload
    snapshot: RwLock<Snapshot>,

    /// Serializes writers inside this process
    write_lock: Mutex<()>,
}

impl KnowledgeStore {
    /// Open a store and load every document in the directory.
    ///
    /// A missing directory yields an empty store.
    pub fn open<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let snapshot = Arc::new(load_directory(&root));
        Self {
            root,
            snapshot: RwLock::new(snapshot),
            write_lock: Mutex::new(()),
        }
    }

    /// Store over an in-memory set of documents, mainly for tests and benches.
    pub fn from_documents<P: AsRef<Path>>(root: P, documents: Vec<KnowledgeBase>) -> Self {
        let map = documents
            .into_iter()
            .map(|kb| (kb.scene.clone(), kb))
            .collect();
        Self {
            root: root.as_ref().to_path_buf(),
            snapshot: RwLock::new(Arc::new(map)),
            write_lock: Mutex::new(()),
        }
    }

    /// Directory backing this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current snapshot of all loaded documents.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.snapshot.read())
    }

    /// Document for a scene, if loaded.
    pub fn get(&self, scene: &str) -> Option<KnowledgeBase> {
        self.snapshot.read().get(scene).cloned()
    }

    /// Ids of every loaded scene.
    pub fn scenes(&self) -> Vec<String> {
        self.snapshot.read().keys().cloned().collect()
    }

    /// Re-read the directory and replace the snapshot.
    pub fn reload(&self) {
        let fresh = Arc::new(load_directory(&self.root));
        debug!("Reloaded knowledge store with {} scene(s)", fresh.len());
        *self.snapshot.write() = fresh;
    }

    /// Path of the document for a scene.
    pub fn scene_path(&self, scene: &str) -> PathBuf {
        self.root.join(format!("{}.json", scene))
    }

    /// Read a scene document straight from disk, bypassing the snapshot.
    pub fn read_document(&self, scene: &str) -> Result<Option<KnowledgeBase>, KnowledgeError> {
        let path = self.scene_path(scene);
        if !path.exists() {
            return Ok(None);
        }
        read_document_file(&path).map(Some)
    }

    /// Atomically replace a scene document on disk.
    ///
    /// The document is written to a temporary file in the same directory and then
    /// renamed over the target. The snapshot is not refreshed.
    pub fn write_document(&self, document: &KnowledgeBase) -> Result<(), KnowledgeError> {
        let _guard = self.write_lock.lock();
        let path = self.scene_path(&document.scene);

        fs::create_dir_all(&self.root).map_err(|source| KnowledgeError::Io {
            path: self.root.display().to_string(),
            source,
        })?;

        let json = serde_json::to_string_pretty(document).map_err(|source| {
            KnowledgeError::Serialize {
                scene: document.scene.clone(),
                source,
            }
        })?;

        let io_err = |source: std::io::Error| KnowledgeError::Io {
            path: path.display().to_string(),
            source,
        };
        let mut temp = NamedTempFile::new_in(&self.root).map_err(io_err)?;
        temp.write_all(json.as_bytes()).map_err(io_err)?;
        temp.as_file().sync_all().map_err(io_err)?;
        temp.persist(&path).map_err(|e| KnowledgeError::Persist {
            path: path.display().to_string(),
            message: e.error.to_string(),
        })?;

        info!("Wrote knowledge base {} ({} expressions)", path.display(), document.expressions.len());
        Ok(())
    }
}

/// Load every `*.json` document directly inside `root`.
///
/// The file stem is the scene id. Unreadable or malformed files are skipped.
fn load_directory(root: &Path) -> BTreeMap<String, KnowledgeBase> {
    let mut documents = BTreeMap::new();
    if !root.is_dir() {
        debug!("Knowledge directory {} does not exist", root.display());
        return documents;
    }

    for entry in WalkDir::new(root).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to read knowledge directory entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("json"));
        if !path.is_file() || !is_json {
            continue;
        }
        let Some(scene) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };

        match read_document_file(path) {
            Ok(document) => {
                documents.insert(scene, document);
            }
            Err(e) => warn!("Skipping knowledge base file: {}", e),
        }
    }

    documents
}

fn read_document_file(path: &Path) -> Result<KnowledgeBase, KnowledgeError> {
    let content = fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| KnowledgeError::Parse {
        path: path.display().to_string(),
        source,
    })
}
