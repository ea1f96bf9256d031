//! Memoization of classification results per settings snapshot.
//!
//! Values are write-once: for a given `(namespace, snapshot, key)` the
//! computation runs at most once, also under concurrent access, and later
//! lookups share the stored [`Arc`].

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::dependency::{FileInfo, ImportInfo};
use crate::element::ElementInfo;
use crate::settings::SnapshotId;

/// Cache partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Classification of referring files.
    Files,
    /// Classification of import specifiers.
    Imports,
    /// Raw path classification.
    Elements,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Files => "file",
            Self::Imports => "import",
            Self::Elements => "element",
        })
    }
}

type Partition<V> = HashMap<Option<String>, Arc<V>>;

/// One namespace: a write-once map per snapshot.
///
/// `None` is a valid key.
pub struct SnapshotCache<V> {
    namespace: Namespace,
    partitions: RwLock<HashMap<SnapshotId, Partition<V>>>,
    computations: AtomicUsize,
}

impl<V> SnapshotCache<V> {
    /// Creates an empty namespace.
    #[must_use]
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            partitions: RwLock::new(HashMap::new()),
            computations: AtomicUsize::new(0),
        }
    }

    /// Namespace this cache holds.
    #[must_use]
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Returns the stored value, if any.
    #[must_use]
    pub fn load(&self, snapshot: SnapshotId, key: Option<&str>) -> Option<Arc<V>> {
        let partitions = self
            .partitions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        partitions
            .get(&snapshot)?
            .get(&key.map(ToString::to_string))
            .cloned()
    }

    /// Stores `value` unless the key already holds one; returns the stored value.
    pub fn save(&self, snapshot: SnapshotId, key: Option<&str>, value: V) -> Arc<V> {
        let mut partitions = self
            .partitions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            partitions
                .entry(snapshot)
                .or_default()
                .entry(key.map(ToString::to_string))
                .or_insert_with(|| Arc::new(value)),
        )
    }

    /// Returns the stored value or computes, stores and returns it.
    ///
    /// `compute` runs at most once per key; concurrent callers for the same
    /// key wait for the first computation.
    pub fn get_or_compute(
        &self,
        snapshot: SnapshotId,
        key: Option<&str>,
        compute: impl FnOnce() -> V,
    ) -> Arc<V> {
        if let Some(value) = self.load(snapshot, key) {
            return value;
        }
        let mut partitions = self
            .partitions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let partition = partitions.entry(snapshot).or_default();
        let owned_key = key.map(ToString::to_string);
        if let Some(value) = partition.get(&owned_key) {
            return Arc::clone(value);
        }
        self.computations.fetch_add(1, Ordering::Relaxed);
        let value = Arc::new(compute());
        partition.insert(owned_key, Arc::clone(&value));
        value
    }

    /// Number of computations run through [`Self::get_or_compute`].
    #[must_use]
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }

    /// Number of entries stored for `snapshot`.
    #[must_use]
    pub fn len(&self, snapshot: SnapshotId) -> usize {
        self.partitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&snapshot)
            .map_or(0, HashMap::len)
    }
}

impl<V> fmt::Debug for SnapshotCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("namespace", &self.namespace)
            .field("computations", &self.computations())
            .finish_non_exhaustive()
    }
}

/// The three classification namespaces.
#[derive(Debug)]
pub struct ClassificationCache {
    /// Referring files.
    pub files: SnapshotCache<FileInfo>,
    /// Import specifiers.
    pub imports: SnapshotCache<ImportInfo>,
    /// Raw paths.
    pub elements: SnapshotCache<ElementInfo>,
}

impl ClassificationCache {
    /// Creates empty namespaces.
    #[must_use]
    pub fn new() -> Self {
        Self {
            files: SnapshotCache::new(Namespace::Files),
            imports: SnapshotCache::new(Namespace::Imports),
            elements: SnapshotCache::new(Namespace::Elements),
        }
    }
}

impl Default for ClassificationCache {
    fn default() -> Self {
        Self::new()
    }
}
