//! Hierarchical naming registry.
//!
//! Paths are `/`-delimited and case-sensitive. Empty segments are
//! ignored, so `ejb//Cart` and `/ejb/Cart` both name `ejb/Cart`.
//!
//! ```text
//! (root)
//! ├── ejb
//! │   └── CartLocalHome      → Bound(value)
//! └── java:comp
//!     └── env
//!         └── ejb
//!             └── CartHome   → Bound(value)
//! ```
//!
//! Intermediate contexts are created on bind and pruned on unbind once
//! they hold nothing.

use crate::NamingError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::debug;

type Children<V> = BTreeMap<String, Node<V>>;

enum Node<V> {
    Bound(V),
    Context(Children<V>),
}

/// Kind of a child in a context listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Context,
    Binding,
}

/// One child of a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// Result of [`NamingRegistry::lookup`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<V> {
    /// The path names a bound value.
    Bound(V),
    /// The path names a context; its children, sorted by name.
    Context(Vec<ListEntry>),
}

impl<V> Lookup<V> {
    /// Returns the bound value, if this is a leaf.
    pub fn into_bound(self) -> Option<V> {
        match self {
            Self::Bound(v) => Some(v),
            Self::Context(_) => None,
        }
    }
}

/// Hierarchical bind/lookup store.
///
/// # Concurrency
///
/// Internally synchronised with a reader/writer lock: `lookup`, `list`
/// and `paths` share the lock; `bind`, `unbind`, `bind_all` and
/// `unbind_all` take it exclusively. [`bind_all`](Self::bind_all) holds
/// the write lock for the whole batch, so readers never observe a
/// partially applied deployment.
///
/// # Example
///
/// ```
/// use tinybean_naming::{Lookup, NamingRegistry};
///
/// let registry = NamingRegistry::new();
/// registry.bind("ejb/CartLocalHome", 1).unwrap();
///
/// assert_eq!(registry.lookup("ejb/CartLocalHome").unwrap(), Lookup::Bound(1));
/// assert!(matches!(registry.lookup("ejb").unwrap(), Lookup::Context(_)));
/// assert!(registry.unbind("ejb/CartLocalHome"));
/// assert!(registry.is_empty());
/// ```
pub struct NamingRegistry<V> {
    root: RwLock<Children<V>>,
}

impl<V> NamingRegistry<V> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: RwLock::new(BTreeMap::new()),
        }
    }

    /// Binds `value` at `path`, creating intermediate contexts.
    ///
    /// # Errors
    ///
    /// - [`NamingError::InvalidName`] if `path` has no segments
    /// - [`NamingError::DuplicateBinding`] if `path` is already bound
    ///   (as a value or as a context)
    /// - [`NamingError::NotAContext`] if a parent segment is a value
    pub fn bind(&self, path: &str, value: V) -> Result<(), NamingError> {
        let mut root = self.root.write();
        bind_in(&mut root, path, value)?;
        debug!(path = %canonical(path), "Bound name");
        Ok(())
    }

    /// Binds every entry or none.
    ///
    /// Entries are applied in order under one exclusive lock; on the
    /// first failure, entries already bound by this call are removed
    /// and the error is returned. Returns the number of bindings made.
    ///
    /// # Errors
    ///
    /// The first error [`bind`](Self::bind) would have produced.
    pub fn bind_all<I>(&self, entries: I) -> Result<usize, NamingError>
    where
        I: IntoIterator<Item = (String, V)>,
    {
        let mut root = self.root.write();
        let mut done: Vec<String> = Vec::new();

        for (path, value) in entries {
            if let Err(e) = bind_in(&mut root, &path, value) {
                for bound in &done {
                    remove_path(&mut root, &segments(bound));
                }
                debug!(path = %path, rolled_back = done.len(), "Batch bind failed");
                return Err(e);
            }
            done.push(path);
        }

        debug!(count = done.len(), "Batch bound names");
        Ok(done.len())
    }

    /// Removes the value bound at `path`.
    ///
    /// Returns `true` if a value was removed. Unbinding an absent name,
    /// or a path that names a context, is a no-op returning `false`.
    pub fn unbind(&self, path: &str) -> bool {
        let removed = remove_path(&mut self.root.write(), &segments(path));
        if removed {
            debug!(path = %canonical(path), "Unbound name");
        }
        removed
    }

    /// Unbinds every path, returning how many values were removed.
    pub fn unbind_all<'a, I>(&self, paths: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut root = self.root.write();
        paths
            .into_iter()
            .filter(|p| remove_path(&mut root, &segments(p)))
            .count()
    }

    /// Lists the children of the context at `path` (root for `""`).
    ///
    /// # Errors
    ///
    /// - [`NamingError::NameNotFound`] if the path is unbound
    /// - [`NamingError::NotAContext`] if the path names a value
    pub fn list(&self, path: &str) -> Result<Vec<ListEntry>, NamingError> {
        let root = self.root.read();
        let segs = segments(path);
        match find(&root, &segs) {
            Some(Found::Context(children)) => Ok(listing(children)),
            Some(Found::Bound(_)) => Err(NamingError::NotAContext {
                path: canonical(path),
                segment: segs.last().map(|s| s.to_string()).unwrap_or_default(),
            }),
            None => Err(NamingError::NameNotFound {
                path: canonical(path),
            }),
        }
    }

    /// All bound paths, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        let root = self.root.read();
        let mut out = Vec::new();
        collect_paths(&root, &mut Vec::new(), &mut out);
        out
    }

    /// Number of bound values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths().len()
    }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.read().is_empty()
    }

    /// Removes every binding and context.
    pub fn clear(&self) {
        self.root.write().clear();
    }

    /// Read-only handle for clients that must not bind or unbind.
    #[must_use]
    pub fn view(&self) -> RegistryView<'_, V> {
        RegistryView { registry: self }
    }
}

impl<V: Clone> NamingRegistry<V> {
    /// Looks up `path`.
    ///
    /// A full path returns [`Lookup::Bound`]; a partial path returns the
    /// context listing. The empty path names the root context.
    ///
    /// # Errors
    ///
    /// [`NamingError::NameNotFound`] if the path is unbound or passes
    /// through a bound value.
    pub fn lookup(&self, path: &str) -> Result<Lookup<V>, NamingError> {
        let root = self.root.read();
        match find(&root, &segments(path)) {
            Some(Found::Bound(value)) => Ok(Lookup::Bound(value.clone())),
            Some(Found::Context(children)) => Ok(Lookup::Context(listing(children))),
            None => Err(NamingError::NameNotFound {
                path: canonical(path),
            }),
        }
    }

    /// Looks up a bound value, rejecting contexts.
    ///
    /// # Errors
    ///
    /// [`NamingError::NameNotFound`] as for [`lookup`](Self::lookup), or
    /// [`NamingError::NotABinding`] if the path names a context.
    pub fn lookup_bound(&self, path: &str) -> Result<V, NamingError> {
        match self.lookup(path)? {
            Lookup::Bound(value) => Ok(value),
            Lookup::Context(_) => Err(NamingError::NotABinding {
                path: canonical(path),
            }),
        }
    }
}

impl<V> Default for NamingRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for NamingRegistry<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamingRegistry")
            .field("paths", &self.paths())
            .finish()
    }
}

/// Read-only view of a [`NamingRegistry`].
///
/// Exposes lookups and listings only; binding stays with the owner.
pub struct RegistryView<'a, V> {
    registry: &'a NamingRegistry<V>,
}

impl<V> RegistryView<'_, V> {
    /// See [`NamingRegistry::list`].
    ///
    /// # Errors
    ///
    /// As [`NamingRegistry::list`].
    pub fn list(&self, path: &str) -> Result<Vec<ListEntry>, NamingError> {
        self.registry.list(path)
    }

    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.registry.paths()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

impl<V: Clone> RegistryView<'_, V> {
    /// See [`NamingRegistry::lookup`].
    ///
    /// # Errors
    ///
    /// As [`NamingRegistry::lookup`].
    pub fn lookup(&self, path: &str) -> Result<Lookup<V>, NamingError> {
        self.registry.lookup(path)
    }
}

impl<V> std::fmt::Debug for RegistryView<'_, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self.registry, f)
    }
}

/// Splits a path into its non-empty segments.
fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Normalised form of a path (`/a//b/` → `a/b`).
pub fn canonical(path: &str) -> String {
    segments(path).join("/")
}

fn bind_in<V>(root: &mut Children<V>, path: &str, value: V) -> Result<(), NamingError> {
    let segs = segments(path);
    let Some((last, parents)) = segs.split_last() else {
        return Err(NamingError::InvalidName {
            path: path.to_string(),
        });
    };

    let mut current = root;
    for seg in parents {
        let node = current
            .entry((*seg).to_string())
            .or_insert_with(|| Node::Context(BTreeMap::new()));
        current = match node {
            Node::Context(children) => children,
            Node::Bound(_) => {
                return Err(NamingError::NotAContext {
                    path: canonical(path),
                    segment: (*seg).to_string(),
                })
            }
        };
    }

    match current.entry((*last).to_string()) {
        Entry::Occupied(_) => Err(NamingError::DuplicateBinding {
            path: canonical(path),
        }),
        Entry::Vacant(slot) => {
            slot.insert(Node::Bound(value));
            Ok(())
        }
    }
}

enum Found<'a, V> {
    Bound(&'a V),
    Context(&'a Children<V>),
}

fn find<'a, V>(root: &'a Children<V>, segs: &[&str]) -> Option<Found<'a, V>> {
    let mut children = root;
    for (i, seg) in segs.iter().enumerate() {
        match children.get(*seg)? {
            Node::Bound(value) if i + 1 == segs.len() => return Some(Found::Bound(value)),
            // A value in the middle of the path: nothing lies below it.
            Node::Bound(_) => return None,
            Node::Context(next) => children = next,
        }
    }
    Some(Found::Context(children))
}

fn remove_path<V>(children: &mut Children<V>, segs: &[&str]) -> bool {
    let Some((first, rest)) = segs.split_first() else {
        return false;
    };

    if rest.is_empty() {
        if matches!(children.get(*first), Some(Node::Bound(_))) {
            children.remove(*first);
            return true;
        }
        return false;
    }

    let (removed, now_empty) = match children.get_mut(*first) {
        Some(Node::Context(sub)) => {
            let removed = remove_path(sub, rest);
            (removed, sub.is_empty())
        }
        _ => (false, false),
    };
    if removed && now_empty {
        children.remove(*first);
    }
    removed
}

fn listing<V>(children: &Children<V>) -> Vec<ListEntry> {
    children
        .iter()
        .map(|(name, node)| ListEntry {
            name: name.clone(),
            kind: match node {
                Node::Bound(_) => EntryKind::Binding,
                Node::Context(_) => EntryKind::Context,
            },
        })
        .collect()
}

fn collect_paths<V>(children: &Children<V>, prefix: &mut Vec<String>, out: &mut Vec<String>) {
    for (name, node) in children {
        prefix.push(name.clone());
        match node {
            Node::Bound(_) => out.push(prefix.join("/")),
            Node::Context(sub) => collect_paths(sub, prefix, out),
        }
        prefix.pop();
    }
}
