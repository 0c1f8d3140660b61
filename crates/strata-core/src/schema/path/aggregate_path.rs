use super::{ColumnInfo, TableInfo};
use crate::schema::mapping::{ContextInner, MappingContext, Settings};
use crate::schema::{PersistentEntity, PersistentProperty, SqlIdentifier};
use crate::{Error, Result};

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, OnceLock, PoisonError, Weak},
};
use tracing::debug;

/// A property path starting at an aggregate root.
///
/// Paths are created through the mapping context and cached there: asking
/// twice for the same path returns the same instance. Equality, hashing and
/// ordering are structural, by root entity name and then property names.
#[derive(Clone)]
pub struct AggregatePath(Arc<PathInner>);

struct PathInner {
    context: Weak<ContextInner>,

    settings: Arc<Settings>,

    root: Arc<PersistentEntity>,

    /// Properties from the root down to the leaf
    segments: Vec<Arc<PersistentProperty>>,

    /// Dotted property names; empty for the root
    dot_path: String,

    parent: Option<AggregatePath>,

    /// The root entity, or the entity targeted by the leaf property
    leaf_entity: Option<Arc<PersistentEntity>>,

    /// Nearest ancestor whose table stores this path. `None` when this path
    /// owns its table.
    table_owner: Option<AggregatePath>,

    table_info: OnceLock<Result<TableInfo>>,

    column_info: OnceLock<Result<ColumnInfo>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct PathKey {
    root: String,
    dot_path: String,
}

impl MappingContext {
    /// The path of length zero for the aggregate rooted at `entity`.
    pub fn root_path(&self, entity: &str) -> Result<AggregatePath> {
        let key = PathKey {
            root: entity.to_string(),
            dot_path: String::new(),
        };

        if let Some(path) = self.inner.cached_path(&key) {
            return Ok(path);
        }

        let root = self.entity(entity)?;
        let path = AggregatePath(Arc::new(PathInner {
            context: Arc::downgrade(&self.inner),
            settings: self.inner.settings.clone(),
            root: root.clone(),
            segments: vec![],
            dot_path: String::new(),
            parent: None,
            leaf_entity: Some(root),
            table_owner: None,
            table_info: OnceLock::new(),
            column_info: OnceLock::new(),
        }));

        Ok(self.inner.cache_path(key, path))
    }

    /// Resolves a dotted property path such as `"children.name"` below the
    /// aggregate rooted at `root`. An empty string yields the root path.
    pub fn aggregate_path(&self, root: &str, dot_path: &str) -> Result<AggregatePath> {
        let mut path = self.root_path(root)?;

        for segment in dot_path.split('.').filter(|s| !s.is_empty()) {
            path = path.append(segment)?;
        }

        Ok(path)
    }
}

impl ContextInner {
    fn cached_path(&self, key: &PathKey) -> Option<AggregatePath> {
        self.paths
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Inserts `path` unless another thread got there first, in which case
    /// the existing entry wins.
    fn cache_path(&self, key: PathKey, path: AggregatePath) -> AggregatePath {
        let mut paths = self.paths.write().unwrap_or_else(PoisonError::into_inner);
        paths
            .entry(key)
            .or_insert_with(|| {
                debug!(path = ?path, "resolved aggregate path");
                path
            })
            .clone()
    }
}

impl AggregatePath {
    /// Extends the path by the property `name` of the leaf entity.
    pub fn append(&self, name: &str) -> Result<AggregatePath> {
        let leaf = self.leaf_entity().ok_or_else(|| {
            Error::invalid_path(format!(
                "cannot append `{name}` to `{self:?}`, which does not point at an entity"
            ))
        })?;
        let property = leaf.required_property(name)?.clone();

        let dot_path = if self.is_root() {
            name.to_string()
        } else {
            format!("{}.{name}", self.0.dot_path)
        };

        let key = PathKey {
            root: self.0.root.name().to_string(),
            dot_path,
        };

        let context = self
            .0
            .context
            .upgrade()
            .ok_or_else(|| Error::invalid_path("mapping context was dropped"))?;

        if let Some(path) = context.cached_path(&key) {
            return Ok(path);
        }

        let leaf_entity = match property.target() {
            Some(target) => Some(context.entity(target)?),
            None => None,
        };

        let table_owner = if property.is_entity() && !property.is_embedded() {
            None
        } else {
            Some(self.table_owning_path())
        };

        let mut segments = self.0.segments.clone();
        segments.push(property);

        let path = AggregatePath(Arc::new(PathInner {
            context: self.0.context.clone(),
            settings: self.0.settings.clone(),
            root: self.0.root.clone(),
            segments,
            dot_path: key.dot_path.clone(),
            parent: Some(self.clone()),
            leaf_entity,
            table_owner,
            table_info: OnceLock::new(),
            column_info: OnceLock::new(),
        }));

        Ok(context.cache_path(key, path))
    }

    /// Returns the mapping context this path was created by.
    pub fn context(&self) -> Result<MappingContext> {
        self.0
            .context
            .upgrade()
            .map(|inner| MappingContext { inner })
            .ok_or_else(|| Error::invalid_path("mapping context was dropped"))
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.0.settings
    }

    /// Returns `true` if both handles point at the same cached instance.
    pub fn ptr_eq(&self, other: &AggregatePath) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_root(&self) -> bool {
        self.0.segments.is_empty()
    }

    /// Number of properties below the root; the root itself has length 0.
    pub fn len(&self) -> usize {
        self.0.segments.len()
    }

    pub fn dot_path(&self) -> &str {
        &self.0.dot_path
    }

    pub fn root_entity(&self) -> &Arc<PersistentEntity> {
        &self.0.root
    }

    pub fn segments(&self) -> &[Arc<PersistentProperty>] {
        &self.0.segments
    }

    pub fn parent_path(&self) -> Result<&AggregatePath> {
        self.0
            .parent
            .as_ref()
            .ok_or_else(|| Error::invalid_path("the root path has no parent"))
    }

    /// Iterates from this path up to and including the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &AggregatePath> + '_ {
        let mut next = Some(self);
        std::iter::from_fn(move || {
            let current = next?;
            next = current.0.parent.as_ref();
            Some(current)
        })
    }

    pub fn leaf_property(&self) -> Option<&Arc<PersistentProperty>> {
        self.0.segments.last()
    }

    pub fn required_leaf_property(&self) -> Result<&Arc<PersistentProperty>> {
        self.leaf_property()
            .ok_or_else(|| Error::invalid_path("the root path has no leaf property"))
    }

    pub fn leaf_entity(&self) -> Option<&Arc<PersistentEntity>> {
        self.0.leaf_entity.as_ref()
    }

    pub fn required_leaf_entity(&self) -> Result<&Arc<PersistentEntity>> {
        self.leaf_entity().ok_or_else(|| {
            Error::invalid_path(format!("`{self:?}` does not point at an entity"))
        })
    }

    pub fn required_id_property(&self) -> Result<&Arc<PersistentProperty>> {
        self.required_leaf_entity()?.required_id_property()
    }

    pub fn has_id_property(&self) -> bool {
        self.leaf_entity().is_some_and(|e| e.has_id_property())
    }

    pub fn is_entity(&self) -> bool {
        self.leaf_property().map_or(true, |p| p.is_entity())
    }

    pub fn is_embedded(&self) -> bool {
        self.leaf_property().is_some_and(|p| p.is_embedded())
    }

    pub fn is_collection_like(&self) -> bool {
        self.leaf_property().is_some_and(|p| p.is_collection_like())
    }

    pub fn is_map(&self) -> bool {
        self.leaf_property().is_some_and(|p| p.is_map())
    }

    /// Lists and maps carry an index or key column.
    pub fn is_qualified(&self) -> bool {
        self.leaf_property().is_some_and(|p| p.is_qualified())
    }

    /// `true` if this path or any ancestor is a collection or map.
    ///
    /// Note this also holds for an embedded value inside a collection
    /// element, even though that segment is not repeated on its own.
    pub fn is_multi_valued(&self) -> bool {
        let Some(leaf) = self.leaf_property() else {
            return false;
        };

        leaf.is_collection_like()
            || leaf.is_qualified()
            || self.0.parent.as_ref().is_some_and(|p| p.is_multi_valued())
    }

    /// Like [`is_multi_valued`](Self::is_multi_valued), but only looks at the
    /// segments below `base`.
    pub fn is_multi_valued_below(&self, base: &AggregatePath) -> bool {
        self.ancestors()
            .take_while(|p| p.len() > base.len())
            .any(|p| p.is_collection_like() || p.is_qualified())
    }

    /// `false` if any property from the root down is read-only.
    pub fn is_writable(&self) -> bool {
        self.0.segments.iter().all(|p| p.is_writable())
    }

    /// The nearest proper ancestor that is the root or has an id. Child
    /// tables without ids of their own refer back to it.
    pub fn id_defining_parent_path(&self) -> Result<AggregatePath> {
        let mut current = self.parent_path()?;

        loop {
            if current.is_root() || current.has_id_property() {
                return Ok(current.clone());
            }
            current = current.parent_path()?;
        }
    }

    /// The path whose table stores this path's columns: the nearest
    /// ancestor-or-self that is the root or a non-embedded entity.
    pub fn table_owning_path(&self) -> AggregatePath {
        match &self.0.table_owner {
            Some(owner) => owner.clone(),
            None => self.clone(),
        }
    }

    pub(crate) fn is_table_owner(&self) -> bool {
        self.0.table_owner.is_none()
    }

    /// `true` if the leaf entity already appears further up the path. Such
    /// paths are not expanded any further.
    pub fn is_recursive(&self) -> bool {
        let (Some(leaf), Some(parent)) = (self.leaf_entity(), self.0.parent.as_ref()) else {
            return false;
        };

        parent
            .ancestors()
            .any(|p| p.leaf_entity().is_some_and(|e| e.name() == leaf.name()))
    }

    /// Concatenated prefixes of the embedded properties directly above the
    /// leaf.
    pub fn embedded_prefix(&self) -> String {
        let mut prefixes = vec![];
        let mut current = self.0.parent.as_ref();

        while let Some(path) = current {
            match path.leaf_property().and_then(|p| p.embedded_prefix()) {
                Some(prefix) => prefixes.push(prefix),
                None => break,
            }
            current = path.0.parent.as_ref();
        }

        prefixes.into_iter().rev().collect()
    }

    /// Column name of the leaf property with embedded prefixes applied.
    pub fn column_name(&self) -> Result<SqlIdentifier> {
        let prefix = self.embedded_prefix();
        Ok(self
            .required_leaf_property()?
            .column_name()
            .transform(|name| format!("{prefix}{name}")))
    }

    /// Table-level naming for this path, computed once.
    pub fn table_info(&self) -> Result<&TableInfo> {
        let owner = self.0.table_owner.as_ref().unwrap_or(self);
        match owner.0.table_info.get_or_init(|| TableInfo::of(owner)) {
            Ok(info) => Ok(info),
            Err(err) => Err(err.clone()),
        }
    }

    /// Column name and alias of the leaf property, computed once.
    pub fn column_info(&self) -> Result<&ColumnInfo> {
        match self.0.column_info.get_or_init(|| ColumnInfo::of(self)) {
            Ok(info) => Ok(info),
            Err(err) => Err(err.clone()),
        }
    }

    fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.segments.iter().map(|p| p.name())
    }
}

impl PartialEq for AggregatePath {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.0.root.name() == other.0.root.name() && self.names().eq(other.names()))
    }
}

impl Eq for AggregatePath {}

impl Hash for AggregatePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.root.name().hash(state);
        for name in self.names() {
            name.hash(state);
        }
    }
}

impl PartialOrd for AggregatePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AggregatePath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .root
            .name()
            .cmp(other.0.root.name())
            .then_with(|| self.names().cmp(other.names()))
    }
}

impl fmt::Debug for AggregatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "AggregatePath({})", self.0.root.name())
        } else {
            write!(f, "AggregatePath({}.{})", self.0.root.name(), self.0.dot_path)
        }
    }
}
