use super::AggregatePath;
use crate::schema::MappingContext;
use crate::Result;

use tracing::debug;

impl MappingContext {
    /// All paths below the aggregate rooted at `root` that match `filter`, in
    /// pre-order.
    ///
    /// A path whose entity already appears above it is reported but not
    /// expanded, so self-referential aggregates terminate.
    pub fn find_paths(
        &self,
        root: &str,
        filter: impl Fn(&AggregatePath) -> bool,
    ) -> Result<Vec<AggregatePath>> {
        let root = self.root_path(root)?;
        let mut paths = vec![];
        walk(&root, &filter, &mut paths)?;
        Ok(paths)
    }
}

impl AggregatePath {
    /// All paths strictly below this one, in the same order as
    /// [`MappingContext::find_paths`].
    pub fn descendants(&self) -> Result<Vec<AggregatePath>> {
        let mut paths = vec![];
        walk(self, &|_: &AggregatePath| true, &mut paths)?;
        Ok(paths)
    }
}

fn walk(
    base: &AggregatePath,
    filter: &impl Fn(&AggregatePath) -> bool,
    paths: &mut Vec<AggregatePath>,
) -> Result<()> {
    let Some(entity) = base.leaf_entity() else {
        return Ok(());
    };

    for property in entity.properties() {
        let path = base.append(property.name())?;

        if filter(&path) {
            paths.push(path.clone());
        }

        if path.is_recursive() {
            debug!(path = ?path, "stopping at recursive reference");
            continue;
        }

        walk(&path, filter, paths)?;
    }

    Ok(())
}
