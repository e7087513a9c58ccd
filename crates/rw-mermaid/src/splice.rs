//! In-place tree splicing.
//!
//! Instance paths are computed once, on the untouched tree. Replacements are
//! 1-for-1, but removals shift later siblings in the same children list, so
//! the current index of every target is recomputed from the paths already
//! spliced right before it is touched. Targets whose ancestor (or themselves)
//! were already replaced or removed are detached and resolve to nothing.

use rw_hast::{Element, Node, Root};

use crate::collect::{TreePath, children_at, children_at_mut};

/// Tracks splices applied so far and maps original paths to current ones.
#[derive(Debug, Default)]
pub(crate) struct Splicer {
    removed: Vec<Vec<usize>>,
    replaced: Vec<Vec<usize>>,
}

impl Splicer {
    /// Current path of a node given its path in the original tree.
    fn current_path(&self, original: &TreePath) -> Option<Vec<usize>> {
        let original = original.indices();
        let mut current = Vec::with_capacity(original.len());

        for depth in 0..original.len() {
            let prefix = &original[..=depth];
            if self.touched(prefix) {
                return None;
            }
            let shift = self
                .removed
                .iter()
                .filter(|removed| {
                    removed.len() == depth + 1
                        && removed[..depth] == original[..depth]
                        && removed[depth] < original[depth]
                })
                .count();
            current.push(original[depth] - shift);
        }
        Some(current)
    }

    fn touched(&self, path: &[usize]) -> bool {
        self.removed
            .iter()
            .chain(&self.replaced)
            .any(|spliced| spliced.as_slice() == path)
    }

    /// Element currently standing where `original` pointed.
    pub(crate) fn resolve<'t>(&self, root: &'t Root, original: &TreePath) -> Option<&'t Element> {
        let current = self.current_path(original)?;
        let (&index, parent) = current.split_last()?;
        children_at(root, parent)?.get(index)?.as_element()
    }

    /// Replace the node at `original` with `replacement`, or remove it on `None`.
    ///
    /// Returns `false` when the node is no longer attached to the tree.
    pub(crate) fn splice(
        &mut self,
        root: &mut Root,
        original: &TreePath,
        replacement: Option<Node>,
    ) -> bool {
        let Some(current) = self.current_path(original) else {
            return false;
        };
        let Some((&index, parent)) = current.split_last() else {
            return false;
        };
        let Some(children) = children_at_mut(root, parent) else {
            return false;
        };
        if !children.get(index).is_some_and(|node| node.as_element().is_some()) {
            return false;
        }

        match replacement {
            Some(node) => {
                children[index] = node;
                self.replaced.push(original.indices().to_vec());
            }
            None => {
                children.remove(index);
                self.removed.push(original.indices().to_vec());
            }
        }
        true
    }
}
