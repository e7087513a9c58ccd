//! Diagram collection.
//!
//! One depth-first walk over the tree finds every diagram node and decides
//! which node gets replaced: the `<code>` itself, or its `<pre>` wrapper when
//! the wrapper holds nothing else.

use rw_hast::{Element, Node, Root};

use crate::classify::is_diagram_element;
use crate::strategy::Strategy;

/// Child-index path from the root to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreePath(Vec<usize>);

impl TreePath {
    #[must_use]
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// Indices from the root down to the node.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Path of the parent (empty for children of the root).
    #[must_use]
    pub fn parent(&self) -> &[usize] {
        match self.0.split_last() {
            Some((_, parent)) => parent,
            None => &[],
        }
    }

    /// Element at this path in a tree that has not been spliced yet.
    #[must_use]
    pub fn element<'t>(&self, root: &'t Root) -> Option<&'t Element> {
        element_at(root, &self.0)
    }
}

/// One discovered diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramInstance {
    /// Diagram source, exactly as found in the tree.
    pub diagram: String,
    /// Node to replace: the diagram node, or its promoted `<pre>` wrapper.
    pub path: TreePath,
}

/// Collect all diagram instances in document order.
#[must_use]
pub fn collect(root: &Root, strategy: Strategy) -> Vec<DiagramInstance> {
    let mut instances = Vec::new();
    let mut path = Vec::new();
    visit(&root.children, None, &mut path, strategy, &mut instances);
    instances
}

fn visit(
    children: &[Node],
    parent: Option<&Element>,
    path: &mut Vec<usize>,
    strategy: Strategy,
    instances: &mut Vec<DiagramInstance>,
) {
    for (index, child) in children.iter().enumerate() {
        let Node::Element(element) = child else {
            continue;
        };
        path.push(index);
        if is_diagram_element(element, strategy)
            && let Some(instance) = instance_for(element, parent, path)
        {
            instances.push(instance);
        }
        visit(&element.children, Some(element), path, strategy, instances);
        path.pop();
    }
}

/// Build the instance for a matched element at `path`.
///
/// Inside a `<pre>`, every sibling must be whitespace-only text; then the
/// `<pre>` is replaced. Any other sibling disqualifies the element.
fn instance_for(
    element: &Element,
    parent: Option<&Element>,
    path: &[usize],
) -> Option<DiagramInstance> {
    let (&index, parent_path) = path.split_last()?;

    let target = match parent {
        Some(pre) if pre.is("pre") => {
            let clean = pre
                .children
                .iter()
                .enumerate()
                .all(|(i, sibling)| i == index || sibling.is_whitespace_text());
            if !clean {
                tracing::debug!(path = ?path, "Skipping mermaid block with extra content");
                return None;
            }
            parent_path
        }
        _ => path,
    };

    Some(DiagramInstance {
        diagram: element.text_content(),
        path: TreePath::new(target.to_vec()),
    })
}

/// Element at `path`, if every step lands on an element.
pub(crate) fn element_at<'t>(root: &'t Root, path: &[usize]) -> Option<&'t Element> {
    let (&last, parents) = path.split_last()?;
    children_at(root, parents)?.get(last)?.as_element()
}

/// Children list of the node at `path` (the root for an empty path).
pub(crate) fn children_at<'t>(root: &'t Root, path: &[usize]) -> Option<&'t [Node]> {
    let mut children = root.children.as_slice();
    for &index in path {
        children = children.get(index)?.as_element()?.children.as_slice();
    }
    Some(children)
}

/// Mutable children list of the node at `path`.
pub(crate) fn children_at_mut<'t>(
    root: &'t mut Root,
    path: &[usize],
) -> Option<&'t mut Vec<Node>> {
    let mut children = &mut root.children;
    for &index in path {
        children = &mut children.get_mut(index)?.as_element_mut()?.children;
    }
    Some(children)
}
