//! Structural integrity checks for a `PageTree`.
//!
//! The tree store keeps these properties by construction; a violation means
//! a bug in the store (or a corrupt document on load), never a user error.

use crate::id::NodeId;
use crate::tree::PageTree;
use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Dfs;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A children list names an id with no node.
    MissingChild { parent: NodeId, child: NodeId },
    /// A node's `parent_id` names an id with no node.
    MissingParent { id: NodeId, parent: NodeId },
    /// `child.parent_id` disagrees with the list that holds it.
    ParentMismatch {
        child: NodeId,
        listed_in: NodeId,
        parent_id: Option<NodeId>,
    },
    /// The same id appears in two parents' children lists.
    SharedChild { child: NodeId },
    /// An id appears twice in one children list.
    DuplicateChild { parent: NodeId, child: NodeId },
    /// A non-root node is in no children list.
    Orphan { id: NodeId },
    RootHasParent,
    MissingRoot,
    Cycle,
    /// Not reachable from the root.
    Unreachable { id: NodeId },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingChild { parent, child } => write!(f, "{parent} lists missing child {child}"),
            Self::MissingParent { id, parent } => write!(f, "{id} points at missing parent {parent}"),
            Self::ParentMismatch {
                child,
                listed_in,
                parent_id,
            } => write!(f, "{child} listed in {listed_in} but parentId is {parent_id:?}"),
            Self::SharedChild { child } => write!(f, "{child} is listed under two parents"),
            Self::DuplicateChild { parent, child } => write!(f, "{child} listed twice in {parent}"),
            Self::Orphan { id } => write!(f, "{id} has no parent"),
            Self::RootHasParent => write!(f, "root has a parent"),
            Self::MissingRoot => write!(f, "root node is missing"),
            Self::Cycle => write!(f, "parent links form a cycle"),
            Self::Unreachable { id } => write!(f, "{id} is unreachable from root"),
        }
    }
}

/// Collect every structural violation in `tree`. Empty means healthy.
pub fn check(tree: &PageTree) -> Vec<Violation> {
    let mut out = Vec::new();
    let root = tree.root();

    match tree.get(root) {
        None => {
            out.push(Violation::MissingRoot);
            return out;
        }
        Some(node) if node.parent_id.is_some() => out.push(Violation::RootHasParent),
        Some(_) => {}
    }

    let mut graph: DiGraphMap<NodeId, ()> = DiGraphMap::with_capacity(tree.len(), tree.len());
    let mut listed: HashSet<NodeId> = HashSet::with_capacity(tree.len());

    for node in tree.iter() {
        graph.add_node(node.id);
        let mut seen = HashSet::new();
        for child in &node.children {
            if !seen.insert(*child) {
                out.push(Violation::DuplicateChild {
                    parent: node.id,
                    child: *child,
                });
                continue;
            }
            let Some(child_node) = tree.get(*child) else {
                out.push(Violation::MissingChild {
                    parent: node.id,
                    child: *child,
                });
                continue;
            };
            if !listed.insert(*child) {
                out.push(Violation::SharedChild { child: *child });
            }
            if child_node.parent_id != Some(node.id) {
                out.push(Violation::ParentMismatch {
                    child: *child,
                    listed_in: node.id,
                    parent_id: child_node.parent_id,
                });
            }
            graph.add_edge(node.id, *child, ());
        }
        match node.parent_id {
            Some(parent) if !tree.contains(parent) => out.push(Violation::MissingParent {
                id: node.id,
                parent,
            }),
            _ => {}
        }
    }

    for node in tree.iter() {
        if node.id != root && !listed.contains(&node.id) {
            out.push(Violation::Orphan { id: node.id });
        }
    }

    if is_cyclic_directed(&graph) {
        out.push(Violation::Cycle);
    }

    let mut reachable = HashSet::with_capacity(tree.len());
    let mut dfs = Dfs::new(&graph, root);
    while let Some(id) = dfs.next(&graph) {
        reachable.insert(id);
    }
    let mut unreachable: Vec<NodeId> = tree
        .iter()
        .map(|n| n.id)
        .filter(|id| !reachable.contains(id))
        .collect();
    unreachable.sort();
    out.extend(unreachable.into_iter().map(|id| Violation::Unreachable { id }));

    out
}

/// Abort on a corrupt tree. Reports every violation before panicking.
pub fn assert_integrity(tree: &PageTree) {
    let violations = check(tree);
    if violations.is_empty() {
        return;
    }
    for v in &violations {
        log::error!("integrity: {v}");
    }
    panic!(
        "page tree integrity violated ({} problems): {}",
        violations.len(),
        violations[0]
    );
}
