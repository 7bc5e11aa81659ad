//! The component tree store.
//!
//! `PageTree` owns the id → node map and the root id. It is the only code
//! that writes parent/child links, and every public mutator is
//! all-or-nothing: arguments are validated up front, and a rejected call
//! leaves the tree untouched.
//!
//! Nodes are held behind `Arc` so cloning a tree (a history snapshot) copies
//! pointers, not nodes. Writers go through `Arc::make_mut`, which copies
//! only the nodes on the changed path.

use crate::error::{TreeError, TreeResult};
use crate::fragment::Fragment;
use crate::id::NodeId;
use crate::model::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Store-level behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeOptions {
    /// Reject out-of-range insertion indices with `InvalidIndex` instead of
    /// clamping them. Default: **false** (clamp).
    pub strict_indices: bool,
}

#[derive(Debug, Clone)]
pub struct PageTree {
    nodes: HashMap<NodeId, Arc<ComponentNode>>,
    root: NodeId,
    options: TreeOptions,
}

impl PartialEq for PageTree {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.nodes == other.nodes
    }
}

impl Eq for PageTree {}

impl Default for PageTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PageTree {
    /// Create a document holding only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(TreeOptions::default())
    }

    #[must_use]
    pub fn with_options(options: TreeOptions) -> Self {
        let root = NodeId::root();
        let mut nodes = HashMap::new();
        nodes.insert(root, Arc::new(ComponentNode::new(root, ComponentType::Root)));
        Self {
            nodes,
            root,
            options,
        }
    }

    /// Assemble a tree from raw parts. Used by document decoding, which
    /// validates integrity before handing the tree out.
    pub(crate) fn from_parts(
        root: NodeId,
        nodes: impl IntoIterator<Item = ComponentNode>,
        options: TreeOptions,
    ) -> Self {
        Self {
            nodes: nodes.into_iter().map(|n| (n.id, Arc::new(n))).collect(),
            root,
            options,
        }
    }

    pub fn options(&self) -> TreeOptions {
        self.options
    }

    pub fn set_options(&mut self, options: TreeOptions) {
        self.options = options;
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&ComponentNode> {
        self.nodes.get(&id).map(Arc::as_ref)
    }

    /// Iterate all nodes in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentNode> {
        self.nodes.values().map(Arc::as_ref)
    }

    /// Child nodes of `id` in paint order. Empty for unknown ids.
    pub fn children(&self, id: NodeId) -> Vec<&ComponentNode> {
        self.child_ids(id)
            .iter()
            .filter_map(|child| self.get(*child))
            .collect()
    }

    /// Child ids of `id` in paint order. Empty for unknown ids.
    pub fn child_ids(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent_id)
    }

    /// Position of `id` within its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent_of(id)?;
        self.child_ids(parent).iter().position(|c| *c == id)
    }

    /// Check if `ancestor_id` is a parent/grandparent/etc. of `descendant_id`.
    pub fn is_ancestor_of(&self, ancestor_id: NodeId, descendant_id: NodeId) -> bool {
        if ancestor_id == descendant_id {
            return false;
        }
        let mut current = self.parent_of(descendant_id);
        while let Some(parent) = current {
            if parent == ancestor_id {
                return true;
            }
            current = self.parent_of(parent);
        }
        false
    }

    /// Whether `id` may receive children (see `ComponentNode::can_host_children`).
    pub fn can_host(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(ComponentNode::can_host_children)
    }

    /// `id` and all its descendants in depth-first pre-order.
    pub fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.child_ids(next).iter().rev().copied());
        }
        out
    }

    /// Depth-first pre-order walk from the root, with depth (root = 0).
    pub fn walk(&self, mut visit: impl FnMut(&ComponentNode, usize)) {
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            visit(node, depth);
            stack.extend(node.children.iter().rev().map(|c| (*c, depth + 1)));
        }
    }

    /// Keep only ids that are not descendants of another id in the list.
    /// Order of the survivors is preserved.
    pub fn topmost(&self, ids: &[NodeId]) -> Vec<NodeId> {
        ids.iter()
            .copied()
            .filter(|id| self.contains(*id))
            .filter(|id| !ids.iter().any(|other| self.is_ancestor_of(*other, *id)))
            .fold(Vec::new(), |mut acc, id| {
                if !acc.contains(&id) {
                    acc.push(id);
                }
                acc
            })
    }

    // ─── Structural mutations ────────────────────────────────────────────

    /// Insert a new node under `parent_id` at `index` (clamped to
    /// `[0, len]` unless strict indices are on). Returns the node's id.
    pub fn insert(&mut self, new: NewNode, parent_id: NodeId, index: usize) -> TreeResult<NodeId> {
        if new.ty == ComponentType::Root {
            return Err(TreeError::RootInsertion);
        }
        let parent = self.get(parent_id).ok_or(TreeError::InvalidParent(parent_id))?;
        if !parent.can_host_children() {
            return Err(TreeError::InvalidParent(parent_id));
        }
        let index = self.checked_index(parent_id, parent.children.len(), index)?;
        let id = match new.id {
            Some(id) if self.contains(id) => return Err(TreeError::DuplicateId(id)),
            Some(id) => id,
            None => self.mint_id(new.ty),
        };

        let mut node = new.into_node(id);
        node.parent_id = Some(parent_id);
        self.nodes.insert(id, Arc::new(node));
        self.node_mut(parent_id).children.insert(index, id);

        log::debug!("insert {id} under {parent_id} at {index}");
        self.debug_check();
        Ok(id)
    }

    /// Move `id` under `new_parent_id` so that it ends up at `index` among
    /// the new parent's children. Returns `false` when the node is already
    /// there (no change made).
    pub fn reparent(&mut self, id: NodeId, new_parent_id: NodeId, index: usize) -> TreeResult<bool> {
        if id == self.root {
            return Err(TreeError::RootReparent);
        }
        let node = self.get(id).ok_or(TreeError::NotFound(id))?;
        let new_parent = self
            .get(new_parent_id)
            .ok_or(TreeError::NotFound(new_parent_id))?;
        if new_parent_id == id || self.is_ancestor_of(id, new_parent_id) {
            return Err(TreeError::Cycle {
                id,
                target: new_parent_id,
            });
        }
        if !new_parent.can_host_children() {
            return Err(TreeError::InvalidParent(new_parent_id));
        }

        let old_parent_id = node.parent_id.ok_or(TreeError::NotFound(id))?;
        let same_parent = old_parent_id == new_parent_id;
        // Length of the target list once `id` has been taken out of it.
        let len = new_parent.children.len() - usize::from(same_parent);
        let index = self.checked_index(new_parent_id, len, index)?;

        if same_parent && self.index_in_parent(id) == Some(index) {
            log::trace!("reparent {id}: already at {new_parent_id}[{index}]");
            return Ok(false);
        }

        self.node_mut(old_parent_id).children.retain(|c| *c != id);
        self.node_mut(new_parent_id).children.insert(index, id);
        self.node_mut(id).parent_id = Some(new_parent_id);

        log::debug!("reparent {id}: {old_parent_id} → {new_parent_id}[{index}]");
        self.debug_check();
        Ok(true)
    }

    /// Delete `id` and its whole subtree. Returns the removed ids in
    /// depth-first pre-order.
    pub fn remove(&mut self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        if id == self.root {
            return Err(TreeError::RootDeletion);
        }
        let parent_id = self.parent_of(id).ok_or(TreeError::NotFound(id))?;

        let removed = self.subtree_ids(id);
        self.node_mut(parent_id).children.retain(|c| *c != id);
        for gone in &removed {
            self.nodes.remove(gone);
        }

        log::debug!("remove {id} ({} nodes)", removed.len());
        self.debug_check();
        Ok(removed)
    }

    /// Deep-copy the subtree at `id` with fresh ids throughout, inserted
    /// directly after the original. Returns the copy's root id.
    pub fn clone_subtree(&mut self, id: NodeId) -> TreeResult<NodeId> {
        if id == self.root {
            return Err(TreeError::RootDuplicate);
        }
        let parent_id = self.parent_of(id).ok_or(TreeError::NotFound(id))?;
        let index = self.index_in_parent(id).unwrap_or_default() + 1;
        let fragment = self.extract(id)?;
        self.instantiate(&fragment, parent_id, index)
    }

    /// Detached deep copy of the subtree at `id` (clipboard payload).
    pub fn extract(&self, id: NodeId) -> TreeResult<Fragment> {
        if !self.contains(id) {
            return Err(TreeError::NotFound(id));
        }
        let nodes = self
            .subtree_ids(id)
            .into_iter()
            .filter_map(|n| self.get(n).cloned())
            .collect();
        Ok(Fragment { root: id, nodes })
    }

    /// Insert a copy of `fragment` under `parent_id` at `index`, minting a
    /// fresh id for every node. Returns the new root id.
    pub fn instantiate(
        &mut self,
        fragment: &Fragment,
        parent_id: NodeId,
        index: usize,
    ) -> TreeResult<NodeId> {
        let parent = self.get(parent_id).ok_or(TreeError::InvalidParent(parent_id))?;
        if !parent.can_host_children() {
            return Err(TreeError::InvalidParent(parent_id));
        }
        let index = self.checked_index(parent_id, parent.children.len(), index)?;
        fragment.validate()?;

        let mut remap: HashMap<NodeId, NodeId> = HashMap::with_capacity(fragment.nodes.len());
        for node in &fragment.nodes {
            let fresh = self.mint_id(node.ty);
            remap.insert(node.id, fresh);
        }

        for node in &fragment.nodes {
            let mut copy = node.clone();
            copy.id = remap[&node.id];
            copy.children = node.children.iter().map(|c| remap[c]).collect();
            copy.parent_id = None;
            self.nodes.insert(copy.id, Arc::new(copy));
        }
        // Parent links follow the children lists, not the copied parent ids.
        for node in &fragment.nodes {
            let fresh = remap[&node.id];
            for child in &node.children {
                self.node_mut(remap[child]).parent_id = Some(fresh);
            }
        }

        let new_root = remap[&fragment.root];
        self.node_mut(new_root).parent_id = Some(parent_id);
        self.node_mut(parent_id).children.insert(index, new_root);

        log::debug!(
            "instantiate {} as {new_root} under {parent_id} ({} nodes)",
            fragment.root,
            fragment.nodes.len()
        );
        self.debug_check();
        Ok(new_root)
    }

    /// Wrap sibling nodes in a new container of type `ty`, placed where the
    /// first (lowest-index) sibling was. Returns the wrapper's id.
    pub fn wrap(&mut self, ids: &[NodeId], ty: ComponentType) -> TreeResult<NodeId> {
        if !ty.accepts_children() || ty == ComponentType::Root {
            return Err(TreeError::NotContainer(ty));
        }
        let first = *ids.first().ok_or(TreeError::NotSiblings)?;
        if ids.contains(&self.root) {
            return Err(TreeError::RootReparent);
        }
        let parent_id = self.parent_of(first).ok_or(TreeError::NotFound(first))?;
        for id in ids {
            if !self.contains(*id) {
                return Err(TreeError::NotFound(*id));
            }
            if self.parent_of(*id) != Some(parent_id) {
                return Err(TreeError::NotSiblings);
            }
        }

        // Wrapped children keep their relative paint order.
        let siblings = self.child_ids(parent_id).to_vec();
        let ordered: Vec<NodeId> = siblings.iter().copied().filter(|c| ids.contains(c)).collect();
        let index = siblings
            .iter()
            .position(|c| ids.contains(c))
            .unwrap_or(siblings.len());

        let wrapper_id = self.mint_id(ty);
        let mut wrapper = ComponentNode::new(wrapper_id, ty);
        wrapper.parent_id = Some(parent_id);
        wrapper.children = ordered.iter().copied().collect();
        self.nodes.insert(wrapper_id, Arc::new(wrapper));

        {
            let parent = self.node_mut(parent_id);
            parent.children.retain(|c| !ordered.contains(c));
            parent.children.insert(index, wrapper_id);
        }
        for id in &ordered {
            self.node_mut(*id).parent_id = Some(wrapper_id);
        }

        log::debug!("wrap {} nodes in {wrapper_id}", ordered.len());
        self.debug_check();
        Ok(wrapper_id)
    }

    /// Replace a container with its children, spliced in at its position.
    /// Returns the lifted child ids.
    pub fn unwrap(&mut self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        if id == self.root {
            return Err(TreeError::RootDeletion);
        }
        let node = self.get(id).ok_or(TreeError::NotFound(id))?;
        if !node.ty.accepts_children() {
            return Err(TreeError::NotContainer(node.ty));
        }
        let parent_id = node.parent_id.ok_or(TreeError::NotFound(id))?;
        let lifted: Vec<NodeId> = node.children.to_vec();
        let index = self.index_in_parent(id).unwrap_or_default();

        {
            let parent = self.node_mut(parent_id);
            parent.children.retain(|c| *c != id);
            for (offset, child) in lifted.iter().enumerate() {
                parent.children.insert(index + offset, *child);
            }
        }
        for child in &lifted {
            self.node_mut(*child).parent_id = Some(parent_id);
        }
        self.nodes.remove(&id);

        log::debug!("unwrap {id}: lifted {} children", lifted.len());
        self.debug_check();
        Ok(lifted)
    }

    // ─── Z-order within a parent ─────────────────────────────────────────

    /// Move one step toward the back (swap with previous sibling).
    pub fn send_backward(&mut self, id: NodeId) -> TreeResult<bool> {
        self.reorder(id, |pos, _| pos.checked_sub(1))
    }

    /// Move one step toward the front (swap with next sibling).
    pub fn bring_forward(&mut self, id: NodeId) -> TreeResult<bool> {
        self.reorder(id, |pos, last| (pos < last).then_some(pos + 1))
    }

    /// Move to the back of paint order (first child).
    pub fn send_to_back(&mut self, id: NodeId) -> TreeResult<bool> {
        self.reorder(id, |pos, _| (pos > 0).then_some(0))
    }

    /// Move to the front of paint order (last child).
    pub fn bring_to_front(&mut self, id: NodeId) -> TreeResult<bool> {
        self.reorder(id, |pos, last| (pos < last).then_some(last))
    }

    fn reorder(
        &mut self,
        id: NodeId,
        target: impl FnOnce(usize, usize) -> Option<usize>,
    ) -> TreeResult<bool> {
        if id == self.root {
            return Err(TreeError::RootReparent);
        }
        let parent_id = self.parent_of(id).ok_or(TreeError::NotFound(id))?;
        let siblings = self.child_ids(parent_id);
        let pos = siblings
            .iter()
            .position(|c| *c == id)
            .ok_or(TreeError::NotFound(id))?;
        let Some(to) = target(pos, siblings.len() - 1) else {
            return Ok(false);
        };
        self.reparent(id, parent_id, to)
    }

    // ─── Content mutations ───────────────────────────────────────────────

    /// Shallow-merge `patch` into the node's props. Returns whether anything
    /// changed.
    pub fn update_props(&mut self, id: NodeId, patch: Props) -> TreeResult<bool> {
        let node = self.get(id).ok_or(TreeError::NotFound(id))?;
        if patch.iter().all(|(k, v)| node.props.get(k) == Some(v)) {
            return Ok(false);
        }
        self.node_mut(id).props.extend(patch);
        log::debug!("update props of {id}");
        Ok(true)
    }

    /// Shallow-merge `patch` into the node's styles. An empty value removes
    /// the property. Returns whether anything changed.
    pub fn update_styles(&mut self, id: NodeId, patch: StyleMap) -> TreeResult<bool> {
        let node = self.get(id).ok_or(TreeError::NotFound(id))?;
        let unchanged = patch.iter().all(|(k, v)| match node.styles.get(k) {
            Some(old) => old == v,
            None => v.is_empty(),
        });
        if unchanged {
            return Ok(false);
        }
        let styles = &mut self.node_mut(id).styles;
        for (key, value) in patch {
            if value.is_empty() {
                styles.remove(&key);
            } else {
                styles.insert(key, value);
            }
        }
        log::debug!("update styles of {id}");
        Ok(true)
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> TreeResult<bool> {
        let name = name.into();
        let node = self.get(id).ok_or(TreeError::NotFound(id))?;
        if node.name == name {
            return Ok(false);
        }
        self.node_mut(id).name = name;
        Ok(true)
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) -> TreeResult<bool> {
        let node = self.get(id).ok_or(TreeError::NotFound(id))?;
        if node.is_hidden == hidden {
            return Ok(false);
        }
        self.node_mut(id).is_hidden = hidden;
        Ok(true)
    }

    pub fn set_locked(&mut self, id: NodeId, locked: bool) -> TreeResult<bool> {
        let node = self.get(id).ok_or(TreeError::NotFound(id))?;
        if node.is_locked == locked {
            return Ok(false);
        }
        self.node_mut(id).is_locked = locked;
        Ok(true)
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// Mutable access to a node known to exist. Copies the node first if a
    /// snapshot still shares it.
    fn node_mut(&mut self, id: NodeId) -> &mut ComponentNode {
        match self.nodes.get_mut(&id) {
            Some(node) => Arc::make_mut(node),
            None => {
                log::error!("tree corrupted: {id} referenced but absent");
                panic!("tree corrupted: {id} referenced but absent");
            }
        }
    }

    /// Mint an id that is not in use by this document.
    fn mint_id(&self, ty: ComponentType) -> NodeId {
        loop {
            let id = NodeId::with_prefix(ty.as_str());
            if !self.contains(id) {
                return id;
            }
        }
    }

    fn checked_index(&self, parent: NodeId, len: usize, index: usize) -> TreeResult<usize> {
        if index <= len {
            Ok(index)
        } else if self.options.strict_indices {
            Err(TreeError::InvalidIndex { parent, index, len })
        } else {
            Ok(len)
        }
    }

    fn debug_check(&self) {
        if cfg!(debug_assertions) {
            crate::integrity::assert_integrity(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn section(tree: &mut PageTree) -> NodeId {
        tree.insert(NewNode::new(ComponentType::Section), tree.root(), usize::MAX)
            .unwrap()
    }

    fn button(tree: &mut PageTree, parent: NodeId) -> NodeId {
        tree.insert(NewNode::new(ComponentType::Button), parent, usize::MAX)
            .unwrap()
    }

    #[test]
    fn insert_clamps_index_and_links_parent() {
        let mut tree = PageTree::new();
        let a = section(&mut tree);
        let b = tree
            .insert(NewNode::new(ComponentType::Section), tree.root(), 99)
            .unwrap();
        let c = tree
            .insert(NewNode::new(ComponentType::Section), tree.root(), 0)
            .unwrap();
        assert_eq!(tree.child_ids(tree.root()), &[c, a, b]);
        assert_eq!(tree.parent_of(b), Some(tree.root()));
    }

    #[test]
    fn insert_strict_index_rejected() {
        let mut tree = PageTree::with_options(TreeOptions {
            strict_indices: true,
        });
        let err = tree
            .insert(NewNode::new(ComponentType::Section), tree.root(), 3)
            .unwrap_err();
        assert!(matches!(err, TreeError::InvalidIndex { index: 3, len: 0, .. }));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn insert_under_missing_parent_fails() {
        let mut tree = PageTree::new();
        let ghost = NodeId::intern("ghost_parent");
        let err = tree
            .insert(NewNode::new(ComponentType::Text), ghost, 0)
            .unwrap_err();
        assert_eq!(err, TreeError::InvalidParent(ghost));
    }

    #[test]
    fn insert_under_leaf_fails() {
        let mut tree = PageTree::new();
        let s = section(&mut tree);
        let b = button(&mut tree, s);
        let before = tree.clone();
        let err = tree
            .insert(NewNode::new(ComponentType::Text), b, 0)
            .unwrap_err();
        assert_eq!(err, TreeError::InvalidParent(b));
        assert_eq!(tree, before);
    }

    #[test]
    fn insert_with_taken_id_fails() {
        let mut tree = PageTree::new();
        let s = section(&mut tree);
        let err = tree
            .insert(NewNode::new(ComponentType::Text).with_id(s), s, 0)
            .unwrap_err();
        assert_eq!(err, TreeError::DuplicateId(s));
    }

    #[test]
    fn reparent_into_descendant_is_cycle() {
        let mut tree = PageTree::new();
        let outer = section(&mut tree);
        let inner = tree
            .insert(NewNode::new(ComponentType::Container), outer, 0)
            .unwrap();
        let before = tree.clone();

        assert!(matches!(
            tree.reparent(outer, inner, 0),
            Err(TreeError::Cycle { .. })
        ));
        assert!(matches!(
            tree.reparent(outer, outer, 0),
            Err(TreeError::Cycle { .. })
        ));
        assert_eq!(tree, before);
    }

    #[test]
    fn reparent_same_position_is_noop() {
        let mut tree = PageTree::new();
        let a = section(&mut tree);
        let _b = section(&mut tree);
        assert_eq!(tree.reparent(a, tree.root(), 0), Ok(false));
        assert_eq!(tree.reparent(a, tree.root(), 1), Ok(true));
        assert_eq!(tree.index_in_parent(a), Some(1));
    }

    #[test]
    fn reparent_root_rejected() {
        let mut tree = PageTree::new();
        let s = section(&mut tree);
        let root = tree.root();
        assert_eq!(tree.reparent(root, s, 0), Err(TreeError::RootReparent));
    }

    #[test]
    fn remove_deletes_subtree() {
        let mut tree = PageTree::new();
        let s = section(&mut tree);
        let b = button(&mut tree, s);
        let removed = tree.remove(s).unwrap();
        assert_eq!(removed, vec![s, b]);
        assert!(!tree.contains(s));
        assert!(!tree.contains(b));
        assert!(tree.child_ids(tree.root()).is_empty());
        assert_eq!(tree.remove(tree.root()), Err(TreeError::RootDeletion));
    }

    #[test]
    fn clone_subtree_gets_fresh_ids_after_original() {
        let mut tree = PageTree::new();
        let s = section(&mut tree);
        let b = button(&mut tree, s);
        let tail = section(&mut tree);

        let copy = tree.clone_subtree(s).unwrap();
        assert_ne!(copy, s);
        assert_eq!(tree.child_ids(tree.root()), &[s, copy, tail]);

        let copy_children = tree.child_ids(copy).to_vec();
        assert_eq!(copy_children.len(), 1);
        assert_ne!(copy_children[0], b);
        assert_eq!(tree.parent_of(copy_children[0]), Some(copy));
        assert_eq!(tree.get(copy_children[0]).unwrap().ty, ComponentType::Button);
    }

    #[test]
    fn snapshot_shares_untouched_nodes() {
        let mut tree = PageTree::new();
        let a = section(&mut tree);
        let b = section(&mut tree);
        let snapshot = tree.clone();

        tree.set_name(a, "Renamed").unwrap();
        assert_eq!(snapshot.get(a).unwrap().name, "Section");
        assert!(Arc::ptr_eq(&snapshot.nodes[&b], &tree.nodes[&b]));
        assert!(!Arc::ptr_eq(&snapshot.nodes[&a], &tree.nodes[&a]));
    }

    #[test]
    fn z_order_moves() {
        let mut tree = PageTree::new();
        let a = section(&mut tree);
        let b = section(&mut tree);
        let c = section(&mut tree);
        let root = tree.root();

        assert_eq!(tree.bring_to_front(a), Ok(true));
        assert_eq!(tree.child_ids(root), &[b, c, a]);
        assert_eq!(tree.bring_forward(a), Ok(false));
        assert_eq!(tree.send_backward(a), Ok(true));
        assert_eq!(tree.child_ids(root), &[b, a, c]);
        assert_eq!(tree.send_to_back(c), Ok(true));
        assert_eq!(tree.child_ids(root), &[c, b, a]);
    }

    #[test]
    fn wrap_and_unwrap_preserve_order() {
        let mut tree = PageTree::new();
        let a = section(&mut tree);
        let b = section(&mut tree);
        let c = section(&mut tree);
        let root = tree.root();

        let wrapper = tree.wrap(&[c, b], ComponentType::Container).unwrap();
        assert_eq!(tree.child_ids(root), &[a, wrapper]);
        assert_eq!(tree.child_ids(wrapper), &[b, c]);

        let lifted = tree.unwrap(wrapper).unwrap();
        assert_eq!(lifted, vec![b, c]);
        assert_eq!(tree.child_ids(root), &[a, b, c]);
        assert!(!tree.contains(wrapper));
    }

    #[test]
    fn unwrap_leaf_rejected() {
        let mut tree = PageTree::new();
        let s = section(&mut tree);
        let b = button(&mut tree, s);
        let before = tree.clone();
        assert_eq!(
            tree.unwrap(b),
            Err(TreeError::NotContainer(ComponentType::Button))
        );
        assert_eq!(tree, before);
    }

    #[test]
    fn insert_root_type_rejected() {
        let mut tree = PageTree::new();
        let s = section(&mut tree);
        let before = tree.clone();
        assert_eq!(
            tree.insert(NewNode::new(ComponentType::Root), s, 0),
            Err(TreeError::RootInsertion)
        );
        assert_eq!(tree, before);
    }

    #[test]
    fn wrap_requires_siblings() {
        let mut tree = PageTree::new();
        let a = section(&mut tree);
        let nested = button(&mut tree, a);
        assert_eq!(
            tree.wrap(&[a, nested], ComponentType::Container),
            Err(TreeError::NotSiblings)
        );
    }

    #[test]
    fn update_styles_merges_and_removes_empty() {
        let mut tree = PageTree::new();
        let s = section(&mut tree);
        let patch: StyleMap = [("color", "red"), ("padding", "")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(tree.update_styles(s, patch.clone()), Ok(true));
        let styles = &tree.get(s).unwrap().styles;
        assert_eq!(styles.get("color").map(String::as_str), Some("red"));
        assert!(!styles.contains_key("padding"));
        assert_eq!(styles.get("width").map(String::as_str), Some("100%"));
        // Same patch again changes nothing
        assert_eq!(tree.update_styles(s, patch), Ok(false));
    }

    #[test]
    fn topmost_drops_descendants() {
        let mut tree = PageTree::new();
        let s = section(&mut tree);
        let b = button(&mut tree, s);
        let other = section(&mut tree);
        assert_eq!(tree.topmost(&[b, s, other, s]), vec![s, other]);
    }
}
