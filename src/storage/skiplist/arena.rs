use std::sync::Arc;

use crate::storage::record::Entry;
use crate::types::{Error, Result};

/// Stable index of a node inside its [`Arena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) struct NodeId(u32);

impl NodeId {
    /// The sentinel header, always slot zero.
    pub(crate) const HEAD: NodeId = NodeId(0);
    /// End of a chain.
    pub(crate) const NIL: NodeId = NodeId(u32::MAX);

    #[inline]
    pub(crate) fn is_nil(self) -> bool {
        self == Self::NIL
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

pub(crate) struct Node {
    pub(crate) score: u64,
    /// `None` only for the header.
    pub(crate) entry: Option<Arc<Entry>>,
    /// One forward link per level this node takes part in.
    pub(crate) levels: Vec<NodeId>,
}

impl Node {
    #[inline]
    pub(crate) fn key(&self) -> &[u8] {
        match &self.entry {
            Some(entry) => &entry.key,
            None => &[],
        }
    }

    #[inline]
    pub(crate) fn height(&self) -> usize {
        self.levels.len()
    }
}

/// Owns every node of one skip list. Nodes are only ever appended, so a
/// [`NodeId`] stays valid until [`Arena::reset`].
pub(crate) struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    pub(crate) fn new(max_level: usize) -> Self {
        let mut arena = Self { nodes: Vec::new() };
        arena.reset(max_level);
        arena
    }

    /// Drops every node and leaves a fresh header spanning `max_level` levels.
    pub(crate) fn reset(&mut self, max_level: usize) {
        self.nodes.clear();
        self.nodes.shrink_to_fit();
        self.nodes.push(Node {
            score: 0,
            entry: None,
            levels: vec![NodeId::NIL; max_level],
        });
    }

    pub(crate) fn alloc(&mut self, score: u64, entry: Arc<Entry>, height: usize) -> Result<NodeId> {
        let slot = u32::try_from(self.nodes.len())
            .ok()
            .filter(|slot| *slot != NodeId::NIL.0)
            .ok_or(Error::ArenaFull)?;
        self.nodes.push(Node {
            score,
            entry: Some(entry),
            levels: vec![NodeId::NIL; height],
        });
        Ok(NodeId(slot))
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn next(&self, id: NodeId, level: usize) -> NodeId {
        self.nodes[id.index()].levels[level]
    }

    #[inline]
    pub(crate) fn set_next(&mut self, id: NodeId, level: usize, to: NodeId) {
        self.nodes[id.index()].levels[level] = to;
    }

    /// Number of slots in use, header included.
    pub(crate) fn slots(&self) -> usize {
        self.nodes.len()
    }
}
