//! State nodes: the structural layer of a grammar graph.
//!
//! Nodes live in a [`StateArena`] and refer to each other by [`StateId`].
//! Each node has a kind (what it matches itself), an optional token to emit
//! for its own match, and an ordered list of branch states tried as its
//! continuation once its own match succeeds.
//!
//! # Graphs, not trees
//!
//! The same state may appear in several branch lists, and branch lists may
//! link back to an ancestor. [`StateArena::instantiate`] copies the subgraph
//! reachable from a root to fresh indices, preserving that sharing, so a
//! template can be linked into several places without one instance's
//! continuations leaking into another's.
//!
//! Arenas are only mutated while a grammar is being built; scanning borrows
//! them immutably.

mod serialize;

pub(crate) use serialize::serialize_state;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;
use strand_ir::TokenId;

use crate::{GrammarError, RuleAnnotations, RuleId};

/// Index into a [`StateArena`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct StateId(u32);

impl StateId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        StateId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateId({})", self.0)
    }
}

/// What a node matches before its continuations run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StateKind {
    /// Evaluate one rule; emits the node's token, or the rule's own.
    Terminal { rule: RuleId },
    /// Run `child` repeatedly, at least `min` and at most `max` times, and
    /// emit one token spanning every repetition.
    Repeat {
        child: StateId,
        min: u32,
        max: Option<u32>,
    },
    /// Match nothing itself; the branch list is an ordered alternation and
    /// the node succeeds when one alternative does.
    Branch,
}

/// One node of a grammar graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateNode {
    pub kind: StateKind,
    /// Token emitted for this node's own match. `None` on a terminal means
    /// the rule's token; `None` on a repeat means the span is left pending
    /// for the next emission.
    pub token: Option<TokenId>,
    pub annotations: RuleAnnotations,
    pub branches: SmallVec<[StateId; 2]>,
}

impl StateNode {
    pub fn new(kind: StateKind) -> Self {
        StateNode {
            kind,
            token: None,
            annotations: RuleAnnotations::default(),
            branches: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: TokenId) -> Self {
        self.token = Some(token);
        self
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: RuleAnnotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// States this node refers to, child before branches.
    fn successors(&self) -> impl Iterator<Item = StateId> + '_ {
        let child = match self.kind {
            StateKind::Repeat { child, .. } => Some(child),
            StateKind::Terminal { .. } | StateKind::Branch => None,
        };
        child.into_iter().chain(self.branches.iter().copied())
    }
}

/// Flat storage for state nodes.
#[derive(Clone, Debug, Default)]
pub struct StateArena {
    nodes: Vec<StateNode>,
}

impl StateArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if more than `u32::MAX` states are allocated.
    pub fn alloc(&mut self, node: StateNode) -> StateId {
        let raw = u32::try_from(self.nodes.len())
            .unwrap_or_else(|_| panic!("state arena exceeded {} entries", u32::MAX));
        self.nodes.push(node);
        StateId(raw)
    }

    pub fn terminal(&mut self, rule: RuleId) -> StateId {
        self.alloc(StateNode::new(StateKind::Terminal { rule }))
    }

    /// Allocate a repeat. `min` and `max` are inclusive.
    pub fn repeat(
        &mut self,
        child: StateId,
        min: u32,
        max: Option<u32>,
    ) -> Result<StateId, GrammarError> {
        self.node(child)?;
        if let Some(max) = max {
            if min > max {
                return Err(GrammarError::InvalidRepeatBounds { min, max });
            }
        }
        Ok(self.alloc(StateNode::new(StateKind::Repeat { child, min, max })))
    }

    /// Allocate an alternation over `branches`, tried in order.
    pub fn branch(
        &mut self,
        branches: impl IntoIterator<Item = StateId>,
    ) -> Result<StateId, GrammarError> {
        let id = self.alloc(StateNode::new(StateKind::Branch));
        for to in branches {
            self.link(id, to)?;
        }
        Ok(id)
    }

    pub fn get(&self, id: StateId) -> Option<&StateNode> {
        self.nodes.get(id.index())
    }

    /// Like [`get`](Self::get), but a dangling id is an error.
    pub fn node(&self, id: StateId) -> Result<&StateNode, GrammarError> {
        self.get(id).ok_or(GrammarError::UnknownState(id))
    }

    pub fn node_mut(&mut self, id: StateId) -> Result<&mut StateNode, GrammarError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(GrammarError::UnknownState(id))
    }

    /// Append `to` to `from`'s branch list.
    pub fn link(&mut self, from: StateId, to: StateId) -> Result<(), GrammarError> {
        self.node(to)?;
        self.node_mut(from)?.branches.push(to);
        Ok(())
    }

    pub fn set_token(&mut self, id: StateId, token: Option<TokenId>) -> Result<(), GrammarError> {
        self.node_mut(id)?.token = token;
        Ok(())
    }

    pub fn branches(&self, id: StateId) -> Result<&[StateId], GrammarError> {
        Ok(&self.node(id)?.branches)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Copy the subgraph reachable from `root` to fresh indices and return
    /// the copy's root.
    ///
    /// Every node reachable from `root` (through repeat children and branch
    /// lists) is duplicated exactly once; edges between copied nodes are
    /// remapped, so sharing and cycles inside the subgraph are preserved and
    /// no branch list is shared with the original. Tokens, annotations and
    /// rule references are carried over unchanged.
    pub fn instantiate(&mut self, root: StateId) -> Result<StateId, GrammarError> {
        // Discover reachable nodes in first-visit order.
        let mut order = Vec::new();
        let mut remap: FxHashMap<StateId, StateId> = FxHashMap::default();
        let mut stack = vec![root];
        let base = self.nodes.len();
        while let Some(id) = stack.pop() {
            if remap.contains_key(&id) {
                continue;
            }
            let node = self.node(id)?;
            let fresh = u32::try_from(base + order.len())
                .unwrap_or_else(|_| panic!("state arena exceeded {} entries", u32::MAX));
            remap.insert(id, StateId(fresh));
            order.push(id);
            // Reverse so the first successor is visited first.
            let successors: SmallVec<[StateId; 4]> = node.successors().collect();
            stack.extend(successors.into_iter().rev());
        }

        for &old in &order {
            let mut copy = self.node(old)?.clone();
            if let StateKind::Repeat { child, .. } = &mut copy.kind {
                *child = remap[&*child];
            }
            for branch in &mut copy.branches {
                *branch = remap[&*branch];
            }
            self.nodes.push(copy);
        }

        Ok(remap[&root])
    }
}
