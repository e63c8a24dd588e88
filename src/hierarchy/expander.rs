use std::collections::BTreeSet;
use std::marker::PhantomData;

/// Expansion of a concept id into itself plus every transitive descendant.
pub trait Hierarchy: Send + Sync {
    /// Depth-first, pre-order; the first element is always `id`.
    fn get_hierarchy(&self, id: &str) -> Vec<String>;
}

/// Depth-first accumulation shared by every hierarchy backend.
///
/// Backends differ only in how a node is loaded and how its children are
/// fetched, so both are injected. Nodes already visited are skipped, which
/// keeps a cyclic taxonomy from looping forever. Traversal uses an explicit
/// stack, so depth is bounded by memory rather than the call stack.
pub struct HierarchyExpander<N, L, C, I>
where
    L: Fn(&str) -> Option<N>,
    C: Fn(&N) -> Vec<N>,
    I: Fn(&N) -> String,
{
    load: L,
    children_of: C,
    id_of: I,
    _node: PhantomData<fn() -> N>,
}

impl<N, L, C, I> HierarchyExpander<N, L, C, I>
where
    L: Fn(&str) -> Option<N>,
    C: Fn(&N) -> Vec<N>,
    I: Fn(&N) -> String,
{
    pub fn new(load: L, children_of: C, id_of: I) -> Self {
        Self {
            load,
            children_of,
            id_of,
            _node: PhantomData,
        }
    }

    pub fn expand(&self, id: &str) -> Vec<String> {
        let mut out = vec![id.to_string()];
        let mut visited = BTreeSet::from([id.to_string()]);

        let Some(root) = (self.load)(id) else {
            return out;
        };

        // Children are pushed reversed so the first child is expanded first.
        let mut stack: Vec<N> = (self.children_of)(&root).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            let node_id = (self.id_of)(&node);
            if !visited.insert(node_id.clone()) {
                continue;
            }
            out.push(node_id);
            stack.extend((self.children_of)(&node).into_iter().rev());
        }

        out
    }
}

impl<N, L, C, I> Hierarchy for HierarchyExpander<N, L, C, I>
where
    L: Fn(&str) -> Option<N> + Send + Sync,
    C: Fn(&N) -> Vec<N> + Send + Sync,
    I: Fn(&N) -> String + Send + Sync,
{
    fn get_hierarchy(&self, id: &str) -> Vec<String> {
        self.expand(id)
    }
}
