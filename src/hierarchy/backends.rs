use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::hierarchy::expander::{Hierarchy, HierarchyExpander};

/// A taxonomy term with an optional parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub weight: i32,
}

/// Terms stored with parent links; children are derived from the table.
#[derive(Debug, Clone, Default)]
pub struct TermTree {
    terms: BTreeMap<String, Term>,
}

impl TermTree {
    pub fn new(terms: impl IntoIterator<Item = Term>) -> Self {
        Self {
            terms: terms.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    pub fn load(&self, id: &str) -> Option<Term> {
        self.terms.get(id).cloned()
    }

    /// Direct children ordered by weight, then id.
    pub fn children_of(&self, term: &Term) -> Vec<Term> {
        let mut children: Vec<Term> = self
            .terms
            .values()
            .filter(|t| t.parent.as_deref() == Some(term.id.as_str()))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.weight.cmp(&b.weight).then_with(|| a.id.cmp(&b.id)));
        children
    }

    pub fn into_hierarchy(self) -> Arc<dyn Hierarchy> {
        let store = Arc::new(self);
        let load_store = Arc::clone(&store);
        let child_store = store;

        Arc::new(HierarchyExpander::new(
            move |id: &str| load_store.load(id),
            move |term: &Term| child_store.children_of(term),
            |term: &Term| term.id.clone(),
        ))
    }
}

/// A concept with explicit narrower links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub id: String,
    #[serde(default)]
    pub narrower: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConceptScheme {
    concepts: BTreeMap<String, Concept>,
}

impl ConceptScheme {
    pub fn new(concepts: impl IntoIterator<Item = Concept>) -> Self {
        Self {
            concepts: concepts.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }

    pub fn load(&self, id: &str) -> Option<Concept> {
        self.concepts.get(id).cloned()
    }

    /// Narrower concepts in declaration order; dangling links are dropped.
    pub fn children_of(&self, concept: &Concept) -> Vec<Concept> {
        concept
            .narrower
            .iter()
            .filter_map(|id| self.load(id))
            .collect()
    }

    pub fn into_hierarchy(self) -> Arc<dyn Hierarchy> {
        let store = Arc::new(self);
        let load_store = Arc::clone(&store);
        let child_store = store;

        Arc::new(HierarchyExpander::new(
            move |id: &str| load_store.load(id),
            move |concept: &Concept| child_store.children_of(concept),
            |concept: &Concept| concept.id.clone(),
        ))
    }
}
