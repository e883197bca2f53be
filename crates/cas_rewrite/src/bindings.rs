//! Placeholder bindings produced by a successful match.

use cas_ast::{ExprId, Placeholder};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::ops::Range;

/// Values bound to the placeholders of a pattern during one match attempt.
///
/// Plain placeholders (`#a`) live in the scalar table; subscripted ones
/// (`#b_0`, `#b_1`, ...) live in a per-family map from index to value. The
/// two namespaces are independent, so `#a` and `#a_0` never collide.
///
/// When a variable-length group inside a sum unwraps a negated operand, the
/// sign is recorded against the family index it was bound to, so the rewrite
/// can put it back.
///
/// Bindings are plain values: speculative matching works on a clone and
/// commits it only on success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    scalars: FxHashMap<String, ExprId>,
    families: FxHashMap<String, BTreeMap<usize, ExprId>>,
    negations: FxHashMap<String, BTreeMap<usize, bool>>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert), for populating patterns by hand.
    pub fn bind(mut self, name: &str, value: ExprId) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder-style [`insert_indexed`](Self::insert_indexed).
    pub fn bind_indexed(mut self, name: &str, index: usize, value: ExprId) -> Self {
        self.insert_indexed(name, index, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: ExprId) {
        self.scalars.insert(name.to_string(), value);
    }

    pub fn insert_indexed(&mut self, name: &str, index: usize, value: ExprId) {
        self.families
            .entry(name.to_string())
            .or_default()
            .insert(index, value);
    }

    pub fn get(&self, name: &str) -> Option<ExprId> {
        self.scalars.get(name).copied()
    }

    pub fn get_indexed(&self, name: &str, index: usize) -> Option<ExprId> {
        self.families.get(name)?.get(&index).copied()
    }

    /// Value bound to `placeholder`, reading the family table for
    /// subscripted placeholders.
    pub fn lookup(&self, placeholder: &Placeholder) -> Option<ExprId> {
        match placeholder.subscript {
            Some(index) => self.get_indexed(&placeholder.name, index),
            None => self.get(&placeholder.name),
        }
    }

    pub fn family(&self, name: &str) -> Option<&BTreeMap<usize, ExprId>> {
        self.families.get(name)
    }

    /// One past the largest bound index of a family.
    pub fn family_len(&self, name: &str) -> Option<usize> {
        self.families
            .get(name)?
            .keys()
            .next_back()
            .map(|last| last + 1)
    }

    pub fn has_scalar(&self, name: &str) -> bool {
        self.scalars.contains_key(name)
    }

    pub fn has_family(&self, name: &str) -> bool {
        self.families.contains_key(name)
    }

    pub fn record_negation(&mut self, family: &str, index: usize, minus: bool) {
        self.negations
            .entry(family.to_string())
            .or_default()
            .insert(index, minus);
    }

    /// `Some(minus)` when the operand bound at `family[index]` was unwrapped
    /// from a negation; `minus` is that negation's subtraction flag.
    pub fn negation(&self, family: &str, index: usize) -> Option<bool> {
        self.negations.get(family)?.get(&index).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty() && self.families.is_empty()
    }

    /// Every bound value with the name it was bound under; family members
    /// report the family name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ExprId)> + '_ {
        let scalars = self.scalars.iter().map(|(name, &id)| (name.as_str(), id));
        let members = self
            .families
            .iter()
            .flat_map(|(name, family)| family.values().map(move |&id| (name.as_str(), id)));
        scalars.chain(members)
    }
}

/// A successful match of a rule against one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The matched node.
    pub node: ExprId,
    pub bindings: Bindings,
    /// The slice of `node`'s operands consumed by a partial sum/product
    /// match. `None` when the whole node matched.
    pub range: Option<Range<usize>>,
}

impl Match {
    pub fn whole(node: ExprId, bindings: Bindings) -> Self {
        Match {
            node,
            bindings,
            range: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cas_ast::Context;

    #[test]
    fn scalar_and_family_namespaces_are_separate() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let y = ctx.var("y");

        let bindings = Bindings::new().bind("a", x).bind_indexed("a", 0, y);
        assert_eq!(bindings.get("a"), Some(x));
        assert_eq!(bindings.get_indexed("a", 0), Some(y));
        assert_eq!(bindings.lookup(&Placeholder::indexed("a", 0)), Some(y));
        assert_eq!(bindings.lookup(&Placeholder::new("a")), Some(x));
    }

    #[test]
    fn family_len_is_max_index_plus_one() {
        let mut ctx = Context::new();
        let x = ctx.var("x");

        let mut bindings = Bindings::new();
        assert_eq!(bindings.family_len("b"), None);
        bindings.insert_indexed("b", 0, x);
        bindings.insert_indexed("b", 2, x);
        assert_eq!(bindings.family_len("b"), Some(3));
    }

    #[test]
    fn clones_do_not_share_state() {
        let mut ctx = Context::new();
        let x = ctx.var("x");

        let committed = Bindings::new().bind("a", x);
        let mut attempt = committed.clone();
        attempt.insert("b", x);
        attempt.record_negation("c", 1, true);

        assert!(!committed.has_scalar("b"));
        assert_eq!(committed.negation("c", 1), None);
        assert_eq!(attempt.negation("c", 1), Some(true));
    }
}
