//! Rebuilds nested entity graphs from flattened join rows.
//!
//! Every read query joins a parent table with one or more optional child
//! chains (`LEFT JOIN`), so the same parent and child appear on many rows.
//! [`Materializer`] folds those rows back into the nested graph:
//!
//! - parents are deduplicated by id and kept in first-seen order;
//! - each child chain present on a row is attached by id inside its own
//!   parent's collection, one level at a time, through [`attach`];
//! - a missing (all-null) chain contributes nothing and never blocks the
//!   other chains of the same row.
//!
//! The per-query row shapes live in [`run_rows`], [`schedule_rows`] and
//! [`bid_rows`]; each only says how to build its entities and which chains to
//! follow.

pub mod bid_rows;
pub mod run_rows;
pub mod schedule_rows;

use std::collections::HashMap;

pub use bid_rows::BidRow;
pub use run_rows::RunRow;
pub use schedule_rows::ScheduleRow;

use crate::domain::{Bid, BidOption, Player, Run, Schedule, Team};
use crate::error::MarathonError;

/// An entity deduplicated by its id.
pub trait Keyed {
    /// The id used to merge repeated occurrences.
    fn key(&self) -> &str;
}

impl Keyed for Run {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl Keyed for Team {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl Keyed for Player {
    fn key(&self) -> &str {
        self.user_id.as_str()
    }
}

impl Keyed for Bid {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl Keyed for BidOption {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl Keyed for Schedule {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

/// One flattened row of a join query.
pub trait FlatRow {
    /// Top-level entity the rows fold into.
    type Parent: Keyed;

    /// Id of the parent this row belongs to.
    fn parent_key(&self) -> &str;

    /// Builds the parent with empty child collections.
    fn build_parent(&self) -> Self::Parent;

    /// Attaches every child chain present on this row to `parent`.
    fn attach_children(&self, parent: &mut Self::Parent);
}

/// Finds the child with `key` in `children`, appending one built by `build`
/// when it is not there yet.
///
/// Returns `None` when `key` is `None` (the chain is absent on this row), so
/// callers can stop descending. The returned child lets the caller process
/// the next level even when the child already existed.
pub fn attach<'a, C, F>(children: &'a mut Vec<C>, key: Option<&str>, build: F) -> Option<&'a mut C>
where
    C: Keyed,
    F: FnOnce() -> C,
{
    let key = key?;
    if let Some(pos) = children.iter().position(|child| child.key() == key) {
        return children.get_mut(pos);
    }
    children.push(build());
    children.last_mut()
}

/// Ordered map of parents being assembled from rows.
#[derive(Debug)]
pub struct Materializer<P> {
    parents: Vec<P>,
    index: HashMap<String, usize>,
}

impl<P: Keyed> Materializer<P> {
    /// Creates an empty materializer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parents: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Folds one row into the graph.
    pub fn push<R>(&mut self, row: &R)
    where
        R: FlatRow<Parent = P>,
    {
        let slot = match self.index.get(row.parent_key()) {
            Some(&slot) => slot,
            None => {
                let slot = self.parents.len();
                self.parents.push(row.build_parent());
                self.index.insert(row.parent_key().to_owned(), slot);
                slot
            }
        };
        if let Some(parent) = self.parents.get_mut(slot) {
            row.attach_children(parent);
        }
    }

    /// Number of distinct parents seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Returns `true` when no row has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Returns the parents in first-seen order.
    #[must_use]
    pub fn finish(self) -> Vec<P> {
        self.parents
    }
}

impl<P: Keyed> Default for Materializer<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Materializes every parent in `rows`, in first-seen order.
#[must_use]
pub fn materialize<R: FlatRow>(rows: &[R]) -> Vec<R::Parent> {
    let mut materializer = Materializer::new();
    for row in rows {
        materializer.push(row);
    }
    materializer.finish()
}

/// Materializes the single parent with `id`.
///
/// Rows for other parents are ignored.
///
/// # Errors
///
/// Returns [`MarathonError::NotFound`] when no row belongs to `id`.
pub fn materialize_one<R: FlatRow>(
    rows: &[R],
    entity: &'static str,
    id: &str,
) -> Result<R::Parent, MarathonError> {
    let mut materializer = Materializer::new();
    for row in rows.iter().filter(|row| row.parent_key() == id) {
        materializer.push(row);
    }
    materializer
        .finish()
        .into_iter()
        .next()
        .ok_or_else(|| MarathonError::not_found(entity, id))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Node {
        id: String,
        children: Vec<Node>,
    }

    impl Keyed for Node {
        fn key(&self) -> &str {
            &self.id
        }
    }

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            children: Vec::new(),
        }
    }

    struct Pair(&'static str, Option<&'static str>);

    impl FlatRow for Pair {
        type Parent = Node;

        fn parent_key(&self) -> &str {
            self.0
        }

        fn build_parent(&self) -> Node {
            node(self.0)
        }

        fn attach_children(&self, parent: &mut Node) {
            attach(&mut parent.children, self.1, || node(self.1.unwrap_or_default()));
        }
    }

    #[test]
    fn attach_skips_absent_chain() {
        let mut children: Vec<Node> = Vec::new();
        assert!(attach(&mut children, None, || node("x")).is_none());
        assert!(children.is_empty());
    }

    #[test]
    fn attach_reuses_existing_child() {
        let mut children = vec![node("a")];
        let Some(child) = attach(&mut children, Some("a"), || node("other")) else {
            panic!("expected existing child");
        };
        child.children.push(node("grandchild"));
        assert_eq!(children.len(), 1);
        let Some(first) = children.first() else {
            panic!("missing child");
        };
        assert_eq!(first.children.len(), 1);
    }

    #[test]
    fn parents_keep_first_seen_order() {
        let rows = [Pair("p2", None), Pair("p1", Some("c1")), Pair("p2", Some("c2"))];
        let parents = materialize(&rows);
        let ids: Vec<&str> = parents.iter().map(Keyed::key).collect();
        assert_eq!(ids, ["p2", "p1"]);
    }

    #[test]
    fn repeated_children_are_merged() {
        let rows = [
            Pair("p1", Some("c1")),
            Pair("p1", Some("c2")),
            Pair("p1", Some("c1")),
        ];
        let parents = materialize(&rows);
        let Some(parent) = parents.first() else {
            panic!("expected a parent");
        };
        let ids: Vec<&str> = parent.children.iter().map(Keyed::key).collect();
        assert_eq!(ids, ["c1", "c2"]);
    }

    #[test]
    fn parent_without_children_has_empty_collection() {
        let parents = materialize(&[Pair("p1", None)]);
        assert_eq!(parents, vec![node("p1")]);
    }

    #[test]
    fn materialize_one_filters_by_id() {
        let rows = [Pair("p1", Some("c1")), Pair("p2", Some("c2"))];
        let Ok(parent) = materialize_one(&rows, "node", "p2") else {
            panic!("expected p2");
        };
        assert_eq!(parent.id, "p2");
        assert_eq!(parent.children.len(), 1);
    }

    #[test]
    fn materialize_one_without_rows_is_not_found() {
        let rows: [Pair; 0] = [];
        let result = materialize_one(&rows, "run", "missing");
        assert!(matches!(result, Err(MarathonError::NotFound { entity: "run", .. })));
    }

    #[test]
    fn materializer_counts_distinct_parents() {
        let mut materializer = Materializer::new();
        assert!(materializer.is_empty());
        materializer.push(&Pair("p1", None));
        materializer.push(&Pair("p1", Some("c1")));
        assert_eq!(materializer.len(), 1);
    }
}
