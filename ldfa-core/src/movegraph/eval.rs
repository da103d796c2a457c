//! Move graph evaluator (`spec.md` §4.5): processes nodes in topological
//! (index) order, realizing each node's accumulator into an LDFA before
//! walking its outgoing edges and pushing a clause into each target node's
//! accumulator.
use std::collections::HashMap;

use crate::error::Result;
use crate::hash::Hash256;
use crate::ldfa::Ldfa;
use crate::movegraph::dnf::DnfAccumulator;
use crate::movegraph::{MoveEdge, MoveGraph};

/// Caches the sequential intersection of a node's realized LDFA against a
/// prefix of pre-guards, scoped to a single node's outgoing edge list — an
/// edge whose pre-guards share a prefix with a previously processed sibling
/// reuses that sibling's intermediate result instead of recomputing it.
struct IntersectionCache {
    node_ldfa: Ldfa,
    cache: HashMap<Vec<Hash256>, Ldfa>,
}

impl IntersectionCache {
    fn new(node_ldfa: Ldfa) -> Self {
        IntersectionCache {
            node_ldfa,
            cache: HashMap::new(),
        }
    }

    fn intersect_prefix(&mut self, pre_guards: &[Ldfa]) -> Result<Ldfa> {
        let mut key: Vec<Hash256> = Vec::with_capacity(pre_guards.len());
        let mut acc = self.node_ldfa.clone();
        for guard in pre_guards {
            key.push(guard.content_hash());
            if let Some(cached) = self.cache.get(&key) {
                acc = cached.clone();
                continue;
            }
            acc = acc.intersection(guard)?;
            self.cache.insert(key.clone(), acc.clone());
            if acc.is_reject() {
                break;
            }
        }
        Ok(acc)
    }
}

/// Sorts `edges` so that edges whose pre-guard lists share a long common
/// prefix end up adjacent, maximizing [`IntersectionCache`] reuse.
fn order_for_cache_reuse<'a>(edges: &mut [&'a MoveEdge]) {
    edges.sort_by_key(|e| {
        e.pre_guards
            .iter()
            .map(|g| g.content_hash())
            .collect::<Vec<_>>()
    });
}

/// Compiles `graph` against `positions_in` (the LDFA seeded at the begin
/// node), returning the LDFA realized at the end node: "apply one ply to a
/// set of positions".
pub fn evaluate(graph: &MoveGraph, positions_in: &Ldfa) -> Result<Ldfa> {
    let shape = positions_in.shape().clone();
    let mut accumulators: Vec<DnfAccumulator> = (0..graph.node_count())
        .map(|_| DnfAccumulator::new(shape.clone()))
        .collect();
    accumulators[graph.begin_node()].push_clause(vec![positions_in.clone()])?;

    for node in 0..graph.node_count() {
        let node_ldfa = accumulators[node].to_dfa()?;
        if node_ldfa.is_reject() {
            continue;
        }

        let mut edges: Vec<&MoveEdge> = graph.edges_from(node).collect();
        order_for_cache_reuse(&mut edges);

        let mut cache = IntersectionCache::new(node_ldfa);
        for edge in edges {
            let guarded = cache.intersect_prefix(&edge.pre_guards)?;
            if guarded.is_reject() {
                continue;
            }
            let image = guarded.apply_change(&edge.change)?;
            if !image.has_reachable_accepting_state() {
                continue;
            }

            let mut clause = edge.post_guards.clone();
            clause.push(image);
            accumulators[edge.to].push_clause(clause)?;
        }
    }

    accumulators[graph.end_node()].to_dfa()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldfa::change::ChangeVector;
    use crate::ldfa::constructors;
    use crate::shape::{PositionString, Shape};

    #[test]
    fn single_edge_applies_change_under_guard() {
        // shape [2]^2, one edge moving a token from layer 0 to layer 1:
        // before=1 at layer 0, after=1 at layer 1, layer 0 becomes 0.
        let shape = Shape::new(vec![2, 2]);
        let mut graph = MoveGraph::new();
        let begin = graph.add_node("begin").unwrap();
        let end = graph.add_node("end").unwrap();
        let mut change: ChangeVector = vec![None; 2];
        change[0] = Some((1, 0));
        change[1] = Some((0, 1));
        graph
            .add_edge("move", begin, end, vec![], change, vec![])
            .unwrap();

        let input = constructors::from_strings(&shape, &[PositionString::from(vec![1, 0])]).unwrap();
        let output = evaluate(&graph, &input).unwrap();

        assert!(output.contains(&PositionString::from(vec![0, 1])));
        assert!(!output.contains(&PositionString::from(vec![1, 0])));
        assert_eq!(output.size_exact_u128(), Some(1));
    }

    #[test]
    fn edge_with_unsatisfied_pre_guard_contributes_nothing() {
        let shape = Shape::new(vec![2, 2]);
        let mut graph = MoveGraph::new();
        let begin = graph.add_node("begin").unwrap();
        let end = graph.add_node("end").unwrap();
        let never = constructors::reject(shape.clone()).unwrap();
        graph
            .add_edge("move", begin, end, vec![never], vec![None; 2], vec![])
            .unwrap();

        let input = constructors::accept(shape).unwrap();
        let output = evaluate(&graph, &input).unwrap();
        assert!(output.is_reject() || !output.has_reachable_accepting_state());
    }

    #[test]
    fn two_edges_union_at_shared_target() {
        let shape = Shape::new(vec![3]);
        let mut graph = MoveGraph::new();
        let begin = graph.add_node("begin").unwrap();
        let end = graph.add_node("end").unwrap();

        let mut to_one: ChangeVector = vec![None; 1];
        to_one[0] = Some((0, 1));
        graph
            .add_edge("to_one", begin, end, vec![], to_one, vec![])
            .unwrap();

        let mut to_two: ChangeVector = vec![None; 1];
        to_two[0] = Some((0, 2));
        graph
            .add_edge("to_two", begin, end, vec![], to_two, vec![])
            .unwrap();

        let input = constructors::from_strings(&shape, &[PositionString::from(vec![0])]).unwrap();
        let output = evaluate(&graph, &input).unwrap();

        assert!(output.contains(&PositionString::from(vec![1])));
        assert!(output.contains(&PositionString::from(vec![2])));
        assert!(!output.contains(&PositionString::from(vec![0])));
    }

    #[test]
    fn reverse_graph_inverts_change_direction() {
        let shape = Shape::new(vec![2]);
        let mut graph = MoveGraph::new();
        let begin = graph.add_node("begin").unwrap();
        let end = graph.add_node("end").unwrap();
        let mut change: ChangeVector = vec![None; 1];
        change[0] = Some((0, 1));
        graph
            .add_edge("flip", begin, end, vec![], change, vec![])
            .unwrap();

        let reversed = graph.reverse();
        let input = constructors::from_strings(&shape, &[PositionString::from(vec![1])]).unwrap();
        let output = evaluate(&reversed, &input).unwrap();
        assert!(output.contains(&PositionString::from(vec![0])));
    }
}
