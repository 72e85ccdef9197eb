// schedule.rs - Execution order from declared system dependencies
//
// Depth-first over systems in registration order. Each node is visited
// after all of its predecessors, so independent systems keep their
// registration order.

use crate::ecs::{EcsError, TypeKey};
use std::collections::HashMap;

const OPERATION: &str = "initialise";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mark {
    Unresolved,
    Resolving,
    Resolved,
}

struct Resolver<'a> {
    nodes: &'a [(TypeKey, &'a [TypeKey])],
    index_of: HashMap<TypeKey, usize>,
    marks: Vec<Mark>,
    order: Vec<usize>,
}

/// Order `nodes` (system key, predecessor keys) so every node follows its
/// predecessors. Returns indices into `nodes`.
pub(crate) fn resolve_order(nodes: &[(TypeKey, &[TypeKey])]) -> Result<Vec<usize>, EcsError> {
    let mut index_of = HashMap::with_capacity(nodes.len());
    for (index, (key, _)) in nodes.iter().enumerate() {
        index_of.entry(*key).or_insert(index);
    }

    let mut resolver = Resolver {
        nodes,
        index_of,
        marks: vec![Mark::Unresolved; nodes.len()],
        order: Vec::with_capacity(nodes.len()),
    };

    for node in 0..nodes.len() {
        if resolver.marks[node] == Mark::Unresolved {
            resolver.visit(node)?;
        }
    }
    Ok(resolver.order)
}

impl Resolver<'_> {
    fn visit(&mut self, node: usize) -> Result<(), EcsError> {
        self.marks[node] = Mark::Resolving;

        let (system, predecessors) = self.nodes[node];
        for &dependency in predecessors {
            let Some(&next) = self.index_of.get(&dependency) else {
                return Err(EcsError::InvalidSystem {
                    operation: OPERATION,
                    system: dependency,
                });
            };

            match self.marks[next] {
                Mark::Resolved => {}
                Mark::Resolving => {
                    return Err(EcsError::CircularDependency {
                        operation: OPERATION,
                        system,
                        dependency,
                    })
                }
                Mark::Unresolved => self.visit(next)?,
            }
        }

        self.marks[node] = Mark::Resolved;
        self.order.push(node);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::ErrorKind;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use std::collections::{HashMap, HashSet};

    fn keys(count: usize) -> Vec<TypeKey> {
        (0..count)
            .map(|i| TypeKey::register(["S1", "S2", "S3", "S4"][i]))
            .collect()
    }

    #[test]
    fn chain_resolves_whatever_the_registration_order() {
        let s = keys(3);
        let after_s1 = [s[0]];
        let after_s2 = [s[1]];

        let registrations: [[(TypeKey, &[TypeKey]); 3]; 3] = [
            [(s[0], &[]), (s[1], &after_s1), (s[2], &after_s2)],
            [(s[2], &after_s2), (s[1], &after_s1), (s[0], &[])],
            [(s[1], &after_s1), (s[2], &after_s2), (s[0], &[])],
        ];

        for nodes in &registrations {
            let order: Vec<TypeKey> = resolve_order(nodes)
                .unwrap()
                .into_iter()
                .map(|index| nodes[index].0)
                .collect();
            assert_eq!(order, s);
        }
    }

    #[test]
    fn independent_nodes_keep_registration_order() {
        let s = keys(4);
        let after_s4 = [s[3]];
        let nodes: [(TypeKey, &[TypeKey]); 4] =
            [(s[0], &[]), (s[1], &after_s4), (s[2], &[]), (s[3], &[])];
        assert_eq!(resolve_order(&nodes).unwrap(), vec![0, 3, 1, 2]);
    }

    #[test]
    fn mutual_dependency_is_circular() {
        let s = keys(2);
        let after_s1 = [s[0]];
        let after_s2 = [s[1]];
        let nodes: [(TypeKey, &[TypeKey]); 2] = [(s[0], &after_s2), (s[1], &after_s1)];

        let error = resolve_order(&nodes).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::CircularDependency);
    }

    #[test]
    fn self_dependency_is_circular() {
        let s = keys(1);
        let nodes: [(TypeKey, &[TypeKey]); 1] = [(s[0], &s[..1])];
        assert_eq!(
            resolve_order(&nodes).unwrap_err().kind(),
            ErrorKind::CircularDependency
        );
    }

    #[test]
    fn unknown_predecessor_is_invalid() {
        let s = keys(2);
        let nodes: [(TypeKey, &[TypeKey]); 1] = [(s[0], &s[1..])];
        assert_eq!(
            resolve_order(&nodes).unwrap_err().kind(),
            ErrorKind::InvalidSystem
        );
    }

    type Graph = Vec<(TypeKey, Vec<TypeKey>)>;

    /// Acyclic graph in shuffled registration order. Nodes are keyed in
    /// rank order and only ever follow lower ranks.
    fn random_graph(rng: &mut StdRng, size: usize) -> Graph {
        let by_rank: Vec<TypeKey> = (0..size).map(|_| TypeKey::register("node")).collect();

        let mut graph = Graph::with_capacity(size);
        for (rank, &key) in by_rank.iter().enumerate() {
            let mut predecessors = Vec::new();
            for &lower in &by_rank[..rank] {
                if rng.gen_bool(0.2) {
                    predecessors.push(lower);
                }
            }
            graph.push((key, predecessors));
        }
        if !graph[1].1.contains(&by_rank[0]) {
            graph[1].1.push(by_rank[0]);
        }

        graph.shuffle(rng);
        graph
    }

    fn as_nodes(graph: &Graph) -> Vec<(TypeKey, &[TypeKey])> {
        graph
            .iter()
            .map(|(key, predecessors)| (*key, predecessors.as_slice()))
            .collect()
    }

    #[test]
    fn random_acyclic_graphs_order_every_ancestor_first() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let graph = random_graph(&mut rng, 24);
            let order = resolve_order(&as_nodes(&graph)).unwrap();

            let slot: HashMap<TypeKey, usize> = order
                .iter()
                .enumerate()
                .map(|(at, &node)| (graph[node].0, at))
                .collect();
            assert_eq!(slot.len(), graph.len());

            let predecessors: HashMap<TypeKey, &[TypeKey]> = as_nodes(&graph).into_iter().collect();
            for (key, direct) in &graph {
                let mut seen = HashSet::new();
                let mut pending = direct.clone();
                while let Some(ancestor) = pending.pop() {
                    if seen.insert(ancestor) {
                        assert!(slot[&ancestor] < slot[key]);
                        pending.extend_from_slice(predecessors[&ancestor]);
                    }
                }
            }
        }
    }

    #[test]
    fn one_back_edge_closes_a_cycle() {
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..50 {
            let mut graph = random_graph(&mut rng, 24);

            let linked: Vec<usize> = (0..graph.len())
                .filter(|&at| !graph[at].1.is_empty())
                .collect();
            let node = linked[rng.gen_range(0..linked.len())];
            let (key, predecessors) = &graph[node];
            let (key, before) = (*key, predecessors[rng.gen_range(0..predecessors.len())]);

            let at = graph.iter().position(|(other, _)| *other == before).unwrap();
            graph[at].1.push(key);

            assert_eq!(
                resolve_order(&as_nodes(&graph)).unwrap_err().kind(),
                ErrorKind::CircularDependency
            );
        }
    }
}
