//! Frame graph compilation: ordering, lifetimes and aliasing.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::GraphError;

use super::pass::PassId;
use super::resource::{ResourceAccess, TargetId};
use super::FrameGraph;

/// Span of execution positions during which a target holds live data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifetime {
    /// Position in the compiled order of the first access.
    pub first: usize,
    /// Position in the compiled order of the last access.
    pub last: usize,
}

impl Lifetime {
    /// True if the two spans share no position.
    pub fn is_disjoint(&self, other: &Lifetime) -> bool {
        self.last < other.first || other.last < self.first
    }
}

/// One backing store shared by one or more targets.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalTarget {
    /// Resolved pixel size.
    pub size: (u32, u32),
    /// Targets assigned to this store, in order of first use.
    pub targets: Vec<TargetId>,
    /// Accepts further reusable targets.
    pub shareable: bool,
    last_use: usize,
}

/// A frame graph ready for execution.
#[derive(Debug, Clone)]
pub struct CompiledFrameGraph {
    order: Vec<PassId>,
    lifetimes: Vec<Option<Lifetime>>,
    persistent: Vec<bool>,
    assignment: Vec<Option<usize>>,
    physical: Vec<PhysicalTarget>,
    surface: (u32, u32),
}

impl CompiledFrameGraph {
    /// Pass execution order.
    pub fn order(&self) -> &[PassId] {
        &self.order
    }

    /// Live span of a target; `None` if no pass touches it.
    pub fn lifetime(&self, target: TargetId) -> Option<Lifetime> {
        self.lifetimes[target.index()]
    }

    /// True if the target is read before it is written within a frame.
    pub fn is_persistent(&self, target: TargetId) -> bool {
        self.persistent[target.index()]
    }

    /// Backing store index of a target.
    pub fn physical_index(&self, target: TargetId) -> Option<usize> {
        self.assignment[target.index()]
    }

    /// Every backing store.
    pub fn physical(&self) -> &[PhysicalTarget] {
        &self.physical
    }

    /// Surface size the sizes were resolved against.
    pub fn surface(&self) -> (u32, u32) {
        self.surface
    }
}

impl FrameGraph {
    /// Compile the graph for execution against a surface size.
    ///
    /// This performs:
    /// - Dependency extraction from target accesses plus explicit edges
    /// - Kahn's topological sort, stable by declaration order
    /// - Lifetime analysis over the sorted order
    /// - Greedy aliasing of reusable, same-sized targets
    pub fn compile(&self, surface: (u32, u32)) -> Result<CompiledFrameGraph, GraphError> {
        let order = self.sort()?;

        let target_count = self.targets().len();
        let mut lifetimes: Vec<Option<Lifetime>> = vec![None; target_count];
        let mut written = vec![false; target_count];
        let mut persistent = vec![false; target_count];

        for (position, &pass) in order.iter().enumerate() {
            for (target, access) in self.pass(pass).accesses() {
                let i = target.index();
                if access.reads() && !written[i] {
                    persistent[i] = true;
                }
                if access.writes() {
                    written[i] = true;
                }
                lifetimes[i] = Some(match lifetimes[i] {
                    Some(span) => Lifetime {
                        first: span.first,
                        last: position,
                    },
                    None => Lifetime {
                        first: position,
                        last: position,
                    },
                });
            }
        }

        let (assignment, physical) = self.alias(&lifetimes, &persistent, surface);

        log::debug!(
            "Compiled frame graph: {} passes, {} targets on {} stores",
            order.len(),
            target_count,
            physical.len()
        );

        Ok(CompiledFrameGraph {
            order,
            lifetimes,
            persistent,
            assignment,
            physical,
            surface,
        })
    }

    fn dependency_edges(&self) -> Vec<(usize, usize)> {
        let target_count = self.targets().len();
        let mut last_writer: Vec<Option<usize>> = vec![None; target_count];
        let mut readers: Vec<Vec<usize>> = vec![Vec::new(); target_count];
        // (from, to): `to` runs after `from`.
        let mut edges = Vec::new();

        for (index, pass) in self.passes().iter().enumerate() {
            for (target, access) in pass.accesses() {
                let i = target.index();
                match access {
                    ResourceAccess::Read => {
                        if let Some(writer) = last_writer[i] {
                            edges.push((writer, index));
                        }
                        readers[i].push(index);
                    }
                    ResourceAccess::Write => {
                        for &reader in &readers[i] {
                            edges.push((reader, index));
                        }
                        if let Some(writer) = last_writer[i] {
                            edges.push((writer, index));
                        }
                        readers[i].clear();
                        last_writer[i] = Some(index);
                    }
                }
            }
        }

        for &(dependent, dependency) in self.explicit_dependencies() {
            edges.push((dependency.index(), dependent.index()));
        }
        edges.retain(|&(from, to)| from != to);
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    fn sort(&self) -> Result<Vec<PassId>, GraphError> {
        let count = self.pass_count();
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut in_degree = vec![0usize; count];
        for (from, to) in self.dependency_edges() {
            successors[from].push(to);
            in_degree[to] += 1;
        }

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(index, _)| Reverse(index))
            .collect();

        let mut order = Vec::with_capacity(count);
        while let Some(Reverse(index)) = ready.pop() {
            order.push(PassId(index as u32));
            for &next in &successors[index] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if order.len() != count {
            let stuck = in_degree
                .iter()
                .position(|&degree| degree > 0)
                .unwrap_or_default();
            return Err(GraphError::CyclicDependency {
                pass: self.passes()[stuck].name().to_string(),
            });
        }
        Ok(order)
    }

    fn alias(
        &self,
        lifetimes: &[Option<Lifetime>],
        persistent: &[bool],
        surface: (u32, u32),
    ) -> (Vec<Option<usize>>, Vec<PhysicalTarget>) {
        let mut assignment = vec![None; lifetimes.len()];
        let mut physical: Vec<PhysicalTarget> = Vec::new();

        let mut by_first_use: Vec<(usize, Lifetime)> = lifetimes
            .iter()
            .enumerate()
            .filter_map(|(index, span)| span.map(|span| (index, span)))
            .collect();
        by_first_use.sort_by_key(|(index, span)| (span.first, *index));

        for (index, span) in by_first_use {
            let desc = &self.targets()[index].desc;
            let size = desc.size.resolve(surface);
            let shareable = desc.allow_reuse && !persistent[index];

            let slot = shareable
                .then(|| {
                    physical
                        .iter()
                        .position(|p| p.shareable && p.size == size && p.last_use < span.first)
                })
                .flatten();

            let slot = match slot {
                Some(slot) => {
                    let store = &mut physical[slot];
                    store.targets.push(TargetId(index as u32));
                    store.last_use = span.last;
                    slot
                }
                None => {
                    physical.push(PhysicalTarget {
                        size,
                        targets: vec![TargetId(index as u32)],
                        shareable,
                        last_use: span.last,
                    });
                    physical.len() - 1
                }
            };
            assignment[index] = Some(slot);
        }

        (assignment, physical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PassKind;
    use lumenwall_core::scene::RenderTargetDesc;

    fn reusable(graph: &mut FrameGraph, name: &str) -> TargetId {
        graph.declare_target(name, RenderTargetDesc::absolute(64, 64).with_reuse(true))
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let mut graph = FrameGraph::new();
        let a = reusable(&mut graph, "_rt_a");
        let b = reusable(&mut graph, "_rt_b");
        graph.add_pass("clear a", PassKind::Clear { target: a, color: [0.0; 4] });
        graph.add_pass("clear b", PassKind::Clear { target: b, color: [0.0; 4] });
        graph.add_pass("copy", PassKind::Copy { source: a, target: b });

        let compiled = graph.compile((100, 100)).unwrap();
        let order: Vec<usize> = compiled.order().iter().map(|p| p.index()).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_explicit_dependency_reorders() {
        let mut graph = FrameGraph::new();
        let a = reusable(&mut graph, "_rt_a");
        let b = reusable(&mut graph, "_rt_b");
        let first = graph.add_pass("a", PassKind::Clear { target: a, color: [0.0; 4] });
        let second = graph.add_pass("b", PassKind::Clear { target: b, color: [0.0; 4] });
        graph.add_dependency(first, second);

        let compiled = graph.compile((100, 100)).unwrap();
        assert_eq!(compiled.order(), &[second, first]);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut graph = FrameGraph::new();
        let a = reusable(&mut graph, "_rt_a");
        let b = reusable(&mut graph, "_rt_b");
        graph.add_pass("write a", PassKind::Clear { target: a, color: [0.0; 4] });
        let copy = graph.add_pass("a to b", PassKind::Copy { source: a, target: b });
        let clear = graph.add_pass("write a again", PassKind::Clear { target: a, color: [0.0; 4] });
        // Contradicts the write-after-read edge from `copy` to `clear`.
        graph.add_dependency(copy, clear);

        assert!(matches!(
            graph.compile((100, 100)),
            Err(GraphError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn test_disjoint_targets_share_storage() {
        let mut graph = FrameGraph::new();
        let a = reusable(&mut graph, "_rt_a");
        let b = reusable(&mut graph, "_rt_b");
        let c = reusable(&mut graph, "_rt_c");
        let out = graph.declare_target("_rt_default", RenderTargetDesc::screen(1.0));
        graph.add_pass("a", PassKind::Clear { target: a, color: [0.0; 4] });
        graph.add_pass("a->out", PassKind::Copy { source: a, target: out });
        graph.add_pass("b", PassKind::Clear { target: b, color: [0.0; 4] });
        graph.add_pass("b->c", PassKind::Copy { source: b, target: c });
        graph.add_pass("c->out", PassKind::Copy { source: c, target: out });

        let compiled = graph.compile((100, 100)).unwrap();
        // `a` dies before `b` is born; `b` and `c` overlap.
        assert_eq!(compiled.physical_index(a), compiled.physical_index(b));
        assert_ne!(compiled.physical_index(b), compiled.physical_index(c));
        assert_eq!(compiled.physical().len(), 3);
    }

    #[test]
    fn test_different_sizes_never_share() {
        let mut graph = FrameGraph::new();
        let a = reusable(&mut graph, "_rt_a");
        let b = graph.declare_target("_rt_b", RenderTargetDesc::absolute(32, 32).with_reuse(true));
        graph.add_pass("a", PassKind::Clear { target: a, color: [0.0; 4] });
        graph.add_pass("b", PassKind::Clear { target: b, color: [0.0; 4] });

        let compiled = graph.compile((100, 100)).unwrap();
        assert_ne!(compiled.physical_index(a), compiled.physical_index(b));
    }

    #[test]
    fn test_feedback_target_is_persistent() {
        let mut graph = FrameGraph::new();
        let history = reusable(&mut graph, "_rt_history");
        let other = reusable(&mut graph, "_rt_other");
        graph.add_pass("read history", PassKind::Copy { source: history, target: other });
        graph.add_pass("write history", PassKind::Clear { target: history, color: [0.0; 4] });

        let compiled = graph.compile((100, 100)).unwrap();
        assert!(compiled.is_persistent(history));
        assert!(!compiled.is_persistent(other));
        let store = &compiled.physical()[compiled.physical_index(history).unwrap()];
        assert_eq!(store.targets, vec![history]);
        assert!(!store.shareable);
    }

    #[test]
    fn test_unused_target_has_no_storage() {
        let mut graph = FrameGraph::new();
        let unused = reusable(&mut graph, "_rt_unused");
        let compiled = graph.compile((100, 100)).unwrap();
        assert_eq!(compiled.lifetime(unused), None);
        assert_eq!(compiled.physical_index(unused), None);
    }

    #[test]
    fn test_screen_relative_sizes_follow_surface() {
        let mut graph = FrameGraph::new();
        let half = graph.declare_target("_rt_half", RenderTargetDesc::screen(0.5));
        graph.add_pass("half", PassKind::Clear { target: half, color: [0.0; 4] });

        let small = graph.compile((100, 50)).unwrap();
        let large = graph.compile((400, 200)).unwrap();
        assert_eq!(small.physical()[0].size, (50, 25));
        assert_eq!(large.physical()[0].size, (200, 100));
        assert_eq!(large.surface(), (400, 200));
    }
}
