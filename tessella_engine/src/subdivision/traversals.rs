// Copyright (C) 2023 tessella contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

/// Which graph a traversal walks: `Primal` follows vertex-to-vertex edges,
/// `Dual` follows face-to-face edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphKind {
    Primal,
    Dual,
}

/// What a traversal yields: one representative half-edge per undirected
/// edge, or one half-edge per distinct node (vertex or face).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraversalKind {
    Nodes,
    Edges,
}

impl Subdivision {
    /// Depth-first walk over the chosen graph starting at the incident
    /// edge. The traversal clock is bumped once per call, so marks from
    /// earlier traversals never need resetting.
    pub fn traverse(&self, graph: GraphKind, mode: TraversalKind) -> Vec<HalfEdgeId> {
        let Some(incident) = self.incident_edge else {
            return Vec::new();
        };
        let start = match graph {
            GraphKind::Primal => incident,
            GraphKind::Dual => self.conn.rot(incident),
        };
        let stamp = self.clock.get();
        self.clock.set(stamp + 1);
        match mode {
            TraversalKind::Edges => self.traverse_edge_dfs(start, stamp),
            TraversalKind::Nodes => self.traverse_node_dfs(start, stamp),
        }
    }

    /// Yields every distinct edge once. Distinct edges are edges that do not
    /// belong to the same quad-edge.
    fn traverse_edge_dfs(&self, first: HalfEdgeId, stamp: u64) -> Vec<HalfEdgeId> {
        let conn = &self.conn;
        let mut result = Vec::new();
        let mut stack = vec![first];
        while let Some(curr) = stack.pop() {
            if !conn[conn[curr].quad].use_at(stamp) {
                continue;
            }
            result.push(curr);
            let twin = conn.twin(curr);
            for e in conn.ring(twin, IncidenceMode::ToOrigin) {
                if conn[conn[e].quad].last_used() < stamp {
                    stack.push(e);
                }
            }
        }
        result
    }

    /// Yields one half-edge per node; taking the origin of each result
    /// enumerates all vertices (or faces, on the dual graph).
    fn traverse_node_dfs(&self, first: HalfEdgeId, stamp: u64) -> Vec<HalfEdgeId> {
        let conn = &self.conn;
        let mut result = Vec::new();
        let mut stack = vec![first];
        while let Some(curr) = stack.pop() {
            if !conn[conn.origin(curr)].use_at(stamp) {
                continue;
            }
            result.push(curr);
            for e in conn.ring(curr, IncidenceMode::ToOrigin) {
                let t = conn.twin(e);
                if conn[conn.origin(t)].last_used() < stamp {
                    stack.push(t);
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_with_diagonal() -> Subdivision {
        let mut sub = Subdivision::new();
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        sub.init_subdivision(&points, &[vec![0u32, 1, 2], vec![0, 2, 3]])
            .unwrap();
        sub
    }

    #[test]
    fn traversal_counts() {
        let sub = square_with_diagonal();
        assert_eq!(sub.traverse(GraphKind::Primal, TraversalKind::Edges).len(), 5);
        assert_eq!(sub.traverse(GraphKind::Primal, TraversalKind::Nodes).len(), 4);
        // Two interior faces plus the exterior.
        assert_eq!(sub.traverse(GraphKind::Dual, TraversalKind::Nodes).len(), 3);
        assert_eq!(sub.traverse(GraphKind::Dual, TraversalKind::Edges).len(), 5);
    }

    #[test]
    fn node_traversal_origins_are_distinct() {
        let sub = square_with_diagonal();
        let nodes = sub.traverse(GraphKind::Primal, TraversalKind::Nodes);
        let labels: HashSet<i64> = nodes
            .iter()
            .map(|&e| sub.conn()[sub.conn().origin(e)].label())
            .collect();
        assert_eq!(labels, HashSet::from([0, 1, 2, 3]));
    }

    #[test]
    fn exterior_face_is_unique() {
        let sub = square_with_diagonal();
        let faces = sub.traverse(GraphKind::Dual, TraversalKind::Nodes);
        let exterior_count = faces
            .iter()
            .filter(|&&e| sub.conn()[sub.conn().origin(e)].label() == 0)
            .count();
        assert_eq!(exterior_count, 1);
    }

    #[test]
    fn repeated_traversals_see_fresh_marks() {
        let sub = square_with_diagonal();
        for _ in 0..3 {
            assert_eq!(sub.traverse(GraphKind::Primal, TraversalKind::Edges).len(), 5);
        }
    }
}
