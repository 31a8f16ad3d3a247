// Copyright (C) 2023 tessella contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use float_ord::FloatOrd;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::prelude::*;

/// How the walking locator picks its starting edge.
///
/// `First` takes any currently valid edge, `Recent` reuses the last
/// successfully located edge, and `Sample` draws `sample_size` random live
/// edges and starts from the one whose midpoint is nearest the query. A
/// sample around the cube root of the edge count is a good default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectorMode {
    First,
    Recent,
    Sample,
}

/// Tracks the live edges of a subdivision and serves starting edges for
/// oriented walks. The edge list is append-only; removed edges stay in it
/// but leave the valid set, and sampling rejects them.
pub struct StartingEdgeSelector {
    mode: SelectorMode,
    sample_size: usize,
    recent: Option<HalfEdgeId>,
    edge_list: Vec<HalfEdgeId>,
    valid_edges: HashSet<HalfEdgeId>,
    rng: StdRng,
}

impl StartingEdgeSelector {
    pub fn new(mode: SelectorMode, sample_size: usize) -> Self {
        Self {
            mode,
            sample_size,
            recent: None,
            edge_list: Vec::new(),
            valid_edges: HashSet::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Re-registers every edge of `sub`, dropping anything remembered from
    /// a previous subdivision.
    pub fn set_plane(&mut self, sub: &Subdivision) {
        self.edge_list.clear();
        self.valid_edges.clear();
        self.recent = None;
        for e in sub.traverse(GraphKind::Primal, TraversalKind::Edges) {
            self.add_edge(e);
        }
    }

    pub fn add_edge(&mut self, e: HalfEdgeId) {
        self.edge_list.push(e);
        self.valid_edges.insert(e);
    }

    pub fn remove_edge(&mut self, e: HalfEdgeId) {
        self.valid_edges.remove(&e);
    }

    /// Remembers the result of the latest locate; `None` clears the memory.
    pub fn located_edge(&mut self, e: Option<HalfEdgeId>) {
        self.recent = e;
    }

    pub fn starting_edge(&mut self, sub: &Subdivision, p: Point) -> Option<HalfEdgeId> {
        debug_assert!(
            (self.mode == SelectorMode::Sample) ^ (self.sample_size == 0),
            "sample_size must be positive exactly in sample mode"
        );
        match self.mode {
            SelectorMode::Recent => match self.recent.filter(|e| self.valid_edges.contains(e)) {
                Some(recent) => Some(recent),
                None => self.valid_edges.iter().next().copied(),
            },
            SelectorMode::Sample => self.best_from_sample(sub, p),
            SelectorMode::First => self.valid_edges.iter().next().copied(),
        }
    }

    /// Draws `sample_size` valid edges by rejection sampling and returns the
    /// one whose midpoint is nearest to p.
    fn best_from_sample(&mut self, sub: &Subdivision, p: Point) -> Option<HalfEdgeId> {
        if self.edge_list.is_empty() || self.valid_edges.is_empty() {
            return None;
        }
        let conn = sub.conn();
        let mut best: Option<(FloatOrd<f64>, HalfEdgeId)> = None;
        for _ in 0..self.sample_size {
            let edge = loop {
                let index = self.rng.gen_range(0..self.edge_list.len());
                let candidate = self.edge_list[index];
                if self.valid_edges.contains(&candidate) {
                    break candidate;
                }
            };
            let midpoint = (conn.origin_position(edge) + conn.dest_position(edge)) / 2.0;
            let dist_sq = FloatOrd((midpoint - p).length_squared());
            if best.map_or(true, |(best_dist, _)| dist_sq < best_dist) {
                best = Some((dist_sq, edge));
            }
        }
        best.map(|(_, edge)| edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Subdivision {
        let mut sub = Subdivision::new();
        sub.init_polygon(&[
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ])
        .unwrap();
        sub
    }

    #[test]
    fn sample_mode_prefers_nearby_edges() {
        let sub = square();
        let mut selector = StartingEdgeSelector::new(SelectorMode::Sample, 200);
        selector.set_plane(&sub);
        // With a sample far larger than the edge set, the nearest edge wins:
        // the bottom side for a point just below it.
        let start = selector.starting_edge(&sub, Point::new(2.0, -1.0)).unwrap();
        let conn = sub.conn();
        let midpoint = (conn.origin_position(start) + conn.dest_position(start)) / 2.0;
        assert_eq!(midpoint, Point::new(2.0, 0.0));
    }

    #[test]
    fn removed_edges_are_never_served() {
        let sub = square();
        let mut selector = StartingEdgeSelector::new(SelectorMode::First, 0);
        selector.set_plane(&sub);
        let edges = sub.traverse(GraphKind::Primal, TraversalKind::Edges);
        for &e in &edges[..3] {
            selector.remove_edge(e);
        }
        let start = selector.starting_edge(&sub, Point::new(0.0, 0.0)).unwrap();
        assert_eq!(start, edges[3]);
    }

    #[test]
    fn recent_mode_reuses_the_last_hit() {
        let sub = square();
        let mut selector = StartingEdgeSelector::new(SelectorMode::Recent, 0);
        selector.set_plane(&sub);
        let e = sub.incident_edge().unwrap();
        selector.located_edge(Some(e));
        assert_eq!(selector.starting_edge(&sub, Point::new(1.0, 1.0)), Some(e));
        // Once invalidated, the recent edge must not be served again.
        selector.remove_edge(e);
        assert_ne!(selector.starting_edge(&sub, Point::new(1.0, 1.0)), Some(e));
    }
}
