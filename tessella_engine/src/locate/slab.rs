// Copyright (C) 2023 tessella contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeSet;

use float_ord::FloatOrd;

use crate::prelude::*;

/// Edges of the active set are keyed by the y (then x) of their left
/// endpoint, then by id. Both the insert and the delete event of an edge
/// use this same key, so deletions always find their element. Within one
/// slab no two edges cross, which is what makes the ordering total.
type ActiveKey = (FloatOrd<f64>, FloatOrd<f64>, HalfEdgeId);

struct Event {
    /// Sweep position: the left endpoint for insertions, the right for
    /// deletions.
    position: Vec2Ord,
    insert: bool,
    key: ActiveKey,
}

/// Static point location by slab decomposition: a left-to-right sweep
/// snapshots the active edge set at every distinct x-coordinate, and a
/// query is two binary searches. Build once after the subdivision settles;
/// `init` again after any change.
#[derive(Default)]
pub struct SlabDecomposition {
    slabs: Vec<Vec<HalfEdgeId>>,
    slab_positions: Vec<f64>,
}

impl SlabDecomposition {
    pub fn new() -> Self {
        Self::default()
    }

    /// The y-coordinate every in-slab comparison against this edge uses.
    fn sort_y(sub: &Subdivision, e: HalfEdgeId) -> f64 {
        sub.conn().origin_position(e).y
    }

    fn find_slab_index(&self, p: Point) -> Option<usize> {
        let first = *self.slab_positions.first()?;
        let last = *self.slab_positions.last()?;
        if p.x < first || p.x > last {
            return None;
        }
        Some(self.slab_positions.partition_point(|&x| x <= p.x) - 1)
    }

    fn find_in_slab(&self, sub: &Subdivision, index: usize, p: Point) -> Option<HalfEdgeId> {
        let slab = &self.slabs[index];
        let (&first, &last) = (slab.first()?, slab.last()?);
        if p.y < Self::sort_y(sub, first) || p.y > Self::sort_y(sub, last) {
            return None;
        }
        let below = slab.partition_point(|&e| Self::sort_y(sub, e) <= p.y);
        Some(slab[below - 1])
    }
}

impl super::PointLocator for SlabDecomposition {
    #[profiling::function]
    fn init(&mut self, sub: &Subdivision) {
        self.slabs.clear();
        self.slab_positions.clear();

        // One insert and one delete event per edge, with every edge
        // redirected to run from its lower-x endpoint to its higher-x one.
        let conn = sub.conn();
        let mut events = Vec::new();
        let mut x_coordinates = Vec::new();
        for mut e in sub.traverse(GraphKind::Primal, TraversalKind::Edges) {
            let mut origin = conn.origin_position(e);
            let mut dest = conn.dest_position(e);
            if origin.to_ord() > dest.to_ord() {
                e = conn.twin(e);
                std::mem::swap(&mut origin, &mut dest);
            }
            let key = (FloatOrd(origin.y), FloatOrd(origin.x), e);
            events.push(Event {
                position: origin.to_ord(),
                insert: true,
                key,
            });
            events.push(Event {
                position: dest.to_ord(),
                insert: false,
                key,
            });
            x_coordinates.push(FloatOrd(origin.x));
            x_coordinates.push(FloatOrd(dest.x));
        }
        events.sort_by_key(|event| event.position);
        x_coordinates.sort();
        x_coordinates.dedup();

        let mut active: BTreeSet<ActiveKey> = BTreeSet::new();
        let mut next_event = 0;
        for &x in &x_coordinates {
            while next_event < events.len() {
                let event = &events[next_event];
                if FloatOrd(event.position.to_vec().x) != x {
                    break;
                }
                if event.insert {
                    active.insert(event.key);
                } else {
                    active.remove(&event.key);
                }
                next_event += 1;
            }
            self.slabs.push(active.iter().map(|&(_, _, e)| e).collect());
            self.slab_positions.push(x.0);
        }
    }

    fn locate(&mut self, sub: &Subdivision, p: Point) -> Option<HalfEdgeId> {
        let index = self.find_slab_index(p)?;
        let bounding_edge = self.find_in_slab(sub, index, p)?;

        let conn = sub.conn();
        let origin = conn.origin_position(bounding_edge);
        let dest = conn.dest_position(bounding_edge);
        // The query lies above or on the edge found below it; pick the side
        // whose left face contains p.
        if orientation(origin, dest, p) > 0.0 {
            Some(conn.twin(bounding_edge))
        } else {
            Some(bounding_edge)
        }
    }
}
