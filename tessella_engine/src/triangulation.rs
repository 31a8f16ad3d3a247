// Copyright (C) 2023 tessella contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io::BufRead;
use std::ops::{Deref, DerefMut};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::locate::selector::{SelectorMode, StartingEdgeSelector};
use crate::locate::walk::{LawsonWalk, WalkOption};
use crate::locate::walking::WalkingLocator;
use crate::locate::{OnlineLocator, PointLocator};
use crate::prelude::*;
use crate::sampling::UniformPointRng;

/// Whether insertions restore the empty-circumcircle property
/// (`Delaunay`), or leave whichever triangles the insertion produced
/// (`Arbitrary`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriangulationKind {
    Delaunay,
    Arbitrary,
}

/// An incremental triangulation over a planar subdivision. Construction
/// installs a bounding box split into two triangles; each inserted point
/// subdivides its enclosing face, optionally restoring the Delaunay
/// condition by edge rotation.
#[derive(Debug, Default)]
pub struct Triangulation {
    sub: Subdivision,
    bounded: bool,
    /// Number of edge rotations performed by Delaunay fixups so far.
    pub delaunay_flips: u64,
}

impl Deref for Triangulation {
    type Target = Subdivision;
    fn deref(&self) -> &Subdivision {
        &self.sub
    }
}

impl DerefMut for Triangulation {
    fn deref_mut(&mut self) -> &mut Subdivision {
        &mut self.sub
    }
}

/// Smallest integer whose n-th power reaches `val`. Used to size the walk's
/// fast phase (4th root) and the selector's sample (cube root).
pub fn ceil_nth_root(val: usize, n: u32) -> usize {
    debug_assert!((2..=10).contains(&n));
    if val <= 1 {
        return 1;
    }
    for i in 2..=val {
        let mut power = 1usize;
        for _ in 0..n {
            power = power.saturating_mul(i);
            if power >= val {
                return i;
            }
        }
    }
    // The i == val iteration always reaches val.
    unreachable!("ceil_nth_root must terminate")
}

impl Triangulation {
    pub fn new() -> Self {
        Self {
            sub: Subdivision::new(),
            bounded: false,
            delaunay_flips: 0,
        }
    }

    pub fn subdivision(&self) -> &Subdivision {
        &self.sub
    }

    /// Installs a bounding box and a diagonal so the box starts out as two
    /// triangles.
    pub fn init_bounding_box(&mut self, rect: Rect) -> Result<HalfEdgeId> {
        let e = self.sub.init_bounding_box(rect)?;
        self.bounded = true;
        let a = self.sub.conn().fnext(e);
        self.sub.conn_mut().connect(a, e, Some(1))
    }

    /// Checks whether `e` violates the Delaunay condition after `p` was
    /// inserted; if so, rotates the edge within its enclosing quadrilateral
    /// and recursively re-checks the two edges newly exposed to p's
    /// triangles. Each rotation strictly shrinks the summed squared
    /// circumradii of the affected triangles, so the recursion terminates.
    fn fix_delaunay_condition(&mut self, p: Point, e: HalfEdgeId) {
        let conn = self.sub.conn();
        // A boundary edge has no enclosing quadrilateral and cannot flip.
        if conn.left_label(e) == 0 || conn.right_label(e) == 0 {
            return;
        }
        let a = conn.origin_position(e);
        let b = conn.dest_position(e);
        let c = conn.dest_position(conn.fnext(conn.twin(e)));
        debug_assert!(conn.dest_position(conn.fnext(e)) == p);
        debug_assert!(orientation(a, b, c) > 0.0);
        if in_circle(c, a, b, p) > 0.0 {
            let fixed = self.sub.conn_mut().rotate_in_enclosing(e);
            self.delaunay_flips += 1;
            // Every flipped edge ends up incident to the inserted point.
            debug_assert!({
                let conn = self.sub.conn();
                conn.origin_position(fixed) == p || conn.dest_position(fixed) == p
            });
            let conn = self.sub.conn();
            let before = conn.fprev(fixed);
            let after = conn.fnext(conn.twin(fixed));
            self.fix_delaunay_condition(p, before);
            self.fix_delaunay_condition(p, after);
        }
    }

    /// Inserts `p` into the triangulation, labelling its vertex `index`.
    /// The locator finds the enclosing face; a point coinciding with an
    /// existing vertex is a no-op, and a point on an interior edge deletes
    /// that edge so the enclosing quadrilateral is retriangulated.
    #[profiling::function]
    pub fn add_point(
        &mut self,
        p: Point,
        index: i64,
        locator: &mut dyn OnlineLocator,
        kind: TriangulationKind,
    ) -> Result<()> {
        let Some(mut located) = locator.locate(&self.sub, p) else {
            bail!("Point {p} lies outside the subdivision");
        };
        // Adopt an edge of the face that p is exactly collinear with, if any.
        let face_edges: SVec<_> = self.sub.conn().ring(located, IncidenceMode::OnFace).collect();
        for e in face_edges {
            let conn = self.sub.conn();
            if orientation(conn.origin_position(e), p, conn.dest_position(e)) == 0.0 {
                located = e;
                break;
            }
        }
        let origin = self.sub.conn().origin_position(located);
        let dest = self.sub.conn().dest_position(located);

        // An existing vertex needs no insertion.
        if p == origin || p == dest {
            return Ok(());
        }
        if orientation(origin, p, dest) == 0.0 {
            if self.sub.conn().right_label(located) == 0 {
                bail!("Point {p} lies on a boundary edge and cannot be inserted");
            }
            // p is strictly on an interior edge: delete it, so the sweep
            // below connects p to the enclosing quadrilateral. Re-aiming at
            // oprev keeps the remaining edges cw-consistent with the new
            // ones.
            let old_edge = located;
            located = self.sub.conn().oprev(old_edge);
            self.sub.delete_edge(old_edge);
            locator.remove_edge(old_edge);
        }

        // The edges immediately enclosing p: three for a strictly interior
        // point, four after an on-edge deletion.
        let enclosing: SVec<_> = self.sub.conn().ring(located, IncidenceMode::OnFace).collect();
        debug_assert!(enclosing.len() <= 4);

        let conn = self.sub.conn_mut();
        let mut new_edge = conn.make_edge();
        let new_vertex = conn.alloc_vertex(Some(p), index)?;
        let located_left = conn.left(located);
        conn.set_endpoints(
            new_edge,
            Some(conn.origin(located)),
            Some(new_vertex),
            Some(located_left),
            Some(located_left),
        );
        conn.splice(new_edge, located);
        locator.add_edge(new_edge);

        // Fan out from the new vertex: every enclosing edge except the last
        // gets connected to the edge created in the previous step.
        for i in 0..enclosing.len() - 1 {
            let conn = self.sub.conn_mut();
            let twin = conn.twin(new_edge);
            new_edge = conn.connect(enclosing[i], twin, Some(1))?;
            locator.add_edge(new_edge);
        }

        if kind == TriangulationKind::Delaunay {
            for e in enclosing {
                self.fix_delaunay_condition(p, e);
            }
        }
        Ok(())
    }

    /// Bulk-builds a triangulation. Installs a padded bounding box when none
    /// exists yet, then inserts every point through an online walking
    /// locator; Delaunay builds shuffle the insertion order first, which
    /// keeps the expected work near O(n log n). Interior faces are relabeled
    /// 1..F afterwards; the exterior keeps label 0.
    #[profiling::function]
    pub fn init_triangulation(
        &mut self,
        mut points: Vec<Point>,
        kind: TriangulationKind,
    ) -> Result<()> {
        let num_sample = ceil_nth_root(points.len(), 3);
        let mut locator = match kind {
            // A remembering walk is enough for Delaunay triangulations; the
            // fast phase assumes the target face is elsewhere, which only
            // pays off for larger arbitrary builds.
            TriangulationKind::Delaunay => WalkingLocator::new(
                LawsonWalk::new(&[WalkOption::Remembering], 0)?,
                StartingEdgeSelector::new(SelectorMode::Sample, num_sample),
            ),
            TriangulationKind::Arbitrary => WalkingLocator::new(
                LawsonWalk::new(&[WalkOption::FastRemembering], ceil_nth_root(points.len(), 4))?,
                StartingEdgeSelector::new(SelectorMode::Sample, num_sample),
            ),
        };

        if !self.bounded {
            let Some(rect) = Rect::bounding(&points) else {
                bail!("Cannot triangulate an empty point set");
            };
            self.init_bounding_box(rect.padded(1.0))?;
        }

        locator.init(&self.sub);

        if kind == TriangulationKind::Delaunay {
            points.shuffle(&mut StdRng::from_entropy());
        }
        for (i, &p) in points.iter().enumerate() {
            self.add_point(p, 4 + i as i64, &mut locator, kind)?;
        }

        // Give every interior face a fresh positive label; the exterior face
        // is already labelled by the exterior vertex.
        let mut face_number = 1;
        for e in self.sub.traverse(GraphKind::Dual, TraversalKind::Nodes) {
            let conn = self.sub.conn();
            if conn[conn.origin(e)].label() == 0 {
                continue;
            }
            let primal = conn.rot(e);
            let face = self.sub.conn_mut().alloc_vertex(None, face_number)?;
            self.sub.conn_mut().label_face(primal, face);
            face_number += 1;
        }
        Ok(())
    }

    /// Samples `num_points` uniform points over `rect` and triangulates
    /// them. The installed bounding box is inflated by one unit on each side
    /// so the closed sampling ranges never produce points on the box
    /// boundary.
    pub fn generate_random_triangulation(
        &mut self,
        num_points: usize,
        kind: TriangulationKind,
        rect: Rect,
    ) -> Result<()> {
        self.init_bounding_box(rect.padded(1.0))?;
        let mut rng = UniformPointRng::new(rect);
        self.init_triangulation(rng.random_points(num_points), kind)
    }

    /// Reads a PT point list and triangulates it.
    pub fn read_pt_file(&mut self, reader: impl BufRead, kind: TriangulationKind) -> Result<()> {
        self.init_triangulation(parse_pt(reader)?, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_selector() -> StartingEdgeSelector {
        StartingEdgeSelector::new(SelectorMode::First, 0)
    }

    fn plain_locator(sub: &Subdivision) -> WalkingLocator {
        let mut locator = WalkingLocator::new(LawsonWalk::new(&[], 0).unwrap(), first_selector());
        locator.init(sub);
        locator
    }

    /// Every interior face must be a ccw triangle.
    fn assert_triangulated(sub: &Subdivision) {
        let conn = sub.conn();
        for e in sub.traverse(GraphKind::Dual, TraversalKind::Nodes) {
            if conn[conn.origin(e)].label() == 0 {
                continue;
            }
            let ring: SVec<_> = conn.ring(conn.rot(e), IncidenceMode::OnFace).collect();
            assert_eq!(ring.len(), 3);
            for &f in &ring {
                let turn = orientation(
                    conn.origin_position(f),
                    conn.dest_position(f),
                    conn.dest_position(conn.fnext(f)),
                );
                assert!(turn <= 0.0, "face edges must make ccw turns");
            }
        }
    }

    #[test]
    fn nth_roots() {
        assert_eq!(ceil_nth_root(1, 3), 1);
        assert_eq!(ceil_nth_root(8, 3), 2);
        assert_eq!(ceil_nth_root(9, 3), 3);
        assert_eq!(ceil_nth_root(10_000, 4), 10);
        assert_eq!(ceil_nth_root(10_001, 4), 11);
    }

    #[test]
    fn bounding_box_becomes_two_triangles() {
        let mut tri = Triangulation::new();
        tri.init_bounding_box(Rect::new(-1.0, 2.0, 2.0, -1.0)).unwrap();
        assert_eq!(tri.traverse(GraphKind::Primal, TraversalKind::Edges).len(), 5);
        assert_eq!(tri.traverse(GraphKind::Dual, TraversalKind::Nodes).len(), 3);
        assert_triangulated(tri.subdivision());
    }

    #[test]
    fn inserting_an_interior_point_fans_the_triangle() {
        let mut tri = Triangulation::new();
        tri.init_bounding_box(Rect::new(-1.0, 2.0, 2.0, -1.0)).unwrap();
        let mut locator = plain_locator(tri.subdivision());
        tri.add_point(
            Point::new(0.0, 0.0),
            4,
            &mut locator,
            TriangulationKind::Arbitrary,
        )
        .unwrap();

        assert_eq!(tri.traverse(GraphKind::Primal, TraversalKind::Nodes).len(), 5);
        assert_triangulated(tri.subdivision());
    }

    #[test]
    fn reinserting_a_vertex_changes_nothing() {
        let mut tri = Triangulation::new();
        tri.init_bounding_box(Rect::new(-1.0, 2.0, 2.0, -1.0)).unwrap();
        let mut locator = plain_locator(tri.subdivision());
        let p = Point::new(0.5, 0.5);
        tri.add_point(p, 4, &mut locator, TriangulationKind::Delaunay).unwrap();
        let edges_before = tri.traverse(GraphKind::Primal, TraversalKind::Edges).len();

        tri.add_point(p, 99, &mut locator, TriangulationKind::Delaunay).unwrap();
        assert_eq!(tri.traverse(GraphKind::Primal, TraversalKind::Edges).len(), edges_before);
        // Reinserting a box corner is also a no-op.
        tri.add_point(Point::new(-1.0, -1.0), 100, &mut locator, TriangulationKind::Delaunay)
            .unwrap();
        assert_eq!(tri.traverse(GraphKind::Primal, TraversalKind::Edges).len(), edges_before);
    }

    #[test]
    fn double_rotation_restores_the_diagonal() {
        let mut tri = Triangulation::new();
        let diagonal = tri.init_bounding_box(Rect::new(0.0, 1.0, 1.0, 0.0)).unwrap();
        let conn = tri.sub.conn();
        let (o, d) = (conn.origin(diagonal), conn.dest(diagonal));

        let unordered = |a: VertexId, b: VertexId| if a < b { (a, b) } else { (b, a) };
        let rotated = tri.sub.conn_mut().rotate_in_enclosing(diagonal);
        {
            let conn = tri.sub.conn();
            assert_ne!(
                unordered(conn.origin(rotated), conn.dest(rotated)),
                unordered(o, d)
            );
        }
        // A second rotation brings the same undirected diagonal back.
        let restored = tri.sub.conn_mut().rotate_in_enclosing(rotated);
        let conn = tri.sub.conn();
        assert_eq!(
            unordered(conn.origin(restored), conn.dest(restored)),
            unordered(o, d)
        );
    }
}
