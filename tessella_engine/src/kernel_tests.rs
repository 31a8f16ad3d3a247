// Copyright (C) 2023 tessella contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::locate::quadtree::QuadtreeLocator;
use crate::locate::selector::{SelectorMode, StartingEdgeSelector};
use crate::locate::slab::SlabDecomposition;
use crate::locate::walk::{LawsonWalk, WalkOption};
use crate::locate::walking::WalkingLocator;
use crate::locate::PointLocator;
use crate::prelude::*;
use crate::sampling::UniformPointRng;
use crate::triangulation::{ceil_nth_root, Triangulation, TriangulationKind};

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

fn plain_locator(sub: &Subdivision) -> WalkingLocator {
    let mut locator = WalkingLocator::new(
        LawsonWalk::new(&[], 0).unwrap(),
        StartingEdgeSelector::new(SelectorMode::First, 0),
    );
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

/// No opposite vertex may lie strictly inside the circumcircle across any
/// interior edge. `slack` absorbs round-off on near-cocircular quadruples.
fn assert_delaunay(sub: &Subdivision, slack: f64) {
    let conn = sub.conn();
    for e in sub.traverse(GraphKind::Primal, TraversalKind::Edges) {
        if conn.left_label(e) == 0 || conn.right_label(e) == 0 {
            continue;
        }
        let o = conn.origin_position(e);
        let d = conn.dest_position(e);
        let left_apex = conn.dest_position(conn.fnext(e));
        let right_apex = conn.dest_position(conn.fnext(conn.twin(e)));
        assert!(
            in_circle(right_apex, o, d, left_apex) <= slack,
            "right apex invades the left circumcircle"
        );
        assert!(
            in_circle(left_apex, d, o, right_apex) <= slack,
            "left apex invades the right circumcircle"
        );
    }
}

fn edge_exists(sub: &Subdivision, a: Point, b: Point) -> bool {
    let conn = sub.conn();
    sub.traverse(GraphKind::Primal, TraversalKind::Edges)
        .iter()
        .any(|&e| {
            let o = conn.origin_position(e);
            let d = conn.dest_position(e);
            (o == a && d == b) || (o == b && d == a)
        })
}

#[test]
fn square_with_diagonal_locators_agree() {
    let sub = square_with_diagonal();
    assert_eq!(sub.traverse(GraphKind::Dual, TraversalKind::Nodes).len(), 3);

    let mut walk = plain_locator(&sub);
    let mut slab = SlabDecomposition::new();
    slab.init(&sub);
    let mut quadtree = QuadtreeLocator::default();
    quadtree.init(&sub);

    let queries = [
        (Point::new(0.5, 0.25), Some(1)),
        (Point::new(0.5, 0.75), Some(2)),
        (Point::new(2.0, 2.0), None),
    ];
    for (p, expected) in queries {
        let conn = sub.conn();
        let label = |e: Option<HalfEdgeId>| e.map(|e| conn.left_label(e));
        assert_eq!(label(walk.locate(&sub, p)), expected);
        assert_eq!(label(slab.locate(&sub, p)), expected);
        assert_eq!(label(quadtree.locate(&sub, p)), expected);
    }
}

#[test]
fn cocircular_corners_resolve_with_a_flip() {
    let mut tri = Triangulation::new();
    tri.init_bounding_box(Rect::new(-1.0, 2.0, 2.0, -1.0)).unwrap();
    let mut locator = plain_locator(tri.subdivision());

    let corners = [
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ];
    for (i, &p) in corners.iter().enumerate() {
        tri.add_point(p, 4 + i as i64, &mut locator, TriangulationKind::Delaunay)
            .unwrap();
    }

    assert_eq!(tri.traverse(GraphKind::Primal, TraversalKind::Nodes).len(), 8);
    assert!(tri.delaunay_flips >= 1);
    assert_triangulated(tri.subdivision());
    // The cocircular quadruple makes several checks exactly zero; no slack.
    assert_delaunay(tri.subdivision(), 0.0);
}

#[test]
fn collinear_point_splits_the_edge_it_lands_on() {
    let mut tri = Triangulation::new();
    tri.init_bounding_box(Rect::new(-1.0, 1.0, 9.0, -1.0)).unwrap();
    // Arbitrary builds go through non-Delaunay intermediate states, where a
    // deterministic walk may cycle; the stochastic walk never does.
    let mut locator = WalkingLocator::new(
        LawsonWalk::new(&[WalkOption::Stochastic, WalkOption::Remembering], 0).unwrap(),
        StartingEdgeSelector::new(SelectorMode::First, 0),
    );
    locator.init(tri.subdivision());

    let p1 = Point::new(0.0, 0.0);
    let p2 = Point::new(2.0, 0.0);
    let mid = Point::new(1.0, 0.0);
    tri.add_point(p1, 4, &mut locator, TriangulationKind::Arbitrary).unwrap();
    tri.add_point(p2, 5, &mut locator, TriangulationKind::Arbitrary).unwrap();
    assert!(edge_exists(tri.subdivision(), p1, p2));

    // The third point lies exactly on the p1-p2 edge: the edge goes away and
    // the enclosing quadrilateral is retriangulated around it.
    tri.add_point(mid, 6, &mut locator, TriangulationKind::Arbitrary).unwrap();
    assert!(!edge_exists(tri.subdivision(), p1, p2));
    assert!(edge_exists(tri.subdivision(), p1, mid));
    assert!(edge_exists(tri.subdivision(), mid, p2));
    assert_eq!(tri.traverse(GraphKind::Primal, TraversalKind::Nodes).len(), 7);
    assert_triangulated(tri.subdivision());
}

#[test]
fn random_delaunay_build_respects_the_flip_budget() {
    let n = 200;
    let rect = Rect::new(-100.0, 100.0, 100.0, -100.0);
    let mut tri = Triangulation::new();
    tri.generate_random_triangulation(n, TriangulationKind::Delaunay, rect)
        .unwrap();

    assert!(tri.delaunay_flips <= 9 * n as u64 + 1);
    assert_triangulated(tri.subdivision());
    assert_delaunay(tri.subdivision(), 1e-6);
}

#[test]
fn all_locators_agree_on_a_random_triangulation() {
    let n = 200;
    let queries = 300;
    let rect = Rect::new(-100.0, 100.0, 100.0, -100.0);
    let mut tri = Triangulation::new();
    tri.generate_random_triangulation(n, TriangulationKind::Delaunay, rect)
        .unwrap();
    let sub = tri.subdivision();
    let edge_count = sub.traverse(GraphKind::Primal, TraversalKind::Edges).len();

    let mut walking = WalkingLocator::new(
        LawsonWalk::new(&[WalkOption::Remembering], 0).unwrap(),
        StartingEdgeSelector::new(SelectorMode::Sample, ceil_nth_root(edge_count, 3)),
    );
    walking.init(sub);
    let mut fast = WalkingLocator::new(
        LawsonWalk::new(&[WalkOption::FastRemembering], ceil_nth_root(edge_count, 4)).unwrap(),
        StartingEdgeSelector::new(SelectorMode::Recent, 0),
    );
    fast.init(sub);
    let mut slab = SlabDecomposition::new();
    slab.init(sub);
    let mut quadtree = QuadtreeLocator::default();
    quadtree.init(sub);

    let mut rng = UniformPointRng::new(rect);
    for p in rng.random_points(queries) {
        let conn = sub.conn();
        let label = |e: Option<HalfEdgeId>| e.map(|e| conn.left_label(e));
        let by_walk = label(walking.locate(sub, p));
        assert!(by_walk.is_some(), "query inside the box must land in a face");
        assert_eq!(label(fast.locate(sub, p)), by_walk);
        assert_eq!(label(slab.locate(sub, p)), by_walk);
        assert_eq!(label(quadtree.locate(sub, p)), by_walk);
    }

    // A remembering walk never spends more than three orientation tests per
    // face it steps through.
    let walk = walking.walk();
    assert!(walk.num_faces >= queries as u64);
    assert!(walk.num_tests < 4 * walk.num_faces);
}

#[test]
fn boundary_range_points_insert_cleanly() {
    // The installed box is padded by one unit, so a point on the nominal
    // sampling boundary is strictly interior and inserts like any other.
    let rect = Rect::new(0.0, 10.0, 10.0, 0.0);
    let mut tri = Triangulation::new();
    tri.generate_random_triangulation(50, TriangulationKind::Delaunay, rect)
        .unwrap();
    let count = tri.traverse(GraphKind::Primal, TraversalKind::Nodes).len();

    let mut locator = plain_locator(tri.subdivision());
    tri.add_point(
        Point::new(0.0, 5.0),
        count as i64,
        &mut locator,
        TriangulationKind::Delaunay,
    )
    .unwrap();

    assert_eq!(
        tri.traverse(GraphKind::Primal, TraversalKind::Nodes).len(),
        count + 1
    );
    assert_triangulated(tri.subdivision());
    assert_delaunay(tri.subdivision(), 1e-6);
}

#[test]
fn triangulations_round_trip_through_off() {
    let mut tri = Triangulation::new();
    tri.generate_random_triangulation(
        30,
        TriangulationKind::Delaunay,
        Rect::new(-10.0, 10.0, 10.0, -10.0),
    )
    .unwrap();

    let mut first = Vec::new();
    tri.write_off(&mut first).unwrap();
    let mut reread = Subdivision::new();
    reread.read_off(first.as_slice()).unwrap();
    let mut second = Vec::new();
    reread.write_off(&mut second).unwrap();

    assert_eq!(
        String::from_utf8(first).unwrap(),
        String::from_utf8(second).unwrap()
    );
    assert_triangulated(&reread);
}
