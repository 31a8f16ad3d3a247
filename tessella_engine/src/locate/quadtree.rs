// Copyright (C) 2023 tessella contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::prelude::*;

pub const DEFAULT_MAX_OVERLAP: usize = 8;
pub const DEFAULT_MAX_DEPTH: u32 = 30;

/// One cell of the bucketing quadtree. Leaves hold the dual edges of every
/// face whose triangle overlaps the cell; a leaf that reaches the overlap
/// bound splits into four equal children, unless it is already a unit cell
/// or at the depth bound.
struct QuadtreeNode {
    rect: Rect,
    children: Option<Box<[QuadtreeNode; 4]>>,
    faces: Vec<HalfEdgeId>,
    level: u32,
    max_overlap: usize,
    max_depth: u32,
}

impl QuadtreeNode {
    fn new(rect: Rect, level: u32, max_overlap: usize, max_depth: u32) -> Self {
        debug_assert!(rect.is_valid());
        Self {
            rect,
            children: None,
            faces: Vec::new(),
            level,
            max_overlap,
            max_depth,
        }
    }

    /// Does the triangle of `face` (a dual edge pointing out of it) overlap
    /// this cell? A vertex inside the cell, a triangle edge crossing a cell
    /// edge, or the whole cell sitting inside the triangle all count.
    fn overlaps(&self, sub: &Subdivision, face: HalfEdgeId) -> bool {
        let conn = sub.conn();
        let face_edges: SVec<_> = conn
            .ring(conn.rot(face), IncidenceMode::OnFace)
            .collect();
        let mut triangle_inside_square = true;
        for &e in &face_edges {
            if !self.rect.contains(conn.origin_position(e)) {
                triangle_inside_square = false;
            }
        }
        if triangle_inside_square {
            return true;
        }

        debug_assert_eq!(face_edges.len(), 3, "quadtree cells bucket triangles only");
        debug_assert!(
            orientation(
                conn.origin_position(face_edges[0]),
                conn.origin_position(face_edges[1]),
                conn.origin_position(face_edges[2]),
            ) <= 0.0,
            "faces must be oriented ccw"
        );

        let corners = self.rect.corners_ccw();
        let mut square_inside_triangle = true;
        for i in 0..4 {
            let square_edge = [corners[i], corners[(i + 1) % 4]];
            for j in 0..face_edges.len() {
                let jnext = (j + 1) % face_edges.len();
                let face_edge = [
                    conn.origin_position(face_edges[j]),
                    conn.origin_position(face_edges[jnext]),
                ];
                if segments_intersect(face_edge, square_edge) {
                    return true;
                }
                if orientation(face_edge[0], face_edge[1], corners[i]) > 0.0 {
                    square_inside_triangle = false;
                }
            }
        }
        // With no intersections and no vertex inside the cell, overlap is
        // only possible when the whole cell sits inside the triangle.
        square_inside_triangle
    }

    fn split(&mut self, sub: &Subdivision) {
        let mid_x = (self.rect.left + self.rect.right) / 2.0;
        let mid_y = (self.rect.bottom + self.rect.top) / 2.0;
        let Rect {
            left,
            top,
            right,
            bottom,
        } = self.rect;
        let (level, max_overlap, max_depth) = (self.level + 1, self.max_overlap, self.max_depth);
        let child = move |rect| QuadtreeNode::new(rect, level, max_overlap, max_depth);
        self.children = Some(Box::new([
            child(Rect::new(left, top, mid_x, mid_y)),
            child(Rect::new(left, mid_y, mid_x, bottom)),
            child(Rect::new(mid_x, mid_y, right, bottom)),
            child(Rect::new(mid_x, top, right, mid_y)),
        ]));

        for face in std::mem::take(&mut self.faces) {
            let children = self.children.as_mut().unwrap();
            for i in 0..4 {
                if children[i].overlaps(sub, face) {
                    children[i].insert(sub, face);
                }
            }
        }
    }

    fn insert(&mut self, sub: &Subdivision, face: HalfEdgeId) {
        if let Some(children) = self.children.as_mut() {
            for i in 0..4 {
                if children[i].overlaps(sub, face) {
                    children[i].insert(sub, face);
                }
            }
        } else {
            self.faces.push(face);
            if self.faces.len() == self.max_overlap
                && self.level < self.max_depth
                // Unit cells never split further.
                && self.rect.width() >= 2.0
                && self.rect.height() >= 2.0
            {
                self.split(sub);
            }
        }
    }

    fn locate(&self, sub: &Subdivision, p: Point) -> Option<HalfEdgeId> {
        if let Some(children) = self.children.as_ref() {
            children
                .iter()
                .find(|child| child.rect.contains(p))
                .and_then(|child| child.locate(sub, p))
        } else {
            let conn = sub.conn();
            for &face in &self.faces {
                // p belongs to the face iff it is left of (or on) every ccw
                // edge.
                let all_left = conn.ring(conn.rot(face), IncidenceMode::OnFace).all(|e| {
                    orientation(conn.origin_position(e), conn.dest_position(e), p) <= 0.0
                });
                if all_left {
                    return Some(conn.rot(face));
                }
            }
            None
        }
    }

    /// Total bucket entries over all leaves. Faces overlapping several
    /// cells are counted once per cell.
    fn num_entries(&self) -> usize {
        match self.children.as_ref() {
            None => self.faces.len(),
            Some(children) => children.iter().map(|c| c.num_entries()).sum(),
        }
    }

    fn depth(&self) -> u32 {
        match self.children.as_ref() {
            None => 0,
            Some(children) => 1 + children.iter().map(|c| c.depth()).max().unwrap_or(0),
        }
    }
}

/// Point location through an adaptive quadtree bucketing the faces of a
/// triangulation. The root cell is the power-of-two square grown from
/// (-1, 1, 1, -1) until it covers the subdivision's bounding box.
pub struct QuadtreeLocator {
    max_overlap: usize,
    max_depth: u32,
    root: Option<QuadtreeNode>,
}

impl QuadtreeLocator {
    pub fn new(max_overlap: usize, max_depth: u32) -> Self {
        Self {
            max_overlap,
            max_depth,
            root: None,
        }
    }

    /// Bucket entry count and depth of the built tree.
    pub fn dimensions(&self) -> (usize, u32) {
        match self.root.as_ref() {
            None => (0, 0),
            Some(root) => (root.num_entries(), root.depth()),
        }
    }
}

impl Default for QuadtreeLocator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_OVERLAP, DEFAULT_MAX_DEPTH)
    }
}

impl super::PointLocator for QuadtreeLocator {
    #[profiling::function]
    fn init(&mut self, sub: &Subdivision) {
        let bounds = sub.bounds().or_else(|| {
            let conn = sub.conn();
            let positions: Vec<Point> = sub
                .traverse(GraphKind::Primal, TraversalKind::Nodes)
                .iter()
                .map(|&e| conn.origin_position(e))
                .collect();
            Rect::bounding(&positions)
        });
        let Some(bounds) = bounds else {
            self.root = None;
            return;
        };

        let mut rect = Rect::new(-1.0, 1.0, 1.0, -1.0);
        while rect.left > bounds.left
            || rect.top < bounds.top
            || rect.right < bounds.right
            || rect.bottom > bounds.bottom
        {
            rect = Rect::new(
                rect.left * 2.0,
                rect.top * 2.0,
                rect.right * 2.0,
                rect.bottom * 2.0,
            );
        }

        let mut root = QuadtreeNode::new(rect, 0, self.max_overlap, self.max_depth);
        for face in sub.traverse(GraphKind::Dual, TraversalKind::Nodes) {
            let conn = sub.conn();
            if conn[conn.origin(face)].label() == 0 {
                continue;
            }
            root.insert(sub, face);
        }
        self.root = Some(root);

        let (entries, depth) = {
            let root = self.root.as_ref().unwrap();
            (root.num_entries(), root.depth())
        };
        log::debug!("quadtree built: {entries} bucket entries, depth {depth}");
    }

    fn locate(&mut self, sub: &Subdivision, p: Point) -> Option<HalfEdgeId> {
        self.root.as_ref()?.locate(sub, p)
    }
}
