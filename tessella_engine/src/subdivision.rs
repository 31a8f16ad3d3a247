// Copyright (C) 2023 tessella contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cell::Cell;

use crate::prelude::*;

use num_traits::AsPrimitive;
use slotmap::SlotMap;

/// Type-safe wrappers over the internal allocator indices used as pointers
pub mod id_types;
pub use id_types::*;

/// Implements indexing traits so the connectivity can be used to access
/// vertex, quad-edge or half-edge records using ids as indices.
pub mod mesh_index_impls;

/// Cyclic iterators over the incidence rings of a half-edge
pub mod rings;
pub use rings::*;

/// Depth-first traversals of the primal and dual graphs
pub mod traversals;
pub use traversals::*;

/// Import / export of subdivisions to OFF files, and PT point lists
pub mod off_files;
pub use off_files::*;

/// The quad-edge structure is a linked structure. This means it is sometimes
/// impossible to ensure some algorithms will terminate when the subdivision
/// is malformed. To ensure the code never goes into an infinite loop, this
/// max number of iterations will be performed before giving an error. This
/// should be large enough, as faces with a very large number of vertices may
/// trigger it.
pub const MAX_LOOP_ITERATIONS: usize = 8196;

/// Raised when a vertex is given a negative label. Label 0 is reserved for
/// the exterior face.
#[derive(Copy, Clone, Debug)]
pub struct InvalidLabel(pub i64);

impl std::fmt::Display for InvalidLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid label for vertex: labels must be non-negative, got {}", self.0)
    }
}
impl std::error::Error for InvalidLabel {}

/// A primal vertex (with a position) or a face-labelling vertex (without
/// one). The exterior face is labelled by the subdivision's exterior vertex,
/// whose label is always 0.
#[derive(Debug, Clone)]
pub struct VertexData {
    label: i64,
    position: Option<Point>,
    last_used: Cell<u64>,
}

impl VertexData {
    pub fn label(&self) -> i64 {
        self.label
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// Returns false if the vertex was used during or after the given
    /// timestamp. Otherwise marks it used and returns true. Ensures each
    /// vertex is visited only once per traversal.
    fn use_at(&self, timestamp: u64) -> bool {
        if timestamp <= self.last_used.get() {
            false
        } else {
            self.last_used.set(timestamp);
            true
        }
    }

    fn last_used(&self) -> u64 {
        self.last_used.get()
    }
}

/// The four-half-edge atom. Slots 0..3 hold the primal forward, dual
/// forward, primal reverse and dual reverse half-edges respectively.
#[derive(Debug, Clone)]
pub struct QuadEdgeData {
    slots: [HalfEdgeId; 4],
    last_used: Cell<u64>,
}

impl QuadEdgeData {
    pub fn slots(&self) -> [HalfEdgeId; 4] {
        self.slots
    }

    fn use_at(&self, timestamp: u64) -> bool {
        if timestamp <= self.last_used.get() {
            false
        } else {
            self.last_used.set(timestamp);
            true
        }
    }

    fn last_used(&self) -> u64 {
        self.last_used.get()
    }
}

/// One directed half-edge: its slot within the parent quad-edge, the parent
/// itself, the next edge counter-clockwise about the origin, and the origin
/// vertex. For the dual slots the "origin" is a face-labelling vertex.
#[derive(Debug, Clone)]
pub struct HalfEdgeData {
    slot: u8,
    quad: QuadEdgeId,
    onext: HalfEdgeId,
    origin: Option<VertexId>,
}

impl HalfEdgeData {
    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn quad(&self) -> QuadEdgeId {
        self.quad
    }
}

/// Owns every quad-edge, half-edge and vertex record of one subdivision and
/// implements the edge algebra over them. All navigation is O(1); the only
/// operations that mutate topology are `splice` and the composites built on
/// it.
#[derive(Debug, Clone, Default)]
pub struct Connectivity {
    quads: SlotMap<QuadEdgeId, QuadEdgeData>,
    halfedges: SlotMap<HalfEdgeId, HalfEdgeData>,
    vertices: SlotMap<VertexId, VertexData>,
}

impl Connectivity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new vertex record, disconnected from everything else. A label
    /// below zero is rejected; positionless vertices label faces.
    pub fn alloc_vertex(&mut self, position: Option<Point>, label: i64) -> Result<VertexId> {
        if label < 0 {
            return Err(InvalidLabel(label).into());
        }
        Ok(self.vertices.insert(VertexData {
            label,
            position,
            last_used: Cell::new(0),
        }))
    }

    /// Creates a non-looping edge whose left and right faces coincide and
    /// returns its primal forward half-edge. Use `rot` on the result to get
    /// a loop that splits the plane into two faces.
    pub fn make_edge(&mut self) -> HalfEdgeId {
        let quad = self.quads.insert(QuadEdgeData {
            slots: [HalfEdgeId::default(); 4],
            last_used: Cell::new(0),
        });
        let mut slots = [HalfEdgeId::default(); 4];
        for (i, slot) in slots.iter_mut().enumerate() {
            *slot = self.halfedges.insert(HalfEdgeData {
                slot: i as u8,
                quad,
                onext: HalfEdgeId::default(),
                origin: None,
            });
        }
        self.quads[quad].slots = slots;
        self[slots[0]].onext = slots[0];
        self[slots[1]].onext = slots[3];
        self[slots[2]].onext = slots[2];
        self[slots[3]].onext = slots[1];
        slots[0]
    }

    /* Edge algebra */

    /// Dual edge pointing from the right face/vertex towards the left
    /// face/vertex (rotated ccw).
    pub fn rot(&self, e: HalfEdgeId) -> HalfEdgeId {
        let h = &self[e];
        self[h.quad].slots[((h.slot + 1) & 3) as usize]
    }

    /// Dual edge pointing from the left face/vertex towards the right
    /// face/vertex (rotated cw).
    pub fn invrot(&self, e: HalfEdgeId) -> HalfEdgeId {
        let h = &self[e];
        self[h.quad].slots[((h.slot + 3) & 3) as usize]
    }

    /// Flipped edge starting at the destination and ending at the origin.
    pub fn twin(&self, e: HalfEdgeId) -> HalfEdgeId {
        let h = &self[e];
        self[h.quad].slots[((h.slot + 2) & 3) as usize]
    }

    /// Next ccw edge around the origin.
    pub fn onext(&self, e: HalfEdgeId) -> HalfEdgeId {
        self[e].onext
    }

    /// Next cw edge around the origin.
    pub fn oprev(&self, e: HalfEdgeId) -> HalfEdgeId {
        self.rot(self.onext(self.rot(e)))
    }

    /// Next (ccw) edge around the left face after this one.
    pub fn fnext(&self, e: HalfEdgeId) -> HalfEdgeId {
        self.rot(self.onext(self.invrot(e)))
    }

    /// Previous (cw) edge around the left face before this one.
    pub fn fprev(&self, e: HalfEdgeId) -> HalfEdgeId {
        self.rot(self.oprev(self.invrot(e)))
    }

    /* Endpoints */

    pub fn origin(&self, e: HalfEdgeId) -> VertexId {
        self[e].origin.expect("Half-edge should have an origin")
    }

    pub fn dest(&self, e: HalfEdgeId) -> VertexId {
        self.origin(self.twin(e))
    }

    /// The vertex labelling the face to the left of `e`.
    pub fn left(&self, e: HalfEdgeId) -> VertexId {
        self.origin(self.invrot(e))
    }

    /// The vertex labelling the face to the right of `e`.
    pub fn right(&self, e: HalfEdgeId) -> VertexId {
        self.origin(self.rot(e))
    }

    pub fn origin_position(&self, e: HalfEdgeId) -> Point {
        self[self.origin(e)]
            .position
            .expect("Origin vertex should have a position")
    }

    pub fn dest_position(&self, e: HalfEdgeId) -> Point {
        self[self.dest(e)]
            .position
            .expect("Destination vertex should have a position")
    }

    pub fn left_label(&self, e: HalfEdgeId) -> i64 {
        self[self.left(e)].label
    }

    pub fn right_label(&self, e: HalfEdgeId) -> i64 {
        self[self.right(e)].label
    }

    /// Writes any non-`None` of (origin, destination, left face label, right
    /// face label) of `e`. Ring topology is not touched; this is used after
    /// `splice` to fix labels.
    pub fn set_endpoints(
        &mut self,
        e: HalfEdgeId,
        origin: Option<VertexId>,
        dest: Option<VertexId>,
        left: Option<VertexId>,
        right: Option<VertexId>,
    ) {
        if let Some(o) = origin {
            self[e].origin = Some(o);
        }
        if let Some(d) = dest {
            let t = self.twin(e);
            self[t].origin = Some(d);
        }
        if let Some(lf) = left {
            let ir = self.invrot(e);
            self[ir].origin = Some(lf);
        }
        if let Some(rf) = right {
            let r = self.rot(e);
            self[r].origin = Some(rf);
        }
    }

    /// Relabels the left face of every edge on the same left face as `e`
    /// to `face`.
    pub fn label_face(&mut self, e: HalfEdgeId, face: VertexId) {
        let irot = self.invrot(e);
        let ring: SVec<_> = self.ring(irot, IncidenceMode::ToOrigin).collect();
        for dual in ring {
            self[dual].origin = Some(face);
        }
    }

    /* Topology operations */

    /// The hinge operation of the edge algebra. Swaps the onext pointers of
    /// `a` and `b` and of their duals: splicing two edges that share an
    /// origin splits that origin-ring, splicing edges at different origins
    /// joins them, and the dual swap performs the same operation on the
    /// face-rings.
    pub fn splice(&mut self, a: HalfEdgeId, b: HalfEdgeId) {
        let dual_a = self.rot(self.onext(a));
        let dual_b = self.rot(self.onext(b));

        let a_next = self.onext(a);
        let b_next = self.onext(b);
        let dual_a_next = self.onext(dual_a);
        let dual_b_next = self.onext(dual_b);

        self[a].onext = b_next;
        self[b].onext = a_next;
        self[dual_a].onext = dual_b_next;
        self[dual_b].onext = dual_a_next;
    }

    /// Connects the destination of `a` to the origin of `b` with a new edge
    /// and stamps a fresh vertex on the newly separated left face, labelled
    /// `face_label` (or the prior left-face label when `None`). Requires
    /// that a's destination is not b's origin and that a and b share a left
    /// face.
    pub fn connect(
        &mut self,
        a: HalfEdgeId,
        b: HalfEdgeId,
        face_label: Option<i64>,
    ) -> Result<HalfEdgeId> {
        debug_assert!(
            self.dest(a) != self.origin(b),
            "connect requires distinct endpoints"
        );
        let e = self.make_edge();
        let a_fnext = self.fnext(a);
        self.splice(e, a_fnext);
        let e_twin = self.twin(e);
        self.splice(e_twin, b);
        let a_left = self.left(a);
        self.set_endpoints(
            e,
            Some(self.dest(a)),
            Some(self.origin(b)),
            Some(a_left),
            Some(a_left),
        );
        // The left face of e is now a separate region. Relabel every edge on
        // it with a fresh face vertex, reusing the old label when the caller
        // did not supply one.
        let label = match face_label {
            Some(label) => label,
            None => self.left_label(e),
        };
        let new_face = self.alloc_vertex(None, label)?;
        self.label_face(e, new_face);
        Ok(e)
    }

    /// Removes `e` after disconnecting it from its origin rings, relabelling
    /// its left face to its right face. Effectively merges the two faces
    /// across `e`. The quad-edge record is retired immediately: any locator
    /// that holds `e` must be told through its `remove_edge` channel before
    /// this call.
    pub fn delete_edge(&mut self, e: HalfEdgeId) {
        let right_face = self.right(e);
        let ring: SVec<_> = self.ring(e, IncidenceMode::OnFace).collect();
        for f in ring {
            let ir = self.invrot(f);
            self[ir].origin = Some(right_face);
        }
        let a = self.oprev(e);
        self.splice(e, a);
        let t = self.twin(e);
        let b = self.oprev(t);
        self.splice(t, b);
        self.retire_quad(self[e].quad);
    }

    /// Given two independent half-edges representing the same geometric edge
    /// traversed oppositely (as produced while stitching polygons), glues
    /// them into one quad-edge, connecting their left faces. Returns a
    /// half-edge that still exists.
    pub fn merge_twins(&mut self, a: HalfEdgeId, b: HalfEdgeId) -> HalfEdgeId {
        debug_assert!(
            self.origin(a) == self.dest(b) && self.dest(a) == self.origin(b),
            "merge_twins requires opposite traversals of one edge"
        );
        // The records replaced out of a's quad and left behind in b's quad.
        let dead = [self.twin(a), self.rot(a), self.twin(b), self.rot(b)];
        let dead_quad = self[b].quad;

        let t = self.fnext(a);
        self[t].onext = b;
        let t = self.fnext(b);
        self[t].onext = a;

        let b_twin_onext = self.onext(self.twin(b));
        let a_twin_onext = self.onext(self.twin(a));
        let t = self.fnext(self.twin(a));
        self[t].onext = b_twin_onext;
        let t = self.fnext(self.twin(b));
        self[t].onext = a_twin_onext;

        let b_rot_onext = self.onext(self.rot(b));
        let a_rot_onext = self.onext(self.rot(a));
        let t = self.oprev(self.rot(a));
        self[t].onext = b_rot_onext;
        let t = self.oprev(self.rot(b));
        self[t].onext = a_rot_onext;

        let b_invrot = self.invrot(b);
        self.adopt_twin(a, b);
        let a_invrot = self.invrot(a);
        self.adopt_twin(a_invrot, b_invrot);

        for h in dead {
            self.halfedges.remove(h);
        }
        self.quads.remove(dead_quad);
        a
    }

    /// Rotates `e` ccw inside the quadrilateral formed by its two incident
    /// faces, so the result is the other diagonal. Left/right face labels of
    /// the rotated edge match those of the previous edge. Requires that both
    /// faces of `e` are real (not the exterior).
    pub fn rotate_in_enclosing(&mut self, e: HalfEdgeId) -> HalfEdgeId {
        let left_face = self.left(e);
        let right_face = self.right(e);
        debug_assert!(
            self[left_face].label != 0 && self[right_face].label != 0,
            "cannot rotate a boundary edge"
        );
        let a = self.oprev(e);
        let b = self.oprev(self.twin(e));
        // Disconnect e from the enclosing polygon.
        self.splice(e, a);
        let t = self.twin(e);
        self.splice(t, b);
        // Reconnect to the next edges on a's and b's left faces. Edges in a
        // face are oriented ccw.
        let a_fnext = self.fnext(a);
        self.splice(e, a_fnext);
        let b_fnext = self.fnext(b);
        let t = self.twin(e);
        self.splice(t, b_fnext);
        self.set_endpoints(
            e,
            Some(self.dest(a)),
            Some(self.dest(b)),
            Some(left_face),
            Some(right_face),
        );
        let ai = self.invrot(a);
        self[ai].origin = Some(left_face);
        let bi = self.invrot(b);
        self[bi].origin = Some(right_face);
        e
    }

    /// Moves `e` into the twin slot of `anchor`'s quad-edge, re-parenting
    /// it. The record previously in that slot is left to the caller.
    fn adopt_twin(&mut self, anchor: HalfEdgeId, e: HalfEdgeId) {
        let (quad, slot) = {
            let h = &self[anchor];
            (h.quad, (h.slot + 2) & 3)
        };
        self.quads[quad].slots[slot as usize] = e;
        self[e].slot = slot;
        self[e].quad = quad;
    }

    /// Removes a fully detached quad-edge and its four half-edge records.
    fn retire_quad(&mut self, quad: QuadEdgeId) {
        let slots = self.quads[quad].slots;
        for h in slots {
            self.halfedges.remove(h);
        }
        self.quads.remove(quad);
    }

    /* Inspection */

    pub fn contains_halfedge(&self, e: HalfEdgeId) -> bool {
        self.halfedges.contains_key(e)
    }

    pub fn num_quad_edges(&self) -> usize {
        self.quads.len()
    }

    pub fn num_half_edges(&self) -> usize {
        self.halfedges.len()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn iter_vertices(&self) -> impl Iterator<Item = (VertexId, &VertexData)> {
        self.vertices.iter()
    }

    pub fn describe_vertex(&self, v: VertexId) -> String {
        let vert = &self[v];
        match vert.position {
            Some(p) => format!("[({}, {}) : {}]", p.x, p.y, vert.label),
            None => format!("{}", vert.label),
        }
    }

    /// Human-readable form of an edge: origin to destination plus the left
    /// and right face labels.
    pub fn describe_edge(&self, e: HalfEdgeId) -> String {
        format!(
            "{} to {} ({}, {})",
            self.describe_vertex(self.origin(e)),
            self.describe_vertex(self.dest(e)),
            self.describe_vertex(self.left(e)),
            self.describe_vertex(self.right(e)),
        )
    }
}

/// A planar subdivision: the connectivity arena plus a distinguished entry
/// edge, the exterior vertex labelling the unbounded face, the traversal
/// clock and an optional bounding box.
#[derive(Debug, Clone)]
pub struct Subdivision {
    conn: Connectivity,
    incident_edge: Option<HalfEdgeId>,
    exterior: VertexId,
    clock: Cell<u64>,
    bounds: Option<Rect>,
}

impl Subdivision {
    pub fn new() -> Self {
        let mut conn = Connectivity::new();
        let exterior = conn
            .alloc_vertex(None, 0)
            .expect("Exterior label is valid");
        Self {
            conn,
            incident_edge: None,
            exterior,
            clock: Cell::new(1),
            bounds: None,
        }
    }

    pub fn conn(&self) -> &Connectivity {
        &self.conn
    }

    pub fn conn_mut(&mut self) -> &mut Connectivity {
        &mut self.conn
    }

    /// An arbitrary edge of the subdivision, used as the entry point for
    /// traversals and the interactive tour.
    pub fn incident_edge(&self) -> Option<HalfEdgeId> {
        self.incident_edge
    }

    pub fn set_incident_edge(&mut self, e: HalfEdgeId) {
        self.incident_edge = Some(e);
    }

    /// The vertex labelling the unbounded face. Unique per subdivision,
    /// always label 0.
    pub fn exterior(&self) -> VertexId {
        self.exterior
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Removes an edge, merging its two faces, keeping the incident edge
    /// valid. See [`Connectivity::delete_edge`] for the locator contract.
    pub fn delete_edge(&mut self, e: HalfEdgeId) {
        if let Some(incident) = self.incident_edge {
            if self.conn[incident].quad == self.conn[e].quad {
                self.incident_edge = Some(self.conn.oprev(e));
            }
        }
        self.conn.delete_edge(e);
    }

    /// Builds the boundary ring of a polygon over existing vertices, given
    /// in ccw order. The left face gets a fresh vertex labelled
    /// `face_label`; the right face is the exterior.
    fn make_polygon(&mut self, vertices: &[VertexId], face_label: i64) -> Result<HalfEdgeId> {
        if vertices.len() < 3 {
            bail!("Cannot build a polygon with fewer than three vertices");
        }
        let face = self.conn.alloc_vertex(None, face_label)?;
        let exterior = self.exterior;
        let mut edges = Vec::with_capacity(vertices.len());
        for (&v, &v_next) in vertices.iter().circular_tuple_windows() {
            let e = self.conn.make_edge();
            self.conn
                .set_endpoints(e, Some(v), Some(v_next), Some(face), Some(exterior));
            edges.push(e);
        }
        for (&e, &e_next) in edges.iter().circular_tuple_windows() {
            let e_twin = self.conn.twin(e);
            self.conn.splice(e_next, e_twin);
            debug_assert!(
                orientation(
                    self.conn.origin_position(e),
                    self.conn.dest_position(e),
                    self.conn.dest_position(e_next),
                ) <= 0.0,
                "polygon vertices must be in ccw order"
            );
        }
        Ok(edges[0])
    }

    /// Creates a single polygon from n >= 3 points in ccw order, with left
    /// face 1 and the exterior on the right.
    pub fn init_polygon(&mut self, points: &[Point]) -> Result<HalfEdgeId> {
        let vertices = points
            .iter()
            .enumerate()
            .map(|(i, &p)| self.conn.alloc_vertex(Some(p), i as i64))
            .collect::<Result<Vec<_>>>()?;
        let first = self.make_polygon(&vertices, 1)?;
        self.incident_edge = Some(first);
        Ok(first)
    }

    /// Creates the four-corner polygon of `rect` and remembers the box.
    pub fn init_bounding_box(&mut self, rect: Rect) -> Result<HalfEdgeId> {
        if !rect.is_valid() {
            bail!("Bounding box has left > right or bottom > top");
        }
        self.bounds = Some(rect);
        self.init_polygon(&rect.corners_ccw())
    }

    /// Builds an arbitrary subdivision from a point set and a face list.
    /// Face f gets label f + 1; every vertex index is generic over integer
    /// type. Assumes distinct points and ccw vertex orders per face, and
    /// that the faces tessellate a simply connected region: every half-edge
    /// left unmatched after stitching is taken to be a boundary edge.
    #[profiling::function]
    pub fn init_subdivision<Index, Face>(
        &mut self,
        points: &[Point],
        faces: &[Face],
    ) -> Result<HalfEdgeId>
    where
        Index: AsPrimitive<usize>,
        Face: AsRef<[Index]>,
    {
        let vertices = points
            .iter()
            .enumerate()
            .map(|(i, &p)| self.conn.alloc_vertex(Some(p), i as i64))
            .collect::<Result<Vec<_>>>()?;

        let mut edges = Vec::new();
        for (f, face) in faces.iter().enumerate() {
            let face_vertices = face
                .as_ref()
                .iter()
                .map(|&i| {
                    vertices
                        .get(i.as_())
                        .copied()
                        .ok_or_else(|| anyhow!("Out-of-bounds index in the face list: {}", i.as_()))
                })
                .collect::<Result<Vec<_>>>()?;
            let face_edge = self.make_polygon(&face_vertices, f as i64 + 1)?;
            // Collect the constructed ring so duplicated edges can be merged
            // below.
            edges.extend(self.conn.ring(face_edge, IncidenceMode::OnFace));
            self.incident_edge = Some(face_edge);
        }

        // Sorting by unordered endpoint-label pair makes duplicate edges
        // adjacent.
        let conn = &self.conn;
        edges.sort_by_key(|&e| {
            let o = conn[conn.origin(e)].label;
            let d = conn[conn.dest(e)].label;
            (o.min(d), o.max(d))
        });

        let mut i = 0;
        while i < edges.len() {
            if i + 1 < edges.len() && self.same_endpoints(edges[i], edges[i + 1]) {
                let b = self.conn.twin(edges[i + 1]);
                self.incident_edge = Some(self.conn.merge_twins(edges[i], b));
                i += 2;
            } else if i + 1 < edges.len() && self.flipped_endpoints(edges[i], edges[i + 1]) {
                self.incident_edge = Some(self.conn.merge_twins(edges[i], edges[i + 1]));
                i += 2;
            } else {
                // An edge without a twin must be a boundary edge; its dual
                // side is labelled with the exterior vertex.
                self.incident_edge = Some(edges[i]);
                let r = self.conn.rot(edges[i]);
                let exterior = self.exterior;
                self.conn[r].origin = Some(exterior);
                i += 1;
            }
        }
        self.incident_edge
            .ok_or_else(|| anyhow!("Cannot build a subdivision from an empty face list"))
    }

    fn same_endpoints(&self, e1: HalfEdgeId, e2: HalfEdgeId) -> bool {
        self.conn.origin(e1) == self.conn.origin(e2) && self.conn.dest(e1) == self.conn.dest(e2)
    }

    fn flipped_endpoints(&self, e1: HalfEdgeId, e2: HalfEdgeId) -> bool {
        self.conn.origin(e1) == self.conn.dest(e2) && self.conn.dest(e1) == self.conn.origin(e2)
    }
}

impl Default for Subdivision {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_points() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]
    }

    #[test]
    fn fresh_edge_wiring() {
        let mut conn = Connectivity::new();
        let e = conn.make_edge();
        let r = conn.rot(e);
        let t = conn.twin(e);
        let ir = conn.invrot(e);

        assert_eq!(conn.onext(e), e);
        assert_eq!(conn.onext(r), ir);
        assert_eq!(conn.onext(t), t);
        assert_eq!(conn.onext(ir), r);
    }

    #[test]
    fn edge_algebra_identities() {
        let mut conn = Connectivity::new();
        let e = conn.make_edge();

        assert_eq!(conn.twin(conn.twin(e)), e);
        let r4 = conn.rot(conn.rot(conn.rot(conn.rot(e))));
        assert_eq!(r4, e);
        assert_eq!(conn.invrot(conn.rot(e)), e);
        assert_eq!(conn.rot(conn.rot(e)), conn.twin(e));
    }

    #[test]
    fn polygon_rings() {
        let mut sub = Subdivision::new();
        let e = sub.init_polygon(&square_points()).unwrap();
        let conn = sub.conn();

        let face: Vec<_> = conn.ring(e, IncidenceMode::OnFace).collect();
        assert_eq!(face.len(), 4);
        assert_eq!(conn.fnext(face[3]), e);
        for &f in &face {
            assert_eq!(conn.left_label(f), 1);
            assert_eq!(conn.right_label(f), 0);
        }

        // Each corner has exactly two outgoing and two incoming edges.
        let origin: Vec<_> = conn.ring(e, IncidenceMode::ToOrigin).collect();
        assert_eq!(origin.len(), 2);
        let incoming: Vec<_> = conn.ring(e, IncidenceMode::ToDestination).collect();
        assert_eq!(incoming.len(), 2);
        for &f in &incoming {
            assert_eq!(conn.dest(f), conn.dest(e));
        }

        // The reverse ring visits the same edges in opposite order.
        let rev: Vec<_> = conn.ring_rev(e, IncidenceMode::OnFace).collect();
        assert_eq!(rev[0], face[0]);
        assert_eq!(rev[1], face[3]);
        assert_eq!(rev.len(), 4);
    }

    #[test]
    fn connect_splits_a_face() {
        let mut sub = Subdivision::new();
        let e = sub.init_bounding_box(Rect::new(0.0, 1.0, 1.0, 0.0)).unwrap();
        let a = sub.conn().fnext(e);
        let diagonal = sub.conn_mut().connect(a, e, Some(2)).unwrap();
        let conn = sub.conn();

        assert_eq!(conn.num_quad_edges(), 5);
        let left: Vec<_> = conn.ring(diagonal, IncidenceMode::OnFace).collect();
        let right: Vec<_> = conn.ring(conn.twin(diagonal), IncidenceMode::OnFace).collect();
        assert_eq!(left.len(), 3);
        assert_eq!(right.len(), 3);
        assert_eq!(conn.left_label(diagonal), 2);
        assert_eq!(conn.right_label(diagonal), 1);
    }

    #[test]
    fn delete_edge_merges_faces() {
        let mut sub = Subdivision::new();
        let e = sub.init_bounding_box(Rect::new(0.0, 1.0, 1.0, 0.0)).unwrap();
        let a = sub.conn().fnext(e);
        let diagonal = sub.conn_mut().connect(a, e, Some(2)).unwrap();
        let right_label = sub.conn().right_label(diagonal);

        sub.delete_edge(diagonal);
        let conn = sub.conn();
        assert_eq!(conn.num_quad_edges(), 4);
        let e = sub.incident_edge().unwrap();
        let face: Vec<_> = conn.ring(e, IncidenceMode::OnFace).collect();
        assert_eq!(face.len(), 4);
        for &f in &face {
            assert_eq!(conn.left_label(f), right_label);
        }
    }

    #[test]
    fn subdivision_merges_shared_edges() {
        // A unit square cut along one diagonal: the shared edge 2-0 shows up
        // flipped in the two face rings.
        let mut sub = Subdivision::new();
        sub.init_subdivision(&square_points(), &[vec![0u32, 1, 2], vec![0, 2, 3]])
            .unwrap();
        let conn = sub.conn();

        // 4 boundary edges plus the shared diagonal.
        assert_eq!(conn.num_quad_edges(), 5);
        // 4 primal vertices, the exterior, and two face vertices.
        assert_eq!(conn.num_vertices(), 7);
    }

    #[test]
    fn negative_labels_are_rejected() {
        let mut conn = Connectivity::new();
        let err = conn.alloc_vertex(None, -3).unwrap_err();
        assert!(err.downcast_ref::<InvalidLabel>().is_some());
    }

    #[test]
    fn describe_edge_mentions_both_faces() {
        let mut sub = Subdivision::new();
        let e = sub.init_polygon(&square_points()).unwrap();
        let text = sub.conn().describe_edge(e);
        assert_eq!(text, "[(0, 0) : 0] to [(1, 0) : 1] (1, 0)");
    }
}
