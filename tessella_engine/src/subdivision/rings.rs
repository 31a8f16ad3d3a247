// Copyright (C) 2023 tessella contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

/// Selects which cyclic ring of half-edges an [`EdgeRing`] walks.
///
/// `OnFace` visits the edges sharing the left face in ccw order, `ToOrigin`
/// the edges sharing the origin in ccw order, and `ToDestination` the edges
/// sharing the destination. The ccw ordering flips to cw for rings of the
/// exterior face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncidenceMode {
    OnFace,
    ToOrigin,
    ToDestination,
}

/// A single-pass cyclic iterator over one of the incidence rings of a
/// half-edge. The start edge is yielded first; the iterator finishes when
/// the cycle returns to it. An explicit has-advanced token distinguishes the
/// terminal state from the initial one, so a full cycle yields every edge of
/// the ring exactly once.
pub struct EdgeRing<'a> {
    conn: &'a Connectivity,
    start: HalfEdgeId,
    next: HalfEdgeId,
    mode: IncidenceMode,
    reversed: bool,
    advanced: bool,
    count: usize,
}

impl<'a> EdgeRing<'a> {
    pub(super) fn new(
        conn: &'a Connectivity,
        start: HalfEdgeId,
        mode: IncidenceMode,
        reversed: bool,
    ) -> Self {
        Self {
            conn,
            start,
            next: start,
            mode,
            reversed,
            advanced: false,
            count: 0,
        }
    }

    fn step_edge(&self, e: HalfEdgeId) -> HalfEdgeId {
        let conn = self.conn;
        if !self.reversed {
            match self.mode {
                IncidenceMode::OnFace => conn.fnext(e),
                IncidenceMode::ToOrigin => conn.onext(e),
                IncidenceMode::ToDestination => conn.twin(conn.onext(conn.twin(e))),
            }
        } else {
            match self.mode {
                IncidenceMode::OnFace => conn.fprev(e),
                IncidenceMode::ToOrigin => conn.oprev(e),
                IncidenceMode::ToDestination => conn.twin(conn.oprev(conn.twin(e))),
            }
        }
    }
}

impl<'a> Iterator for EdgeRing<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.count >= MAX_LOOP_ITERATIONS {
            panic!("Max number of iterations reached. Is the subdivision malformed?");
        } else if self.advanced && self.next == self.start {
            None
        } else {
            let res = self.next;
            self.next = self.step_edge(res);
            self.advanced = true;
            self.count += 1;
            Some(res)
        }
    }
}

impl Connectivity {
    /// Iterates the given incidence ring of `e` in its natural (ccw) order.
    pub fn ring(&self, e: HalfEdgeId, mode: IncidenceMode) -> EdgeRing<'_> {
        EdgeRing::new(self, e, mode, false)
    }

    /// Iterates the given incidence ring of `e` in reverse (cw) order.
    pub fn ring_rev(&self, e: HalfEdgeId, mode: IncidenceMode) -> EdgeRing<'_> {
        EdgeRing::new(self, e, mode, true)
    }
}
