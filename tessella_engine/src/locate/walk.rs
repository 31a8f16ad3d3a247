// Copyright (C) 2023 tessella contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use smallvec::SmallVec;

use crate::prelude::*;

/// Modifiers for Lawson's original oriented walk:
///
/// - `Stochastic` processes the edges of a face in random order, which
///   prevents infinite loops on certain non-Delaunay triangulations.
/// - `Remembering` skips the edge shared with the previously visited face,
///   saving one orientation test per non-starting face.
/// - `FastRemembering` (implies remembering) spends its first steps testing
///   a single edge per face, assuming the current face is not the target
///   and the subdivision is a triangulation. Only valid on triangulations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkOption {
    Stochastic,
    Remembering,
    FastRemembering,
}

/// Lawson's oriented walk: step through any edge that makes a right turn
/// with the query point until a face without right turns is reached.
pub struct LawsonWalk {
    stochastic: bool,
    remembering: bool,
    fast: bool,
    max_fast_steps: usize,
    step_budget: Option<usize>,
    rng: StdRng,
    /// Orientation tests spent since construction.
    pub num_tests: u64,
    /// Faces stepped through since construction.
    pub num_faces: u64,
}

impl LawsonWalk {
    /// `max_fast_steps` bounds the fast phase and must be positive exactly
    /// when `FastRemembering` is requested.
    pub fn new(options: &[WalkOption], max_fast_steps: usize) -> Result<Self> {
        let mut walk = Self {
            stochastic: false,
            remembering: false,
            fast: false,
            max_fast_steps,
            step_budget: None,
            rng: StdRng::from_entropy(),
            num_tests: 0,
            num_faces: 0,
        };
        for option in options {
            match option {
                WalkOption::Stochastic => walk.stochastic = true,
                WalkOption::Remembering => walk.remembering = true,
                WalkOption::FastRemembering => {
                    walk.fast = true;
                    walk.remembering = true;
                }
            }
        }
        if walk.fast != (max_fast_steps > 0) {
            bail!("max_fast_steps must be positive exactly when the fast walk is enabled");
        }
        Ok(walk)
    }

    /// Caps the number of faces a single locate may step through. The walk
    /// itself has no hard bound; exceeding a caller-imposed budget is
    /// reported as a divergence and answered with `None`.
    pub fn with_step_budget(mut self, budget: usize) -> Self {
        self.step_budget = Some(budget);
        self
    }

    /// Walks from `start` towards `p`. Returns some edge of the face
    /// containing `p`; when several faces contain `p` (on an edge or a
    /// vertex) an arbitrary one of them is returned. Returns `None` when
    /// `p` is outside the subdivision.
    pub fn walk(&mut self, sub: &Subdivision, start: HalfEdgeId, p: Point) -> Option<HalfEdgeId> {
        let conn = sub.conn();
        let mut curr = start;

        if self.fast {
            // One orientation test per face: if the second face edge does
            // not make a right turn, the third is assumed to. Only sound
            // while the target face is elsewhere, so the fast phase is
            // bounded and the regular walk below settles the answer.
            for _ in 0..self.max_fast_steps {
                let e1 = conn.fnext(curr);
                let e2 = conn.fnext(e1);
                let orient = orientation(conn.origin_position(e1), conn.dest_position(e1), p);
                self.num_tests += 1;
                let candidate = if orient > 0.0 {
                    conn.twin(e1)
                } else {
                    conn.twin(e2)
                };
                self.num_faces += 1;
                // A boundary candidate means p may be outside, or the
                // assumption broke down; either way the regular walk
                // decides.
                if conn.left_label(candidate) == 0 {
                    break;
                }
                curr = candidate;
            }
        }

        let mut first_iteration = true;
        let mut steps = 0usize;
        loop {
            if let Some(budget) = self.step_budget {
                if steps >= budget {
                    log::warn!(
                        "oriented walk exceeded its step budget of {budget} faces while locating {p}"
                    );
                    return None;
                }
            }
            steps += 1;

            let mut face_edges: SmallVec<[HalfEdgeId; 4]> =
                conn.ring(curr, IncidenceMode::OnFace).collect();
            // The first collected edge is the one shared with the previous
            // face; a remembering walk already knows p is not behind it.
            if self.remembering && !first_iteration {
                face_edges.remove(0);
            }
            if self.stochastic {
                face_edges.shuffle(&mut self.rng);
            }

            let mut right_turn = false;
            for &e in &face_edges {
                let orient = orientation(conn.origin_position(e), conn.dest_position(e), p);
                self.num_tests += 1;
                if orient > 0.0 {
                    // p is to the right of e: move to the face on the other
                    // side, unless that face is the exterior.
                    if conn.right_label(e) == 0 {
                        return None;
                    }
                    curr = conn.twin(e);
                    right_turn = true;
                    break;
                }
            }
            first_iteration = false;
            self.num_faces += 1;

            // No right turns means p is inside the current face.
            if !right_turn {
                return Some(curr);
            }
        }
    }
}
