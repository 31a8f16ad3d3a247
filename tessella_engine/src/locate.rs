// Copyright (C) 2023 tessella contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::geom::Point;
use crate::subdivision::{HalfEdgeId, Subdivision};

/// The Lawson oriented walk and its tuning options
pub mod walk;

/// Starting-edge policies feeding the walking locator
pub mod selector;

/// A walking scheme composed with a starting-edge selector
pub mod walking;

/// Static slab decomposition with O(log n) queries
pub mod slab;

/// Bucketing quadtree over the faces of a triangulation
pub mod quadtree;

/// A point-location engine over a planar subdivision. `locate` answers
/// with a half-edge whose left face contains `p`, or `None` when `p` is
/// outside the subdivision. An outside answer is not an error.
///
/// Locators never borrow the subdivision; they hold ids and receive the
/// subdivision per call, so every mutation stays sequential with respect
/// to queries.
pub trait PointLocator {
    fn init(&mut self, sub: &Subdivision);
    fn locate(&mut self, sub: &Subdivision, p: Point) -> Option<HalfEdgeId>;
}

/// A locator able to observe topology changes as they happen, so it can be
/// used while a triangulation is being built. `remove_edge` must be called
/// before a deleted edge's records are retired.
pub trait OnlineLocator: PointLocator {
    fn add_edge(&mut self, e: HalfEdgeId);
    fn remove_edge(&mut self, e: HalfEdgeId);
}
