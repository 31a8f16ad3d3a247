// Copyright (C) 2023 tessella contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Some useful re-exports
pub mod prelude;

/// 2D points, geometric predicates and axis-aligned boxes
pub mod geom;

/// Uniform random point generation over a rectangle
pub mod sampling;

/// The quad-edge data structure and planar subdivisions built on it
pub mod subdivision;

/// Incremental (Delaunay) triangulation on top of a subdivision
pub mod triangulation;

/// Point-location engines: oriented walks, slab decomposition, quadtree
pub mod locate;

#[cfg(test)]
mod kernel_tests;
