// Copyright (C) 2023 tessella contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ops::{Index, IndexMut};

use super::*;

impl Index<HalfEdgeId> for Connectivity {
    type Output = HalfEdgeData;
    fn index(&self, index: HalfEdgeId) -> &Self::Output {
        self.halfedges
            .get(index)
            .unwrap_or_else(|| panic!("Half-edge {index:?} is not in this subdivision"))
    }
}

impl IndexMut<HalfEdgeId> for Connectivity {
    fn index_mut(&mut self, index: HalfEdgeId) -> &mut Self::Output {
        self.halfedges
            .get_mut(index)
            .unwrap_or_else(|| panic!("Half-edge {index:?} is not in this subdivision"))
    }
}

impl Index<QuadEdgeId> for Connectivity {
    type Output = QuadEdgeData;
    fn index(&self, index: QuadEdgeId) -> &Self::Output {
        self.quads
            .get(index)
            .unwrap_or_else(|| panic!("Quad-edge {index:?} is not in this subdivision"))
    }
}

impl IndexMut<QuadEdgeId> for Connectivity {
    fn index_mut(&mut self, index: QuadEdgeId) -> &mut Self::Output {
        self.quads
            .get_mut(index)
            .unwrap_or_else(|| panic!("Quad-edge {index:?} is not in this subdivision"))
    }
}

impl Index<VertexId> for Connectivity {
    type Output = VertexData;
    fn index(&self, index: VertexId) -> &Self::Output {
        self.vertices
            .get(index)
            .unwrap_or_else(|| panic!("Vertex {index:?} is not in this subdivision"))
    }
}

impl IndexMut<VertexId> for Connectivity {
    fn index_mut(&mut self, index: VertexId) -> &mut Self::Output {
        self.vertices
            .get_mut(index)
            .unwrap_or_else(|| panic!("Vertex {index:?} is not in this subdivision"))
    }
}
