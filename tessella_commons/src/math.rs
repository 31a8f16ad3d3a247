// Copyright (C) 2023 tessella contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ops::{Add, Mul, Sub};

use float_ord::FloatOrd;

/// A totally ordered, hashable view of a 2D point. Used wherever points act
/// as sort or set keys: the slab sweep and endpoint deduplication.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Vec2Ord([FloatOrd<f64>; 2]);

pub trait ToOrd<T>
where
    T: Eq + PartialEq + Ord + PartialOrd + std::hash::Hash + Copy,
{
    fn to_ord(&self) -> T;
}

impl ToOrd<Vec2Ord> for glam::DVec2 {
    fn to_ord(&self) -> Vec2Ord {
        Vec2Ord([FloatOrd(self.x), FloatOrd(self.y)])
    }
}

pub trait ToVec<T> {
    fn to_vec(&self) -> T;
}

impl ToVec<glam::DVec2> for Vec2Ord {
    fn to_vec(&self) -> glam::DVec2 {
        glam::DVec2::new(self.0[0].0, self.0[1].0)
    }
}

pub fn lerp<T>(start: T, end: T, t: f64) -> T
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f64, Output = T>,
{
    start + (end - start) * t
}
