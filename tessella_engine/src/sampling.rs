// Copyright (C) 2023 tessella contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geom::{Point, Rect};
use tessella_commons::math::lerp;

/// Draws points uniformly from a closed rectangle. Each instance owns an
/// independent stream seeded from the system source, so concurrent users
/// never share a sequence.
pub struct UniformPointRng {
    rng: StdRng,
    rect: Rect,
}

impl UniformPointRng {
    pub fn new(rect: Rect) -> Self {
        debug_assert!(rect.is_valid());
        Self {
            rng: StdRng::from_entropy(),
            rect,
        }
    }

    pub fn random_point(&mut self) -> Point {
        let x = lerp(self.rect.left, self.rect.right, self.rng.gen::<f64>());
        let y = lerp(self.rect.bottom, self.rect.top, self.rng.gen::<f64>());
        Point::new(x, y)
    }

    pub fn random_points(&mut self, count: usize) -> Vec<Point> {
        (0..count).map(|_| self.random_point()).collect()
    }
}
