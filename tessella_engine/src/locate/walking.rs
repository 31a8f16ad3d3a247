// Copyright (C) 2023 tessella contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::selector::StartingEdgeSelector;
use super::walk::LawsonWalk;
use super::{OnlineLocator, PointLocator};
use crate::prelude::*;

/// A walking scheme paired with a starting-edge selector: the selector
/// serves the first face, the walk does the stepping, and successful hits
/// feed back into the selector's memory. This is the online locator the
/// incremental triangulation builds against.
pub struct WalkingLocator {
    walk: LawsonWalk,
    selector: StartingEdgeSelector,
}

impl WalkingLocator {
    pub fn new(walk: LawsonWalk, selector: StartingEdgeSelector) -> Self {
        Self { walk, selector }
    }

    pub fn walk(&self) -> &LawsonWalk {
        &self.walk
    }
}

impl PointLocator for WalkingLocator {
    fn init(&mut self, sub: &Subdivision) {
        self.selector.set_plane(sub);
    }

    fn locate(&mut self, sub: &Subdivision, p: Point) -> Option<HalfEdgeId> {
        let start = self.selector.starting_edge(sub, p)?;
        let located = self.walk.walk(sub, start, p);
        self.selector.located_edge(located);
        located
    }
}

impl OnlineLocator for WalkingLocator {
    fn add_edge(&mut self, e: HalfEdgeId) {
        self.selector.add_edge(e);
    }

    fn remove_edge(&mut self, e: HalfEdgeId) {
        self.selector.remove_edge(e);
    }
}
