// Copyright (C) 2023 tessella contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use itertools::Itertools;
use smallvec::SmallVec;

pub type SVec<T> = SmallVec<[T; 4]>;
pub type SVecN<T, const N: usize> = SmallVec<[T; N]>;

/// Rotates the given iterator by shifting all elements `shift` positions
/// forward. Any elements that would be out of bounds are instead put at the
/// beginning.
///
/// This method requires passing the `len` as a separate parameter. This is
/// often known beforehand or can be found by calling .size_hint() for an
/// ExactSizeIterator.
pub fn rotate_iter<T>(
    it: impl Iterator<Item = T> + Clone,
    shift: usize,
    len: usize,
) -> impl Iterator<Item = T> {
    it.cycle().dropping(shift).take(len)
}

pub trait IteratorUtils: Iterator {
    fn collect_svec(self) -> SVec<Self::Item>
    where
        Self: Sized,
    {
        self.collect()
    }
}

impl<T: ?Sized> IteratorUtils for T where T: Iterator {}

pub trait SliceUtils<T> {
    /// Same as .iter().copied(), but doesn't trigger rustfmt line breaks
    fn iter_cpy(&self) -> std::iter::Copied<std::slice::Iter<'_, T>>;
}

impl<T: Copy> SliceUtils<T> for [T] {
    fn iter_cpy(&self) -> std::iter::Copied<std::slice::Iter<'_, T>> {
        self.iter().copied()
    }
}

#[test]
pub fn test() {
    let rotated: Vec<i32> = rotate_iter(vec![1, 2, 3, 4, 5].into_iter(), 2, 5).collect();
    assert_eq!(rotated, &[3, 4, 5, 1, 2]);
    let unrotated: Vec<i32> = rotate_iter(vec![1, 2, 3].into_iter(), 0, 3).collect();
    assert_eq!(unrotated, &[1, 2, 3]);
}
