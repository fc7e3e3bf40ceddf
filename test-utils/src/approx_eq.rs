// Copyright 2021 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::iter;

use float_cmp::ApproxEq;

/// Compares two "things" with approximate equality.
///
/// Works for floating point numbers and (nested) slices, arrays and vectors of them:
///
/// ```
/// use xayn_test_utils::assert_approx_eq;
/// assert_approx_eq!(f32, 0.150_391_55, 0.150_391_6, ulps = 3);
/// assert_approx_eq!(f32, &[[1., 2.], [3., 4.]], vec![[1., 2.], [3., 4.]]);
/// ```
///
/// The number of `ulps` defaults to `2` and the `epsilon` to `0`.
#[macro_export]
macro_rules! assert_approx_eq {
    ($t:ty, $left:expr, $right:expr $(,)?) => {
        $crate::assert_approx_eq!($t, $left, $right, epsilon = 0., ulps = 2)
    };
    ($t:ty, $left:expr, $right:expr, ulps = $ulps:expr $(,)?) => {
        $crate::assert_approx_eq!($t, $left, $right, epsilon = 0., ulps = $ulps)
    };
    ($t:ty, $left:expr, $right:expr, epsilon = $epsilon:expr $(,)?) => {
        $crate::assert_approx_eq!($t, $left, $right, epsilon = $epsilon, ulps = 2)
    };
    ($t:ty, $left:expr, $right:expr, epsilon = $epsilon:expr, ulps = $ulps:expr $(,)?) => {{
        let left = &$left;
        let right = &$right;
        let left = $crate::ApproxEqIter::<$t>::flat_iter(left).collect::<Vec<_>>();
        let right = $crate::ApproxEqIter::<$t>::flat_iter(right).collect::<Vec<_>>();
        std::assert_eq!(left.len(), right.len(), "Inputs differ in their number of elements");
        for (idx, (lv, rv)) in left.into_iter().zip(right).enumerate() {
            std::assert!(
                (lv.is_nan() && rv.is_nan())
                    || $crate::approx_eq!($t, lv, rv, epsilon = $epsilon, ulps = $ulps),
                "Approximated equal assertion failed at element {}: {:?} != {:?}",
                idx, lv, rv,
            );
        }
    }};
}

/// Helper trait for the [`assert_approx_eq!`] macro, only use it for that.
pub trait ApproxEqIter<'a, Leaf>
where
    Self: 'a,
    Leaf: ApproxEq + Copy,
{
    /// Iterates over all leaf values in logical order.
    fn flat_iter(&'a self) -> Box<dyn 'a + Iterator<Item = Leaf>>;
}

macro_rules! impl_approx_eq_iter {
    ($($t:ty),+ $(,)?) => {
        $(
            impl<'a> ApproxEqIter<'a, $t> for $t {
                fn flat_iter(&'a self) -> Box<dyn 'a + Iterator<Item = $t>> {
                    Box::new(iter::once(*self))
                }
            }

            impl<'a, T> ApproxEqIter<'a, $t> for &'a T
            where
                T: 'a + ApproxEqIter<'a, $t> + ?Sized,
            {
                fn flat_iter(&'a self) -> Box<dyn 'a + Iterator<Item = $t>> {
                    (*self).flat_iter()
                }
            }

            impl<'a, T> ApproxEqIter<'a, $t> for [T]
            where
                T: 'a + ApproxEqIter<'a, $t>,
            {
                fn flat_iter(&'a self) -> Box<dyn 'a + Iterator<Item = $t>> {
                    Box::new(self.iter().flat_map(|el| ApproxEqIter::<$t>::flat_iter(el)))
                }
            }

            impl<'a, T, const N: usize> ApproxEqIter<'a, $t> for [T; N]
            where
                T: 'a + ApproxEqIter<'a, $t>,
            {
                fn flat_iter(&'a self) -> Box<dyn 'a + Iterator<Item = $t>> {
                    self.as_slice().flat_iter()
                }
            }

            impl<'a, T> ApproxEqIter<'a, $t> for Vec<T>
            where
                T: 'a + ApproxEqIter<'a, $t>,
            {
                fn flat_iter(&'a self) -> Box<dyn 'a + Iterator<Item = $t>> {
                    self.as_slice().flat_iter()
                }
            }
        )+
    };
}

impl_approx_eq_iter! { f32, f64 }
