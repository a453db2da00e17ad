//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zift.
//! The Zift project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! Partial selection helpers.

/// Returns the `k`-th largest element (1-based) in expected linear time.
///
/// `values` is reordered. Returns `None` when `k` is zero or larger than the
/// slice.
pub fn kth_largest<T: Ord + Copy>(values: &mut [T], k: usize) -> Option<T> {
    if k == 0 || k > values.len() {
        return None;
    }
    let (_, nth, _) = values.select_nth_unstable_by(k - 1, |a, b| b.cmp(a));
    Some(*nth)
}
