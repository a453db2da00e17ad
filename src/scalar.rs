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

//! # Zift Scalar Module
//!
//! The closed set of value types estimators and transformers are generic
//! over: the ten fixed-width numeric types, `bool` and `String`.
//!
//! - [`ZiScalar`] gives every value a total order and a missing marker
//!   (`NaN` for floats).
//! - [`ZiKey`] wraps a scalar so it can key ordered maps.
//! - [`ZiNullable`] lets the same estimator accept either `T` or
//!   `Option<T>` as its input.
//! - [`ZiMaxAbsInput`] maps each numeric input to the float type it scales
//!   into.

use std::cmp::Ordering;
use std::fmt::Debug;
use std::ops::Div;

use crate::archive::{ZiArchivable, ZiCArchive, ZiCArchiveReader};
use crate::errors::Result;

/// Value types supported by the estimators.
pub trait ZiScalar: Clone + Debug + PartialEq + Send + Sync + 'static + ZiArchivable {
    /// Short type tag used in boundary symbol names and log lines.
    const TYPE_NAME: &'static str;

    /// Returns true when the value itself encodes "missing".
    fn is_missing(&self) -> bool {
        false
    }

    /// Total order used for map keys and sorted id assignment.
    fn key_cmp(&self, other: &Self) -> Ordering;
}

macro_rules! impl_scalar_ord {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl ZiScalar for $ty {
                const TYPE_NAME: &'static str = $name;

                fn key_cmp(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }
            }
        )*
    };
}

impl_scalar_ord!(
    i8 => "int8",
    i16 => "int16",
    i32 => "int32",
    i64 => "int64",
    u8 => "uint8",
    u16 => "uint16",
    u32 => "uint32",
    u64 => "uint64",
    bool => "bool",
    String => "string",
);

macro_rules! impl_scalar_float {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl ZiScalar for $ty {
                const TYPE_NAME: &'static str = $name;

                fn is_missing(&self) -> bool {
                    self.is_nan()
                }

                fn key_cmp(&self, other: &Self) -> Ordering {
                    // -0.0 and 0.0 are the same key.
                    let normalize = |value: $ty| if value == 0.0 { 0.0 } else { value };
                    normalize(*self).total_cmp(&normalize(*other))
                }
            }
        )*
    };
}

impl_scalar_float!(f32 => "float", f64 => "double");

/// Ordered map key over any [`ZiScalar`].
#[derive(Clone, Debug)]
pub struct ZiKey<T>(pub T);

impl<T: ZiScalar> PartialEq for ZiKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.key_cmp(&other.0) == Ordering::Equal
    }
}

impl<T: ZiScalar> Eq for ZiKey<T> {}

impl<T: ZiScalar> PartialOrd for ZiKey<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: ZiScalar> Ord for ZiKey<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.key_cmp(&other.0)
    }
}

impl<T: ZiScalar> ZiArchivable for ZiKey<T> {
    fn write_to(&self, archive: &mut ZiCArchive) {
        self.0.write_to(archive);
    }

    fn read_from(reader: &mut ZiCArchiveReader<'_>) -> Result<Self> {
        T::read_from(reader).map(ZiKey)
    }
}

/// Input types that may carry a missing value.
pub trait ZiNullable: Clone + Debug + Send + Sync + 'static {
    type Value: ZiScalar;

    /// Returns the present value, or `None` for a missing input.
    fn as_present(&self) -> Option<&Self::Value>;
}

macro_rules! impl_nullable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ZiNullable for $ty {
                type Value = $ty;

                fn as_present(&self) -> Option<&Self::Value> {
                    if self.is_missing() {
                        None
                    } else {
                        Some(self)
                    }
                }
            }

            impl ZiNullable for Option<$ty> {
                type Value = $ty;

                fn as_present(&self) -> Option<&Self::Value> {
                    self.as_ref().filter(|value| !value.is_missing())
                }
            }
        )*
    };
}

impl_nullable!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, bool, String);

/// Numeric inputs accepted by max-abs scaling.
pub trait ZiMaxAbsInput: ZiScalar + Copy {
    /// Float type the input is scaled into.
    type Output: ZiScalar + Copy + PartialOrd + Default + Div<Output = Self::Output>;

    /// Casts the input to the output type.
    fn widen(self) -> Self::Output;

    /// Absolute value computed in the output type so `MIN` values do not overflow.
    fn abs_widened(self) -> Self::Output;
}

macro_rules! impl_max_abs_input {
    ($($ty:ty => $out:ty),* $(,)?) => {
        $(
            impl ZiMaxAbsInput for $ty {
                type Output = $out;

                fn widen(self) -> $out {
                    self as $out
                }

                fn abs_widened(self) -> $out {
                    (self as $out).abs()
                }
            }
        )*
    };
}

impl_max_abs_input!(
    i8 => f32,
    i16 => f32,
    u8 => f32,
    u16 => f32,
    f32 => f32,
    i32 => f64,
    i64 => f64,
    u32 => f64,
    u64 => f64,
    f64 => f64,
);
