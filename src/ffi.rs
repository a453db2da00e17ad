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

//! # Zift Foreign Function Boundary
//!
//! C entry points for the shipped featurizer families. Every function
//! returns `true` on success; on failure it returns `false` and stores a
//! heap-allocated [`ZiCBoundaryError`] in `out_error`, which the caller
//! inspects with `zift_error_kind` / `zift_error_message` and releases with
//! `zift_destroy_error`. Panics are caught and reported as internal errors.
//!
//! Estimators and transformers live in per-family [`ZiCHandleRegistry`]
//! tables and are referred to by opaque `u64` handles. Estimators are
//! created already training. A handle that was
//! destroyed, or never issued, is rejected with `InvalidArgument`. A call
//! that panics retires the handle it was working on; other handles of the
//! family keep working.
//!
//! ## Families
//!
//! - `zift_max_abs_scalar_<type>_*` for the ten numeric types
//! - `zift_forward_fill_imputer_<type>_*` for the ten numeric types (a null
//!   input pointer is a missing value) and for strings
//! - `zift_label_encoder_string_*`
//!
//! Numeric type names: `int8`, `int16`, `int32`, `int64`, `uint8`, `uint16`,
//! `uint32`, `uint64`, `float`, `double`.

use std::any::Any;
use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use libc::c_char;

use crate::annotation::{ZiAnnotationStore, ZiAnnotationStoreRef};
use crate::errors::{Result, ZiError, ZiErrorKind};
use crate::estimator::{ZiEstimator, ZiTransformerEstimator};
use crate::transformer::{ZiLoadable, ZiTransformer};

/// Opaque handle returned across the boundary.
pub type ZiHandle = u64;

struct ZiSlot<T> {
    generation: u32,
    value: Option<T>,
}

/// Arena of values addressed by generation-checked handles.
///
/// A handle packs the slot generation in the high 32 bits and the slot index
/// in the low 32 bits. Removing a value bumps the generation of its slot, so
/// stale handles never reach a value that reuses the slot. Handle `0` is
/// never issued.
pub struct ZiCHandleRegistry<T> {
    slots: Vec<ZiSlot<T>>,
    free: Vec<u32>,
}

impl<T> Default for ZiCHandleRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ZiCHandleRegistry<T> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    fn pack(generation: u32, index: u32) -> ZiHandle {
        (u64::from(generation) << 32) | u64::from(index)
    }

    fn unpack(handle: ZiHandle) -> (u32, usize) {
        ((handle >> 32) as u32, (handle & 0xFFFF_FFFF) as usize)
    }

    pub fn insert(&mut self, value: T) -> Result<ZiHandle> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return Ok(Self::pack(slot.generation, index));
        }

        let index = u32::try_from(self.slots.len())
            .map_err(|_| ZiError::internal("handle registry is full"))?;
        self.slots.push(ZiSlot {
            generation: 1,
            value: Some(value),
        });
        Ok(Self::pack(1, index))
    }

    fn slot(&self, handle: ZiHandle) -> Option<&ZiSlot<T>> {
        let (generation, index) = Self::unpack(handle);
        self.slots
            .get(index)
            .filter(|slot| slot.generation == generation && slot.value.is_some())
    }

    pub fn contains(&self, handle: ZiHandle) -> bool {
        self.slot(handle).is_some()
    }

    pub fn get(&self, handle: ZiHandle) -> Result<&T> {
        self.slot(handle)
            .and_then(|slot| slot.value.as_ref())
            .ok_or_else(|| invalid_handle(handle))
    }

    pub fn get_mut(&mut self, handle: ZiHandle) -> Result<&mut T> {
        let (generation, index) = Self::unpack(handle);
        self.slots
            .get_mut(index)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.value.as_mut())
            .ok_or_else(|| invalid_handle(handle))
    }

    pub fn remove(&mut self, handle: ZiHandle) -> Result<T> {
        let (generation, index) = Self::unpack(handle);
        let slot = self
            .slots
            .get_mut(index)
            .filter(|slot| slot.generation == generation && slot.value.is_some())
            .ok_or_else(|| invalid_handle(handle))?;

        let value = slot.value.take().ok_or_else(|| invalid_handle(handle))?;
        slot.generation = match slot.generation.wrapping_add(1) {
            0 => 1,
            next => next,
        };
        self.free.push(index as u32);
        Ok(value)
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn invalid_handle(handle: ZiHandle) -> ZiError {
    ZiError::invalid_argument(format!("invalid handle {handle:#x}"))
}

/// Error value handed to C callers.
#[derive(Debug)]
pub struct ZiCBoundaryError {
    kind: ZiErrorKind,
    message: CString,
}

impl ZiCBoundaryError {
    pub fn from_error(err: &ZiError) -> Self {
        let message = err.to_string().replace('\0', " ");
        Self {
            kind: err.kind(),
            message: CString::new(message).unwrap_or_default(),
        }
    }

    pub fn kind(&self) -> ZiErrorKind {
        self.kind
    }

    pub fn message(&self) -> &CStr {
        &self.message
    }
}

/// Returns the [`ZiErrorKind`] discriminant, or `0` for a null error.
///
/// # Safety
///
/// `error` must be null or a pointer produced by this library.
#[no_mangle]
pub unsafe extern "C" fn zift_error_kind(error: *const ZiCBoundaryError) -> u8 {
    match error.as_ref() {
        Some(error) => error.kind as u8,
        None => 0,
    }
}

/// Returns the NUL-terminated message, valid until the error is destroyed.
///
/// # Safety
///
/// `error` must be null or a pointer produced by this library.
#[no_mangle]
pub unsafe extern "C" fn zift_error_message(error: *const ZiCBoundaryError) -> *const c_char {
    match error.as_ref() {
        Some(error) => error.message.as_ptr(),
        None => ptr::null(),
    }
}

/// # Safety
///
/// `error` must be null or a pointer produced by this library, destroyed once.
#[no_mangle]
pub unsafe extern "C" fn zift_destroy_error(error: *mut ZiCBoundaryError) {
    if !error.is_null() {
        drop(Box::from_raw(error));
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs `body`, converting errors and panics into a boundary error.
///
/// # Safety
///
/// `out_error` must be null or valid for writes.
pub unsafe fn boundary<F>(operation: &str, out_error: *mut *mut ZiCBoundaryError, body: F) -> bool
where
    F: FnOnce() -> Result<()>,
{
    if out_error.is_null() {
        log::warn!("boundary call '{operation}' rejected: null error out-parameter");
        return false;
    }
    *out_error = ptr::null_mut();

    let outcome = catch_unwind(AssertUnwindSafe(body))
        .unwrap_or_else(|payload| Err(ZiError::internal(format!("panic: {}", panic_message(payload)))));

    match outcome {
        Ok(()) => true,
        Err(err) => {
            log::warn!("boundary call '{operation}' failed: {err}");
            *out_error = Box::into_raw(Box::new(ZiCBoundaryError::from_error(&err)));
            false
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs `body` on one registered value. A panic inside `body` retires that
/// handle only; the registry stays usable for every other handle.
fn run_contained<V, R>(
    registry: &mut ZiCHandleRegistry<V>,
    handle: ZiHandle,
    body: impl FnOnce(&mut V) -> Result<R>,
) -> Result<R> {
    let value = registry.get_mut(handle)?;
    match catch_unwind(AssertUnwindSafe(|| body(value))) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload);
            if registry.remove(handle).is_ok() {
                log::warn!("handle {handle:#x} retired after panic: {message}");
            }
            Err(ZiError::internal(format!("panic: {message}")))
        }
    }
}

/// Fails when an out-parameter is null.
pub fn require_out<T>(out: *mut T, name: &str) -> Result<()> {
    if out.is_null() {
        return Err(ZiError::invalid_argument(format!("'{name}' is null")));
    }
    Ok(())
}

/// Borrows `count` items; a null or empty buffer is rejected.
///
/// # Safety
///
/// `values` must be valid for `count` reads.
pub unsafe fn input_slice<'a, T>(values: *const T, count: usize) -> Result<&'a [T]> {
    if values.is_null() || count == 0 {
        return Err(ZiError::invalid_argument("input buffer is null or empty"));
    }
    Ok(std::slice::from_raw_parts(values, count))
}

/// Reads a NUL-terminated UTF-8 string; null is `None`.
///
/// # Safety
///
/// `input` must be null or a valid NUL-terminated string.
pub unsafe fn optional_string(input: *const c_char) -> Result<Option<String>> {
    if input.is_null() {
        return Ok(None);
    }
    CStr::from_ptr(input)
        .to_str()
        .map(|value| Some(value.to_string()))
        .map_err(|_| ZiError::invalid_argument("input string is not valid UTF-8"))
}

/// # Safety
///
/// `input` must be null or a valid NUL-terminated string.
pub unsafe fn required_string(input: *const c_char) -> Result<String> {
    optional_string(input)?.ok_or_else(|| ZiError::invalid_argument("input string is null"))
}

/// Converts an owned string into a C string released by `free_string`.
pub fn into_c_string(value: String) -> Result<*const c_char> {
    CString::new(value)
        .map(|value| value.into_raw() as *const c_char)
        .map_err(|_| ZiError::invalid_argument("output string contains a NUL byte"))
}

/// # Safety
///
/// `value` must be null or come from `into_c_string`, released once.
pub unsafe fn free_string(value: *const c_char) {
    if !value.is_null() {
        drop(CString::from_raw(value as *mut c_char));
    }
}

/// Hands `items` to the caller as an array; empty yields null and zero.
///
/// # Safety
///
/// Both out-parameters must be valid for writes.
pub unsafe fn write_items<T>(items: Vec<T>, out_items: *mut *mut T, out_count: *mut usize) {
    if items.is_empty() {
        *out_items = ptr::null_mut();
        *out_count = 0;
        return;
    }
    let count = items.len();
    *out_items = Box::into_raw(items.into_boxed_slice()) as *mut T;
    *out_count = count;
}

/// # Safety
///
/// `items`/`count` must come from `write_items`, released once.
pub unsafe fn free_items<T>(items: *mut T, count: usize) -> Result<Vec<T>> {
    if items.is_null() {
        if count != 0 {
            return Err(ZiError::invalid_argument("null items with a non-zero count"));
        }
        return Ok(Vec::new());
    }
    Ok(Box::from_raw(ptr::slice_from_raw_parts_mut(items, count)).into_vec())
}

/// # Safety
///
/// `bytes`/`len` must come from a `create_transformer_save_data` call.
pub unsafe fn free_save_data(bytes: *const u8, len: usize) -> Result<()> {
    if bytes.is_null() || len == 0 {
        return Err(ZiError::invalid_argument("save data is null or empty"));
    }
    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(bytes as *mut u8, len)));
    Ok(())
}

/// Estimator and transformer tables of one family.
pub struct ZiCFamily<I, E, T> {
    estimators: Mutex<ZiCHandleRegistry<E>>,
    transformers: Mutex<ZiCHandleRegistry<T>>,
    _input: PhantomData<fn(&I)>,
}

impl<I, E, T> ZiCFamily<I, E, T>
where
    E: ZiTransformerEstimator<I, Transformer = T>,
    T: ZiTransformer + ZiLoadable,
{
    pub const fn new() -> Self {
        Self {
            estimators: Mutex::new(ZiCHandleRegistry::new()),
            transformers: Mutex::new(ZiCHandleRegistry::new()),
            _input: PhantomData,
        }
    }

    /// Creates an estimator over a private single-column annotation store
    /// and begins its training.
    pub fn create_estimator(&self, make: impl FnOnce(ZiAnnotationStoreRef) -> Result<E>) -> Result<ZiHandle> {
        let mut estimator = make(ZiAnnotationStore::new(1))?;
        estimator.begin_training()?;
        lock(&self.estimators).insert(estimator)
    }

    pub fn destroy_estimator(&self, handle: ZiHandle) -> Result<()> {
        lock(&self.estimators).remove(handle).map(drop)
    }

    pub fn with_estimator<R>(&self, handle: ZiHandle, body: impl FnOnce(&mut E) -> Result<R>) -> Result<R> {
        run_contained(&mut lock(&self.estimators), handle, body)
    }

    pub fn create_transformer_from_estimator(&self, handle: ZiHandle) -> Result<ZiHandle> {
        let transformer = self.with_estimator(handle, |estimator| estimator.create_transformer())?;
        lock(&self.transformers).insert(transformer)
    }

    pub fn create_transformer_from_saved_data(&self, bytes: &[u8]) -> Result<ZiHandle> {
        let transformer = T::from_bytes(bytes)?;
        lock(&self.transformers).insert(transformer)
    }

    pub fn destroy_transformer(&self, handle: ZiHandle) -> Result<()> {
        lock(&self.transformers).remove(handle).map(drop)
    }

    pub fn with_transformer<R>(&self, handle: ZiHandle, body: impl FnOnce(&mut T) -> Result<R>) -> Result<R> {
        run_contained(&mut lock(&self.transformers), handle, body)
    }

    pub fn save_transformer(&self, handle: ZiHandle) -> Result<Vec<u8>> {
        self.with_transformer(handle, |transformer| transformer.to_bytes())
    }
}

/// Lifecycle entry points shared by every family.
macro_rules! lifecycle_exports {
    ($prefix:literal, $family:ident, $make:expr) => {
        /// # Safety
        ///
        /// Out-parameters must be valid for writes.
        #[export_name = concat!($prefix, "_create_estimator")]
        pub unsafe extern "C" fn create_estimator(
            out_handle: *mut ZiHandle,
            out_error: *mut *mut ZiCBoundaryError,
        ) -> bool {
            boundary(concat!($prefix, "_create_estimator"), out_error, || {
                require_out(out_handle, "out_handle")?;
                *out_handle = $family.create_estimator($make)?;
                Ok(())
            })
        }

        /// # Safety
        ///
        /// `out_error` must be valid for writes.
        #[export_name = concat!($prefix, "_destroy_estimator")]
        pub unsafe extern "C" fn destroy_estimator(handle: ZiHandle, out_error: *mut *mut ZiCBoundaryError) -> bool {
            boundary(concat!($prefix, "_destroy_estimator"), out_error, || {
                $family.destroy_estimator(handle)
            })
        }

        /// # Safety
        ///
        /// Out-parameters must be valid for writes.
        #[export_name = concat!($prefix, "_get_state")]
        pub unsafe extern "C" fn get_state(
            handle: ZiHandle,
            out_state: *mut u8,
            out_error: *mut *mut ZiCBoundaryError,
        ) -> bool {
            boundary(concat!($prefix, "_get_state"), out_error, || {
                require_out(out_state, "out_state")?;
                *out_state = $family.with_estimator(handle, |estimator| Ok(estimator.state() as u8))?;
                Ok(())
            })
        }

        /// # Safety
        ///
        /// Out-parameters must be valid for writes.
        #[export_name = concat!($prefix, "_is_training_complete")]
        pub unsafe extern "C" fn is_training_complete(
            handle: ZiHandle,
            out_is_complete: *mut bool,
            out_error: *mut *mut ZiCBoundaryError,
        ) -> bool {
            boundary(concat!($prefix, "_is_training_complete"), out_error, || {
                require_out(out_is_complete, "out_is_complete")?;
                *out_is_complete =
                    $family.with_estimator(handle, |estimator| Ok(estimator.is_training_complete()))?;
                Ok(())
            })
        }

        /// # Safety
        ///
        /// `out_error` must be valid for writes.
        #[export_name = concat!($prefix, "_on_data_completed")]
        pub unsafe extern "C" fn on_data_completed(handle: ZiHandle, out_error: *mut *mut ZiCBoundaryError) -> bool {
            boundary(concat!($prefix, "_on_data_completed"), out_error, || {
                $family.with_estimator(handle, |estimator| estimator.on_data_completed())
            })
        }

        /// # Safety
        ///
        /// `out_error` must be valid for writes.
        #[export_name = concat!($prefix, "_complete_training")]
        pub unsafe extern "C" fn complete_training(handle: ZiHandle, out_error: *mut *mut ZiCBoundaryError) -> bool {
            boundary(concat!($prefix, "_complete_training"), out_error, || {
                $family.with_estimator(handle, |estimator| estimator.complete_training())
            })
        }

        /// # Safety
        ///
        /// Out-parameters must be valid for writes.
        #[export_name = concat!($prefix, "_create_transformer_from_estimator")]
        pub unsafe extern "C" fn create_transformer_from_estimator(
            handle: ZiHandle,
            out_handle: *mut ZiHandle,
            out_error: *mut *mut ZiCBoundaryError,
        ) -> bool {
            boundary(concat!($prefix, "_create_transformer_from_estimator"), out_error, || {
                require_out(out_handle, "out_handle")?;
                *out_handle = $family.create_transformer_from_estimator(handle)?;
                Ok(())
            })
        }

        /// # Safety
        ///
        /// `bytes` must be valid for `len` reads; out-parameters valid for writes.
        #[export_name = concat!($prefix, "_create_transformer_from_saved_data")]
        pub unsafe extern "C" fn create_transformer_from_saved_data(
            bytes: *const u8,
            len: usize,
            out_handle: *mut ZiHandle,
            out_error: *mut *mut ZiCBoundaryError,
        ) -> bool {
            boundary(concat!($prefix, "_create_transformer_from_saved_data"), out_error, || {
                require_out(out_handle, "out_handle")?;
                let bytes = input_slice(bytes, len)?;
                *out_handle = $family.create_transformer_from_saved_data(bytes)?;
                Ok(())
            })
        }

        /// # Safety
        ///
        /// `out_error` must be valid for writes.
        #[export_name = concat!($prefix, "_destroy_transformer")]
        pub unsafe extern "C" fn destroy_transformer(handle: ZiHandle, out_error: *mut *mut ZiCBoundaryError) -> bool {
            boundary(concat!($prefix, "_destroy_transformer"), out_error, || {
                $family.destroy_transformer(handle)
            })
        }

        /// # Safety
        ///
        /// Out-parameters must be valid for writes.
        #[export_name = concat!($prefix, "_create_transformer_save_data")]
        pub unsafe extern "C" fn create_transformer_save_data(
            handle: ZiHandle,
            out_bytes: *mut *mut u8,
            out_len: *mut usize,
            out_error: *mut *mut ZiCBoundaryError,
        ) -> bool {
            boundary(concat!($prefix, "_create_transformer_save_data"), out_error, || {
                require_out(out_bytes, "out_bytes")?;
                require_out(out_len, "out_len")?;
                let bytes = $family.save_transformer(handle)?;
                write_items(bytes, out_bytes, out_len);
                Ok(())
            })
        }

        /// # Safety
        ///
        /// `bytes`/`len` must come from `create_transformer_save_data`.
        #[export_name = concat!($prefix, "_destroy_transformer_save_data")]
        pub unsafe extern "C" fn destroy_transformer_save_data(
            bytes: *const u8,
            len: usize,
            out_error: *mut *mut ZiCBoundaryError,
        ) -> bool {
            boundary(concat!($prefix, "_destroy_transformer_save_data"), out_error, || {
                free_save_data(bytes, len)
            })
        }
    };
}

/// Fit entry points for inputs passed by value.
macro_rules! value_fit_exports {
    ($prefix:literal, $family:ident, $ty:ty) => {
        /// # Safety
        ///
        /// Out-parameters must be valid for writes.
        #[export_name = concat!($prefix, "_fit")]
        pub unsafe extern "C" fn fit(
            handle: ZiHandle,
            input: $ty,
            out_result: *mut u8,
            out_error: *mut *mut ZiCBoundaryError,
        ) -> bool {
            boundary(concat!($prefix, "_fit"), out_error, || {
                require_out(out_result, "out_result")?;
                *out_result = $family.with_estimator(handle, |estimator| estimator.fit(&input))? as u8;
                Ok(())
            })
        }

        /// # Safety
        ///
        /// `values` must be valid for `count` reads; out-parameters valid for writes.
        #[export_name = concat!($prefix, "_fit_buffer")]
        pub unsafe extern "C" fn fit_buffer(
            handle: ZiHandle,
            values: *const $ty,
            count: usize,
            out_result: *mut u8,
            out_error: *mut *mut ZiCBoundaryError,
        ) -> bool {
            boundary(concat!($prefix, "_fit_buffer"), out_error, || {
                require_out(out_result, "out_result")?;
                let values = input_slice(values, count)?;
                *out_result = $family.with_estimator(handle, |estimator| estimator.fit_batch(values))? as u8;
                Ok(())
            })
        }
    };
}

/// Fit entry points for inputs passed by pointer, converted by `$convert`.
macro_rules! pointer_fit_exports {
    ($prefix:literal, $family:ident, $ptr:ty, $convert:expr) => {
        /// # Safety
        ///
        /// `input` must be null or valid for reads; out-parameters valid for writes.
        #[export_name = concat!($prefix, "_fit")]
        pub unsafe extern "C" fn fit(
            handle: ZiHandle,
            input: $ptr,
            out_result: *mut u8,
            out_error: *mut *mut ZiCBoundaryError,
        ) -> bool {
            boundary(concat!($prefix, "_fit"), out_error, || {
                require_out(out_result, "out_result")?;
                let input = $convert(input)?;
                *out_result = $family.with_estimator(handle, |estimator| estimator.fit(&input))? as u8;
                Ok(())
            })
        }

        /// # Safety
        ///
        /// `values` must be valid for `count` reads; out-parameters valid for writes.
        #[export_name = concat!($prefix, "_fit_buffer")]
        pub unsafe extern "C" fn fit_buffer(
            handle: ZiHandle,
            values: *const $ptr,
            count: usize,
            out_result: *mut u8,
            out_error: *mut *mut ZiCBoundaryError,
        ) -> bool {
            boundary(concat!($prefix, "_fit_buffer"), out_error, || {
                require_out(out_result, "out_result")?;
                let values = input_slice(values, count)?
                    .iter()
                    .map(|value| $convert(*value))
                    .collect::<Result<Vec<_>>>()?;
                *out_result = $family.with_estimator(handle, |estimator| estimator.fit_batch(&values))? as u8;
                Ok(())
            })
        }
    };
}

/// Output of a flush whose items are plain values.
macro_rules! value_flush_exports {
    ($prefix:literal, $family:ident, $out:ty, $map:expr) => {
        /// # Safety
        ///
        /// Out-parameters must be valid for writes.
        #[export_name = concat!($prefix, "_flush")]
        pub unsafe extern "C" fn flush(
            handle: ZiHandle,
            out_items: *mut *mut $out,
            out_count: *mut usize,
            out_error: *mut *mut ZiCBoundaryError,
        ) -> bool {
            boundary(concat!($prefix, "_flush"), out_error, || {
                require_out(out_items, "out_items")?;
                require_out(out_count, "out_count")?;
                let items = $family.with_transformer(handle, |transformer| transformer.flush())?;
                let items: Vec<$out> = items.into_iter().filter_map($map).collect();
                write_items(items, out_items, out_count);
                Ok(())
            })
        }

        /// # Safety
        ///
        /// `items`/`count` must come from `flush`.
        #[export_name = concat!($prefix, "_destroy_flushed_data")]
        pub unsafe extern "C" fn destroy_flushed_data(
            items: *mut $out,
            count: usize,
            out_error: *mut *mut ZiCBoundaryError,
        ) -> bool {
            boundary(concat!($prefix, "_destroy_flushed_data"), out_error, || {
                free_items(items, count).map(drop)
            })
        }
    };
}

macro_rules! max_abs_scalar_family {
    ($($module:ident => $ty:ty, $prefix:literal;)*) => {
        $(
            pub mod $module {
                use super::*;
                use crate::featurizers::max_abs_scalar::{
                    ZiMaxAbsScalarConfig, ZiMaxAbsScalarEstimator, ZiMaxAbsScalarTransformer,
                };
                use crate::scalar::ZiMaxAbsInput;

                type Output = <$ty as ZiMaxAbsInput>::Output;

                static FAMILY: ZiCFamily<$ty, ZiMaxAbsScalarEstimator<$ty>, ZiMaxAbsScalarTransformer<$ty>> =
                    ZiCFamily::new();

                lifecycle_exports!($prefix, FAMILY, |store| {
                    ZiMaxAbsScalarEstimator::<$ty>::new(store, 0, &ZiMaxAbsScalarConfig::default())
                });
                value_fit_exports!($prefix, FAMILY, $ty);
                value_flush_exports!($prefix, FAMILY, Output, Some);

                /// # Safety
                ///
                /// Out-parameters must be valid for writes.
                #[export_name = concat!($prefix, "_transform")]
                pub unsafe extern "C" fn transform(
                    handle: ZiHandle,
                    input: $ty,
                    out_output: *mut Output,
                    out_error: *mut *mut ZiCBoundaryError,
                ) -> bool {
                    boundary(concat!($prefix, "_transform"), out_error, || {
                        require_out(out_output, "out_output")?;
                        *out_output = FAMILY.with_transformer(handle, |transformer| transformer.execute(&input))?;
                        Ok(())
                    })
                }
            }
        )*
    };
}

/// Reads an optional numeric input; null is missing.
///
/// # Safety
///
/// `input` must be null or valid for reads.
pub unsafe fn optional_value<T: Copy>(input: *const T) -> Result<Option<T>> {
    Ok(input.as_ref().copied())
}

macro_rules! forward_fill_numeric_family {
    ($($module:ident => $ty:ty, $prefix:literal;)*) => {
        $(
            pub mod $module {
                use super::*;
                use crate::featurizers::forward_fill::{
                    ZiForwardFillImputerEstimator, ZiForwardFillImputerTransformer,
                };

                static FAMILY: ZiCFamily<
                    Option<$ty>,
                    ZiForwardFillImputerEstimator<Option<$ty>>,
                    ZiForwardFillImputerTransformer<Option<$ty>>,
                > = ZiCFamily::new();

                lifecycle_exports!($prefix, FAMILY, |store| {
                    ZiForwardFillImputerEstimator::<Option<$ty>>::new(store, 0)
                });
                pointer_fit_exports!($prefix, FAMILY, *const $ty, |input| optional_value(input));
                value_flush_exports!($prefix, FAMILY, $ty, |item| item);

                /// `out_has_value` is false when no value has been seen yet;
                /// `out_output` is left untouched in that case.
                ///
                /// # Safety
                ///
                /// `input` must be null or valid for reads; out-parameters valid for writes.
                #[export_name = concat!($prefix, "_transform")]
                pub unsafe extern "C" fn transform(
                    handle: ZiHandle,
                    input: *const $ty,
                    out_output: *mut $ty,
                    out_has_value: *mut bool,
                    out_error: *mut *mut ZiCBoundaryError,
                ) -> bool {
                    boundary(concat!($prefix, "_transform"), out_error, || {
                        require_out(out_output, "out_output")?;
                        require_out(out_has_value, "out_has_value")?;
                        let input = optional_value(input)?;
                        let output = FAMILY.with_transformer(handle, |transformer| transformer.execute(&input))?;
                        *out_has_value = output.is_some();
                        if let Some(value) = output {
                            *out_output = value;
                        }
                        Ok(())
                    })
                }
            }
        )*
    };
}

max_abs_scalar_family! {
    max_abs_scalar_int8 => i8, "zift_max_abs_scalar_int8";
    max_abs_scalar_int16 => i16, "zift_max_abs_scalar_int16";
    max_abs_scalar_int32 => i32, "zift_max_abs_scalar_int32";
    max_abs_scalar_int64 => i64, "zift_max_abs_scalar_int64";
    max_abs_scalar_uint8 => u8, "zift_max_abs_scalar_uint8";
    max_abs_scalar_uint16 => u16, "zift_max_abs_scalar_uint16";
    max_abs_scalar_uint32 => u32, "zift_max_abs_scalar_uint32";
    max_abs_scalar_uint64 => u64, "zift_max_abs_scalar_uint64";
    max_abs_scalar_float => f32, "zift_max_abs_scalar_float";
    max_abs_scalar_double => f64, "zift_max_abs_scalar_double";
}

forward_fill_numeric_family! {
    forward_fill_imputer_int8 => i8, "zift_forward_fill_imputer_int8";
    forward_fill_imputer_int16 => i16, "zift_forward_fill_imputer_int16";
    forward_fill_imputer_int32 => i32, "zift_forward_fill_imputer_int32";
    forward_fill_imputer_int64 => i64, "zift_forward_fill_imputer_int64";
    forward_fill_imputer_uint8 => u8, "zift_forward_fill_imputer_uint8";
    forward_fill_imputer_uint16 => u16, "zift_forward_fill_imputer_uint16";
    forward_fill_imputer_uint32 => u32, "zift_forward_fill_imputer_uint32";
    forward_fill_imputer_uint64 => u64, "zift_forward_fill_imputer_uint64";
    forward_fill_imputer_float => f32, "zift_forward_fill_imputer_float";
    forward_fill_imputer_double => f64, "zift_forward_fill_imputer_double";
}

pub mod forward_fill_imputer_string {
    use super::*;
    use crate::featurizers::forward_fill::{ZiForwardFillImputerEstimator, ZiForwardFillImputerTransformer};

    static FAMILY: ZiCFamily<
        Option<String>,
        ZiForwardFillImputerEstimator<Option<String>>,
        ZiForwardFillImputerTransformer<Option<String>>,
    > = ZiCFamily::new();

    lifecycle_exports!("zift_forward_fill_imputer_string", FAMILY, |store| {
        ZiForwardFillImputerEstimator::<Option<String>>::new(store, 0)
    });
    pointer_fit_exports!("zift_forward_fill_imputer_string", FAMILY, *const c_char, |input| {
        optional_string(input)
    });

    /// Writes null to `out_output` while no value has been seen yet. A
    /// non-null output is released with `destroy_transformed_data`.
    ///
    /// # Safety
    ///
    /// `input` must be null or a valid string; out-parameters valid for writes.
    #[export_name = "zift_forward_fill_imputer_string_transform"]
    pub unsafe extern "C" fn transform(
        handle: ZiHandle,
        input: *const c_char,
        out_output: *mut *const c_char,
        out_error: *mut *mut ZiCBoundaryError,
    ) -> bool {
        boundary("zift_forward_fill_imputer_string_transform", out_error, || {
            require_out(out_output, "out_output")?;
            let input = optional_string(input)?;
            let output = FAMILY.with_transformer(handle, |transformer| transformer.execute(&input))?;
            *out_output = match output {
                Some(value) => into_c_string(value)?,
                None => ptr::null(),
            };
            Ok(())
        })
    }

    /// # Safety
    ///
    /// `output` must be null or come from `transform`, released once.
    #[export_name = "zift_forward_fill_imputer_string_destroy_transformed_data"]
    pub unsafe extern "C" fn destroy_transformed_data(
        output: *const c_char,
        out_error: *mut *mut ZiCBoundaryError,
    ) -> bool {
        boundary("zift_forward_fill_imputer_string_destroy_transformed_data", out_error, || {
            free_string(output);
            Ok(())
        })
    }

    /// Items are strings, null where missing; release them with
    /// `destroy_flushed_data`.
    ///
    /// # Safety
    ///
    /// Out-parameters must be valid for writes.
    #[export_name = "zift_forward_fill_imputer_string_flush"]
    pub unsafe extern "C" fn flush(
        handle: ZiHandle,
        out_items: *mut *mut *const c_char,
        out_count: *mut usize,
        out_error: *mut *mut ZiCBoundaryError,
    ) -> bool {
        boundary("zift_forward_fill_imputer_string_flush", out_error, || {
            require_out(out_items, "out_items")?;
            require_out(out_count, "out_count")?;
            let items = FAMILY.with_transformer(handle, |transformer| transformer.flush())?;
            let mut strings = Vec::with_capacity(items.len());
            for item in items {
                match item.map(into_c_string).transpose() {
                    Ok(value) => strings.push(value.unwrap_or(ptr::null())),
                    Err(err) => {
                        strings.into_iter().for_each(|value| free_string(value));
                        return Err(err);
                    }
                }
            }
            write_items(strings, out_items, out_count);
            Ok(())
        })
    }

    /// # Safety
    ///
    /// `items`/`count` must come from `flush`.
    #[export_name = "zift_forward_fill_imputer_string_destroy_flushed_data"]
    pub unsafe extern "C" fn destroy_flushed_data(
        items: *mut *const c_char,
        count: usize,
        out_error: *mut *mut ZiCBoundaryError,
    ) -> bool {
        boundary("zift_forward_fill_imputer_string_destroy_flushed_data", out_error, || {
            for value in free_items(items, count)? {
                free_string(value);
            }
            Ok(())
        })
    }
}

pub mod label_encoder_string {
    use super::*;
    use crate::featurizers::label_encoder::{
        ZiLabelEncoderConfig, ZiLabelEncoderEstimator, ZiLabelEncoderTransformer,
    };

    static FAMILY: ZiCFamily<String, ZiLabelEncoderEstimator<String>, ZiLabelEncoderTransformer<String>> =
        ZiCFamily::new();

    lifecycle_exports!("zift_label_encoder_string", FAMILY, |store| {
        ZiLabelEncoderEstimator::<String>::new(store, 0, &ZiLabelEncoderConfig::default())
    });
    pointer_fit_exports!("zift_label_encoder_string", FAMILY, *const c_char, |input| {
        required_string(input)
    });
    value_flush_exports!("zift_label_encoder_string", FAMILY, u32, Some);

    /// # Safety
    ///
    /// `input` must be a valid string; out-parameters valid for writes.
    #[export_name = "zift_label_encoder_string_transform"]
    pub unsafe extern "C" fn transform(
        handle: ZiHandle,
        input: *const c_char,
        out_output: *mut u32,
        out_error: *mut *mut ZiCBoundaryError,
    ) -> bool {
        boundary("zift_label_encoder_string_transform", out_error, || {
            require_out(out_output, "out_output")?;
            let input = required_string(input)?;
            *out_output = FAMILY.with_transformer(handle, |transformer| transformer.execute(&input))?;
            Ok(())
        })
    }
}
