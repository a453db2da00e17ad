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

//! # Zift Boundary Tests - C Entry Points
//!
//! Drives the `extern "C"` families the way a foreign caller would: raw
//! out-parameters, handle lifetimes, error objects and saved buffers.
//!
//! ## Test Categories
//!
//! - **Lifecycle**: create, fit, complete, transform, destroy
//! - **Persistence**: save data round trip through the boundary
//! - **Errors**: stale handles, null pointers, corrupt buffers
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test ffi
//! ```

use std::ffi::{CStr, CString};
use std::ptr;

use libc::c_char;
use zift::featurizers::max_abs_scalar::{
    ZiMaxAbsScalarConfig, ZiMaxAbsScalarEstimator, ZiMaxAbsScalarTransformer,
};
use zift::ffi::{
    forward_fill_imputer_double, forward_fill_imputer_string, label_encoder_string, max_abs_scalar_int8,
    zift_destroy_error, zift_error_kind, zift_error_message, ZiCBoundaryError, ZiCFamily, ZiHandle,
};
use zift::{ZiError, ZiErrorKind, ZiEstimator, ZiFitResult, ZiTrainingState};

/// Takes ownership of a reported error and returns its kind and message.
fn take_error(error: *mut ZiCBoundaryError) -> (u8, String) {
    assert!(!error.is_null(), "expected an error object");
    unsafe {
        let kind = zift_error_kind(error);
        let message = CStr::from_ptr(zift_error_message(error)).to_string_lossy().into_owned();
        zift_destroy_error(error);
        (kind, message)
    }
}

fn ok(succeeded: bool, error: *mut ZiCBoundaryError) {
    if !succeeded {
        let (kind, message) = take_error(error);
        panic!("boundary call failed with kind {kind}: {message}");
    }
    assert!(error.is_null());
}

fn c_strings(items: &[&str]) -> Vec<CString> {
    items.iter().map(|item| CString::new(*item).unwrap()).collect()
}

fn train_label_encoder(items: &[&str]) -> ZiHandle {
    let mut error: *mut ZiCBoundaryError = ptr::null_mut();
    let mut estimator: ZiHandle = 0;
    let mut result = 0u8;
    let strings = c_strings(items);
    let pointers: Vec<*const c_char> = strings.iter().map(|item| item.as_ptr()).collect();

    unsafe {
        ok(label_encoder_string::create_estimator(&mut estimator, &mut error), error);
        ok(label_encoder_string::fit(estimator, pointers[0], &mut result, &mut error), error);
        assert_eq!(result, ZiFitResult::Continue as u8);
        ok(
            label_encoder_string::fit_buffer(estimator, pointers[1..].as_ptr(), pointers.len() - 1, &mut result, &mut error),
            error,
        );
        ok(label_encoder_string::on_data_completed(estimator, &mut error), error);

        let mut complete = false;
        ok(label_encoder_string::is_training_complete(estimator, &mut complete, &mut error), error);
        assert!(complete);
        ok(label_encoder_string::complete_training(estimator, &mut error), error);

        let mut state = 0u8;
        ok(label_encoder_string::get_state(estimator, &mut state, &mut error), error);
        assert_eq!(state, ZiTrainingState::Finished as u8);
    }
    estimator
}

fn encode(transformer: ZiHandle, value: &str) -> Result<u32, (u8, String)> {
    let mut error: *mut ZiCBoundaryError = ptr::null_mut();
    let mut output = 0u32;
    let input = CString::new(value).unwrap();
    let succeeded = unsafe { label_encoder_string::transform(transformer, input.as_ptr(), &mut output, &mut error) };
    if succeeded {
        Ok(output)
    } else {
        Err(take_error(error))
    }
}

/// Tests the full label encoder lifecycle through the boundary.
///
/// Verifies training, inference, save data, reload and teardown, and that
/// an unseen label is reported as `NotFound`.
#[test]
fn test_label_encoder_lifecycle() {
    let estimator = train_label_encoder(&["orange", "apple", "orange", "grape", "carrot", "peach", "banana"]);
    let mut error: *mut ZiCBoundaryError = ptr::null_mut();

    unsafe {
        let mut transformer: ZiHandle = 0;
        ok(
            label_encoder_string::create_transformer_from_estimator(estimator, &mut transformer, &mut error),
            error,
        );
        assert_eq!(encode(transformer, "banana"), Ok(1));
        assert_eq!(encode(transformer, "grape"), Ok(3));

        let (kind, message) = encode(transformer, "hello").unwrap_err();
        assert_eq!(kind, ZiErrorKind::NotFound as u8);
        assert!(message.contains("'input' was not found"));

        let mut bytes: *mut u8 = ptr::null_mut();
        let mut len = 0usize;
        ok(
            label_encoder_string::create_transformer_save_data(transformer, &mut bytes, &mut len, &mut error),
            error,
        );
        assert!(len > 4);

        let mut reloaded: ZiHandle = 0;
        ok(
            label_encoder_string::create_transformer_from_saved_data(bytes, len, &mut reloaded, &mut error),
            error,
        );
        ok(label_encoder_string::destroy_transformer_save_data(bytes, len, &mut error), error);
        assert_eq!(encode(reloaded, "peach"), Ok(5));

        let mut items: *mut u32 = ptr::null_mut();
        let mut count = 1usize;
        ok(label_encoder_string::flush(reloaded, &mut items, &mut count, &mut error), error);
        assert!(items.is_null());
        assert_eq!(count, 0);
        ok(label_encoder_string::destroy_flushed_data(items, count, &mut error), error);

        ok(label_encoder_string::destroy_transformer(reloaded, &mut error), error);
        ok(label_encoder_string::destroy_transformer(transformer, &mut error), error);
        ok(label_encoder_string::destroy_estimator(estimator, &mut error), error);
    }
}

/// Tests that destroyed handles are refused.
#[test]
fn test_stale_handles() {
    let estimator = train_label_encoder(&["a", "b"]);
    let mut error: *mut ZiCBoundaryError = ptr::null_mut();

    unsafe {
        ok(label_encoder_string::destroy_estimator(estimator, &mut error), error);

        let mut state = 0u8;
        assert!(!label_encoder_string::get_state(estimator, &mut state, &mut error));
        assert_eq!(take_error(error).0, ZiErrorKind::InvalidArgument as u8);

        error = ptr::null_mut();
        assert!(!label_encoder_string::destroy_estimator(estimator, &mut error));
        assert_eq!(take_error(error).0, ZiErrorKind::InvalidArgument as u8);
    }
}

#[test]
fn test_null_pointers() {
    let mut error: *mut ZiCBoundaryError = ptr::null_mut();
    unsafe {
        // Without an error slot the call can only report failure.
        let mut handle: ZiHandle = 0;
        assert!(!label_encoder_string::create_estimator(&mut handle, ptr::null_mut()));

        assert!(!label_encoder_string::create_estimator(ptr::null_mut(), &mut error));
        assert_eq!(take_error(error).0, ZiErrorKind::InvalidArgument as u8);

        ok(label_encoder_string::create_estimator(&mut handle, &mut error), error);
        let mut result = 0u8;
        error = ptr::null_mut();
        assert!(!label_encoder_string::fit(handle, ptr::null(), &mut result, &mut error));
        assert_eq!(take_error(error).0, ZiErrorKind::InvalidArgument as u8);

        error = ptr::null_mut();
        assert!(!label_encoder_string::fit_buffer(handle, ptr::null(), 0, &mut result, &mut error));
        assert_eq!(take_error(error).0, ZiErrorKind::InvalidArgument as u8);

        error = ptr::null_mut();
        ok(label_encoder_string::destroy_estimator(handle, &mut error), error);
    }
}

/// Tests that a transformer cannot be created before training finished.
#[test]
fn test_transformer_requires_finished_training() {
    let mut error: *mut ZiCBoundaryError = ptr::null_mut();
    unsafe {
        let mut estimator: ZiHandle = 0;
        ok(max_abs_scalar_int8::create_estimator(&mut estimator, &mut error), error);

        let mut transformer: ZiHandle = 0;
        assert!(!max_abs_scalar_int8::create_transformer_from_estimator(estimator, &mut transformer, &mut error));
        assert_eq!(take_error(error).0, ZiErrorKind::InvalidState as u8);

        error = ptr::null_mut();
        ok(max_abs_scalar_int8::destroy_estimator(estimator, &mut error), error);
    }
}

#[test]
fn test_max_abs_scalar_int8() {
    let mut error: *mut ZiCBoundaryError = ptr::null_mut();
    unsafe {
        let mut estimator: ZiHandle = 0;
        let mut result = 0u8;
        ok(max_abs_scalar_int8::create_estimator(&mut estimator, &mut error), error);
        let values: [i8; 5] = [-4, 3, 0, 2, -1];
        ok(
            max_abs_scalar_int8::fit_buffer(estimator, values.as_ptr(), values.len(), &mut result, &mut error),
            error,
        );
        ok(max_abs_scalar_int8::on_data_completed(estimator, &mut error), error);
        ok(max_abs_scalar_int8::complete_training(estimator, &mut error), error);

        let mut transformer: ZiHandle = 0;
        ok(
            max_abs_scalar_int8::create_transformer_from_estimator(estimator, &mut transformer, &mut error),
            error,
        );
        let mut outputs = Vec::new();
        for value in values {
            let mut output = 0.0f32;
            ok(max_abs_scalar_int8::transform(transformer, value, &mut output, &mut error), error);
            outputs.push(output);
        }
        assert_eq!(outputs, vec![-1.0, 0.75, 0.0, 0.5, -0.25]);

        ok(max_abs_scalar_int8::destroy_transformer(transformer, &mut error), error);
        ok(max_abs_scalar_int8::destroy_estimator(estimator, &mut error), error);
    }
}

/// Tests forward filling of nullable doubles through pointer inputs.
#[test]
fn test_forward_fill_double() {
    let mut error: *mut ZiCBoundaryError = ptr::null_mut();
    unsafe {
        let mut estimator: ZiHandle = 0;
        let mut result = 0u8;
        ok(forward_fill_imputer_double::create_estimator(&mut estimator, &mut error), error);
        ok(forward_fill_imputer_double::fit(estimator, ptr::null(), &mut result, &mut error), error);
        assert_eq!(result, ZiFitResult::Complete as u8);
        ok(forward_fill_imputer_double::complete_training(estimator, &mut error), error);

        let mut transformer: ZiHandle = 0;
        ok(
            forward_fill_imputer_double::create_transformer_from_estimator(estimator, &mut transformer, &mut error),
            error,
        );

        let mut output = -1.0f64;
        let mut has_value = true;
        ok(
            forward_fill_imputer_double::transform(transformer, ptr::null(), &mut output, &mut has_value, &mut error),
            error,
        );
        assert!(!has_value);
        assert_eq!(output, -1.0);

        let value = 2.5f64;
        ok(
            forward_fill_imputer_double::transform(transformer, &value, &mut output, &mut has_value, &mut error),
            error,
        );
        assert!(has_value);
        ok(
            forward_fill_imputer_double::transform(transformer, ptr::null(), &mut output, &mut has_value, &mut error),
            error,
        );
        assert!(has_value);
        assert_eq!(output, 2.5);

        ok(forward_fill_imputer_double::destroy_transformer(transformer, &mut error), error);
        ok(forward_fill_imputer_double::destroy_estimator(estimator, &mut error), error);
    }
}

/// Tests string outputs and their release.
#[test]
fn test_forward_fill_string() {
    let mut error: *mut ZiCBoundaryError = ptr::null_mut();
    let first = CString::new("first").unwrap();
    unsafe {
        let mut estimator: ZiHandle = 0;
        let mut result = 0u8;
        ok(forward_fill_imputer_string::create_estimator(&mut estimator, &mut error), error);
        ok(forward_fill_imputer_string::fit(estimator, first.as_ptr(), &mut result, &mut error), error);
        ok(forward_fill_imputer_string::complete_training(estimator, &mut error), error);

        let mut transformer: ZiHandle = 0;
        ok(
            forward_fill_imputer_string::create_transformer_from_estimator(estimator, &mut transformer, &mut error),
            error,
        );

        let mut output: *const c_char = ptr::null();
        ok(forward_fill_imputer_string::transform(transformer, ptr::null(), &mut output, &mut error), error);
        assert!(output.is_null());

        ok(forward_fill_imputer_string::transform(transformer, first.as_ptr(), &mut output, &mut error), error);
        ok(forward_fill_imputer_string::destroy_transformed_data(output, &mut error), error);
        ok(forward_fill_imputer_string::transform(transformer, ptr::null(), &mut output, &mut error), error);
        assert_eq!(CStr::from_ptr(output).to_str().unwrap(), "first");
        ok(forward_fill_imputer_string::destroy_transformed_data(output, &mut error), error);

        let mut items: *mut *const c_char = ptr::null_mut();
        let mut count = 0usize;
        ok(forward_fill_imputer_string::flush(transformer, &mut items, &mut count, &mut error), error);
        assert_eq!(count, 0);
        ok(forward_fill_imputer_string::destroy_flushed_data(items, count, &mut error), error);

        ok(forward_fill_imputer_string::destroy_transformer(transformer, &mut error), error);
        ok(forward_fill_imputer_string::destroy_estimator(estimator, &mut error), error);
    }
}

/// Tests that malformed save data is reported with the matching kind.
#[test]
fn test_corrupt_saved_data() {
    let mut error: *mut ZiCBoundaryError = ptr::null_mut();
    let mut handle: ZiHandle = 0;
    unsafe {
        let truncated = [1u8, 0, 0, 0, 9];
        assert!(!max_abs_scalar_int8::create_transformer_from_saved_data(
            truncated.as_ptr(),
            truncated.len(),
            &mut handle,
            &mut error
        ));
        assert_eq!(take_error(error).0, ZiErrorKind::CorruptArchive as u8);

        error = ptr::null_mut();
        let future = [2u8, 0, 0, 0, 0, 0, 128, 64];
        assert!(!max_abs_scalar_int8::create_transformer_from_saved_data(
            future.as_ptr(),
            future.len(),
            &mut handle,
            &mut error
        ));
        let (kind, message) = take_error(error);
        assert_eq!(kind, ZiErrorKind::VersionMismatch as u8);
        assert!(message.contains("Unsupported archive version"));

        error = ptr::null_mut();
        assert!(!max_abs_scalar_int8::create_transformer_from_saved_data(
            ptr::null(),
            0,
            &mut handle,
            &mut error
        ));
        assert_eq!(take_error(error).0, ZiErrorKind::InvalidArgument as u8);
    }
}

/// Tests that a panic inside one call retires only the handle it touched.
#[test]
fn test_panic_retires_only_its_handle() {
    let family: ZiCFamily<i32, ZiMaxAbsScalarEstimator<i32>, ZiMaxAbsScalarTransformer<i32>> = ZiCFamily::new();
    let make = |store| ZiMaxAbsScalarEstimator::<i32>::new(store, 0, &ZiMaxAbsScalarConfig::default());
    let broken = family.create_estimator(make).unwrap();
    let healthy = family.create_estimator(make).unwrap();

    let outcome: zift::Result<()> = family.with_estimator(broken, |_| panic!("estimator blew up"));
    let err = outcome.unwrap_err();
    assert_eq!(err.kind(), ZiErrorKind::Internal);
    assert!(err.to_string().contains("estimator blew up"));

    // The same family still serves other handles.
    let result = family.with_estimator(healthy, |estimator| estimator.fit(&-4)).unwrap();
    assert_eq!(result, ZiFitResult::Continue);
    family.with_estimator(healthy, |estimator| estimator.complete_training()).unwrap();
    let transformer = family.create_transformer_from_estimator(healthy).unwrap();
    let output = family.with_transformer(transformer, |transformer| {
        zift::ZiTransformer::execute(transformer, &2)
    });
    assert_eq!(output.unwrap(), 0.5);

    // The retired handle is gone and new handles can still be issued.
    assert!(matches!(
        family.with_estimator(broken, |estimator| estimator.fit(&1)),
        Err(ZiError::InvalidArgument { .. })
    ));
    assert!(family.create_estimator(make).is_ok());
}
