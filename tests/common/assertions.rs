//! Custom assertion macros and utilities
//!
//! Provides assertion macros for probe states and failures with more
//! descriptive error messages.

/// Assert that a result is ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        assert!(
            $haystack.contains($needle),
            "Expected '{}' to contain '{}'",
            $haystack,
            $needle
        );
    };
}

/// Assert that a probe state recorded a failure of `kind` for `step` and
/// return the failure
#[macro_export]
macro_rules! assert_step_failed {
    ($state:expr, $step:expr, $kind:expr) => {
        match $state.error($step) {
            Some(failure) => {
                assert_eq!(
                    failure.kind(),
                    $kind,
                    "step {:?} failed with {:?}, expected {:?}",
                    $step,
                    failure,
                    $kind
                );
                failure
            }
            None => panic!(
                "Expected step {:?} to fail with {:?}, errors: {:?}",
                $step, $kind, $state.errors
            ),
        }
    };
}
