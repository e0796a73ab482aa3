//! Error handling foundation for the cofounder platform.
//!
//! This module provides only the `Result` type alias using rootcause.
//! Each crate defines its own domain-specific error types in their own
//! modules; collaborator seams return `Report<E>` so adapters can attach
//! layer-appropriate context as errors propagate.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Unavailable;

    impl fmt::Display for Unavailable {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "backend unavailable")
        }
    }

    impl std::error::Error for Unavailable {}

    fn fails() -> Result<u32, Unavailable> {
        Err(Unavailable.into())
    }

    #[test]
    fn result_type_works() {
        let ok: Result<i32> = Ok(42);
        assert_eq!(ok.expect("should be ok"), 42);
    }

    #[test]
    fn report_displays_context() {
        let err = fails().unwrap_err();
        assert!(err.to_string().contains("backend unavailable"));
    }
}
