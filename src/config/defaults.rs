//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn name() -> String {
        "main".into()
    }

    pub fn language() -> String {
        crate::render::page::DEFAULT_LANGUAGE.into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn content() -> PathBuf {
        "content".into()
    }

    pub fn output() -> PathBuf {
        "public".into()
    }

    pub fn assets() -> PathBuf {
        "assets".into()
    }

    pub fn context() -> Option<PathBuf> {
        None
    }

    pub mod markers {
        pub fn start() -> String {
            crate::preprocess::DEFAULT_START.into()
        }

        pub fn end() -> String {
            crate::preprocess::DEFAULT_END.into()
        }
    }
}
