//! Helpers for turning `syn` syntax into model types.

pub mod attributes;
pub mod paths;

#[doc(inline)]
pub use attributes::{access_level, derives, has_cfg_test, markers};
#[doc(inline)]
pub use paths::{crate_ident, module_path_of, path_segments};
