//! Helpers for turning generated asset names into archive paths.
//!
//! Name filtering and path construction live in separate submodules so each can be tested
//! on its own. Both are used by the packager before any bytes are fetched.

mod bundle;
mod filters;

pub use bundle::make_archive_path;
pub use filters::is_unsafe_asset_name;
