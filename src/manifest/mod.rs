//! Reading manifests and asset listings from disk.

mod load;

pub use load::{load_asset_listing, load_manifest, load_web_manifest};
