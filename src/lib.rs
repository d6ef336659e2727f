#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod builder;
pub mod config;
pub mod manifest;
pub mod models;
pub mod packaging;
pub mod service;
pub mod size_index;
pub mod validation;

pub use builder::{PackageBuilder, PackageRequest, PackageResult, PackageSummary};
pub use config::PackagerConfig;
pub use models::{AssetMetadata, GeneratedAsset, ImageCategory, ImageResource, WebManifest};
pub use size_index::{SizeIndex, build_size_index};
pub use validation::{ValidationReport, validate_manifest};
