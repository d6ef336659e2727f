//! Request-level entry points that wrap validation and service worker inspection in a
//! status-coded response envelope.
//!
//! Fetching manifests and driving a browser are left to collaborator traits; this module only
//! decides how their outcomes map onto responses.

mod response;
mod site;
mod worker;

pub use response::{ResponseBody, ServiceResponse};
pub use site::{FileManifestFetcher, ManifestFetcher, validate_site};
pub use worker::{
  InspectionError, ProbeStage, ServiceWorkerProbe, ServiceWorkerReport, inspect_service_worker,
  service_worker_response,
};
