//! Manifest validation against the required and recommended Web App Manifest members.
//!
//! Validation runs on the raw JSON document rather than [`crate::models::WebManifest`] so
//! that mistyped members are reported as failed checks instead of parse errors.

mod checks;
mod report;

use serde_json::Value;

pub use checks::{is_css_color, is_size_descriptor};
pub use report::{OptionalChecks, RecommendedChecks, RequiredChecks, ValidationReport};

/// Evaluate every manifest check and assemble the report.
///
/// Never fails: absent or malformed members simply produce falsy results.
pub fn validate_manifest(manifest: &Value) -> ValidationReport {
  ValidationReport {
    required: RequiredChecks {
      short_name: checks::check_short_name(manifest),
      name: checks::check_name(manifest),
      display: checks::check_display(manifest),
      start_url: checks::check_start_url(manifest),
      icons: checks::check_icons(manifest),
    },
    recommended: RecommendedChecks {
      screenshots: checks::check_screenshots(manifest),
      description: checks::check_description(manifest),
      categories: checks::check_categories(manifest),
      iarc_rating: checks::extract_rating(manifest),
      related_applications: checks::check_related_apps(manifest),
      prefer_related_applications: checks::check_related_pref(manifest),
      background_color: checks::check_background_color(manifest),
      theme_color: checks::check_theme_color(manifest),
      orientation: checks::check_orientation(manifest),
    },
    optional: OptionalChecks {},
  }
}
