use serde::Serialize;

/// Outcome of validating a manifest, grouped by how strongly each member is expected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
  /// Members every installable manifest must carry.
  pub required: RequiredChecks,
  /// Members stores and browsers recommend.
  pub recommended: RecommendedChecks,
  /// Reserved for future checks; always serializes as `{}`.
  pub optional: OptionalChecks,
}

/// Results for the required manifest members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequiredChecks {
  /// `short_name` is a non-empty string.
  pub short_name: bool,
  /// `name` is a non-empty string.
  pub name: bool,
  /// `display` names a known display mode.
  pub display: bool,
  /// `start_url` is a non-empty string.
  pub start_url: bool,
  /// At least one icon carries a usable `src` and `sizes`.
  pub icons: bool,
}

/// Results for the recommended manifest members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecommendedChecks {
  /// `screenshots` is a non-empty list.
  pub screenshots: bool,
  /// `description` is a non-empty string.
  pub description: bool,
  /// `categories` is a non-empty list of strings.
  pub categories: bool,
  /// The IARC rating identifier, when declared.
  pub iarc_rating: Option<String>,
  /// `related_applications` is a non-empty list.
  pub related_applications: bool,
  /// `prefer_related_applications` is declared as a boolean.
  pub prefer_related_applications: bool,
  /// `background_color` is a valid CSS color.
  pub background_color: bool,
  /// `theme_color` is a valid CSS color.
  pub theme_color: bool,
  /// `orientation` names a known orientation.
  pub orientation: bool,
}

/// Placeholder group for optional members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionalChecks {}
