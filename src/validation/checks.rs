//! Individual manifest member checks.
//!
//! Every check takes the raw manifest document and degrades to `false` (or `None`) for
//! missing or mistyped members.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

const DISPLAY_MODES: &[&str] = &["fullscreen", "standalone", "minimal-ui", "browser"];

const ORIENTATIONS: &[&str] = &[
  "any",
  "natural",
  "landscape",
  "landscape-primary",
  "landscape-secondary",
  "portrait",
  "portrait-primary",
  "portrait-secondary",
];

const NAMED_COLORS: &[&str] = &[
  "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
  "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
  "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue", "darkcyan",
  "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki", "darkmagenta",
  "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon", "darkseagreen",
  "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise", "darkviolet", "deeppink",
  "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick", "floralwhite", "forestgreen",
  "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod", "gray", "green", "greenyellow",
  "grey", "honeydew", "hotpink", "indianred", "indigo", "ivory", "khaki", "lavender",
  "lavenderblush", "lawngreen", "lemonchiffon", "lightblue", "lightcoral", "lightcyan",
  "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey", "lightpink", "lightsalmon",
  "lightseagreen", "lightskyblue", "lightslategray", "lightslategrey", "lightsteelblue",
  "lightyellow", "lime", "limegreen", "linen", "magenta", "maroon", "mediumaquamarine",
  "mediumblue", "mediumorchid", "mediumpurple", "mediumseagreen", "mediumslateblue",
  "mediumspringgreen", "mediumturquoise", "mediumvioletred", "midnightblue", "mintcream",
  "mistyrose", "moccasin", "navajowhite", "navy", "oldlace", "olive", "olivedrab", "orange",
  "orangered", "orchid", "palegoldenrod", "palegreen", "paleturquoise", "palevioletred",
  "papayawhip", "peachpuff", "peru", "pink", "plum", "powderblue", "purple", "rebeccapurple",
  "red", "rosybrown", "royalblue", "saddlebrown", "salmon", "sandybrown", "seagreen", "seashell",
  "sienna", "silver", "skyblue", "slateblue", "slategray", "slategrey", "snow", "springgreen",
  "steelblue", "tan", "teal", "thistle", "tomato", "transparent", "turquoise", "violet", "wheat",
  "white", "whitesmoke", "yellow", "yellowgreen",
];

fn color_patterns() -> &'static [Regex] {
  static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
  PATTERNS
    .get_or_init(|| {
      vec![
        Regex::new(r"^#(?:[0-9a-fA-F]{3,4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
          .expect("invalid hex color regex"),
        Regex::new(concat!(
          r"(?i)^(?:rgba?|hsla?)\(\s*",
          r"(?:[-+]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:%|deg|grad|rad|turn)?|none)",
          r"(?:\s*[,/\s]\s*(?:[-+]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:%|deg|grad|rad|turn)?|none)){2,3}",
          r"\s*\)$"
        ))
        .expect("invalid functional color regex"),
      ]
    })
    .as_slice()
}

fn size_token_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"(?i)^[1-9][0-9]*x[1-9][0-9]*$").expect("invalid size regex"))
}

fn non_empty_str<'a>(manifest: &'a Value, key: &str) -> Option<&'a str> {
  manifest
    .get(key)
    .and_then(Value::as_str)
    .map(str::trim)
    .filter(|value| !value.is_empty())
}

fn non_empty_array<'a>(manifest: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
  manifest
    .get(key)
    .and_then(Value::as_array)
    .filter(|items| !items.is_empty())
}

/// Returns `true` for a size descriptor such as `192x192`, `48x48 96x96` or `any`.
pub fn is_size_descriptor(value: &str) -> bool {
  let mut tokens = value.split_whitespace().peekable();
  if tokens.peek().is_none() {
    return false;
  }
  tokens.all(|token| token.eq_ignore_ascii_case("any") || size_token_pattern().is_match(token))
}

/// Returns `true` for hex, functional or named CSS colors.
pub fn is_css_color(value: &str) -> bool {
  let value = value.trim();
  if value.is_empty() {
    return false;
  }
  let lowered = value.to_ascii_lowercase();
  NAMED_COLORS.contains(&lowered.as_str())
    || color_patterns().iter().any(|pattern| pattern.is_match(value))
}

pub fn check_short_name(manifest: &Value) -> bool {
  non_empty_str(manifest, "short_name").is_some()
}

pub fn check_name(manifest: &Value) -> bool {
  non_empty_str(manifest, "name").is_some()
}

pub fn check_display(manifest: &Value) -> bool {
  non_empty_str(manifest, "display").is_some_and(|mode| DISPLAY_MODES.contains(&mode))
}

pub fn check_start_url(manifest: &Value) -> bool {
  non_empty_str(manifest, "start_url").is_some()
}

/// At least one icon must be an object with a non-empty `src` and a valid `sizes`.
pub fn check_icons(manifest: &Value) -> bool {
  non_empty_array(manifest, "icons").is_some_and(|icons| {
    icons.iter().any(|icon| {
      let has_src = non_empty_str(icon, "src").is_some();
      let has_sizes = non_empty_str(icon, "sizes").is_some_and(is_size_descriptor);
      has_src && has_sizes
    })
  })
}

pub fn check_screenshots(manifest: &Value) -> bool {
  non_empty_array(manifest, "screenshots").is_some()
}

pub fn check_description(manifest: &Value) -> bool {
  non_empty_str(manifest, "description").is_some()
}

pub fn check_categories(manifest: &Value) -> bool {
  non_empty_array(manifest, "categories").is_some_and(|categories| {
    categories
      .iter()
      .all(|category| category.as_str().is_some_and(|value| !value.trim().is_empty()))
  })
}

/// Extract the IARC rating identifier; `iarc_rating_id` is the standard member.
pub fn extract_rating(manifest: &Value) -> Option<String> {
  non_empty_str(manifest, "iarc_rating_id")
    .or_else(|| non_empty_str(manifest, "iarc_rating"))
    .map(str::to_string)
}

pub fn check_related_apps(manifest: &Value) -> bool {
  non_empty_array(manifest, "related_applications").is_some()
}

pub fn check_related_pref(manifest: &Value) -> bool {
  manifest
    .get("prefer_related_applications")
    .is_some_and(Value::is_boolean)
}

pub fn check_background_color(manifest: &Value) -> bool {
  non_empty_str(manifest, "background_color").is_some_and(is_css_color)
}

pub fn check_theme_color(manifest: &Value) -> bool {
  non_empty_str(manifest, "theme_color").is_some_and(is_css_color)
}

pub fn check_orientation(manifest: &Value) -> bool {
  non_empty_str(manifest, "orientation").is_some_and(|value| ORIENTATIONS.contains(&value))
}
