//! Data structures shared by manifest validation and asset packaging.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// View of a Web App Manifest used while packaging.
///
/// Only the image lists are interpreted; every other member is kept verbatim in
/// [`WebManifest::extra`], whatever its type, so the rewritten manifest written into the archive
/// keeps everything the author declared. An image list that is not an array of objects is
/// likewise left untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(from = "Map<String, Value>")]
pub struct WebManifest {
  /// Icon resources, in declaration order.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub icons: Option<Vec<ImageResource>>,
  /// Screenshot resources, in declaration order.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub screenshots: Option<Vec<ImageResource>>,
  /// Remaining manifest members, preserved verbatim.
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl WebManifest {
  /// Interpret an already parsed JSON document as a manifest.
  ///
  /// Fails only when the document is not a JSON object.
  pub fn from_value(value: Value) -> serde_json::Result<Self> {
    serde_json::from_value(value)
  }

  /// Image resources for the given category; empty when the list is absent.
  pub fn images(&self, category: ImageCategory) -> &[ImageResource] {
    let list = match category {
      ImageCategory::Icons => &self.icons,
      ImageCategory::Screenshots => &self.screenshots,
    };
    list.as_deref().unwrap_or(&[])
  }

  /// Mutable access to one image resource of the given category.
  pub fn image_mut(&mut self, category: ImageCategory, slot: usize) -> Option<&mut ImageResource> {
    let list = match category {
      ImageCategory::Icons => &mut self.icons,
      ImageCategory::Screenshots => &mut self.screenshots,
    };
    list.as_mut().and_then(|images| images.get_mut(slot))
  }
}

impl From<Map<String, Value>> for WebManifest {
  fn from(mut members: Map<String, Value>) -> Self {
    let icons = take_image_list(&mut members, ImageCategory::Icons);
    let screenshots = take_image_list(&mut members, ImageCategory::Screenshots);
    Self {
      icons,
      screenshots,
      extra: members,
    }
  }
}

fn take_image_list(
  members: &mut Map<String, Value>,
  category: ImageCategory,
) -> Option<Vec<ImageResource>> {
  let Some(Value::Array(items)) = members.get(category.as_str()) else {
    return None;
  };
  if !items.iter().all(Value::is_object) {
    return None;
  }

  match members.remove(category.as_str()) {
    Some(Value::Array(items)) => Some(
      items
        .into_iter()
        .filter_map(|item| match item {
          Value::Object(fields) => Some(ImageResource::from(fields)),
          _ => None,
        })
        .collect(),
    ),
    _ => None,
  }
}

/// A single icon or screenshot entry of the manifest.
///
/// `src` and `sizes` are read only when they are strings; anything else stays in
/// [`ImageResource::extra`] untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(from = "Map<String, Value>")]
pub struct ImageResource {
  /// Location of the image.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub src: Option<String>,
  /// Size descriptor, for example `512x512`.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sizes: Option<String>,
  /// Remaining members such as `type`, `purpose` or `label`.
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl ImageResource {
  /// Entry with the given `src` and `sizes`.
  pub fn new(src: impl Into<String>, sizes: impl Into<String>) -> Self {
    Self {
      src: Some(src.into()),
      sizes: Some(sizes.into()),
      extra: Map::new(),
    }
  }
}

impl From<Map<String, Value>> for ImageResource {
  fn from(mut fields: Map<String, Value>) -> Self {
    let mut take_string = |key: &str| {
      if !matches!(fields.get(key), Some(Value::String(_))) {
        return None;
      }
      match fields.remove(key) {
        Some(Value::String(value)) => Some(value),
        _ => None,
      }
    };
    let src = take_string("src");
    let sizes = take_string("sizes");
    Self {
      src,
      sizes,
      extra: fields,
    }
  }
}

/// Manifest image list an asset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageCategory {
  /// `icons` list.
  Icons,
  /// `screenshots` list.
  Screenshots,
}

impl ImageCategory {
  /// Both categories in packaging order.
  pub const ALL: [ImageCategory; 2] = [ImageCategory::Icons, ImageCategory::Screenshots];

  /// Manifest member name, also used as the archive directory.
  pub fn as_str(self) -> &'static str {
    match self {
      ImageCategory::Icons => "icons",
      ImageCategory::Screenshots => "screenshots",
    }
  }
}

impl fmt::Display for ImageCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Size information attached to a generated image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMetadata {
  /// Size the generator was asked to produce.
  pub requested_size: String,
  /// Size the generator actually produced.
  pub actual_size: String,
}

impl AssetMetadata {
  /// Build metadata from explicit sizes.
  pub fn new(requested_size: impl Into<String>, actual_size: impl Into<String>) -> Self {
    Self {
      requested_size: requested_size.into(),
      actual_size: actual_size.into(),
    }
  }

  /// Read metadata from a storage tag map.
  ///
  /// Storage back-ends tend to lowercase tag keys, so both spellings are accepted. When only
  /// one size was tagged it is used for both.
  pub fn from_tags(tags: &BTreeMap<String, String>) -> Option<Self> {
    let lookup = |keys: &[&str]| {
      keys
        .iter()
        .find_map(|key| tags.get(*key))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    };

    let actual = lookup(&["actualSize", "actualsize"]);
    let requested = lookup(&["requestedSize", "requestedsize", "sizes"]);

    match (requested, actual) {
      (Some(requested), Some(actual)) => Some(Self::new(requested, actual)),
      (Some(only), None) | (None, Some(only)) => Some(Self::new(only.clone(), only)),
      (None, None) => None,
    }
  }

  /// Size used to locate the manifest slot.
  ///
  /// The produced size always wins over the requested one.
  pub fn effective_size(&self) -> &str {
    &self.actual_size
  }

  /// Returns `true` when the generator produced a different size than requested.
  pub fn is_mismatched(&self) -> bool {
    self.actual_size != self.requested_size
  }
}

/// Generated image available for packaging.
///
/// Listings carry sizes either as an explicit `metadata` object or as the raw storage `tags`
/// the image was saved with; tags are only consulted when `metadata` is absent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "ListedAsset")]
pub struct GeneratedAsset {
  /// Opaque storage name; also the file name inside the archive.
  pub name: String,
  /// Requested and produced sizes, when the listing provided any.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub metadata: Option<AssetMetadata>,
}

impl GeneratedAsset {
  /// Convenience constructor.
  pub fn new(name: impl Into<String>, metadata: AssetMetadata) -> Self {
    Self {
      name: name.into(),
      metadata: Some(metadata),
    }
  }
}

#[derive(Deserialize)]
struct ListedAsset {
  name: String,
  #[serde(default)]
  metadata: Option<AssetMetadata>,
  #[serde(default)]
  tags: BTreeMap<String, String>,
}

impl From<ListedAsset> for GeneratedAsset {
  fn from(listed: ListedAsset) -> Self {
    let metadata = listed
      .metadata
      .or_else(|| AssetMetadata::from_tags(&listed.tags));
    Self {
      name: listed.name,
      metadata,
    }
  }
}

/// Generated assets grouped per category, as listed next to the stored images.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AssetListing {
  /// Generated icons.
  #[serde(default)]
  pub icons: Vec<GeneratedAsset>,
  /// Generated screenshots.
  #[serde(default)]
  pub screenshots: Vec<GeneratedAsset>,
}
