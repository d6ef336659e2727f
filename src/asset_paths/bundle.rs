use crate::models::ImageCategory;

/// Produce the archive path for a generated asset.
///
/// The generated path always uses forward slashes so the rewritten manifest resolves on every
/// platform, whatever separator the storage collaborator used in the asset name.
pub fn make_archive_path(category: ImageCategory, asset_name: &str) -> String {
    format!("{}/{}", category.as_str(), asset_name.trim_start_matches(['/', '\\']))
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::make_archive_path;
    use crate::models::ImageCategory;

    #[test]
    fn scopes_names_by_category() {
        assert_eq!(
            make_archive_path(ImageCategory::Icons, "icon-512.png"),
            "icons/icon-512.png"
        );
        assert_eq!(
            make_archive_path(ImageCategory::Screenshots, "wide/home.png"),
            "screenshots/wide/home.png"
        );
    }

    #[test]
    fn normalises_backslashes_from_windows_inputs() {
        let result = make_archive_path(ImageCategory::Icons, "android\\launcher.png");
        assert_eq!(result, "icons/android/launcher.png");
    }
}
