//! Image names, tag ordering and image marks.

use serde::Serialize;

/// Split `"<repository>/<application>"` on the last `/`.
pub fn split_image_name(name: &str) -> (Option<&str>, &str) {
    match name.rsplit_once('/') {
        Some((repository, application)) => (Some(repository), application),
        None => (None, name),
    }
}

/// Version sort key for a tag.
///
/// `latest` (any case) sorts after everything. Otherwise each word run contributes
/// its integer value when purely numeric, else the code of each upper-cased
/// character.
pub fn tag_sort_key(tag: &str) -> Vec<u64> {
    if tag.eq_ignore_ascii_case("latest") {
        return vec![u64::MAX];
    }
    let mut key = Vec::new();
    let runs = tag
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|run| !run.is_empty());
    for run in runs {
        if run.chars().all(|c| c.is_ascii_digit()) {
            match run.parse::<u64>() {
                Ok(number) => key.push(number),
                // longer than u64: saturate
                Err(_) => key.push(u64::MAX - 1),
            }
        } else {
            key.extend(run.to_uppercase().chars().map(|c| c as u64));
        }
    }
    key
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMark {
    Verified,
    Official,
}

impl ImageMark {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageMark::Verified => "verified",
            ImageMark::Official => "official",
        }
    }

    /// Tooltip text shown next to the badge.
    pub fn title(self) -> &'static str {
        match self {
            ImageMark::Verified => "Verified Publisher",
            ImageMark::Official => "Docker Official Image",
        }
    }
}

/// Verified prefixes win over official ones.
pub fn image_mark(name: &str, official_prefixes: &[String], verified_prefixes: &[String]) -> Option<ImageMark> {
    let matches = |prefixes: &[String]| {
        prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && name.starts_with(prefix.as_str()))
    };
    if matches(verified_prefixes) {
        Some(ImageMark::Verified)
    } else if matches(official_prefixes) {
        Some(ImageMark::Official)
    } else {
        None
    }
}
