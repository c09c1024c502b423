//! Name normalization shared by the alias resolver, the signal index and
//! the adapters that derive identifiers from file names.

const SEPARATORS: [char; 4] = ['-', '_', '.', ' '];

/// Suffixes that rarely distinguish one application from another.
const NOISE_SUFFIXES: [&str; 7] = [
    "-data", "-bin", "-git", "-stable", "-beta", "-nightly", "-desktop",
];

const ARCH_TAGS: [&str; 10] = [
    "x86", "x86_64", "x64", "amd64", "aarch64", "arm64", "armhf", "i386", "i686", "linux",
];

/// Lowercase, strip leading dots, and collapse every run of separators into a
/// single `-`. Only used as a comparison key; display keeps the raw name.
pub fn normalize(name: &str) -> String {
    let trimmed = name.trim().trim_start_matches('.');
    let mut out = String::with_capacity(trimmed.len());
    let mut pending_separator = false;

    for ch in trimmed.chars() {
        if SEPARATORS.contains(&ch) {
            pending_separator = !out.is_empty();
            continue;
        }
        if pending_separator {
            out.push('-');
            pending_separator = false;
        }
        out.extend(ch.to_lowercase());
    }

    out
}

fn is_version_segment(segment: &str) -> bool {
    let digits = segment
        .strip_prefix('v')
        .filter(|rest| !rest.is_empty())
        .unwrap_or(segment);
    !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit())
}

/// `blender-4-1` -> `blender`. Returns `None` when nothing was stripped or
/// nothing would be left.
pub fn strip_version_suffix(normalized: &str) -> Option<String> {
    let mut segments: Vec<&str> = normalized.split('-').collect();
    let original_len = segments.len();
    while segments.len() > 1 && segments.last().is_some_and(|s| is_version_segment(s)) {
        segments.pop();
    }
    if segments.len() == original_len {
        return None;
    }
    Some(segments.join("-"))
}

/// `audacity-data` -> `audacity`.
pub fn strip_noise_suffix(normalized: &str) -> Option<String> {
    NOISE_SUFFIXES.iter().find_map(|suffix| {
        normalized
            .strip_suffix(suffix)
            .filter(|rest| !rest.is_empty())
            .map(str::to_string)
    })
}

/// Derive an application identifier from an AppImage file stem, dropping the
/// version and architecture tail: `Obsidian-1.5.3-x86_64` -> `obsidian`.
pub fn appimage_identifier(stem: &str) -> Option<String> {
    let mut kept = Vec::new();
    for segment in stem.split(['-', '_']) {
        let lower = segment.to_ascii_lowercase();
        let starts_numeric = lower.chars().next().is_some_and(|ch| ch.is_ascii_digit())
            || (lower.starts_with('v') && lower[1..].starts_with(|ch: char| ch.is_ascii_digit()));
        if starts_numeric || ARCH_TAGS.contains(&lower.as_str()) {
            break;
        }
        kept.push(segment);
    }

    let name = normalize(&kept.join("-"));
    if !name.is_empty() {
        return Some(name);
    }
    let fallback = normalize(stem);
    (!fallback.is_empty()).then_some(fallback)
}

/// Containment in either direction, where the contained side must be at least
/// `min_len` characters long.
pub fn partial_match(left: &str, right: &str, min_len: usize) -> bool {
    let (short, long) = if left.len() <= right.len() {
        (left, right)
    } else {
        (right, left)
    };
    short.chars().count() >= min_len && long.contains(short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_separators() {
        assert_eq!(normalize(".audacity-data"), "audacity-data");
        assert_eq!(normalize("Code - OSS"), "code-oss");
        assert_eq!(normalize("com.example.App"), "com-example-app");
        assert_eq!(normalize(".eID_klient"), "eid-klient");
        assert_eq!(normalize("gtk-3.0"), "gtk-3-0");
        assert_eq!(normalize("trailing__"), "trailing");
        assert_eq!(normalize("..."), "");
    }

    #[test]
    fn test_strip_version_suffix() {
        assert_eq!(strip_version_suffix("blender-4-1"), Some("blender".to_string()));
        assert_eq!(strip_version_suffix("app-v2"), Some("app".to_string()));
        assert_eq!(strip_version_suffix("python3"), None);
        assert_eq!(strip_version_suffix("2048"), None);
        assert_eq!(strip_version_suffix("vlc"), None);
    }

    #[test]
    fn test_strip_noise_suffix() {
        assert_eq!(strip_noise_suffix("audacity-data"), Some("audacity".to_string()));
        assert_eq!(strip_noise_suffix("yay-bin"), Some("yay".to_string()));
        assert_eq!(strip_noise_suffix("firefox"), None);
    }

    #[test]
    fn test_appimage_identifier() {
        assert_eq!(
            appimage_identifier("Obsidian-1.5.3-x86_64").as_deref(),
            Some("obsidian")
        );
        assert_eq!(
            appimage_identifier("balenaEtcher-1.18.11-x64").as_deref(),
            Some("balenaetcher")
        );
        assert_eq!(
            appimage_identifier("Joplin_v2.14.20").as_deref(),
            Some("joplin")
        );
        assert_eq!(appimage_identifier("Krita").as_deref(), Some("krita"));
        assert_eq!(appimage_identifier("1.0.0").as_deref(), Some("1-0-0"));
    }

    #[test]
    fn test_partial_match_respects_min_len() {
        assert!(partial_match("com-example-app", "example-app", 4));
        assert!(partial_match("steam", "steam-native-runtime", 4));
        assert!(!partial_match("go", "google-chrome", 4));
        assert!(!partial_match("kde", "kdeconnect", 4));
    }
}
