//! Platform resolution for policy keys.
//!
//! Policy keys and slugs are `<platform>-<policy>` (e.g. `tiktok-community-guidelines`).
//! When the policy list is loaded its `platform` field wins; otherwise the
//! key prefix is mapped onto a display name.

use std::collections::HashMap;

use crate::model::PolicyRecord;

/// Platforms the dashboard always charts, even in weeks with no changes.
pub const TRACKED_PLATFORMS: &[&str] = &["YouTube", "Meta", "TikTok", "Twitch", "Whatnot"];

/// Fallback bucket for keys whose prefix is not recognised.
pub const OTHER_PLATFORM: &str = "Other";

/// Map a policy key prefix onto a platform display name.
///
/// Instagram and Facebook policies are reported under Meta.
pub fn platform_from_key(key: &str) -> &'static str {
    let prefix = key
        .trim()
        .split('-')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match prefix.as_str() {
        "youtube" => "YouTube",
        "meta" | "instagram" | "facebook" => "Meta",
        "tiktok" => "TikTok",
        "twitch" => "Twitch",
        "whatnot" => "Whatnot",
        "twitter" | "x" => "X",
        _ => OTHER_PLATFORM,
    }
}

/// Resolves policy keys to platforms, preferring the loaded policy list.
#[derive(Debug, Default, Clone)]
pub struct PlatformResolver {
    by_slug: HashMap<String, String>,
}

impl PlatformResolver {
    pub fn new(policies: &[PolicyRecord]) -> Self {
        let by_slug = policies
            .iter()
            .map(|p| (p.slug.clone(), p.platform.clone()))
            .collect();
        Self { by_slug }
    }

    pub fn resolve(&self, key: &str) -> String {
        match self.by_slug.get(key) {
            Some(platform) => platform.clone(),
            None => platform_from_key(key).to_string(),
        }
    }
}

/// Font Awesome icon class for a platform, shared by the HTML renderer.
pub fn platform_icon(platform: &str) -> &'static str {
    match platform.to_ascii_lowercase().as_str() {
        "all" => "fas fa-globe",
        "tiktok" => "fab fa-tiktok",
        "meta" => "fab fa-meta",
        "instagram" => "fab fa-instagram",
        "facebook" => "fab fa-facebook",
        "youtube" => "fab fa-youtube",
        "twitch" => "fab fa-twitch",
        "whatnot" => "fas fa-gavel",
        "x" => "fab fa-x-twitter",
        "twitter" => "fab fa-twitter",
        "discord" => "fab fa-discord",
        "reddit" => "fab fa-reddit",
        _ => "fas fa-building",
    }
}
