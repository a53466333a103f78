//! Canonical map-search links for restaurants.

/// Prefix of every synthesized restaurant link.
pub const MAP_SEARCH_BASE: &str = "https://map.naver.com/v5/search/";

/// Builds `https://map.naver.com/v5/search/<url-escaped title>`.
///
/// Deterministic: the same title always yields the same link. Surrounding
/// whitespace is ignored.
///
/// # Example
/// ```
/// # use recommend_service::normalize::link::synthesize_link;
/// assert_eq!(
///     synthesize_link("A 식당"),
///     "https://map.naver.com/v5/search/A%20%EC%8B%9D%EB%8B%B9"
/// );
/// ```
pub fn synthesize_link(title: &str) -> String {
    format!("{MAP_SEARCH_BASE}{}", urlencoding::encode(title.trim()))
}

/// Returns `uri` when it is non-blank, otherwise a link synthesized from `title`.
pub fn link_or_synthesized(uri: Option<&str>, title: &str) -> String {
    match uri.map(str::trim).filter(|u| !u.is_empty()) {
        Some(u) => u.to_string(),
        None => synthesize_link(title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesis_is_idempotent() {
        let a = synthesize_link("을지로 골뱅이 & 호프");
        let b = synthesize_link("을지로 골뱅이 & 호프");
        assert_eq!(a, b);
        assert!(a.starts_with(MAP_SEARCH_BASE));
        assert!(!a.contains(' '));
        assert!(!a.contains('&'));
    }

    #[test]
    fn keeps_supplied_links() {
        assert_eq!(link_or_synthesized(Some(" https://x "), "A"), "https://x");
        assert_eq!(
            link_or_synthesized(Some("   "), "A"),
            format!("{MAP_SEARCH_BASE}A")
        );
        assert_eq!(link_or_synthesized(None, "A"), format!("{MAP_SEARCH_BASE}A"));
    }
}
