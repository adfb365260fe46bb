// Text scraping helpers shared by the platform adapters.
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

// TikTok CDN avatar URIs carry a ~c3_xx_ country segment for some regions
static REGION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~c3_([a-z]{2})_").unwrap());

const MAX_BIO_LEN: usize = 200;

/// First email-shaped substring in a bio, or empty. Pure text scan.
pub fn extract_email(text: &str) -> String {
    EMAIL_RE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Two-letter region code from an avatar URI, "Global" when the
/// pattern is absent.
pub fn detect_region(avatar_uri: &str) -> String {
    REGION_RE
        .captures(avatar_uri)
        .map(|caps| caps[1].to_uppercase())
        .unwrap_or_else(|| "Global".to_string())
}

/// Binary keyword-presence signal: 5.0 on a case-insensitive substring
/// hit, 1.0 otherwise.
pub fn relevance_score(keyword: &str, text: &str) -> f64 {
    if text.to_lowercase().contains(&keyword.to_lowercase()) {
        5.0
    } else {
        1.0
    }
}

/// Bios are capped at 200 characters in the exported record.
pub fn truncate_bio(text: &str) -> String {
    if text.chars().count() <= MAX_BIO_LEN {
        text.to_string()
    } else {
        text.chars().take(MAX_BIO_LEN).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_email_first_match() {
        assert_eq!(
            extract_email("contact: jane.doe@example.com for biz"),
            "jane.doe@example.com"
        );
        assert_eq!(
            extract_email("a@b.co then c@d.org"),
            "a@b.co".to_string()
        );
    }

    #[test]
    fn test_extract_email_no_match() {
        assert_eq!(extract_email("follow me on twitch"), "");
        assert_eq!(extract_email("not-an-email@nowhere"), "");
        assert_eq!(extract_email(""), "");
    }

    #[test]
    fn test_detect_region() {
        assert_eq!(
            detect_region("p16-sign.example/avatar~c3_fr_100x100.jpeg"),
            "FR"
        );
        assert_eq!(detect_region("p16-sign.example/avatar-100x100.jpeg"), "Global");
        assert_eq!(detect_region(""), "Global");
    }

    #[test]
    fn test_relevance_score_is_binary() {
        assert_eq!(relevance_score("Gaming", "pro GAMING channel"), 5.0);
        assert_eq!(relevance_score("gaming", "cooking videos"), 1.0);
    }

    #[test]
    fn test_truncate_bio() {
        let long = "x".repeat(500);
        assert_eq!(truncate_bio(&long).chars().count(), 200);
        assert_eq!(truncate_bio("short"), "short");
        // multi-byte chars must not split
        let emoji = "🎮".repeat(250);
        assert_eq!(truncate_bio(&emoji).chars().count(), 200);
    }
}
