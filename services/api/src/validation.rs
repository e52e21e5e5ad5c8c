//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate an external lesson video URL.
///
/// Only YouTube watch or short links are accepted. Empty or absent values
/// pass without validation.
pub fn validate_video_url(url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Ok(());
    }

    static VIDEO_URL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = VIDEO_URL_REGEX.get_or_init(|| {
        Regex::new(r"^https?://(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/)[\w-]+$")
            .expect("Failed to compile video URL regex")
    });

    if !regex.is_match(url) {
        return Err("Video link must point to a YouTube video".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_youtube_watch_links() {
        assert!(validate_video_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").is_ok());
        assert!(validate_video_url("http://youtube.com/watch?v=abc_123-XYZ").is_ok());
    }

    #[test]
    fn accepts_youtube_short_links() {
        assert!(validate_video_url("https://youtu.be/dQw4w9WgXcQ").is_ok());
    }

    #[test]
    fn rejects_other_hosts() {
        assert!(validate_video_url("https://vimeo.com/123456").is_err());
        assert!(validate_video_url("https://example.com/watch?v=abc").is_err());
        assert!(validate_video_url("not a url").is_err());
    }

    #[test]
    fn empty_video_url_is_accepted() {
        assert!(validate_video_url("").is_ok());
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn password_length_bounds() {
        assert!(validate_password("longenough1").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }
}
