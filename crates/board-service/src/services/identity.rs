//! Poster identity and body formatting
//!
//! Everything here is derived from what the poster sent plus board settings; nothing is
//! stored about the poster beyond what ends up on the post itself.

use board_core::constants::{
    DELETION_CODE_LENGTH, POSTER_THREAD_ID_LENGTH, TRIPCODE_LENGTH, TRIPCODE_SEPARATOR,
};
use board_core::{BoardSettings, Snowflake};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256, Sha512};

/// `!` followed by the last ten hex digits of the secret's SHA-512
pub fn tripcode(secret: &str) -> String {
    let digest = format!("{:x}", Sha512::digest(secret.as_bytes()));
    format!("{TRIPCODE_SEPARATOR}{}", &digest[digest.len() - TRIPCODE_LENGTH..])
}

/// Stable pseudonym for one address inside one thread
pub fn poster_thread_id(ip: &str, thread_id: Snowflake) -> String {
    let digest = format!("{:x}", Sha256::digest(format!("{ip}{thread_id}").as_bytes()));
    digest[..POSTER_THREAD_ID_LENGTH].to_string()
}

pub fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn deletion_code() -> String {
    random_alphanumeric(DELETION_CODE_LENGTH)
}

/// Name shown on the post
pub fn poster_name(requested: Option<&str>, settings: &BoardSettings) -> String {
    match requested.map(str::trim) {
        Some(name) if !name.is_empty() && !settings.force_default_poster_name => name.to_string(),
        _ => settings.default_poster_name.clone(),
    }
}

/// Two-letter country code from the proxy header. `XX` and `T1` mean unknown or Tor.
pub fn country_code(raw: Option<&str>) -> Option<String> {
    let code = raw?.trim().to_ascii_uppercase();
    let valid = code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic());
    (valid && code != "XX").then_some(code)
}

/// Escape HTML, keep `>` quote markers at line starts, and turn newlines into `<br/>`.
pub fn format_body(raw: &str) -> String {
    let normalized = raw.trim().replace("\r\n", "\n");
    normalized
        .split('\n')
        .map(|line| restore_quote_marker(&escape_html(line)))
        .collect::<Vec<_>>()
        .join("<br/>")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn restore_quote_marker(line: &str) -> String {
    let mut rest = line;
    let mut markers = 0;
    while let Some(stripped) = rest.strip_prefix("&gt;") {
        rest = stripped;
        markers += 1;
    }
    format!("{}{rest}", ">".repeat(markers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tripcode_shape() {
        let trip = tripcode("secret");
        assert!(trip.starts_with('!'));
        assert_eq!(trip.len(), 11);
        assert!(trip[1..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(trip, tripcode("secret"));
        assert_ne!(trip, tripcode("Secret"));
    }

    #[test]
    fn test_poster_thread_id_depends_on_thread() {
        let a = poster_thread_id("10.0.0.1", Snowflake::new(1));
        assert_eq!(a.len(), 8);
        assert_eq!(a, poster_thread_id("10.0.0.1", Snowflake::new(1)));
        assert_ne!(a, poster_thread_id("10.0.0.1", Snowflake::new(2)));
        assert_ne!(a, poster_thread_id("10.0.0.2", Snowflake::new(1)));
    }

    #[test]
    fn test_deletion_code() {
        let code = deletion_code();
        assert_eq!(code.len(), 16);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_poster_name() {
        let mut settings = BoardSettings::new(Snowflake::new(1));
        assert_eq!(poster_name(None, &settings), "Anonymous");
        assert_eq!(poster_name(Some("  "), &settings), "Anonymous");
        assert_eq!(poster_name(Some(" moot "), &settings), "moot");

        settings.force_default_poster_name = true;
        assert_eq!(poster_name(Some("moot"), &settings), "Anonymous");
    }

    #[test]
    fn test_country_code() {
        assert_eq!(country_code(Some("nl")), Some("NL".to_string()));
        assert_eq!(country_code(Some("XX")), None);
        assert_eq!(country_code(Some("T1")), None);
        assert_eq!(country_code(Some("NLD")), None);
        assert_eq!(country_code(None), None);
    }

    #[test]
    fn test_format_body() {
        assert_eq!(
            format_body(">implying\n<b>bold</b> & more\r\nend"),
            ">implying<br/>&lt;b&gt;bold&lt;/b&gt; &amp; more<br/>end"
        );
        assert_eq!(format_body(">>123 a > b"), ">>123 a &gt; b");
        assert_eq!(format_body("  padded  \n"), "padded");
    }
}
