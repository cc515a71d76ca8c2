//! File names built from API titles.

const NAME_MAX: usize = 255;
const FALLBACK: &str = "download";

/// Makes `name` safe to use as a single path component.
///
/// Path separators, characters Windows rejects and control characters become `_`;
/// leading/trailing dots and spaces are trimmed and the result is capped at 255 bytes.
pub fn sanitize_file_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c == ' ' || c == '.');
    if trimmed.is_empty() {
        return FALLBACK.to_string();
    }

    let mut take = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_ordinary_titles() {
        assert_eq!(sanitize_file_name("My Clip (Live).mp4"), "My Clip (Live).mp4");
    }

    #[test]
    fn replaces_separators() {
        assert_eq!(sanitize_file_name("AC/DC: Back\\In Black.mp3"), "AC_DC_ Back_In Black.mp3");
    }

    #[test]
    fn trims_dots_and_spaces() {
        assert_eq!(sanitize_file_name("  ..hidden.mp4 "), "hidden.mp4");
        assert_eq!(sanitize_file_name(" .. "), "download");
    }

    #[test]
    fn caps_length_on_char_boundary() {
        let long = "é".repeat(200);
        let out = sanitize_file_name(&long);
        assert!(out.len() <= 255);
        assert!(out.chars().all(|c| c == 'é'));
    }
}
