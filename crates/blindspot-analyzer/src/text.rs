//! Text shaping for embedding input.

/// Content excerpt length in characters.
const EXCERPT_CHARS: usize = 500;

/// Upper bound on the prepared text sent to the embedding service.
const EMBED_MAX_CHARS: usize = 8000;

/// Builds the canonical embedding text for one article: the title, a blank
/// line, then the first 500 characters of the content. The whole prepared
/// text is capped at 8000 characters.
///
/// Both bounds count `char`s, so multi-byte Korean text is never split
/// mid-codepoint.
#[must_use]
pub fn prepare_text(title: &str, content: &str) -> String {
    let mut prepared = format!("{title}\n\n{}", truncate_chars(content, EXCERPT_CHARS));
    if let Some((idx, _)) = prepared.char_indices().nth(EMBED_MAX_CHARS) {
        prepared.truncate(idx);
    }
    prepared
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_kept_whole() {
        let text = prepare_text("제목", "본문 내용");
        assert_eq!(text, "제목\n\n본문 내용");
    }

    #[test]
    fn long_content_is_cut_at_500_chars() {
        let content = "가".repeat(700);
        let text = prepare_text("제목", &content);

        let excerpt: String = text.chars().skip("제목\n\n".chars().count()).collect();
        assert_eq!(excerpt.chars().count(), 500);
        assert!(excerpt.chars().all(|c| c == '가'));
    }

    #[test]
    fn prepared_text_is_capped_at_8000_chars() {
        // A pathological title longer than the cap; the excerpt bound alone
        // cannot contain it.
        let title = "한".repeat(9000);
        let text = prepare_text(&title, "본문");
        assert_eq!(text.chars().count(), 8000);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // Each Hangul syllable is 3 bytes in UTF-8; slicing by bytes at 500
        // would panic or corrupt. Must not.
        let content = "뉴스".repeat(400);
        let text = prepare_text("제목", &content);
        assert!(text.is_char_boundary(text.len()));
        assert!(!text.contains('\u{FFFD}'));
    }
}
