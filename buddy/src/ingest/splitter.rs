pub const CHUNK_SIZE: usize = 200;
pub const CHUNK_OVERLAP: usize = 20;

/// Splits `text` into windows of at most `size` characters, each sharing
/// `overlap` characters with the previous one.
pub fn split(text: &str, size: usize, overlap: usize) -> Vec<String> {
    debug_assert!(overlap < size, "overlap must be smaller than the chunk size");

    let chars = text.chars().collect::<Vec<_>>();
    if chars.is_empty() {
        return Vec::new();
    }

    let stride = size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());

        if end == chars.len() {
            break;
        }

        start += stride;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reassemble(chunks: &[String], overlap: usize) -> String {
        let mut text = chunks.first().cloned().unwrap_or_default();

        for chunk in &chunks[1..] {
            text.extend(chunk.chars().skip(overlap));
        }

        text
    }

    #[test]
    fn should_not_split_short_text() {
        assert_eq!(split("Hello world", CHUNK_SIZE, CHUNK_OVERLAP), vec!["Hello world"]);
        assert!(split("", CHUNK_SIZE, CHUNK_OVERLAP).is_empty());
    }

    #[test]
    fn should_keep_exactly_one_chunk_at_the_size_limit() {
        let text = "a".repeat(CHUNK_SIZE);

        assert_eq!(split(&text, CHUNK_SIZE, CHUNK_OVERLAP).len(), 1);
    }

    #[test]
    fn should_overlap_neighbouring_chunks() {
        let text = (0..1000)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect::<String>();

        let chunks = split(&text, CHUNK_SIZE, CHUNK_OVERLAP);

        assert_eq!(chunks.len(), 6);
        for pair in chunks.windows(2) {
            let tail = pair[0].chars().skip(CHUNK_SIZE - CHUNK_OVERLAP).collect::<String>();
            let head = pair[1].chars().take(CHUNK_OVERLAP).collect::<String>();

            assert_eq!(pair[0].chars().count(), CHUNK_SIZE);
            assert_eq!(tail, head);
        }
        assert_eq!(reassemble(&chunks, CHUNK_OVERLAP), text);
    }

    #[test]
    fn should_preserve_document_order() {
        let text = "The quick brown fox jumps over the lazy dog.\n".repeat(20);

        let chunks = split(&text, CHUNK_SIZE, CHUNK_OVERLAP);

        assert!(chunks.iter().all(|c| c.chars().count() <= CHUNK_SIZE));
        assert_eq!(reassemble(&chunks, CHUNK_OVERLAP), text);
    }

    #[test]
    fn should_count_characters_not_bytes() {
        let text = "é".repeat(250);

        let chunks = split(&text, CHUNK_SIZE, CHUNK_OVERLAP);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].chars().count(), 70);
    }
}
