//! Page layout of a stored book
//!
//! Splits the sentence sequence into fixed-size pages and maps table of
//! contents entries onto the page where their heading appears.

use crate::document::{BookDocument, Chapter, Sentence};

use super::types::{LoadedBook, StoredSentence, TocEntry};

/// Short paragraph-start sentences may merely contain the heading
const SHORT_HEADING_LEN: usize = 80;

/// Number of pages; an empty book still has one (empty) page.
/// Saturates at `u32::MAX`.
pub fn total_pages(sentence_count: usize, per_page: usize) -> u32 {
    let per_page = per_page.max(1);
    u32::try_from(sentence_count.div_ceil(per_page).max(1)).unwrap_or(u32::MAX)
}

/// Render one page of a loaded book.
///
/// The requested index is clamped into the book, so a stale position from
/// an older layout lands on the nearest valid page.
pub fn render_page(book: &LoadedBook, requested: u32, per_page: usize) -> BookDocument {
    let per_page = per_page.max(1);
    let page = requested.min(book.total_pages.saturating_sub(1));

    let sentences = &book.book.sentences;
    let start = (page as usize * per_page).min(sentences.len());
    let end = (start + per_page).min(sentences.len());

    BookDocument::new(
        book.id.clone(),
        book.book.title.clone(),
        book.total_pages,
        page,
        book.chapters.clone(),
        sentences[start..end].iter().map(Sentence::from).collect(),
    )
}

/// Map table of contents entries onto start pages.
///
/// Entries are searched for in order, each one after the previous match.
/// Entries that cannot be found, or that would start on the same page as
/// the chapter before them, are dropped so start pages strictly ascend.
pub fn locate_chapters(toc: &[TocEntry], sentences: &[StoredSentence], per_page: usize) -> Vec<Chapter> {
    let per_page = per_page.max(1);
    let mut chapters: Vec<Chapter> = Vec::new();

    let paragraph_starts: Vec<usize> = sentences
        .iter()
        .enumerate()
        .filter(|(_, s)| s.paragraph_start)
        .map(|(i, _)| i)
        .collect();

    let mut search_from = 0;

    for entry in toc {
        if entry.title.trim().is_empty() && entry.chapter_key.trim().is_empty() {
            continue;
        }

        let patterns = search_patterns(entry);
        let found = find_in_paragraph_starts(&paragraph_starts, sentences, search_from, &patterns)
            .or_else(|| find_anywhere(sentences, search_from, &patterns));

        let Some(index) = found else {
            tracing::warn!("Chapter '{}' (key: {}) not found in text", entry.title, entry.chapter_key);
            continue;
        };
        search_from = index + 1;

        let start_page = u32::try_from(index / per_page).unwrap_or(u32::MAX);
        if chapters.last().is_some_and(|c| c.start_page >= start_page) {
            tracing::debug!(
                "Chapter '{}' shares page {} with the previous chapter, skipping",
                entry.title,
                start_page
            );
            continue;
        }

        tracing::debug!("Chapter '{}' found at sentence {} (page {})", entry.title, index, start_page);
        chapters.push(Chapter::new(entry.title.clone(), start_page));
    }

    chapters
}

fn search_patterns(entry: &TocEntry) -> Vec<String> {
    let mut patterns = Vec::new();

    let title = entry.title.trim().to_uppercase();
    if !title.is_empty() {
        patterns.push(title);
    }

    let key = entry.chapter_key.trim().to_uppercase();
    if !key.is_empty() {
        patterns.push(key.clone());
    }

    // Single words of the key ("I. Loomings" -> "LOOMINGS")
    for word in key.split_whitespace() {
        let word: String = word.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        if word.len() >= 3 && !patterns.contains(&word) {
            patterns.push(word);
        }
    }

    patterns
}

fn find_in_paragraph_starts(
    paragraph_starts: &[usize],
    sentences: &[StoredSentence],
    search_from: usize,
    patterns: &[String],
) -> Option<usize> {
    paragraph_starts
        .iter()
        .copied()
        .filter(|&i| i >= search_from)
        .find(|&i| {
            let content = sentences[i].content.trim().to_uppercase();
            patterns.iter().any(|p| {
                heading_prefix(&content, p)
                    || (content.chars().count() < SHORT_HEADING_LEN && content.contains(p.as_str()))
            })
        })
}

fn find_anywhere(sentences: &[StoredSentence], search_from: usize, patterns: &[String]) -> Option<usize> {
    (search_from..sentences.len()).find(|&i| {
        let content = sentences[i].content.trim().to_uppercase();
        patterns
            .iter()
            .any(|p| content == *p || content.starts_with(&format!("{} ", p)))
    })
}

fn heading_prefix(content: &str, pattern: &str) -> bool {
    if content == pattern {
        return true;
    }
    content
        .strip_prefix(pattern)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| matches!(c, ' ' | '.' | ',' | '_'))
}
