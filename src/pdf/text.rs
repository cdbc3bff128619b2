use pdf_extract::OutputError;
use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};

/// Extract the text of every page, in page order.
///
/// Extraction stops at the first page pdf-extract cannot render, so callers
/// indexing by page number should treat missing entries as empty.
pub fn extract_text_pages(pdf_bytes: &[u8]) -> ServiceResult<Vec<PageText>> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes).map_err(extraction_error)?;
    debug!(pages = pages.len(), "Text extracted");
    Ok(pages
        .into_iter()
        .enumerate()
        .map(|(idx, text)| PageText {
            page: (idx + 1) as u32,
            text,
        })
        .collect())
}

/// Plain text of the whole document, one page after another.
pub fn extract_text(pdf_bytes: &[u8]) -> ServiceResult<String> {
    let pages = extract_text_pages(pdf_bytes)?;
    Ok(join_pages(&pages))
}

pub fn join_pages(pages: &[PageText]) -> String {
    pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn extraction_error(err: OutputError) -> ServiceError {
    match err {
        // Raised while loading: the upload is not a PDF we can parse
        OutputError::PdfError(e) => ServiceError::UnreadablePdf(e),
        other => ServiceError::TextExtraction {
            message: other.to_string(),
        },
    }
}

#[derive(Debug, Clone)]
pub struct PageText {
    pub page: u32,
    pub text: String,
}

/// Case-insensitive literal matcher for `term`.
pub fn literal_matcher(term: &str) -> ServiceResult<Regex> {
    if term.trim().is_empty() {
        return Err(ServiceError::invalid_request("Search text is empty"));
    }
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .map_err(|e| ServiceError::internal(format!("Failed to build matcher: {}", e)))
}

/// Pages whose text matches `pattern`, with the number of matches on each.
pub fn find_pages(pages: &[PageText], pattern: &Regex) -> Vec<PageMatch> {
    let matches: Vec<PageMatch> = pages
        .iter()
        .filter_map(|page| {
            let count = pattern.find_iter(&page.text).count();
            (count > 0).then_some(PageMatch {
                page: page.page,
                count,
            })
        })
        .collect();
    debug!(pages = matches.len(), "Text search complete");
    matches
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMatch {
    pub page: u32,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures;

    fn page_texts(texts: &[&str]) -> Vec<PageText> {
        texts
            .iter()
            .enumerate()
            .map(|(idx, text)| PageText {
                page: (idx + 1) as u32,
                text: text.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_extract_text_pages_one_entry_per_page() {
        let data = fixtures::to_bytes(&mut fixtures::numbered_document(3));
        let pages = extract_text_pages(&data).unwrap();
        assert_eq!(pages.len(), 3);
        for (idx, page) in pages.iter().enumerate() {
            assert_eq!(page.page, idx as u32 + 1);
            assert!(page.text.contains(&format!("Page {}", idx + 1)), "{:?}", page.text);
        }
        assert!(!pages[0].text.contains("Page 2"));
    }

    #[test]
    fn test_extract_text_unreadable() {
        let err = extract_text_pages(b"plain text, not a pdf").unwrap_err();
        assert!(matches!(err, ServiceError::UnreadablePdf(_)), "{err:?}");
    }

    #[test]
    fn test_join_pages() {
        assert_eq!(join_pages(&page_texts(&["one", "two"])), "one\ntwo");
        assert_eq!(join_pages(&[]), "");
    }

    #[test]
    fn test_find_pages_case_insensitive_literal() {
        let pages = page_texts(&["Account 1.2 here", "nothing", "account 1.2 and ACCOUNT 1.2"]);
        let matcher = literal_matcher("account 1.2").unwrap();
        assert_eq!(
            find_pages(&pages, &matcher),
            vec![PageMatch { page: 1, count: 1 }, PageMatch { page: 3, count: 2 }]
        );

        // The dot is literal, not a wildcard
        let other = page_texts(&["account 1x2"]);
        assert!(find_pages(&other, &matcher).is_empty());
    }

    #[test]
    fn test_empty_term_rejected() {
        assert!(literal_matcher(" ").is_err());
    }
}
