use serde::Deserialize;
use thiserror::Error;

/// Upper bound on the number of indices a single expression may expand to.
pub const MAX_SELECTION_LEN: usize = 100_000;

/// How an operation treats input that cannot be honored exactly.
///
/// `Lenient` drops out-of-range pages and expands reversed ranges to nothing.
/// `Strict` turns both into errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    #[default]
    Lenient,
    Strict,
}

impl Strictness {
    pub fn from_form(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Some(Strictness::Lenient),
            "strict" => Some(Strictness::Strict),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Empty page selection")]
    Empty,

    #[error("Invalid page selection token: '{token}'")]
    InvalidToken { token: String },

    #[error("Reversed page range: {start}-{end}")]
    ReversedRange { start: u32, end: u32 },

    #[error("Page selection expands to more than {limit} pages")]
    TooLarge { limit: usize },

    #[error("Page {page} is out of range (1-{page_count})")]
    OutOfRange { page: u32, page_count: u32 },

    #[error("No pages selected")]
    NoPages,
}

/// One token of a page-selection expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: Option<u32>,
}

impl PageRange {
    /// Parse a single token like "4" or "4-7"
    pub fn parse(s: &str) -> Result<Self, SelectionError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(invalid(s));
        }

        match s.split_once('-') {
            Some((start_str, end_str)) => {
                let start = parse_page_number(start_str).ok_or_else(|| invalid(s))?;
                let end = parse_page_number(end_str).ok_or_else(|| invalid(s))?;
                Ok(PageRange {
                    start,
                    end: Some(end),
                })
            }
            None => {
                let page = parse_page_number(s).ok_or_else(|| invalid(s))?;
                Ok(PageRange {
                    start: page,
                    end: None,
                })
            }
        }
    }

    /// Number of indices this token expands to (0 for a reversed range).
    pub fn len(&self) -> usize {
        match self.end {
            None => 1,
            Some(end) if end < self.start => 0,
            Some(end) => (end - self.start) as usize + 1,
        }
    }

    /// Expand into 1-based page indices, ascending only.
    pub fn expand(&self, strictness: Strictness) -> Result<Vec<u32>, SelectionError> {
        let end = self.end.unwrap_or(self.start);
        if self.start > end {
            return match strictness {
                Strictness::Lenient => Ok(Vec::new()),
                Strictness::Strict => Err(SelectionError::ReversedRange {
                    start: self.start,
                    end,
                }),
            };
        }
        Ok((self.start..=end).collect())
    }
}

fn invalid(token: &str) -> SelectionError {
    SelectionError::InvalidToken {
        token: token.to_string(),
    }
}

fn parse_page_number(s: &str) -> Option<u32> {
    let s = s.trim();
    // u32::from_str accepts a leading '+', plain digits only here
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // All digits, so the only failure left is overflow
    Some(s.parse::<u32>().unwrap_or(u32::MAX))
}

/// Parse a comma-separated expression like "1,3,2,4-7" into its tokens
pub fn parse_page_ranges(s: &str) -> Result<Vec<PageRange>, SelectionError> {
    if s.trim().is_empty() {
        return Err(SelectionError::Empty);
    }
    s.split(',').map(PageRange::parse).collect()
}

/// Expand a page-selection expression into an ordered list of 1-based indices.
///
/// Token order is preserved and duplicates are kept. The result is not checked
/// against any document; see [`resolve`].
pub fn parse(s: &str, strictness: Strictness) -> Result<Vec<u32>, SelectionError> {
    let ranges = parse_page_ranges(s)?;

    let total: usize = ranges.iter().map(PageRange::len).sum();
    if total > MAX_SELECTION_LEN {
        return Err(SelectionError::TooLarge {
            limit: MAX_SELECTION_LEN,
        });
    }

    let mut pages = Vec::with_capacity(total);
    for range in ranges {
        pages.extend(range.expand(strictness)?);
    }
    Ok(pages)
}

/// Check an index sequence against a document's page count.
///
/// Lenient mode drops indices outside `1..=page_count`. Strict mode rejects
/// the first such index and an empty result.
pub fn resolve(
    pages: &[u32],
    page_count: u32,
    strictness: Strictness,
) -> Result<Vec<u32>, SelectionError> {
    match strictness {
        Strictness::Lenient => Ok(pages
            .iter()
            .copied()
            .filter(|&p| p >= 1 && p <= page_count)
            .collect()),
        Strictness::Strict => {
            if let Some(&page) = pages.iter().find(|&&p| p == 0 || p > page_count) {
                return Err(SelectionError::OutOfRange { page, page_count });
            }
            if pages.is_empty() {
                return Err(SelectionError::NoPages);
            }
            Ok(pages.to_vec())
        }
    }
}

/// Outcome of validating an explicit `start..=end` split request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitBounds {
    Pages { start: u32, end: u32 },
    Nothing,
    Invalid,
}

/// Validate 1-based inclusive split bounds against a page count.
///
/// Strict mode reports `Invalid` for `start < 1`, `end > page_count` or
/// `start > end`. Lenient mode clamps into the document instead.
pub fn split_bounds(start: i64, end: i64, page_count: u32, strictness: Strictness) -> SplitBounds {
    let total = i64::from(page_count);
    match strictness {
        Strictness::Strict => {
            if start < 1 || end > total || start > end {
                SplitBounds::Invalid
            } else {
                SplitBounds::Pages {
                    start: start as u32,
                    end: end as u32,
                }
            }
        }
        Strictness::Lenient => {
            let start = start.max(1);
            let end = end.min(total);
            if start > end {
                SplitBounds::Nothing
            } else {
                SplitBounds::Pages {
                    start: start as u32,
                    end: end as u32,
                }
            }
        }
    }
}
