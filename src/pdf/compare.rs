//! Page-by-page text comparison of two documents, written out as a PDF report.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::debug;

use super::stamp::{latin1_literal, standard_font};
use super::text::PageText;
use crate::error::ServiceResult;

// US Letter
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;

const MARGIN_LEFT: f32 = 100.0;
const TOP_Y: f32 = 750.0;
const FIRST_ROW_Y: f32 = 670.0;
const ROW_STEP: f32 = 20.0;
const BOTTOM_Y: f32 = 100.0;

const REGULAR_FONT: &str = "PwHelv";
const BOLD_FONT: &str = "PwHelvBold";
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 12.0;

/// One side of a comparison.
#[derive(Debug, Clone)]
pub struct ComparedFile {
    pub name: String,
    pub page_count: u32,
    pub pages: Vec<PageText>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageComparison {
    pub page: u32,
    pub same: bool,
}

/// Compare the extracted text of every page both documents have.
pub fn compare_pages(left: &ComparedFile, right: &ComparedFile) -> Vec<PageComparison> {
    let shared = left.page_count.min(right.page_count);
    let comparisons: Vec<PageComparison> = (1..=shared)
        .map(|page| PageComparison {
            page,
            same: page_text(&left.pages, page) == page_text(&right.pages, page),
        })
        .collect();
    debug!(
        pages = shared,
        different = comparisons.iter().filter(|c| !c.same).count(),
        "Compared documents"
    );
    comparisons
}

fn page_text(pages: &[PageText], page: u32) -> &str {
    pages
        .get(page as usize - 1)
        .map_or("", |p| p.text.as_str())
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    font: &'static str,
    size: f32,
    y: f32,
    text: String,
}

impl Line {
    fn body(y: f32, text: String) -> Self {
        Line {
            font: REGULAR_FONT,
            size: BODY_SIZE,
            y,
            text,
        }
    }
}

/// Lines of each report page. A new page starts once a row drops below the
/// bottom margin.
fn layout(left: &ComparedFile, right: &ComparedFile, comparisons: &[PageComparison]) -> Vec<Vec<Line>> {
    let mut pages = Vec::new();
    let mut current = vec![
        Line {
            font: BOLD_FONT,
            size: TITLE_SIZE,
            y: TOP_Y,
            text: "PDF Comparison Report".to_string(),
        },
        Line::body(720.0, format!("File 1: {} - {} pages", left.name, left.page_count)),
        Line::body(700.0, format!("File 2: {} - {} pages", right.name, right.page_count)),
    ];

    let mut y = FIRST_ROW_Y;
    for comparison in comparisons {
        let status = if comparison.same { "Same" } else { "DIFFERENT" };
        current.push(Line::body(y, format!("Page {}: {}", comparison.page, status)));
        y -= ROW_STEP;
        if y < BOTTOM_Y {
            pages.push(std::mem::take(&mut current));
            y = TOP_Y;
        }
    }
    if !current.is_empty() {
        pages.push(current);
    }
    pages
}

/// Render the comparison as a standalone document.
pub fn comparison_report(
    left: &ComparedFile,
    right: &ComparedFile,
    comparisons: &[PageComparison],
) -> ServiceResult<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(standard_font("Helvetica"));
    let bold_id = doc.add_object(standard_font("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => regular_id,
            BOLD_FONT => bold_id,
        },
    });

    let mut kids = Vec::new();
    for lines in layout(left, right, comparisons) {
        let mut operations = Vec::with_capacity(lines.len() * 5);
        for line in lines {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec![line.font.into(), line.size.into()]));
            operations.push(Operation::new("Td", vec![MARGIN_LEFT.into(), line.y.into()]));
            operations.push(Operation::new("Tj", vec![latin1_literal(&line.text)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content_id = doc.add_object(Stream::new(dictionary! {}, Content { operations }.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    Ok(doc)
}
