use crate::page_range::Strictness;
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    start: i64,
    end: i64,
    output: Q,
    strictness: Strictness,
) -> Result<()> {
    let doc = PdfDocument::open(&input)?;

    let mut new_doc = doc.split(start, end, strictness)?;
    let page_count = new_doc.get_pages().len();
    PdfDocument::save(&mut new_doc, &output)?;

    println!(
        "Extracted {} page(s) to {}",
        page_count,
        output.as_ref().display()
    );

    Ok(())
}
