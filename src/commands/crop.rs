use crate::page_range::Strictness;
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    margin: i64,
    output: Q,
    strictness: Strictness,
) -> Result<()> {
    let mut doc = PdfDocument::open(&input)?;
    doc.crop(margin as f32, strictness)?;
    PdfDocument::save(&mut doc.doc, &output)?;

    println!(
        "Cropped {} page(s) by {}pt into {}",
        doc.page_count(),
        margin,
        output.as_ref().display()
    );

    Ok(())
}
