use crate::pdf::{merge, PdfDocument};
use anyhow::{Context, Result};
use std::path::Path;

pub fn run<P: AsRef<Path>>(inputs: &[P], output: P) -> Result<()> {
    if inputs.is_empty() {
        anyhow::bail!("No input files specified");
    }

    let documents = inputs
        .iter()
        .map(|input| {
            PdfDocument::open(input)
                .with_context(|| format!("Failed to load PDF: {}", input.as_ref().display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut merged = merge::merge(documents)?;
    let total_pages = merged.get_pages().len();

    PdfDocument::save(&mut merged, &output)
        .with_context(|| format!("Failed to save merged PDF: {}", output.as_ref().display()))?;

    println!(
        "Merged {} files ({} pages) into {}",
        inputs.len(),
        total_pages,
        output.as_ref().display()
    );

    Ok(())
}
