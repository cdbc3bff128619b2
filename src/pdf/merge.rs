use lopdf::{Document, ObjectId};
use tracing::info;

use crate::error::{ServiceError, ServiceResult};
use crate::pdf::{tree, PdfDocument};

/// Concatenate documents page by page, in the order given.
///
/// The first document provides the catalog and trailer; the others have their
/// objects renumbered past it and their pages appended.
pub fn merge(documents: Vec<PdfDocument>) -> ServiceResult<Document> {
    let mut iter = documents.into_iter();
    let first = iter
        .next()
        .ok_or_else(|| ServiceError::invalid_request("No input files specified"))?;

    let mut merged = first.doc;
    let mut pages: Vec<ObjectId> = merged.get_pages().into_values().collect();
    let mut inputs = 1;

    for PdfDocument { doc: mut other } in iter {
        other.renumber_objects_with(merged.max_id + 1);

        // Materialize while the other document's own tree is still intact
        let other_pages: Vec<ObjectId> = other.get_pages().into_values().collect();
        for &page_id in &other_pages {
            tree::materialize_inherited(&mut other, page_id)?;
        }

        merged.max_id = merged.max_id.max(other.max_id);
        merged.objects.extend(other.objects);
        pages.extend(other_pages);
        inputs += 1;
    }

    tree::rebuild_page_tree(&mut merged, &pages)?;
    info!(inputs, pages = pages.len(), "Merged documents");
    Ok(merged)
}
