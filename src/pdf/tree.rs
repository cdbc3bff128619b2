//! Page-tree surgery shared by projection and merging.
//!
//! Output documents always get a flat page tree: the catalog's root `/Pages`
//! node lists every page directly in `/Kids`. Inheritable attributes are
//! copied onto each page first so nothing is lost when intermediate nodes are
//! dropped.

use std::collections::BTreeSet;

use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::ServiceResult;

/// Page attributes that may be inherited from ancestor `/Pages` nodes.
pub const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

// Malformed files can contain /Parent cycles
const MAX_TREE_DEPTH: usize = 64;

/// Look up `key` on a page, walking up `/Parent` links until it is found.
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_dictionary(current).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        current = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

/// Copy every inherited attribute the page does not define onto the page itself.
pub fn materialize_inherited(doc: &mut Document, page_id: ObjectId) -> ServiceResult<()> {
    let mut missing = Vec::new();
    {
        let page = doc.get_dictionary(page_id)?;
        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Some(value) = inherited_attribute(doc, page_id, key) {
                    missing.push((key.to_vec(), value));
                }
            }
        }
    }

    if !missing.is_empty() {
        let page = doc.get_dictionary_mut(page_id)?;
        for (key, value) in missing {
            page.set(key, value);
        }
    }
    Ok(())
}

/// Object ID of the catalog's root `/Pages` node.
pub fn root_pages_id(doc: &Document) -> ServiceResult<ObjectId> {
    Ok(doc.catalog()?.get(b"Pages")?.as_reference()?)
}

/// Replace the document's page tree with exactly `pages`, in order.
///
/// A page ID that appears more than once is given a shallow copy of its page
/// dictionary for each repeat, so every entry in `/Kids` is a distinct page
/// object while content streams and resources stay shared. Objects that are
/// no longer reachable are pruned.
pub fn rebuild_page_tree(doc: &mut Document, pages: &[ObjectId]) -> ServiceResult<()> {
    let root = root_pages_id(doc)?;

    let distinct: BTreeSet<ObjectId> = pages.iter().copied().collect();
    for &page_id in &distinct {
        materialize_inherited(doc, page_id)?;
    }

    let mut seen = BTreeSet::new();
    let mut kids = Vec::with_capacity(pages.len());
    for &page_id in pages {
        let id = if seen.insert(page_id) {
            page_id
        } else {
            let mut copy = doc.get_dictionary(page_id)?.clone();
            // An annotation belongs to exactly one page
            copy.remove(b"Annots");
            doc.add_object(copy)
        };
        doc.get_dictionary_mut(id)?
            .set("Parent", Object::Reference(root));
        kids.push(Object::Reference(id));
    }

    let count = kids.len() as i64;
    let root_dict = doc.get_dictionary_mut(root)?;
    for key in INHERITABLE_KEYS {
        root_dict.remove(key);
    }
    root_dict.set("Kids", Object::Array(kids));
    root_dict.set("Count", Object::Integer(count));

    let pruned = doc.prune_objects();
    debug!(
        pages = count,
        pruned = pruned.len(),
        "Rebuilt page tree"
    );
    Ok(())
}
