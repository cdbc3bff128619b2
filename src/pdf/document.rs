use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::error::{ServiceError, ServiceResult};
use crate::page_range::{self, SplitBounds, Strictness};
use crate::pdf::tree;

pub struct PdfDocument {
    pub doc: Document,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> ServiceResult<Self> {
        let bytes = std::fs::read(&path)?;
        Self::from_bytes(&bytes)
    }

    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> ServiceResult<Self> {
        let doc = Document::load_mem(data).map_err(ServiceError::UnreadablePdf)?;
        debug!(pages = doc.get_pages().len(), "PDF loaded");
        Ok(PdfDocument { doc })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get 1-indexed page object IDs
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        let mut pages: Vec<_> = self.doc.get_pages().into_iter().collect();
        pages.sort_by_key(|(num, _)| *num);
        pages
    }

    /// Get metadata from the document info dictionary
    pub fn get_info(&self) -> PdfInfo {
        let mut info = PdfInfo::default();

        if let Some(dict) = self.info_dictionary() {
            info.title = get_string_from_dict(dict, b"Title");
            info.author = get_string_from_dict(dict, b"Author");
            info.creator = get_string_from_dict(dict, b"Creator");
            info.producer = get_string_from_dict(dict, b"Producer");
            info.creation_date = get_string_from_dict(dict, b"CreationDate");
            info.mod_date = get_string_from_dict(dict, b"ModDate");
            info.subject = get_string_from_dict(dict, b"Subject");
            info.keywords = get_string_from_dict(dict, b"Keywords");
        }

        info.page_count = self.page_count();
        info
    }

    fn info_dictionary(&self) -> Option<&Dictionary> {
        match self.doc.trailer.get(b"Info").ok()? {
            Object::Reference(id) => self.doc.get_dictionary(*id).ok(),
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Build a new document from 1-based page indices.
    ///
    /// Pages appear in the order given and may repeat. Indices outside
    /// `1..=page_count` are skipped without error. The source is not modified.
    #[instrument(skip_all, fields(requested = pages.len()))]
    pub fn project(&self, pages: &[u32]) -> ServiceResult<Document> {
        let all_pages = self.page_ids();
        let total = all_pages.len() as u32;

        let selected: Vec<ObjectId> = pages
            .iter()
            .filter(|&&page| page >= 1 && page <= total)
            .map(|&page| all_pages[(page - 1) as usize].1)
            .collect();

        let skipped = pages.len() - selected.len();
        if skipped > 0 {
            debug!(skipped, total, "Skipped out-of-range pages");
        }

        let mut new_doc = self.doc.clone();
        tree::rebuild_page_tree(&mut new_doc, &selected)?;
        Ok(new_doc)
    }

    /// Reorder, drop or duplicate pages according to an expression like "1,3,2,4-7"
    pub fn organize(&self, expression: &str, strictness: Strictness) -> ServiceResult<Document> {
        let requested = page_range::parse(expression, strictness)?;
        let pages = page_range::resolve(&requested, self.page_count(), strictness)?;
        info!(
            expression,
            ?strictness,
            selected = pages.len(),
            "Organizing pages"
        );
        self.project(&pages)
    }

    /// Extract the contiguous 1-based range `start..=end`.
    pub fn split(&self, start: i64, end: i64, strictness: Strictness) -> ServiceResult<Document> {
        let page_count = self.page_count();
        match page_range::split_bounds(start, end, page_count, strictness) {
            SplitBounds::Invalid => Err(ServiceError::InvalidRange { page_count }),
            SplitBounds::Nothing => self.project(&[]),
            SplitBounds::Pages { start, end } => {
                info!(start, end, page_count, "Splitting pages");
                let pages: Vec<u32> = (start..=end).collect();
                self.project(&pages)
            }
        }
    }

    /// Shrink every page's MediaBox by `margin` points on all four sides.
    ///
    /// In lenient mode there is no bounds check, so a margin larger than half
    /// the page size yields an inverted box. Strict mode rejects it.
    pub fn crop(&mut self, margin: f32, strictness: Strictness) -> ServiceResult<()> {
        for (number, page_id) in self.page_ids() {
            let [llx, lly, urx, ury] = self.media_box(page_id).ok_or_else(|| {
                ServiceError::internal(format!("Page {} has no MediaBox", number))
            })?;

            if strictness == Strictness::Strict
                && (2.0 * margin >= (urx - llx).abs() || 2.0 * margin >= (ury - lly).abs())
            {
                return Err(ServiceError::invalid_request(format!(
                    "Margin {} is too large for page {} ({} x {})",
                    margin,
                    number,
                    (urx - llx).abs(),
                    (ury - lly).abs()
                )));
            }

            let cropped = [llx + margin, lly + margin, urx - margin, ury - margin];
            self.doc
                .get_dictionary_mut(page_id)?
                .set("MediaBox", rect_object(cropped));
        }
        info!(margin, pages = self.page_count(), "Cropped pages");
        Ok(())
    }

    /// Add `degrees` to every page's rotation.
    pub fn rotate(&mut self, degrees: i64) -> ServiceResult<()> {
        if !matches!(degrees, 90 | 180 | 270) {
            return Err(ServiceError::invalid_request(
                "Rotation must be 90, 180, or 270",
            ));
        }

        for (_, page_id) in self.page_ids() {
            let existing = tree::inherited_attribute(&self.doc, page_id, b"Rotate")
                .and_then(|r| r.as_i64().ok())
                .unwrap_or(0);
            let rotation = (existing + degrees).rem_euclid(360);
            self.doc
                .get_dictionary_mut(page_id)?
                .set("Rotate", Object::Integer(rotation));
        }
        info!(degrees, pages = self.page_count(), "Rotated pages");
        Ok(())
    }

    /// Set string entries in the info dictionary, creating it if needed.
    pub fn set_metadata(&mut self, entries: &[(&str, &str)]) -> ServiceResult<()> {
        let existing = self.doc.trailer.get(b"Info").ok().cloned();
        let info_id = match existing {
            Some(Object::Reference(id)) => id,
            Some(Object::Dictionary(dict)) => self.doc.add_object(dict),
            _ => self.doc.add_object(Dictionary::new()),
        };
        self.doc.trailer.set("Info", Object::Reference(info_id));

        let info = self.doc.get_dictionary_mut(info_id)?;
        for (key, value) in entries {
            info.set(key.as_bytes().to_vec(), Object::string_literal(*value));
        }
        Ok(())
    }

    /// Drop the info dictionary entirely.
    pub fn strip_metadata(&mut self) {
        self.doc.trailer.remove(b"Info");
    }

    /// Compress content streams and drop unreachable objects.
    pub fn compress(&mut self) {
        let pruned = self.doc.prune_objects();
        self.doc.compress();
        debug!(pruned = pruned.len(), "Compressed document");
    }

    /// Effective MediaBox of a page, following inheritance and references.
    pub fn media_box(&self, page_id: ObjectId) -> Option<[f32; 4]> {
        let obj = tree::inherited_attribute(&self.doc, page_id, b"MediaBox")?;
        let obj = match obj {
            Object::Reference(id) => self.doc.get_object(id).ok()?.clone(),
            other => other,
        };
        let arr = obj.as_array().ok()?;
        if arr.len() != 4 {
            return None;
        }
        Some([
            number(&arr[0])?,
            number(&arr[1])?,
            number(&arr[2])?,
            number(&arr[3])?,
        ])
    }

    pub fn into_bytes(mut self) -> ServiceResult<Vec<u8>> {
        Self::to_bytes(&mut self.doc)
    }

    pub fn to_bytes(doc: &mut Document) -> ServiceResult<Vec<u8>> {
        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|e| ServiceError::internal(format!("Failed to serialize PDF: {}", e)))?;
        Ok(out)
    }

    /// Save to a file
    pub fn save<P: AsRef<Path>>(doc: &mut Document, path: P) -> ServiceResult<()> {
        let bytes = Self::to_bytes(doc)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct PdfInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub mod_date: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub page_count: u32,
}

pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn rect_object(rect: [f32; 4]) -> Object {
    Object::Array(rect.iter().map(|&v| Object::Real(v)).collect())
}

fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).ok().and_then(|obj| match obj {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        _ => None,
    })
}

fn decode_pdf_string(bytes: &[u8]) -> Option<String> {
    // UTF-16BE with BOM, otherwise treat as Latin-1
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let u16_chars: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        String::from_utf16(&u16_chars).ok()
    } else {
        Some(bytes.iter().map(|&b| b as char).collect())
    }
}
