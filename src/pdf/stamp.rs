//! Drawing text on top of existing pages: page numbers and watermarks.
//!
//! Each stamped page gets its original content wrapped in `q ... Q` followed
//! by an overlay stream, so graphics state left over by the page cannot leak
//! into the overlay.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::info;

use crate::error::{ServiceError, ServiceResult};
use crate::pdf::{tree, PdfDocument};

const NUMBER_FONT: &str = "PwHelv";
const WATERMARK_FONT: &str = "PwHelvBold";
const WATERMARK_ALPHA: &str = "PwAlpha";

const NUMBER_FONT_SIZE: f32 = 10.0;
const WATERMARK_FONT_SIZE: f32 = 60.0;

/// Where page numbers are drawn, parsed from strings like "bottom-center".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberPosition {
    pub vertical: Vertical,
    pub horizontal: Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizontal {
    Left,
    Center,
    Right,
}

impl NumberPosition {
    /// Unknown words fall back to the middle/center of the page.
    pub fn parse(s: &str) -> Self {
        let s = s.to_ascii_lowercase();
        let vertical = if s.contains("bottom") {
            Vertical::Bottom
        } else if s.contains("top") {
            Vertical::Top
        } else {
            Vertical::Middle
        };
        let horizontal = if s.contains("left") {
            Horizontal::Left
        } else if s.contains("right") {
            Horizontal::Right
        } else {
            Horizontal::Center
        };
        NumberPosition {
            vertical,
            horizontal,
        }
    }

    /// Baseline origin for a page number on a page with the given MediaBox.
    pub fn origin(&self, [llx, lly, urx, ury]: [f32; 4]) -> (f32, f32) {
        let x = match self.horizontal {
            Horizontal::Left => llx + 50.0,
            Horizontal::Right => urx - 62.0,
            Horizontal::Center => (llx + urx) / 2.0,
        };
        let y = match self.vertical {
            Vertical::Bottom => lly + 30.0,
            Vertical::Top => ury - 42.0,
            Vertical::Middle => (lly + ury) / 2.0,
        };
        (x, y)
    }
}

/// Draw the 1-based page number on every page.
pub fn add_page_numbers(pdf: &mut PdfDocument, position: NumberPosition) -> ServiceResult<()> {
    let font_id = pdf.doc.add_object(standard_font("Helvetica"));

    for (number, page_id) in pdf.page_ids() {
        let media_box = page_box(pdf, page_id)?;
        let (x, y) = position.origin(media_box);

        register_resource(&mut pdf.doc, page_id, b"Font", NUMBER_FONT, font_id.into())?;
        let operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![NUMBER_FONT.into(), NUMBER_FONT_SIZE.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(number.to_string())]),
            Operation::new("ET", vec![]),
        ];
        append_overlay(&mut pdf.doc, page_id, operations)?;
    }

    info!(?position, pages = pdf.page_count(), "Added page numbers");
    Ok(())
}

/// Draw `text`, upper-cased, diagonally across the center of every page.
pub fn add_watermark(pdf: &mut PdfDocument, text: &str) -> ServiceResult<()> {
    let text = text.to_uppercase();
    if text.trim().is_empty() {
        return Err(ServiceError::invalid_request("Watermark text is empty"));
    }

    let font_id = pdf.doc.add_object(standard_font("Helvetica-Bold"));
    let alpha_id = pdf.doc.add_object(dictionary! {
        "Type" => "ExtGState",
        "ca" => 0.3f32,
    });

    // Helvetica-Bold averages a little over half an em per glyph
    let text_width = 0.6 * WATERMARK_FONT_SIZE * text.chars().count() as f32;
    let (sin, cos) = std::f32::consts::FRAC_PI_4.sin_cos();

    for (_, page_id) in pdf.page_ids() {
        let [llx, lly, urx, ury] = page_box(pdf, page_id)?;
        let (cx, cy) = ((llx + urx) / 2.0, (lly + ury) / 2.0);

        register_resource(&mut pdf.doc, page_id, b"Font", WATERMARK_FONT, font_id.into())?;
        register_resource(
            &mut pdf.doc,
            page_id,
            b"ExtGState",
            WATERMARK_ALPHA,
            alpha_id.into(),
        )?;

        let operations = vec![
            Operation::new("gs", vec![WATERMARK_ALPHA.into()]),
            Operation::new("g", vec![0.5f32.into()]),
            Operation::new(
                "cm",
                vec![
                    cos.into(),
                    sin.into(),
                    (-sin).into(),
                    cos.into(),
                    cx.into(),
                    cy.into(),
                ],
            ),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![WATERMARK_FONT.into(), WATERMARK_FONT_SIZE.into()]),
            Operation::new("Td", vec![(-text_width / 2.0).into(), 0.into()]),
            Operation::new("Tj", vec![latin1_literal(&text)]),
            Operation::new("ET", vec![]),
        ];
        append_overlay(&mut pdf.doc, page_id, operations)?;
    }

    info!(pages = pdf.page_count(), "Added watermark");
    Ok(())
}

pub(super) fn standard_font(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn page_box(pdf: &PdfDocument, page_id: ObjectId) -> ServiceResult<[f32; 4]> {
    pdf.media_box(page_id)
        .ok_or_else(|| ServiceError::internal(format!("Page {:?} has no MediaBox", page_id)))
}

// Standard 14 fonts with WinAnsiEncoding cannot show anything past Latin-1
pub(super) fn latin1_literal(text: &str) -> Object {
    let bytes: Vec<u8> = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect();
    Object::string_literal(bytes)
}

fn resolve_dictionary(doc: &Document, obj: &Object) -> Option<Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict.clone()),
        Object::Reference(id) => doc.get_dictionary(*id).ok().cloned(),
        _ => None,
    }
}

/// Add `name` to the page's resource `category`, copying shared resource
/// dictionaries onto the page so other pages are not affected.
fn register_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &[u8],
    name: &str,
    value: Object,
) -> ServiceResult<()> {
    tree::materialize_inherited(doc, page_id)?;

    let mut resources = doc
        .get_dictionary(page_id)?
        .get(b"Resources")
        .ok()
        .and_then(|obj| resolve_dictionary(doc, obj))
        .unwrap_or_else(Dictionary::new);
    let mut entries = resources
        .get(category)
        .ok()
        .and_then(|obj| resolve_dictionary(doc, obj))
        .unwrap_or_else(Dictionary::new);

    entries.set(name, value);
    resources.set(category.to_vec(), Object::Dictionary(entries));
    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));
    Ok(())
}

fn append_overlay(
    doc: &mut Document,
    page_id: ObjectId,
    operations: Vec<Operation>,
) -> ServiceResult<()> {
    let existing: Vec<Object> = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(streams)) => streams.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(streams)) => streams.clone(),
        _ => Vec::new(),
    };

    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));

    let mut overlay = vec![Operation::new("Q", vec![]), Operation::new("q", vec![])];
    overlay.extend(operations);
    overlay.push(Operation::new("Q", vec![]));
    let encoded = Content {
        operations: overlay,
    }
    .encode()?;
    let overlay_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(save_id));
    contents.extend(existing);
    contents.push(Object::Reference(overlay_id));

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}
