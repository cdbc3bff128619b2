//! Small in-memory documents for tests.
//!
//! Pages are told apart by the width of their MediaBox.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

fn content_stream(doc: &mut Document, label: &str) -> ObjectId {
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 72.into()]),
            Operation::new("Tj", vec![Object::string_literal(label)]),
            Operation::new("ET", vec![]),
        ],
    };
    doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()))
}

fn finish(mut doc: Document, pages_id: ObjectId, pages: lopdf::Dictionary) -> Document {
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn media_box(rect: [f32; 4]) -> Object {
    Object::Array(rect.iter().map(|&v| Object::Real(v)).collect())
}

fn font_resources(doc: &mut Document) -> ObjectId {
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    })
}

/// A flat document with one page per width, each page 200pt tall.
pub fn document_with_widths(widths: &[f32]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let resources_id = font_resources(&mut doc);

    let mut kids = Vec::new();
    for (i, &width) in widths.iter().enumerate() {
        let contents = content_stream(&mut doc, &format!("Page {}", i + 1));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box([0.0, 0.0, width, 200.0]),
            "Contents" => contents,
        });
        kids.push(Object::Reference(page_id));
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => widths.len() as i64,
        "Kids" => kids,
        "Resources" => resources_id,
    };
    finish(doc, pages_id, pages)
}

/// Document with `n` pages numbered by width: page k is `100 + k` wide.
pub fn numbered_document(n: u32) -> Document {
    let widths: Vec<f32> = (1..=n).map(|k| 100.0 + k as f32).collect();
    document_with_widths(&widths)
}

/// One intermediate `/Pages` node per box, each holding one page that
/// inherits its MediaBox and Rotate from that node.
pub fn nested_document(boxes: &[[f32; 4]]) -> Document {
    let mut doc = Document::with_version("1.5");
    let root_id = doc.new_object_id();
    let resources_id = font_resources(&mut doc);

    let mut kids = Vec::new();
    for (i, &rect) in boxes.iter().enumerate() {
        let node_id = doc.new_object_id();
        let contents = content_stream(&mut doc, &format!("Page {}", i + 1));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => node_id,
            "Contents" => contents,
        });
        doc.objects.insert(
            node_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Parent" => root_id,
                "Count" => 1,
                "Kids" => vec![Object::Reference(page_id)],
                "MediaBox" => media_box(rect),
                "Rotate" => 90,
            }),
        );
        kids.push(Object::Reference(node_id));
    }

    let root = dictionary! {
        "Type" => "Pages",
        "Count" => boxes.len() as i64,
        "Kids" => kids,
        "Resources" => resources_id,
    };
    finish(doc, root_id, root)
}

pub fn to_bytes(doc: &mut Document) -> Vec<u8> {
    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

pub fn number(obj: &Object) -> f32 {
    match obj {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r,
        other => panic!("not a number: {other:?}"),
    }
}

pub fn rect_of(obj: &Object) -> [f32; 4] {
    let arr = obj.as_array().unwrap();
    [
        number(&arr[0]),
        number(&arr[1]),
        number(&arr[2]),
        number(&arr[3]),
    ]
}

/// Effective MediaBox of every page, in page order.
pub fn page_boxes(doc: &Document) -> Vec<[f32; 4]> {
    doc.get_pages()
        .values()
        .map(|&id| {
            let media_box = super::tree::inherited_attribute(doc, id, b"MediaBox").unwrap();
            rect_of(&media_box)
        })
        .collect()
}

pub fn page_widths(doc: &Document) -> Vec<f32> {
    page_boxes(doc).iter().map(|r| r[2] - r[0]).collect()
}
