pub mod compare;
pub mod document;
pub mod merge;
pub mod security;
pub mod stamp;
pub mod text;
pub mod tree;

#[cfg(test)]
pub mod fixtures;

pub use document::PdfDocument;
