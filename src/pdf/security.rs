//! Password protection.
//!
//! Locked documents use the standard security handler (revision 3, 128-bit
//! RC4) with the same password as owner and user password.

use std::time::{SystemTime, UNIX_EPOCH};

use lopdf::encryption::DecryptionError;
use lopdf::{Document, EncryptionState, EncryptionVersion, Object, Permissions, StringFormat};
use md5::{Digest, Md5};
use tracing::debug;

use super::PdfDocument;
use crate::error::{ServiceError, ServiceResult};

const KEY_LENGTH: usize = 128;

const ENCRYPT_KEY: &[u8] = b"/Encrypt";
const MASKED_ENCRYPT_KEY: &[u8] = b"/Encryp_";

impl PdfDocument {
    /// Encrypt the document so it only opens with `password`.
    pub fn lock(&mut self, password: &str) -> ServiceResult<()> {
        if password.is_empty() {
            return Err(ServiceError::invalid_request("Password is empty"));
        }
        if self.doc.is_encrypted() {
            return Err(ServiceError::invalid_request(
                "PDF is already password protected",
            ));
        }

        ensure_file_id(&mut self.doc);
        let version = EncryptionVersion::V2 {
            document: &self.doc,
            owner_password: password,
            user_password: password,
            key_length: KEY_LENGTH,
            permissions: Permissions::all(),
        };
        let state = EncryptionState::try_from(version)?;
        self.doc.encrypt(&state)?;

        debug!(objects = self.doc.objects.len(), "Encrypted PDF");
        Ok(())
    }
}

/// Open `data` with `password` and drop its encryption.
///
/// A document that is not encrypted comes back as it is.
pub fn unlock(data: &[u8], password: &str) -> ServiceResult<PdfDocument> {
    let mut pdf = PdfDocument::from_bytes(data)?;
    if !pdf.doc.is_encrypted() {
        return Ok(pdf);
    }
    pdf.doc.authenticate_password(password).map_err(password_error)?;

    if pdf.doc.encryption_state.is_some() {
        // Opened with the empty user password; objects are already decrypted
        strip_encryption(&mut pdf.doc);
    } else {
        pdf.doc = load_undecrypted(data)?;
        pdf.doc.decrypt(password).map_err(password_error)?;
    }

    debug!(pages = pdf.page_count(), "Decrypted PDF");
    Ok(pdf)
}

/// The trailer `/ID` feeds the encryption key; documents written without one get
/// a fresh identifier.
fn ensure_file_id(doc: &mut Document) {
    if doc.trailer.has(b"ID") {
        return;
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();

    let mut hasher = Md5::new();
    hasher.update(nanos.to_le_bytes());
    hasher.update(doc.max_id.to_le_bytes());
    hasher.update(doc.objects.len().to_le_bytes());
    let id = Object::String(hasher.finalize().to_vec(), StringFormat::Hexadecimal);
    doc.trailer.set("ID", Object::Array(vec![id.clone(), id]));
}

/// Load every object of an encrypted file without decrypting anything.
///
/// lopdf keeps only the encryption dictionary when a file needs a non-empty
/// user password. With the trailer key renamed (same length, so xref offsets
/// stay valid) the file loads as a plain one, still holding ciphertext.
fn load_undecrypted(data: &[u8]) -> ServiceResult<Document> {
    let masked = mask_encrypt_key(data);
    let mut doc = Document::load_mem(&masked).map_err(ServiceError::UnreadablePdf)?;
    let encrypt = doc
        .trailer
        .remove(&MASKED_ENCRYPT_KEY[1..])
        .ok_or_else(|| ServiceError::internal("Encryption dictionary reference not found"))?;
    doc.trailer.set("Encrypt", encrypt);
    Ok(doc)
}

fn mask_encrypt_key(data: &[u8]) -> Vec<u8> {
    let mut masked = data.to_vec();
    let mut pos = 0;
    loop {
        let Some(offset) = masked[pos..]
            .windows(ENCRYPT_KEY.len())
            .position(|w| w == ENCRYPT_KEY)
        else {
            break;
        };
        let start = pos + offset;
        let end = start + ENCRYPT_KEY.len();
        // Longer names such as /EncryptMetadata stay untouched
        if masked.get(end).map_or(true, |b| !b.is_ascii_alphanumeric()) {
            masked[start..end].copy_from_slice(MASKED_ENCRYPT_KEY);
        }
        pos = end;
    }
    masked
}

fn strip_encryption(doc: &mut Document) {
    if let Some(Ok(id)) = doc.trailer.remove(b"Encrypt").map(|o| o.as_reference()) {
        doc.objects.remove(&id);
    }
    doc.encryption_state = None;
}

fn password_error(err: lopdf::Error) -> ServiceError {
    match err {
        lopdf::Error::Decryption(DecryptionError::IncorrectPassword) => {
            ServiceError::IncorrectPassword
        }
        other => ServiceError::UnreadablePdf(other),
    }
}
