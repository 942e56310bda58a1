//! File intake: turn a supported file into one plain-text blob for the
//! pipeline.
//!
//! `.eml` files are flattened into a single annotated string: headers,
//! body, then one block per named attachment. A failing attachment never
//! aborts its siblings; the failure becomes placeholder text inline, and
//! the rest of the message still comes through. Extracted text is
//! NFC-normalized before return.

use std::path::Path;

use mail_parser::{Message, MessagePart, MessageParser, MimeHeaders};
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

use crate::error::{IntakeError, IntakeResult};

/// Deepest nested message level that is still expanded. Below this,
/// nested mail becomes a placeholder instead of recursing further.
const MAX_EML_DEPTH: usize = 4;

/// Extract plain text from `path`, dispatching on the extension.
/// Supported: `.txt`, `.eml`, `.pdf`.
pub fn extract_text(path: &Path) -> IntakeResult<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let text = match extension.as_str() {
        "txt" => read_txt(path)?,
        "eml" => read_eml(path)?,
        "pdf" => read_pdf(path)?,
        _ => {
            return Err(IntakeError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };

    Ok(text.nfc().collect())
}

fn read_txt(path: &Path) -> IntakeResult<String> {
    let bytes = std::fs::read(path).map_err(|source| IntakeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn read_pdf(path: &Path) -> IntakeResult<String> {
    pdf_extract::extract_text(path).map_err(|e| IntakeError::Pdf {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn read_eml(path: &Path) -> IntakeResult<String> {
    let bytes = std::fs::read(path).map_err(|source| IntakeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let message =
        MessageParser::default()
            .parse(&bytes)
            .ok_or_else(|| IntakeError::MalformedMessage {
                path: path.to_path_buf(),
            })?;
    Ok(assemble_message(&message, 0))
}

// ── Message assembly ────────────────────────────────────────────────────

/// Flatten one parsed message into the annotated intake format:
/// `Subject: …, Sender: …, EmailFrom: …, EmailBody: …, <attachments>`.
fn assemble_message(message: &Message<'_>, depth: usize) -> String {
    let subject = message.subject().unwrap_or("No Subject");
    let (sender_name, email_from) = sender_parts(message);
    let body = message
        .body_text(0)
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| "No Content".to_string());

    let attachment_text = if message.attachment_count() == 0 {
        "No Attachments".to_string()
    } else {
        let mut blocks = vec!["Attachment Content:".to_string()];
        for part in message.attachments() {
            let Some(filename) = part.attachment_name() else {
                debug!("skipping unnamed attachment part");
                continue;
            };
            let content = attachment_content(part, filename, depth);
            blocks.push(format!("Filename: {filename}\nContent:\n{content}"));
        }
        blocks.join("\n")
    };

    format!(
        "Subject: {subject}, Sender: {sender_name}, EmailFrom: {email_from}, \
         EmailBody: {body}, {attachment_text}"
    )
}

/// Sender display name and address, with `Unknown Sender` standing in for
/// whatever the headers lack.
fn sender_parts(message: &Message<'_>) -> (String, String) {
    if let Some(first) = message.from().and_then(|a| a.first()) {
        let address = first
            .address()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "Unknown Sender".to_string());
        let name = first
            .name()
            .map(|n| n.to_string())
            .unwrap_or_else(|| address.clone());
        (name, address)
    } else {
        ("Unknown Sender".to_string(), "Unknown Sender".to_string())
    }
}

/// Text for one attachment. Failures become placeholder text so sibling
/// attachments still process.
fn attachment_content(part: &MessagePart<'_>, filename: &str, depth: usize) -> String {
    // Nested mail first: message/rfc822 parts carry no useful extension.
    if part.is_message() {
        return nested_message(part, filename, depth);
    }

    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("eml") => nested_message(part, filename, depth),
        Some("txt") => match part.text_contents() {
            Some(text) => text.trim().to_string(),
            None => String::from_utf8_lossy(part.contents()).trim().to_string(),
        },
        Some("pdf") => match pdf_extract::extract_text_from_mem(part.contents()) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(filename, error = %e, "attachment extraction failed");
                format!("Error reading file: {e}")
            }
        },
        Some(other) => format!("Unsupported file type: .{other}"),
        None => "Unsupported file type: (no extension)".to_string(),
    }
}

/// Expand a nested message attachment, bounded by [`MAX_EML_DEPTH`].
fn nested_message(part: &MessagePart<'_>, filename: &str, depth: usize) -> String {
    if depth + 1 > MAX_EML_DEPTH {
        warn!(filename, depth, "nested message exceeds depth limit");
        return format!("Error reading file: message nesting deeper than {MAX_EML_DEPTH} levels");
    }
    if let Some(nested) = part.message() {
        return assemble_message(nested, depth + 1);
    }
    // A `.eml` shipped as an opaque binary attachment.
    match MessageParser::default().parse(part.contents()) {
        Some(nested) => assemble_message(&nested, depth + 1),
        None => {
            warn!(filename, "nested message failed to parse");
            format!("Error reading file: {filename} is not a parseable message")
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SIMPLE_EML: &[u8] = b"From: Alice Lender <alice@bank.example>\r\n\
To: servicing@bank.example\r\n\
Subject: Fee question\r\n\
MIME-Version: 1.0\r\n\
Content-Type: text/plain\r\n\
\r\n\
What is the ongoing fee for deal Apollo?\r\n";

    const MULTIPART_EML: &[u8] = b"From: Bob <bob@corp.example>\r\n\
Subject: Loan docs\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"XYZ\"\r\n\
\r\n\
--XYZ\r\n\
Content-Type: text/plain\r\n\
\r\n\
See attached.\r\n\
--XYZ\r\n\
Content-Type: text/plain\r\n\
Content-Disposition: attachment; filename=\"notes.txt\"\r\n\
\r\n\
hello from the attachment\r\n\
--XYZ\r\n\
Content-Type: application/octet-stream\r\n\
Content-Disposition: attachment; filename=\"report.docx\"\r\n\
\r\n\
binary-ish payload\r\n\
--XYZ--\r\n";

    #[test]
    fn txt_files_read_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mail.txt");
        fs::write(&path, "plain body\nsecond line").unwrap();
        assert_eq!(extract_text(&path).unwrap(), "plain body\nsecond line");
    }

    #[test]
    fn extracted_text_is_nfc_normalized() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mail.txt");
        // Decomposed e + combining acute comes back as a single code point.
        fs::write(&path, "cafe\u{301}").unwrap();
        assert_eq!(extract_text(&path).unwrap(), "caf\u{e9}");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let err = extract_text(&dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, IntakeError::Read { .. }));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mail.msg");
        fs::write(&path, "whatever").unwrap();
        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, IntakeError::UnsupportedFormat { .. }));
    }

    #[test]
    fn simple_eml_assembles_headers_and_body() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mail.eml");
        fs::write(&path, SIMPLE_EML).unwrap();

        let text = extract_text(&path).unwrap();
        assert!(text.starts_with("Subject: Fee question, Sender: Alice Lender, "));
        assert!(text.contains("EmailFrom: alice@bank.example"));
        assert!(text.contains("EmailBody: What is the ongoing fee for deal Apollo?"));
        assert!(text.ends_with("No Attachments"));
    }

    #[test]
    fn headerless_eml_falls_back_to_placeholders() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mail.eml");
        fs::write(&path, b"Subject: Only a subject\r\n\r\n").unwrap();

        let text = extract_text(&path).unwrap();
        assert!(text.contains("Sender: Unknown Sender"));
        assert!(text.contains("EmailFrom: Unknown Sender"));
        assert!(text.contains("EmailBody: No Content"));
    }

    #[test]
    fn attachments_become_named_blocks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mail.eml");
        fs::write(&path, MULTIPART_EML).unwrap();

        let text = extract_text(&path).unwrap();
        assert!(text.contains("EmailBody: See attached."));
        assert!(text.contains("Attachment Content:"));
        assert!(text.contains("Filename: notes.txt\nContent:\nhello from the attachment"));
    }

    #[test]
    fn unsupported_attachment_is_inline_placeholder_not_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mail.eml");
        fs::write(&path, MULTIPART_EML).unwrap();

        // The .docx placeholder sits inline; the .txt sibling still extracted.
        let text = extract_text(&path).unwrap();
        assert!(text.contains("Filename: report.docx\nContent:\nUnsupported file type: .docx"));
        assert!(text.contains("hello from the attachment"));
    }
}
