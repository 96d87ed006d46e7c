use std::{
    io::{Cursor, Read},
    path::Path,
};

use quick_xml::events::Event;
use serde::{Deserialize, Serialize};

use crate::error::ContextError;
pub use crate::error::ExtractionError;

/// The path of the main document part inside a DOCX container.
const DOCX_DOCUMENT_PART: &str = "word/document.xml";

/// The kinds of resume files text can be extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeFileType {
    Pdf,
    Docx,
}

impl ResumeFileType {
    /// Determines the type from the extension of the file name, ignoring its case.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractionError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Ok(ResumeFileType::Pdf),
            "docx" => Ok(ResumeFileType::Docx),
            _ => Err(ExtractionError::UnsupportedFileType(extension)),
        }
    }
}

/// The limits uploads are checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UploadLimits {
    pub max_file_size_bytes: usize,
    /// The least number of characters the trimmed text must have.
    pub min_text_characters: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        UploadLimits {
            max_file_size_bytes: 5 * 1024 * 1024,
            min_text_characters: 100,
        }
    }
}

/// The plain text of an uploaded resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedResume {
    pub filename: String,
    pub file_type: ResumeFileType,
    pub text: String,
}

/// Extracts the plain text of a PDF or DOCX resume.
///
/// The size limit is checked before anything else, even before the file type, and applies
/// again to the unpacked document part of a DOCX container. The minimum amount of text is
/// checked after extraction. The returned text is trimmed.
pub fn extract_text(
    file_bytes: &[u8],
    filename: &str,
    limits: &UploadLimits,
) -> Result<ExtractedResume, ExtractionError> {
    if file_bytes.len() > limits.max_file_size_bytes {
        return Err(ExtractionError::FileTooLarge {
            size: file_bytes.len(),
            limit: limits.max_file_size_bytes,
        });
    }
    let file_type = ResumeFileType::from_filename(filename)?;

    let raw_text = match file_type {
        ResumeFileType::Pdf => extract_pdf_text(file_bytes).map_err(ExtractionError::Malformed)?,
        ResumeFileType::Docx => extract_docx_text(file_bytes, limits.max_file_size_bytes)?,
    };

    let text = raw_text.trim().to_string();
    let characters = text.chars().count();
    if characters < limits.min_text_characters {
        return Err(ExtractionError::InsufficientText {
            characters,
            minimum: limits.min_text_characters,
        });
    }
    log::info!(
        "Extracted {} characters from the {:?} resume {:?}",
        characters,
        file_type,
        filename
    );

    Ok(ExtractedResume {
        filename: filename.to_string(),
        file_type,
        text,
    })
}

/// Extracts the text of every page, in page order, one page per line at least.
fn extract_pdf_text(file_bytes: &[u8]) -> Result<String, ContextError> {
    let pdf_document = lopdf::Document::load_mem(file_bytes)
        .map_err(|error| ContextError::with_error("Unable to parse the PDF document", &error))?;

    let mut page_texts = Vec::new();
    for page_number in pdf_document.get_pages().keys() {
        let page_text = pdf_document.extract_text(&[*page_number]).map_err(|error| {
            ContextError::with_error(
                format!("Unable to extract the text of the page {}", page_number),
                &error,
            )
        })?;
        page_texts.push(page_text);
    }
    log::debug!("Read {} pages of PDF text", page_texts.len());

    Ok(page_texts.join("\n"))
}

/// Reads the body of a DOCX document: the text runs of every paragraph, one paragraph per line.
///
/// The document part is never unpacked past `max_part_size` bytes, whatever size the
/// container declares for it.
fn extract_docx_text(file_bytes: &[u8], max_part_size: usize) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(file_bytes)).map_err(|error| {
        ExtractionError::Malformed(ContextError::with_error(
            "Unable to open the DOCX container",
            &error,
        ))
    })?;
    let document_part = archive.by_name(DOCX_DOCUMENT_PART).map_err(|error| {
        ExtractionError::Malformed(ContextError::with_error(
            format!("Unable to find {}", DOCX_DOCUMENT_PART),
            &error,
        ))
    })?;
    let declared_size = usize::try_from(document_part.size()).unwrap_or(usize::MAX);
    if declared_size > max_part_size {
        return Err(ExtractionError::FileTooLarge {
            size: declared_size,
            limit: max_part_size,
        });
    }

    let mut document_xml = Vec::new();
    document_part
        .take(max_part_size as u64 + 1)
        .read_to_end(&mut document_xml)
        .map_err(|error| {
            ExtractionError::Malformed(ContextError::with_error(
                format!("Unable to read {}", DOCX_DOCUMENT_PART),
                &error,
            ))
        })?;
    if document_xml.len() > max_part_size {
        return Err(ExtractionError::FileTooLarge {
            size: document_xml.len(),
            limit: max_part_size,
        });
    }
    log::debug!("Unpacked {} bytes of {}", document_xml.len(), DOCX_DOCUMENT_PART);

    docx_body_text(&document_xml).map_err(ExtractionError::Malformed)
}

/// Collects the text of the `w:t` runs of a WordprocessingML body.
fn docx_body_text(document_xml: &[u8]) -> Result<String, ContextError> {
    let mut reader = quick_xml::reader::Reader::from_reader(document_xml);
    // Whitespace inside text runs is significant
    reader.config_mut().trim_text(false);

    let mut text = String::new();
    let mut buffer = Vec::new();
    // Tabs and breaks only count inside a run, `w:tab` also declares tab stops in the
    // paragraph properties
    let mut in_run = false;
    let mut in_text_run = false;
    loop {
        match reader.read_event_into(&mut buffer) {
            Ok(Event::Start(element)) => match element.name().as_ref() {
                b"w:r" => in_run = true,
                b"w:t" => in_text_run = true,
                _ => {}
            },
            Ok(Event::Empty(element)) if in_run => match element.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::End(element)) => match element.name().as_ref() {
                b"w:r" => in_run = false,
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(element)) if in_text_run => {
                let run_text = reader.decoder().decode(&element).map_err(|error| {
                    ContextError::with_context(format!("Unable to decode a text run: {:?}", error))
                })?;
                text.push_str(&run_text);
            }
            Ok(Event::GeneralRef(element)) if in_text_run => {
                let entity_name = element.decode().map_err(|error| {
                    ContextError::with_context(format!("Unable to decode an entity: {:?}", error))
                })?;
                let entity = format!("&{};", entity_name);
                let resolved_entity = quick_xml::escape::unescape(&entity).map_err(|error| {
                    ContextError::with_error(format!("Unknown entity {}", entity), &error)
                })?;
                text.push_str(&resolved_entity);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(error) => {
                return Err(ContextError::with_error(
                    format!("Malformed DOCX body at byte {}", reader.buffer_position()),
                    &error,
                ))
            }
        }
        buffer.clear();
    }

    Ok(text)
}
