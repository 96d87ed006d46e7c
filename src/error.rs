use serde::{Deserialize, Serialize};

/// An error made of a context message and, possibly, the message of the error that caused it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ContextError {
    pub context: String,
    pub source_error: Option<String>,
}

impl std::fmt::Display for ContextError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source_error {
            Some(source_error) => write!(
                formatter,
                "{}: {}",
                self.context,
                minimize_first_letter(source_error)
            ),
            None => write!(formatter, "{}", self.context),
        }
    }
}

impl std::error::Error for ContextError {}

impl ContextError {
    /// Create a new `ContextError` with the given context.
    pub fn with_context<S: Into<String>>(context: S) -> ContextError {
        ContextError {
            context: context.into(),
            source_error: None,
        }
    }

    /// Create a new `ContextError` with the given context and source error.
    pub fn with_error<S: Into<String>>(context: S, error: &dyn std::error::Error) -> ContextError {
        ContextError {
            context: context.into(),
            source_error: Some(error.to_string()),
        }
    }
}

/// The two ways a report render can fail.
///
/// Input problems are reported with their full context so that the caller can fix the record,
/// while anything that goes wrong after validation collapses into `GenerationFailed`: the
/// details are logged where the failure happens and never leak to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// The feedback record is missing or has an invalid shape, nothing was rendered.
    InvalidRecord(ContextError),
    /// Rendering started but the document could not be produced.
    GenerationFailed,
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::InvalidRecord(error) => write!(formatter, "Invalid roast record: {}", error),
            ReportError::GenerationFailed => {
                write!(formatter, "Failed to generate PDF. Please try again.")
            }
        }
    }
}

impl std::error::Error for ReportError {}

/// The ways in which the text of an uploaded resume can fail to be extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The file is neither a PDF nor a DOCX document, the extension is attached.
    UnsupportedFileType(String),
    /// The file, or the document part unpacked from a DOCX container, is larger than the
    /// upload limit.
    FileTooLarge { size: usize, limit: usize },
    /// The extracted text is too short to be worth reviewing.
    InsufficientText { characters: usize, minimum: usize },
    /// The file claims a supported type but could not be parsed.
    Malformed(ContextError),
}

impl std::fmt::Display for ExtractionError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionError::UnsupportedFileType(extension) => write!(
                formatter,
                "Unsupported file type {:?}, please upload a PDF or DOCX",
                extension
            ),
            ExtractionError::FileTooLarge { size, limit } => write!(
                formatter,
                "File is too large ({} bytes, the maximum is {} bytes)",
                size, limit
            ),
            ExtractionError::InsufficientText {
                characters,
                minimum,
            } => write!(
                formatter,
                "Could not extract enough text from the resume ({} characters, at least {} are needed)",
                characters, minimum
            ),
            ExtractionError::Malformed(error) => write!(formatter, "{}", error),
        }
    }
}

impl std::error::Error for ExtractionError {}

/// Minimizes the first letter of a string, it is used for standardizing the error message.
fn minimize_first_letter(string: &str) -> String {
    let mut characters = string.chars();
    match characters.next() {
        None => String::new(),
        Some(character) => character.to_lowercase().chain(characters).collect(),
    }
}
