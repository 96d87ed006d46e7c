//! Roast Report turns the structured feedback of a resume review into a downloadable PDF.
//!
//! The entry point is `report::render_report`, which takes a `FeedbackRecord` and a
//! `PageGeometry` and returns the bytes of the finished document. Rendering happens in two
//! passes: the `layout` module measures and places every block of the report into pages of
//! draw commands, then the `report` module paints those pages through `PdfDocument`. The
//! intermediate display list is public so that the placement of every block can be inspected
//! without decoding any PDF.
//!
//! Next to the report itself the crate hosts two small utilities of the review flow: the
//! extraction of the plain text of uploaded PDF and DOCX resumes, and the policy which decides
//! whether a user may start a new review.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

/// Who may start a new review.
///
/// `AccessPolicy` is an explicit configuration object built once per process, usually with
/// `AccessPolicy::from_env`, and passed by reference to `AccessPolicy::allowance`. Users whose
/// email is on the unlimited list and users on a paid plan are always allowed, the free plan
/// only includes a fixed number of completed reports.
pub mod access;

/// The display list produced by the layout pass: pages of `DrawCommand`s together with the
/// `Placement` of every block.
pub mod display;

/// This module contains the `ContextError` type which is the error type used throughout this library,
/// along with the errors surfaced by the two public operations of the crate.
///
/// `ContextError` carries a context message and, if the failure was propagated from another
/// library, the message of the original error. `ReportError` and `ExtractionError` are the
/// errors callers are expected to match on.
pub mod error;

/// Extraction of the plain text of uploaded resumes.
///
/// PDF files are read with `lopdf`, DOCX files are opened as zip containers and the body of
/// `word/document.xml` is walked with `quick-xml`. The `UploadLimits` are enforced on the way.
pub mod extract;

/// The `FeedbackRecord` rendered into a report, as stored in JSON.
pub mod feedback;

/// The fixed page geometry of the report: page size, margins, gaps, font sizes and colors.
///
/// The defaults describe the A4 report, a different geometry can be loaded from a JSON file
/// with `PageGeometry::from_path`.
pub mod geometry;

/// The layout engine of the report.
///
/// # Introduction
///
/// `ReportLayout` walks the report from top to bottom with a `LayoutCursor`. Each `render_*`
/// method measures its block, asks `ReportLayout::ensure_space` whether it fits on the current
/// page and then draws it, so page breaks are only ever decided before something is drawn.
/// Every new page starts with its background fill.
///
/// The three critique sections are laid out in a two-column grid: the first and third one go
/// to the left column and the second one to the right column. The grid is measured as a whole
/// and kept on one page whenever it fits, while the entries of the red flags and of the fix
/// list can each go on a new page on their own. Blocks taller than a page are broken between
/// two lines of text, so nothing is ever drawn below the bottom margin.
pub mod layout;

pub mod logo;

/// Word wrapping and measurement of text blocks.
pub mod measure;

/// Font metrics of the two standard fonts the report is typeset in.
pub mod metrics;

/// The module were the `PdfDocument` interface for working with PDF documents is presented.
///
/// # Introduction
///
/// The main component of this module is the struct `PdfDocument`. It offers the convenience
/// functions `add_page_with_layer`, `fill_rectangle_in_page`, `draw_rounded_rectangle_in_page`,
/// `write_text_to_layer_in_page`, `add_image`, `write_all` and `save_to_bytes`, which allow
/// to build a PDF document while keeping the details of the format behind private methods.
///
/// Documents are fully deterministic: the identifier, the instance ID and the dates of the
/// document are all derived from the input, so that the same pages always give the same bytes.
pub mod pdf;

/// Rendering of a `FeedbackRecord` into a `RenderedReport`.
pub mod report;

pub use error::{ContextError, ExtractionError, ReportError};
pub use feedback::{CritiquePair, FeedbackRecord};
pub use geometry::PageGeometry;
pub use report::{render_report, render_report_from_json, RenderedReport};
