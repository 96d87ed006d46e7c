use crate::display::{DrawCommand, LaidOutReport};
use crate::error::ContextError;
pub use crate::error::ReportError;
use crate::feedback::FeedbackRecord;
use crate::geometry::PageGeometry;
use crate::layout::layout_report;
use crate::logo::Logo;
use crate::pdf::PdfDocument;

/// The content type of every rendered report.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A finished report, ready to be served as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    /// The suggested name of the downloaded file, `roast-<id>.pdf`.
    pub filename: String,
}

/// Renders the feedback record into a PDF document.
///
/// The record and the geometry are validated first and any problem with them is reported as
/// `ReportError::InvalidRecord`. From then on every failure is logged and surfaced as
/// `ReportError::GenerationFailed`, no partially rendered document is ever returned. When
/// the logo is `None` the header falls back to the title in bold text.
pub fn render_report(
    record: &FeedbackRecord,
    geometry: &PageGeometry,
    logo: Option<&Logo>,
) -> Result<RenderedReport, ReportError> {
    record.validate().map_err(ReportError::InvalidRecord)?;
    geometry.validate().map_err(ReportError::InvalidRecord)?;

    let laid_out_report = layout_report(record, geometry, logo.is_some());
    let bytes = paint_report(record, &laid_out_report, geometry, logo).map_err(|error| {
        log::error!("Failed to generate the PDF of the roast {:?}: {}", record.id, error);
        ReportError::GenerationFailed
    })?;
    log::info!(
        "Rendered the roast {:?} on {} pages ({} bytes)",
        record.id,
        laid_out_report.pages.len(),
        bytes.len()
    );

    Ok(RenderedReport {
        bytes,
        content_type: PDF_CONTENT_TYPE,
        filename: format!("roast-{}.pdf", record.id),
    })
}

/// Parses the record from its stored JSON representation and renders it.
pub fn render_report_from_json(
    record_bytes: &[u8],
    geometry: &PageGeometry,
    logo: Option<&Logo>,
) -> Result<RenderedReport, ReportError> {
    let record = FeedbackRecord::from_json(record_bytes).map_err(ReportError::InvalidRecord)?;
    render_report(&record, geometry, logo)
}

/// Writes the display list into a PDF document, converting the top-down coordinates of the
/// layout into the bottom-up coordinates of PDF.
fn paint_report(
    record: &FeedbackRecord,
    laid_out_report: &LaidOutReport,
    geometry: &PageGeometry,
    logo: Option<&Logo>,
) -> Result<Vec<u8>, ContextError> {
    let mut pdf_document =
        PdfDocument::new(record.id.clone()).with_title(format!("Roast {}", record.id));
    let logo_name = logo.map(|logo| pdf_document.add_image(logo));
    let page_height = geometry.page_height;

    for display_page in laid_out_report.pages.iter() {
        let (page_index, layer_index) =
            pdf_document.add_page_with_layer(geometry.page_width, page_height);

        for command in display_page.commands.iter() {
            match command {
                DrawCommand::FillRectangle {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => pdf_document.fill_rectangle_in_page(
                    page_index,
                    layer_index,
                    [*x, page_height - y - height],
                    [*width, *height],
                    *color,
                )?,
                DrawCommand::Card {
                    x,
                    y,
                    width,
                    height,
                    radius,
                    fill,
                    border,
                } => pdf_document.draw_rounded_rectangle_in_page(
                    page_index,
                    layer_index,
                    [*x, page_height - y - height],
                    [*width, *height],
                    *radius,
                    *fill,
                    *border,
                )?,
                DrawCommand::Text {
                    x,
                    baseline,
                    text,
                    font,
                    font_size,
                    color,
                } => pdf_document.write_text_to_layer_in_page(
                    page_index,
                    layer_index,
                    *color,
                    text,
                    *font,
                    *font_size,
                    [*x, page_height - baseline],
                )?,
                DrawCommand::Logo {
                    x,
                    y,
                    width,
                    height,
                } => {
                    let logo_name = logo_name.as_deref().ok_or(ContextError::with_context(
                        "The layout placed a logo but none was supplied",
                    ))?;
                    pdf_document.place_image_in_page(
                        page_index,
                        layer_index,
                        logo_name,
                        [*x, page_height - y - height],
                        [*width, *height],
                    )?
                }
            }
        }
    }

    // The instance half of the document ID only depends on the record, so that rendering the
    // same record twice gives the same bytes
    let instance_id = format!("{}-{}", record.id, laid_out_report.pages.len());
    pdf_document.write_all(&instance_id)?;
    pdf_document.optimize();
    pdf_document.save_to_bytes()
}
