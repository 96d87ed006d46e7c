use std::{
    collections::{BTreeMap, BTreeSet},
    io::BufWriter,
    mem,
};

use lopdf::{content::Operation, Object, StringFormat};
use time::OffsetDateTime;
use unicode_normalization::UnicodeNormalization as _;

use crate::error::ContextError;
use crate::geometry::Color;
use crate::logo::Logo;
use crate::metrics::{encode_character, is_encodable, BuiltinFont};

/// Control point distance which approximates a quarter circle with a cubic Bézier curve.
const BEZIER_CIRCLE_FACTOR: f32 = 0.552_284_8;

/// Width of the border stroked around cards.
const CARD_BORDER_WIDTH: f32 = 0.75;

/// One layer of PDF data, which is a sequence of content stream operations.
#[derive(Debug, Clone)]
pub struct PdfLayer {
    /// Name of the layer, only used to identify it while debugging.
    pub(crate) name: String,
    /// Stream operations of this layer.
    pub(crate) operations: Vec<Operation>,
}

impl PdfLayer {
    /// Encodes the operations of the layer, isolated in their own graphics state block.
    fn encode(&self) -> Result<Vec<u8>, ContextError> {
        let mut operations = Vec::with_capacity(self.operations.len() + 2);
        // The q/Q pair saves and restores the graphics state, so that the colors and
        // transformations of a layer don't leak into the following one
        operations.push(Operation::new("q", vec![]));
        operations.extend(self.operations.iter().cloned());
        operations.push(Operation::new("Q", vec![]));

        lopdf::content::Content { operations }
            .encode()
            .map_err(|error| {
                ContextError::with_error(
                    format!("Failed to encode the content of the layer {:?}", self.name),
                    &error,
                )
            })
    }
}

/// The representation of a PDF page. Sizes are expressed in points and positions follow the
/// PDF convention, with the origin at the bottom left corner.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// The number of the page in the document, starting from one.
    pub(crate) number: usize,
    pub width: f32,
    pub height: f32,
    pub layers: Vec<PdfLayer>,
    /// The images referenced by the page, by resource name.
    pub(crate) images: BTreeMap<String, lopdf::ObjectId>,
}

/// This struct represents the actual PDF document on a high-level. It is an interface to the
/// underlying `lopdf::Document` which keeps track of the pages, the fonts in use and the
/// images embedded in the document.
///
/// Pages and layers are addressed by index: `add_page_with_layer` returns the indices to pass
/// to the drawing functions, such as `write_text_to_layer_in_page`.
pub struct PdfDocument {
    /// The standard fonts used by at least one text operation.
    fonts: BTreeSet<BuiltinFont>,
    /// The underlying PDF document: this is a low-level interface and shouldn't be directly interacted with
    /// unless strictly necessary.
    pub inner_document: lopdf::Document,
    /// The identifier of the document, it is used in order to set the PDF `ID` tag.
    pub identifier: String,
    /// The title stored in the document information dictionary.
    pub title: String,
    pub(crate) pages: Vec<PdfPage>,
    /// The images embedded so far, the name is used to reference them from the pages.
    images: Vec<(String, lopdf::ObjectId)>,
}

impl PdfDocument {
    /// Create a new `PdfDocument` based on version 1.5 of the PDF specification.
    pub fn new<S: Into<String>>(pdf_document_identifier: S) -> Self {
        let identifier = pdf_document_identifier.into();
        PdfDocument {
            fonts: BTreeSet::new(),
            inner_document: lopdf::Document::with_version("1.5"),
            title: identifier.clone(),
            identifier,
            pages: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Sets the title stored in the document information dictionary.
    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = title.into();
        self
    }

    /// The number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Adds a page of given width and height in points with an empty layer for contents to be added to.
    /// Returns the index of the page and of the layer in the page.
    pub fn add_page_with_layer(&mut self, page_width: f32, page_height: f32) -> (usize, usize) {
        let pdf_page = PdfPage {
            number: self.pages.len() + 1,
            width: page_width,
            height: page_height,
            layers: vec![PdfLayer {
                name: "Layer0".into(),
                operations: Vec::new(),
            }],
            images: BTreeMap::new(),
        };
        self.pages.push(pdf_page);

        (self.pages.len() - 1, 0)
    }

    /// Fills a rectangle whose bottom left corner is at `position`.
    pub fn fill_rectangle_in_page(
        &mut self,
        page_index: usize,
        layer_index: usize,
        position: [f32; 2],
        size: [f32; 2],
        color: Color,
    ) -> Result<(), ContextError> {
        let [x, y] = position;
        let [width, height] = size;
        self.add_operations_to_layer_in_page(
            layer_index,
            page_index,
            vec![
                fill_color_operation(color),
                Operation::new(
                    "re",
                    vec![x.into(), y.into(), width.into(), height.into()],
                ),
                Operation::new("f", vec![]),
            ],
        )
    }

    /// Fills and strokes a rectangle with rounded corners whose bottom left corner is at `position`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_rounded_rectangle_in_page(
        &mut self,
        page_index: usize,
        layer_index: usize,
        position: [f32; 2],
        size: [f32; 2],
        radius: f32,
        fill: Color,
        border: Color,
    ) -> Result<(), ContextError> {
        let [x, y] = position;
        let [width, height] = size;
        let radius = radius.clamp(0.0, width.min(height) / 2.0);
        let control = radius * BEZIER_CIRCLE_FACTOR;

        let point = |operator: &str, coordinates: &[f32]| {
            Operation::new(
                operator,
                coordinates.iter().map(|value| (*value).into()).collect(),
            )
        };
        let (left, bottom, right, top) = (x, y, x + width, y + height);

        let mut operations = vec![
            fill_color_operation(fill),
            stroke_color_operation(border),
            Operation::new("w", vec![CARD_BORDER_WIDTH.into()]),
            point("m", &[left + radius, bottom]),
            point("l", &[right - radius, bottom]),
        ];
        // Walk around the rectangle counterclockwise, rounding each corner with a curve
        operations.extend([
            point(
                "c",
                &[right - radius + control, bottom, right, bottom + radius - control, right, bottom + radius],
            ),
            point("l", &[right, top - radius]),
            point(
                "c",
                &[right, top - radius + control, right - radius + control, top, right - radius, top],
            ),
            point("l", &[left + radius, top]),
            point(
                "c",
                &[left + radius - control, top, left, top - radius + control, left, top - radius],
            ),
            point("l", &[left, bottom + radius]),
            point(
                "c",
                &[left, bottom + radius - control, left + radius - control, bottom, left + radius, bottom],
            ),
            Operation::new("h", vec![]),
            // Fill and stroke the path
            Operation::new("B", vec![]),
        ]);

        self.add_operations_to_layer_in_page(layer_index, page_index, operations)
    }

    /// Writes the text in the specified font and color, with the baseline starting at `caret_position`.
    /// Characters which can't be represented by the standard fonts are replaced by a question mark.
    #[allow(clippy::too_many_arguments)]
    pub fn write_text_to_layer_in_page(
        &mut self,
        page_index: usize,
        layer_index: usize,
        color: Color,
        text: &str,
        font: BuiltinFont,
        font_size: f32,
        caret_position: [f32; 2],
    ) -> Result<(), ContextError> {
        let mut text_bytes = Vec::with_capacity(text.len());
        // Normalize the text in the NFC form so that composed characters map onto Latin-1
        for character in text.nfc() {
            if !is_encodable(character) {
                log::warn!(
                    "Unable to encode the character {:?} with the standard fonts, replacing it",
                    character
                );
            }
            text_bytes.push(encode_character(character));
        }
        self.fonts.insert(font);

        let [x, y] = caret_position;
        self.add_operations_to_layer_in_page(
            layer_index,
            page_index,
            vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![
                        Object::Name(font.resource_name().as_bytes().to_vec()),
                        font_size.into(),
                    ],
                ),
                Operation::new("Td", vec![x.into(), y.into()]),
                fill_color_operation(color),
                Operation::new(
                    "Tj",
                    vec![Object::String(text_bytes, StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ],
        )
    }

    /// Embeds the image into the document and returns the name to reference it with.
    pub fn add_image(&mut self, logo: &Logo) -> String {
        let image_name = format!("Im{}", self.images.len() + 1);

        let mut image_dictionary = lopdf::Dictionary::from_iter(vec![
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(logo.width as i64)),
            ("Height", Object::Integer(logo.height as i64)),
            ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
            ("BitsPerComponent", Object::Integer(8)),
        ]);
        if let Some(alpha) = &logo.alpha {
            // The transparency of the image is described by a grayscale image of the same size
            let soft_mask_dictionary = lopdf::Dictionary::from_iter(vec![
                ("Type", Object::Name(b"XObject".to_vec())),
                ("Subtype", Object::Name(b"Image".to_vec())),
                ("Width", Object::Integer(logo.width as i64)),
                ("Height", Object::Integer(logo.height as i64)),
                ("ColorSpace", Object::Name(b"DeviceGray".to_vec())),
                ("BitsPerComponent", Object::Integer(8)),
            ]);
            let soft_mask_id = self
                .inner_document
                .add_object(lopdf::Stream::new(soft_mask_dictionary, alpha.clone()));
            image_dictionary.set("SMask", Object::Reference(soft_mask_id));
        }
        let image_id = self
            .inner_document
            .add_object(lopdf::Stream::new(image_dictionary, logo.rgb.clone()));

        self.images.push((image_name.clone(), image_id));
        image_name
    }

    /// Draws a previously added image scaled to the box whose bottom left corner is at `position`.
    pub fn place_image_in_page(
        &mut self,
        page_index: usize,
        layer_index: usize,
        image_name: &str,
        position: [f32; 2],
        size: [f32; 2],
    ) -> Result<(), ContextError> {
        let image_id = self
            .images
            .iter()
            .find(|(name, _)| name == image_name)
            .map(|(_, image_id)| *image_id)
            .ok_or(ContextError::with_context(format!(
                "Failed to find the image {:?}",
                image_name
            )))?;
        self.get_mut_page(page_index)?
            .images
            .insert(image_name.to_string(), image_id);

        let [x, y] = position;
        let [width, height] = size;
        self.add_operations_to_layer_in_page(
            layer_index,
            page_index,
            vec![
                Operation::new("q", vec![]),
                // Images are painted in the unit square, the transformation scales and moves it
                Operation::new(
                    "cm",
                    vec![
                        width.into(),
                        0.into(),
                        0.into(),
                        height.into(),
                        x.into(),
                        y.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(image_name.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        )
    }

    /// Write the pages so far specified to the PDF document and finalize it.
    ///
    /// The instance ID is the second half of the PDF `ID` tag. The creation and modification
    /// dates are pinned to the Unix epoch, so that the same pages always give the same bytes.
    pub fn write_all(&mut self, instance_id: &str) -> Result<(), ContextError> {
        use lopdf::Object::*;
        use lopdf::StringFormat::*;

        if self.pages.is_empty() {
            return Err(ContextError::with_context(
                "Unable to write a PDF document without pages",
            ));
        }

        let pdf_timestamp = to_pdf_timestamp_format(&OffsetDateTime::UNIX_EPOCH);
        let document_info = lopdf::Dictionary::from_iter(vec![
            ("Trapped", "False".into()),
            ("CreationDate", String(pdf_timestamp.clone().into_bytes(), Literal)),
            ("ModDate", String(pdf_timestamp.into_bytes(), Literal)),
            ("Title", String(self.title.clone().into_bytes(), Literal)),
            ("Creator", String(b"roast-report".to_vec(), Literal)),
            ("Producer", String(b"roast-report".to_vec(), Literal)),
            (
                "Identifier",
                String(self.identifier.clone().into_bytes(), Literal),
            ),
        ]);
        let document_info_id = self.inner_document.add_object(Dictionary(document_info));

        // Construct the catalog, required by the PDF specification
        let pages_id = self.inner_document.new_object_id();
        let catalog = lopdf::Dictionary::from_iter(vec![
            ("Type", "Catalog".into()),
            ("PageLayout", "OneColumn".into()),
            ("PageMode", "UseNone".into()),
            ("Pages", Reference(pages_id)),
        ]);
        let catalog_id = self.inner_document.add_object(catalog);
        self.inner_document.trailer.set("Root", Reference(catalog_id));
        self.inner_document
            .trailer
            .set("Info", Reference(document_info_id));
        self.inner_document.trailer.set(
            "ID",
            Array(vec![
                String(self.identifier.clone().into_bytes(), Literal),
                String(instance_id.as_bytes().to_vec(), Literal),
            ]),
        );

        let fonts_dictionary = self.insert_fonts_into_document();

        let mut page_ids = Vec::<Object>::new();
        for page in self.pages.iter() {
            let mut resources_dictionary =
                lopdf::Dictionary::from_iter(vec![("Font", Dictionary(fonts_dictionary.clone()))]);
            if !page.images.is_empty() {
                let xobjects_dictionary: lopdf::Dictionary = page
                    .images
                    .iter()
                    .map(|(name, image_id)| (name.clone(), Reference(*image_id)))
                    .collect();
                resources_dictionary.set("XObject", Dictionary(xobjects_dictionary));
            }

            // Merge the streams of the individual layers into the single content stream of the page
            let mut merged_layer_streams = Vec::<u8>::new();
            for layer in page.layers.iter() {
                merged_layer_streams.append(&mut layer.encode()?);
            }
            let page_content_id = self.inner_document.add_object(lopdf::Stream::new(
                lopdf::Dictionary::new(),
                merged_layer_streams,
            ));

            let media_box: Object = vec![0.into(), 0.into(), page.width.into(), page.height.into()].into();
            let page_dictionary = lopdf::Dictionary::from_iter(vec![
                ("Type", "Page".into()),
                ("Rotate", Integer(0)),
                ("MediaBox", media_box.clone()),
                ("CropBox", media_box),
                ("Parent", Reference(pages_id)),
                ("Resources", Dictionary(resources_dictionary)),
                ("Contents", Reference(page_content_id)),
            ]);
            let page_id = self.inner_document.add_object(page_dictionary);
            log::debug!("Wrote page {} of {:?}", page.number, self.identifier);
            page_ids.push(Reference(page_id));
        }

        let pages = lopdf::Dictionary::from_iter(vec![
            ("Type", "Pages".into()),
            ("Count", Integer(self.pages.len() as i64)),
            ("Kids", Array(page_ids)),
        ]);
        self.inner_document
            .objects
            .insert(pages_id, Dictionary(pages));

        Ok(())
    }

    /// Optimize the PDF document (only superficially), this also compresses every stream.
    pub fn optimize(&mut self) {
        self.inner_document.prune_objects();
        self.inner_document.delete_zero_length_streams();
        self.inner_document.renumber_objects();
        self.inner_document.compress();
    }

    /// Save the `PdfDocument` to bytes in order for it to be written to a file or further processed.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, ContextError> {
        let mut pdf_document_bytes = Vec::new();
        let mut writer = BufWriter::new(&mut pdf_document_bytes);
        self.inner_document.save_to(&mut writer).map_err(|error| {
            ContextError::with_error("Error while saving the PDF document to bytes", &error)
        })?;
        mem::drop(writer);

        Ok(pdf_document_bytes)
    }

    /// Inserts a font dictionary for every font in use and returns the dictionary which maps
    /// the resource names onto them.
    fn insert_fonts_into_document(&mut self) -> lopdf::Dictionary {
        let mut fonts_dictionary = lopdf::Dictionary::new();
        for font in self.fonts.iter() {
            let font_dictionary = lopdf::Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Font".to_vec())),
                ("Subtype", Object::Name(b"Type1".to_vec())),
                (
                    "BaseFont",
                    Object::Name(font.base_font_name().as_bytes().to_vec()),
                ),
                ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
            ]);
            let font_id = self
                .inner_document
                .add_object(Object::Dictionary(font_dictionary));
            fonts_dictionary.set(font.resource_name(), Object::Reference(font_id));
        }

        fonts_dictionary
    }

    /// This function is responsible for adding the given operations to the specified layer and page.
    fn add_operations_to_layer_in_page(
        &mut self,
        layer_index: usize,
        page_index: usize,
        operations: Vec<Operation>,
    ) -> Result<(), ContextError> {
        let pdf_page = self.get_mut_page(page_index)?;
        let pdf_layer = pdf_page
            .layers
            .get_mut(layer_index)
            .ok_or(ContextError::with_context(format!(
                "Failed to find the layer with index {}",
                layer_index
            )))?;
        pdf_layer.operations.extend(operations);

        Ok(())
    }

    fn get_mut_page(&mut self, page_index: usize) -> Result<&mut PdfPage, ContextError> {
        self.pages
            .get_mut(page_index)
            .ok_or(ContextError::with_context(format!(
                "Failed to find the page with index {}",
                page_index
            )))
    }
}

fn fill_color_operation(color: Color) -> Operation {
    Operation::new("rg", color_operands(color))
}

fn stroke_color_operation(color: Color) -> Operation {
    Operation::new("RG", color_operands(color))
}

fn color_operands(color: Color) -> Vec<Object> {
    color
        .iter()
        .map(|component| Object::Real(*component as f32 / 255.0))
        .collect()
}

/// Formats the given time so that it matches what the PDF specification expects.
/// An example of it is the following: D:20170505150224+02'00'.
fn to_pdf_timestamp_format(date: &OffsetDateTime) -> String {
    let offset = date.offset();
    let offset_sign = if offset.is_negative() { '-' } else { '+' };
    format!(
        "D:{:04}{:02}{:02}{:02}{:02}{:02}{offset_sign}{:02}'{:02}'",
        date.year(),
        u8::from(date.month()),
        date.day(),
        date.hour(),
        date.minute(),
        date.second(),
        offset.whole_hours().abs(),
        offset.minutes_past_hour().abs(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_timestamp_is_formatted_for_pdf() {
        assert_eq!(
            to_pdf_timestamp_format(&OffsetDateTime::UNIX_EPOCH),
            "D:19700101000000+00'00'"
        );
    }

    #[test]
    fn documents_without_pages_are_rejected() {
        let mut pdf_document = PdfDocument::new("empty");
        assert!(pdf_document.write_all("instance").is_err());
    }

    #[test]
    fn drawing_on_a_missing_page_fails() {
        let mut pdf_document = PdfDocument::new("missing");
        let result = pdf_document.fill_rectangle_in_page(3, 0, [0.0, 0.0], [1.0, 1.0], [0, 0, 0]);
        assert!(result.is_err());
    }

    #[test]
    fn written_documents_can_be_loaded_back() {
        let mut pdf_document = PdfDocument::new("round-trip");
        let (page_index, layer_index) = pdf_document.add_page_with_layer(200.0, 100.0);
        pdf_document
            .fill_rectangle_in_page(page_index, layer_index, [0.0, 0.0], [200.0, 100.0], [252, 252, 252])
            .unwrap();
        pdf_document
            .write_text_to_layer_in_page(
                page_index,
                layer_index,
                [26, 26, 26],
                "Hello (world)",
                BuiltinFont::HelveticaBold,
                12.0,
                [10.0, 50.0],
            )
            .unwrap();
        pdf_document.write_all("instance").unwrap();
        pdf_document.optimize();
        let pdf_document_bytes = pdf_document.save_to_bytes().unwrap();

        let loaded_document = lopdf::Document::load_mem(&pdf_document_bytes).unwrap();
        assert_eq!(loaded_document.get_pages().len(), 1);
    }
}
