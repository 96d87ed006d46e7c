use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ContextError;

/// An RGB color with 8 bits per component.
pub type Color = [u8; 3];

/// The font sizes, in points, of each role text can play in the report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FontSizes {
    pub tiny: f32,
    pub small: f32,
    pub body: f32,
    pub label: f32,
    pub title: f32,
    pub main_title: f32,
    pub score: f32,
}

impl Default for FontSizes {
    fn default() -> Self {
        FontSizes {
            tiny: 7.0,
            small: 8.0,
            body: 9.0,
            label: 8.0,
            title: 10.0,
            main_title: 14.0,
            score: 20.0,
        }
    }
}

/// The colors used to paint the report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Palette {
    pub background: Color,
    pub card: Color,
    pub border: Color,
    pub text: Color,
    pub muted: Color,
    pub critique: Color,
    pub remedy: Color,
    pub primary: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            background: [252, 252, 252],
            card: [255, 255, 255],
            border: [228, 228, 228],
            text: [26, 26, 26],
            muted: [100, 100, 100],
            critique: [225, 100, 100],
            remedy: [52, 211, 153],
            primary: [220, 38, 38],
        }
    }
}

/// The fixed layout constants of the report, all lengths are expressed in points.
///
/// The defaults describe a portrait A4 page. A geometry is never mutated while a report
/// is being rendered, so one instance can be shared by any number of renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    /// Left, right and top margin.
    pub margin: f32,
    pub bottom_margin: f32,
    /// Vertical space between consecutive cards.
    pub gap: f32,
    pub column_gap: f32,
    pub card_padding: f32,
    pub corner_radius: f32,
    /// Space between a "Roast"/"Fix" label and the text below it.
    pub label_to_content_gap: f32,
    pub font_sizes: FontSizes,
    pub line_height_factor: f32,
    pub logo_width: f32,
    /// Height over width of the logo image.
    pub logo_aspect: f32,
    pub score_card_height: f32,
    /// Room kept free below the red flags banner so that it never ends a page alone.
    pub flagged_banner_reserve: f32,
    /// Room kept free below the fix list banner so that it never ends a page alone.
    pub fix_banner_reserve: f32,
    /// Distance of the footer baseline from the bottom edge of the page.
    pub footer_offset: f32,
    pub palette: Palette,
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry {
            page_width: 595.28,
            page_height: 841.89,
            margin: 20.0,
            bottom_margin: 36.0,
            gap: 10.0,
            column_gap: 10.0,
            card_padding: 12.0,
            corner_radius: 4.0,
            label_to_content_gap: 5.0,
            font_sizes: FontSizes::default(),
            line_height_factor: 1.32,
            logo_width: 160.0,
            logo_aspect: 630.0 / 1200.0,
            score_card_height: 42.0,
            flagged_banner_reserve: 120.0,
            fix_banner_reserve: 60.0,
            footer_offset: 14.0,
            palette: Palette::default(),
        }
    }
}

impl PageGeometry {
    /// Loads a geometry from a JSON file, the keys which are left out keep their default value.
    pub fn from_path(geometry_file_path: &Path) -> Result<Self, ContextError> {
        let geometry_file_contents = std::fs::read_to_string(geometry_file_path).map_err(|error| {
            ContextError::with_error(
                format!("Failed to read the geometry file {:?}", geometry_file_path),
                &error,
            )
        })?;
        let geometry: PageGeometry =
            serde_json::from_str(&geometry_file_contents).map_err(|error| {
                ContextError::with_error(
                    format!("Failed to parse the geometry file {:?}", geometry_file_path),
                    &error,
                )
            })?;
        geometry.validate()?;

        Ok(geometry)
    }

    /// Rejects geometries in which no content could ever be placed.
    pub fn validate(&self) -> Result<(), ContextError> {
        if self.content_width() <= 0.0 || self.column_width() <= 2.0 * self.card_padding {
            return Err(ContextError::with_context(format!(
                "The page width {} leaves no room for the content",
                self.page_width
            )));
        }
        if self.printable_bottom() <= self.margin {
            return Err(ContextError::with_context(format!(
                "The page height {} leaves no room for the content",
                self.page_height
            )));
        }
        if self.line_height_factor <= 0.0 {
            return Err(ContextError::with_context(format!(
                "Invalid line height factor {}",
                self.line_height_factor
            )));
        }

        Ok(())
    }

    /// The height of one line of text of the given font size.
    pub fn line_height(&self, font_size: f32) -> f32 {
        font_size * self.line_height_factor
    }

    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin * 2.0
    }

    /// The width of one column of the section grid.
    pub fn column_width(&self) -> f32 {
        (self.content_width() - self.column_gap) / 2.0
    }

    /// The lowest vertical offset content may reach on a page.
    pub fn printable_bottom(&self) -> f32 {
        self.page_height - self.bottom_margin
    }

    pub fn logo_height(&self) -> f32 {
        self.logo_width * self.logo_aspect
    }
}
