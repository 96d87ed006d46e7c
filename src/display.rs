use crate::geometry::Color;
use crate::metrics::BuiltinFont;

/// A single drawing operation. Coordinates are in points with the origin at the top left
/// corner of the page and the vertical axis pointing down, text is positioned by its baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fills an axis aligned rectangle.
    FillRectangle {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    /// Fills and strokes a rectangle with rounded corners.
    Card {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        fill: Color,
        border: Color,
    },
    Text {
        x: f32,
        baseline: f32,
        text: String,
        font: BuiltinFont,
        font_size: f32,
        color: Color,
    },
    /// Places the logo of the report, scaled to the given box.
    Logo {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

impl DrawCommand {
    /// The same command moved right by `dx` and down by `dy`.
    pub fn translated(&self, dx: f32, dy: f32) -> DrawCommand {
        let mut command = self.clone();
        match &mut command {
            DrawCommand::FillRectangle { x, y, .. }
            | DrawCommand::Card { x, y, .. }
            | DrawCommand::Logo { x, y, .. } => {
                *x += dx;
                *y += dy;
            }
            DrawCommand::Text { x, baseline, .. } => {
                *x += dx;
                *baseline += dy;
            }
        }
        command
    }
}

/// The drawing operations of one page, in painting order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayPage {
    pub commands: Vec<DrawCommand>,
}

impl DisplayPage {
    /// The strings drawn on the page, in painting order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// What a laid out block is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Header,
    ScoreCard,
    /// The whole two-column grid. Only recorded when the grid fits on one page, otherwise the
    /// cards are placed one by one.
    SectionGrid,
    /// One card of the grid, `index` is its position in the section list. A card taller than
    /// a page is recorded once per page it spans.
    SectionCard { index: usize, column: usize },
    FlaggedBanner,
    /// One flagged issue, or the part of it drawn on one page.
    FlaggedItem { index: usize },
    FixBanner,
    FixEntry { index: usize },
    Footer,
}

/// Where a block ended up: its page (starting from zero) and its vertical extent on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub kind: BlockKind,
    pub page: usize,
    pub top: f32,
    pub height: f32,
}

impl Placement {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// The outcome of the layout pass: the pages to paint and where every block went.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutReport {
    pub pages: Vec<DisplayPage>,
    pub placements: Vec<Placement>,
}

impl LaidOutReport {
    pub fn placements_of<'a>(
        &'a self,
        predicate: impl Fn(&BlockKind) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Placement> + 'a {
        self.placements
            .iter()
            .filter(move |placement| predicate(&placement.kind))
    }

    /// Whether the given string was drawn anywhere in the report.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.pages
            .iter()
            .any(|page| page.texts().any(|text| text == needle))
    }
}
