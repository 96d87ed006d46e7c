use crate::display::{BlockKind, DisplayPage, DrawCommand, LaidOutReport, Placement};
use crate::feedback::{format_score, CritiquePair, FeedbackRecord, NamedSection};
use crate::geometry::{Color, PageGeometry};
use crate::measure::{measure, MeasuredBlock};
use crate::metrics::BuiltinFont;

const FALLBACK_TITLE: &str = "Roast My Resume";
const REPORT_TITLE: &str = "Roast results";
const SCORE_TITLE: &str = "Overall Roast Score";
const SCORE_CAPTION: &str = "Higher is less terrible (allegedly)";
const SCORE_SUFFIX: &str = "/ 100";
const CRITIQUE_LABEL: &str = "Roast";
const REMEDY_LABEL: &str = "Fix";
const FLAGGED_TITLE: &str = "Red flags";
const FIX_LIST_TITLE: &str = "Top 5 things to fix";
const FOOTER_TEXT: &str = "Generated by Roast My Resume";

/// Space below a card title.
const TITLE_GAP: f32 = 3.0;
/// Space between the critique text and the remedy label.
const PAIR_GAP: f32 = 2.0;
/// Space below the last remedy of a flagged issue.
const FLAGGED_ITEM_GAP: f32 = 6.0;
/// Space below the main title.
const MAIN_TITLE_GAP: f32 = 2.0;
/// Space between the logo and the identifier line.
const LOGO_GAP: f32 = 6.0;

/// Where the next block goes: the vertical offset from the top of the current page and the
/// number of pages started so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub y: f32,
    pub page_count: usize,
}

impl LayoutCursor {
    /// The index of the page the cursor is on.
    pub fn page_index(&self) -> usize {
        self.page_count.saturating_sub(1)
    }

    fn advanced_by(self, height: f32) -> Self {
        LayoutCursor {
            y: self.y + height,
            ..self
        }
    }
}

/// Lays a roast report out into pages of draw commands.
///
/// Every render owns its own `ReportLayout`. Blocks are measured and placed strictly in
/// document order, and `ensure_space` is the only place where pages are broken.
pub struct ReportLayout<'a> {
    geometry: &'a PageGeometry,
    pages: Vec<DisplayPage>,
    placements: Vec<Placement>,
}

impl<'a> ReportLayout<'a> {
    pub fn new(geometry: &'a PageGeometry) -> Self {
        ReportLayout {
            geometry,
            pages: Vec::new(),
            placements: Vec::new(),
        }
    }

    /// Starts the first page and returns the cursor at its top margin.
    pub fn begin(&mut self) -> LayoutCursor {
        self.start_page();
        LayoutCursor {
            y: self.geometry.margin,
            page_count: self.pages.len(),
        }
    }

    /// Makes sure a block of the given height fits below the cursor, starting a new page
    /// when it would cross the bottom margin.
    pub fn ensure_space(&mut self, cursor: LayoutCursor, needed_height: f32) -> LayoutCursor {
        let printable_bottom = self.geometry.printable_bottom();
        if cursor.y + needed_height <= printable_bottom {
            return cursor;
        }
        let printable_height = printable_bottom - self.geometry.margin;
        if needed_height > printable_height {
            log::warn!(
                "A block of {:.1}pt does not fit in the printable area of {:.1}pt, it will overflow",
                needed_height,
                printable_height
            );
        }
        if cursor.y <= self.geometry.margin {
            // The page is still empty, a new one would not offer more room
            return cursor;
        }

        self.start_page();
        log::debug!(
            "Started page {} for a block of {:.1}pt at {:.1}pt",
            self.pages.len(),
            needed_height,
            cursor.y
        );
        LayoutCursor {
            y: self.geometry.margin,
            page_count: self.pages.len(),
        }
    }

    /// Draws the logo (or the title when there is none), the identifier, the report title and
    /// the one-line summary.
    pub fn render_header(
        &mut self,
        cursor: LayoutCursor,
        identifier: &str,
        summary: &str,
        has_logo: bool,
    ) -> LayoutCursor {
        let geometry = self.geometry;
        let font_sizes = geometry.font_sizes;
        let palette = geometry.palette;

        let logo_row = if has_logo {
            Row {
                height: geometry.logo_height() + LOGO_GAP,
                commands: vec![DrawCommand::Logo {
                    x: (geometry.page_width - geometry.logo_width) / 2.0,
                    y: -2.0,
                    width: geometry.logo_width,
                    height: geometry.logo_height(),
                }],
            }
        } else {
            Row::text(
                geometry.logo_height() + LOGO_GAP,
                geometry.margin,
                12.0,
                FALLBACK_TITLE,
                BuiltinFont::HelveticaBold,
                font_sizes.main_title,
                palette.primary,
            )
        };
        let mut rows = vec![
            logo_row,
            Row::text(
                geometry.line_height(font_sizes.tiny),
                geometry.margin,
                0.0,
                format!("Roast ID: {}", identifier),
                BuiltinFont::Helvetica,
                font_sizes.tiny,
                palette.muted,
            ),
            Row::text(
                geometry.line_height(font_sizes.main_title) + MAIN_TITLE_GAP,
                geometry.margin,
                0.0,
                REPORT_TITLE,
                BuiltinFont::HelveticaBold,
                font_sizes.main_title,
                palette.text,
            ),
        ];
        let summary_rows = self.wrapped_rows(summary, geometry.content_width(), palette.muted);
        rows.extend(summary_rows.iter().map(|row| row.shifted(geometry.margin)));

        let cursor = self.place_rows(BlockKind::Header, cursor, 0.0, None, &rows, 0.0);
        cursor.advanced_by(geometry.gap)
    }

    /// Draws the fixed-height card with the overall score.
    pub fn render_score_card(&mut self, cursor: LayoutCursor, score: f64) -> LayoutCursor {
        let geometry = self.geometry;
        let font_sizes = geometry.font_sizes;
        let palette = geometry.palette;
        let card_height = geometry.score_card_height;

        let cursor = self.ensure_space(cursor, card_height);
        let y = cursor.y;
        self.card(geometry.margin, y, geometry.content_width(), card_height, palette.primary);

        let inner_x = geometry.margin + geometry.card_padding;
        self.text(inner_x, y + 14.0, SCORE_TITLE, BuiltinFont::HelveticaBold, font_sizes.small, palette.text);
        let caption_width = BuiltinFont::Helvetica.text_width(SCORE_CAPTION, font_sizes.tiny);
        self.text(
            geometry.page_width - geometry.margin - geometry.card_padding - caption_width,
            y + 14.0,
            SCORE_CAPTION,
            BuiltinFont::Helvetica,
            font_sizes.tiny,
            palette.muted,
        );

        let score_text = format_score(score);
        let score_width = BuiltinFont::HelveticaBold.text_width(&score_text, font_sizes.score);
        self.text(inner_x, y + 34.0, score_text, BuiltinFont::HelveticaBold, font_sizes.score, palette.primary);
        self.text(
            inner_x + score_width + 4.0,
            y + 34.0,
            SCORE_SUFFIX,
            BuiltinFont::Helvetica,
            font_sizes.body,
            palette.muted,
        );

        self.place(BlockKind::ScoreCard, cursor, card_height);
        cursor.advanced_by(card_height + geometry.gap)
    }

    /// Lays the sections out in two columns: the first and third section go to the left
    /// column, the second one to the right column.
    ///
    /// The height of every card is measured before anything is drawn. A grid which fits on a
    /// page is kept on one page as a whole. A taller grid is placed card by card instead, in
    /// section order and in the same columns, and both columns start again from the top
    /// margin whenever a card opens a new page.
    pub fn render_section_grid(
        &mut self,
        cursor: LayoutCursor,
        sections: &[NamedSection<'_>],
    ) -> LayoutCursor {
        let geometry = self.geometry;
        let column_width = geometry.column_width();
        let inner_width = column_width - geometry.card_padding * 2.0;
        let frame = CardFrame {
            width: column_width,
            border: geometry.palette.border,
        };
        let column_x = |column: usize| geometry.margin + column as f32 * (column_width + geometry.column_gap);

        // First pass, measure every card and assign it to its column
        let mut column_heights = [0.0f32; 2];
        let mut card_slots = Vec::with_capacity(sections.len());
        for (index, section) in sections.iter().enumerate() {
            let column = index % 2;
            let rows = self.section_rows(section, inner_width);
            let card_height = rows_height(&rows) + geometry.card_padding * 2.0;
            card_slots.push((column, column_heights[column], card_height, rows));
            column_heights[column] += card_height + geometry.gap;
        }
        let consumed_height = column_heights[0].max(column_heights[1]);
        let drawn_height = (consumed_height - geometry.gap).max(0.0);

        if drawn_height <= self.printable_height() {
            // Second pass, draw the cards where the first pass put them
            let cursor = self.ensure_space(cursor, drawn_height);
            self.place(BlockKind::SectionGrid, cursor, drawn_height);
            for (index, (column, offset, card_height, rows)) in card_slots.into_iter().enumerate() {
                let x = column_x(column);
                let card_cursor = cursor.advanced_by(offset);
                self.card(x, card_cursor.y, column_width, card_height, frame.border);
                self.draw_rows(x + geometry.card_padding, card_cursor.y + geometry.card_padding, &rows);
                self.place(BlockKind::SectionCard { index, column }, card_cursor, card_height);
            }
            return cursor.advanced_by(consumed_height + geometry.gap);
        }

        log::debug!(
            "The section grid needs {:.1}pt, placing its cards one by one",
            drawn_height
        );
        let mut page_count = cursor.page_count;
        let mut column_tops = [cursor.y; 2];
        let mut lowest_bottom = cursor.y;
        for (index, (column, _, _, rows)) in card_slots.into_iter().enumerate() {
            let card_cursor = LayoutCursor {
                y: column_tops[column],
                page_count,
            };
            let end_cursor = self.place_rows(
                BlockKind::SectionCard { index, column },
                card_cursor,
                column_x(column),
                Some(frame),
                &rows,
                0.0,
            );
            if end_cursor.page_count != page_count {
                page_count = end_cursor.page_count;
                column_tops = [geometry.margin; 2];
                lowest_bottom = geometry.margin;
            }
            column_tops[column] = end_cursor.y + geometry.gap;
            lowest_bottom = lowest_bottom.max(end_cursor.y);
        }

        LayoutCursor {
            y: lowest_bottom + geometry.gap,
            page_count,
        }
    }

    /// Draws the red flags banner followed by one critique/remedy pair per issue. Every issue
    /// is placed on its own, so a page may break between two of them. An issue taller than a
    /// page is continued on the next pages.
    pub fn render_flagged_list(&mut self, cursor: LayoutCursor, items: &[CritiquePair]) -> LayoutCursor {
        if items.is_empty() {
            return cursor;
        }
        let geometry = self.geometry;
        let palette = geometry.palette;
        let inner_width = geometry.content_width() - geometry.card_padding * 2.0;
        let inner_x = geometry.margin + geometry.card_padding;
        let banner_height = self.banner_height();

        let cursor = self.ensure_space(cursor, banner_height.max(geometry.flagged_banner_reserve));
        self.card(geometry.margin, cursor.y, geometry.content_width(), banner_height, palette.primary);
        self.text(
            inner_x,
            cursor.y + geometry.card_padding + 8.0,
            FLAGGED_TITLE,
            BuiltinFont::HelveticaBold,
            geometry.font_sizes.title,
            palette.primary,
        );
        self.place(BlockKind::FlaggedBanner, cursor, banner_height);

        let mut item_cursor = cursor.advanced_by(banner_height + geometry.gap);
        for (index, item) in items.iter().enumerate() {
            let rows = self.pair_rows(item, inner_width);
            item_cursor = self.place_rows(
                BlockKind::FlaggedItem { index },
                item_cursor,
                inner_x,
                None,
                &rows,
                FLAGGED_ITEM_GAP,
            );
        }

        item_cursor.advanced_by(geometry.gap)
    }

    /// Draws the banner of the fix list followed by the numbered fixes, each of them placed on its own.
    pub fn render_fix_list(&mut self, cursor: LayoutCursor, items: &[String]) -> LayoutCursor {
        if items.is_empty() {
            return cursor;
        }
        let geometry = self.geometry;
        let palette = geometry.palette;
        let inner_width = geometry.content_width() - geometry.card_padding * 2.0;
        let inner_x = geometry.margin + geometry.card_padding;
        let banner_height = self.banner_height();

        let cursor = self.ensure_space(cursor, banner_height + geometry.fix_banner_reserve);
        self.card(geometry.margin, cursor.y, geometry.content_width(), banner_height, palette.border);
        self.text(
            inner_x,
            cursor.y + geometry.card_padding + 8.0,
            FIX_LIST_TITLE,
            BuiltinFont::HelveticaBold,
            geometry.font_sizes.title,
            palette.text,
        );
        self.place(BlockKind::FixBanner, cursor, banner_height);

        let mut entry_cursor = cursor.advanced_by(banner_height + 4.0);
        for (index, fix) in items.iter().enumerate() {
            let entry = format!("{}. {}", index + 1, fix);
            let rows = self.wrapped_rows(&entry, inner_width, palette.muted);
            entry_cursor = self.place_rows(
                BlockKind::FixEntry { index },
                entry_cursor,
                inner_x,
                None,
                &rows,
                PAIR_GAP,
            );
        }

        entry_cursor.advanced_by(geometry.gap)
    }

    /// Draws the footer near the bottom edge of the page the cursor is on, wherever the cursor is.
    pub fn render_footer(&mut self, cursor: LayoutCursor) {
        let geometry = self.geometry;
        let font_size = geometry.font_sizes.tiny;
        let footer_width = BuiltinFont::Helvetica.text_width(FOOTER_TEXT, font_size);
        let baseline = geometry.page_height - geometry.footer_offset;
        self.text(
            (geometry.page_width - footer_width) / 2.0,
            baseline,
            FOOTER_TEXT,
            BuiltinFont::Helvetica,
            font_size,
            geometry.palette.muted,
        );
        let footer_cursor = LayoutCursor {
            y: baseline - font_size,
            ..cursor
        };
        self.place(BlockKind::Footer, footer_cursor, font_size);
    }

    /// Hands over the pages and placements laid out so far.
    pub fn finish(self) -> LaidOutReport {
        LaidOutReport {
            pages: self.pages,
            placements: self.placements,
        }
    }

    fn start_page(&mut self) {
        let geometry = self.geometry;
        // The background always comes first, before any content of the page
        self.pages.push(DisplayPage {
            commands: vec![DrawCommand::FillRectangle {
                x: 0.0,
                y: 0.0,
                width: geometry.page_width,
                height: geometry.page_height,
                color: geometry.palette.background,
            }],
        });
    }

    fn draw(&mut self, command: DrawCommand) {
        if self.pages.is_empty() {
            self.start_page();
        }
        if let Some(page) = self.pages.last_mut() {
            page.commands.push(command);
        }
    }

    fn place(&mut self, kind: BlockKind, cursor: LayoutCursor, height: f32) {
        self.placements.push(Placement {
            kind,
            page: cursor.page_index(),
            top: cursor.y,
            height,
        });
    }

    fn text<S: Into<String>>(
        &mut self,
        x: f32,
        baseline: f32,
        text: S,
        font: BuiltinFont,
        font_size: f32,
        color: Color,
    ) {
        self.draw(DrawCommand::Text {
            x,
            baseline,
            text: text.into(),
            font,
            font_size,
            color,
        });
    }

    fn card(&mut self, x: f32, y: f32, width: f32, height: f32, border: Color) {
        self.draw(DrawCommand::Card {
            x,
            y,
            width,
            height,
            radius: self.geometry.corner_radius,
            fill: self.geometry.palette.card,
            border,
        });
    }

    fn draw_rows(&mut self, x: f32, top: f32, rows: &[Row]) {
        let mut row_top = top;
        for row in rows {
            for command in row.commands.iter() {
                self.draw(command.translated(x, row_top));
            }
            row_top += row.height;
        }
    }

    /// Places a block made of rows at the cursor and returns the cursor below it, including
    /// `trailing_gap`.
    ///
    /// A block which fits on a page is gated as a whole by `ensure_space`. A taller block
    /// starts on a fresh page and is broken between two rows wherever it reaches the bottom
    /// margin. Each part gets its own card and its own placement.
    fn place_rows(
        &mut self,
        kind: BlockKind,
        cursor: LayoutCursor,
        x: f32,
        frame: Option<CardFrame>,
        rows: &[Row],
        trailing_gap: f32,
    ) -> LayoutCursor {
        let padding = if frame.is_some() { self.geometry.card_padding } else { 0.0 };
        let content_height = rows_height(rows) + padding * 2.0;
        let printable_height = self.printable_height();

        if content_height + trailing_gap <= printable_height {
            let cursor = self.ensure_space(cursor, content_height + trailing_gap);
            if let Some(frame) = frame {
                self.card(x, cursor.y, frame.width, content_height, frame.border);
            }
            self.draw_rows(x + padding, cursor.y + padding, rows);
            let placed_height = if frame.is_some() {
                content_height
            } else {
                content_height + trailing_gap
            };
            self.place(kind, cursor, placed_height);
            return cursor.advanced_by(content_height + trailing_gap);
        }

        log::debug!(
            "Splitting a block of {:.1}pt over several pages",
            content_height
        );
        let printable_bottom = self.geometry.printable_bottom();
        let mut cursor = cursor;
        let mut remaining = rows;
        while !remaining.is_empty() {
            // Anything left is taller than the room below the cursor, this breaks the page
            // unless the cursor is already at the top of an empty one
            cursor = self.ensure_space(cursor, printable_height);

            let available = printable_bottom - cursor.y - padding * 2.0;
            let mut taken_rows = 0;
            let mut taken_height = 0.0;
            for row in remaining {
                if taken_height + row.height > available {
                    break;
                }
                taken_height += row.height;
                taken_rows += 1;
            }
            if taken_rows == 0 {
                log::warn!(
                    "A row of {:.1}pt does not fit in the printable area of {:.1}pt, it will overflow",
                    remaining[0].height,
                    printable_height
                );
                taken_rows = 1;
                taken_height = remaining[0].height;
            }

            let (taken, rest) = remaining.split_at(taken_rows);
            let part_height = taken_height + padding * 2.0;
            if let Some(frame) = frame {
                self.card(x, cursor.y, frame.width, part_height, frame.border);
            }
            self.draw_rows(x + padding, cursor.y + padding, taken);
            self.place(kind, cursor, part_height);
            cursor = cursor.advanced_by(part_height);
            remaining = rest;
        }

        cursor.advanced_by(trailing_gap)
    }

    /// One row per wrapped line of body text, the first baseline sits at the top of the first row.
    fn wrapped_rows(&self, text: &str, width: f32, color: Color) -> Vec<Row> {
        let block = self.measure_body(text, width);
        block
            .lines
            .iter()
            .map(|line| {
                if line.is_empty() {
                    Row::space(block.line_height)
                } else {
                    Row::text(
                        block.line_height,
                        0.0,
                        0.0,
                        line.clone(),
                        BuiltinFont::Helvetica,
                        block.font_size,
                        color,
                    )
                }
            })
            .collect()
    }

    fn measure_body(&self, text: &str, width: f32) -> MeasuredBlock {
        measure(
            text,
            width,
            self.geometry.font_sizes.body,
            self.geometry.line_height_factor,
        )
    }

    fn printable_height(&self) -> f32 {
        self.geometry.printable_bottom() - self.geometry.margin
    }

    fn banner_height(&self) -> f32 {
        self.geometry.card_padding + self.geometry.line_height(self.geometry.font_sizes.title) + 4.0
    }

    /// The title of a section card followed by its critique and remedy.
    fn section_rows(&self, section: &NamedSection<'_>, width: f32) -> Vec<Row> {
        let geometry = self.geometry;
        let mut rows = vec![Row::text(
            geometry.line_height(geometry.font_sizes.title) + TITLE_GAP,
            0.0,
            8.0,
            section.title,
            BuiltinFont::HelveticaBold,
            geometry.font_sizes.title,
            geometry.palette.text,
        )];
        rows.append(&mut self.pair_rows(section.pair, width));
        rows
    }

    /// A "Roast" label and its text, then a "Fix" label and its text.
    fn pair_rows(&self, pair: &CritiquePair, width: f32) -> Vec<Row> {
        let geometry = self.geometry;
        let font_sizes = geometry.font_sizes;
        let palette = geometry.palette;
        let label_advance = geometry.line_height(font_sizes.label) + geometry.label_to_content_gap;
        let label = |text: &str, color: Color| {
            Row::text(label_advance, 0.0, 6.0, text, BuiltinFont::HelveticaBold, font_sizes.label, color)
        };

        let mut rows = vec![label(CRITIQUE_LABEL, palette.critique)];
        rows.append(&mut self.wrapped_rows(&pair.critique, width, palette.text));
        rows.push(Row::space(PAIR_GAP));
        rows.push(label(REMEDY_LABEL, palette.remedy));
        rows.append(&mut self.wrapped_rows(&pair.remedy, width, palette.muted));
        rows
    }
}

/// The card drawn behind a block, the block is inset by the card padding.
#[derive(Debug, Clone, Copy)]
struct CardFrame {
    width: f32,
    border: Color,
}

/// A strip of a block which is never broken across pages. The commands are positioned
/// relative to the left edge of the block and to the top of the row.
#[derive(Debug, Clone)]
struct Row {
    height: f32,
    commands: Vec<DrawCommand>,
}

impl Row {
    fn space(height: f32) -> Self {
        Row {
            height,
            commands: Vec::new(),
        }
    }

    fn text<S: Into<String>>(
        height: f32,
        x: f32,
        baseline: f32,
        text: S,
        font: BuiltinFont,
        font_size: f32,
        color: Color,
    ) -> Self {
        Row {
            height,
            commands: vec![DrawCommand::Text {
                x,
                baseline,
                text: text.into(),
                font,
                font_size,
                color,
            }],
        }
    }

    fn shifted(&self, dx: f32) -> Self {
        Row {
            height: self.height,
            commands: self
                .commands
                .iter()
                .map(|command| command.translated(dx, 0.0))
                .collect(),
        }
    }
}

fn rows_height(rows: &[Row]) -> f32 {
    rows.iter().map(|row| row.height).sum()
}

/// Lays the whole report out, in document order: header, score card, section grid, red
/// flags, fix list and footer. The red flags and the fix list are left out when empty.
pub fn layout_report(record: &FeedbackRecord, geometry: &PageGeometry, has_logo: bool) -> LaidOutReport {
    let mut layout = ReportLayout::new(geometry);

    let cursor = layout.begin();
    let cursor = layout.render_header(cursor, &record.id, &record.one_liner, has_logo);
    let cursor = layout.render_score_card(cursor, record.resolved_score());
    let cursor = layout.render_section_grid(cursor, &record.sections());
    let cursor = if record.red_flags.is_empty() {
        cursor
    } else {
        layout.render_flagged_list(cursor, &record.red_flags)
    };
    let cursor = if record.top_fixes.is_empty() {
        cursor
    } else {
        layout.render_fix_list(cursor, &record.top_fixes)
    };
    layout.render_footer(cursor);

    let laid_out_report = layout.finish();
    log::debug!(
        "Laid out the roast {:?} on {} pages",
        record.id,
        laid_out_report.pages.len()
    );
    laid_out_report
}
