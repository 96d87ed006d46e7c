use unicode_normalization::UnicodeNormalization as _;

use crate::metrics::{encode_character, BuiltinFont};

/// A text wrapped to a given width, together with the vertical space it takes.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredBlock {
    pub lines: Vec<String>,
    pub font_size: f32,
    pub line_height: f32,
    /// The total height, which is `lines.len() * line_height`.
    pub height: f32,
}

/// Wraps the text in the regular font so that it fits `max_width` and measures its height.
///
/// The result only depends on the arguments, so measuring a block to size its container
/// and measuring it again to draw it always agree.
pub fn measure(text: &str, max_width: f32, font_size: f32, line_height_factor: f32) -> MeasuredBlock {
    let lines = wrap_lines(text, max_width, font_size, BuiltinFont::Helvetica);
    let line_height = font_size * line_height_factor;
    let height = lines.len() as f32 * line_height;

    MeasuredBlock {
        lines,
        font_size,
        line_height,
        height,
    }
}

/// Greedily breaks the text into lines no wider than `max_width`.
///
/// Every explicit line break starts a new paragraph and every paragraph takes at least
/// one line, even when empty. Words which are wider than a whole line are split between
/// characters. Runs of whitespace collapse into a single space.
pub fn wrap_lines(text: &str, max_width: f32, font_size: f32, font: BuiltinFont) -> Vec<String> {
    let normalized_text: String = text.nfc().collect();
    // Widths are accumulated as integers in thousandths of an em so that the decision of
    // where to break never depends on the order of floating point additions
    let maximum_units = if font_size > 0.0 {
        (max_width * 1000.0 / font_size).floor().max(0.0) as u32
    } else {
        u32::MAX
    };
    let units_of = |word: &str| -> u32 {
        word.chars()
            .map(|character| font.glyph_width(encode_character(character)) as u32)
            .sum()
    };
    let space_units = font.glyph_width(b' ') as u32;

    let mut lines = Vec::new();
    for paragraph in normalized_text.split('\n') {
        let mut current_line = String::new();
        let mut current_units = 0u32;

        for word in paragraph.split_whitespace() {
            let word_units = units_of(word);
            if current_line.is_empty() {
                if word_units <= maximum_units {
                    current_line.push_str(word);
                    current_units = word_units;
                } else {
                    current_units = break_long_word(word, font, maximum_units, &mut lines, &mut current_line);
                }
            } else if current_units + space_units + word_units <= maximum_units {
                current_line.push(' ');
                current_line.push_str(word);
                current_units += space_units + word_units;
            } else {
                lines.push(std::mem::take(&mut current_line));
                if word_units <= maximum_units {
                    current_line.push_str(word);
                    current_units = word_units;
                } else {
                    current_units = break_long_word(word, font, maximum_units, &mut lines, &mut current_line);
                }
            }
        }

        lines.push(current_line);
    }

    lines
}

/// Splits a word wider than a line into full lines, leaving the remainder in `current_line`.
/// Returns the width of the remainder.
fn break_long_word(
    word: &str,
    font: BuiltinFont,
    maximum_units: u32,
    lines: &mut Vec<String>,
    current_line: &mut String,
) -> u32 {
    let mut current_units = 0u32;
    for character in word.chars() {
        let character_units = font.glyph_width(encode_character(character)) as u32;
        // A line always holds at least one character, otherwise nothing would ever be placed
        if !current_line.is_empty() && current_units + character_units > maximum_units {
            lines.push(std::mem::take(current_line));
            current_units = 0;
        }
        current_line.push(character);
        current_units += character_units;
    }

    current_units
}
