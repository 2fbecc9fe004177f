//! Cell and multi-line text layout.
//!
//! A cell is one rectangular text-paint unit at the cursor: optional fill and
//! border, horizontal alignment, then a cursor advance. `multi_cell` wraps
//! text greedily into a column of cells, truncating words that are wider than
//! the column character by character.
//!
//! Two empirical constants are load-bearing for cross-backend visual parity
//! and must not be "fixed": the baseline offset `height/2 + font_size * 0.106`
//! and the trailing space appended to right-aligned text.

use crate::backend::{Align, RectStyle, TextOptions};
use crate::engine::LayoutEngine;
use crate::error::SlateError;

/// Options for [`LayoutEngine::cell`] and [`LayoutEngine::vertical_text`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellOptions {
    /// Stroke the cell box.
    pub border: bool,
    /// After painting, drop down by the cell height and return to the left
    /// margin instead of continuing on the same row.
    pub ln: bool,
    pub align: Align,
    /// Fill the cell box with the current fill color before painting text.
    pub fill: bool,
    /// Run the auto page-break check before painting.
    pub check_new_page: bool,
}

impl Default for CellOptions {
    fn default() -> Self {
        Self {
            border: false,
            ln: false,
            align: Align::Left,
            fill: false,
            check_new_page: true,
        }
    }
}

/// Options for [`LayoutEngine::multi_cell`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MultiCellOptions {
    pub border: bool,
    pub align: Align,
}

impl LayoutEngine {
    /// Paint one cell at the cursor and advance it.
    pub fn cell(
        &mut self,
        width: f32,
        height: f32,
        text: &str,
        opts: CellOptions,
    ) -> Result<(), SlateError> {
        if opts.check_new_page {
            self.check_new_page(height)?;
        }

        let x = self.cursor.x;
        let y = self.cursor.y;

        if opts.fill {
            self.backend.draw_rect(x, y, width, height, RectStyle::Fill)?;
        }
        if opts.border {
            self.backend.draw_rect(x, y, width, height, RectStyle::Stroke)?;
        }

        // Empirical vertical centering, not a typographic computation.
        let baseline = y + height / 2.0 + self.font_size() * 0.106;

        match opts.align {
            Align::Center => {
                self.backend.draw_text(
                    text,
                    x + width / 2.0,
                    baseline,
                    &TextOptions::aligned(Align::Center),
                )?;
            }
            Align::Right => {
                // The trailing space offsets right-aligned glyph metrics.
                let padded = format!("{text} ");
                self.backend.draw_text(
                    &padded,
                    x + width,
                    baseline,
                    &TextOptions::aligned(Align::Right),
                )?;
            }
            Align::Left => {
                self.backend
                    .draw_text(text, x, baseline, &TextOptions::aligned(Align::Left))?;
            }
        }

        self.cursor.x += width;
        if opts.ln {
            self.cursor.y += height;
            self.cursor.reset_x(self.geometry.margin_left);
        }
        Ok(())
    }

    /// A cell rotated 90°: same contract, one semantic operation regardless of
    /// how the active backend realizes rotation.
    pub fn vertical_text(
        &mut self,
        width: f32,
        height: f32,
        text: &str,
        opts: CellOptions,
    ) -> Result<(), SlateError> {
        if opts.check_new_page {
            self.check_new_page(height)?;
        }

        let x = self.cursor.x;
        let y = self.cursor.y;

        if opts.fill {
            // The fill box extends upwards along the rotated text run.
            let text_width = self.backend.text_width(text);
            self.backend.draw_rect(
                x,
                y - (text_width + 1.0),
                height,
                text_width + 2.0,
                RectStyle::Fill,
            )?;
        }

        let offset = height / 2.0 + self.font_size() * 0.106;
        self.backend
            .draw_text(text, x + offset, y, &TextOptions::rotated(90.0))?;

        self.cursor.x += width;
        if opts.ln {
            self.cursor.y += height;
            self.cursor.reset_x(self.geometry.margin_left);
        }
        Ok(())
    }

    /// Greedy word-wrap of `text` into a column of `width`-mm cells.
    ///
    /// Explicit line breaks are honored first. A word that is wider than the
    /// column on its own is truncated one character at a time until the
    /// remaining prefix fits, that prefix is flushed, and the suffix re-enters
    /// the loop. Guaranteed to make forward progress: at least one character
    /// is consumed per flush, and a non-positive width degenerates to an
    /// empty cell per line instead of looping.
    pub fn multi_cell(
        &mut self,
        width: f32,
        height: f32,
        text: &str,
        opts: MultiCellOptions,
    ) -> Result<(), SlateError> {
        if text.is_empty() {
            return Ok(());
        }

        let cell_opts = CellOptions {
            border: opts.border,
            ln: true,
            align: opts.align,
            ..CellOptions::default()
        };
        let origin_x = self.cursor.x;

        for line in text.lines() {
            let mut row = String::new();

            for word in line.split(' ') {
                // Flush the pending row before a word that would overflow it.
                if !row.is_empty()
                    && self.backend.text_width(&format!("{row}{word}")) >= width
                {
                    self.cell(width, height, &row, cell_opts)?;
                    self.cursor.x = origin_x;
                    row.clear();
                }

                // A word wider than the column on its own is hard-truncated.
                if row.is_empty() && self.backend.text_width(word) > width {
                    if width <= 0.0 {
                        self.cell(width, height, "", cell_opts)?;
                        self.cursor.x = origin_x;
                        continue;
                    }
                    let mut rest = word;
                    while self.backend.text_width(rest) > width {
                        let prefix = self.fitting_prefix(rest, width);
                        self.cell(width, height, prefix, cell_opts)?;
                        self.cursor.x = origin_x;
                        rest = &rest[prefix.len()..];
                    }
                    row = format!("{rest} ");
                    continue;
                }

                row.push_str(word);
                row.push(' ');
            }

            if !row.is_empty() {
                self.cell(width, height, &row, cell_opts)?;
                self.cursor.x = origin_x;
            }
        }

        self.cursor.reset_x(self.geometry.margin_left);
        Ok(())
    }

    /// Longest prefix of `word` that measures at or under `width` mm, never
    /// shorter than one character.
    fn fitting_prefix<'a>(&self, word: &'a str, width: f32) -> &'a str {
        let mut prefix = word;
        while self.backend.text_width(prefix) > width {
            let Some((last, _)) = prefix.char_indices().last() else {
                break;
            };
            if last == 0 {
                // A single character that still does not fit is emitted as-is.
                break;
            }
            prefix = &prefix[..last];
        }
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_backend::{CommandBackend, DrawCommand};
    use crate::engine::LayoutEngine;
    use crate::geometry::PageGeometry;

    fn engine() -> LayoutEngine {
        let mut e = LayoutEngine::new(
            Box::new(CommandBackend::new()),
            PageGeometry::default(),
            None,
            None,
        )
        .unwrap();
        e.set_font("Helvetica", "", 10.0).unwrap();
        e
    }

    fn texts(engine: &mut LayoutEngine) -> Vec<(String, f32, f32, Align)> {
        CommandBackend::decode(&engine.finish().unwrap())
            .unwrap()
            .into_iter()
            .filter_map(|c| match c {
                DrawCommand::Text {
                    text, x, y, align, ..
                } => Some((text, x, y, align)),
                _ => None,
            })
            .collect()
    }

    // Heuristic width at size 10: 0.5 * 10 pt per char = 5 pt ≈ 1.764 mm/char.
    const CHAR_MM: f32 = 5.0 * crate::fonts::PT_TO_MM;

    #[test]
    fn cell_advances_cursor_and_breaks_line() {
        let mut e = engine();
        e.cell(40.0, 8.0, "a", CellOptions::default()).unwrap();
        assert_eq!(e.get_x(), 50.0);
        assert_eq!(e.get_y(), 10.0);

        e.cell(
            40.0,
            8.0,
            "b",
            CellOptions {
                ln: true,
                ..CellOptions::default()
            },
        )
        .unwrap();
        assert_eq!(e.get_x(), 10.0);
        assert_eq!(e.get_y(), 18.0);
    }

    #[test]
    fn cell_baseline_uses_empirical_constant() {
        let mut e = engine();
        e.cell(40.0, 8.0, "x", CellOptions::default()).unwrap();
        let painted = texts(&mut e);
        // y = 10 + 8/2 + 10 * 0.106
        assert!((painted[0].2 - 15.06).abs() < 1e-3);
    }

    #[test]
    fn right_alignment_appends_trailing_space() {
        let mut e = engine();
        e.cell(
            40.0,
            8.0,
            "total",
            CellOptions {
                align: Align::Right,
                ..CellOptions::default()
            },
        )
        .unwrap();
        let painted = texts(&mut e);
        assert_eq!(painted[0].0, "total ");
        assert_eq!(painted[0].3, Align::Right);
        assert_eq!(painted[0].1, 50.0); // anchor at cursor_x + width
    }

    #[test]
    fn center_alignment_anchors_mid_cell() {
        let mut e = engine();
        e.cell(
            40.0,
            8.0,
            "mid",
            CellOptions {
                align: Align::Center,
                ..CellOptions::default()
            },
        )
        .unwrap();
        let painted = texts(&mut e);
        assert_eq!(painted[0].1, 30.0); // cursor_x + width/2
    }

    #[test]
    fn filled_cell_paints_rect_before_text() {
        let mut e = engine();
        e.cell(
            40.0,
            8.0,
            "x",
            CellOptions {
                fill: true,
                ..CellOptions::default()
            },
        )
        .unwrap();
        let commands = CommandBackend::decode(&e.finish().unwrap()).unwrap();
        assert!(matches!(
            commands.as_slice(),
            [
                DrawCommand::SetFont { .. },
                DrawCommand::Rect {
                    style: crate::backend::RectStyle::Fill,
                    ..
                },
                DrawCommand::Text { .. }
            ]
        ));
    }

    #[test]
    fn cell_triggers_auto_page_break() {
        let mut e = engine();
        e.set_y(290.0);
        e.cell(40.0, 10.0, "x", CellOptions::default()).unwrap();
        assert_eq!(e.page_no(), 1);
        // Painted at the top margin of the fresh page.
        let painted = texts(&mut e);
        assert!(painted[0].2 < 30.0);
    }

    #[test]
    fn vertical_text_paints_rotated() {
        let mut e = engine();
        e.vertical_text(10.0, 30.0, "side", CellOptions::default())
            .unwrap();
        let commands = CommandBackend::decode(&e.finish().unwrap()).unwrap();
        let angle = commands
            .iter()
            .find_map(|c| match c {
                DrawCommand::Text { angle, .. } => Some(*angle),
                _ => None,
            })
            .unwrap();
        assert_eq!(angle, 90.0);
    }

    #[test]
    fn vertical_text_fill_box_extends_up_along_the_run() {
        let mut e = engine();
        e.set_xy(40.0, 60.0);
        e.vertical_text(
            10.0,
            30.0,
            "side",
            CellOptions {
                fill: true,
                ..CellOptions::default()
            },
        )
        .unwrap();
        let commands = CommandBackend::decode(&e.finish().unwrap()).unwrap();
        let (x, y, w, h) = commands
            .iter()
            .find_map(|c| match c {
                DrawCommand::Rect {
                    x,
                    y,
                    w,
                    h,
                    style: crate::backend::RectStyle::Fill,
                } => Some((*x, *y, *w, *h)),
                _ => None,
            })
            .unwrap();

        // The box sits at the cursor x, reaches text_width + 1 above the
        // cursor y, is cell-height wide and text_width + 2 tall.
        let text_w = 4.0 * CHAR_MM;
        assert_eq!(x, 40.0);
        assert!((y - (60.0 - (text_w + 1.0))).abs() < 1e-3);
        assert_eq!(w, 30.0);
        assert!((h - (text_w + 2.0)).abs() < 1e-3);
    }

    #[test]
    fn multi_cell_empty_text_is_a_no_op() {
        let mut e = engine();
        e.multi_cell(50.0, 6.0, "", MultiCellOptions::default())
            .unwrap();
        assert!(texts(&mut e).is_empty());
    }

    #[test]
    fn multi_cell_wraps_greedily() {
        let mut e = engine();
        // ~28 chars fit into 50 mm at the heuristic width.
        e.multi_cell(
            50.0,
            6.0,
            "alpha beta gamma delta epsilon zeta eta theta",
            MultiCellOptions::default(),
        )
        .unwrap();
        let painted = texts(&mut e);
        assert!(painted.len() >= 2, "expected wrapping, got {painted:?}");
        for (row, ..) in &painted {
            assert!(row.chars().count() as f32 * CHAR_MM < 50.0 + CHAR_MM);
        }
    }

    #[test]
    fn multi_cell_rewrap_is_idempotent() {
        let text = "one two three four five six seven eight nine ten eleven";
        let wrap = |_| {
            let mut e = engine();
            e.multi_cell(45.0, 6.0, text, MultiCellOptions::default())
                .unwrap();
            texts(&mut e)
                .into_iter()
                .map(|(t, ..)| t)
                .collect::<Vec<_>>()
        };
        assert_eq!(wrap(0), wrap(1));
    }

    #[test]
    fn overlong_word_is_truncated_with_full_round_trip() {
        let mut e = engine();
        let word = "gammaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        e.multi_cell(
            25.0,
            6.0,
            &format!("alpha beta {word}"),
            MultiCellOptions::default(),
        )
        .unwrap();
        let painted = texts(&mut e);

        // The overlong word spans at least two cells, none wider than the
        // column plus one character of slack.
        let fragments: Vec<&str> = painted
            .iter()
            .map(|(t, ..)| t.trim_end())
            .filter(|t| t.starts_with("gamma") || t.chars().all(|c| c == 'a'))
            .collect();
        assert!(fragments.len() >= 2, "expected split word, got {painted:?}");
        assert_eq!(fragments.concat(), word);
        for frag in &fragments {
            assert!(frag.chars().count() as f32 * CHAR_MM <= 25.0 + CHAR_MM);
        }
    }

    #[test]
    fn multi_cell_restores_x_between_rows() {
        let mut e = engine();
        e.set_x(60.0);
        e.multi_cell(
            40.0,
            6.0,
            "first second third fourth fifth sixth",
            MultiCellOptions::default(),
        )
        .unwrap();
        let painted = texts(&mut e);
        assert!(painted.len() >= 2);
        for (_, x, ..) in &painted {
            assert_eq!(*x, 60.0);
        }
        // Final x resets to the left margin.
        assert_eq!(e.get_x(), 10.0);
    }

    #[test]
    fn non_positive_width_terminates_with_empty_cells() {
        let mut e = engine();
        e.multi_cell(0.0, 6.0, "unfittable", MultiCellOptions::default())
            .unwrap();
        let painted = texts(&mut e);
        assert_eq!(painted.len(), 1);
        assert_eq!(painted[0].0, "");
    }
}
