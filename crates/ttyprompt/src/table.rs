// crates/ttyprompt/src/table.rs
//
// Turning a grid of suggestion cells into text drawn below the input.

use crate::line::{char_cells, str_cells};

const COLUMN_GAP: &str = "  ";

/// Formats suggestion cells, one inner `Vec` per row. Rows in the returned
/// text are separated by `\n`; the editor places the text below the input.
pub trait TableRenderer {
    fn render(&self, cells: &[Vec<String>]) -> String;
}

/// Left-aligned columns padded to their widest cell.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColumnTable;

impl TableRenderer for ColumnTable {
    fn render(&self, cells: &[Vec<String>]) -> String {
        let columns = cells.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in cells {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(str_cells(cell));
            }
        }

        cells
            .iter()
            .map(|row| {
                let mut line = String::new();
                for (i, cell) in row.iter().enumerate() {
                    if i > 0 {
                        line.push_str(COLUMN_GAP);
                    }
                    line.push_str(cell);
                    line.push_str(&" ".repeat(widths[i] - str_cells(cell)));
                }
                line.trim_end().to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Cut `s` to at most `max_cells` terminal cells.
pub fn clip_to_width(s: &str, max_cells: usize) -> String {
    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = char_cells(c);
        if width + w > max_cells {
            break;
        }
        out.push(c);
        width += w;
    }
    out
}
