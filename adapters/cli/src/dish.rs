use std::fmt::Write;

use petri_world::Field;

const OUTSIDE: char = ' ';
const EMPTY: char = '.';
const CROWD: char = '#';

/// Draws the dish as text, one character per cell.
///
/// Colonies are shown by their identifier; identifiers above nine share a
/// single marker.
pub(crate) fn render(field: &Field) -> String {
    let mut out = String::new();
    let mut row = None;
    for cell in field.coordinates() {
        if row.is_some_and(|current| current != cell.y()) {
            out.push('\n');
        }
        row = Some(cell.y());

        let symbol = if !field.contains(cell) {
            OUTSIDE
        } else {
            match field.cell(cell).and_then(|cell| cell.occupant) {
                None => EMPTY,
                Some(colony) => char::from_digit(colony.get(), 10).unwrap_or(CROWD),
            }
        };
        out.push(symbol);
    }
    if row.is_some() {
        out.push('\n');
    }
    let _ = writeln!(out, "nutrients left: {:.1}", field.total_nutrients());
    out
}
