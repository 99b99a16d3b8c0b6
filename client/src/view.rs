//! Plain-text rendering of the world for the terminal.

use shared::Grid;

/// Renders the grid as glyph rows plus a status line. Color attributes are
/// carried on the wire but not rendered here.
pub fn render(grid: &Grid, name: &str, x: i32, y: i32) -> String {
    let mut out = String::with_capacity((grid.width() + 1) * grid.height() + 32);
    for row in grid.rows() {
        for cell in row {
            out.push(cell.symbol);
        }
        out.push('\n');
    }
    out.push_str(&format!("{} @ ({}, {})  [w/a/s/d to move, q to quit]\n", name, x, y));
    out
}
