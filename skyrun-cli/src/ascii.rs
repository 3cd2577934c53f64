use skyrun_core::geometry::Rect;
use skyrun_core::render::{DrawKind, DrawSurface};
use skyrun_core::Character;

/// Character-cell surface. Each cell covers `width / cols` by
/// `height / rows` pixels of the viewport; later draws overwrite earlier ones.
pub struct AsciiSurface {
    cols: usize,
    rows: usize,
    cell_w: f32,
    cell_h: f32,
    cells: Vec<char>,
}

impl AsciiSurface {
    pub fn new(cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            cell_w: 1.0,
            cell_h: 1.0,
            cells: vec![' '; cols * rows],
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.cols + 1) * self.rows);
        for row in self.cells.chunks(self.cols) {
            out.extend(row.iter().copied());
            out.push('\n');
        }
        out
    }

    fn span(start: f32, end: f32, cell: f32, limit: usize) -> (usize, usize) {
        let first = (start / cell).floor().max(0.0) as usize;
        let last = ((end / cell).ceil().max(0.0) as usize).min(limit);
        (first.min(limit), last)
    }
}

fn glyph(kind: DrawKind) -> char {
    match kind {
        DrawKind::Ground => '=',
        DrawKind::Platform => '-',
        DrawKind::Hazard => '^',
        DrawKind::Pickup => '*',
        DrawKind::Player(Character::Explorer) => 'E',
        DrawKind::Player(Character::Ninja) => 'N',
        DrawKind::Player(Character::Fairy) => 'F',
    }
}

impl DrawSurface for AsciiSurface {
    fn clear(&mut self, width: f32, height: f32) {
        self.cell_w = width / self.cols as f32;
        self.cell_h = height / self.rows as f32;
        self.cells.fill(' ');
    }

    fn fill_rect(&mut self, rect: Rect, kind: DrawKind) {
        let (col_start, col_end) = Self::span(rect.x, rect.right(), self.cell_w, self.cols);
        let (row_start, row_end) = Self::span(rect.y, rect.bottom(), self.cell_h, self.rows);
        let ch = glyph(kind);
        for row in row_start..row_end {
            let line = &mut self.cells[row * self.cols..(row + 1) * self.cols];
            line[col_start..col_end].fill(ch);
        }
    }
}
