use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    execute,
    style::{ResetColor, SetForegroundColor},
    terminal,
};
use log::{debug, info};

use crate::color::Color;
use crate::util::{modulo, to_radians};
use crate::vector::Vector2D;

/// Glyph used for solid color fills.
pub const BLOCK: char = '\u{2588}';

/// What a primitive paints into each covered cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub glyph: char,
    pub color: Option<Color>,
}

impl Style {
    pub fn new(glyph: char, color: Color) -> Self {
        Style { glyph, color: Some(color) }
    }
}

impl From<Color> for Style {
    fn from(color: Color) -> Self {
        Style::new(BLOCK, color)
    }
}

impl From<char> for Style {
    fn from(glyph: char) -> Self {
        Style { glyph, color: None }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub glyph: char,
    pub color: Option<Color>,
}

impl Cell {
    pub const BLANK: Cell = Cell { glyph: ' ', color: None };

    pub fn is_blank(&self) -> bool {
        self.glyph == ' '
    }
}

impl From<Style> for Cell {
    fn from(style: Style) -> Self {
        Cell { glyph: style.glyph, color: style.color }
    }
}

// --- CellGrid: the drawing surface ---
#[derive(Clone, Debug)]
pub struct CellGrid {
    cells: Vec<Vec<Cell>>,
    width: u16,
    height: u16,
}

impl CellGrid {
    pub fn new(width: u16, height: u16) -> Self {
        CellGrid {
            cells: vec![vec![Cell::BLANK; width as usize]; height as usize],
            width,
            height,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Cell> {
        self.cells.get(y as usize).and_then(|row| row.get(x as usize)).copied()
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if y < self.height && x < self.width {
            self.cells[y as usize][x as usize] = cell;
        }
    }

    pub fn clear(&mut self) {
        self.cells = vec![vec![Cell::BLANK; self.width as usize]; self.height as usize];
    }

    /// Glyphs of one row, without colors.
    pub fn row_string(&self, y: u16) -> String {
        self.cells
            .get(y as usize)
            .map(|row| row.iter().map(|cell| cell.glyph).collect())
            .unwrap_or_default()
    }

    /// Writes the grid at `(col, row)` on the output, switching colors only
    /// between runs of differently colored cells.
    pub fn present(&self, out: &mut OutputTarget, col: u16, row: u16) -> io::Result<()> {
        for (y, cells) in self.cells.iter().enumerate() {
            // Rows past the last addressable terminal line are dropped.
            let Some(screen_row) = row.checked_add(y as u16) else {
                break;
            };
            out.execute_move_to(MoveTo(col, screen_row))?;
            let mut run = String::new();
            let mut run_color: Option<Color> = None;
            for cell in cells {
                if cell.color != run_color && !run.is_empty() {
                    write_run(out, &run, run_color)?;
                    run.clear();
                }
                run_color = cell.color;
                run.push(cell.glyph);
            }
            if !run.is_empty() {
                write_run(out, &run, run_color)?;
            }
        }
        out.execute_other_command(ResetColor)?;
        Ok(())
    }
}

fn write_run(out: &mut OutputTarget, run: &str, color: Option<Color>) -> io::Result<()> {
    match color {
        Some(c) => out.execute_other_command(SetForegroundColor(c.into()))?,
        None => out.execute_other_command(ResetColor)?,
    }
    write!(out, "{}", run)
}

/// Affine transform in canvas order: `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    /// `self` applied after `inner`.
    pub fn multiply(&self, inner: &Transform) -> Transform {
        Transform {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    pub fn translation(x: f64, y: f64) -> Transform {
        Transform { e: x, f: y, ..Transform::IDENTITY }
    }

    pub fn scaling(x: f64, y: f64) -> Transform {
        Transform { a: x, d: y, ..Transform::IDENTITY }
    }

    pub fn rotation(radians: f64) -> Transform {
        let (sin, cos) = radians.sin_cos();
        Transform { a: cos, b: sin, c: -sin, d: cos, e: 0.0, f: 0.0 }
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    pub fn apply(&self, p: Vector2D) -> Vector2D {
        Vector2D::new(self.a * p.x + self.c * p.y + self.e, self.b * p.x + self.d * p.y + self.f)
    }

    /// Applies only the linear part, for directions.
    pub fn apply_vector(&self, v: Vector2D) -> Vector2D {
        Vector2D::new(self.a * v.x + self.c * v.y, self.b * v.x + self.d * v.y)
    }

    pub fn invert(&self) -> Option<Transform> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(Transform {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            e: (self.c * self.f - self.d * self.e) / det,
            f: (self.b * self.e - self.a * self.f) / det,
        })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::IDENTITY
    }
}

fn segment_distance(p: Vector2D, a: Vector2D, b: Vector2D) -> f64 {
    let ab = b.subtract(a);
    let len_sq = ab.dot(ab);
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (p.subtract(a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a.add(ab.scalar_mult(t)))
}

fn outline_distance(p: Vector2D, points: &[Vector2D]) -> f64 {
    let mut best = f64::INFINITY;
    for (i, &a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        best = best.min(segment_distance(p, a, b));
    }
    best
}

// Even-odd rule.
fn polygon_contains(p: Vector2D, points: &[Vector2D]) -> bool {
    let mut inside = false;
    let mut j = points.len().wrapping_sub(1);
    for (i, &a) in points.iter().enumerate() {
        let b = points[j];
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn rect_corners(pos: Vector2D, size: Vector2D) -> [Vector2D; 4] {
    [
        pos,
        Vector2D::new(pos.x + size.x, pos.y),
        pos.add(size),
        Vector2D::new(pos.x, pos.y + size.y),
    ]
}

fn rect_contains(p: Vector2D, pos: Vector2D, size: Vector2D) -> bool {
    let (x0, x1) = (pos.x.min(pos.x + size.x), pos.x.max(pos.x + size.x));
    let (y0, y1) = (pos.y.min(pos.y + size.y), pos.y.max(pos.y + size.y));
    p.x >= x0 && p.x <= x1 && p.y >= y0 && p.y <= y1
}

/// Whether `p` lies in the clockwise sweep from `start` to `end` degrees around `center`.
fn in_sweep(p: Vector2D, center: Vector2D, start: f64, end: f64) -> bool {
    let span = end - start;
    if span.abs() >= 360.0 {
        return true;
    }
    modulo(p.subtract(center).angle() - start, 360.0) <= modulo(span, 360.0)
}

/// Stateful drawing context over a [`CellGrid`], modelled on a 2D canvas.
///
/// Shapes are rasterized by testing each cell center in user space, so the
/// current transform applies to every primitive.
pub struct Renderer {
    grid: CellGrid,
    transform: Transform,
    saved: Vec<Transform>,
    offset: (u16, u16),
}

impl Renderer {
    pub fn new(width: u16, height: u16) -> Self {
        Renderer {
            grid: CellGrid::new(width, height),
            transform: Transform::IDENTITY,
            saved: Vec::new(),
            offset: (0, 0),
        }
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    pub fn width(&self) -> u16 {
        self.grid.width()
    }

    pub fn height(&self) -> u16 {
        self.grid.height()
    }

    pub fn size(&self) -> Vector2D {
        Vector2D::new(self.width() as f64, self.height() as f64)
    }

    pub fn offset(&self) -> (u16, u16) {
        self.offset
    }

    /// Screen position the grid is presented at.
    pub fn set_offset(&mut self, col: u16, row: u16) {
        self.offset = (col, row);
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    // --- Configuration ---

    /// Resizing drops the contents and resets the transform state.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.grid = CellGrid::new(width, height);
        self.reset_transform();
        self.saved.clear();
        debug!("Renderer resized to {}x{}", width, height);
    }

    pub fn resize_by_vector(&mut self, size: Vector2D) {
        let cells = |v: f64| v.round().clamp(0.0, u16::MAX as f64) as u16;
        self.resize(cells(size.x), cells(size.y));
    }

    /// Fills the terminal from the current offset to its bottom-right corner.
    pub fn resize_to_max(&mut self) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        info!("Resizing renderer to terminal size {}x{}", cols, rows);
        self.resize(cols.saturating_sub(self.offset.0), rows.saturating_sub(self.offset.1));
        Ok(())
    }

    pub fn translate(&mut self, x: f64, y: f64) {
        self.transform = self.transform.multiply(&Transform::translation(x, y));
    }

    pub fn translate_by_vector(&mut self, v: Vector2D) {
        self.translate(v.x, v.y);
    }

    pub fn scale(&mut self, x: f64, y: f64) {
        self.transform = self.transform.multiply(&Transform::scaling(x, y));
    }

    pub fn scale_by_vector(&mut self, v: Vector2D) {
        self.scale(v.x, v.y);
    }

    pub fn rotate(&mut self, degrees: f64) {
        self.rotate_rad(to_radians(degrees));
    }

    pub fn rotate_rad(&mut self, radians: f64) {
        self.transform = self.transform.multiply(&Transform::rotation(radians));
    }

    pub fn save(&mut self) {
        self.saved.push(self.transform);
    }

    pub fn restore(&mut self) {
        if let Some(t) = self.saved.pop() {
            self.transform = t;
        }
    }

    pub fn reset_transform(&mut self) {
        self.transform = Transform::IDENTITY;
    }

    // --- Rasterization ---

    fn raster(&mut self, mut shade: impl FnMut(Vector2D) -> Option<Cell>) {
        let Some(inverse) = self.transform.invert() else {
            return;
        };
        for y in 0..self.grid.height() {
            for x in 0..self.grid.width() {
                let center = Vector2D::new(x as f64 + 0.5, y as f64 + 0.5);
                if let Some(cell) = shade(inverse.apply(center)) {
                    self.grid.set(x, y, cell);
                }
            }
        }
    }

    fn paint(&mut self, style: Style, inside: impl Fn(Vector2D) -> bool) {
        let cell = Cell::from(style);
        self.raster(|p| inside(p).then_some(cell));
    }

    /// Half stroke width in user units, never thinner than half a cell.
    fn half_width(&self, thickness: f64) -> f64 {
        let min = 0.5 / self.transform.determinant().abs().sqrt();
        (thickness / 2.0).max(min)
    }

    // --- Rendering ---

    pub fn line(&mut self, a: Vector2D, b: Vector2D, thickness: f64, style: impl Into<Style>) {
        let hw = self.half_width(thickness);
        self.paint(style.into(), |p| segment_distance(p, a, b) <= hw);
    }

    pub fn fill_circle(&mut self, pos: Vector2D, radius: f64, style: impl Into<Style>) {
        self.paint(style.into(), |p| p.distance(pos) <= radius);
    }

    pub fn line_circle(&mut self, pos: Vector2D, radius: f64, thickness: f64, style: impl Into<Style>) {
        let hw = self.half_width(thickness);
        self.paint(style.into(), |p| (p.distance(pos) - radius).abs() <= hw);
    }

    pub fn fill_sector(&mut self, pos: Vector2D, radius: f64, start: f64, end: f64, style: impl Into<Style>) {
        self.paint(style.into(), |p| p.distance(pos) <= radius && in_sweep(p, pos, start, end));
    }

    pub fn line_sector(
        &mut self,
        pos: Vector2D,
        radius: f64,
        start: f64,
        end: f64,
        thickness: f64,
        style: impl Into<Style>,
    ) {
        let hw = self.half_width(thickness);
        let full = (end - start).abs() >= 360.0;
        let edge_a = pos.add(Vector2D::from_polar(radius, start));
        let edge_b = pos.add(Vector2D::from_polar(radius, end));
        self.paint(style.into(), |p| {
            let on_arc = (p.distance(pos) - radius).abs() <= hw && in_sweep(p, pos, start, end);
            let on_edge = !full
                && (segment_distance(p, pos, edge_a) <= hw || segment_distance(p, pos, edge_b) <= hw);
            on_arc || on_edge
        });
    }

    pub fn arc(&mut self, pos: Vector2D, radius: f64, start: f64, end: f64, thickness: f64, style: impl Into<Style>) {
        let hw = self.half_width(thickness);
        self.paint(style.into(), |p| {
            (p.distance(pos) - radius).abs() <= hw && in_sweep(p, pos, start, end)
        });
    }

    pub fn fill_rect(&mut self, pos: Vector2D, size: Vector2D, style: impl Into<Style>) {
        self.paint(style.into(), |p| rect_contains(p, pos, size));
    }

    pub fn line_rect(&mut self, pos: Vector2D, size: Vector2D, thickness: f64, style: impl Into<Style>) {
        self.line_polygon(&rect_corners(pos, size), thickness, style);
    }

    pub fn fill_polygon(&mut self, points: &[Vector2D], style: impl Into<Style>) {
        if points.len() < 3 {
            return;
        }
        self.paint(style.into(), |p| polygon_contains(p, points));
    }

    /// Closed outline through `points`.
    pub fn line_polygon(&mut self, points: &[Vector2D], thickness: f64, style: impl Into<Style>) {
        if points.len() < 2 {
            return;
        }
        let hw = self.half_width(thickness);
        self.paint(style.into(), |p| outline_distance(p, points) <= hw);
    }

    pub fn clear(&mut self) {
        self.grid.clear();
    }

    pub fn clear_rect(&mut self, pos: Vector2D, size: Vector2D) {
        self.raster(|p| rect_contains(p, pos, size).then_some(Cell::BLANK));
    }

    /// Paints every cell, ignoring the transform.
    pub fn fill(&mut self, style: impl Into<Style>) {
        let style: Style = style.into();
        let cell = Cell::from(style);
        for y in 0..self.grid.height() {
            for x in 0..self.grid.width() {
                self.grid.set(x, y, cell);
            }
        }
    }

    /// Blits `image` into the rectangle at `pos`, stretched to `size` when
    /// given. Blank source cells leave the destination untouched.
    pub fn draw_image(&mut self, image: &CellGrid, pos: Vector2D, size: Option<Vector2D>) {
        let src_w = image.width() as f64;
        let src_h = image.height() as f64;
        let size = size.unwrap_or(Vector2D::new(src_w, src_h));
        if size.x == 0.0 || size.y == 0.0 {
            return;
        }
        self.raster(|p| {
            let u = (p.x - pos.x) / size.x;
            let v = (p.y - pos.y) / size.y;
            if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                return None;
            }
            let cell = image.get((u * src_w) as u16, (v * src_h) as u16)?;
            (!cell.is_blank()).then_some(cell)
        });
    }

    /// One glyph per cell along the transformed x axis from `pos`.
    pub fn text(&mut self, pos: Vector2D, text: &str, color: Option<Color>) {
        let anchor = self.transform.apply(pos);
        let step = self.transform.apply_vector(Vector2D::new(1.0, 0.0));
        for (i, glyph) in text.chars().enumerate() {
            let at = anchor.add(step.scalar_mult(i as f64));
            let (x, y) = (at.x.floor(), at.y.floor());
            if x >= 0.0 && y >= 0.0 && x < self.width() as f64 && y < self.height() as f64 {
                self.grid.set(x as u16, y as u16, Cell { glyph, color });
            }
        }
    }

    pub fn present(&self, out: &mut OutputTarget) -> io::Result<()> {
        self.grid.present(out, self.offset.0, self.offset.1)
    }
}

// --- ScreenBuffer for headless rendering ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    pub cursor_x: u16,
    pub cursor_y: u16,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_char(&mut self, c: char) {
        if self.cursor_y < self.height && self.cursor_x < self.width {
            self.buffer[self.cursor_y as usize][self.cursor_x as usize] = c;
        }
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.write_char(c);
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
    }

    pub fn row(&self, y: u16) -> String {
        self.buffer.get(y as usize).map(|row| row.iter().collect()).unwrap_or_default()
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for row in &self.buffer {
            info!("{}", row.iter().collect::<String>());
        }
        info!("---------------------");
    }
}

impl Write for ScreenBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        self.write_str(&s);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// --- OutputTarget: real terminal or ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn execute_move_to(&mut self, command: MoveTo) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            },
        }
    }

    /// Terminal-only commands (colors, cursor visibility, mouse capture).
    /// A ScreenBuffer ignores them.
    pub fn execute_other_command(&mut self, command: impl crossterm::Command) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(_) => Ok(()),
        }
    }

    pub fn screen_buffer(&self) -> Option<&ScreenBuffer> {
        match self {
            OutputTarget::ScreenBuffer(sb) => Some(sb),
            OutputTarget::Stdout(_) => None,
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => sb.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(sb) => sb.flush(),
        }
    }
}
