//! Level geometry as seen by moving entities.
//!
//! `GameLevel` is the query surface entities consult every fixed step.
//! `GridLevel` is an int-grid implementation: cells hold integer values, a set of
//! values counts as solid, and cells can carry direction-tagged marks.

use std::collections::HashMap;
use std::hash::Hash;

use crate::api::error::EngineError;

/// Read-mostly grid query surface for collision and terrain marks.
///
/// Cells outside the level are solid by convention, so movement code never
/// needs to check validity before asking about collision.
pub trait GameLevel {
    /// Terrain annotation type (e.g. "small step", "platform end").
    type Mark: Copy;

    /// Size of one cell in pixels.
    fn grid_size(&self) -> u32;

    /// Whether `(cx, cy)` lies inside the level.
    fn is_valid(&self, cx: i32, cy: i32) -> bool;

    /// Row-major id of a cell.
    fn coord_id(&self, cx: i32, cy: i32) -> i32;

    /// Whether the cell blocks movement. Out-of-range cells always do.
    fn has_collision(&self, cx: i32, cy: i32) -> bool;

    /// Whether the cell carries `mark` with direction `dir`.
    fn has_mark(&self, cx: i32, cy: i32, mark: Self::Mark, dir: i32) -> bool;

    /// Tag a cell with `mark` in direction `dir` (clamped to [-1, 1]).
    fn set_mark(&mut self, cx: i32, cy: i32, mark: Self::Mark, dir: i32);

    /// Tag a cell with several marks, each with direction 0.
    fn set_marks(&mut self, cx: i32, cy: i32, marks: &[Self::Mark]) {
        for &mark in marks {
            self.set_mark(cx, cy, mark, 0);
        }
    }
}

/// A level with no geometry: every cell is valid and open.
#[derive(Debug, Clone, Copy)]
pub struct OpenLevel {
    pub grid_size: u32,
}

impl GameLevel for OpenLevel {
    type Mark = ();

    fn grid_size(&self) -> u32 {
        self.grid_size
    }

    fn is_valid(&self, _cx: i32, _cy: i32) -> bool {
        true
    }

    fn coord_id(&self, _cx: i32, _cy: i32) -> i32 {
        0
    }

    fn has_collision(&self, _cx: i32, _cy: i32) -> bool {
        false
    }

    fn has_mark(&self, _cx: i32, _cy: i32, _mark: (), _dir: i32) -> bool {
        false
    }

    fn set_mark(&mut self, _cx: i32, _cy: i32, _mark: (), _dir: i32) {}
}

/// Int-grid level. Cells are stored in row-major order: index = cy * width + cx.
#[derive(Debug, Clone)]
pub struct GridLevel<M> {
    width: u32,
    height: u32,
    grid_size: u32,
    cells: Vec<i32>,
    /// Cell values that count as solid.
    solid_values: Vec<i32>,
    /// mark -> (coord id -> dir)
    marks: HashMap<M, HashMap<i32, i32>>,
}

impl<M: Copy + Eq + Hash> GridLevel<M> {
    /// Value written for solid cells by `from_rows`.
    pub const SOLID: i32 = 1;

    /// Create an empty (all open) level.
    pub fn new(width: u32, height: u32, grid_size: u32) -> Self {
        Self {
            width,
            height,
            grid_size,
            cells: vec![0; (width * height) as usize],
            solid_values: vec![Self::SOLID],
            marks: HashMap::new(),
        }
    }

    /// Create a level from pre-parsed cell values.
    pub fn from_cells(
        width: u32,
        height: u32,
        grid_size: u32,
        cells: Vec<i32>,
    ) -> Result<Self, EngineError> {
        let expected = (width * height) as usize;
        if cells.len() != expected {
            return Err(EngineError::LevelSizeMismatch {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            cells,
            ..Self::new(width, height, grid_size)
        })
    }

    /// Create a level from ASCII rows, `#` marking solid cells.
    /// Every row must have the same length.
    pub fn from_rows(grid_size: u32, rows: &[&str]) -> Result<Self, EngineError> {
        let height = rows.len() as u32;
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if let Some((row, len)) = rows
            .iter()
            .map(|r| r.chars().count())
            .enumerate()
            .find(|&(_, len)| len != width)
        {
            return Err(EngineError::RaggedRow {
                row,
                expected: width,
                actual: len,
            });
        }
        let cells: Vec<i32> = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|c| if c == '#' { Self::SOLID } else { 0 })
            .collect();
        Self::from_cells(width as u32, height, grid_size, cells)
    }

    /// Replace the set of values treated as solid.
    pub fn with_solid_values(mut self, values: Vec<i32>) -> Self {
        self.solid_values = values;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Level width in pixels.
    pub fn px_width(&self) -> f32 {
        (self.width * self.grid_size) as f32
    }

    /// Level height in pixels.
    pub fn px_height(&self) -> f32 {
        (self.height * self.grid_size) as f32
    }

    fn index(&self, cx: i32, cy: i32) -> Option<usize> {
        if self.is_valid(cx, cy) {
            Some((cy as u32 * self.width + cx as u32) as usize)
        } else {
            None
        }
    }

    /// Raw cell value, `None` outside the level.
    pub fn value(&self, cx: i32, cy: i32) -> Option<i32> {
        self.index(cx, cy).map(|i| self.cells[i])
    }

    /// Overwrite a cell value. Ignored outside the level.
    pub fn set_value(&mut self, cx: i32, cy: i32, value: i32) {
        if let Some(i) = self.index(cx, cy) {
            self.cells[i] = value;
        }
    }

    /// Fill a rectangular region with a value.
    pub fn fill_rect(&mut self, cx: i32, cy: i32, w: u32, h: u32, value: i32) {
        for y in cy..cy + h as i32 {
            for x in cx..cx + w as i32 {
                self.set_value(x, y, value);
            }
        }
    }

    /// Number of cells carrying `mark` (any direction).
    pub fn mark_count(&self, mark: M) -> usize {
        self.marks.get(&mark).map(|cells| cells.len()).unwrap_or(0)
    }

    /// Drop every mark.
    pub fn clear_marks(&mut self) {
        self.marks.clear();
    }
}

impl<M: Copy + Eq + Hash> GameLevel for GridLevel<M> {
    type Mark = M;

    fn grid_size(&self) -> u32 {
        self.grid_size
    }

    fn is_valid(&self, cx: i32, cy: i32) -> bool {
        cx >= 0 && cy >= 0 && (cx as u32) < self.width && (cy as u32) < self.height
    }

    fn coord_id(&self, cx: i32, cy: i32) -> i32 {
        cx + cy * self.width as i32
    }

    fn has_collision(&self, cx: i32, cy: i32) -> bool {
        match self.value(cx, cy) {
            Some(value) => self.solid_values.contains(&value),
            None => true,
        }
    }

    fn has_mark(&self, cx: i32, cy: i32, mark: M, dir: i32) -> bool {
        self.is_valid(cx, cy)
            && self
                .marks
                .get(&mark)
                .and_then(|cells| cells.get(&self.coord_id(cx, cy)))
                == Some(&dir)
    }

    /// Cells already carrying `mark` with direction 0 keep it.
    fn set_mark(&mut self, cx: i32, cy: i32, mark: M, dir: i32) {
        if self.is_valid(cx, cy) && !self.has_mark(cx, cy, mark, 0) {
            let id = self.coord_id(cx, cy);
            self.marks.entry(mark).or_default().insert(id, dir.clamp(-1, 1));
        }
    }
}
