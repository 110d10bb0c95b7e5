//! Level layout, spawn points and terrain marks.

use grid_engine::{EngineError, GameLevel, GridLevel};

/// Terrain annotations the hero and future AI can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelMark {
    PlatformEnd,
    PlatformEndRight,
    PlatformEndLeft,
    /// One-cell ledge next to open floor. The mark dir points at the ledge.
    SmallStep,
}

pub type PlatformerLevel = GridLevel<LevelMark>;

/// Built-in level. `#` solid, `P` hero spawn, `D` diamond.
pub const LEVEL: &[&str] = &[
    "########################################",
    "#......................................#",
    "#......................................#",
    "#..........D...............D...........#",
    "#........#####...........#####.........#",
    "#......................................#",
    "#...D..................................#",
    "#..####..........D............##.....D.#",
    "#..............#####..........##..######",
    "#......................................#",
    "#.P.........#..........#...............#",
    "########################################",
];

/// A parsed level plus where things start.
#[derive(Debug, Clone)]
pub struct LevelLayout {
    pub level: PlatformerLevel,
    pub hero_spawn: Option<(i32, i32)>,
    pub diamond_spawns: Vec<(i32, i32)>,
}

impl LevelLayout {
    /// Parse ASCII rows into collision data and spawn points, then compute marks.
    pub fn from_rows(grid_size: u32, rows: &[&str]) -> Result<Self, EngineError> {
        let mut level = PlatformerLevel::from_rows(grid_size, rows)?;

        let mut hero_spawn = None;
        let mut diamond_spawns = Vec::new();
        for (cy, row) in rows.iter().enumerate() {
            for (cx, c) in row.chars().enumerate() {
                let cell = (cx as i32, cy as i32);
                match c {
                    'P' => hero_spawn = Some(cell),
                    'D' => diamond_spawns.push(cell),
                    _ => {}
                }
            }
        }

        create_level_marks(&mut level);
        Ok(Self {
            level,
            hero_spawn,
            diamond_spawns,
        })
    }
}

/// Tag ledges and platform edges from the collision layer. Replaces any
/// marks computed before.
pub fn create_level_marks(level: &mut PlatformerLevel) {
    level.clear_marks();
    for cy in 0..level.height() as i32 {
        for cx in 0..level.width() as i32 {
            // Open cell standing on something.
            if level.has_collision(cx, cy) || !level.has_collision(cx, cy + 1) {
                continue;
            }

            if !level.has_collision(cx, cy - 1) {
                if level.has_collision(cx + 1, cy) && !level.has_collision(cx + 1, cy - 1) {
                    level.set_mark(cx, cy, LevelMark::SmallStep, 1);
                }
                if level.has_collision(cx - 1, cy) && !level.has_collision(cx - 1, cy - 1) {
                    level.set_mark(cx, cy, LevelMark::SmallStep, -1);
                }
            }

            if level.has_collision(cx + 1, cy)
                || (!level.has_collision(cx + 1, cy + 1) && !level.has_collision(cx + 1, cy + 2))
            {
                level.set_marks(cx, cy, &[LevelMark::PlatformEnd, LevelMark::PlatformEndRight]);
            }
            if level.has_collision(cx - 1, cy)
                || (!level.has_collision(cx - 1, cy + 1) && !level.has_collision(cx - 1, cy + 2))
            {
                level.set_marks(cx, cy, &[LevelMark::PlatformEnd, LevelMark::PlatformEndLeft]);
            }
        }
    }
}
