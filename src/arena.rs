//! The arena's navigable surface.
//!
//! A coarse walkability grid parsed from a row-of-characters layout. It is
//! the crate's built-in implementation of the navigation capability the
//! behavior systems consume: sampling a valid surface point near a
//! requested position, computing agent paths, and answering line-occlusion
//! queries for the perception subsystem.

use bevy_ecs::resource::Resource;
use glam::Vec2;
use pathfinding::prelude::dijkstra;
use rand::Rng;

use crate::constants::CELL_SIZE;
use crate::error::{ArenaError, GameResult};

type Cell = (i32, i32);

#[derive(Resource)]
pub struct Arena {
    width: i32,
    height: i32,
    walkable: Vec<bool>,
    player_start: Vec2,
}

impl Arena {
    /// Parses a raw layout into an arena.
    ///
    /// `#` is a wall, `.` is open floor, `P` is open floor marking the
    /// player start. Any other character is a layout error.
    pub fn parse(rows: &[&str]) -> GameResult<Arena> {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |row| row.chars().count()) as i32;

        let mut walkable = Vec::with_capacity((width * height) as usize);
        let mut player_start = None;

        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() as i32 != width {
                return Err(ArenaError::RaggedRows.into());
            }
            for (x, ch) in row.chars().enumerate() {
                match ch {
                    '#' => walkable.push(false),
                    '.' => walkable.push(true),
                    'P' => {
                        walkable.push(true);
                        player_start = Some(Self::center_of((x as i32, y as i32)));
                    }
                    other => return Err(ArenaError::UnknownCharacter(other).into()),
                }
            }
        }

        let player_start = player_start.ok_or(ArenaError::MissingPlayerStart)?;

        Ok(Arena {
            width,
            height,
            walkable,
            player_start,
        })
    }

    pub fn player_start(&self) -> Vec2 {
        self.player_start
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        cell.0 >= 0 && cell.0 < self.width && cell.1 >= 0 && cell.1 < self.height
    }

    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && self.walkable[(cell.1 * self.width + cell.0) as usize]
    }

    /// The cell containing a world-space point.
    pub fn cell_at(point: Vec2) -> Cell {
        ((point.x / CELL_SIZE).floor() as i32, (point.y / CELL_SIZE).floor() as i32)
    }

    fn center_of(cell: Cell) -> Vec2 {
        Vec2::new(
            (cell.0 as f32 + 0.5) * CELL_SIZE,
            (cell.1 as f32 + 0.5) * CELL_SIZE,
        )
    }

    /// Finds a valid point on the walkable surface within `tolerance` units
    /// of `point`, or `None` if there is none.
    ///
    /// The containing cell is preferred; otherwise the nearest walkable cell
    /// center inside the tolerance radius wins.
    pub fn sample_position(&self, point: Vec2, tolerance: f32) -> Option<Vec2> {
        let origin = Self::cell_at(point);
        if self.is_walkable(origin) {
            return Some(point);
        }

        let radius = (tolerance / CELL_SIZE).ceil() as i32;
        let mut best: Option<(f32, Vec2)> = None;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let cell = (origin.0 + dx, origin.1 + dy);
                if !self.is_walkable(cell) {
                    continue;
                }
                let center = Self::center_of(cell);
                let distance = center.distance(point);
                if distance > tolerance {
                    continue;
                }
                if best.is_none_or(|(d, _)| distance < d) {
                    best = Some((distance, center));
                }
            }
        }
        best.map(|(_, center)| center)
    }

    /// Calculates a path of cell centers from `from` to `to` using Dijkstra's
    /// algorithm over the 4-connected walkability grid.
    ///
    /// Returns `None` when either endpoint is off the surface or no path
    /// exists. The starting cell is not included in the result.
    pub fn find_path(&self, from: Vec2, to: Vec2) -> Option<Vec<Vec2>> {
        let start = Self::cell_at(from);
        let goal = Self::cell_at(to);
        if !self.is_walkable(start) || !self.is_walkable(goal) {
            return None;
        }
        if start == goal {
            return Some(vec![to]);
        }

        let (cells, _) = dijkstra(
            &start,
            |&cell| {
                let mut successors = Vec::with_capacity(4);
                for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                    let next = (cell.0 + dx, cell.1 + dy);
                    if self.is_walkable(next) {
                        successors.push((next, 1u32));
                    }
                }
                successors
            },
            |&cell| cell == goal,
        )?;

        let mut path: Vec<Vec2> = cells.into_iter().skip(1).map(Self::center_of).collect();
        // Steer at the exact destination rather than the goal cell's center.
        if let Some(last) = path.last_mut() {
            *last = to;
        }
        Some(path)
    }

    /// Whether a wall occludes the straight line between two points.
    ///
    /// Samples the segment at quarter-cell steps, which is fine-grained
    /// enough for the sight ranges this core uses.
    pub fn line_blocked(&self, from: Vec2, to: Vec2) -> bool {
        let length = from.distance(to);
        if length < f32::EPSILON {
            return false;
        }
        let steps = (length / (CELL_SIZE * 0.25)).ceil() as i32;
        for i in 0..=steps {
            let point = from.lerp(to, i as f32 / steps as f32);
            if !self.is_walkable(Self::cell_at(point)) {
                return true;
            }
        }
        false
    }

    /// A uniformly random walkable cell center, used for unconstrained spawn
    /// position selection.
    pub fn random_point(&self, rng: &mut impl Rng) -> Vec2 {
        loop {
            let cell = (
                rng.random_range(0..self.width),
                rng.random_range(0..self.height),
            );
            if self.is_walkable(cell) {
                return Self::center_of(cell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROWS: [&str; 5] = [
        "########",
        "#P.....#",
        "#..##..#",
        "#......#",
        "########",
    ];

    #[test]
    fn parse_records_player_start() {
        let arena = Arena::parse(&ROWS).unwrap();
        assert_eq!(Arena::cell_at(arena.player_start()), (1, 1));
    }

    #[test]
    fn parse_rejects_unknown_characters() {
        let result = Arena::parse(&["#?#"]);
        assert!(result.is_err());
    }

    #[test]
    fn sample_position_prefers_the_requested_point() {
        let arena = Arena::parse(&ROWS).unwrap();
        let point = Vec2::new(2.3, 1.6);
        assert_eq!(arena.sample_position(point, 2.0), Some(point));
    }

    #[test]
    fn sample_position_corrects_onto_the_surface() {
        let arena = Arena::parse(&ROWS).unwrap();
        // Inside the inner wall block.
        let sampled = arena.sample_position(Vec2::new(3.5, 2.5), 2.0).unwrap();
        assert!(arena.is_walkable(Arena::cell_at(sampled)));
    }

    #[test]
    fn sample_position_fails_outside_tolerance() {
        let arena = Arena::parse(&ROWS).unwrap();
        assert_eq!(arena.sample_position(Vec2::new(-10.0, -10.0), 1.0), None);
    }

    #[test]
    fn path_routes_around_walls() {
        let arena = Arena::parse(&ROWS).unwrap();
        let path = arena
            .find_path(Vec2::new(1.5, 2.5), Vec2::new(6.5, 2.5))
            .unwrap();
        // The direct line is blocked, so the path must detour.
        assert!(path.len() > 5);
        for corner in &path {
            assert!(arena.is_walkable(Arena::cell_at(*corner)));
        }
    }

    #[test]
    fn line_blocked_by_inner_wall() {
        let arena = Arena::parse(&ROWS).unwrap();
        assert!(arena.line_blocked(Vec2::new(1.5, 2.5), Vec2::new(6.5, 2.5)));
        assert!(!arena.line_blocked(Vec2::new(1.5, 1.5), Vec2::new(6.5, 1.5)));
    }
}
