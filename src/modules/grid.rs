use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type AgentId = u32;

/// Radius of the neighborhood agents move and sense within.
pub const MOORE_RADIUS: i32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn origin() -> Self {
        Self { x: 0, y: 0 }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn manhattan(self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("position {position} is outside the {width}x{height} grid")]
    OutOfBounds {
        position: Position,
        width: i32,
        height: i32,
    },
    #[error("cell {position} is already occupied by agent {occupied_by}")]
    Occupied {
        position: Position,
        occupied_by: AgentId,
    },
    #[error("agent {0} is not on the grid")]
    UnknownAgent(AgentId),
}

/// Bounded grid where every cell holds at most one agent.
#[derive(Debug, Clone)]
pub struct GridWorld {
    width: i32,
    height: i32,
    occupied: HashMap<Position, AgentId>,
    locations: HashMap<AgentId, Position>,
}

impl GridWorld {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            occupied: HashMap::new(),
            locations: HashMap::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    pub fn is_empty(&self, pos: Position) -> bool {
        self.contains(pos) && !self.occupied.contains_key(&pos)
    }

    pub fn occupant(&self, pos: Position) -> Option<AgentId> {
        self.occupied.get(&pos).copied()
    }

    pub fn position_of(&self, agent: AgentId) -> Option<Position> {
        self.locations.get(&agent).copied()
    }

    pub fn agent_count(&self) -> usize {
        self.locations.len()
    }

    pub fn place(&mut self, agent: AgentId, pos: Position) -> Result<(), GridError> {
        self.check_bounds(pos)?;
        if let Some(other) = self.occupied.get(&pos) {
            return Err(GridError::Occupied {
                position: pos,
                occupied_by: *other,
            });
        }

        if let Some(previous) = self.locations.insert(agent, pos) {
            self.occupied.remove(&previous);
        }
        self.occupied.insert(pos, agent);
        Ok(())
    }

    /// Vacates the agent's cell and occupies `to`. Leaves the grid untouched on error.
    pub fn move_agent(&mut self, agent: AgentId, to: Position) -> Result<Position, GridError> {
        self.check_bounds(to)?;
        let from = self
            .position_of(agent)
            .ok_or(GridError::UnknownAgent(agent))?;
        if let Some(other) = self.occupied.get(&to) {
            if *other != agent {
                return Err(GridError::Occupied {
                    position: to,
                    occupied_by: *other,
                });
            }
            return Ok(from);
        }

        self.occupied.remove(&from);
        self.occupied.insert(to, agent);
        self.locations.insert(agent, to);
        Ok(from)
    }

    /// Moore neighborhood clipped at the grid edges, in x-major order.
    pub fn neighborhood(&self, pos: Position, radius: i32, include_center: bool) -> Vec<Position> {
        let mut cells = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if dx == 0 && dy == 0 && !include_center {
                    continue;
                }
                let cell = pos.offset(dx, dy);
                if self.contains(cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// All cells in x-major order.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.width).flat_map(move |x| (0..self.height).map(move |y| Position { x, y }))
    }

    fn check_bounds(&self, pos: Position) -> Result<(), GridError> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                position: pos,
                width: self.width,
                height: self.height,
            })
        }
    }
}
