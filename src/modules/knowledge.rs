use crate::modules::grid::Position;

/// Dense boolean layer over the grid, indexed x-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl Layer {
    pub fn new(width: i32, height: i32) -> Self {
        let len = (width.max(0) as usize) * (height.max(0) as usize);
        Self {
            width,
            height,
            cells: vec![false; len],
        }
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x < 0 || pos.x >= self.width || pos.y < 0 || pos.y >= self.height {
            return None;
        }
        Some(pos.x as usize * self.height as usize + pos.y as usize)
    }

    pub fn get(&self, pos: Position) -> bool {
        self.index(pos).map(|i| self.cells[i]).unwrap_or(false)
    }

    pub fn set(&mut self, pos: Position, value: bool) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = value;
        }
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    pub fn any(&self) -> bool {
        self.cells.iter().any(|c| *c)
    }

    /// Set cells in x-major order (lowest x first, then lowest y).
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let height = self.height.max(1) as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .map(move |(i, _)| Position {
                x: (i / height) as i32,
                y: (i % height) as i32,
            })
    }
}

/// Ground truth about food and storage next to what the colony has sensed.
#[derive(Debug, Clone)]
pub struct KnowledgeLayers {
    food: Layer,
    known_food: Layer,
    spawned_food: Layer,
    storage: Option<Position>,
    known_storage: Option<Position>,
}

impl KnowledgeLayers {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            food: Layer::new(width, height),
            known_food: Layer::new(width, height),
            spawned_food: Layer::new(width, height),
            storage: None,
            known_storage: None,
        }
    }

    pub fn food(&self) -> &Layer {
        &self.food
    }

    pub fn known_food(&self) -> &Layer {
        &self.known_food
    }

    /// Every cell food was ever spawned on.
    pub fn spawned_food(&self) -> &Layer {
        &self.spawned_food
    }

    pub fn has_food(&self, pos: Position) -> bool {
        self.food.get(pos)
    }

    pub fn is_known_food(&self, pos: Position) -> bool {
        self.known_food.get(pos)
    }

    /// Ground-truth storage cell; `None` only before initialization places it.
    pub fn storage(&self) -> Option<Position> {
        self.storage
    }

    pub fn known_storage(&self) -> Option<Position> {
        self.known_storage
    }

    pub fn storage_known(&self) -> bool {
        self.known_storage.is_some()
    }

    /// Fixes the storage location. Later calls are ignored.
    pub fn place_storage(&mut self, storage: Position) -> bool {
        if self.storage.is_some() {
            return false;
        }
        self.storage = Some(storage);
        true
    }

    pub fn add_food(&mut self, pos: Position) {
        self.food.set(pos, true);
        self.spawned_food.set(pos, true);
    }

    /// Marks `pos` as known food if ground truth has food there. Never clears.
    pub fn sense_food(&mut self, pos: Position) -> bool {
        if self.food.get(pos) && !self.known_food.get(pos) {
            self.known_food.set(pos, true);
            return true;
        }
        false
    }

    /// Records the storage location once it has been sensed at `pos`.
    pub fn sense_storage(&mut self, pos: Position) -> bool {
        if self.storage == Some(pos) && self.known_storage.is_none() {
            self.known_storage = Some(pos);
            return true;
        }
        false
    }

    /// Removes food from both layers. Returns false if there was nothing to take.
    pub fn take_food(&mut self, pos: Position) -> bool {
        if !self.food.get(pos) {
            return false;
        }
        self.food.set(pos, false);
        self.known_food.set(pos, false);
        true
    }

    /// Nearest known food by Manhattan distance; ties go to lowest x, then lowest y.
    pub fn nearest_known_food(&self, from: Position) -> Option<Position> {
        let mut best: Option<(i32, Position)> = None;
        for pos in self.known_food.positions() {
            let dist = from.manhattan(pos);
            match best {
                Some((best_dist, _)) if dist >= best_dist => {}
                _ => best = Some((dist, pos)),
            }
        }
        best.map(|(_, pos)| pos)
    }
}
