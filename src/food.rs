use std::collections::HashSet;
use std::ops::RangeInclusive;

use log::debug;
use rand::Rng;

use crate::error::CapacityError;
use crate::grid::{Cell, GridModel};

/// Ticks a cherry stays on the board.
pub const CHERRY_LIFETIME: u32 = 150;
/// Ticks an ice cream stays on the board.
pub const ICE_CREAM_LIFETIME: u32 = 300;
/// Special food never shows up before this frame.
pub const SPECIAL_FOOD_FRAME: u64 = 500;
/// Segments queued by an ice cream.
pub const ICE_CREAM_GROWTH: u32 = 20;

const DIE_SIDES: u32 = 1000;
const CHERRY_ROLL: u32 = 6;
const ICE_CREAM_ROLLS: RangeInclusive<u32> = 1..=3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoodKind {
    Normal,
    Cherry,
    IceCream,
}

impl FoodKind {
    pub fn lifetime(&self) -> Option<u32> {
        match self {
            FoodKind::Normal => None,
            FoodKind::Cherry => Some(CHERRY_LIFETIME),
            FoodKind::IceCream => Some(ICE_CREAM_LIFETIME),
        }
    }

    pub fn points(&self) -> u32 {
        match self {
            FoodKind::Normal => 1,
            FoodKind::Cherry => 10,
            FoodKind::IceCream => 20,
        }
    }

    pub fn effect(&self) -> FoodEffect {
        match self {
            FoodKind::Normal => FoodEffect::Grow,
            FoodKind::Cherry => FoodEffect::Halve,
            FoodKind::IceCream => FoodEffect::QueueGrowth(ICE_CREAM_GROWTH),
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            FoodKind::Normal => '@',
            FoodKind::Cherry => 'o',
            FoodKind::IceCream => '^',
        }
    }
}

/// What eating a piece of food does to the snake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodEffect {
    /// Keep the tail this tick.
    Grow,
    /// Cut the snake in half.
    Halve,
    /// Keep the tail for this many upcoming ticks.
    QueueGrowth(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoodItem {
    pub cell: Cell,
    pub kind: FoodKind,
    /// Ticks left before the item disappears. `None` for normal food.
    pub lifetime: Option<u32>,
}

impl FoodItem {
    pub fn new(cell: Cell, kind: FoodKind) -> Self {
        FoodItem { cell, kind, lifetime: kind.lifetime() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Consumption {
    pub kind: FoodKind,
    pub points: u32,
    pub effect: FoodEffect,
}

/// Owns every piece of food on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodManager {
    normal_count: usize,
    special_enabled: bool,
    items: Vec<FoodItem>,
}

impl FoodManager {
    pub fn new(normal_count: usize, special_enabled: bool) -> Self {
        FoodManager { normal_count, special_enabled, items: Vec::new() }
    }

    pub fn items(&self) -> &[FoodItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count(&self, kind: FoodKind) -> usize {
        self.items.iter().filter(|f| f.kind == kind).count()
    }

    pub fn active(&self, kind: FoodKind) -> Option<&FoodItem> {
        self.items.iter().find(|f| f.kind == kind)
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.items.iter().map(|f| f.cell)
    }

    /// Puts an item on the board as is. Used for fixed layouts.
    pub fn insert(&mut self, item: FoodItem) {
        self.items.push(item);
    }

    /// Places one item of `kind` on a cell that is neither in `occupied` nor
    /// already holding food.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        kind: FoodKind,
        occupied: &HashSet<Cell>,
        grid: &GridModel,
        rng: &mut R,
    ) -> Result<FoodItem, CapacityError> {
        let mut excluded = occupied.clone();
        excluded.extend(self.cells());

        let item = FoodItem::new(grid.random_free_cell(&excluded, rng)?, kind);
        debug!("spawned {:?} at {:?}", kind, item.cell);
        self.items.push(item);
        Ok(item)
    }

    /// Tops normal food back up to the configured count.
    pub fn fill<R: Rng + ?Sized>(
        &mut self,
        occupied: &HashSet<Cell>,
        grid: &GridModel,
        rng: &mut R,
    ) -> Result<(), CapacityError> {
        while self.count(FoodKind::Normal) < self.normal_count {
            self.spawn(FoodKind::Normal, occupied, grid, rng)?;
        }
        Ok(())
    }

    /// Ages special food by one tick and removes whatever ran out.
    pub fn tick(&mut self) -> Vec<FoodItem> {
        for item in self.items.iter_mut() {
            if let Some(life) = item.lifetime.as_mut() {
                *life = life.saturating_sub(1);
            }
        }

        let (expired, alive): (Vec<FoodItem>, Vec<FoodItem>) =
            self.items.drain(..).partition(|f| f.lifetime == Some(0));
        self.items = alive;

        for item in &expired {
            debug!("{:?} at {:?} expired", item.kind, item.cell);
        }
        expired
    }

    /// Eats whatever lies under `head`.
    pub fn try_consume(&mut self, head: Cell) -> Option<Consumption> {
        let index = self.items.iter().position(|f| f.cell == head)?;
        let item = self.items.remove(index);
        debug!("ate {:?} at {:?}", item.kind, item.cell);

        Some(Consumption { kind: item.kind, points: item.kind.points(), effect: item.kind.effect() })
    }

    /// Rolls the die for special food. One roll serves both kinds: a cherry on
    /// exactly `CHERRY_ROLL`, an ice cream on `ICE_CREAM_ROLLS`.
    pub fn roll_special<R: Rng + ?Sized>(
        &mut self,
        frame: u64,
        occupied: &HashSet<Cell>,
        grid: &GridModel,
        rng: &mut R,
    ) -> Vec<FoodItem> {
        if !self.special_enabled {
            return Vec::new();
        }

        let die = rng.gen_range(1..=DIE_SIDES);
        self.spawn_special(die, frame, occupied, grid, rng)
    }

    fn spawn_special<R: Rng + ?Sized>(
        &mut self,
        die: u32,
        frame: u64,
        occupied: &HashSet<Cell>,
        grid: &GridModel,
        rng: &mut R,
    ) -> Vec<FoodItem> {
        let mut spawned = Vec::new();
        if frame < SPECIAL_FOOD_FRAME {
            return spawned;
        }

        let mut wanted = Vec::with_capacity(2);
        if die == CHERRY_ROLL && self.active(FoodKind::Cherry).is_none() {
            wanted.push(FoodKind::Cherry);
        }
        if ICE_CREAM_ROLLS.contains(&die) && self.active(FoodKind::IceCream).is_none() {
            wanted.push(FoodKind::IceCream);
        }

        for kind in wanted {
            match self.spawn(kind, occupied, grid, rng) {
                Ok(item) => spawned.push(item),
                // A full board just means no treat this time
                Err(err) => debug!("skipped {:?}: {}", kind, err),
            }
        }
        spawned
    }
}
