//! Sparse state-action value table for tabular Q-learning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Point;

/// Number of actions in the action set.
pub const ACTION_COUNT: usize = 4;

/// One value per action, indexed by [`Action::index`].
pub type ActionValues = [f32; ACTION_COUNT];

/// Cardinal move on the grid. Y grows downward, so `Down` is `(0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Down,
    Up,
    Right,
    Left,
}

impl Action {
    /// The full action set, in table order.
    pub const ALL: [Action; ACTION_COUNT] =
        [Action::Down, Action::Up, Action::Right, Action::Left];

    /// Position in [`ActionValues`].
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Action::Down => 0,
            Action::Up => 1,
            Action::Right => 2,
            Action::Left => 3,
        }
    }

    /// Unit displacement.
    #[inline]
    pub fn delta(self) -> (f32, f32) {
        match self {
            Action::Down => (0.0, 1.0),
            Action::Up => (0.0, -1.0),
            Action::Right => (1.0, 0.0),
            Action::Left => (-1.0, 0.0),
        }
    }

    /// Snap an arbitrary heading onto the dominant axis, keeping its sign.
    ///
    /// Ties (including the zero heading) resolve to the vertical axis.
    pub fn from_heading(dx: f32, dy: f32) -> Action {
        if dx.abs() > dy.abs() {
            if dx > 0.0 { Action::Right } else { Action::Left }
        } else if dy > 0.0 {
            Action::Down
        } else {
            Action::Up
        }
    }
}

/// Discretized position: the square tile containing a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Floor-divide a point by the tile size.
    #[inline]
    pub fn containing(p: Point, cell_size: f32) -> Self {
        Self {
            x: (p.x / cell_size).floor() as i32,
            y: (p.y / cell_size).floor() as i32,
        }
    }
}

/// Actions ordered by value, highest first. Equal values keep table order.
pub fn ranked_actions(values: &ActionValues) -> [Action; ACTION_COUNT] {
    let mut order = Action::ALL;
    order.sort_by(|a, b| values[b.index()].total_cmp(&values[a.index()]));
    order
}

/// Largest value in a row.
#[inline]
pub fn max_value(values: &ActionValues) -> f32 {
    values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

/// Mapping from grid cell to per-action value estimates.
///
/// Rows are created lazily through [`QTable::entry_or_default`] and always
/// hold a value for every action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<QEntry>", into = "Vec<QEntry>")]
pub struct QTable {
    rows: BTreeMap<GridCell, ActionValues>,
}

/// Serialized form of one table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QEntry {
    pub cell: GridCell,
    pub values: ActionValues,
}

impl From<Vec<QEntry>> for QTable {
    fn from(entries: Vec<QEntry>) -> Self {
        Self {
            rows: entries.into_iter().map(|e| (e.cell, e.values)).collect(),
        }
    }
}

impl From<QTable> for Vec<QEntry> {
    fn from(table: QTable) -> Self {
        table
            .rows
            .into_iter()
            .map(|(cell, values)| QEntry { cell, values })
            .collect()
    }
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row for `cell`, inserting an all-zero row first if absent.
    pub fn entry_or_default(&mut self, cell: GridCell) -> &mut ActionValues {
        self.rows.entry(cell).or_insert([0.0; ACTION_COUNT])
    }

    /// Row for `cell` if it has been visited.
    pub fn get(&self, cell: GridCell) -> Option<&ActionValues> {
        self.rows.get(&cell)
    }

    /// Replace the row for `cell` wholesale.
    pub fn insert(&mut self, cell: GridCell, values: ActionValues) {
        self.rows.insert(cell, values);
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        self.rows.contains_key(&cell)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GridCell, &ActionValues)> {
        self.rows.iter()
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut ActionValues> {
        self.rows.values_mut()
    }

    /// Key-union of two tables. Where both hold a cell, `other`'s row wins whole.
    pub fn merged_with(&self, other: &QTable) -> QTable {
        let mut rows = self.rows.clone();
        rows.extend(other.rows.iter().map(|(cell, values)| (*cell, *values)));
        QTable { rows }
    }
}
