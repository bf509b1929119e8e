use petri_core::{Cell, CellCoord, Distribution, FieldView, Movement};
use petri_system_nutrients::distribution_nutrient;

/// Fraction of the nutrients under an organism it absorbs each tick.
const FEEDING_FRACTION: f64 = 0.01;

/// Square grid holding occupancy, energy and nutrients of the dish.
#[derive(Clone, Debug)]
pub struct Field {
    radius: u32,
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    offset: CellCoord,
    drift: Movement,
    distribution: Distribution,
}

impl Field {
    /// Creates an empty dish of the given radius seeded with `distribution`.
    pub(crate) fn new(radius: u32, distribution: Distribution) -> Self {
        let side = radius.saturating_mul(2);
        let capacity = usize::try_from(u64::from(side) * u64::from(side)).unwrap_or(0);
        let mut field = Self {
            radius,
            width: side,
            height: side,
            cells: vec![Cell::default(); capacity],
            offset: CellCoord::new(0, 0),
            drift: Movement::STILL,
            distribution,
        };
        field.seed_nutrients();
        field
    }

    fn seed_nutrients(&mut self) {
        let width = i32::try_from(self.width).unwrap_or(i32::MAX);
        let height = i32::try_from(self.height).unwrap_or(i32::MAX);
        for y in 0..height {
            for x in 0..width {
                let amount = distribution_nutrient(x, y, width, height, self.distribution);
                if let Some(cell) = self.cell_mut(CellCoord::new(x, y)) {
                    cell.nutrients = amount;
                }
            }
        }
    }

    /// Dish radius in cells.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Nutrient distribution the dish was seeded with.
    #[must_use]
    pub const fn distribution(&self) -> Distribution {
        self.distribution
    }

    /// Current nutrient read offset, always within the grid.
    #[must_use]
    pub const fn nutrient_offset(&self) -> CellCoord {
        self.offset
    }

    /// Direction the nutrient offset moves on active drift ticks.
    #[must_use]
    pub const fn drift(&self) -> Movement {
        self.drift
    }

    /// Reports whether the unwrapped coordinate lies strictly inside the dish.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let radius = i64::from(self.radius);
        let dx = radius - i64::from(cell.x());
        let dy = radius - i64::from(cell.y());
        dx * dx + dy * dy < radius * radius
    }

    /// Number of cells inside the dish.
    #[must_use]
    pub fn dish_capacity(&self) -> usize {
        self.coordinates().filter(|cell| self.contains(*cell)).count()
    }

    /// Cell stored at an in-range coordinate, without wrapping.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<&Cell> {
        self.index(cell).and_then(|index| self.cells.get(index))
    }

    /// Read-only view handed to policies and adapters.
    #[must_use]
    pub fn view(&self) -> FieldView<'_> {
        FieldView::new(
            &self.cells,
            self.width,
            self.height,
            self.offset,
            self.distribution,
        )
    }

    /// Sum of the nutrients left anywhere on the grid.
    #[must_use]
    pub fn total_nutrients(&self) -> f64 {
        self.cells.iter().map(|cell| cell.nutrients).sum()
    }

    /// Every in-range coordinate in row-major order.
    pub fn coordinates(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let width = i32::try_from(self.width).unwrap_or(0);
        let height = i32::try_from(self.height).unwrap_or(0);
        (0..height).flat_map(move |y| (0..width).map(move |x| CellCoord::new(x, y)))
    }

    pub(crate) fn cell_mut(&mut self, cell: CellCoord) -> Option<&mut Cell> {
        self.index(cell).and_then(|index| self.cells.get_mut(index))
    }

    pub(crate) fn is_empty(&self, cell: CellCoord) -> bool {
        self.cell(cell).is_some_and(|cell| cell.occupant.is_none())
    }

    /// Moves a share of the nutrients under the drift offset into the occupant.
    pub(crate) fn feed(&mut self, cell: CellCoord) {
        let Some(source) = self.nutrient_index(cell) else {
            return;
        };
        let Some(available) = self.cells.get(source).map(|cell| cell.nutrients) else {
            return;
        };
        let portion = FEEDING_FRACTION * available;
        if let Some(organism) = self.cell_mut(cell) {
            organism.energy += portion;
        }
        if let Some(supply) = self.cells.get_mut(source) {
            supply.nutrients = (supply.nutrients - portion).max(0.0);
        }
    }

    pub(crate) fn set_offset(&mut self, x: i64, y: i64) {
        let width = i64::from(self.width.max(1));
        let height = i64::from(self.height.max(1));
        let x = i32::try_from(x.rem_euclid(width)).unwrap_or(0);
        let y = i32::try_from(y.rem_euclid(height)).unwrap_or(0);
        self.offset = CellCoord::new(x, y);
    }

    pub(crate) fn set_drift(&mut self, drift: Movement) {
        self.drift = drift;
    }

    /// Slides the nutrient field by one drift step.
    pub(crate) fn shift_nutrients(&mut self) {
        let x = i64::from(self.offset.x()) + i64::from(self.drift.dx());
        let y = i64::from(self.offset.y()) + i64::from(self.drift.dy());
        self.set_offset(x, y);
    }

    fn nutrient_index(&self, cell: CellCoord) -> Option<usize> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let x = (i64::from(cell.x()) + i64::from(self.offset.x())).rem_euclid(i64::from(self.width));
        let y =
            (i64::from(cell.y()) + i64::from(self.offset.y())).rem_euclid(i64::from(self.height));
        self.index(CellCoord::new(i32::try_from(x).ok()?, i32::try_from(y).ok()?))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.x()).ok()?;
        let row = u32::try_from(cell.y()).ok()?;
        if column < self.width && row < self.height {
            let width = usize::try_from(self.width).ok()?;
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
