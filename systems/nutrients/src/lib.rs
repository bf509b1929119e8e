#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure nutrient distribution generator used to seed the dish.
//!
//! Every distribution is a deterministic function of the cell coordinate and
//! the grid extent. The world calls [`nutrient`] once per cell at
//! construction; nothing here holds state.

use petri_core::{Distribution, MAX_NUTRIENT};

/// Initial nutrient quantity for the cell `(x, y)` on a `max_x` by `max_y` grid.
///
/// `distribution_id` selects one of the six layouts (`1..=6`, see
/// [`Distribution::id`]). Unknown selectors yield zero everywhere.
#[must_use]
pub fn nutrient(x: i32, y: i32, max_x: i32, max_y: i32, distribution_id: u32) -> f64 {
    match Distribution::from_id(distribution_id) {
        Ok(distribution) => distribution_nutrient(x, y, max_x, max_y, distribution),
        Err(_) => 0.0,
    }
}

/// Initial nutrient quantity for the cell `(x, y)` under a known distribution.
#[must_use]
pub fn distribution_nutrient(
    x: i32,
    y: i32,
    max_x: i32,
    max_y: i32,
    distribution: Distribution,
) -> f64 {
    match distribution {
        Distribution::InclinedPlane => plane(x, y, max_x, max_y) / 2.875,
        Distribution::VerticalBar => {
            let middle = max_x / 2;
            if middle - 5 < x && x < middle + 5 {
                MAX_NUTRIENT / 4.2
            } else {
                0.0
            }
        }
        Distribution::Ring => {
            let dx = f64::from(x) - 0.5 * f64::from(max_x);
            let dy = f64::from(y) - 0.5 * f64::from(max_y);
            let squared = dx * dx + dy * dy;
            if 40.0 < squared && squared < 115.0 {
                MAX_NUTRIENT / 1.008
            } else {
                0.0
            }
        }
        Distribution::Lattice => {
            let rising = lattice_line(x + y, max_x / 4);
            let falling = lattice_line(y - x, max_x / 3);
            if rising || falling {
                plane(x, y, max_x, max_y) * 1.277
            } else {
                0.0
            }
        }
        Distribution::TwoGaussians => {
            MAX_NUTRIENT * (gaussian(x, y, max_x, max_y, 0.3) + gaussian(x, y, max_x, max_y, 0.7))
        }
        Distribution::Famine => MAX_NUTRIENT / 11.062,
    }
}

fn plane(x: i32, y: i32, max_x: i32, max_y: i32) -> f64 {
    let area = f64::from(max_x) * f64::from(max_y);
    if area == 0.0 {
        return 0.0;
    }
    MAX_NUTRIENT * f64::from(max_x - x) * f64::from(max_y - y) / area
}

// A zero spacing means the grid is too small for that family of lines.
fn lattice_line(value: i32, spacing: i32) -> bool {
    spacing > 0 && value.rem_euclid(spacing) <= 1
}

fn gaussian(x: i32, y: i32, max_x: i32, max_y: i32, center: f64) -> f64 {
    let width = f64::from(max_x);
    let height = f64::from(max_y);
    let u = (f64::from(x) - center * width) / (width / 8.0);
    let v = (f64::from(y) - center * height) / (height / 8.0);
    (-(u * u) - v * v).exp()
}
