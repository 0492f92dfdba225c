//! Area-of-effect footprints.
//!
//! Geometry is done on tile centres in `glam::Vec2` and snapped back to
//! integer tiles. Footprints may extend past the grid; callers only care
//! about tiles that hold an entity.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use skirmish_grid::Tile;

/// Half-angle of a cone, in degrees.
pub const CONE_HALF_ANGLE_DEG: f32 = 45.0;

/// Footprint shape of an area effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaShape {
    /// Every tile within the radius of the aim point
    Circle,
    /// A wedge opening from the caster toward the aim point
    Cone,
    /// A straight run of tiles from the caster toward the aim point
    Line,
}

fn center(tile: Tile) -> Vec2 {
    tile.as_vec2()
}

/// Returns true if `point` lies within `radius` of `center` (inclusive).
#[must_use]
pub fn within_radius(center: Vec2, point: Vec2, radius: f32) -> bool {
    center.distance_squared(point) <= radius * radius + f32::EPSILON
}

/// Tiles covered by an area effect cast from `origin` at `aim`.
///
/// - `Circle`: tiles whose centre is within `radius` of `aim`.
/// - `Cone`: tiles within `radius` of `origin` whose direction from the
///   origin is within [`CONE_HALF_ANGLE_DEG`] of the origin-to-aim
///   direction. The origin itself is excluded.
/// - `Line`: `radius` distinct tiles stepped along the origin-to-aim
///   direction, each rounded to the nearest tile.
///
/// Cones and lines aimed at the origin cover nothing.
///
/// # Example
///
/// ```
/// use skirmish_core::resolver::{aoe_tiles, AreaShape};
/// use skirmish_core::Tile;
///
/// let line = aoe_tiles(Tile::new(0, 0), Tile::new(5, 0), AreaShape::Line, 3);
/// assert_eq!(line, vec![Tile::new(1, 0), Tile::new(2, 0), Tile::new(3, 0)]);
/// ```
#[must_use]
pub fn aoe_tiles(origin: Tile, aim: Tile, shape: AreaShape, radius: u32) -> Vec<Tile> {
    let r = i32::try_from(radius).unwrap_or(i32::MAX / 2);
    #[allow(clippy::cast_precision_loss)]
    let rf = radius as f32;

    match shape {
        AreaShape::Circle => square_around(aim, r)
            .filter(|&t| within_radius(center(aim), center(t), rf))
            .collect(),
        AreaShape::Cone => {
            let Some(dir) = (center(aim) - center(origin)).try_normalize() else {
                return Vec::new();
            };
            let min_cos = CONE_HALF_ANGLE_DEG.to_radians().cos() - 1e-5;
            square_around(origin, r)
                .filter(|&t| t != origin)
                .filter(|&t| within_radius(center(origin), center(t), rf))
                .filter(|&t| {
                    (center(t) - center(origin))
                        .try_normalize()
                        .is_some_and(|v| v.dot(dir) >= min_cos)
                })
                .collect()
        }
        AreaShape::Line => {
            let Some(dir) = (center(aim) - center(origin)).try_normalize() else {
                return Vec::new();
            };
            // A unit step gains at least 0.7 on the major axis, so two
            // steps always reach a new tile.
            let wanted = usize::try_from(radius).unwrap_or(usize::MAX);
            let max_steps = radius.saturating_mul(2);
            let mut tiles: Vec<Tile> = Vec::new();
            let mut step = 0;
            while tiles.len() < wanted && step < max_steps {
                step += 1;
                #[allow(clippy::cast_precision_loss)]
                let point = center(origin) + dir * step as f32;
                let tile = point.round().as_ivec2();
                if tiles.last() != Some(&tile) {
                    tiles.push(tile);
                }
            }
            tiles
        }
    }
}

/// Tiles of the square of half-width `r` around `c`, row-major.
fn square_around(c: Tile, r: i32) -> impl Iterator<Item = Tile> {
    (-r..=r).flat_map(move |dy| (-r..=r).map(move |dx| c + Tile::new(dx, dy)))
}
