//! Area patterns and their resolution onto the grid.
//!
//! A pattern is authored relative to an implicit forward of (0, 1) and
//! rotated by quarter turns to match a release facing. Feature codes tag
//! each cell so pipeline steps can pick out the cells they act on; the
//! color rides along for targeting highlights and is never inspected here.

use crate::state::{Facing, MapOracle, Position};

/// RGBA highlight color carried per pattern cell for the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl CellColor {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const CYAN: Self = Self::rgb(0, 255, 255);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl Default for CellColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// One cell of an area pattern: offset from the release cell, a feature code
/// selecting which steps act on it, and a highlight color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatternCell {
    pub offset: (i32, i32),
    pub feature_code: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub color: CellColor,
}

impl PatternCell {
    pub const fn new(offset: (i32, i32), feature_code: i32) -> Self {
        Self {
            offset,
            feature_code,
            color: CellColor::WHITE,
        }
    }
}

/// Ordered set of pattern cells relative to the release point.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AreaPattern {
    pub cells: Vec<PatternCell>,
}

impl AreaPattern {
    pub fn new(cells: impl IntoIterator<Item = PatternCell>) -> Self {
        Self {
            cells: cells.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The pattern rotated from its authored forward (0, 1) into `facing`.
    /// Feature codes and colors are carried unchanged.
    pub fn rotated(&self, facing: Facing) -> AreaPattern {
        AreaPattern {
            cells: self
                .cells
                .iter()
                .map(|cell| PatternCell {
                    offset: facing.rotate_offset(cell.offset),
                    ..*cell
                })
                .collect(),
        }
    }
}

/// An absolute grid cell a pattern landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedCell {
    pub position: Position,
    pub feature_code: i32,
    pub color: CellColor,
}

/// Maps a pattern onto absolute cells around `release`.
///
/// Rotates first when a facing is supplied, then translates. Offsets that
/// land outside the map are silently dropped; an empty result is legal and
/// left to the caller to treat as a degraded no-op.
pub fn resolve(
    map: &(impl MapOracle + ?Sized),
    release: Position,
    pattern: &AreaPattern,
    facing: Option<Facing>,
) -> Vec<ResolvedCell> {
    let rotated;
    let cells = match facing {
        Some(facing) => {
            rotated = pattern.rotated(facing);
            &rotated.cells
        }
        None => &pattern.cells,
    };

    cells
        .iter()
        .filter_map(|cell| {
            let position = release.offset_by(cell.offset.0, cell.offset.1);
            map.contains(position).then_some(ResolvedCell {
                position,
                feature_code: cell.feature_code,
                color: cell.color,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GridMap;

    fn cross() -> AreaPattern {
        AreaPattern::new([
            PatternCell::new((0, 0), 0),
            PatternCell::new((0, 1), 1),
            PatternCell::new((0, -1), 1),
            PatternCell::new((1, 0), 1),
            PatternCell::new((-1, 0), 1),
        ])
    }

    #[test]
    fn cross_rotated_right_matches_fixture() {
        let rotated = cross().rotated(Facing::Right);
        let offsets: Vec<_> = rotated.cells.iter().map(|c| c.offset).collect();
        assert_eq!(offsets, vec![(0, 0), (1, 0), (-1, 0), (0, -1), (0, 1)]);
    }

    #[test]
    fn four_quarter_turns_round_trip() {
        let line = AreaPattern::new([
            PatternCell::new((0, 1), 2),
            PatternCell::new((0, 2), 2),
            PatternCell::new((1, 2), 3),
        ]);
        let mut rotated = line.clone();
        for _ in 0..4 {
            rotated = rotated.rotated(Facing::Right);
        }
        assert_eq!(rotated, line);
        // A full turn via Down twice is the same as the identity.
        assert_eq!(line.rotated(Facing::Down).rotated(Facing::Down), line);
    }

    #[test]
    fn rotation_preserves_codes_and_colors() {
        let mut pattern = cross();
        pattern.cells[1].color = CellColor::RED;
        let rotated = pattern.rotated(Facing::Left);
        assert_eq!(rotated.cells[1].feature_code, 1);
        assert_eq!(rotated.cells[1].color, CellColor::RED);
    }

    #[test]
    fn resolve_translates_and_drops_out_of_bounds() {
        let map = GridMap::new(3, 3);
        // Release in a corner: up and right survive, down and left fall off.
        let resolved = resolve(&map, Position::ORIGIN, &cross(), None);
        let positions: Vec<_> = resolved.iter().map(|c| c.position).collect();
        assert_eq!(
            positions,
            vec![Position::new(0, 0), Position::new(0, 1), Position::new(1, 0)]
        );
    }

    #[test]
    fn resolve_applies_facing_before_translation() {
        let map = GridMap::new(5, 5);
        let spear = AreaPattern::new([PatternCell::new((0, 1), 7), PatternCell::new((0, 2), 7)]);
        let resolved = resolve(&map, Position::new(2, 2), &spear, Some(Facing::Right));
        let positions: Vec<_> = resolved.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![Position::new(3, 2), Position::new(4, 2)]);
    }

    #[test]
    fn resolve_can_return_empty() {
        let map = GridMap::new(2, 2);
        let far = AreaPattern::new([PatternCell::new((10, 10), 0)]);
        assert!(resolve(&map, Position::ORIGIN, &far, None).is_empty());
    }
}
