use crate::scene::surface::DrawSurface;
use glam::Vec2;
use log::warn;
use std::str::FromStr;

/// How a scene's grid is tiled. Hex grids come in two orientations,
/// named for the axis their rows run along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridType {
    #[default]
    None,
    Square,
    HorizontalHex,
    VerticalHex,
}

impl FromStr for GridType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(GridType::None),
            "square" => Ok(GridType::Square),
            "horizontal-hex" | "horizontalhex" => Ok(GridType::HorizontalHex),
            "vertical-hex" | "verticalhex" => Ok(GridType::VerticalHex),
            _ => Err(format!("Unknown grid type: {}", s)),
        }
    }
}

impl GridType {
    pub fn readable(&self) -> &'static str {
        match self {
            GridType::None => "None",
            GridType::Square => "Square",
            GridType::HorizontalHex => "Horizontal Hexes",
            GridType::VerticalHex => "Vertical Hexes",
        }
    }
}

/// Fraction of a hex cell that two neighboring rows/columns overlap by,
/// i.e. the pitch along the staggered axis is 0.75 * grid_size.
const HEX_PITCH: f32 = 0.75;

/// The scene's grid: pixel dimensions, cell size and the derived cell
/// counts. `grid_width`/`grid_height` are never written directly, they
/// are recomputed from the other four values on every rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridState {
    pub width: f32,
    pub height: f32,
    pub grid_width: u32,
    pub grid_height: u32,
    pub grid_size: f32,
    pub grid_type: GridType,
}

impl GridState {
    /// Recomputes the cell counts and redraws the grid geometry. The same
    /// inputs always produce the same counts and the same drawn geometry;
    /// nothing accumulates across rebuilds.
    #[profiling::function]
    pub fn rebuild(&mut self, surface: &mut dyn DrawSurface) {
        surface.clear_grid();

        if self.grid_type != GridType::None && self.grid_size <= 0.0 {
            warn!("Ignoring a grid rebuild with cell size {}", self.grid_size);
            self.grid_width = 0;
            self.grid_height = 0;
            return;
        }

        match self.grid_type {
            GridType::None => {
                self.grid_width = 0;
                self.grid_height = 0;
            }
            GridType::Square => self.build_square_grid(surface),
            GridType::HorizontalHex => self.build_horizontal_hex_grid(surface),
            GridType::VerticalHex => self.build_vertical_hex_grid(surface),
        }
    }

    /// Cells fully or partially covering `pixels` at the given pitch.
    fn cell_count(pixels: f32, pitch: f32) -> u32 {
        if pixels <= 0.0 || pitch <= 0.0 {
            return 0;
        }
        (pixels / pitch).ceil() as u32
    }

    fn build_square_grid(&mut self, surface: &mut dyn DrawSurface) {
        self.grid_width = Self::cell_count(self.width, self.grid_size);
        self.grid_height = Self::cell_count(self.height, self.grid_size);

        for column in 0..=self.grid_width {
            let x = column as f32 * self.grid_size;
            surface.line(Vec2::new(x, 0.0), Vec2::new(x, self.height));
        }
        for row in 0..=self.grid_height {
            let y = row as f32 * self.grid_size;
            surface.line(Vec2::new(0.0, y), Vec2::new(self.width, y));
        }
    }

    fn build_horizontal_hex_grid(&mut self, surface: &mut dyn DrawSurface) {
        self.grid_width = Self::cell_count(self.width, self.grid_size);
        self.grid_height = Self::cell_count(self.height, self.grid_size * HEX_PITCH);

        for row in 0..self.grid_height {
            for column in 0..self.grid_width {
                let center = self.cell_center(column, row);
                surface.polygon(&horizontal_hex_points(center, self.grid_size));
            }
        }
    }

    fn build_vertical_hex_grid(&mut self, surface: &mut dyn DrawSurface) {
        self.grid_width = Self::cell_count(self.width, self.grid_size * HEX_PITCH);
        self.grid_height = Self::cell_count(self.height, self.grid_size);

        for row in 0..self.grid_height {
            for column in 0..self.grid_width {
                let center = self.cell_center(column, row);
                surface.polygon(&vertical_hex_points(center, self.grid_size));
            }
        }
    }

    /// The pixel center of a cell. Hex grids stagger every other row
    /// (horizontal) or column (vertical) by half a cell.
    pub fn cell_center(&self, column: u32, row: u32) -> Vec2 {
        let size = self.grid_size;
        let half = size / 2.0;
        match self.grid_type {
            GridType::None | GridType::Square => Vec2::new(
                column as f32 * size + half,
                row as f32 * size + half,
            ),
            GridType::HorizontalHex => {
                let stagger = if row % 2 == 1 { half } else { 0.0 };
                Vec2::new(
                    column as f32 * size + half + stagger,
                    row as f32 * size * HEX_PITCH + half,
                )
            }
            GridType::VerticalHex => {
                let stagger = if column % 2 == 1 { half } else { 0.0 };
                Vec2::new(
                    column as f32 * size * HEX_PITCH + half,
                    row as f32 * size + half + stagger,
                )
            }
        }
    }

    /// Snaps a position to the center of the nearest cell. With no grid
    /// (or a degenerate cell size) the position passes through untouched.
    pub fn snap(&self, position: Vec2) -> Vec2 {
        if self.grid_type == GridType::None || self.grid_size <= 0.0 {
            return position;
        }

        let size = self.grid_size;
        let half = size / 2.0;

        let (column, row) = match self.grid_type {
            GridType::None => unreachable!(),
            GridType::Square => (
                ((position.x - half) / size).round().max(0.0) as u32,
                ((position.y - half) / size).round().max(0.0) as u32,
            ),
            GridType::HorizontalHex => {
                let row = ((position.y - half) / (size * HEX_PITCH)).round().max(0.0) as u32;
                let stagger = if row % 2 == 1 { half } else { 0.0 };
                let column = ((position.x - half - stagger) / size).round().max(0.0) as u32;
                (column, row)
            }
            GridType::VerticalHex => {
                let column = ((position.x - half) / (size * HEX_PITCH)).round().max(0.0) as u32;
                let stagger = if column % 2 == 1 { half } else { 0.0 };
                let row = ((position.y - half - stagger) / size).round().max(0.0) as u32;
                (column, row)
            }
        };

        self.cell_center(column, row)
    }
}

/// A pointy-top hexagon spanning `size` in both axes, so that rows pack
/// at a 0.75 * size pitch.
fn horizontal_hex_points(center: Vec2, size: f32) -> Vec<Vec2> {
    let half = size / 2.0;
    let quarter = size / 4.0;
    vec![
        Vec2::new(center.x, center.y - half),
        Vec2::new(center.x + half, center.y - quarter),
        Vec2::new(center.x + half, center.y + quarter),
        Vec2::new(center.x, center.y + half),
        Vec2::new(center.x - half, center.y + quarter),
        Vec2::new(center.x - half, center.y - quarter),
    ]
}

/// The flat-top mirror of `horizontal_hex_points`.
fn vertical_hex_points(center: Vec2, size: f32) -> Vec<Vec2> {
    let half = size / 2.0;
    let quarter = size / 4.0;
    vec![
        Vec2::new(center.x - half, center.y),
        Vec2::new(center.x - quarter, center.y - half),
        Vec2::new(center.x + quarter, center.y - half),
        Vec2::new(center.x + half, center.y),
        Vec2::new(center.x + quarter, center.y + half),
        Vec2::new(center.x - quarter, center.y + half),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::surface::RecordingSurface;

    fn grid(grid_type: GridType) -> GridState {
        GridState {
            width: 800.0,
            height: 600.0,
            grid_size: 50.0,
            grid_type,
            ..GridState::default()
        }
    }

    #[test]
    fn square_counts_cover_the_scene() {
        let mut state = grid(GridType::Square);
        let mut surface = RecordingSurface::new();
        state.rebuild(&mut surface);

        assert_eq!(state.grid_width, 16);
        assert_eq!(state.grid_height, 12);
        // 17 vertical + 13 horizontal lines.
        assert_eq!(surface.current_grid().len(), 30);
    }

    #[test]
    fn horizontal_hex_counts_follow_the_row_pitch() {
        let mut state = grid(GridType::HorizontalHex);
        let mut surface = RecordingSurface::new();
        state.rebuild(&mut surface);

        assert_eq!(state.grid_width, 16);
        // 600 / (50 * 0.75) = 16 rows exactly.
        assert_eq!(state.grid_height, 16);
        assert_eq!(surface.current_grid().len(), 16 * 16);
    }

    #[test]
    fn vertical_hex_counts_follow_the_column_pitch() {
        let mut state = grid(GridType::VerticalHex);
        let mut surface = RecordingSurface::new();
        state.rebuild(&mut surface);

        // 800 / 37.5 = 21.33, partially covered cells count.
        assert_eq!(state.grid_width, 22);
        assert_eq!(state.grid_height, 12);
    }

    #[test]
    fn rebuild_is_deterministic_and_does_not_accumulate() {
        let mut state = grid(GridType::HorizontalHex);
        let mut surface = RecordingSurface::new();

        state.rebuild(&mut surface);
        let first: Vec<_> = surface.current_grid().to_vec();
        let (first_width, first_height) = (state.grid_width, state.grid_height);

        state.rebuild(&mut surface);
        assert_eq!(surface.current_grid(), first.as_slice());
        assert_eq!(state.grid_width, first_width);
        assert_eq!(state.grid_height, first_height);
    }

    #[test]
    fn none_clears_geometry_and_counts() {
        let mut state = grid(GridType::Square);
        let mut surface = RecordingSurface::new();
        state.rebuild(&mut surface);

        state.grid_type = GridType::None;
        state.rebuild(&mut surface);
        assert_eq!(state.grid_width, 0);
        assert_eq!(state.grid_height, 0);
        assert!(surface.current_grid().is_empty());
    }

    #[test]
    fn degenerate_cell_size_is_rejected() {
        let mut state = grid(GridType::Square);
        state.grid_size = 0.0;
        let mut surface = RecordingSurface::new();
        state.rebuild(&mut surface);
        assert_eq!(state.grid_width, 0);
        assert!(surface.current_grid().is_empty());
    }

    #[test]
    fn odd_hex_rows_are_staggered() {
        let state = grid(GridType::HorizontalHex);
        let even = state.cell_center(0, 0);
        let odd = state.cell_center(0, 1);
        assert_eq!(even.x + 25.0, odd.x);
        assert_eq!(odd.y - even.y, 50.0 * 0.75);
    }

    #[test]
    fn snap_lands_on_cell_centers() {
        let state = grid(GridType::Square);
        assert_eq!(state.snap(Vec2::new(60.0, 60.0)), Vec2::new(75.0, 75.0));
        assert_eq!(state.snap(Vec2::new(40.0, 10.0)), Vec2::new(25.0, 25.0));

        let hex = grid(GridType::HorizontalHex);
        let snapped = hex.snap(hex.cell_center(3, 5) + Vec2::new(2.0, -3.0));
        assert_eq!(snapped, hex.cell_center(3, 5));
    }

    #[test]
    fn snap_without_grid_passes_through() {
        let state = grid(GridType::None);
        let position = Vec2::new(123.4, 56.7);
        assert_eq!(state.snap(position), position);
    }
}
