//! Render abstract module grids as pixel rasters.
//!
//! A [ModuleGrid] comes from the external symbol encoder (wrapped by
//! [encoder]); [render] maps it onto a [PixelRaster] of the requested
//! physical size, surrounded by at least `quiet_zone` light modules and
//! scaled by a whole number of pixels per module so module boundaries
//! never alias. Rendering is a pure function of its inputs.

use thiserror::Error;

pub mod encoder;

/// Errors that can occur when encoding or rendering a symbol.
#[derive(Debug, Error)]
pub enum Error {
    #[error("module grid is empty")]
    EmptyGrid,
    #[error("module count {0} does not match {1}x{2} grid")]
    Dimensions(usize, usize, usize),
    #[error("symbol encoding failed: {0}")]
    Encoding(#[from] qrcode::types::QrError),
}

/// Error-correction level requested from the symbol encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EcLevel {
    Low,
    Medium,
    Quartile,
    High,
}

/// A binary module grid (true = dark) plus encoder metadata, immutable
/// once produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleGrid {
    width: usize,
    height: usize,
    modules: Vec<bool>,
    ec_level: EcLevel,
    version: i16,
}

impl ModuleGrid {
    /// Builds a grid from row-major cells.
    pub fn new(
        width: usize,
        height: usize,
        modules: Vec<bool>,
        ec_level: EcLevel,
        version: i16,
    ) -> Result<Self, Error> {
        if modules.len() != width * height {
            return Err(Error::Dimensions(modules.len(), width, height));
        }
        Ok(Self {
            width,
            height,
            modules,
            ec_level,
            version,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Side length of the symbol in modules (equals width for the square
    /// symbols the encoder produces).
    pub fn dimension(&self) -> usize {
        self.width
    }

    pub fn ec_level(&self) -> EcLevel {
        self.ec_level
    }

    pub fn version(&self) -> i16 {
        self.version
    }

    /// Whether the cell at (x, y) is dark.
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.width + x]
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A rendered pixel raster (true = dark pixel), immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelRaster {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
}

impl PixelRaster {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the pixel at (x, y) is dark.
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.pixels[y * self.width + x]
    }

    /// Number of dark pixels in the raster.
    pub fn dark_count(&self) -> usize {
        self.pixels.iter().filter(|&&dark| dark).count()
    }
}

/// Renders a module grid into a raster of at least `target_width` x
/// `target_height` pixels.
///
/// The output is never smaller than the quiet-zone-padded grid: each
/// axis is the maximum of the requested target and the minimum footprint
/// `grid + 2 * quiet_zone`. The scale factor is the largest integer that
/// fits the footprint into the output on both axes, and the scaled grid
/// is centered, which distributes the quiet zone plus any slack
/// symmetrically.
pub fn render(
    grid: &ModuleGrid,
    target_width: usize,
    target_height: usize,
    quiet_zone: usize,
) -> Result<PixelRaster, Error> {
    if grid.is_empty() {
        return Err(Error::EmptyGrid);
    }

    let footprint_width = grid.width() + 2 * quiet_zone;
    let footprint_height = grid.height() + 2 * quiet_zone;
    let output_width = target_width.max(footprint_width);
    let output_height = target_height.max(footprint_height);

    let scale = (output_width / footprint_width).min(output_height / footprint_height);

    // Centering, not edge-anchored placement: padding covers the quiet
    // zone and any extra slack the target dimensions left over.
    let left_padding = (output_width - grid.width() * scale) / 2;
    let top_padding = (output_height - grid.height() * scale) / 2;

    let mut pixels = vec![false; output_width * output_height];
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if !grid.get(x, y) {
                continue;
            }
            let base_x = left_padding + x * scale;
            for dy in 0..scale {
                let row = (top_padding + y * scale + dy) * output_width;
                pixels[row + base_x..row + base_x + scale].fill(true);
            }
        }
    }

    Ok(PixelRaster {
        width: output_width,
        height: output_height,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkered(width: usize, height: usize) -> ModuleGrid {
        let modules = (0..width * height).map(|i| i % 2 == 0).collect();
        ModuleGrid::new(width, height, modules, EcLevel::Low, 1).unwrap()
    }

    #[test]
    fn test_empty_grid_rejected() {
        let grid = ModuleGrid::new(0, 0, Vec::new(), EcLevel::Low, 1).unwrap();
        assert!(matches!(render(&grid, 100, 100, 4), Err(Error::EmptyGrid)));
    }

    #[test]
    fn test_mismatched_cell_count_rejected() {
        assert!(matches!(
            ModuleGrid::new(3, 3, vec![true; 8], EcLevel::Low, 1),
            Err(Error::Dimensions(8, 3, 3))
        ));
    }

    #[test]
    fn test_non_square_slack_reconciliation() {
        // Grid 25x25 with quiet zone 4 has footprint 33x33. Requesting
        // 200x160 keeps both axes (each >= the footprint), the scale is
        // min(200/33, 160/33) = 4, and the 100x100 scaled grid centers
        // with 50/30 pixel margins.
        let grid = checkered(25, 25);
        let raster = render(&grid, 200, 160, 4).unwrap();
        assert_eq!((raster.width(), raster.height()), (200, 160));

        let dark_modules = (0..25 * 25).filter(|i| i % 2 == 0).count();
        assert_eq!(raster.dark_count(), dark_modules * 4 * 4);

        // Top-left module is dark; its scaled block starts at (50, 30).
        assert!(raster.get(50, 30));
        assert!(raster.get(53, 33));
        assert!(!raster.get(49, 30));
        assert!(!raster.get(50, 29));
        // First light module starts one block to the right.
        assert!(!raster.get(54, 30));
    }

    #[test]
    fn test_output_never_smaller_than_footprint() {
        let grid = checkered(21, 21);
        let raster = render(&grid, 10, 10, 4).unwrap();
        assert_eq!((raster.width(), raster.height()), (29, 29));

        // Scale clamps to 1 and the quiet zone splits evenly.
        assert!(raster.get(4, 4));
        assert!(!raster.get(3, 4));
    }

    #[test]
    fn test_scale_is_largest_fitting_integer() {
        let grid = checkered(25, 25);
        let raster = render(&grid, 100, 100, 4).unwrap();
        assert_eq!((raster.width(), raster.height()), (100, 100));
        // footprint 33, scale 3, padding (100 - 75) / 2 = 12.
        assert!(raster.get(12, 12));
        assert!(raster.get(14, 14));
        assert!(!raster.get(11, 12));
        assert!(!raster.get(15, 12));
    }

    #[test]
    fn test_single_module_fills_output_without_quiet_zone() {
        let grid = ModuleGrid::new(1, 1, vec![true], EcLevel::Low, 1).unwrap();
        let raster = render(&grid, 5, 5, 0).unwrap();
        assert_eq!((raster.width(), raster.height()), (5, 5));
        assert_eq!(raster.dark_count(), 25);
    }

    #[test]
    fn test_single_module_centers_within_quiet_zone() {
        let grid = ModuleGrid::new(1, 1, vec![true], EcLevel::Low, 1).unwrap();
        let raster = render(&grid, 0, 0, 2).unwrap();
        assert_eq!((raster.width(), raster.height()), (5, 5));
        assert_eq!(raster.dark_count(), 1);
        assert!(raster.get(2, 2));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let grid = checkered(25, 25);
        assert_eq!(
            render(&grid, 200, 160, 4).unwrap(),
            render(&grid, 200, 160, 4).unwrap()
        );
    }
}
