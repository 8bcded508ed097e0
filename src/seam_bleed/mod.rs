//! Euclidean-distance-transform texture dilation ("seam bleed"): fills transparent pixels with
//! the color of the nearest opaque pixel, so that bilinear/mipmap sampling across a UV seam
//! doesn't pick up the transparent background color.

use crate::config::BLEED_ALPHA_THRESHOLD;

/// An offset vector from a grid cell to the nearest seed cell found so far, in cell units.
/// `(9999, 9999)` stands in for "no seed found yet"; its squared magnitude exceeds any
/// reachable distance on a realistically sized grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Offset {
    dx: i32,
    dy: i32,
}

const NONE: Offset = Offset { dx: 9999, dy: 9999 };
const ZERO: Offset = Offset { dx: 0, dy: 0 };

impl Offset {
    fn squared_length(self) -> i64 {
        (self.dx as i64) * (self.dx as i64) + (self.dy as i64) * (self.dy as i64)
    }
}

/// A `(width+2) x (height+2)` grid of offset vectors with a permanent infinite-distance
/// border, so that interior propagation never needs to bounds-check its neighbors.
struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Offset>,
}

impl Grid {
    fn stride(&self) -> usize {
        self.width + 2
    }

    fn index(&self, x: i32, y: i32) -> usize {
        (y + 1) as usize * self.stride() + (x + 1) as usize
    }

    fn get(&self, x: i32, y: i32) -> Offset {
        self.cells[self.index(x, y)]
    }

    fn set(&mut self, x: usize, y: usize, value: Offset) {
        let index = self.index(x as i32, y as i32);
        self.cells[index] = value;
    }

    /// Compares the current offset at `(x, y)` against a candidate formed by propagating the
    /// neighbor `(nx, ny)` cells away: `candidate = neighbor_offset + (nx, ny)`. Keeps whichever
    /// is closer.
    fn propagate(&mut self, x: usize, y: usize, nx: i32, ny: i32) {
        let neighbor = self.get(x as i32 + nx, y as i32 + ny);
        let candidate = Offset {
            dx: neighbor.dx + nx,
            dy: neighbor.dy + ny,
        };
        let current = self.get(x as i32, y as i32);
        if candidate.squared_length() < current.squared_length() {
            self.set(x, y, candidate);
        }
    }
}

/// Fills every pixel whose alpha is exactly 0 with the color of the nearest pixel whose alpha
/// exceeds [`BLEED_ALPHA_THRESHOLD`], measured by a two-pass 8-connected Euclidean distance
/// transform. Leaves the alpha channel of bled pixels at 0, and leaves every other pixel
/// (opaque, or partially transparent but not fully) untouched. If no pixel is opaque, the
/// buffer is returned untouched.
pub fn bleed(
    pixels: &mut [u8],
    width: usize,
    height: usize,
    alpha_offset: usize,
    pixel_stride: usize,
    row_stride: usize,
) {
    let pixel_at = |x: usize, y: usize| y * row_stride + x * pixel_stride;

    let Some(mut grid) = seed_grid(pixels, width, height, alpha_offset, &pixel_at) else {
        return;
    };

    sweep_forward(&mut grid);
    sweep_backward(&mut grid);

    for y in 0..height {
        for x in 0..width {
            let offset = pixel_at(x, y);
            if pixels[offset + alpha_offset] != 0 {
                continue;
            }

            let source_cell = grid.get(x as i32, y as i32);
            let sx = (x as i32 + source_cell.dx) as usize;
            let sy = (y as i32 + source_cell.dy) as usize;
            let source_offset = pixel_at(sx, sy);

            for channel in 0..pixel_stride {
                if channel == alpha_offset {
                    continue;
                }
                pixels[offset + channel] = pixels[source_offset + channel];
            }
            pixels[offset + alpha_offset] = 0;
        }
    }
}

fn seed_grid(
    pixels: &[u8],
    width: usize,
    height: usize,
    alpha_offset: usize,
    pixel_at: &impl Fn(usize, usize) -> usize,
) -> Option<Grid> {
    let mut any_opaque = false;
    let mut cells = vec![NONE; (width + 2) * (height + 2)];
    let stride = width + 2;

    for y in 0..height {
        for x in 0..width {
            let alpha = pixels[pixel_at(x, y) + alpha_offset];
            let seeded = alpha as u32 > BLEED_ALPHA_THRESHOLD as u32;
            any_opaque |= seeded;
            cells[(y + 1) * stride + (x + 1)] = if seeded { ZERO } else { NONE };
        }
    }

    if !any_opaque {
        return None;
    }

    Some(Grid {
        width,
        height,
        cells,
    })
}

/// Top-to-bottom, then (per row) left-to-right and right-to-left sub-passes, per Section 4.5.
fn sweep_forward(grid: &mut Grid) {
    for y in 0..grid.height {
        for x in 0..grid.width {
            grid.propagate(x, y, -1, 0);
            grid.propagate(x, y, 0, -1);
            grid.propagate(x, y, -1, -1);
            grid.propagate(x, y, 1, -1);
        }
        for x in (0..grid.width).rev() {
            grid.propagate(x, y, 1, 0);
        }
    }
}

/// Bottom-to-top, then (per row) right-to-left and left-to-right sub-passes, per Section 4.5.
fn sweep_backward(grid: &mut Grid) {
    for y in (0..grid.height).rev() {
        for x in (0..grid.width).rev() {
            grid.propagate(x, y, 1, 0);
            grid.propagate(x, y, 0, 1);
            grid.propagate(x, y, -1, 1);
            grid.propagate(x, y, 1, 1);
        }
        for x in 0..grid.width {
            grid.propagate(x, y, -1, 0);
        }
    }
}
