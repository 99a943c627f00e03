//! Window extraction for the foreground pixels of one width.
//!
//! Windows are packed into one pre-sized arena (`pixels × side²` values),
//! flattened row-major to match [`WindowGrid`](crate::directions::WindowGrid).
use crate::image::{ImageF64, ImageView};
use serde::{Deserialize, Serialize};

/// How windows reaching past the image border are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Pixels whose window leaves the image are not fit at that width.
    #[default]
    Skip,
    /// Out-of-range samples repeat the nearest edge pixel.
    Clamp,
    /// Out-of-range samples mirror about the edge pixel (edge not repeated).
    Reflect,
}

impl BoundaryPolicy {
    /// Source index for `pos + offset` along an axis of length `len`.
    fn resolve(self, pos: usize, offset: isize, len: usize) -> Option<usize> {
        let idx = pos as isize + offset;
        if (0..len as isize).contains(&idx) {
            return Some(idx as usize);
        }
        match self {
            BoundaryPolicy::Skip => None,
            BoundaryPolicy::Clamp => Some(idx.clamp(0, len as isize - 1) as usize),
            BoundaryPolicy::Reflect => Some(reflect_index(idx, len)),
        }
    }
}

fn reflect_index(idx: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let m = idx.rem_euclid(period);
    if m < len as isize {
        m as usize
    } else {
        (period - m) as usize
    }
}

/// Packed windows of the pixels that could be extracted at one width.
pub struct WindowArena {
    pub width: usize,
    pub side: usize,
    /// `(x, y)` of each packed window.
    pub pixels: Vec<(usize, usize)>,
    /// Row-major windows, `side²` values each.
    pub values: Vec<f64>,
    /// Foreground pixels left out under [`BoundaryPolicy::Skip`].
    pub skipped: usize,
}

impl WindowArena {
    pub fn extract(
        image: &ImageF64,
        coords: &[(usize, usize)],
        width: usize,
        policy: BoundaryPolicy,
    ) -> Self {
        let side = 2 * width + 1;
        let len = side * side;
        let inside = coords
            .iter()
            .filter(|&&(x, y)| policy != BoundaryPolicy::Skip || window_fits(image, x, y, width))
            .count();
        let mut pixels = Vec::with_capacity(inside);
        let mut values = Vec::with_capacity(inside * len);
        let w = width as isize;
        for &(x, y) in coords {
            if policy == BoundaryPolicy::Skip && !window_fits(image, x, y, width) {
                continue;
            }
            for dr in -w..=w {
                // Skip was filtered above, so every index resolves.
                let row = policy.resolve(y, dr, image.height()).unwrap_or(y);
                let src = image.row(row);
                for dc in -w..=w {
                    let col = policy.resolve(x, dc, image.width()).unwrap_or(x);
                    values.push(src[col]);
                }
            }
            pixels.push((x, y));
        }
        Self {
            width,
            side,
            skipped: coords.len() - pixels.len(),
            pixels,
            values,
        }
    }

    #[inline]
    pub fn window_len(&self) -> usize {
        self.side * self.side
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn window(&self, i: usize) -> &[f64] {
        let n = self.window_len();
        &self.values[i * n..(i + 1) * n]
    }
}

#[inline]
fn window_fits(image: &ImageF64, x: usize, y: usize, width: usize) -> bool {
    x >= width && y >= width && x + width < image.width() && y + width < image.height()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> ImageF64 {
        ImageF64::from_fn(n, n, |x, y| (y * 10 + x) as f64)
    }

    #[test]
    fn windows_are_row_major_around_pixel() {
        let img = ramp(5);
        let arena = WindowArena::extract(&img, &[(2, 2)], 1, BoundaryPolicy::Skip);
        assert_eq!(arena.len(), 1);
        assert_eq!(
            arena.window(0),
            &[11.0, 12.0, 13.0, 21.0, 22.0, 23.0, 31.0, 32.0, 33.0]
        );
    }

    #[test]
    fn skip_drops_border_pixels() {
        let img = ramp(4);
        let coords: Vec<_> = (0..4).flat_map(|y| (0..4).map(move |x| (x, y))).collect();
        let arena = WindowArena::extract(&img, &coords, 1, BoundaryPolicy::Skip);
        assert_eq!(arena.pixels, vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
        assert_eq!(arena.skipped, 12);
        assert_eq!(arena.values.len(), 4 * 9);
    }

    #[test]
    fn clamp_repeats_edge() {
        let img = ramp(3);
        let arena = WindowArena::extract(&img, &[(0, 0)], 1, BoundaryPolicy::Clamp);
        assert_eq!(
            arena.window(0),
            &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 10.0, 10.0, 11.0]
        );
        assert_eq!(arena.skipped, 0);
    }

    #[test]
    fn reflect_mirrors_without_repeating_edge() {
        assert_eq!(reflect_index(-1, 4), 1);
        assert_eq!(reflect_index(-2, 4), 2);
        assert_eq!(reflect_index(4, 4), 2);
        assert_eq!(reflect_index(5, 4), 1);
        assert_eq!(reflect_index(-7, 3), 1);
        assert_eq!(reflect_index(3, 1), 0);
        let img = ramp(3);
        let arena = WindowArena::extract(&img, &[(0, 0)], 1, BoundaryPolicy::Reflect);
        assert_eq!(
            arena.window(0),
            &[11.0, 10.0, 11.0, 1.0, 0.0, 1.0, 11.0, 10.0, 11.0]
        );
    }
}
