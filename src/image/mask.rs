//! Foreground mask selecting the pixels that get analysed.
use crate::error::{ResolutionError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    pub w: usize,
    pub h: usize,
    pub data: Vec<bool>,
}

impl Mask {
    /// Mask with every pixel selected.
    pub fn full(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![true; w * h],
        }
    }

    /// Mask with no pixel selected.
    pub fn empty(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![false; w * h],
        }
    }

    pub fn from_vec(w: usize, h: usize, data: Vec<bool>) -> Result<Self> {
        if data.len() != w * h {
            return Err(ResolutionError::InvalidInputShape(format!(
                "buffer of {} flags cannot hold a {w}x{h} mask",
                data.len()
            )));
        }
        Ok(Self { w, h, data })
    }

    /// Build a mask by evaluating `f(x, y)` at every pixel.
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut mask = Self::empty(w, h);
        for y in 0..h {
            for x in 0..w {
                mask.data[y * w + x] = f(x, y);
            }
        }
        mask
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.w + x]
    }

    /// Number of foreground pixels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&m| m).count()
    }

    /// Foreground pixel coordinates `(x, y)` in row-major order.
    pub fn coords(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(self.count());
        for y in 0..self.h {
            for x in 0..self.w {
                if self.get(x, y) {
                    out.push((x, y));
                }
            }
        }
        out
    }
}

impl crate::image::traits::ImageView for Mask {
    type Pixel = bool;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn row(&self, y: usize) -> &[bool] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }}
