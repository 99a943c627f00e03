//! Resolution selection from the per-width F and critical-value volumes.
//!
//! `R = F / critical` per width; each foreground pixel takes the first width
//! with the largest ratio. Pixels whose best ratio does not exceed 1 get the
//! `width_max` sentinel (unresolved at the tested widths).
use crate::image::{ImageF64, Mask};
use crate::volume::WidthVolume;
use serde::Serialize;

/// Per-pixel selected width; background pixels store 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMap {
    pub n: usize,
    pub width0: usize,
    pub width_max: usize,
    pub data: Vec<usize>,
    #[serde(skip)]
    foreground: Vec<bool>,
}

impl ResolutionMap {
    /// Selected width at `(x, y)`, `None` for background pixels.
    pub fn get(&self, x: usize, y: usize) -> Option<usize> {
        let i = y * self.n + x;
        self.foreground[i].then_some(self.data[i])
    }

    /// True when the pixel resolved below the `width_max` sentinel.
    pub fn is_resolved(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_some_and(|w| w < self.width_max)
    }

    /// Number of foreground pixels that resolved below the sentinel.
    pub fn resolved_count(&self) -> usize {
        self.data
            .iter()
            .zip(&self.foreground)
            .filter(|&(&w, &fg)| fg && w < self.width_max)
            .count()
    }

    /// Histogram of selected widths over foreground pixels, indexed from `width0`.
    pub fn histogram(&self) -> Vec<usize> {
        let mut hist = vec![0; self.width_max - self.width0 + 1];
        for (&w, &fg) in self.data.iter().zip(&self.foreground) {
            if fg {
                hist[w - self.width0] += 1;
            }
        }
        hist
    }
}

/// Ratio volume and the resulting resolution map.
pub struct Aggregation {
    pub ratio: WidthVolume,
    pub map: ResolutionMap,
}

/// `F / critical`, 0 wherever the critical value is 0 (outside the fit set).
pub fn ratio_volume(f_stat: &WidthVolume, critical: &WidthVolume) -> WidthVolume {
    let planes = f_stat
        .planes
        .iter()
        .zip(&critical.planes)
        .map(|(f, c)| {
            let mut out = ImageF64::new(f.w, f.h);
            for ((o, &fv), &cv) in out.data.iter_mut().zip(&f.data).zip(&c.data) {
                *o = if cv > 0.0 { fv / cv } else { 0.0 };
            }
            out
        })
        .collect();
    WidthVolume::new(f_stat.width0, planes)
}

/// Select the resolution of every foreground pixel.
pub fn aggregate(
    f_stat: &WidthVolume,
    critical: &WidthVolume,
    mask: &Mask,
    width_max: usize,
) -> Aggregation {
    let ratio = ratio_volume(f_stat, critical);
    let n = mask.w;
    let mut data = vec![0usize; n * mask.h];
    for (i, slot) in data.iter_mut().enumerate() {
        if !mask.data[i] {
            continue;
        }
        let mut best = f64::NEG_INFINITY;
        let mut best_level = 0usize;
        for (level, plane) in ratio.planes.iter().enumerate() {
            // Strict comparison keeps the first width on ties and ignores NaN.
            if plane.data[i] > best {
                best = plane.data[i];
                best_level = level;
            }
        }
        *slot = if best > 1.0 {
            ratio.width_of(best_level)
        } else {
            width_max
        };
    }
    Aggregation {
        map: ResolutionMap {
            n,
            width0: f_stat.width0,
            width_max,
            data,
            foreground: mask.data.clone(),
        },
        ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume(width0: usize, values: &[&[f64]]) -> WidthVolume {
        let planes = values
            .iter()
            .map(|v| ImageF64::from_vec(v.len(), 1, v.to_vec()).unwrap())
            .collect();
        WidthVolume::new(width0, planes)
    }

    fn mask(flags: &[bool]) -> Mask {
        Mask::from_vec(flags.len(), 1, flags.to_vec()).unwrap()
    }

    #[test]
    fn picks_width_with_largest_ratio() {
        let f = volume(2, &[&[3.0, 1.0], &[9.0, 1.0], &[4.0, 1.5]]);
        let c = volume(2, &[&[2.0, 2.0], &[3.0, 2.0], &[2.0, 2.0]]);
        let m = mask(&[true, true]);
        let agg = aggregate(&f, &c, &m, 4);
        assert_eq!(agg.map.data, vec![3, 4]);
        assert_eq!(agg.ratio.plane(3).unwrap().data, vec![3.0, 0.5]);
        assert_eq!(agg.map.resolved_count(), 1);
        assert_eq!(agg.map.histogram(), vec![0, 1, 1]);
    }

    #[test]
    fn ties_keep_the_finest_width() {
        let f = volume(1, &[&[4.0], &[4.0], &[2.0]]);
        let c = volume(1, &[&[2.0], &[2.0], &[1.0]]);
        let agg = aggregate(&f, &c, &mask(&[true]), 3);
        assert_eq!(agg.map.data, vec![1]);
    }

    #[test]
    fn ratio_of_exactly_one_is_unresolved() {
        let f = volume(2, &[&[2.0], &[1.0]]);
        let c = volume(2, &[&[2.0], &[2.0]]);
        let agg = aggregate(&f, &c, &mask(&[true]), 3);
        assert_eq!(agg.map.data, vec![3]);
        assert!(!agg.map.is_resolved(0, 0));
    }

    #[test]
    fn infinite_ratio_resolves_and_nan_is_ignored() {
        let f = volume(2, &[&[f64::NAN], &[f64::INFINITY], &[5.0]]);
        let c = volume(2, &[&[2.0], &[2.0], &[2.0]]);
        let agg = aggregate(&f, &c, &mask(&[true]), 4);
        assert_eq!(agg.map.data, vec![3]);
    }

    #[test]
    fn background_is_never_reported() {
        let f = volume(2, &[&[50.0, 50.0]]);
        let c = volume(2, &[&[2.0, 0.0]]);
        let agg = aggregate(&f, &c, &mask(&[false, true]), 2);
        assert_eq!(agg.map.get(0, 0), None);
        assert_eq!(agg.map.data[0], 0);
        assert_eq!(agg.map.get(1, 0), Some(2));
        assert_eq!(agg.ratio.planes[0].data, vec![25.0, 0.0]);
    }
}
