//! Key-less LSB statistics.
//!
//! Every feature is normalized so that 1.0 looks like uniformly random low
//! bits and 0.0 looks like the structured low bits of a natural image.
//!
//! Statistics are taken over a region of pixels, normally the ones an
//! adaptive embedder would write. Flat areas never carry data and only
//! dilute the signal.

use crate::carrier::PixelGrid;
use crate::config::{detector_params::MIN_PAIR_COUNT, COLOR_CHANNELS};
use serde::Serialize;

/// Features of one colour channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ChannelFeatures {
    /// Fraction of samples whose LSB is set.
    pub ones_ratio: f64,
    /// `1 - 2·|ones_ratio - 0.5|`.
    pub balance: f64,
    /// Raw pairs-of-values chi-square.
    pub chi_square: f64,
    /// Value pairs that entered the chi-square.
    pub pair_count: usize,
    /// Chi-square mapped to [0, 1]; 1 when pairs are as even as chance.
    pub pair: f64,
    /// `1 - |corr(bit 0, bit 1)|`.
    pub plane: f64,
    /// `1 - |corr(LSB(x), LSB(x + 1))|`, horizontal neighbours.
    pub neighbor: f64,
    /// Sample-pair estimate of the share of samples whose LSB was replaced.
    pub rate: f64,
}

/// Per-channel features plus their means.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionFeatures {
    pub channels: Vec<ChannelFeatures>,
    /// Pixels the statistics were taken over.
    pub region_pixels: usize,
    pub balance: f64,
    pub pair: f64,
    pub plane: f64,
    pub neighbor: f64,
    pub rate: f64,
}

/// Running sums for the Pearson correlation of two bit sequences.
#[derive(Debug, Default, Clone, Copy)]
struct BitCorrelation {
    n: u64,
    a: u64,
    b: u64,
    ab: u64,
}

impl BitCorrelation {
    #[inline]
    fn push(&mut self, a: u8, b: u8) {
        self.n += 1;
        self.a += u64::from(a);
        self.b += u64::from(b);
        self.ab += u64::from(a & b);
    }

    /// |corr|, with a constant sequence counted as fully correlated.
    fn abs_corr(&self) -> f64 {
        if self.n == 0 {
            return 1.0;
        }
        let n = self.n as f64;
        let (pa, pb) = (self.a as f64 / n, self.b as f64 / n);
        let var_a = pa * (1.0 - pa);
        let var_b = pb * (1.0 - pb);
        if var_a <= 0.0 || var_b <= 0.0 {
            return 1.0;
        }
        let cov = self.ab as f64 / n - pa * pb;
        (cov / (var_a * var_b).sqrt()).abs().min(1.0)
    }
}

/// Trace sets kept by [`SamplePairs`]: `m` in `0..TRACES`.
const TRACES: usize = 128;

/// Horizontal sample pairs counted per trace set.
///
/// A pair `(u, v)` lies in trace `m = v/2 - u/2`. Within a trace, `odd_up`
/// counts `v - u = 2m + 1` and `odd_down` counts `v - u = 2m - 1`.
#[derive(Debug, Clone)]
struct SamplePairs {
    total: [u64; TRACES],
    odd_up: [u64; TRACES],
    odd_down: [u64; TRACES],
}

impl Default for SamplePairs {
    fn default() -> Self {
        Self {
            total: [0; TRACES],
            odd_up: [0; TRACES],
            odd_down: [0; TRACES],
        }
    }
}

impl SamplePairs {
    #[inline]
    fn push(&mut self, u: u8, v: u8) {
        let m = i32::from(v >> 1) - i32::from(u >> 1);
        if m < 0 {
            return;
        }
        let diff = i32::from(v) - i32::from(u);
        let t = m as usize;
        self.total[t] += 1;
        if diff == 2 * m + 1 {
            self.odd_up[t] += 1;
        } else if diff == 2 * m - 1 {
            self.odd_down[t] += 1;
        }
    }

    /// Estimated share of samples whose LSB was overwritten, in [0, 1].
    ///
    /// In a natural image a difference of `2m + 1` starts at an even value as
    /// often as at an odd one. Replacing LSBs at rate `p` moves pairs between
    /// the sets of a trace in a known way, which leaves a quadratic in
    /// `r = 1 - p`. The larger root is the estimate.
    fn replaced_share(&self) -> f64 {
        let last = TRACES - 1;
        let odd = |m: usize| (self.odd_up[m] + self.odd_down[m]) as f64;
        let skew = |m: usize| self.odd_up[m] as f64 - self.odd_down[m] as f64;

        let s1 = odd(0) - odd(last);
        let s2: f64 = (0..last).map(skew).sum::<f64>() + (1..=last).map(skew).sum::<f64>();
        let s3 = self.total[0] as f64 - self.total[last] as f64;

        let (a, b, c) = (s3 / 2.0, s2, s1 - s3 / 2.0);
        let r = if a == 0.0 {
            if b == 0.0 {
                return 0.0;
            }
            -c / b
        } else {
            let disc = b * b - 4.0 * a * c;
            if disc < 0.0 {
                -b / (2.0 * a)
            } else {
                let root = disc.sqrt();
                ((-b + root) / (2.0 * a)).max((-b - root) / (2.0 * a))
            }
        };
        (1.0 - r).clamp(0.0, 1.0)
    }
}

/// Extract features from every colour channel of `grid`.
///
/// `region` holds one flag per pixel in raster order; unflagged pixels are
/// skipped. A region whose length does not match the image means the whole
/// image.
pub fn extract_features(grid: &PixelGrid, region: &[bool]) -> DetectionFeatures {
    let whole = region.len() != grid.pixel_count();
    let inside = |x: u32, y: u32| whole || region[(y as usize) * grid.width() as usize + x as usize];

    let channels: Vec<ChannelFeatures> = (0..COLOR_CHANNELS)
        .map(|c| channel_features(grid, c, &inside))
        .collect();
    let region_pixels = if whole {
        grid.pixel_count()
    } else {
        region.iter().filter(|&&p| p).count()
    };

    DetectionFeatures {
        region_pixels,
        balance: mean(&channels, |c| c.balance),
        pair: mean(&channels, |c| c.pair),
        plane: mean(&channels, |c| c.plane),
        neighbor: mean(&channels, |c| c.neighbor),
        rate: mean(&channels, |c| c.rate),
        channels,
    }
}

fn mean(channels: &[ChannelFeatures], f: impl Fn(&ChannelFeatures) -> f64) -> f64 {
    channels.iter().map(f).sum::<f64>() / channels.len() as f64
}

fn channel_features(
    grid: &PixelGrid,
    c: usize,
    inside: &impl Fn(u32, u32) -> bool,
) -> ChannelFeatures {
    let mut histogram = [0u64; 256];
    let mut planes = BitCorrelation::default();
    let mut neighbors = BitCorrelation::default();
    let mut pairs = SamplePairs::default();

    for y in 0..grid.height() {
        let mut prev: Option<u8> = None;
        for x in 0..grid.width() {
            if !inside(x, y) {
                prev = None;
                continue;
            }
            let v = grid.get(x, y, c);
            histogram[v as usize] += 1;
            let lsb = v & 1;
            planes.push(lsb, (v >> 1) & 1);
            if let Some(p) = prev {
                neighbors.push(p & 1, lsb);
                pairs.push(p, v);
            }
            prev = Some(v);
        }
    }

    let ones_ratio = if planes.n == 0 {
        0.0
    } else {
        planes.a as f64 / planes.n as f64
    };
    let (chi_square, pair_count) = pairs_of_values(&histogram);

    ChannelFeatures {
        ones_ratio,
        balance: 1.0 - 2.0 * (ones_ratio - 0.5).abs(),
        chi_square,
        pair_count,
        pair: pair_score(chi_square, pair_count),
        plane: 1.0 - planes.abs_corr(),
        neighbor: 1.0 - neighbors.abs_corr(),
        rate: pairs.replaced_share(),
    }
}

/// Chi-square of the value pairs (2k, 2k+1) against an even split.
///
/// Sparse pairs are skipped; they only add noise.
fn pairs_of_values(histogram: &[u64; 256]) -> (f64, usize) {
    let mut chi = 0.0;
    let mut df = 0;
    for pair in histogram.chunks_exact(2) {
        let (n0, n1) = (pair[0], pair[1]);
        let total = n0 + n1;
        if total < MIN_PAIR_COUNT {
            continue;
        }
        let diff = n0 as f64 - n1 as f64;
        chi += diff * diff / total as f64;
        df += 1;
    }
    (chi, df)
}

/// Under the null hypothesis the statistic per pair averages 1; the excess
/// above that is what drives the score down.
fn pair_score(chi_square: f64, pair_count: usize) -> f64 {
    if pair_count == 0 {
        return 0.0;
    }
    let excess = (chi_square / pair_count as f64 - 1.0).max(0.0);
    1.0 / (1.0 + excess)
}
