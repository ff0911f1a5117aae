use crate::enums::BinRule;
use crate::error::{Result, ValidationError};
use crate::volume::Volume;

use log::debug;

/// Evenly spaced bins over `[min, max]` of a volume.
///
/// `edges` has one entry more than `counts`. Every bin is half-open except
/// the last one, which also holds the maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    edges: Vec<f64>,
    counts: Vec<u64>,
}

impl Histogram {
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyVolume`] for a volume without voxels.
    pub fn compute(volume: &Volume, rule: BinRule) -> Result<Self> {
        let values: Vec<f64> = volume.data().iter().copied().collect();
        let histogram = Self::from_values(&values, rule, true)?;
        debug!(
            "Histogram with {} bins over [{}, {}]",
            histogram.counts.len(),
            histogram.edges[0],
            histogram.edges[histogram.edges.len() - 1]
        );
        Ok(histogram)
    }

    /// Bin raw values. `integer` keeps estimated bin widths at one or more,
    /// so integer data never gets bins narrower than its resolution.
    pub fn from_values(values: &[f64], rule: BinRule, integer: bool) -> Result<Self, ValidationError> {
        let first = *values.first().ok_or(ValidationError::EmptyVolume)?;
        let (min, max) = values
            .iter()
            .fold((first, first), |(min, max), &v| (min.min(v), max.max(v)));

        // a constant volume still gets one bin of unit width
        let (first_edge, last_edge) = if min == max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };

        let bin_count = match rule {
            BinRule::Count(count) => count.max(1),
            _ => {
                let mut width = estimate_width(values, rule, max - min);
                if width > 0.0 {
                    if integer && width < 1.0 {
                        width = 1.0;
                    }
                    ((last_edge - first_edge) / width).ceil().max(1.0) as usize
                } else {
                    1
                }
            }
        };

        let step = (last_edge - first_edge) / bin_count as f64;
        let mut edges: Vec<f64> = (0..=bin_count)
            .map(|i| first_edge + i as f64 * step)
            .collect();
        edges[bin_count] = last_edge;

        let mut counts = vec![0_u64; bin_count];
        let norm = bin_count as f64 / (last_edge - first_edge);
        for &value in values {
            let mut index = (((value - first_edge) * norm) as usize).min(bin_count - 1);
            // correct float drift against the actual edges
            if index > 0 && value < edges[index] {
                index -= 1;
            } else if index + 1 < bin_count && value >= edges[index + 1] {
                index += 1;
            }
            counts[index] += 1;
        }

        Ok(Self { edges, counts })
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Ordered `(lower edge, count)` pairs.
    pub fn bins(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.edges.iter().copied().zip(self.counts.iter().copied())
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

fn estimate_width(values: &[f64], rule: BinRule, range: f64) -> f64 {
    let n = values.len() as f64;
    let sturges = range / (n.log2() + 1.0);
    match rule {
        BinRule::Sturges => sturges,
        BinRule::FreedmanDiaconis => freedman_diaconis(values),
        BinRule::Auto => {
            let fd = freedman_diaconis(values);
            if fd > 0.0 { fd.min(sturges) } else { sturges }
        }
        BinRule::Count(_) => range,
    }
}

fn freedman_diaconis(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let iqr = percentile(&sorted, 0.75) - percentile(&sorted, 0.25);
    2.0 * iqr * (values.len() as f64).powf(-1.0 / 3.0)
}

/// Linear interpolation between the closest ranks of sorted data.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}
