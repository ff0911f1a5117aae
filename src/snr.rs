use crate::error::{Result, ValidationError};
use crate::volume::Volume;

use log::debug;
use ndarray::{ArrayView3, s};

/// Signal to noise ratio of a volume, rounded to two decimals.
///
/// Noise is the standard deviation of the `k`x`k` corner at the origin of
/// every slice, signal the mean of the centred `k`x`k` window of every slice.
///
/// # Errors
///
/// Returns [`ValidationError::RegionOutOfBounds`] unless `0 < k <= rows, columns`
/// and [`ValidationError::ZeroBackgroundVariance`] for a flat background.
pub fn signal_to_noise(volume: &Volume, kernel_size: usize) -> Result<f64> {
    let (_, rows, columns) = volume.dim();
    if kernel_size == 0 || kernel_size > rows || kernel_size > columns {
        return Err(ValidationError::RegionOutOfBounds {
            kernel: kernel_size,
            rows,
            columns,
        }
        .into());
    }

    let data = volume.data();
    let background = data.slice(s![.., ..kernel_size, ..kernel_size]);
    let top = (rows - kernel_size) / 2;
    let left = (columns - kernel_size) / 2;
    let object = data.slice(s![
        ..,
        top..top + kernel_size,
        left..left + kernel_size
    ]);

    let noise = std_dev(background).ok_or(ValidationError::EmptyVolume)?;
    if noise == 0.0 {
        return Err(ValidationError::ZeroBackgroundVariance.into());
    }
    let signal = object.mean().ok_or(ValidationError::EmptyVolume)?;
    debug!("SNR signal {signal}, noise {noise}");

    Ok(round2(signal / noise))
}

/// Population standard deviation.
fn std_dev(region: ArrayView3<'_, f64>) -> Option<f64> {
    let mean = region.mean()?;
    let variance = region.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / region.len() as f64;
    Some(variance.sqrt())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
