//! The three consumers of the core: denoising, histogram and SNR.

use crate::config::{ConvolutionConfig, LocatorConfig, SnrConfig, ValidationOptions};
use crate::convolution::{ConvolutionFilter, DenoiseReport};
use crate::enums::BinRule;
use crate::error::Result;
use crate::histogram::Histogram;
use crate::locator::SliceLocator;
use crate::snr::signal_to_noise;
use crate::validator::SliceValidator;
use crate::volume_loader::VolumeLoader;

use log::info;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct HistogramReport {
    pub histogram: Histogram,
    pub series_number: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnrReport {
    pub snr: f64,
    pub series_number: String,
}

/// Denoise every slice below `input` into `output`.
///
/// Files carrying the derived marker are ignored, so rerunning on a folder
/// that already holds outputs does not filter them twice.
pub fn denoise_directory(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConvolutionConfig,
) -> Result<DenoiseReport> {
    let locator = LocatorConfig {
        extension: config.extension.clone(),
        ..LocatorConfig::for_convolution()
    };
    let paths = SliceLocator::new(locator).locate(input)?;
    let slices =
        SliceValidator::new(ValidationOptions::for_convolution()).validate_and_order(&paths)?;
    ConvolutionFilter::new(config.clone()).denoise(&slices, output)
}

pub fn histogram_of_directory(input: impl AsRef<Path>, rule: BinRule) -> Result<HistogramReport> {
    let loaded = VolumeLoader::load_from_directory(input)?;
    let histogram = Histogram::compute(&loaded.volume, rule)?;
    info!(
        "Histogram for scan {} computed with {} bins",
        loaded.series_number,
        histogram.counts().len()
    );
    Ok(HistogramReport {
        histogram,
        series_number: loaded.series_number,
    })
}

pub fn snr_of_directory(input: impl AsRef<Path>, config: SnrConfig) -> Result<SnrReport> {
    let loaded = VolumeLoader::load_from_directory(input)?;
    let snr = signal_to_noise(&loaded.volume, config.kernel_size)?;
    info!("SNR for scan {}: {snr}", loaded.series_number);
    Ok(SnrReport {
        snr,
        series_number: loaded.series_number,
    })
}
