//! # DICOM-denoise library
//!
//! This crate turns a folder of single-frame DICOM slices into a validated
//! volume and derives a denoised slice stack, an intensity histogram or a
//! signal to noise ratio from it.

//!
//! This library builds on the dicom-rs ecosystem. Slices are discovered
//! recursively below a folder, decoded in parallel using rayon and checked to
//! form one consistent volume:
//!  - Every slice has a unique InstanceNumber
//!  - Every pixel payload is 2D with the same rows x columns
//!  - Every slice has the same element type (BitsAllocated, PixelRepresentation)
//!  - Metric pipelines additionally require MONOCHROME1 or MONOCHROME2
//!
//!  The slices are then ordered by InstanceNumber and either stacked into a
//!  [`Volume`] or filtered one by one with a 2D kernel. Filtered slices are
//!  written next to each other with the suffix `_denoised`, a `_DENOISED`
//!  series description and derived SOP, frame of reference and series UIDs.
//!
//! # Examples
//!
//! ## Denoising a folder of slices
//!
//! ```no_run
//! # use dicom_denoise::{ConvolutionConfig, denoise_directory};
//! let report = denoise_directory("input", "output", &ConvolutionConfig::default())
//!     .expect("should have denoised the slices");
//! println!("new series {}", report.series_identifier);
//! ```
//!
//! ## SNR of a volume
//!
//! ```no_run
//! # use dicom_denoise::{SnrConfig, snr_of_directory};
//! let report = snr_of_directory("input", SnrConfig::default())
//!     .expect("should have computed the SNR");
//! println!("SNR for scan {}: {}", report.series_number, report.snr);
//! ```

pub mod config;
pub mod convolution;
pub mod enums;
pub mod error;
pub mod histogram;
pub mod locator;
pub mod pipeline;
pub mod slice;
pub mod snr;
pub mod validator;
pub mod volume;
pub mod volume_loader;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ConvolutionConfig, LocatorConfig, SnrConfig, ValidationOptions};
pub use convolution::{ConvolutionFilter, DenoiseReport, Kernel};
pub use enums::{BinRule, BorderMode, ElementType, PhotometricMode, UidPolicy};
pub use error::{Error, NotFoundError, Result, ValidationError};
pub use histogram::Histogram;
pub use locator::SliceLocator;
pub use pipeline::{
    HistogramReport, SnrReport, denoise_directory, histogram_of_directory, snr_of_directory,
};
pub use slice::Slice;
pub use snr::signal_to_noise;
pub use validator::SliceValidator;
pub use volume::{Volume, VolumeBuilder};
pub use volume_loader::{LoadedVolume, VolumeLoader};
