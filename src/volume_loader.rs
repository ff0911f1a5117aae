use crate::config::{LocatorConfig, ValidationOptions};
use crate::error::Result;
use crate::locator::SliceLocator;
use crate::slice::{Slice, UNKNOWN_SERIES};
use crate::validator::SliceValidator;
use crate::volume::{Volume, VolumeBuilder};

use log::info;
use std::path::Path;

/// A volume together with the series label of its first slice.
#[derive(Debug)]
pub struct LoadedVolume {
    pub volume: Volume,
    pub series_number: String,
}

pub struct VolumeLoader;

impl VolumeLoader {
    /// Load a volume from decoded slices
    ///
    /// # Arguments
    ///
    /// * `slices` - Decoded slices in any order
    ///
    /// # Errors
    ///
    /// Returns error if the slices do not form one consistent monochrome
    /// volume
    pub fn load_from_slices(slices: Vec<Slice>) -> Result<LoadedVolume> {
        let ordered = SliceValidator::new(ValidationOptions::for_metrics()).order(slices)?;
        Self::assemble(&ordered)
    }

    /// Load a volume from file paths
    pub fn load_from_file_paths(paths: &[impl AsRef<Path> + Sync]) -> Result<LoadedVolume> {
        let ordered =
            SliceValidator::new(ValidationOptions::for_metrics()).validate_and_order(paths)?;
        Self::assemble(&ordered)
    }

    /// Load a volume from every .dcm file below a directory
    pub fn load_from_directory(path: impl AsRef<Path>) -> Result<LoadedVolume> {
        let paths = SliceLocator::new(LocatorConfig::for_metrics()).locate(path)?;
        Self::load_from_file_paths(&paths)
    }

    fn assemble(ordered: &[Slice]) -> Result<LoadedVolume> {
        let volume = VolumeBuilder::from_slices(ordered)?;
        info!(
            "Successfully created 3D DICOM image with shape {:?}",
            volume.dim()
        );
        let series_number = ordered
            .first()
            .map(|slice| slice.series_label().to_string())
            .unwrap_or_else(|| UNKNOWN_SERIES.to_string());
        Ok(LoadedVolume {
            volume,
            series_number,
        })
    }
}
