use crate::enums::{ElementType, PhotometricMode};

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum NotFoundError {
    #[error("Folder '{}' does not exist.", path.display())]
    MissingDirectory { path: PathBuf },

    #[error("No DICOM files (.{extension}) found in '{}'.", root.display())]
    NoSlices { extension: String, root: PathBuf },
}

/// A violated slice, volume or filter invariant.
///
/// Every variant tied to a file carries its path so the failing slice can be
/// found without rerunning the pipeline.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing ordering key (InstanceNumber) in DICOM file {}", path.display())]
    MissingInstanceIndex { path: PathBuf },

    #[error(
        "Duplicate ordering key (InstanceNumber) {index} in DICOM file {}, already used by {}",
        path.display(),
        first_path.display()
    )]
    DuplicateInstanceIndex {
        index: i32,
        path: PathBuf,
        first_path: PathBuf,
    },

    #[error("DICOM file {} is not a 2D slice (pixel data has {ndim} dimensions)", path.display())]
    NotTwoDimensional { path: PathBuf, ndim: usize },

    #[error(
        "Shape mismatch in DICOM file {}: expected {}x{}, got {}x{}",
        path.display(),
        expected.0,
        expected.1,
        actual.0,
        actual.1
    )]
    ShapeMismatch {
        path: PathBuf,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Dtype mismatch in DICOM file {}: expected {expected}, got {actual}", path.display())]
    ElementTypeMismatch {
        path: PathBuf,
        expected: ElementType,
        actual: ElementType,
    },

    #[error("DICOM file {} is not monochrome (PhotometricInterpretation {actual})", path.display())]
    NotMonochrome {
        path: PathBuf,
        actual: PhotometricMode,
    },

    #[error(
        "InstanceNumber {index} of DICOM file {} does not fit a volume of {slice_count} slices",
        path.display()
    )]
    InstanceIndexOutOfRange {
        path: PathBuf,
        index: i32,
        slice_count: usize,
    },

    #[error("Kernel must be square and non-empty, got {rows}x{columns}")]
    InvalidKernel { rows: usize, columns: usize },

    #[error(
        "Kernel of size {kernel}x{kernel} must be smaller than the {}x{} slice {}",
        shape.0,
        shape.1,
        path.display()
    )]
    KernelTooLarge {
        path: PathBuf,
        kernel: usize,
        shape: (usize, usize),
    },

    #[error("Malformed {attribute} '{value}' in DICOM file {}", path.display())]
    MalformedIdentifier {
        path: PathBuf,
        attribute: &'static str,
        value: String,
    },

    #[error("Missing {attribute} in DICOM file {}", path.display())]
    MissingIdentifier {
        path: PathBuf,
        attribute: &'static str,
    },

    #[error(
        "Derived SOPInstanceUID {uid} of DICOM file {} collides with another slice of the batch",
        path.display()
    )]
    DuplicateDerivedIdentifier { path: PathBuf, uid: String },

    #[error(
        "DICOM files {} and {} would both be written to {}",
        path.display(),
        other.display(),
        target.display()
    )]
    DuplicateOutputName {
        path: PathBuf,
        other: PathBuf,
        target: PathBuf,
    },

    #[error(
        "Region of size {kernel}x{kernel} does not fit slices of {rows}x{columns}"
    )]
    RegionOutOfBounds {
        kernel: usize,
        rows: usize,
        columns: usize,
    },

    #[error("Background standard deviation is zero, SNR is undefined")]
    ZeroBackgroundVariance,

    #[error("Volume has no voxels")]
    EmptyVolume,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to read DICOM file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: dicom::object::ReadError,
    },

    #[error("Failed to decode pixel data of DICOM file {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: dicom::pixeldata::Error,
    },

    #[error("Failed to write DICOM file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: dicom::object::WriteError,
    },

    #[error("Unsupported pixel format in DICOM file {}: {reason}", path.display())]
    UnsupportedPixelFormat { path: PathBuf, reason: String },

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the validation error behind this error, if any.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_not_found(&self) -> Option<&NotFoundError> {
        match self {
            Error::NotFound(err) => Some(err),
            _ => None,
        }
    }
}
