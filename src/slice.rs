use crate::enums::{ElementType, PhotometricMode};
use crate::error::{Error, Result};

use dicom::{
    core::Tag,
    object::{DefaultDicomObject, open_file},
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder},
};
use dicom_dictionary_std::tags;
use log::debug;
use ndarray::{Array2, s};
use std::path::{Path, PathBuf};

pub const UNKNOWN_SERIES: &str = "unknown";

/// One decoded single-frame grayscale DICOM file.
///
/// The pixel payload holds the raw stored values (no modality or VOI LUT),
/// which every supported [`ElementType`] represents exactly as `f64`.
#[derive(Debug, Clone)]
pub struct Slice {
    pub path: PathBuf,
    pub instance_index: Option<i32>,
    pub rows: Option<u32>,
    pub columns: Option<u32>,
    pub element_type: ElementType,
    pub photometric_mode: PhotometricMode,
    pub series_identifier: Option<String>,
    pub sop_identifier: Option<String>,
    pub series_description: Option<String>,
    pub series_number: Option<String>,
    /// 2, plus one for multiple frames and one for multiple samples per pixel.
    pub payload_ndim: usize,
    pub pixel_payload: Array2<f64>,
    object: DefaultDicomObject,
}

impl Slice {
    /// Open and decode a DICOM file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let object = open_file(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_object(path, object)
    }

    /// Decode an already parsed DICOM object, `path` is only used for
    /// reporting and output naming.
    pub fn from_object(path: impl Into<PathBuf>, object: DefaultDicomObject) -> Result<Self> {
        let path = path.into();
        let element_type = Self::element_type_of(&path, &object)?;

        let decoded = object.decode_pixel_data().map_err(|source| Error::Decode {
            path: path.clone(),
            source,
        })?;
        let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
        let array = decoded
            .to_ndarray_with_options::<f64>(&options)
            .map_err(|source| Error::Decode {
                path: path.clone(),
                source,
            })?;

        // frames x rows x columns x samples
        let array = array
            .into_dimensionality::<ndarray::Ix4>()
            .map_err(|err| Error::UnsupportedPixelFormat {
                path: path.clone(),
                reason: err.to_string(),
            })?;
        let (frames, _, _, samples) = array.dim();
        let payload_ndim = 2 + usize::from(frames > 1) + usize::from(samples > 1);
        let pixel_payload = array.slice_move(s![0, .., .., 0]);

        debug!(
            "Decoded {} ({}x{} {})",
            path.display(),
            pixel_payload.nrows(),
            pixel_payload.ncols(),
            element_type
        );

        Ok(Self {
            instance_index: int_attr(&object, tags::INSTANCE_NUMBER),
            rows: int_attr(&object, tags::ROWS),
            columns: int_attr(&object, tags::COLUMNS),
            element_type,
            photometric_mode: string_attr(&object, tags::PHOTOMETRIC_INTERPRETATION)
                .map(|value| PhotometricMode::parse(&value))
                .unwrap_or_else(|| PhotometricMode::Other(String::new())),
            series_identifier: string_attr(&object, tags::SERIES_INSTANCE_UID),
            sop_identifier: string_attr(&object, tags::SOP_INSTANCE_UID),
            series_description: string_attr(&object, tags::SERIES_DESCRIPTION),
            series_number: string_attr(&object, tags::SERIES_NUMBER),
            payload_ndim,
            pixel_payload,
            path,
            object,
        })
    }

    fn element_type_of(path: &Path, object: &DefaultDicomObject) -> Result<ElementType> {
        let bits_allocated: Option<u16> = int_attr(object, tags::BITS_ALLOCATED);
        let representation: u16 = int_attr(object, tags::PIXEL_REPRESENTATION).unwrap_or(0);
        bits_allocated
            .and_then(|bits| ElementType::from_bits(bits, representation == 1))
            .ok_or_else(|| Error::UnsupportedPixelFormat {
                path: path.to_path_buf(),
                reason: format!(
                    "BitsAllocated {:?} with PixelRepresentation {representation}",
                    bits_allocated
                ),
            })
    }

    /// Payload shape as (rows, columns).
    pub fn shape(&self) -> (usize, usize) {
        self.pixel_payload.dim()
    }

    pub fn object(&self) -> &DefaultDicomObject {
        &self.object
    }

    /// SeriesNumber, or `"unknown"` when absent.
    pub fn series_label(&self) -> &str {
        self.series_number.as_deref().unwrap_or(UNKNOWN_SERIES)
    }

    pub fn description_or_empty(&self) -> &str {
        self.series_description.as_deref().unwrap_or("")
    }
}

fn string_attr(object: &DefaultDicomObject, tag: Tag) -> Option<String> {
    let value = object.element(tag).ok()?.to_str().ok()?;
    let value = value.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    (!value.is_empty()).then(|| value.to_string())
}

fn int_attr<T: TryFrom<i64>>(object: &DefaultDicomObject, tag: Tag) -> Option<T> {
    let value = object.element(tag).ok()?.to_int::<i64>().ok()?;
    T::try_from(value).ok()
}
