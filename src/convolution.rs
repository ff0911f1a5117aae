use crate::config::{ConvolutionConfig, DEFAULT_KERNEL_SIZE};
use crate::enums::{BorderMode, ElementType, UidPolicy};
use crate::error::{Error, NotFoundError, Result, ValidationError};
use crate::slice::Slice;

use dicom::{
    core::{DataElement, PrimitiveValue, VR},
    object::DefaultDicomObject,
};
use dicom_dictionary_std::{tags, uids};
use log::{debug, info, warn};
use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Square matrix of real weights, applied with its anchor at `size / 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: Array2<f64>,
}

impl Kernel {
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidKernel`] for empty or non-square weights.
    pub fn new(weights: Array2<f64>) -> Result<Self, ValidationError> {
        let (rows, columns) = weights.dim();
        if rows == 0 || rows != columns {
            return Err(ValidationError::InvalidKernel { rows, columns });
        }
        Ok(Self { weights })
    }

    /// `size`x`size` box filter, every weight `1 / size²`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidKernel`] for a size of zero.
    pub fn box_average(size: usize) -> Result<Self, ValidationError> {
        if size == 0 {
            return Err(ValidationError::InvalidKernel {
                rows: 0,
                columns: 0,
            });
        }
        Ok(Self::box_of(size))
    }

    fn box_of(size: usize) -> Self {
        Self {
            weights: Array2::from_elem((size, size), 1.0 / (size * size) as f64),
        }
    }

    pub fn size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::box_of(DEFAULT_KERNEL_SIZE)
    }
}

/// Correlate `image` with `kernel`, same-size output. The kernel is not
/// flipped, which makes no difference for symmetric kernels.
pub fn filter2d(image: ArrayView2<'_, f64>, kernel: &Kernel, border: BorderMode) -> Array2<f64> {
    let (rows, columns) = image.dim();
    let size = kernel.size();
    let anchor = (size / 2) as isize;

    Array2::from_shape_fn((rows, columns), |(r, c)| {
        let mut acc = 0.0;
        for ((i, j), &weight) in kernel.weights.indexed_iter() {
            let y = border_index(r as isize + i as isize - anchor, rows, border);
            let x = border_index(c as isize + j as isize - anchor, columns, border);
            if let (Some(y), Some(x)) = (y, x) {
                acc = weight.mul_add(image[[y, x]], acc);
            }
        }
        acc
    })
}

#[inline]
fn border_index(index: isize, len: usize, border: BorderMode) -> Option<usize> {
    let n = len as isize;
    if (0..n).contains(&index) {
        return Some(index as usize);
    }
    match border {
        BorderMode::Zero => None,
        BorderMode::Replicate => Some(index.clamp(0, n - 1) as usize),
        BorderMode::Reflect101 => {
            if n == 1 {
                return Some(0);
            }
            let mut index = index;
            while !(0..n).contains(&index) {
                index = if index < 0 { -index } else { 2 * (n - 1) - index };
            }
            Some(index as usize)
        }
    }
}

/// Append `suffix` unless the description already carries it.
pub fn mark_derived(description: &str, suffix: &str) -> String {
    if description.contains(suffix) {
        description.to_string()
    } else {
        format!("{description}{suffix}")
    }
}

/// Maximum length of a DICOM UID.
pub const MAX_UID_LENGTH: usize = 64;

/// Add `offset` to the numeric last dot-segment of a UID.
///
/// The segment may be arbitrarily long. Returns `None` for a non-numeric
/// segment or a result longer than [`MAX_UID_LENGTH`].
pub fn offset_uid(uid: &str, offset: u128) -> Option<String> {
    let (prefix, last) = match uid.rsplit_once('.') {
        Some((prefix, last)) => (Some(prefix), last),
        None => (None, uid),
    };
    if last.is_empty() || !last.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let bumped = add_decimal(last, offset)?;
    let derived = match prefix {
        Some(prefix) => format!("{prefix}.{bumped}"),
        None => bumped,
    };
    (derived.len() <= MAX_UID_LENGTH).then_some(derived)
}

/// Schoolbook addition of `offset` to a string of ASCII digits, leading
/// zeros dropped from the result.
fn add_decimal(digits: &str, offset: u128) -> Option<String> {
    let mut reversed = Vec::with_capacity(digits.len() + 1);
    let mut carry = offset;
    for b in digits.bytes().rev() {
        let sum = carry.checked_add(u128::from(b - b'0'))?;
        reversed.push(b'0' + (sum % 10) as u8);
        carry = sum / 10;
    }
    while carry > 0 {
        reversed.push(b'0' + (carry % 10) as u8);
        carry /= 10;
    }
    while reversed.len() > 1 && reversed.last() == Some(&b'0') {
        reversed.pop();
    }
    reversed.reverse();
    String::from_utf8(reversed).ok()
}

/// `slice.dcm` -> `slice_denoised.dcm`, keeping the extension's case.
pub fn derived_file_name(file_name: &str, extension: &str, suffix: &str) -> String {
    let dotted = format!(".{}", extension.to_lowercase());
    let lower = file_name.to_lowercase();
    if lower.ends_with(&dotted) && file_name.is_char_boundary(file_name.len() - dotted.len()) {
        let (stem, ext) = file_name.split_at(file_name.len() - dotted.len());
        format!("{stem}{suffix}{ext}")
    } else {
        format!("{file_name}{suffix}")
    }
}

/// Identifiers written into one output slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedIdentifiers {
    pub series_description: String,
    pub sop_identifier: String,
    pub frame_of_reference_identifier: String,
    pub series_identifier: String,
}

/// Result of a denoising batch.
#[derive(Debug, Clone)]
pub struct DenoiseReport {
    pub written: Vec<PathBuf>,
    pub series_identifier: String,
}

pub struct ConvolutionFilter {
    config: ConvolutionConfig,
}

impl ConvolutionFilter {
    pub fn new(config: ConvolutionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConvolutionConfig {
        &self.config
    }

    /// Filter the payload of `slice` and narrow it back to its element type.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::KernelTooLarge`] unless the kernel is
    /// smaller than the slice in both dimensions.
    pub fn filter_payload(&self, slice: &Slice) -> Result<Array2<f64>> {
        let (rows, columns) = slice.shape();
        let size = self.config.kernel.size();
        if size >= rows || size >= columns {
            return Err(ValidationError::KernelTooLarge {
                path: slice.path.clone(),
                kernel: size,
                shape: (rows, columns),
            }
            .into());
        }
        let element_type = slice.element_type;
        Ok(
            filter2d(slice.pixel_payload.view(), &self.config.kernel, self.config.border)
                .mapv_into(|value| element_type.narrow(value)),
        )
    }

    /// Compute the rewritten identity of every slice of an ordered batch.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for missing or non-numeric identifiers and,
    /// under [`UidPolicy::PerSlice`], for colliding derived identifiers.
    pub fn derive_identifiers(&self, slices: &[Slice]) -> Result<Vec<DerivedIdentifiers>> {
        let Some(first) = slices.first() else {
            return Ok(Vec::new());
        };
        let count = slices.len() as u128;

        let series_uid = first.series_identifier.as_deref().ok_or_else(|| {
            ValidationError::MissingIdentifier {
                path: first.path.clone(),
                attribute: "SeriesInstanceUID",
            }
        })?;
        let series_identifier =
            offset_uid(series_uid, 1).ok_or_else(|| ValidationError::MalformedIdentifier {
                path: first.path.clone(),
                attribute: "SeriesInstanceUID",
                value: series_uid.to_string(),
            })?;

        let mut derived = Vec::with_capacity(slices.len());
        let mut taken: HashSet<String> = HashSet::with_capacity(slices.len());
        for (position, slice) in slices.iter().enumerate() {
            let sop_uid = slice.sop_identifier.as_deref().ok_or_else(|| {
                ValidationError::MissingIdentifier {
                    path: slice.path.clone(),
                    attribute: "SOPInstanceUID",
                }
            })?;
            let offset = match self.config.uid_policy {
                UidPolicy::SharedOffset => count,
                UidPolicy::PerSlice => count + position as u128,
            };
            let sop_identifier =
                offset_uid(sop_uid, offset).ok_or_else(|| ValidationError::MalformedIdentifier {
                    path: slice.path.clone(),
                    attribute: "SOPInstanceUID",
                    value: sop_uid.to_string(),
                })?;

            if self.config.uid_policy == UidPolicy::PerSlice
                && !taken.insert(sop_identifier.clone())
            {
                return Err(ValidationError::DuplicateDerivedIdentifier {
                    path: slice.path.clone(),
                    uid: sop_identifier,
                }
                .into());
            }

            if slice.series_description.is_none() {
                warn!(
                    "Missing SeriesDescription in {}, using an empty one",
                    slice.path.display()
                );
            }
            derived.push(DerivedIdentifiers {
                series_description: mark_derived(
                    slice.description_or_empty(),
                    &self.config.description_suffix,
                ),
                frame_of_reference_identifier: sop_identifier.clone(),
                sop_identifier,
                series_identifier: series_identifier.clone(),
            });
        }
        Ok(derived)
    }

    fn output_path(&self, slice: &Slice, output_dir: &Path) -> PathBuf {
        let file_name = slice
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        output_dir.join(derived_file_name(
            &file_name,
            &self.config.extension,
            &self.config.output_suffix,
        ))
    }

    /// Filter every slice, rewrite its identity and write it to `output_dir`.
    ///
    /// All slices are filtered before anything is written. If a write fails,
    /// the files already written by this batch are removed again.
    pub fn denoise(&self, slices: &[Slice], output_dir: impl AsRef<Path>) -> Result<DenoiseReport> {
        let output_dir = output_dir.as_ref();
        if !output_dir.is_dir() {
            return Err(NotFoundError::MissingDirectory {
                path: output_dir.to_path_buf(),
            }
            .into());
        }

        let identifiers = self.derive_identifiers(slices)?;
        let series_identifier = identifiers
            .first()
            .map(|ids| ids.series_identifier.clone())
            .unwrap_or_default();

        let mut targets: HashMap<PathBuf, &Path> = HashMap::with_capacity(slices.len());
        for slice in slices {
            let target = self.output_path(slice, output_dir);
            if let Some(other) = targets.insert(target.clone(), &slice.path) {
                return Err(ValidationError::DuplicateOutputName {
                    path: slice.path.clone(),
                    other: other.to_path_buf(),
                    target,
                }
                .into());
            }
        }

        let outputs = slices
            .par_iter()
            .zip(identifiers.par_iter())
            .map(|(slice, ids)| -> Result<(PathBuf, DefaultDicomObject)> {
                let payload = self.filter_payload(slice)?;
                let object = rewrite(slice, ids, &payload);
                debug!("Filtered {}", slice.path.display());
                Ok((self.output_path(slice, output_dir), object))
            })
            .collect::<Result<Vec<_>>>()?;

        let results: Vec<Result<PathBuf>> = outputs
            .into_par_iter()
            .map(|(target, object)| {
                object
                    .write_to_file(&target)
                    .map(|()| target.clone())
                    .map_err(|source| Error::Write {
                        path: target,
                        source,
                    })
            })
            .collect();

        let mut written = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(path) => written.push(path),
                Err(err) => {
                    // the writer may have created the file before failing
                    if let Error::Write { path, .. } = &err {
                        remove_partial(path);
                    }
                    first_error.get_or_insert(err);
                }
            }
        }
        if let Some(err) = first_error {
            for path in &written {
                remove_partial(path);
            }
            return Err(err);
        }

        info!(
            "2D convolution completed: {} files written to '{}'",
            written.len(),
            output_dir.display()
        );
        Ok(DenoiseReport {
            written,
            series_identifier,
        })
    }
}

fn remove_partial(path: &Path) {
    if !path.is_file() {
        return;
    }
    if let Err(err) = fs::remove_file(path) {
        warn!("Could not remove partial output {}: {err}", path.display());
    }
}

/// Copy of the slice's DICOM object carrying the derived identity and the
/// filtered payload, re-encoded as native Explicit VR Little Endian.
fn rewrite(slice: &Slice, ids: &DerivedIdentifiers, payload: &Array2<f64>) -> DefaultDicomObject {
    let element_type = slice.element_type;
    let mut object = slice.object().clone();

    object.put(DataElement::new(
        tags::SERIES_DESCRIPTION,
        VR::LO,
        PrimitiveValue::from(ids.series_description.as_str()),
    ));
    object.put(DataElement::new(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from(ids.sop_identifier.as_str()),
    ));
    object.put(DataElement::new(
        tags::FRAME_OF_REFERENCE_UID,
        VR::UI,
        PrimitiveValue::from(ids.frame_of_reference_identifier.as_str()),
    ));
    object.put(DataElement::new(
        tags::SERIES_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from(ids.series_identifier.as_str()),
    ));
    object.put(DataElement::new(
        tags::PIXEL_DATA,
        pixel_vr(element_type),
        PrimitiveValue::from(encode_payload(payload, element_type)),
    ));

    let sop_identifier = ids.sop_identifier.clone();
    object.update_meta(|meta| {
        meta.media_storage_sop_instance_uid = sop_identifier;
        meta.transfer_syntax = uids::EXPLICIT_VR_LITTLE_ENDIAN.to_string();
    });
    object
}

fn pixel_vr(element_type: ElementType) -> VR {
    if element_type.bytes() == 1 {
        VR::OB
    } else {
        VR::OW
    }
}

fn encode_payload(payload: &Array2<f64>, element_type: ElementType) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(payload.len() * element_type.bytes());
    for &value in payload.iter() {
        element_type.push_le_bytes(value, &mut bytes);
    }
    // PixelData must have even length
    if bytes.len() % 2 == 1 {
        bytes.push(0);
    }
    bytes
}
