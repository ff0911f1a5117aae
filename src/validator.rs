use crate::config::ValidationOptions;
use crate::enums::ElementType;
use crate::error::{Result, ValidationError};
use crate::slice::Slice;

use log::{debug, info};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Checks that a set of slices forms one consistent volume and orders it by
/// InstanceNumber.
pub struct SliceValidator {
    options: ValidationOptions,
}

impl SliceValidator {
    pub fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    /// Read every path and validate the resulting slice set.
    ///
    /// Files are decoded in parallel; the checks then run in discovery order
    /// so the reported error does not depend on scheduling.
    ///
    /// # Errors
    ///
    /// Returns the first read, decode or [`ValidationError`] encountered.
    pub fn validate_and_order(&self, paths: &[impl AsRef<Path> + Sync]) -> Result<Vec<Slice>> {
        let slices = paths
            .par_iter()
            .map(|path| Slice::read(path.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let ordered = self.order(slices)?;
        info!(
            "DICOM files sorted by InstanceNumber:\n{}",
            ordered
                .iter()
                .map(|slice| format!("'{}'", slice.path.display()))
                .collect::<Vec<_>>()
                .join("\n")
        );
        Ok(ordered)
    }

    /// Validate already decoded slices and sort them ascending by
    /// InstanceNumber.
    pub fn order(&self, mut slices: Vec<Slice>) -> Result<Vec<Slice>> {
        let mut seen: HashMap<i32, &Path> = HashMap::with_capacity(slices.len());
        let mut reference: Option<((usize, usize), ElementType)> = None;

        for slice in &slices {
            let index = slice
                .instance_index
                .ok_or_else(|| ValidationError::MissingInstanceIndex {
                    path: slice.path.clone(),
                })?;

            if let Some(first_path) = seen.insert(index, &slice.path) {
                return Err(ValidationError::DuplicateInstanceIndex {
                    index,
                    path: slice.path.clone(),
                    first_path: first_path.to_path_buf(),
                }
                .into());
            }

            if slice.payload_ndim != 2 {
                return Err(ValidationError::NotTwoDimensional {
                    path: slice.path.clone(),
                    ndim: slice.payload_ndim,
                }
                .into());
            }

            let (expected_shape, expected_type) =
                *reference.get_or_insert((slice.shape(), slice.element_type));
            if slice.shape() != expected_shape {
                return Err(ValidationError::ShapeMismatch {
                    path: slice.path.clone(),
                    expected: expected_shape,
                    actual: slice.shape(),
                }
                .into());
            }
            if slice.element_type != expected_type {
                return Err(ValidationError::ElementTypeMismatch {
                    path: slice.path.clone(),
                    expected: expected_type,
                    actual: slice.element_type,
                }
                .into());
            }

            if self.options.require_monochrome && !slice.photometric_mode.is_monochrome() {
                return Err(ValidationError::NotMonochrome {
                    path: slice.path.clone(),
                    actual: slice.photometric_mode.clone(),
                }
                .into());
            }

            debug!("Validated {} (InstanceNumber {index})", slice.path.display());
        }

        // every index is present and unique at this point
        slices.sort_by_key(|slice| slice.instance_index);
        Ok(slices)
    }
}

pub fn ordered_paths(slices: &[Slice]) -> Vec<PathBuf> {
    slices.iter().map(|slice| slice.path.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::PhotometricMode;
    use crate::testing::{SyntheticSlice, ramp};

    fn metric_validator() -> SliceValidator {
        SliceValidator::new(ValidationOptions::for_metrics())
    }

    fn validation_error(result: Result<Vec<Slice>>) -> ValidationError {
        match result {
            Err(crate::Error::Validation(err)) => err,
            Err(other) => panic!("expected validation error, got {other}"),
            Ok(_) => panic!("expected validation error, got ordered slices"),
        }
    }

    #[test]
    fn orders_by_instance_index() {
        let slices = vec![
            SyntheticSlice::new(3, ramp(4, 4, 30.0)).slice("c.dcm"),
            SyntheticSlice::new(1, ramp(4, 4, 10.0)).slice("a.dcm"),
            SyntheticSlice::new(2, ramp(4, 4, 20.0)).slice("b.dcm"),
        ];
        let ordered = metric_validator()
            .order(slices)
            .expect("should have ordered slices");
        let indices: Vec<_> = ordered.iter().map(|s| s.instance_index).collect();
        assert_eq!(indices, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(
            ordered_paths(&ordered),
            vec![
                PathBuf::from("a.dcm"),
                PathBuf::from("b.dcm"),
                PathBuf::from("c.dcm")
            ]
        );
    }

    #[test]
    fn duplicate_index_names_both_paths() {
        for order in [[0, 1, 2], [2, 1, 0], [1, 2, 0]] {
            let pool = [
                SyntheticSlice::filled(3, 4, 4, 1.0).slice("first.dcm"),
                SyntheticSlice::filled(1, 4, 4, 1.0).slice("other.dcm"),
                SyntheticSlice::filled(3, 4, 4, 1.0).slice("second.dcm"),
            ];
            let slices = order.iter().map(|&i| pool[i].clone()).collect();
            let err = validation_error(metric_validator().order(slices));
            assert!(matches!(
                err,
                ValidationError::DuplicateInstanceIndex { index: 3, .. }
            ));
            let message = err.to_string();
            assert!(message.contains('3'));
            assert!(message.contains("first.dcm") || message.contains("second.dcm"));
        }
    }

    #[test]
    fn missing_index_is_rejected() {
        let mut synthetic = SyntheticSlice::filled(1, 4, 4, 1.0);
        synthetic.instance = None;
        let err = validation_error(metric_validator().order(vec![synthetic.slice("x.dcm")]));
        assert!(matches!(err, ValidationError::MissingInstanceIndex { .. }));
        assert!(err.to_string().contains("x.dcm"));
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let slices = vec![
            SyntheticSlice::filled(1, 4, 4, 1.0).slice("a.dcm"),
            SyntheticSlice::filled(2, 4, 5, 1.0).slice("b.dcm"),
        ];
        let err = validation_error(metric_validator().order(slices));
        assert!(matches!(
            err,
            ValidationError::ShapeMismatch {
                expected: (4, 4),
                actual: (4, 5),
                ..
            }
        ));
    }

    #[test]
    fn element_type_mismatch_is_rejected() {
        let mut narrow = SyntheticSlice::filled(2, 4, 4, 1.0);
        narrow.element_type = ElementType::U8;
        let slices = vec![
            SyntheticSlice::filled(1, 4, 4, 1.0).slice("a.dcm"),
            narrow.slice("b.dcm"),
        ];
        let err = validation_error(metric_validator().order(slices));
        assert!(matches!(
            err,
            ValidationError::ElementTypeMismatch {
                expected: ElementType::U16,
                actual: ElementType::U8,
                ..
            }
        ));
        assert!(err.to_string().contains("uint16"));
    }

    #[test]
    fn multi_frame_is_not_two_dimensional() {
        let mut multi = SyntheticSlice::filled(1, 4, 4, 1.0);
        multi.frames = 2;
        let err = validation_error(metric_validator().order(vec![multi.slice("m.dcm")]));
        assert!(matches!(
            err,
            ValidationError::NotTwoDimensional { ndim: 3, .. }
        ));
    }

    #[test]
    fn single_row_multi_frame_is_not_two_dimensional() {
        let mut multi = SyntheticSlice::filled(1, 1, 8, 1.0);
        multi.frames = 3;
        let slice = multi.slice("row.dcm");
        assert_eq!(slice.payload_ndim, 3);

        let err = validation_error(
            SliceValidator::new(ValidationOptions::for_convolution()).order(vec![slice]),
        );
        assert!(matches!(
            err,
            ValidationError::NotTwoDimensional { ndim: 3, .. }
        ));
    }

    #[test]
    fn monochrome_check_only_on_metric_path() {
        let mut slice = SyntheticSlice::filled(1, 4, 4, 1.0).slice("p.dcm");
        slice.photometric_mode = PhotometricMode::Other("RGB".to_string());

        let err = validation_error(metric_validator().order(vec![slice.clone()]));
        assert!(matches!(err, ValidationError::NotMonochrome { .. }));

        let ordered = SliceValidator::new(ValidationOptions::for_convolution())
            .order(vec![slice])
            .expect("convolution path should not check photometric mode");
        assert_eq!(ordered.len(), 1);
    }
}
