use crate::enums::ElementType;
use crate::error::{Result, ValidationError};
use crate::slice::Slice;

use ndarray::{Array3, ArrayView2, s};

/// Slices stacked along a new leading axis: (depth, rows, columns).
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    data: Array3<f64>,
    element_type: ElementType,
}

impl Volume {
    pub fn new(data: Array3<f64>, element_type: ElementType) -> Self {
        Self { data, element_type }
    }

    /// Get the dimensions of the volume (depth, rows, columns)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Layer at `depth`, the slice with InstanceNumber `depth + 1`.
    pub fn layer(&self, depth: usize) -> Option<ArrayView2<'_, f64>> {
        (depth < self.data.dim().0).then(|| self.data.slice(s![depth, .., ..]))
    }

    /// Smallest and largest voxel value, `None` for an empty volume.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut values = self.data.iter().copied();
        let first = values.next()?;
        Some(values.fold((first, first), |(min, max), v| (min.min(v), max.max(v))))
    }
}

/// Places slices into a zero-filled volume at `InstanceNumber - 1`, checking
/// every placement against the declared shape.
pub struct VolumeBuilder {
    data: Array3<f64>,
    element_type: ElementType,
}

impl VolumeBuilder {
    pub fn new(shape: (usize, usize, usize), element_type: ElementType) -> Self {
        Self {
            data: Array3::zeros(shape),
            element_type,
        }
    }

    /// Build a volume from ordered slices, taking shape and element type from
    /// the first one.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if any slice cannot be placed, and
    /// [`ValidationError::EmptyVolume`] for an empty slice set.
    pub fn from_slices(slices: &[Slice]) -> Result<Volume> {
        let first = slices.first().ok_or(ValidationError::EmptyVolume)?;
        let (rows, columns) = first.shape();
        let mut builder = Self::new((slices.len(), rows, columns), first.element_type);
        for slice in slices {
            builder.place(slice)?;
        }
        Ok(builder.build())
    }

    /// Write `slice` at depth `instance_index - 1`.
    pub fn place(&mut self, slice: &Slice) -> Result<()> {
        let (depth, rows, columns) = self.data.dim();
        let index = slice
            .instance_index
            .ok_or_else(|| ValidationError::MissingInstanceIndex {
                path: slice.path.clone(),
            })?;

        let layer = usize::try_from(index)
            .ok()
            .and_then(|index| index.checked_sub(1))
            .filter(|&layer| layer < depth)
            .ok_or_else(|| ValidationError::InstanceIndexOutOfRange {
                path: slice.path.clone(),
                index,
                slice_count: depth,
            })?;

        if slice.shape() != (rows, columns) {
            return Err(ValidationError::ShapeMismatch {
                path: slice.path.clone(),
                expected: (rows, columns),
                actual: slice.shape(),
            }
            .into());
        }
        if slice.element_type != self.element_type {
            return Err(ValidationError::ElementTypeMismatch {
                path: slice.path.clone(),
                expected: self.element_type,
                actual: slice.element_type,
            }
            .into());
        }

        self.data
            .slice_mut(s![layer, .., ..])
            .assign(&slice.pixel_payload);
        Ok(())
    }

    pub fn build(self) -> Volume {
        Volume::new(self.data, self.element_type)
    }
}
