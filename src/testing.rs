//! Synthetic DICOM objects for unit tests.

use crate::enums::ElementType;
use crate::slice::Slice;

use dicom::{
    core::{DataElement, PrimitiveValue, VR},
    object::{DefaultDicomObject, FileMetaTableBuilder, InMemDicomObject},
};
use dicom_dictionary_std::{tags, uids};
use ndarray::Array2;

pub(crate) const SERIES_UID: &str = "1.2.826.0.1.3680043.2.1125.100";
pub(crate) const SOP_ROOT: &str = "1.2.826.0.1.3680043.2.1125.200";

#[derive(Clone)]
pub(crate) struct SyntheticSlice {
    pub instance: Option<i32>,
    pub element_type: ElementType,
    pub photometric: &'static str,
    pub description: Option<&'static str>,
    pub pixels: Array2<f64>,
    pub frames: u32,
}

impl SyntheticSlice {
    pub fn new(instance: i32, pixels: Array2<f64>) -> Self {
        Self {
            instance: Some(instance),
            element_type: ElementType::U16,
            photometric: "MONOCHROME2",
            description: Some("T1 AXIAL"),
            pixels,
            frames: 1,
        }
    }

    pub fn filled(instance: i32, rows: usize, columns: usize, value: f64) -> Self {
        Self::new(instance, Array2::from_elem((rows, columns), value))
    }

    pub fn object(&self) -> DefaultDicomObject {
        let (rows, columns) = self.pixels.dim();
        let bits = (self.element_type.bytes() * 8) as u16;
        let sop = format!("{SOP_ROOT}.{}", self.instance.unwrap_or(0));

        let mut data = Vec::with_capacity(rows * columns * self.element_type.bytes());
        for _ in 0..self.frames {
            for &value in self.pixels.iter() {
                self.element_type
                    .push_le_bytes(self.element_type.narrow(value), &mut data);
            }
        }
        let pixel_vr = if self.element_type.bytes() == 1 {
            VR::OB
        } else {
            VR::OW
        };

        let mut obj = InMemDicomObject::new_empty();
        obj.put(DataElement::new(
            tags::SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(uids::CT_IMAGE_STORAGE),
        ));
        obj.put(DataElement::new(
            tags::SOP_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(sop.as_str()),
        ));
        obj.put(DataElement::new(
            tags::SERIES_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(SERIES_UID),
        ));
        obj.put(DataElement::new(
            tags::SERIES_NUMBER,
            VR::IS,
            PrimitiveValue::from("7"),
        ));
        if let Some(description) = self.description {
            obj.put(DataElement::new(
                tags::SERIES_DESCRIPTION,
                VR::LO,
                PrimitiveValue::from(description),
            ));
        }
        if let Some(instance) = self.instance {
            obj.put(DataElement::new(
                tags::INSTANCE_NUMBER,
                VR::IS,
                PrimitiveValue::from(instance.to_string()),
            ));
        }
        obj.put(DataElement::new(
            tags::SAMPLES_PER_PIXEL,
            VR::US,
            PrimitiveValue::from(1_u16),
        ));
        obj.put(DataElement::new(
            tags::PHOTOMETRIC_INTERPRETATION,
            VR::CS,
            PrimitiveValue::from(self.photometric),
        ));
        if self.frames > 1 {
            obj.put(DataElement::new(
                tags::NUMBER_OF_FRAMES,
                VR::IS,
                PrimitiveValue::from(self.frames.to_string()),
            ));
        }
        obj.put(DataElement::new(
            tags::ROWS,
            VR::US,
            PrimitiveValue::from(rows as u16),
        ));
        obj.put(DataElement::new(
            tags::COLUMNS,
            VR::US,
            PrimitiveValue::from(columns as u16),
        ));
        obj.put(DataElement::new(
            tags::BITS_ALLOCATED,
            VR::US,
            PrimitiveValue::from(bits),
        ));
        obj.put(DataElement::new(
            tags::BITS_STORED,
            VR::US,
            PrimitiveValue::from(bits),
        ));
        obj.put(DataElement::new(
            tags::HIGH_BIT,
            VR::US,
            PrimitiveValue::from(bits - 1),
        ));
        obj.put(DataElement::new(
            tags::PIXEL_REPRESENTATION,
            VR::US,
            PrimitiveValue::from(u16::from(self.element_type.is_signed())),
        ));
        obj.put(DataElement::new(
            tags::PIXEL_DATA,
            pixel_vr,
            PrimitiveValue::from(data),
        ));

        obj.with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
                .media_storage_sop_instance_uid(sop),
        )
        .expect("should have built file meta table")
    }

    pub fn slice(&self, path: &str) -> Slice {
        Slice::from_object(path, self.object()).expect("should have decoded synthetic slice")
    }
}

/// Row-major ramp `0, 1, 2, ...` offset by `base`.
pub(crate) fn ramp(rows: usize, columns: usize, base: f64) -> Array2<f64> {
    Array2::from_shape_fn((rows, columns), |(r, c)| base + (r * columns + c) as f64)
}
