#![allow(dead_code)]

use dicom::{
    core::{DataElement, PrimitiveValue, VR},
    object::{FileMetaTableBuilder, InMemDicomObject},
};
use dicom_dictionary_std::{tags, uids};
use std::path::{Path, PathBuf};

pub const SERIES_UID: &str = "1.2.826.0.1.3680043.8.498.1000";
pub const SOP_ROOT: &str = "1.2.826.0.1.3680043.8.498.2000";

/// Writes 16-bit MONOCHROME2 CT slices with a configurable pixel function.
pub struct SliceWriter {
    pub rows: u16,
    pub columns: u16,
    pub photometric: &'static str,
    pub description: &'static str,
}

impl Default for SliceWriter {
    fn default() -> Self {
        Self {
            rows: 64,
            columns: 64,
            photometric: "MONOCHROME2",
            description: "T2 AXIAL",
        }
    }
}

impl SliceWriter {
    pub fn write(
        &self,
        dir: &Path,
        file_name: &str,
        instance: i32,
        pixel: impl Fn(usize, usize) -> u16,
    ) -> PathBuf {
        let sop = format!("{SOP_ROOT}.{instance}");
        let mut data = Vec::with_capacity(self.rows as usize * self.columns as usize * 2);
        for r in 0..self.rows as usize {
            for c in 0..self.columns as usize {
                data.extend_from_slice(&pixel(r, c).to_le_bytes());
            }
        }

        let obj = InMemDicomObject::from_element_iter([
            DataElement::new(
                tags::SOP_CLASS_UID,
                VR::UI,
                PrimitiveValue::from(uids::CT_IMAGE_STORAGE),
            ),
            DataElement::new(
                tags::SOP_INSTANCE_UID,
                VR::UI,
                PrimitiveValue::from(sop.as_str()),
            ),
            DataElement::new(
                tags::SERIES_DESCRIPTION,
                VR::LO,
                PrimitiveValue::from(self.description),
            ),
            DataElement::new(
                tags::SERIES_INSTANCE_UID,
                VR::UI,
                PrimitiveValue::from(SERIES_UID),
            ),
            DataElement::new(tags::SERIES_NUMBER, VR::IS, PrimitiveValue::from("3")),
            DataElement::new(
                tags::INSTANCE_NUMBER,
                VR::IS,
                PrimitiveValue::from(instance.to_string()),
            ),
            DataElement::new(
                tags::FRAME_OF_REFERENCE_UID,
                VR::UI,
                PrimitiveValue::from("1.2.826.0.1.3680043.8.498.3000"),
            ),
            DataElement::new(tags::SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16)),
            DataElement::new(
                tags::PHOTOMETRIC_INTERPRETATION,
                VR::CS,
                PrimitiveValue::from(self.photometric),
            ),
            DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(self.rows)),
            DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(self.columns)),
            DataElement::new(tags::BITS_ALLOCATED, VR::US, PrimitiveValue::from(16_u16)),
            DataElement::new(tags::BITS_STORED, VR::US, PrimitiveValue::from(16_u16)),
            DataElement::new(tags::HIGH_BIT, VR::US, PrimitiveValue::from(15_u16)),
            DataElement::new(
                tags::PIXEL_REPRESENTATION,
                VR::US,
                PrimitiveValue::from(0_u16),
            ),
            DataElement::new(tags::PIXEL_DATA, VR::OW, PrimitiveValue::from(data)),
        ]);

        let file = obj
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                    .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
                    .media_storage_sop_instance_uid(sop),
            )
            .expect("should have built file meta table");
        let path = dir.join(file_name);
        file.write_to_file(&path)
            .expect("should have written synthetic slice");
        path
    }

    /// Slices `1..=count` named `IM{n:04}.dcm`, written in reverse order.
    pub fn write_series(
        &self,
        dir: &Path,
        count: i32,
        pixel: impl Fn(i32, usize, usize) -> u16,
    ) -> Vec<PathBuf> {
        (1..=count)
            .rev()
            .map(|i| self.write(dir, &format!("IM{i:04}.dcm"), i, |r, c| pixel(i, r, c)))
            .collect()
    }
}

/// Deterministic texture with a non-flat background corner.
pub fn textured(instance: i32, r: usize, c: usize) -> u16 {
    (100 + instance as usize * 10 + (r * 7 + c * 13) % 50) as u16
}
