use std::fmt;

/// Numeric type of the stored pixel values, derived from BitsAllocated and
/// PixelRepresentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
}

impl ElementType {
    pub fn from_bits(bits_allocated: u16, signed: bool) -> Option<Self> {
        match (bits_allocated, signed) {
            (8, false) => Some(ElementType::U8),
            (8, true) => Some(ElementType::I8),
            (16, false) => Some(ElementType::U16),
            (16, true) => Some(ElementType::I16),
            (32, false) => Some(ElementType::U32),
            (32, true) => Some(ElementType::I32),
            _ => None,
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            ElementType::U8 | ElementType::I8 => 1,
            ElementType::U16 | ElementType::I16 => 2,
            ElementType::U32 | ElementType::I32 => 4,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(self, ElementType::I8 | ElementType::I16 | ElementType::I32)
    }

    /// Smallest and largest representable value.
    pub fn range(self) -> (f64, f64) {
        match self {
            ElementType::U8 => (u8::MIN as f64, u8::MAX as f64),
            ElementType::I8 => (i8::MIN as f64, i8::MAX as f64),
            ElementType::U16 => (u16::MIN as f64, u16::MAX as f64),
            ElementType::I16 => (i16::MIN as f64, i16::MAX as f64),
            ElementType::U32 => (u32::MIN as f64, u32::MAX as f64),
            ElementType::I32 => (i32::MIN as f64, i32::MAX as f64),
        }
    }

    /// Narrow a real value into this type: round half to even, then clamp.
    /// NaN maps to zero.
    #[inline]
    pub fn narrow(self, value: f64) -> f64 {
        if value.is_nan() {
            return 0.0;
        }
        let (min, max) = self.range();
        value.round_ties_even().clamp(min, max)
    }

    /// Append an already narrowed value as little endian bytes.
    pub(crate) fn push_le_bytes(self, value: f64, out: &mut Vec<u8>) {
        match self {
            ElementType::U8 => out.push(value as u8),
            ElementType::I8 => out.extend_from_slice(&(value as i8).to_le_bytes()),
            ElementType::U16 => out.extend_from_slice(&(value as u16).to_le_bytes()),
            ElementType::I16 => out.extend_from_slice(&(value as i16).to_le_bytes()),
            ElementType::U32 => out.extend_from_slice(&(value as u32).to_le_bytes()),
            ElementType::I32 => out.extend_from_slice(&(value as i32).to_le_bytes()),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::U8 => "uint8",
            ElementType::I8 => "int8",
            ElementType::U16 => "uint16",
            ElementType::I16 => "int16",
            ElementType::U32 => "uint32",
            ElementType::I32 => "int32",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotometricMode {
    Monochrome1,
    Monochrome2,
    Other(String),
}

impl PhotometricMode {
    pub fn parse(value: &str) -> Self {
        let value = value.trim_matches(|c: char| c == '\0' || c.is_whitespace());
        if value.eq_ignore_ascii_case("MONOCHROME1") {
            PhotometricMode::Monochrome1
        } else if value.eq_ignore_ascii_case("MONOCHROME2") {
            PhotometricMode::Monochrome2
        } else {
            PhotometricMode::Other(value.to_string())
        }
    }

    pub fn is_monochrome(&self) -> bool {
        matches!(
            self,
            PhotometricMode::Monochrome1 | PhotometricMode::Monochrome2
        )
    }
}

impl fmt::Display for PhotometricMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotometricMode::Monochrome1 => f.write_str("MONOCHROME1"),
            PhotometricMode::Monochrome2 => f.write_str("MONOCHROME2"),
            PhotometricMode::Other(value) if value.is_empty() => f.write_str("<missing>"),
            PhotometricMode::Other(value) => f.write_str(value),
        }
    }
}

/// How the filter extends a slice past its borders.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BorderMode {
    /// `gfedcb|abcdefgh|gfedcba`
    #[default]
    Reflect101,
    /// `aaaaaa|abcdefgh|hhhhhhh`
    Replicate,
    /// `000000|abcdefgh|0000000`
    Zero,
}

/// How derived SOP and frame of reference identifiers are offset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum UidPolicy {
    /// Every slice gets the same offset: the slice count.
    #[default]
    SharedOffset,
    /// Slice count plus the slice position, with a batch-wide uniqueness check.
    PerSlice,
}

/// Bin width estimator for the histogram engine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BinRule {
    #[default]
    Auto,
    Sturges,
    FreedmanDiaconis,
    Count(usize),
}
