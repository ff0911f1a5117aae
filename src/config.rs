use crate::convolution::Kernel;
use crate::enums::{BorderMode, UidPolicy};

pub const DEFAULT_EXTENSION: &str = "dcm";
pub const DERIVED_FILE_MARKER: &str = "_denoised";
pub const DERIVED_DESCRIPTION_SUFFIX: &str = "_DENOISED";
pub const DEFAULT_KERNEL_SIZE: usize = 5;

/// Which files the locator picks up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorConfig {
    /// File extension without the dot, compared case-insensitively.
    pub extension: String,
    /// Files whose name contains this marker (case-insensitive) are skipped.
    pub exclude_marker: Option<String>,
}

impl LocatorConfig {
    /// Skips files produced by an earlier denoising run.
    pub fn for_convolution() -> Self {
        Self {
            exclude_marker: Some(DERIVED_FILE_MARKER.to_string()),
            ..Self::default()
        }
    }

    pub fn for_metrics() -> Self {
        Self::default()
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            exclude_marker: None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Reject slices that are not MONOCHROME1 or MONOCHROME2.
    pub require_monochrome: bool,
}

impl ValidationOptions {
    pub fn for_convolution() -> Self {
        Self {
            require_monochrome: false,
        }
    }

    pub fn for_metrics() -> Self {
        Self {
            require_monochrome: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConvolutionConfig {
    pub kernel: Kernel,
    pub border: BorderMode,
    pub uid_policy: UidPolicy,
    /// Appended to SeriesDescription once.
    pub description_suffix: String,
    /// Inserted before the extension of every output file name.
    pub output_suffix: String,
    /// Extension of the input files, also used for the output names.
    pub extension: String,
}

impl ConvolutionConfig {
    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn with_border(mut self, border: BorderMode) -> Self {
        self.border = border;
        self
    }

    pub fn with_uid_policy(mut self, uid_policy: UidPolicy) -> Self {
        self.uid_policy = uid_policy;
        self
    }
}

impl Default for ConvolutionConfig {
    fn default() -> Self {
        Self {
            kernel: Kernel::default(),
            border: BorderMode::default(),
            uid_policy: UidPolicy::default(),
            description_suffix: DERIVED_DESCRIPTION_SUFFIX.to_string(),
            output_suffix: DERIVED_FILE_MARKER.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnrConfig {
    /// Edge length of the square background and object regions.
    pub kernel_size: usize,
}

impl Default for SnrConfig {
    fn default() -> Self {
        Self {
            kernel_size: DEFAULT_KERNEL_SIZE,
        }
    }
}
