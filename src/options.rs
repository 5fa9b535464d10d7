//! Knobs for loading and compiling documents.

/// Options for [`Loader`](crate::Loader).
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Overrides the `SVGOPS_LOG` environment variable when set.
    pub log_enabled: Option<bool>,
}

impl LoadOptions {
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.log_enabled = Some(enabled);
        self
    }
}

/// Options for [`Compiler`](crate::Compiler).
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Dots per inch used to resolve physical units like `mm` or `in`.
    pub dpi: f64,

    /// Font size used to resolve `em` units when no `font-size` is specified.
    pub font_size: f64,

    /// Elements nested deeper than this are skipped.
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            dpi: 96.0,
            font_size: 12.0,
            max_depth: 256,
        }
    }
}

impl CompileOptions {
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
