//! Best-effort attribution-chart capability
//!
//! The pipeline's `shap_summary.png` artifact is optional: its absence is
//! not an error. Rather than guarding a fallible plotting call, rendering
//! is a capability trait; the default [`NullChartRenderer`] reports that
//! no backend is available and the CLI skips the artifact with a note.

use std::{io, path::Path};

/// Renders the global attribution ranking to an image file.
pub trait ChartRenderer {
    /// Attempts to render `ranking` to `path`.
    ///
    /// Returns `Ok(false)` when this backend cannot produce an image (the
    /// artifact is then simply absent); `Err` only for genuine I/O
    /// failures of a backend that tried.
    fn render_attribution(&self, ranking: &[(String, f64)], path: &Path) -> io::Result<bool>;
}

/// Chart backend used when no plotting capability is compiled in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullChartRenderer;

impl ChartRenderer for NullChartRenderer {
    fn render_attribution(&self, _ranking: &[(String, f64)], _path: &Path) -> io::Result<bool> {
        Ok(false)
    }
}
