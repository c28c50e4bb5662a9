use std::fs;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use super::compile::find_executable;
use crate::{ReportageError, Result};

/// Figures already backed by a raster renderer.
pub trait RasterFigure {
    /// Write the figure as a PNG at the given dots-per-inch, cropped to a
    /// tight bounding box.
    fn save_png(&self, path: &Path, dpi: u32) -> Result<()>;
}

/// Declarative chart objects that need an external export backend to become
/// pixels.
pub trait ChartFigure {
    /// Export the chart as PNG bytes at the given pixel size and scale factor.
    fn export_png(&self, width: u32, height: u32, scale: f64) -> Result<Vec<u8>>;
}

/// A figure accepted by [`super::Report::add_plot`].
///
/// Capabilities are resolved once per call: raster first, then declarative
/// chart export. A figure exposing neither is rejected with a typed error.
pub trait ReportFigure {
    fn as_raster(&self) -> Option<&dyn RasterFigure> {
        None
    }

    fn as_chart(&self) -> Option<&dyn ChartFigure> {
        None
    }
}

/// An already-rendered PNG embedded as-is. The dpi hint is ignored since the
/// pixels are final.
#[derive(Debug)]
pub struct PngImage {
    bytes: Vec<u8>,
}

impl PngImage {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ReportageError::NotFound(path.to_path_buf()));
        }
        Ok(Self {
            bytes: fs::read(path)?,
        })
    }
}

impl RasterFigure for PngImage {
    fn save_png(&self, path: &Path, _dpi: u32) -> Result<()> {
        fs::write(path, &self.bytes)?;
        Ok(())
    }
}

impl ReportFigure for PngImage {
    fn as_raster(&self) -> Option<&dyn RasterFigure> {
        Some(self)
    }
}

/// A Vega-Lite chart spec, rasterized through the external `vl-convert`
/// tool. The requested pixel size is written into the spec when it does not
/// set its own.
pub struct VegaLiteChart {
    spec: serde_json::Value,
}

impl VegaLiteChart {
    pub fn new(spec: serde_json::Value) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &serde_json::Value {
        &self.spec
    }
}

impl ChartFigure for VegaLiteChart {
    fn export_png(&self, width: u32, height: u32, scale: f64) -> Result<Vec<u8>> {
        let converter = find_executable("vl-convert").ok_or_else(|| {
            ReportageError::MissingDependency(
                "vl-convert is required for chart export; \
                 see https://github.com/vega/vl-convert"
                    .to_string(),
            )
        })?;

        let mut spec = self.spec.clone();
        if let Some(obj) = spec.as_object_mut() {
            obj.entry("width").or_insert_with(|| width.into());
            obj.entry("height").or_insert_with(|| height.into());
        }

        let work_dir = std::env::temp_dir().join(format!("reportage-{}", std::process::id()));
        fs::create_dir_all(&work_dir)?;
        let spec_path = work_dir.join("chart.vl.json");
        let png_path = work_dir.join("chart.png");
        let spec_bytes = serde_json::to_vec(&spec)
            .map_err(|e| ReportageError::UnsupportedInput(format!("chart spec: {}", e)))?;
        fs::write(&spec_path, spec_bytes)?;

        debug!(converter = %converter.display(), "exporting chart");
        let status = Command::new(&converter)
            .arg("vl2png")
            .arg("--input")
            .arg(&spec_path)
            .arg("--output")
            .arg(&png_path)
            .arg("--scale")
            .arg(scale.to_string())
            .status()?;
        if !status.success() {
            return Err(ReportageError::ExternalToolFailed {
                tool: "vl-convert".to_string(),
                status: status.code().unwrap_or(-1),
            });
        }

        Ok(fs::read(&png_path)?)
    }
}

impl ReportFigure for VegaLiteChart {
    fn as_chart(&self) -> Option<&dyn ChartFigure> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoCapability;

    impl ReportFigure for NoCapability {}

    #[test]
    fn default_capabilities_are_absent() {
        let fig = NoCapability;
        assert!(fig.as_raster().is_none());
        assert!(fig.as_chart().is_none());
    }

    #[test]
    fn png_image_exposes_raster_only() {
        let fig = PngImage::from_bytes(vec![0x89, b'P', b'N', b'G']);
        assert!(fig.as_raster().is_some());
        assert!(fig.as_chart().is_none());
    }

    #[test]
    fn vega_chart_exposes_chart_only() {
        let fig = VegaLiteChart::new(serde_json::json!({"mark": "bar"}));
        assert!(fig.as_chart().is_some());
        assert!(fig.as_raster().is_none());
    }

    #[test]
    fn missing_png_is_not_found() {
        let err = PngImage::from_file("definitely/not/here.png").unwrap_err();
        assert!(matches!(err, ReportageError::NotFound(_)));
    }
}
