use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Pixel interval a scale projects onto. `start` receives the domain start,
/// so vertical value axes pass `(bottom, top)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRange {
    pub start: f64,
    pub end: f64,
}

impl PixelRange {
    #[must_use]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.end - self.start
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.span().abs()
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start != self.end
    }
}

/// Continuous numeric axis mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(ChartError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    pub fn domain_to_pixel(self, value: f64, range: PixelRange) -> ChartResult<f64> {
        if !range.is_valid() {
            return Err(ChartError::InvalidData(
                "pixel range must be finite and non-empty".to_owned(),
            ));
        }
        if !value.is_finite() {
            return Err(ChartError::InvalidData("value must be finite".to_owned()));
        }

        let normalized = (value - self.domain_start) / (self.domain_end - self.domain_start);
        Ok(range.start + normalized * range.span())
    }

    pub fn pixel_to_domain(self, pixel: f64, range: PixelRange) -> ChartResult<f64> {
        if !range.is_valid() {
            return Err(ChartError::InvalidData(
                "pixel range must be finite and non-empty".to_owned(),
            ));
        }
        if !pixel.is_finite() {
            return Err(ChartError::InvalidData("pixel must be finite".to_owned()));
        }

        let normalized = (pixel - range.start) / range.span();
        Ok(self.domain_start + normalized * (self.domain_end - self.domain_start))
    }

    /// Maps `value` and clamps the result into `range`, used for marks whose
    /// value falls outside a strict axis domain.
    pub fn domain_to_pixel_clamped(self, value: f64, range: PixelRange) -> ChartResult<f64> {
        let pixel = self.domain_to_pixel(value, range)?;
        Ok(pixel.clamp(range.start.min(range.end), range.start.max(range.end)))
    }
}
