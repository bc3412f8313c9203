use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::core::scale::PixelRange;

/// Band scale over distinct category labels, in first-appearance order.
///
/// Each category owns one band of equal width. For vertical axes a
/// non-inverted scale places the first category at the bottom; `inverted`
/// places it at the top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScale {
    categories: IndexSet<String>,
    inverted: bool,
}

impl CategoryScale {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: labels.into_iter().map(Into::into).collect(),
            inverted: false,
        }
    }

    #[must_use]
    pub fn with_inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    #[must_use]
    pub fn index_of(&self, category: &str) -> Option<usize> {
        self.categories.get_index_of(category)
    }

    #[must_use]
    pub fn category(&self, index: usize) -> Option<&str> {
        self.categories.get_index(index).map(String::as_str)
    }

    /// Width of one band in pixels.
    #[must_use]
    pub fn band_width(&self, range: PixelRange) -> f64 {
        if self.categories.is_empty() {
            return 0.0;
        }
        range.length() / self.categories.len() as f64
    }

    /// Pixel bounds `(low, high)` of band `index`, `low <= high`.
    #[must_use]
    pub fn band(&self, index: usize, range: PixelRange) -> Option<(f64, f64)> {
        if index >= self.categories.len() {
            return None;
        }
        let band = self.band_width(range);
        let slot = if self.inverted {
            (self.categories.len() - 1 - index) as f64
        } else {
            index as f64
        };
        let direction = range.span().signum();
        let edge_a = range.start + direction * slot * band;
        let edge_b = edge_a + direction * band;
        Some((edge_a.min(edge_b), edge_a.max(edge_b)))
    }

    #[must_use]
    pub fn center(&self, index: usize, range: PixelRange) -> Option<f64> {
        self.band(index, range).map(|(low, high)| (low + high) * 0.5)
    }

    /// Category whose band contains `pixel`.
    #[must_use]
    pub fn index_at(&self, pixel: f64, range: PixelRange) -> Option<usize> {
        (0..self.categories.len()).find(|index| {
            self.band(*index, range)
                .is_some_and(|(low, high)| pixel >= low && pixel <= high)
        })
    }
}
