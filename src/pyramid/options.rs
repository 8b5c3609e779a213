//! Pyramid construction options and the separable smoothing kernels.

/// 1D kernel applied along both axes before decimation.
pub trait SeparableFilter {
    /// Taps in left-to-right order, centred on the middle entry.
    fn taps(&self) -> &[f32];
}

#[derive(Clone, Copy, Debug)]
pub struct StaticSeparableFilter {
    taps: &'static [f32],
}

impl StaticSeparableFilter {
    pub const fn new(taps: &'static [f32]) -> Self {
        Self { taps }
    }
}

impl Default for StaticSeparableFilter {
    fn default() -> Self {
        GAUSSIAN_5TAP
    }
}

impl SeparableFilter for StaticSeparableFilter {
    #[inline]
    fn taps(&self) -> &[f32] {
        self.taps
    }
}

/// Normalised 5-tap binomial approximation of a Gaussian, `[1 4 6 4 1] / 16`.
pub const GAUSSIAN_5TAP: StaticSeparableFilter =
    StaticSeparableFilter::new(&[0.0625, 0.25, 0.375, 0.25, 0.0625]);

#[derive(Clone, Copy)]
pub struct PyramidOptions {
    /// Number of pyramid levels (>= 1).
    pub levels: usize,
    /// Number of leading decimations that smooth with `filter` first.
    pub blur_levels: usize,
    pub filter: StaticSeparableFilter,
}

impl PyramidOptions {
    /// `levels` levels, smoothing before every decimation.
    pub fn new(levels: usize) -> Self {
        Self {
            levels,
            blur_levels: levels,
            filter: GAUSSIAN_5TAP,
        }
    }

    pub fn with_blur_levels(mut self, blur_levels: usize) -> Self {
        self.blur_levels = blur_levels;
        self
    }
}

impl std::fmt::Debug for PyramidOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PyramidOptions")
            .field("levels", &self.levels)
            .field("blur_levels", &self.blur_levels)
            .field("filter_taps", &self.filter.taps().len())
            .finish()
    }
}
