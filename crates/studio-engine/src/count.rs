pub const MIN_IMAGES: u8 = 1;
pub const MAX_IMAGES: u8 = 4;

/// Number of remote calls in one batch, always within `[1, 4]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageCount(u8);

impl Default for ImageCount {
    fn default() -> Self {
        Self(MIN_IMAGES)
    }
}

impl ImageCount {
    pub fn clamp(value: i64) -> Self {
        Self(value.clamp(MIN_IMAGES as i64, MAX_IMAGES as i64) as u8)
    }

    /// Lenient parse of user input: missing, blank, NaN or non-numeric input is
    /// 1; infinities clamp like any other number and fractions round up.
    pub fn parse(input: Option<&str>) -> Self {
        let Some(value) = input
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| raw.parse::<f64>().ok())
            .filter(|value| !value.is_nan())
        else {
            return Self::default();
        };
        let clamped = value.clamp(MIN_IMAGES as f64, MAX_IMAGES as f64);
        Self(clamped.ceil() as u8)
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl From<u8> for ImageCount {
    fn from(value: u8) -> Self {
        Self::clamp(value as i64)
    }
}
