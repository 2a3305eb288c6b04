use serde::Serialize;

/// A 1–5 star rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RatingValue(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between 1 and 5")]
pub struct InvalidRating;

impl RatingValue {
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for RatingValue {
    type Error = InvalidRating;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        if (1..=5).contains(&v) {
            Ok(Self(v as u8))
        } else {
            Err(InvalidRating)
        }
    }
}
