//! FILENAME: core/summary-engine/src/range.rs
//! PURPOSE: Classifies turnaround-time day counts into reporting buckets.
//! CONTEXT: Buckets are lower-open, upper-closed: (-1, 30], (30, 60], (60, 90]
//! and (90, inf). Labels keep the wording used on the filed schedules even
//! though the label text reads as integer bounds.

use engine::CellValue;
use serde::{Deserialize, Serialize};

use crate::engine::coerce_number;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RangeBucket {
    UpTo30,
    From31To60,
    From61To90,
    Over90,
}

impl RangeBucket {
    /// Display order.
    pub const ALL: [RangeBucket; 4] = [
        RangeBucket::UpTo30,
        RangeBucket::From31To60,
        RangeBucket::From61To90,
        RangeBucket::Over90,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RangeBucket::UpTo30 => "-1 to <31",
            RangeBucket::From31To60 => ">30 and <61",
            RangeBucket::From61To90 => ">60 and <91",
            RangeBucket::Over90 => ">90",
        }
    }

    pub fn from_days(days: f64) -> Option<RangeBucket> {
        if days.is_nan() || days <= -1.0 {
            None
        } else if days <= 30.0 {
            Some(RangeBucket::UpTo30)
        } else if days <= 60.0 {
            Some(RangeBucket::From31To60)
        } else if days <= 90.0 {
            Some(RangeBucket::From61To90)
        } else {
            Some(RangeBucket::Over90)
        }
    }
}

/// Bucket for a day-count value, or `None` when it is missing, non-numeric or
/// below the first bucket.
pub fn classify(value: &CellValue) -> Option<RangeBucket> {
    if value.is_blank() {
        return None;
    }
    coerce_number(value).and_then(RangeBucket::from_days)
}
