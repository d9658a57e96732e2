//! Table-driven bucketing of continuous values
//!
//! A [`BucketTable`] is an ordered list of ranges, each carrying a label.
//! Classification walks the table and returns the label of the first range
//! containing the value, or [`Bucket::Unclassified`] when none does. Transit
//! times and shipping distances use the same mechanism with different tables.

use std::fmt;

use serde::{Serialize, Serializer};

/// One end of a bucket range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Inclusive(f64),
    Exclusive(f64),
    Unbounded,
}

impl Bound {
    fn admits_from_below(&self, value: f64) -> bool {
        match *self {
            Bound::Inclusive(b) => value >= b,
            Bound::Exclusive(b) => value > b,
            Bound::Unbounded => true,
        }
    }

    fn admits_from_above(&self, value: f64) -> bool {
        match *self {
            Bound::Inclusive(b) => value <= b,
            Bound::Exclusive(b) => value < b,
            Bound::Unbounded => true,
        }
    }
}

/// A labelled range `lower..upper`.
#[derive(Debug, Clone, Copy)]
pub struct BucketRange<L> {
    pub lower: Bound,
    pub upper: Bound,
    pub label: L,
}

impl<L: Copy> BucketRange<L> {
    pub const fn new(lower: Bound, upper: Bound, label: L) -> Self {
        Self {
            lower,
            upper,
            label,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower.admits_from_below(value) && self.upper.admits_from_above(value)
    }
}

/// Result of classifying a value against a [`BucketTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket<L> {
    Labeled(L),
    Unclassified,
}

impl<L: Copy> Bucket<L> {
    pub fn label(&self) -> Option<L> {
        match self {
            Bucket::Labeled(label) => Some(*label),
            Bucket::Unclassified => None,
        }
    }

    pub fn is_classified(&self) -> bool {
        matches!(self, Bucket::Labeled(_))
    }
}

impl<L: fmt::Display> fmt::Display for Bucket<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Labeled(label) => label.fmt(f),
            Bucket::Unclassified => f.write_str("unclassified"),
        }
    }
}

impl<L: fmt::Display> Serialize for Bucket<L> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ordered boundary table; the first matching range wins.
#[derive(Debug, Clone, Copy)]
pub struct BucketTable<L: 'static> {
    ranges: &'static [BucketRange<L>],
}

impl<L: Copy + 'static> BucketTable<L> {
    pub const fn new(ranges: &'static [BucketRange<L>]) -> Self {
        Self { ranges }
    }

    /// Classify a value. NaN never matches any range.
    pub fn classify(&self, value: f64) -> Bucket<L> {
        if value.is_nan() {
            return Bucket::Unclassified;
        }
        self.ranges
            .iter()
            .find(|range| range.contains(value))
            .map(|range| Bucket::Labeled(range.label))
            .unwrap_or(Bucket::Unclassified)
    }

    pub fn ranges(&self) -> &'static [BucketRange<L>] {
        self.ranges
    }
}

/// Days between order placed and order delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransitBucket {
    One,
    Two,
    Three,
    Four,
    Five,
    SixPlus,
}

impl fmt::Display for TransitBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransitBucket::One => "1",
            TransitBucket::Two => "2",
            TransitBucket::Three => "3",
            TransitBucket::Four => "4",
            TransitBucket::Five => "5",
            TransitBucket::SixPlus => "6+",
        };
        f.write_str(label)
    }
}

/// Upper edge of a shipping distance range, in miles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DistanceBucket(pub u32);

impl fmt::Display for DistanceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

use Bound::{Exclusive, Inclusive, Unbounded};

/// Half-open day ranges over elapsed (fractional) days.
pub const TRANSIT_BUCKETS: BucketTable<TransitBucket> = BucketTable::new(&[
    BucketRange::new(Inclusive(0.0), Exclusive(1.0), TransitBucket::One),
    BucketRange::new(Inclusive(1.0), Exclusive(2.0), TransitBucket::Two),
    BucketRange::new(Inclusive(2.0), Exclusive(3.0), TransitBucket::Three),
    BucketRange::new(Inclusive(3.0), Exclusive(4.0), TransitBucket::Four),
    BucketRange::new(Inclusive(4.0), Exclusive(5.0), TransitBucket::Five),
    BucketRange::new(Inclusive(5.0), Unbounded, TransitBucket::SixPlus),
]);

/// Inclusive whole-mile ranges.
pub const DISTANCE_BUCKETS: BucketTable<DistanceBucket> = BucketTable::new(&[
    BucketRange::new(Inclusive(1.0), Inclusive(25.0), DistanceBucket(25)),
    BucketRange::new(Inclusive(26.0), Inclusive(50.0), DistanceBucket(50)),
    BucketRange::new(Inclusive(51.0), Inclusive(75.0), DistanceBucket(75)),
    BucketRange::new(Inclusive(76.0), Inclusive(100.0), DistanceBucket(100)),
    BucketRange::new(Inclusive(101.0), Inclusive(150.0), DistanceBucket(150)),
    BucketRange::new(Inclusive(151.0), Inclusive(200.0), DistanceBucket(200)),
    BucketRange::new(Inclusive(201.0), Inclusive(250.0), DistanceBucket(250)),
    BucketRange::new(Inclusive(251.0), Unbounded, DistanceBucket(500)),
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_matching_range_wins() {
        const OVERLAP: BucketTable<u8> = BucketTable::new(&[
            BucketRange::new(Inclusive(0.0), Inclusive(10.0), 1),
            BucketRange::new(Inclusive(5.0), Inclusive(15.0), 2),
        ]);
        assert_eq!(OVERLAP.classify(7.0), Bucket::Labeled(1));
        assert_eq!(OVERLAP.classify(12.0), Bucket::Labeled(2));
        assert_eq!(OVERLAP.classify(20.0), Bucket::Unclassified);
    }

    #[test]
    fn test_nan_is_unclassified() {
        assert_eq!(TRANSIT_BUCKETS.classify(f64::NAN), Bucket::Unclassified);
    }

    #[test]
    fn test_bucket_display() {
        assert_eq!(Bucket::Labeled(TransitBucket::SixPlus).to_string(), "6+");
        assert_eq!(Bucket::Labeled(DistanceBucket(150)).to_string(), "150");
        assert_eq!(Bucket::<DistanceBucket>::Unclassified.to_string(), "unclassified");
    }
}
