use serde::{Deserialize, Serialize};

/// A (dialogue_index, line_index) position, ordered lexicographically.
pub type LinePos = (i64, i64);

/// End bound of a row range.
///
/// The rule files use `dial_e == -1 && line_e == -1` to mean "take everything
/// from the start onward". Modeling that as a variant instead of carrying the
/// sentinel around keeps the comparison logic free of magic numbers; the wire
/// form is preserved by the serde impls below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEnd {
    /// Inclusive end position.
    Closed(LinePos),
    /// No end: the range extends to the last row.
    Open,
}

/// An inclusive range of transcript rows, bounded by (dialogue_index,
/// line_index) positions. Used both for deletion rules and split rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    /// Inclusive start position.
    pub start: LinePos,
    /// End bound.
    pub end: RangeEnd,
}

impl RowRange {
    pub fn closed(start: LinePos, end: LinePos) -> Self {
        Self {
            start,
            end: RangeEnd::Closed(end),
        }
    }

    pub fn open_ended(start: LinePos) -> Self {
        Self {
            start,
            end: RangeEnd::Open,
        }
    }

    /// Whether the given position falls inside this range (both bounds
    /// inclusive; an open-ended range matches everything from the start on).
    pub fn contains(&self, pos: LinePos) -> bool {
        if pos < self.start {
            return false;
        }
        match self.end {
            RangeEnd::Closed(end) => pos <= end,
            RangeEnd::Open => true,
        }
    }
}

/// Wire form used by the rule files.
#[derive(Debug, Serialize, Deserialize)]
struct RawRange {
    dial_s: i64,
    line_s: i64,
    dial_e: i64,
    line_e: i64,
}

impl Serialize for RowRange {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (dial_e, line_e) = match self.end {
            RangeEnd::Closed(end) => end,
            RangeEnd::Open => (-1, -1),
        };
        RawRange {
            dial_s: self.start.0,
            line_s: self.start.1,
            dial_e,
            line_e,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RowRange {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawRange::deserialize(deserializer)?;
        let end = if raw.dial_e == -1 && raw.line_e == -1 {
            RangeEnd::Open
        } else {
            RangeEnd::Closed((raw.dial_e, raw.line_e))
        };
        Ok(Self {
            start: (raw.dial_s, raw.line_s),
            end,
        })
    }
}
