//! Request segments and the fixed per-segment table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One independently validated part of an incoming request.
///
/// The declaration order is the validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Segment {
    /// Request headers.
    Headers = 0,
    /// Path parameters captured by the router.
    Params = 1,
    /// Parsed query string.
    Query = 2,
    /// Request body.
    Body = 3,
}

impl Segment {
    /// All segments in validation order.
    pub const ALL: [Segment; 4] = [Self::Headers, Self::Params, Self::Query, Self::Body];

    /// Returns the segment name as used in configuration and error payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Headers => "headers",
            Self::Params => "params",
            Self::Query => "query",
            Self::Body => "body",
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A segment name outside `headers`, `params`, `query`, `body`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown request segment '{0}', expected one of headers, params, query, body")]
pub struct UnknownSegment(pub String);

impl FromStr for Segment {
    type Err = UnknownSegment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "headers" => Ok(Self::Headers),
            "params" => Ok(Self::Params),
            "query" => Ok(Self::Query),
            "body" => Ok(Self::Body),
            other => Err(UnknownSegment(other.to_string())),
        }
    }
}

/// A lookup table with one optional slot per [`Segment`].
///
/// Iteration always follows validation order.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentMap<T> {
    slots: [Option<T>; 4],
}

impl<T> Default for SegmentMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SegmentMap<T> {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [None, None, None, None],
        }
    }

    /// Returns the value stored for `segment`.
    pub fn get(&self, segment: Segment) -> Option<&T> {
        self.slots[segment.slot()].as_ref()
    }

    /// Returns a mutable reference to the value stored for `segment`.
    pub fn get_mut(&mut self, segment: Segment) -> Option<&mut T> {
        self.slots[segment.slot()].as_mut()
    }

    /// Stores a value for `segment`, returning the previous one.
    pub fn insert(&mut self, segment: Segment, value: T) -> Option<T> {
        self.slots[segment.slot()].replace(value)
    }

    /// Removes and returns the value stored for `segment`.
    pub fn remove(&mut self, segment: Segment) -> Option<T> {
        self.slots[segment.slot()].take()
    }

    /// Returns true if `segment` has a value.
    pub fn contains(&self, segment: Segment) -> bool {
        self.slots[segment.slot()].is_some()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns true if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates occupied slots in validation order.
    pub fn iter(&self) -> impl Iterator<Item = (Segment, &T)> {
        Segment::ALL
            .into_iter()
            .filter_map(move |segment| self.get(segment).map(|value| (segment, value)))
    }

    /// Segments that currently hold a value, in validation order.
    pub fn segments(&self) -> Vec<Segment> {
        self.iter().map(|(segment, _)| segment).collect()
    }
}

impl<T> FromIterator<(Segment, T)> for SegmentMap<T> {
    fn from_iter<I: IntoIterator<Item = (Segment, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (segment, value) in iter {
            map.insert(segment, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_order() {
        assert!(Segment::Headers < Segment::Params);
        assert!(Segment::Params < Segment::Query);
        assert!(Segment::Query < Segment::Body);
        assert_eq!(Segment::ALL.len(), 4);
    }

    #[test]
    fn test_segment_round_trips_through_str() {
        for segment in Segment::ALL {
            assert_eq!(segment.as_str().parse::<Segment>().unwrap(), segment);
        }
    }

    #[test]
    fn test_unknown_segment_rejected() {
        let err = "cookies".parse::<Segment>().unwrap_err();
        assert_eq!(err, UnknownSegment("cookies".to_string()));
        assert!(err.to_string().contains("cookies"));

        // Names are case-sensitive like the configuration keys they mirror
        assert!("Body".parse::<Segment>().is_err());
    }

    #[test]
    fn test_segment_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Segment::Query).unwrap(), "\"query\"");
        let parsed: Segment = serde_json::from_str("\"params\"").unwrap();
        assert_eq!(parsed, Segment::Params);
    }

    #[test]
    fn test_segment_map_insert_and_get() {
        let mut map = SegmentMap::new();
        assert!(map.is_empty());

        assert_eq!(map.insert(Segment::Body, 1), None);
        assert_eq!(map.insert(Segment::Body, 2), Some(1));
        assert_eq!(map.get(Segment::Body), Some(&2));
        assert!(!map.contains(Segment::Headers));
        assert_eq!(map.len(), 1);

        assert_eq!(map.remove(Segment::Body), Some(2));
        assert!(map.is_empty());
    }

    #[test]
    fn test_segment_map_iterates_in_validation_order() {
        let map: SegmentMap<&str> = [
            (Segment::Body, "b"),
            (Segment::Headers, "h"),
            (Segment::Query, "q"),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            map.segments(),
            vec![Segment::Headers, Segment::Query, Segment::Body]
        );
        let values: Vec<_> = map.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec!["h", "q", "b"]);
    }
}
