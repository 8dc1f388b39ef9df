//! # Bridge Keys
//!
//! Small copyable identifiers for the parts of a bridge the engine works
//! with: girders, precast segments, girder lines and post-tensioning ducts.
//!
//! A *girder line* is the set of girders with the same girder index across
//! every group (span) of the bridge. Girder lines are analyzed as a unit.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A girder within a girder group (span)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GirderKey {
    pub group: usize,
    pub girder: usize,
}

impl GirderKey {
    pub fn new(group: usize, girder: usize) -> Self {
        GirderKey { group, girder }
    }

    /// The girder line this girder belongs to
    pub fn girder_line(&self) -> GirderLineKey {
        GirderLineKey(self.girder)
    }

    /// Key of a segment within this girder
    pub fn segment(&self, segment: usize) -> SegmentKey {
        SegmentKey::new(self.group, self.girder, segment)
    }
}

impl fmt::Display for GirderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Group {} Girder {}", self.group + 1, girder_letter(self.girder))
    }
}

/// A precast segment of a girder
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SegmentKey {
    pub group: usize,
    pub girder: usize,
    pub segment: usize,
}

impl SegmentKey {
    pub fn new(group: usize, girder: usize, segment: usize) -> Self {
        SegmentKey { group, girder, segment }
    }

    pub fn girder_key(&self) -> GirderKey {
        GirderKey::new(self.group, self.girder)
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Segment {}", self.girder_key(), self.segment + 1)
    }
}

/// Girder index shared by every group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GirderLineKey(pub usize);

impl fmt::Display for GirderLineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Girder Line {}", girder_letter(self.0))
    }
}

/// The member a duct runs through
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MemberKey {
    /// Segment tendon, confined to one precast segment
    Segment(SegmentKey),
    /// Girder tendon, running the full spliced girder
    Girder(GirderKey),
}

impl MemberKey {
    pub fn girder_key(&self) -> GirderKey {
        match self {
            MemberKey::Segment(segment) => segment.girder_key(),
            MemberKey::Girder(girder) => *girder,
        }
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKey::Segment(segment) => write!(f, "{segment}"),
            MemberKey::Girder(girder) => write!(f, "{girder}"),
        }
    }
}

/// Identifies a post-tensioning duct by member and duct index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DuctKey {
    pub member: MemberKey,
    pub duct: usize,
}

impl DuctKey {
    pub fn new(member: MemberKey, duct: usize) -> Self {
        DuctKey { member, duct }
    }
}

impl fmt::Display for DuctKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Duct {}", self.member, self.duct + 1)
    }
}

/// One end of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MemberEnd {
    Start,
    End,
}

impl MemberEnd {
    pub const ALL: [MemberEnd; 2] = [MemberEnd::Start, MemberEnd::End];

    /// Array index for per-end storage
    pub fn index(&self) -> usize {
        match self {
            MemberEnd::Start => 0,
            MemberEnd::End => 1,
        }
    }
}

impl fmt::Display for MemberEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberEnd::Start => write!(f, "Start"),
            MemberEnd::End => write!(f, "End"),
        }
    }
}

/// End(s) a tendon is stressed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum JackingEnd {
    #[default]
    Start,
    End,
    Both,
}

impl JackingEnd {
    /// Whether the tendon is jacked at `end`
    pub fn jacks(&self, end: MemberEnd) -> bool {
        matches!(
            (self, end),
            (JackingEnd::Both, _) | (JackingEnd::Start, MemberEnd::Start) | (JackingEnd::End, MemberEnd::End)
        )
    }
}

/// Girder labels run A, B, C... like the plan sheets
fn girder_letter(index: usize) -> String {
    let mut label = String::new();
    let mut n = index;
    loop {
        label.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    label
}
