//! Classification labels for feed posts.
//!
//! A post gets exactly one [`Tag`]. Which tags are acceptable depends on the
//! active [`TagSet`]: the canonical set has all fourteen labels, the legacy
//! set only the four that earlier prompts asked for. Anything outside the
//! active set resolves to [`Tag::Post`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification label for a post. Serialized lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Advice,
    Achievement,
    Post,
    Advertisement,
    Announcement,
    Opinion,
    Question,
    Job,
    Event,
    Milestone,
    Story,
    News,
    Collaboration,
    Testimonial,
}

impl Tag {
    /// All tags, in the order they are offered to the model.
    pub const ALL: [Tag; 14] = [
        Tag::Advice,
        Tag::Achievement,
        Tag::Post,
        Tag::Advertisement,
        Tag::Announcement,
        Tag::Opinion,
        Tag::Question,
        Tag::Job,
        Tag::Event,
        Tag::Milestone,
        Tag::Story,
        Tag::News,
        Tag::Collaboration,
        Tag::Testimonial,
    ];

    /// Fallback when the model gives no usable tag.
    pub const DEFAULT: Tag = Tag::Post;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Advice => "advice",
            Self::Achievement => "achievement",
            Self::Post => "post",
            Self::Advertisement => "advertisement",
            Self::Announcement => "announcement",
            Self::Opinion => "opinion",
            Self::Question => "question",
            Self::Job => "job",
            Self::Event => "event",
            Self::Milestone => "milestone",
            Self::Story => "story",
            Self::News => "news",
            Self::Collaboration => "collaboration",
            Self::Testimonial => "testimonial",
        }
    }
}

impl Default for Tag {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tag: {0:?}")]
pub struct UnknownTag(pub String);

impl FromStr for Tag {
    type Err = UnknownTag;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Tag::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

/// The set of tags a response is validated against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagSet {
    /// All fourteen labels.
    #[default]
    Canonical,
    /// The narrow four-label set from the first prompt revisions.
    Legacy,
}

const LEGACY_TAGS: [Tag; 4] = [Tag::Advice, Tag::Achievement, Tag::Post, Tag::Advertisement];

impl TagSet {
    pub fn tags(&self) -> &'static [Tag] {
        match self {
            Self::Canonical => &Tag::ALL,
            Self::Legacy => &LEGACY_TAGS,
        }
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.tags().contains(&tag)
    }

    /// Resolve a raw tag string against this set.
    ///
    /// Returns `None` when the value is not a known tag or is known but
    /// outside this set. Callers substitute [`Tag::DEFAULT`].
    pub fn resolve(&self, raw: &str) -> Option<Tag> {
        raw.parse::<Tag>().ok().filter(|t| self.contains(*t))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Canonical => "canonical",
            Self::Legacy => "legacy",
        }
    }
}
