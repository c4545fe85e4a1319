//! Keyword-driven feature tags for a route name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A notable feature of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureTag {
    Waterfall,
    Lake,
    Mountain,
    Forest,
    River,
    Canyon,
    Cave,
    Beach,
    CityView,
    Wildlife,
    Historical,
    Camping,
    PetFriendly,
    FamilyFriendly,
    Hidden,
    EpicView,
}

impl FeatureTag {
    /// Wire name used in exported records.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureTag::Waterfall => "waterfall",
            FeatureTag::Lake => "lake",
            FeatureTag::Mountain => "mountain",
            FeatureTag::Forest => "forest",
            FeatureTag::River => "river",
            FeatureTag::Canyon => "canyon",
            FeatureTag::Cave => "cave",
            FeatureTag::Beach => "beach",
            FeatureTag::CityView => "cityView",
            FeatureTag::Wildlife => "wildlife",
            FeatureTag::Historical => "historical",
            FeatureTag::Camping => "camping",
            FeatureTag::PetFriendly => "petFriendly",
            FeatureTag::FamilyFriendly => "familyFriendly",
            FeatureTag::Hidden => "hidden",
            FeatureTag::EpicView => "epicView",
        }
    }
}

impl fmt::Display for FeatureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword groups in output order. Keywords are lowercase.
const FEATURE_KEYWORDS: &[(&[&str], FeatureTag)] = &[
    (&["瀑布", "waterfall"], FeatureTag::Waterfall),
    (&["湖", "lake"], FeatureTag::Lake),
    (&["山", "mountain"], FeatureTag::Mountain),
    (&["森林", "forest"], FeatureTag::Forest),
    (&["河", "river"], FeatureTag::River),
    (&["峡谷", "canyon"], FeatureTag::Canyon),
    (&["洞穴", "cave"], FeatureTag::Cave),
    (&["海滩", "beach"], FeatureTag::Beach),
    (&["城市景观", "cityview"], FeatureTag::CityView),
    (&["野生动物", "wildlife"], FeatureTag::Wildlife),
    (&["历史", "historical"], FeatureTag::Historical),
    (&["露营", "camping"], FeatureTag::Camping),
    (&["宠物友好", "petfriendly"], FeatureTag::PetFriendly),
    (&["家庭友好", "familyfriendly"], FeatureTag::FamilyFriendly),
    (&["隐秘", "hidden"], FeatureTag::Hidden),
    (&["壮观景色", "epicview"], FeatureTag::EpicView),
];

/// Tag a route by the keywords in its name.
///
/// Tags come out in table order, each at most once. A name with no keyword
/// yields an empty list.
///
/// # Example
/// ```
/// use route_metrics::features::{tag_features, FeatureTag};
///
/// let tags = tag_features("Hidden Lake Waterfall");
/// assert_eq!(tags, vec![FeatureTag::Waterfall, FeatureTag::Lake, FeatureTag::Hidden]);
/// ```
pub fn tag_features(name: &str) -> Vec<FeatureTag> {
    let lowered = name.to_lowercase();
    let mut tags = Vec::new();

    for (keywords, tag) in FEATURE_KEYWORDS {
        if keywords.iter().any(|k| lowered.contains(k)) && !tags.contains(tag) {
            tags.push(*tag);
        }
    }

    tags
}
