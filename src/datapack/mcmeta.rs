//! The `pack.mcmeta` file describing the pack.

use std::ops::RangeInclusive;

use serde::{ser::SerializeStruct, Serialize, Serializer};

use crate::error::PackError;

use super::file::to_json_string;

/// Experimental features a pack can enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Faster and smoother minecarts.
    MinecartImprovements,
    /// Changed redstone wire behavior.
    RedstoneExperiments,
    /// Rebalanced villager trades.
    TradeRebalance,
    /// Locator bar showing the positions of other players.
    LocatorBar,
}

impl Feature {
    /// Get the id of the feature flag.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::MinecartImprovements => "minecraft:minecart_improvements",
            Self::RedstoneExperiments => "minecraft:redstone_experiments",
            Self::TradeRebalance => "minecraft:trade_rebalance",
            Self::LocatorBar => "minecraft:locator_bar",
        }
    }
}

impl From<Feature> for String {
    fn from(value: Feature) -> Self {
        value.id().to_string()
    }
}

/// A single pack format or an inclusive range of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatRange {
    /// One format.
    Single(u8),
    /// Inclusive range of formats.
    Range(RangeInclusive<u8>),
}

impl From<u8> for FormatRange {
    fn from(value: u8) -> Self {
        Self::Single(value)
    }
}
impl From<RangeInclusive<u8>> for FormatRange {
    fn from(value: RangeInclusive<u8>) -> Self {
        Self::Range(value)
    }
}

impl Serialize for FormatRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Single(format) => serializer.serialize_u8(*format),
            Self::Range(range) => {
                let mut s = serializer.serialize_struct("FormatRange", 2)?;
                s.serialize_field("min_inclusive", range.start())?;
                s.serialize_field("max_inclusive", range.end())?;
                s.end()
            }
        }
    }
}

/// A block filter entry. Matching files of lower packs are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    namespace: String,
    path: String,
}

/// An overlay directory active for some pack formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overlay {
    directory: String,
    formats: FormatRange,
}

/// Metadata of the pack.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct McMeta {
    description: String,
    supported_formats: Option<FormatRange>,
    features: Vec<String>,
    filters: Vec<Filter>,
    overlays: Vec<Overlay>,
}

impl McMeta {
    /// Create metadata with a description.
    #[must_use]
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            ..Default::default()
        }
    }

    /// Get the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Set the description.
    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    /// Set the pack formats the pack supports besides its own.
    pub fn set_supported_formats(&mut self, formats: impl Into<FormatRange>) {
        self.supported_formats = Some(formats.into());
    }

    /// Enable an experimental feature, either a [`Feature`] or a feature id.
    pub fn require_feature(&mut self, feature: impl Into<String>) {
        let feature = feature.into();
        if !self.features.contains(&feature) {
            self.features.push(feature);
        }
    }

    /// Get the enabled features.
    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Hide files of lower packs matching the namespace and path patterns.
    pub fn add_filter(&mut self, namespace: &str, path: &str) {
        self.filters.push(Filter {
            namespace: namespace.to_string(),
            path: path.to_string(),
        });
    }

    /// Add an overlay. Without `index` it is appended, entries later in the list take priority.
    pub fn add_overlay(&mut self, directory: &str, formats: impl Into<FormatRange>, index: Option<usize>) {
        let overlay = Overlay {
            directory: directory.to_string(),
            formats: formats.into(),
        };
        match index {
            Some(index) if index < self.overlays.len() => self.overlays.insert(index, overlay),
            _ => self.overlays.push(overlay),
        }
    }

    /// Get the overlay directories in order.
    #[must_use]
    pub fn overlay_directories(&self) -> Vec<&str> {
        self.overlays
            .iter()
            .map(|overlay| overlay.directory.as_str())
            .collect()
    }

    /// Render the `pack.mcmeta` file for the given pack format.
    ///
    /// # Errors
    /// - If serialization fails
    pub fn render(&self, pack_format: u8) -> Result<String, PackError> {
        #[derive(Serialize)]
        struct Pack<'a> {
            description: &'a str,
            pack_format: u8,
            #[serde(skip_serializing_if = "Option::is_none")]
            supported_formats: Option<&'a FormatRange>,
        }
        #[derive(Serialize)]
        struct FilterSection<'a> {
            block: &'a [Filter],
        }
        #[derive(Serialize)]
        struct FeatureSection<'a> {
            enabled: &'a [String],
        }
        #[derive(Serialize)]
        struct OverlaySection<'a> {
            entries: &'a [Overlay],
        }
        #[derive(Serialize)]
        struct McMetaJson<'a> {
            pack: Pack<'a>,
            #[serde(skip_serializing_if = "Option::is_none")]
            filter: Option<FilterSection<'a>>,
            #[serde(skip_serializing_if = "Option::is_none")]
            features: Option<FeatureSection<'a>>,
            #[serde(skip_serializing_if = "Option::is_none")]
            overlays: Option<OverlaySection<'a>>,
        }

        let json = McMetaJson {
            pack: Pack {
                description: &self.description,
                pack_format,
                supported_formats: self.supported_formats.as_ref(),
            },
            filter: (!self.filters.is_empty()).then_some(FilterSection {
                block: &self.filters,
            }),
            features: (!self.features.is_empty()).then_some(FeatureSection {
                enabled: &self.features,
            }),
            overlays: (!self.overlays.is_empty()).then_some(OverlaySection {
                entries: &self.overlays,
            }),
        };
        to_json_string(&json)
    }
}
