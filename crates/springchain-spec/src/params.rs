//! Spring chain generation parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ParamsError;
use crate::knob::KnobSpec;
use crate::spring::SpringProperty;
use crate::widget::WidgetStyle;

/// Minimum number of connected bones a spring chain needs.
pub const MIN_CHAIN_LENGTH: usize = 3;

fn default_true() -> bool {
    true
}

fn default_preview_widget() -> WidgetStyle {
    WidgetStyle::Bone
}

/// How deform bones blend control and spring motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeformBlend {
    /// "Follow Manual" at full influence, then "Follow Spring" driven by
    /// `follow_spring` on top of it.
    #[default]
    Layered,
    /// "Follow Spring" driven by `follow_spring`, then "Follow Manual"
    /// driven by `1 - follow_spring`.
    Split,
}

/// What the preview chain copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewSource {
    /// The spring target chain (pure simulation result).
    #[default]
    SpringTarget,
    /// The deform chain (blended result).
    Deform,
}

/// Parameters of one spring chain rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpringChainParams {
    /// Share spring properties through global knobs with per-instance factors.
    #[serde(default = "default_true")]
    pub unify_spring_props: bool,
    /// Deform constraint driver policy.
    #[serde(default)]
    pub deform_blend: DeformBlend,
    /// Chain copied by preview bones.
    #[serde(default)]
    pub preview_source: PreviewSource,
    /// Custom shape for control bones.
    #[serde(default)]
    pub control_widget: WidgetStyle,
    /// Custom shape for preview bones.
    #[serde(default = "default_preview_widget")]
    pub preview_widget: WidgetStyle,
    /// Lock every transform channel of preview bones.
    #[serde(default = "default_true")]
    pub lock_preview: bool,
    /// Group derived bones into bone collections.
    #[serde(default = "default_true")]
    pub collections: bool,
    /// Overrides for initial spring property values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub spring_defaults: BTreeMap<SpringProperty, f64>,
}

impl Default for SpringChainParams {
    fn default() -> Self {
        Self {
            unify_spring_props: true,
            deform_blend: DeformBlend::default(),
            preview_source: PreviewSource::default(),
            control_widget: WidgetStyle::default(),
            preview_widget: default_preview_widget(),
            lock_preview: true,
            collections: true,
            spring_defaults: BTreeMap::new(),
        }
    }
}

impl SpringChainParams {
    /// Creates params with every default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses params from JSON.
    pub fn from_json(json: &str) -> Result<Self, ParamsError> {
        serde_json::from_str(json).map_err(|e| ParamsError::Parse(e.to_string()))
    }

    /// Sets unify mode.
    pub fn with_unify_spring_props(mut self, enabled: bool) -> Self {
        self.unify_spring_props = enabled;
        self
    }

    /// Sets the deform blend policy.
    pub fn with_deform_blend(mut self, blend: DeformBlend) -> Self {
        self.deform_blend = blend;
        self
    }

    /// Sets what the preview chain copies.
    pub fn with_preview_source(mut self, source: PreviewSource) -> Self {
        self.preview_source = source;
        self
    }

    /// Sets the control and preview widget styles.
    pub fn with_widgets(mut self, control: WidgetStyle, preview: WidgetStyle) -> Self {
        self.control_widget = control;
        self.preview_widget = preview;
        self
    }

    /// Sets whether preview bones are locked.
    pub fn with_lock_preview(mut self, enabled: bool) -> Self {
        self.lock_preview = enabled;
        self
    }

    /// Sets whether bones are grouped into collections.
    pub fn with_collections(mut self, enabled: bool) -> Self {
        self.collections = enabled;
        self
    }

    /// Overrides the initial value of a spring property.
    pub fn with_spring_default(mut self, property: SpringProperty, value: f64) -> Self {
        self.spring_defaults.insert(property, value);
        self
    }

    /// Returns the initial value for a spring property.
    pub fn spring_default(&self, property: SpringProperty) -> f64 {
        self.spring_defaults
            .get(&property)
            .copied()
            .unwrap_or_else(|| property.default_value())
    }

    /// Returns the shared knobs declared in unify mode, one per spring property.
    pub fn global_knobs(&self) -> Vec<KnobSpec> {
        SpringProperty::ALL
            .iter()
            .map(|p| KnobSpec::global(*p, self.spring_default(*p)))
            .collect()
    }

    /// Validates the params.
    pub fn validate(&self) -> Result<(), ParamsError> {
        for knob in self.global_knobs() {
            knob.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let params = SpringChainParams::new();
        assert!(params.unify_spring_props);
        assert_eq!(params.deform_blend, DeformBlend::Layered);
        assert_eq!(params.preview_source, PreviewSource::SpringTarget);
        assert_eq!(params.control_widget, WidgetStyle::WireCircle);
        assert_eq!(params.preview_widget, WidgetStyle::Bone);
        assert!(params.lock_preview);
        assert!(params.collections);
        assert_eq!(params.global_knobs().len(), 9);
    }

    #[test]
    fn test_from_json_defaults() {
        let params = SpringChainParams::from_json("{}").unwrap();
        assert_eq!(params, SpringChainParams::default());

        let params = SpringChainParams::from_json(
            r#"{"unify_spring_props": false, "deform_blend": "split", "spring_defaults": {"damping": 0.1}}"#,
        )
        .unwrap();
        assert!(!params.unify_spring_props);
        assert_eq!(params.deform_blend, DeformBlend::Split);
        assert_eq!(params.spring_default(SpringProperty::Damping), 0.1);
        assert_eq!(params.spring_default(SpringProperty::Speed), 1.0);
    }

    #[test]
    fn test_from_json_rejects_unknown_fields() {
        let err = SpringChainParams::from_json(r#"{"unify": true}"#).unwrap_err();
        assert!(matches!(err, ParamsError::Parse(_)));
    }

    #[test]
    fn test_validate_spring_default_out_of_range() {
        let params = SpringChainParams::new().with_spring_default(SpringProperty::Damping, 4.0);
        match params.validate() {
            Err(ParamsError::DefaultOutOfRange { name, value, .. }) => {
                assert_eq!(name, "spring_damping");
                assert_eq!(value, 4.0);
            }
            other => panic!("Expected DefaultOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_builder() {
        let params = SpringChainParams::new()
            .with_unify_spring_props(false)
            .with_preview_source(PreviewSource::Deform)
            .with_widgets(WidgetStyle::WireCube, WidgetStyle::WireSphere)
            .with_lock_preview(false)
            .with_collections(false);
        assert!(!params.unify_spring_props);
        assert_eq!(params.preview_source, PreviewSource::Deform);
        assert_eq!(params.control_widget, WidgetStyle::WireCube);
        assert!(!params.lock_preview);
        assert!(!params.collections);
        assert!(params.validate().is_ok());
    }
}
