//! Animatable parameters and their export records.
//!
//! A parameter holds one of: a static value, per-component time samples, or
//! a connect reference to another parameter. Each scalar component owns its
//! own [`KeyframeStore`]; components do not need synchronized key times.
//! A connect reference overrides animation during evaluation but does not
//! erase the samples.

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use primgraph_animation_core::KeyframeStore;
use primgraph_api_core::{Scalar, Value};

#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    name: String,
    parameter_type: String,
    built_in: bool,
    custom: bool,
    visible: bool,
    default: Value,
    value: Value,
    connect: Option<String>,
    stores: Vec<KeyframeStore>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, parameter_type: impl Into<String>, default: Value) -> Self {
        let value = default.clone();
        Parameter {
            name: name.into(),
            parameter_type: parameter_type.into(),
            built_in: false,
            custom: false,
            visible: true,
            default,
            value,
            connect: None,
            stores: Vec::new(),
        }
    }

    pub fn with_built_in(mut self) -> Self {
        self.built_in = true;
        self
    }

    pub fn with_custom(mut self) -> Self {
        self.custom = true;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter_type(&self) -> &str {
        &self.parameter_type
    }

    pub fn is_built_in(&self) -> bool {
        self.built_in
    }

    pub fn is_custom(&self) -> bool {
        self.custom
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// The static stored value (ignores samples and connect).
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    pub fn connect(&self) -> Option<&str> {
        self.connect.as_deref()
    }

    pub fn has_connect(&self) -> bool {
        self.connect.is_some()
    }

    pub fn set_connect(&mut self, target: impl Into<String>) {
        self.connect = Some(target.into());
    }

    pub fn break_connect(&mut self) -> Option<String> {
        self.connect.take()
    }

    /// Per-component keyframe stores, one per scalar component.
    pub fn stores(&self) -> &[KeyframeStore] {
        &self.stores
    }

    pub fn has_keys(&self) -> bool {
        self.stores.iter().any(|s| s.has_keys())
    }

    fn ensure_store(&mut self, component: usize) -> &mut KeyframeStore {
        if self.stores.len() <= component {
            self.stores.resize_with(component + 1, KeyframeStore::new);
        }
        &mut self.stores[component]
    }

    pub fn set_key(&mut self, component: usize, time: f32, value: Scalar) {
        self.ensure_store(component).set_key(time, value);
    }

    pub fn remove_key(&mut self, component: usize, time: f32) -> Option<Scalar> {
        self.stores.get_mut(component)?.remove_key(time)
    }

    pub fn clear_keys(&mut self) {
        for store in &mut self.stores {
            store.clear_keys();
        }
    }

    /// Write `value` at `time`: keyed parameters get a key per component,
    /// static parameters just take the new value.
    pub fn set_value_at(&mut self, value: Value, time: f32) {
        if self.has_keys() {
            for (i, component) in value.components().iter().enumerate() {
                self.set_key(i, time, component.clone());
            }
        } else {
            self.set_value(value);
        }
    }

    fn component_count(&self) -> usize {
        self.value.component_count().max(self.stores.len())
    }

    fn component_at(&self, index: usize, time: f32) -> Option<Scalar> {
        if let Some(sampled) = self.stores.get(index).and_then(|s| s.value_at(time)) {
            return Some(sampled);
        }
        self.value.component(index).cloned()
    }

    /// Resolve the animated value at `time`, assembling each component from
    /// its own store and falling back to the static component where a store
    /// is empty. Connect references are the graph's concern, not handled
    /// here.
    pub fn value_at(&self, time: f32) -> Value {
        if !self.has_keys() {
            return self.value.clone();
        }
        let components: Vec<Scalar> = (0..self.component_count())
            .filter_map(|i| self.component_at(i, time))
            .collect();
        Value::from_components(components)
    }

    /// Merged time→value view over all component stores: the union of every
    /// component's key times, each time resolved like [`value_at`].
    /// `None` when no component has keys.
    ///
    /// [`value_at`]: Parameter::value_at
    pub fn time_samples(&self) -> Option<Vec<(f32, Value)>> {
        if !self.has_keys() {
            return None;
        }
        let mut times: Vec<f32> = self.stores.iter().flat_map(|s| s.times()).collect();
        times.sort_by(f32::total_cmp);
        times.dedup_by(|a, b| a.total_cmp(b).is_eq());
        Some(
            times
                .into_iter()
                .map(|t| (t, self.value_at(t)))
                .collect(),
        )
    }

    /// Export record per the serialization rule: emitted only when the
    /// parameter has samples, a connect, is custom, or its static value
    /// differs from its declared default.
    pub fn record(&self) -> Option<ParamRecord> {
        let time_samples = self.time_samples();
        let worth_recording = time_samples.is_some()
            || self.connect.is_some()
            || self.custom
            || self.value != self.default;
        if !worth_recording {
            return None;
        }
        let value = if time_samples.is_some() {
            Value::Null
        } else {
            self.value.clone()
        };
        Some(ParamRecord {
            parameter_type: self.parameter_type.clone(),
            built_in: self.built_in.then_some(true),
            visible: (!self.visible).then_some(false),
            connect: self.connect.clone(),
            time_samples: time_samples.map(samples_to_json),
            value,
        })
    }
}

/// Serialized form of one parameter, field presence per the export
/// contract: type tag always, `builtIn` only if true, `visible` only if
/// false, `connect`/`timeSamples` only if set, `value` always (null when
/// samples are authoritative).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParamRecord {
    pub parameter_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub built_in: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_samples: Option<JsonMap<String, JsonValue>>,
    pub value: Value,
}

fn samples_to_json(samples: Vec<(f32, Value)>) -> JsonMap<String, JsonValue> {
    let mut map = JsonMap::new();
    for (time, value) in samples {
        map.insert(
            format_time(time),
            serde_json::to_value(value).unwrap_or(JsonValue::Null),
        );
    }
    map
}

/// Whole times render without a fraction so keys stay stable across
/// round-trips ("5", not "5.0").
fn format_time(time: f32) -> String {
    if time.fract() == 0.0 && time.is_finite() {
        format!("{}", time as i64)
    } else {
        time.to_string()
    }
}
