use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use bevy::prelude::*;

use crate::engine::binding::signal::PropertyKind;

/// Externally authored effect that consumes named properties and events.
///
/// Setters on names the instance does not expose, or exposes with another
/// type, are ignored.
pub trait EffectInstance {
    fn exposes(&self, name: &str, kind: PropertyKind) -> bool;
    fn set_texture(&mut self, name: &str, texture: Handle<Image>);
    fn set_float(&mut self, name: &str, value: f32);
    fn set_vec2(&mut self, name: &str, value: Vec2);
    fn set_vec4(&mut self, name: &str, value: Vec4);
    fn set_mat4(&mut self, name: &str, value: Mat4);
    fn send_event(&mut self, name: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Texture(Handle<Image>),
    Float(f32),
    Vec2(Vec2),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Texture(_) => PropertyKind::Texture,
            PropertyValue::Float(_) => PropertyKind::Float,
            PropertyValue::Vec2(_) => PropertyKind::Vec2,
            PropertyValue::Vec4(_) => PropertyKind::Vec4,
            PropertyValue::Mat4(_) => PropertyKind::Mat4,
        }
    }
}

/// Identity of an effect schema. Changes whenever a binding plan may be stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaKey {
    pub instance: u64,
    pub revision: u64,
}

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Effect instance living on an entity: a declared property schema plus
/// the most recent value written to each property.
#[derive(Component, Debug, Clone)]
pub struct VisualEffect {
    label: String,
    instance: u64,
    revision: u64,
    schema: HashMap<String, PropertyKind>,
    values: HashMap<String, PropertyValue>,
    events: Vec<String>,
}

impl VisualEffect {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            instance: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            revision: 0,
            schema: HashMap::new(),
            values: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, kind: PropertyKind) -> Self {
        self.declare(name, kind);
        self
    }

    /// Adds or retypes a property. Cached binding plans are invalidated.
    pub fn declare(&mut self, name: impl Into<String>, kind: PropertyKind) {
        let name = name.into();
        if self.schema.get(&name) != Some(&kind) {
            self.values.remove(&name);
            self.schema.insert(name, kind);
            self.revision += 1;
        }
    }

    pub fn remove_property(&mut self, name: &str) {
        if self.schema.remove(name).is_some() {
            self.values.remove(name);
            self.revision += 1;
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn schema_key(&self) -> SchemaKey {
        SchemaKey {
            instance: self.instance,
            revision: self.revision,
        }
    }

    pub fn value(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.values.get(name) {
            Some(PropertyValue::Float(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn texture(&self, name: &str) -> Option<&Handle<Image>> {
        match self.values.get(name) {
            Some(PropertyValue::Texture(handle)) => Some(handle),
            _ => None,
        }
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<String> {
        std::mem::take(&mut self.events)
    }

    fn write(&mut self, name: &str, value: PropertyValue) {
        if self.schema.get(name) == Some(&value.kind()) {
            self.values.insert(name.to_string(), value);
        }
    }
}

impl EffectInstance for VisualEffect {
    fn exposes(&self, name: &str, kind: PropertyKind) -> bool {
        self.schema.get(name) == Some(&kind)
    }

    fn set_texture(&mut self, name: &str, texture: Handle<Image>) {
        self.write(name, PropertyValue::Texture(texture));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.write(name, PropertyValue::Float(value));
    }

    fn set_vec2(&mut self, name: &str, value: Vec2) {
        self.write(name, PropertyValue::Vec2(value));
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.write(name, PropertyValue::Vec4(value));
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.write(name, PropertyValue::Mat4(value));
    }

    fn send_event(&mut self, name: &str) {
        self.events.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mistyped_writes_are_ignored() {
        let mut effect = VisualEffect::new("sparks").with_property("Intensity", PropertyKind::Float);
        effect.set_vec4("Intensity", Vec4::ONE);
        effect.set_float("Missing", 1.0);
        assert!(effect.value("Intensity").is_none());
        assert!(effect.value("Missing").is_none());

        effect.set_float("Intensity", 0.5);
        assert_eq!(effect.float("Intensity"), Some(0.5));
    }

    #[test]
    fn schema_changes_bump_the_revision() {
        let mut effect = VisualEffect::new("sparks").with_property("Depth", PropertyKind::Texture);
        let before = effect.schema_key();

        effect.declare("Depth", PropertyKind::Texture);
        assert_eq!(effect.schema_key(), before);

        effect.declare("Depth", PropertyKind::Float);
        assert_ne!(effect.schema_key(), before);
    }

    #[test]
    fn new_instances_never_share_a_key() {
        let a = VisualEffect::new("a");
        let b = VisualEffect::new("a");
        assert_ne!(a.schema_key(), b.schema_key());
    }
}
