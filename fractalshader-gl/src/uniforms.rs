//! Uniform schema and per-frame uniform values.

use fractalshader_core::{Mat3, Vec2};
use std::collections::BTreeMap;
use std::fmt;

/// Declared GLSL type of a uniform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Float,
    Int,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl UniformKind {
    /// Number of scalar components a value of this kind carries.
    pub fn component_count(&self) -> usize {
        match self {
            UniformKind::Float | UniformKind::Int => 1,
            UniformKind::Vec2 => 2,
            UniformKind::Vec3 => 3,
            UniformKind::Vec4 | UniformKind::Mat2 => 4,
            UniformKind::Mat3 => 9,
            UniformKind::Mat4 => 16,
        }
    }
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let glsl = match self {
            UniformKind::Float => "float",
            UniformKind::Int => "int",
            UniformKind::Vec2 => "vec2",
            UniformKind::Vec3 => "vec3",
            UniformKind::Vec4 => "vec4",
            UniformKind::Mat2 => "mat2",
            UniformKind::Mat3 => "mat3",
            UniformKind::Mat4 => "mat4",
        };
        f.write_str(glsl)
    }
}

/// A value for one uniform. Matrices are flat column-major arrays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat2([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Mat2(_) => UniformKind::Mat2,
            UniformValue::Mat3(_) => UniformKind::Mat3,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        UniformValue::Int(value)
    }
}

impl From<Vec2> for UniformValue {
    fn from(value: Vec2) -> Self {
        UniformValue::Vec2(value.to_f32_array())
    }
}

impl From<Mat3> for UniformValue {
    fn from(value: Mat3) -> Self {
        UniformValue::Mat3(value.to_f32_array())
    }
}

impl From<&Mat3> for UniformValue {
    fn from(value: &Mat3) -> Self {
        UniformValue::Mat3(value.to_f32_array())
    }
}

/// Uniform names and declared kinds a program accepts.
///
/// Fixed once a program is created from it. Declaring the same name twice
/// keeps the last kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UniformSchema {
    entries: BTreeMap<String, UniformKind>,
}

impl UniformSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, kind: UniformKind) -> Self {
        self.entries.insert(name.into(), kind);
        self
    }

    pub fn get(&self, name: &str) -> Option<UniformKind> {
        self.entries.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, UniformKind)> {
        self.entries.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, UniformKind)> for UniformSchema {
    fn from_iter<I: IntoIterator<Item = (S, UniformKind)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(n, k)| (n.into(), k)).collect(),
        }
    }
}

/// A set of uniform values submitted together, keyed by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UniformValues {
    values: BTreeMap<String, UniformValue>,
}

impl UniformValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<UniformValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<UniformValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>, V: Into<UniformValue>> FromIterator<(S, V)> for UniformValues {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_counts_match_glsl_types() {
        let expected = [
            (UniformKind::Float, 1),
            (UniformKind::Int, 1),
            (UniformKind::Vec2, 2),
            (UniformKind::Vec3, 3),
            (UniformKind::Vec4, 4),
            (UniformKind::Mat2, 4),
            (UniformKind::Mat3, 9),
            (UniformKind::Mat4, 16),
        ];
        for (kind, count) in expected {
            assert_eq!(kind.component_count(), count, "{kind}");
        }
    }

    #[test]
    fn value_conversions_pick_the_matching_kind() {
        assert_eq!(UniformValue::from(2.0_f32).kind(), UniformKind::Float);
        assert_eq!(UniformValue::from(7_i32).kind(), UniformKind::Int);
        assert_eq!(
            UniformValue::from(Vec2::new(0.1, -0.2)),
            UniformValue::Vec2([0.1, -0.2])
        );
        assert_eq!(
            UniformValue::from(Mat3::translation(Vec2::new(3.0, 4.0))),
            UniformValue::Mat3([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 3.0, 4.0, 1.0])
        );
    }

    #[test]
    fn schema_redeclaration_keeps_last_kind() {
        let schema = UniformSchema::new()
            .with("uZoom", UniformKind::Int)
            .with("uZoom", UniformKind::Float);
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.get("uZoom"), Some(UniformKind::Float));
    }

    #[test]
    fn schema_from_iterator() {
        let schema: UniformSchema = [("uZoom", UniformKind::Float), ("uCenter", UniformKind::Vec2)]
            .into_iter()
            .collect();
        let names: Vec<&str> = schema.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["uCenter", "uZoom"]);
        assert_eq!(schema.get("uMissing"), None);
    }

    #[test]
    fn values_builder_and_set() {
        let mut values = UniformValues::new().with("uZoom", 2.0_f32);
        values.set("uIterations", 500);
        assert_eq!(values.len(), 2);
        assert_eq!(values.get("uIterations"), Some(&UniformValue::Int(500)));
        assert!(!values.is_empty());
    }
}
