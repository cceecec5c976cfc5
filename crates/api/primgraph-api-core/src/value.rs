//! Scalar components and parameter-level values.
//!
//! A `Scalar` is one animatable component (the thing a keyframe store holds);
//! a `Value` is what a parameter exposes: nothing, one scalar, or a tuple of
//! scalars for vector-like types. Both serialize untagged so the JSON form is
//! the raw literal (`1.5`, `"token"`, `[0.0, 1.0, 0.0]`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse kind of a scalar, for quick dispatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    Text,
}

/// One animatable component.
///
/// Variant order matters for untagged deserialization: booleans before
/// integers before floats, so `true` and `1` round-trip as themselves.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i32),
    Float(f32),
    Text(String),
}

impl Scalar {
    #[inline]
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::Text(_) => ScalarKind::Text,
        }
    }

    /// Whether linear interpolation applies to this scalar.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Scalar::Int(_) | Scalar::Float(_))
    }

    #[inline]
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Scalar::Float(v) => Some(*v),
            Scalar::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    /// Linear interpolation between two scalars at parameter `t` in [0, 1].
    ///
    /// Two ints stay int (rounded to nearest); any other numeric pairing
    /// yields a float. A non-numeric operand holds `a` (step), so callers
    /// that downgraded to step mode get consistent behavior even if they
    /// reach this path.
    pub fn lerp(a: &Scalar, b: &Scalar, t: f32) -> Scalar {
        match (a.as_f32(), b.as_f32()) {
            (Some(fa), Some(fb)) => {
                let v = fa + (fb - fa) * t;
                if let (Scalar::Int(_), Scalar::Int(_)) = (a, b) {
                    Scalar::Int(v.round() as i32)
                } else {
                    Scalar::Float(v)
                }
            }
            _ => a.clone(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Text(v) => write!(f, "{v}"),
        }
    }
}

/// A parameter-level value.
///
/// `Null` is the authored "no value" used when time samples are
/// authoritative in export records.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Scalar(Scalar),
    Tuple(Vec<Scalar>),
}

impl Value {
    /// Convenience constructors.
    pub fn f(v: f32) -> Self {
        Value::Scalar(Scalar::Float(v))
    }

    pub fn int(v: i32) -> Self {
        Value::Scalar(Scalar::Int(v))
    }

    pub fn boolean(v: bool) -> Self {
        Value::Scalar(Scalar::Bool(v))
    }

    pub fn text(v: impl Into<String>) -> Self {
        Value::Scalar(Scalar::Text(v.into()))
    }

    pub fn float2(x: f32, y: f32) -> Self {
        Value::Tuple(vec![Scalar::Float(x), Scalar::Float(y)])
    }

    pub fn float3(x: f32, y: f32, z: f32) -> Self {
        Value::Tuple(vec![Scalar::Float(x), Scalar::Float(y), Scalar::Float(z)])
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Components of this value, in declaration order.
    pub fn components(&self) -> &[Scalar] {
        match self {
            Value::Null => &[],
            Value::Scalar(s) => std::slice::from_ref(s),
            Value::Tuple(v) => v,
        }
    }

    #[inline]
    pub fn component_count(&self) -> usize {
        self.components().len()
    }

    pub fn component(&self, index: usize) -> Option<&Scalar> {
        self.components().get(index)
    }

    /// Rebuild a value from per-component scalars. Zero components is Null,
    /// one collapses to a scalar, more stays a tuple.
    pub fn from_components(components: Vec<Scalar>) -> Self {
        match components.len() {
            0 => Value::Null,
            1 => Value::Scalar(components.into_iter().next().unwrap_or(Scalar::Float(0.0))),
            _ => Value::Tuple(components),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Scalar(s) => write!(f, "{s}"),
            Value::Tuple(v) => {
                write!(f, "(")?;
                for (i, s) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{s}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_numeric() {
        let a = Scalar::Float(0.0);
        let b = Scalar::Float(10.0);
        assert_eq!(Scalar::lerp(&a, &b, 0.5), Scalar::Float(5.0));
    }

    #[test]
    fn lerp_int_rounds() {
        let a = Scalar::Int(0);
        let b = Scalar::Int(3);
        assert_eq!(Scalar::lerp(&a, &b, 0.5), Scalar::Int(2));
    }

    #[test]
    fn lerp_text_holds() {
        let a = Scalar::Text("a".into());
        let b = Scalar::Text("b".into());
        assert_eq!(Scalar::lerp(&a, &b, 0.5), a);
    }

    #[test]
    fn untagged_json_roundtrip() {
        let v = Value::float3(1.0, 2.0, 3.0);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0]");
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back.component_count(), 3);

        let s = serde_json::to_string(&Value::text("token")).unwrap();
        assert_eq!(s, "\"token\"");
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
    }

    #[test]
    fn bool_and_int_deserialize_as_themselves() {
        let b: Scalar = serde_json::from_str("true").unwrap();
        assert_eq!(b, Scalar::Bool(true));
        let i: Scalar = serde_json::from_str("7").unwrap();
        assert_eq!(i, Scalar::Int(7));
    }

    #[test]
    fn from_components_collapses() {
        assert_eq!(Value::from_components(vec![]), Value::Null);
        assert_eq!(
            Value::from_components(vec![Scalar::Float(1.0)]),
            Value::f(1.0)
        );
        assert_eq!(
            Value::from_components(vec![Scalar::Float(1.0); 3]).component_count(),
            3
        );
    }
}
