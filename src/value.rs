//! `Value` — the crate's built-in, general-purpose `Context` backend.
//!
//! A tagged union over record/sequence/scalar/null/lambda, the same
//! shape as a JSON value with two extra variants for callables. Build
//! one by hand, or reach for [`crate::json_context`] when the data
//! already lives as `serde_json::Value`.

use crate::context::{Context, Lambda, Resolution};
use crate::error::LambdaError;
use crate::iter::Iter;
use std::borrow::Cow;
use std::collections::HashMap;

pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Array(Vec<Value>),
    Map(HashMap<String, Value>),
    /// Called fresh on every reference; never cached.
    Lambda(Box<dyn Fn(&str) -> Result<String, LambdaError> + Send + Sync>),
}

impl Value {
    pub fn lambda<F>(f: F) -> Value
    where
        F: Fn(&str) -> Result<String, LambdaError> + Send + Sync + 'static,
    {
        Value::Lambda(Box::new(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl Context for Value {
    fn get(&self, name: &str) -> Resolution<'_> {
        match self {
            Value::Map(fields) => match fields.get(name) {
                Some(v @ Value::Lambda(_)) => Resolution::Lambda(v),
                Some(v) => Resolution::Field(v),
                None => Resolution::NotFoundInContext,
            },
            Value::Array(items) if name == "len" => {
                Resolution::Owned(Box::new(Value::UInt(items.len() as u64)))
            }
            _ => Resolution::NotFoundInContext,
        }
    }

    fn iterator(&self) -> Iter<'_> {
        match self {
            Value::Array(items) => {
                Iter::from_contexts(items.iter().map(|v| v as &dyn Context))
            }
            Value::Null => Iter::Empty,
            Value::Bool(b) => {
                if *b {
                    Iter::Single(self)
                } else {
                    Iter::Empty
                }
            }
            // Non-bool, non-null scalars (and records, and lambdas) are
            // a one-shot truthy iterator regardless of value.
            _ => Iter::Single(self),
        }
    }

    fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::UInt(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Map(_) => true,
            Value::Lambda(_) => true,
        }
    }

    fn as_scalar(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Str(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            Value::Int(n) => Some(Cow::Owned(n.to_string())),
            Value::UInt(n) => Some(Cow::Owned(n.to_string())),
            Value::Float(n) => Some(Cow::Owned(format!("{n}"))),
            _ => None,
        }
    }

    fn as_lambda(&self) -> Option<&dyn Lambda> {
        match self {
            Value::Lambda(_) => Some(self),
            _ => None,
        }
    }
}

impl Lambda for Value {
    fn call(&self, inner_text: &str) -> Result<String, LambdaError> {
        match self {
            Value::Lambda(f) => f(inner_text),
            _ => Err(LambdaError::Failed("not a lambda".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_matches_mustache_falsey_rules() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(!Value::Array(vec![]).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Map(HashMap::new()).is_truthy());
    }

    #[test]
    fn array_iterates_each_element() {
        let v = Value::Array(vec![Value::Int(1), Value::Int(2)]);
        let mut it = v.iterator();
        assert!(it.truthy());
        assert!(it.advance().is_some());
        assert!(it.advance().is_some());
        assert!(it.advance().is_none());
    }

    #[test]
    fn empty_array_is_empty_iterator() {
        let v = Value::Array(vec![]);
        assert!(!v.iterator().truthy());
    }

    #[test]
    fn non_bool_scalars_are_unconditionally_truthy_as_sections() {
        assert!(Value::Int(0).iterator().truthy());
        assert!(Value::Str(String::new()).iterator().truthy());
        assert!(!Value::Bool(false).iterator().truthy());
        assert!(!Value::Null.iterator().truthy());
    }

    #[test]
    fn array_len_resolves_to_an_owned_number() {
        let v = Value::Array(vec![Value::Int(1), Value::Int(2)]);
        match v.get("len") {
            Resolution::Owned(ctx) => assert_eq!(ctx.as_scalar().as_deref(), Some("2")),
            _ => panic!("expected owned len resolution"),
        }
    }
}
