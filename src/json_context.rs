//! `Context` implementation for `serde_json::Value`, so callers whose
//! data already arrives as JSON don't need to translate it into
//! [`crate::value::Value`] first.

use crate::context::{Context, Lambda, Resolution};
use crate::iter::Iter;
use serde_json::Value as Json;
use std::borrow::Cow;

impl Context for Json {
    fn get(&self, name: &str) -> Resolution<'_> {
        match self {
            Json::Object(map) => match map.get(name) {
                Some(v) => Resolution::Field(v),
                None => Resolution::NotFoundInContext,
            },
            Json::Array(items) if name == "len" => {
                Resolution::Owned(Box::new(Json::from(items.len() as u64)))
            }
            _ => Resolution::NotFoundInContext,
        }
    }

    fn iterator(&self) -> Iter<'_> {
        match self {
            Json::Array(items) => Iter::from_contexts(items.iter().map(|v| v as &dyn Context)),
            Json::Null => Iter::Empty,
            Json::Bool(b) => {
                if *b {
                    Iter::Single(self)
                } else {
                    Iter::Empty
                }
            }
            // Non-bool, non-null scalars (and objects) are a one-shot
            // truthy iterator regardless of value.
            _ => Iter::Single(self),
        }
    }

    fn is_truthy(&self) -> bool {
        match self {
            Json::Null => false,
            Json::Bool(b) => *b,
            Json::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
            Json::String(s) => !s.is_empty(),
            Json::Array(items) => !items.is_empty(),
            Json::Object(_) => true,
        }
    }

    fn as_scalar(&self) -> Option<Cow<'_, str>> {
        match self {
            Json::String(s) => Some(Cow::Borrowed(s.as_str())),
            Json::Bool(b) => Some(Cow::Owned(b.to_string())),
            Json::Number(n) => Some(Cow::Owned(n.to_string())),
            _ => None,
        }
    }

    fn as_lambda(&self) -> Option<&dyn Lambda> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextStack;
    use serde_json::json;

    #[test]
    fn resolves_nested_object_field() {
        let root = json!({"user": {"name": "ada"}});
        let stack = ContextStack::new(&root);
        match stack.resolve("user.name") {
            Resolution::Field(ctx) => assert_eq!(ctx.as_scalar().as_deref(), Some("ada")),
            _ => panic!("expected field"),
        }
    }

    #[test]
    fn zero_is_falsey() {
        assert!(!json!(0).is_truthy());
        assert!(json!(1).is_truthy());
    }

    #[test]
    fn empty_array_is_falsey() {
        assert!(!json!([]).is_truthy());
    }

    #[test]
    fn zero_is_a_truthy_section() {
        let root = json!(0);
        assert!(root.iterator().truthy());
    }

    #[test]
    fn array_len_resolves_to_a_number() {
        let root = json!({"list": [1, 2, 3, 4]});
        let stack = ContextStack::new(&root);
        match stack.resolve("list.len") {
            Resolution::Owned(ctx) => assert_eq!(ctx.as_scalar().as_deref(), Some("4")),
            _ => panic!("expected owned len resolution"),
        }
    }
}
