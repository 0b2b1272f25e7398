//! The partials lookup the engine consults for `{{>name}}` tags.

use crate::element::Element;
use std::collections::HashMap;

pub trait Partials {
    fn get(&self, name: &str) -> Option<&[Element]>;

    /// Lets the engine skip indentation bookkeeping entirely when no
    /// partial could ever be found.
    fn is_empty(&self) -> bool {
        false
    }
}

/// No partials available; `{{>name}}` always renders nothing.
impl Partials for () {
    fn get(&self, _name: &str) -> Option<&[Element]> {
        None
    }

    fn is_empty(&self) -> bool {
        true
    }
}

/// A fixed, compile-time-known set of name/body pairs.
impl<'a> Partials for &'a [(&'a str, &'a [Element])] {
    fn get(&self, name: &str) -> Option<&[Element]> {
        self.iter().find(|(n, _)| *n == name).map(|(_, body)| *body)
    }

    fn is_empty(&self) -> bool {
        <[_]>::is_empty(self)
    }
}

/// A dynamic, runtime-populated set — e.g. partials loaded from a
/// directory of template files.
impl Partials for HashMap<String, Vec<Element>> {
    fn get(&self, name: &str) -> Option<&[Element]> {
        HashMap::get(self, name).map(|v| v.as_slice())
    }

    fn is_empty(&self) -> bool {
        HashMap::is_empty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_partials_never_found() {
        let p = ();
        assert!(p.is_empty());
        assert!(p.get("anything").is_none());
    }

    #[test]
    fn hashmap_partials_found_by_name() {
        let mut map = HashMap::new();
        map.insert("greeting".to_string(), vec![Element::Text("hi".into())]);
        assert!(!map.is_empty());
        assert!(map.get("greeting").is_some());
        assert!(map.get("missing").is_none());
    }
}
