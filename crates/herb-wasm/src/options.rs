//! JavaScript option sources
//!
//! The textual form of a key is a string property, the symbolic form a
//! property keyed by `Symbol.for(key)`. Only own properties of values whose
//! `typeof` is `"object"` are read. `undefined` and `null` count as absent;
//! anything else goes through JavaScript truthiness.

use herb_ffi::{KeyForm, OptionSource};
use js_sys::{Object, Reflect, Symbol};
use wasm_bindgen::{JsCast, JsValue};

pub struct JsOptions<'a> {
    object: Option<&'a Object>,
}

impl<'a> JsOptions<'a> {
    /// Wrap an options argument; values that are not objects are ignored
    pub fn new(value: &'a JsValue) -> Self {
        Self {
            object: value.is_object().then(|| value.unchecked_ref::<Object>()),
        }
    }
}

impl OptionSource for JsOptions<'_> {
    fn lookup(&self, key: &str, form: KeyForm) -> Option<bool> {
        let object = self.object?;
        let property: JsValue = match form {
            KeyForm::Textual => JsValue::from_str(key),
            KeyForm::Symbolic => Symbol::for_(key).into(),
        };

        if !object.has_own_property(&property) {
            return None;
        }
        let value = Reflect::get(object, &property).ok()?;
        if value.is_undefined() || value.is_null() {
            return None;
        }
        Some(value.is_truthy())
    }
}
