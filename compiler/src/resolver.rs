use std::collections::{HashMap, HashSet};

use crate::{
    ir::{FieldIr, Passing},
    types::TypeMappings,
};

/// Maps logical type names to Rust types and decides how each field crosses
/// a call site.
///
/// Every emitter that produces a call goes through [`param_type`],
/// [`call_arg`] or [`write_arg`], so a field is borrowed or moved the same
/// way everywhere.
#[derive(Debug, Clone, Default)]
pub struct TypeResolver {
    types:      HashMap<String, String>,
    primitives: HashSet<String>,
}

impl TypeResolver {
    pub fn new(mappings: &TypeMappings) -> Self {
        let mut types = HashMap::new();
        for mapping in &mappings.types {
            // Later entries win, matching a JSON object with repeated keys.
            types.insert(base_name(&mapping.name).to_string(), mapping.target_type.clone());
        }
        TypeResolver {
            types,
            primitives: mappings.primitives.iter().map(|name| base_name(name).to_string()).collect(),
        }
    }

    /// The Rust type for a base identifier. Unmapped names are assumed to be
    /// Rust types already.
    pub fn target_type<'a>(&'a self, base: &'a str) -> &'a str {
        self.types.get(base).map(String::as_str).unwrap_or(base)
    }

    pub fn is_primitive(&self, base: &str) -> bool {
        self.primitives.contains(base)
    }

    pub fn classify(&self, base: &str, pass_raw: bool) -> Passing {
        if self.is_primitive(base) || pass_raw {
            Passing::Value
        } else {
            Passing::Reference
        }
    }
}

/// Strips a trailing parameter list: `byte_array(len)` -> `byte_array`.
pub fn base_name(descriptor: &str) -> &str {
    descriptor.split('(').next().unwrap_or(descriptor).trim()
}

/// Borrowed view of an owned type: `String` -> `str`, `Vec<T>` -> `[T]`.
fn borrowed_view(target_type: &str) -> String {
    if target_type == "String" {
        return "str".to_string();
    }
    match target_type.strip_prefix("Vec<").and_then(|rest| rest.strip_suffix('>')) {
        Some(item) => format!("[{}]", item),
        None => target_type.to_string(),
    }
}

fn has_borrowed_view(target_type: &str) -> bool {
    borrowed_view(target_type) != target_type
}

/// Handler parameter type for a field.
pub fn param_type(field: &FieldIr) -> String {
    match (field.passing, field.is_conditional()) {
        (Passing::Value, false) => field.target_type.clone(),
        (Passing::Value, true) => format!("Option<{}>", field.target_type),
        (Passing::Reference, false) => format!("&{}", borrowed_view(&field.target_type)),
        (Passing::Reference, true) => format!("Option<&{}>", borrowed_view(&field.target_type)),
    }
}

/// Argument passed to a handler for an owned local binding of `field`.
pub fn call_arg(field: &FieldIr) -> String {
    match (field.passing, field.is_conditional()) {
        (Passing::Value, _) => field.ident.clone(),
        (Passing::Reference, false) => format!("&{}", field.ident),
        (Passing::Reference, true) if has_borrowed_view(&field.target_type) => {
            format!("{}.as_deref()", field.ident)
        }
        (Passing::Reference, true) => format!("{}.as_ref()", field.ident),
    }
}

/// Argument passed to a write op for `binding`, a reference to the value.
/// Primitives are copied out; everything else stays borrowed.
pub fn write_arg(field: &FieldIr, binding: &str) -> String {
    if field.primitive {
        format!("*{}", binding)
    } else {
        binding.to_string()
    }
}
