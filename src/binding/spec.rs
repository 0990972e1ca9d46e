use anyhow::bail;
use serde::de::DeserializeOwned;
use serde_json::{Number, Value};

/// The distinguished path-parameter source. Never looked up in the named
/// decoder map; always bound first.
pub const PATH_SOURCE: &str = "path";

/// A type whose fields declare where they are decoded from. Implemented via
/// `#[derive(Bindable)]`; the descriptor set is computed once per type at
/// compile time.
pub trait Bindable: DeserializeOwned {
    fn binding_spec() -> &'static BindingSpec;
}

/// The per-type descriptor set: every field's binding, the deduplicated set
/// of non-path source tags that appear on at least one field, and whether
/// any field binds a path parameter.
#[derive(Debug)]
pub struct BindingSpec {
    pub type_name: &'static str,
    pub fields: &'static [FieldBinding],
    pub sources: &'static [&'static str],
    pub has_path: bool,
}

impl BindingSpec {
    /// Fields bound to the given source tag, in declaration order.
    pub fn fields_for<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a FieldBinding> {
        self.fields.iter().filter(move |f| f.source == tag)
    }

    pub fn path_fields(&self) -> impl Iterator<Item = &FieldBinding> {
        self.fields.iter().filter(|f| f.source == PATH_SOURCE)
    }
}

/// One field's binding: the struct field name, the lookup key in the source
/// (renamed or the field name), the source tag, and the coercion kind
/// derived from the declared type.
#[derive(Debug)]
pub struct FieldBinding {
    pub field: &'static str,
    pub key: &'static str,
    pub source: &'static str,
    pub kind: FieldKind,
}

/// How a raw string value from a path/query/header/cookie source is turned
/// into a JSON value before deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    /// Parsed as JSON when possible, kept as a string otherwise.
    Any,
}

impl FieldKind {
    pub fn coerce(&self, raw: &str) -> anyhow::Result<Value> {
        match self {
            FieldKind::String => Ok(Value::String(raw.to_string())),
            FieldKind::Integer => {
                if let Ok(v) = raw.parse::<i64>() {
                    Ok(Value::from(v))
                } else if let Ok(v) = raw.parse::<u64>() {
                    Ok(Value::from(v))
                } else {
                    bail!("`{raw}` is not a valid integer")
                }
            }
            FieldKind::Number => {
                let parsed = raw.parse::<f64>();
                match parsed.ok().and_then(Number::from_f64) {
                    Some(n) => Ok(Value::Number(n)),
                    None => bail!("`{raw}` is not a valid number"),
                }
            }
            FieldKind::Boolean => match raw.parse::<bool>() {
                Ok(v) => Ok(Value::Bool(v)),
                Err(_) => bail!("`{raw}` is not a valid boolean"),
            },
            FieldKind::Any => {
                Ok(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
            }
        }
    }
}
