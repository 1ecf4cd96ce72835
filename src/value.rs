use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

use indexmap::IndexMap;

/// The kind of a [`Value`], used for operator dispatch and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Uint,
    Float32,
    Float64,
    /// Lazily typed JSON number, normalized before comparison.
    Number,
    String,
    Bytes,
    /// Variable-size sequence.
    Sequence,
    /// Fixed-size array.
    Array,
    Mapping,
    Record,
    Opaque,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Bytes => "bytes",
            Kind::Sequence => "sequence",
            Kind::Array => "array",
            Kind::Mapping => "mapping",
            Kind::Record => "record",
            Kind::Opaque => "opaque",
        }
    }

    /// Kinds a literal can be coerced into and compared against.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            Kind::Bool | Kind::Int | Kind::Uint | Kind::Float32 | Kind::Float64 | Kind::String
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A datum that expressions are evaluated against.
///
/// This is a closed set of the value shapes the evaluator understands. Rust
/// data is turned into a `Value` through [`Reflect`], through
/// `From<serde_json::Value>`, or through [`Value::from_serialize`].
///
/// # Examples
///
/// ```
/// use bexpr::{Mapping, Value};
///
/// let mut tags = Mapping::new();
/// tags.insert("env", Value::from("prod"));
///
/// let mut root = Mapping::new();
/// root.insert("Tags", Value::Mapping(tags));
/// root.insert("Age", Value::Int(30));
///
/// let datum = Value::Mapping(root);
/// assert_eq!(datum.len(), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value (nil pointer, JSON null)
    Null,

    Bool(bool),

    /// Signed integer of any width
    Int(i64),

    /// Unsigned integer of any width
    Uint(u64),

    Float32(f32),

    Float64(f64),

    /// JSON number whose concrete type is decided at match time
    Number(serde_json::Number),

    /// UTF-8 string
    String(String),

    /// Raw bytes
    Bytes(Vec<u8>),

    /// Sequence or fixed-size array
    Sequence(Sequence),

    /// Keyed collection
    Mapping(Mapping),

    /// Struct-like value with named, optionally tagged fields
    Record(Record),

    /// Anything else; only the type name is kept
    Opaque(String),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Uint(_) => Kind::Uint,
            Value::Float32(_) => Kind::Float32,
            Value::Float64(_) => Kind::Float64,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Bytes(_) => Kind::Bytes,
            Value::Sequence(seq) if seq.is_fixed() => Kind::Array,
            Value::Sequence(_) => Kind::Sequence,
            Value::Mapping(_) => Kind::Mapping,
            Value::Record(_) => Kind::Record,
            Value::Opaque(_) => Kind::Opaque,
        }
    }

    /// Length of a string, byte string, sequence or mapping.
    ///
    /// Returns `None` for kinds that have no notion of emptiness.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.len()),
            Value::Bytes(b) => Some(b.len()),
            Value::Sequence(seq) => Some(seq.len()),
            Value::Mapping(map) => Some(map.len()),
            _ => None,
        }
    }

    /// The bytes of a string or byte string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(s) => Some(s.as_bytes()),
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Builds a value from anything serde can serialize.
    ///
    /// Structs become string-keyed mappings, sequences become heterogeneous
    /// sequences and numbers stay lazily typed.
    pub fn from_serialize<T: serde::Serialize + ?Sized>(
        value: &T,
    ) -> Result<Value, serde_json::Error> {
        serde_json::to_value(value).map(Value::from)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => Value::Sequence(Sequence::heterogeneous(
                arr.into_iter().map(Value::from).collect(),
            )),
            serde_json::Value::Object(obj) => Value::Mapping(
                obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
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

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Uint(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float64(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Sequence> for Value {
    fn from(seq: Sequence) -> Self {
        Value::Sequence(seq)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Mapping(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

/// An ordered list of values.
///
/// The element kind records what the source collection statically holds:
/// `Some(kind)` for a homogeneous collection such as `Vec<i64>`, `None` for a
/// heterogeneous one such as a JSON array.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    elem: Option<Kind>,
    fixed: bool,
    items: Vec<Value>,
}

impl Sequence {
    pub fn new(elem: Option<Kind>) -> Self {
        Sequence {
            elem,
            fixed: false,
            items: Vec::new(),
        }
    }

    pub fn heterogeneous(items: Vec<Value>) -> Self {
        Sequence {
            elem: None,
            fixed: false,
            items,
        }
    }

    pub fn typed(elem: Kind, items: Vec<Value>) -> Self {
        Sequence {
            elem: Some(elem),
            fixed: false,
            items,
        }
    }

    /// Marks the sequence as a fixed-size array.
    pub fn into_fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn element_kind(&self) -> Option<Kind> {
        self.elem
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn push(&mut self, value: Value) {
        self.items.push(value);
    }
}

/// An insertion-ordered keyed collection.
///
/// Keys are stored in their textual form. The key kind remembers what the
/// source map was keyed by; membership tests and quantifiers only accept
/// string-keyed mappings.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    key_kind: Kind,
    entries: IndexMap<String, Value>,
}

impl Default for Mapping {
    fn default() -> Self {
        Mapping::new()
    }
}

impl Mapping {
    pub fn new() -> Self {
        Mapping::with_key_kind(Kind::String)
    }

    pub fn with_key_kind(key_kind: Kind) -> Self {
        Mapping {
            key_kind,
            entries: IndexMap::new(),
        }
    }

    pub fn key_kind(&self) -> Kind {
        self.key_kind
    }

    pub fn has_string_keys(&self) -> bool {
        self.key_kind == Kind::String
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }
}

impl FromIterator<(String, Value)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Mapping {
            key_kind: Kind::String,
            entries: iter.into_iter().collect(),
        }
    }
}

/// A named field of a [`Record`].
///
/// Tags mirror struct-field annotations: each tag name (for example
/// `"bexpr"` or `"json"`) maps to a tag value whose text before the first
/// `,` renames the field for that tag. A tag value of `-` hides the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    tags: Vec<(String, String)>,
    value: Value,
}

impl Field {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Field {
            name: name.into(),
            tags: Vec::new(),
            value,
        }
    }

    pub fn tag(mut self, tag_name: impl Into<String>, tag_value: impl Into<String>) -> Self {
        self.tags.push((tag_name.into(), tag_value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn tag_value(&self, tag_name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(name, _)| name == tag_name)
            .map(|(_, value)| value.as_str())
    }

    /// The name this field is addressed by under `tag_name`, or `None` when
    /// the tag hides it.
    pub fn visible_name(&self, tag_name: &str) -> Option<&str> {
        match self.tag_value(tag_name) {
            Some("-") => None,
            Some(tag) => match tag.split(',').next() {
                Some(alias) if !alias.is_empty() => Some(alias),
                _ => Some(&self.name),
            },
            None => Some(&self.name),
        }
    }
}

/// A struct-like value.
///
/// # Examples
///
/// ```
/// use bexpr::{Record, Value};
///
/// let user = Record::new("User")
///     .field("Name", Value::from("Alice"))
///     .tagged_field("EmailAddress", "bexpr", "email", Value::from("a@example.com"));
///
/// assert!(user.lookup("email", "bexpr").is_some());
/// assert!(user.lookup("EmailAddress", "bexpr").is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    name: String,
    fields: Vec<Field>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Record {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(self, name: impl Into<String>, value: Value) -> Self {
        self.with_field(Field::new(name, value))
    }

    pub fn tagged_field(
        self,
        name: impl Into<String>,
        tag_name: impl Into<String>,
        tag_value: impl Into<String>,
        value: Value,
    ) -> Self {
        self.with_field(Field::new(name, value).tag(tag_name, tag_value))
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Finds the field addressed by `segment` under `tag_name`.
    pub fn lookup(&self, segment: &str, tag_name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|field| field.visible_name(tag_name) == Some(segment))
            .map(Field::value)
    }
}

/// Conversion of Rust data into a [`Value`].
///
/// `static_kind` reports the kind every value of the implementing type
/// reflects to, if there is one. Collections use it to tell typed sequences
/// (`Vec<i64>`) from heterogeneous ones (`Vec<serde_json::Value>`).
pub trait Reflect {
    fn reflect(&self) -> Value;

    fn static_kind() -> Option<Kind> {
        None
    }
}

macro_rules! reflect_scalar {
    ($variant:ident, $kind:ident, $as:ty => $($t:ty),+) => {
        $(
            impl Reflect for $t {
                fn reflect(&self) -> Value {
                    Value::$variant(*self as $as)
                }

                fn static_kind() -> Option<Kind> {
                    Some(Kind::$kind)
                }
            }
        )+
    };
}

reflect_scalar!(Int, Int, i64 => i8, i16, i32, i64, isize);
reflect_scalar!(Uint, Uint, u64 => u8, u16, u32, u64, usize);
reflect_scalar!(Float32, Float32, f32 => f32);
reflect_scalar!(Float64, Float64, f64 => f64);

impl Reflect for bool {
    fn reflect(&self) -> Value {
        Value::Bool(*self)
    }

    fn static_kind() -> Option<Kind> {
        Some(Kind::Bool)
    }
}

impl Reflect for str {
    fn reflect(&self) -> Value {
        Value::String(self.to_string())
    }

    fn static_kind() -> Option<Kind> {
        Some(Kind::String)
    }
}

impl Reflect for String {
    fn reflect(&self) -> Value {
        Value::String(self.clone())
    }

    fn static_kind() -> Option<Kind> {
        Some(Kind::String)
    }
}

impl<T: Reflect + ?Sized> Reflect for &T {
    fn reflect(&self) -> Value {
        (**self).reflect()
    }

    fn static_kind() -> Option<Kind> {
        T::static_kind()
    }
}

impl<T: Reflect + ?Sized> Reflect for Box<T> {
    fn reflect(&self) -> Value {
        (**self).reflect()
    }

    fn static_kind() -> Option<Kind> {
        T::static_kind()
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn reflect(&self) -> Value {
        match self {
            Some(v) => v.reflect(),
            None => Value::Null,
        }
    }

    fn static_kind() -> Option<Kind> {
        T::static_kind()
    }
}

impl<T: Reflect> Reflect for [T] {
    fn reflect(&self) -> Value {
        Value::Sequence(Sequence {
            elem: T::static_kind(),
            fixed: false,
            items: self.iter().map(Reflect::reflect).collect(),
        })
    }

    fn static_kind() -> Option<Kind> {
        Some(Kind::Sequence)
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn reflect(&self) -> Value {
        self.as_slice().reflect()
    }

    fn static_kind() -> Option<Kind> {
        Some(Kind::Sequence)
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn reflect(&self) -> Value {
        match self.as_slice().reflect() {
            Value::Sequence(seq) => Value::Sequence(seq.into_fixed()),
            other => other,
        }
    }

    fn static_kind() -> Option<Kind> {
        Some(Kind::Array)
    }
}

/// Keys of reflected maps.
pub trait MapKey {
    const KIND: Kind;

    fn key_string(&self) -> String;
}

impl MapKey for String {
    const KIND: Kind = Kind::String;

    fn key_string(&self) -> String {
        self.clone()
    }
}

impl MapKey for &str {
    const KIND: Kind = Kind::String;

    fn key_string(&self) -> String {
        self.to_string()
    }
}

impl MapKey for bool {
    const KIND: Kind = Kind::Bool;

    fn key_string(&self) -> String {
        self.to_string()
    }
}

macro_rules! map_key_int {
    ($kind:ident => $($t:ty),+) => {
        $(
            impl MapKey for $t {
                const KIND: Kind = Kind::$kind;

                fn key_string(&self) -> String {
                    self.to_string()
                }
            }
        )+
    };
}

map_key_int!(Int => i8, i16, i32, i64, isize);
map_key_int!(Uint => u8, u16, u32, u64, usize);

fn reflect_entries<'a, K, V>(entries: impl Iterator<Item = (&'a K, &'a V)>) -> Value
where
    K: MapKey + 'a,
    V: Reflect + 'a,
{
    let mut map = Mapping::with_key_kind(K::KIND);
    for (k, v) in entries {
        map.insert(k.key_string(), v.reflect());
    }
    Value::Mapping(map)
}

impl<K: MapKey, V: Reflect, S: BuildHasher> Reflect for HashMap<K, V, S> {
    fn reflect(&self) -> Value {
        reflect_entries(self.iter())
    }

    fn static_kind() -> Option<Kind> {
        Some(Kind::Mapping)
    }
}

impl<K: MapKey, V: Reflect> Reflect for BTreeMap<K, V> {
    fn reflect(&self) -> Value {
        reflect_entries(self.iter())
    }

    fn static_kind() -> Option<Kind> {
        Some(Kind::Mapping)
    }
}

impl<K: MapKey, V: Reflect, S: BuildHasher> Reflect for IndexMap<K, V, S> {
    fn reflect(&self) -> Value {
        reflect_entries(self.iter())
    }

    fn static_kind() -> Option<Kind> {
        Some(Kind::Mapping)
    }
}

impl Reflect for serde_json::Value {
    fn reflect(&self) -> Value {
        Value::from(self.clone())
    }
}

impl Reflect for Value {
    fn reflect(&self) -> Value {
        self.clone()
    }
}

impl Reflect for Record {
    fn reflect(&self) -> Value {
        Value::Record(self.clone())
    }

    fn static_kind() -> Option<Kind> {
        Some(Kind::Record)
    }
}

impl Reflect for Mapping {
    fn reflect(&self) -> Value {
        Value::Mapping(self.clone())
    }

    fn static_kind() -> Option<Kind> {
        Some(Kind::Mapping)
    }
}
