//! Change-tracked records and their declared attribute schema.
//!
//! An [`Entity`] holds dynamic values keyed by attribute name. Every write goes
//! through [`Entity::set`], which keeps the dirty list: declared attributes
//! changed since creation (or the last [`Entity::clear_dirty`]), each listed
//! once, in first-change order. The dirty list is what the DAO turns into
//! column lists.

use crate::error::ConfigError;
use crate::sql::{is_identifier, is_param_name, ParamType};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Declared attribute type. Serialized with its one-letter code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    #[serde(rename = "i", alias = "integer")]
    Integer,
    #[serde(rename = "s", alias = "string")]
    String,
    #[serde(rename = "b", alias = "blob")]
    Blob,
    #[serde(rename = "d", alias = "decimal")]
    Decimal,
}

impl AttributeType {
    pub fn code(self) -> char {
        match self {
            AttributeType::Integer => 'i',
            AttributeType::String => 's',
            AttributeType::Blob => 'b',
            AttributeType::Decimal => 'd',
        }
    }

    /// Only integers bind as integers; strings, blobs and decimals bind as text.
    pub fn param_type(self) -> ParamType {
        match self {
            AttributeType::Integer => ParamType::Int,
            AttributeType::String | AttributeType::Blob | AttributeType::Decimal => ParamType::Str,
        }
    }
}

impl FromStr for AttributeType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "i" | "integer" => Ok(AttributeType::Integer),
            "s" | "string" => Ok(AttributeType::String),
            "b" | "blob" => Ok(AttributeType::Blob),
            "d" | "decimal" => Ok(AttributeType::Decimal),
            _ => Err(ConfigError::UnknownAttributeType(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub ty: AttributeType,
    /// Column the attribute maps to; defaults to the attribute name.
    pub column: String,
}

/// Attribute layout shared by every entity of one type. Immutable once built.
#[derive(Debug)]
pub struct EntitySchema {
    name: String,
    attributes: Vec<Attribute>,
    by_name: HashMap<String, usize>,
    by_column: HashMap<String, usize>,
    primary_key: String,
}

impl EntitySchema {
    pub fn builder(name: impl Into<String>) -> EntitySchemaBuilder {
        EntitySchemaBuilder {
            name: name.into(),
            attributes: Vec::new(),
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.by_name.get(name).map(|&i| &self.attributes[i])
    }

    pub fn attribute_for_column(&self, column: &str) -> Option<&Attribute> {
        self.by_column.get(column).map(|&i| &self.attributes[i])
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Declared type, or `None` for names outside the schema.
    pub fn attr_type(&self, name: &str) -> Option<AttributeType> {
        self.attribute(name).map(|a| a.ty)
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn primary_key_attribute(&self) -> &Attribute {
        // build() guarantees the key is declared
        &self.attributes[self.by_name[&self.primary_key]]
    }
}

pub struct EntitySchemaBuilder {
    name: String,
    attributes: Vec<Attribute>,
    primary_key: String,
}

impl EntitySchemaBuilder {
    /// Declares an attribute stored in the column of the same name.
    pub fn attribute(self, name: impl Into<String>, ty: AttributeType) -> Self {
        let name = name.into();
        let column = name.clone();
        self.column(name, ty, column)
    }

    /// Declares an attribute stored under a different column name.
    pub fn column(mut self, name: impl Into<String>, ty: AttributeType, column: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            ty,
            column: column.into(),
        });
        self
    }

    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_key = name.into();
        self
    }

    pub fn build(self) -> Result<Arc<EntitySchema>, ConfigError> {
        let mut by_name = HashMap::new();
        let mut by_column = HashMap::new();
        for (i, attr) in self.attributes.iter().enumerate() {
            if !is_param_name(&attr.name) {
                return Err(ConfigError::InvalidIdentifier {
                    kind: "attribute",
                    name: attr.name.clone(),
                });
            }
            if !is_identifier(&attr.column) {
                return Err(ConfigError::InvalidIdentifier {
                    kind: "column",
                    name: attr.column.clone(),
                });
            }
            if by_name.insert(attr.name.clone(), i).is_some() || by_column.insert(attr.column.clone(), i).is_some() {
                return Err(ConfigError::DuplicateAttribute {
                    entity: self.name.clone(),
                    attribute: attr.name.clone(),
                });
            }
        }
        if !by_name.contains_key(&self.primary_key) {
            return Err(ConfigError::InvalidPrimaryKey {
                entity: self.name,
                key: self.primary_key,
            });
        }
        Ok(Arc::new(EntitySchema {
            name: self.name,
            attributes: self.attributes,
            by_name,
            by_column,
            primary_key: self.primary_key,
        }))
    }
}

/// One record. Values are dynamic; only declared attributes are change-tracked.
#[derive(Clone, Debug)]
pub struct Entity {
    schema: Arc<EntitySchema>,
    data: Map<String, Value>,
    dirty: Vec<String>,
    is_new: bool,
}

impl Entity {
    /// Empty, new entity.
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        Entity {
            schema,
            data: Map::new(),
            dirty: Vec::new(),
            is_new: true,
        }
    }

    /// New entity seeded through `set`, so declared values start dirty.
    pub fn with_values<K, V, I>(schema: Arc<EntitySchema>, values: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut entity = Entity::new(schema);
        entity.set_many(values);
        entity
    }

    /// Entity as stored: columns mapped back to attribute names, not new, nothing dirty.
    /// Columns the schema does not know are kept under their own name.
    pub fn from_row(schema: Arc<EntitySchema>, row: Map<String, Value>) -> Self {
        let mut data = Map::new();
        for (column, value) in row {
            let key = schema
                .attribute_for_column(&column)
                .map(|a| a.name.clone())
                .unwrap_or(column);
            data.insert(key, value);
        }
        Entity {
            schema,
            data,
            dirty: Vec::new(),
            is_new: false,
        }
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    /// Assigns a value; declared names join the dirty list once.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.data.insert(name.to_string(), value.into());
        if self.schema.is_declared(name) && !self.dirty.iter().any(|d| d == name) {
            self.dirty.push(name.to_string());
        }
    }

    pub fn set_many<K, V, I>(&mut self, values: I)
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (name, value) in values {
            let name = name.into();
            self.set(&name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    pub fn primary_key(&self) -> &str {
        self.schema.primary_key()
    }

    pub fn id(&self) -> Option<&Value> {
        self.data.get(self.schema.primary_key())
    }

    pub fn attr_type(&self, name: &str) -> Option<AttributeType> {
        self.schema.attr_type(name)
    }

    pub fn dirty(&self) -> &[String] {
        &self.dirty
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn set_new(&mut self, is_new: bool) {
        self.is_new = is_new;
    }

    /// Storage confirmed the current state.
    pub fn mark_persisted(&mut self) {
        self.is_new = false;
        self.dirty.clear();
    }

    /// All values, including undeclared keys.
    pub fn to_map(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.data
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Value::Object(entity.data)
    }
}
