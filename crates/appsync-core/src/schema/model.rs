//! Structural descriptions of models and custom types.
//!
//! A [`ModelSchema`] is built once (by hand, by code generation, or from a
//! JSON [`SchemaDocument`](super::SchemaDocument)) and never mutated after
//! registration. Field maps are keyed and ordered by field name, which is what
//! makes selection-set output independent of declaration order.

use std::borrow::Cow;
use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::auth::{AuthRule, ModelOperation};
use super::field::{CustomTypeField, ModelField};
use crate::error::{CoreError, Result};

/// Implicit primary key used when no field is marked as one.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Cardinality of a relationship between two models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssociationKind {
    BelongsTo,
    HasOne,
    HasMany,
}

/// Relationship descriptor for a model-typed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelAssociation {
    pub kind: AssociationKind,

    /// Name of the associated model type.
    pub associated_type: String,

    /// Field on the associated model pointing back at this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_name: Option<String>,

    /// Foreign-key field names held by this model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_names: Vec<String>,
}

impl ModelAssociation {
    pub fn new(kind: AssociationKind, associated_type: impl Into<String>) -> Self {
        Self {
            kind,
            associated_type: associated_type.into(),
            associated_name: None,
            target_names: Vec::new(),
        }
    }

    pub fn with_associated_name(mut self, name: impl Into<String>) -> Self {
        self.associated_name = Some(name.into());
        self
    }

    pub fn with_target_names(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.target_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Whether this side of the relationship holds the foreign key.
    pub fn is_owner(&self) -> bool {
        self.kind == AssociationKind::BelongsTo
    }

    pub fn is_to_many(&self) -> bool {
        self.kind == AssociationKind::HasMany
    }
}

/// Secondary or primary index. An index without a name is the primary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelIndex {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub fields: Vec<String>,
}

impl ModelIndex {
    pub fn primary(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: None,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn named(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Structural description of one model type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSchema {
    name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    plural_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_name: Option<String>,

    #[serde(with = "named_list")]
    fields: BTreeMap<String, ModelField>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    associations: IndexMap<String, ModelAssociation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    auth_rules: Vec<AuthRule>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    indexes: Vec<ModelIndex>,

    /// Bookkeeping fields the backend adds to every record (e.g. `createdAt`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    meta_fields: Vec<String>,
}

impl ModelSchema {
    pub fn builder(name: impl Into<String>) -> ModelSchemaBuilder {
        ModelSchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Plural name; `<name>s` when none was declared.
    pub fn plural_name(&self) -> Cow<'_, str> {
        match &self.plural_name {
            Some(plural) => Cow::Borrowed(plural),
            None => Cow::Owned(format!("{}s", self.name)),
        }
    }

    pub fn target_name(&self) -> Option<&str> {
        self.target_name.as_deref()
    }

    pub fn fields(&self) -> &BTreeMap<String, ModelField> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&ModelField> {
        self.fields.get(name)
    }

    pub fn associations(&self) -> &IndexMap<String, ModelAssociation> {
        &self.associations
    }

    pub fn association(&self, field_name: &str) -> Option<&ModelAssociation> {
        self.associations.get(field_name)
    }

    pub fn auth_rules(&self) -> &[AuthRule] {
        &self.auth_rules
    }

    pub fn indexes(&self) -> &[ModelIndex] {
        &self.indexes
    }

    pub fn meta_fields(&self) -> &[String] {
        &self.meta_fields
    }

    /// Name of the primary key field, falling back to the implicit `id`.
    pub fn primary_key_field(&self) -> &str {
        self.fields
            .values()
            .find(|f| f.is_primary_key)
            .map(|f| f.name.as_str())
            .unwrap_or(DEFAULT_PRIMARY_KEY)
    }

    /// Fields of the primary index; a composite key when an unnamed index declares one.
    pub fn primary_index_fields(&self) -> Vec<&str> {
        self.indexes
            .iter()
            .find(|index| index.name.is_none() && !index.fields.is_empty())
            .map(|index| index.fields.iter().map(String::as_str).collect())
            .unwrap_or_else(|| vec![self.primary_key_field()])
    }

    /// Owner rules covering `operation`, in declaration order.
    pub fn owner_rules_for(&self, operation: ModelOperation) -> impl Iterator<Item = &AuthRule> {
        self.auth_rules
            .iter()
            .filter(move |rule| rule.is_owner_rule() && rule.applies_to(operation))
    }

    /// Checks the structural invariants of the schema.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSchema` describing the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::invalid_schema("model name must not be empty"));
        }

        for (key, field) in &self.fields {
            if key != &field.name {
                return Err(CoreError::invalid_schema(format!(
                    "{}: field keyed as '{key}' is named '{}'",
                    self.name, field.name
                )));
            }
            validate_rules(&self.name, &field.auth_rules)?;
        }

        let primary_keys: Vec<&str> = self
            .fields
            .values()
            .filter(|f| f.is_primary_key)
            .map(|f| f.name.as_str())
            .collect();
        if primary_keys.len() > 1 {
            return Err(CoreError::invalid_schema(format!(
                "{}: more than one primary key field ({})",
                self.name,
                primary_keys.join(", ")
            )));
        }

        for (field_name, association) in &self.associations {
            let Some(field) = self.fields.get(field_name) else {
                return Err(CoreError::invalid_schema(format!(
                    "{}: association '{field_name}' has no matching field",
                    self.name
                )));
            };
            if !field.is_model {
                return Err(CoreError::invalid_schema(format!(
                    "{}: association '{field_name}' must be declared on a model field",
                    self.name
                )));
            }
            if association.associated_type.is_empty() {
                return Err(CoreError::invalid_schema(format!(
                    "{}: association '{field_name}' has no associated type",
                    self.name
                )));
            }
        }

        for index in &self.indexes {
            if let Some(missing) = index.fields.iter().find(|f| !self.fields.contains_key(*f)) {
                return Err(CoreError::invalid_schema(format!(
                    "{}: index field '{missing}' is not declared",
                    self.name
                )));
            }
        }

        validate_rules(&self.name, &self.auth_rules)
    }
}

fn validate_rules(type_name: &str, rules: &[AuthRule]) -> Result<()> {
    if rules
        .iter()
        .any(|rule| rule.operations.as_ref().is_some_and(Vec::is_empty))
    {
        return Err(CoreError::invalid_schema(format!(
            "{type_name}: auth rule declares an empty operation list"
        )));
    }
    Ok(())
}

/// Builder for [`ModelSchema`].
#[derive(Debug, Clone)]
pub struct ModelSchemaBuilder {
    name: String,
    plural_name: Option<String>,
    target_name: Option<String>,
    fields: Vec<ModelField>,
    associations: IndexMap<String, ModelAssociation>,
    auth_rules: Vec<AuthRule>,
    indexes: Vec<ModelIndex>,
    meta_fields: Vec<String>,
}

impl ModelSchemaBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plural_name: None,
            target_name: None,
            fields: Vec::new(),
            associations: IndexMap::new(),
            auth_rules: Vec::new(),
            indexes: Vec::new(),
            meta_fields: Vec::new(),
        }
    }

    pub fn plural_name(mut self, plural_name: impl Into<String>) -> Self {
        self.plural_name = Some(plural_name.into());
        self
    }

    pub fn target_name(mut self, target_name: impl Into<String>) -> Self {
        self.target_name = Some(target_name.into());
        self
    }

    pub fn field(mut self, field: ModelField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn association(mut self, field_name: impl Into<String>, association: ModelAssociation) -> Self {
        self.associations.insert(field_name.into(), association);
        self
    }

    /// Adds a to-one field holding the foreign key(s) of `associated_type`.
    pub fn belongs_to(
        self,
        field_name: &str,
        associated_type: &str,
        target_names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.field(ModelField::new(field_name, associated_type).model())
            .association(
                field_name,
                ModelAssociation::new(AssociationKind::BelongsTo, associated_type)
                    .with_target_names(target_names),
            )
    }

    /// Adds a to-one field resolved through `associated_name` on the other side.
    pub fn has_one(self, field_name: &str, associated_type: &str, associated_name: &str) -> Self {
        self.field(ModelField::new(field_name, associated_type).model())
            .association(
                field_name,
                ModelAssociation::new(AssociationKind::HasOne, associated_type)
                    .with_associated_name(associated_name),
            )
    }

    /// Adds a to-many field resolved through `associated_name` on the other side.
    pub fn has_many(self, field_name: &str, associated_type: &str, associated_name: &str) -> Self {
        self.field(ModelField::new(field_name, associated_type).model().array())
            .association(
                field_name,
                ModelAssociation::new(AssociationKind::HasMany, associated_type)
                    .with_associated_name(associated_name),
            )
    }

    pub fn auth_rule(mut self, rule: AuthRule) -> Self {
        self.auth_rules.push(rule);
        self
    }

    pub fn index(mut self, index: ModelIndex) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn meta_field(mut self, name: impl Into<String>) -> Self {
        self.meta_fields.push(name.into());
        self
    }

    /// Builds and validates the schema.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSchema` on duplicate field names or any
    /// violation reported by [`ModelSchema::validate`].
    pub fn build(self) -> Result<ModelSchema> {
        let fields = collect_unique(&self.name, self.fields, |f| f.name.clone())?;
        let schema = ModelSchema {
            name: self.name,
            plural_name: self.plural_name,
            target_name: self.target_name,
            fields,
            associations: self.associations,
            auth_rules: self.auth_rules,
            indexes: self.indexes,
            meta_fields: self.meta_fields,
        };
        schema.validate()?;
        Ok(schema)
    }
}

/// Structural description of a value type embedded inside models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTypeSchema {
    name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    plural_name: Option<String>,

    #[serde(with = "named_list")]
    fields: BTreeMap<String, CustomTypeField>,
}

impl CustomTypeSchema {
    /// Builds and validates a custom type schema.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSchema` on an empty name or duplicate fields.
    pub fn new(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = CustomTypeField>,
    ) -> Result<Self> {
        let name = name.into();
        let fields = collect_unique(&name, fields, |f| f.name.clone())?;
        let schema = Self {
            name,
            plural_name: None,
            fields,
        };
        schema.validate()?;
        Ok(schema)
    }

    pub fn with_plural_name(mut self, plural_name: impl Into<String>) -> Self {
        self.plural_name = Some(plural_name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plural_name(&self) -> Cow<'_, str> {
        match &self.plural_name {
            Some(plural) => Cow::Borrowed(plural),
            None => Cow::Owned(format!("{}s", self.name)),
        }
    }

    pub fn fields(&self) -> &BTreeMap<String, CustomTypeField> {
        &self.fields
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidSchema` on an empty name or a mis-keyed field.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::invalid_schema("custom type name must not be empty"));
        }
        if let Some((key, _)) = self.fields.iter().find(|(key, f)| *key != &f.name) {
            return Err(CoreError::invalid_schema(format!(
                "{}: field keyed as '{key}' has a different name",
                self.name
            )));
        }
        Ok(())
    }
}

fn collect_unique<T>(
    type_name: &str,
    items: impl IntoIterator<Item = T>,
    key: impl Fn(&T) -> String,
) -> Result<BTreeMap<String, T>> {
    let mut map = BTreeMap::new();
    for item in items {
        let name = key(&item);
        if map.insert(name.clone(), item).is_some() {
            return Err(CoreError::invalid_schema(format!(
                "{type_name}: duplicate field '{name}'"
            )));
        }
    }
    Ok(map)
}

/// Serializes a name-keyed field map as a plain list and rejects duplicates on the way in.
mod named_list {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::schema::field::{CustomTypeField, ModelField};

    pub trait Named {
        fn name(&self) -> &str;
    }

    impl Named for ModelField {
        fn name(&self) -> &str {
            &self.name
        }
    }

    impl Named for CustomTypeField {
        fn name(&self) -> &str {
            &self.name
        }
    }

    pub fn serialize<S, T>(map: &BTreeMap<String, T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Named,
    {
        let items = Vec::<T>::deserialize(deserializer)?;
        let mut map = BTreeMap::new();
        for item in items {
            let name = item.name().to_string();
            if map.insert(name.clone(), item).is_some() {
                return Err(D::Error::custom(format!("duplicate field '{name}'")));
            }
        }
        Ok(map)
    }
}
