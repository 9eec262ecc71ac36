use bigquery_resources_rs::table::{TableFieldSchema, TableSchema};
pub use bigquery_resources_rs::table::{FieldMode, FieldType};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn of(fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up a top level field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| &*field.name == name)
    }

    /// Position of a top level field, which is also its index in a row.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| &*field.name == name)
    }

    pub fn from_wire(schema: TableSchema) -> Self {
        Self::of(schema.fields.into_iter().map(Field::from_wire))
    }

    pub fn to_wire(&self) -> TableSchema {
        TableSchema {
            fields: self.fields.iter().map(Field::to_wire).collect(),
        }
    }
}

impl FromIterator<Field> for Schema {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self::of(iter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    name: Box<str>,
    field_type: FieldType,
    mode: Option<FieldMode>,
    description: Option<Box<str>>,
    sub_fields: Vec<Field>,
}

impl Field {
    pub fn new(name: impl Into<Box<str>>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            mode: None,
            description: None,
            sub_fields: Vec::new(),
        }
    }

    /// A `RECORD` field made up of `sub_fields`.
    pub fn record(name: impl Into<Box<str>>, sub_fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            sub_fields: sub_fields.into_iter().collect(),
            ..Self::new(name, FieldType::Record)
        }
    }

    pub fn with_mode(mut self, mode: FieldMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn required(self) -> Self {
        self.with_mode(FieldMode::Required)
    }

    pub fn repeated(self) -> Self {
        self.with_mode(FieldMode::Repeated)
    }

    pub fn with_description(mut self, description: impl Into<Box<str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// The field mode, defaulting to `NULLABLE` when the service omitted it.
    pub fn mode(&self) -> FieldMode {
        self.mode.unwrap_or(FieldMode::Nullable)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn sub_fields(&self) -> &[Field] {
        &self.sub_fields
    }

    pub fn from_wire(field: TableFieldSchema) -> Self {
        Self {
            name: field.name,
            field_type: field.ty,
            mode: field.mode,
            description: field.description,
            sub_fields: field.fields.into_iter().map(Self::from_wire).collect(),
        }
    }

    pub fn to_wire(&self) -> TableFieldSchema {
        TableFieldSchema {
            name: self.name.clone(),
            ty: self.field_type,
            mode: self.mode,
            description: self.description.clone(),
            fields: self.sub_fields.iter().map(Self::to_wire).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_wire_conversion() {
        let schema = Schema::of([
            Field::new("ts", FieldType::Timestamp).required(),
            Field::new("tags", FieldType::String).repeated(),
            Field::record("origin", [
                Field::new("lat", FieldType::Float),
                Field::new("lon", FieldType::Float),
            ])
            .with_description("where it came from"),
        ]);

        let wire = schema.to_wire();
        assert_eq!(wire.fields[2].fields.len(), 2);
        assert_eq!(wire.fields[0].mode, Some(FieldMode::Required));
        assert_eq!(wire.fields[1].mode, Some(FieldMode::Repeated));
        assert_eq!(Schema::from_wire(wire), schema);
    }

    #[test]
    fn test_lookup() {
        let schema = Schema::of([
            Field::new("a", FieldType::Integer),
            Field::new("b", FieldType::String),
        ]);

        assert_eq!(schema.index_of("b"), Some(1));
        assert_eq!(schema.field("a").map(Field::field_type), Some(FieldType::Integer));
        assert_eq!(schema.field("a").map(Field::mode), Some(FieldMode::Nullable));
        assert!(schema.field("c").is_none());
    }
}
