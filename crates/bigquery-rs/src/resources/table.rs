use std::borrow::Cow;
use std::collections::BTreeMap;

use bigquery_resources_rs::table::{Table as WireTable, TableType as WireTableType, ViewDefinition};
pub use bigquery_resources_rs::table::{Clustering, TimePartitioning, TimePartitioningType};

use super::schema::Schema;
use crate::id::TableId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableType {
    Table,
    View,
    External,
    MaterializedView,
    Snapshot,
}

impl TableType {
    fn from_wire(ty: WireTableType) -> Self {
        match ty {
            WireTableType::Table => Self::Table,
            WireTableType::View => Self::View,
            WireTableType::External => Self::External,
            WireTableType::MaterializedView => Self::MaterializedView,
            WireTableType::Snapshot => Self::Snapshot,
        }
    }

    fn to_wire(self) -> WireTableType {
        match self {
            Self::Table => WireTableType::Table,
            Self::View => WireTableType::View,
            Self::External => WireTableType::External,
            Self::MaterializedView => WireTableType::MaterializedView,
            Self::Snapshot => WireTableType::Snapshot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Table {
    table_id: TableId,
    table_type: Option<TableType>,
    etag: Option<Box<str>>,
    generated_id: Option<Box<str>>,
    self_link: Option<Box<str>>,
    friendly_name: Option<Box<str>>,
    description: Option<Box<str>>,
    labels: BTreeMap<Box<str>, Box<str>>,
    schema: Option<Schema>,
    view_query: Option<Box<str>>,
    time_partitioning: Option<TimePartitioning>,
    clustering: Option<Clustering>,
    location: Option<Box<str>>,
    num_bytes: Option<i64>,
    num_rows: Option<u64>,
    creation_time: Option<i64>,
    expiration_time: Option<i64>,
    last_modified_time: Option<i64>,
}

impl Table {
    fn empty(table_id: TableId, table_type: Option<TableType>) -> Self {
        Self {
            table_id,
            table_type,
            etag: None,
            generated_id: None,
            self_link: None,
            friendly_name: None,
            description: None,
            labels: BTreeMap::new(),
            schema: None,
            view_query: None,
            time_partitioning: None,
            clustering: None,
            location: None,
            num_bytes: None,
            num_rows: None,
            creation_time: None,
            expiration_time: None,
            last_modified_time: None,
        }
    }

    /// A standard table with the given schema.
    pub fn new(table_id: TableId, schema: Schema) -> Self {
        Self {
            schema: Some(schema),
            ..Self::empty(table_id, Some(TableType::Table))
        }
    }

    /// A logical view defined by `query`.
    pub fn view(table_id: TableId, query: impl Into<Box<str>>) -> Self {
        Self {
            view_query: Some(query.into()),
            ..Self::empty(table_id, Some(TableType::View))
        }
    }

    /// A table with nothing but its id set, used for partial updates.
    pub fn of(table_id: TableId) -> Self {
        Self::empty(table_id, None)
    }

    pub fn with_friendly_name(mut self, friendly_name: impl Into<Box<str>>) -> Self {
        self.friendly_name = Some(friendly_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<Box<str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<Box<str>>, value: impl Into<Box<str>>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_time_partitioning(mut self, partitioning: TimePartitioning) -> Self {
        self.time_partitioning = Some(partitioning);
        self
    }

    pub fn with_clustering(
        mut self,
        fields: impl IntoIterator<Item = impl Into<Box<str>>>,
    ) -> Self {
        self.clustering = Some(Clustering {
            fields: fields.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Milliseconds since the epoch.
    pub fn with_expiration_time(mut self, expiration_time: i64) -> Self {
        self.expiration_time = Some(expiration_time);
        self
    }

    pub fn with_etag(mut self, etag: impl Into<Box<str>>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Completes the table id with `project`, returning `self` untouched if it
    /// already had one.
    pub fn set_project_id(&self, project: &str) -> Cow<'_, Self> {
        match self.table_id.set_project_id(project) {
            Cow::Borrowed(_) => Cow::Borrowed(self),
            Cow::Owned(table_id) => Cow::Owned(Self {
                table_id,
                ..self.clone()
            }),
        }
    }

    pub fn table_id(&self) -> &TableId {
        &self.table_id
    }

    pub fn table_type(&self) -> Option<TableType> {
        self.table_type
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn generated_id(&self) -> Option<&str> {
        self.generated_id.as_deref()
    }

    pub fn self_link(&self) -> Option<&str> {
        self.self_link.as_deref()
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.friendly_name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn labels(&self) -> &BTreeMap<Box<str>, Box<str>> {
        &self.labels
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    pub fn view_query(&self) -> Option<&str> {
        self.view_query.as_deref()
    }

    pub fn time_partitioning(&self) -> Option<&TimePartitioning> {
        self.time_partitioning.as_ref()
    }

    pub fn clustering(&self) -> Option<&Clustering> {
        self.clustering.as_ref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn num_bytes(&self) -> Option<i64> {
        self.num_bytes
    }

    pub fn num_rows(&self) -> Option<u64> {
        self.num_rows
    }

    pub fn creation_time(&self) -> Option<i64> {
        self.creation_time
    }

    pub fn expiration_time(&self) -> Option<i64> {
        self.expiration_time
    }

    pub fn last_modified_time(&self) -> Option<i64> {
        self.last_modified_time
    }

    pub fn from_wire(table: WireTable) -> Self {
        let table_id = match table.table_reference {
            Some(reference) => TableId::from_wire(reference),
            None => TableId::of("", ""),
        };

        Self {
            table_id,
            table_type: table.ty.map(TableType::from_wire),
            etag: table.etag,
            generated_id: table.id,
            self_link: table.self_link,
            friendly_name: table.friendly_name,
            description: table.description,
            labels: table.labels.into_iter().collect(),
            schema: table.schema.map(Schema::from_wire),
            view_query: table.view.map(|view| view.query),
            time_partitioning: table.time_partitioning,
            clustering: table.clustering,
            location: table.location,
            num_bytes: table.num_bytes,
            num_rows: table.num_rows,
            creation_time: table.creation_time,
            expiration_time: table.expiration_time,
            last_modified_time: table.last_modified_time,
        }
    }

    pub fn to_wire(&self) -> WireTable {
        WireTable {
            etag: self.etag.clone(),
            id: self.generated_id.clone(),
            self_link: self.self_link.clone(),
            table_reference: Some(self.table_id.to_wire()),
            friendly_name: self.friendly_name.clone(),
            description: self.description.clone(),
            labels: self
                .labels
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            schema: self.schema.as_ref().map(Schema::to_wire),
            time_partitioning: self.time_partitioning.clone(),
            clustering: self.clustering.clone(),
            view: self.view_query.as_ref().map(|query| ViewDefinition {
                query: query.clone(),
                use_legacy_sql: Some(false),
            }),
            location: self.location.clone(),
            num_bytes: self.num_bytes,
            num_rows: self.num_rows,
            creation_time: self.creation_time,
            expiration_time: self.expiration_time,
            last_modified_time: self.last_modified_time,
            ty: self.table_type.map(TableType::to_wire),
            ..Default::default()
        }
    }
}
