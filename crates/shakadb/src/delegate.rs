//! Table delegates: a minimal, table-agnostic view over the schema.
//!
//! Purge logic only ever needs to count rows, list their keys and delete
//! rows by key. [`Delegate`] captures exactly that, and [`TableDelegate`]
//! implements it once for every [`Table`] by building statements from the
//! table's static key descriptors.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::debug;

use crate::errors::DbError;

/// Column type of a key field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Int,
    Text,
}

/// A typed key column descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyField {
    pub column: &'static str,
    pub kind: KeyKind,
}

impl KeyField {
    pub const fn int(column: &'static str) -> Self {
        Self {
            column,
            kind: KeyKind::Int,
        }
    }

    pub const fn text(column: &'static str) -> Self {
        Self {
            column,
            kind: KeyKind::Text,
        }
    }
}

/// A single key value read from or matched against a key column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
    Int(i32),
    Text(String),
}

impl From<i32> for KeyValue {
    fn from(v: i32) -> Self {
        KeyValue::Int(v)
    }
}

impl From<&str> for KeyValue {
    fn from(v: &str) -> Self {
        KeyValue::Text(v.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(v: String) -> Self {
        KeyValue::Text(v)
    }
}

/// A row projected onto the selected key fields, in selection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRow {
    values: Vec<(KeyField, KeyValue)>,
}

impl KeyRow {
    pub fn new(values: Vec<(KeyField, KeyValue)>) -> Self {
        Self { values }
    }

    pub fn get(&self, column: &str) -> Option<&KeyValue> {
        self.values
            .iter()
            .find(|(field, _)| field.column == column)
            .map(|(_, value)| value)
    }

    /// Returns true when every `(field, value)` pair matches this row.
    /// True when every pair matches. An empty conjunction matches nothing.
    pub fn matches_all(&self, conjunction: &[(KeyField, KeyValue)]) -> bool {
        !conjunction.is_empty()
            && conjunction
                .iter()
                .all(|(field, value)| self.get(field.column) == Some(value))
    }

    pub fn values(&self) -> &[(KeyField, KeyValue)] {
        &self.values
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: KeyField,
    pub order: SortOrder,
}

impl OrderBy {
    pub const fn asc(field: KeyField) -> Self {
        Self {
            field,
            order: SortOrder::Asc,
        }
    }

    pub const fn desc(field: KeyField) -> Self {
        Self {
            field,
            order: SortOrder::Desc,
        }
    }
}

/// Row predicate understood by every delegate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Every row in the table.
    All,
    /// Rows whose `field` is one of `values`. Empty `values` matches nothing.
    In {
        field: KeyField,
        values: Vec<KeyValue>,
    },
    /// Rows matching at least one conjunction of `field = value` pairs.
    /// An empty disjunction, or an empty conjunction inside it, matches nothing.
    AnyOf(Vec<Vec<(KeyField, KeyValue)>>),
}

impl Filter {
    /// Evaluates the filter against a projected row.
    pub fn matches(&self, row: &KeyRow) -> bool {
        match self {
            Filter::All => true,
            Filter::In { field, values } => row
                .get(field.column)
                .is_some_and(|value| values.contains(value)),
            Filter::AnyOf(disjunction) => disjunction.iter().any(|conj| row.matches_all(conj)),
        }
    }
}

/// Key projection, ordering and limit for [`Delegate::find_many`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindQuery {
    pub select: Vec<KeyField>,
    pub order_by: Vec<OrderBy>,
    pub take: Option<usize>,
}

/// The capability set purge logic is written against.
#[async_trait]
pub trait Delegate: Send + Sync {
    /// Number of rows matching `filter`.
    async fn count(&self, filter: &Filter) -> Result<u64, DbError>;

    /// Deletes every row matching `filter` and returns how many went.
    async fn delete_many(&self, filter: &Filter) -> Result<u64, DbError>;

    /// Lists key projections of rows, ordered and limited per `query`.
    async fn find_many(&self, query: &FindQuery) -> Result<Vec<KeyRow>, DbError>;
}

#[async_trait]
impl<T: Delegate + ?Sized> Delegate for &T {
    async fn count(&self, filter: &Filter) -> Result<u64, DbError> {
        (**self).count(filter).await
    }

    async fn delete_many(&self, filter: &Filter) -> Result<u64, DbError> {
        (**self).delete_many(filter).await
    }

    async fn find_many(&self, query: &FindQuery) -> Result<Vec<KeyRow>, DbError> {
        (**self).find_many(query).await
    }
}

/// Hands out a delegate for any table of the schema.
pub trait TableSource: Send + Sync {
    fn delegate_for(&self, table: Table) -> Box<dyn Delegate + '_>;
}

/// Every table in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Thumbnails,
    Photos,
    SurfSpotInfluencers,
    SurfSpotSurfBreakTypes,
    SurfSpotTravellers,
    SurfSpots,
    Influencers,
    Travellers,
    SurfBreakTypes,
}

const SURF_SPOT_ID: KeyField = KeyField::int("surf_spot_id");
const PHOTO_ID: KeyField = KeyField::int("photo_id");
const INFLUENCER_ID: KeyField = KeyField::int("influencer_id");
const TRAVELLER_ID: KeyField = KeyField::int("traveller_id");
const SURF_BREAK_TYPE_ID: KeyField = KeyField::int("surf_break_type_id");
const THUMBNAIL_KIND: KeyField = KeyField::text("kind");

impl Table {
    /// All tables, children before parents.
    pub const DELETION_ORDER: [Table; 9] = [
        Table::Thumbnails,
        Table::Photos,
        Table::SurfSpotInfluencers,
        Table::SurfSpotSurfBreakTypes,
        Table::SurfSpotTravellers,
        Table::SurfSpots,
        Table::Influencers,
        Table::Travellers,
        Table::SurfBreakTypes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Thumbnails => "thumbnails",
            Table::Photos => "photos",
            Table::SurfSpotInfluencers => "surf_spot_influencers",
            Table::SurfSpotSurfBreakTypes => "surf_spot_surf_break_types",
            Table::SurfSpotTravellers => "surf_spot_travellers",
            Table::SurfSpots => "surf_spots",
            Table::Influencers => "influencers",
            Table::Travellers => "travellers",
            Table::SurfBreakTypes => "surf_break_types",
        }
    }

    /// Primary key columns, leading column first.
    pub fn key_fields(&self) -> &'static [KeyField] {
        match self {
            Table::Thumbnails => &[PHOTO_ID, THUMBNAIL_KIND],
            Table::Photos => &[PHOTO_ID],
            Table::SurfSpotInfluencers => &[SURF_SPOT_ID, INFLUENCER_ID],
            Table::SurfSpotSurfBreakTypes => &[SURF_SPOT_ID, SURF_BREAK_TYPE_ID],
            Table::SurfSpotTravellers => &[SURF_SPOT_ID, TRAVELLER_ID],
            Table::SurfSpots => &[SURF_SPOT_ID],
            Table::Influencers => &[INFLUENCER_ID],
            Table::Travellers => &[TRAVELLER_ID],
            Table::SurfBreakTypes => &[SURF_BREAK_TYPE_ID],
        }
    }

    pub fn is_pivot(&self) -> bool {
        matches!(
            self,
            Table::SurfSpotInfluencers | Table::SurfSpotSurfBreakTypes | Table::SurfSpotTravellers
        )
    }
}

/// Postgres-backed [`Delegate`] for one table.
#[derive(Clone)]
pub struct TableDelegate {
    pool: PgPool,
    table: Table,
}

impl TableDelegate {
    pub fn new(pool: PgPool, table: Table) -> Self {
        Self { pool, table }
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: &KeyValue) {
    match value {
        KeyValue::Int(v) => {
            qb.push_bind(*v);
        }
        KeyValue::Text(v) => {
            qb.push_bind(v.clone());
        }
    }
}

fn push_where(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    match filter {
        Filter::All => {}
        Filter::In { values, .. } if values.is_empty() => {
            qb.push(" WHERE FALSE");
        }
        Filter::In { field, values } => {
            qb.push(" WHERE ");
            qb.push(field.column);
            qb.push(" IN (");
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                push_value(qb, value);
            }
            qb.push(")");
        }
        Filter::AnyOf(disjunction) if disjunction.is_empty() => {
            qb.push(" WHERE FALSE");
        }
        Filter::AnyOf(disjunction) => {
            qb.push(" WHERE ");
            for (i, conjunction) in disjunction.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push("(");
                if conjunction.is_empty() {
                    qb.push("FALSE");
                }
                for (j, (field, value)) in conjunction.iter().enumerate() {
                    if j > 0 {
                        qb.push(" AND ");
                    }
                    qb.push(field.column);
                    qb.push(" = ");
                    push_value(qb, value);
                }
                qb.push(")");
            }
        }
    }
}

fn decode_row(row: &PgRow, select: &[KeyField]) -> Result<KeyRow, DbError> {
    let mut values = Vec::with_capacity(select.len());
    for field in select {
        let value = match field.kind {
            KeyKind::Int => KeyValue::Int(row.try_get::<i32, _>(field.column)?),
            KeyKind::Text => KeyValue::Text(row.try_get::<String, _>(field.column)?),
        };
        values.push((*field, value));
    }
    Ok(KeyRow::new(values))
}

#[async_trait]
impl Delegate for TableDelegate {
    async fn count(&self, filter: &Filter) -> Result<u64, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM ");
        qb.push(self.table.name());
        push_where(&mut qb, filter);

        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn delete_many(&self, filter: &Filter) -> Result<u64, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM ");
        qb.push(self.table.name());
        push_where(&mut qb, filter);

        let result = qb.build().execute(&self.pool).await?;
        debug!(table = self.table.name(), rows = result.rows_affected(), "delete_many");
        Ok(result.rows_affected())
    }

    async fn find_many(&self, query: &FindQuery) -> Result<Vec<KeyRow>, DbError> {
        if query.select.is_empty() {
            return Err(DbError::InvalidInput(format!(
                "find_many on {} selects no columns",
                self.table.name()
            )));
        }

        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        for (i, field) in query.select.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(field.column);
        }
        qb.push(" FROM ");
        qb.push(self.table.name());

        if !query.order_by.is_empty() {
            qb.push(" ORDER BY ");
            for (i, order) in query.order_by.iter().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                qb.push(order.field.column);
                qb.push(" ");
                qb.push(order.order.as_sql());
            }
        }

        if let Some(take) = query.take {
            qb.push(" LIMIT ");
            qb.push_bind(take as i64);
        }

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| decode_row(row, &query.select))
            .collect()
    }
}
