//! Paginated bulk deletes.
//!
//! Large tables are emptied page by page: fetch the next `page_size` keys in
//! key order, delete them in chunks of at most `delete_chunk_size` rows, and
//! fetch again until a page comes back empty. Keys are never collected up
//! front, so memory stays bounded and rows removed by someone else in the
//! meantime are simply not seen again. Chunking keeps every statement under
//! the backend's bind parameter limit.
//!
//! Small tables skip all of that: [`quick_or_purge_by_id`] and
//! [`quick_or_purge_by_composite_key`] count first and issue one unbounded
//! delete when the table is at or below `small_threshold` rows.

use shakadb::{DbError, Delegate, Filter, FindQuery, KeyField, KeyRow, KeyValue, OrderBy};
use tracing::{debug, info, warn};

use super::safe::delete_safely;

/// Page, chunk and threshold settings for one purge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeOptions {
    /// Rows fetched per page.
    pub page_size: usize,
    /// Rows per delete statement.
    pub delete_chunk_size: usize,
    /// At or below this many rows a single unbounded delete is used.
    pub small_threshold: u64,
    /// Secondary ordering for composite-key pages.
    pub extra_order_by: Vec<OrderBy>,
}

impl PurgeOptions {
    pub const DEFAULT_PAGE_SIZE: usize = 2_000;
    pub const DEFAULT_ID_CHUNK: usize = 1_000;
    pub const DEFAULT_COMPOSITE_CHUNK: usize = 200;
    pub const DEFAULT_SMALL_THRESHOLD: u64 = 5_000;

    /// Defaults for single-column identifier tables.
    pub fn by_id() -> Self {
        Self {
            page_size: Self::DEFAULT_PAGE_SIZE,
            delete_chunk_size: Self::DEFAULT_ID_CHUNK,
            small_threshold: Self::DEFAULT_SMALL_THRESHOLD,
            extra_order_by: Vec::new(),
        }
    }

    /// Defaults for composite-key tables.
    pub fn by_composite_key() -> Self {
        Self {
            delete_chunk_size: Self::DEFAULT_COMPOSITE_CHUNK,
            ..Self::by_id()
        }
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    pub fn delete_chunk_size(mut self, size: usize) -> Self {
        self.delete_chunk_size = size;
        self
    }

    pub fn small_threshold(mut self, threshold: u64) -> Self {
        self.small_threshold = threshold;
        self
    }

    pub fn extra_order_by(mut self, order_by: Vec<OrderBy>) -> Self {
        self.extra_order_by = order_by;
        self
    }
}

/// What a paginated purge did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeStats {
    /// Non-empty pages fetched.
    pub pages: usize,
    /// Delete statements issued.
    pub chunks: usize,
    /// Delete statements that failed and were skipped.
    pub failed_chunks: usize,
    /// Rows reported deleted.
    pub deleted: u64,
}

/// Which path a quick-or-purge call took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// One unbounded delete. `deleted` is `None` when it failed.
    Quick { total: u64, deleted: Option<u64> },
    /// The paginated engine ran.
    Paged(PurgeStats),
}

impl PurgeOutcome {
    pub fn deleted(&self) -> u64 {
        match self {
            PurgeOutcome::Quick { deleted, .. } => deleted.unwrap_or(0),
            PurgeOutcome::Paged(stats) => stats.deleted,
        }
    }
}

/// Deletes every row of a single-key table in pages and chunks.
pub async fn purge_model_by_id<D>(
    label: &str,
    delegate: &D,
    id_field: KeyField,
    options: &PurgeOptions,
) -> Result<PurgeStats, DbError>
where
    D: Delegate + ?Sized,
{
    let query = FindQuery {
        select: vec![id_field],
        order_by: vec![OrderBy::asc(id_field)],
        take: Some(options.page_size.max(1)),
    };

    purge_pages(label, delegate, &query, options.delete_chunk_size, |chunk| {
        let values: Vec<KeyValue> = chunk
            .iter()
            .filter_map(|row| row.get(id_field.column).cloned())
            .collect();
        Filter::In {
            field: id_field,
            values,
        }
    })
    .await
}

/// Deletes every row of a composite-key table in pages and chunks.
///
/// Each chunk is deleted with a disjunction of per-row conjunctions over all
/// of `key_fields`, so only rows from the fetched page can match.
pub async fn purge_model_by_composite_key<D>(
    label: &str,
    delegate: &D,
    key_fields: &[KeyField],
    options: &PurgeOptions,
) -> Result<PurgeStats, DbError>
where
    D: Delegate + ?Sized,
{
    let Some(&leading) = key_fields.first() else {
        return Err(DbError::InvalidInput(format!(
            "{label}: composite purge needs at least one key field"
        )));
    };

    let mut order_by = vec![OrderBy::asc(leading)];
    order_by.extend(options.extra_order_by.iter().copied());

    let query = FindQuery {
        select: key_fields.to_vec(),
        order_by,
        take: Some(options.page_size.max(1)),
    };

    purge_pages(label, delegate, &query, options.delete_chunk_size, |chunk| {
        Filter::AnyOf(
            chunk
                .iter()
                .filter_map(|row| row_conjunction(row, key_fields))
                .collect(),
        )
    })
    .await
}

/// `field = value` pairs for every key field, or `None` if the row lacks one.
fn row_conjunction(row: &KeyRow, key_fields: &[KeyField]) -> Option<Vec<(KeyField, KeyValue)>> {
    key_fields
        .iter()
        .map(|field| row.get(field.column).map(|value| (*field, value.clone())))
        .collect()
}

async fn purge_pages<D, F>(
    label: &str,
    delegate: &D,
    query: &FindQuery,
    delete_chunk_size: usize,
    mut chunk_filter: F,
) -> Result<PurgeStats, DbError>
where
    D: Delegate + ?Sized,
    F: FnMut(&[KeyRow]) -> Filter,
{
    let chunk_size = delete_chunk_size.max(1);
    let mut stats = PurgeStats::default();

    let mut previous_page: Vec<KeyRow> = Vec::new();
    loop {
        let rows = delegate.find_many(query).await?;
        if rows.is_empty() {
            break;
        }
        stats.pages += 1;

        let mut deleted_this_page = 0;
        let mut chunks_this_page = 0;
        let mut failed_this_page = 0;
        for chunk in rows.chunks(chunk_size) {
            let filter = chunk_filter(chunk);
            let chunk_label = format!("{label} ({})", chunk.len());
            chunks_this_page += 1;

            match delete_safely(&chunk_label, || delegate.delete_many(&filter)).await {
                Some(deleted) => deleted_this_page += deleted,
                None => failed_this_page += 1,
            }
        }
        stats.chunks += chunks_this_page;
        stats.failed_chunks += failed_this_page;
        stats.deleted += deleted_this_page;
        debug!(label, page = stats.pages, deleted = deleted_this_page, "purged page");

        // Rows a failed chunk could not remove come back on every fetch.
        if failed_this_page == chunks_this_page {
            warn!(
                label,
                remaining_in_page = rows.len(),
                "every chunk of the page failed, leaving it for a later run"
            );
            break;
        }
        // Someone else may have removed the page first; only stop when the
        // backend keeps handing back the same rows without removing any.
        if deleted_this_page == 0 && rows == previous_page {
            warn!(
                label,
                remaining_in_page = rows.len(),
                "page is not shrinking, leaving it for a later run"
            );
            break;
        }
        previous_page = rows;
    }

    info!(
        label,
        pages = stats.pages,
        chunks = stats.chunks,
        failed_chunks = stats.failed_chunks,
        deleted = stats.deleted,
        "purge finished"
    );
    Ok(stats)
}

/// Unbounded delete for small tables, paginated purge otherwise.
pub async fn quick_or_purge_by_id<D>(
    label: &str,
    delegate: &D,
    id_field: KeyField,
    options: &PurgeOptions,
) -> Result<PurgeOutcome, DbError>
where
    D: Delegate + ?Sized,
{
    if let Some(outcome) = try_quick(label, delegate, options.small_threshold).await? {
        return Ok(outcome);
    }
    purge_model_by_id(label, delegate, id_field, options)
        .await
        .map(PurgeOutcome::Paged)
}

/// Composite-key counterpart of [`quick_or_purge_by_id`].
pub async fn quick_or_purge_by_composite_key<D>(
    label: &str,
    delegate: &D,
    key_fields: &[KeyField],
    options: &PurgeOptions,
) -> Result<PurgeOutcome, DbError>
where
    D: Delegate + ?Sized,
{
    if let Some(outcome) = try_quick(label, delegate, options.small_threshold).await? {
        return Ok(outcome);
    }
    purge_model_by_composite_key(label, delegate, key_fields, options)
        .await
        .map(PurgeOutcome::Paged)
}

async fn try_quick<D>(
    label: &str,
    delegate: &D,
    small_threshold: u64,
) -> Result<Option<PurgeOutcome>, DbError>
where
    D: Delegate + ?Sized,
{
    let all = Filter::All;
    let total = delegate.count(&all).await?;
    if total > small_threshold {
        info!(label, total, small_threshold, "table is large, purging in pages");
        return Ok(None);
    }

    let quick_label = format!("{label} (quick, {total})");
    let deleted = delete_safely(&quick_label, || delegate.delete_many(&all)).await;
    info!(label, total, deleted = deleted.unwrap_or(0), "quick delete");
    Ok(Some(PurgeOutcome::Quick { total, deleted }))
}
