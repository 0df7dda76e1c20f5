//! Dependency-ordered removal of all surf data.

use shakadb::{DbError, Filter, Table, TableSource};
use tracing::info;

use super::purge::{
    PurgeOptions, PurgeOutcome, quick_or_purge_by_composite_key, quick_or_purge_by_id,
};
use super::safe::delete_safely;

/// One table's cleanup and its tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupStep {
    pub table: Table,
    pub options: PurgeOptions,
}

/// Ordered cleanup steps, children before parents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupPlan {
    steps: Vec<CleanupStep>,
}

/// Per-table results of a cleanup run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub outcomes: Vec<(Table, PurgeOutcome)>,
}

impl CleanupReport {
    pub fn total_deleted(&self) -> u64 {
        self.outcomes.iter().map(|(_, o)| o.deleted()).sum()
    }
}

impl CleanupPlan {
    /// Thumbnails, photos, the three pivots, then the four parent tables.
    ///
    /// Children and pivots tolerate a larger quick-delete threshold and wider
    /// chunks than the defaults since their keys are narrow.
    pub fn default_plan() -> Self {
        let steps = vec![
            CleanupStep {
                table: Table::Thumbnails,
                options: PurgeOptions::by_composite_key()
                    .small_threshold(10_000)
                    .delete_chunk_size(300),
            },
            CleanupStep {
                table: Table::Photos,
                options: PurgeOptions::by_id()
                    .small_threshold(10_000)
                    .delete_chunk_size(1_000),
            },
            CleanupStep {
                table: Table::SurfSpotInfluencers,
                options: pivot_options(),
            },
            CleanupStep {
                table: Table::SurfSpotSurfBreakTypes,
                options: pivot_options(),
            },
            CleanupStep {
                table: Table::SurfSpotTravellers,
                options: pivot_options(),
            },
            CleanupStep {
                table: Table::SurfSpots,
                options: PurgeOptions::by_id(),
            },
            CleanupStep {
                table: Table::Influencers,
                options: PurgeOptions::by_id(),
            },
            CleanupStep {
                table: Table::Travellers,
                options: PurgeOptions::by_id(),
            },
            CleanupStep {
                table: Table::SurfBreakTypes,
                options: PurgeOptions::by_id(),
            },
        ];
        Self { steps }
    }

    pub fn steps(&self) -> &[CleanupStep] {
        &self.steps
    }

    /// Runs every step in order.
    ///
    /// Failed deletes are logged and skipped; a failing count or page fetch
    /// aborts the run.
    pub async fn run<S>(&self, source: &S) -> Result<CleanupReport, DbError>
    where
        S: TableSource + ?Sized,
    {
        let mut report = CleanupReport::default();

        for step in &self.steps {
            let table = step.table;
            let delegate = source.delegate_for(table);
            let key_fields = table.key_fields();

            let outcome = match key_fields {
                [id_field] => {
                    quick_or_purge_by_id(table.name(), &*delegate, *id_field, &step.options)
                        .await?
                }
                _ => {
                    quick_or_purge_by_composite_key(
                        table.name(),
                        &*delegate,
                        key_fields,
                        &step.options,
                    )
                    .await?
                }
            };
            report.outcomes.push((table, outcome));
        }

        info!(deleted = report.total_deleted(), "surf data cleanup finished");
        Ok(report)
    }
}

fn pivot_options() -> PurgeOptions {
    PurgeOptions::by_composite_key()
        .small_threshold(20_000)
        .delete_chunk_size(800)
}

/// Removes all surf data with the default plan.
pub async fn delete_surf_data<S>(source: &S) -> Result<CleanupReport, DbError>
where
    S: TableSource + ?Sized,
{
    CleanupPlan::default_plan().run(source).await
}

/// One unbounded delete per table, children first, each failure swallowed.
///
/// Returns the number of rows removed.
pub async fn sweep_all<S>(source: &S) -> u64
where
    S: TableSource + ?Sized,
{
    let all = Filter::All;
    let mut deleted = 0;
    for table in Table::DELETION_ORDER {
        let delegate = source.delegate_for(table);
        if let Some(n) = delete_safely(table.name(), || delegate.delete_many(&all)).await {
            deleted += n;
        }
    }
    info!(deleted, "sweep finished");
    deleted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::purge::tests::MemoryTable;
    use shakadb::{Delegate, KeyRow, KeyValue};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MemorySchema {
        tables: HashMap<Table, MemoryTable>,
        visited: Mutex<Vec<Table>>,
    }

    impl MemorySchema {
        fn filled(rows_per_table: i32) -> Self {
            let tables = Table::DELETION_ORDER
                .iter()
                .map(|table| {
                    let fields = table.key_fields();
                    let rows = (0..rows_per_table)
                        .map(|i| {
                            KeyRow::new(
                                fields
                                    .iter()
                                    .map(|f| match f.kind {
                                        shakadb::delegate::KeyKind::Int => (*f, KeyValue::Int(i)),
                                        shakadb::delegate::KeyKind::Text => {
                                            (*f, KeyValue::Text(format!("k{i}")))
                                        }
                                    })
                                    .collect(),
                            )
                        })
                        .collect();
                    (*table, MemoryTable::with_rows(rows))
                })
                .collect();
            Self {
                tables,
                visited: Mutex::new(Vec::new()),
            }
        }

        fn remaining(&self) -> usize {
            self.tables.values().map(|t| t.len()).sum()
        }
    }

    impl TableSource for MemorySchema {
        fn delegate_for(&self, table: Table) -> Box<dyn Delegate + '_> {
            self.visited.lock().unwrap().push(table);
            Box::new(&self.tables[&table])
        }
    }

    #[test]
    fn default_plan_follows_deletion_order() {
        let plan = CleanupPlan::default_plan();
        let tables: Vec<Table> = plan.steps().iter().map(|s| s.table).collect();
        assert_eq!(tables, Table::DELETION_ORDER.to_vec());
    }

    #[test]
    fn default_plan_tuning() {
        let plan = CleanupPlan::default_plan();
        let thumbnails = &plan.steps()[0].options;
        assert_eq!(thumbnails.small_threshold, 10_000);
        assert_eq!(thumbnails.delete_chunk_size, 300);

        for step in plan.steps().iter().filter(|s| s.table.is_pivot()) {
            assert_eq!(step.options.small_threshold, 20_000);
            assert_eq!(step.options.delete_chunk_size, 800);
        }
        let spots = plan.steps().iter().find(|s| s.table == Table::SurfSpots).unwrap();
        assert_eq!(spots.options, PurgeOptions::by_id());
    }

    #[tokio::test]
    async fn cleanup_empties_every_table_in_order() {
        let schema = MemorySchema::filled(12);
        let report = delete_surf_data(&schema).await.unwrap();

        assert_eq!(schema.remaining(), 0);
        assert_eq!(report.total_deleted(), 12 * 9);
        assert_eq!(*schema.visited.lock().unwrap(), Table::DELETION_ORDER.to_vec());
        assert!(
            report
                .outcomes
                .iter()
                .all(|(_, o)| matches!(o, PurgeOutcome::Quick { total: 12, .. }))
        );
    }

    #[tokio::test]
    async fn small_thresholds_force_pagination() {
        let schema = MemorySchema::filled(25);
        let plan = CleanupPlan {
            steps: Table::DELETION_ORDER
                .iter()
                .map(|table| CleanupStep {
                    table: *table,
                    options: PurgeOptions::by_id()
                        .small_threshold(10)
                        .page_size(7)
                        .delete_chunk_size(3),
                })
                .collect(),
        };
        let report = plan.run(&schema).await.unwrap();

        assert_eq!(schema.remaining(), 0);
        assert!(report.outcomes.iter().all(|(_, o)| matches!(o, PurgeOutcome::Paged(_))));
        assert_eq!(report.total_deleted(), 25 * 9);
    }

    #[tokio::test]
    async fn sweep_removes_everything() {
        let schema = MemorySchema::filled(4);
        assert_eq!(sweep_all(&schema).await, 36);
        assert_eq!(schema.remaining(), 0);
    }
}
