//! Import of location spreadsheets into the database, one transaction per location.

use anyhow::{Context, Result};
use log::{error, info, warn};
use sea_orm::{ActiveValue, ConnectionTrait, IntoActiveModel, TransactionTrait};
use uuid::Uuid;

use super::conflicts::detect_conflicts;
use super::fetch::{fetch_location, LocationData};
use super::master::resolve_locations;
use super::progress::{ProgressReporter, ProgressSender, SyncStage};
use super::{
    select_locations, ConflictResolution, DataType, EntityCounts, ImportRequest, ImportResult, MilestoneRecord,
    SaintRecord, SaintYearRecord, SyncError, SyncService,
};
use crate::constants::{EVENT_TYPE_FEAST, LOG_IMPORT_STARTED, TAB_HISTORICAL, TAB_MILESTONES, TAB_SAINTS};
use crate::entities::{event, milestone, saint, saint_year};
use crate::repositories::{
    EventRepository, LocationRepository, MilestoneRepository, SaintRepository, SaintYearRepository,
};
use crate::utils::datetime::parse_month_day;

/// Counters and row errors of one committed location.
#[derive(Debug, Default)]
struct LocationOutcome {
    processed: EntityCounts,
    updated: EntityCounts,
    added: EntityCounts,
    errors: Vec<String>,
}

impl LocationOutcome {
    fn record(&mut self, data_type: DataType, write: Write) {
        self.processed.bump(data_type);
        match write {
            Write::Added => self.added.bump(data_type),
            Write::Updated => self.updated.bump(data_type),
            Write::Untouched => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Write {
    Added,
    Updated,
    Untouched,
}

impl SyncService {
    /// Imports the selected location spreadsheets into the database.
    ///
    /// Locations are read from the master sheet, their tabs parsed and checked
    /// for saint number conflicts before anything is written. Each location is
    /// then reconciled inside its own transaction.
    ///
    /// # Returns
    /// An [`ImportResult`] with `success: false` when a conflict blocks a `skip`
    /// import or when no location could be imported.
    ///
    /// # Errors
    /// Returns an error for invalid requests, sheet access or quota failures
    /// and configuration problems.
    pub async fn import(
        &self,
        request: &ImportRequest,
        progress: Option<ProgressSender>,
    ) -> Result<ImportResult, SyncError> {
        request.validate()?;
        info!("{} for spreadsheet {}", LOG_IMPORT_STARTED, request.spreadsheet_id);

        let mut reporter = ProgressReporter::new(progress);
        let mut result = ImportResult::default();

        reporter.update(SyncStage::ReadingMaster, 0, 0, None);
        let client = self.sync_client().await?;
        let all_locations = resolve_locations(&client, &request.spreadsheet_id).await?;
        let locations = select_locations(&all_locations, &request.selected_locations, &mut result.errors);
        let total = locations.len();

        if locations.is_empty() {
            result.message = "No active locations matched the selection".to_string();
            result.progress = reporter.finish(0);
            return Ok(result);
        }

        let mut fetched = Vec::with_capacity(total);
        for (index, location) in locations.iter().enumerate() {
            let name = location.display_name();
            reporter.update(SyncStage::Fetching, index, total, Some(&name));
            let data = fetch_location(
                &client,
                location,
                &request.selected_data_types,
                self.config.require_business_keys,
            )
            .await?;
            result.errors.extend(data.errors.iter().cloned());
            fetched.push(data);
        }

        reporter.update(SyncStage::CheckingConflicts, 0, total, None);
        let names: Vec<String> = fetched.iter().map(LocationData::display_name).collect();
        let conflicts = detect_conflicts(
            names
                .iter()
                .map(String::as_str)
                .zip(fetched.iter().map(|data| data.saints.as_slice())),
        );
        result.conflicts = conflicts.iter().map(ToString::to_string).collect();

        if !conflicts.is_empty() && request.conflict_resolution == ConflictResolution::Skip {
            warn!("⚠️  {} saint number conflicts, import aborted", conflicts.len());
            result.message = format!(
                "Import aborted: {} saint number conflict(s) found. Fix the sheets or import with overwrite or merge",
                conflicts.len()
            );
            result.progress = reporter.finish(0);
            return Ok(result);
        }

        let mut failed = 0;
        for (index, data) in fetched.iter().enumerate() {
            let name = data.display_name();
            reporter.update(SyncStage::Importing, index, total, Some(&name));

            match self.import_location(data, request.conflict_resolution).await {
                Ok(outcome) => {
                    info!(
                        "✅ Imported {}: {} saints, {} historical, {} milestones",
                        name, outcome.processed.saints, outcome.processed.historical, outcome.processed.milestones
                    );
                    result.records_processed.add(&outcome.processed);
                    result.records_updated.add(&outcome.updated);
                    result.records_added.add(&outcome.added);
                    result.errors.extend(outcome.errors);
                }
                Err(err) => {
                    error!("❌ Import of {} rolled back: {}", name, describe_error(&err));
                    failed += 1;
                    result
                        .errors
                        .push(format!("{}: import failed and was rolled back: {}", name, describe_error(&err)));
                }
            }
        }

        result.success = failed < total;
        result.message = if result.success {
            format!(
                "Imported {} saints, {} historical records and {} milestones from {} location(s)",
                result.records_processed.saints,
                result.records_processed.historical,
                result.records_processed.milestones,
                total - failed
            )
        } else {
            "Import failed for every selected location".to_string()
        };
        result.progress = reporter.finish(total);
        Ok(result)
    }

    /// Reconcile one location inside a single transaction.
    async fn import_location(&self, data: &LocationData, policy: ConflictResolution) -> Result<LocationOutcome> {
        let txn = self
            .storage
            .conn
            .begin()
            .await
            .context("Failed to start transaction")?;

        match self.apply_location(&txn, data, policy).await {
            Ok(outcome) => {
                txn.commit().await.context("Failed to commit transaction")?;
                Ok(outcome)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    error!("❌ Rollback failed: {}", rollback_err);
                }
                Err(err)
            }
        }
    }

    async fn apply_location<C>(&self, conn: &C, data: &LocationData, policy: ConflictResolution) -> Result<LocationOutcome>
    where
        C: ConnectionTrait,
    {
        let location = &data.location;
        let name = location.display_name();
        let mut outcome = LocationOutcome::default();

        // A failed location upsert aborts the whole location
        LocationRepository::upsert(conn, location)
            .await
            .with_context(|| format!("Failed to save location {}", location.sheet_id))?;

        for record in &data.saints {
            match upsert_saint(conn, record, &location.sheet_id, policy).await {
                Ok((write, saint)) => {
                    outcome.record(DataType::Saints, write);
                    if let Some(saint) = saint {
                        if let Err(err) = ensure_feast_event(conn, &saint).await {
                            outcome.errors.push(format!(
                                "{} / {}: Row {}: feast event not created: {}",
                                name, TAB_SAINTS, record.row, describe_error(&err)
                            ));
                        }
                    }
                }
                Err(err) => outcome
                    .errors
                    .push(format!("{} / {}: Row {}: {}", name, TAB_SAINTS, record.row, describe_error(&err))),
            }
        }

        for record in &data.historical {
            let saint = match self.resolve_historical_saint(conn, record).await {
                Ok(Some(saint)) => saint,
                Ok(None) => {
                    outcome.errors.push(format!(
                        "{} / {}: Row {}: no saint found for {}",
                        name,
                        TAB_HISTORICAL,
                        record.row,
                        describe_key(record.saint_number.as_deref(), "year", record.year)
                    ));
                    continue;
                }
                Err(err) => {
                    outcome
                        .errors
                        .push(format!("{} / {}: Row {}: {}", name, TAB_HISTORICAL, record.row, describe_error(&err)));
                    continue;
                }
            };

            match upsert_saint_year(conn, saint.id, record, policy).await {
                Ok(write) => outcome.record(DataType::Historical, write),
                Err(err) => outcome
                    .errors
                    .push(format!("{} / {}: Row {}: {}", name, TAB_HISTORICAL, record.row, describe_error(&err))),
            }
        }

        for record in &data.milestones {
            let saint = match self.resolve_milestone_saint(conn, record, &location.sheet_id).await {
                Ok(Some(saint)) => saint,
                Ok(None) => {
                    outcome.errors.push(format!(
                        "{} / {}: Row {}: no saint found for {}",
                        name,
                        TAB_MILESTONES,
                        record.row,
                        describe_key(record.saint_number.as_deref(), "count", record.count)
                    ));
                    continue;
                }
                Err(err) => {
                    outcome
                        .errors
                        .push(format!("{} / {}: Row {}: {}", name, TAB_MILESTONES, record.row, describe_error(&err)));
                    continue;
                }
            };

            match upsert_milestone(conn, saint.id, record, policy).await {
                Ok(write) => outcome.record(DataType::Milestones, write),
                Err(err) => outcome
                    .errors
                    .push(format!("{} / {}: Row {}: {}", name, TAB_MILESTONES, record.row, describe_error(&err))),
            }
        }

        Ok(outcome)
    }

    /// Find the saint a historical row belongs to.
    ///
    /// Without a saint number, and only when business keys are optional, the
    /// first saint with a matching saint year is used.
    async fn resolve_historical_saint<C>(&self, conn: &C, record: &SaintYearRecord) -> Result<Option<saint::Model>>
    where
        C: ConnectionTrait,
    {
        match &record.saint_number {
            Some(number) => SaintRepository::get_by_number(conn, number).await,
            None if !self.config.require_business_keys => SaintRepository::first_for_year(conn, record.year).await,
            None => Ok(None),
        }
    }

    /// Find the saint a milestone row belongs to.
    ///
    /// Without a saint number, and only when business keys are optional, the
    /// first saint of the location with at least `count` total beers is used.
    async fn resolve_milestone_saint<C>(
        &self,
        conn: &C,
        record: &MilestoneRecord,
        location_id: &str,
    ) -> Result<Option<saint::Model>>
    where
        C: ConnectionTrait,
    {
        match &record.saint_number {
            Some(number) => SaintRepository::get_by_number(conn, number).await,
            None if !self.config.require_business_keys => {
                SaintRepository::first_with_total_beers(conn, location_id, record.count).await
            }
            None => Ok(None),
        }
    }
}

fn describe_key(saint_number: Option<&str>, fallback_name: &str, fallback_value: i32) -> String {
    match saint_number {
        Some(number) => format!("saint number {}", number),
        None => format!("{} {}", fallback_name, fallback_value),
    }
}

/// Outer context followed by the root cause, each printed once.
fn describe_error(err: &anyhow::Error) -> String {
    let outer = err.to_string();
    let root = err.root_cause().to_string();
    if outer.contains(&root) {
        outer
    } else {
        format!("{}: {}", outer, root)
    }
}

/// Insert or update a saint keyed by saint number.
///
/// Returns the stored saint unless the policy left it untouched.
async fn upsert_saint<C>(
    conn: &C,
    record: &SaintRecord,
    location_id: &str,
    policy: ConflictResolution,
) -> Result<(Write, Option<saint::Model>)>
where
    C: ConnectionTrait,
{
    let Some(existing) = SaintRepository::get_by_number(conn, &record.saint_number).await? else {
        let model = saint::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            saint_number: ActiveValue::Set(record.saint_number.clone()),
            name: ActiveValue::Set(record.name.clone()),
            saint_name: ActiveValue::Set(record.saint_name.clone()),
            saint_date: ActiveValue::Set(record.saint_date.clone()),
            saint_year: ActiveValue::Set(record.saint_year),
            total_beers: ActiveValue::Set(record.total_beers.unwrap_or(0)),
            location_id: ActiveValue::Set(Some(location_id.to_string())),
        };
        let saint = SaintRepository::insert(conn, model).await?;
        return Ok((Write::Added, Some(saint)));
    };

    let (owner, total_beers) = match policy {
        ConflictResolution::Skip => return Ok((Write::Untouched, None)),
        ConflictResolution::Overwrite => (Some(location_id.to_string()), record.total_beers.unwrap_or(0)),
        ConflictResolution::Merge => (
            existing.location_id.clone().or_else(|| Some(location_id.to_string())),
            record.total_beers.unwrap_or(existing.total_beers),
        ),
    };

    let mut model = existing.into_active_model();
    model.name = ActiveValue::Set(record.name.clone());
    model.saint_name = ActiveValue::Set(record.saint_name.clone());
    model.saint_date = ActiveValue::Set(record.saint_date.clone());
    model.saint_year = ActiveValue::Set(record.saint_year);
    model.total_beers = ActiveValue::Set(total_beers);
    model.location_id = ActiveValue::Set(owner);

    let saint = SaintRepository::update(conn, model).await?;
    Ok((Write::Updated, Some(saint)))
}

/// Create the saint's feast day event unless it already exists.
async fn ensure_feast_event<C>(conn: &C, saint: &saint::Model) -> Result<()>
where
    C: ConnectionTrait,
{
    let (month, day) = parse_month_day(&saint.saint_date)
        .with_context(|| format!("saint date '{}' has no month and day", saint.saint_date))?;
    let (month, day) = (month as i32, day as i32);

    if EventRepository::exists(conn, saint.id, month, day, EVENT_TYPE_FEAST).await? {
        return Ok(());
    }

    let title = if saint.saint_name.is_empty() {
        format!("{} Feast Day", saint.name)
    } else {
        format!("{} Feast Day", saint.saint_name)
    };

    EventRepository::insert(
        conn,
        event::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            saint_id: ActiveValue::Set(saint.id),
            location_id: ActiveValue::Set(saint.location_id.clone()),
            title: ActiveValue::Set(title),
            month: ActiveValue::Set(month),
            day: ActiveValue::Set(day),
            event_type: ActiveValue::Set(EVENT_TYPE_FEAST.to_string()),
        },
    )
    .await?;
    Ok(())
}

/// Append the items of `incoming` that `existing` does not already contain.
fn union_lists(existing: Vec<String>, incoming: &[String]) -> Vec<String> {
    let mut merged = existing;
    for item in incoming {
        if !merged.contains(item) {
            merged.push(item.clone());
        }
    }
    merged
}

/// Insert or update the `(saint, year)` historical row.
///
/// Existing rows are always updated, whatever the saint policy.
async fn upsert_saint_year<C>(
    conn: &C,
    saint_id: Uuid,
    record: &SaintYearRecord,
    policy: ConflictResolution,
) -> Result<Write>
where
    C: ConnectionTrait,
{
    let Some(existing) = SaintYearRepository::get_by_key(conn, saint_id, record.year).await? else {
        let model = saint_year::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            saint_id: ActiveValue::Set(saint_id),
            year: ActiveValue::Set(record.year),
            burger: ActiveValue::Set(record.burger.clone()),
            tap_beers: ActiveValue::Set(serde_json::to_string(&record.tap_beers)?),
            can_bottle_beers: ActiveValue::Set(serde_json::to_string(&record.can_bottle_beers)?),
            facebook_event: ActiveValue::Set(record.facebook_event.clone()),
            sticker: ActiveValue::Set(record.sticker.clone()),
        };
        SaintYearRepository::insert(conn, model).await?;
        return Ok(Write::Added);
    };

    let (burger, tap_beers, can_bottle_beers, facebook_event, sticker) = if policy == ConflictResolution::Merge {
        (
            if record.burger.is_empty() {
                existing.burger.clone()
            } else {
                record.burger.clone()
            },
            union_lists(existing.tap_beer_list(), &record.tap_beers),
            union_lists(existing.can_bottle_beer_list(), &record.can_bottle_beers),
            record.facebook_event.clone().or_else(|| existing.facebook_event.clone()),
            record.sticker.clone().or_else(|| existing.sticker.clone()),
        )
    } else {
        (
            record.burger.clone(),
            record.tap_beers.clone(),
            record.can_bottle_beers.clone(),
            record.facebook_event.clone(),
            record.sticker.clone(),
        )
    };

    let mut model = existing.into_active_model();
    model.burger = ActiveValue::Set(burger);
    model.tap_beers = ActiveValue::Set(serde_json::to_string(&tap_beers)?);
    model.can_bottle_beers = ActiveValue::Set(serde_json::to_string(&can_bottle_beers)?);
    model.facebook_event = ActiveValue::Set(facebook_event);
    model.sticker = ActiveValue::Set(sticker);
    SaintYearRepository::update(conn, model).await?;
    Ok(Write::Updated)
}

/// Insert a milestone, or update the one with the same saint, count and date.
async fn upsert_milestone<C>(
    conn: &C,
    saint_id: Uuid,
    record: &MilestoneRecord,
    policy: ConflictResolution,
) -> Result<Write>
where
    C: ConnectionTrait,
{
    let Some(existing) = MilestoneRepository::get_by_key(conn, saint_id, record.count, &record.date).await? else {
        let model = milestone::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            saint_id: ActiveValue::Set(saint_id),
            count: ActiveValue::Set(record.count),
            date: ActiveValue::Set(record.date.clone()),
            sticker: ActiveValue::Set(record.sticker.clone()),
        };
        MilestoneRepository::insert(conn, model).await?;
        return Ok(Write::Added);
    };

    let sticker = match policy {
        ConflictResolution::Merge => record.sticker.clone().or_else(|| existing.sticker.clone()),
        _ => record.sticker.clone(),
    };
    if sticker == existing.sticker {
        return Ok(Write::Untouched);
    }

    let mut model = existing.into_active_model();
    model.sticker = ActiveValue::Set(sticker);
    MilestoneRepository::update(conn, model).await?;
    Ok(Write::Updated)
}
