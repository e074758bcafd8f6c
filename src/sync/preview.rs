//! Read-only preview of every active location, fetched in concurrent batches.

use futures::future::join_all;
use log::{info, warn};

use super::conflicts::detect_conflicts;
use super::fetch::{fetch_location, LocationData};
use super::master::resolve_locations;
use super::progress::{ProgressReporter, ProgressSender, SyncStage};
use super::{DataType, EntityCounts, LocationPreview, PreviewRequest, PreviewResult, SyncError, SyncService};
use crate::constants::{LOG_PREVIEW_STARTED, PREVIEW_SAMPLE_SIZE};

impl LocationPreview {
    fn from_data(data: LocationData) -> Self {
        Self {
            sheet_id: data.location.sheet_id.clone(),
            display_name: data.location.display_name(),
            counts: EntityCounts {
                saints: data.saints.len(),
                historical: data.historical.len(),
                milestones: data.milestones.len(),
            },
            sample_saints: data.saints.into_iter().take(PREVIEW_SAMPLE_SIZE).collect(),
            errors: data.errors,
        }
    }
}

impl SyncService {
    /// Reads every eligible location without writing anything.
    ///
    /// Locations are fetched in batches of `preview_batch_size`; the fetches of
    /// one batch run concurrently and all of them settle before the next batch
    /// starts. A failing location is reported in its preview and does not stop
    /// the others.
    ///
    /// # Errors
    /// Returns an error for invalid requests and when the master sheet cannot
    /// be read.
    pub async fn preview(
        &self,
        request: &PreviewRequest,
        progress: Option<ProgressSender>,
    ) -> Result<PreviewResult, SyncError> {
        request.validate()?;
        info!("{} for spreadsheet {}", LOG_PREVIEW_STARTED, request.spreadsheet_id);

        let mut reporter = ProgressReporter::new(progress);
        let mut result = PreviewResult::default();

        reporter.update(SyncStage::ReadingMaster, 0, 0, None);
        let client = self.preview_client().await?;
        let locations: Vec<_> = resolve_locations(&client, &request.spreadsheet_id)
            .await?
            .into_iter()
            .filter(|location| location.is_eligible())
            .collect();
        let total = locations.len();
        let batch_size = self.config.preview_batch_size.max(1);
        let require_keys = self.config.require_business_keys;

        let mut fetched: Vec<LocationData> = Vec::with_capacity(total);
        for (batch_index, batch) in locations.chunks(batch_size).enumerate() {
            reporter.update(
                SyncStage::Fetching,
                batch_index * batch_size,
                total,
                batch.first().map(|location| location.display_name()).as_deref(),
            );

            let outcomes = join_all(
                batch
                    .iter()
                    .map(|location| fetch_location(&client, location, &DataType::ALL, require_keys)),
            )
            .await;

            for (location, outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    Ok(data) => fetched.push(data),
                    Err(err) => {
                        warn!("⚠️  Preview of {} failed: {}", location.display_name(), err);
                        result.locations.push(LocationPreview {
                            sheet_id: location.sheet_id.clone(),
                            display_name: location.display_name(),
                            errors: vec![err.to_string()],
                            ..LocationPreview::default()
                        });
                        result.errors.push(format!("{}: {}", location.display_name(), err));
                    }
                }
            }
        }

        reporter.update(SyncStage::CheckingConflicts, total, total, None);
        let names: Vec<String> = fetched.iter().map(LocationData::display_name).collect();
        result.conflicts = detect_conflicts(
            names
                .iter()
                .map(String::as_str)
                .zip(fetched.iter().map(|data| data.saints.as_slice())),
        )
        .iter()
        .map(ToString::to_string)
        .collect();

        for data in fetched {
            let preview = LocationPreview::from_data(data);
            result.totals.add(&preview.counts);
            result.errors.extend(preview.errors.iter().cloned());
            result.locations.push(preview);
        }

        // Failed locations were pushed first; restore master-sheet order
        result.locations.sort_by_key(|preview| {
            locations
                .iter()
                .position(|location| location.sheet_id == preview.sheet_id)
                .unwrap_or(usize::MAX)
        });

        result.success = true;
        result.message = format!(
            "Found {} saints, {} historical records and {} milestones across {} location(s)",
            result.totals.saints,
            result.totals.historical,
            result.totals.milestones,
            total
        );
        result.progress = reporter.finish(total);
        Ok(result)
    }
}
