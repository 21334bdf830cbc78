//! Change-notice handling and scoped reloads.

use futures::future::join_all;

use super::{PlannerController, WatchTarget};
use crate::{
    error::Result,
    host::PlannerHost,
    models::{ObjectId, ResourceRow},
};

/// Outcome of re-fetching one resource during a scoped reload.
#[derive(Debug)]
enum Refetched {
    Row(ResourceRow),
    Gone,
    Failed(String),
}

/// Rows re-fetched for a set of resources, waiting to be applied.
///
/// Produced by [`PlannerController::prepare_scoped_reload`]. Applying it
/// after a full load started is a no-op.
#[derive(Debug)]
pub struct ScopedReload {
    generation: u64,
    outcomes: Vec<(ObjectId, Refetched)>,
}

impl ScopedReload {
    /// Resources the reload covers.
    pub fn targets(&self) -> impl Iterator<Item = &ObjectId> {
        self.outcomes.iter().map(|(id, _)| id)
    }

    /// Load generation the reload was prepared in.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl<H: PlannerHost> PlannerController<H> {
    /// Handles every notice queued so far, one identity at a time.
    ///
    /// Duplicate notices within the batch are collapsed. Returns the number
    /// of distinct identities handled.
    pub async fn process_pending(&mut self) -> usize {
        let mut batch: Vec<ObjectId> = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            if !batch.contains(&notice.identity) {
                batch.push(notice.identity);
            }
        }
        for identity in &batch {
            self.handle_notice(identity).await;
        }
        batch.len()
    }

    /// Waits for the next notice and handles it.
    ///
    /// The controller keeps a sender of its own, so this waits until a
    /// notice arrives; use it as the body of the controller's event loop.
    pub async fn process_next(&mut self) -> Option<ObjectId> {
        let notice = self.notices.recv().await?;
        self.handle_notice(&notice.identity).await;
        Some(notice.identity)
    }

    /// Reacts to a change of a watched identity.
    ///
    /// Notices for identities that are no longer watched are ignored.
    pub async fn handle_notice(&mut self, identity: &ObjectId) {
        let Some(target) = self.subscriptions.begin_reconcile(identity) else {
            log::debug!("handle_notice: {identity} is not watched, ignoring");
            return;
        };
        log::debug!("handle_notice: {identity} ({target:?})");

        match target {
            WatchTarget::Context => self.handle_context_notice(identity).await,
            WatchTarget::Resource => {
                self.reload_resources(vec![identity.clone()]).await;
                self.subscriptions.finish_reconcile(identity);
            }
            WatchTarget::Entry { row } => self.handle_entry_notice(identity, row).await,
        }
    }

    async fn handle_context_notice(&mut self, identity: &ObjectId) {
        match self.host.fetch_context(identity).await {
            Ok(Some(context)) => self.load(Some(context)).await,
            Ok(None) => {
                self.messages
                    .push_warning(format!("The planner context {identity} no longer exists"));
                self.subscriptions.drop_watch(identity);
            }
            Err(e) => {
                self.messages
                    .push_warning(format!("An error occurred while handling the context: {e}"));
                self.subscriptions.drop_watch(identity);
            }
        }
    }

    async fn handle_entry_notice(&mut self, identity: &ObjectId, row: ObjectId) {
        // The watched row may be out of date if another row was refreshed
        // first, so every row still holding the entry is refreshed.
        let mut targets = vec![row];
        for holder in self.rows.rows_holding_entry(identity) {
            if !targets.contains(&holder.identity) {
                targets.push(holder.identity.clone());
            }
        }

        match self.host.fetch_entry_by_id(identity).await {
            Ok(Some(entry)) => {
                let owner = self
                    .host
                    .reference(&entry, &self.config.entries.owner_reference);
                // An entry moved to another row in view refreshes that row too.
                if let Some(owner) = owner {
                    if !targets.contains(&owner) && self.rows.contains(&owner) {
                        targets.push(owner);
                    }
                }
            }
            // Deleted: the cell stays until its row is refreshed.
            Ok(None) => {
                log::debug!("handle_entry_notice: {identity} is gone");
                self.subscriptions.drop_watch(identity);
                return;
            }
            Err(e) => {
                self.messages
                    .push_warning(format!("An error occurred while handling entry {identity}: {e}"));
                self.subscriptions.drop_watch(identity);
                return;
            }
        }

        self.reload_resources(targets).await;
        self.subscriptions.finish_reconcile(identity);
    }

    /// Re-fetches the given resources and splices the result into the rows.
    pub async fn reload_resources(&mut self, targets: Vec<ObjectId>) {
        self.is_loading = true;
        let reload = self.prepare_scoped_reload(targets).await;
        self.apply_scoped_reload(reload);
        self.is_loading = false;
    }

    /// Fetches fresh rows for `targets` without touching any state.
    ///
    /// Re-fetches run concurrently; their results are merged independently
    /// of each other.
    pub async fn prepare_scoped_reload(&self, targets: Vec<ObjectId>) -> ScopedReload {
        let fetched = join_all(
            targets
                .iter()
                .map(|id| self.host.fetch_resource_by_id(id)),
        )
        .await;

        let mut outcomes = Vec::with_capacity(targets.len());
        let mut found = Vec::new();
        for (id, result) in targets.into_iter().zip(fetched) {
            match result {
                Ok(Some(handle)) => found.push((id, handle)),
                Ok(None) => outcomes.push((id, Refetched::Gone)),
                Err(e) => outcomes.push((id, Refetched::Failed(e.to_string()))),
            }
        }

        let handles: Vec<H::Handle> = found.iter().map(|(_, h)| h.clone()).collect();
        match self.refreshed_rows(&handles).await {
            Ok(rows) => outcomes.extend(
                rows.into_iter()
                    .map(|row| (row.identity.clone(), Refetched::Row(row))),
            ),
            Err(e) => {
                let reason = e.to_string();
                outcomes.extend(
                    found
                        .into_iter()
                        .map(|(id, _)| (id, Refetched::Failed(reason.clone()))),
                );
            }
        }

        ScopedReload {
            generation: self.generation,
            outcomes,
        }
    }

    async fn refreshed_rows(&self, handles: &[H::Handle]) -> Result<Vec<ResourceRow>> {
        let rows = self.build_rows(handles).await?;
        self.fill_entries(handles, rows).await
    }

    /// Applies a prepared reload.
    ///
    /// Returns `false` when the reload is stale because a full load started
    /// after it was prepared. Refreshed rows replace their predecessors in
    /// place; rows of resources that are gone are removed; failures keep the
    /// existing row and drop its watch.
    pub fn apply_scoped_reload(&mut self, reload: ScopedReload) -> bool {
        if reload.generation != self.generation {
            log::debug!(
                "apply_scoped_reload: dropping stale reload from generation {}",
                reload.generation
            );
            return false;
        }

        let mut updated = Vec::new();
        let mut removed = false;
        let mut failed = Vec::new();
        for (id, outcome) in reload.outcomes {
            match outcome {
                Refetched::Row(row) => updated.push(row),
                Refetched::Gone => {
                    log::debug!("apply_scoped_reload: resource {id} is gone");
                    removed |= self.rows.remove_by_identity(&id).is_some();
                }
                Refetched::Failed(reason) => {
                    self.messages.push_warning(format!(
                        "An error occurred while reloading resource {id}: {reason}"
                    ));
                    failed.push(id);
                }
            }
        }

        self.rows.splice_replace(updated.clone());

        if removed {
            let context = self.context_identity();
            self.subscriptions.rearm(context.as_ref(), self.rows.rows());
        } else {
            let current: Vec<ResourceRow> = updated
                .iter()
                .filter_map(|row| self.rows.get(&row.identity).cloned())
                .collect();
            self.subscriptions.rearm_rows(&current);
        }
        for id in &failed {
            self.subscriptions.drop_watch(id);
        }

        true
    }
}
