//! Click handling for the PlannerController.

use super::PlannerController;
use crate::{
    calendar::DateKey,
    config::{ActionSpec, ClickKind},
    host::{ActionContext, PlannerHost},
    models::ObjectId,
};

impl<H: PlannerHost> PlannerController<H> {
    /// Runs the resource click action for the row of `resource`.
    ///
    /// Returns whether an action ran. Clicks that do not match the
    /// configured trigger do nothing.
    pub async fn on_click_resource(&mut self, resource: &ObjectId, click: ClickKind) -> bool {
        let Some(action) = self.config.events.resource.action_for(click).cloned() else {
            return false;
        };

        let handle = match self.host.fetch_resource_by_id(resource).await {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                log::debug!("on_click_resource: {resource} is gone");
                return false;
            }
            Err(e) => {
                self.messages
                    .push_warning(format!("An error occurred while handling resource {resource}: {e}"));
                return false;
            }
        };

        self.run_click_action(&action, ActionContext::Object(&handle))
            .await
    }

    /// Runs the entry click action for `entry`. Missing entries are ignored.
    pub async fn on_click_entry(&mut self, entry: &ObjectId, click: ClickKind) -> bool {
        let Some(action) = self.config.events.entry.action_for(click).cloned() else {
            return false;
        };

        let handle = match self.host.fetch_entry_by_id(entry).await {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                log::debug!("on_click_entry: {entry} is gone");
                return false;
            }
            Err(e) => {
                self.messages
                    .push_warning(format!("An error occurred while handling entry {entry}: {e}"));
                return false;
            }
        };

        self.run_click_action(&action, ActionContext::Object(&handle))
            .await
    }

    /// Runs the empty-cell action with the row's resource and the clicked
    /// day as context.
    pub async fn on_click_empty(
        &mut self,
        resource: &ObjectId,
        date_key: &DateKey,
        click: ClickKind,
    ) -> bool {
        let Some(action) = self.config.events.empty.action_for(click).cloned() else {
            return false;
        };

        let day = match date_key.decode() {
            Ok(day) => day,
            Err(e) => {
                self.messages.push_warning(e.to_string());
                return false;
            }
        };

        let handle = match self.host.fetch_resource_by_id(resource).await {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                log::debug!("on_click_empty: {resource} is gone");
                return false;
            }
            Err(e) => {
                self.messages
                    .push_warning(format!("An error occurred while handling resource {resource}: {e}"));
                return false;
            }
        };

        self.run_click_action(
            &action,
            ActionContext::Cell {
                resource: &handle,
                day,
            },
        )
        .await
    }

    async fn run_click_action(
        &mut self,
        action: &ActionSpec,
        context: ActionContext<'_, H::Handle>,
    ) -> bool {
        log::debug!("run_click_action: {}", action.name());
        match self.host.run(action, context).await {
            Ok(_) => true,
            Err(e) => {
                self.messages.push_warning(e.to_string());
                false
            }
        }
    }
}
