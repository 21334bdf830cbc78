//! Full load pipeline for the PlannerController.

use futures::future::join_all;
use serde_json::json;

use super::{reconcile, PlannerController, PlannerState};
use crate::{
    calendar::{build_month, target_month_range},
    config::{EntrySource, ResourceSource, TitleSource, CURRENT_OBJECT_TOKEN},
    error::Result,
    host::{ActionContext, FilterContext, PlannerHost},
    models::{DayDescriptor, EntryRecord, ResourceRow, DEFAULT_ENTRY_CONTENT},
};

impl<H: PlannerHost> PlannerController<H> {
    /// Loads the planner for `context` from scratch.
    ///
    /// The grid month and year are read from the context. Any previous
    /// watches are cancelled and any scoped reload prepared before this call
    /// becomes stale. Failures are reported as warnings and leave the
    /// previous rows in place; this method never fails.
    pub async fn load(&mut self, context: Option<H::Handle>) {
        self.generation += 1;
        self.subscriptions.teardown();
        self.context = context;
        self.is_loading = true;

        self.days = self.build_days();
        self.state = PlannerState::GridBuilt;
        log::debug!(
            "load #{}: grid of {} day(s)",
            self.generation,
            self.days.len()
        );

        if self.messages.has_fatal() {
            log::debug!("load: fatal configuration problems, skipping fetch");
            self.rows.replace_all(Vec::new());
            self.finish_load();
            return;
        }

        let Some(context) = self.context.clone() else {
            log::debug!("load: no context");
            self.rows.replace_all(Vec::new());
            self.finish_load();
            return;
        };

        self.state = PlannerState::ResourcesLoading;
        let loaded = match self.fetch_resource_handles(&context).await {
            Ok(handles) => match self.build_rows(&handles).await {
                Ok(rows) => Some((handles, rows)),
                Err(e) => {
                    self.messages
                        .push_warning(format!("An error occurred while handling resources: {e}"));
                    None
                }
            },
            Err(e) => {
                self.messages
                    .push_warning(format!("An error occurred while retrieving resources: {e}"));
                None
            }
        };
        let Some((handles, rows)) = loaded else {
            self.finish_load();
            return;
        };
        self.state = PlannerState::ResourcesLoaded;
        log::debug!("load: {} resource(s)", rows.len());

        self.state = PlannerState::EntriesLoading;
        match self.fill_entries(&handles, rows).await {
            Ok(rows) => self.rows.replace_all(rows),
            Err(e) => self
                .messages
                .push_warning(format!("An error occurred while handling entries: {e}")),
        }

        self.finish_load();
    }

    /// Reloads for the current context.
    pub async fn reload(&mut self) {
        let context = self.context.clone();
        self.load(context).await;
    }

    fn finish_load(&mut self) {
        let context = self.context_identity();
        self.subscriptions.arm(context.as_ref(), self.rows.rows());
        self.state = PlannerState::Ready;
        self.is_loading = false;
        log::info!(
            "Planner ready: {} row(s), {} watch(es)",
            self.rows.len(),
            self.subscriptions.len()
        );
    }

    /// Day grid for the month and year held by the context object.
    fn build_days(&self) -> Vec<DayDescriptor> {
        let Some(context) = self.context.as_ref() else {
            return Vec::new();
        };
        let view = &self.config.view;
        let number = |attribute: &str| {
            self.host
                .field(context, attribute)
                .and_then(|value| value.as_integer())
                .and_then(|n| i32::try_from(n).ok())
        };

        match (number(&view.year_attribute), number(&view.month_attribute)) {
            (Some(year), Some(month)) => build_month(month, year, view.grid, self.today()),
            _ => {
                log::debug!("build_days: context has no usable year/month");
                Vec::new()
            }
        }
    }

    async fn fetch_resource_handles(&self, context: &H::Handle) -> Result<Vec<H::Handle>> {
        match &self.config.resources.source {
            ResourceSource::Query { entity, constraint } => {
                let identity = self.host.identity(context);
                let filter = FilterContext {
                    entity: entity.clone(),
                    constraint: constraint
                        .as_ref()
                        .map(|c| c.replace(CURRENT_OBJECT_TOKEN, identity.as_str())),
                    context: Some(identity),
                };
                self.host.fetch_resources(&filter).await
            }
            ResourceSource::Action { action } => self
                .host
                .run(action, ActionContext::Object(context))
                .await?
                .into_objects(action),
        }
    }

    /// Rows without cells for the given resources, in the given order.
    pub(crate) async fn build_rows(&self, handles: &[H::Handle]) -> Result<Vec<ResourceRow>> {
        join_all(handles.iter().map(|handle| self.resource_row(handle)))
            .await
            .into_iter()
            .collect()
    }

    async fn resource_row(&self, handle: &H::Handle) -> Result<ResourceRow> {
        let label = self.render_title(&self.config.resources.title, handle).await?;
        Ok(ResourceRow::new(self.host.identity(handle), label))
    }

    /// Fetches the entries of `handles` for the target month and merges them
    /// into `rows`.
    pub(crate) async fn fill_entries(
        &self,
        handles: &[H::Handle],
        rows: Vec<ResourceRow>,
    ) -> Result<Vec<ResourceRow>> {
        let Some(range) = target_month_range(&self.days) else {
            return Ok(rows);
        };
        if handles.is_empty() {
            return Ok(rows);
        }

        let entries = match &self.config.entries.source {
            EntrySource::Query => self.host.fetch_entries(handles, range).await?,
            EntrySource::Action { action } => self
                .host
                .run(
                    action,
                    ActionContext::Entries {
                        resources: handles,
                        range,
                    },
                )
                .await?
                .into_objects(action)?,
        };
        let records: Vec<EntryRecord> =
            join_all(entries.iter().map(|entry| self.entry_record(entry)))
                .await
                .into_iter()
                .collect::<Result<_>>()?;
        log::debug!("fill_entries: {} entry record(s)", records.len());

        Ok(reconcile::apply(rows, &records))
    }

    pub(crate) async fn entry_record(&self, handle: &H::Handle) -> Result<EntryRecord> {
        let entries = &self.config.entries;
        let display_content = match &entries.title {
            Some(title) => self.render_title(title, handle).await?,
            None => DEFAULT_ENTRY_CONTENT.to_string(),
        };

        Ok(EntryRecord {
            identity: self.host.identity(handle),
            owner: self.host.reference(handle, &entries.owner_reference),
            occurs_on: self
                .host
                .field(handle, &entries.date_attribute)
                .and_then(|value| value.as_date()),
            display_content,
        })
    }

    async fn render_title(&self, source: &TitleSource, handle: &H::Handle) -> Result<String> {
        let raw = match source {
            TitleSource::Attribute { name } => self
                .host
                .field(handle, name)
                .map(|value| value.to_text())
                .unwrap_or_default(),
            TitleSource::Action { action } => self
                .host
                .run(action, ActionContext::Object(handle))
                .await?
                .into_text(action)?,
        };
        let data = json!({ "identity": self.host.identity(handle).as_str() });
        Ok(self.renderer.render(&raw, &data))
    }
}
