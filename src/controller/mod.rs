//! Headless ticket list controller.
//!
//! Owns the fetched ticket collection and everything derived from it: the
//! filter state, the current page, the open modal and the notice queue.
//! All backend traffic goes through a [`TicketBackend`] and every call is
//! bounded by the configured request timeout, so a hung request always
//! surfaces as [`DeskError::Timeout`] instead of leaving a modal stuck in
//! `Submitting`.

pub mod modal;
pub mod notice;

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::api::{Attachment, NewTicket, TicketBackend, TicketPatch};
use crate::cache::{TicketCache, merge_fields};
use crate::config::{Config, DEFAULT_DEDUP_WINDOW_MS, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT};
use crate::error::{DeskError, Result};
use crate::filter::{FilterState, apply_filters};
use crate::paginate::{Page, paginate};
use crate::types::{
    CallDirection, SetupState, Ticket, TicketId, TicketPriority, TicketStatus, ViewBucket,
};
use crate::url_state::UrlState;
use crate::validation::{FieldErrors, validate_new_ticket, validate_patch};

pub use modal::{Modal, SubmitFlow};
pub use notice::{Notice, NoticeLevel};

/// Tunables for a controller instance.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub page_size: usize,
    /// Non-forced refreshes within this window of the last one are dropped
    pub dedup_window: Duration,
    pub request_timeout: Duration,
    /// Agent id for the "assigned to me" view
    pub current_agent: Option<u64>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            dedup_window: Duration::from_millis(DEFAULT_DEDUP_WINDOW_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT),
            current_agent: None,
        }
    }
}

impl ControllerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_size: config.page_size,
            dedup_window: config.dedup_window(),
            request_timeout: config.request_timeout(),
            current_agent: config.agent_id,
        }
    }
}

/// Result of a refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The collection was replaced
    Updated { total: usize, new_count: usize },
    /// The backend returned exactly what is already held
    Unchanged,
    /// Dropped because another refresh ran within the dedup window
    Deduplicated,
}

/// Result of a successful create or edit submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Saved(Ticket),
    /// Fields were committed but the attachment upload failed
    PartialSuccess { ticket: Ticket, warning: String },
}

impl SubmitOutcome {
    pub fn ticket(&self) -> &Ticket {
        match self {
            SubmitOutcome::Saved(ticket) | SubmitOutcome::PartialSuccess { ticket, .. } => ticket,
        }
    }
}

/// The most recent failed list fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub message: String,
    pub retryable: bool,
}

async fn bounded<T>(timeout: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(DeskError::Timeout(timeout.as_secs())),
    }
}

pub struct TicketListController<B: TicketBackend> {
    backend: B,
    cache: TicketCache,
    filter: FilterState,
    page: usize,
    options: ControllerOptions,
    selected: Option<TicketId>,
    modal: Modal,
    notices: Vec<Notice>,
    last_error: Option<LoadError>,
    last_refresh: Option<Instant>,
    loaded: bool,
}

impl<B: TicketBackend> TicketListController<B> {
    pub fn new(backend: B, options: ControllerOptions) -> Self {
        let filter = FilterState {
            current_agent: options.current_agent,
            ..Default::default()
        };
        Self {
            backend,
            cache: TicketCache::new(),
            filter,
            page: 1,
            options,
            selected: None,
            modal: Modal::Closed,
            notices: Vec::new(),
            last_error: None,
            last_refresh: None,
            loaded: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn tickets(&self) -> &[Ticket] {
        self.cache.as_slice()
    }

    pub fn ticket(&self, id: TicketId) -> Option<&Ticket> {
        self.cache.get(id)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    fn notify(&mut self, notice: Notice) {
        tracing::debug!(level = notice.level.label(), message = %notice.message, "notice");
        self.notices.push(notice);
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Take all pending notices.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn last_error(&self) -> Option<&LoadError> {
        self.last_error.as_ref()
    }

    // ----------------------------------------------------------------------
    // Refresh
    // ----------------------------------------------------------------------

    /// Re-fetch the full collection.
    ///
    /// Without `force`, a call within the dedup window of the previous one
    /// returns [`RefreshOutcome::Deduplicated`] without a request. A failed
    /// fetch keeps the last good collection and records a retryable error.
    pub async fn refresh(&mut self, force: bool) -> Result<RefreshOutcome> {
        if !force
            && let Some(at) = self.last_refresh
            && at.elapsed() < self.options.dedup_window
        {
            tracing::debug!("refresh deduplicated");
            return Ok(RefreshOutcome::Deduplicated);
        }
        self.last_refresh = Some(Instant::now());

        let tickets = match bounded(self.options.request_timeout, self.backend.list_tickets()).await
        {
            Ok(tickets) => tickets,
            Err(e) => {
                tracing::warn!(error = %e, "failed to refresh tickets");
                self.last_error = Some(LoadError {
                    message: e.to_string(),
                    retryable: e.is_retryable(),
                });
                self.notify(Notice::error(format!("Failed to load tickets: {e}")));
                return Err(e);
            }
        };
        self.last_error = None;

        if self.loaded && tickets.as_slice() == self.cache.as_slice() {
            return Ok(RefreshOutcome::Unchanged);
        }

        let previous = self.cache.replace_all(tickets);
        let total = self.cache.len();
        let new_count = if self.loaded {
            total.saturating_sub(previous)
        } else {
            0
        };
        self.loaded = true;

        if new_count > 0 {
            self.notify(Notice::info(notice::new_tickets_message(new_count)));
        }
        tracing::info!(total, new_count, "tickets refreshed");

        Ok(RefreshOutcome::Updated { total, new_count })
    }

    // ----------------------------------------------------------------------
    // Filters and pagination
    // ----------------------------------------------------------------------

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    fn update_filter(&mut self, apply: impl FnOnce(&mut FilterState)) {
        let before = self.filter.clone();
        apply(&mut self.filter);
        if self.filter != before {
            self.page = 1;
        }
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        self.update_filter(|f| f.search = search);
    }

    pub fn set_status(&mut self, status: Option<TicketStatus>) {
        self.update_filter(|f| f.status = status);
    }

    pub fn set_priority(&mut self, priority: Option<TicketPriority>) {
        self.update_filter(|f| f.priority = priority);
    }

    pub fn set_direction(&mut self, direction: Option<CallDirection>) {
        self.update_filter(|f| f.direction = direction);
    }

    pub fn set_campaign(&mut self, campaign_id: Option<u64>) {
        self.update_filter(|f| f.campaign_id = campaign_id);
    }

    pub fn set_yard(&mut self, yard_id: Option<u64>) {
        self.update_filter(|f| f.yard_id = yard_id);
    }

    pub fn set_view(&mut self, view: ViewBucket) {
        self.update_filter(|f| f.view = view);
    }

    pub fn set_customer(&mut self, customer_id: Option<u64>) {
        self.update_filter(|f| f.customer_id = customer_id);
    }

    /// Replace the whole filter state. The current agent is kept.
    pub fn set_filter(&mut self, mut filter: FilterState) {
        filter.current_agent = self.options.current_agent;
        self.update_filter(|f| *f = filter);
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn page_size(&self) -> usize {
        self.options.page_size
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        let page_size = page_size.max(1);
        if page_size != self.options.page_size {
            self.options.page_size = page_size;
            self.page = 1;
        }
    }

    /// The filtered list, before pagination.
    pub fn visible(&self) -> Vec<Ticket> {
        apply_filters(self.cache.as_slice(), &self.filter)
    }

    pub fn current_page(&self) -> Page<Ticket> {
        paginate(&self.visible(), self.page, self.options.page_size)
    }

    // ----------------------------------------------------------------------
    // URL state
    // ----------------------------------------------------------------------

    /// Canonical query string for the current state.
    pub fn url(&self) -> String {
        UrlState::from_filter(&self.filter, self.selected).to_query()
    }

    /// Load state from a query string. Filters not carried by the URL reset;
    /// an `id` parameter opens that ticket.
    pub async fn apply_url(&mut self, query: &str) -> Result<()> {
        let url = UrlState::parse(query);
        let filter = url.to_filter(self.options.current_agent);
        self.update_filter(|f| *f = filter);
        self.page = 1;

        match url.id {
            Some(id) => {
                self.open_ticket(id).await?;
            }
            None => self.close_modal(),
        }
        Ok(())
    }

    /// Leave the list: force-close any modal and reset filters.
    pub fn navigate(&mut self) {
        if self.modal.is_open() {
            tracing::debug!(modal = self.modal.name(), "closing modal on navigation");
        }
        self.close_modal();
        self.set_filter(FilterState::default());
        self.page = 1;
    }

    // ----------------------------------------------------------------------
    // Modals
    // ----------------------------------------------------------------------

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn selected(&self) -> Option<TicketId> {
        self.selected
    }

    pub fn close_modal(&mut self) {
        self.modal = Modal::Closed;
        self.selected = None;
    }

    /// Open a ticket from the list.
    ///
    /// The local copy is used when it already carries call history;
    /// otherwise the single ticket is fetched. Tickets that still need
    /// setup open in the edit flow, the rest in the read-only view.
    pub async fn open_ticket(&mut self, id: TicketId) -> Result<&Modal> {
        self.modal = Modal::LoadingDetail { id };
        self.selected = Some(id);

        let local = self.cache.get(id).cloned();
        let ticket = match local {
            Some(ticket) if ticket.has_call_history() => ticket,
            local => match bounded(self.options.request_timeout, self.backend.get_ticket(id)).await
            {
                Ok(fetched) => {
                    if self.cache.contains(id) {
                        self.cache.upsert(fetched.clone());
                    }
                    fetched
                }
                Err(e) => match local {
                    Some(ticket) => {
                        tracing::warn!(ticket = id, error = %e, "detail fetch failed, showing list copy");
                        ticket
                    }
                    None => {
                        self.close_modal();
                        self.notify(Notice::error(format!("Failed to open ticket #{id}: {e}")));
                        return Err(e);
                    }
                },
            },
        };

        self.modal = match ticket.setup_state() {
            SetupState::NeedsSetup => Modal::Edit {
                ticket,
                errors: FieldErrors::new(),
            },
            SetupState::Ready => Modal::View { ticket },
        };
        Ok(&self.modal)
    }

    /// Switch the open view modal to editing.
    pub fn begin_edit(&mut self) -> Result<()> {
        match std::mem::take(&mut self.modal) {
            Modal::View { ticket } => {
                self.modal = Modal::Edit {
                    ticket,
                    errors: FieldErrors::new(),
                };
                Ok(())
            }
            other => {
                let name = other.name();
                self.modal = other;
                Err(DeskError::Other(format!(
                    "cannot edit from the {name} state; open a ticket first"
                )))
            }
        }
    }

    /// Open an empty create form, replacing any open modal.
    pub fn open_create(&mut self) {
        self.selected = None;
        self.modal = Modal::Create {
            form: NewTicket::default(),
            errors: FieldErrors::new(),
        };
    }

    // ----------------------------------------------------------------------
    // Mutations
    // ----------------------------------------------------------------------

    /// Send a patch and merge the server's response into the local entry.
    ///
    /// Nothing is changed locally until the backend acknowledges. On
    /// failure the collection is untouched and an error notice is raised.
    pub async fn mutate(&mut self, id: TicketId, patch: &TicketPatch) -> Result<Ticket> {
        let result = self.try_mutate(id, patch).await;
        if let Err(e) = &result {
            tracing::warn!(ticket = id, error = %e, "update failed");
            self.notify(Notice::error(format!("Failed to update ticket #{id}: {e}")));
        }
        result
    }

    async fn try_mutate(&mut self, id: TicketId, patch: &TicketPatch) -> Result<Ticket> {
        if patch.is_empty() {
            return Err(DeskError::Other("no changes to save".to_string()));
        }

        let fields = bounded(
            self.options.request_timeout,
            self.backend.update_ticket(id, patch),
        )
        .await?;

        let merged = match self.cache.apply_fields(id, &fields)? {
            Some(ticket) => ticket,
            None => {
                let base = self
                    .modal
                    .ticket()
                    .filter(|t| t.id == id)
                    .cloned()
                    .unwrap_or_else(|| Ticket::new(id));
                merge_fields(&base, &fields)?
            }
        };

        if let Some(shown) = self.modal.ticket_mut()
            && shown.id == id
        {
            *shown = merged.clone();
        }

        tracing::info!(ticket = id, "ticket updated");
        Ok(merged)
    }

    /// Upload attachments for a committed ticket. Failure only warns.
    async fn upload_after(&mut self, ticket: Ticket, files: &[Attachment]) -> SubmitOutcome {
        if files.is_empty() {
            return SubmitOutcome::Saved(ticket);
        }

        let id = ticket.id;
        match bounded(
            self.options.request_timeout,
            self.backend.upload_attachments(id, files),
        )
        .await
        {
            Ok(fields) => {
                let merged = match self.cache.apply_fields(id, &fields) {
                    Ok(Some(merged)) => merged,
                    Ok(None) => merge_fields(&ticket, &fields).unwrap_or(ticket),
                    Err(e) => {
                        tracing::warn!(ticket = id, error = %e, "could not merge upload response");
                        ticket
                    }
                };
                tracing::info!(ticket = id, files = files.len(), "attachments uploaded");
                SubmitOutcome::Saved(merged)
            }
            Err(e) => {
                tracing::warn!(ticket = id, error = %e, "attachment upload failed");
                let warning =
                    format!("Ticket #{id} was saved, but attachments failed to upload: {e}");
                self.notify(Notice::warning(warning.clone()));
                SubmitOutcome::PartialSuccess { ticket, warning }
            }
        }
    }

    /// Submit the open edit modal.
    ///
    /// Field changes are committed first; attachments are uploaded only
    /// after that succeeds. On a field error the modal returns to editing
    /// with the errors attached.
    pub async fn save_edit(
        &mut self,
        patch: TicketPatch,
        attachments: Vec<Attachment>,
    ) -> Result<SubmitOutcome> {
        let Modal::Edit { ticket, .. } = &self.modal else {
            return Err(DeskError::Other("no ticket is open for editing".to_string()));
        };
        let ticket = ticket.clone();

        if patch.is_empty() && attachments.is_empty() {
            return Err(DeskError::Other("no changes to save".to_string()));
        }

        let errors = validate_patch(&ticket, &patch);
        if !errors.is_empty() {
            self.modal = Modal::Edit {
                ticket,
                errors: errors.clone(),
            };
            return Err(DeskError::Validation(errors));
        }

        let id = ticket.id;
        self.modal = Modal::Submitting(SubmitFlow::Edit(ticket));

        let updated = if patch.is_empty() {
            self.modal.ticket().cloned().unwrap_or_else(|| Ticket::new(id))
        } else {
            match self.mutate(id, &patch).await {
                Ok(updated) => updated,
                Err(e) => {
                    let ticket = self
                        .modal
                        .ticket()
                        .cloned()
                        .unwrap_or_else(|| Ticket::new(id));
                    self.modal = Modal::Edit {
                        ticket,
                        errors: e.field_errors().cloned().unwrap_or_default(),
                    };
                    return Err(e);
                }
            }
        };

        let outcome = self.upload_after(updated, &attachments).await;
        self.close_modal();
        if matches!(outcome, SubmitOutcome::Saved(_)) {
            self.notify(Notice::success(format!("Ticket #{id} updated")));
        }
        Ok(outcome)
    }

    /// Create a ticket, then force a full refresh so the server-assigned
    /// fields show up in the list.
    pub async fn create(
        &mut self,
        form: NewTicket,
        attachments: Vec<Attachment>,
    ) -> Result<SubmitOutcome> {
        self.selected = None;

        let errors = validate_new_ticket(&form);
        if !errors.is_empty() {
            self.modal = Modal::Create {
                form,
                errors: errors.clone(),
            };
            return Err(DeskError::Validation(errors));
        }

        self.modal = Modal::Submitting(SubmitFlow::Create(form.clone()));

        let created = match bounded(
            self.options.request_timeout,
            self.backend.create_ticket(&form),
        )
        .await
        {
            Ok(created) => created,
            Err(e) => {
                tracing::warn!(error = %e, "create failed");
                self.notify(Notice::error(format!("Failed to create ticket: {e}")));
                self.modal = Modal::Create {
                    form,
                    errors: e.field_errors().cloned().unwrap_or_default(),
                };
                return Err(e);
            }
        };

        let id = created.id;
        tracing::info!(ticket = id, "ticket created");
        let outcome = self.upload_after(created, &attachments).await;
        self.close_modal();
        if matches!(outcome, SubmitOutcome::Saved(_)) {
            self.notify(Notice::success(format!("Ticket #{id} created")));
        }

        if let Err(e) = self.refresh(true).await {
            tracing::warn!(error = %e, "refresh after create failed");
        }

        Ok(outcome)
    }
}
