#![allow(dead_code)]

use std::collections::HashMap;
use std::process::{Command, Output};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};
use tempfile::TempDir;

use ticketdesk::api::{Attachment, NewTicket, TicketBackend, TicketFields, TicketPatch};
use ticketdesk::types::{Agent, Campaign, Customer, Ticket, TicketId, Yard};
use ticketdesk::{DeskError, Result};

/// Helper struct to run ticketdesk commands in an isolated temp directory
pub struct DeskTest {
    pub temp_dir: TempDir,
    api_url: Option<String>,
}

impl DeskTest {
    pub fn new() -> Self {
        DeskTest {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            api_url: None,
        }
    }

    /// Point the binary at a backend (usually a mockito server)
    pub fn with_api(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn run(&self, args: &[&str]) -> Output {
        let mut command = Command::new(env!("CARGO_BIN_EXE_ticketdesk"));
        command
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("TICKETDESK_ROOT", self.temp_dir.path().join(".ticketdesk"))
            .env_remove("TICKETDESK_TOKEN")
            .env_remove("TICKETDESK_LOG")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        match &self.api_url {
            Some(url) => command.env("TICKETDESK_API_URL", url),
            None => command.env_remove("TICKETDESK_API_URL"),
        };
        command.output().expect("Failed to execute ticketdesk command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let stdout = self.run_success(args);
        serde_json::from_str(&stdout)
            .unwrap_or_else(|e| panic!("invalid JSON from {:?}: {e}\n{stdout}", args))
    }
}

/// Build a ticket from a JSON fragment; `id` is always set.
pub fn ticket(id: TicketId, fields: Value) -> Ticket {
    let mut value = fields;
    value["id"] = json!(id);
    serde_json::from_value(value).expect("invalid ticket fixture")
}

/// A ticket that has been through setup (campaign assigned).
pub fn ready_ticket(id: TicketId) -> Ticket {
    ticket(
        id,
        json!({
            "status": "Open",
            "priority": "Medium",
            "direction": "inbound",
            "campaignId": 1,
            "customer": { "id": 100 + id, "name": format!("Customer {id}") },
        }),
    )
}

pub fn envelope(data: Value) -> String {
    json!({ "success": true, "data": data }).to_string()
}

#[derive(Default)]
struct MockState {
    tickets: Vec<Ticket>,
    details: HashMap<TicketId, Ticket>,
    update_response: Option<TicketFields>,
    update_error: Option<fn() -> DeskError>,
    create_error: Option<fn() -> DeskError>,
    upload_error: Option<fn() -> DeskError>,
    list_error: Option<fn() -> DeskError>,
    next_id: TicketId,
    agents: Vec<Agent>,
    users: Vec<Agent>,
    customers: Vec<Customer>,
    campaigns: Vec<Campaign>,
    yards: Vec<Yard>,
}

/// In-memory backend with failure toggles and call counters.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
    delay: Arc<Mutex<Option<Duration>>>,
    pub list_calls: Arc<AtomicUsize>,
    pub get_calls: Arc<AtomicUsize>,
    pub update_calls: Arc<AtomicUsize>,
    pub create_calls: Arc<AtomicUsize>,
    pub upload_calls: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
        let backend = Self::default();
        {
            let mut state = backend.state.lock();
            state.next_id = tickets.iter().map(|t| t.id).max().unwrap_or(0) + 1;
            state.tickets = tickets;
        }
        backend
    }

    pub fn set_tickets(&self, tickets: Vec<Ticket>) {
        self.state.lock().tickets = tickets;
    }

    pub fn push_ticket(&self, ticket: Ticket) {
        self.state.lock().tickets.insert(0, ticket);
    }

    pub fn set_detail(&self, ticket: Ticket) {
        self.state.lock().details.insert(ticket.id, ticket);
    }

    pub fn set_update_response(&self, fields: Value) {
        let Value::Object(map) = fields else {
            panic!("update response must be an object");
        };
        self.state.lock().update_response = Some(map);
    }

    pub fn fail_list(&self, error: Option<fn() -> DeskError>) {
        self.state.lock().list_error = error;
    }

    pub fn fail_update(&self, error: Option<fn() -> DeskError>) {
        self.state.lock().update_error = error;
    }

    pub fn fail_create(&self, error: Option<fn() -> DeskError>) {
        self.state.lock().create_error = error;
    }

    pub fn fail_upload(&self, error: Option<fn() -> DeskError>) {
        self.state.lock().upload_error = error;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn set_agents(&self, agents: Vec<Agent>, users: Vec<Agent>) {
        let mut state = self.state.lock();
        state.agents = agents;
        state.users = users;
    }

    pub fn set_campaigns(&self, campaigns: Vec<Campaign>) {
        self.state.lock().campaigns = campaigns;
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn patch_fields(patch: &TicketPatch) -> TicketFields {
    match serde_json::to_value(patch) {
        Ok(Value::Object(map)) => map,
        _ => TicketFields::new(),
    }
}

impl TicketBackend for MockBackend {
    async fn list_tickets(&self) -> Result<Vec<Ticket>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let state = self.state.lock();
        match state.list_error {
            Some(error) => Err(error()),
            None => Ok(state.tickets.clone()),
        }
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Ticket> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let state = self.state.lock();
        state
            .details
            .get(&id)
            .cloned()
            .or_else(|| state.tickets.iter().find(|t| t.id == id).cloned())
            .ok_or(DeskError::TicketNotFound(id))
    }

    async fn update_ticket(&self, id: TicketId, patch: &TicketPatch) -> Result<TicketFields> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let state = self.state.lock();
        if let Some(error) = state.update_error {
            return Err(error());
        }
        let mut fields = state
            .update_response
            .clone()
            .unwrap_or_else(|| patch_fields(patch));
        fields.insert("id".to_string(), json!(id));
        Ok(fields)
    }

    async fn create_ticket(&self, form: &NewTicket) -> Result<Ticket> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let mut state = self.state.lock();
        if let Some(error) = state.create_error {
            return Err(error());
        }
        let id = state.next_id.max(1);
        state.next_id = id + 1;

        let mut created = Ticket::new(id);
        created.status = form.status;
        created.priority = form.priority;
        created.direction = form.direction;
        created.customer_id = form.customer_id;
        created.campaign_id = form.campaign_id;
        created.issue_detail = form.issue_detail.clone();
        state.tickets.insert(0, created.clone());
        Ok(created)
    }

    async fn upload_attachments(&self, id: TicketId, files: &[Attachment]) -> Result<TicketFields> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let state = self.state.lock();
        if let Some(error) = state.upload_error {
            return Err(error());
        }
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        match json!({ "id": id, "attachments": names }) {
            Value::Object(map) => Ok(map),
            _ => Ok(TicketFields::new()),
        }
    }

    async fn list_agents(&self) -> Result<Vec<Agent>> {
        Ok(self.state.lock().agents.clone())
    }

    async fn list_users(&self) -> Result<Vec<Agent>> {
        Ok(self.state.lock().users.clone())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        Ok(self.state.lock().customers.clone())
    }

    async fn list_campaigns(&self) -> Result<Vec<Campaign>> {
        Ok(self.state.lock().campaigns.clone())
    }

    async fn list_yards(&self) -> Result<Vec<Yard>> {
        Ok(self.state.lock().yards.clone())
    }
}
