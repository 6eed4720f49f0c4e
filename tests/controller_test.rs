mod common;

use std::time::Duration;

use serde_json::json;

use common::{MockBackend, ready_ticket, ticket};
use ticketdesk::api::{Attachment, NewTicket, TicketPatch};
use ticketdesk::controller::{
    ControllerOptions, Modal, NoticeLevel, RefreshOutcome, SubmitOutcome, TicketListController,
};
use ticketdesk::types::{CallDirection, TicketPriority, TicketStatus, ViewBucket};
use ticketdesk::validation::FieldErrors;
use ticketdesk::{DeskError, FilterState};

fn transient() -> DeskError {
    DeskError::Transient("502 Bad Gateway".to_string())
}

fn rejected_phone() -> DeskError {
    let mut errors = FieldErrors::new();
    errors.insert("phone", "Phone number already in use");
    DeskError::Validation(errors)
}

fn controller(backend: &MockBackend) -> TicketListController<MockBackend> {
    TicketListController::new(
        backend.clone(),
        ControllerOptions {
            current_agent: Some(7),
            ..Default::default()
        },
    )
}

fn needs_setup(id: u64) -> ticketdesk::Ticket {
    ticket(
        id,
        json!({ "status": "Open", "customer": { "id": 55, "name": "Walk-in" } }),
    )
}

fn valid_form() -> NewTicket {
    NewTicket {
        customer_id: Some(42),
        issue_detail: Some("Gate code not working".to_string()),
        priority: TicketPriority::High,
        ..Default::default()
    }
}

// ============================================================================
// Refresh
// ============================================================================

#[tokio::test]
async fn test_first_load_has_no_growth_notice() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1), ready_ticket(2)]);
    let mut controller = controller(&backend);

    let outcome = controller.refresh(true).await.unwrap();
    assert_eq!(
        outcome,
        RefreshOutcome::Updated {
            total: 2,
            new_count: 0
        }
    );
    assert!(controller.is_loaded());
    assert!(controller.notices().is_empty());
}

#[tokio::test]
async fn test_growth_raises_single_notice() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1), ready_ticket(2)]);
    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();

    backend.push_ticket(ready_ticket(3));
    backend.push_ticket(ready_ticket(4));
    let outcome = controller.refresh(true).await.unwrap();

    assert_eq!(
        outcome,
        RefreshOutcome::Updated {
            total: 4,
            new_count: 2
        }
    );
    let notices = controller.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Info);
    assert_eq!(notices[0].message, "2 new tickets");
    assert!(controller.notices().is_empty());
}

#[tokio::test]
async fn test_shrinking_collection_is_silent() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1), ready_ticket(2)]);
    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();

    backend.set_tickets(vec![ready_ticket(1)]);
    let outcome = controller.refresh(true).await.unwrap();
    assert_eq!(
        outcome,
        RefreshOutcome::Updated {
            total: 1,
            new_count: 0
        }
    );
    assert!(controller.notices().is_empty());
}

#[tokio::test]
async fn test_identical_response_is_unchanged() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1)]);
    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();

    assert_eq!(
        controller.refresh(true).await.unwrap(),
        RefreshOutcome::Unchanged
    );
    assert_eq!(MockBackend::calls(&backend.list_calls), 2);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_deduplicated_within_window() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1)]);
    let mut controller = controller(&backend);
    controller.refresh(false).await.unwrap();

    assert_eq!(
        controller.refresh(false).await.unwrap(),
        RefreshOutcome::Deduplicated
    );
    assert_eq!(MockBackend::calls(&backend.list_calls), 1);

    // Forced refreshes ignore the window
    controller.refresh(true).await.unwrap();
    assert_eq!(MockBackend::calls(&backend.list_calls), 2);

    tokio::time::advance(Duration::from_secs(3)).await;
    controller.refresh(false).await.unwrap();
    assert_eq!(MockBackend::calls(&backend.list_calls), 3);
}

#[tokio::test]
async fn test_failed_refresh_keeps_collection() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1), ready_ticket(2)]);
    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();

    backend.fail_list(Some(transient));
    let err = controller.refresh(true).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(controller.tickets().len(), 2);

    let error = controller.last_error().unwrap();
    assert!(error.retryable);
    assert!(error.message.contains("502"));
    assert_eq!(controller.notices()[0].level, NoticeLevel::Error);

    backend.fail_list(None);
    controller.refresh(true).await.unwrap();
    assert!(controller.last_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_hung_request_times_out() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1)]);
    backend.set_delay(Duration::from_secs(120));
    let mut controller = TicketListController::new(
        backend.clone(),
        ControllerOptions {
            request_timeout: Duration::from_secs(5),
            ..Default::default()
        },
    );

    let err = controller.refresh(true).await.unwrap_err();
    assert!(matches!(err, DeskError::Timeout(5)));
    assert!(controller.last_error().unwrap().retryable);
    assert!(controller.tickets().is_empty());
}

// ============================================================================
// Filters, pagination, URL state
// ============================================================================

#[tokio::test]
async fn test_filter_change_resets_page() {
    let tickets = (1..=30).map(ready_ticket).collect();
    let backend = MockBackend::with_tickets(tickets);
    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();
    controller.set_page_size(10);

    controller.set_page(3);
    assert_eq!(controller.current_page().items.len(), 10);
    assert_eq!(controller.current_page().total_pages, 3);

    // Setting a filter to its current value keeps the page
    controller.set_status(None);
    assert_eq!(controller.page(), 3);

    controller.set_status(Some(TicketStatus::Open));
    assert_eq!(controller.page(), 1);
}

#[tokio::test]
async fn test_every_filter_dimension_resets_page() {
    type Setter = fn(&mut TicketListController<MockBackend>);
    let setters: [(&str, Setter); 8] = [
        ("search", |c| c.set_search("customer")),
        ("status", |c| c.set_status(Some(TicketStatus::Closed))),
        ("priority", |c| c.set_priority(Some(TicketPriority::High))),
        ("direction", |c| c.set_direction(Some(CallDirection::Outbound))),
        ("campaign", |c| c.set_campaign(Some(1))),
        ("yard", |c| c.set_yard(Some(4))),
        ("view", |c| c.set_view(ViewBucket::Unassigned)),
        ("customer", |c| c.set_customer(Some(101))),
    ];

    let backend = MockBackend::with_tickets((1..=30).map(ready_ticket).collect());
    for (name, set) in setters {
        let mut controller = controller(&backend);
        controller.refresh(true).await.unwrap();
        controller.set_page_size(10);
        controller.set_page(3);

        set(&mut controller);
        assert_eq!(controller.page(), 1, "{name} change kept page 3");
    }
}

#[tokio::test]
async fn test_out_of_range_page_is_empty() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1), ready_ticket(2)]);
    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();

    controller.set_page(9);
    let page = controller.current_page();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn test_url_reflects_filters_and_selection() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1), ready_ticket(2)]);
    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();

    controller.set_search("ada");
    controller.set_view(ViewBucket::HighPriority);
    assert_eq!(controller.url(), "search=ada&view=high-priority");

    controller.open_ticket(2).await.unwrap();
    assert_eq!(controller.url(), "search=ada&id=2&view=high-priority");
}

#[tokio::test]
async fn test_apply_url_opens_ticket_and_sets_filters() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1), ready_ticket(2)]);
    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();
    controller.set_status(Some(TicketStatus::Closed));

    controller
        .apply_url("?id=2&customerId=102&view=missed")
        .await
        .unwrap();

    assert_eq!(controller.selected(), Some(2));
    assert!(matches!(controller.modal(), Modal::View { .. }));
    assert_eq!(controller.filter().view, ViewBucket::Missed);
    assert_eq!(controller.filter().customer_id, Some(102));
    assert_eq!(controller.filter().status, None);
    assert_eq!(controller.filter().current_agent, Some(7));
}

#[tokio::test]
async fn test_navigate_closes_modal_and_resets() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1)]);
    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();
    controller.set_search("gate");
    controller.open_ticket(1).await.unwrap();

    controller.navigate();
    assert_eq!(controller.modal(), &Modal::Closed);
    assert_eq!(controller.selected(), None);
    assert_eq!(
        controller.filter(),
        &FilterState {
            current_agent: Some(7),
            ..Default::default()
        }
    );
}

// ============================================================================
// Opening tickets
// ============================================================================

#[tokio::test]
async fn test_open_fetches_history_when_missing() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1)]);
    let mut detail = ready_ticket(1);
    detail.call_history = Some(vec![]);
    backend.set_detail(detail);

    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();

    let modal = controller.open_ticket(1).await.unwrap();
    assert!(matches!(modal, Modal::View { .. }));
    assert_eq!(MockBackend::calls(&backend.get_calls), 1);
    assert!(controller.ticket(1).unwrap().has_call_history());

    // Second open uses the local copy
    controller.close_modal();
    controller.open_ticket(1).await.unwrap();
    assert_eq!(MockBackend::calls(&backend.get_calls), 1);
}

#[tokio::test]
async fn test_ticket_without_campaign_opens_in_edit() {
    let backend = MockBackend::with_tickets(vec![needs_setup(5)]);
    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();

    let modal = controller.open_ticket(5).await.unwrap();
    assert!(matches!(modal, Modal::Edit { .. }));
    assert_eq!(modal.ticket_id(), Some(5));
}

#[tokio::test]
async fn test_open_unknown_ticket_fails_closed() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1)]);
    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();

    let err = controller.open_ticket(404).await.unwrap_err();
    assert!(matches!(err, DeskError::TicketNotFound(404)));
    assert_eq!(controller.modal(), &Modal::Closed);
    assert_eq!(controller.notices()[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_begin_edit_requires_view() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1)]);
    let mut controller = controller(&backend);
    assert!(controller.begin_edit().is_err());
    assert_eq!(controller.modal(), &Modal::Closed);

    controller.refresh(true).await.unwrap();
    controller.open_ticket(1).await.unwrap();
    controller.begin_edit().unwrap();
    assert_eq!(controller.modal().name(), "edit");
}

// ============================================================================
// Mutations
// ============================================================================

#[tokio::test]
async fn test_mutate_merges_in_place() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1), ready_ticket(2)]);
    backend.set_update_response(json!({ "status": "Closed", "disposition": "Resolved" }));
    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();

    let patch = TicketPatch {
        status: Some(TicketStatus::Closed),
        ..Default::default()
    };
    let updated = controller.mutate(2, &patch).await.unwrap();

    assert_eq!(updated.status, TicketStatus::Closed);
    assert_eq!(controller.tickets().len(), 2);
    let cached = controller.ticket(2).unwrap();
    assert_eq!(cached.disposition.as_deref(), Some("Resolved"));
    // Fields the server did not send are kept
    assert_eq!(cached.campaign_id, Some(1));
    assert_eq!(cached.client_name(), Some("Customer 2"));
}

#[tokio::test]
async fn test_failed_mutate_leaves_cache_untouched() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1)]);
    backend.fail_update(Some(transient));
    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();
    let before = controller.tickets().to_vec();

    let patch = TicketPatch {
        priority: Some(TicketPriority::Emergency),
        ..Default::default()
    };
    assert!(controller.mutate(1, &patch).await.is_err());
    assert_eq!(controller.tickets(), before.as_slice());
    assert_eq!(controller.notices()[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_save_edit_requires_campaign_for_setup() {
    let backend = MockBackend::with_tickets(vec![needs_setup(5)]);
    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();
    controller.open_ticket(5).await.unwrap();

    let patch = TicketPatch {
        status: Some(TicketStatus::InProgress),
        ..Default::default()
    };
    let err = controller.save_edit(patch, vec![]).await.unwrap_err();

    assert!(err.field_errors().unwrap().get("campaignId").is_some());
    assert_eq!(controller.modal().name(), "edit");
    assert!(controller.modal().errors().unwrap().get("campaignId").is_some());
    assert_eq!(MockBackend::calls(&backend.update_calls), 0);
}

#[tokio::test]
async fn test_save_edit_commits_then_closes() {
    let backend = MockBackend::with_tickets(vec![needs_setup(5)]);
    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();
    controller.open_ticket(5).await.unwrap();

    let patch = TicketPatch {
        campaign_id: Some(3),
        ..Default::default()
    };
    let outcome = controller.save_edit(patch, vec![]).await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Saved(_)));
    assert_eq!(controller.modal(), &Modal::Closed);
    assert_eq!(controller.ticket(5).unwrap().campaign_key(), Some(3));
    let notices = controller.drain_notices();
    assert_eq!(notices.last().unwrap().level, NoticeLevel::Success);
}

#[tokio::test]
async fn test_upload_failure_is_partial_success() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1)]);
    backend.fail_upload(Some(transient));
    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();
    controller.open_ticket(1).await.unwrap();
    controller.begin_edit().unwrap();

    let patch = TicketPatch {
        status: Some(TicketStatus::InProgress),
        ..Default::default()
    };
    let outcome = controller
        .save_edit(patch, vec![Attachment::new("photo.png", vec![1, 2, 3])])
        .await
        .unwrap();

    match &outcome {
        SubmitOutcome::PartialSuccess { ticket, warning } => {
            assert_eq!(ticket.status, TicketStatus::InProgress);
            assert!(warning.contains("attachments failed"));
        }
        other => panic!("expected partial success, got {other:?}"),
    }
    assert_eq!(
        controller.ticket(1).unwrap().status,
        TicketStatus::InProgress
    );
    assert_eq!(controller.modal(), &Modal::Closed);
    let notices = controller.drain_notices();
    assert!(notices.iter().any(|n| n.level == NoticeLevel::Warning));
    assert!(!notices.iter().any(|n| n.level == NoticeLevel::Success));
}

#[tokio::test]
async fn test_attachments_upload_after_commit() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1)]);
    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();
    controller.open_ticket(1).await.unwrap();
    controller.begin_edit().unwrap();

    let outcome = controller
        .save_edit(
            TicketPatch::default(),
            vec![Attachment::new("invoice.pdf", b"%PDF".to_vec())],
        )
        .await
        .unwrap();

    assert_eq!(outcome.ticket().attachments, vec!["invoice.pdf".to_string()]);
    assert_eq!(MockBackend::calls(&backend.update_calls), 0);
    assert_eq!(MockBackend::calls(&backend.upload_calls), 1);
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_adds_ticket_and_closes_modal() {
    let backend = MockBackend::with_tickets(vec![ready_ticket(1), ready_ticket(2)]);
    let mut controller = controller(&backend);
    controller.refresh(true).await.unwrap();
    let before = controller.tickets().len();

    controller.open_create();
    assert_eq!(controller.modal().name(), "create");

    let outcome = controller.create(valid_form(), vec![]).await.unwrap();

    assert_eq!(outcome.ticket().id, 3);
    assert_eq!(controller.tickets().len(), before + 1);
    assert_eq!(controller.modal(), &Modal::Closed);
    assert_eq!(MockBackend::calls(&backend.list_calls), 2);

    // The forced refresh grew the list, so the growth notice fires too
    let levels: Vec<NoticeLevel> = controller.drain_notices().iter().map(|n| n.level).collect();
    assert_eq!(levels, vec![NoticeLevel::Success, NoticeLevel::Info]);
}

#[tokio::test]
async fn test_create_validation_keeps_form_open() {
    let backend = MockBackend::with_tickets(vec![]);
    let mut controller = controller(&backend);
    controller.open_create();

    let err = controller
        .create(NewTicket::default(), vec![])
        .await
        .unwrap_err();

    let errors = err.field_errors().unwrap();
    assert!(errors.get("issueDetail").is_some());
    assert!(errors.get("customerName").is_some());
    assert_eq!(controller.modal().name(), "create");
    assert_eq!(MockBackend::calls(&backend.create_calls), 0);
}

#[tokio::test]
async fn test_create_server_rejection_returns_to_form() {
    let backend = MockBackend::with_tickets(vec![]);
    backend.fail_create(Some(rejected_phone));
    let mut controller = controller(&backend);
    controller.open_create();

    assert!(controller.create(valid_form(), vec![]).await.is_err());
    match controller.modal() {
        Modal::Create { form, errors } => {
            assert_eq!(form, &valid_form());
            assert_eq!(errors.get("phone"), Some("Phone number already in use"));
        }
        other => panic!("expected create modal, got {}", other.name()),
    }
    assert!(controller.tickets().is_empty());
}
