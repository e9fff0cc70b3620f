use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use backoffice_core::{AppError, AppResult};
use backoffice_domain::{ListQuery, PageLink, Resource};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::{
    CollectionClient, ListPage, MutationRequest, Notification, NotificationLevel, Notifier,
};

use super::{ListController, ListStatus, LoadOutcome, ResponseOrdering};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct CompanyRow {
    id: String,
    name: String,
}

struct FakeCollectionClient {
    total_items: u64,
    fail: AtomicBool,
    requests: Mutex<Vec<ListQuery>>,
}

impl FakeCollectionClient {
    fn with_total(total_items: u64) -> Self {
        Self {
            total_items,
            fail: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CollectionClient for FakeCollectionClient {
    async fn list(&self, _resource: Resource, query: &ListQuery) -> AppResult<ListPage> {
        self.requests.lock().await.push(query.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Internal("connection reset".to_owned()));
        }

        let name = format!("page-{}", query.page());
        Ok(page_of(&[name.as_str()], self.total_items))
    }

    async fn send(&self, _request: MutationRequest) -> AppResult<Value> {
        Ok(Value::Null)
    }
}

#[derive(Default)]
struct RecordingNotifier {
    notifications: StdMutex<Vec<Notification>>,
}

impl RecordingNotifier {
    fn levels(&self) -> Vec<NotificationLevel> {
        self.notifications
            .lock()
            .map(|notifications| {
                notifications
                    .iter()
                    .map(|notification| notification.level)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(notification);
        }
    }
}

fn page_of(names: &[&str], total_items: u64) -> ListPage {
    ListPage {
        items: names
            .iter()
            .map(|name| json!({ "id": format!("id-{name}"), "name": name }))
            .collect(),
        total_items,
    }
}

fn controller(
    client: Arc<FakeCollectionClient>,
    notifier: Arc<RecordingNotifier>,
) -> ListController<CompanyRow> {
    ListController::new(Resource::Companies, client, notifier)
}

fn names(controller: &ListController<CompanyRow>) -> Vec<String> {
    controller
        .items()
        .iter()
        .map(|row| row.name.clone())
        .collect()
}

#[tokio::test]
async fn load_transitions_from_idle_to_loaded() {
    let client = Arc::new(FakeCollectionClient::with_total(25));
    let mut controller = controller(client.clone(), Arc::new(RecordingNotifier::default()));
    assert_eq!(controller.status(), ListStatus::Idle);

    assert_eq!(controller.load().await, LoadOutcome::Applied);
    assert_eq!(controller.status(), ListStatus::Loaded);
    assert_eq!(controller.total_items(), 25);
    assert_eq!(controller.total_pages(), 3);
    assert_eq!(controller.items()[0].id, "id-page-1");
}

#[tokio::test]
async fn set_filter_always_returns_to_first_page() {
    let client = Arc::new(FakeCollectionClient::with_total(100));
    let mut controller = controller(client.clone(), Arc::new(RecordingNotifier::default()));
    assert_eq!(controller.load().await, LoadOutcome::Applied);

    for page in 2..=10 {
        assert_eq!(controller.set_page(page).await, LoadOutcome::Applied);
        assert_eq!(controller.query().page(), page);

        assert_eq!(
            controller.set_filter("search", "acme").await,
            LoadOutcome::Applied
        );
        assert_eq!(controller.query().page(), 1);
    }

    let requests = client.requests.lock().await;
    assert_eq!(requests.last().map(ListQuery::page), Some(1));
}

#[tokio::test]
async fn out_of_range_pages_are_ignored() {
    let client = Arc::new(FakeCollectionClient::with_total(25));
    let mut controller = controller(client.clone(), Arc::new(RecordingNotifier::default()));
    assert_eq!(controller.set_page(2).await, LoadOutcome::Skipped);

    assert_eq!(controller.load().await, LoadOutcome::Applied);
    let before = controller.query().clone();

    assert_eq!(controller.set_page(0).await, LoadOutcome::Skipped);
    assert_eq!(controller.set_page(4).await, LoadOutcome::Skipped);

    assert_eq!(controller.query(), &before);
    assert_eq!(controller.status(), ListStatus::Loaded);
    assert_eq!(client.requests.lock().await.len(), 1);
}

#[tokio::test]
async fn query_carries_filters_pagination_and_sort() {
    let client = Arc::new(FakeCollectionClient::with_total(25));
    let mut controller = controller(client.clone(), Arc::new(RecordingNotifier::default()));

    assert_eq!(
        controller.set_filter("search", "acme").await,
        LoadOutcome::Applied
    );
    assert_eq!(controller.set_page(2).await, LoadOutcome::Applied);

    let requests = client.requests.lock().await;
    let pairs = requests
        .last()
        .map(ListQuery::to_query_pairs)
        .unwrap_or_default();
    let keys: Vec<&str> = pairs.iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(keys, vec!["page", "limit", "search", "sortBy", "sortOrder"]);
    assert_eq!(pairs[0].1, "2");
    assert_eq!(pairs[1].1, "10");
    assert_eq!(pairs[2].1, "acme");
    assert_eq!(controller.total_pages(), 3);
}

#[tokio::test]
async fn failed_load_keeps_previous_items_and_notifies() {
    let client = Arc::new(FakeCollectionClient::with_total(3));
    let notifier = Arc::new(RecordingNotifier::default());
    let mut controller = controller(client.clone(), notifier.clone());
    assert_eq!(controller.load().await, LoadOutcome::Applied);

    client.fail.store(true, Ordering::SeqCst);

    assert_eq!(controller.load().await, LoadOutcome::Failed);
    assert_eq!(controller.status(), ListStatus::Errored);
    assert_eq!(names(&controller), vec!["page-1".to_owned()]);
    assert_eq!(controller.total_items(), 3);
    assert_eq!(notifier.levels(), vec![NotificationLevel::Error]);
}

#[tokio::test]
async fn undecodable_items_are_reported_as_failures() {
    let notifier = Arc::new(RecordingNotifier::default());
    let mut controller = controller(
        Arc::new(FakeCollectionClient::with_total(1)),
        notifier.clone(),
    );

    let ticket = controller.begin_load();
    let outcome = controller.complete_load(
        ticket,
        Ok(ListPage {
            items: vec![json!({ "unexpected": true })],
            total_items: 1,
        }),
    );

    assert_eq!(outcome, LoadOutcome::Failed);
    assert!(controller.items().is_empty());
    assert_eq!(notifier.levels(), vec![NotificationLevel::Error]);
}

#[tokio::test]
async fn arrival_order_lets_last_arrival_win() {
    let mut controller = controller(
        Arc::new(FakeCollectionClient::with_total(0)),
        Arc::new(RecordingNotifier::default()),
    )
    .with_ordering(ResponseOrdering::ArrivalOrder);

    let first = controller.begin_load();
    let second = controller.begin_load();
    assert!(second.sequence() > first.sequence());

    assert_eq!(
        controller.complete_load(second, Ok(page_of(&["second"], 1))),
        LoadOutcome::Applied
    );
    assert_eq!(
        controller.complete_load(first, Ok(page_of(&["first"], 1))),
        LoadOutcome::Applied
    );

    assert_eq!(names(&controller), vec!["first".to_owned()]);
}

#[tokio::test]
async fn latest_issued_drops_out_of_order_responses() {
    let notifier = Arc::new(RecordingNotifier::default());
    let mut controller = controller(
        Arc::new(FakeCollectionClient::with_total(0)),
        notifier.clone(),
    );

    let first = controller.begin_load();
    let second = controller.begin_load();

    assert_eq!(
        controller.complete_load(second, Ok(page_of(&["second"], 1))),
        LoadOutcome::Applied
    );
    assert_eq!(
        controller.complete_load(first, Err(AppError::Internal("timeout".to_owned()))),
        LoadOutcome::Stale
    );

    assert_eq!(names(&controller), vec!["second".to_owned()]);
    assert_eq!(controller.status(), ListStatus::Loaded);
    assert!(notifier.levels().is_empty());
}

#[tokio::test]
async fn page_is_clamped_when_total_shrinks() {
    let mut controller = controller(
        Arc::new(FakeCollectionClient::with_total(0)),
        Arc::new(RecordingNotifier::default()),
    )
    .with_query(ListQuery::default());

    let ticket = controller.begin_load();
    controller.complete_load(ticket, Ok(page_of(&["a"], 50)));
    assert_eq!(controller.set_page(5).await, LoadOutcome::Applied);

    assert_eq!(controller.query().page(), 1);
    assert_eq!(controller.total_items(), 0);
    assert_eq!(controller.total_pages(), 0);
}

#[tokio::test]
async fn invalid_changes_warn_without_requesting() {
    let client = Arc::new(FakeCollectionClient::with_total(10));
    let notifier = Arc::new(RecordingNotifier::default());
    let mut controller = controller(client.clone(), notifier.clone());

    assert_eq!(controller.set_page_size(0).await, LoadOutcome::Skipped);
    assert_eq!(controller.set_filter(" ", "acme").await, LoadOutcome::Skipped);

    assert!(client.requests.lock().await.is_empty());
    assert_eq!(
        notifier.levels(),
        vec![NotificationLevel::Warning, NotificationLevel::Warning]
    );
    assert_eq!(controller.status(), ListStatus::Idle);
}

#[tokio::test]
async fn set_page_size_returns_to_first_page() {
    let client = Arc::new(FakeCollectionClient::with_total(100));
    let mut controller = controller(client.clone(), Arc::new(RecordingNotifier::default()));
    assert_eq!(controller.load().await, LoadOutcome::Applied);
    assert_eq!(controller.set_page(4).await, LoadOutcome::Applied);

    assert_eq!(controller.set_page_size(25).await, LoadOutcome::Applied);
    assert_eq!(controller.query().page(), 1);
    assert_eq!(controller.total_pages(), 4);
}

#[tokio::test]
async fn pagination_window_follows_current_page() {
    let mut controller = controller(
        Arc::new(FakeCollectionClient::with_total(100)),
        Arc::new(RecordingNotifier::default()),
    );
    assert_eq!(controller.load().await, LoadOutcome::Applied);

    let pagination = controller.pagination();
    assert_eq!(pagination.total_pages, 10);
    assert_eq!(pagination.links.get(5), Some(&PageLink::Ellipsis));
    assert_eq!(pagination.links.last(), Some(&PageLink::Page(10)));
    assert_eq!((pagination.first_item, pagination.last_item), (1, 10));
}
