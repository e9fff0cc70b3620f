//! Headless back-office console: resolves the session's permissions and
//! loads one resource list through the dashboard API.

#![forbid(unsafe_code)]

mod config;

use std::sync::Arc;

use backoffice_application::{
    CollectionClient, ListController, LoadOutcome, Notifier, PermissionRegistry, RbacEvaluator,
    RoleRepository, UiGate, Visibility,
};
use backoffice_core::{AppError, AppResult};
use backoffice_domain::{Action, ListQuery, PageLink, Resource};
use backoffice_infrastructure::{HttpRestClient, HttpRoleRepository, TracingNotifier};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ConsoleConfig;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ConsoleConfig::load()?;
    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;
    let rest_client = Arc::new(HttpRestClient::new(
        http_client,
        config.api_base_url.as_str(),
        config.auth_token.clone(),
    )?);
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier::new());

    info!(
        api_base_url = %config.api_base_url,
        resource = config.resource.as_str(),
        page_size = config.page_size,
        uninitialized_policy = config.uninitialized_policy.as_str(),
        response_ordering = config.response_ordering.as_str(),
        "backoffice-console started"
    );

    let registry = Arc::new(load_registry(&HttpRoleRepository::new(rest_client.clone())).await);
    let mut evaluator = RbacEvaluator::new(registry)
        .with_super_role(config.super_role.clone())
        .with_uninitialized_policy(config.uninitialized_policy);

    if !evaluator.initialize(Some(config.auth_token.as_str())) {
        return Err(AppError::Unauthorized(
            "BACKOFFICE_AUTH_TOKEN does not carry a usable session".to_owned(),
        ));
    }
    if evaluator.is_session_expired_at(chrono::Utc::now().timestamp()) {
        return Err(AppError::Unauthorized("session expired".to_owned()));
    }
    if let Some(claims) = evaluator.claims() {
        info!(
            user_id = %claims.user_id(),
            role = %claims.role(),
            generation = evaluator.generation(),
            "session initialized"
        );
    }

    let visibility = gate_resource_actions(&evaluator, config.resource);
    info!(hidden = ?visibility.hidden(), "resource actions gated");

    let mut query = ListQuery::with_page_size(config.page_size)?;
    if let Some(search) = config.search.as_deref() {
        query.set_filter("search", search)?;
    }

    let client: Arc<dyn CollectionClient> = rest_client;
    let mut controller = ListController::<Value>::new(config.resource, client, notifier)
        .with_ordering(config.response_ordering)
        .with_query(query);
    let outcome = controller.load().await;

    report_list(&controller, outcome)
}

async fn load_registry(repository: &dyn RoleRepository) -> PermissionRegistry {
    match PermissionRegistry::load(repository).await {
        Ok(registry) => registry,
        Err(error) => {
            warn!(error = %error, "failed to load role definitions, using builtin roles");
            PermissionRegistry::builtin()
        }
    }
}

fn gate_resource_actions(evaluator: &RbacEvaluator, resource: Resource) -> Visibility {
    let mut gate = UiGate::new();
    for action in [Action::View, Action::Create, Action::Edit, Action::Delete] {
        gate = gate.rule(
            format!("{}.{}", resource.as_str(), action.as_str()),
            resource.permission(action),
        );
    }

    let mut visibility = Visibility::default();
    gate.apply(evaluator, &mut visibility);
    visibility
}

fn report_list(controller: &ListController<Value>, outcome: LoadOutcome) -> AppResult<()> {
    if outcome == LoadOutcome::Failed {
        return Err(AppError::Internal(format!(
            "failed to load {}",
            controller.resource().as_str()
        )));
    }

    let pagination = controller.pagination();
    let links = pagination
        .links
        .iter()
        .map(|link| match link {
            PageLink::Page(page) if *page == pagination.current_page => format!("[{page}]"),
            PageLink::Page(page) => page.to_string(),
            PageLink::Ellipsis => "...".to_owned(),
        })
        .collect::<Vec<_>>()
        .join(" ");

    info!(
        resource = controller.resource().as_str(),
        items = controller.items().len(),
        total_items = pagination.total_items,
        first_item = pagination.first_item,
        last_item = pagination.last_item,
        page = pagination.current_page,
        total_pages = pagination.total_pages,
        pages = %links,
        "list loaded"
    );

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
