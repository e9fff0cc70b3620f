//! Application services and ports.

#![forbid(unsafe_code)]

mod disclosure;
mod forms;
mod list_controller;
mod permission_registry;
mod ports;
mod rbac_evaluator;
mod resource_actions;
mod ui_gate;

pub use disclosure::{Disclosure, DisclosureEvent, DisclosureState};
pub use forms::{
    CompanyForm, NAME_MIN_LENGTH, PASSWORD_MIN_LENGTH, RecordForm, RoleForm, UserForm,
};
pub use list_controller::{
    ListController, ListStatus, LoadOutcome, LoadTicket, ResponseOrdering,
};
pub use permission_registry::{PermissionRegistry, PermissionSet};
pub use ports::{
    CollectionClient, ListPage, MutationMethod, MutationRequest, Notification,
    NotificationLevel, Notifier, RoleRepository,
};
pub use rbac_evaluator::{RbacEvaluator, UninitializedPolicy};
pub use resource_actions::ResourceActions;
pub use ui_gate::{GateTarget, Requirement, UiGate, Visibility};
