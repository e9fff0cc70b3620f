//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod list;
mod pagination;
mod resource;
mod security;
mod validation;

pub use list::{
    DEFAULT_PAGE_SIZE, DEFAULT_SORT_FIELD, ListQuery, RESERVED_QUERY_KEYS, SortOrder, total_pages,
};
pub use pagination::{PageLink, Pagination, WINDOW_NEIGHBORS, page_window};
pub use resource::{Action, Resource};
pub use security::{
    Permission, PermissionGrant, Role, RoleName, SUPER_ROLE_NAME, WILDCARD_GRANT,
    builtin_permissions, builtin_roles,
};
pub use validation::{EmailAddress, FieldError, FieldRule, FormValidation};
