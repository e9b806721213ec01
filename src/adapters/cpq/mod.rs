//! ConnectWise CPQ adapter
//!
//! Layered bottom-up: [`transport`] puts bytes on the wire, [`executor`]
//! authenticates and retries one call, [`pagination`] walks list endpoints,
//! [`conditions`] and [`patch`] build query filters and PATCH bodies,
//! [`operations`] maps resource/operation pairs to plans, and [`client`]
//! ties them together.

pub mod auth;
pub mod client;
pub mod conditions;
pub mod executor;
pub mod operations;
pub mod pagination;
pub mod patch;
pub mod transport;

pub use auth::Credentials;
pub use client::{BatchOptions, BatchRecord, CpqClient, HealthReport};
pub use conditions::{compile, ConditionRow, ConditionSet, Logic, ValueType};
pub use executor::{ApiPath, QueryParams, RequestExecutor, RetryPolicy};
pub use operations::{
    find_descriptor, JsonInput, ListOptions, Operation, OperationDescriptor, OperationKind, Plan,
    OPERATION_CATALOG,
};
pub use pagination::{PageRequest, Paginator};
pub use patch::{build_patch, PatchOperation};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
