//! Resource/operation model
//!
//! Every supported call is a variant of [`Operation`], a sum type tagged by
//! `resource` and then `operation`, so a request document such as
//!
//! ```json
//! { "resource": "quoteItems", "operation": "update", "id": "17",
//!   "patchOperations": "[{\"op\":\"replace\",\"path\":\"/quantity\",\"value\":2}]" }
//! ```
//!
//! deserializes straight into a typed value. HTTP method, path template,
//! result shape and `showAllVersions` defaults live in the static
//! [`OPERATION_CATALOG`]; [`Operation::plan`] combines the two into a
//! [`Plan`] without touching the network.

use super::conditions::{compile, ConditionRow, Logic};
use super::executor::ApiPath;
use super::pagination::{clamp_page_size, PageRequest};
use super::patch::{build_patch, parse_patch_document, to_body};
use super::transport::HttpMethod;
use crate::config::PaginationConfig;
use crate::domain::{CpqError, RecordId, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Result shape of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// One response body, one record
    Single,
    /// Page-walked list
    Paginated,
    /// One call returning a list
    Unpaginated,
    /// No body; yields `{ id, success: true }`
    Deletion,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Single => "single",
            OperationKind::Paginated => "paginated",
            OperationKind::Unpaginated => "list",
            OperationKind::Deletion => "deletion",
        }
    }
}

/// Static description of one resource/operation pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub resource: &'static str,
    pub operation: &'static str,
    pub method: HttpMethod,
    /// Path template; `{name}` placeholders are filled from record IDs
    pub path: &'static str,
    pub kind: OperationKind,
    /// Default for `showAllVersions`; `None` when the endpoint doesn't take it
    pub show_all_versions: Option<bool>,
    pub description: &'static str,
}

impl OperationDescriptor {
    /// Render the path template with the given identifiers
    ///
    /// # Errors
    ///
    /// Returns a validation error when a placeholder has no matching ID.
    pub fn path_for(&self, ids: &[(&str, &RecordId)]) -> Result<ApiPath> {
        let mut path = ApiPath::new("");

        for segment in self.path.split('/').filter(|s| !s.is_empty()) {
            path = match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => {
                    let id = ids
                        .iter()
                        .find(|(key, _)| *key == name)
                        .map(|(_, id)| *id)
                        .ok_or_else(|| {
                            CpqError::Validation(format!(
                                "Missing path parameter '{name}' for {self}"
                            ))
                        })?;
                    path.id(id)
                }
                None => path.segment(segment),
            };
        }

        Ok(path)
    }
}

impl fmt::Display for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource, self.operation)
    }
}

const fn op(
    resource: &'static str,
    operation: &'static str,
    method: HttpMethod,
    path: &'static str,
    kind: OperationKind,
    show_all_versions: Option<bool>,
    description: &'static str,
) -> OperationDescriptor {
    OperationDescriptor {
        resource,
        operation,
        method,
        path,
        kind,
        show_all_versions,
        description,
    }
}

use HttpMethod::{Delete, Get, Patch, Post, Put};
use OperationKind::{Deletion, Paginated, Single, Unpaginated};

/// Every operation the adapter supports
pub static OPERATION_CATALOG: &[OperationDescriptor] = &[
    op("quotes", "get", Get, "/api/quotes/{quoteId}", Single, None, "Get a quote"),
    op("quotes", "getAll", Get, "/api/quotes", Paginated, Some(false), "List quotes"),
    op("quotes", "delete", Delete, "/api/quotes/{quoteId}", Deletion, None, "Delete a quote"),
    op("quotes", "copy", Post, "/api/quotes/copyById/{quoteId}", Single, None, "Copy a quote"),
    op("quoteItems", "get", Get, "/api/quoteItems/{id}", Single, None, "Get a quote item"),
    op("quoteItems", "getAll", Get, "/api/quoteItems", Paginated, Some(false), "List quote items"),
    op("quoteItems", "create", Post, "/api/quoteItems", Single, None, "Create a quote item"),
    op("quoteItems", "delete", Delete, "/api/quoteItems/{id}", Deletion, None, "Delete a quote item"),
    op("quoteItems", "update", Patch, "/api/quoteItems/{id}", Single, None, "Patch a quote item"),
    op("quoteCustomers", "getAll", Get, "/api/quotes/{quoteId}/customers", Unpaginated, None, "List customers of a quote"),
    op("quoteCustomers", "update", Patch, "/api/quotes/{quoteId}/customers/{id}", Single, None, "Patch a quote customer"),
    op("quoteCustomers", "replace", Put, "/api/quotes/{quoteId}/customers/{id}", Single, None, "Replace a quote customer"),
    op("quoteCustomers", "delete", Delete, "/api/quotes/{quoteId}/customers/{id}", Deletion, None, "Delete a quote customer"),
    op("quoteTabs", "getAll", Get, "/api/quoteTabs", Paginated, Some(true), "List quote tabs"),
    op("quoteTabs", "getItems", Get, "/api/quoteTabs/{id}/quoteItems", Unpaginated, None, "List the items of a quote tab"),
    op("quoteTerms", "getAll", Get, "/api/quotes/{quoteId}/quoteTerms", Paginated, None, "List terms of a quote"),
    op("quoteTerms", "create", Post, "/api/quotes/{quoteId}/quoteTerms", Single, None, "Create a quote term"),
    op("quoteTerms", "update", Patch, "/api/quotes/{quoteId}/quoteTerms/{id}", Single, None, "Patch a quote term"),
    op("quoteTerms", "delete", Delete, "/api/quotes/{quoteId}/quoteTerms/{id}", Deletion, None, "Delete a quote term"),
    op("recurringRevenue", "getAll", Get, "/api/recurringRevenues", Paginated, None, "List recurring revenue"),
    op("taxCodes", "getAll", Get, "/api/taxCodes", Paginated, None, "List tax codes"),
    op("templates", "getAll", Get, "/api/templates", Unpaginated, None, "List quote templates"),
    op("user", "getAll", Get, "/settings/user", Paginated, None, "List users"),
    op("user", "update", Patch, "/settings/user/{userId}", Single, None, "Patch a user"),
];

/// Look up a catalog entry by its resource and operation names
pub fn find_descriptor(resource: &str, operation: &str) -> Option<&'static OperationDescriptor> {
    OPERATION_CATALOG
        .iter()
        .find(|d| d.resource == resource && d.operation == operation)
}

/// A caller-supplied JSON value that may also arrive as JSON text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonInput(pub Value);

impl JsonInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self(Value::String(text.into()))
    }

    /// Resolve to a JSON value, using `empty` for null or blank text
    ///
    /// # Errors
    ///
    /// Returns a validation error naming `parameter` when text isn't JSON.
    pub fn resolve(&self, parameter: &str, empty: Value) -> Result<Value> {
        match &self.0 {
            Value::Null => Ok(empty),
            Value::String(text) if text.trim().is_empty() => Ok(empty),
            Value::String(text) => serde_json::from_str(text).map_err(|e| {
                CpqError::Validation(format!("{parameter} is not valid JSON: {e}"))
            }),
            other => Ok(other.clone()),
        }
    }

    /// Resolve as patch operations and normalize into a PATCH body
    pub fn patch_body(&self) -> Result<Value> {
        let operations = match &self.0 {
            Value::String(text) => parse_patch_document(text)?,
            other => build_patch(other),
        };
        to_body(&operations)
    }
}

/// Filtering and paging parameters of list operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListOptions {
    /// Raw conditions expression, passed through as-is
    pub conditions: Option<String>,
    /// Structured rows; a bare array or `{ "conditions": [...] }`
    #[serde(deserialize_with = "condition_rows")]
    pub conditions_ui: Vec<ConditionRow>,
    pub conditions_logic: Logic,
    /// Comma-joined on the wire; accepts `"a,b"` or `["a", "b"]`
    #[serde(deserialize_with = "field_list")]
    pub include_fields: Vec<String>,
    pub show_all_versions: Option<bool>,
    pub return_all: bool,
    pub limit: usize,
    pub page_size: Option<usize>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            conditions: None,
            conditions_ui: Vec::new(),
            conditions_logic: Logic::And,
            include_fields: Vec::new(),
            show_all_versions: None,
            return_all: false,
            limit: 50,
            page_size: None,
        }
    }
}

impl ListOptions {
    /// Everything, at the configured return-all page size
    pub fn all() -> Self {
        Self {
            return_all: true,
            ..Self::default()
        }
    }

    pub fn limited(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Compiled `conditions` parameter, if any
    pub fn compiled_conditions(&self) -> Option<String> {
        compile(
            self.conditions.as_deref(),
            &self.conditions_ui,
            self.conditions_logic,
        )
    }

    fn page_request(
        &self,
        descriptor: &OperationDescriptor,
        path: ApiPath,
        pagination: &PaginationConfig,
    ) -> PageRequest {
        let mut request = PageRequest::get(path);
        request.method = descriptor.method;

        if let Some(conditions) = self.compiled_conditions() {
            request.query.set("conditions", conditions);
        }
        if !self.include_fields.is_empty() {
            request
                .query
                .set("includeFields", self.include_fields.join(","));
        }
        if let Some(default) = descriptor.show_all_versions {
            request
                .query
                .set("showAllVersions", self.show_all_versions.unwrap_or(default));
        }

        let page_size = self.page_size.unwrap_or(pagination.default_page_size);
        let (page_size, limit) = if self.return_all {
            (page_size, None)
        } else {
            (page_size.min(self.limit), Some(self.limit))
        };

        request
            .with_page_size(clamp_page_size(page_size))
            .with_limit(limit)
    }
}

/// Rows arrive as a bare array or wrapped as `{ "conditions": [...] }`
fn condition_rows<'de, D>(deserializer: D) -> std::result::Result<Vec<ConditionRow>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(Vec::new()),
        Value::Array(rows) => Value::Array(rows),
        Value::Object(mut wrapper) => match wrapper.remove("conditions") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(rows) => rows,
        },
        other => {
            return Err(D::Error::custom(format!(
                "conditionsUi must be an array of rows or {{\"conditions\": [...]}}, got {other}"
            )))
        }
    };

    serde_json::from_value(rows).map_err(|e| D::Error::custom(format!("conditionsUi: {e}")))
}

fn field_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let fields = match Value::deserialize(deserializer)? {
        Value::String(joined) => joined.split(',').map(str::to_string).collect(),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    };

    Ok(fields
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect())
}

/// List options scoped to one quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteScopedList {
    pub quote_id: RecordId,
    #[serde(flatten)]
    pub options: ListOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum QuoteOperation {
    Get { quote_id: RecordId },
    GetAll(ListOptions),
    Delete { quote_id: RecordId },
    Copy { quote_id: RecordId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum QuoteItemOperation {
    Get {
        id: RecordId,
    },
    GetAll(ListOptions),
    Create {
        #[serde(default)]
        body_json: JsonInput,
    },
    Delete {
        id: RecordId,
    },
    Update {
        id: RecordId,
        #[serde(default)]
        patch_operations: JsonInput,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum QuoteCustomerOperation {
    GetAll {
        quote_id: RecordId,
    },
    Update {
        quote_id: RecordId,
        id: RecordId,
        #[serde(default)]
        patch_operations: JsonInput,
    },
    Replace {
        quote_id: RecordId,
        id: RecordId,
        #[serde(default)]
        customer_json: JsonInput,
    },
    Delete {
        quote_id: RecordId,
        id: RecordId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum QuoteTabOperation {
    GetAll(ListOptions),
    GetItems { id: RecordId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum QuoteTermOperation {
    GetAll(QuoteScopedList),
    Create {
        quote_id: RecordId,
        #[serde(default)]
        term_json: JsonInput,
    },
    Update {
        quote_id: RecordId,
        id: RecordId,
        #[serde(default)]
        patch_operations: JsonInput,
    },
    Delete {
        quote_id: RecordId,
        id: RecordId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum RecurringRevenueOperation {
    GetAll(ListOptions),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum TaxCodeOperation {
    GetAll(ListOptions),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum TemplateOperation {
    GetAll,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum UserOperation {
    GetAll(ListOptions),
    Update {
        user_id: RecordId,
        #[serde(default)]
        patch_operations: JsonInput,
    },
}

/// One invocation against the CPQ API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resource", rename_all = "camelCase")]
pub enum Operation {
    Quotes(QuoteOperation),
    QuoteItems(QuoteItemOperation),
    QuoteCustomers(QuoteCustomerOperation),
    QuoteTabs(QuoteTabOperation),
    QuoteTerms(QuoteTermOperation),
    RecurringRevenue(RecurringRevenueOperation),
    TaxCodes(TaxCodeOperation),
    Templates(TemplateOperation),
    User(UserOperation),
}

/// What to send and how to shape the result
#[derive(Debug, Clone)]
pub enum Plan {
    Single {
        method: HttpMethod,
        path: ApiPath,
        body: Option<Value>,
    },
    List(PageRequest),
    Unpaginated {
        method: HttpMethod,
        path: ApiPath,
    },
    Delete {
        path: ApiPath,
        id: RecordId,
    },
}

impl Operation {
    /// Resource name as used on the wire and in the catalog
    pub fn resource(&self) -> &'static str {
        match self {
            Operation::Quotes(_) => "quotes",
            Operation::QuoteItems(_) => "quoteItems",
            Operation::QuoteCustomers(_) => "quoteCustomers",
            Operation::QuoteTabs(_) => "quoteTabs",
            Operation::QuoteTerms(_) => "quoteTerms",
            Operation::RecurringRevenue(_) => "recurringRevenue",
            Operation::TaxCodes(_) => "taxCodes",
            Operation::Templates(_) => "templates",
            Operation::User(_) => "user",
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Operation::Quotes(op) => match op {
                QuoteOperation::Get { .. } => "get",
                QuoteOperation::GetAll(_) => "getAll",
                QuoteOperation::Delete { .. } => "delete",
                QuoteOperation::Copy { .. } => "copy",
            },
            Operation::QuoteItems(op) => match op {
                QuoteItemOperation::Get { .. } => "get",
                QuoteItemOperation::GetAll(_) => "getAll",
                QuoteItemOperation::Create { .. } => "create",
                QuoteItemOperation::Delete { .. } => "delete",
                QuoteItemOperation::Update { .. } => "update",
            },
            Operation::QuoteCustomers(op) => match op {
                QuoteCustomerOperation::GetAll { .. } => "getAll",
                QuoteCustomerOperation::Update { .. } => "update",
                QuoteCustomerOperation::Replace { .. } => "replace",
                QuoteCustomerOperation::Delete { .. } => "delete",
            },
            Operation::QuoteTabs(op) => match op {
                QuoteTabOperation::GetAll(_) => "getAll",
                QuoteTabOperation::GetItems { .. } => "getItems",
            },
            Operation::QuoteTerms(op) => match op {
                QuoteTermOperation::GetAll(_) => "getAll",
                QuoteTermOperation::Create { .. } => "create",
                QuoteTermOperation::Update { .. } => "update",
                QuoteTermOperation::Delete { .. } => "delete",
            },
            Operation::RecurringRevenue(RecurringRevenueOperation::GetAll(_))
            | Operation::TaxCodes(TaxCodeOperation::GetAll(_))
            | Operation::Templates(TemplateOperation::GetAll) => "getAll",
            Operation::User(op) => match op {
                UserOperation::GetAll(_) => "getAll",
                UserOperation::Update { .. } => "update",
            },
        }
    }

    /// Catalog entry for this operation
    pub fn descriptor(&self) -> Result<&'static OperationDescriptor> {
        find_descriptor(self.resource(), self.operation()).ok_or_else(|| {
            CpqError::Other(format!(
                "{}.{} has no catalog entry",
                self.resource(),
                self.operation()
            ))
        })
    }

    /// Identifiers used to fill the path template, outermost first
    fn path_ids(&self) -> Vec<(&'static str, &RecordId)> {
        match self {
            Operation::Quotes(
                QuoteOperation::Get { quote_id }
                | QuoteOperation::Delete { quote_id }
                | QuoteOperation::Copy { quote_id },
            ) => vec![("quoteId", quote_id)],
            Operation::QuoteItems(
                QuoteItemOperation::Get { id }
                | QuoteItemOperation::Delete { id }
                | QuoteItemOperation::Update { id, .. },
            ) => vec![("id", id)],
            Operation::QuoteCustomers(QuoteCustomerOperation::GetAll { quote_id }) => {
                vec![("quoteId", quote_id)]
            }
            Operation::QuoteCustomers(
                QuoteCustomerOperation::Update { quote_id, id, .. }
                | QuoteCustomerOperation::Replace { quote_id, id, .. }
                | QuoteCustomerOperation::Delete { quote_id, id },
            ) => vec![("quoteId", quote_id), ("id", id)],
            Operation::QuoteTabs(QuoteTabOperation::GetItems { id }) => vec![("id", id)],
            Operation::QuoteTerms(QuoteTermOperation::GetAll(list)) => {
                vec![("quoteId", &list.quote_id)]
            }
            Operation::QuoteTerms(QuoteTermOperation::Create { quote_id, .. }) => {
                vec![("quoteId", quote_id)]
            }
            Operation::QuoteTerms(
                QuoteTermOperation::Update { quote_id, id, .. }
                | QuoteTermOperation::Delete { quote_id, id },
            ) => vec![("quoteId", quote_id), ("id", id)],
            Operation::User(UserOperation::Update { user_id, .. }) => vec![("userId", user_id)],
            _ => Vec::new(),
        }
    }

    /// Request body, validated before anything is sent
    fn payload(&self) -> Result<Option<Value>> {
        let empty_object = || Value::Object(serde_json::Map::new());

        match self {
            Operation::QuoteItems(QuoteItemOperation::Create { body_json }) => {
                body_json.resolve("bodyJson", empty_object()).map(Some)
            }
            Operation::QuoteCustomers(QuoteCustomerOperation::Replace { customer_json, .. }) => {
                customer_json.resolve("customerJson", empty_object()).map(Some)
            }
            Operation::QuoteTerms(QuoteTermOperation::Create { term_json, .. }) => {
                term_json.resolve("termJson", empty_object()).map(Some)
            }
            Operation::QuoteItems(QuoteItemOperation::Update {
                patch_operations, ..
            })
            | Operation::QuoteCustomers(QuoteCustomerOperation::Update {
                patch_operations, ..
            })
            | Operation::QuoteTerms(QuoteTermOperation::Update {
                patch_operations, ..
            })
            | Operation::User(UserOperation::Update {
                patch_operations, ..
            }) => patch_operations.patch_body().map(Some),
            _ => Ok(None),
        }
    }

    pub fn list_options(&self) -> Option<&ListOptions> {
        match self {
            Operation::Quotes(QuoteOperation::GetAll(options))
            | Operation::QuoteItems(QuoteItemOperation::GetAll(options))
            | Operation::QuoteTabs(QuoteTabOperation::GetAll(options))
            | Operation::RecurringRevenue(RecurringRevenueOperation::GetAll(options))
            | Operation::TaxCodes(TaxCodeOperation::GetAll(options))
            | Operation::User(UserOperation::GetAll(options)) => Some(options),
            Operation::QuoteTerms(QuoteTermOperation::GetAll(list)) => Some(&list.options),
            _ => None,
        }
    }

    /// Resolve everything needed to execute this operation
    ///
    /// # Errors
    ///
    /// Returns `CpqError::Validation` for caller input problems such as
    /// malformed JSON bodies. Nothing is sent when planning fails.
    pub fn plan(&self, pagination: &PaginationConfig) -> Result<Plan> {
        let descriptor = self.descriptor()?;
        let ids = self.path_ids();
        let path = descriptor.path_for(&ids)?;

        Ok(match descriptor.kind {
            OperationKind::Single => Plan::Single {
                method: descriptor.method,
                path,
                body: self.payload()?,
            },
            OperationKind::Paginated => {
                let default_options = ListOptions::default();
                let options = self.list_options().unwrap_or(&default_options);
                Plan::List(options.page_request(descriptor, path, pagination))
            }
            OperationKind::Unpaginated => Plan::Unpaginated {
                method: descriptor.method,
                path,
            },
            OperationKind::Deletion => {
                let id = ids.last().map(|(_, id)| (*id).clone()).ok_or_else(|| {
                    CpqError::Validation(format!("{descriptor} requires a record ID"))
                })?;
                Plan::Delete { path, id }
            }
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource(), self.operation())
    }
}
