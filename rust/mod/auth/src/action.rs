//! Server actions: validated input, optional session, structured result.
//!
//! Every mutation and search the pages trigger goes through
//! [`unauth_action`] or [`auth_action`]. Both decode and validate the JSON
//! input before anything else runs; `auth_action` then resolves the session
//! and refuses with [`UNAUTHORIZED`] without invoking the handler when there
//! is none. Handler failures become `serverError` messages, with internal
//! errors reduced to [`skyfare_core::DEFAULT_SERVER_ERROR_MESSAGE`].

use std::collections::BTreeMap;
use std::future::Future;

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use skyfare_client::TokenPair;
use skyfare_core::ServiceError;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::session::{Session, SessionValidator};

/// Server error reported when an authenticated action has no session.
pub const UNAUTHORIZED: &str = "Unauthorized";

/// Validation key for errors that belong to the input as a whole.
pub const FORM_ERRORS: &str = "_errors";

pub type FieldErrors = BTreeMap<String, Vec<String>>;

// ── Result ──────────────────────────────────────────────────────────

/// Outcome of one action invocation, serialized as
/// `{"data": ...}`, `{"serverError": "..."}` or
/// `{"validationErrors": {"field": ["msg"]}}`, with an optional `redirect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<FieldErrors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl<T> ActionResult<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            server_error: None,
            validation_errors: None,
            redirect: None,
        }
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            server_error: Some(message.into()),
            validation_errors: None,
            redirect: None,
        }
    }

    pub fn invalid(errors: FieldErrors) -> Self {
        Self {
            data: None,
            server_error: None,
            validation_errors: Some(errors),
            redirect: None,
        }
    }

    /// Input that could not be decoded at all.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::invalid(BTreeMap::from([(FORM_ERRORS.to_string(), vec![message.into()])]))
    }

    /// Ask the client to navigate to `path`, but only if the action succeeded.
    pub fn redirect_on_success(mut self, path: impl Into<String>) -> Self {
        if self.is_success() {
            self.redirect = Some(path.into());
        }
        self
    }

    pub fn is_success(&self) -> bool {
        self.server_error.is_none() && self.validation_errors.is_none()
    }
}

// ── Phases ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPhase {
    Pending,
    ValidatingInput,
    Authorizing,
    Executing,
    Succeeded,
    Failed,
}

struct Invocation<'a> {
    name: &'a str,
    phase: ActionPhase,
}

impl<'a> Invocation<'a> {
    fn start(name: &'a str) -> Self {
        Self { name, phase: ActionPhase::Pending }
    }

    fn advance(&mut self, phase: ActionPhase) {
        tracing::debug!(action = self.name, from = ?self.phase, to = ?phase, "action phase");
        self.phase = phase;
    }

    fn invalid<T>(mut self, errors: FieldErrors) -> ActionResult<T> {
        self.advance(ActionPhase::Failed);
        tracing::debug!(action = self.name, fields = ?errors.keys().collect::<Vec<_>>(), "invalid input");
        ActionResult::invalid(errors)
    }

    fn finish<T>(mut self, outcome: Result<T, ServiceError>) -> ActionResult<T> {
        match outcome {
            Ok(data) => {
                self.advance(ActionPhase::Succeeded);
                ActionResult::success(data)
            }
            Err(e) => {
                self.advance(ActionPhase::Failed);
                match &e {
                    ServiceError::Internal(_) | ServiceError::Unavailable(_) => {
                        tracing::error!(action = self.name, error = %e, "action failed");
                    }
                    _ => tracing::debug!(action = self.name, error = %e, "action failed"),
                }
                ActionResult::server_error(e.public_message())
            }
        }
    }
}

// ── Wrappers ────────────────────────────────────────────────────────

/// Run an action that needs no session.
pub async fn unauth_action<I, T, F, Fut>(name: &str, input: Value, handler: F) -> ActionResult<T>
where
    I: DeserializeOwned + Validate,
    F: FnOnce(I) -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let mut inv = Invocation::start(name);
    inv.advance(ActionPhase::ValidatingInput);
    let input = match parse_input::<I>(input) {
        Ok(input) => input,
        Err(errors) => return inv.invalid(errors),
    };

    inv.advance(ActionPhase::Executing);
    let outcome = handler(input).await;
    inv.finish(outcome)
}

/// Run an action that needs a valid session.
///
/// The handler receives the session as context. Without one, the result is
/// [`UNAUTHORIZED`] and the handler never runs.
pub async fn auth_action<I, T, F, Fut>(
    name: &str,
    validator: &SessionValidator,
    tokens: Option<TokenPair>,
    input: Value,
    handler: F,
) -> ActionResult<T>
where
    I: DeserializeOwned + Validate,
    F: FnOnce(I, Session) -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let mut inv = Invocation::start(name);
    inv.advance(ActionPhase::ValidatingInput);
    let input = match parse_input::<I>(input) {
        Ok(input) => input,
        Err(errors) => return inv.invalid(errors),
    };

    inv.advance(ActionPhase::Authorizing);
    let Some(session) = validator.validate_tokens(tokens).await else {
        return inv.finish(Err(ServiceError::Unauthorized(UNAUTHORIZED.into())));
    };

    inv.advance(ActionPhase::Executing);
    let outcome = handler(input, session).await;
    inv.finish(outcome)
}

// ── Input ───────────────────────────────────────────────────────────

/// Decode and validate action input. A missing body counts as `{}`.
pub fn parse_input<I: DeserializeOwned + Validate>(input: Value) -> Result<I, FieldErrors> {
    let input = match input {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    let parsed: I = serde_json::from_value(input)
        .map_err(|e| BTreeMap::from([(FORM_ERRORS.to_string(), vec![e.to_string()])]))?;
    parsed.validate().map_err(|e| field_errors(&e))?;
    Ok(parsed)
}

/// Flatten validator errors into `"field"` / `"parent.field"` keys, named
/// as the fields appear in the JSON input.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    collect_errors(errors, "", &mut out);
    out
}

fn collect_errors(errors: &ValidationErrors, prefix: &str, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let field = wire_name(field);
        let key = if prefix.is_empty() {
            field
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                let messages = out.entry(key).or_default();
                messages.extend(errs.iter().map(|e| match &e.message {
                    Some(m) => m.to_string(),
                    None => e.code.to_string(),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_errors(inner, &key, out),
            ValidationErrorsKind::List(items) => {
                for (i, inner) in items {
                    collect_errors(inner, &format!("{}[{}]", key, i), out);
                }
            }
        }
    }
}

/// Input schemas name their JSON fields in camelCase, while `validator`
/// reports the Rust field name.
fn wire_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' && !out.is_empty() {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Raw JSON action input. An empty body decodes to `null`.
pub struct ActionInput(pub Value);

impl<S> FromRequest<S> for ActionInput
where
    S: Send + Sync,
{
    type Rejection = Json<ActionResult<()>>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| Json(ActionResult::invalid_input(e.body_text())))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(ActionInput(Value::Null));
        }
        serde_json::from_slice(&bytes)
            .map(ActionInput)
            .map_err(|e| Json(ActionResult::invalid_input(format!("invalid JSON: {}", e))))
    }
}
