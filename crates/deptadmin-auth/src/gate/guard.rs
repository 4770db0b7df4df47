//! The request gate and the operations it guards.
//!
//! A guarded call runs a fixed pipeline: resolve the token, check the
//! required permission, write the audit entry, then invoke the operation
//! with the resolved principal.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use deptadmin_database::store::{DepartmentStore, OperationLogStore, UserStore};
use deptadmin_entity::operation::CreateOperationLog;
use deptadmin_entity::user::User;

use crate::jwt::JwtDecoder;
use crate::permission::PermissionEvaluator;
use crate::session::SessionResolver;

/// What the transport layer hands to the gate for one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateRequest {
    /// Raw token value, if the caller sent one.
    pub token: Option<String>,
    /// Caller IP address, recorded on audited operations.
    pub ip_address: Option<String>,
}

impl GateRequest {
    /// A request carrying `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ip_address: None,
        }
    }

    /// Attach the caller IP address.
    pub fn from_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }
}

/// Result of a guarded call.
#[derive(Debug, Clone)]
pub enum GateOutcome<T> {
    /// The operation ran.
    Allowed {
        /// The resolved caller.
        principal: User,
        /// What the operation returned.
        output: T,
    },
    /// No valid access token; the operation did not run.
    Unauthenticated,
    /// The caller lacks the required permission; the operation did not run.
    Forbidden,
}

impl<T> GateOutcome<T> {
    /// Whether the operation ran.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// The operation output, if it ran.
    pub fn into_output(self) -> Option<T> {
        match self {
            Self::Allowed { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// Shared entry point that builds guarded operations.
///
/// Holds no per-request state and may be cloned freely across tasks.
#[derive(Clone)]
pub struct RequestGate {
    resolver: Arc<SessionResolver>,
    evaluator: Arc<PermissionEvaluator>,
    audit: Arc<dyn OperationLogStore>,
}

impl std::fmt::Debug for RequestGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGate")
            .field("resolver", &self.resolver)
            .field("evaluator", &self.evaluator)
            .finish_non_exhaustive()
    }
}

impl RequestGate {
    /// Creates a gate from its collaborators.
    pub fn new(
        resolver: Arc<SessionResolver>,
        evaluator: Arc<PermissionEvaluator>,
        audit: Arc<dyn OperationLogStore>,
    ) -> Self {
        Self {
            resolver,
            evaluator,
            audit,
        }
    }

    /// Creates a gate whose collaborators all read from one store.
    pub fn over_store<S>(decoder: JwtDecoder, store: Arc<S>) -> Self
    where
        S: UserStore + DepartmentStore + OperationLogStore + 'static,
    {
        let resolver = SessionResolver::new(decoder, store.clone());
        let evaluator = PermissionEvaluator::new(store.clone());
        Self::new(Arc::new(resolver), Arc::new(evaluator), store)
    }

    /// Wrap `operation`. Without further configuration the guarded operation
    /// only requires authentication.
    pub fn guard<F>(&self, operation: F) -> Guarded<F> {
        Guarded {
            gate: self.clone(),
            operation,
            permission: None,
            audit: None,
        }
    }
}

/// An operation wrapped by a [`RequestGate`].
#[derive(Clone)]
pub struct Guarded<F> {
    gate: RequestGate,
    operation: F,
    permission: Option<(String, String)>,
    audit: Option<String>,
}

impl<F> Guarded<F> {
    /// Require `action` on `resource` in addition to authentication.
    pub fn require(mut self, resource: impl Into<String>, action: impl Into<String>) -> Self {
        self.permission = Some((resource.into(), action.into()));
        self
    }

    /// Record an operation log entry with `description` before each run.
    pub fn audited(mut self, description: impl Into<String>) -> Self {
        self.audit = Some(description.into());
        self
    }

    /// Run the pipeline for one request.
    pub async fn call<Fut, T>(&self, request: &GateRequest) -> GateOutcome<T>
    where
        F: Fn(User) -> Fut,
        Fut: Future<Output = T>,
    {
        let principal = match self.gate.resolver.resolve(request.token.as_deref()).await {
            Ok(principal) => principal,
            Err(e) => {
                info!(reason = %e, "Request rejected: unauthenticated");
                return GateOutcome::Unauthenticated;
            }
        };

        if let Some((resource, action)) = &self.permission {
            if let Err(e) = self.gate.evaluator.check(&principal, resource, action).await {
                info!(user_id = %principal.id, resource = %resource, action = %action, reason = %e, "Request rejected: forbidden");
                return GateOutcome::Forbidden;
            }
        }

        if let Some(description) = &self.audit {
            let entry = CreateOperationLog {
                operator_id: principal.id,
                description: description.clone(),
                ip: request.ip_address.clone(),
            };
            if let Err(e) = self.gate.audit.save_operation_log(&entry).await {
                warn!(user_id = %principal.id, error = %e, "Failed to write operation log");
            }
        }

        let output = (self.operation)(principal.clone()).await;
        GateOutcome::Allowed { principal, output }
    }
}
