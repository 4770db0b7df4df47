//! End-to-end behaviour of the request gate over an instrumented store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use deptadmin_auth::{GateOutcome, GateRequest, JwtDecoder, JwtEncoder, RequestGate, TokenClass};
use deptadmin_core::config::AuthConfig;
use deptadmin_core::error::AppError;
use deptadmin_core::result::AppResult;
use deptadmin_core::types::{DepartmentId, UserId};
use deptadmin_database::MemoryStore;
use deptadmin_database::store::{DepartmentStore, OperationLogStore, UserStore};
use deptadmin_entity::department::{CreateDepartment, Department, PermissionSet};
use deptadmin_entity::operation::{CreateOperationLog, OperationLog};
use deptadmin_entity::user::{CreateUser, User};

/// Memory store that counts every call and can be told to fail.
#[derive(Default)]
struct TestStore {
    inner: MemoryStore,
    calls: AtomicUsize,
    fail_user_reads: bool,
    fail_user_writes: bool,
    fail_log_writes: bool,
}

impl TestStore {
    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for TestStore {
    async fn find_user_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        self.tick();
        if self.fail_user_reads {
            return Err(AppError::database("connection reset"));
        }
        self.inner.find_user_by_id(id).await
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.tick();
        self.inner.find_user_by_username(username).await
    }

    async fn create_user(&self, data: &CreateUser) -> AppResult<User> {
        self.tick();
        self.inner.create_user(data).await
    }

    async fn save_user(&self, user: &User) -> AppResult<()> {
        self.tick();
        if self.fail_user_writes {
            return Err(AppError::service_unavailable("write timed out"));
        }
        self.inner.save_user(user).await
    }

    async fn touch_last_seen(&self, id: UserId, at: DateTime<Utc>) -> AppResult<()> {
        self.tick();
        if self.fail_user_writes {
            return Err(AppError::service_unavailable("write timed out"));
        }
        self.inner.touch_last_seen(id, at).await
    }

    async fn delete_user(&self, id: UserId) -> AppResult<bool> {
        self.tick();
        self.inner.delete_user(id).await
    }
}

#[async_trait]
impl DepartmentStore for TestStore {
    async fn find_department_by_id(&self, id: DepartmentId) -> AppResult<Option<Department>> {
        self.tick();
        self.inner.find_department_by_id(id).await
    }

    async fn create_department(&self, data: &CreateDepartment) -> AppResult<Department> {
        self.tick();
        self.inner.create_department(data).await
    }

    async fn update_department(&self, department: &Department) -> AppResult<()> {
        self.tick();
        self.inner.update_department(department).await
    }

    async fn delete_department(&self, id: DepartmentId) -> AppResult<bool> {
        self.tick();
        self.inner.delete_department(id).await
    }
}

#[async_trait]
impl OperationLogStore for TestStore {
    async fn save_operation_log(&self, entry: &CreateOperationLog) -> AppResult<OperationLog> {
        self.tick();
        if self.fail_log_writes {
            return Err(AppError::database("disk full"));
        }
        self.inner.save_operation_log(entry).await
    }

    async fn find_operation_logs_by_operator(
        &self,
        operator_id: UserId,
        on: Option<NaiveDate>,
    ) -> AppResult<Vec<OperationLog>> {
        self.tick();
        self.inner.find_operation_logs_by_operator(operator_id, on).await
    }
}

fn config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "gate-pipeline-secret".to_string(),
        ..AuthConfig::default()
    }
}

struct Fixture {
    store: Arc<TestStore>,
    gate: RequestGate,
    encoder: JwtEncoder,
    member: User,
    department: Department,
}

async fn fixture(store: TestStore) -> Fixture {
    let config = config();
    let department = store
        .inner
        .create_department(&CreateDepartment {
            name: "Sales".to_string(),
            description: "sales team".to_string(),
            active: true,
            permissions: PermissionSet::new().with("dept", ["edit", "view"]),
        })
        .await
        .unwrap();
    let member = store
        .inner
        .create_user(&CreateUser {
            username: "p".to_string(),
            name: "P".to_string(),
            email: "p@example.com".to_string(),
            password_hash: String::new(),
            department_id: Some(department.id),
            remark: String::new(),
        })
        .await
        .unwrap();

    let store = Arc::new(store);
    let gate = RequestGate::over_store(JwtDecoder::new(&config), store.clone());
    Fixture {
        store,
        gate,
        encoder: JwtEncoder::new(&config),
        member,
        department,
    }
}

impl Fixture {
    fn access_request(&self) -> GateRequest {
        let token = self
            .encoder
            .issue_access(self.member.id, Duration::hours(2))
            .unwrap();
        GateRequest::with_token(token).from_ip("10.0.0.8")
    }
}

#[tokio::test]
async fn test_no_token_is_rejected_without_store_access() {
    let fx = fixture(TestStore::default()).await;
    let invoked = Arc::new(AtomicUsize::new(0));
    let counter = invoked.clone();
    let guarded = fx.gate.guard(move |_user: User| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    let outcome = guarded.call(&GateRequest::default()).await;

    assert!(matches!(outcome, GateOutcome::Unauthenticated));
    assert_eq!(fx.store.calls(), 0);
    assert_eq!(invoked.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_access_token_for_subject_42_resolves_and_touches() {
    let store = TestStore::default();
    for n in 0..42 {
        store
            .inner
            .create_user(&CreateUser {
                username: format!("user{n}"),
                name: String::new(),
                email: format!("user{n}@example.com"),
                password_hash: String::new(),
                department_id: None,
                remark: String::new(),
            })
            .await
            .unwrap();
    }
    let config = config();
    let store = Arc::new(store);
    let gate = RequestGate::over_store(JwtDecoder::new(&config), store.clone());

    let issued_at = Utc::now();
    let token = JwtEncoder::new(&config)
        .issue_access(UserId(42), Duration::seconds(3600))
        .unwrap();
    let outcome = gate
        .guard(|user: User| async move { user.id })
        .call(&GateRequest::with_token(token))
        .await;

    let GateOutcome::Allowed { principal, output } = outcome else {
        panic!("expected the operation to run");
    };
    assert_eq!(output, UserId(42));
    assert_eq!(principal.id, UserId(42));
    let stored = store.inner.find_user_by_id(UserId(42)).await.unwrap().unwrap();
    assert!(stored.last_seen.timestamp() >= issued_at.timestamp());
}

#[tokio::test]
async fn test_refresh_expired_and_foreign_tokens_are_unauthenticated() {
    let fx = fixture(TestStore::default()).await;
    let guarded = fx.gate.guard(|_user: User| async {});

    let refresh = fx
        .encoder
        .issue_refresh(fx.member.id, Duration::days(30))
        .unwrap();
    let expired = fx
        .encoder
        .issue_class_at(
            fx.member.id,
            TokenClass::Access,
            Utc::now() - Duration::hours(3),
            Duration::hours(2),
        )
        .unwrap();
    let foreign = JwtEncoder::new(&AuthConfig {
        jwt_secret: "some-other-key".to_string(),
        ..config()
    })
    .issue_access(fx.member.id, Duration::hours(2))
    .unwrap();

    for token in [refresh, expired, foreign, "garbage".to_string()] {
        let outcome = guarded.call(&GateRequest::with_token(token)).await;
        assert!(matches!(outcome, GateOutcome::Unauthenticated));
    }
}

#[tokio::test]
async fn test_sales_permissions_are_enforced() {
    let fx = fixture(TestStore::default()).await;
    let request = fx.access_request();

    let edit = fx.gate.guard(|_user: User| async { "edited" }).require("dept", "edit");
    let delete = fx.gate.guard(|_user: User| async { "deleted" }).require("dept", "delete");
    let other = fx.gate.guard(|_user: User| async { "viewed" }).require("other", "view");

    assert_eq!(edit.call(&request).await.into_output(), Some("edited"));
    assert!(matches!(delete.call(&request).await, GateOutcome::Forbidden));
    assert!(matches!(other.call(&request).await, GateOutcome::Forbidden));
}

#[tokio::test]
async fn test_inactive_department_is_forbidden() {
    let fx = fixture(TestStore::default()).await;
    let mut department = fx.department.clone();
    department.active = false;
    fx.store.inner.update_department(&department).await.unwrap();

    let outcome = fx
        .gate
        .guard(|_user: User| async {})
        .require("dept", "edit")
        .call(&fx.access_request())
        .await;
    assert!(matches!(outcome, GateOutcome::Forbidden));
}

#[tokio::test]
async fn test_malformed_permission_data_is_forbidden() {
    let fx = fixture(TestStore::default()).await;
    let mut department = fx.department.clone();
    department.permissions = "not json".to_string();
    fx.store.inner.update_department(&department).await.unwrap();

    let outcome = fx
        .gate
        .guard(|_user: User| async {})
        .require("dept", "view")
        .call(&fx.access_request())
        .await;
    assert!(matches!(outcome, GateOutcome::Forbidden));
}

#[tokio::test]
async fn test_audit_entry_is_written_before_the_operation() {
    let fx = fixture(TestStore::default()).await;
    let store = fx.store.clone();
    let guarded = fx
        .gate
        .guard(move |user: User| {
            let store = store.clone();
            async move {
                store
                    .inner
                    .find_operation_logs_by_operator(user.id, None)
                    .await
                    .unwrap()
                    .len()
            }
        })
        .require("dept", "view")
        .audited("view departments");

    let outcome = guarded.call(&fx.access_request()).await;
    assert_eq!(outcome.into_output(), Some(1));

    let logs = fx.store.inner.operation_logs().await;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].operator_id, fx.member.id);
    assert_eq!(logs[0].description, "view departments");
    assert_eq!(logs[0].ip.as_deref(), Some("10.0.0.8"));
}

#[tokio::test]
async fn test_denied_requests_are_not_audited() {
    let fx = fixture(TestStore::default()).await;
    let outcome = fx
        .gate
        .guard(|_user: User| async {})
        .require("dept", "delete")
        .audited("delete department")
        .call(&fx.access_request())
        .await;

    assert!(matches!(outcome, GateOutcome::Forbidden));
    assert!(fx.store.inner.operation_logs().await.is_empty());
}

#[tokio::test]
async fn test_side_effect_failures_do_not_abort_the_operation() {
    let fx = fixture(TestStore {
        fail_user_writes: true,
        fail_log_writes: true,
        ..TestStore::default()
    })
    .await;

    let outcome = fx
        .gate
        .guard(|_user: User| async { 7 })
        .require("dept", "view")
        .audited("view departments")
        .call(&fx.access_request())
        .await;
    assert_eq!(outcome.into_output(), Some(7));
}

#[tokio::test]
async fn test_identity_store_failure_is_unauthenticated() {
    let fx = fixture(TestStore {
        fail_user_reads: true,
        ..TestStore::default()
    })
    .await;

    let outcome = fx
        .gate
        .guard(|_user: User| async {})
        .call(&fx.access_request())
        .await;
    assert!(matches!(outcome, GateOutcome::Unauthenticated));
}

#[tokio::test]
async fn test_guarded_operation_is_shared_across_tasks() {
    let fx = fixture(TestStore::default()).await;
    let guarded = Arc::new(
        fx.gate
            .guard(|user: User| async move { user.id })
            .require("dept", "view"),
    );

    let mut handles = Vec::new();
    for _ in 0..8 {
        let guarded = guarded.clone();
        let request = fx.access_request();
        handles.push(tokio::spawn(async move {
            guarded.call(&request).await.into_output()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), Some(fx.member.id));
    }
}

#[tokio::test]
async fn test_user_without_department_is_forbidden_but_authenticated() {
    let fx = fixture(TestStore::default()).await;
    let loner = fx
        .store
        .inner
        .create_user(&CreateUser {
            username: "loner".to_string(),
            name: String::new(),
            email: "loner@example.com".to_string(),
            password_hash: String::new(),
            department_id: None,
            remark: String::new(),
        })
        .await
        .unwrap();
    let token = fx.encoder.issue_access(loner.id, Duration::hours(1)).unwrap();
    let request = GateRequest::with_token(token);

    let plain = fx.gate.guard(|_user: User| async { true }).call(&request).await;
    assert!(plain.is_allowed());

    let guarded = fx
        .gate
        .guard(|_user: User| async { true })
        .require("dept", "view")
        .call(&request)
        .await;
    assert!(matches!(guarded, GateOutcome::Forbidden));
}
