// crates/accountserver/tests/error_handlers_test.rs

use accountcore::{Account, AccountError, AccountId, AccountStore, MemoryAccountStore, NewAccount};
use accountserver::AppState;
use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

/// Store whose every operation fails like a lost database connection
struct FailingStore;

#[async_trait]
impl AccountStore for FailingStore {
    async fn init(&self) -> accountcore::Result<()> {
        Ok(())
    }

    async fn reset(&self) -> accountcore::Result<()> {
        Err(AccountError::Storage("DB Error".into()))
    }

    async fn create(&self, _account: NewAccount) -> accountcore::Result<Account> {
        Err(AccountError::Storage("DB Error".into()))
    }

    async fn find(&self, _id: AccountId) -> accountcore::Result<Option<Account>> {
        Err(AccountError::Storage("DB Error".into()))
    }

    async fn find_by_name(&self, _name: &str) -> accountcore::Result<Vec<Account>> {
        Err(AccountError::Storage("DB Error".into()))
    }

    async fn all(&self) -> accountcore::Result<Vec<Account>> {
        Err(AccountError::Storage("DB Error".into()))
    }

    async fn update(
        &self,
        _id: AccountId,
        _account: NewAccount,
    ) -> accountcore::Result<Option<Account>> {
        Err(AccountError::Storage("DB Error".into()))
    }

    async fn delete(&self, _id: AccountId) -> accountcore::Result<bool> {
        Err(AccountError::Storage("DB Error".into()))
    }

    async fn remove_all(&self) -> accountcore::Result<()> {
        Err(AccountError::Storage("DB Error".into()))
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

macro_rules! init_app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new($store)))
                .configure(accountserver::configure),
        )
        .await
    };
}

/// Shared buffer the test subscriber writes formatted events into
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Captures events for the current thread while alive.
///
/// `actix_web::test` runs the service on the test thread, so handler
/// events land in this subscriber.
struct LogCapture {
    buffer: LogBuffer,
    _guard: DefaultGuard,
}

impl LogCapture {
    fn install() -> Self {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        Self {
            buffer,
            _guard: guard,
        }
    }

    /// Lines emitted by the error handler
    fn error_handler_lines(&self) -> Vec<String> {
        let bytes = self.buffer.0.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.contains("accountserver::error"))
            .map(str::to_string)
            .collect()
    }

    /// Client errors log at WARN, server errors at ERROR, never the other way round
    fn assert_logged_for(&self, status: StatusCode) {
        let lines = self.error_handler_lines();
        let (expected, unexpected) = if status.is_server_error() {
            ("ERROR", "WARN")
        } else {
            ("WARN", "ERROR")
        };

        assert!(
            lines.iter().any(|line| line.contains(expected)),
            "expected a {} line for {}, got {:?}",
            expected,
            status,
            lines
        );
        assert!(
            !lines.iter().any(|line| line.contains(unexpected)),
            "unexpected {} line for {}: {:?}",
            unexpected,
            status,
            lines
        );
    }
}

fn memory_store() -> Arc<dyn AccountStore> {
    Arc::new(MemoryAccountStore::new())
}

async fn assert_error_body<B: MessageBody>(
    resp: ServiceResponse<B>,
    status: StatusCode,
    logs: &LogCapture,
) {
    assert_eq!(resp.status(), status);
    logs.assert_logged_for(status);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], status.as_u16());
    assert_eq!(body["error"], status.canonical_reason().unwrap());
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[actix_web::test]
async fn test_bad_request() {
    let logs = LogCapture::install();
    let app = init_app!(memory_store());

    let req = test::TestRequest::post()
        .uri("/accounts")
        .set_json(json!({ "invalid": "data" }))
        .to_request();
    assert_error_body(test::call_service(&app, req).await, StatusCode::BAD_REQUEST, &logs).await;
}

#[actix_web::test]
async fn test_validation_failure_is_bad_request() {
    let logs = LogCapture::install();
    let app = init_app!(memory_store());

    let req = test::TestRequest::post()
        .uri("/accounts")
        .set_json(json!({
            "name": "x".repeat(65),
            "email": "a@example.com",
            "address": "Somewhere"
        }))
        .to_request();
    assert_error_body(test::call_service(&app, req).await, StatusCode::BAD_REQUEST, &logs).await;
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let logs = LogCapture::install();
    let app = init_app!(memory_store());

    let req = test::TestRequest::post()
        .uri("/accounts")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    assert_error_body(test::call_service(&app, req).await, StatusCode::BAD_REQUEST, &logs).await;
}

#[actix_web::test]
async fn test_non_numeric_id_is_bad_request() {
    let logs = LogCapture::install();
    let app = init_app!(memory_store());

    let req = test::TestRequest::get().uri("/accounts/abc").to_request();
    assert_error_body(test::call_service(&app, req).await, StatusCode::BAD_REQUEST, &logs).await;
}

#[actix_web::test]
async fn test_not_found() {
    let logs = LogCapture::install();
    let app = init_app!(memory_store());

    let req = test::TestRequest::get().uri("/accounts/0").to_request();
    assert_error_body(test::call_service(&app, req).await, StatusCode::NOT_FOUND, &logs).await;
}

#[actix_web::test]
async fn test_unknown_path_not_found() {
    let logs = LogCapture::install();
    let app = init_app!(memory_store());

    let req = test::TestRequest::get().uri("/nowhere").to_request();
    assert_error_body(test::call_service(&app, req).await, StatusCode::NOT_FOUND, &logs).await;
}

#[actix_web::test]
async fn test_method_not_allowed() {
    let logs = LogCapture::install();
    let app = init_app!(memory_store());

    let req = test::TestRequest::delete().uri("/accounts").to_request();
    assert_error_body(test::call_service(&app, req).await, StatusCode::METHOD_NOT_ALLOWED, &logs).await;
}

#[actix_web::test]
async fn test_unsupported_media_type() {
    let logs = LogCapture::install();
    let app = init_app!(memory_store());

    let req = test::TestRequest::post()
        .uri("/accounts")
        .insert_header((header::CONTENT_TYPE, "text/plain"))
        .set_payload("invalid data")
        .to_request();
    assert_error_body(
        test::call_service(&app, req).await,
        StatusCode::UNSUPPORTED_MEDIA_TYPE,
        &logs,
    )
    .await;
}

#[actix_web::test]
async fn test_missing_content_type_is_unsupported() {
    let logs = LogCapture::install();
    let app = init_app!(memory_store());

    let req = test::TestRequest::post()
        .uri("/accounts")
        .set_payload(r#"{"name":"a","email":"b","address":"c"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    logs.assert_logged_for(StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[actix_web::test]
async fn test_internal_server_error() {
    let logs = LogCapture::install();
    let app = init_app!(Arc::new(FailingStore));

    let req = test::TestRequest::get().uri("/accounts/1").to_request();
    assert_error_body(
        test::call_service(&app, req).await,
        StatusCode::INTERNAL_SERVER_ERROR,
        &logs,
    )
    .await;
}

#[actix_web::test]
async fn test_delete_storage_failure_is_internal() {
    let logs = LogCapture::install();
    let app = init_app!(Arc::new(FailingStore));

    let req = test::TestRequest::delete().uri("/accounts/1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    logs.assert_logged_for(StatusCode::INTERNAL_SERVER_ERROR);
}
