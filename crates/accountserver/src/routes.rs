use crate::error::{json_error_handler, path_error_handler, ApiError};
use crate::AppState;
use accountcore::{AccountId, NewAccount};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::info;

/// Query string accepted by the account listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    name: Option<String>,
}

/// Register every route of the service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .service(
            web::resource("/")
                .route(web::get().to(index))
                .default_service(web::to(method_not_allowed)),
        )
        .service(
            web::resource("/health")
                .route(web::get().to(health))
                .default_service(web::to(method_not_allowed)),
        )
        .service(
            web::resource("/accounts")
                .name("accounts")
                .route(web::get().to(list_accounts))
                .route(web::post().to(create_account))
                .default_service(web::to(method_not_allowed)),
        )
        .service(
            web::resource("/accounts/{id}")
                .name("account")
                .route(web::get().to(read_account))
                .route(web::put().to(update_account))
                .route(web::delete().to(delete_account))
                .default_service(web::to(method_not_allowed)),
        )
        .default_service(web::to(not_found));
}

/// Root URL response
async fn index(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let accounts = req
        .url_for_static("accounts")
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "name": "Account REST API Service",
        "version": env!("CARGO_PKG_VERSION"),
        "paths": accounts.path(),
    })))
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "OK" }))
}

/// List all accounts, optionally filtered by exact name
async fn list_accounts(
    data: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    info!("Request to list Accounts");

    let accounts = match &query.name {
        Some(name) => data.store.find_by_name(name).await?,
        None => data.store.all().await?,
    };

    info!("Returning {} accounts", accounts.len());
    Ok(HttpResponse::Ok().json(accounts))
}

/// Create a new account
async fn create_account(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<NewAccount>,
) -> Result<HttpResponse, ApiError> {
    info!("Request to create an Account");

    let account = data.store.create(payload.into_inner()).await?;
    let location = req
        .url_for("account", [account.id.to_string()])
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!("Account with id [{}] created", account.id);
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, location.to_string()))
        .json(account))
}

/// Read a single account
async fn read_account(
    data: web::Data<AppState>,
    path: web::Path<AccountId>,
) -> Result<HttpResponse, ApiError> {
    let account_id = path.into_inner();
    info!("Request to read an Account with id: {}", account_id);

    match data.store.find(account_id).await? {
        Some(account) => Ok(HttpResponse::Ok().json(account)),
        None => Err(not_found_account(account_id)),
    }
}

/// Update an existing account
async fn update_account(
    data: web::Data<AppState>,
    path: web::Path<AccountId>,
    payload: web::Json<NewAccount>,
) -> Result<HttpResponse, ApiError> {
    let account_id = path.into_inner();
    info!("Request to update an Account with id: {}", account_id);

    match data.store.update(account_id, payload.into_inner()).await? {
        Some(account) => Ok(HttpResponse::Ok().json(account)),
        None => Err(not_found_account(account_id)),
    }
}

/// Delete an account. Deleting a missing account still succeeds.
async fn delete_account(
    data: web::Data<AppState>,
    path: web::Path<AccountId>,
) -> Result<HttpResponse, ApiError> {
    let account_id = path.into_inner();
    info!("Request to delete an Account with id: {}", account_id);

    if data.store.delete(account_id).await? {
        info!("Account with id [{}] deleted", account_id);
    }
    Ok(HttpResponse::NoContent().finish())
}

async fn method_not_allowed(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    Err(ApiError::MethodNotAllowed(format!(
        "Method {} is not allowed for {}",
        req.method(),
        req.path()
    )))
}

async fn not_found(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound(format!(
        "The requested URL {} was not found",
        req.path()
    )))
}

fn not_found_account(account_id: AccountId) -> ApiError {
    ApiError::NotFound(format!(
        "Account with id [{}] could not be found.",
        account_id
    ))
}
