use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::auth::AuthenticatedUser;
use crate::db::models::User;
use crate::error::{AppError, AuthError, DatabaseError};
use crate::AppState;
use tracing::{info, warn, error};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthenticateRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

pub async fn create_user(
    req: web::Json<CreateUserRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    info!("Received registration request for username: {}", req.username);

    let username = req.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::ValidationError("username must not be empty".into()));
    }
    if req.password.trim().is_empty() {
        return Err(AppError::ValidationError("password must not be blank".into()));
    }

    let passwords = state.passwords.clone();
    let password = req.password;
    let digest = web::block(move || passwords.hash(&password)).await??;

    let user = User::new(username, req.first_name, req.last_name, digest);
    let user = match state.users.create(&user).await {
        Ok(user) => user,
        Err(e) => {
            error!("Registration failed for username: {}: {}", user.username, e);
            return Err(e);
        }
    };

    let token = state.tokens.sign(&user)?;
    info!(user_id = %user.id, "Registration successful for username: {}", user.username);
    Ok(HttpResponse::Created().json(AuthResponse { token }))
}

pub async fn authenticate(
    req: web::Json<AuthenticateRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    info!("Received login request for username: {}", req.username);

    let Some(user) = state.users.find_by_username(req.username.trim()).await? else {
        warn!("Login failed for unknown username: {}", req.username);
        return Err(AuthError::InvalidCredentials.into());
    };

    let passwords = state.passwords.clone();
    let digest = user.password_digest.clone();
    let password = req.password;
    let valid = web::block(move || passwords.verify(&password, &digest)).await??;

    if !valid {
        warn!("Login failed for username: {}: wrong password", user.username);
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.tokens.sign(&user)?;
    info!("Login successful for username: {}", user.username);
    Ok(HttpResponse::Ok().json(AuthResponse { token }))
}

pub async fn list_users(
    _caller: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let users = state.users.list().await?;
    Ok(HttpResponse::Ok().json(users))
}

pub async fn show_user(
    _caller: AuthenticatedUser,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or(DatabaseError::NotFound)?;

    Ok(HttpResponse::Ok().json(user))
}
