/// Authentication API routes: login, token refresh, logout and OTP requests
use crate::{
    error::{Result, ServerError},
    extract::Json,
    response::ApiResponse,
    services::{otp, otp::OtpPurpose, producer},
    state::AppState,
    validation::{self, Validate},
};
use axum::extract::State;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use freetunes_core::{TunesError, UserId};
use freetunes_storage::{authentications, users};
use serde::Deserialize;
use serde_json::json;

/// Cookie carrying the refresh token
pub const REFRESH_COOKIE: &str = "refresh-token";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<()> {
        validation::required("usernameOrEmail", &self.username_or_email)?;
        validation::required("password", &self.password)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    pub user_id: String,
}

impl Validate for VerificationRequest {
    fn validate(&self) -> Result<()> {
        validation::required("userId", &self.user_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

impl Validate for ForgotPasswordRequest {
    fn validate(&self) -> Result<()> {
        validation::email("email", &self.email)
    }
}

/// Refresh cookie living as long as the token it carries
fn refresh_cookie(token: String, lifetime: chrono::Duration) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(lifetime.num_seconds()))
        .build()
}

fn refresh_token_from(jar: &CookieJar) -> Result<String> {
    jar.get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ServerError::Auth("Missing refresh token".to_string()))
}

/// POST /authentications
/// Log in with a username or email and receive an access token
///
/// The refresh token is stored and handed out as an HTTP-only cookie.
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, ApiResponse)> {
    req.validate()?;

    let credentials = users::find_credentials(app_state.pool(), req.username_or_email.trim()).await?;
    let user_id = app_state
        .auth_service
        .check_credentials(&req.password, credentials.as_ref())?;

    let access_token = app_state.auth_service.create_access_token(&user_id)?;
    let refresh_token = app_state.auth_service.create_refresh_token(&user_id)?;
    authentications::add_refresh_token(app_state.pool(), &refresh_token).await?;

    tracing::info!(user = %user_id, "User logged in");

    Ok((
        jar.add(refresh_cookie(
            refresh_token,
            app_state.auth_service.refresh_token_lifetime(),
        )),
        ApiResponse::data(json!({ "accessToken": access_token })).created(),
    ))
}

/// PUT /authentications
/// Exchange the refresh cookie for a new access token
pub async fn refresh(State(app_state): State<AppState>, jar: CookieJar) -> Result<ApiResponse> {
    let refresh_token = refresh_token_from(&jar)?;

    authentications::verify_refresh_token(app_state.pool(), &refresh_token).await?;
    let user_id = app_state.auth_service.verify_refresh_token(&refresh_token)?;
    let access_token = app_state.auth_service.create_access_token(&user_id)?;

    Ok(ApiResponse::data(json!({ "accessToken": access_token })))
}

/// DELETE /authentications
/// Forget the refresh token and clear the cookie
pub async fn logout(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse)> {
    let refresh_token = refresh_token_from(&jar)?;

    authentications::verify_refresh_token(app_state.pool(), &refresh_token).await?;
    authentications::delete_refresh_token(app_state.pool(), &refresh_token).await?;

    Ok((
        jar.remove(Cookie::build(REFRESH_COOKIE).path("/")),
        ApiResponse::message("Refresh token deleted"),
    ))
}

/// POST /authentications/verifications
/// Send a fresh verification code to an unverified account
pub async fn request_verification(
    State(app_state): State<AppState>,
    Json(req): Json<VerificationRequest>,
) -> Result<ApiResponse> {
    req.validate()?;

    let user_id = UserId::new(req.user_id);
    let user = users::get_by_id(app_state.pool(), &user_id)
        .await?
        .ok_or_else(|| TunesError::not_found("User not found"))?;

    if user.is_active {
        return Err(TunesError::invariant("Account is already verified").into());
    }

    let code = otp::issue(app_state.codes.as_ref(), OtpPurpose::Verify, &user.id).await?;
    producer::publish(
        &app_state.producer,
        producer::ROUTE_AUTH_VERIFY,
        json!({ "userId": user.id, "email": user.email, "otp": code }),
    );

    Ok(ApiResponse::message("Verification code sent").created())
}

/// POST /authentications/forgotpassword
/// Send a password reset code to the account owning `email`
pub async fn forgot_password(
    State(app_state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<ApiResponse> {
    req.validate()?;

    let user = users::get_by_email(app_state.pool(), req.email.trim())
        .await?
        .ok_or_else(|| TunesError::not_found("User not found"))?;

    let code = otp::issue(app_state.codes.as_ref(), OtpPurpose::Forgot, &user.id).await?;
    producer::publish(
        &app_state.producer,
        producer::ROUTE_AUTH_FORGOT,
        json!({
            "userId": user.id,
            "username": user.username,
            "email": user.email,
            "otp": code,
        }),
    );

    Ok(ApiResponse::data(json!({ "userId": user.id }))
        .with_message("Password reset code sent")
        .created())
}
