/// Users API routes: registration, profiles, verification and follows
use crate::{
    api::uploads,
    error::Result,
    extract::{Json, Payload, Query},
    middleware::AuthenticatedUser,
    response::{with_fields, ApiResponse},
    services::{file_storage::BUCKET_PICTURES, otp, otp::OtpPurpose},
    state::AppState,
    validation::{self, Validate},
};
use axum::extract::{Multipart, Path, State};
use freetunes_core::{
    types::{CreateUser, UpdateUser, UserSummary},
    LikeTarget, Page, TunesError, User, UserFilter, UserId,
};
use freetunes_storage::{albums, follows, songs, users};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub fullname: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<()> {
        validation::email("email", &self.email)?;
        validation::username("username", &self.username)?;
        validation::required("password", &self.password)?;
        validation::required("fullname", &self.fullname)?;
        validation::max_len("fullname", &self.fullname, 100)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub fullname: String,
    #[serde(default)]
    pub description: String,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<()> {
        validation::required("fullname", &self.fullname)?;
        validation::max_len("fullname", &self.fullname, 100)?;
        validation::max_len("description", &self.description, 500)
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub otp: String,
}

impl Validate for VerifyRequest {
    fn validate(&self) -> Result<()> {
        validation::otp(&self.otp)
    }
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub otp: String,
    pub password: String,
}

impl Validate for ResetPasswordRequest {
    fn validate(&self) -> Result<()> {
        validation::otp(&self.otp)?;
        validation::required("password", &self.password)
    }
}

#[derive(Debug, Deserialize)]
pub struct EditEmailRequest {
    pub email: String,
}

impl Validate for EditEmailRequest {
    fn validate(&self) -> Result<()> {
        validation::email("email", &self.email)
    }
}

async fn existing_user(app_state: &AppState, user_id: &UserId) -> Result<User> {
    Ok(users::get_by_id(app_state.pool(), user_id)
        .await?
        .ok_or_else(|| TunesError::not_found("User not found"))?)
}

fn ensure_self(auth: &AuthenticatedUser, user_id: &UserId) -> Result<()> {
    if auth.user_id() != user_id {
        return Err(TunesError::forbidden("You are not allowed to modify this user").into());
    }
    Ok(())
}

/// POST /users
/// Register a new, not yet verified account
pub async fn register(
    State(app_state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<ApiResponse> {
    req.validate()?;

    let password_hash = app_state.auth_service.hash_password(&req.password)?;
    let user_id = users::create(
        app_state.pool(),
        &CreateUser {
            email: req.email.trim().to_string(),
            username: req.username.trim().to_string(),
            password_hash,
            fullname: req.fullname.trim().to_string(),
        },
    )
    .await?;

    tracing::info!(user = %user_id, "User registered");

    Ok(ApiResponse::data(json!({ "userId": user_id }))
        .with_message("User registered")
        .created())
}

/// GET /users
/// Search active users by fullname and username
pub async fn search(
    State(app_state): State<AppState>,
    Query(filter): Query<UserFilter>,
    Query(page): Query<Page>,
) -> Result<ApiResponse> {
    let users = users::search(app_state.pool(), &filter, page).await?;
    Ok(ApiResponse::data(json!({ "users": users })))
}

/// GET /users/popular
pub async fn popular(
    State(app_state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<ApiResponse> {
    let users = users::popular(app_state.pool(), page).await?;
    Ok(ApiResponse::data(json!({ "users": users })))
}

/// GET /users/me
/// Caller's own account with follower ids and listening aggregates
pub async fn me(State(app_state): State<AppState>, auth: AuthenticatedUser) -> Result<ApiResponse> {
    let pool = app_state.pool();
    let user = existing_user(&app_state, auth.user_id()).await?;

    let followers = follows::followers(pool, &user.id).await?;
    let listened_count = users::listened_count(pool, &user.id).await?;
    let liked_count = users::liked_count(pool, &user.id).await?;

    let user = with_fields(
        user,
        json!({
            "followers": followers,
            "listenedCount": listened_count,
            "likedCount": liked_count,
        }),
    )?;

    Ok(ApiResponse::data(json!({ "user": user })))
}

/// GET /users/followed
/// Artists the caller follows
pub async fn followed(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse> {
    let users = users::followed_by(app_state.pool(), auth.user_id()).await?;
    Ok(ApiResponse::data(json!({ "users": users })))
}

/// GET /users/:id
/// Public profile with followers, albums and singles
pub async fn get_user(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<ApiResponse> {
    let pool = app_state.pool();
    let user = existing_user(&app_state, &UserId::new(id)).await?;

    let followers = follows::followers(pool, &user.id).await?;

    let mut album_values = Vec::new();
    for album in albums::public_by_artist(pool, &user.id).await? {
        let likes = app_state
            .likes
            .get_likes(&LikeTarget::Album(album.id.clone()))
            .await?;
        album_values.push(with_fields(album, json!({ "likes": likes.user_ids }))?);
    }

    let mut single_values = Vec::new();
    for song in songs::public_singles_by_artist(pool, &user.id).await? {
        let likes = app_state
            .likes
            .get_likes(&LikeTarget::Song(song.id.clone()))
            .await?;
        single_values.push(with_fields(song, json!({ "likes": likes.user_ids }))?);
    }

    let profile = UserSummary {
        id: user.id,
        username: user.username,
        fullname: user.fullname,
        description: user.description,
        picture: user.picture,
    };
    let user: Value = with_fields(
        profile,
        json!({
            "followers": followers,
            "albums": album_values,
            "singles": single_values,
        }),
    )?;

    Ok(ApiResponse::data(json!({ "user": user })))
}

/// PUT /users/:id
/// Edit the caller's own profile
pub async fn update_user(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    payload: Payload,
) -> Result<ApiResponse> {
    let user_id = UserId::new(id);
    ensure_self(&auth, &user_id)?;
    let req: UpdateUserRequest = payload.parse()?;
    req.validate()?;

    users::update_profile(
        app_state.pool(),
        &user_id,
        &UpdateUser {
            fullname: req.fullname.trim().to_string(),
            description: req.description,
        },
    )
    .await?;

    Ok(ApiResponse::message("User updated"))
}

/// POST /users/:id/verify
/// Activate an account with the code sent by e-mail
pub async fn verify(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<ApiResponse> {
    req.validate()?;

    let user = existing_user(&app_state, &UserId::new(id)).await?;
    if user.is_active {
        return Err(TunesError::invariant("Account is already verified").into());
    }

    otp::consume(app_state.codes.as_ref(), OtpPurpose::Verify, &user.id, &req.otp).await?;
    users::activate(app_state.pool(), &user.id).await?;

    tracing::info!(user = %user.id, "Account verified");

    Ok(ApiResponse::message("Account verified").created())
}

/// PUT /users/:id/resetpassword
/// Set a new password with the code sent by e-mail
pub async fn reset_password(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<ApiResponse> {
    req.validate()?;

    let user = existing_user(&app_state, &UserId::new(id)).await?;
    otp::consume(app_state.codes.as_ref(), OtpPurpose::Forgot, &user.id, &req.otp).await?;

    let password_hash = app_state.auth_service.hash_password(&req.password)?;
    users::update_password(app_state.pool(), &user.id, &password_hash).await?;

    Ok(ApiResponse::message("Password updated"))
}

/// PUT /users/:id/editemail
/// Correct the e-mail address of an account that is not verified yet
pub async fn edit_email(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    Json(req): Json<EditEmailRequest>,
) -> Result<ApiResponse> {
    req.validate()?;

    users::update_email(app_state.pool(), &UserId::new(id), req.email.trim()).await?;

    Ok(ApiResponse::message("Email updated"))
}

/// POST /users/:id/follow
pub async fn follow(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse> {
    follows::follow(app_state.pool(), auth.user_id(), &UserId::new(id)).await?;
    Ok(ApiResponse::message("Artist followed").created())
}

/// DELETE /users/:id/follow
pub async fn unfollow(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse> {
    follows::unfollow(app_state.pool(), auth.user_id(), &UserId::new(id)).await?;
    Ok(ApiResponse::message("Artist unfollowed"))
}

/// GET /users/:id/follow
/// Number of followers of an artist
pub async fn follower_count(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<ApiResponse> {
    let user = existing_user(&app_state, &UserId::new(id)).await?;
    let followers = follows::followers(app_state.pool(), &user.id).await?;

    Ok(ApiResponse::data(json!({ "followers": followers.len() })))
}

/// POST /users/:id/pictures
/// Upload the caller's profile picture
pub async fn upload_picture(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<ApiResponse> {
    let user_id = UserId::new(id);
    ensure_self(&auth, &user_id)?;

    let upload = uploads::read_image(&mut multipart, "picture").await?;
    let location = app_state
        .file_storage
        .write_file(BUCKET_PICTURES, &upload.filename, &upload.data)
        .await?;
    users::set_picture(app_state.pool(), &user_id, &location).await?;

    Ok(ApiResponse::data(json!({ "fileLocation": location }))
        .with_message("Picture uploaded")
        .created())
}
