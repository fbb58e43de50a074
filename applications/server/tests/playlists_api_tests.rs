/// Playlist access, collaboration and export tests
mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_private_playlist_read_access() {
    let app = TestApp::new().await;
    let (_, owner) = app.create_user("owner").await;
    let (collaborator_id, collaborator) = app.create_user("collab").await;
    let (_, stranger) = app.create_user("stranger").await;

    let playlist_id = app.create_playlist(&owner, "Secret", false).await;
    let uri = format!("/playlists/{playlist_id}");

    let response = app.get(&uri, None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.get(&uri, Some(&stranger)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "You are not allowed to access this playlist");

    let response = app.get(&uri, Some(&owner)).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .post(
            "/collaborations",
            Some(&owner),
            json!({"playlistId": playlist_id, "userId": collaborator_id}),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app.get(&uri, Some(&collaborator)).await;
    assert_eq!(response.status, StatusCode::OK);
    let playlist = &response.data()["playlist"];
    assert_eq!(playlist["name"], "Secret");
    assert_eq!(playlist["collaborators"][0]["id"], collaborator_id.as_str());

    let response = app.get("/playlists", Some(&collaborator)).await;
    assert_eq!(response.data()["playlists"][0]["id"], playlist_id.as_str());
}

#[tokio::test]
async fn test_public_playlist_is_readable_anonymously() {
    let app = TestApp::new().await;
    let (_, owner) = app.create_user("owner").await;
    let playlist_id = app.create_playlist(&owner, "Open", true).await;

    let response = app.get(&format!("/playlists/{playlist_id}"), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["playlist"]["isPublic"], true);
    assert_eq!(response.data()["playlist"]["songs"], json!([]));
}

#[tokio::test]
async fn test_missing_playlist_is_not_found() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("owner").await;

    let response = app.get("/playlists/playlist-missing", Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .post(
            "/playlists/playlist-missing/songs",
            Some(&token),
            json!({"songId": "song-x"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_collaborators_edit_songs_but_not_the_playlist() {
    let app = TestApp::new().await;
    let (_, owner) = app.create_user("owner").await;
    let (collaborator_id, collaborator) = app.create_user("collab").await;
    let (stranger_id, stranger) = app.create_user("stranger").await;
    let song_id = app.create_song(&owner, "Shared Song", None).await;

    let playlist_id = app.create_playlist(&owner, "Team", false).await;
    app.post(
        "/collaborations",
        Some(&owner),
        json!({"playlistId": playlist_id, "userId": collaborator_id}),
    )
    .await;

    let songs_uri = format!("/playlists/{playlist_id}/songs");

    let response = app
        .post(&songs_uri, Some(&stranger), json!({"songId": song_id}))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .post(&songs_uri, Some(&collaborator), json!({"songId": song_id}))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app
        .post(&songs_uri, Some(&owner), json!({"songId": song_id}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .get(&format!("/playlists/{playlist_id}"), Some(&owner))
        .await;
    assert_eq!(
        response.data()["playlist"]["songs"][0]["id"],
        song_id.as_str()
    );

    let response = app
        .delete(&songs_uri, Some(&collaborator), Some(json!({"songId": song_id})))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .get(&format!("/playlists/{playlist_id}/activities"), Some(&owner))
        .await;
    let activities = response.data()["activities"].as_array().unwrap();
    assert_eq!(activities.len(), 2);
    assert_eq!(activities[0]["action"], "add");
    assert_eq!(activities[0]["username"], "collab");
    assert_eq!(activities[1]["action"], "delete");

    // Ownership-only operations
    let uri = format!("/playlists/{playlist_id}");
    let response = app
        .put(&uri, Some(&collaborator), json!({"name": "Renamed", "isPublic": true}))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.delete(&uri, Some(&collaborator), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .post(
            "/collaborations",
            Some(&collaborator),
            json!({"playlistId": playlist_id, "userId": stranger_id}),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .put(&uri, Some(&owner), json!({"name": "Renamed", "isPublic": true}))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.delete(&uri, Some(&owner), None).await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app.get(&uri, Some(&owner)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_collaboration_removal() {
    let app = TestApp::new().await;
    let (_, owner) = app.create_user("owner").await;
    let (collaborator_id, collaborator) = app.create_user("collab").await;
    let playlist_id = app.create_playlist(&owner, "Temporary", false).await;
    let body = json!({"playlistId": playlist_id, "userId": collaborator_id});

    app.post("/collaborations", Some(&owner), body.clone()).await;
    let response = app.post("/collaborations", Some(&owner), body.clone()).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.delete("/collaborations", Some(&owner), Some(body.clone())).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .get(&format!("/playlists/{playlist_id}"), Some(&collaborator))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.delete("/collaborations", Some(&owner), Some(body)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post(
            "/collaborations",
            Some(&owner),
            json!({"playlistId": playlist_id, "userId": "user-missing"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_public_playlists_can_be_liked() {
    let app = TestApp::new().await;
    let (_, owner) = app.create_user("owner").await;
    let (_, fan) = app.create_user("fan").await;
    let private_id = app.create_playlist(&owner, "Hidden", false).await;
    let public_id = app.create_playlist(&owner, "Shown", true).await;

    let response = app
        .request(
            Method::POST,
            &format!("/playlists/{private_id}/likes"),
            Some(&fan),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let uri = format!("/playlists/{public_id}/likes");
    let response = app.request(Method::POST, &uri, Some(&fan), None).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app.request(Method::POST, &uri, Some(&fan), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.get(&uri, None).await;
    assert_eq!(response.data()["likes"], 1);

    let response = app.get("/playlists/liked", Some(&fan)).await;
    assert_eq!(response.data()["playlists"][0]["id"], public_id.as_str());

    let response = app.get("/playlists/popular", None).await;
    assert_eq!(response.data()["playlists"][0]["id"], public_id.as_str());
}

#[tokio::test]
async fn test_playlist_search_only_lists_public() {
    let app = TestApp::new().await;
    let (_, owner) = app.create_user("owner").await;
    app.create_playlist(&owner, "Road Trip", true).await;
    app.create_playlist(&owner, "Road Secrets", false).await;

    let response = app.get("/playlists/search?name=road", None).await;

    let playlists = response.data()["playlists"].as_array().unwrap();
    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0]["name"], "Road Trip");
    assert_eq!(playlists[0]["username"], "owner");
}

#[tokio::test]
async fn test_export_requires_access() {
    let app = TestApp::new().await;
    let (_, owner) = app.create_user("owner").await;
    let (_, stranger) = app.create_user("stranger").await;
    let playlist_id = app.create_playlist(&owner, "Mixtape", false).await;
    let uri = format!("/exports/playlists/{playlist_id}");

    let response = app
        .post(&uri, Some(&stranger), json!({"targetEmail": "me@example.com"}))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.post(&uri, Some(&stranger), json!({})).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.post(&uri, Some(&owner), json!({})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post(&uri, Some(&owner), json!({"targetEmail": "me@example.com"}))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let message = app.producer.wait_for("export:playlist").await;
    assert_eq!(message["playlistId"], playlist_id.as_str());
    assert_eq!(message["targetEmail"], "me@example.com");
}
