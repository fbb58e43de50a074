/// Album, song, like and upload endpoint tests
mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{TestApp, PUBLIC_URL};
use freetunes_server::response::DATA_SOURCE_HEADER;
use freetunes_storage::users;
use serde_json::json;

#[tokio::test]
async fn test_album_crud_and_ownership() {
    let app = TestApp::new().await;
    let (_, owner) = app.create_user("owner").await;
    let (_, stranger) = app.create_user("stranger").await;

    let album_id = app.create_album(&owner, "Original").await;
    let song_id = app.create_song(&owner, "Track One", Some(&album_id)).await;
    let uri = format!("/albums/{album_id}");

    let response = app
        .put(&uri, Some(&stranger), json!({"name": "Stolen", "year": 2022}))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .put(&uri, Some(&owner), json!({"name": "Remastered", "year": 2022}))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.get(&uri, None).await;
    assert_eq!(response.status, StatusCode::OK);
    let album = &response.data()["album"];
    assert_eq!(album["name"], "Remastered");
    assert_eq!(album["year"], 2022);
    assert_eq!(album["artist"], "owner fullname");
    assert_eq!(album["songs"][0]["id"], song_id.as_str());
    assert_eq!(album["likes"], json!([]));

    let response = app.delete(&uri, Some(&stranger), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.delete(&uri, Some(&owner), None).await;
    assert_eq!(response.status, StatusCode::OK);

    // Songs go with their album
    let response = app.get(&uri, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    let response = app.get(&format!("/songs/{song_id}"), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_album_year_is_validated() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("owner").await;

    let response = app
        .post("/albums", Some(&token), json!({"name": "Ancient", "year": 1200}))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_strangers_get_forbidden_whatever_they_send() {
    let app = TestApp::new().await;
    let (_, owner) = app.create_user("owner").await;
    let (_, stranger) = app.create_user("stranger").await;
    let album_id = app.create_album(&owner, "Original").await;
    let song_id = app.create_song(&owner, "Track One", Some(&album_id)).await;
    let uri = format!("/albums/{album_id}");

    for body in [json!({"name": "x"}), json!({"name": "x", "year": "abc"}), json!([])] {
        let response = app.put(&uri, Some(&stranger), body).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(response.body["status"], "fail");
    }

    let request = Request::builder()
        .method(Method::PUT)
        .uri(&uri)
        .header(header::AUTHORIZATION, format!("Bearer {stranger}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .put(&format!("/songs/{song_id}"), Some(&stranger), json!({}))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    // The owner is told what is wrong with the payload instead
    let response = app.put(&uri, Some(&owner), json!({"name": "x"})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["status"], "fail");
    assert!(!response.message().is_empty());
}

#[tokio::test]
async fn test_malformed_input_uses_the_error_envelope() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("owner").await;

    let response = app.get("/albums?limit=abc", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["status"], "fail");

    let response = app
        .post("/albums", Some(&token), json!({"name": "Ancient", "year": "abc"}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["status"], "fail");

    let response = app.post("/songs", Some(&token), json!({"title": "x"})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["status"], "fail");
}

#[tokio::test]
async fn test_song_references_are_checked() {
    let app = TestApp::new().await;
    let (_, owner) = app.create_user("owner").await;
    let (_, other) = app.create_user("other").await;
    let album_id = app.create_album(&owner, "Mine").await;

    // Another artist's album
    let response = app
        .post(
            "/songs",
            Some(&other),
            json!({
                "title": "Intruder",
                "year": 2021,
                "genre": "genre-rock",
                "duration": 100,
                "albumId": album_id,
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .post(
            "/songs",
            Some(&other),
            json!({"title": "Lost", "year": 2021, "genre": "genre-nope", "duration": 100}),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .post(
            "/songs",
            Some(&other),
            json!({"title": "Silent", "year": 2021, "genre": "genre-rock", "duration": 0}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_song_artist_is_the_caller() {
    let app = TestApp::new().await;
    let (artist, token) = app.create_user("singer").await;

    let song_id = app.create_song(&token, "Mine", None).await;

    let response = app.get(&format!("/songs/{song_id}"), None).await;
    assert_eq!(response.data()["song"]["artistId"], artist.as_str());

    let response = app.get("/songs/me/singles", Some(&token)).await;
    assert_eq!(response.data()["songs"][0]["id"], song_id.as_str());
}

#[tokio::test]
async fn test_song_delete_is_soft() {
    let app = TestApp::new().await;
    let (_, owner) = app.create_user("owner").await;
    let (_, stranger) = app.create_user("stranger").await;
    let song_id = app.create_song(&owner, "Ephemeral", None).await;
    let uri = format!("/songs/{song_id}");

    let response = app.delete(&uri, Some(&stranger), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.delete(&uri, Some(&owner), None).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.get(&uri, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.get("/songs?title=Ephemeral", None).await;
    assert!(response.data()["songs"].as_array().unwrap().is_empty());

    let response = app.delete(&uri, Some(&owner), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_like_toggle_and_cache_provenance() {
    let app = TestApp::new().await;
    let (_, artist) = app.create_user("artist").await;
    let (_, fan_token) = app.create_user("fan").await;
    let album_id = app.create_album(&artist, "Liked").await;
    let uri = format!("/albums/{album_id}/likes");

    let response = app.request(Method::POST, &uri, Some(&fan_token), None).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app.request(Method::POST, &uri, Some(&fan_token), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Album already liked");

    // First read comes from the database, the second from the cache
    let response = app.get(&uri, None).await;
    assert_eq!(response.data()["likes"], 1);
    assert!(response.headers.get(DATA_SOURCE_HEADER).is_none());

    let response = app.get(&uri, None).await;
    assert_eq!(response.data()["likes"], 1);
    assert_eq!(response.headers[DATA_SOURCE_HEADER], "cache");

    let response = app.get("/albums/liked", Some(&fan_token)).await;
    assert_eq!(response.data()["albums"][0]["id"], album_id.as_str());

    let response = app.delete(&uri, Some(&fan_token), None).await;
    assert_eq!(response.status, StatusCode::OK);

    // Unliking invalidated the cached list
    let response = app.get(&uri, None).await;
    assert_eq!(response.data()["likes"], 0);
    assert!(response.headers.get(DATA_SOURCE_HEADER).is_none());

    let response = app.delete(&uri, Some(&fan_token), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.get(&format!("/albums/{album_id}"), None).await;
    assert_eq!(response.data()["album"]["likes"], json!([]));
}

#[tokio::test]
async fn test_like_missing_song() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("fan").await;

    let response = app
        .request(Method::POST, "/songs/song-missing/likes", Some(&token), None)
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_banned_artist_is_hidden_from_listings() {
    let app = TestApp::new().await;
    let (banned, banned_token) = app.create_user("outlaw").await;
    let (_, token) = app.create_user("citizen").await;

    let hidden_album = app.create_album(&banned_token, "Contraband").await;
    let hidden_song = app.create_song(&banned_token, "Contraband Song", None).await;
    app.create_album(&token, "Legit").await;
    app.create_song(&token, "Legit Song", None).await;

    users::set_banned(app.state.pool(), &banned, true).await.unwrap();

    let response = app.get("/albums", None).await;
    let albums = response.data()["albums"].as_array().unwrap();
    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0]["name"], "Legit");

    let response = app.get("/songs/popular", None).await;
    let songs = response.data()["songs"].as_array().unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0]["title"], "Legit Song");

    // Direct lookups still work
    let response = app.get(&format!("/albums/{hidden_album}"), None).await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app.get(&format!("/songs/{hidden_song}"), None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_search_and_paging() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("prolific").await;
    for i in 0..5 {
        app.create_song(&token, &format!("Song {i}"), None).await;
    }

    let response = app.get("/songs?title=song&limit=2&offset=0", None).await;
    assert_eq!(response.data()["songs"].as_array().unwrap().len(), 2);

    let response = app.get("/songs?title=song&limit=2&offset=4", None).await;
    assert_eq!(response.data()["songs"].as_array().unwrap().len(), 1);

    let response = app.get("/songs?artist=prolific&genre=pop", None).await;
    assert_eq!(response.data()["songs"].as_array().unwrap().len(), 5);

    let response = app.get("/songs?genre=genre-jazz", None).await;
    assert!(response.data()["songs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_cover_upload_and_static_serving() {
    let app = TestApp::new().await;
    let (_, owner) = app.create_user("owner").await;
    let (_, stranger) = app.create_user("stranger").await;
    let album_id = app.create_album(&owner, "Artwork").await;
    let uri = format!("/albums/{album_id}/covers");
    let image = b"\x89PNG fake image bytes";

    let response = app
        .upload(&uri, &stranger, "cover", "cover.png", "image/png", image)
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .upload(&uri, &owner, "cover", "notes.txt", "text/plain", b"hello")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .upload(&uri, &owner, "cover", "cover.png", "image/png", image)
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    let location = response.data()["fileLocation"].as_str().unwrap().to_string();
    assert!(location.starts_with(&format!("{PUBLIC_URL}/uploads/covers/")));

    let response = app.get(&format!("/albums/{album_id}"), None).await;
    assert_eq!(response.data()["album"]["cover"], location.as_str());

    let path = location.strip_prefix(PUBLIC_URL).unwrap();
    let response = app
        .send(
            axum::http::Request::builder()
                .uri(path)
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_album_cover_size_limit() {
    let app = TestApp::new().await;
    let (_, owner) = app.create_user("owner").await;
    let album_id = app.create_album(&owner, "Huge").await;

    let image = vec![0u8; 600 * 1024];
    let response = app
        .upload(
            &format!("/albums/{album_id}/covers"),
            &owner,
            "cover",
            "huge.png",
            "image/png",
            &image,
        )
        .await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_audio_upload_requires_audio() {
    let app = TestApp::new().await;
    let (_, owner) = app.create_user("owner").await;
    let song_id = app.create_song(&owner, "Loud", None).await;
    let uri = format!("/songs/{song_id}/audios");

    let response = app
        .upload(&uri, &owner, "audio", "loud.png", "image/png", b"img")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .upload(&uri, &owner, "audio", "loud.mp3", "audio/mpeg", b"ID3")
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app.get(&format!("/songs/{song_id}"), None).await;
    assert!(response.data()["song"]["audio"]
        .as_str()
        .unwrap()
        .contains("/uploads/audios/"));
}

#[tokio::test]
async fn test_reports() {
    let app = TestApp::new().await;
    let (_, owner) = app.create_user("owner").await;
    let (_, reporter) = app.create_user("reporter").await;
    let song_id = app.create_song(&owner, "Offensive", None).await;

    let response = app
        .post(
            "/reports",
            Some(&reporter),
            json!({"songId": song_id, "reason": "copyright", "detail": "not theirs"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert!(response.data()["reportId"]
        .as_str()
        .unwrap()
        .starts_with("report-"));

    let response = app
        .post(
            "/reports",
            Some(&reporter),
            json!({"songId": "song-missing", "reason": "spam"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
