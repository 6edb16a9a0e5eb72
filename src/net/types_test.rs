use super::*;
use serde_json::json;

// =============================================================
// Movie
// =============================================================

#[test]
fn movie_deserializes_camel_case_fields() {
    let movie: Movie = serde_json::from_value(json!({
        "id": 42,
        "title": "Alien",
        "posterUrl": "https://img.example.test/alien.jpg",
        "description": "In space no one can hear you scream.",
        "genre": "Horror",
        "releaseYear": 1979
    }))
    .unwrap();
    assert_eq!(movie.id, 42);
    assert_eq!(movie.poster_url.as_deref(), Some("https://img.example.test/alien.jpg"));
    assert_eq!(movie.genre.as_deref(), Some("Horror"));
    assert_eq!(movie.release_year, Some(1979));
}

#[test]
fn movie_optional_fields_may_be_missing_or_null() {
    let movie: Movie = serde_json::from_value(json!({
        "id": 1,
        "title": "Untitled",
        "posterUrl": null,
        "releaseYear": null
    }))
    .unwrap();
    assert_eq!(movie.poster_url, None);
    assert_eq!(movie.description, None);
    assert_eq!(movie.release_year, None);
}

#[test]
fn movie_accepts_loose_numeric_ids_and_years() {
    let movie: Movie =
        serde_json::from_value(json!({ "id": "7", "title": "Heat", "releaseYear": 1995.0 })).unwrap();
    assert_eq!(movie.id, 7);
    assert_eq!(movie.release_year, Some(1995));
}

#[test]
fn movie_rejects_fractional_id() {
    let result = serde_json::from_value::<Movie>(json!({ "id": 1.5, "title": "Half" }));
    assert!(result.is_err());
}

#[test]
fn movie_serialization_skips_absent_fields() {
    let movie = Movie {
        id: 3,
        title: "Up".into(),
        poster_url: None,
        description: None,
        genre: Some("Adventure".into()),
        release_year: Some(2009),
    };
    let value = serde_json::to_value(&movie).unwrap();
    assert_eq!(value, json!({ "id": 3, "title": "Up", "genre": "Adventure", "releaseYear": 2009 }));
}

// =============================================================
// Auth payloads
// =============================================================

#[test]
fn login_response_success_shape() {
    let resp: LoginResponse =
        serde_json::from_value(json!({ "access_token": "tok", "role": "ADMIN", "userId": 7 })).unwrap();
    assert_eq!(resp.access_token.as_deref(), Some("tok"));
    assert_eq!(resp.role, Some(Role::Admin));
    assert_eq!(resp.user_id, Some(7));
    assert_eq!(resp.message, None);
}

#[test]
fn login_response_failure_shape() {
    let resp: LoginResponse =
        serde_json::from_value(json!({ "message": "Invalid credentials", "statusCode": 401 })).unwrap();
    assert_eq!(resp.access_token, None);
    assert_eq!(resp.message.as_deref(), Some("Invalid credentials"));
}

#[test]
fn login_response_joins_validation_message_arrays() {
    let resp: LoginResponse = serde_json::from_value(json!({
        "message": ["email must be an email", "password should not be empty"]
    }))
    .unwrap();
    assert_eq!(resp.message.as_deref(), Some("email must be an email; password should not be empty"));
}

#[test]
fn login_response_unknown_role_reads_as_none() {
    let resp: LoginResponse =
        serde_json::from_value(json!({ "access_token": "t", "role": "SUPERUSER", "userId": "9" })).unwrap();
    assert_eq!(resp.role, None);
    assert_eq!(resp.user_id, Some(9));
}

#[test]
fn register_request_always_carries_role() {
    let req = RegisterRequest { name: "Ann", email: "ann@example.test", password: "pw", role: Role::User };
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value["role"], "USER");
}

#[test]
fn favorite_request_uses_camel_case() {
    let value = serde_json::to_value(FavoriteRequest { user_id: 7, movie_id: 42 }).unwrap();
    assert_eq!(value, json!({ "userId": 7, "movieId": 42 }));
}

// =============================================================
// Role
// =============================================================

#[test]
fn role_parse_is_case_insensitive() {
    assert_eq!(Role::parse(" admin "), Some(Role::Admin));
    assert_eq!(Role::parse("User"), Some(Role::User));
    assert_eq!(Role::parse("guest"), None);
}

#[test]
fn role_from_str_reports_unknown_value() {
    let err = "root".parse::<Role>().unwrap_err();
    assert!(err.contains("root"));
}

// =============================================================
// Admin payloads
// =============================================================

#[test]
fn movie_draft_requires_title_and_year() {
    let mut draft = MovieDraft { title: "  ".into(), release_year: 1999, ..MovieDraft::default() };
    assert!(draft.validate().is_err());
    draft.title = "The Matrix".into();
    assert!(draft.validate().is_ok());
    draft.release_year = 0;
    assert!(draft.validate().is_err());
}

#[test]
fn user_patch_serializes_only_present_fields() {
    let patch = UserPatch { role: Some(Role::Admin), ..UserPatch::default() };
    assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "role": "ADMIN" }));
}
