use super::*;

fn anonymous() -> Session {
    Session::default()
}

fn user(id: UserId) -> Session {
    Session { token: Some("t".into()), user_id: Some(id), role: Some(Role::User) }
}

fn admin(id: UserId) -> Session {
    Session { token: Some("t".into()), user_id: Some(id), role: Some(Role::Admin) }
}

// =============================================================
// Route::parse
// =============================================================

#[test]
fn parses_route_table() {
    assert_eq!(Route::parse("/"), Route::Home);
    assert_eq!(Route::parse("/home/7"), Route::UserHome(7));
    assert_eq!(Route::parse("/login"), Route::Login);
    assert_eq!(Route::parse("/register"), Route::Register);
    assert_eq!(Route::parse("/movie/42"), Route::MovieDetails(42));
    assert_eq!(Route::parse("/favorites"), Route::Favorites);
    assert_eq!(Route::parse("/movies"), Route::MovieEditor);
    assert_eq!(Route::parse("/admin"), Route::Admin);
    assert_eq!(Route::parse("/admin/favorites/3"), Route::AdminFavorites(3));
}

#[test]
fn ignores_trailing_slash_and_query() {
    assert_eq!(Route::parse("/admin/"), Route::Admin);
    assert_eq!(Route::parse("/movie/42?tab=cast"), Route::MovieDetails(42));
    assert_eq!(Route::parse(""), Route::Home);
}

#[test]
fn unknown_or_malformed_paths_are_not_found() {
    assert_eq!(Route::parse("/nope"), Route::NotFound);
    assert_eq!(Route::parse("/movie/abc"), Route::NotFound);
    assert_eq!(Route::parse("/home"), Route::NotFound);
    assert_eq!(Route::parse("/admin/favorites"), Route::NotFound);
    assert_eq!(Route::parse("/login/extra"), Route::NotFound);
}

#[test]
fn path_round_trips_through_parse() {
    for route in [Route::Home, Route::UserHome(4), Route::MovieDetails(9), Route::AdminFavorites(2), Route::Admin] {
        assert_eq!(Route::parse(&route.path()), route);
    }
}

// =============================================================
// decide
// =============================================================

#[test]
fn anonymous_admin_is_redirected_to_login_then_allowed_after_admin_login() {
    let (route, decision) = decide_path("/admin", &anonymous());
    assert_eq!(route, Route::Admin);
    assert_eq!(decision, Decision::RedirectToLogin);
    assert_eq!(decision.target(), Some("/login"));

    assert_eq!(decide(route, &admin(1)), Decision::Allow);
}

#[test]
fn user_on_admin_route_goes_home() {
    for path in ["/admin", "/movies", "/admin/favorites/2"] {
        assert_eq!(decide_path(path, &user(2)).1, Decision::RedirectToHome, "{path}");
    }
    assert_eq!(Decision::RedirectToHome.target(), Some("/"));
}

#[test]
fn authenticated_routes_need_a_token() {
    assert_eq!(decide(Route::Favorites, &anonymous()), Decision::RedirectToLogin);
    assert_eq!(decide(Route::UserHome(2), &anonymous()), Decision::RedirectToLogin);
    assert_eq!(decide(Route::Favorites, &user(2)), Decision::Allow);
    assert_eq!(decide(Route::Favorites, &admin(1)), Decision::Allow);
}

#[test]
fn public_routes_allow_everyone() {
    for session in [anonymous(), user(2), admin(1)] {
        for route in [Route::Home, Route::Login, Route::Register, Route::MovieDetails(1), Route::NotFound] {
            assert_eq!(decide(route, &session), Decision::Allow);
        }
    }
}

#[test]
fn stored_role_without_token_is_anonymous() {
    let stale = Session { token: None, user_id: Some(1), role: Some(Role::Admin) };
    assert_eq!(AccessLevel::of(&stale), AccessLevel::Anonymous);
    assert_eq!(decide(Route::Admin, &stale), Decision::RedirectToLogin);
}

#[test]
fn decisions_are_deterministic() {
    let session = user(3);
    let first = decide_path("/admin", &session);
    for _ in 0..10 {
        assert_eq!(decide_path("/admin", &session), first);
    }
}

// =============================================================
// landing_route / require
// =============================================================

#[test]
fn landing_route_by_role() {
    assert_eq!(landing_route(&admin(1)), Route::Admin);
    assert_eq!(landing_route(&user(5)), Route::UserHome(5));
    assert_eq!(landing_route(&anonymous()), Route::Login);
}

#[test]
fn require_admin_distinguishes_anonymous_from_forbidden() {
    assert!(matches!(require_admin(&anonymous()), Err(ClientError::NotAuthenticated)));
    assert!(matches!(require_admin(&user(2)), Err(ClientError::Forbidden)));
    assert!(require_admin(&admin(1)).is_ok());
}

#[test]
fn require_authenticated_accepts_any_token() {
    assert!(require(Requirement::Authenticated, &user(2)).is_ok());
    assert!(matches!(require(Requirement::Authenticated, &anonymous()), Err(ClientError::NotAuthenticated)));
    assert!(require(Requirement::Public, &anonymous()).is_ok());
}
