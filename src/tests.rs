#[cfg(test)]
mod integration_tests {
    use crate::handlers::api::{TreasurePage, TreasureResponse};
    use crate::schemas::{ApiResponse, ErrorResponse, HealthResponse};
    use crate::test_utils::test_utils::{
        ALICE, ALICE_PASSWORD, BOB, BOB_PASSWORD, CAROL, CAROL_PASSWORD, login_cookie,
        setup_test_app, setup_test_server, setup_test_server_with_session_ttl,
    };
    use axum::http::{HeaderValue, StatusCode, header};
    use axum_test::TestServer;
    use model::store;
    use rust_decimal::Decimal;
    use std::time::Duration;

    const GOLD_NUGGET: [(&str, &str); 4] = [
        ("name", "Gold Nugget"),
        ("value", "500.00"),
        ("material", "gold"),
        ("location", "Curly's Creed, NM"),
    ];

    async fn post_treasure(
        server: &TestServer,
        cookie: &HeaderValue,
        form: &[(&str, &str)],
    ) -> axum_test::TestResponse {
        server
            .post("/post_url/")
            .add_header(header::COOKIE, cookie.clone())
            .form(&form)
            .await
    }

    fn location(response: &axum_test::TestResponse) -> String {
        response.header(header::LOCATION).to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let health: HealthResponse = response.json();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.database, "connected");
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/").await;

        response.assert_status(StatusCode::OK);
        let body = response.text();
        assert!(body.contains("No treasures yet."));
        assert!(body.contains("action=\"/post_url/\""));
        assert!(body.contains("href=\"/login/\""));
    }

    #[tokio::test]
    async fn test_anonymous_submission_redirects_to_login() {
        let (server, state) = setup_test_server().await;

        let response = server.post("/post_url/").form(&GOLD_NUGGET).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login/");
        assert!(store::all_treasures(&state.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submission_is_owned_by_logged_in_user() {
        let (server, state) = setup_test_server().await;
        let cookie = login_cookie(&server, ALICE, ALICE_PASSWORD).await;

        let response = post_treasure(&server, &cookie, &GOLD_NUGGET).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let treasures = store::all_treasures(&state.db).await.unwrap();
        assert_eq!(treasures.len(), 1);
        let created = &treasures[0];
        assert_eq!(created.owner, ALICE);
        assert_eq!(created.treasure.name, "Gold Nugget");
        assert_eq!(created.treasure.value, Decimal::new(500, 0));
        assert_eq!(created.treasure.material, "gold");
        assert_eq!(created.treasure.likes, 0);

        let body = server.get("/").await.text();
        assert!(body.contains("Gold Nugget"));
        assert!(body.contains("500.00"));
        assert!(body.contains("href=\"/user/alice/\""));
        assert!(!body.contains("No treasures yet."));
    }

    #[tokio::test]
    async fn test_invalid_submission_persists_nothing() {
        let (server, state) = setup_test_server().await;
        let cookie = login_cookie(&server, ALICE, ALICE_PASSWORD).await;

        let response = post_treasure(
            &server,
            &cookie,
            &[("name", ""), ("value", "lots"), ("material", "gold"), ("location", "Cave")],
        )
        .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.text();
        assert!(body.contains("name: This field is required."));
        assert!(body.contains("value: Enter a number."));
        assert!(body.contains("value=\"lots\""));
        assert!(store::all_treasures(&state.db).await.unwrap().is_empty());

        for value in ["1.234", "1.500"] {
            let too_precise = [
                ("name", "Coin"),
                ("value", value),
                ("material", "silver"),
                ("location", "Beach"),
            ];
            let response = post_treasure(&server, &cookie, &too_precise).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            assert!(response.text().contains("no more than 2 decimal places"));
        }
        assert!(store::all_treasures(&state.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_show_treasure() {
        let (server, _state) = setup_test_server().await;
        let cookie = login_cookie(&server, ALICE, ALICE_PASSWORD).await;
        post_treasure(&server, &cookie, &GOLD_NUGGET).await;

        let response = server.get("/1/").await;

        response.assert_status(StatusCode::OK);
        let body = response.text();
        assert!(body.contains("<h1>Gold Nugget</h1>"));
        assert!(body.contains("500.00"));
        assert!(body.contains("Likes: 0"));
    }

    #[tokio::test]
    async fn test_unknown_treasure_is_not_found() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        server.get("/999/").await.assert_status(StatusCode::NOT_FOUND);
        server.get("/abc/").await.assert_status(StatusCode::NOT_FOUND);
        server.get("/-1/").await.assert_status(StatusCode::NOT_FOUND);
        server.get("/no/such/page").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_lists_only_owned_treasures() {
        let (server, _state) = setup_test_server().await;
        let alice = login_cookie(&server, ALICE, ALICE_PASSWORD).await;
        let bob = login_cookie(&server, BOB, BOB_PASSWORD).await;

        post_treasure(&server, &alice, &GOLD_NUGGET).await;
        post_treasure(
            &server,
            &bob,
            &[
                ("name", "Silver Spoon"),
                ("value", "12.5"),
                ("material", "silver"),
                ("location", "Attic"),
            ],
        )
        .await;

        let response = server.get("/user/alice/").await;
        response.assert_status(StatusCode::OK);
        let body = response.text();
        assert!(body.contains("Treasures found by alice"));
        assert!(body.contains("Gold Nugget"));
        assert!(!body.contains("Silver Spoon"));

        let body = server.get("/user/bob/").await.text();
        assert!(body.contains("Silver Spoon"));
        assert!(body.contains("12.50"));

        // Existing user without treasures
        let body = server.get("/user/carol/").await.text();
        assert!(body.contains("No treasures yet."));

        server.get("/user/nobody/").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_login_page() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/login/").await;

        response.assert_status(StatusCode::OK);
        let body = response.text();
        assert!(body.contains("name=\"username\""));
        assert!(body.contains("type=\"password\""));
    }

    #[tokio::test]
    async fn test_login_failures() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let wrong_password = server
            .post("/login/")
            .form(&[("username", ALICE), ("password", "wrong")])
            .await;
        wrong_password.assert_status(StatusCode::UNAUTHORIZED);
        assert!(wrong_password.text().contains("The username and/or password is incorrect."));

        let unknown_user = server
            .post("/login/")
            .form(&[("username", "nobody"), ("password", "whatever")])
            .await;
        unknown_user.assert_status(StatusCode::UNAUTHORIZED);
        assert!(unknown_user.text().contains("The username and/or password is incorrect."));

        let disabled = server
            .post("/login/")
            .form(&[("username", CAROL), ("password", CAROL_PASSWORD)])
            .await;
        disabled.assert_status(StatusCode::FORBIDDEN);
        assert!(disabled.text().contains("This account has been disabled."));

        let blank = server.post("/login/").form(&[("username", ""), ("password", "")]).await;
        blank.assert_status(StatusCode::BAD_REQUEST);
        assert!(blank.text().contains("username: This field is required."));

        // Disabled accounts with a wrong password look like any other failure
        let disabled_wrong = server
            .post("/login/")
            .form(&[("username", CAROL), ("password", "wrong")])
            .await;
        disabled_wrong.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logged_in_navigation() {
        let (server, _state) = setup_test_server().await;
        let cookie = login_cookie(&server, ALICE, ALICE_PASSWORD).await;

        let body = server.get("/").add_header(header::COOKIE, cookie).await.text();

        assert!(body.contains("href=\"/user/alice/\""));
        assert!(body.contains("href=\"/logout/\""));
        assert!(!body.contains("href=\"/login/\""));
    }

    #[tokio::test]
    async fn test_logout_ends_the_session() {
        let (server, state) = setup_test_server().await;
        let cookie = login_cookie(&server, ALICE, ALICE_PASSWORD).await;

        let response = server.get("/logout/").add_header(header::COOKIE, cookie.clone()).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        assert!(response.header(header::SET_COOKIE).to_str().unwrap().contains("Max-Age=0"));

        // The old cookie no longer identifies anyone
        let response = post_treasure(&server, &cookie, &GOLD_NUGGET).await;
        assert_eq!(location(&response), "/login/");
        assert!(store::all_treasures(&state.db).await.unwrap().is_empty());

        // Logging out twice, or without a session, is harmless
        server
            .get("/logout/")
            .add_header(header::COOKIE, cookie)
            .await
            .assert_status(StatusCode::SEE_OTHER);
        server.get("/logout/").await.assert_status(StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_login_replaces_previous_session() {
        let (server, state) = setup_test_server().await;
        let first = login_cookie(&server, ALICE, ALICE_PASSWORD).await;

        let response = server
            .post("/login/")
            .add_header(header::COOKIE, first.clone())
            .form(&[("username", BOB), ("password", BOB_PASSWORD)])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        let second = response.header(header::SET_COOKIE);
        let second = second.to_str().unwrap().split(';').next().unwrap();
        let second = HeaderValue::from_str(second).unwrap();
        assert_ne!(first, second);

        let old = post_treasure(&server, &first, &GOLD_NUGGET).await;
        assert_eq!(location(&old), "/login/");

        post_treasure(&server, &second, &GOLD_NUGGET)
            .await
            .assert_status(StatusCode::SEE_OTHER);
        let treasures = store::all_treasures(&state.db).await.unwrap();
        assert_eq!(treasures.len(), 1);
        assert_eq!(treasures[0].owner, BOB);
    }

    #[tokio::test]
    async fn test_deactivated_user_session_is_dropped() {
        let (server, state) = setup_test_server().await;
        let cookie = login_cookie(&server, ALICE, ALICE_PASSWORD).await;

        store::set_user_active(&state.db, ALICE, false).await.unwrap();

        let response = post_treasure(&server, &cookie, &GOLD_NUGGET).await;
        assert_eq!(location(&response), "/login/");
        assert!(store::all_treasures(&state.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_like_treasure() {
        let (server, state) = setup_test_server().await;
        let cookie = login_cookie(&server, ALICE, ALICE_PASSWORD).await;
        post_treasure(&server, &cookie, &GOLD_NUGGET).await;

        let response = server.post("/like_treasure/?treasure_id=1").await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.text(), "1");
        assert_eq!(server.get("/like_treasure/?treasure_id=1").await.text(), "2");

        let treasure = store::get_treasure(&state.db, 1).await.unwrap();
        assert_eq!(treasure.treasure.likes, 2);
        assert!(server.get("/1/").await.text().contains("Likes: 2"));

        assert_eq!(server.post("/like_treasure/").await.text(), "0");
        server
            .post("/like_treasure/?treasure_id=999")
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .post("/like_treasure/?treasure_id=abc")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_static_script() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/static/js/app.js").await;

        response.assert_status(StatusCode::OK);
        let content_type = response.header(header::CONTENT_TYPE);
        assert!(content_type.to_str().unwrap().contains("javascript"));
        assert!(response.text().contains("/like_treasure/"));
    }

    #[tokio::test]
    async fn test_api_list_treasures() {
        let (server, _state) = setup_test_server().await;
        let cookie = login_cookie(&server, ALICE, ALICE_PASSWORD).await;
        post_treasure(&server, &cookie, &GOLD_NUGGET).await;
        post_treasure(
            &server,
            &cookie,
            &[
                ("name", "Ruby"),
                ("value", "75"),
                ("material", "gem"),
                ("location", "Mine"),
            ],
        )
        .await;

        let response = server.get("/api/v1/treasures").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<TreasurePage> = response.json();
        assert!(body.success);
        assert_eq!(body.data.total, 2);
        assert_eq!(body.data.page, 1);
        let names: Vec<_> = body.data.items.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Gold Nugget", "Ruby"]);
        assert_eq!(body.data.items[0].value, "500.00");
        assert_eq!(body.data.items[0].owner, ALICE);

        let second_page: ApiResponse<TreasurePage> =
            server.get("/api/v1/treasures?page=2&limit=1").await.json();
        assert_eq!(second_page.data.items.len(), 1);
        assert_eq!(second_page.data.items[0].name, "Ruby");
        assert_eq!(second_page.data.total, 2);

        for query in ["limit=0", "limit=1001", "page=0", "page=10001", "page=abc"] {
            let response = server.get(&format!("/api/v1/treasures?{}", query)).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let error: ErrorResponse = response.json();
            assert_eq!(error.code, "INVALID_QUERY");
            assert!(!error.success);
        }
    }

    #[tokio::test]
    async fn test_api_get_treasure() {
        let (server, _state) = setup_test_server().await;
        let cookie = login_cookie(&server, ALICE, ALICE_PASSWORD).await;
        post_treasure(&server, &cookie, &GOLD_NUGGET).await;

        let response = server.get("/api/v1/treasures/1").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<TreasureResponse> = response.json();
        assert_eq!(body.data.id, 1);
        assert_eq!(body.data.location, "Curly's Creed, NM");

        let missing = server.get("/api/v1/treasures/42").await;
        missing.assert_status(StatusCode::NOT_FOUND);
        let error: ErrorResponse = missing.json();
        assert_eq!(error.code, "TREASURE_NOT_FOUND");
        assert!(!error.success);

        for id in ["abc", "99999999999"] {
            let invalid = server.get(&format!("/api/v1/treasures/{}", id)).await;
            invalid.assert_status(StatusCode::BAD_REQUEST);
            let error: ErrorResponse = invalid.json();
            assert_eq!(error.code, "INVALID_TREASURE_ID");
        }
    }

    #[tokio::test]
    async fn test_api_user_treasures() {
        let (server, _state) = setup_test_server().await;
        let cookie = login_cookie(&server, ALICE, ALICE_PASSWORD).await;
        post_treasure(&server, &cookie, &GOLD_NUGGET).await;

        let body: ApiResponse<Vec<TreasureResponse>> =
            server.get("/api/v1/users/alice/treasures").await.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0].owner, ALICE);

        let empty: ApiResponse<Vec<TreasureResponse>> =
            server.get("/api/v1/users/bob/treasures").await.json();
        assert!(empty.data.is_empty());

        let missing = server.get("/api/v1/users/nobody/treasures").await;
        missing.assert_status(StatusCode::NOT_FOUND);
        let error: ErrorResponse = missing.json();
        assert_eq!(error.code, "USER_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api-docs/openapi.json").await;

        response.assert_status(StatusCode::OK);
        let document: serde_json::Value = response.json();
        assert_eq!(document["info"]["title"], "Treasuregram API");
        assert!(document["paths"]["/api/v1/treasures"].is_object());
    }

    #[tokio::test]
    async fn test_idle_session_expires() {
        let (server, state) = setup_test_server_with_session_ttl(Duration::from_millis(200)).await;
        let cookie = login_cookie(&server, ALICE, ALICE_PASSWORD).await;

        tokio::time::sleep(Duration::from_millis(500)).await;

        let response = post_treasure(&server, &cookie, &GOLD_NUGGET).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login/");
        assert!(store::all_treasures(&state.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_page_keeps_logged_in_navigation() {
        let (server, _state) = setup_test_server().await;
        let cookie = login_cookie(&server, ALICE, ALICE_PASSWORD).await;

        for path in ["/999/", "/abc/", "/user/nobody/", "/no/such/page"] {
            let response = server.get(path).add_header(header::COOKIE, cookie.clone()).await;
            response.assert_status(StatusCode::NOT_FOUND);
            let body = response.text();
            assert!(body.contains("href=\"/logout/\""), "{} shows anonymous navigation", path);
            assert!(!body.contains("href=\"/login/\""));
        }

        let anonymous = server.get("/999/").await.text();
        assert!(anonymous.contains("href=\"/login/\""));
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session_navigation() {
        let (server, _state) = setup_test_server().await;
        let cookie = login_cookie(&server, ALICE, ALICE_PASSWORD).await;

        let response = server
            .post("/login/")
            .add_header(header::COOKIE, cookie.clone())
            .form(&[("username", BOB), ("password", "wrong")])
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert!(response.text().contains("href=\"/user/alice/\""));

        let disabled = server
            .post("/login/")
            .add_header(header::COOKIE, cookie)
            .form(&[("username", CAROL), ("password", CAROL_PASSWORD)])
            .await;
        disabled.assert_status(StatusCode::FORBIDDEN);
        assert!(disabled.text().contains("href=\"/logout/\""));
    }
}
