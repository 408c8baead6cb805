use std::sync::Arc;

use uuid::Uuid;
use warp::Filter;
use warp::http::StatusCode;

use crate::session_manager::SessionManager;
use boggle_types::{
    AdvanceRequest, ApproveWordsRequest, CreateSessionRequest, GameError, JoinRequest,
    SubmitRequest,
};

pub mod config;
pub mod session_manager;

pub fn create_routes(
    session_manager: Arc<SessionManager>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let manager_filter = warp::any().map({
        let session_manager = session_manager.clone();
        move || session_manager.clone()
    });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    // Dictionaries available for new sessions
    let dictionaries = warp::path("dictionaries")
        .and(warp::get())
        .and(manager_filter.clone())
        .map(|manager: Arc<SessionManager>| {
            warp::reply::with_status(
                warp::reply::json(&manager.dictionary_names()),
                StatusCode::OK,
            )
        });

    // Session creation - returns both tokens, so the creator is the manager
    let create_session = warp::path!("session")
        .and(warp::post())
        .and(warp::body::json())
        .and(manager_filter.clone())
        .and_then(handle_create_session);

    // Player join via the shareable join token
    let join = warp::path!("session" / Uuid / "join" / Uuid)
        .and(warp::post())
        .and(warp::body::json())
        .and(manager_filter.clone())
        .and_then(handle_join);

    // Manager state poll
    let manage_poll = warp::path!("session" / Uuid / "manage" / Uuid)
        .and(warp::get())
        .and(manager_filter.clone())
        .and_then(handle_manage_poll);

    // Round advance (or interrupt)
    let advance = warp::path!("session" / Uuid / "manage" / Uuid)
        .and(warp::post())
        .and(warp::body::json())
        .and(manager_filter.clone())
        .and_then(handle_advance);

    // Post-hoc word approval
    let approve = warp::path!("session" / Uuid / "manage" / Uuid / "approve")
        .and(warp::post())
        .and(warp::body::json())
        .and(manager_filter.clone())
        .and_then(handle_approve);

    // Player state poll
    let play_poll = warp::path!("session" / Uuid / "play" / Uuid / Uuid)
        .and(warp::get())
        .and(manager_filter.clone())
        .and_then(handle_play_poll);

    // Word list submission
    let submit = warp::path!("session" / Uuid / "play" / Uuid / Uuid)
        .and(warp::put())
        .and(warp::body::json())
        .and(manager_filter.clone())
        .and_then(handle_submit);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST", "PUT"]);

    health
        .or(dictionaries)
        .or(create_session)
        .or(join)
        .or(approve)
        .or(manage_poll)
        .or(advance)
        .or(play_poll)
        .or(submit)
        .with(cors)
        .with(warp::log("boggle_server"))
}

fn error_reply(err: GameError) -> warp::reply::WithStatus<warp::reply::Json> {
    let status = StatusCode::from_u16(err.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": err.to_string()
        })),
        status,
    )
}

async fn handle_create_session(
    request: CreateSessionRequest,
    manager: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match manager.create_session(&request) {
        Ok(created) => Ok(warp::reply::with_status(
            warp::reply::json(&created),
            StatusCode::CREATED,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_join(
    session_id: Uuid,
    join_token: Uuid,
    request: JoinRequest,
    manager: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match manager.join(session_id, join_token, &request.name).await {
        Ok(joined) => Ok(warp::reply::with_status(
            warp::reply::json(&joined),
            StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_manage_poll(
    session_id: Uuid,
    mgmt_token: Uuid,
    manager: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match manager.poll_as_manager(session_id, mgmt_token).await {
        Ok(state) => Ok(warp::reply::with_status(
            warp::reply::json(&state),
            StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_advance(
    session_id: Uuid,
    mgmt_token: Uuid,
    request: AdvanceRequest,
    manager: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    // saturate rather than wrap so oversized values fail countdown validation
    let countdown = request
        .countdown_seconds
        .map(|secs| i64::try_from(secs).unwrap_or(i64::MAX));
    match manager.advance(session_id, mgmt_token, countdown).await {
        Ok(advanced) => Ok(warp::reply::with_status(
            warp::reply::json(&advanced),
            StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_approve(
    session_id: Uuid,
    mgmt_token: Uuid,
    request: ApproveWordsRequest,
    manager: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match manager
        .approve_words(session_id, mgmt_token, request.round_no, &request.words)
        .await
    {
        Ok(()) => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({ "approved": request.words.len() })),
            StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_play_poll(
    session_id: Uuid,
    player_id: Uuid,
    player_token: Uuid,
    manager: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match manager
        .poll_as_player(session_id, player_id, player_token)
        .await
    {
        Ok(state) => Ok(warp::reply::with_status(
            warp::reply::json(&state),
            StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_submit(
    session_id: Uuid,
    player_id: Uuid,
    player_token: Uuid,
    request: SubmitRequest,
    manager: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match manager
        .submit(session_id, player_id, player_token, &request)
        .await
    {
        Ok(()) => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({ "accepted": true })),
            StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::time::Duration;

    use boggle_core::{DiceConfig, Dictionary, DictionaryRegistry, SessionConfig};
    use boggle_types::{
        AdvanceResponse, JoinResponse, RoundPhase, SessionCreated, StatePoll,
    };

    fn test_app(
        word_list: &str,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let mut dictionaries = DictionaryRegistry::default();
        dictionaries.insert_for_tests("words", Dictionary::from_word_list(word_list));
        // single-faced dice make every board all A tiles
        let dice = Arc::new(DiceConfig {
            name: "flat".to_string(),
            dice: vec![vec!["A".to_string()]; 16],
        });
        let manager = Arc::new(SessionManager::new(
            dictionaries,
            dice,
            SessionConfig::default(),
        ));
        create_routes(manager)
    }

    async fn create_session(
        app: &(impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone + 'static),
    ) -> SessionCreated {
        let response = warp::test::request()
            .method("POST")
            .path("/session")
            .json(&serde_json::json!({}))
            .reply(app)
            .await;
        assert_eq!(response.status(), 201);
        serde_json::from_slice(response.body()).expect("valid SessionCreated")
    }

    async fn join(
        app: &(impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone + 'static),
        created: &SessionCreated,
        name: &str,
    ) -> JoinResponse {
        let response = warp::test::request()
            .method("POST")
            .path(&format!(
                "/session/{}/join/{}",
                created.session_id, created.join_token
            ))
            .json(&serde_json::json!({ "name": name }))
            .reply(app)
            .await;
        assert_eq!(response.status(), 200);
        serde_json::from_slice(response.body()).expect("valid JoinResponse")
    }

    async fn poll_player(
        app: &(impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone + 'static),
        created: &SessionCreated,
        joined: &JoinResponse,
    ) -> StatePoll {
        let response = warp::test::request()
            .method("GET")
            .path(&format!(
                "/session/{}/play/{}/{}",
                created.session_id, joined.player_id, joined.player_token
            ))
            .reply(app)
            .await;
        assert_eq!(response.status(), 200);
        serde_json::from_slice(response.body()).expect("valid StatePoll")
    }

    /// Polls until the async scoring task lands the round in `Scored`.
    async fn poll_until_scored(
        app: &(impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone + 'static),
        created: &SessionCreated,
        joined: &JoinResponse,
    ) -> StatePoll {
        for _ in 0..100 {
            let state = poll_player(app, created, joined).await;
            if state.status == RoundPhase::Scored {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("round never reached Scored");
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = test_app("aaa");

        let response = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), "OK");
    }

    #[tokio::test]
    async fn test_dictionaries_endpoint() {
        let app = test_app("aaa");

        let response = warp::test::request()
            .method("GET")
            .path("/dictionaries")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let names: Vec<String> = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(names, vec!["words".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_dictionary_rejected() {
        let app = test_app("aaa");

        let response = warp::test::request()
            .method("POST")
            .path("/session")
            .json(&serde_json::json!({ "dictionary": "missing" }))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_explicit_null_dictionary_opts_out_over_http() {
        // a present null must not fall back to the sole dictionary
        let app = test_app("aaa");

        let response = warp::test::request()
            .method("POST")
            .path("/session")
            .json(&serde_json::json!({ "dictionary": null }))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 201);
        let created: SessionCreated = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(created.dictionary, None);
    }

    #[tokio::test]
    async fn test_oversized_countdown_rejected_over_http() {
        let app = test_app("aaa");
        let created = create_session(&app).await;
        join(&app, &created, "Alice").await;

        let response = warp::test::request()
            .method("POST")
            .path(&format!(
                "/session/{}/manage/{}",
                created.session_id, created.mgmt_token
            ))
            .json(&serde_json::json!({ "countdown_seconds": 9_000_000_000_000_000_000u64 }))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 409);
    }

    #[tokio::test]
    async fn test_join_requires_the_join_token() {
        let app = test_app("aaa");
        let created = create_session(&app).await;

        let response = warp::test::request()
            .method("POST")
            .path(&format!(
                "/session/{}/join/{}",
                created.session_id,
                Uuid::new_v4()
            ))
            .json(&serde_json::json!({ "name": "Mallory" }))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 403);
    }

    #[tokio::test]
    async fn test_poll_unknown_session_is_gone() {
        let app = test_app("aaa");

        let response = warp::test::request()
            .method("GET")
            .path(&format!(
                "/session/{}/manage/{}",
                Uuid::new_v4(),
                Uuid::new_v4()
            ))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 410);
    }

    #[tokio::test]
    async fn test_full_round_over_http() {
        let app = test_app("aaa\naaaa");
        let created = create_session(&app).await;
        assert_eq!(created.dictionary.as_deref(), Some("words"));

        let alice = join(&app, &created, "Alice").await;
        let bob = join(&app, &created, "Bob").await;

        // start round 1 with no countdown
        let response = warp::test::request()
            .method("POST")
            .path(&format!(
                "/session/{}/manage/{}",
                created.session_id, created.mgmt_token
            ))
            .json(&serde_json::json!({ "countdown_seconds": 0 }))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let advanced: AdvanceResponse = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(advanced.round_no, 1);

        let state = poll_player(&app, &created, &alice).await;
        assert_eq!(state.status, RoundPhase::Playing);
        assert!(state.board.is_some());

        for (player, words) in [(&alice, vec!["AAA"]), (&bob, vec!["AAA", "AAAA"])] {
            let response = warp::test::request()
                .method("PUT")
                .path(&format!(
                    "/session/{}/play/{}/{}",
                    created.session_id, player.player_id, player.player_token
                ))
                .json(&serde_json::json!({ "round_no": 1, "words": words }))
                .reply(&app)
                .await;
            assert_eq!(response.status(), 200);
        }

        // resubmission is refused
        let response = warp::test::request()
            .method("PUT")
            .path(&format!(
                "/session/{}/play/{}/{}",
                created.session_id, alice.player_id, alice.player_token
            ))
            .json(&serde_json::json!({ "round_no": 1, "words": ["AAAA"] }))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 409);

        let state = poll_until_scored(&app, &created, &alice).await;
        let scores = state.scores.expect("scored round carries scores");

        // AAA was duplicated across both players: zero under strict scoring;
        // Bob's AAAA is unique and the sole longest
        assert_eq!(scores.total_for(alice.player_id), 0);
        assert_eq!(scores.total_for(bob.player_id), 2);

        // round 2 opens from Scored
        let response = warp::test::request()
            .method("POST")
            .path(&format!(
                "/session/{}/manage/{}",
                created.session_id, created.mgmt_token
            ))
            .json(&serde_json::json!({}))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let advanced: AdvanceResponse = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(advanced.round_no, 2);
    }

    #[tokio::test]
    async fn test_word_approval_rescores() {
        // dictionary without AAA: the word traces but scores zero
        let app = test_app("nothing");
        let created = create_session(&app).await;
        let alice = join(&app, &created, "Alice").await;

        warp::test::request()
            .method("POST")
            .path(&format!(
                "/session/{}/manage/{}",
                created.session_id, created.mgmt_token
            ))
            .json(&serde_json::json!({ "countdown_seconds": 0 }))
            .reply(&app)
            .await;
        warp::test::request()
            .method("PUT")
            .path(&format!(
                "/session/{}/play/{}/{}",
                created.session_id, alice.player_id, alice.player_token
            ))
            .json(&serde_json::json!({ "round_no": 1, "words": ["AAA"] }))
            .reply(&app)
            .await;

        let state = poll_until_scored(&app, &created, &alice).await;
        assert_eq!(
            state.scores.unwrap().total_for(alice.player_id),
            0,
            "unlisted word scores zero before approval"
        );

        let response = warp::test::request()
            .method("POST")
            .path(&format!(
                "/session/{}/manage/{}/approve",
                created.session_id, created.mgmt_token
            ))
            .json(&serde_json::json!({ "round_no": 1, "words": ["aaa"] }))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);

        let state = poll_player(&app, &created, &alice).await;
        let scores = state.scores.unwrap();
        assert_eq!(scores.total_for(alice.player_id), 2);
        assert!(scores.players[0].words[0].manually_approved);
    }
}
