
use std::time::Duration;

use boggle_types::{CreateSessionRequest, GameError, RoundPhase, ScoringMode, SubmitRequest};
use test_helpers::*;

#[tokio::test]
async fn test_session_creation_picks_sole_dictionary() {
    let manager = manager_with_words("aaa");
    let created = manager
        .create_session(&CreateSessionRequest::default())
        .unwrap();
    assert_eq!(created.dictionary.as_deref(), Some("words"));
    assert_eq!(manager.active_sessions_count(), 1);
}

#[tokio::test]
async fn test_session_creation_without_dictionaries() {
    let manager = manager_without_dictionaries();
    let created = manager
        .create_session(&CreateSessionRequest::default())
        .unwrap();
    assert!(created.dictionary.is_none());
    assert!(manager.dictionary_names().is_empty());
}

#[tokio::test]
async fn test_explicit_dictionary_opt_out() {
    let manager = manager_with_words("aaa");
    let request = CreateSessionRequest {
        dictionary: Some(None),
        scoring_mode: Some(ScoringMode::Mild),
    };
    let created = manager.create_session(&request).unwrap();
    assert!(created.dictionary.is_none());
}

#[tokio::test]
async fn test_unknown_dictionary_name() {
    let manager = manager_with_words("aaa");
    let request = CreateSessionRequest {
        dictionary: Some(Some("missing".to_string())),
        scoring_mode: None,
    };
    assert_eq!(
        manager.create_session(&request).unwrap_err(),
        GameError::UnknownDictionary {
            name: "missing".to_string()
        }
    );
}

#[tokio::test]
async fn test_join_rejects_bad_token() {
    let manager = manager_with_words("aaa");
    let created = manager
        .create_session(&CreateSessionRequest::default())
        .unwrap();
    let result = manager
        .join(created.session_id, uuid::Uuid::new_v4(), "Mallory")
        .await;
    assert_eq!(result.unwrap_err(), GameError::BadToken);
}

#[tokio::test]
async fn test_advance_requires_players() {
    let manager = manager_with_words("aaa");
    let created = manager
        .create_session(&CreateSessionRequest::default())
        .unwrap();
    let result = manager
        .advance(created.session_id, created.mgmt_token, None)
        .await;
    assert_eq!(result.unwrap_err(), GameError::CannotAdvanceWithoutPlayers);
}

#[tokio::test]
async fn test_submit_checks_round_number() {
    let manager = manager_with_words("aaa");
    let (created, joined) = session_with_player(&manager, "Alice").await;
    manager
        .advance(created.session_id, created.mgmt_token, Some(0))
        .await
        .unwrap();

    let stale = SubmitRequest {
        round_no: 7,
        words: vec!["AAA".to_string()],
    };
    let result = manager
        .submit(
            created.session_id,
            joined.player_id,
            joined.player_token,
            &stale,
        )
        .await;
    assert_eq!(
        result.unwrap_err(),
        GameError::WrongRound {
            submitted: 7,
            current: 1
        }
    );
}

#[tokio::test]
async fn test_round_is_scored_in_the_background() {
    let manager = manager_with_words("aaa");
    let (created, joined) = session_with_player(&manager, "Alice").await;
    manager
        .advance(created.session_id, created.mgmt_token, Some(0))
        .await
        .unwrap();

    let request = SubmitRequest {
        round_no: 1,
        words: vec!["aaa".to_string()],
    };
    manager
        .submit(
            created.session_id,
            joined.player_id,
            joined.player_token,
            &request,
        )
        .await
        .unwrap();

    let mut last_status = RoundPhase::Playing;
    for _ in 0..100 {
        let state = manager
            .poll_as_manager(created.session_id, created.mgmt_token)
            .await
            .unwrap();
        last_status = state.status;
        if state.status == RoundPhase::Scored {
            assert_eq!(state.scores.unwrap().total_for(joined.player_id), 2);
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("round stuck in {last_status:?}");
}

#[tokio::test]
async fn test_manage_poll_requires_mgmt_token() {
    let manager = manager_with_words("aaa");
    let (created, joined) = session_with_player(&manager, "Alice").await;

    // the player token opens the play endpoint, not the manage one
    let result = manager
        .poll_as_manager(created.session_id, joined.player_token)
        .await;
    assert_eq!(result.unwrap_err(), GameError::BadToken);

    manager
        .poll_as_player(created.session_id, joined.player_id, joined.player_token)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_idle_sessions_are_cleaned_up() {
    let manager = manager_with_words("aaa");
    manager
        .create_session(&CreateSessionRequest::default())
        .unwrap();
    assert_eq!(manager.active_sessions_count(), 1);

    // nothing is idle yet against a generous timeout
    manager
        .cleanup_idle_sessions(chrono::Duration::minutes(10))
        .await;
    assert_eq!(manager.active_sessions_count(), 1);

    tokio::time::sleep(Duration::from_millis(20)).await;
    manager
        .cleanup_idle_sessions(chrono::Duration::milliseconds(5))
        .await;
    assert_eq!(manager.active_sessions_count(), 0);
}

#[tokio::test]
async fn test_polling_a_removed_session_is_gone() {
    let manager = manager_with_words("aaa");
    let (created, joined) = session_with_player(&manager, "Alice").await;

    tokio::time::sleep(Duration::from_millis(10)).await;
    manager
        .cleanup_idle_sessions(chrono::Duration::milliseconds(1))
        .await;

    let result = manager
        .poll_as_player(created.session_id, joined.player_id, joined.player_token)
        .await;
    assert_eq!(result.unwrap_err(), GameError::SessionEnded);
}
