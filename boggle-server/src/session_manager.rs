use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use boggle_core::{
    DiceConfig, DictionaryRegistry, ScoringJob, Session, SessionConfig, resolve_dictionary,
};
use boggle_types::{
    AdvanceResponse, CreateSessionRequest, GameError, JoinResponse, ScoringMode, SessionCreated,
    StatePoll, SubmitRequest,
};

/// Owns every live session. Each session sits behind its own lock, so
/// requests against different sessions never contend, and scoring runs
/// outside the lock entirely.
pub struct SessionManager {
    sessions: DashMap<Uuid, Arc<Mutex<Session>>>,
    dictionaries: DictionaryRegistry,
    dice: Arc<DiceConfig>,
    defaults: SessionConfig,
}

impl SessionManager {
    pub fn new(
        dictionaries: DictionaryRegistry,
        dice: Arc<DiceConfig>,
        defaults: SessionConfig,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            dictionaries,
            dice,
            defaults,
        }
    }

    pub fn dictionary_names(&self) -> Vec<String> {
        self.dictionaries.names()
    }

    pub fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<SessionCreated, GameError> {
        let requested = request
            .dictionary
            .as_ref()
            .map(|inner| inner.as_deref());
        let dictionary = resolve_dictionary(&self.dictionaries, requested)?;

        let mut config = self.defaults.clone();
        if let Some(mode) = request.scoring_mode {
            config.scoring_mode = mode;
        }

        let session = Session::new(config, self.dice.clone(), dictionary, Utc::now());
        let response = SessionCreated {
            session_id: session.id,
            mgmt_token: session.mgmt_token(),
            join_token: session.join_token(),
            dictionary: session.dictionary_name().map(str::to_string),
        };
        info!(
            "Created session {} ({:?} scoring, dictionary {:?})",
            session.id,
            request.scoring_mode.unwrap_or(ScoringMode::Strict),
            response.dictionary
        );
        self.sessions
            .insert(session.id, Arc::new(Mutex::new(session)));
        Ok(response)
    }

    fn session(&self, session_id: Uuid) -> Result<Arc<Mutex<Session>>, GameError> {
        self.sessions
            .get(&session_id)
            .map(|entry| entry.value().clone())
            .ok_or(GameError::SessionEnded)
    }

    pub async fn join(
        &self,
        session_id: Uuid,
        join_token: Uuid,
        name: &str,
    ) -> Result<JoinResponse, GameError> {
        let handle = self.session(session_id)?;
        let mut session = handle.lock().await;
        session.check_join_token(join_token)?;
        let (player, player_token) = session.join(name, Utc::now());
        Ok(JoinResponse {
            player_id: player.id,
            player_token,
            name: player.name,
        })
    }

    pub async fn poll_as_player(
        &self,
        session_id: Uuid,
        player_id: Uuid,
        player_token: Uuid,
    ) -> Result<StatePoll, GameError> {
        let handle = self.session(session_id)?;
        let (state, job) = {
            let mut session = handle.lock().await;
            session.check_player_token(player_id, player_token)?;
            session.poll(Utc::now())
        };
        if let Some(job) = job {
            self.spawn_scoring(handle, job);
        }
        Ok(state)
    }

    pub async fn poll_as_manager(
        &self,
        session_id: Uuid,
        mgmt_token: Uuid,
    ) -> Result<StatePoll, GameError> {
        let handle = self.session(session_id)?;
        let (state, job) = {
            let mut session = handle.lock().await;
            session.check_mgmt_token(mgmt_token)?;
            session.poll(Utc::now())
        };
        if let Some(job) = job {
            self.spawn_scoring(handle, job);
        }
        Ok(state)
    }

    pub async fn submit(
        &self,
        session_id: Uuid,
        player_id: Uuid,
        player_token: Uuid,
        request: &SubmitRequest,
    ) -> Result<(), GameError> {
        let handle = self.session(session_id)?;
        let mut session = handle.lock().await;
        session.check_player_token(player_id, player_token)?;
        session.submit(player_id, request.round_no, &request.words, Utc::now())
    }

    pub async fn advance(
        &self,
        session_id: Uuid,
        mgmt_token: Uuid,
        countdown_seconds: Option<i64>,
    ) -> Result<AdvanceResponse, GameError> {
        let handle = self.session(session_id)?;
        let mut session = handle.lock().await;
        session.check_mgmt_token(mgmt_token)?;
        let (round_no, round_start) = session.advance(countdown_seconds, Utc::now())?;
        Ok(AdvanceResponse {
            round_no,
            round_start: round_start.to_rfc3339(),
        })
    }

    pub async fn approve_words(
        &self,
        session_id: Uuid,
        mgmt_token: Uuid,
        round_no: u32,
        words: &[String],
    ) -> Result<(), GameError> {
        let handle = self.session(session_id)?;
        let mut session = handle.lock().await;
        session.check_mgmt_token(mgmt_token)?;
        session.approve_words(round_no, words, Utc::now())
    }

    /// Scoring touches no session state while it runs. The result carries
    /// the epoch it was started under; an interrupted round's result is
    /// discarded at install time.
    fn spawn_scoring(&self, handle: Arc<Mutex<Session>>, job: ScoringJob) {
        tokio::spawn(async move {
            let compute = {
                let job = job.clone();
                tokio::task::spawn_blocking(move || job.compute())
            };
            match compute.await {
                Ok(scores) => {
                    let mut session = handle.lock().await;
                    session.install_scores(job.round_no, job.epoch, scores);
                }
                Err(err) => {
                    error!("Scoring task for round {} panicked: {}", job.round_no, err);
                    let mut session = handle.lock().await;
                    session.abort_scoring(job.round_no, job.epoch);
                }
            }
        });
    }

    /// Drops sessions with no request activity for longer than `timeout`.
    pub async fn cleanup_idle_sessions(&self, timeout: Duration) {
        let now = Utc::now();
        // snapshot the handles so no map shard stays locked across an await
        let handles: Vec<(Uuid, Arc<Mutex<Session>>)> = self
            .sessions
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        let mut expired = Vec::new();
        for (session_id, handle) in handles {
            let session = handle.lock().await;
            if session.idle_for(now) > timeout {
                expired.push(session_id);
            }
        }
        for session_id in expired {
            info!("Cleaning up idle session {}", session_id);
            self.sessions.remove(&session_id);
        }
    }

    pub fn active_sessions_count(&self) -> usize {
        self.sessions.len()
    }
}
