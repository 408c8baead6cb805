use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use tracing::{debug, info, warn};
use uuid::Uuid;

use boggle_types::{
    Board, GameError, Player, RoundPhase, RoundScores, ScoringMode, StatePoll,
};

use crate::classify::{classify_round, normalize_word};
use crate::dice::{DEFAULT_VOWEL_PROPORTION, DiceConfig, roll};
use crate::dictionary::Dictionary;
use crate::pathfinder::find_path;
use crate::round::{Round, ScoringState};
use crate::scoring::{ScoreTable, score_round};

pub const MAX_NAME_LENGTH: usize = 250;

/// Upper bound on the pre-round countdown a manager may request.
pub const MAX_COUNTDOWN_SECONDS: i64 = 3600;

/// Immutable game parameters fixed at session creation.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub board_rows: usize,
    pub board_cols: usize,
    pub round_seconds: i64,
    pub grace_seconds: i64,
    pub default_countdown_seconds: i64,
    pub vowel_proportion: f64,
    pub scoring_mode: ScoringMode,
    pub score_table: ScoreTable,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            board_rows: 4,
            board_cols: 4,
            round_seconds: 180,
            grace_seconds: 10,
            default_countdown_seconds: 15,
            vowel_proportion: DEFAULT_VOWEL_PROPORTION,
            scoring_mode: ScoringMode::Strict,
            score_table: ScoreTable::standard(),
        }
    }
}

#[derive(Debug, Clone)]
struct SessionPlayer {
    player: Player,
    token: Uuid,
}

/// A unit of deferred scoring work, cloned out of the session so the
/// computation runs without holding the session lock. Completion is
/// installed back under the lock, guarded by the epoch.
#[derive(Debug, Clone)]
pub struct ScoringJob {
    pub round_no: u32,
    pub epoch: u64,
    board: Board,
    submissions: Vec<(Uuid, Vec<String>)>,
    roster: Vec<Player>,
    dictionary: Option<Arc<Dictionary>>,
    approved: HashSet<String>,
    mode: ScoringMode,
    table: ScoreTable,
}

impl ScoringJob {
    /// Run classification and aggregation. Pure: no session access, safe
    /// to retry after a fault.
    pub fn compute(&self) -> RoundScores {
        let classified = classify_round(
            &self.board,
            &self.submissions,
            self.dictionary.as_deref(),
            &self.approved,
        );
        let by_player: Vec<_> = classified
            .into_iter()
            .filter_map(|(player_id, words)| {
                self.roster
                    .iter()
                    .find(|player| player.id == player_id)
                    .map(|player| (player.clone(), words))
            })
            .collect();
        score_round(self.round_no, &by_player, self.mode, &self.table)
    }
}

/// The per-session aggregate. All mutation goes through `&mut self`; the
/// server serializes access with one lock per session, which is the
/// critical section every phase transition, submission, and rescore runs
/// under.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    created: DateTime<Utc>,
    config: SessionConfig,
    dice: Arc<DiceConfig>,
    dictionary: Option<Arc<Dictionary>>,
    dictionary_name: Option<String>,
    mgmt_token: Uuid,
    join_token: Uuid,
    players: Vec<SessionPlayer>,
    rounds: Vec<Round>,
    /// Manually approved words, keyed by round number.
    approved: HashMap<u32, HashSet<String>>,
    /// Bumped on every advance/interrupt; a scoring result whose epoch no
    /// longer matches is discarded instead of installed.
    scoring_epoch: u64,
    last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        dice: Arc<DiceConfig>,
        dictionary: Option<(String, Arc<Dictionary>)>,
        now: DateTime<Utc>,
    ) -> Self {
        let (dictionary_name, dictionary) = match dictionary {
            Some((name, dict)) => (Some(name), Some(dict)),
            None => (None, None),
        };
        Self {
            id: Uuid::new_v4(),
            created: now,
            config,
            dice,
            dictionary,
            dictionary_name,
            mgmt_token: Uuid::new_v4(),
            join_token: Uuid::new_v4(),
            players: Vec::new(),
            rounds: Vec::new(),
            approved: HashMap::new(),
            scoring_epoch: 0,
            last_activity: now,
        }
    }

    pub fn mgmt_token(&self) -> Uuid {
        self.mgmt_token
    }

    pub fn join_token(&self) -> Uuid {
        self.join_token
    }

    pub fn dictionary_name(&self) -> Option<&str> {
        self.dictionary_name.as_deref()
    }

    pub fn check_mgmt_token(&self, token: Uuid) -> Result<(), GameError> {
        if token == self.mgmt_token {
            Ok(())
        } else {
            Err(GameError::BadToken)
        }
    }

    pub fn check_join_token(&self, token: Uuid) -> Result<(), GameError> {
        if token == self.join_token {
            Ok(())
        } else {
            Err(GameError::BadToken)
        }
    }

    /// Player tokens both authenticate and allow a dropped client to
    /// rejoin as the same identity; players are never removed for the
    /// session's life.
    pub fn check_player_token(&self, player_id: Uuid, token: Uuid) -> Result<(), GameError> {
        let entry = self
            .players
            .iter()
            .find(|sp| sp.player.id == player_id)
            .ok_or(GameError::UnknownPlayer)?;
        if entry.token == token {
            Ok(())
        } else {
            Err(GameError::BadToken)
        }
    }

    pub fn join(&mut self, name: &str, now: DateTime<Utc>) -> (Player, Uuid) {
        let name: String = name.chars().take(MAX_NAME_LENGTH).collect();
        let player = Player {
            id: Uuid::new_v4(),
            name,
        };
        let token = Uuid::new_v4();
        self.players.push(SessionPlayer {
            player: player.clone(),
            token,
        });
        self.last_activity = now;
        info!("Player {} ({}) joined session {}", player.name, player.id, self.id);
        (player, token)
    }

    pub fn roster(&self) -> Vec<Player> {
        self.players.iter().map(|sp| sp.player.clone()).collect()
    }

    fn current_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    fn current_round_mut(&mut self) -> Option<&mut Round> {
        self.rounds.last_mut()
    }

    fn all_submitted(&self, round: &Round) -> bool {
        !self.players.is_empty()
            && self
                .players
                .iter()
                .all(|sp| round.has_submitted(sp.player.id))
    }

    fn grace(&self) -> Duration {
        Duration::seconds(self.config.grace_seconds)
    }

    /// Manager "advance": start the next round after a countdown.
    ///
    /// From `Initial` or `Scored` this is the normal transition. From
    /// `PreStart` or `Playing` it is an interruption: the running round is
    /// abandoned (its number is never reused) and any in-flight scoring is
    /// invalidated via the epoch. Advancing mid-`Scoring` is rejected.
    pub fn advance(
        &mut self,
        countdown_seconds: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<(u32, DateTime<Utc>), GameError> {
        let countdown_seconds =
            countdown_seconds.unwrap_or(self.config.default_countdown_seconds);
        if !(0..=MAX_COUNTDOWN_SECONDS).contains(&countdown_seconds) {
            return Err(GameError::InvalidCountdown {
                max: MAX_COUNTDOWN_SECONDS,
            });
        }
        if self.players.is_empty() {
            return Err(GameError::CannotAdvanceWithoutPlayers);
        }
        if let Some(round) = self.current_round() {
            if round.scoring == ScoringState::InProgress {
                return Err(GameError::ScoringInProgress);
            }
            let phase = round.phase_at(now, self.all_submitted(round));
            if matches!(phase, RoundPhase::PreStart | RoundPhase::Playing) {
                info!(
                    "Session {}: round {} interrupted by manager",
                    self.id, round.round_no
                );
            }
        }

        let countdown = Duration::seconds(countdown_seconds);
        let round_no = self.current_round().map(|r| r.round_no + 1).unwrap_or(1);
        let seed = rand::thread_rng().next_u64();
        let board = roll(
            seed,
            &self.dice,
            Some((self.config.board_rows, self.config.board_cols)),
            self.config.vowel_proportion,
        )
        .map_err(|err| {
            warn!("Session {}: board roll failed: {err}", self.id);
            GameError::SessionEnded
        })?;

        let start = now + countdown;
        self.rounds.push(Round::new(
            round_no,
            seed,
            board,
            start,
            Duration::seconds(self.config.round_seconds),
        ));
        // orphan any scoring task still running for an earlier round
        self.scoring_epoch += 1;
        self.last_activity = now;
        info!(
            "Session {}: round {} starts at {}",
            self.id, round_no, start
        );
        Ok((round_no, start))
    }

    /// Accept one player's word list for the current round. Normalization
    /// and per-list deduplication happen here so every later comparison
    /// operates on canonical text.
    pub fn submit(
        &mut self,
        player_id: Uuid,
        round_no: u32,
        raw_words: &[String],
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        let grace = self.grace();
        let round = self.current_round_mut().ok_or(GameError::RoundNotStarted)?;

        let mut seen = HashSet::new();
        let words: Vec<String> = raw_words
            .iter()
            .map(|raw| normalize_word(raw))
            .filter(|word| !word.is_empty() && seen.insert(word.clone()))
            .collect();

        round.accept_submission(player_id, round_no, words, now, grace)?;
        self.last_activity = now;
        debug!(
            "Session {}: player {} submitted for round {}",
            self.id, player_id, round_no
        );
        Ok(())
    }

    /// Observe the session at `now`, applying any transition that became
    /// due. Returns the snapshot plus, at most once per round, the scoring
    /// job for the `Playing -> Scoring` edge the caller should offload.
    pub fn poll(&mut self, now: DateTime<Utc>) -> (StatePoll, Option<ScoringJob>) {
        let mut response = StatePoll {
            status: RoundPhase::Initial,
            created: self.created.to_rfc3339(),
            players: self.roster(),
            round_no: None,
            round_start: None,
            round_end: None,
            board: None,
            scores: None,
            session_totals: None,
        };

        let Some(round) = self.rounds.last() else {
            return (response, None);
        };
        let all_submitted = self.all_submitted(round);
        let phase = round.phase_at(now, all_submitted);
        let past_grace = now > round.deadline(self.grace());

        response.round_no = Some(round.round_no);
        response.round_start = Some(round.start.to_rfc3339());
        response.round_end = Some(round.end.to_rfc3339());
        response.status = phase;
        if phase != RoundPhase::PreStart {
            response.board = Some(round.board.clone());
        }

        let mut job = None;
        match phase {
            RoundPhase::Scoring if round.scoring == ScoringState::NotStarted => {
                // the deadline (or a full set of submissions) was first
                // observed by this poll; kick off classification+scoring
                if all_submitted || past_grace {
                    job = self.start_scoring();
                }
                // otherwise the grace period is still running
            }
            RoundPhase::Scored => {
                response.scores = round.scores.clone();
                response.session_totals = Some(self.session_totals());
            }
            _ => {}
        }

        (response, job)
    }

    fn start_scoring(&mut self) -> Option<ScoringJob> {
        let epoch = self.scoring_epoch;
        let roster = self.roster();
        let mode = self.config.scoring_mode;
        let table = self.config.score_table.clone();
        let dictionary = self.dictionary.clone();
        let approved = self.approved.clone();
        let round = self.current_round_mut()?;
        round.scoring = ScoringState::InProgress;
        let round_no = round.round_no;
        info!("Scoring round {round_no} started");
        Some(ScoringJob {
            round_no,
            epoch,
            board: round.board.clone(),
            submissions: round
                .submissions
                .values()
                .map(|sub| (sub.player_id, sub.words.clone()))
                .collect(),
            roster,
            dictionary,
            approved: approved.get(&round_no).cloned().unwrap_or_default(),
            mode,
            table,
        })
    }

    /// Complete `Scoring -> Scored`. A stale epoch means the manager
    /// interrupted while the computation ran; the result is dropped and
    /// the abandoned round stays behind the new one.
    pub fn install_scores(&mut self, round_no: u32, epoch: u64, scores: RoundScores) -> bool {
        if epoch != self.scoring_epoch {
            debug!(
                "Session {}: discarding stale scores for round {}",
                self.id, round_no
            );
            return false;
        }
        let Some(round) = self.current_round_mut() else {
            return false;
        };
        if round.round_no != round_no || round.scoring != ScoringState::InProgress {
            return false;
        }
        round.scores = Some(scores);
        round.scoring = ScoringState::Complete;
        info!("Scoring round {round_no} finished");
        true
    }

    /// Revert a failed computation so the next poll retries it. Scoring is
    /// pure, so the retry has no side effects to worry about.
    pub fn abort_scoring(&mut self, round_no: u32, epoch: u64) {
        if epoch != self.scoring_epoch {
            return;
        }
        if let Some(round) = self.current_round_mut()
            && round.round_no == round_no
            && round.scoring == ScoringState::InProgress
        {
            warn!("Scoring round {round_no} failed, will retry on next poll");
            round.scoring = ScoringState::NotStarted;
        }
    }

    /// Manager approval of words the dictionary rejected. Only words that
    /// trace on the round's board are recorded; each recorded word applies
    /// to every occurrence of its normalized form, and approval recomputes the
    /// whole round's scores from flags; nothing is patched incrementally,
    /// so the result is identical to having had the words approved from
    /// the start.
    pub fn approve_words(
        &mut self,
        round_no: u32,
        words: &[String],
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        let idx = self
            .rounds
            .iter()
            .position(|round| round.round_no == round_no)
            .ok_or(GameError::NoSuchRound { round_no })?;
        match self.rounds[idx].scoring {
            ScoringState::Complete => {}
            ScoringState::InProgress => return Err(GameError::ScoringInProgress),
            ScoringState::NotStarted => return Err(GameError::NoSuchRound { round_no }),
        }

        // only words that trace on this round's board can count, so an
        // approval that cannot trace is dropped instead of recorded
        let traceable: Vec<String> = words
            .iter()
            .map(|raw| normalize_word(raw))
            .filter(|word| find_path(&self.rounds[idx].board, word).is_some())
            .collect();
        self.approved
            .entry(round_no)
            .or_default()
            .extend(traceable);

        let round = &self.rounds[idx];
        let job = ScoringJob {
            round_no,
            epoch: self.scoring_epoch,
            board: round.board.clone(),
            submissions: round
                .submissions
                .values()
                .map(|sub| (sub.player_id, sub.words.clone()))
                .collect(),
            roster: self.roster(),
            dictionary: self.dictionary.clone(),
            approved: self.approved.get(&round_no).cloned().unwrap_or_default(),
            mode: self.config.scoring_mode,
            table: self.config.score_table.clone(),
        };
        let scores = job.compute();
        self.rounds[idx].scores = Some(scores);
        self.last_activity = now;
        info!(
            "Session {}: approved {} word(s) in round {}, rescored",
            self.id,
            words.len(),
            round_no
        );
        Ok(())
    }

    /// Per-player totals over every scored round; a player with no
    /// submission in a round contributes zero for it.
    pub fn session_totals(&self) -> Vec<(Uuid, u32)> {
        self.players
            .iter()
            .map(|sp| {
                let total = self
                    .rounds
                    .iter()
                    .filter_map(|round| round.scores.as_ref())
                    .map(|scores| scores.total_for(sp.player.id))
                    .sum();
                (sp.player.id, total)
            })
            .collect()
    }

    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_activity
    }
}
