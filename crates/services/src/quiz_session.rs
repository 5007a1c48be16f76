use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{
    Identity, IdentityDraft, Question, QuizResult, RecordId, ResponseSet, question_bank,
};
use storage::repository::QuizRecordRepository;
use storage::session::{self, SessionStore, keys};

use crate::countdown::{Countdown, CountdownTick, QUIZ_SECONDS};
use crate::error::QuizSessionError;

/// How long the driver waits after a successful submission before switching
/// to the survey flow, in milliseconds.
pub const REDIRECT_DELAY_MS: u64 = 500;

/// Lifecycle of one quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// Collecting identity fields.
    Idle,
    /// Timer running, stepping through questions.
    InProgress,
    /// A durable write is in flight.
    Submitting,
    /// The result is persisted and mirrored; the survey flow takes over.
    Done,
}

/// Outcome handed back by a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub record_id: RecordId,
    pub result: QuizResult,
}

/// Drives one quiz session from identity entry through submission.
///
/// Owns the question pointer, the response slots, and the countdown. All
/// session state that must survive a restart lives in the session store; the
/// durable store only ever sees the finished result.
pub struct QuizSessionService {
    clock: Clock,
    records: Arc<dyn QuizRecordRepository>,
    session: Arc<dyn SessionStore>,
    questions: Vec<Question>,
    identity: Option<Identity>,
    responses: ResponseSet,
    current: usize,
    countdown: Countdown,
    phase: QuizPhase,
    submit_in_flight: bool,
}

impl QuizSessionService {
    /// Create a session, restoring any in-progress answers a previous run
    /// left in the session store.
    #[must_use]
    pub fn new(
        clock: Clock,
        records: Arc<dyn QuizRecordRepository>,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        let questions = question_bank();
        let responses = match session::get_json::<ResponseSet>(session.as_ref(), keys::RESPONSES) {
            Ok(Some(stored)) if stored.len() == questions.len() => stored,
            Ok(_) => ResponseSet::new(questions.len()),
            Err(e) => {
                log::warn!("discarding undecodable stored responses: {e}");
                ResponseSet::new(questions.len())
            }
        };

        Self {
            clock,
            records,
            session,
            questions,
            identity: None,
            responses,
            current: 0,
            countdown: Countdown::idle(),
            phase: QuizPhase::Idle,
            submit_in_flight: false,
        }
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn responses(&self) -> &ResponseSet {
        &self.responses
    }

    /// Seconds left on the countdown.
    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.countdown.remaining()
    }

    /// Identity fields a previous run stored, for prefilling the entry form.
    #[must_use]
    pub fn stored_identity(&self) -> IdentityDraft {
        let field = |key: &str| {
            self.session
                .get(key)
                .ok()
                .flatten()
                .unwrap_or_default()
        };
        IdentityDraft::new(field(keys::EMAIL), field(keys::TWITTER), field(keys::WHATSAPP))
    }

    /// Validate the identity and begin the quiz.
    ///
    /// On success the identity is persisted to the session store so a
    /// restarted page can prefill it, the question pointer moves to 0, and
    /// the 45-second countdown starts.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::AlreadyStarted` outside `Idle`, and the
    /// identity validation error (with its user-facing message) while
    /// remaining in `Idle`.
    pub fn start_quiz(&mut self, draft: IdentityDraft) -> Result<(), QuizSessionError> {
        if self.phase != QuizPhase::Idle {
            return Err(QuizSessionError::AlreadyStarted);
        }

        let identity = draft.validate()?;
        self.session.put(keys::EMAIL, identity.email())?;
        self.session.put(keys::TWITTER, identity.twitter())?;
        self.session.put(keys::WHATSAPP, identity.whatsapp())?;

        self.identity = Some(identity);
        self.current = 0;
        self.countdown = Countdown::start(QUIZ_SECONDS);
        self.phase = QuizPhase::InProgress;
        Ok(())
    }

    /// Record `option` for the current question, overwriting any prior
    /// choice there, and mirror the slots to the session store.
    ///
    /// The option is not checked against the question's option list; the
    /// caller presents only valid choices.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::NotStarted` outside `InProgress`.
    pub fn select_option(&mut self, option: &str) -> Result<(), QuizSessionError> {
        if self.phase != QuizPhase::InProgress {
            return Err(QuizSessionError::NotStarted);
        }

        self.responses.select(self.current, option)?;
        session::put_json(self.session.as_ref(), keys::RESPONSES, &self.responses)?;
        Ok(())
    }

    /// Move to the next question; a no-op on the last one.
    pub fn advance(&mut self) {
        if self.phase == QuizPhase::InProgress && self.current + 1 < self.questions.len() {
            self.current += 1;
        }
    }

    /// Move to the previous question; a no-op on the first one.
    pub fn retreat(&mut self) {
        if self.phase == QuizPhase::InProgress && self.current > 0 {
            self.current = self.current.saturating_sub(1);
        }
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `CountdownTick::Expired` exactly once when the clock hits
    /// zero; the driver must then submit regardless of how many questions
    /// were answered. Ticks outside `InProgress` are inert.
    pub fn tick(&mut self) -> CountdownTick {
        if self.phase != QuizPhase::InProgress {
            return CountdownTick::Inactive;
        }
        self.countdown.tick()
    }

    /// Compact and score the responses, write the result to the durable
    /// store, and mirror it for the survey handoff.
    ///
    /// On a store failure the phase returns to `InProgress` with the
    /// countdown still running, so the user can re-trigger the submission
    /// and expiry can still force one; nothing is retried automatically. A
    /// mirror write failure is logged but does not fail the submission,
    /// since the durable record already exists.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::SubmissionInFlight` while a write is
    /// pending, `NotStarted`/`AlreadySubmitted` in the wrong phase, and
    /// `Storage` on a failed durable write.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, QuizSessionError> {
        if self.submit_in_flight {
            return Err(QuizSessionError::SubmissionInFlight);
        }
        match self.phase {
            QuizPhase::InProgress => {}
            QuizPhase::Idle => return Err(QuizSessionError::NotStarted),
            QuizPhase::Submitting => return Err(QuizSessionError::SubmissionInFlight),
            QuizPhase::Done => return Err(QuizSessionError::AlreadySubmitted),
        }
        let identity = self
            .identity
            .clone()
            .ok_or(QuizSessionError::NotStarted)?;

        self.submit_in_flight = true;
        self.phase = QuizPhase::Submitting;

        let result = QuizResult::from_responses(
            identity,
            &self.responses,
            &self.questions,
            self.clock.now(),
        );

        match self.records.create_record(&result).await {
            Ok(record_id) => {
                // Only a persisted result stops the clock; a failed write
                // below leaves it running for the retry.
                self.countdown.cancel();
                if let Err(e) =
                    session::put_json(self.session.as_ref(), keys::USER_DATA, &result)
                {
                    log::warn!("failed to mirror quiz result for the survey handoff: {e}");
                }
                self.phase = QuizPhase::Done;
                self.submit_in_flight = false;
                Ok(SubmitOutcome { record_id, result })
            }
            Err(e) => {
                log::warn!("quiz submission failed: {e}");
                self.phase = QuizPhase::InProgress;
                self.submit_in_flight = false;
                Err(e.into())
            }
        }
    }
}
