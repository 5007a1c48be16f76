use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{QuizResult, SurveyDraft};
use storage::repository::QuizRecordRepository;
use storage::session::{self, SessionStore, keys};

use crate::error::SurveySubmissionError;

/// How long the confirmation stays on screen before the community links
/// replace it, in seconds.
pub const CONFIRMATION_WINDOW_SECS: u64 = 3;

/// Lifecycle of the survey page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyPhase {
    /// No mirrored quiz result was found; submission can never succeed.
    AwaitingResult,
    /// The form is shown and accepts a submission.
    FormVisible,
    /// The survey was merged into the durable record.
    Submitted,
}

/// A static outbound community link shown after the confirmation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommunityLink {
    pub label: &'static str,
    pub url: &'static str,
}

pub const COMMUNITY_LINKS: [CommunityLink; 4] = [
    CommunityLink {
        label: "Follow Iziedking (Circuit Founder)",
        url: "https://x.com/Iziedking",
    },
    CommunityLink {
        label: "Join Circuit Discord",
        url: "https://discord.gg/MqScgAqa",
    },
    CommunityLink {
        label: "Join Circuit Telegram",
        url: "https://t.me/crypto_circuitN",
    },
    CommunityLink {
        label: "Join Circuit WhatsApp Community",
        url: "https://chat.whatsapp.com/J1mNirCGlxW7e04JYnM8e0",
    },
];

/// Confirmation handed back by a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyConfirmation {
    pub message: &'static str,
    /// How long the caller should keep the message visible.
    pub visible_for: Duration,
}

/// Collects the follow-up survey and merges it into the quiz record that the
/// session handed off.
pub struct SurveySubmissionService {
    records: Arc<dyn QuizRecordRepository>,
    session: Arc<dyn SessionStore>,
    handoff: Option<QuizResult>,
    phase: SurveyPhase,
    submit_in_flight: bool,
}

impl SurveySubmissionService {
    /// Create the service, reading the mirrored quiz result from the session
    /// store. An absent or undecodable mirror leaves the service in
    /// `AwaitingResult`, where submission always fails.
    #[must_use]
    pub fn new(records: Arc<dyn QuizRecordRepository>, session: Arc<dyn SessionStore>) -> Self {
        let handoff = match session::get_json::<QuizResult>(session.as_ref(), keys::USER_DATA) {
            Ok(handoff) => handoff,
            Err(e) => {
                log::warn!("discarding undecodable quiz handoff: {e}");
                None
            }
        };
        let phase = if handoff.is_some() {
            SurveyPhase::FormVisible
        } else {
            SurveyPhase::AwaitingResult
        };

        Self {
            records,
            session,
            handoff,
            phase,
            submit_in_flight: false,
        }
    }

    #[must_use]
    pub fn phase(&self) -> SurveyPhase {
        self.phase
    }

    /// The quiz result handed off by the session, if one was found.
    #[must_use]
    pub fn handoff(&self) -> Option<&QuizResult> {
        self.handoff.as_ref()
    }

    /// Merge the survey fields into the durable record matching the handoff
    /// email, then clear the mirror.
    ///
    /// On success the returned confirmation should stay visible for its
    /// 3-second window before the community links are shown. Store failures
    /// leave the phase at `FormVisible`; nothing is retried automatically.
    ///
    /// # Errors
    ///
    /// Returns `SurveySubmissionError::MissingHandoff` when no quiz result
    /// was handed off, `RecordMissing` when no durable record matches the
    /// email, `SubmissionInFlight`/`AlreadySubmitted` for repeated calls,
    /// and `Survey`/`Storage` for validation and backend failures.
    pub async fn submit_survey(
        &mut self,
        draft: SurveyDraft,
    ) -> Result<SurveyConfirmation, SurveySubmissionError> {
        if self.submit_in_flight {
            return Err(SurveySubmissionError::SubmissionInFlight);
        }
        if self.phase == SurveyPhase::Submitted {
            return Err(SurveySubmissionError::AlreadySubmitted);
        }
        let Some(handoff) = self.handoff.clone() else {
            return Err(SurveySubmissionError::MissingHandoff);
        };

        let survey = draft.validate()?;

        self.submit_in_flight = true;
        let submission = async {
            let record = self
                .records
                .find_by_email(handoff.identity().email())
                .await?
                .ok_or(SurveySubmissionError::RecordMissing)?;
            self.records.merge_survey(record.id, &survey).await?;
            Ok(())
        }
        .await;
        self.submit_in_flight = false;

        match submission {
            Ok(()) => {
                if let Err(e) = self.session.remove(keys::USER_DATA) {
                    log::warn!("failed to clear the quiz handoff: {e}");
                }
                self.phase = SurveyPhase::Submitted;
                Ok(SurveyConfirmation {
                    message: "Survey response submitted successfully!",
                    visible_for: Duration::from_secs(CONFIRMATION_WINDOW_SECS),
                })
            }
            Err(e) => {
                log::warn!("survey submission failed: {e}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{IdentityDraft, ResponseSet, question_bank};
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;
    use storage::session::InMemorySessionStore;

    fn build_result(email: &str) -> QuizResult {
        let identity = IdentityDraft::new(email, "x", "y").validate().unwrap();
        let questions = question_bank();
        let responses = ResponseSet::new(questions.len());
        QuizResult::from_responses(identity, &responses, &questions, fixed_now())
    }

    fn survey_draft() -> SurveyDraft {
        SurveyDraft {
            recommendation: "a friend".into(),
            time_in_community: "6 months".into(),
            earnings: "a little".into(),
            passion_rating: Some(7),
            recommend_rating: Some(8),
        }
    }

    fn store_with_handoff(result: &QuizResult) -> Arc<InMemorySessionStore> {
        let store = Arc::new(InMemorySessionStore::new());
        session::put_json(store.as_ref(), keys::USER_DATA, result).unwrap();
        store
    }

    #[tokio::test]
    async fn missing_handoff_is_terminal() {
        let mut service = SurveySubmissionService::new(
            Arc::new(InMemoryRepository::new()),
            Arc::new(InMemorySessionStore::new()),
        );
        assert_eq!(service.phase(), SurveyPhase::AwaitingResult);

        let err = service.submit_survey(survey_draft()).await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "User data not found! Please complete the quiz first."
        );
        assert_eq!(service.phase(), SurveyPhase::AwaitingResult);
    }

    #[tokio::test]
    async fn missing_durable_record_keeps_the_form_visible() {
        let result = build_result("a@b.com");
        let mut service = SurveySubmissionService::new(
            Arc::new(InMemoryRepository::new()),
            store_with_handoff(&result),
        );
        assert_eq!(service.phase(), SurveyPhase::FormVisible);

        let err = service.submit_survey(survey_draft()).await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "User quiz data not found! Please retake the quiz."
        );
        assert_eq!(service.phase(), SurveyPhase::FormVisible);
    }

    #[tokio::test]
    async fn successful_submission_merges_and_clears_the_mirror() {
        let repo = Arc::new(InMemoryRepository::new());
        let result = build_result("a@b.com");
        use storage::repository::QuizRecordRepository as _;
        repo.create_record(&result).await.unwrap();
        let store = store_with_handoff(&result);

        let mut service = SurveySubmissionService::new(repo.clone(), store.clone());
        let confirmation = service.submit_survey(survey_draft()).await.unwrap();

        assert_eq!(service.phase(), SurveyPhase::Submitted);
        assert_eq!(
            confirmation.visible_for,
            Duration::from_secs(CONFIRMATION_WINDOW_SECS)
        );
        assert!(store.get(keys::USER_DATA).unwrap().is_none());

        let record = repo.find_by_email("a@b.com").await.unwrap().unwrap();
        let survey = record.survey.expect("survey merged");
        assert_eq!(survey.recommendation(), "a friend");
        assert_eq!(survey.passion_rating(), Some(7));
    }

    #[tokio::test]
    async fn repeated_submission_is_rejected() {
        let repo = Arc::new(InMemoryRepository::new());
        let result = build_result("a@b.com");
        use storage::repository::QuizRecordRepository as _;
        repo.create_record(&result).await.unwrap();

        let mut service =
            SurveySubmissionService::new(repo, store_with_handoff(&result));
        service.submit_survey(survey_draft()).await.unwrap();

        let err = service.submit_survey(survey_draft()).await.unwrap_err();
        assert!(matches!(err, SurveySubmissionError::AlreadySubmitted));
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected_before_any_write() {
        let repo = Arc::new(InMemoryRepository::new());
        let result = build_result("a@b.com");
        use storage::repository::QuizRecordRepository as _;
        repo.create_record(&result).await.unwrap();

        let mut service =
            SurveySubmissionService::new(repo.clone(), store_with_handoff(&result));
        let draft = SurveyDraft {
            passion_rating: Some(11),
            ..survey_draft()
        };
        let err = service.submit_survey(draft).await.unwrap_err();
        assert!(matches!(err, SurveySubmissionError::Survey(_)));
        assert_eq!(service.phase(), SurveyPhase::FormVisible);

        let record = repo.find_by_email("a@b.com").await.unwrap().unwrap();
        assert!(record.survey.is_none());
    }
}
