//! End-to-end walk through the quiz and survey flow against in-memory
//! backends.

use std::sync::Arc;

use quiz_core::model::{IdentityDraft, SurveyDraft};
use quiz_core::time::fixed_clock;
use services::{
    CountdownTick, QUIZ_SECONDS, QuizPhase, QuizSessionService, SurveyPhase,
    SurveySubmissionService,
};
use storage::repository::{InMemoryRepository, QuizRecordRepository};
use storage::session::{InMemorySessionStore, SessionStore, keys};

fn identity() -> IdentityDraft {
    IdentityDraft::new("flow@test.com", "@flow", "+123456")
}

fn survey() -> SurveyDraft {
    SurveyDraft {
        recommendation: "a community member".into(),
        time_in_community: "three months".into(),
        earnings: "not yet".into(),
        passion_rating: Some(9),
        recommend_rating: Some(10),
    }
}

#[tokio::test]
async fn full_flow_persists_quiz_then_merges_survey() {
    let repo: Arc<InMemoryRepository> = Arc::new(InMemoryRepository::new());
    let session: Arc<InMemorySessionStore> = Arc::new(InMemorySessionStore::new());

    let mut quiz = QuizSessionService::new(fixed_clock(), repo.clone(), session.clone());
    quiz.start_quiz(identity()).unwrap();
    assert_eq!(quiz.remaining_seconds(), QUIZ_SECONDS);

    // Answer every question correctly, walking the pointer forward.
    let count = quiz.questions().len();
    for i in 0..count {
        let answer = quiz.current_question().unwrap().answer().to_string();
        quiz.select_option(&answer).unwrap();
        if i + 1 < count {
            quiz.advance();
        }
    }
    assert_eq!(quiz.responses().answered_count(), count);

    let outcome = quiz.submit().await.unwrap();
    assert_eq!(quiz.phase(), QuizPhase::Done);
    assert_eq!(outcome.result.score(), count as u32);
    assert_eq!(outcome.result.responses().len(), count);

    // Submission cancelled the countdown; ticks stay inert.
    assert_eq!(quiz.tick(), CountdownTick::Inactive);

    // The survey flow picks the result up from the session store.
    let mut survey_service = SurveySubmissionService::new(repo.clone(), session.clone());
    assert_eq!(survey_service.phase(), SurveyPhase::FormVisible);
    assert_eq!(
        survey_service.handoff().map(|r| r.identity().email()),
        Some("flow@test.com")
    );

    let confirmation = survey_service.submit_survey(survey()).await.unwrap();
    assert_eq!(confirmation.message, "Survey response submitted successfully!");
    assert_eq!(survey_service.phase(), SurveyPhase::Submitted);

    // One durable record carries both the quiz result and the survey fields.
    let record = repo.find_by_email("flow@test.com").await.unwrap().unwrap();
    assert_eq!(record.id, outcome.record_id);
    assert_eq!(record.result, outcome.result);
    let merged = record.survey.expect("survey merged into the quiz record");
    assert_eq!(merged.recommendation(), "a community member");
    assert_eq!(merged.recommend_rating(), Some(10));

    // The handoff mirror is cleared; the identity prefill stays.
    assert!(session.get(keys::USER_DATA).unwrap().is_none());
    assert_eq!(
        session.get(keys::EMAIL).unwrap().as_deref(),
        Some("flow@test.com")
    );
}

#[tokio::test]
async fn expiry_submits_whatever_was_answered() {
    let repo: Arc<InMemoryRepository> = Arc::new(InMemoryRepository::new());
    let session: Arc<InMemorySessionStore> = Arc::new(InMemorySessionStore::new());

    let mut quiz = QuizSessionService::new(fixed_clock(), repo.clone(), session.clone());
    quiz.start_quiz(identity()).unwrap();

    let answer = quiz.current_question().unwrap().answer().to_string();
    quiz.select_option(&answer).unwrap();

    let mut outcome = None;
    for _ in 0..QUIZ_SECONDS {
        if quiz.tick() == CountdownTick::Expired {
            outcome = Some(quiz.submit().await.unwrap());
        }
    }

    let outcome = outcome.expect("countdown expired within its window");
    assert_eq!(outcome.result.score(), 1);
    assert_eq!(outcome.result.responses().len(), 1);
    assert!(
        repo.find_by_email("flow@test.com")
            .await
            .unwrap()
            .is_some()
    );
}
