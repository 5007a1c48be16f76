#![forbid(unsafe_code)]

pub mod countdown;
pub mod error;
pub mod quiz_session;
pub mod survey;

pub use quiz_core::Clock;

pub use countdown::{Countdown, CountdownTick, QUIZ_SECONDS};
pub use error::{QuizSessionError, SurveySubmissionError};
pub use quiz_session::{QuizPhase, QuizSessionService, REDIRECT_DELAY_MS, SubmitOutcome};
pub use survey::{
    COMMUNITY_LINKS, CONFIRMATION_WINDOW_SECS, CommunityLink, SurveyConfirmation, SurveyPhase,
    SurveySubmissionService,
};
