mod identity;
mod ids;
mod question;
mod response;
mod result;

pub use identity::{Identity, IdentityDraft, IdentityError};
pub use ids::RecordId;
pub use question::{OPTIONS_PER_QUESTION, QUESTION_COUNT, Question, QuestionError, question_bank};
pub use response::{ResponseError, ResponseSet};
pub use result::{
    QuizResult, RATING_MAX, RATING_MIN, SurveyDraft, SurveyError, SurveyResult,
};
