use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Identity, Question, ResponseSet};

/// Final outcome of one quiz session, in the shape written to the durable
/// store and mirrored for the survey handoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    identity: Identity,
    responses: Vec<String>,
    score: u32,
    submitted_at: DateTime<Utc>,
}

impl QuizResult {
    /// Build a result from the session's responses: the stored responses are
    /// the compacted selections, the score pairs each slot with its own
    /// question.
    #[must_use]
    pub fn from_responses(
        identity: Identity,
        responses: &ResponseSet,
        questions: &[Question],
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            identity,
            score: responses.score_against(questions),
            responses: responses.compact(),
            submitted_at,
        }
    }

    /// Rehydrate a result from persisted storage.
    #[must_use]
    pub fn from_persisted(
        identity: Identity,
        responses: Vec<String>,
        score: u32,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            identity,
            responses,
            score,
            submitted_at,
        }
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub fn responses(&self) -> &[String] {
        &self.responses
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

/// Lowest accepted survey rating.
pub const RATING_MIN: u8 = 1;
/// Highest accepted survey rating.
pub const RATING_MAX: u8 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SurveyError {
    #[error("rating {value} is outside {RATING_MIN}..={RATING_MAX}")]
    RatingOutOfRange { value: u8 },
}

/// Raw survey fields as typed into the follow-up form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyDraft {
    pub recommendation: String,
    pub time_in_community: String,
    pub earnings: String,
    pub passion_rating: Option<u8>,
    pub recommend_rating: Option<u8>,
}

impl SurveyDraft {
    /// Validate the draft into a `SurveyResult`.
    ///
    /// Text fields are required by the form, not re-checked here. Ratings are
    /// optional but must fall within 1..=10 when present.
    ///
    /// # Errors
    ///
    /// Returns `SurveyError::RatingOutOfRange` for an out-of-range rating.
    pub fn validate(self) -> Result<SurveyResult, SurveyError> {
        check_rating(self.passion_rating)?;
        check_rating(self.recommend_rating)?;

        Ok(SurveyResult {
            recommendation: self.recommendation,
            time_in_community: self.time_in_community,
            earnings: self.earnings,
            passion_rating: self.passion_rating,
            recommend_rating: self.recommend_rating,
        })
    }
}

fn check_rating(rating: Option<u8>) -> Result<(), SurveyError> {
    match rating {
        Some(value) if !(RATING_MIN..=RATING_MAX).contains(&value) => {
            Err(SurveyError::RatingOutOfRange { value })
        }
        _ => Ok(()),
    }
}

/// Survey fields merged into the persisted quiz record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResult {
    recommendation: String,
    time_in_community: String,
    earnings: String,
    passion_rating: Option<u8>,
    recommend_rating: Option<u8>,
}

impl SurveyResult {
    /// Rehydrate a survey from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SurveyError::RatingOutOfRange` if a stored rating is invalid.
    pub fn from_persisted(
        recommendation: impl Into<String>,
        time_in_community: impl Into<String>,
        earnings: impl Into<String>,
        passion_rating: Option<u8>,
        recommend_rating: Option<u8>,
    ) -> Result<Self, SurveyError> {
        check_rating(passion_rating)?;
        check_rating(recommend_rating)?;

        Ok(Self {
            recommendation: recommendation.into(),
            time_in_community: time_in_community.into(),
            earnings: earnings.into(),
            passion_rating,
            recommend_rating,
        })
    }

    #[must_use]
    pub fn recommendation(&self) -> &str {
        &self.recommendation
    }

    #[must_use]
    pub fn time_in_community(&self) -> &str {
        &self.time_in_community
    }

    #[must_use]
    pub fn earnings(&self) -> &str {
        &self.earnings
    }

    #[must_use]
    pub fn passion_rating(&self) -> Option<u8> {
        self.passion_rating
    }

    #[must_use]
    pub fn recommend_rating(&self) -> Option<u8> {
        self.recommend_rating
    }
}
