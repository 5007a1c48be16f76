use chrono::{DateTime, Utc};
use quiz_core::model::{Identity, QuizResult, RecordId, SurveyResult};
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{QUIZ_COLLECTION, QuizRecord, QuizRecordRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn rating_from_i64(field: &'static str, v: Option<i64>) -> Result<Option<u8>, StorageError> {
    v.map(|raw| {
        u8::try_from(raw).map_err(|_| StorageError::Serialization(format!("invalid {field}: {raw}")))
    })
    .transpose()
}

fn map_record_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuizRecord, StorageError> {
    let id: RecordId = row
        .try_get::<String, _>("id")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;

    let identity = Identity::from_persisted(
        row.try_get::<String, _>("email").map_err(ser)?,
        row.try_get::<String, _>("twitter").map_err(ser)?,
        row.try_get::<String, _>("whatsapp").map_err(ser)?,
    )
    .map_err(ser)?;

    let responses: Vec<String> =
        serde_json::from_str(&row.try_get::<String, _>("responses").map_err(ser)?).map_err(ser)?;

    let score_i64: i64 = row.try_get("score").map_err(ser)?;
    let score = u32::try_from(score_i64)
        .map_err(|_| StorageError::Serialization(format!("invalid score: {score_i64}")))?;

    let submitted_at: DateTime<Utc> = row.try_get("submitted_at").map_err(ser)?;
    let result = QuizResult::from_persisted(identity, responses, score, submitted_at);

    // The survey section is written in one piece, so a present recommendation
    // column means the whole section was merged.
    let survey = match row
        .try_get::<Option<String>, _>("recommendation")
        .map_err(ser)?
    {
        Some(recommendation) => Some(
            SurveyResult::from_persisted(
                recommendation,
                row.try_get::<Option<String>, _>("time_in_community")
                    .map_err(ser)?
                    .unwrap_or_default(),
                row.try_get::<Option<String>, _>("earnings")
                    .map_err(ser)?
                    .unwrap_or_default(),
                rating_from_i64(
                    "passion_rating",
                    row.try_get::<Option<i64>, _>("passion_rating").map_err(ser)?,
                )?,
                rating_from_i64(
                    "recommend_rating",
                    row.try_get::<Option<i64>, _>("recommend_rating")
                        .map_err(ser)?,
                )?,
            )
            .map_err(ser)?,
        ),
        None => None,
    };

    Ok(QuizRecord { id, result, survey })
}

#[async_trait::async_trait]
impl QuizRecordRepository for SqliteRepository {
    async fn create_record(&self, result: &QuizResult) -> Result<RecordId, StorageError> {
        let id = RecordId::generate();
        let responses = serde_json::to_string(result.responses()).map_err(ser)?;

        sqlx::query(&format!(
            r"
                INSERT INTO {QUIZ_COLLECTION} (
                    id, email, twitter, whatsapp, responses, score, submitted_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        ))
        .bind(id.to_string())
        .bind(result.identity().email())
        .bind(result.identity().twitter())
        .bind(result.identity().whatsapp())
        .bind(responses)
        .bind(i64::from(result.score()))
        .bind(result.submitted_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<QuizRecord>, StorageError> {
        let row = sqlx::query(&format!(
            r"
                SELECT
                    id, email, twitter, whatsapp, responses, score, submitted_at,
                    recommendation, time_in_community, earnings,
                    passion_rating, recommend_rating
                FROM {QUIZ_COLLECTION}
                WHERE email = ?1
                ORDER BY submitted_at ASC, id ASC
                LIMIT 1
            ",
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_record_row).transpose()
    }

    async fn merge_survey(&self, id: RecordId, survey: &SurveyResult) -> Result<(), StorageError> {
        let res = sqlx::query(&format!(
            r"
                UPDATE {QUIZ_COLLECTION}
                SET recommendation = ?1,
                    time_in_community = ?2,
                    earnings = ?3,
                    passion_rating = ?4,
                    recommend_rating = ?5
                WHERE id = ?6
            ",
        ))
        .bind(survey.recommendation())
        .bind(survey.time_in_community())
        .bind(survey.earnings())
        .bind(survey.passion_rating().map(i64::from))
        .bind(survey.recommend_rating().map(i64::from))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
