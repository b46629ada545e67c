use sqlx::PgPool;
use sqlx::{Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::api::listing::PageWindow;
use crate::db::models::Question;
use crate::db::types::QuestionType;

pub(crate) const COLUMNS: &str = "\
    id, exam_id, title, question_type, options, correct_answer, marks, created_at, updated_at";

const SEARCH_VECTOR: &str = "to_tsvector('english', q.title)";

/// A question row with its exam reference expanded to `{id, title}` and the
/// transient relevance score (null unless the query searched).
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QuestionWithExamRow {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) exam_title: String,
    pub(crate) title: String,
    pub(crate) question_type: QuestionType,
    pub(crate) options: Vec<String>,
    pub(crate) correct_answer: String,
    pub(crate) marks: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
    pub(crate) score: Option<f64>,
}

#[derive(Debug, Default)]
pub(crate) struct QuestionListSpec {
    pub(crate) search: Option<String>,
    pub(crate) exam_id: Option<String>,
    pub(crate) window: Option<PageWindow>,
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, spec: &'a QuestionListSpec) {
    let mut has_where = false;

    if let Some(term) = spec.search.as_ref() {
        builder.push(format!(" WHERE {SEARCH_VECTOR} @@ plainto_tsquery('english', "));
        builder.push_bind(term);
        builder.push(")");
        has_where = true;
    }
    if let Some(exam_id) = spec.exam_id.as_ref() {
        builder.push(if has_where { " AND " } else { " WHERE " });
        builder.push("q.exam_id = ");
        builder.push_bind(exam_id);
    }
}

pub(crate) async fn list(
    pool: &PgPool,
    spec: &QuestionListSpec,
) -> Result<Vec<QuestionWithExamRow>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT q.id, q.exam_id, e.title AS exam_title, q.title, q.question_type,
                q.options, q.correct_answer, q.marks, q.created_at, q.updated_at, ",
    );

    match spec.search.as_ref() {
        Some(term) => {
            builder.push(format!("ts_rank({SEARCH_VECTOR}, plainto_tsquery('english', "));
            builder.push_bind(term);
            builder.push("))::float8 AS score");
        }
        None => {
            builder.push("NULL::float8 AS score");
        }
    }

    builder.push(" FROM questions q JOIN exams e ON e.id = q.exam_id");
    push_filters(&mut builder, spec);
    builder.push(if spec.search.is_some() {
        " ORDER BY score DESC"
    } else {
        " ORDER BY q.created_at DESC"
    });

    if let Some(window) = spec.window {
        builder.push(" OFFSET ");
        builder.push_bind(window.skip());
        builder.push(" LIMIT ");
        builder.push_bind(window.limit);
    }

    builder.build_query_as::<QuestionWithExamRow>().fetch_all(pool).await
}

/// Count over the filter alone; the pagination window is ignored on purpose.
pub(crate) async fn count(pool: &PgPool, spec: &QuestionListSpec) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM questions q");
    push_filters(&mut builder, spec);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<QuestionWithExamRow>, sqlx::Error> {
    sqlx::query_as::<_, QuestionWithExamRow>(
        "SELECT q.id, q.exam_id, e.title AS exam_title, q.title, q.question_type,
                q.options, q.correct_answer, q.marks, q.created_at, q.updated_at,
                NULL::float8 AS score
         FROM questions q JOIN exams e ON e.id = q.exam_id
         WHERE q.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn exists_by_id(pool: &PgPool, id: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM questions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) exam_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) question_type: QuestionType,
    pub(crate) options: &'a [String],
    pub(crate) correct_answer: &'a str,
    pub(crate) marks: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (
            id, exam_id, title, question_type, options, correct_answer, marks,
            created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.exam_id)
    .bind(params.title)
    .bind(params.question_type)
    .bind(params.options)
    .bind(params.correct_answer)
    .bind(params.marks)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateQuestion<'a> {
    pub(crate) title: &'a str,
    pub(crate) question_type: QuestionType,
    pub(crate) options: &'a [String],
    pub(crate) correct_answer: &'a str,
    pub(crate) marks: i32,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Full overwrite of the editable fields; id, exam_id, and created_at are
/// preserved.
pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "UPDATE questions SET
            title = $1,
            question_type = $2,
            options = $3,
            correct_answer = $4,
            marks = $5,
            updated_at = $6
         WHERE id = $7
         RETURNING {COLUMNS}",
    ))
    .bind(params.title)
    .bind(params.question_type)
    .bind(params.options)
    .bind(params.correct_answer)
    .bind(params.marks)
    .bind(params.updated_at)
    .bind(id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected())
}
