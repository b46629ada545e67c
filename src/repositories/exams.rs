use sqlx::PgPool;
use sqlx::{Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::api::listing::PageWindow;
use crate::db::models::Exam;

pub(crate) const COLUMNS: &str = "id, course_id, title, description, created_at, updated_at";

/// Columns searched by `_q`; must stay in sync with the GIN index in the
/// migrations.
const SEARCH_VECTOR: &str =
    "to_tsvector('english', e.title || ' ' || coalesce(e.description, ''))";

/// An exam row with its course reference expanded to `{id, name}` and the
/// transient relevance score (null unless the query searched).
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ExamWithCourseRow {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) course_name: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
    pub(crate) score: Option<f64>,
}

/// One normalized filter specification drives both `count` and `list`, so
/// the reported total and the returned page can never disagree.
#[derive(Debug, Default)]
pub(crate) struct ExamListSpec {
    pub(crate) search: Option<String>,
    pub(crate) course_id: Option<String>,
    pub(crate) window: Option<PageWindow>,
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, spec: &'a ExamListSpec) {
    let mut has_where = false;

    if let Some(term) = spec.search.as_ref() {
        builder.push(format!(" WHERE {SEARCH_VECTOR} @@ plainto_tsquery('english', "));
        builder.push_bind(term);
        builder.push(")");
        has_where = true;
    }
    if let Some(course_id) = spec.course_id.as_ref() {
        builder.push(if has_where { " AND " } else { " WHERE " });
        builder.push("e.course_id = ");
        builder.push_bind(course_id);
    }
}

pub(crate) async fn list(
    pool: &PgPool,
    spec: &ExamListSpec,
) -> Result<Vec<ExamWithCourseRow>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT e.id, e.course_id, c.name AS course_name, e.title, e.description,
                e.created_at, e.updated_at, ",
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

    builder.push(" FROM exams e JOIN courses c ON c.id = e.course_id");
    push_filters(&mut builder, spec);
    builder.push(if spec.search.is_some() {
        " ORDER BY score DESC"
    } else {
        " ORDER BY e.created_at DESC"
    });

    if let Some(window) = spec.window {
        builder.push(" OFFSET ");
        builder.push_bind(window.skip());
        builder.push(" LIMIT ");
        builder.push_bind(window.limit);
    }

    builder.build_query_as::<ExamWithCourseRow>().fetch_all(pool).await
}

/// Count over the filter alone; the pagination window is ignored on purpose.
pub(crate) async fn count(pool: &PgPool, spec: &ExamListSpec) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM exams e");
    push_filters(&mut builder, spec);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<ExamWithCourseRow>, sqlx::Error> {
    sqlx::query_as::<_, ExamWithCourseRow>(
        "SELECT e.id, e.course_id, c.name AS course_name, e.title, e.description,
                e.created_at, e.updated_at, NULL::float8 AS score
         FROM exams e JOIN courses c ON c.id = e.course_id
         WHERE e.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn exists_by_id(pool: &PgPool, id: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM exams WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateExam<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateExam<'_>) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "INSERT INTO exams (id, course_id, title, description, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateExam<'a> {
    pub(crate) title: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Full overwrite of the editable fields; id and created_at are preserved.
pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateExam<'_>,
) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "UPDATE exams SET title = $1, description = $2, updated_at = $3
         WHERE id = $4
         RETURNING {COLUMNS}",
    ))
    .bind(params.title)
    .bind(params.description)
    .bind(params.updated_at)
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Returns the number of rows removed so callers can distinguish a missing
/// id from a successful delete.
pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exams WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected())
}
