use sqlx::PgPool;
use sqlx::{Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::api::listing::PageWindow;
use crate::db::models::Course;

pub(crate) const COLUMNS: &str = "id, name, description, created_at, updated_at";

const SEARCH_VECTOR: &str =
    "to_tsvector('english', c.name || ' ' || coalesce(c.description, ''))";

/// A course row plus the transient relevance score (null unless the query
/// searched). Courses have no reference field to expand.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CourseSearchRow {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
    pub(crate) score: Option<f64>,
}

#[derive(Debug, Default)]
pub(crate) struct CourseListSpec {
    pub(crate) search: Option<String>,
    pub(crate) window: Option<PageWindow>,
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, spec: &'a CourseListSpec) {
    if let Some(term) = spec.search.as_ref() {
        builder.push(format!(" WHERE {SEARCH_VECTOR} @@ plainto_tsquery('english', "));
        builder.push_bind(term);
        builder.push(")");
    }
}

pub(crate) async fn list(
    pool: &PgPool,
    spec: &CourseListSpec,
) -> Result<Vec<CourseSearchRow>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT c.id, c.name, c.description, c.created_at, c.updated_at, ",
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

    builder.push(" FROM courses c");
    push_filters(&mut builder, spec);
    builder.push(if spec.search.is_some() {
        " ORDER BY score DESC"
    } else {
        " ORDER BY c.created_at DESC"
    });

    if let Some(window) = spec.window {
        builder.push(" OFFSET ");
        builder.push_bind(window.skip());
        builder.push(" LIMIT ");
        builder.push_bind(window.limit);
    }

    builder.build_query_as::<CourseSearchRow>().fetch_all(pool).await
}

pub(crate) async fn count(pool: &PgPool, spec: &CourseListSpec) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM courses c");
    push_filters(&mut builder, spec);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COLUMNS} FROM courses WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateCourse<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateCourse<'_>) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (id, name, description, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.description)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateCourse<'a> {
    pub(crate) name: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Full overwrite of the editable fields; id and created_at are preserved.
pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateCourse<'_>,
) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "UPDATE courses SET name = $1, description = $2, updated_at = $3
         WHERE id = $4
         RETURNING {COLUMNS}",
    ))
    .bind(params.name)
    .bind(params.description)
    .bind(params.updated_at)
    .bind(id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected())
}
