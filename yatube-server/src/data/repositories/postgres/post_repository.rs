use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::post::{Author, Post};

const POST_COLUMNS: &str = r#"
    p.id,
    p.text,
    p.pub_date,
    p.image,
    p.author_id,
    u.username AS author_username,
    p.group_id,
    g.title AS group_title,
    g.slug AS group_slug,
    g.description AS group_description
"#;

const POST_JOINS: &str = r#"
    JOIN users u ON u.id = p.author_id
    LEFT JOIN groups g ON g.id = p.group_id
"#;

const NEWEST_FIRST: &str = "ORDER BY p.pub_date DESC, p.id DESC";

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_list(&self, filter: &str, key: Option<i64>) -> Result<Vec<Post>, DomainError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts p {POST_JOINS} {filter} {NEWEST_FIRST}");
        let mut query = sqlx::query_as::<_, PostRow>(&sql);
        if let Some(key) = key {
            query = query.bind(key);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }
}

#[derive(Debug, FromRow)]
struct PostRow {
    id: i64,
    text: String,
    pub_date: DateTime<Utc>,
    image: Option<String>,
    author_id: i64,
    author_username: String,
    group_id: Option<i64>,
    group_title: Option<String>,
    group_slug: Option<String>,
    group_description: Option<String>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, input: NewPost) -> Result<Post, DomainError> {
        let sql = format!(
            r#"
            WITH p AS (
                INSERT INTO posts (author_id, text, group_id, image, pub_date)
                VALUES ($1, $2, $3, $4, COALESCE($5, NOW()))
                RETURNING *
            )
            SELECT {POST_COLUMNS} FROM p {POST_JOINS}
            "#
        );

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(input.author_id)
            .bind(input.text)
            .bind(input.group_id)
            .bind(input.image)
            .bind(input.pub_date)
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts p {POST_JOINS} WHERE p.id = $1");

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn update(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            WITH p AS (
                UPDATE posts
                SET text = $3,
                    group_id = $4,
                    image = COALESCE($5, image)
                WHERE id = $1 AND author_id = $2
                RETURNING *
            )
            SELECT {POST_COLUMNS} FROM p {POST_JOINS}
            "#
        );

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post_id)
            .bind(owner_id)
            .bind(patch.text)
            .bind(patch.group_id)
            .bind(patch.image)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Post>, DomainError> {
        self.fetch_list("", None).await
    }

    async fn find_by_group(&self, group_id: i64) -> Result<Vec<Post>, DomainError> {
        self.fetch_list("WHERE p.group_id = $1", Some(group_id)).await
    }

    async fn find_by_author(&self, author_id: i64) -> Result<Vec<Post>, DomainError> {
        self.fetch_list("WHERE p.author_id = $1", Some(author_id))
            .await
    }

    async fn count_by_author(&self, author_id: i64) -> Result<i64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM posts
            WHERE author_id = $1
            "#,
        )
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(count)
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    let group = match (row.group_id, row.group_title, row.group_slug) {
        (Some(id), Some(title), Some(slug)) => Some(
            Group::new(id, title, slug, row.group_description.unwrap_or_default())
                .map_err(|err| DomainError::Unexpected(err.to_string()))?,
        ),
        _ => None,
    };
    let author = Author {
        id: row.author_id,
        username: row.author_username,
    };

    Post::new(row.id, row.text, row.pub_date, author, group, row.image)
        .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return foreign_key_error(db_err.constraint());
    }
    DomainError::Unexpected(err.to_string())
}

/// Пропавшая группа это ошибка поля формы, пропавший автор нет.
fn foreign_key_error(constraint: Option<&str>) -> DomainError {
    match constraint {
        Some("posts_group_id_fkey") => DomainError::validation("group", "select a valid choice"),
        _ => DomainError::not_found("author", "referenced by post"),
    }
}
