//! Project (hover item) storage: the public showcase records.
//!
//! Reads are public; writes require the owning user. A single-project fetch
//! increments the view counter atomically in the same statement.

use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("project not found")]
    NotFound,
    #[error("not authorized to modify this project")]
    Forbidden,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Full project record as shown on the board and detail pages.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HoverItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub detailed_description: String,
    pub category: String,
    pub image_url: String,
    pub gallery_images: Vec<String>,
    pub hover_content: String,
    pub fun_fact: String,
    pub tech_stack: Vec<String>,
    pub features: Vec<String>,
    pub challenges: Vec<String>,
    pub solutions: Vec<String>,
    pub link_url: Option<String>,
    pub github_url: Option<String>,
    pub demo_url: Option<String>,
    pub duration: String,
    pub team_size: i32,
    pub status: String,
    pub views: i64,
    pub created_at: String,
}

/// Client-supplied project fields for create/update.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct HoverItemDraft {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub detailed_description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub gallery_images: Vec<String>,
    #[serde(default)]
    pub hover_content: String,
    #[serde(default)]
    pub fun_fact: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
    #[serde(default)]
    pub solutions: Vec<String>,
    pub link_url: Option<String>,
    pub github_url: Option<String>,
    pub demo_url: Option<String>,
    #[serde(default)]
    pub duration: String,
    #[serde(default = "default_team_size")]
    pub team_size: i32,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_team_size() -> i32 {
    1
}

fn default_status() -> String {
    "completed".to_owned()
}

const ITEM_COLUMNS: &str = r#"id, user_id, title, subtitle, description, detailed_description,
    category, image_url, gallery_images, hover_content, fun_fact, tech_stack, features,
    challenges, solutions, link_url, github_url, demo_url, duration, team_size, status,
    views, to_char(created_at, 'YYYY-MM-DD"T"HH24:MI:SS') AS created_at"#;

fn item_from_row(row: &PgRow) -> HoverItem {
    HoverItem {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        subtitle: row.get("subtitle"),
        description: row.get("description"),
        detailed_description: row.get("detailed_description"),
        category: row.get("category"),
        image_url: row.get("image_url"),
        gallery_images: row.get::<Json<Vec<String>>, _>("gallery_images").0,
        hover_content: row.get("hover_content"),
        fun_fact: row.get("fun_fact"),
        tech_stack: row.get::<Json<Vec<String>>, _>("tech_stack").0,
        features: row.get::<Json<Vec<String>>, _>("features").0,
        challenges: row.get::<Json<Vec<String>>, _>("challenges").0,
        solutions: row.get::<Json<Vec<String>>, _>("solutions").0,
        link_url: row.get("link_url"),
        github_url: row.get("github_url"),
        demo_url: row.get("demo_url"),
        duration: row.get("duration"),
        team_size: row.get("team_size"),
        status: row.get("status"),
        views: row.get("views"),
        created_at: row.get("created_at"),
    }
}

/// List every project, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_all(pool: &PgPool) -> Result<Vec<HoverItem>, ProjectError> {
    let query = format!("SELECT {ITEM_COLUMNS} FROM projects ORDER BY created_at DESC");
    let rows = sqlx::query(&query).fetch_all(pool).await?;
    Ok(rows.iter().map(item_from_row).collect())
}

/// List one user's projects, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<HoverItem>, ProjectError> {
    let query = format!("SELECT {ITEM_COLUMNS} FROM projects WHERE user_id = $1 ORDER BY created_at DESC");
    let rows = sqlx::query(&query).bind(user_id).fetch_all(pool).await?;
    Ok(rows.iter().map(item_from_row).collect())
}

/// Fetch a single project and bump its view counter in one statement.
///
/// # Errors
///
/// `NotFound` when no such project exists.
pub async fn fetch_counting_view(pool: &PgPool, project_id: Uuid) -> Result<HoverItem, ProjectError> {
    let query = format!(
        r"UPDATE projects SET views = views + 1
          WHERE id = $1
          RETURNING {ITEM_COLUMNS}"
    );
    let row = sqlx::query(&query)
        .bind(project_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ProjectError::NotFound)?;
    Ok(item_from_row(&row))
}

/// Create a project owned by `user_id`.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub async fn create(pool: &PgPool, user_id: Uuid, draft: &HoverItemDraft) -> Result<HoverItem, ProjectError> {
    let query = format!(
        r"INSERT INTO projects (
              user_id, title, subtitle, description, detailed_description, category,
              image_url, gallery_images, hover_content, fun_fact, tech_stack, features,
              challenges, solutions, link_url, github_url, demo_url, duration, team_size, status
          )
          VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
          RETURNING {ITEM_COLUMNS}"
    );
    let row = bind_draft(sqlx::query(&query).bind(user_id), draft).fetch_one(pool).await?;
    Ok(item_from_row(&row))
}

/// Replace a project's fields. Owner-only.
///
/// # Errors
///
/// `NotFound` for an unknown id, `Forbidden` when `user_id` is not the
/// owner.
pub async fn update(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
    draft: &HoverItemDraft,
) -> Result<HoverItem, ProjectError> {
    require_owner(pool, project_id, user_id).await?;

    let query = format!(
        r"UPDATE projects SET
              title = $2, subtitle = $3, description = $4, detailed_description = $5,
              category = $6, image_url = $7, gallery_images = $8, hover_content = $9,
              fun_fact = $10, tech_stack = $11, features = $12, challenges = $13,
              solutions = $14, link_url = $15, github_url = $16, demo_url = $17,
              duration = $18, team_size = $19, status = $20
          WHERE id = $1
          RETURNING {ITEM_COLUMNS}"
    );
    let row = bind_draft(sqlx::query(&query).bind(project_id), draft).fetch_one(pool).await?;
    Ok(item_from_row(&row))
}

/// Delete a project. Owner-only.
///
/// # Errors
///
/// `NotFound` for an unknown id, `Forbidden` when `user_id` is not the
/// owner.
pub async fn delete(pool: &PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), ProjectError> {
    require_owner(pool, project_id, user_id).await?;
    sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(project_id)
        .execute(pool)
        .await?;
    Ok(())
}

async fn require_owner(pool: &PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), ProjectError> {
    let owner: Option<Uuid> = sqlx::query_scalar("SELECT user_id FROM projects WHERE id = $1")
        .bind(project_id)
        .fetch_optional(pool)
        .await?;
    match owner {
        None => Err(ProjectError::NotFound),
        Some(owner) if owner != user_id => Err(ProjectError::Forbidden),
        Some(_) => Ok(()),
    }
}

type PgQuery<'q> = sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>;

fn bind_draft<'q>(query: PgQuery<'q>, draft: &'q HoverItemDraft) -> PgQuery<'q> {
    query
        .bind(&draft.title)
        .bind(&draft.subtitle)
        .bind(&draft.description)
        .bind(&draft.detailed_description)
        .bind(&draft.category)
        .bind(&draft.image_url)
        .bind(Json(&draft.gallery_images))
        .bind(&draft.hover_content)
        .bind(&draft.fun_fact)
        .bind(Json(&draft.tech_stack))
        .bind(Json(&draft.features))
        .bind(Json(&draft.challenges))
        .bind(Json(&draft.solutions))
        .bind(&draft.link_url)
        .bind(&draft.github_url)
        .bind(&draft.demo_url)
        .bind(&draft.duration)
        .bind(draft.team_size)
        .bind(&draft.status)
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
