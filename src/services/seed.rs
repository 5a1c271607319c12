//! Demo-data seeding for local development and the public showcase.
//!
//! Runs at startup when `SEED_SAMPLE_DATA` is set. Idempotent: the demo
//! user is keyed by email and projects are only inserted when the account
//! has none.

use sqlx::PgPool;
use uuid::Uuid;

use super::account;
use super::project::{self, HoverItemDraft};
use super::username::USERNAME_MAX_LEN;

pub const DEMO_EMAIL: &str = "demo@hoverboard.com";
pub const DEMO_PASSWORD: &str = "demo123";
pub const DEMO_USERNAME: &str = "demo_user";

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Account(#[from] account::AccountError),
    #[error(transparent)]
    Project(#[from] project::ProjectError),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Ensure the demo user and showcase projects exist.
///
/// # Errors
///
/// Returns an error if any insert fails.
pub async fn seed_sample_data(pool: &PgPool) -> Result<(), SeedError> {
    let user_id = match account::profile_by_username(pool, DEMO_USERNAME).await {
        Ok(profile) => profile.id,
        Err(account::AccountError::NotFound) => create_demo_user(pool).await?,
        Err(e) => return Err(e.into()),
    };

    if !project::list_by_user(pool, user_id).await?.is_empty() {
        return Ok(());
    }

    for draft in sample_projects() {
        project::create(pool, user_id, &draft).await?;
    }
    tracing::info!(username = DEMO_USERNAME, "seeded demo user and showcase projects");
    Ok(())
}

async fn create_demo_user(pool: &PgPool) -> Result<Uuid, SeedError> {
    let profile = match account::register(pool, DEMO_EMAIL, DEMO_PASSWORD, "Demo User").await {
        Ok(profile) => profile,
        // Email exists but username was never claimed; pick the account up
        // where a previous seed run left it.
        Err(account::AccountError::EmailTaken) => account::login(pool, DEMO_EMAIL, DEMO_PASSWORD).await?,
        Err(e) => return Err(e.into()),
    };
    if profile.needs_username() {
        account::select_username(pool, profile.id, DEMO_USERNAME, USERNAME_MAX_LEN).await?;
    }
    sqlx::query("UPDATE users SET bio = $1, saldo = $2, level = $3 WHERE id = $4")
        .bind("Demo account for the HoverBoard showcase")
        .bind(2_500_000_i64)
        .bind("Premium")
        .bind(profile.id)
        .execute(pool)
        .await?;
    Ok(profile.id)
}

fn sample_projects() -> Vec<HoverItemDraft> {
    vec![
        HoverItemDraft {
            title: "Website Portfolio".into(),
            subtitle: "React & Node.js".into(),
            description: "Modern portfolio with interactive animations".into(),
            detailed_description: "A portfolio site built to showcase work with a responsive \
                                   frontend and a small API backend."
                .into(),
            category: "web".into(),
            image_url: "https://images.unsplash.com/photo-1467232004584-a241de8bcf5d?w=400&h=300&fit=crop".into(),
            gallery_images: vec![
                "https://images.unsplash.com/photo-1498050108023-c5249f4df085?w=600&h=400&fit=crop".into(),
            ],
            hover_content: "Dark/light mode, responsive layout, smooth animations.".into(),
            fun_fact: "Finished in three days.".into(),
            tech_stack: vec!["React".into(), "Node.js".into(), "MongoDB".into(), "Tailwind CSS".into()],
            features: vec!["Dark and light mode".into(), "Interactive animations".into()],
            challenges: vec!["Animation performance".into()],
            solutions: vec!["Lazy loading".into()],
            github_url: Some("https://github.com/demo/portfolio".into()),
            demo_url: Some("https://portfolio-demo.com".into()),
            duration: "3 days".into(),
            team_size: 1,
            status: "completed".into(),
            ..HoverItemDraft::default()
        },
        HoverItemDraft {
            title: "E-commerce App".into(),
            subtitle: "Full-stack solution".into(),
            description: "Modern shopping experience with integrated payments".into(),
            detailed_description: "An e-commerce platform with payment integration, real-time \
                                   inventory, and an admin dashboard."
                .into(),
            category: "app".into(),
            image_url: "https://images.unsplash.com/photo-1556742049-0cfed4f6a45d?w=400&h=300&fit=crop".into(),
            hover_content: "Stripe integration, real-time inventory, admin dashboard.".into(),
            fun_fact: "Processes over 1000 orders a month.".into(),
            tech_stack: vec!["Next.js".into(), "PostgreSQL".into(), "Stripe".into(), "Redis".into()],
            features: vec!["Multi-gateway payments".into(), "Real-time inventory".into()],
            challenges: vec!["Payment gateway integration".into()],
            solutions: vec!["Microservice split".into()],
            github_url: Some("https://github.com/demo/ecommerce".into()),
            demo_url: Some("https://shop-demo.com".into()),
            duration: "2 months".into(),
            team_size: 3,
            status: "active".into(),
            ..HoverItemDraft::default()
        },
    ]
}

#[cfg(test)]
#[path = "seed_test.rs"]
mod tests;
