//! # Seed Binary
//!
//! Installs the uniqueness constraints the API relies on for its
//! "already taken" errors, and optionally some demo content.

use std::sync::Arc;

use anyhow::Context;
use auth_adapters::{Argon2Hasher, JwtTokens};
use clap::Parser;
use configs::Settings;
use domains::{DomainError, GraphExecutor, Statement, User};
use services::{AppServices, ArticleInput, Login, Registration};
use storage_adapters::{Neo4jConfig, Neo4jGraph};
use tracing::{info, warn};

/// `(name, label, property)` of every uniqueness constraint.
const CONSTRAINTS: &[(&str, &str, &str)] = &[
    ("user_id", "User", "id"),
    ("user_username", "User", "username"),
    ("user_email", "User", "email"),
    ("article_id", "Article", "id"),
    ("article_slug", "Article", "slug"),
    ("tag_name", "Tag", "name"),
    ("comment_id", "Comment", "id"),
];

const DEMO_PASSWORD: &str = "conduit-demo";

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Install Conduit's graph schema")]
struct Args {
    /// Also create two demo users, a follow edge and one article.
    #[arg(long)]
    with_demo: bool,

    /// Install the constraints on this database instead of the configured
    /// one. Demo content always goes to the configured database.
    #[arg(long)]
    database: Option<String>,
}

fn constraint_statement(
    name: &str,
    label: &str,
    property: &str,
    database: Option<&str>,
) -> Statement {
    let statement = Statement::new(format!(
        "CREATE CONSTRAINT {name} IF NOT EXISTS FOR (n:{label}) REQUIRE n.{property} IS UNIQUE"
    ));
    match database {
        Some(database) => statement.database(database),
        None => statement,
    }
}

/// Registers the user, or logs in when a previous run already did.
async fn demo_user(services: &AppServices, username: &str) -> anyhow::Result<User> {
    let email = format!("{username}@demo.conduit");
    let registration = Registration {
        username: Some(username.to_string()),
        email: Some(email.clone()),
        password: Some(DEMO_PASSWORD.to_string()),
        bio: Some(format!("I am {username}.")),
        image: None,
    };
    let session = match services.users.register(&registration).await {
        Ok(session) => session,
        Err(DomainError::AlreadyTaken { field }) => {
            info!(%username, %field, "demo user exists");
            let login = Login {
                email: Some(email),
                password: Some(DEMO_PASSWORD.to_string()),
            };
            services.users.login(&login).await?
        }
        Err(e) => return Err(e.into()),
    };
    Ok(session.user)
}

async fn seed_demo(services: &AppServices) -> anyhow::Result<()> {
    let alice = demo_user(services, "demo-alice").await?;
    let bob = demo_user(services, "demo-bob").await?;
    services.profiles.follow(alice.username(), &bob).await?;

    let article = ArticleInput {
        title: Some("Welcome to Conduit".into()),
        description: Some("A first article".into()),
        body: Some("Follow demo-alice to see this in your feed.".into()),
        tag_list: Some(vec!["welcome".into(), "demo".into()]),
    };
    let created = services.articles.create(&alice, &article).await?;
    info!(slug = ?created.slug(), "demo content created");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();
    let settings = Settings::load().context("loading settings")?;

    let graph = Arc::new(
        Neo4jGraph::connect(Neo4jConfig {
            uri: settings.neo4j.url,
            username: settings.neo4j.username,
            password: settings.neo4j.password,
            database: settings.neo4j.database,
            max_connections: settings.neo4j.max_connections,
            fetch_size: settings.neo4j.fetch_size,
        })
        .await
        .context("connecting to Neo4j")?,
    );

    for (name, label, property) in CONSTRAINTS {
        graph
            .write(constraint_statement(name, label, property, args.database.as_deref()))
            .await
            .with_context(|| format!("installing constraint {name}"))?;
        info!(%name, "constraint ready");
    }

    if args.with_demo {
        let tokens = JwtTokens::new(&settings.auth.jwt_secret, settings.auth.token_ttl_secs);
        let services = AppServices::new(graph, Arc::new(Argon2Hasher), Arc::new(tokens));
        if let Err(e) = seed_demo(&services).await {
            warn!(error = %e, "demo content incomplete");
            return Err(e);
        }
    }

    info!("seed complete");
    Ok(())
}
