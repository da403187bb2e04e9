use std::sync::Arc;

use cfpbot_core::config::{AppConfig, ConfigError, LoadOptions};
use cfpbot_core::links::ProposalLinks;
use cfpbot_db::repositories::{SqlReviewRepository, SqlSnapshotRepository};
use cfpbot_db::{connect_with_settings, migrations, DbPool};
use cfpbot_slack::client::{SlackApiError, SlackClient, SlackWebClient};
use cfpbot_slack::signature::SignatureVerifier;
use thiserror::Error;
use tracing::info;

use crate::fortee::{ForteeClient, ForteeError, ProposalSource};
use crate::review::ReviewService;
use crate::routes::AppState;
use crate::scheduled::ProposalJobs;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
    pub jobs: Arc<ProposalJobs>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("fortee.base_url cannot be turned into a proposal link pattern: {0}")]
    ProposalLinks(String),
    #[error("fortee client setup failed: {0}")]
    Fortee(#[from] ForteeError),
    #[error("slack client setup failed: {0}")]
    Slack(#[from] SlackApiError),
}

pub fn load_config(options: LoadOptions) -> Result<AppConfig, BootstrapError> {
    Ok(AppConfig::load(options)?)
}

pub async fn bootstrap(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let links = ProposalLinks::new(&config.fortee.base_url)
        .map_err(|error| BootstrapError::ProposalLinks(error.to_string()))?;
    let source: Arc<dyn ProposalSource> =
        Arc::new(ForteeClient::new(&links, config.fortee.timeout_secs)?);
    let slack: Arc<dyn SlackClient> =
        Arc::new(SlackWebClient::new(config.slack.bot_token.clone())?);

    let review = Arc::new(ReviewService::new(
        source,
        Arc::new(SqlReviewRepository::new(db_pool.clone())),
        config.review.roster(),
        links,
    ));
    let jobs = Arc::new(ProposalJobs::new(
        review.clone(),
        Arc::new(SqlSnapshotRepository::new(db_pool.clone())),
        slack.clone(),
        config.slack.status_channel.clone(),
        config.slack.bot_user_id.clone(),
    ));
    let state = AppState {
        verifier: Arc::new(SignatureVerifier::new(config.slack.signing_secret.clone())),
        review,
        slack,
    };

    info!(
        event_name = "system.bootstrap.completed",
        correlation_id = "bootstrap",
        fortee_base_url = %config.fortee.base_url,
        oncall_reviewers = config.review.oncall_users.len(),
        "application bootstrap completed"
    );

    Ok(Application { config, db_pool, state, jobs })
}
