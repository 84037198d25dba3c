use std::{process, sync::Arc};

use cursus::{
    application::{
        certificates::{CertificateService, backfill::backfill_missing},
        error::AppError,
        payments::PaymentService,
        registration::RegistrationService,
        repos::{EnrollmentsRepo, RegistrationRepo},
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        storage::{HostedObjectStore, ObjectStore},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Backfill(args) => run_backfill(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let state = build_api_state(repositories, &settings)?;
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "cursus::serve",
        addr = %settings.server.addr,
        "Listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal(settings.server.graceful_shutdown))
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn run_backfill(
    settings: config::Settings,
    args: config::BackfillArgs,
) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let enrollments: Arc<dyn EnrollmentsRepo> = repositories.clone();
    let store = build_object_store(&settings)?;

    let service = CertificateService::new(store, enrollments.clone());

    let outcome = backfill_missing(&service, &enrollments, args.limit)
        .await
        .map_err(|err| AppError::unexpected(format!("backfill failed: {err}")))?;

    info!(
        target = "cursus::backfill",
        succeeded = outcome.succeeded,
        failed = outcome.failed,
        "Backfill finished"
    );

    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_object_store(settings: &config::Settings) -> Result<Arc<dyn ObjectStore>, AppError> {
    let base_url = settings
        .storage
        .base_url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("storage base url is not configured"))
        .map_err(AppError::from)?;
    let service_key = settings
        .storage
        .service_key
        .as_ref()
        .ok_or_else(|| InfraError::configuration("storage service key is not configured"))
        .map_err(AppError::from)?;

    Ok(Arc::new(HostedObjectStore::new(
        base_url.clone(),
        settings.storage.bucket.clone(),
        service_key.clone(),
    )))
}

fn build_api_state(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> Result<ApiState, AppError> {
    let enrollments: Arc<dyn EnrollmentsRepo> = repositories.clone();
    let registration: Arc<dyn RegistrationRepo> = repositories.clone();

    let store = build_object_store(settings)?;

    let webhook_secret = settings
        .payments
        .webhook_secret
        .as_ref()
        .ok_or_else(|| InfraError::configuration("payment webhook secret is not configured"))
        .map_err(AppError::from)?;

    Ok(ApiState {
        certificates: Arc::new(CertificateService::new(store, enrollments.clone())),
        payments: Arc::new(PaymentService::new(
            enrollments.clone(),
            webhook_secret.clone(),
        )),
        registration: Arc::new(RegistrationService::new(registration)),
        enrollments,
    })
}

async fn shutdown_signal(grace: std::time::Duration) {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => error!(error = %err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!(
        target = "cursus::serve",
        grace_seconds = grace.as_secs(),
        "Shutdown signal received"
    );
}
