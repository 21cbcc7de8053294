use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use scheme_rank::config::{LoggingSettings, ScorerBackend, Settings};
use scheme_rank::core::EligibilityFilter;
use scheme_rank::models::FilterThresholds;
use scheme_rank::routes::{self, AppState};
use scheme_rank::services::{ProcessScorer, RemoteScorer, ScoreCache, Scorer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Initialize logging; RUST_LOG wins over the configured level
fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn build_scorer(settings: &Settings) -> std::io::Result<Scorer> {
    let scorer = &settings.scorer;
    let timeout = Duration::from_secs(scorer.timeout_secs);

    Ok(match scorer.backend {
        ScorerBackend::Process => {
            let mut process = ProcessScorer::new(
                scorer.python_path.clone(),
                &scorer.script_path,
                &scorer.model_path,
                timeout,
            );
            if let Some(dir) = &scorer.working_dir {
                process = process.with_working_dir(dir);
            }
            Scorer::Process(process)
        }
        ScorerBackend::Http => {
            let url = scorer.url.clone().unwrap_or_default();
            let remote = RemoteScorer::new(url, scorer.api_key.clone(), timeout)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            Scorer::Remote(remote)
        }
    })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing(&LoggingSettings::default());
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    init_tracing(&settings.logging);
    info!("Starting scheme recommendation service...");

    let thresholds = FilterThresholds::from(&settings.filter);
    let filter = EligibilityFilter::new(thresholds).map_err(|e| {
        error!("Failed to build eligibility filter: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    info!("Eligibility filter initialized: {:?}", filter);

    let scorer = build_scorer(&settings)?;
    let model_info = scorer.model_info().await;
    if model_info.is_available {
        info!("Scorer ready ({} backend at {})", model_info.backend, model_info.location);
    } else {
        // Requests get 503 until the model shows up
        error!("Scorer not available ({} backend at {})", model_info.backend, model_info.location);
    }

    let cache = if settings.cache.enabled {
        info!(
            "Score cache initialized ({} entries, TTL: {}s)",
            settings.cache.max_entries, settings.cache.ttl_secs
        );
        Some(Arc::new(ScoreCache::new(settings.cache.max_entries, settings.cache.ttl_secs)))
    } else {
        info!("Score cache disabled");
        None
    };

    let app_state = AppState {
        scorer: Arc::new(scorer),
        filter: Arc::new(filter),
        cache,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
