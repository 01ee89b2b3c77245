use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{cookie::Key, middleware, web, App, HttpServer};

use obeflow::cache::Cache;
use obeflow::{auth, db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/app.db".to_string());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    // Ensure data directory exists for the default sqlite file
    std::fs::create_dir_all("data")?;

    let pool = db::init_pool(&database_url)
        .await
        .expect("Failed to create DB pool");
    db::run_migrations(&pool).await.expect("Failed to run migrations");

    let admin_hash = auth::password::hash_password("admin123")
        .expect("Failed to hash default password");
    db::seed_defaults(&pool, &admin_hash)
        .await
        .expect("Failed to seed defaults");

    // Session encryption key — load from SESSION_KEY for persistent sessions across restarts
    let secret_key = match std::env::var("SESSION_KEY") {
        Ok(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Ok(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+) — generating random key", val.len());
            Key::generate()
        }
        Err(_) => {
            log::warn!("No SESSION_KEY set — generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let cache = web::Data::new(Cache::new());

    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        let session_mw =
            SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                .cookie_secure(false)
                .cookie_http_only(true)
                .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(cache.clone())
            // Public routes
            .route("/login", web::post().to(handlers::auth_handlers::login))
            // Protected routes
            .service(
                web::scope("")
                    .wrap(actix_web::middleware::from_fn(auth::middleware::require_auth))
                    .wrap(actix_web::middleware::from_fn(
                        auth::middleware::require_json_content_type,
                    ))
                    .route("/logout", web::post().to(handlers::auth_handlers::logout))
                    .route("/me", web::get().to(handlers::auth_handlers::me))
                    // Admin CRUD — fixed paths BEFORE the dynamic {role} scope
                    .route("/admin/faculties", web::get().to(handlers::faculty_handlers::list))
                    .route("/admin/faculties", web::post().to(handlers::faculty_handlers::create))
                    .route("/admin/faculties/{id}", web::put().to(handlers::faculty_handlers::update))
                    .route("/admin/faculties/{id}", web::delete().to(handlers::faculty_handlers::delete))
                    .route("/admin/departments", web::get().to(handlers::department_handlers::list))
                    .route("/admin/departments", web::post().to(handlers::department_handlers::create))
                    .route("/admin/departments/{id}", web::put().to(handlers::department_handlers::update))
                    .route("/admin/departments/{id}", web::delete().to(handlers::department_handlers::delete))
                    .route("/admin/users", web::get().to(handlers::user_handlers::list))
                    .route("/admin/users", web::post().to(handlers::user_handlers::create))
                    .route("/admin/users/{id}", web::put().to(handlers::user_handlers::update))
                    .route("/admin/users/{id}", web::delete().to(handlers::user_handlers::delete))
                    .route("/admin/programs", web::get().to(handlers::program_handlers::list))
                    .route("/admin/programs", web::post().to(handlers::program_handlers::create))
                    .route("/admin/programs/{id}", web::put().to(handlers::program_handlers::update))
                    .route("/admin/programs/{id}", web::delete().to(handlers::program_handlers::delete))
                    .route("/admin/audit", web::get().to(handlers::audit_handlers::list))
                    // Role-scoped proposal workflow
                    .route("/{role}/dashboard", web::get().to(handlers::dashboard::index))
                    .route(
                        "/{role}/program-proposals",
                        web::get().to(handlers::proposal_handlers::list),
                    )
                    .route(
                        "/{role}/program-proposals/{id}",
                        web::get().to(handlers::proposal_handlers::detail),
                    )
                    .route(
                        "/{role}/program-proposals/{id}",
                        web::put().to(handlers::proposal_handlers::update),
                    )
                    .route(
                        "/{role}/program-proposals/{id}/revisions",
                        web::get().to(handlers::proposal_handlers::revisions),
                    ),
            )
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                actix_web::HttpResponse::NotFound()
                    .json(serde_json::json!({ "error": "not found" }))
            }))
    })
    .bind(bind_addr)?
    .run()
    .await
}
