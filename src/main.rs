// src/main.rs
use axum::{
    http::Method,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod error;
mod handlers;
mod models;
mod recurring;
mod validation;

pub use error::AppError;

use handlers::*;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let db_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in .env");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await
        .expect("Failed to connect to Postgres");

    // 启动时执行 migrations/ 下的建表脚本
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("✅ 数据库连接成功!");

    let state = AppState { db: pool };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    let app = Router::new()
        // 认证
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        // Todo 路由 (全部挂在 user_id 之下, 查询必须按用户过滤)
        .route("/users/:user_id/todos", get(get_todos_handler))
        .route("/users/:user_id/todos", post(create_todo_handler))
        // 静态段路由要和 :todo_id 区分开, axum 会优先匹配字面量
        .route("/users/:user_id/todos/reorder", patch(reorder_todos_handler))
        .route(
            "/users/:user_id/todos/recurring",
            post(create_recurring_todos_handler),
        )
        .route("/users/:user_id/todos/:todo_id", patch(update_todo_handler))
        .route(
            "/users/:user_id/todos/:todo_id",
            delete(delete_todo_handler),
        )
        .route(
            "/users/:user_id/todos/:todo_id/check",
            patch(check_todo_handler),
        )
        .route(
            "/users/:user_id/todos/:todo_id/review",
            patch(review_todo_handler),
        )
        .with_state(state)
        .layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!("🚀 服务器运行在: {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
