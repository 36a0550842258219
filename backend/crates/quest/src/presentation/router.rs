//! Quest Mania Router
//!
//! Paths are relative; the binary nests this router under `/api`.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::application::config::QuestConfig;
use crate::domain::repository::QuestStore;
use crate::infra::postgres::PgQuestRepository;
use crate::presentation::handlers::{
    QuestAppState, master, prizes, quests, seekers, suggestions,
};

/// Create the Quest Mania router with the PostgreSQL repository
pub fn quest_router(repo: PgQuestRepository, config: QuestConfig) -> Router {
    quest_router_generic(repo, config)
}

/// Create a Quest Mania router for any repository implementation
pub fn quest_router_generic<R>(repo: R, config: QuestConfig) -> Router
where
    R: QuestStore,
{
    let state = QuestAppState::new(repo, config);

    Router::new()
        .route("/master/verify", post(master::verify::<R>))
        // Seekers
        .route(
            "/seekers",
            get(seekers::list::<R>).post(seekers::create::<R>),
        )
        .route(
            "/seekers/{id}",
            get(seekers::get::<R>)
                .put(seekers::update::<R>)
                .delete(seekers::delete::<R>),
        )
        .route("/seekers/{id}/login", post(seekers::login::<R>))
        .route("/seekers/{id}/quests", get(seekers::open_quests::<R>))
        .route(
            "/seekers/{id}/redemptions",
            get(seekers::redemptions::<R>),
        )
        // Quests
        .route("/quests", get(quests::list::<R>).post(quests::create::<R>))
        .route("/quests/history", get(quests::history::<R>))
        .route(
            "/quests/{id}",
            get(quests::get::<R>)
                .put(quests::update::<R>)
                .delete(quests::delete::<R>),
        )
        .route("/quests/{id}/assign", post(quests::assign::<R>))
        .route("/quests/{id}/start", post(quests::start::<R>))
        .route("/quests/{id}/complete", post(quests::complete::<R>))
        .route("/quests/{id}/complete-request", post(quests::complete::<R>))
        .route("/quests/{id}/approve", post(quests::approve::<R>))
        .route("/quests/{id}/reject", post(quests::reject::<R>))
        // Suggestions
        .route(
            "/quest-suggestions",
            get(suggestions::list::<R>).post(suggestions::create::<R>),
        )
        .route("/quest-suggestions/{id}", put(suggestions::update::<R>))
        .route(
            "/quest-suggestions/{id}/approve",
            post(suggestions::approve::<R>),
        )
        .route(
            "/quest-suggestions/{id}/reject",
            post(suggestions::reject::<R>),
        )
        // Prizes
        .route("/prizes", get(prizes::list::<R>).post(prizes::create::<R>))
        .route("/prizes/redeem", post(prizes::redeem::<R>))
        .route(
            "/prizes/{id}",
            put(prizes::update::<R>).delete(prizes::delete::<R>),
        )
        .route("/prize-redemptions", get(prizes::redemptions::<R>))
        .with_state(state)
}
