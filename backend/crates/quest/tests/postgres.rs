//! PostgreSQL repository tests
//!
//! Run against a scratch database:
//! `DATABASE_URL=postgres://... cargo test -p quest --features postgres-tests`

use std::sync::Arc;

use chrono::{Duration, Utc};
use kernel::id::{PrizeId, QuestId, SeekerId};
use quest::PgQuestRepository;
use quest::QuestError;
use quest::application::config::QuestConfig;
use quest::application::quest_lifecycle::QuestLifecycleUseCase;
use quest::application::redeem_prize::{RedeemInput, RedeemPrizeUseCase};
use quest::application::seekers::{SeekerPatch, SeekerUseCase};
use quest::application::suggestions::{NewSuggestion, SuggestionUseCase};
use quest::domain::entities::{Prize, Quest, Seeker, SeekerChanges};
use quest::domain::repository::{
    PrizeRepository, QuestRepository, RedemptionRepository, SeekerRepository,
};
use quest::domain::value_objects::{Assignees, QuestDuration, QuestStatus, SeekerPin, Stars};
use sqlx::PgPool;

async fn seed_seeker(repo: &PgQuestRepository, id: &str, stars: i32) -> SeekerId {
    let seeker = Seeker {
        id: SeekerId::parse(id).unwrap(),
        name: format!("Seeker {id}"),
        pin: SeekerPin::parse("1234").unwrap(),
        avatar_url: String::new(),
        stars: Stars::new(stars).unwrap(),
    };
    repo.create_seeker(&seeker).await.unwrap();
    seeker.id
}

async fn seed_quest(repo: &PgQuestRepository, id: &str, reward: i32, duration: QuestDuration) -> QuestId {
    let quest = Quest {
        id: QuestId::parse(id).unwrap(),
        title: format!("Quest {id}"),
        description: String::new(),
        reward: Stars::positive(reward).unwrap(),
        status: QuestStatus::Active,
        duration,
        assigned_to: Assignees::default(),
        started_at: None,
        completed_at: None,
        completed_by: None,
        created_at: Utc::now(),
    };
    repo.create_quest(&quest).await.unwrap();
    quest.id
}

async fn seed_prize(repo: &PgQuestRepository, id: &str, cost: i32) -> PrizeId {
    let prize = Prize {
        id: PrizeId::parse(id).unwrap(),
        name: format!("Prize {id}"),
        description: String::new(),
        stars_cost: Stars::positive(cost).unwrap(),
        image_url: None,
        available: true,
    };
    repo.create_prize(&prize).await.unwrap();
    prize.id
}

async fn stars_of(repo: &PgQuestRepository, id: &SeekerId) -> i32 {
    repo.find_seeker(id).await.unwrap().unwrap().stars.get()
}

#[sqlx::test(migrations = "../../../database/migrations")]
async fn test_approve_twice_credits_once(pool: PgPool) {
    let repo = PgQuestRepository::new(pool);
    let s1 = seed_seeker(&repo, "S1", 0).await;
    let q1 = seed_quest(&repo, "Q1", 3, QuestDuration::None).await;
    let lifecycle = QuestLifecycleUseCase::new(Arc::new(repo.clone()));

    lifecycle.start(&q1, &s1).await.unwrap();
    lifecycle.complete(&q1, &s1).await.unwrap();

    let (a, b) = tokio::join!(lifecycle.approve(&q1, None), lifecycle.approve(&q1, None));
    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert_eq!(stars_of(&repo, &s1).await, 3);

    let history = repo.quest_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].seeker_name.as_deref(), Some("Seeker S1"));
}

#[sqlx::test(migrations = "../../../database/migrations")]
async fn test_duplicate_completion_and_daily_gate(pool: PgPool) {
    let repo = PgQuestRepository::new(pool);
    let s1 = seed_seeker(&repo, "S1", 0).await;
    let q1 = seed_quest(&repo, "Q1", 1, QuestDuration::Daily).await;
    let lifecycle = QuestLifecycleUseCase::new(Arc::new(repo.clone()));

    let t0 = Utc::now();
    lifecycle.start_at(&q1, &s1, t0).await.unwrap();
    assert!(matches!(
        lifecycle.complete_at(&q1, &s1, t0 + Duration::hours(23)).await,
        Err(QuestError::TooEarly { .. })
    ));

    lifecycle
        .complete_at(&q1, &s1, t0 + Duration::hours(24))
        .await
        .unwrap();
    assert!(matches!(
        lifecycle.complete_at(&q1, &s1, t0 + Duration::hours(25)).await,
        Err(QuestError::DuplicateCompletion)
    ));
}

#[sqlx::test(migrations = "../../../database/migrations")]
async fn test_concurrent_redemptions_never_overdraw(pool: PgPool) {
    let repo = PgQuestRepository::new(pool);
    let s1 = seed_seeker(&repo, "S1", 5).await;
    let p1 = seed_prize(&repo, "P1", 4).await;
    let redeem = RedeemPrizeUseCase::new(
        Arc::new(repo.clone()),
        Arc::new(QuestConfig::development()),
    );
    let input = || RedeemInput {
        prize_id: p1.clone(),
        seeker_id: s1.clone(),
        stars_cost: Some(4),
    };

    let (a, b) = tokio::join!(redeem.execute(input()), redeem.execute(input()));
    let failures: Vec<_> = [a, b].into_iter().filter_map(Result::err).collect();
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0], QuestError::InsufficientStars));

    assert_eq!(stars_of(&repo, &s1).await, 1);
    assert_eq!(repo.list_redemptions().await.unwrap().len(), 1);
    assert!(matches!(
        repo.delete_prize(&p1).await,
        Err(QuestError::PrizeHasRedemptions)
    ));
}

#[sqlx::test(migrations = "../../../database/migrations")]
async fn test_suggestion_approval_inserts_quest(pool: PgPool) {
    let repo = PgQuestRepository::new(pool);
    let s1 = seed_seeker(&repo, "S1", 0).await;
    let suggestions = SuggestionUseCase::new(Arc::new(repo.clone()));

    let suggestion = suggestions
        .create(NewSuggestion {
            title: "Fold laundry".into(),
            description: None,
            suggested_by: s1.clone(),
            desired_reward: 4,
            duration: QuestDuration::None,
        })
        .await
        .unwrap();

    let (_, quest) = suggestions.approve(&suggestion.id).await.unwrap();
    let stored = repo.find_quest(&quest.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QuestStatus::Active);
    assert_eq!(stored.reward.get(), 4);
    assert!(stored.assigned_to.contains(&s1));

    assert!(matches!(
        suggestions.reject(&suggestion.id).await,
        Err(QuestError::SuggestionReviewed)
    ));
}

#[sqlx::test(migrations = "../../../database/migrations")]
async fn test_duplicate_ids_conflict(pool: PgPool) {
    let repo = PgQuestRepository::new(pool);
    seed_seeker(&repo, "S1", 0).await;

    let duplicate = Seeker {
        id: SeekerId::parse("S1").unwrap(),
        name: "Again".into(),
        pin: SeekerPin::parse("0000").unwrap(),
        avatar_url: String::new(),
        stars: Stars::ZERO,
    };
    let err = repo.create_seeker(&duplicate).await.unwrap_err();
    assert_eq!(err.status_code().as_u16(), 409);
}

#[sqlx::test(migrations = "../../../database/migrations")]
async fn test_rename_never_restores_spent_stars(pool: PgPool) {
    let repo = PgQuestRepository::new(pool);
    let s1 = seed_seeker(&repo, "S1", 5).await;
    let p1 = seed_prize(&repo, "P1", 5).await;
    let seekers = SeekerUseCase::new(Arc::new(repo.clone()));
    let redeem = RedeemPrizeUseCase::new(
        Arc::new(repo.clone()),
        Arc::new(QuestConfig::development()),
    );

    let (renamed, receipt) = tokio::join!(
        seekers.update(
            &s1,
            SeekerPatch {
                name: Some("Ada".into()),
                ..Default::default()
            }
        ),
        redeem.execute(RedeemInput {
            prize_id: p1.clone(),
            seeker_id: s1.clone(),
            stars_cost: None,
        })
    );
    renamed.unwrap();
    assert_eq!(receipt.unwrap().remaining_stars.get(), 0);

    let stored = repo.find_seeker(&s1).await.unwrap().unwrap();
    assert_eq!(stored.name, "Ada");
    assert_eq!(stored.stars.get(), 0);
    assert_eq!(repo.list_redemptions_for_seeker(&s1).await.unwrap().len(), 1);

    // Only the fields that are set are written
    let changes = SeekerChanges {
        avatar_url: Some("/avatars/ada.png".into()),
        ..Default::default()
    };
    let updated = repo.update_seeker(&s1, &changes).await.unwrap().unwrap();
    assert_eq!(updated.name, "Ada");
    assert_eq!(updated.stars.get(), 0);
    assert!(repo
        .update_seeker(&SeekerId::parse("nobody").unwrap(), &changes)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../../database/migrations")]
async fn test_approve_rejects_seeker_outside_quest(pool: PgPool) {
    let repo = PgQuestRepository::new(pool);
    let s1 = seed_seeker(&repo, "S1", 0).await;
    let s3 = seed_seeker(&repo, "S3", 0).await;
    let q1 = seed_quest(&repo, "Q1", 2, QuestDuration::None).await;
    let lifecycle = QuestLifecycleUseCase::new(Arc::new(repo.clone()));

    lifecycle.start(&q1, &s1).await.unwrap();
    lifecycle.complete(&q1, &s1).await.unwrap();

    assert!(matches!(
        lifecycle.approve(&q1, Some(&s3)).await,
        Err(QuestError::NotAssigned)
    ));
    assert_eq!(stars_of(&repo, &s3).await, 0);
    assert_eq!(
        repo.find_quest(&q1).await.unwrap().unwrap().status,
        QuestStatus::Pending
    );

    let approval = lifecycle.approve(&q1, None).await.unwrap();
    assert_eq!(approval.seeker_id, s1);
    assert_eq!(stars_of(&repo, &s1).await, 2);
}
