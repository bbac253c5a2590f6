//! Posting against PostgreSQL
//!
//! Requires a running PostgreSQL instance; skipped when DATABASE_URL is unset.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use board_common::JwtService;
use board_core::{Board, Snowflake, SnowflakeGenerator, Thread};
use board_db::{
    run_migrations, PgAttachmentRepository, PgBanRepository, PgBoardRepository, PgPool,
    PgPostRepository, PgPostingStore, PgThreadRepository, PgUserRepository, PgUserTokenRepository,
};
use board_media::{AttachmentProcessor, MemoryFileStorage, OEmbedResolver, ProcessorConfig};
use board_service::dto::{PostForm, PosterInfo, ThreadForm};
use board_service::services::DisabledCaptchaVerifier;
use board_service::{BoardPostingService, ServiceContext, ServiceContextBuilder};
use futures::future::join_all;

const THREAD_LIMIT: i32 = 5;
const CONCURRENT_THREADS: usize = 8;

async fn get_test_pool() -> Option<PgPool> {
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPool::connect(&database_url).await.ok()?;
    run_migrations(&pool).await.ok()?;
    Some(pool)
}

fn context(pool: &PgPool) -> ServiceContext {
    let processor = AttachmentProcessor::new(
        Arc::new(MemoryFileStorage::new()),
        Arc::new(OEmbedResolver::new(Duration::from_secs(1), Duration::from_secs(1)).unwrap()),
        ProcessorConfig::default(),
    );

    ServiceContextBuilder::new()
        .board_repo(Arc::new(PgBoardRepository::new(pool.clone())))
        .thread_repo(Arc::new(PgThreadRepository::new(pool.clone())))
        .post_repo(Arc::new(PgPostRepository::new(pool.clone())))
        .attachment_repo(Arc::new(PgAttachmentRepository::new(pool.clone())))
        .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
        .token_repo(Arc::new(PgUserTokenRepository::new(pool.clone())))
        .ban_repo(Arc::new(PgBanRepository::new(pool.clone())))
        .posting_store(Arc::new(PgPostingStore::new(pool.clone())))
        .attachment_processor(Arc::new(processor))
        .captcha_verifier(Arc::new(DisabledCaptchaVerifier))
        .jwt_service(Arc::new(JwtService::new("test-secret-key-that-is-long-enough", 900)))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(11)))
        .build()
        .unwrap()
}

async fn create_board(ctx: &ServiceContext, thread_limit: i32) -> Board {
    let id = ctx.generate_id();
    let label = format!("e{}", id.into_inner() % 1_000_000_000_000);
    let mut board = Board::new(id, label, "Eviction".to_string());
    board.settings.thread_limit = thread_limit;
    ctx.board_repo().create(&board).await.unwrap();
    board
}

fn poster(n: usize) -> PosterInfo {
    PosterInfo {
        ip: format!("198.51.100.{n}"),
        country_code: None,
    }
}

fn thread_form(subject: String) -> ThreadForm {
    ThreadForm {
        subject: Some(subject),
        post: PostForm {
            body: "bump".to_string(),
            ..PostForm::default()
        },
    }
}

async fn threads_on(ctx: &ServiceContext, board_id: Snowflake) -> Vec<Thread> {
    ctx.thread_repo()
        .find_by_board(board_id, 0, 1_000)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_concurrent_threads_evict_exactly_one_each() {
    let Some(pool) = get_test_pool().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let ctx = context(&pool);
    let board = create_board(&ctx, THREAD_LIMIT).await;
    let service = BoardPostingService::new(&ctx);

    let sticky = service
        .create_thread(&board.label, thread_form("rules".to_string()), &poster(0), None)
        .await
        .unwrap();
    let sticky_thread = ctx
        .thread_repo()
        .find_by_board_and_number(board.id, sticky.thread_number)
        .await
        .unwrap()
        .unwrap();
    ctx.thread_repo().set_stickied(sticky_thread.id, true).await.unwrap();

    let mut seeded = Vec::new();
    for i in 0..THREAD_LIMIT as usize {
        let created = service
            .create_thread(&board.label, thread_form(format!("seed {i}")), &poster(1), None)
            .await
            .unwrap();
        seeded.push(created.thread_number);
    }
    assert_eq!(threads_on(&ctx, board.id).await.len(), THREAD_LIMIT as usize + 1);

    let results = join_all((0..CONCURRENT_THREADS).map(|i| {
        let ctx = ctx.clone();
        let label = board.label.clone();
        tokio::spawn(async move {
            BoardPostingService::new(&ctx)
                .create_thread(&label, thread_form(format!("race {i}")), &poster(i + 2), None)
                .await
        })
    }))
    .await;

    let mut raced = HashSet::new();
    for result in results {
        let created = result.unwrap().unwrap();
        raced.insert(created.thread_number);
    }
    assert_eq!(raced.len(), CONCURRENT_THREADS);

    let remaining = threads_on(&ctx, board.id).await;
    let remaining_numbers: HashSet<i64> =
        remaining.iter().map(|t| t.original_post.post_number).collect();
    let live = remaining.iter().filter(|t| !t.stickied).count();

    assert_eq!(live, THREAD_LIMIT as usize);
    assert!(remaining.iter().any(|t| t.id == sticky_thread.id && t.stickied));

    let evicted = seeded
        .iter()
        .chain(raced.iter())
        .filter(|n| !remaining_numbers.contains(n))
        .count();
    assert_eq!(evicted, CONCURRENT_THREADS);

    // Seeded threads are the stalest, so none may outlive a raced one
    for thread in remaining.iter().filter(|t| !t.stickied) {
        let number = thread.original_post.post_number;
        assert!(raced.contains(&number), "seeded thread {number} outlived a newer one");
    }
}
