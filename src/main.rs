use friendgraph::{
    api::error::SystemError,
    configs::{connect_database, run_migrations},
    constants::Env,
};

/// Applies the schema to the configured database.
#[tokio::main]
async fn main() -> Result<(), SystemError> {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded");

    let env = Env::new()?;
    let constraints = env.friend_constraints();
    log::info!(
        "Pair ordering: {}, self pairs allowed: {}",
        constraints.pair_ordering,
        constraints.allow_self_pairs
    );

    let db_pool = connect_database(&env).await?;
    run_migrations(&db_pool).await?;
    db_pool.close().await;

    Ok(())
}
