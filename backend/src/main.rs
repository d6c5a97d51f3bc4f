//! Backend entry-point: wires the in-memory directory adapter to the
//! domain services and serves the admin HTTP endpoints.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use groupdir::domain::ports::PredicateContributor;
use groupdir::domain::{
    BulkMembershipProcessor, Group, GroupId, GroupOptionsService, HierarchyExpander,
    MembershipQueryFilter, UserId, UserListService,
};
use groupdir::inbound::http;
use groupdir::inbound::http::state::HttpState;
use groupdir::outbound::memory::{
    AllowListModerationPolicy, InMemoryDirectory, SingleUseTokenStore,
};

/// Command line configuration.
#[derive(Debug, Parser)]
#[command(name = "groupdir", about = "Group directory administration backend")]
struct Config {
    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Seed a small demonstration directory at startup.
    #[arg(long)]
    seed_demo_data: bool,
}

fn seed_demo_data(directory: &InMemoryDirectory) {
    let gid = |raw| GroupId::try_new(raw).unwrap_or_else(|err| panic!("demo group id: {err}"));
    let uid = |raw| UserId::try_new(raw).unwrap_or_else(|err| panic!("demo user id: {err}"));

    directory.add_group(Group::new(gid(1), None, "Staff"));
    directory.add_group(Group::new(gid(2), Some(gid(1)), "Engineering"));
    directory.add_group(Group::new(gid(3), Some(gid(2)), "Platform"));
    directory.add_group(Group::new(gid(4), None, "Alumni"));
    for raw in 1..=8 {
        directory.add_user(uid(raw));
    }
    info!("seeded demonstration directory");
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = Config::parse();

    let directory = Arc::new(InMemoryDirectory::new());
    if config.seed_demo_data {
        seed_demo_data(&directory);
    }
    let moderation = Arc::new(AllowListModerationPolicy::new());
    let tokens = Arc::new(SingleUseTokenStore::new());

    let expander = HierarchyExpander::new(directory.clone());
    let contributors: Vec<Arc<dyn PredicateContributor>> =
        vec![Arc::new(MembershipQueryFilter::new(expander))];
    let state = HttpState::new(
        UserListService::new(directory.clone(), contributors),
        BulkMembershipProcessor::new(
            directory.clone(),
            moderation.clone(),
            tokens.clone(),
            Vec::new(),
        ),
        GroupOptionsService::new(directory.clone()),
        moderation.clone(),
    );

    info!(bind = %config.bind, "starting server");
    let data = web::Data::new(state);
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(http::configure)
    })
    .bind(&config.bind)?
    .run()
    .await
}
