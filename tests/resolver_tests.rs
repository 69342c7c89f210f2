use std::sync::Arc;
use tempfile::TempDir;
use trustscore::resolver::{NpmRegistry, RepositoryRef, UrlResolver};
use trustscore::load_batch;

mod common;
use common::test_helpers::*;

fn resolver(registry_url: &str) -> (UrlResolver, Arc<trustscore::logging::MemoryLogger>) {
    let logger = logger();
    let registry = Arc::new(NpmRegistry::with_base_url(registry_url).unwrap());
    (UrlResolver::new(registry, logger.clone()), logger)
}

#[tokio::test]
async fn test_mixed_batch_against_registry() {
    let mut server = setup_test_server().await;
    let browserify = mock_npm_package(
        &mut server,
        "browserify",
        "git+ssh://git@github.com/browserify/browserify.git",
    )
    .await;
    let lodash = mock_npm_package(&mut server, "lodash", "git+https://github.com/lodash/lodash.git").await;
    let temp_dir = TempDir::new().unwrap();
    let url_file = write_url_file(
        &temp_dir,
        &[
            "https://github.com/cloudinary/cloudinary_npm",
            "https://www.npmjs.com/package/express-not-here",
            "https://www.npmjs.com/package/browserify",
            "https://example.com/nothing",
            "https://www.npmjs.com/package/lodash",
        ],
    );
    let (resolver, _) = resolver(&server.url());

    let batch = load_batch(&url_file, &resolver, &trustscore::logging::MemoryLogger::new()).await;

    let repos: Vec<_> = batch.iter().map(|entry| entry.repo.clone()).collect();
    assert_eq!(
        repos,
        vec![
            RepositoryRef::new("cloudinary", "cloudinary_npm"),
            RepositoryRef::new("browserify", "browserify"),
            RepositoryRef::new("lodash", "lodash"),
        ]
    );
    assert_eq!(batch[1].url, "https://www.npmjs.com/package/browserify");
    browserify.assert_async().await;
    lodash.assert_async().await;
}

#[tokio::test]
async fn test_scoped_package_lookup() {
    let mut server = setup_test_server().await;
    let mock = mock_npm_package(&mut server, "@babel%2fcore", "https://github.com/babel/babel.git").await;
    let (resolver, _) = resolver(&server.url());

    let repo = resolver
        .resolve("https://www.npmjs.com/package/@babel/core")
        .await;

    assert_eq!(repo, Some(RepositoryRef::new("babel", "babel")));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_registry_error_drops_entry() {
    let mut server = setup_test_server().await;
    let _mock = server
        .mock("GET", "/left-pad")
        .with_status(500)
        .create_async()
        .await;
    let (resolver, logger) = resolver(&server.url());

    assert_eq!(resolver.resolve("https://www.npmjs.com/package/left-pad").await, None);
    assert!(logger.contains(log::Level::Info, "Error fetching NPM package"));
}

#[test]
fn test_github_url_resolves_offline() {
    // Nothing listens on this port; a GitHub URL must not need it
    let (resolver, _) = resolver("http://127.0.0.1:9");

    let repo = tokio_test::block_on(resolver.resolve("https://github.com/nullivex/nodist.git"));

    assert_eq!(repo, Some(RepositoryRef::new("nullivex", "nodist")));
}
