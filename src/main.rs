use lambda_http::{run, service_fn, Error, Request};
use tracing_subscriber::EnvFilter;

use todo_api::config::Config;
use todo_api::db::DynamoStore;
use todo_api::router;
use todo_api::storage::S3Uploads;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env();
    let store = DynamoStore::new(&config).await;
    let uploads = S3Uploads::new(&config).await;

    run(service_fn(move |req: Request| {
        let store = store.clone();
        let uploads = uploads.clone();
        async move { router::route(req, &store, &uploads).await }
    }))
    .await
}
