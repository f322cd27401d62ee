#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

#[tokio::main]
async fn main() {
    hellgate_watcher::run().await;
}
