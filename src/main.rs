#[tokio::main]
async fn main() {
    viewing_scheduler::run().await;
}
