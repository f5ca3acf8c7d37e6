#[tokio::main]
async fn main() {
    seatclaim_backend::run().await;
}
