#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chatbot_relay_lib::run().await
}
