#[tokio::main]
async fn main() -> anyhow::Result<()> {
    modlist_lib::main().await
}
