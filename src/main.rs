#[tokio::main]
async fn main() -> anyhow::Result<()> {
    issuedump::logging::init();
    let args: Vec<String> = std::env::args().collect();
    issuedump::run::run(args, None).await
}
