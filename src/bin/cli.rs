use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    conveyor::cli::run().await
}
