use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    oficina_observability::init();

    let port = std::env::var("OFICINA_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);

    let data_file = std::env::var("OFICINA_DATA_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            tracing::warn!("OFICINA_DATA_FILE not set; using ./data.json");
            PathBuf::from("data.json")
        });

    let app = oficina_api::app::build_app(data_file).await?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
