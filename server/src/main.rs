#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let config = tarefas_server::config::Config::from_env()?;
    tarefas_server::web::start_web_server(config).await
}
