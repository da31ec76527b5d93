use tokio::net::TcpListener;

const DEFAULT_PORT: &str = "3000";

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("MOCK_SERVER_PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("mock server listening on http://{}", listener.local_addr()?);
    mock_server::run(listener).await
}
