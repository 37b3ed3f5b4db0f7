use clap::Parser;
use flowhost::adapter::inbound::EntryPointRegistry;
use flowhost::cli::{self, Cli};
use flowhost::core::domain::FunctionResponse;
use flowhost::port::inbound::entry_fn;

/// Functions compiled into this host.
fn registry() -> EntryPointRegistry {
    EntryPointRegistry::new().register(
        "echo.main",
        entry_fn(|_ctx, request| async move {
            let mut response = FunctionResponse::ok(request.body);
            if let Some(content_type) = request.headers.get(http::header::CONTENT_TYPE) {
                response
                    .headers
                    .insert(http::header::CONTENT_TYPE, content_type.clone());
            }
            Ok(response)
        }),
    )
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    if let Err(e) = cli::execute(cli, registry()).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
