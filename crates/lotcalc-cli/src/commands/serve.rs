use clap::Args;
use crate::server;

/// Arguments for the HTTP API server
#[derive(Args)]
pub struct ServeArgs {
    /// Interface to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8003)]
    pub port: u16,

    /// JSON file overriding the default assumption tables
    #[arg(long)]
    pub assumptions: Option<String>,
}

pub fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let assumptions = super::load_assumptions(args.assumptions.as_deref())?;
    let state = server::AppState::new(assumptions)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::run_http_server(&args.host, args.port, state))?;
    Ok(())
}
