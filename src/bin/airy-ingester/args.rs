use clap::Parser;

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Address accepting newline-delimited measurement payloads.
    #[arg(long, env = "INGEST_LISTEN_ADDRESS", default_value = "0.0.0.0:7878")]
    pub listen: String,
}
