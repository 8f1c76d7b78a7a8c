use chrono_tz::Tz;
use clap::Parser;

#[derive(Debug, Parser)]
pub struct Args {
    /// Zone used to resolve calendar days for the graph views.
    #[arg(long, env = "TZ")]
    pub timezone: Tz,

    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    #[arg(long, env = "LISTEN_ADDRESS", default_value = "0.0.0.0:8081")]
    pub listen: String,

    /// Sensors to query, in display order.
    #[arg(
        long,
        env = "SENSOR_IDS",
        value_delimiter = ',',
        default_value = "livingroom,bedroom"
    )]
    pub sensor_ids: Vec<String>,

    /// Apply pending schema migrations before serving.
    #[arg(long)]
    pub run_migrations: bool,
}
