use clap::Parser;
use protoview::*;

#[derive(Parser)]
#[command(name = "protoview")]
#[command(about = "Neutral & protonated molecule pair visualizer", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Depiction width and height in pixels
    #[arg(long, default_value_t = DEFAULT_IMAGE_SIZE)]
    size: u32,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            image_size: cli.size,
            log_level: cli.log_level,
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::from(Cli::parse());
    init_logging(&config.log_level);

    server::run(config).await
}
