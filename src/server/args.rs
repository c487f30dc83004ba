use std::net::SocketAddr;

use clap::Parser;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Parser, Debug, Clone)]
pub struct ServerArgs {
    #[arg(long, env = "TRACKTIME_LISTEN", default_value = DEFAULT_LISTEN, help = "Address the API listens on")]
    pub listen: SocketAddr,
    #[arg(
        long = "ollama-url",
        env = "TRACKTIME_OLLAMA_URL",
        default_value = DEFAULT_OLLAMA_URL,
        help = "Base url of the generation service requests under /api/ollama are forwarded to"
    )]
    pub ollama_url: String,
}
