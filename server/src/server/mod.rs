mod pixel_server;
mod server_config;

pub use pixel_server::PixelServer;
pub use server_config::ServerConfig;
