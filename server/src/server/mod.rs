mod server_config;
mod world_server;

pub use server_config::ServerConfig;
pub use world_server::WorldServer;
