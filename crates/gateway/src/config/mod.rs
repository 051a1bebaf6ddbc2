pub use gateway_config::{BackendConfig, CorsConfig, GatewayConfig, ServerConfig};

mod gateway_config;
