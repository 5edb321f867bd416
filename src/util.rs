use std::net::IpAddr;

use crate::config::ApiSettings;

const API_PORT: &str = "MONITOR_API_PORT";

pub fn get_port(default: u16) -> u16 {
    let port_from_env = std::env::var(API_PORT);
    port_from_env.map_or(default, |res| res.parse().unwrap_or(default))
}

const API_ADDR: &str = "MONITOR_API_ADDR";

pub fn get_addr(default: IpAddr) -> IpAddr {
    let addr_from_env = std::env::var(API_ADDR);
    addr_from_env.map_or(default, |res| res.parse().unwrap_or(default))
}

const API_TOKEN: &str = "MONITOR_API_TOKEN";

pub fn get_token() -> Option<String> {
    let token_from_env = std::env::var(API_TOKEN);
    token_from_env.ok().filter(|token| !token.is_empty())
}

/// Overlay the `MONITOR_API_*` environment variables onto file settings
pub fn apply_env_overrides(mut settings: ApiSettings) -> ApiSettings {
    settings.bind.set_ip(get_addr(settings.bind.ip()));
    settings.bind.set_port(get_port(settings.bind.port()));
    if let Some(token) = get_token() {
        settings.token = Some(token);
    }
    settings
}
