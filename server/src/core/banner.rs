//! Startup banner and URL display

use super::config::is_all_interfaces;
use super::constants::{APP_NAME, HEADER_AUTH_TOKEN, HEADER_USER_ID};
use crate::utils::terminal::terminal_link;

/// Credentials of the administrator created on first start
pub struct BootstrapCredentials<'a> {
    pub user_id: &'a str,
    pub token: &'a str,
}

/// Print the startup banner with URLs
pub fn print_banner(
    host: &str,
    port: u16,
    auth_enabled: bool,
    bootstrap: Option<BootstrapCredentials<'_>>,
    data_dir: &str,
) {
    // Use localhost for display when binding to all interfaces
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();

    const W: usize = 10;

    let api_url = format!("http://{}:{}/api/v1", display_host, port);
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "API:",
        terminal_link(&api_url)
    );

    if !auth_enabled {
        println!(
            "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m disabled \x1b[90m(requests run as admin)\x1b[0m",
            "Auth:"
        );
    } else if let Some(creds) = bootstrap {
        println!(
            "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}: {}",
            "Admin:", HEADER_USER_ID, creds.user_id
        );
        println!(
            "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}: {} \x1b[90m(shown once)\x1b[0m",
            "", HEADER_AUTH_TOKEN, creds.token
        );
    }

    if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    } else if is_all_interfaces(host) {
        if let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
            for (_, ip) in interfaces
                .iter()
                .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
            {
                let network_url = format!("http://{}:{}/api/v1", ip, port);
                println!(
                    "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
                    "Network:",
                    terminal_link(&network_url)
                );
            }
        }
    } else {
        let network_url = format!("http://{}:{}/api/v1", host, port);
        println!(
            "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
            "Network:",
            terminal_link(&network_url)
        );
    }
    println!("  \x1b[90m➜  {:<W$} {}\x1b[0m", "Data:", data_dir);

    println!();
}
