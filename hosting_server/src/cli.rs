use std::env;

const HELP: &str = include_str!("./cli-help.txt");

/// Non-secret settings that are safe to echo back to an operator. Credentials are deliberately absent.
const VISIBLE_SETTINGS: [&str; 12] = [
    "RUST_LOG",
    "HOSTING_HOST",
    "HOSTING_PORT",
    "HOSTING_DATABASE_URL",
    "HOSTING_SITE_URL",
    "HOSTING_RUN_MIGRATIONS",
    "HOSTING_PAYPAL_MODE",
    "HOSTING_PAYPAL_API_URL",
    "HOSTING_PAYPAL_CURRENCY",
    "HOSTING_PAYPAL_BRAND_NAME",
    "HOSTING_PANEL_URL",
    "HOSTING_PANEL_PUBLIC_URL",
];

/// The server is configured from the environment only. Any argument prints usage and the current settings, and the
/// caller should exit without starting the server.
pub fn handle_command_line_args() -> bool {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        return false;
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("hosting_server {}", env!("CARGO_PKG_VERSION"));
        return true;
    }
    println!("\n{HELP}\n");
    println!("Current settings (credentials are never shown):");
    for name in VISIBLE_SETTINGS {
        println!("  {name:<35} {}", setting_value(name));
    }
    true
}

fn setting_value(name: &str) -> String {
    match env::var_os(name) {
        None => "Not set".into(),
        Some(v) => v.into_string().unwrap_or_else(|v| format!("Invalid value: {}", v.to_string_lossy())),
    }
}
