//!
//! casevault CLI binary
//! --------------------
//! Interactive interpreter for the casevault session subsystem. Drives the
//! session manager against a local credential store and demonstrates the
//! role-based gating that protected commands go through: every guarded
//! command consults the session's capability flags and nothing else.

use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use casevault::identity::{NavIntent, Notifier, Router, SessionManager, SessionPhase};
use casevault::store::CredentialStore;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program}    # start interactive session shell\n\nEnvironment:\n  CASEVAULT_DB_FOLDER      store root folder (default: dbs/casevault)\n  CASEVAULT_AUTH_DELAY_MS  simulated auth latency in ms (default: 250)\n  RUST_LOG                 tracing filter (default: info)\n\nInteractive commands:\n  login <email> <password>             authenticate and open a session\n  register <name> <email> <password>   create an account, then login\n  logout                               close the session\n  whoami                               show the current principal\n  caps                                 show capability flags for the session\n  evidence list                        list evidence (requires view)\n  evidence add <title>                 add evidence (requires add)\n  folder create <name>                 create a folder (requires create-folder)\n  users                                list principals (requires manage-users)\n  help                                 show this help\n  quit | exit                          leave the shell\n\nBootstrap accounts (shared password \"password\"):\n  manager@example.com    staff@example.com    user@example.com"
    );
}

// Print outcomes the way the UI would toast them.
struct ConsoleNotifier;
impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        println!("[ok] {message}");
    }
    fn error(&self, message: &str) {
        println!("[error] {message}");
    }
}

// Navigation intents rendered as prompts instead of page loads.
struct ConsoleRouter;
impl Router for ConsoleRouter {
    fn navigate(&self, to: NavIntent) {
        match to {
            NavIntent::ProtectedArea => println!("-> dashboard"),
            NavIntent::Login => println!("-> login"),
            NavIntent::AnonymousHome => println!("-> home"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let program = env::args().next().unwrap_or_else(|| "casevault_cli".into());
    if env::args().any(|a| a == "-h" || a == "--help") {
        print_usage(&program);
        return Ok(());
    }

    let db_folder = env::var("CASEVAULT_DB_FOLDER").unwrap_or_else(|_| "dbs/casevault".to_string());
    let delay_ms: u64 = env::var("CASEVAULT_AUTH_DELAY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(250);
    info!(
        target: "casevault",
        "casevault starting: db_root='{}', auth_delay_ms={}",
        db_folder, delay_ms
    );

    let store = CredentialStore::new(&db_folder)?;
    let manager = SessionManager::with_collaborators(
        store.clone(),
        Arc::new(ConsoleNotifier),
        Arc::new(ConsoleRouter),
    )
    .with_auth_delay(Duration::from_millis(delay_ms));
    manager.initialize();

    if let Some(p) = manager.snapshot().principal() {
        println!("restored session for {} ({:?})", p.email, p.role);
    }
    println!("casevault shell. Type 'help' for commands.");

    // Demo evidence scaffolding; the real screens live outside this core.
    let mut evidence: Vec<String> = vec![
        "Incident report 2024-117".to_string(),
        "Chain-of-custody form B".to_string(),
    ];

    let stdin = io::stdin();
    loop {
        print!("casevault> ");
        io::stdout().flush().ok();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => break,
            ["help"] => print_usage(&program),
            ["login", email, password] => {
                // Form-boundary validation; the core never sees malformed input
                if !email.contains('@') {
                    println!("[error] Please enter a valid email address");
                } else {
                    manager.login(email, password).await;
                }
            }
            ["register", name, email, password] => {
                if !email.contains('@') {
                    println!("[error] Please enter a valid email address");
                } else {
                    manager.register(name, email, password).await;
                }
            }
            ["logout"] => manager.logout(),
            ["whoami"] => match manager.snapshot().phase {
                SessionPhase::Authenticated(p) => {
                    println!("{} <{}> role={:?}", p.name, p.email, p.role)
                }
                _ => println!("not signed in"),
            },
            ["caps"] => {
                let caps = manager.current_capabilities();
                println!(
                    "view_evidence={} add_evidence={} create_folder={} manage_users={}",
                    caps.can_view_evidence,
                    caps.can_add_evidence,
                    caps.can_create_folder,
                    caps.can_manage_users
                );
            }
            ["evidence", "list"] => {
                if !manager.snapshot().is_authenticated() {
                    println!("-> login (sign in required)");
                } else if manager.current_capabilities().can_view_evidence {
                    for (i, item) in evidence.iter().enumerate() {
                        println!("{:>3}  {}", i + 1, item);
                    }
                } else {
                    println!("[error] your role cannot view evidence");
                }
            }
            ["evidence", "add", rest @ ..] if !rest.is_empty() => {
                if !manager.snapshot().is_authenticated() {
                    println!("-> login (sign in required)");
                } else if manager.current_capabilities().can_add_evidence {
                    let title = rest.join(" ");
                    println!("[ok] evidence added: {title}");
                    evidence.push(title);
                } else {
                    println!("[error] your role cannot add evidence");
                }
            }
            ["folder", "create", rest @ ..] if !rest.is_empty() => {
                if !manager.snapshot().is_authenticated() {
                    println!("-> login (sign in required)");
                } else if manager.current_capabilities().can_create_folder {
                    println!("[ok] folder created: {}", rest.join(" "));
                } else {
                    println!("[error] your role cannot create folders");
                }
            }
            ["users"] => {
                if !manager.snapshot().is_authenticated() {
                    println!("-> login (sign in required)");
                } else if manager.current_capabilities().can_manage_users {
                    for rec in casevault::store::bootstrap_principals() {
                        println!("{:<28} {:<8} (bootstrap)", rec.email, format!("{:?}", rec.role));
                    }
                    for rec in store.registered() {
                        println!("{:<28} {:<8}", rec.email, format!("{:?}", rec.role));
                    }
                } else {
                    println!("[error] your role cannot manage users");
                }
            }
            _ => println!("unrecognized command; type 'help'"),
        }
    }
    Ok(())
}
