//! Login, logout and store-context commands.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use chrono::Utc;
use storedesk_core::auth::CredentialStore;
use storedesk_core::gate::{GateDecision, RequestGate};
use storedesk_core::models::PageRequest;
use storedesk_core::{Session, StoreContextBinder};
use tracing::{info, warn};

use super::{explain, load_config, open_console, open_repository};

/// Stores fetched when looking up the snapshot for `act-as`
const STORE_LOOKUP_LIMIT: u32 = 100;

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

pub async fn login(email: Option<String>, remember: bool) -> Result<()> {
    let mut config = load_config()?;
    let email = match email.or_else(|| config.last_email.clone()) {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    if email.is_empty() {
        anyhow::bail!("An email is required");
    }

    let remembered = CredentialStore::get_password(&email).ok();
    let password = match remembered {
        Some(ref password) => password.clone(),
        None => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };

    let console = open_console(&config)?;
    let outcome = match console.login(&email, &password).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if remembered.is_some() {
                warn!(email = %email, "Remembered password rejected");
            }
            return Err(explain(e));
        }
    };

    if remember && remembered.is_none() {
        CredentialStore::store(&email, &password)?;
    }
    config.last_email = Some(email.clone());
    config.save()?;

    info!(email = %email, role = %outcome.session.role, "Logged in");
    println!(
        "Logged in as {} ({}), session valid for {} minutes",
        email,
        outcome.session.role,
        outcome.session.minutes_until_expiry(Utc::now())
    );
    if let Some(store) = outcome.store {
        println!(
            "Acting for store {}",
            store.name().unwrap_or(store.store_id.as_str())
        );
    }
    println!("Landing page: {}", outcome.landing);
    Ok(())
}

pub fn logout() -> Result<()> {
    let config = load_config()?;
    let repo = open_repository(&config)?;
    storedesk_core::auth::teardown(repo.as_ref())?;
    println!("Logged out");
    Ok(())
}

pub fn status() -> Result<()> {
    let config = load_config()?;
    let repo = open_repository(&config)?;

    let Some(session) = Session::load(repo.as_ref(), Utc::now()) else {
        println!("Not logged in");
        return Ok(());
    };
    println!(
        "Role: {}\nExpires: {} ({} minutes left)",
        session.role,
        session.expires_at.to_rfc3339(),
        session.minutes_until_expiry(Utc::now())
    );
    if let Some(name) = session.user.get("name").and_then(|n| n.as_str()) {
        println!("User: {}", name);
    }

    let binder = StoreContextBinder::new(repo);
    match binder.current_store_context() {
        Some(store) => println!(
            "Store: {} ({})",
            store.name().unwrap_or("unnamed"),
            store.store_id
        ),
        None => println!("Store: none selected"),
    }
    Ok(())
}

pub async fn act_as(store_id: &str) -> Result<()> {
    let config = load_config()?;
    let console = open_console(&config)?;

    let page = PageRequest::new(1, STORE_LOOKUP_LIMIT);
    let snapshot = match console.stores(page).await {
        Ok(stores) => stores
            .stores
            .iter()
            .find(|s| s.id == store_id)
            .map(|s| s.snapshot()),
        Err(e) if e.redirect().is_some() => return Err(explain(e)),
        Err(e) => {
            warn!(error = %e, "Could not look up store details");
            None
        }
    };
    if snapshot.is_none() {
        warn!(store_id = %store_id, "Store not found in listing, acting without details");
    }

    let store = console.act_as_store(store_id, snapshot).map_err(explain)?;
    println!(
        "Now acting for store {}",
        store.name().unwrap_or(store.store_id.as_str())
    );
    Ok(())
}

pub fn leave_store() -> Result<()> {
    let config = load_config()?;
    let console = open_console(&config)?;
    console.leave_store().map_err(explain)?;
    println!("No store selected");
    Ok(())
}

pub fn check(path: &str) -> Result<()> {
    let config = load_config()?;
    let repo = open_repository(&config)?;

    let decision = RequestGate::default().evaluate(path, repo.as_ref(), Utc::now());
    match decision {
        GateDecision::Unprotected => println!("{}: not protected", path),
        GateDecision::Allow { role, area } => {
            println!("{}: allowed ({} in {} area)", path, role, area)
        }
        GateDecision::RedirectLogin => {
            println!("{}: session invalid, redirect to / (session cleared)", path)
        }
        GateDecision::RedirectUnauthorized { role, area } => println!(
            "{}: {} may not enter the {} area, redirect to /unauthorized",
            path,
            role.map(|r| r.to_string()).unwrap_or_else(|| "unknown role".into()),
            area
        ),
    }
    Ok(())
}

pub fn forget(email: Option<String>) -> Result<()> {
    let config = load_config()?;
    let email = email
        .or(config.last_email)
        .ok_or_else(|| anyhow::anyhow!("No email given and none remembered"))?;

    if !CredentialStore::has_credentials(&email) {
        println!("No password remembered for {}", email);
        return Ok(());
    }
    CredentialStore::delete(&email)?;
    println!("Forgot password for {}", email);
    Ok(())
}
