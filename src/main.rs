//! Clinic Portal CLI
//!
//! Usage:
//!   clinic-portal <admin|doctor> <command> [args]
//!   clinic-portal version

use clinic_portal::bus::{self, Level, PortalEvent};
use clinic_portal::client::ResourceClient;
use clinic_portal::config;
use clinic_portal::models::Upload;
use clinic_portal::session::{FileTokenStorage, Sessions};
use clinic_portal::views::{
    AddDoctorForm, AppointmentListView, DashboardView, DoctorListView, NavView, ProfileEditor,
    ProfileView, Screen, UserListView,
};
use clinic_portal::{PortalResult, Role, RolePortal};

use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::Path;
use std::process;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "version" | "--version" | "-V" => {
            println!(
                "clinic-portal {} ({})",
                env!("PORTAL_VERSION"),
                env!("PORTAL_GIT_SHA")
            );
            return Ok(());
        }
        "help" | "--help" | "-h" => {
            print_usage();
            return Ok(());
        }
        _ => {}
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinic_portal=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let role: Role = args[1].parse().map_err(|e: String| anyhow!(e))?;
    let Some(command) = args.get(2).map(String::as_str) else {
        eprintln!("Error: Missing command");
        print_usage();
        process::exit(1);
    };
    let rest = &args[3..];

    let config = config::load_config()?;
    let data_dir = config::get_data_dir();
    let storage = Arc::new(FileTokenStorage::new(&data_dir));
    tracing::debug!("Token storage at {}", storage.path().display());
    let sessions = Sessions::open(storage);

    // Session commands never reach the backend
    match command {
        "login" => {
            let token = rest.first().context("login requires a token")?;
            sessions.get(role).set_token(token);
            println!("Logged in as {}", role.label());
            return Ok(());
        }
        "logout" => {
            let cleared = sessions.logout_all();
            if cleared.is_empty() {
                println!("No active session");
            }
            for role in cleared {
                println!("Logged out {}", role.label());
            }
            return Ok(());
        }
        _ => {}
    }

    config.validate()?;
    let client = ResourceClient::new(&config.backend_url, config.request_timeout())?;
    let bus = bus::create_bus();
    let mut events = bus.subscribe();
    let portal = RolePortal::new(sessions.get(role).clone(), client, bus)
        .with_auto_logout(config.auto_logout_on_auth_failure);

    tracing::debug!(role = %role, backend = %config.backend_url, "Portal ready");

    let outcome = run(&portal, &config, command, rest).await;
    print_notifications(&mut events);

    match outcome {
        Ok(()) => Ok(()),
        Err(Outcome::Usage(message)) => {
            eprintln!("Error: {}", message);
            print_usage();
            process::exit(1);
        }
        // Already shown as a notification
        Err(Outcome::Failed) => process::exit(1),
    }
}

enum Outcome {
    Usage(String),
    Failed,
}

impl From<anyhow::Error> for Outcome {
    fn from(err: anyhow::Error) -> Self {
        Outcome::Usage(format!("{:#}", err))
    }
}

fn failed<T>(result: PortalResult<T>) -> Result<T, Outcome> {
    result.map_err(|_| Outcome::Failed)
}

async fn run(
    portal: &RolePortal,
    config: &config::Config,
    command: &str,
    rest: &[String],
) -> Result<(), Outcome> {
    let role = portal.role();
    let currency = config.currency.as_str();
    let today = chrono::Local::now().date_naive();

    match command {
        "menu" => {
            print!("{}", NavView::build(role, ""));
        }
        "dashboard" => {
            mount(portal, Screen::Dashboard).await?;
            if let Some(summary) = portal.cache().dashboard().await {
                print!("{}", DashboardView::build(role, &summary, currency));
            }
        }
        "appointments" => {
            mount(portal, Screen::Appointments).await?;
            if let Some(list) = portal.cache().appointments().await {
                print!(
                    "{}",
                    AppointmentListView::build(role, &list, currency, today)
                );
            }
        }
        "cancel" => {
            let id = positional(rest, "appointment id")?;
            failed(portal.cancel_appointment(id).await)?;
        }
        "accept" | "complete" => {
            let id = positional(rest, "appointment id")?;
            let scan = match flag(rest, "--scan") {
                Some(path) => Some(read_upload(path).await?),
                None => None,
            };
            if command == "accept" {
                failed(portal.accept_appointment(id, scan).await)?;
            } else {
                failed(portal.complete_appointment(id, scan).await)?;
            }
        }
        "profile" => {
            mount(portal, Screen::Profile).await?;
            if let Some(profile) = portal.cache().profile().await {
                print!("{}", ProfileView::build(&profile, currency));
            }
        }
        "update-profile" => {
            let profile = failed(portal.load_profile().await)?;
            let mut editor = ProfileEditor::new(Some(&profile));
            editor.begin_edit();
            let draft = editor.draft_mut();
            if let Some(fees) = flag(rest, "--fees") {
                draft.fees = fees
                    .parse()
                    .map_err(|_| Outcome::Usage(format!("invalid fees: {}", fees)))?;
            }
            if let Some(about) = flag(rest, "--about") {
                draft.about = about.to_string();
            }
            if let Some(line1) = flag(rest, "--line1") {
                draft.address.line1 = line1.to_string();
            }
            if let Some(line2) = flag(rest, "--line2") {
                draft.address.line2 = line2.to_string();
            }
            if let Some(available) = flag(rest, "--available") {
                draft.available = available
                    .parse()
                    .map_err(|_| Outcome::Usage(format!("invalid --available: {}", available)))?;
            }
            failed(portal.save_profile(&mut editor).await)?;
        }
        "doctors" => {
            mount(portal, Screen::DoctorsList).await?;
            if let Some(doctors) = portal.cache().doctors().await {
                print!("{}", DoctorListView::build(&doctors, currency));
            }
        }
        "toggle" => {
            let id = positional(rest, "doctor id")?;
            failed(portal.toggle_availability(id).await)?;
        }
        "add-doctor" => {
            let mut form = AddDoctorForm::new();
            if let Some(path) = flag(rest, "--image") {
                form.image = Some(read_upload(path).await?);
            }
            let fields: [(&str, &mut String); 10] = [
                ("--name", &mut form.name),
                ("--email", &mut form.email),
                ("--password", &mut form.password),
                ("--experience", &mut form.experience),
                ("--fees", &mut form.fees),
                ("--about", &mut form.about),
                ("--speciality", &mut form.speciality),
                ("--degree", &mut form.degree),
                ("--line1", &mut form.address1),
                ("--line2", &mut form.address2),
            ];
            for (name, field) in fields {
                if let Some(value) = flag(rest, name) {
                    *field = value.to_string();
                }
            }
            failed(portal.add_doctor(&mut form).await)?;
        }
        "users" => {
            mount(portal, Screen::UsersList).await?;
            if let Some(users) = portal.cache().users().await {
                print!("{}", UserListView::build(&users));
            }
        }
        other => {
            return Err(Outcome::Usage(format!("Unknown command: {}", other)));
        }
    }
    Ok(())
}

/// Load a screen; a missing session is reported the way the portal reports it
async fn mount(portal: &RolePortal, screen: Screen) -> Result<(), Outcome> {
    let loaded = failed(portal.mount(screen).await)?;
    if !loaded {
        eprintln!("[error] {}", clinic_portal::portal::LOGIN_REQUIRED);
        return Err(Outcome::Failed);
    }
    Ok(())
}

fn positional<'a>(rest: &'a [String], what: &str) -> Result<&'a str, Outcome> {
    rest.first()
        .filter(|a| !a.starts_with("--"))
        .map(String::as_str)
        .ok_or_else(|| Outcome::Usage(format!("missing {}", what)))
}

fn flag<'a>(rest: &'a [String], name: &str) -> Option<&'a str> {
    rest.iter()
        .position(|a| a == name)
        .and_then(|i| rest.get(i + 1))
        .map(String::as_str)
}

async fn read_upload(path: &str) -> Result<Upload, Outcome> {
    let upload = Upload::from_path(Path::new(path))
        .await
        .with_context(|| format!("reading {}", path))?;
    if upload.bytes.is_empty() {
        return Err(anyhow::Error::msg(format!("{} is empty", path)).into());
    }
    Ok(upload)
}

fn print_notifications(events: &mut broadcast::Receiver<PortalEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            PortalEvent::Notification { level, message, .. } => match level {
                Level::Success => println!("[ok] {}", message),
                Level::Error => eprintln!("[error] {}", message),
            },
            PortalEvent::SessionChanged {
                role,
                authenticated: false,
            } => {
                eprintln!("Session for {} was cleared; log in again", role.label());
            }
            _ => {}
        }
    }
}

fn print_usage() {
    eprintln!("Clinic Portal - admin and doctor access to the booking backend");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  clinic-portal <admin|doctor> login <token>");
    eprintln!("  clinic-portal <admin|doctor> logout");
    eprintln!("  clinic-portal <admin|doctor> menu | dashboard | appointments");
    eprintln!("  clinic-portal <admin|doctor> cancel <appointment-id>");
    eprintln!("  clinic-portal doctor accept <appointment-id> [--scan <file>]");
    eprintln!("  clinic-portal doctor complete <appointment-id> [--scan <file>]");
    eprintln!("  clinic-portal doctor profile");
    eprintln!("  clinic-portal doctor update-profile [--fees N] [--about S] [--line1 S] [--line2 S] [--available true|false]");
    eprintln!("  clinic-portal admin doctors | users");
    eprintln!("  clinic-portal admin toggle <doctor-id>");
    eprintln!("  clinic-portal admin add-doctor --image <file> --name .. --email .. --password .. [--experience ..] [--fees ..] [--about ..] [--speciality ..] [--degree ..] [--line1 ..] [--line2 ..]");
    eprintln!("  clinic-portal version");
    eprintln!();
    eprintln!("Configuration: PORTAL_BACKEND_URL (or backend_url in config.toml)");
}
