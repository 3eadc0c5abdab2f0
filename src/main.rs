//! Haven CLI
//!
//! Terminal client for the mental health portal:
//! - Sign in, register and sign out
//! - Journal moods and read analytics
//! - Chat with the support bot and request sessions
//! - Therapist dashboard: patients, bookings, sessions
//! - Export data and delete the account

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use haven::analytics::total_entries;
use haven::client::{ClientConfig, PortalClient};
use haven::config::{generate_default_config, Config};
use haven::models::{BookingFilter, BookingPatch, BookingStatus, Role, SessionFilter};
use haven::portal::{NoticeLevel, Portal, View};
use haven::token::FileTokenStore;
use haven::validation::{parse_booking_datetime, BookingForm, LoginForm, RegisterForm, SessionForm};

#[derive(Parser)]
#[command(name = "haven")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Mental health portal client")]
#[command(long_about = "Haven talks to the mental health portal API.\nJournal your mood, review trends, chat for support and book therapist sessions.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the usual locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Portal API URL, overrides the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and remember the token
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// patient or therapist
        #[arg(short, long, default_value = "patient")]
        role: String,
    },

    /// Forget the stored token
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Check the API is reachable
    Health,

    /// Record how you feel
    Mood {
        /// Journal text
        text: String,
        /// Mood slider value (1-10)
        #[arg(short, long)]
        value: Option<u8>,
    },

    /// List your mood entries
    History,

    /// 7/30-day averages and a daily chart
    Analytics {
        /// Days to chart (1-365)
        #[arg(short, long, default_value = "7")]
        range: u32,
    },

    /// Self-help suggestions
    Recommendations,

    /// Send a message to the support bot
    Chat {
        message: String,
    },

    /// Request a session with a therapist
    Book {
        /// Date and time, e.g. 2024-05-01T10:00
        #[arg(short, long)]
        at: String,
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// List patients (therapist)
    Patients,

    /// Show one patient (therapist)
    Patient {
        id: i64,
    },

    /// Book a session for a patient (therapist)
    Schedule {
        patient_id: i64,
        #[arg(short, long)]
        at: String,
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// List bookings (therapist)
    Bookings {
        #[arg(long)]
        patient: Option<i64>,
        #[arg(long)]
        status: Option<String>,
    },

    /// Reschedule, cancel or complete a booking (therapist)
    UpdateBooking {
        id: i64,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Record a session (therapist)
    RecordSession {
        #[arg(long)]
        patient: i64,
        #[arg(long)]
        booking: Option<i64>,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(long, default_value = "")]
        outcome: String,
    },

    /// List sessions (therapist)
    Sessions {
        #[arg(long)]
        patient: Option<i64>,
    },

    /// Export your data as CSV
    Export {
        /// Output directory for the server export
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
        /// Print the mood history CSV instead of downloading the full export
        #[arg(long)]
        history: bool,
    },

    /// Permanently delete your account
    DeleteAccount {
        #[arg(short, long)]
        password: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

type CliPortal = Portal<PortalClient, FileTokenStore>;

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("Cannot load config {}", path.display()))?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    Ok(config)
}

fn print_value<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print notices; true when any of them is an error
fn flush_notices(portal: &mut CliPortal) -> bool {
    let mut failed = false;
    for notice in portal.take_notices() {
        match notice.level {
            NoticeLevel::Error => {
                failed = true;
                eprintln!("Error: {}", notice.message);
            }
            NoticeLevel::Info => eprintln!("{}", notice.message),
            NoticeLevel::Success => println!("{}", notice.message),
        }
    }
    failed
}

fn require_view(portal: &CliPortal, view: View) -> bool {
    if portal.view() == view {
        return true;
    }
    match view {
        View::Therapist => eprintln!("This command is for therapist accounts."),
        _ => eprintln!("Please log in first: haven login --email <EMAIL> --password <PASSWORD>"),
    }
    false
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("Cannot write {}", path.display()))?;
                println!("Config written to {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let config = load_config(&cli)?;
    config.logging.init();

    let client = PortalClient::new(ClientConfig::from(&config.api))?;
    let tokens = FileTokenStore::new(&config.api.token_path);
    let mut portal = Portal::new(client, tokens);
    let json = cli.format == "json";

    match cli.command {
        Commands::Login { .. } | Commands::Register { .. } | Commands::Health => {}
        _ => {
            portal.restore().await;
        }
    }

    let ok = match cli.command {
        Commands::Login { email, password } => portal.login(LoginForm::new(email, password)).await,

        Commands::Register {
            name,
            email,
            password,
            role,
        } => {
            let role: Role = match role.parse() {
                Ok(role) => role,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            };
            portal
                .register(RegisterForm {
                    name,
                    email,
                    password,
                    role,
                })
                .await
        }

        Commands::Logout => {
            portal.logout();
            println!("Signed out");
            true
        }

        Commands::Whoami => match portal.user() {
            Some(user) if json => {
                print_value(user)?;
                true
            }
            Some(user) => {
                println!("{} <{}> ({})", user.name, user.email, user.role);
                true
            }
            None => require_view(&portal, View::Patient),
        },

        Commands::Health => {
            portal.restore().await;
            match portal.server_status() {
                Some(status) => {
                    println!("Portal API at {}: {}", config.api.base_url, status.status);
                    if let Some(message) = &status.message {
                        println!("  {}", message);
                    }
                    true
                }
                None => {
                    eprintln!("Cannot connect to the portal API at {}", config.api.base_url);
                    eprintln!();
                    eprintln!("Start a local sandbox with:");
                    eprintln!("  cargo run --bin haven-sandbox");
                    false
                }
            }
        }

        Commands::Mood { text, value } => {
            if !require_view(&portal, View::Patient) {
                std::process::exit(1);
            }
            portal.set_mood_draft(text);
            match portal.submit_mood(value).await {
                Some(outcome) => {
                    if json {
                        print_value(&outcome.entry)?;
                    } else if let Some(risk) = outcome.entry.risk {
                        println!("Risk: {}", risk.label());
                    }
                    if portal.chat_open() {
                        println!("Talking might help: haven chat \"<message>\"");
                    }
                    if portal.booking_open() {
                        println!("Consider booking a session: haven book --at <DATETIME>");
                    }
                    true
                }
                None => false,
            }
        }

        Commands::History => match portal.load_history().await {
            Some(moods) if json => {
                print_value(&moods)?;
                true
            }
            Some(moods) => {
                if moods.is_empty() {
                    println!("No mood entries yet.");
                }
                println!("{:<20} {:<6} {:<12} {}", "Date", "Value", "Risk", "Text");
                println!("{}", "-".repeat(60));
                for m in &moods {
                    println!(
                        "{:<20} {:<6} {:<12} {}",
                        m.date.format("%Y-%m-%d %H:%M"),
                        m.mood_value,
                        m.risk.map(|r| r.label()).unwrap_or("-"),
                        m.text.as_deref().unwrap_or("")
                    );
                }
                true
            }
            None => false,
        },

        Commands::Analytics { range } => match portal.load_analytics(range).await {
            Some((summary, points)) if json => {
                print_value(&serde_json::json!({"summary": summary, "chart": points}))?;
                true
            }
            Some((summary, points)) => {
                let fmt = |v: Option<f64>| v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".into());
                println!("7-day average:  {}", fmt(summary.avg_7_days));
                println!("30-day average: {}", fmt(summary.avg_30_days));
                println!();
                if total_entries(&points) == 0 {
                    println!("No entries in the last {} days.", range);
                } else {
                    for p in &points {
                        let bar = p.avg.map(|a| "#".repeat(a.round() as usize)).unwrap_or_default();
                        println!("{}  {:<10} H{} M{} L{}", p.date, bar, p.high, p.medium, p.low);
                    }
                }
                true
            }
            None => false,
        },

        Commands::Recommendations => match portal.load_recommendations().await {
            Some(items) if json => {
                print_value(&items)?;
                true
            }
            Some(items) => {
                for item in items {
                    println!("* {}", item.title);
                    println!("  {}", item.text);
                }
                true
            }
            None => false,
        },

        Commands::Chat { message } => {
            let reply = portal.send_chat(&message).await;
            for line in portal.transcript() {
                let who = match line.sender {
                    haven::models::ChatSender::User => "you",
                    haven::models::ChatSender::Bot => "bot",
                };
                println!("{}: {}", who, line.text);
            }
            if portal.booking_open() {
                println!("Consider booking a session: haven book --at <DATETIME>");
            }
            reply.is_some()
        }

        Commands::Book { at, notes } => match portal
            .request_booking(BookingForm::for_patient(at, notes))
            .await
        {
            Some(booking) if json => {
                print_value(&booking)?;
                true
            }
            Some(_) => true,
            None => false,
        },

        Commands::Patients => {
            if !require_view(&portal, View::Therapist) {
                std::process::exit(1);
            }
            match portal.load_patients().await {
                Some(patients) if json => {
                    print_value(patients)?;
                    true
                }
                Some(patients) => {
                    println!("{:<6} {:<20} {:<28} {:<8} {}", "ID", "Name", "Email", "Risk", "7d avg");
                    println!("{}", "-".repeat(72));
                    for p in patients {
                        println!(
                            "{:<6} {:<20} {:<28} {:<8} {}",
                            p.id,
                            p.name,
                            p.email,
                            p.latest_mood_risk.map(|r| r.as_str()).unwrap_or("-"),
                            p.avg_7_days.map(|a| format!("{:.2}", a)).unwrap_or_else(|| "-".into())
                        );
                    }
                    true
                }
                None => false,
            }
        }

        Commands::Patient { id } => match portal.open_patient(id).await {
            Some(detail) if json => {
                print_value(detail)?;
                true
            }
            Some(detail) => {
                println!("{} <{}>", detail.name, detail.email);
                println!(
                    "  {} mood entries, {} bookings, {} sessions",
                    detail.moods.len(),
                    detail.bookings.len(),
                    detail.sessions.len()
                );
                for m in detail.moods.iter().take(5) {
                    println!(
                        "  {}  {:<2} {}",
                        m.date.format("%Y-%m-%d"),
                        m.mood_value,
                        m.risk.map(|r| r.label()).unwrap_or("-")
                    );
                }
                true
            }
            None => false,
        },

        Commands::Schedule {
            patient_id,
            at,
            notes,
        } => portal
            .create_booking(BookingForm::for_therapist(patient_id, at, notes))
            .await
            .is_some(),

        Commands::Bookings { patient, status } => {
            let status = match status.map(|s| s.parse::<BookingStatus>()).transpose() {
                Ok(status) => status,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            };
            let filter = BookingFilter {
                patient_id: patient,
                therapist_id: None,
                status,
            };
            match portal.list_bookings(filter).await {
                Some(bookings) if json => {
                    print_value(bookings)?;
                    true
                }
                Some(bookings) => {
                    for b in bookings {
                        println!(
                            "#{:<5} {}  patient {:<5} {:<10} {}",
                            b.id,
                            b.datetime.format("%Y-%m-%d %H:%M"),
                            b.patient_id,
                            b.status,
                            b.notes.as_deref().unwrap_or("")
                        );
                    }
                    true
                }
                None => false,
            }
        }

        Commands::UpdateBooking {
            id,
            status,
            at,
            notes,
        } => {
            let patch = match build_patch(status, at, notes) {
                Ok(patch) => patch,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            };
            portal.update_booking(id, patch).await.is_some()
        }

        Commands::RecordSession {
            patient,
            booking,
            notes,
            outcome,
        } => portal
            .record_session(SessionForm {
                booking_id: booking,
                patient_id: Some(patient),
                therapist_id: None,
                notes,
                outcome,
            })
            .await
            .is_some(),

        Commands::Sessions { patient } => {
            let filter = SessionFilter {
                patient_id: patient,
                therapist_id: None,
            };
            match portal.list_sessions(filter).await {
                Some(sessions) if json => {
                    print_value(sessions)?;
                    true
                }
                Some(sessions) => {
                    for s in sessions {
                        println!(
                            "#{:<5} {}  patient {:<5} {}",
                            s.id,
                            s.session_at.format("%Y-%m-%d %H:%M"),
                            s.patient_id,
                            s.outcome.as_deref().unwrap_or("")
                        );
                    }
                    true
                }
                None => false,
            }
        }

        Commands::Export { dir, history } => {
            if history {
                match portal.history_csv().await {
                    Some(csv) => {
                        print!("{}", csv);
                        true
                    }
                    None => false,
                }
            } else {
                portal.export_csv(&dir).await.is_some()
            }
        }

        Commands::DeleteAccount { password } => portal.delete_account(&password).await,

        Commands::Config { .. } => true,
    };

    let failed = flush_notices(&mut portal);
    if !ok || failed {
        std::process::exit(1);
    }
    Ok(())
}

fn build_patch(
    status: Option<String>,
    at: Option<String>,
    notes: Option<String>,
) -> Result<BookingPatch, String> {
    let status = status.map(|s| s.parse::<BookingStatus>()).transpose()?;
    let datetime = at
        .map(|raw| parse_booking_datetime(&raw))
        .transpose()
        .map_err(|e| e.to_string())?;
    Ok(BookingPatch {
        datetime,
        status,
        notes,
    })
}
