use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use client_core::{load_settings, prepare_base_url, Confirmation, DashboardClient, HistoryView};
use shared::{
    domain::{AttendanceStatus, EmployeeId},
    protocol::RegisterEmployee,
};

#[derive(Parser, Debug)]
struct Cli {
    /// Store endpoint; overrides dashboard.toml and HRM_API_URL.
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Roster with today's attendance status per employee.
    Overview {
        #[arg(long)]
        json: bool,
    },
    /// Register a new employee.
    Register {
        emp_id: String,
        name: String,
        email: String,
        department: String,
    },
    /// Delete an employee. Destructive; refuses to run without --yes.
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
    /// Mark attendance for one employee and show the updated history.
    Mark {
        id: i64,
        date: NaiveDate,
        status: String,
    },
    /// Show an employee's attendance history, newest first.
    History { id: i64 },
}

fn parse_status(raw: &str) -> Result<AttendanceStatus> {
    match raw.to_ascii_lowercase().as_str() {
        "present" => Ok(AttendanceStatus::Present),
        "absent" => Ok(AttendanceStatus::Absent),
        _ => bail!("status must be 'present' or 'absent', got '{raw}'"),
    }
}

fn print_history(view: &HistoryView) {
    match view {
        HistoryView::Loaded { records, .. } if records.is_empty() => {
            println!("No attendance records found for this employee.");
        }
        HistoryView::Loaded { records, .. } => {
            for record in records {
                println!("{}  {:?}", record.date, record.status);
            }
        }
        HistoryView::Errored {
            message,
            last_known,
            ..
        } => {
            eprintln!("error: {message}");
            for record in last_known {
                println!("{}  {:?}", record.date, record.status);
            }
        }
        HistoryView::Closed | HistoryView::Loading { .. } => {}
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }
    settings.api_base_url = prepare_base_url(&settings.api_base_url)?;
    let client = DashboardClient::from_settings(&settings);

    match cli.command {
        Command::Overview { json } => {
            client.refresh().await?;
            let roster = client.roster().await;
            let daily = client.daily_status().await;
            if json {
                let rows: Vec<serde_json::Value> = roster
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "id": e.id.0,
                            "emp_id": e.emp_id,
                            "name": e.name,
                            "email": e.email,
                            "department": e.department,
                            "today": daily.get(&e.id).map(|s| format!("{s:?}")),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }
            if roster.is_empty() {
                println!("No employees registered yet.");
                return Ok(());
            }
            for employee in &roster {
                let today = match daily.get(&employee.id) {
                    Some(status) => format!("{status:?}"),
                    None => "-".to_string(),
                };
                println!(
                    "#{:<4} {:<10} {:<20} {:<26} {:<14} {today}",
                    employee.id.0,
                    employee.emp_id,
                    employee.name,
                    employee.email,
                    employee.department,
                );
            }
        }
        Command::Register {
            emp_id,
            name,
            email,
            department,
        } => {
            client
                .register_employee(RegisterEmployee {
                    emp_id: emp_id.clone(),
                    name,
                    email,
                    department,
                })
                .await?;
            println!(
                "Registered {emp_id}; roster now lists {} employees",
                client.roster().await.len()
            );
        }
        Command::Delete { id, yes } => {
            let confirmation = if yes {
                Confirmation::Confirmed
            } else {
                Confirmation::Declined
            };
            if client.delete_employee(EmployeeId(id), confirmation).await? {
                println!("Deleted employee {id}");
            } else {
                println!("Refusing to delete employee {id} without --yes");
            }
        }
        Command::Mark { id, date, status } => {
            let status = parse_status(&status)?;
            let employee = EmployeeId(id);
            client.open_history(employee).await?;
            client.mark_attendance(employee, date, status).await?;
            print_history(&client.history().await);
        }
        Command::History { id } => {
            client.open_history(EmployeeId(id)).await?;
            print_history(&client.history().await);
        }
    }

    Ok(())
}
