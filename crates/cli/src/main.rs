//! Coldline CLI - Command-line client for the Coldline server

mod output;
mod rpc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use coldline_core::application::session_sync::SaveOutcome;
use coldline_core::application::{
    ImportSummary, LeadPage, ListStats, NavigationResult, PreparedContact, SyncOutcome, Templates,
};
use coldline_core::domain::{CallStatusFilter, LeadFilter, LeadList, Timezone};
use colored::Colorize;
use rpc::RpcClient;
use serde_json::{json, Value};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9537";

#[derive(Parser)]
#[command(name = "coldline")]
#[command(about = "Coldline lead-calling CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "COLDLINE_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// User the lists and session belong to
    #[arg(long, env = "COLDLINE_USER", default_value = "local")]
    user: String,

    /// Device name for session sync
    #[arg(long, env = "COLDLINE_DEVICE", default_value = "cli")]
    device: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a CSV file as a new lead list
    Import {
        /// CSV file
        file: std::path::PathBuf,

        /// List name (default: file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show lead lists
    Lists,

    /// Delete a lead list and its leads
    DeleteList { list_id: String },

    /// Page through the leads of a list
    Leads {
        list_id: String,

        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long, default_value = "0")]
        offset: usize,

        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },

    /// Call statistics of a list
    Stats { list_id: String },

    /// Clear call counts of a list or a single lead
    ResetCalls {
        #[arg(long, conflicts_with = "lead", required_unless_present = "lead")]
        list: Option<String>,

        #[arg(long)]
        lead: Option<String>,
    },

    /// Select the list to work through
    Use { list_id: String },

    /// Move through the selected list
    Go {
        #[arg(value_enum)]
        direction: Move,

        /// Target position (1-based) for `jump`
        position: Option<usize>,
    },

    /// Change filter, shuffle and auto-call settings
    Settings {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long)]
        shuffle: Option<bool>,

        #[arg(long)]
        auto_call: Option<bool>,

        /// Seconds between auto-calls
        #[arg(long)]
        delay: Option<u32>,
    },

    /// Show the session, resolving sync conflicts
    Session {
        /// Push this device's cached copy over a newer remote one
        #[arg(long, conflicts_with = "clear_local")]
        keep_local: bool,

        /// Drop this device's cached copy
        #[arg(long)]
        clear_local: bool,
    },

    /// Call a lead (prints the tel: URI and records the call)
    Call {
        lead_id: String,

        /// 0 = primary phone, 1.. = additional phones
        #[arg(long, default_value = "0")]
        phone_index: usize,
    },

    /// Prepare an email from the template (prints the mailto: URI)
    Email {
        lead_id: String,

        #[command(flatten)]
        sender: SenderArgs,
    },

    /// Prepare a text message from the template (prints the sms: URI)
    Sms {
        lead_id: String,

        #[arg(long, default_value = "0")]
        phone_index: usize,

        #[command(flatten)]
        sender: SenderArgs,
    },

    /// Show or edit templates
    Templates {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Show system status
    Status,

    /// Run maintenance operations
    Maintenance {
        /// Force VACUUM even if not needed
        #[arg(long)]
        force_vacuum: bool,
    },
}

#[derive(Subcommand)]
enum TemplateAction {
    /// Print both templates
    Show,
    /// Set the email template
    Email {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        body: String,
    },
    /// Set the text message template
    Text {
        #[arg(long)]
        message: String,
    },
    /// Restore the default templates
    Reset,
    /// Render a template against a lead
    Preview {
        lead_id: String,
        #[arg(long, value_enum, default_value = "email")]
        channel: PreviewChannel,
        #[command(flatten)]
        sender: SenderArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Move {
    Current,
    First,
    Next,
    Prev,
    Last,
    Jump,
}

#[derive(Clone, Copy, ValueEnum)]
enum PreviewChannel {
    Email,
    Sms,
}

#[derive(clap::Args, Default)]
struct FilterArgs {
    /// Timezones to include (comma separated, e.g. eastern,central)
    #[arg(long, value_delimiter = ',')]
    tz: Vec<String>,

    /// all | called | not-called
    #[arg(long)]
    status: Option<String>,
}

impl FilterArgs {
    fn is_set(&self) -> bool {
        !self.tz.is_empty() || self.status.is_some()
    }

    fn to_filter(&self) -> Result<LeadFilter> {
        let timezones = self
            .tz
            .iter()
            .map(|t| t.parse::<Timezone>())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let call_status = match &self.status {
            Some(s) => s.parse::<CallStatusFilter>()?,
            None => CallStatusFilter::All,
        };
        Ok(LeadFilter {
            timezones,
            call_status,
        })
    }
}

#[derive(clap::Args)]
struct SenderArgs {
    /// Your name ({my_name} in templates)
    #[arg(long, env = "COLDLINE_SENDER_NAME")]
    sender_name: Option<String>,

    /// Your company ({my_company} in templates)
    #[arg(long, env = "COLDLINE_SENDER_COMPANY")]
    sender_company: Option<String>,
}

impl SenderArgs {
    fn to_json(&self) -> Value {
        json!({
            "name": self.sender_name,
            "company": self.sender_company,
            "utc_offset_minutes": chrono::Local::now().offset().local_minus_utc() / 60,
        })
    }
}

fn direction_param(direction: Move, position: Option<usize>) -> Result<Value> {
    Ok(match direction {
        Move::Current => json!("CURRENT"),
        Move::First => json!("FIRST"),
        Move::Next => json!("NEXT"),
        Move::Prev => json!("PREVIOUS"),
        Move::Last => json!("LAST"),
        Move::Jump => {
            let position = position
                .filter(|p| *p >= 1)
                .context("jump needs a 1-based position")?;
            json!({ "JUMP": position - 1 })
        }
    })
}

fn mb(bytes: &Value) -> f64 {
    bytes.as_i64().unwrap_or(0) as f64 / (1024.0 * 1024.0)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = RpcClient::new(&cli.rpc_url);
    let (user, device) = (cli.user.as_str(), cli.device.as_str());

    match cli.command {
        Commands::Import { file, name } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "import.csv".to_string());

            let params = json!({
                "user_id": user,
                "name": name,
                "file_name": file_name,
                "content": content,
            });
            let summary: ImportSummary = client.call("lists.import.v1", params).await?;

            println!(
                "{}",
                format!("✓ Imported {} leads into '{}'", summary.imported, summary.name)
                    .green()
                    .bold()
            );
            println!("  {} {}", "List ID:".bold(), summary.list_id);
            if !summary.header_detected {
                println!("  {} no header row, columns read positionally", "•".bold());
            }
            if !summary.skipped.is_empty() {
                println!(
                    "{}",
                    format!("  {} rows skipped:", summary.skipped.len()).yellow()
                );
                for row in summary.skipped.iter().take(20) {
                    println!("    line {}: {}", row.line, row.reason);
                }
            }
        }

        Commands::Lists => {
            let result: Value = client
                .call("lists.list.v1", json!({ "user_id": user }))
                .await?;
            let lists: Vec<LeadList> = serde_json::from_value(result["lists"].clone())?;
            if lists.is_empty() {
                println!("{}", "No lists yet. Import one with `coldline import`.".yellow());
            } else {
                println!("{}", output::list_table(&lists));
            }
        }

        Commands::DeleteList { list_id } => {
            let _: Value = client
                .call(
                    "lists.delete.v1",
                    json!({ "user_id": user, "list_id": list_id }),
                )
                .await?;
            println!("{}", format!("✓ List {} deleted", list_id).green().bold());
        }

        Commands::Leads {
            list_id,
            filter,
            offset,
            limit,
        } => {
            let params = json!({
                "user_id": user,
                "list_id": list_id,
                "filter": filter.to_filter()?,
                "offset": offset,
                "limit": limit,
            });
            let page: LeadPage = client.call("leads.page.v1", params).await?;

            println!("{}", output::lead_table(&page.items));
            println!(
                "  showing {}-{} of {} matching ({} total)",
                (page.offset + 1).min(page.matching),
                (page.offset + page.items.len()).min(page.matching),
                page.matching,
                page.total
            );
        }

        Commands::Stats { list_id } => {
            let stats: ListStats = client
                .call("leads.stats.v1", json!({ "user_id": user, "list_id": list_id }))
                .await?;
            println!("{}", "List Statistics".cyan().bold());
            println!("  {} {}", "Leads:".bold(), stats.total);
            println!("  {} {}", "Called:".bold(), stats.called);
            println!("  {} {}", "Not called:".bold(), stats.not_called);
            println!("  {} {}", "Total calls:".bold(), stats.total_calls);
            for tz in Timezone::ALL {
                let count = stats.by_timezone.get(&tz).copied().unwrap_or(0);
                println!("    {:<10} {}", tz.to_string(), count);
            }
        }

        Commands::ResetCalls { list, lead } => {
            let result: Value = client
                .call(
                    "leads.reset.v1",
                    json!({ "user_id": user, "list_id": list, "lead_id": lead }),
                )
                .await?;
            println!(
                "{}",
                format!("✓ {} lead(s) reset", result["reset"]).green().bold()
            );
        }

        Commands::Use { list_id } => {
            let result: NavigationResult = client
                .call(
                    "session.select_list.v1",
                    json!({ "user_id": user, "device_id": device, "list_id": list_id }),
                )
                .await?;
            output::print_navigation(&result);
        }

        Commands::Go {
            direction,
            position,
        } => {
            let params = json!({
                "user_id": user,
                "device_id": device,
                "direction": direction_param(direction, position)?,
            });
            let result: NavigationResult = client.call("session.navigate.v1", params).await?;
            output::print_navigation(&result);
        }

        Commands::Settings {
            filter,
            shuffle,
            auto_call,
            delay,
        } => {
            let filter = if filter.is_set() {
                Some(filter.to_filter()?)
            } else {
                None
            };
            let params = json!({
                "user_id": user,
                "device_id": device,
                "filter": filter,
                "shuffle": shuffle,
                "auto_call": auto_call,
                "call_delay_secs": delay,
            });
            let result: NavigationResult = client.call("session.settings.v1", params).await?;
            output::print_navigation(&result);
        }

        Commands::Session {
            keep_local,
            clear_local,
        } => {
            let params = json!({ "user_id": user, "device_id": device });
            if keep_local {
                let saved: SaveOutcome = client.call("session.keep_local.v1", params).await?;
                println!("{}", "✓ Local session restored".green().bold());
                if !saved.remote_synced {
                    println!("{}", "! Remote copy could not be updated".yellow());
                }
            } else if clear_local {
                let result: Value = client.call("session.clear_local.v1", params).await?;
                if result["cleared"].as_bool().unwrap_or(false) {
                    println!("{}", "✓ Local session cleared".green().bold());
                } else {
                    println!("{}", "No local session cached".yellow());
                }
            } else {
                let outcome: SyncOutcome = client.call("session.load.v1", params).await?;
                output::print_session(&outcome);
            }
        }

        Commands::Call {
            lead_id,
            phone_index,
        } => {
            let params = json!({
                "user_id": user,
                "lead_id": lead_id,
                "channel": "CALL",
                "phone_index": phone_index,
            });
            let prepared: PreparedContact = client.call("contact.prepare.v1", params).await?;
            println!("{}", prepared.uri);
            println!(
                "{}",
                format!(
                    "✓ Call #{} recorded for {}",
                    prepared.lead.call_count, prepared.lead.name
                )
                .green()
            );
        }

        Commands::Email { lead_id, sender } => {
            let params = json!({
                "user_id": user,
                "lead_id": lead_id,
                "channel": "EMAIL",
                "sender": sender.to_json(),
            });
            let prepared: PreparedContact = client.call("contact.prepare.v1", params).await?;
            println!("{}", prepared.uri);
        }

        Commands::Sms {
            lead_id,
            phone_index,
            sender,
        } => {
            let params = json!({
                "user_id": user,
                "lead_id": lead_id,
                "channel": "SMS",
                "phone_index": phone_index,
                "sender": sender.to_json(),
            });
            let prepared: PreparedContact = client.call("contact.prepare.v1", params).await?;
            println!("{}", prepared.uri);
        }

        Commands::Templates { action } => match action {
            TemplateAction::Show => {
                let templates: Templates = client
                    .call("templates.get.v1", json!({ "user_id": user }))
                    .await?;
                println!("{}", "Email".cyan().bold());
                println!("  {} {}", "Subject:".bold(), templates.email.subject);
                println!("{}", templates.email.body);
                println!();
                println!("{}", "Text".cyan().bold());
                println!("{}", templates.text.message);
            }
            TemplateAction::Email { subject, body } => {
                let params = json!({
                    "user_id": user,
                    "email": { "subject": subject, "body": body },
                });
                save_templates(&client, params).await?;
            }
            TemplateAction::Text { message } => {
                let params = json!({ "user_id": user, "text": { "message": message } });
                save_templates(&client, params).await?;
            }
            TemplateAction::Reset => {
                let _: Templates = client
                    .call("templates.reset.v1", json!({ "user_id": user }))
                    .await?;
                println!("{}", "✓ Templates reset to defaults".green().bold());
            }
            TemplateAction::Preview {
                lead_id,
                channel,
                sender,
            } => {
                let channel = match channel {
                    PreviewChannel::Email => "EMAIL",
                    PreviewChannel::Sms => "SMS",
                };
                let params = json!({
                    "user_id": user,
                    "lead_id": lead_id,
                    "channel": channel,
                    "sender": sender.to_json(),
                });
                let rendered: Value = client.call("templates.render.v1", params).await?;
                if let Some(subject) = rendered["subject"].as_str() {
                    println!("{} {}", "Subject:".bold(), subject);
                    println!();
                }
                println!("{}", rendered["body"].as_str().unwrap_or_default());
            }
        },

        Commands::Status => {
            println!("{}", "System Status".cyan().bold());
            println!();

            match client.call::<Value>("admin.stats.v1", json!({})).await {
                Ok(stats) => {
                    println!("  {} {}", "RPC URL:".bold(), client.url());
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!();
                    println!("  {} {}", "Lists:".bold(), stats["list_count"]);
                    println!("  {} {}", "Leads:".bold(), stats["lead_count"]);
                    println!("  {} {}", "Sessions:".bold(), stats["session_count"]);
                    println!("  {} {}", "Cache entries:".bold(), stats["cache_entry_count"]);
                    println!();
                    println!("  {} {:.2} MB", "DB Size:".bold(), mb(&stats["db_size_bytes"]));
                    println!("  {} {} seconds", "Uptime:".bold(), stats["uptime_seconds"]);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }

        Commands::Maintenance { force_vacuum } => {
            println!("{}", "Running maintenance...".cyan().bold());
            println!();

            let params = json!({ "force_vacuum": force_vacuum });

            match client.call::<Value>("admin.maintenance.v1", params).await {
                Ok(result) => {
                    println!("  ✓ Maintenance completed");
                    println!();
                    if result["vacuum_run"].as_bool().unwrap_or(false) {
                        println!("  {} VACUUM executed", "✓".green());
                    } else {
                        println!("  ○ VACUUM skipped (not needed)");
                    }
                    println!(
                        "  {} {} stale cache entries deleted",
                        "✓".green(),
                        result["cache_entries_deleted"]
                    );
                    println!(
                        "  {} {} idle sessions deleted",
                        "✓".green(),
                        result["sessions_deleted"]
                    );
                    println!();
                    println!(
                        "  {} {:.2} MB → {:.2} MB",
                        "DB Size:".bold(),
                        mb(&result["db_size_before"]),
                        mb(&result["db_size_after"])
                    );
                }
                Err(e) => {
                    println!("  {} Maintenance failed: {}", "✗".red(), e);
                }
            }
        }
    }

    Ok(())
}

async fn save_templates(client: &RpcClient, params: Value) -> Result<()> {
    let result: Value = client.call("templates.save.v1", params).await?;
    println!("{}", "✓ Template saved".green().bold());

    let unknown: Vec<String> =
        serde_json::from_value(result["unknown_placeholders"].clone()).unwrap_or_default();
    if !unknown.is_empty() {
        println!(
            "{}",
            format!(
                "! Unknown placeholders will be left as-is: {}",
                unknown.join(", ")
            )
            .yellow()
        );
    }
    Ok(())
}
