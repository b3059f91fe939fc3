//! Terminal rendering of leads, lists and sessions

use coldline_core::application::session_sync::SyncOutcome;
use coldline_core::application::NavigationResult;
use coldline_core::domain::{phone, Lead, LeadList};
use colored::Colorize;
use tabled::{Table, Tabled};

#[derive(Tabled)]
pub struct LeadRow {
    #[tabled(rename = "#")]
    pub position: i64,
    pub id: String,
    pub name: String,
    pub phone: String,
    pub company: String,
    pub timezone: String,
    pub calls: i64,
}

impl From<&Lead> for LeadRow {
    fn from(lead: &Lead) -> Self {
        Self {
            position: lead.position + 1,
            id: lead.id.clone(),
            name: lead.name.clone(),
            phone: phone::display(&lead.phone),
            company: lead.company.clone().unwrap_or_default(),
            timezone: lead.timezone.to_string(),
            calls: lead.call_count,
        }
    }
}

#[derive(Tabled)]
pub struct ListRow {
    pub id: String,
    pub name: String,
    pub file: String,
    pub leads: i64,
}

impl From<&LeadList> for ListRow {
    fn from(list: &LeadList) -> Self {
        Self {
            id: list.id.clone(),
            name: list.name.clone(),
            file: list.file_name.clone(),
            leads: list.total_leads,
        }
    }
}

pub fn lead_table(leads: &[Lead]) -> String {
    Table::new(leads.iter().map(LeadRow::from)).to_string()
}

pub fn list_table(lists: &[LeadList]) -> String {
    Table::new(lists.iter().map(ListRow::from)).to_string()
}

/// One lead as a card
pub fn print_lead(lead: &Lead) {
    println!("  {} {}", "Name:".bold(), lead.name);
    println!("  {} {}", "Phone:".bold(), phone::display(&lead.phone));
    for extra in &lead.additional_phones {
        println!("  {} {}", "Also:".bold(), phone::display(extra));
    }
    if let Some(company) = &lead.company {
        println!("  {} {}", "Company:".bold(), company);
    }
    if let Some(email) = &lead.email {
        println!("  {} {}", "Email:".bold(), email);
    }
    println!("  {} {}", "Timezone:".bold(), lead.timezone);
    let calls = if lead.is_called() {
        format!("{}", lead.call_count).yellow()
    } else {
        "never".green()
    };
    println!("  {} {}", "Calls:".bold(), calls);
    println!("  {} {}", "ID:".dimmed(), lead.id.dimmed());
}

pub fn print_navigation(result: &NavigationResult) {
    match &result.lead {
        Some(lead) => {
            println!(
                "{}",
                format!("Lead {} of {}", result.index + 1, result.matching)
                    .cyan()
                    .bold()
            );
            print_lead(lead);
        }
        None => println!("{}", "No leads match the current filter".yellow()),
    }
    if !result.moved && result.at_end {
        println!("{}", "End of list reached".yellow());
    }
    if !result.remote_synced {
        println!("{}", "! Session saved locally only".yellow());
    }
}

pub fn print_session(outcome: &SyncOutcome) {
    let state = &outcome.state;
    println!("{}", "Session".cyan().bold());
    println!("  {} {:?}", "Source:".bold(), outcome.source);
    println!(
        "  {} {}",
        "List:".bold(),
        state.list_id.as_deref().unwrap_or("(none)")
    );
    println!("  {} {}", "Position:".bold(), state.current_index + 1);
    let zones: Vec<String> = state.filter.timezones.iter().map(|t| t.to_string()).collect();
    println!(
        "  {} {} / {:?}",
        "Filter:".bold(),
        if zones.is_empty() {
            "any timezone".to_string()
        } else {
            zones.join(",")
        },
        state.filter.call_status
    );
    println!("  {} {}", "Shuffle:".bold(), state.shuffle);
    println!(
        "  {} {} ({}s delay)",
        "Auto-call:".bold(),
        state.auto_call,
        state.call_delay_secs
    );

    if let Some(conflict) = &outcome.conflict {
        println!();
        println!(
            "{}",
            format!(
                "! Newer session from device '{}' was applied",
                conflict.remote_device_id
            )
            .yellow()
            .bold()
        );
        println!("  Run `coldline session --keep-local` to restore this device's copy.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_row_formats_phone_and_position() {
        let mut lead = Lead::new("l1", "list", 0, "Ada Lovelace", "4155550100", 0);
        lead.company = Some("Engines".to_string());

        let row = LeadRow::from(&lead);
        assert_eq!(row.position, 1);
        assert_eq!(row.phone, "(415) 555-0100");
        assert_eq!(row.timezone, "PACIFIC");

        let table = lead_table(&[lead]);
        assert!(table.contains("Ada Lovelace"));
        assert!(table.contains("Engines"));
    }
}
