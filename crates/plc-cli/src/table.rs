//! # Table Subcommand
//!
//! Prints the standard transition table, as aligned text or JSON.

use clap::Args;

use plc_state::TransitionTable;

/// Arguments for the table subcommand.
#[derive(Args, Debug)]
pub struct TableArgs {
    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

pub fn run_table(args: &TableArgs) -> anyhow::Result<String> {
    let table = TransitionTable::standard();
    if args.json {
        return Ok(serde_json::to_string_pretty(table.rules())?);
    }
    Ok(render_text(&table))
}

/// One line per rule in declaration order.
pub fn render_text(table: &TransitionTable) -> String {
    let mut out = format!(
        "{:<10} {:<8} {:<10} {:<8} {}",
        "FROM", "ACTION", "TO", "REASON", "ROLES"
    );
    for rule in table.rules() {
        out.push('\n');
        out.push_str(&format!(
            "{:<10} {:<8} {:<10} {:<8} {}",
            rule.from.as_str(),
            rule.action.as_str(),
            rule.to.as_str(),
            if rule.reason_required { "required" } else { "-" },
            rule.allowed_roles,
        ));
    }
    out
}
