//! # Actions Subcommand

use clap::Args;

use plc_core::RoleSet;
use plc_state::{PolicyState, TransitionEngine};

/// Arguments for the actions subcommand.
#[derive(Args, Debug)]
pub struct ActionsArgs {
    /// Current policy state, e.g. `active`.
    #[arg(long)]
    pub state: PolicyState,

    /// Comma-separated actor roles, e.g. `agent,customer`.
    #[arg(long, value_parser = RoleSet::parse_list)]
    pub roles: RoleSet,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

pub fn run_actions(args: &ActionsArgs) -> anyhow::Result<String> {
    let actions = TransitionEngine::standard().available_actions(args.state, args.roles);
    if args.json {
        return Ok(serde_json::to_string(&actions)?);
    }
    if actions.is_empty() {
        return Ok(format!("no actions available from {} for {}", args.state, args.roles));
    }
    Ok(actions
        .iter()
        .map(|a| a.as_str())
        .collect::<Vec<_>>()
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ActionsArgs,
    }

    fn parse(argv: &[&str]) -> ActionsArgs {
        Harness::try_parse_from(std::iter::once("plc").chain(argv.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn agent_on_active() {
        let args = parse(&["--state", "active", "--roles", "agent"]);
        assert_eq!(run_actions(&args).unwrap(), "RENEW\nCANCEL");
    }

    #[test]
    fn json_output() {
        let args = parse(&["--state", "Draft", "--roles", "underwriter", "--json"]);
        assert_eq!(run_actions(&args).unwrap(), r#"["ISSUE"]"#);
    }

    #[test]
    fn nothing_from_cancelled() {
        let args = parse(&["--state", "cancelled", "--roles", "admin,agent"]);
        assert_eq!(
            run_actions(&args).unwrap(),
            "no actions available from CANCELLED for {ADMIN, AGENT}"
        );
    }

    #[test]
    fn unknown_role_rejected_at_parse() {
        let result = Harness::try_parse_from(["plc", "--state", "active", "--roles", "broker"]);
        assert!(result.is_err());
    }
}
