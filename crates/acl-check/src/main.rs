mod cli;
mod config;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use http::{Method, Request};
use tracing::{debug, info, warn};

use acl_engine::{loader, AclConfig};
use acl_guard::{AclGuard, ExtensionRoleSource, GuardOutcome, RoleNames};

use crate::cli::{Cli, Command, OutputFormat};
use crate::config::{LogFormat, LoggingConfig};

/// Exit code for a request the ACL denies.
const EXIT_FORBIDDEN: u8 = 1;

fn main() -> Result<ExitCode> {
    // 1. Parse CLI args.
    let cli = Cli::parse();

    // 2. Load config, then merge CLI overrides.
    let loaded = config::load(&cli.config)?;
    let config_found = loaded.is_some();
    let mut cfg = loaded.unwrap_or_default();

    if let Some(ref acl) = cli.acl {
        cfg.acl_file = acl.clone();
    }
    if let Some(ref level) = cli.log_level {
        cfg.logging.level = level.clone();
    }

    // 3. Init tracing-subscriber. Logs go to stderr so stdout stays parseable.
    init_tracing(&cfg.logging);

    if !config_found {
        warn!(
            path = %cli.config.display(),
            "configuration file not found; using defaults"
        );
    }

    info!(
        config_file = %cli.config.display(),
        acl_file = %cfg.acl_file.display(),
        "acl-check starting"
    );

    // 4. Load the ACL document and build the guard.
    let acl_config = loader::load_acl(&cfg.acl_file).context("failed to load ACL file")?;
    let guard = build_guard(acl_config)?;
    debug!(?guard, "ACL guard ready");

    // 5. Run the subcommand.
    match cli.command {
        Command::Validate => {
            println!(
                "ok: {} rule(s), {} bypass predicate(s)",
                guard.access_control().rules().len(),
                guard.bypass().len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Check {
            path,
            method,
            roles,
            format,
        } => {
            let request = build_request(&path, &method, roles.clone())?;
            let outcome = guard.check(&request).context("failed to look up role names")?;

            match format {
                OutputFormat::Text => println!("{}", render_text(&request, &outcome)),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&render_json(&request, &roles, &outcome))?
                ),
            }

            if outcome.is_allowed() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(EXIT_FORBIDDEN))
            }
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn build_guard(config: AclConfig) -> Result<AclGuard<ExtensionRoleSource>> {
    AclGuard::builder()
        .role_source(ExtensionRoleSource)
        .config(config)
        .build()
        .context("failed to initialize ACL guard")
}

/// Build the request the guard will see, with `roles` attached the way an
/// authentication layer would attach them.
fn build_request(path: &str, method: &str, roles: Vec<String>) -> Result<Request<()>> {
    let method = Method::from_bytes(method.to_uppercase().as_bytes())
        .with_context(|| format!("invalid HTTP method: {method}"))?;
    Request::builder()
        .method(method)
        .uri(path)
        .extension(RoleNames(roles))
        .body(())
        .with_context(|| format!("invalid request path: {path}"))
}

fn render_text<B>(request: &Request<B>, outcome: &GuardOutcome) -> String {
    let verdict = match outcome {
        GuardOutcome::Bypassed => "bypassed".to_string(),
        GuardOutcome::Continue(decision) => format!("allowed: {decision}"),
        GuardOutcome::Forbidden(decision) => format!("forbidden: {decision}"),
    };
    format!(
        "{} {} -> {} {}",
        request.method(),
        request.uri().path(),
        outcome.status().as_u16(),
        verdict
    )
}

fn render_json<B>(request: &Request<B>, roles: &[String], outcome: &GuardOutcome) -> serde_json::Value {
    serde_json::json!({
        "method": request.method().as_str(),
        "path": request.uri().path(),
        "roles": roles,
        "allowed": outcome.is_allowed(),
        "bypassed": matches!(outcome, GuardOutcome::Bypassed),
        "status": outcome.status().as_u16(),
        "decision": outcome.decision(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use acl_engine::loader::load_acl_from_str;

    fn guard(yaml: &str) -> AclGuard<ExtensionRoleSource> {
        build_guard(load_acl_from_str(yaml).unwrap()).unwrap()
    }

    #[test]
    fn request_carries_roles_and_uppercase_method() {
        let req = build_request("/apple/big", "post", vec!["user".into()]).unwrap();
        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.uri().path(), "/apple/big");
        assert_eq!(
            req.extensions().get::<RoleNames>(),
            Some(&RoleNames(vec!["user".into()]))
        );
    }

    #[test]
    fn invalid_path_is_reported() {
        let err = build_request("not a path", "GET", vec![]).unwrap_err();
        assert!(
            err.to_string().contains("invalid request path"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn text_output_for_each_outcome() {
        let g = guard(
            r#"
rules:
  - name: block-bad-user
    role: baduser
    action: reject
  - action: accept
unless:
  paths:
    - type: regex
      pattern: "^/public/"
"#,
        );

        let req = build_request("/apple/", "GET", vec!["user".into()]).unwrap();
        let outcome = g.check(&req).unwrap();
        assert_eq!(
            render_text(&req, &outcome),
            "GET /apple/ -> 200 allowed: accept (matched rule #1)"
        );

        let req = build_request("/apple/", "GET", vec!["baduser".into()]).unwrap();
        let outcome = g.check(&req).unwrap();
        assert_eq!(
            render_text(&req, &outcome),
            "GET /apple/ -> 403 forbidden: reject (matched rule 'block-bad-user')"
        );

        let req = build_request("/public/", "GET", vec![]).unwrap();
        let outcome = g.check(&req).unwrap();
        assert_eq!(render_text(&req, &outcome), "GET /public/ -> 200 bypassed");
    }

    #[test]
    fn json_output_includes_decision() {
        let g = guard("rules:\n  - action: reject\n");
        let roles = vec!["user".to_string()];
        let req = build_request("/apple/", "GET", roles.clone()).unwrap();
        let outcome = g.check(&req).unwrap();

        let value = render_json(&req, &roles, &outcome);
        assert_eq!(value["allowed"], false);
        assert_eq!(value["status"], 403);
        assert_eq!(value["decision"]["verdict"], "reject");
        assert_eq!(value["decision"]["reason"], "matched_rule");
        assert_eq!(value["decision"]["matched_rule"], 0);
    }
}
