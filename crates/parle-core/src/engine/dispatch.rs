//! Action dispatch: built-in `settings`, `application` and `web_message`
//! commands, everything else forwarded to the owning extension.

use super::Engine;
use crate::capture::Captures;
use crate::extension::ExtensionContext;
use parle_types::{EngineUpdate, ReplyKind};
use tracing::{debug, info, warn};
use url::Url;

const CMD_SETTINGS: &str = "settings";
const CMD_APPLICATION: &str = "application";
const CMD_WEB_MESSAGE: &str = "web_message";

/// Split an action on spaces, dropping empty pieces.
pub(crate) fn split_action(action: &str) -> Vec<String> {
    action
        .split(' ')
        .filter(|piece| !piece.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Setting value as a flag: false for empty, `0` or `false`.
fn parse_flag(value: &str) -> bool {
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}

impl Engine {
    /// Run an action string directly, as the host does for reply buttons.
    /// Only built-in commands are honoured.
    pub fn execute_action(&mut self, action: &str) {
        let tokens = split_action(action);
        if !self.run_builtin(&tokens, &Captures::default()) {
            warn!("Ignoring action without built-in handler: {:?}", action);
        }
    }

    /// Run an action template selected from `extension_id`'s grammar.
    pub(super) fn dispatch_action(&mut self, extension_id: &str, template: &str, captures: &Captures) {
        let tokens = split_action(template);
        if tokens.is_empty() || self.run_builtin(&tokens, captures) {
            return;
        }

        let tokens: Vec<String> = tokens
            .iter()
            .map(|token| self.expand(token, captures))
            .collect();

        let Some(entry) = self.extensions.get(extension_id) else {
            warn!("Cannot forward action to unknown extension {}", extension_id);
            return;
        };

        debug!("Forwarding {:?} to {}", tokens, extension_id);
        let ctx = ExtensionContext::new(extension_id, self.update_tx.clone());
        entry.extension.execute_action(&tokens, &ctx);
    }

    /// Returns false when the first token is not a built-in command.
    fn run_builtin(&mut self, tokens: &[String], captures: &Captures) -> bool {
        let Some((command, args)) = tokens.split_first() else {
            return false;
        };

        match command.as_str() {
            CMD_SETTINGS => self.run_settings(args, captures),
            CMD_APPLICATION => self.run_application(args),
            CMD_WEB_MESSAGE => self.run_web_message(args, captures),
            _ => return false,
        }
        true
    }

    fn run_settings(&mut self, args: &[String], captures: &Captures) {
        match args.first().map(String::as_str) {
            Some("name") if args.len() > 1 => {
                let name = self.expand(&args[1..].join(" "), captures);
                if name.is_empty() {
                    debug!("Ignoring empty user name");
                    return;
                }
                info!("User name set to {}", name);
                self.settings.set_user_name(&name);
            }
            Some("prop") if args.len() > 1 => {
                let value = self.expand(&args[1..].join(" "), captures);
                let enabled = parse_flag(&value);
                info!("Propositions {}", if enabled { "enabled" } else { "disabled" });
                self.settings.set_propositions_enabled(enabled);
            }
            Some("show") => self.send_update(EngineUpdate::Reply {
                text: String::new(),
                is_final: true,
                kind: ReplyKind::Settings,
                urls: Vec::new(),
                labels: Vec::new(),
            }),
            other => debug!("Incomplete or unknown settings action: {:?}", other),
        }
    }

    fn run_application(&self, args: &[String]) {
        match args.first().map(String::as_str) {
            Some("hideWindow") => self.send_update(EngineUpdate::HideWindowRequested),
            Some(_) => {
                info!("Quit requested");
                self.send_update(EngineUpdate::QuitRequested);
            }
            None => debug!("application action without sub-command"),
        }
    }

    fn run_web_message(&self, args: &[String], captures: &Captures) {
        let kind = match args.first().map(String::as_str) {
            Some("without_action_btn") => ReplyKind::WebWithoutActionBtn,
            Some("with_action_btn") => ReplyKind::WebWithActionBtn,
            other => {
                debug!("Unknown web_message mode: {:?}", other);
                return;
            }
        };

        let url = match (args.get(1).map(String::as_str), args.get(2)) {
            (Some("search"), Some(_)) => Some(self.search_url(&args[2..], captures)),
            (Some("site"), Some(target)) => self.site_url(target, captures),
            (target, _) => {
                debug!("Incomplete web_message action: {:?}", target);
                None
            }
        };

        if let Some(url) = url {
            self.send_update(EngineUpdate::Reply {
                text: String::new(),
                is_final: true,
                kind,
                urls: vec![url],
                labels: Vec::new(),
            });
        }
    }

    fn search_url(&self, terms: &[String], captures: &Captures) -> String {
        let terms = self.expand(&terms.join(" "), captures);
        let query: String = url::form_urlencoded::byte_serialize(terms.as_bytes()).collect();
        format!("{}{}", self.config.search.engine_base_url, query)
    }

    fn site_url(&self, target: &str, captures: &Captures) -> Option<String> {
        let target = self.expand(target, captures);
        let parsed = match Url::parse(&target) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
            _ => Url::parse(&format!("https://{target}")),
        };

        match parsed {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                warn!("Dropping unparseable site {:?}: {}", target, e);
                None
            }
        }
    }
}
