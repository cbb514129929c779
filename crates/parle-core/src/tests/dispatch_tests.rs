//! Tests for action dispatch
//!
//! Built-in `settings`, `application` and `web_message` commands, forwarding
//! of every other action to the extension that owns the matched item.

use super::fixtures::*;
use parle_types::{EngineEvent, EngineUpdate, ReplyKind};

const ALARM_XML: &str = r#"
<Grammar>
  <Item>
    <Keywords minWord="2" maxWord="6"><Words><w>alarme</w></Words></Keywords>
    <Var max="1"><w>a</w></Var>
    <Actions><action>alarme   ?1 ?name</action></Actions>
  </Item>
  <Item>
    <Keywords minWord="2" maxWord="4"><Words><w>repete</w></Words></Keywords>
    <Var><w>repete</w></Var>
    <Actions><action>echo ?1</action></Actions>
  </Item>
  <Item>
    <Keywords minWord="1" maxWord="2"><Words><w>cache</w></Words></Keywords>
    <Actions><action>application hideWindow</action></Actions>
  </Item>
  <Item>
    <Keywords minWord="1" maxWord="2"><Words><w>quitte</w></Words></Keywords>
    <Actions><action>application quit</action></Actions>
  </Item>
  <Item>
    <Keywords minWord="1" maxWord="3"><Words><w>propositions</w></Words></Keywords>
    <Var max="1"><w>propositions</w></Var>
    <Actions><action>settings prop ?1</action></Actions>
    <Reply><rep>Propositions ?prop</rep></Reply>
  </Item>
  <Item>
    <Keywords minWord="1" maxWord="1"><Words><w>reglages</w></Words></Keywords>
    <Actions><action>settings show</action></Actions>
  </Item>
</Grammar>
"#;

fn alarm_engine() -> (
    crate::Engine,
    tokio::sync::mpsc::UnboundedReceiver<EngineUpdate>,
    std::rc::Rc<std::cell::RefCell<Calls>>,
) {
    let alarm = RecordingExtension::new("alarme", ALARM_XML);
    let calls = alarm.calls();
    let (engine, rx) = engine_with(vec![alarm, RecordingExtension::new("web", WEB_XML)]);
    (engine, rx, calls)
}

#[test]
fn test_forwarded_action_is_substituted() {
    let (mut engine, mut rx, calls) = alarm_engine();
    engine.execute_action("settings name Ana");

    let updates = turn(&mut engine, &mut rx, "mets une alarme a 7h");
    assert!(updates.is_empty());
    assert_eq!(
        calls.borrow().actions,
        vec![vec!["alarme".to_string(), "7h".to_string(), "Ana".to_string()]]
    );
}

#[test]
fn test_extension_reply_through_context() {
    let (mut engine, mut rx, _) = alarm_engine();

    let updates = turn(&mut engine, &mut rx, "repete bien joue");
    assert_eq!(updates, vec![EngineUpdate::message("bien joue", true)]);
}

#[test]
fn test_action_only_item_suppresses_fallback() {
    let (mut engine, mut rx, _) = alarm_engine();

    let updates = turn(&mut engine, &mut rx, "cache toi");
    assert_eq!(updates, vec![EngineUpdate::HideWindowRequested]);
}

#[test]
fn test_application_other_than_hide_quits() {
    let (mut engine, mut rx, _) = alarm_engine();

    assert_eq!(turn(&mut engine, &mut rx, "quitte"), vec![EngineUpdate::QuitRequested]);

    engine.execute_action("application restart");
    assert_eq!(drain(&mut rx), vec![EngineUpdate::QuitRequested]);
}

#[test]
fn test_settings_prop_flag_and_label() {
    let (mut engine, mut rx, _) = alarm_engine();

    let updates = turn(&mut engine, &mut rx, "propositions false");
    assert!(!engine.settings().propositions_enabled);
    assert_eq!(reply_texts(&updates), vec!["Propositions désactivées"]);

    let updates = turn(&mut engine, &mut rx, "propositions oui");
    assert!(engine.settings().propositions_enabled);
    assert_eq!(reply_texts(&updates), vec!["Propositions activées"]);

    turn(&mut engine, &mut rx, "propositions 0");
    assert!(!engine.settings().propositions_enabled);
}

#[test]
fn test_settings_prop_missing_capture_disables() {
    let (mut engine, mut rx, _) = alarm_engine();

    turn(&mut engine, &mut rx, "propositions");
    assert!(!engine.settings().propositions_enabled);
}

#[test]
fn test_settings_show() {
    let (mut engine, mut rx, _) = alarm_engine();

    assert_eq!(
        turn(&mut engine, &mut rx, "reglages"),
        vec![EngineUpdate::Reply {
            text: String::new(),
            is_final: true,
            kind: ReplyKind::Settings,
            urls: Vec::new(),
            labels: Vec::new(),
        }]
    );
}

#[test]
fn test_incomplete_builtin_is_noop() {
    let (mut engine, mut rx, calls) = alarm_engine();

    engine.execute_action("settings name");
    engine.execute_action("web_message with_action_btn search");
    engine.execute_action("web_message sideways search chats");
    engine.execute_action("application");

    assert!(drain(&mut rx).is_empty());
    assert_eq!(engine.settings().user_name, "Inconnue");
    assert!(calls.borrow().actions.is_empty());
}

#[test]
fn test_web_search_url() {
    let (mut engine, mut rx, _) = alarm_engine();

    let updates = turn(&mut engine, &mut rx, "cherche chats noirs");
    assert_eq!(
        updates,
        vec![EngineUpdate::Reply {
            text: String::new(),
            is_final: true,
            kind: ReplyKind::WebWithActionBtn,
            urls: vec![
                "https://www.google.com/search?channel=fs&client=linux&q=chats+noirs".to_string()
            ],
            labels: Vec::new(),
        }]
    );
}

#[test]
fn test_site_with_scheme_is_kept() {
    let (mut engine, mut rx, _) = alarm_engine();

    let updates = turn(&mut engine, &mut rx, "va sur le site https://example.org/docs");
    match &updates[..] {
        [EngineUpdate::Reply { urls, kind, .. }] => {
            assert_eq!(urls, &vec!["https://example.org/docs".to_string()]);
            assert_eq!(*kind, ReplyKind::WebWithoutActionBtn);
        }
        other => panic!("Expected one web reply, got {other:?}"),
    }
}

#[test]
fn test_unparseable_site_is_dropped() {
    let (mut engine, mut rx, _) = alarm_engine();

    engine.execute_action("web_message with_action_btn site exa<mple.org");
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_bare_host_starting_with_http_gets_scheme() {
    let (mut engine, mut rx, _) = alarm_engine();

    let updates = turn(&mut engine, &mut rx, "ouvre le site httpbin.org");
    match &updates[..] {
        [EngineUpdate::Reply { urls, kind, .. }] => {
            assert_eq!(urls, &vec!["https://httpbin.org/".to_string()]);
            assert_eq!(*kind, ReplyKind::WebWithoutActionBtn);
        }
        other => panic!("Expected one web reply, got {other:?}"),
    }
}

#[test]
fn test_search_terms_are_percent_encoded() {
    let (mut engine, mut rx, _) = alarm_engine();

    let updates = turn(&mut engine, &mut rx, "cherche c# 100% tuto");
    let url = match &updates[..] {
        [EngineUpdate::Reply { urls, .. }] => urls[0].clone(),
        other => panic!("Expected web reply, got {other:?}"),
    };
    assert!(url.ends_with("&q=c%23+100%25+tuto"));

    let parsed = url::Url::parse(&url).unwrap();
    assert!(parsed.fragment().is_none());
    let query: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
    assert!(query.contains(&("q".to_string(), "c# 100% tuto".to_string())));
}

#[test]
fn test_fallback_button_runs_web_search() {
    let (mut engine, mut rx, _) = alarm_engine();

    let updates = turn(&mut engine, &mut rx, "meteo de demain");
    let action = match &updates[..] {
        [EngineUpdate::Reply { urls, .. }] => urls[0].clone(),
        other => panic!("Expected fallback, got {other:?}"),
    };

    engine.handle_event(EngineEvent::ActionTriggered { action });
    match &drain(&mut rx)[..] {
        [EngineUpdate::Reply { urls, kind, .. }] => {
            assert_eq!(*kind, ReplyKind::WebWithActionBtn);
            assert!(urls[0].ends_with("q=meteo+de+demain"));
        }
        other => panic!("Expected web reply, got {other:?}"),
    }
}

#[test]
fn test_direct_non_builtin_action_is_ignored() {
    let (mut engine, mut rx, calls) = alarm_engine();

    engine.execute_action("alarme 7h");
    assert!(drain(&mut rx).is_empty());
    assert!(calls.borrow().actions.is_empty());
}

#[test]
fn test_configured_search_engine() {
    let mut config = crate::config::Config::default();
    config.search.engine_base_url = "https://duckduckgo.com/?q=".to_string();
    let (mut engine, mut rx) =
        crate::Engine::new(config, Box::new(crate::config::MemorySettings::default()));

    engine.execute_action("web_message without_action_btn search rust lang");
    match &drain(&mut rx)[..] {
        [EngineUpdate::Reply { urls, .. }] => {
            assert_eq!(urls, &vec!["https://duckduckgo.com/?q=rust+lang".to_string()]);
        }
        other => panic!("Expected web reply, got {other:?}"),
    }
}
