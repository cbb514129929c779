//! Tests for single-turn processing
//!
//! Covers segmentation into several replies, registration-order matching,
//! Var capture into templates, the fallback reply and reproducible selection.

use super::fixtures::*;
use parle_types::{EngineUpdate, ReplyKind};

#[test]
fn test_greeting_replies_from_pool_and_is_final() {
    let (mut engine, mut rx) = engine_with(vec![RecordingExtension::new("salutations", GREETINGS_XML)]);

    let updates = turn(&mut engine, &mut rx, "Bonjour");
    assert_eq!(updates.len(), 1);
    match &updates[0] {
        EngineUpdate::Reply {
            text,
            is_final,
            kind,
            ..
        } => {
            assert!(["Bonjour !", "Salut !", "Coucou !"].contains(&text.as_str()));
            assert!(*is_final);
            assert_eq!(*kind, ReplyKind::Message);
        }
        other => panic!("Expected a reply, got {other:?}"),
    }
}

#[test]
fn test_name_and_hour_template() {
    let (mut engine, mut rx) = engine_with(vec![RecordingExtension::new("salutations", GREETINGS_XML)]);
    engine.execute_action("settings name Ana");

    let updates = turn(&mut engine, &mut rx, "Quelle heure est-il ?");
    assert_eq!(reply_texts(&updates), vec!["Bonjour Ana, il est 14:05:00"]);
}

#[test]
fn test_leading_greeting_is_own_segment() {
    let (mut engine, mut rx) = engine_with(vec![RecordingExtension::new("salutations", GREETINGS_XML)]);

    let updates = turn(&mut engine, &mut rx, "salut quelle heure");
    assert_eq!(updates.len(), 2);

    let finals: Vec<bool> = updates
        .iter()
        .map(|u| matches!(u, EngineUpdate::Reply { is_final: true, .. }))
        .collect();
    assert_eq!(finals, vec![false, true]);
    assert_eq!(
        reply_texts(&updates)[1],
        "Bonjour Inconnue, il est 14:05:00"
    );
}

#[test]
fn test_action_then_reply_sees_new_setting() {
    let (mut engine, mut rx) = engine_with(vec![RecordingExtension::new("salutations", GREETINGS_XML)]);

    let updates = turn(&mut engine, &mut rx, "appelle moi Zoé");
    assert_eq!(reply_texts(&updates), vec!["D'accord, je t'appellerai zoe"]);
    assert_eq!(engine.settings().user_name, "zoe");
}

#[test]
fn test_no_words_blocks_item() {
    let (mut engine, mut rx) = engine_with(vec![RecordingExtension::new("salutations", GREETINGS_XML)]);

    let updates = turn(&mut engine, &mut rx, "comment appelle moi ana");
    assert_eq!(reply_texts(&updates), vec!["Désolé, je ne comprends pas ! :("]);
    assert_eq!(engine.settings().user_name, "Inconnue");
}

#[test]
fn test_no_extension_yields_fallback_with_search_action() {
    let (mut engine, mut rx) = test_engine();

    let updates = turn(&mut engine, &mut rx, "Quelle météo demain ?");
    assert_eq!(
        updates,
        vec![EngineUpdate::Reply {
            text: "Désolé, je ne comprends pas ! :(".to_string(),
            is_final: true,
            kind: ReplyKind::Message,
            urls: vec!["web_message with_action_btn search quelle meteo demain".to_string()],
            labels: vec!["Chercher sur le web".to_string()],
        }]
    );
}

#[test]
fn test_two_clauses_site_then_fallback() {
    let (mut engine, mut rx) = engine_with(vec![
        RecordingExtension::new("salutations", GREETINGS_XML),
        RecordingExtension::new("web", WEB_XML),
    ]);

    let updates = turn(&mut engine, &mut rx, "ouvre le site google.com , merci");
    assert_eq!(updates.len(), 2);

    assert_eq!(
        updates[0],
        EngineUpdate::Reply {
            text: String::new(),
            is_final: true,
            kind: ReplyKind::WebWithoutActionBtn,
            urls: vec!["https://google.com/".to_string()],
            labels: Vec::new(),
        }
    );
    match &updates[1] {
        EngineUpdate::Reply { urls, .. } => {
            assert_eq!(urls, &vec!["web_message with_action_btn search merci".to_string()]);
        }
        other => panic!("Expected fallback reply, got {other:?}"),
    }
}

#[test]
fn test_empty_input_emits_nothing() {
    let (mut engine, mut rx) = engine_with(vec![RecordingExtension::new("salutations", GREETINGS_XML)]);
    assert!(turn(&mut engine, &mut rx, "  , & ! ").is_empty());
}

#[test]
fn test_first_registered_extension_wins() {
    let first = r#"<Grammar><Item><Keywords minWord="1" maxWord="1"><Words><w>ping</w></Words></Keywords><Reply><rep>premier</rep></Reply></Item></Grammar>"#;
    let second = r#"<Grammar><Item><Keywords minWord="1" maxWord="1"><Words><w>ping</w></Words></Keywords><Reply><rep>second</rep></Reply></Item></Grammar>"#;
    let (mut engine, mut rx) = engine_with(vec![
        RecordingExtension::new("a", first),
        RecordingExtension::new("b", second),
    ]);

    assert_eq!(reply_texts(&turn(&mut engine, &mut rx, "ping")), vec!["premier"]);
}

#[test]
fn test_item_without_applicable_branch_is_skipped() {
    let xml = r#"
        <Grammar>
          <Item>
            <Keywords minWord="1" maxWord="2"><Words><w>ping</w></Words></Keywords>
            <Reply><condition if="?0=ping pong"><rep>jamais</rep></condition></Reply>
          </Item>
          <Item>
            <Keywords minWord="1" maxWord="2"><Words><w>ping</w></Words></Keywords>
            <Reply><rep>pong</rep></Reply>
          </Item>
        </Grammar>
    "#;
    let (mut engine, mut rx) = engine_with(vec![RecordingExtension::new("ping", xml)]);

    assert_eq!(reply_texts(&turn(&mut engine, &mut rx, "ping")), vec!["pong"]);
    assert_eq!(reply_texts(&turn(&mut engine, &mut rx, "ping pong")), vec!["jamais"]);
}

#[test]
fn test_condition_on_setting() {
    let xml = r#"
        <Grammar>
          <Item>
            <Keywords minWord="1" maxWord="3"><Words><w>qui</w></Words></Keywords>
            <Reply>
              <condition if="?name=Inconnue"><rep>Je ne te connais pas</rep></condition>
              <else><rep>Tu es ?name</rep></else>
            </Reply>
          </Item>
        </Grammar>
    "#;
    let (mut engine, mut rx) = engine_with(vec![RecordingExtension::new("qui", xml)]);

    assert_eq!(
        reply_texts(&turn(&mut engine, &mut rx, "qui suis je")),
        vec!["Je ne te connais pas"]
    );
    engine.execute_action("settings name Ana");
    assert_eq!(reply_texts(&turn(&mut engine, &mut rx, "qui suis je")), vec!["Tu es Ana"]);
}

#[test]
fn test_malformed_grammar_contributes_nothing() {
    let (mut engine, mut rx) = engine_with(vec![
        RecordingExtension::new("broken", "<Grammar><Item>"),
        RecordingExtension::new("salutations", GREETINGS_XML),
    ]);

    assert_eq!(engine.extension_ids(), vec!["broken", "salutations"]);
    assert_eq!(turn(&mut engine, &mut rx, "bonjour").len(), 1);
}

#[test]
fn test_same_seed_same_selection() {
    let run = |seed| {
        let (mut engine, mut rx) = test_engine_with_seed(seed);
        engine
            .register(Box::new(RecordingExtension::new("salutations", GREETINGS_XML)))
            .unwrap();
        (0..12)
            .flat_map(|_| {
                turn(&mut engine, &mut rx, "bonjour")
                    .into_iter()
                    .filter_map(|u| u.reply_text().map(ToString::to_string))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(run(99), run(99));
}
