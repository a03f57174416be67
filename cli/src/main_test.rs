use super::*;

fn parse(args: &[&str]) -> Command {
    let mut argv = vec!["logboard-cli"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap().command
}

#[test]
fn parses_positional_ids_and_offsets() {
    assert_eq!(parse(&["leader", "3"]), Command::Leader { user_id: 3 });
    assert_eq!(parse(&["scroll", "2", "120"]), Command::Scroll { user_id: 2, offset: 120 });
    assert_eq!(parse(&["horizontal", "40"]), Command::Horizontal { offset: 40 });
}

#[test]
fn base_url_flag_overrides_default() {
    let cli = Cli::try_parse_from(["logboard-cli", "--base-url", "http://board:8080/", "state"]).unwrap();
    assert_eq!(cli.base_url, "http://board:8080/");
}

#[test]
fn ping_has_no_board_route() {
    assert!(route_for(&Command::Ping).is_none());
}

#[test]
fn focus_and_resume_hit_editor_routes() {
    let (method, path, body) = route_for(&Command::Focus { user_id: 5 }).unwrap();
    assert_eq!((method, path.as_str(), body), (Method::POST, "/api/editor/5", None));

    let (_, path, _) = route_for(&Command::Resume).unwrap();
    assert_eq!(path, "/api/editor/resume");
}

#[test]
fn window_commands_send_maximized_flag() {
    let (method, path, body) = route_for(&Command::Maximize).unwrap();
    assert_eq!(method, Method::PUT);
    assert_eq!(path, "/api/window");
    assert_eq!(body, Some(json!({ "maximized": true })));

    let (_, _, body) = route_for(&Command::Restore).unwrap();
    assert_eq!(body, Some(json!({ "maximized": false })));
}

#[test]
fn scroll_sends_offset_body() {
    let (_, path, body) = route_for(&Command::Scroll { user_id: 1, offset: 90 }).unwrap();
    assert_eq!(path, "/api/panes/1/scroll");
    assert_eq!(body, Some(json!({ "offset": 90 })));
}

#[test]
fn error_body_code_and_message_are_reported() {
    let body = r#"{"error":{"code":"E_LEADER_LOCKED","message":"user 1 cannot claim leadership while focused for editing"}}"#;
    assert_eq!(
        error_message(body, reqwest::StatusCode::CONFLICT),
        "E_LEADER_LOCKED: user 1 cannot claim leadership while focused for editing"
    );
}

#[test]
fn unshaped_error_body_falls_back_to_status_reason() {
    assert_eq!(error_message("", reqwest::StatusCode::SERVICE_UNAVAILABLE), "Service Unavailable");
    assert_eq!(error_message(r#"{"error":"nope"}"#, reqwest::StatusCode::NOT_FOUND), "Not Found");
}
