use super::*;

#[test]
fn intent_defaults_to_live_updates_off() {
    assert!(!SessionIntent::default().live_updates_enabled);
}

#[test]
fn toggle_live_updates_flips_and_reports_new_value() {
    let mut intent = SessionIntent::default();
    assert!(intent.toggle_live_updates());
    assert!(intent.live_updates_enabled);
    assert!(!intent.toggle_live_updates());
    assert!(!intent.live_updates_enabled);
}
