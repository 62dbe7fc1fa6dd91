use super::*;

fn spool() -> Vessel {
    Vessel::new("PLA black", 120.0, 250.5)
}

// =============================================================
// Command encoding
// =============================================================

#[test]
fn encode_unit_commands_carry_only_the_tag() {
    let get = encode_command(&Command::GetVessels).expect("encode");
    assert_eq!(get, r#"{"command":"getVessels"}"#);
    let tare = encode_command(&Command::Tare).expect("encode");
    assert_eq!(tare, r#"{"command":"tare"}"#);
}

#[test]
fn encode_toggle_updates_includes_enabled_flag() {
    let json = encode_command(&Command::ToggleUpdates { enabled: true }).expect("encode");
    let value: serde_json::Value = serde_json::from_str(&json).expect("json");
    assert_eq!(value, serde_json::json!({ "command": "toggleUpdates", "enabled": true }));
}

#[test]
fn encode_vessel_commands_use_camel_case_fields() {
    let json = encode_command(&Command::UpdateVessel { index: 2, vessel: spool() }).expect("encode");
    let value: serde_json::Value = serde_json::from_str(&json).expect("json");
    assert_eq!(
        value,
        serde_json::json!({
            "command": "updateVessel",
            "index": 2,
            "vessel": { "name": "PLA black", "vesselWeight": 120.0, "spoolWeight": 250.5 }
        })
    );
}

#[test]
fn encode_calibrate_and_index_commands() {
    let calibrate = encode_command(&Command::Calibrate { weight: 100.0 }).expect("encode");
    let value: serde_json::Value = serde_json::from_str(&calibrate).expect("json");
    assert_eq!(value, serde_json::json!({ "command": "calibrate", "weight": 100.0 }));

    let select = encode_command(&Command::SelectVessel { index: 0 }).expect("encode");
    assert_eq!(select, r#"{"command":"selectVessel","index":0}"#);
    let delete = encode_command(&Command::DeleteVessel { index: 4 }).expect("encode");
    assert_eq!(delete, r#"{"command":"deleteVessel","index":4}"#);
}

#[test]
fn command_name_matches_wire_tag() {
    let commands = [
        Command::GetVessels,
        Command::ToggleUpdates { enabled: false },
        Command::Tare,
        Command::Calibrate { weight: 1.0 },
        Command::SelectVessel { index: 1 },
        Command::AddVessel { vessel: spool() },
        Command::UpdateVessel { index: 1, vessel: spool() },
        Command::DeleteVessel { index: 1 },
    ];
    for command in commands {
        let json = encode_command(&command).expect("encode");
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");
        assert_eq!(value["command"], command.name());
    }
}

// =============================================================
// Inbound decoding
// =============================================================

#[test]
fn decode_weight_only_frame() {
    let frame = decode_inbound(r#"{"weight":12.345}"#).expect("decode");
    assert_eq!(frame.weight, Some(12.345));
    assert!(frame.filament_weight.is_none());
    assert!(frame.vessels.is_none());
}

#[test]
fn decode_co_occurring_fields() {
    let frame = decode_inbound(
        r#"{"weight":500,"filamentWeight":129.5,"selectedVessel":0,"status":"ok"}"#,
    )
    .expect("decode");
    assert_eq!(frame.weight, Some(500.0));
    assert_eq!(frame.filament_weight, Some(129.5));
    assert_eq!(frame.selected_vessel, Some(0));
    assert_eq!(frame.status.as_deref(), Some("ok"));
}

#[test]
fn decode_vessels_ignores_extra_device_fields() {
    let frame = decode_inbound(
        r#"{"vessels":[{"id":0,"name":"A","vesselWeight":10,"spoolWeight":20,"lastWeight":0,"lastUpdate":0}]}"#,
    )
    .expect("decode");
    assert_eq!(frame.vessels, Some(vec![Vessel::new("A", 10.0, 20.0)]));
}

#[test]
fn decode_empty_vessel_list_is_a_valid_snapshot() {
    let frame = decode_inbound(r#"{"vessels":[]}"#).expect("decode");
    assert_eq!(frame.vessels, Some(Vec::new()));
}

#[test]
fn decode_rejects_non_json_text() {
    let err = decode_inbound("not json").expect_err("should fail");
    assert!(matches!(err, CodecError::Json(_)));
}

#[test]
fn decode_rejects_mistyped_field() {
    let err = decode_inbound(r#"{"weight":"heavy"}"#).expect_err("should fail");
    assert!(matches!(err, CodecError::Json(_)));
}

#[test]
fn decode_rejects_non_object_frames() {
    assert!(matches!(decode_inbound("[1,2,3]"), Err(CodecError::NotAnObject)));
    assert!(matches!(decode_inbound("42"), Err(CodecError::NotAnObject)));
    assert!(matches!(decode_inbound("null"), Err(CodecError::NotAnObject)));
}

#[test]
fn decode_rejects_frames_without_known_fields() {
    let err = decode_inbound(r#"{"hello":"world"}"#).expect_err("should fail");
    assert!(matches!(err, CodecError::UnrecognizedShape));
    let err = decode_inbound("{}").expect_err("should fail");
    assert!(matches!(err, CodecError::UnrecognizedShape));
}

#[test]
fn decode_treats_null_fields_as_absent() {
    let frame = decode_inbound(r#"{"weight":null,"status":"Connected"}"#).expect("decode");
    assert!(frame.weight.is_none());
    assert_eq!(frame.status.as_deref(), Some("Connected"));
}

#[test]
fn decode_rejects_vessel_missing_weight() {
    let err = decode_inbound(r#"{"vessels":[{"name":"A","vesselWeight":10}]}"#).expect_err("should fail");
    assert!(matches!(err, CodecError::Json(_)));
}

#[test]
fn decode_rejects_negative_vessel_weights() {
    let err = decode_inbound(r#"{"vessels":[{"name":"A","vesselWeight":-1,"spoolWeight":20}]}"#)
        .expect_err("should fail");
    assert!(matches!(err, CodecError::InvalidField("vesselWeight")));
    let err = decode_inbound(r#"{"vessels":[{"name":"A","vesselWeight":1,"spoolWeight":-20}]}"#)
        .expect_err("should fail");
    assert!(matches!(err, CodecError::InvalidField("spoolWeight")));
}

// =============================================================
// Update classification
// =============================================================

#[test]
fn into_updates_orders_snapshot_before_selection() {
    let frame = InboundFrame {
        weight: Some(1.0),
        filament_weight: None,
        selected_vessel: Some(1),
        vessels: Some(vec![spool()]),
        status: Some("Vessel added".to_owned()),
    };
    let updates = frame.into_updates();
    assert_eq!(
        updates,
        vec![
            Update::Weight(1.0),
            Update::Vessels(vec![spool()]),
            Update::SelectedVessel(1),
            Update::Status("Vessel added".to_owned()),
        ]
    );
}

#[test]
fn into_updates_of_empty_frame_is_empty() {
    assert!(InboundFrame::default().into_updates().is_empty());
}

#[test]
fn filament_weight_subtracts_vessel_and_spool() {
    let vessel = Vessel::new("PETG", 100.0, 200.0);
    assert!((vessel.filament_weight(1300.0) - 1000.0).abs() < f64::EPSILON);
}
