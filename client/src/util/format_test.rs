use super::*;

#[test]
fn format_grams_rounds_to_two_decimals() {
    assert_eq!(format_grams(12.345), "12.35");
    assert_eq!(format_grams(1.005), "1.00");
}

#[test]
fn format_grams_pads_whole_numbers() {
    assert_eq!(format_grams(1000.0), "1000.00");
    assert_eq!(format_grams(0.0), "0.00");
    assert_eq!(format_grams(129.5), "129.50");
}

#[test]
fn format_grams_keeps_sign_for_negative_readings() {
    assert_eq!(format_grams(-3.5), "-3.50");
}

#[test]
fn format_reading_adds_label_and_unit() {
    assert_eq!(format_reading("Total", 12.345), "Total: 12.35g");
    assert_eq!(format_reading("Filament", 250.0), "Filament: 250.00g");
}
