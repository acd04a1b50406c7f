use chrono::Weekday;
use proptest::prelude::*;
use study_planner::Day;
use study_planner::grid::{
    days_in_order, format_hour, hours_in_order, intervals_overlap, parse_hour,
};

#[test]
fn days_run_monday_to_sunday() {
    let days = days_in_order();
    assert_eq!(days[0], Day::Monday);
    assert_eq!(days[6], Day::Sunday);
    assert!(days.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn hour_23_is_never_a_start() {
    let hours: Vec<u8> = hours_in_order().collect();
    assert_eq!(hours, (7..=22).collect::<Vec<u8>>());
    assert!(!hours.contains(&23));
}

#[test]
fn touching_intervals_do_not_overlap() {
    assert!(!intervals_overlap(7, 2, 9, 1));
    assert!(!intervals_overlap(9, 1, 7, 2));
    assert!(intervals_overlap(7, 3, 9, 1));
    assert!(intervals_overlap(10, 1, 8, 4));
}

#[test]
fn day_labels_parse_and_map_to_weekday() {
    assert_eq!("monday".parse::<Day>().unwrap(), Day::Monday);
    assert_eq!(" Sunday ".parse::<Day>().unwrap(), Day::Sunday);
    assert!("Funday".parse::<Day>().is_err());
    assert_eq!(Weekday::from(Day::Wednesday), Weekday::Wed);
    assert_eq!(Day::from(Weekday::Sat), Day::Saturday);
}

#[test]
fn day_serializes_as_label() {
    assert_eq!(serde_json::to_string(&Day::Friday).unwrap(), "\"Friday\"");
}

#[test]
fn hours_format_zero_padded() {
    assert_eq!(format_hour(8), "08:00");
    assert_eq!(parse_hour("08:00").unwrap(), 8);
    assert!(parse_hour("8:00").is_err());
}

proptest! {
    #[test]
    fn prop_disjoint_intervals_never_overlap(s1 in 0u8..40, d1 in 1u8..10, gap in 0u8..10, d2 in 1u8..10) {
        let s2 = s1 + d1 + gap;
        prop_assert!(!intervals_overlap(s1, d1, s2, d2));
        prop_assert!(!intervals_overlap(s2, d2, s1, d1));
    }

    #[test]
    fn prop_intersecting_intervals_overlap(s1 in 0u8..40, d1 in 1u8..10, offset in 0u8..10, d2 in 1u8..10) {
        // s2 lies inside [s1, s1 + d1), so the intersection is non-empty.
        let s2 = s1 + offset % d1;
        prop_assert!(intervals_overlap(s1, d1, s2, d2));
        prop_assert!(intervals_overlap(s2, d2, s1, d1));
    }
}
