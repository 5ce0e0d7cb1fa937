use super::*;

fn hms(hours: u64, minutes: u64, seconds: u64) -> Duration {
    Duration {
        days: 0,
        hours,
        minutes,
        seconds,
    }
}

#[test]
fn parses_minutes_seconds() {
    let ts: Timestamp = "4:05".parse().unwrap();
    assert_eq!(
        ts,
        Timestamp {
            hours: 0,
            minutes: 4,
            seconds: 5
        }
    );
}

#[test]
fn parses_hours_minutes_seconds_with_whitespace() {
    let ts: Timestamp = "  1:02:03\n".parse().unwrap();
    assert_eq!(
        ts,
        Timestamp {
            hours: 1,
            minutes: 2,
            seconds: 3
        }
    );
}

#[test]
fn rejects_malformed_timestamps() {
    assert_eq!("".parse::<Timestamp>(), Err(TimestampError::Empty));
    assert!(matches!(
        "42".parse::<Timestamp>(),
        Err(TimestampError::PartCount(_))
    ));
    assert!(matches!(
        "1:2:3:4".parse::<Timestamp>(),
        Err(TimestampError::PartCount(_))
    ));
    assert!(matches!(
        "LIVE:00".parse::<Timestamp>(),
        Err(TimestampError::NotNumeric { .. })
    ));
    assert!(matches!(
        "3:".parse::<Timestamp>(),
        Err(TimestampError::NotNumeric { .. })
    ));
    assert!(matches!(
        "-1:30".parse::<Timestamp>(),
        Err(TimestampError::NotNumeric { .. })
    ));
}

#[test]
fn aggregates_with_carry() {
    // 1:30 + 0:45 = 2:15, then 61 minutes carries into an hour.
    let total = aggregate_timestamps(["1:30", "0:45", "61:00"]);
    assert_eq!(total, hms(1, 3, 15));
}

#[test]
fn large_minute_component_stays_normalized() {
    let total = aggregate_timestamps(["150:00"]);
    assert_eq!(total, hms(2, 30, 0));
}

#[test]
fn hours_carry_into_days() {
    let total = aggregate_timestamps(["23:59:59", "0:01"]);
    assert_eq!(
        total,
        Duration {
            days: 1,
            hours: 0,
            minutes: 0,
            seconds: 0
        }
    );
}

#[test]
fn malformed_entries_are_skipped() {
    let total = aggregate_timestamps(["10:00", "LIVE", "", "abc:de", "5:00"]);
    assert_eq!(total, hms(0, 15, 0));
}

#[test]
fn empty_input_is_zero() {
    let total = aggregate_timestamps(Vec::<String>::new());
    assert!(total.is_zero());
}

#[test]
fn carry_and_floor_division_agree() {
    let stamps = ["59:59", "1:00:01", "12:34:56", "0:07", "23:00:00", "45:12"];
    let carried = aggregate_timestamps(stamps);

    let summed: u64 = stamps
        .iter()
        .map(|s| {
            let ts: Timestamp = s.parse().unwrap();
            ts.hours * 3600 + ts.minutes * 60 + ts.seconds
        })
        .sum();

    assert_eq!(carried, Duration::from_total_seconds(summed));
    assert_eq!(carried.total_seconds(), summed);
}

#[test]
fn from_total_seconds_splits_units() {
    assert_eq!(
        Duration::from_total_seconds(90_061),
        Duration {
            days: 1,
            hours: 1,
            minutes: 1,
            seconds: 1
        }
    );
}

#[test]
fn chunk_count_rounds_up() {
    assert_eq!(chunk_count(&hms(2, 0, 0), 30).unwrap(), 4);
    assert_eq!(chunk_count(&hms(2, 0, 1), 30).unwrap(), 5);
    assert_eq!(chunk_count(&Duration::ZERO, 30).unwrap(), 0);
}

#[test]
fn chunk_count_rejects_non_positive_sizes() {
    assert!(matches!(
        chunk_count(&hms(1, 0, 0), 0),
        Err(CoreError::InvalidChunkSize(0))
    ));
    assert!(matches!(
        chunk_count(&hms(1, 0, 0), -15),
        Err(CoreError::InvalidChunkSize(-15))
    ));
}

#[test]
fn chunk_count_rejects_unrepresentable_totals() {
    let huge = Duration {
        days: u64::MAX,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };
    assert_eq!(huge.checked_total_seconds(), None);
    assert_eq!(huge.total_seconds(), u64::MAX);
    assert!(matches!(
        chunk_count(&huge, 30),
        Err(CoreError::DurationOverflow)
    ));
    assert!(chunk_hints(&huge).is_empty());
}

#[test]
fn unnormalized_fields_still_total_correctly() {
    let raw = Duration {
        days: 0,
        hours: 30,
        minutes: 90,
        seconds: 0,
    };
    assert_eq!(raw.checked_total_seconds(), Some(30 * 3600 + 90 * 60));
}

#[test]
fn carry_saturates_instead_of_overflowing() {
    let mut total = Duration::ZERO;
    total.add_timestamp(Timestamp {
        hours: u64::MAX,
        minutes: u64::MAX,
        seconds: u64::MAX,
    });
    assert!(total.hours < 24 && total.minutes < 60 && total.seconds < 60);
    assert!(total.days > 0);
}

#[test]
fn long_format_handles_plurals() {
    assert_eq!(hms(0, 1, 1).to_string(), "1 minute, 1 second");
    assert_eq!(hms(2, 0, 5).to_string(), "2 hours, 0 minutes, 5 seconds");
    let with_day = Duration {
        days: 1,
        hours: 0,
        minutes: 3,
        seconds: 0,
    };
    assert_eq!(
        with_day.to_string(),
        "1 day, 0 hours, 3 minutes, 0 seconds"
    );
}

#[test]
fn compact_format_drops_leading_zero_units() {
    assert_eq!(hms(0, 0, 9).compact(), "9s");
    assert_eq!(hms(0, 4, 0).compact(), "4m 0s");
    assert_eq!(hms(1, 0, 0).compact(), "1h 0m 0s");
}

#[test]
fn chunk_hints_only_for_an_hour_or_more() {
    assert!(chunk_hints(&hms(0, 59, 59)).is_empty());
    assert_eq!(
        chunk_hints(&hms(1, 10, 0)),
        vec![
            ChunkHint {
                chunk_minutes: 15,
                chunks: 5
            },
            ChunkHint {
                chunk_minutes: 30,
                chunks: 3
            },
        ]
    );
}

#[test]
fn serializes_as_time_object() {
    let json = serde_json::to_value(hms(1, 2, 3)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"days": 0, "hours": 1, "minutes": 2, "seconds": 3})
    );
}

#[test]
fn chunk_message_pluralizes() {
    assert_eq!(chunk_message(1, 30), "You need 1 chunk of 30 minutes each.");
    assert_eq!(chunk_message(4, 30), "You need 4 chunks of 30 minutes each.");
}
