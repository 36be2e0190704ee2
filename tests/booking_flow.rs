use std::sync::Arc;

use chrono::NaiveDate;
use ulid::Ulid;

use courtside::clock::FixedClock;
use courtside::config::parse_catalog;
use courtside::engine::{BookingError, Engine};
use courtside::model::*;
use courtside::notify::NotifyHub;
use courtside::sweeper;

// ── Test infrastructure ──────────────────────────────────────

const CATALOG: &str = r#"{
    "facility_types": [
        { "name": "Basketball Court", "sport": "Basketball", "price_per_hour": 30,
          "facilities": [{ "name": "SF-001" }, { "name": "SF-002" },
                         { "name": "SF-004", "status": "UnderMaintenance" }] },
        { "name": "Badminton Court", "sport": "Badminton", "price_per_hour": 20,
          "facilities": [{ "name": "SF-101" }] }
    ],
    "equipment_types": [
        { "code": "ET-001", "name": "Basketball Brand A", "short_name": "BASKA",
          "sport": "Basketball", "price": 15, "category": "Borrowable", "units": 4 },
        { "code": "ET-005", "name": "Badminton Racket", "short_name": "BRACK",
          "sport": "Badminton", "price": 10, "category": "Borrowable", "units": 2 },
        { "code": "ET-007", "name": "Badminton Shuttlecock (6 pcs)", "short_name": "BBALL6",
          "sport": "Badminton", "price": 35, "category": "Sellable" }
    ]
}"#;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, d).unwrap()
}

fn start_engine() -> (Arc<Engine>, Arc<FixedClock>) {
    let catalog = parse_catalog(CATALOG).unwrap();
    let clock = Arc::new(FixedClock::new(day(1), 8));
    let engine = Arc::new(Engine::new(Arc::new(catalog), clock.clone(), Arc::new(NotifyHub::new())));
    (engine, clock)
}

fn facility(engine: &Engine, name: &str) -> Ulid {
    engine.catalog.facility_by_name(name).unwrap().id
}

fn equipment_type(engine: &Engine, code: &str) -> Ulid {
    engine.catalog.equipment_type_by_code(code).unwrap().id
}

// ── Flows ────────────────────────────────────────────────────

#[tokio::test]
async fn book_pay_play_and_end() {
    let (engine, clock) = start_engine();
    let user = Ulid::new();
    let court = facility(&engine, "SF-101");
    let rackets = equipment_type(&engine, "ET-005");
    let shuttles = equipment_type(&engine, "ET-007");

    let mut rx = engine.notify.subscribe(user);

    let slots = engine
        .available_slots(Resource::Facility(court), day(2))
        .await
        .unwrap();
    assert_eq!(slots, vec![HourSpan::new(9, 21)]);

    let court_booking = engine.book_facility(user, court, day(2), 18, 20).await.unwrap();
    let racket_loan = engine
        .borrow_equipment(user, rackets, 2, day(2), 18, 20)
        .await
        .unwrap();
    let purchase = engine
        .buy_equipment(user, shuttles, 1, day(2), 18, 19)
        .await
        .unwrap();

    // 2h × 20 + 2 rackets × 10 + 1 tube × 35
    assert_eq!(engine.pending_total(user).await, 95.0);
    let paid = engine.confirm_pending(user).await;
    assert_eq!(paid.len(), 3);

    // Both rackets are out, so a second player gets nothing for that window.
    let other = engine
        .borrow_equipment(Ulid::new(), rackets, 1, day(2), 19, 20)
        .await;
    assert_eq!(
        other,
        Err(BookingError::InsufficientUnits {
            requested: 1,
            available: 0
        })
    );

    clock.set(day(2), 20);
    let report = sweeper::sweep_once(&engine).await;
    assert_eq!(report.facility, vec![court_booking]);
    let mut ended = report.equipment.clone();
    ended.sort();
    let mut expected = vec![racket_loan, purchase];
    expected.sort();
    assert_eq!(ended, expected);

    let history = engine.user_bookings(user, Some(BookingStatus::Ended)).await;
    assert_eq!(history.facility.len(), 1);
    assert_eq!(history.equipment.len(), 2);

    let mut created = 0;
    let mut ended_events = 0;
    while let Ok(event) = rx.try_recv() {
        match event {
            Event::BookingCreated { .. } => created += 1,
            Event::BookingEnded { .. } => ended_events += 1,
            _ => {}
        }
    }
    assert_eq!(created, 3);
    assert_eq!(ended_events, 3);
}

#[tokio::test]
async fn maintenance_court_is_hidden_and_unbookable() {
    let (engine, _clock) = start_engine();
    let closed = facility(&engine, "SF-004");

    let open: Vec<String> = engine
        .available_facilities()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(open, vec!["SF-001", "SF-002", "SF-101"]);

    assert_eq!(
        engine.book_facility(Ulid::new(), closed, day(2), 9, 10).await,
        Err(BookingError::ResourceUnavailable(closed))
    );
}

#[tokio::test]
async fn concurrent_borrowers_never_share_units() {
    let (engine, _clock) = start_engine();
    let balls = equipment_type(&engine, "ET-001");

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .borrow_equipment(Ulid::new(), balls, 1, day(3), 10, 12)
                .await
        }));
    }

    let mut granted = Vec::new();
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(id) => granted.push(id),
            Err(BookingError::InsufficientUnits { .. }) => refused += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(granted.len(), 4);
    assert_eq!(refused, 4);

    let mut units = Vec::new();
    for id in granted {
        units.extend(engine.equipment_booking(id).await.unwrap().units);
    }
    units.sort();
    units.dedup();
    assert_eq!(units.len(), 4);
}

#[tokio::test]
async fn concurrent_facility_requests_book_once() {
    let (engine, _clock) = start_engine();
    let court = facility(&engine, "SF-001");

    let mut handles = Vec::new();
    for _ in 0..6 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine.book_facility(Ulid::new(), court, day(4), 14, 16).await
        }));
    }
    let mut ok = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            ok += 1;
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(
        engine.facility_bookings_on(court, day(4)).await.unwrap().len(),
        1
    );
}
