use std::sync::Arc;

use campus_allocation_engine::{
    AllocationEngine, Clock as _, ManualClock, Occupancy, Outcome, PoolSizes, Priority, RequestId,
    ResourceKind, StudentRequest, StudentStatus,
};
use chrono::{Duration, TimeZone as _, Utc};

fn single_pc_engine() -> (AllocationEngine, ManualClock) {
    let clock = ManualClock::starting_at(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
    let engine = AllocationEngine::with_clock(
        PoolSizes {
            pc: 1,
            book: 50,
            seat: 30,
        },
        Arc::new(clock.clone()),
    );
    (engine, clock)
}

fn submit(engine: &mut AllocationEngine, id: &str, priority: u8) -> Outcome {
    engine
        .submit_request(
            StudentRequest::new(format!("Student {id}"), id, ResourceKind::Pc)
                .with_priority(Priority::new(priority).unwrap()),
        )
        .unwrap()
}

fn queued_ids(engine: &AllocationEngine, kind: ResourceKind) -> Vec<String> {
    engine
        .queue(kind)
        .iter()
        .map(|id| engine.student(id).unwrap().student_id)
        .collect()
}

/// X takes the only pc, Y waits behind it, Z preempts X.
fn scenario_a(engine: &mut AllocationEngine, clock: &ManualClock) -> [RequestId; 3] {
    let x = submit(engine, "X", 2);
    assert_eq!(x.resource_id(), Some("PC-01"));
    clock.advance(Duration::seconds(1));

    let y = submit(engine, "Y", 2);
    assert!(matches!(y, Outcome::Queued { queue_type: ResourceKind::Pc, .. }));
    clock.advance(Duration::seconds(1));

    let z = submit(engine, "Z", 1);
    assert_eq!(z.resource_id(), Some("PC-01"));

    [x.student().request_id, y.student().request_id, z.student().request_id]
}

#[test]
fn higher_priority_request_preempts_and_requeues_holder() {
    let (mut engine, clock) = single_pc_engine();
    let [x, _, z] = scenario_a(&mut engine, &clock);

    assert_eq!(engine.preemption_count(), 1);
    assert_eq!(queued_ids(&engine, ResourceKind::Pc), vec!["X", "Y"]);
    assert!(engine.queue(ResourceKind::Pc).is_ordered());
    assert_eq!(engine.student(x).unwrap().status, StudentStatus::Completed);
    assert_eq!(engine.student(z).unwrap().status, StudentStatus::Allocated);
    assert!(engine.ledger_matches_occupancy());
}

#[test]
fn release_hands_unit_to_queue_head() {
    let (mut engine, clock) = single_pc_engine();
    let [x, _, z] = scenario_a(&mut engine, &clock);

    assert!(engine.release_resource("PC-01"));

    let pc = engine.resource("PC-01").unwrap();
    assert_eq!(pc.status, Occupancy::Allocated);
    assert_eq!(pc.allocated_to.unwrap().request_id, x);
    assert_eq!(engine.student(x).unwrap().status, StudentStatus::Allocated);
    assert_eq!(engine.student(z).unwrap().status, StudentStatus::Completed);
    assert_eq!(queued_ids(&engine, ResourceKind::Pc), vec!["Y"]);
    assert!(engine.ledger_matches_occupancy());
}

#[test]
fn dashboard_after_preemption() {
    let (mut engine, clock) = single_pc_engine();
    scenario_a(&mut engine, &clock);

    let snapshot = engine.dashboard_snapshot();
    assert_eq!(snapshot.available_by_type[&ResourceKind::Pc], 0);
    assert_eq!(snapshot.allocated_by_type[&ResourceKind::Pc], 1);
    assert_eq!(snapshot.queue_length_by_type[&ResourceKind::Pc], 2);
    assert_eq!(snapshot.queue_length_by_type[&ResourceKind::Book], 0);
    assert_eq!(snapshot.available_by_type[&ResourceKind::Book], 50);
    assert_eq!(snapshot.preemption_count, 1);
    assert_eq!(snapshot.total_allocated, 1);
    assert_eq!(snapshot.total_students, 3);
}

#[test]
fn worse_or_equal_priority_is_queued_not_preempting() {
    let (mut engine, _) = single_pc_engine();
    submit(&mut engine, "holder", 2);
    assert!(!submit(&mut engine, "equal", 2).is_allocated());
    assert!(!submit(&mut engine, "worse", 5).is_allocated());
    assert_eq!(engine.preemption_count(), 0);
    assert_eq!(queued_ids(&engine, ResourceKind::Pc), vec!["equal", "worse"]);
}

#[test]
fn releasing_twice_is_reported_and_harmless() {
    let (mut engine, _) = single_pc_engine();
    submit(&mut engine, "only", 2);
    assert!(engine.release_resource("PC-01"));
    let before = engine.dashboard_snapshot();
    assert!(!engine.release_resource("PC-01"));
    assert!(!engine.release_resource("nonsense"));
    assert_eq!(engine.dashboard_snapshot(), before);
    assert!(engine.ledger().is_empty());
}

#[test]
fn allocation_listing_reflects_grant_until_release() {
    let (mut engine, clock) = single_pc_engine();
    let granted_at = clock.now();
    let outcome = engine
        .submit_request(
            StudentRequest::new("Lina Nair", "1012", ResourceKind::Book)
                .with_priority(Priority::new(3).unwrap())
                .with_duration(55),
        )
        .unwrap();
    assert_eq!(outcome.resource_id(), Some("Book-001"));

    clock.advance(Duration::minutes(20));
    let rows = engine.allocation_listing();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.resource_id, "Book-001");
    assert_eq!(row.resource_type, ResourceKind::Book);
    assert_eq!(row.resource_name, "Book-001");
    assert_eq!(row.student_name, "Lina Nair");
    assert_eq!(row.student_id, "1012");
    assert_eq!(row.priority.get(), 3);
    assert_eq!(row.time_required, 55);
    // never counted down
    assert_eq!(row.remaining_time, 55);
    assert_eq!(row.allocation_time, granted_at);

    assert!(engine.release_resource("Book-001"));
    assert!(engine.allocation_listing().is_empty());
}

#[test]
fn duplicate_external_ids_are_independent_requests() {
    let (mut engine, _) = single_pc_engine();
    let first = submit(&mut engine, "1001", 2);
    let second = submit(&mut engine, "1001", 2);
    assert_ne!(first.student().request_id, second.student().request_id);
    assert_eq!(engine.dashboard_snapshot().total_students, 2);

    assert!(engine.release_resource("PC-01"));
    let pc = engine.resource("PC-01").unwrap();
    assert_eq!(pc.allocated_to.unwrap().request_id, second.student().request_id);
    assert!(engine.ledger_matches_occupancy());
}

#[test]
fn ledger_stays_consistent_through_mixed_traffic() {
    let clock = ManualClock::starting_at(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
    let mut engine = AllocationEngine::with_clock(
        PoolSizes {
            pc: 2,
            book: 1,
            seat: 1,
        },
        Arc::new(clock.clone()),
    );
    let kinds = [ResourceKind::Pc, ResourceKind::Book, ResourceKind::Seat];
    for step in 0_u8..60 {
        let kind = kinds[usize::from(step) % kinds.len()];
        let priority = Priority::new(step % 5 + 1).unwrap();
        engine
            .submit_request(
                StudentRequest::new(format!("s{step}"), format!("{step}"), kind)
                    .with_priority(priority),
            )
            .unwrap();
        if step % 4 == 3 {
            let held = engine.allocation_listing();
            if let Some(row) = held.get(usize::from(step) % held.len().max(1)) {
                assert!(engine.release_resource(&row.resource_id));
            }
        }
        clock.advance(Duration::seconds(30));

        assert!(engine.ledger_matches_occupancy());
        for kind in kinds {
            assert!(engine.queue(kind).is_ordered());
        }
        let snapshot = engine.dashboard_snapshot();
        assert_eq!(snapshot.total_allocated, engine.ledger().len());
    }
}
