use study_planner::{
    Day, InMemoryStore, NewFixedEvent, NewTask, PersistenceError, SchedulerStore, Slot,
    SlotUpdate,
};

fn stores() -> Vec<(&'static str, Box<dyn SchedulerStore>)> {
    #[cfg_attr(not(feature = "sqlite"), allow(unused_mut))]
    let mut stores: Vec<(&'static str, Box<dyn SchedulerStore>)> =
        vec![("memory", Box::new(InMemoryStore::new()))];
    #[cfg(feature = "sqlite")]
    stores.push((
        "sqlite",
        Box::new(study_planner::SqliteStore::in_memory().unwrap()),
    ));
    stores
}

#[test]
fn created_entities_are_listed_per_user_in_creation_order() {
    for (label, store) in stores() {
        let class = store
            .create_fixed_event("alice", NewFixedEvent::new("Calculus", Day::Monday, "08:00", "10:00"))
            .unwrap();
        assert_eq!((class.start_hour, class.end_hour), (8, 10), "{label}");
        store
            .create_fixed_event("bob", NewFixedEvent::new("Physics", Day::Tuesday, "09:00", "11:00"))
            .unwrap();

        let first = store.create_task("alice", NewTask::new("Essay", 2)).unwrap();
        let second = store
            .create_task(
                "alice",
                NewTask::new("Reading", 1).with_slot(Some(Slot::new(Day::Friday, 13))),
            )
            .unwrap();
        assert!(second.id > first.id, "{label}");

        let snapshot = store.list("alice").unwrap();
        assert_eq!(snapshot.fixed_events.len(), 1, "{label}");
        assert_eq!(snapshot.fixed_events[0].name, "Calculus", "{label}");
        let names: Vec<&str> = snapshot.tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Essay", "Reading"], "{label}");
        assert_eq!(snapshot.tasks[0].assigned_slot, None, "{label}");
        assert_eq!(
            snapshot.tasks[1].assigned_slot,
            Some(Slot::new(Day::Friday, 13)),
            "{label}"
        );
    }
}

#[test]
fn invalid_fixed_events_are_rejected() {
    for (label, store) in stores() {
        for (start, end) in [("8:00", "10:00"), ("10:00", "09:00"), ("06:00", "08:00"), ("08:30", "09:00")] {
            let result =
                store.create_fixed_event("alice", NewFixedEvent::new("Bad", Day::Monday, start, end));
            assert!(
                matches!(result, Err(PersistenceError::InvalidData(_))),
                "{label}: {start}-{end} accepted"
            );
        }
        assert!(store.list("alice").unwrap().fixed_events.is_empty(), "{label}");
    }
}

#[test]
fn deleting_requires_ownership() {
    for (label, store) in stores() {
        let event = store
            .create_fixed_event("alice", NewFixedEvent::new("Lab", Day::Thursday, "13:00", "15:00"))
            .unwrap();
        let task = store.create_task("alice", NewTask::new("Notes", 1)).unwrap();

        assert!(
            matches!(
                store.delete_fixed_event("mallory", event.id),
                Err(PersistenceError::NotFound { .. })
            ),
            "{label}"
        );
        assert!(
            matches!(store.delete_task("mallory", task.id), Err(PersistenceError::NotFound { .. })),
            "{label}"
        );

        store.delete_fixed_event("alice", event.id).unwrap();
        store.delete_task("alice", task.id).unwrap();
        let snapshot = store.list("alice").unwrap();
        assert!(snapshot.fixed_events.is_empty() && snapshot.tasks.is_empty(), "{label}");
    }
}

#[test]
fn batch_reassign_is_all_or_nothing() {
    for (label, store) in stores() {
        let a = store.create_task("alice", NewTask::new("A", 1)).unwrap();
        let b = store.create_task("alice", NewTask::new("B", 2)).unwrap();
        let foreign = store.create_task("bob", NewTask::new("C", 1)).unwrap();

        let bad = vec![
            SlotUpdate { id: a.id, assigned_slot: Some(Slot::new(Day::Monday, 7)) },
            SlotUpdate { id: foreign.id, assigned_slot: Some(Slot::new(Day::Monday, 8)) },
        ];
        assert!(
            matches!(store.batch_reassign("alice", &bad), Err(PersistenceError::NotFound { .. })),
            "{label}"
        );
        let snapshot = store.list("alice").unwrap();
        assert!(snapshot.tasks.iter().all(|t| t.assigned_slot.is_none()), "{label}");

        let out_of_window = vec![SlotUpdate { id: b.id, assigned_slot: Some(Slot::new(Day::Monday, 22)) }];
        assert!(store.batch_reassign("alice", &out_of_window).is_err(), "{label}");

        let good = vec![
            SlotUpdate { id: a.id, assigned_slot: Some(Slot::new(Day::Monday, 7)) },
            SlotUpdate { id: b.id, assigned_slot: Some(Slot::new(Day::Monday, 8)) },
        ];
        store.batch_reassign("alice", &good).unwrap();
        let snapshot = store.list("alice").unwrap();
        assert_eq!(snapshot.tasks[0].assigned_slot, Some(Slot::new(Day::Monday, 7)), "{label}");
        assert_eq!(snapshot.tasks[1].assigned_slot, Some(Slot::new(Day::Monday, 8)), "{label}");

        let clear = vec![SlotUpdate { id: a.id, assigned_slot: None }];
        store.batch_reassign("alice", &clear).unwrap();
        assert_eq!(store.list("alice").unwrap().tasks[0].assigned_slot, None, "{label}");
    }
}

#[test]
fn reset_only_touches_the_given_user() {
    for (label, store) in stores() {
        store
            .create_fixed_event("alice", NewFixedEvent::new("Gym", Day::Saturday, "10:00", "12:00"))
            .unwrap();
        store.create_task("alice", NewTask::new("Review", 1)).unwrap();
        store.create_task("bob", NewTask::new("Review", 1)).unwrap();

        store.reset("alice").unwrap();

        let alice = store.list("alice").unwrap();
        assert!(alice.fixed_events.is_empty() && alice.tasks.is_empty(), "{label}");
        assert_eq!(store.list("bob").unwrap().tasks.len(), 1, "{label}");
    }
}

#[test]
fn create_tasks_rejects_the_whole_batch_on_invalid_entry() {
    for (label, store) in stores() {
        let batch = vec![NewTask::new("Fine", 1), NewTask::new("Too long", 17)];
        assert!(store.create_tasks("alice", batch).is_err(), "{label}");
        assert!(store.list("alice").unwrap().tasks.is_empty(), "{label}");
    }
}

#[test]
fn replace_all_swaps_one_users_data() {
    for (label, store) in stores() {
        store.create_task("alice", NewTask::new("Old", 1)).unwrap();
        store.create_task("bob", NewTask::new("Bob's", 1)).unwrap();

        let replaced = store
            .replace_all(
                "alice",
                vec![NewFixedEvent::new("Lab", Day::Wednesday, "13:00", "15:00")],
                vec![
                    NewTask::new("First", 2).with_slot(Some(Slot::new(Day::Monday, 7))),
                    NewTask::new("Second", 1),
                ],
            )
            .unwrap();
        assert_eq!(replaced, store.list("alice").unwrap(), "{label}");
        let names: Vec<&str> = replaced.tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"], "{label}");
        assert_eq!(store.list("bob").unwrap().tasks.len(), 1, "{label}");
    }
}

#[test]
fn replace_all_rejects_invalid_task_without_writing() {
    for (label, store) in stores() {
        store.create_task("alice", NewTask::new("Old", 1)).unwrap();

        let result = store.replace_all(
            "alice",
            Vec::new(),
            vec![NewTask::new("Fine", 1), NewTask::new("Too long", 20)],
        );
        assert!(matches!(result, Err(PersistenceError::InvalidData(_))), "{label}");
        assert_eq!(store.list("alice").unwrap().tasks[0].name, "Old", "{label}");
    }
}
