use nexus_core::{
    default_software, seed_defaults, Collection, RecordStore, SeedOutcome, Software, SqliteStore,
};

#[test]
fn seeding_empty_store_inserts_both_defaults() {
    let store = SqliteStore::open_in_memory().unwrap();

    assert_eq!(seed_defaults(&store), SeedOutcome::Seeded(2));

    let all = store.get_all::<Software>().unwrap();
    assert_eq!(all.len(), 2);

    let apex = &all[0];
    assert_eq!(apex.id, "1");
    assert_eq!(apex.name, "Apex Predator Toolkit");
    assert_eq!(
        apex.description,
        "Professional precision tools for elite competitive gaming. Optimized for modern CPUs."
    );
    assert_eq!(apex.download_url, "#");
    assert_eq!(
        apex.thumbnail,
        "https://images.unsplash.com/photo-1542751371-adc38448a05e?auto=format&fit=crop&q=80&w=800"
    );
    assert!(apex.is_licensed);
    assert_eq!(apex.expiry_days, 30);
    assert_eq!(apex.max_downloads, 5);
    assert!(apex.is_visible);

    let frame_gen = &all[1];
    assert_eq!(frame_gen.id, "2");
    assert_eq!(frame_gen.name, "Cyber Frame Gen 4");
    assert_eq!(
        frame_gen.description,
        "AI-driven frame generation and latency reduction for ultra-smooth visuals."
    );
    assert_eq!(frame_gen.download_url, "#");
    assert_eq!(
        frame_gen.thumbnail,
        "https://images.unsplash.com/photo-1550745165-9bc0b252726f?auto=format&fit=crop&q=80&w=800"
    );
    assert!(!frame_gen.is_licensed);
    assert_eq!(frame_gen.expiry_days, 0);
    assert_eq!(frame_gen.max_downloads, 0);
    assert!(frame_gen.is_visible);
}

#[test]
fn second_seed_changes_nothing() {
    let store = SqliteStore::open_in_memory().unwrap();

    seed_defaults(&store);
    assert_eq!(seed_defaults(&store), SeedOutcome::AlreadyPopulated(2));
    assert_eq!(store.get_all::<Software>().unwrap(), default_software());
}

#[test]
fn seed_skips_store_with_existing_software() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.put(&Software::new("custom", "Custom Tool")).unwrap();

    assert_eq!(seed_defaults(&store), SeedOutcome::AlreadyPopulated(1));
    assert_eq!(store.count(Collection::Software).unwrap(), 1);
    assert!(store.get_by_key::<Software>("1").unwrap().is_none());
}

#[test]
fn seed_failure_is_swallowed() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .connection()
        .execute_batch("DROP TABLE software;")
        .unwrap();

    assert_eq!(seed_defaults(&store), SeedOutcome::Failed);
}
