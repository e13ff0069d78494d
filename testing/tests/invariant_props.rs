//! Property tests: capacity and uniqueness hold for any sequence of calls.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use proptest::prelude::*;
use std::collections::HashSet;
use travel_agency_core::{AgencyError, ClientId, Resource, TripId};
use travel_agency_testing::{fixtures, in_memory_agency, InMemoryAgencyStore};

#[derive(Clone, Debug)]
enum Op {
    Register { client: i32, trip: i32 },
    Unregister { client: i32, trip: i32 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1..=6i32, 1..=3i32).prop_map(|(client, trip)| Op::Register { client, trip }),
        (1..=6i32, 1..=3i32).prop_map(|(client, trip)| Op::Unregister { client, trip }),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime")
}

proptest! {
    #[test]
    fn capacity_and_uniqueness_hold(
        capacities in proptest::collection::vec(1..=4i32, 3),
        ops in proptest::collection::vec(op_strategy(), 0..60),
    ) {
        let store = (1..=6).fold(
            (1..=3).fold(InMemoryAgencyStore::new(), |store, trip| {
                store.with_trip(fixtures::trip(trip, capacities[(trip - 1) as usize]), &[])
            }),
            |store, client| store.with_client(ClientId::new(client), fixtures::client("p")),
        );
        let engine = in_memory_agency(&store).engine;

        // Reference model: the set of registered pairs.
        let mut model: HashSet<(i32, i32)> = HashSet::new();

        runtime().block_on(async {
            for op in ops {
                match op {
                    Op::Register { client, trip } => {
                        let result = engine.register(ClientId::new(client), TripId::new(trip)).await;
                        let count = model.iter().filter(|(_, t)| *t == trip).count();
                        let full = count >= capacities[(trip - 1) as usize] as usize;
                        match result {
                            Ok(_) => {
                                prop_assert!(!full);
                                prop_assert!(model.insert((client, trip)));
                            }
                            Err(AgencyError::CapacityExceeded) => prop_assert!(full),
                            Err(AgencyError::Conflict) => {
                                prop_assert!(!full);
                                prop_assert!(model.contains(&(client, trip)));
                            }
                            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
                        }
                    }
                    Op::Unregister { client, trip } => {
                        let result = engine.unregister(ClientId::new(client), TripId::new(trip)).await;
                        if model.remove(&(client, trip)) {
                            prop_assert!(result.is_ok());
                        } else {
                            prop_assert_eq!(result, Err(AgencyError::NotFound(Resource::Registration)));
                        }
                    }
                }
            }
            Ok(())
        })?;

        for trip in 1..=3 {
            let max = capacities[(trip - 1) as usize] as usize;
            prop_assert!(store.peak_registrations(TripId::new(trip)) <= max);
            prop_assert_eq!(
                store.registration_count(TripId::new(trip)),
                model.iter().filter(|(_, t)| *t == trip).count()
            );
        }
    }
}
