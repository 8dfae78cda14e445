use pretty_assertions::assert_eq;
use proptest::prelude::*;
use slb_catalog::{FilterKind, FilterTable, ServiceCatalog, ServiceKey, SnapshotStore};
use slb_plan::{Action, ActionPlan, PlanBuilder, PlanOutcome, RenameTarget, DISABLED_START_VALUE};
use slb_resolve::DisableSet;
use slb_test_utils::{kernel_driver, user_service, StoreBuilder};
use std::collections::{BTreeMap, BTreeSet};

/// Observable state a plan mutates
#[derive(Debug, Clone, PartialEq, Eq)]
struct Machine {
    starts: BTreeMap<String, u32>,
    filters: BTreeMap<(String, FilterKind), Vec<String>>,
    files: BTreeSet<String>,
}

impl Machine {
    fn observe(catalog: &ServiceCatalog, filters: &FilterTable, files: &[&str]) -> Self {
        Self {
            starts: catalog
                .iter()
                .filter_map(|r| r.start.map(|s| (r.name.clone(), s)))
                .collect(),
            filters: filters
                .entries()
                .iter()
                .map(|e| ((e.class_id.clone(), e.kind), e.drivers.clone()))
                .collect(),
            files: files.iter().map(|f| f.to_lowercase()).collect(),
        }
    }

    fn apply(&mut self, action: &Action) {
        match action {
            Action::SetStartValue { service, value } => {
                self.starts.insert(service.clone(), *value);
            }
            Action::SetFilterList {
                class_id,
                kind,
                drivers,
            } => {
                self.filters.insert((class_id.clone(), *kind), drivers.clone());
            }
            Action::KillProcess { .. } => {}
            Action::Rename { from, to } => {
                let from = format!("c:{from}").to_lowercase();
                let dir = from.rsplit_once('\\').map_or("", |(dir, _)| dir).to_string();
                if self.files.remove(&from) {
                    self.files.insert(format!("{dir}\\{}", to.to_lowercase()));
                }
            }
        }
    }

    fn run<'a>(&mut self, actions: impl IntoIterator<Item = &'a Action>) {
        for action in actions {
            self.apply(action);
        }
    }
}

const FILES: [&str; 2] = [r"C:\Windows\System32\mobsync.exe", r"C:\Windows\System32\wuaueng.dll"];

fn fixture() -> (SnapshotStore, Vec<RenameTarget>) {
    let mut builder = StoreBuilder::new()
        .service(user_service("WSearch").start(2))
        .service(user_service("Spooler").start(2))
        .service(user_service("Fax"))
        .service(kernel_driver("Beep").start(1))
        .service(kernel_driver("Ksthunk").start(3))
        .filter("{class-a}", FilterKind::Lower, &["Beep", "partmgr", "Ksthunk"])
        .filter("{class-a}", FilterKind::Upper, &["ksthunk"])
        .filter("{class-b}", FilterKind::Upper, &["other"]);
    for file in FILES {
        builder = builder.bare_file(file);
    }

    let renames = vec![
        RenameTarget::new(r"\Windows\System32\mobsync.exe"),
        RenameTarget::new(r"\Windows\System32\wuaueng.dll"),
        RenameTarget::new(r"\Windows\System32\absent.exe"),
    ];
    (builder.build(), renames)
}

fn disable(names: &[&str]) -> DisableSet {
    DisableSet::from_keys(names.iter().map(|n| ServiceKey::new(n)))
}

fn plan_for(store: &SnapshotStore, disable_set: &DisableSet, renames: &[RenameTarget]) -> ActionPlan {
    let catalog = StoreBuilder::catalog_of(store);
    let filters = FilterTable::load(store).unwrap();
    PlanBuilder::new(&catalog, &filters, store)
        .build(disable_set, renames)
        .into_plan()
        .expect("plan has actions")
}

#[test]
fn building_twice_is_identical() {
    let (store, renames) = fixture();
    let set = disable(&["wsearch", "fax", "beep", "ksthunk"]);

    assert_eq!(plan_for(&store, &set, &renames), plan_for(&store, &set, &renames));
}

#[test]
fn rollback_restores_every_value() {
    let (store, renames) = fixture();
    let catalog = StoreBuilder::catalog_of(&store);
    let filters = FilterTable::load(&store).unwrap();
    let plan = plan_for(&store, &disable(&["wsearch", "fax", "beep", "ksthunk"]), &renames);

    let before = Machine::observe(&catalog, &filters, &FILES);
    let mut machine = before.clone();

    machine.run(plan.forward());
    assert_eq!(machine.starts["WSearch"], DISABLED_START_VALUE);
    assert_eq!(machine.starts["Beep"], DISABLED_START_VALUE);
    assert_eq!(machine.starts["Spooler"], 2);
    assert_eq!(
        machine.filters[&("{class-a}".to_string(), FilterKind::Lower)],
        vec!["partmgr".to_string()]
    );
    assert!(machine.files.contains(r"c:\windows\system32\mobsync.exee"));
    assert_ne!(machine, before);

    machine.run(plan.rollback());
    assert_eq!(machine, before);
}

#[test]
fn rollback_order_does_not_matter() {
    let (store, renames) = fixture();
    let catalog = StoreBuilder::catalog_of(&store);
    let filters = FilterTable::load(&store).unwrap();
    let plan = plan_for(&store, &disable(&["wsearch", "ksthunk"]), &renames);

    let before = Machine::observe(&catalog, &filters, &FILES);
    let mut machine = before.clone();
    machine.run(plan.forward());
    machine.run(plan.rollback().iter().rev());

    assert_eq!(machine, before);
}

#[test]
fn applied_configuration_is_noop() {
    let store = StoreBuilder::new()
        .service(user_service("Fax"))
        .filter("{class}", FilterKind::Lower, &["partmgr"])
        .build();
    let catalog = StoreBuilder::catalog_of(&store);
    let filters = FilterTable::load(&store).unwrap();

    let outcome = PlanBuilder::new(&catalog, &filters, &store)
        .build(&disable(&["fax"]), &[RenameTarget::new(r"\Windows\gone.exe")]);

    assert_eq!(outcome, PlanOutcome::NoOp);
}

#[test]
fn already_disabled_services_are_skipped() {
    let store = StoreBuilder::new()
        .service(user_service("Fax").start(DISABLED_START_VALUE))
        .service(kernel_driver("Beep").start(DISABLED_START_VALUE))
        .build();
    let catalog = StoreBuilder::catalog_of(&store);
    let filters = FilterTable::load(&store).unwrap();
    let builder = PlanBuilder::new(&catalog, &filters, &store);

    assert_eq!(builder.build(&disable(&["fax", "beep"]), &[]), PlanOutcome::NoOp);

    let store = StoreBuilder::new()
        .service(user_service("Fax").start(DISABLED_START_VALUE))
        .service(user_service("Spooler").start(2))
        .build();
    let plan = plan_for(&store, &disable(&["fax", "spooler"]), &[]);

    assert_eq!(
        plan.forward(),
        &[Action::SetStartValue {
            service: "Spooler".into(),
            value: DISABLED_START_VALUE
        }]
    );
}

fn arb_store() -> impl Strategy<Value = (SnapshotStore, Vec<String>)> {
    let services = proptest::collection::vec((any::<bool>(), proptest::option::of(0..5u32)), 1..12);
    let filters = proptest::collection::vec(proptest::collection::vec(0..14usize, 0..5), 0..6);

    (services, filters).prop_map(|(services, filters)| {
        let names: Vec<String> = (0..services.len()).map(|i| format!("Svc{i}")).collect();
        let mut builder = StoreBuilder::new();

        for (name, (user, start)) in names.iter().zip(&services) {
            let mut fixture = if *user { user_service(name) } else { kernel_driver(name) };
            if let Some(start) = start {
                fixture = fixture.start(*start);
            }
            builder = builder.service(fixture);
        }

        for (i, drivers) in filters.iter().enumerate() {
            // indices past the service list name drivers that aren't installed
            let drivers: Vec<String> = drivers.iter().map(|d| format!("svc{d}")).collect();
            let drivers: Vec<&str> = drivers.iter().map(String::as_str).collect();
            let kind = if i % 2 == 0 { FilterKind::Lower } else { FilterKind::Upper };
            builder = builder.filter(&format!("{{class-{}}}", i / 2), kind, &drivers);
        }

        (builder.build(), names)
    })
}

proptest! {
    #[test]
    fn prop_plan_is_deterministic_and_reversible(
        (store, names) in arb_store(),
        picks in proptest::collection::btree_set(0..12usize, 0..8)
    ) {
        let catalog = StoreBuilder::catalog_of(&store);
        let filters = FilterTable::load(&store).unwrap();
        let set = DisableSet::from_keys(
            picks.iter().filter_map(|i| names.get(*i)).map(|n| ServiceKey::new(n)),
        );

        let builder = PlanBuilder::new(&catalog, &filters, &store);
        let first = builder.build(&set, &[]);
        prop_assert_eq!(&first, &builder.build(&set, &[]));

        let PlanOutcome::Ready(plan) = first else {
            return Ok(());
        };
        prop_assert_eq!(plan.forward().len(), plan.rollback().len());

        let before = Machine::observe(&catalog, &filters, &[]);
        let mut machine = before.clone();
        machine.run(plan.forward());

        for drivers in machine.filters.values() {
            for driver in drivers {
                prop_assert!(!set.contains(&ServiceKey::new(driver)));
            }
        }

        machine.run(plan.rollback());
        prop_assert_eq!(machine, before);
    }
}
