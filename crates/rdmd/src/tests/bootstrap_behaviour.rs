//! Behavioural tests for the server bootstrap sequence.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use super::support::{self, HealthEvent, TestWorld};

#[fixture]
fn world() -> RefCell<TestWorld> {
    support::world()
}

#[given("a healthy configuration loader")]
fn given_healthy_loader(world: &RefCell<TestWorld>) {
    world.borrow_mut().use_successful_loader();
}

#[given("a failing configuration loader")]
fn given_failing_loader(world: &RefCell<TestWorld>) {
    world.borrow_mut().use_failing_loader();
}

#[given("the catalog registers a command named {name}")]
fn given_catalog_command(world: &RefCell<TestWorld>, name: String) {
    world.borrow().test_loader.register_script(&name, "echo registered");
}

#[given("the catalog file is corrupt")]
fn given_corrupt_catalog(world: &RefCell<TestWorld>) {
    world.borrow().test_loader.corrupt_catalog();
}

#[when("the server bootstrap runs")]
fn when_bootstrap_runs(world: &RefCell<TestWorld>) {
    world.borrow_mut().bootstrap();
}

#[then("bootstrap succeeds")]
fn then_bootstrap_succeeds(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    assert!(
        world.bootstrap_error().is_none(),
        "bootstrap error: {:?}",
        world.bootstrap_error()
    );
    assert!(world.server().is_some(), "server should have been initialised");
}

#[then("bootstrap fails")]
fn then_bootstrap_fails(world: &RefCell<TestWorld>) {
    assert!(
        world.borrow().bootstrap_error().is_some(),
        "bootstrap succeeded unexpectedly"
    );
}

#[then("the catalog contains {name}")]
fn then_catalog_contains(world: &RefCell<TestWorld>, name: String) {
    let world = world.borrow();
    let server = world.server().expect("server missing");
    let entry = server.catalog().get(&name).expect("command missing from catalog");
    assert!(
        entry.executable_path.starts_with(world.test_loader.root()),
        "relative executable should resolve next to the catalog: {}",
        entry.executable_path
    );
}

#[then("the reporter recorded bootstrap start")]
fn then_reporter_start(world: &RefCell<TestWorld>) {
    assert!(
        world
            .borrow()
            .reporter
            .events()
            .contains(&HealthEvent::BootstrapStarting),
        "bootstrap start event missing"
    );
}

#[then("the reporter recorded bootstrap success")]
fn then_reporter_success(world: &RefCell<TestWorld>) {
    assert!(
        world
            .borrow()
            .reporter
            .events()
            .contains(&HealthEvent::BootstrapSucceeded),
        "bootstrap success event missing"
    );
}

#[then("the reporter recorded bootstrap failure")]
fn then_reporter_failure(world: &RefCell<TestWorld>) {
    let events = world.borrow().reporter.events();
    let failed = events
        .iter()
        .any(|event| matches!(event, HealthEvent::BootstrapFailed(_)));
    assert!(failed, "bootstrap failure event missing: {events:?}");
}

#[scenario(
    path = "tests/features/server_bootstrap.feature",
    name = "Bootstrap succeeds with a healthy configuration"
)]
fn bootstrap_succeeds(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/server_bootstrap.feature",
    name = "Bootstrap reports configuration failures"
)]
fn bootstrap_reports_configuration_failures(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/server_bootstrap.feature",
    name = "Bootstrap loads registered commands"
)]
fn bootstrap_loads_registered_commands(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/server_bootstrap.feature",
    name = "Bootstrap rejects an unreadable catalog"
)]
fn bootstrap_rejects_unreadable_catalog(world: RefCell<TestWorld>) {
    let _ = world;
}
