//! BDD step definitions for command dispatch feature

use std::sync::Arc;
use std::time::Duration;

use cucumber::{given, then, when};

use device_console::command::{
    CommandDispatcher, CommandError, CommandOutcome, CommandRequest, SimulatedTransport,
};
use device_console::config::Config;
use device_console::device::DeviceRegistry;
use device_console::state::new_state_handle;
use device_console::ConsoleError;

use crate::world::ConsoleWorld;

#[given(expr = "a console with a simulated transport delay of {int} ms")]
fn console_with_transport(world: &mut ConsoleWorld, delay_ms: u64) {
    let config = Config::default();
    let state = new_state_handle(
        DeviceRegistry::from_config(&config.devices, 1_000_000),
        &config.buffers,
    );
    let transport = Arc::new(SimulatedTransport::new(Duration::from_millis(delay_ms)));
    world.dispatcher = Some(Arc::new(CommandDispatcher::new(transport, &state)));
    world.state = Some(state);
}

fn submit(world: &mut ConsoleWorld, request: CommandRequest) {
    let dispatcher = world.dispatcher();
    world.dispatch_result = None;
    world.pending_dispatch = Some(tokio::spawn(async move {
        dispatcher.dispatch(&request).await
    }));
}

async fn settle(world: &mut ConsoleWorld) {
    if let Some(handle) = world.pending_dispatch.take() {
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("dispatch did not finish")
            .expect("dispatch task panicked");
        world.dispatch_result = Some(result);
    }
}

#[when("an empty command is submitted")]
fn submit_empty(world: &mut ConsoleWorld) {
    submit(world, CommandRequest::default());
}

#[when(expr = "the {string} command is submitted to {string}")]
fn submit_predefined(world: &mut ConsoleWorld, command: String, device: String) {
    submit(
        world,
        CommandRequest {
            device: Some(device),
            command: Some(command),
            custom: None,
        },
    );
}

#[when(expr = "the custom command {string} is submitted to {string}")]
fn submit_custom(world: &mut ConsoleWorld, text: String, device: String) {
    submit(world, CommandRequest::custom(&device, &text));
}

#[when("the send delay elapses")]
async fn send_delay_elapses(world: &mut ConsoleWorld) {
    settle(world).await;
}

#[then("a command is being sent")]
async fn command_is_sending(world: &mut ConsoleWorld) {
    let dispatcher = world.dispatcher();
    tokio::time::timeout(Duration::from_secs(1), async {
        while !dispatcher.is_sending() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("command never entered the sending state");
}

#[then("a second submission is rejected as busy")]
async fn second_submission_busy(world: &mut ConsoleWorld) {
    let result = world
        .dispatcher()
        .dispatch(&CommandRequest::custom("esp32-02", "{\"ping\": true}"))
        .await;
    assert!(matches!(
        result,
        Err(ConsoleError::Validation(CommandError::Busy))
    ));
}

#[then("no command is being sent")]
async fn command_not_sending(world: &mut ConsoleWorld) {
    settle(world).await;
    assert!(!world.dispatcher().is_sending());
}

#[then(expr = "the command is rejected with {string}")]
async fn command_rejected(world: &mut ConsoleWorld, message: String) {
    settle(world).await;
    match world.dispatch_result.as_ref().expect("nothing submitted") {
        Err(ConsoleError::Validation(reason)) => assert_eq!(reason.to_string(), message),
        other => panic!("Expected a validation error, got {:?}", other),
    }
}

#[then(regex = r"^the notice reads (.+)$")]
async fn notice_reads(world: &mut ConsoleWorld, expected: String) {
    settle(world).await;
    let receipt = world
        .dispatch_result
        .as_ref()
        .expect("nothing submitted")
        .as_ref()
        .expect("dispatch failed");
    assert_eq!(receipt.notice, expected);
}

#[then(expr = "the recent commands list {int} entry/entries")]
async fn recent_commands_count(world: &mut ConsoleWorld, expected: usize) {
    assert_eq!(world.state().read().await.commands.len(), expected);
}

#[then(expr = "the latest recent command is {string} to {string} with outcome {string}")]
async fn latest_recent_command(
    world: &mut ConsoleWorld,
    command: String,
    device: String,
    outcome: String,
) {
    let state = world.state();
    let s = state.read().await;
    let latest = s.commands.latest().expect("no commands recorded");
    assert_eq!(latest.command, command);
    assert_eq!(latest.device_id, device);
    let expected = match outcome.as_str() {
        "success" => CommandOutcome::Success,
        "timeout" => CommandOutcome::Timeout,
        other => panic!("Unknown outcome: {}", other),
    };
    assert_eq!(latest.outcome, expected);
}
