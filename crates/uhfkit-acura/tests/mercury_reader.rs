mod common;

use common::{EventLog, mercury};
use std::error::Error as _;
use uhfkit_acura::AcuraReader;
use uhfkit_acura::mercury::{Region, TagProtocol};
use uhfkit_core::{
    ConnectionOptions, ConnectionStatus, Error, FrequencyRegion, KillPassword, ReaderEvent, TagId,
};
use uhfkit_hardware::{Dispatcher, Platform, RfidReader};

fn reader(name: &str) -> (AcuraReader<common::FakeFactory>, common::MercuryControl) {
    let (factory, control) = mercury();
    let reader = AcuraReader::with_platform(
        factory,
        Dispatcher::new(name).unwrap(),
        Platform::from_names("linux", "x86_64"),
    );
    (reader, control)
}

fn options() -> ConnectionOptions {
    ConnectionOptions::serial("ttyUSB0")
}

#[test]
fn test_connect_builds_uri() {
    let (mut reader, control) = reader("acura-uri");
    assert!(reader.connect(&options()).unwrap());
    assert_eq!(control.state().uris, vec!["tmr:///dev/ttyUSB0"]);
    assert!(reader.is_connected());
}

#[test]
fn test_connect_requires_serial_port() {
    let (mut reader, control) = reader("acura-no-port");
    assert!(matches!(
        reader.connect(&ConnectionOptions::default()),
        Err(Error::Configuration { .. })
    ));
    assert!(control.state().uris.is_empty());
}

#[test]
fn test_failed_open_is_a_connection_error() {
    let (mut reader, control) = reader("acura-open-fails");
    control.state().fail_connect = true;

    let err = reader.connect(&options()).unwrap_err();
    assert!(matches!(err, Error::Connection { .. }));
    assert_eq!(
        err.source().unwrap().to_string(),
        "reader status 0x0101: no response from module"
    );
    assert_eq!(control.state().destroyed, 1);
    assert!(!reader.is_connected());
}

#[test]
fn test_connect_twice_fails() {
    let (mut reader, _control) = reader("acura-twice");
    reader.connect(&options()).unwrap();
    assert!(matches!(reader.connect(&options()), Err(Error::AlreadyConnected)));
}

#[test]
fn test_disconnect_requires_connection() {
    let (mut reader, control) = reader("acura-disconnect");
    assert!(matches!(reader.disconnect(), Err(Error::NotConnected)));

    reader.connect(&options()).unwrap();
    reader.start_inventory().unwrap();
    reader.disconnect().unwrap();

    assert!(!reader.is_reading());
    assert!(!control.state().reading);
    assert_eq!(control.state().destroyed, 1);
    assert!(matches!(reader.disconnect(), Err(Error::NotConnected)));
}

#[test]
fn test_read_plan_covers_connected_antennas() {
    let (mut reader, control) = reader("acura-plan");
    control.state().antennas = vec![1, 3, 4];
    reader.connect(&options()).unwrap();
    reader.start_inventory().unwrap();

    let plan = control.state().plan.clone().unwrap();
    assert_eq!(plan.antennas, vec![1, 3, 4]);
    assert_eq!(plan.protocol, TagProtocol::Gen2);
    assert_eq!(plan.weight, 1_000);
}

#[test]
fn test_reads_are_deduplicated() {
    let (mut reader, control) = reader("acura-reads");
    let log = EventLog::default();
    reader.set_callback(log.callback());
    reader.connect(&options()).unwrap();
    reader.start_inventory().unwrap();

    control.read("E200", -60, 1);
    control.read("E200", -52, 2);
    control.read("E300", -71, 2);
    reader.pipeline().flush();

    assert_eq!(log.tag_epcs(), vec!["E200", "E300"]);
    let view = reader.buffer();
    assert_eq!(view.records()[0].rssi.unwrap().centi_dbm(), -6000);
    assert_eq!(view.records()[1].antenna, Some(2));
}

#[test]
fn test_background_failure_is_reported() {
    let (mut reader, control) = reader("acura-exception");
    let log = EventLog::default();
    reader.set_callback(log.callback());
    reader.connect(&options()).unwrap();
    reader.start_inventory().unwrap();

    assert!(control.fail_read("temperature too high"));
    reader.pipeline().flush();

    assert!(
        log.events()
            .iter()
            .any(|e| matches!(e, ReaderEvent::Error(err) if matches!(**err, Error::Device { .. })))
    );
}

#[test]
fn test_failed_start_removes_listener() {
    let (mut reader, control) = reader("acura-start-fails");
    control.state().fail_start = true;
    reader.connect(&options()).unwrap();

    assert!(matches!(reader.start_inventory(), Err(Error::Device { .. })));
    assert!(!reader.is_reading());
    assert!(!control.has_listener());
}

#[test]
fn test_stop_inventory() {
    let (mut reader, control) = reader("acura-stop");
    reader.connect(&options()).unwrap();
    assert!(!reader.stop_inventory());

    reader.start_inventory().unwrap();
    assert!(reader.stop_inventory());
    assert!(!control.has_listener());
    assert!(!control.read("E200", -60, 1));
}

#[test]
fn test_failed_stop_still_releases_listeners() {
    let (mut reader, control) = reader("acura-stop-fails");
    reader.connect(&options()).unwrap();
    reader.start_inventory().unwrap();
    control.state().fail_stop = true;

    assert!(!reader.stop_inventory());
    assert!(reader.is_reading());
    assert!(control.has_listener());

    reader.disconnect().unwrap();
    assert!(!reader.is_reading());
    assert!(!control.has_listener());
    assert!(!control.has_exception_listener());
    assert!(!control.read("E200", -60, 1));
    assert_eq!(control.state().destroyed, 1);
}

#[test]
fn test_reconnect_cycle_balances_sessions() {
    let (mut reader, control) = reader("acura-reconnect");
    let log = EventLog::default();
    reader.set_callback(log.callback());

    for epc in ["E200", "E300"] {
        reader.connect(&options()).unwrap();
        reader.start_inventory().unwrap();
        control.read(epc, -60, 1);
        control.fail_read("antenna disconnected");
        reader.disconnect().unwrap();
    }
    reader.pipeline().flush();

    let state = control.state();
    assert_eq!(state.uris.len(), 2);
    assert_eq!(state.destroyed, 2);
    drop(state);
    assert_eq!(log.tag_epcs(), vec!["E200", "E300"]);
    assert_eq!(
        log.statuses(),
        vec![
            ConnectionStatus::Connected,
            ConnectionStatus::Disconnected,
            ConnectionStatus::Connected,
            ConnectionStatus::Disconnected,
        ]
    );
}

#[test]
fn test_brazil_loads_open_region_and_hop_table() {
    let (mut reader, control) = reader("acura-brazil");
    reader.connect(&options()).unwrap();

    assert!(reader.set_frequency(FrequencyRegion::Brazil).unwrap());
    let state = control.state();
    assert_eq!(state.region, Some(Region::Open));
    assert_eq!(state.step_khz, Some(250));
    assert_eq!(state.hop_table.len(), 64);
    assert_eq!(state.hop_table.first(), Some(&902_000));
    assert_eq!(state.hop_table.last(), Some(&927_500));
}

#[test]
fn test_preset_region_has_no_hop_table() {
    let (mut reader, control) = reader("acura-europe");
    reader.connect(&options()).unwrap();

    assert!(reader.set_frequency(FrequencyRegion::Europe).unwrap());
    assert_eq!(control.state().region, Some(Region::Eu));
    assert_eq!(control.state().step_khz, None);
    assert!(control.state().hop_table.is_empty());
}

#[test]
fn test_frequency_errors() {
    let (mut reader, _control) = reader("acura-frequency-errors");
    assert!(matches!(
        reader.set_frequency(FrequencyRegion::Europe),
        Err(Error::NotConnected)
    ));

    reader.connect(&options()).unwrap();
    assert!(matches!(
        reader.set_frequency(FrequencyRegion::Morocco),
        Err(Error::UnsupportedRegion(FrequencyRegion::Morocco))
    ));
    assert!(matches!(reader.frequency(), Err(Error::Unsupported { .. })));
}

#[test]
fn test_rejected_setters_report_false() {
    let (mut reader, control) = reader("acura-setters-fail");
    reader.connect(&options()).unwrap();

    control.state().fail_region = true;
    assert!(!reader.set_frequency(FrequencyRegion::Brazil).unwrap());
    assert!(control.state().hop_table.is_empty());

    control.state().fail_power = true;
    assert!(!reader.set_power(30).unwrap());
    assert_eq!(reader.power().unwrap(), 25);
}

#[test]
fn test_power_is_scaled() {
    let (mut reader, control) = reader("acura-power");
    reader.connect(&options()).unwrap();
    assert_eq!(reader.power().unwrap(), 25);

    assert!(reader.set_power(30).unwrap());
    assert_eq!(control.state().read_power, 3000);
    assert_eq!(reader.power().unwrap(), 30);

    assert!(matches!(reader.set_power(101), Err(Error::Configuration { .. })));
    assert!(matches!(reader.set_power(-1), Err(Error::Configuration { .. })));
}

#[test]
fn test_kill_tag() {
    let (mut reader, control) = reader("acura-kill");
    let epc = TagId::new("E2801160600002").unwrap();
    reader.connect(&options()).unwrap();

    assert!(reader.kill_tag(&epc, KillPassword::new(0x1A2B_3C4D)).unwrap());
    assert_eq!(
        control.state().kills,
        vec![(0x1A2B_3C4D, "E2801160600002".to_string())]
    );

    control.state().fail_kill = true;
    assert!(matches!(
        reader.kill_tag(&epc, KillPassword::new(1)),
        Err(Error::Device { .. })
    ));
}

#[test]
fn test_unsupported_capabilities() {
    let (mut reader, _control) = reader("acura-unsupported");
    reader.connect(&options()).unwrap();

    assert!(matches!(reader.set_tag_focus(true), Err(Error::Unsupported { .. })));
    assert!(!reader.beep());
    assert!(!reader.set_beep(true));
    assert_eq!(reader.inventory_params(), None);
}

#[test]
fn test_close_after_reading() {
    let (mut reader, control) = reader("acura-close");
    let log = EventLog::default();
    reader.set_callback(log.callback());
    reader.connect(&options()).unwrap();
    reader.start_inventory().unwrap();

    reader.close();
    reader.close();
    reader.pipeline().flush();

    assert_eq!(control.state().destroyed, 1);
    assert_eq!(
        log.statuses(),
        vec![ConnectionStatus::Connected, ConnectionStatus::Disconnected]
    );
}
