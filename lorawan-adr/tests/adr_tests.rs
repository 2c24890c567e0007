use lorawan_adr::{
    adr::{policy::LinkParams, AdrComponent, AdrError},
    config::{AdrConfig, Aggregation},
    controller::{ControllerComponent, ControllerError},
    lorawan::{
        commands::MacCommand,
        mac::{Direction, MType},
        region::DataRate,
    },
    network::NetworkStatus,
};

use mock::{device_with_history, init_logging, packet, rx_power_for_snr};

fn adr() -> AdrComponent {
    init_logging();
    AdrComponent::new(AdrConfig::default()).unwrap()
}

#[test]
fn test_strong_link_at_sf7_drops_power_to_floor() {
    let adr = adr();
    let network = NetworkStatus::new();
    let mut device = device_with_history(7, 14, 20, -80.0, true);

    let decision = adr.decide(&device).unwrap().unwrap();
    assert!((decision.estimated_snr - 37.03).abs() < 0.01);
    assert_eq!(decision.required_snr, -7.5);
    assert!((decision.margin - 34.53).abs() < 0.01);
    assert_eq!(decision.steps, 11);
    assert_eq!(decision.discarded_steps, 7);
    assert_eq!(decision.data_rate, DataRate::SF7BW125);
    assert_eq!(decision.tx_power, 2);

    adr.before_sending_reply(&mut device, &network).unwrap();

    let reply = device.reply();
    assert!(reply.needs_reply);
    assert_eq!(reply.frame_header.direction(), Direction::Downlink);
    assert_eq!(reply.mtype, Some(MType::UnconfirmedDataDown));
    assert_eq!(
        reply.frame_header.commands(),
        &[MacCommand::LinkADRReq {
            data_rate: 5,
            tx_power: 7,
            ch_mask: 0x000E,
            ch_mask_cntl: 0,
            nb_trans: 1,
        }]
    );
    assert_eq!(
        reply.frame_header.commands()[0].to_bytes().as_slice(),
        &[0x03, 0x57, 0x0E, 0x00, 0x01]
    );
}

#[test]
fn test_short_history_is_skipped() {
    let adr = adr();
    let network = NetworkStatus::new();

    for count in [0, 1, 10, 19] {
        let mut device = device_with_history(9, 14, count, -80.0, true);
        assert_eq!(adr.decide(&device), Ok(None));
        adr.before_sending_reply(&mut device, &network).unwrap();
        assert!(!device.reply().needs_reply);
        assert_eq!(device.spreading_factor(), 9);
        assert_eq!(device.tx_power(), 14);
    }
}

#[test]
fn test_no_adr_request_is_skipped() {
    let adr = adr();
    let network = NetworkStatus::new();

    for count in [0, 20, 32] {
        let mut device = device_with_history(9, 14, count, -80.0, false);
        adr.before_sending_reply(&mut device, &network).unwrap();
        assert!(!device.reply().needs_reply);
        assert!(device.reply().frame_header.commands().is_empty());
    }

    // Only the latest uplink counts
    let mut device = device_with_history(9, 14, 20, -80.0, true);
    device.push_packet(packet(false, &[(1, -80.0)]));
    adr.before_sending_reply(&mut device, &network).unwrap();
    assert!(!device.reply().needs_reply);
}

#[test]
fn test_other_hooks_leave_device_untouched() {
    let adr = adr();
    let network = NetworkStatus::new();
    let mut device = device_with_history(8, 11, 20, -80.0, true);
    let uplink = packet(true, &[(1, -80.0), (2, -95.0)]);
    let before = device.reply().clone();

    adr.on_received_packet(&uplink, &mut device, &network).unwrap();
    adr.on_failed_reply(&mut device, &network).unwrap();

    assert_eq!(device.reply(), &before);
    assert_eq!(device.spreading_factor(), 8);
    assert_eq!(device.tx_power(), 11);
    assert_eq!(device.history_len(), 20);
}

#[test]
fn test_results_stay_within_bounds() {
    let adr = adr();

    for sf in 7..=12u8 {
        for tx_power in [2i8, 5, 8, 11, 14] {
            for rx_power in (-150..=-30).step_by(5) {
                let device = device_with_history(sf, tx_power, 20, rx_power as f64, true);
                let decision = adr.decide(&device).unwrap().unwrap();

                let new_sf = decision.spreading_factor();
                assert!((7..=12).contains(&new_sf));
                assert!(new_sf <= sf);
                assert!((2..=14).contains(&decision.tx_power));
                assert_eq!((decision.tx_power - tx_power) % 3, 0);
            }
        }
    }
}

#[test]
fn test_stronger_link_never_asks_for_more() {
    let adr = adr();

    for sf in 7..=12u8 {
        for tx_power in [2i8, 8, 14] {
            for rx_power in (-140..=-60).step_by(4) {
                let base = device_with_history(sf, tx_power, 20, rx_power as f64, true);
                let base = adr.decide(&base).unwrap().unwrap();

                for boost in [0.5, 1.0, 3.0, 7.5, 20.0] {
                    let stronger =
                        device_with_history(sf, tx_power, 20, rx_power as f64 + boost, true);
                    let stronger = adr.decide(&stronger).unwrap().unwrap();

                    assert!(stronger.spreading_factor() <= base.spreading_factor());
                    assert!(stronger.tx_power <= base.tx_power);
                }
            }
        }
    }
}

#[test]
fn test_zero_steps_keep_parameters() {
    let adr = adr();
    let config = adr.config();

    // SF9 needs -12.5 dB; with the 10 dB offset an estimate of -1.5 dB
    // leaves a 1 dB margin
    let rx_power = rx_power_for_snr(-1.5, config);
    let device = device_with_history(9, 8, 20, rx_power, true);

    let decision = adr.decide(&device).unwrap().unwrap();
    assert!((decision.margin - 1.0).abs() < 1e-9);
    assert_eq!(decision.steps, 0);
    assert_eq!(decision.spreading_factor(), 9);
    assert_eq!(decision.tx_power, 8);
    assert!(!decision.changes_link());
}

#[test]
fn test_weak_link_raises_power_only() {
    let adr = adr();

    let device = device_with_history(12, 2, 20, -130.0, true);
    let decision = adr.decide(&device).unwrap().unwrap();
    assert_eq!(decision.steps, -1);
    assert_eq!(decision.spreading_factor(), 12);
    assert_eq!(decision.tx_power, 5);

    let device = device_with_history(12, 2, 20, -140.0, true);
    let decision = adr.decide(&device).unwrap().unwrap();
    assert_eq!(decision.steps, -5);
    assert_eq!(decision.spreading_factor(), 12);
    assert_eq!(decision.tx_power, 14);
    assert_eq!(decision.discarded_steps, -1);
}

#[test]
fn test_decision_is_deterministic() {
    let adr = adr();
    let device = device_with_history(10, 11, 25, -112.0, true);

    assert_eq!(adr.decide(&device), adr.decide(&device));
}

#[test]
fn test_only_latest_window_counts() {
    let adr = adr();
    // Old, very strong packets pushed out of the window by weak ones
    let mut device = device_with_history(10, 14, 12, -40.0, true);
    for _ in 0..20 {
        device.push_packet(packet(true, &[(1, -120.0)]));
    }

    let decision = adr.decide(&device).unwrap().unwrap();
    let expected = device_with_history(10, 14, 20, -120.0, true);
    assert_eq!(Some(decision), adr.decide(&expected).unwrap());
}

#[test]
fn test_max_policies() {
    init_logging();
    let mut config = AdrConfig::default();
    config.gateway_aggregation = Aggregation::Max;
    config.history_aggregation = Aggregation::Max;
    let adr = AdrComponent::new(config).unwrap();

    let mut device = device_with_history(12, 14, 19, -125.0, true);
    device.push_packet(packet(true, &[(1, -125.0), (2, -100.0)]));

    let decision = adr.decide(&device).unwrap().unwrap();
    let expected_snr = lorawan_adr::adr::snr::rx_power_to_snr(-100.0, adr.config());
    assert!((decision.estimated_snr - expected_snr).abs() < 1e-9);
}

#[test]
fn test_unreported_packets_fall_back_to_min_power() {
    let adr = adr();
    let mut device = lorawan_adr::device::EndDeviceStatus::new(12, 14);
    for _ in 0..20 {
        device.push_packet(packet(true, &[]));
    }

    let decision = adr.decide(&device).unwrap().unwrap();
    assert!(decision.estimated_snr.is_finite());
    assert_eq!(decision.spreading_factor(), 7);
    assert_eq!(decision.tx_power, 2);
}

#[test]
fn test_inconsistent_device_is_reported() {
    let adr = adr();
    let network = NetworkStatus::new();

    let mut device = device_with_history(13, 14, 20, -80.0, true);
    assert_eq!(
        adr.decide(&device),
        Err(AdrError::SpreadingFactorOutOfRange(13))
    );
    assert_eq!(
        adr.before_sending_reply(&mut device, &network),
        Err(ControllerError::Adr(AdrError::SpreadingFactorOutOfRange(13)))
    );
    assert!(!device.reply().needs_reply);

    let device = device_with_history(9, 20, 20, -80.0, true);
    assert_eq!(adr.decide(&device), Err(AdrError::TxPowerOutOfRange(20)));
}

#[test]
fn test_full_reply_is_reported() {
    let adr = adr();
    let network = NetworkStatus::new();
    let mut device = device_with_history(9, 14, 20, -80.0, true);

    let filler = MacCommand::LinkADRAns {
        power_ack: true,
        data_rate_ack: true,
        channel_mask_ack: true,
    };
    while device.reply_mut().frame_header.add_command(filler).is_ok() {}

    assert_eq!(
        adr.before_sending_reply(&mut device, &network),
        Err(ControllerError::Adr(AdrError::ReplyFull))
    );
}

#[test]
fn test_evaluate_on_snapshot() {
    let adr = adr();
    let packets: Vec<_> = (0..20).map(|_| packet(true, &[(1, -80.0)])).collect();
    let params = LinkParams {
        spreading_factor: 12,
        tx_power: 14,
    };

    let decision = adr.evaluate(params, packets.iter()).unwrap().unwrap();
    // 15 steps: SF12 -> SF7 uses 5, power 14 -> 2 uses 4
    assert_eq!(decision.steps, 15);
    assert_eq!(decision.data_rate, DataRate::SF7BW125);
    assert_eq!(decision.tx_power, 2);
    assert_eq!(decision.discarded_steps, 6);
    assert_eq!(decision.previous, params);
    assert!(decision.changes_link());

    assert_eq!(adr.evaluate(params, packets[..5].iter()), Ok(None));
}

#[test]
fn test_repeated_reply_hook_stages_once() {
    let adr = adr();
    let network = NetworkStatus::new();
    let mut device = device_with_history(9, 14, 20, -90.0, true);

    adr.before_sending_reply(&mut device, &network).unwrap();
    let first = device.reply().clone();
    adr.before_sending_reply(&mut device, &network).unwrap();

    assert_eq!(device.reply(), &first);
    assert_eq!(device.reply().frame_header.commands().len(), 1);
}

#[test]
fn test_device_outside_configured_sf_bounds_is_reported() {
    init_logging();
    let mut config = AdrConfig::default();
    config.min_spreading_factor = 9;
    config.max_spreading_factor = 10;
    let adr = AdrComponent::new(config).unwrap();

    for sf in [7, 8, 11, 12] {
        let device = device_with_history(sf, 14, 20, -80.0, true);
        assert_eq!(
            adr.decide(&device),
            Err(AdrError::SpreadingFactorOutOfRange(sf))
        );
    }

    let device = device_with_history(10, 14, 20, -80.0, true);
    let decision = adr.decide(&device).unwrap().unwrap();
    assert_eq!(decision.spreading_factor(), 9);
}

#[test]
fn test_command_power_rounds_down_to_grid() {
    let adr = adr();
    let network = NetworkStatus::new();

    // Zero steps keep the off-grid 11 dBm
    let rx_power = rx_power_for_snr(-1.5, adr.config());
    let mut device = device_with_history(9, 11, 20, rx_power, true);
    let decision = adr.decide(&device).unwrap().unwrap();
    assert_eq!(decision.tx_power, 11);

    adr.before_sending_reply(&mut device, &network).unwrap();
    match device.reply().frame_header.commands() {
        [MacCommand::LinkADRReq { tx_power, .. }] => assert_eq!(*tx_power, 3),
        other => panic!("unexpected commands {:?}", other),
    }
}
