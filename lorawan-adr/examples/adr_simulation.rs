//! ADR walk-away simulation
//!
//! This example drives the controller pipeline the way a network server
//! does for a single end device:
//! - The device starts at SF12 / 14 dBm next to two gateways
//! - Every uplink sets the ADR bit and is reported by both gateways
//! - Received power drops as the device moves away, then recovers
//! - Whenever a LinkADRReq is staged, the device applies it and the reply
//!   is cleared as if it had been delivered
//!
//! Run with `RUST_LOG=debug cargo run --example adr_simulation --features std`
//! to see the controller's diagnostics.

use lorawan_adr::{
    adr::AdrComponent,
    config::AdrConfig,
    controller::{ComponentTag, ControllerPipeline},
    device::{EndDeviceStatus, GatewayList, ReceivedPacket},
    lorawan::{commands::MacCommand, mac::FCtrl, region::DataRate},
    network::NetworkStatus,
};

const GATEWAY_NEAR: u64 = 0x00AA_0001;
const GATEWAY_FAR: u64 = 0x00AA_0002;

// LinkADRReq TXPower index -> dBm, inverse of the controller's mapping
const TX_POWER_BY_INDEX: [i8; 8] = [16, 14, 12, 10, 8, 6, 4, 2];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let adr = AdrComponent::new(AdrConfig::default())?;
    let mut pipeline: ControllerPipeline<'_, 4> = ControllerPipeline::new();
    pipeline.register(ComponentTag::Adr, &adr)?;

    let mut network = NetworkStatus::new();
    for gw in [GATEWAY_NEAR, GATEWAY_FAR] {
        network
            .add_gateway(gw)
            .map_err(|_| "gateway registry full")?;
    }

    let mut device = EndDeviceStatus::new(12, 14);

    for uplink in 0..120u32 {
        // Path loss grows for 60 uplinks, then shrinks back
        let distance = f64::from(if uplink < 60 { uplink } else { 120 - uplink });
        let near = -70.0 - 0.8 * distance + f64::from(device.tx_power() - 14);
        let far = near - 12.0;

        let mut gateways = GatewayList::new();
        gateways
            .insert(GATEWAY_NEAR, near)
            .map_err(|_| "gateway list full")?;
        gateways
            .insert(GATEWAY_FAR, far)
            .map_err(|_| "gateway list full")?;
        let packet = ReceivedPacket::new(FCtrl::with_adr(true), gateways);

        device.push_packet(packet.clone());
        pipeline.on_received_packet(&packet, &mut device, &network)?;
        pipeline.before_sending_reply(&mut device, &network)?;

        if device.reply().needs_reply {
            for command in device.reply().frame_header.commands().to_vec() {
                if let MacCommand::LinkADRReq {
                    data_rate,
                    tx_power,
                    ..
                } = command
                {
                    let Some(dr) = DataRate::from_index(data_rate) else {
                        continue;
                    };
                    // The device lands on the 2 dB TXPower grid, which may be
                    // off the controller's 3 dB steps; later decisions start
                    // from whatever power the device reports
                    let power = TX_POWER_BY_INDEX[(tx_power & 0x07) as usize];
                    log::info!(
                        "uplink {:3}: rx {:6.1} dBm -> SF{} / {} dBm",
                        uplink,
                        near,
                        dr.spreading_factor(),
                        power
                    );
                    device.set_spreading_factor(dr.spreading_factor());
                    device.set_tx_power(power.clamp(2, 14));
                }
            }
            device.reply_mut().reset();
        }
    }

    log::info!(
        "final parameters: SF{} / {} dBm",
        device.spreading_factor(),
        device.tx_power()
    );
    Ok(())
}
