//! OSC generator — sends `<address> note velocity` messages over UDP.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use rosc::{encoder, OscMessage, OscPacket, OscType};

use super::Generator;
use crate::pattern::Event;

pub struct OscGenerator {
    name: String,
    address: String,
    target: SocketAddr,
    socket: UdpSocket,
}

impl OscGenerator {
    /// Bind a local UDP socket that sends to `target` (e.g. "127.0.0.1:57120").
    pub fn connect(name: &str, target: &str, address: &str) -> io::Result<Self> {
        let target = target
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::other(format!("no address for '{target}'")))?;
        let bind = if target.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(bind)?;
        Ok(Self {
            name: name.to_string(),
            address: address.to_string(),
            target,
            socket,
        })
    }

    /// Encode an event as an OSC packet.
    pub fn encode(&self, event: &Event) -> Result<Vec<u8>, rosc::OscError> {
        let packet = OscPacket::Message(OscMessage {
            addr: self.address.clone(),
            args: vec![
                OscType::Int(i32::from(event.note)),
                OscType::Int(i32::from(event.velocity)),
            ],
        });
        encoder::encode(&packet)
    }
}

impl Generator for OscGenerator {
    fn play(&self, event: &Event) {
        let bytes = match self.encode(event) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(generator = %self.name, "osc encode failed: {e}");
                return;
            }
        };
        if let Err(e) = self.socket.send_to(&bytes, self.target) {
            tracing::warn!(generator = %self.name, target = %self.target, "osc send failed: {e}");
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosc::decoder;
    use std::time::Duration;

    #[test]
    fn sends_note_and_velocity() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let target = receiver.local_addr().unwrap().to_string();

        let g = OscGenerator::connect("drums", &target, "/trkr/drums").unwrap();
        g.play(&Event::bare(36, 120));

        let mut buf = [0u8; 1024];
        let (size, _) = receiver.recv_from(&mut buf).unwrap();
        let (_, packet) = decoder::decode_udp(&buf[..size]).unwrap();
        match packet {
            OscPacket::Message(msg) => {
                assert_eq!(msg.addr, "/trkr/drums");
                assert_eq!(msg.args, vec![OscType::Int(36), OscType::Int(120)]);
            }
            OscPacket::Bundle(_) => panic!("expected a message"),
        }
    }

    #[test]
    fn unresolvable_target_fails() {
        assert!(OscGenerator::connect("x", "no-port-here", "/x").is_err());
    }
}
