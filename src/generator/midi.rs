//! MIDI generator — note-on, gate, note-off on a MIDI output port.
//!
//! The midir connection lives on a dedicated writer thread; `play` only
//! queues raw messages, so any number of dispatch threads can share it.

use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use midir::MidiOutput;

use super::Generator;
use crate::pattern::Event;

const NOTE_ON: u8 = 0x90;
const NOTE_OFF: u8 = 0x80;

pub struct MidiGenerator {
    name: String,
    channel: u8,
    gate: Duration,
    tx: mpsc::Sender<[u8; 3]>,
}

impl MidiGenerator {
    /// Open a MIDI output port.
    ///
    /// Picks the first port whose name contains `port_filter`, or the first
    /// available port when no filter is given.
    pub fn connect(
        name: &str,
        port_filter: Option<&str>,
        channel: u8,
        gate: Duration,
    ) -> io::Result<Self> {
        if channel > 15 {
            return Err(io::Error::other(format!(
                "MIDI channel {channel} out of range 0-15"
            )));
        }

        let (tx, rx) = mpsc::channel::<[u8; 3]>();
        let (ready_tx, ready_rx) = mpsc::channel::<io::Result<String>>();
        let filter = port_filter.map(str::to_string);
        let client = format!("trkr-{name}");

        thread::Builder::new()
            .name(format!("trkr-midi-{name}"))
            .spawn(move || {
                let out = match MidiOutput::new(&client) {
                    Ok(out) => out,
                    Err(e) => {
                        let _ = ready_tx.send(Err(io::Error::other(format!("MIDI init: {e}"))));
                        return;
                    }
                };

                let ports = out.ports();
                let found = ports.iter().find_map(|p| {
                    let port_name = out.port_name(p).unwrap_or_default();
                    match filter.as_deref() {
                        Some(f) if !port_name.contains(f) => None,
                        _ => Some((p.clone(), port_name)),
                    }
                });
                let Some((port, port_name)) = found else {
                    let msg = match filter {
                        Some(f) => format!("MIDI output matching '{f}' not found"),
                        None => "no MIDI output ports available".to_string(),
                    };
                    let _ = ready_tx.send(Err(io::Error::other(msg)));
                    return;
                };

                let mut conn = match out.connect(&port, &client) {
                    Ok(conn) => conn,
                    Err(e) => {
                        let _ = ready_tx.send(Err(io::Error::other(format!("MIDI connect: {e}"))));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(port_name));

                // Ends when every sender (the generator) is dropped.
                for msg in rx {
                    if let Err(e) = conn.send(&msg) {
                        tracing::warn!("midi send failed: {e}");
                    }
                }
                conn.close();
            })?;

        let port_name = ready_rx
            .recv()
            .map_err(|_| io::Error::other("MIDI writer thread exited"))??;
        tracing::info!(generator = name, port = %port_name, "midi output connected");

        Ok(Self {
            name: name.to_string(),
            channel,
            gate,
            tx,
        })
    }

    fn send(&self, msg: [u8; 3]) {
        if self.tx.send(msg).is_err() {
            tracing::warn!(generator = %self.name, "midi writer is gone");
        }
    }
}

/// Raw note-on / note-off messages for an event on `channel`.
pub fn note_messages(event: &Event, channel: u8) -> ([u8; 3], [u8; 3]) {
    let note = event.note & 0x7f;
    let velocity = event.velocity & 0x7f;
    let ch = channel & 0x0f;
    ([NOTE_ON | ch, note, velocity], [NOTE_OFF | ch, note, 0])
}

impl Generator for MidiGenerator {
    fn play(&self, event: &Event) {
        let (on, off) = note_messages(event, self.channel);
        self.send(on);
        thread::sleep(self.gate);
        self.send(off);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_messages_on_channel() {
        let (on, off) = note_messages(&Event::bare(60, 100), 9);
        assert_eq!(on, [0x99, 60, 100]);
        assert_eq!(off, [0x89, 60, 0]);
    }

    #[test]
    fn note_messages_mask_to_seven_bits() {
        let (on, _) = note_messages(&Event::bare(200, 255), 0);
        assert_eq!(on, [0x90, 200 & 0x7f, 0x7f]);
    }

    #[test]
    fn channel_out_of_range_is_rejected() {
        let result = MidiGenerator::connect("lead", None, 16, Duration::from_millis(10));
        assert!(result.is_err());
    }
}
