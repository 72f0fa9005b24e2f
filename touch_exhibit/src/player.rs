//! Real-time MIDI output thread.
//!
//! Scenes fire notes from the frame loop and never wait on them: a strike
//! is a `NoteOn` sent right away plus a `NoteOff` deadline the thread keeps
//! until it passes.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use touch_midi::ChannelMessage;

/// Shortest note the thread will hold; anything shorter is inaudible on
/// most softsynths.
const MIN_HOLD_MS: u64 = 30;
/// Longest hold; anything longer is released after a minute.
const MAX_HOLD_MS: u64 = 60_000;

// ════════════════════════════════════════════════════════════════════════════
// PlayerCommand — sent to the playback thread
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerCommand {
    /// Sound `note` now and release it after `hold_ms`.
    Strike { note: u8, velocity: u8, hold_ms: u64 },
    /// Change instrument (MIDI program 0–127).
    SetInstrument(u8),
    /// Release everything and terminate the thread.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — abstraction over midir / null (for testing)
// ════════════════════════════════════════════════════════════════════════════

pub(crate) trait MidiOut: Send {
    fn send(&mut self, msg: ChannelMessage);
}

// ── midir backend ─────────────────────────────────────────────────────────

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn send(&mut self, msg: ChannelMessage) {
        if let Err(e) = self.conn.send(&msg.to_bytes()) {
            debug!(?msg, error = %e, "MIDI send failed");
        }
    }
}

// ── null backend (used when no MIDI port is available) ────────────────────

struct NullOut;
impl MidiOut for NullOut {
    fn send(&mut self, _msg: ChannelMessage) {}
}

// ════════════════════════════════════════════════════════════════════════════
// open_midi_output — enumerate ports and pick first available
// ════════════════════════════════════════════════════════════════════════════

/// Try to open a MIDI output port, preferring a softsynth.
/// Falls back to `NullOut` with a warning if none found.
fn open_midi_output() -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("touch_exhibit_player") {
        Ok(m)  => m,
        Err(e) => {
            warn!(error = %e, "MIDI init failed; playing silently");
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        warn!("no MIDI output ports found; playing silently");
        warn!("start a synth such as `timidity -iA` or `fluidsynth` (Linux), \
               or use the built-in GS Wavetable Synth (Windows)");
        return Box::new(NullOut);
    }

    let port_idx = ports.iter().enumerate()
        .find(|(_, p)| {
            midi_out.port_name(p).map(|n| {
                let n = n.to_lowercase();
                n.contains("fluid") || n.contains("timidity") ||
                n.contains("microsoft") || n.contains("gm") ||
                n.contains("synth")
            }).unwrap_or(false)
        })
        .map(|(i, _)| i)
        .unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out.port_name(port)
        .unwrap_or_else(|_| "Unknown".to_string());
    info!(port = %name, "opening MIDI port");

    match midi_out.connect(port, "touch-exhibit") {
        Ok(conn) => Box::new(MidirOut { conn }),
        Err(e) => {
            warn!(error = %e, "MIDI connect failed; playing silently");
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// NoteOffQueue — pending releases by deadline
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct NoteOffQueue {
    pending: Vec<(u8, Instant)>,
}

impl NoteOffQueue {
    /// Set `note`'s release deadline.  Returns `true` if the note was still
    /// sounding, in which case the caller releases it before re-striking.
    fn schedule(&mut self, note: u8, deadline: Instant) -> bool {
        match self.pending.iter_mut().find(|(n, _)| *n == note) {
            Some(slot) => { slot.1 = deadline; true }
            None       => { self.pending.push((note, deadline)); false }
        }
    }

    /// Remove and return every note whose deadline has passed.
    fn due(&mut self, now: Instant) -> Vec<u8> {
        let mut out = Vec::new();
        self.pending.retain(|&(note, at)| {
            if at <= now { out.push(note); false } else { true }
        });
        out
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|&(_, at)| at).min()
    }

    fn drain(&mut self) -> Vec<u8> {
        self.pending.drain(..).map(|(note, _)| note).collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Player — the playback thread
// ════════════════════════════════════════════════════════════════════════════

/// Handle to the MIDI playback thread.  Cheap to clone.
#[derive(Clone, Debug)]
pub struct Player {
    pub(crate) cmd_tx: Sender<PlayerCommand>,
}

/// The playback thread is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerGone;

impl Player {
    /// Spawn the playback thread on the best available MIDI port.
    pub fn spawn(instrument: u8, channel: u8) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<PlayerCommand>();
        thread::spawn(move || {
            player_thread(open_midi_output(), instrument, channel, cmd_rx);
        });
        Player { cmd_tx }
    }

    #[cfg(test)]
    fn spawn_with(out: Box<dyn MidiOut>, instrument: u8, channel: u8) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<PlayerCommand>();
        thread::spawn(move || player_thread(out, instrument, channel, cmd_rx));
        Player { cmd_tx }
    }

    pub fn strike(&self, note: u8, velocity: u8, hold_ms: f64) -> Result<(), PlayerGone> {
        let hold_ms = (hold_ms.max(0.0).round() as u64).clamp(MIN_HOLD_MS, MAX_HOLD_MS);
        self.send(PlayerCommand::Strike { note, velocity, hold_ms })
    }

    pub fn set_instrument(&self, program: u8) -> Result<(), PlayerGone> {
        self.send(PlayerCommand::SetInstrument(program))
    }

    pub fn quit(&self) { let _ = self.send(PlayerCommand::Quit); }

    fn send(&self, cmd: PlayerCommand) -> Result<(), PlayerGone> {
        self.cmd_tx.send(cmd).map_err(|_| PlayerGone)
    }
}

/// When a note struck at `now` for `hold_ms` is released.  A hold too long
/// to represent falls back to the minimum hold.
fn release_at(now: Instant, hold_ms: u64) -> Instant {
    now.checked_add(Duration::from_millis(hold_ms))
        .unwrap_or_else(|| now + Duration::from_millis(MIN_HOLD_MS))
}

// ════════════════════════════════════════════════════════════════════════════
// player_thread — the actual loop
// ════════════════════════════════════════════════════════════════════════════

fn player_thread(
    mut midi:       Box<dyn MidiOut>,
    instrument:     u8,
    channel:        u8,
    cmd_rx:         Receiver<PlayerCommand>,
) {
    let mut pending = NoteOffQueue::default();
    midi.send(ChannelMessage::ProgramChange { channel, program: instrument });

    loop {
        let cmd = match pending.next_deadline() {
            Some(at) => cmd_rx.recv_timeout(at.saturating_duration_since(Instant::now())),
            None     => cmd_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match cmd {
            Ok(PlayerCommand::Strike { note, velocity, hold_ms }) => {
                let deadline = release_at(Instant::now(), hold_ms);
                if pending.schedule(note, deadline) {
                    midi.send(ChannelMessage::NoteOff { channel, note });
                }
                midi.send(ChannelMessage::NoteOn { channel, note, velocity });
            }
            Ok(PlayerCommand::SetInstrument(program)) => {
                midi.send(ChannelMessage::ProgramChange { channel, program });
            }
            Ok(PlayerCommand::Quit) | Err(RecvTimeoutError::Disconnected) => {
                for note in pending.drain() {
                    midi.send(ChannelMessage::NoteOff { channel, note });
                }
                midi.send(ChannelMessage::AllNotesOff { channel });
                debug!("player thread stopped");
                return;
            }
            Err(RecvTimeoutError::Timeout) => {}
        }

        for note in pending.due(Instant::now()) {
            midi.send(ChannelMessage::NoteOff { channel, note });
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
