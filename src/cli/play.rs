//! Play command: the wall in a terminal
//!
//! Frames are drawn with half blocks, one terminal column per pixel and two
//! pixels per row. Controls arrive as line commands on stdin so no raw mode
//! is needed: `p` toggles pause, `n` skips, `q` quits.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use image::RgbaImage;

use crate::config::PixelDropConfig;
use crate::frame_loop::{run, CancelToken, Control, FrameHost};
use crate::renderer::Surface;
use crate::sequencer::{Sequencer, SequencerEvent, TickReport};
use crate::terminal::{
    compose_frame, info_line, ANSI_RESET, CLEAR_SCREEN, HIDE_CURSOR, SHOW_CURSOR,
};

use super::{make_rng, open_collection, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// A control key read from stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayCommand {
    TogglePause,
    Skip,
    Quit,
}

fn parse_commands(line: &str) -> impl Iterator<Item = PlayCommand> + '_ {
    line.chars().filter_map(|c| match c.to_ascii_lowercase() {
        'p' => Some(PlayCommand::TogglePause),
        'n' => Some(PlayCommand::Skip),
        'q' => Some(PlayCommand::Quit),
        _ => None,
    })
}

/// Read control lines on a background thread. The thread ends at EOF or
/// when the receiver is dropped.
fn spawn_stdin_reader() -> Receiver<PlayCommand> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            for command in parse_commands(&line) {
                if tx.send(command).is_err() {
                    return;
                }
            }
        }
    });
    rx
}

struct TerminalHost<W: Write> {
    out: W,
    ansi: bool,
    start: Instant,
    frame: Duration,
    next_deadline: Instant,
    surface: RgbaImage,
    commands: Option<Receiver<PlayCommand>>,
    cancel: CancelToken,
    show_info: bool,
    cycles: Option<u64>,
    completed: u64,
}

impl<W: Write> TerminalHost<W> {
    fn apply_commands(&mut self, sequencer: &mut Sequencer) -> Control {
        let Some(commands) = self.commands.as_ref() else {
            return Control::Continue;
        };
        loop {
            match commands.try_recv() {
                Ok(PlayCommand::TogglePause) => sequencer.toggle_pause(),
                Ok(PlayCommand::Skip) => sequencer.skip(),
                Ok(PlayCommand::Quit) => return Control::Stop,
                Err(TryRecvError::Empty) => return Control::Continue,
                Err(TryRecvError::Disconnected) => {
                    // stdin closed; keep playing without controls
                    self.commands = None;
                    return Control::Continue;
                }
            }
        }
    }
}

impl<W: Write> FrameHost for TerminalHost<W> {
    fn now_ms(&mut self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    fn surface(&mut self) -> Option<&mut dyn Surface> {
        Some(&mut self.surface)
    }

    fn after_frame(&mut self, sequencer: &mut Sequencer, report: &TickReport) -> Control {
        let status = self.show_info.then(|| info_line(sequencer));
        let frame = if self.ansi {
            compose_frame(&self.surface, status.as_deref())
        } else {
            // Not a terminal: only report state changes
            match report.event {
                Some(SequencerEvent::Settled { .. }) => {
                    status.map(|s| s + "\n").unwrap_or_default()
                }
                _ => String::new(),
            }
        };
        if self.out.write_all(frame.as_bytes()).and_then(|_| self.out.flush()).is_err() {
            // Output closed (e.g. broken pipe)
            self.cancel.cancel();
            return Control::Stop;
        }

        if let Some(SequencerEvent::Activated { .. }) = report.event {
            self.completed += 1;
            if self.cycles.is_some_and(|n| self.completed >= n) {
                return Control::Stop;
            }
        }
        self.apply_commands(sequencer)
    }

    fn wait_next_frame(&mut self) {
        self.next_deadline += self.frame;
        let now = Instant::now();
        if self.next_deadline > now {
            thread::sleep(self.next_deadline - now);
        } else {
            // Running behind; do not try to catch up
            self.next_deadline = now;
        }
    }

    fn release(&mut self) {
        if self.ansi {
            let _ = write!(self.out, "{}{}", ANSI_RESET, SHOW_CURSOR);
            let _ = self.out.flush();
        }
    }
}

/// Execute the play command
pub fn run_play(
    config: &PixelDropConfig,
    width: u32,
    height: u32,
    fps: u32,
    cycles: Option<u64>,
    show_info: bool,
) -> ExitCode {
    if width == 0 || height == 0 {
        eprintln!("Error: --width and --height must be positive");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }
    if cycles == Some(0) {
        return ExitCode::from(EXIT_SUCCESS);
    }

    let collection = open_collection(config);
    let mut sequencer =
        Sequencer::new(collection.into_items(), config.sequencer_config(), make_rng(config));
    if sequencer.collection_len() == 0 {
        eprintln!("Error: The collection is empty");
        return ExitCode::from(EXIT_ERROR);
    }

    let ansi = atty::is(atty::Stream::Stdout);
    let interactive = atty::is(atty::Stream::Stdin);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if ansi {
        if let Err(e) = write!(out, "{}{}", CLEAR_SCREEN, HIDE_CURSOR) {
            eprintln!("Error: Cannot write to terminal: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    }
    if interactive && show_info {
        log::info!("controls: p = pause/resume, n = next, q = quit (then Enter)");
    }

    let cancel = CancelToken::new();
    let frame = Duration::from_secs_f64(1.0 / fps as f64);
    let mut host = TerminalHost {
        out,
        ansi,
        start: Instant::now(),
        frame,
        next_deadline: Instant::now(),
        surface: RgbaImage::new(width, height),
        commands: interactive.then(spawn_stdin_reader),
        cancel: cancel.clone(),
        show_info,
        cycles,
        completed: 0,
    };

    let summary = run(&mut sequencer, &mut host, &config.render_params(), &cancel);
    log::info!("played {} frames, {} matrices completed", summary.frames, summary.settled);
    ExitCode::from(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng;
    use crate::samples::{ghost, heart};
    use crate::renderer::RenderParams;
    use crate::sequencer::SequencerConfig;

    fn host(
        out: Vec<u8>,
        cycles: Option<u64>,
        commands: Option<Receiver<PlayCommand>>,
    ) -> TerminalHost<Vec<u8>> {
        TerminalHost {
            out,
            ansi: true,
            start: Instant::now(),
            frame: Duration::from_millis(1),
            next_deadline: Instant::now(),
            surface: RgbaImage::new(8, 8),
            commands,
            cancel: CancelToken::new(),
            show_info: true,
            cycles,
            completed: 0,
        }
    }

    fn fast_sequencer() -> Sequencer {
        let mut config = SequencerConfig::default();
        config.drop.gravity = 1.0;
        config.drop.spawn_rate = 500;
        config.hold_ms = 0.0;
        Sequencer::new(vec![heart(), ghost()], config, Rng::new(2))
    }

    #[test]
    fn test_parse_commands() {
        use PlayCommand::*;
        let commands: Vec<_> = parse_commands("pN x q").collect();
        assert_eq!(commands, [TogglePause, Skip, Quit]);

        // Spaces between keys are separators only
        let commands: Vec<_> = parse_commands("n n").collect();
        assert_eq!(commands, [Skip, Skip]);
        assert_eq!(parse_commands("   ").count(), 0);
    }

    #[test]
    fn test_cycles_stop_the_loop() {
        let mut seq = fast_sequencer();
        let mut host = host(Vec::new(), Some(2), None);
        let summary = run(&mut seq, &mut host, &RenderParams::default(), &CancelToken::new());

        assert_eq!(summary.activations, 2);
        assert_eq!(seq.active_index(), 0);
        let output = String::from_utf8(host.out).unwrap();
        assert!(output.contains("Ghost (2/2)"));
        assert!(output.ends_with(SHOW_CURSOR));
    }

    #[test]
    fn test_commands_drive_the_sequencer() {
        let (tx, rx) = mpsc::channel();
        tx.send(PlayCommand::Skip).unwrap();
        tx.send(PlayCommand::TogglePause).unwrap();
        tx.send(PlayCommand::Quit).unwrap();

        let mut seq = fast_sequencer();
        let mut host = host(Vec::new(), None, Some(rx));
        let summary = run(&mut seq, &mut host, &RenderParams::default(), &CancelToken::new());

        assert_eq!(summary.frames, 1);
        assert_eq!(seq.active_index(), 1);
        assert!(seq.is_paused());
    }
}
