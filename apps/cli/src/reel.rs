use std::sync::Arc;

use anyhow::Result;
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};

use quickwatch_core::{
    DEFAULT_PLAYER_ID, PlaybackState, PlayerHandle, PlayerRegistry, PlayerView, QuickWatch,
    SegmentList, SimulatedPlayer, format_timestamp,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Toggle,
    Next,
    Stop,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "t" | "toggle" => Some(Command::Toggle),
        "n" | "next" => Some(Command::Next),
        "s" | "stop" => Some(Command::Stop),
        "q" | "quit" => Some(Command::Quit),
        _ => None,
    }
}

/// Length for the simulated video: far enough to cover the transcript and
/// every highlight.
fn video_length(quick_watch: &QuickWatch, segments: &SegmentList) -> f64 {
    let transcript_end = quick_watch
        .transcript
        .iter()
        .map(|item| item.end())
        .fold(0.0, f64::max);
    let segments_end = (0..segments.len())
        .filter_map(|i| segments.end(i))
        .fold(0.0, f64::max);
    transcript_end.max(segments_end)
}

fn describe(state: PlaybackState, segments: &SegmentList, player: &dyn PlayerHandle) -> String {
    let position = format_timestamp(player.current_time());
    match state {
        PlaybackState::Idle => format!("{} stopped at {}", style("■").dim(), position),
        PlaybackState::Playing { index } => format!(
            "{} moment {}/{} from {}",
            style("▶").green().bold(),
            index + 1,
            segments.len(),
            position
        ),
        PlaybackState::Paused {
            index,
            remaining_ms,
        } => format!(
            "{} moment {}/{} at {} ({:.1}s left)",
            style("⏸").yellow().bold(),
            index + 1,
            segments.len(),
            position,
            remaining_ms as f64 / 1000.0
        ),
    }
}

/// Plays the key moments on a simulated player, driven by stdin commands.
/// Returns when the user quits or the last moment has played.
pub async fn run(quick_watch: &QuickWatch) -> Result<()> {
    let segments = SegmentList::new(quick_watch.segments());
    if segments.valid().next().is_none() {
        println!("{}", style("No playable key moments.").dim());
        return Ok(());
    }

    let player = Arc::new(SimulatedPlayer::new(video_length(quick_watch, &segments)));
    let registry = PlayerRegistry::new();
    let view = PlayerView::mount(registry, DEFAULT_PLAYER_ID, segments, true);
    view.on_ready(player.clone());

    let controller = view.controller().clone();
    let segments = controller.segments();
    let mut states = controller.subscribe();
    let mut highlighted = match view.tracker() {
        Some(tracker) => tracker.subscribe(),
        None => return Ok(()),
    };

    println!(
        "\n{}  {}",
        style("Highlight reel").cyan().bold(),
        style("[Enter/t] play/pause  [n] next  [s] stop  [q] quit").dim()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stopped_by_user = false;
    controller.start();

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *states.borrow_and_update();
                println!("{}", describe(state, &segments, player.as_ref()));
                if state == PlaybackState::Idle && !stopped_by_user {
                    println!("{}", style("Reel finished.").dim());
                    break;
                }
            }
            changed = highlighted.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *highlighted.borrow_and_update();
                if let Some(index) = current
                    && let Some(segment) = segments.get(index)
                {
                    println!(
                        "  {} {}",
                        style("●").cyan(),
                        style(format!("in moment {} [{}]", index + 1, format_timestamp(segment.start))).dim()
                    );
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_command(&line) {
                    Some(Command::Toggle) => {
                        stopped_by_user = false;
                        controller.toggle();
                    }
                    Some(Command::Next) => {
                        if controller.skip_to_next().is_some()
                            && controller.state() == PlaybackState::Idle
                        {
                            println!("{}", describe(PlaybackState::Idle, &segments, player.as_ref()));
                        }
                    }
                    Some(Command::Stop) => {
                        stopped_by_user = true;
                        controller.stop();
                    }
                    Some(Command::Quit) => break,
                    None => println!("{}", style("unknown command").red()),
                }
            }
        }
    }

    view.unmount();
    Ok(())
}
