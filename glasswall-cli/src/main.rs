use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Input, Select};
use glasswall::client::{LocalMedia, RoomSession, RoomSessionState, SessionConfig, SessionPhase};
use glasswall::utils::{DEFAULT_ROOM, DEFAULT_SIGNALING_URL};
use glasswall::{ParticipantId, Role, RoomId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glasswall", version, about = "Interview rooms with a privacy wall")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join a room with silent local media and follow what happens in it.
    Join {
        /// Signaling server base address.
        #[arg(long, env = "GLASSWALL_WS_URL", default_value = DEFAULT_SIGNALING_URL)]
        url: String,

        /// Room code; prompted for when omitted.
        #[arg(short, long)]
        room: Option<String>,

        /// INTERVIEWER or CANDIDATE; prompted for when omitted.
        #[arg(long)]
        role: Option<Role>,

        /// Participant id; random when omitted.
        #[arg(long)]
        id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Join {
            url,
            room,
            role,
            id,
        } => join(url, room, role, id).await,
    }
}

async fn join(
    url: String,
    room: Option<String>,
    role: Option<Role>,
    id: Option<String>,
) -> Result<()> {
    let room = match room {
        Some(room) => room,
        None => Input::<String>::new()
            .with_prompt("Room code")
            .default(DEFAULT_ROOM.to_owned())
            .interact_text()?,
    };
    let room_id = RoomId::parse(&room).context("Invalid room code")?;

    let role = match role {
        Some(role) => role,
        None => {
            let choice = Select::new()
                .with_prompt("Join as")
                .items(&["Interviewer", "Candidate"])
                .default(1)
                .interact()?;
            if choice == 0 {
                Role::Interviewer
            } else {
                Role::Candidate
            }
        }
    };

    let mut config = SessionConfig::new(room_id, role).with_signaling_url(url);
    if let Some(id) = id {
        config = config.with_participant_id(ParticipantId::from(id));
    }
    let media = LocalMedia::silent(format!("glasswall-{}", config.participant_id.short()));

    println!(
        "{} {} as {} ({})",
        "Joining".green().bold(),
        config.room_id.to_string().bold(),
        role,
        config.participant_id
    );

    let session = RoomSession::join(config, media)
        .await
        .context("Failed to join room")?;

    if role.can_toggle_privacy() {
        println!(
            "{}",
            "Type 'p' + Enter to toggle privacy mode, 'q' to leave.".dimmed()
        );
    } else {
        println!("{}", "Type 'q' + Enter to leave.".dimmed());
    }

    let mut updates = session.subscribe();
    let mut shown = session.state();
    println!("{} {}", "Status:".cyan(), shown.status);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let next = updates.borrow_and_update().clone();
                report(&shown, &next);
                shown = next;
                if shown.phase == SessionPhase::Disconnected {
                    break;
                }
            }

            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => match line.trim() {
                        "q" => break,
                        "p" => {
                            let next = !session.state().privacy_mode;
                            if let Err(e) = session.set_privacy(next) {
                                println!("{} {}", "Cannot toggle privacy:".red(), e);
                            }
                        }
                        "" => {}
                        other => println!("{} '{}'", "Unknown command".yellow(), other),
                    },
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        tracing::warn!("Failed to read stdin: {}", e);
                        stdin_open = false;
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => break,
        }
    }

    session.leave().await;
    println!("{}", "Left the room.".green());
    Ok(())
}

fn report(prev: &RoomSessionState, next: &RoomSessionState) {
    if prev.status != next.status {
        let failing =
            next.status.contains("Error") || next.status.starts_with("Disconnected");
        let status = if failing {
            next.status.red()
        } else {
            next.status.normal()
        };
        println!("{} {}", "Status:".cyan(), status);
    }

    for (id, remote) in &next.remotes {
        match prev.remotes.get(id) {
            None => println!("{} {}", "+".green().bold(), remote.label),
            Some(before) => {
                if before.peer_state != remote.peer_state {
                    println!("  {}: {}", remote.label, remote.peer_state);
                }
                for track in remote.tracks.iter().skip(before.tracks.len()) {
                    println!("  {}: receiving {:?}", remote.label, track.kind);
                }
            }
        }
    }
    for (id, remote) in &prev.remotes {
        if !next.remotes.contains_key(id) {
            println!("{} {}", "-".red().bold(), remote.label);
        }
    }

    if prev.privacy_mode != next.privacy_mode {
        if next.remote_media_gated() {
            println!(
                "{}",
                "Privacy mode on: interviewers are conferring, their audio and video are hidden."
                    .magenta()
                    .bold()
            );
        } else if next.privacy_mode {
            println!("{}", "Privacy mode on.".magenta());
        } else {
            println!("{}", "Privacy mode off.".magenta());
        }
    }
}
