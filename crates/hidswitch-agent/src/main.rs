//! HID-Switch replay agent entry point.
//!
//! Spawns one connection supervisor per configured role and pumps link
//! events into the matching replay service until Ctrl-C.

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use hidswitch_core::wire::Role;
use hidswitch_agent::application::{KeyReplay, MouseReplay};
use hidswitch_agent::infrastructure::config::AgentConfig;
use hidswitch_agent::infrastructure::connection::{
    LinkConfig, LinkEvent, ServerLink, RECONNECT_DELAY,
};
use hidswitch_agent::infrastructure::injection::mock::MockInjector;
use hidswitch_agent::infrastructure::injection::InputInjector;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "agent.toml".to_string());
    let config = AgentConfig::load(Path::new(&config_path))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.replay.log_level)),
        )
        .init();

    info!("HID-Switch agent starting");

    // A platform build substitutes its own injector implementation here; the
    // mock logs every event instead of synthesising it.
    let injector: Arc<dyn InputInjector> = Arc::new(MockInjector::new());

    let mut tasks = Vec::new();
    for role in config.replay.roles.clone() {
        let link_config = LinkConfig {
            server_addr: config.hub_addr(),
            token: config.hub.token.clone(),
            role,
            reconnect_delay: RECONNECT_DELAY,
        };
        let injector = Arc::clone(&injector);
        let mouse_speed = config.replay.mouse_speed;
        tasks.push(tokio::spawn(async move {
            let (events, _state) = ServerLink::start(link_config);
            match role {
                Role::Keyboard => run_keyboard(events, injector).await,
                Role::Mouse => run_mouse(events, injector, mouse_speed).await,
            }
        }));
    }

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    for task in tasks {
        task.abort();
    }

    info!("HID-Switch agent stopped");
    Ok(())
}

async fn run_keyboard(mut events: mpsc::Receiver<LinkEvent>, injector: Arc<dyn InputInjector>) {
    let mut replay = KeyReplay::new(injector);
    while let Some(event) = events.recv().await {
        match event {
            LinkEvent::Keys(names) => replay.apply_frame(names),
            // Never leave keys latched across a dropped link.
            LinkEvent::Disconnected => replay.release_all(),
            LinkEvent::Connected | LinkEvent::Mouse(_) => {}
        }
    }
}

async fn run_mouse(
    mut events: mpsc::Receiver<LinkEvent>,
    injector: Arc<dyn InputInjector>,
    mouse_speed: f64,
) {
    let mut replay = MouseReplay::new(injector, mouse_speed);
    while let Some(event) = events.recv().await {
        match event {
            LinkEvent::Mouse(frame) => replay.handle_frame(frame),
            LinkEvent::Disconnected => replay.release_held(),
            LinkEvent::Connected | LinkEvent::Keys(_) => {}
        }
    }
}
