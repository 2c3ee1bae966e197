//! HID-Switch hub entry point.
//!
//! Wires together all infrastructure and runs the single report dispatch
//! loop.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ HubConfig::load()      -- file + HIDSWITCH_TOKEN override
//!  └─ start services
//!       ├─ RelayListener     (TCP accept loop, Tokio task)
//!       ├─ Bluetooth attach  (host lookup + channel connect, Tokio task)
//!       └─ dispatch loop     (ReportStream -> InputRouter, main task)
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, UnixStream};
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use hidswitch_core::KeymapTable;
use hidswitch_hub::application::remote_keyboard::RemoteKeyboard;
use hidswitch_hub::application::route_reports::InputRouter;
use hidswitch_hub::infrastructure::bluetooth::{
    wait_for_input_host, HostEndpoints, InterruptChannel, StaticLocator,
};
use hidswitch_hub::infrastructure::broadcast::Broadcaster;
use hidswitch_hub::infrastructure::config::HubConfig;
use hidswitch_hub::infrastructure::listener::RelayListener;
use hidswitch_hub::infrastructure::raw_input::ReportStream;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "hub.toml".to_string());
    let config = HubConfig::load(Path::new(&config_path))?;

    // Structured logging.  Level comes from `RUST_LOG` when set, otherwise
    // from the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.relay.log_level)),
        )
        .init();

    info!("HID-Switch hub starting");

    let table = Arc::new(KeymapTable::new());
    let interrupt = Arc::new(InterruptChannel::new());
    let broadcaster = Arc::new(Broadcaster::new());
    let remote = Arc::new(Mutex::new(RemoteKeyboard::new(
        Arc::clone(&table),
        interrupt.clone(),
    )));

    // ── TCP relay listener ────────────────────────────────────────────────────
    let addr = format!("{}:{}", config.network.listen_address, config.network.listen_port);
    let socket = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind relay listener on {addr}"))?;
    info!(%addr, "relay listener bound");

    let relay = Arc::new(RelayListener::new(
        config.relay.token.clone(),
        Arc::clone(&broadcaster),
    ));
    tokio::spawn(async move {
        if let Err(e) = relay.serve(socket).await {
            error!("relay listener failed: {e}");
        }
    });

    // ── Bluetooth channels ────────────────────────────────────────────────────
    let endpoints = match (&config.bluetooth.control_socket, &config.bluetooth.interrupt_socket) {
        (Some(control), Some(interrupt)) => Some(HostEndpoints {
            control: control.clone(),
            interrupt: interrupt.clone(),
        }),
        _ => None,
    };
    let locator = StaticLocator::new(endpoints);
    let poll_interval = Duration::from_millis(config.bluetooth.poll_interval_ms);
    let interrupt_channel = Arc::clone(&interrupt);
    tokio::spawn(async move {
        let endpoints = wait_for_input_host(&locator, poll_interval).await;
        let control = match UnixStream::connect(&endpoints.control).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!("control channel connect failed: {e}");
                return;
            }
        };
        match UnixStream::connect(&endpoints.interrupt).await {
            Ok(stream) => interrupt_channel.attach(Box::new(stream)).await,
            Err(e) => {
                warn!("interrupt channel connect failed: {e}");
                return;
            }
        }
        // The control channel carries no traffic but must stay open for the
        // host to keep the HID session alive.
        let _control = control;
        std::future::pending::<()>().await;
    });

    // ── Report dispatch loop ──────────────────────────────────────────────────
    let device = tokio::fs::File::open(&config.input.device_path)
        .await
        .with_context(|| {
            format!("failed to open input device {}", config.input.device_path.display())
        })?;
    info!(device = %config.input.device_path.display(), "reading raw reports");

    let mut reports = ReportStream::new(device);
    let mut router = InputRouter::new(
        table,
        remote,
        broadcaster,
        interrupt,
        config.hotkeys.clone(),
        config.relay.mouse_speed,
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            report = reports.next_report() => match report {
                Ok(Some(report)) => router.handle_report(report).await,
                Ok(None) => {
                    info!("input device closed");
                    break;
                }
                Err(e) => {
                    error!("input device read failed: {e}");
                    break;
                }
            },
            _ = &mut shutdown => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    info!("HID-Switch hub stopped");
    Ok(())
}
