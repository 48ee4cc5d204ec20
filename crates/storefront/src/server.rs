//! Listener binding and shutdown.

use std::io;
use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use tokio::net::TcpListener;

/// Failure to bind any port in the allowed range.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("no free port in {first}..={last} on {host}")]
    Exhausted { host: IpAddr, first: u16, last: u16 },
    #[error("failed to bind {addr}: {source}")]
    Io {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

/// Bind `host:port`, moving to the next port while the current one is in use.
///
/// At most `attempts` consecutive ports are tried. Errors other than
/// "address in use" fail immediately. Port 0 asks the OS for any free port
/// and is tried once.
///
/// # Errors
///
/// Returns `BindError::Exhausted` when every port in the range is taken and
/// `BindError::Io` for any other bind failure.
pub async fn bind_with_fallback(
    host: IpAddr,
    port: u16,
    attempts: u16,
) -> Result<TcpListener, BindError> {
    let attempts = if port == 0 { 1 } else { attempts.max(1) };
    let mut last = port;

    for offset in 0..attempts {
        let Some(candidate) = port.checked_add(offset) else {
            break;
        };
        last = candidate;
        let addr = SocketAddr::new(host, candidate);

        match TcpListener::bind(addr).await {
            Ok(listener) => {
                if offset > 0 {
                    tracing::warn!(preferred = port, bound = candidate, "Preferred port in use");
                }
                return Ok(listener);
            }
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                tracing::info!(port = candidate, "Port is in use, trying next port");
            }
            Err(source) => return Err(BindError::Io { addr, source }),
        }
    }

    Err(BindError::Exhausted {
        host,
        first: port,
        last,
    })
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[tokio::test]
    async fn test_falls_back_to_next_port() {
        let taken = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = taken.local_addr().unwrap().port();
        if port == u16::MAX {
            return;
        }

        match bind_with_fallback(LOCALHOST, port, 5).await {
            Ok(listener) => assert!(listener.local_addr().unwrap().port() > port),
            // The neighbouring ports may be owned by other processes.
            Err(BindError::Exhausted { first, .. }) => assert_eq!(first, port),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[tokio::test]
    async fn test_single_attempt_on_taken_port_is_exhausted() {
        let taken = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let err = bind_with_fallback(LOCALHOST, port, 1).await.unwrap_err();
        assert!(matches!(err, BindError::Exhausted { first, last, .. } if first == port && last == port));
    }

    #[tokio::test]
    async fn test_port_zero_binds_any() {
        let listener = bind_with_fallback(LOCALHOST, 0, 10).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
