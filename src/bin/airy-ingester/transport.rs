use airy::ingest::MeasurementHandler;
use tokio::{
    io::{AsyncBufReadExt as _, AsyncRead, BufReader},
    net::TcpListener,
};
use tokio_stream::{
    StreamExt as _,
    wrappers::{LinesStream, TcpListenerStream},
};
use tracing::{info, warn};

/// Accepts connections forever, one task per connection.
pub async fn serve(listener: TcpListener, handler: MeasurementHandler) {
    let mut incoming = TcpListenerStream::new(listener);

    while let Some(stream) = incoming.next().await {
        let stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                warn!("failed to accept connection: {err}");
                continue;
            }
        };

        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        info!("connection established: {peer}");

        let handler = handler.clone();
        tokio::spawn(async move {
            let count = read_payloads(stream, &handler).await;
            info!("connection closed: {peer} ({count} messages)");
        });
    }
}

/// Feeds every non-empty line of `reader` to `handler`. Stops at EOF or at
/// the first read error. Returns the number of payloads handed over.
pub async fn read_payloads<R>(reader: R, handler: &MeasurementHandler) -> usize
where
    R: AsyncRead + Unpin,
{
    let mut lines = LinesStream::new(BufReader::new(reader).lines());
    let mut count = 0;

    while let Some(line) = lines.next().await {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("failed to read from connection: {err}");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        handler.handle(&line).await;
        count += 1;
    }

    count
}
