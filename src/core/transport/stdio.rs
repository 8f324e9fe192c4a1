//! STDIO transport.
//!
//! Serves the merged gateway over stdin/stdout through rmcp. Logs must stay
//! on stderr while this transport runs.

use rmcp::ServiceExt;
use tracing::info;

use super::{TransportError, TransportResult};
use crate::core::McpServer;

pub struct StdioTransport;

impl StdioTransport {
    /// Serve one MCP session until the client closes stdin.
    pub async fn run(server: McpServer) -> TransportResult<()> {
        let name = server.name().to_string();

        let session = server
            .serve(rmcp::transport::stdio())
            .await
            .map_err(TransportError::handshake)?;
        info!("{} attached to stdin/stdout", name);

        let reason = session.waiting().await.map_err(TransportError::session)?;
        info!("STDIO session closed: {:?}", reason);
        Ok(())
    }
}
