use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, port: u16, no_open: bool) -> anyhow::Result<()> {
    leadflow_core::workspace::ensure_initialized(root)
        .context("workspace not initialized")?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
            .await
            .with_context(|| format!("failed to bind port {port}"))?;
        let actual_port = listener.local_addr()?.port();

        if !no_open {
            let url = format!("http://localhost:{actual_port}/api/kpis");
            let _ = open::that(&url);
        }

        leadflow_server::serve_on(root.to_path_buf(), listener).await
    })
}
