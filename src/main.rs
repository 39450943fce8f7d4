//! Host-side helper: `cargo run` builds the WASM bundle into `static/pkg`
//! and serves `static/` locally.

use std::process::{Command, Stdio};
use std::{env, thread, time::Duration};

const DEFAULT_PORT: &str = "8000";

fn main() {
    if env::var("API_KEY").map_or(true, |k| k.is_empty()) {
        eprintln!(
            "API_KEY is not set. The page will load, but \"Refine with AI\" requests will fail \
             until a key is baked in or provided in the site-config block."
        );
    }

    // Build wasm bundle; the key (if any) is captured at compile time.
    println!("Building WASM pkg …");
    match Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
        .env("WASM_PACK_RUNNING", "1")
        .status()
    {
        Ok(st) if st.success() => {}
        Ok(_) => {
            eprintln!("wasm-pack finished with errors. Ensure wasm-pack is installed (https://rustwasm.github.io/wasm-pack/).");
            std::process::exit(1);
        }
        Err(_) => {
            eprintln!("wasm-pack not found in PATH. Skipping wasm build; the site may serve stale artifacts.");
        }
    }

    // Start simple HTTP server serving `static/`
    let port = env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_owned());
    println!("Launching local server at http://127.0.0.1:{port} …");
    let server = Command::new("python3")
        .args(["-m", "http.server", &port, "--directory", "static"])
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .spawn();

    if let Err(err) = server {
        eprintln!("failed to start http server: {err}");
        std::process::exit(1);
    }

    // Keep process alive
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}
