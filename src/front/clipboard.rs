use anyhow::Result;
use tracing::debug;

#[cfg(target_os = "macos")]
const READERS: &[(&str, &[&str])] = &[("pbpaste", &[])];

#[cfg(target_os = "windows")]
const READERS: &[(&str, &[&str])] = &[(
    "powershell",
    &["-NoProfile", "-Command", "Get-Clipboard"],
)];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const READERS: &[(&str, &[&str])] = &[
    ("wl-paste", &["--no-newline"]),
    ("xclip", &["-selection", "clipboard", "-o"]),
    ("xsel", &["--clipboard", "--output"]),
];

/// Reads text from the system clipboard using whichever helper is installed.
pub async fn read_text() -> Result<String> {
    for (program, args) in READERS {
        match tokio::process::Command::new(program).args(*args).output().await {
            Ok(output) if output.status.success() => {
                let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !text.is_empty() {
                    debug!("[clipboard] read {} bytes via {}", text.len(), program);
                    return Ok(text);
                }
                debug!("[clipboard] {} returned nothing", program);
            }
            Ok(output) => {
                debug!(
                    "[clipboard] {} failed: {}",
                    program,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            Err(e) => {
                debug!("[clipboard] {} not available: {}", program, e);
            }
        }
    }

    Err(anyhow::anyhow!("Could not access clipboard"))
}
