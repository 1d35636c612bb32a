//! `capture` and `selector-map` subcommands.

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use tracing::info;

use pagepilot_capture::{build_selector_map, capture_with_timeout};
use pagepilot_config::Config;
use pagepilot_protocols::CaptureRequest;

use crate::settings::capture_request;

/// Overrides from the command line.
pub(crate) struct CaptureArgs {
    pub base_url: Option<String>,
    pub max_controls: Option<usize>,
    pub max_headings: Option<usize>,
    pub include_values: bool,
}

fn read_html(file: &Path) -> Result<String, Box<dyn std::error::Error>> {
    if file.as_os_str() == "-" {
        let mut html = String::new();
        std::io::stdin().read_to_string(&mut html)?;
        return Ok(html);
    }
    Ok(std::fs::read_to_string(file)?)
}

pub(crate) fn print_json<T: serde::Serialize>(
    value: &T,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

fn request_from(config: &Config, args: CaptureArgs) -> CaptureRequest {
    let mut request = capture_request(&config.capture);
    request.base_url = args.base_url;
    if let Some(max) = args.max_controls {
        request.max_controls = max;
    }
    if let Some(max) = args.max_headings {
        request.max_headings = max;
    }
    request.include_values |= args.include_values;
    request
}

pub(crate) async fn run_capture(
    config: &Config,
    file: &Path,
    args: CaptureArgs,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let html = read_html(file)?;
    let request = request_from(config, args);
    let timeout = Duration::from_millis(config.capture.timeout_ms);

    let model = capture_with_timeout(html, request, timeout).await?;
    info!(
        "Captured {} controls, {} headings from {}",
        model.controls.len(),
        model.headings.len(),
        file.display()
    );
    print_json(&model, pretty)
}

pub(crate) async fn run_selector_map(
    config: &Config,
    file: &Path,
    base_url: Option<String>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let html = read_html(file)?;
    let mut request = capture_request(&config.capture);
    request.base_url = base_url;

    let map = tokio::task::spawn_blocking(move || build_selector_map(&html, &request)).await??;
    info!("Selector map for {}: {} entries", file.display(), map.len());
    print_json(&map, pretty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let config = Config::default();
        let request = request_from(
            &config,
            CaptureArgs {
                base_url: Some("https://a.example/".into()),
                max_controls: Some(25),
                max_headings: None,
                include_values: true,
            },
        );
        assert_eq!(request.base_url.as_deref(), Some("https://a.example/"));
        assert_eq!(request.max_controls, 25);
        assert_eq!(request.max_headings, 30);
        assert!(request.include_values);
    }

    #[test]
    fn test_read_html_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html><body><button>Go</button></body></html>").unwrap();
        assert!(read_html(&path).unwrap().contains("<button>"));
        assert!(read_html(&dir.path().join("missing.html")).is_err());
    }

    #[tokio::test]
    async fn test_capture_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html><body><a href='/x'>X</a></body></html>").unwrap();
        let args = CaptureArgs {
            base_url: None,
            max_controls: None,
            max_headings: None,
            include_values: false,
        };
        assert!(run_capture(&Config::default(), &path, args, false).await.is_ok());
        assert!(
            run_selector_map(&Config::default(), &path, None, true)
                .await
                .is_ok()
        );
    }
}
